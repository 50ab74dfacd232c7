//! Lowercase hex encoding with optional `0x` prefix on decode.

use crate::error::ValidationError;

/// Encode bytes as lowercase hex without a prefix.
pub fn encode(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

/// Encode bytes as lowercase hex with a `0x` prefix.
pub fn encode_prefixed(bytes: &[u8]) -> String {
    format!("0x{}", encode(bytes))
}

/// Decode a hex string, accepting an optional `0x` prefix and either case.
pub fn decode(input: &str) -> Result<Vec<u8>, ValidationError> {
    let trimmed = input.trim();
    let digits = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);
    if digits.len() % 2 != 0 {
        return Err(ValidationError::InvalidHex(input.to_string()));
    }
    (0..digits.len())
        .step_by(2)
        .map(|i| {
            u8::from_str_radix(&digits[i..i + 2], 16)
                .map_err(|_| ValidationError::InvalidHex(input.to_string()))
        })
        .collect()
}

/// Decode a hex string into a fixed-size array.
pub fn decode_array<const N: usize>(input: &str) -> Result<[u8; N], ValidationError> {
    let bytes = decode(input)?;
    if bytes.len() != N {
        return Err(ValidationError::InvalidLength {
            expected: N,
            actual: bytes.len(),
        });
    }
    let mut out = [0u8; N];
    out.copy_from_slice(&bytes);
    Ok(out)
}
