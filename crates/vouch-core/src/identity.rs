//! # Identity Newtypes
//!
//! Participants, contracts, and token accounts are identified by a 20-byte
//! [`Address`], the same width produced by secp256k1 public-key recovery.
//! Proposals, consensus rounds, and disputes are identified by monotonic
//! counters, each its own type.
//!
//! ## Serde
//!
//! `Address` serializes as a `0x`-prefixed lowercase hex string. Counter ids
//! serialize as bare integers.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::ValidationError;
use crate::hex;

// ---------------------------------------------------------------------------
// Address
// ---------------------------------------------------------------------------

/// A 20-byte account identity.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Address([u8; 20]);

impl Address {
    /// The all-zero address.
    pub const ZERO: Address = Address([0u8; 20]);

    /// Create an address from raw bytes.
    pub const fn from_bytes(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }

    /// Take the last 20 bytes of a 32-byte word, the convention for deriving
    /// an address from a hash.
    pub fn from_word(word: &[u8; 32]) -> Self {
        let mut bytes = [0u8; 20];
        bytes.copy_from_slice(&word[12..]);
        Self(bytes)
    }

    /// Return the raw bytes.
    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    /// Whether this is the zero address.
    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 20]
    }

    /// Render as `0x`-prefixed lowercase hex.
    pub fn to_hex(&self) -> String {
        hex::encode_prefixed(&self.0)
    }

    /// Parse from a 40-digit hex string with optional `0x` prefix.
    pub fn from_hex(s: &str) -> Result<Self, ValidationError> {
        hex::decode_array::<20>(s).map(Self)
    }
}

impl std::fmt::Display for Address {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl std::fmt::Debug for Address {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Address({})", self.to_hex())
    }
}

impl std::str::FromStr for Address {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

// ---------------------------------------------------------------------------
// Counter identifiers
// ---------------------------------------------------------------------------

macro_rules! counter_id {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(u64);

        impl $name {
            /// The first id handed out by a fresh counter.
            pub const FIRST: $name = $name(1);

            /// Wrap a raw counter value.
            pub const fn new(value: u64) -> Self {
                Self(value)
            }

            /// The raw counter value.
            pub const fn value(&self) -> u64 {
                self.0
            }

            /// The id following this one, or `None` if the counter is exhausted.
            pub fn checked_next(&self) -> Option<Self> {
                self.0.checked_add(1).map(Self)
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, concat!($prefix, ":{}"), self.0)
            }
        }
    };
}

counter_id!(
    /// Identifier of a submitted proposal.
    ProposalId,
    "proposal"
);

counter_id!(
    /// Identifier of a consensus voting round.
    RoundId,
    "round"
);

counter_id!(
    /// Identifier of a dispute game.
    DisputeId,
    "dispute"
);
