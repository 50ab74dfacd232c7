//! Shared fixtures for protocol integration tests.

#![allow(dead_code)]

use tracing_subscriber::EnvFilter;
use vouch_core::{Address, Amount, ContentHash, DisputeId, ProposalId, RoundId};
use vouch_crypto::{VoteSignature, VoteSigner};
use vouch_protocol::{Protocol, ProtocolConfig};
use vouch_token::{InMemoryToken, MockOracle, TokenLedger};

pub const ADMIN: Address = Address::from_bytes([0xad; 20]);
pub const TREASURY: Address = Address::from_bytes([0x7e; 20]);
pub const PROPOSER: Address = Address::from_bytes([0x99; 20]);

/// Tokens each validator holds beyond its stake, approved to the dispute
/// game.
pub const SPARE: Amount = 1_000;

pub type TestProtocol = Protocol<InMemoryToken, MockOracle>;

/// Route `tracing` output through the test harness. Safe to call from
/// every test.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_test_writer()
        .try_init();
}

pub fn deploy(config: ProtocolConfig) -> TestProtocol {
    init_tracing();
    let token = InMemoryToken::new(ADMIN, 1_000_000_000);
    Protocol::new(config, token, Some(MockOracle::default())).unwrap()
}

pub fn default_deploy() -> TestProtocol {
    deploy(ProtocolConfig::new(ADMIN, TREASURY))
}

/// Mint `stake + SPARE` to `who` and approve the ledger for `stake` and the
/// dispute game for `SPARE`.
pub fn fund(p: &mut TestProtocol, who: Address, stake: Amount) {
    let staking = p.config().staking_address;
    let game = p.config().dispute_address;
    let token = p.token_mut();
    token.mint(&ADMIN, &who, stake + SPARE).unwrap();
    token.approve(&who, &staking, stake);
    token.approve(&who, &game, SPARE);
}

/// Deterministic validators, registered in order with the given stakes.
pub fn stake_validators(p: &mut TestProtocol, stakes: &[Amount]) -> Vec<VoteSigner> {
    stakes
        .iter()
        .enumerate()
        .map(|(i, stake)| {
            let signer = VoteSigner::from_secret_bytes(&[i as u8 + 1; 32]).unwrap();
            fund(p, signer.address(), *stake);
            p.register(signer.address(), *stake).unwrap();
            signer
        })
        .collect()
}

/// Submit from `proposer` and optimistically approve at the current tick.
pub fn approved_proposal(p: &mut TestProtocol, proposer: Address, seed: u8) -> ProposalId {
    let id = p
        .submit_proposal(proposer, ContentHash::from_bytes([seed; 32]), vec![seed])
        .unwrap();
    p.approve_optimistically(ADMIN, id).unwrap();
    id
}

pub fn sign_round(p: &TestProtocol, signer: &VoteSigner, round: RoundId, support: bool) -> VoteSignature {
    let message = p.round_vote_message(round, signer.address(), support);
    signer.sign_vote(&message).unwrap()
}

pub fn sign_dispute(
    p: &TestProtocol,
    signer: &VoteSigner,
    dispute: DisputeId,
    support: bool,
) -> VoteSignature {
    let message = p.dispute_vote_message(dispute, signer.address(), support);
    signer.sign_vote(&message).unwrap()
}

pub fn balance(p: &TestProtocol, who: &Address) -> Amount {
    p.token().balance_of(who)
}
