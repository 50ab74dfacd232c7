//! Concurrent callers through the shared handle.

mod common;

use std::thread;

use common::*;
use vouch_consensus::ConsensusError;
use vouch_core::{Address, Amount, Tick};
use vouch_crypto::VoteSigner;
use vouch_protocol::{ProtocolError, SharedProtocol};

#[test]
fn concurrent_votes_tally_the_same_in_any_order() {
    let mut p = default_deploy();
    let v = stake_validators(&mut p, &[5_000, 4_000, 3_000, 2_000, 1_000]);
    let id = approved_proposal(&mut p, PROPOSER, 1);
    p.challenge(v[4].address(), id).unwrap();
    let round = p.open_round(ADMIN, id).unwrap();
    let shared = SharedProtocol::new(p);

    let handles: Vec<_> = v
        .into_iter()
        .enumerate()
        .map(|(i, signer)| {
            let shared = shared.clone();
            thread::spawn(move || {
                let support = i != 4;
                shared.with(|p| {
                    let signature = sign_round(p, &signer, round, support);
                    p.cast_vote(signer.address(), round, support, signature)
                })
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap().unwrap();
    }

    let approved = shared.with(|p| -> Result<bool, ProtocolError> {
        p.advance_to(Tick::new(101))?;
        p.finalize_round(ADMIN, round)
    });
    assert!(approved.unwrap());
    shared.read(|p| {
        let r = p.consensus().round(round).unwrap();
        assert_eq!((r.votes_for, r.votes_against), (4, 1));
        assert!(!p.guard().is_locked());
    });
}

#[test]
fn racing_duplicate_votes_admit_exactly_one() {
    let mut p = default_deploy();
    let v = stake_validators(&mut p, &[3_000, 2_000, 1_000]);
    let id = approved_proposal(&mut p, PROPOSER, 1);
    p.challenge(v[2].address(), id).unwrap();
    let round = p.open_round(ADMIN, id).unwrap();
    let signature = sign_round(&p, &v[0], round, true);
    let voter = v[0].address();
    let shared = SharedProtocol::new(p);

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let shared = shared.clone();
            let signature = signature.clone();
            thread::spawn(move || shared.with(|p| p.cast_vote(voter, round, true, signature)))
        })
        .collect();
    let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    assert!(results.iter().filter_map(|r| r.as_ref().err()).all(|e| matches!(
        e,
        ProtocolError::Consensus(ConsensusError::AlreadyVoted { .. })
    )));
    shared.read(|p| assert_eq!(p.consensus().round(round).unwrap().votes_for, 1));
}

#[test]
fn concurrent_registrations_keep_custody_consistent() {
    let mut p = default_deploy();
    let participants: Vec<(Address, Amount)> = (1u8..=8)
        .map(|i| {
            let who = VoteSigner::from_secret_bytes(&[i; 32]).unwrap().address();
            (who, 1_000 * Amount::from(i))
        })
        .collect();
    for (who, stake) in &participants {
        fund(&mut p, *who, *stake);
    }
    let shared = SharedProtocol::new(p);

    let handles: Vec<_> = participants
        .iter()
        .copied()
        .map(|(who, stake)| {
            let shared = shared.clone();
            thread::spawn(move || shared.with(|p| p.register(who, stake)))
        })
        .collect();
    for handle in handles {
        handle.join().unwrap().unwrap();
    }

    shared.read(|p| {
        let expected: Amount = participants.iter().map(|(_, s)| s).sum();
        assert_eq!(p.stakes().total_staked(), expected);
        let custody: Amount = participants
            .iter()
            .map(|(who, _)| balance(p, &p.stakes().stake_account_of(who)))
            .sum();
        assert_eq!(custody, expected);
        // Distinct stakes give a unique ranking whatever the arrival order.
        let ranked: Vec<_> = participants.iter().rev().map(|(who, _)| *who).collect();
        assert_eq!(p.stakes().active_set(), ranked.as_slice());
        let registered = p
            .events()
            .iter()
            .filter(|e| e.name() == "participant_registered")
            .count();
        assert_eq!(registered, 8);
    });
}
