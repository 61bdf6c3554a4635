// SPDX-License-Identifier: MIT
// Multi-round vault accounting exercised the way a real pool cycles:
// deposits, finalization with the admin fee, claims and stakes against
// finalized rounds, and share-weighted governance on top.

use dust_vacuum::domain::error::VacuumError;
use dust_vacuum::pool::{Membership, Proposal, VaultAccount, VoteOutcome};
use dust_vacuum::vacuum::PriceValidationGuard;

#[test]
fn two_rounds_of_deposits_claims_and_votes() {
    let guard = PriceValidationGuard::default();
    let mut vault = VaultAccount::new("admin".into(), 500_000_000);
    let mut alice = Membership::new("alice".into());
    let mut bob = Membership::new("bob".into());

    vault.open("admin").unwrap();

    // Round 1: alice $0.75, bob $0.25.
    let alice_r1 = vault.deposit(&mut alice, 750_000, &guard).unwrap();
    let bob_r1 = vault.deposit(&mut bob, 250_000, &guard).unwrap();
    vault.new_round("admin", 1_000_000).unwrap();

    // Round 2: only bob deposits, then the round closes empty-handed.
    let bob_r2 = vault.deposit(&mut bob, 500_000, &guard).unwrap();
    assert_eq!(bob_r2.round, 2);
    vault.new_round("admin", 0).unwrap();
    assert_eq!(vault.round, 3);

    // Round 1 payouts at 980_000 net (200 bps fee on 1_000_000).
    assert_eq!(vault.claim(alice_r1, &mut alice).unwrap(), 735_000);
    assert_eq!(vault.stake(bob_r1, &mut bob).unwrap(), 245_000);
    // Round 2 had zero proceeds; the receipt settles to nothing.
    assert_eq!(vault.claim(bob_r2, &mut bob).unwrap(), 0);

    assert_eq!(alice.total_earned, 735_000);
    assert_eq!(bob.staked_amount, 245_000);
    assert_eq!(vault.fees_collected, 20_000);

    // Governance weight is lifetime shares, unaffected by round resets:
    // bob's two deposits together match alice's single one.
    assert_eq!(alice.lifetime_shares, 750_000);
    assert_eq!(bob.lifetime_shares, 750_000);

    let mut proposal = Proposal::new(7, "lower the fee".into(), 0, 1_000);
    proposal.vote(&alice, true, 500).unwrap();
    proposal.vote(&bob, false, 500).unwrap();
    assert_eq!(proposal.outcome(), VoteOutcome::Tied);
}

#[test]
fn receipt_round_never_pays_out_while_current() {
    let guard = PriceValidationGuard::default();
    let mut vault = VaultAccount::new("admin".into(), 0);
    let mut member = Membership::new("m".into());
    vault.open("admin").unwrap();

    let receipt = vault.deposit(&mut member, 100_000, &guard).unwrap();
    let err = vault.claim(receipt.clone(), &mut member).unwrap_err();
    assert!(matches!(err, VacuumError::Validation { .. }));

    // Finalization flips the same receipt from pending to claimable.
    vault.new_round("admin", 50_000).unwrap();
    assert_eq!(vault.claim(receipt, &mut member).unwrap(), 49_000);
}

#[test]
fn deposits_stop_the_moment_the_vault_closes() {
    let guard = PriceValidationGuard::default();
    let mut vault = VaultAccount::new("admin".into(), 0);
    let mut member = Membership::new("m".into());

    vault.open("admin").unwrap();
    vault.deposit(&mut member, 100_000, &guard).unwrap();
    vault.close("admin").unwrap();
    assert!(vault.deposit(&mut member, 100_000, &guard).is_err());

    // Reopening resumes share minting in the same round.
    vault.open("admin").unwrap();
    let receipt = vault.deposit(&mut member, 100_000, &guard).unwrap();
    assert_eq!(receipt.round, 1);
    assert_eq!(vault.total_shares, 200_000);
}
