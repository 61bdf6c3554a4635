// SPDX-License-Identifier: MIT

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::common::constants::{DEFAULT_FEE_BPS, USD_SHARE_SCALE};
use crate::domain::error::VacuumError;
use crate::services::vacuum::guard::PriceValidationGuard;

/// Net proceeds and share base of a finalized round. Once recorded the
/// ledger entry is immutable; claims only read it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundLedger {
    pub proceeds_net: u64,
    pub total_shares: u64,
}

/// Proof of a deposit into a specific round. Consumed exactly once, and
/// only after that round has been finalized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepositReceipt {
    pub depositor: String,
    /// Micro-USD valuation at deposit time; doubles as the share count.
    pub shares: u64,
    pub round: u64,
}

/// Per-member accumulator. Lifetime shares only grow; they are the
/// member's governance weight.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Membership {
    pub member: String,
    pub lifetime_shares: u64,
    pub total_earned: u64,
    pub staked_amount: u64,
    pub reward_preference: u8,
}

impl Membership {
    pub fn new(member: String) -> Self {
        Self {
            member,
            ..Self::default()
        }
    }
}

/// Client-side mirror of the pooled vault. The ledger is authoritative;
/// this state machine exists so runs can be planned and previewed
/// without a round-trip, and so the rules are testable in isolation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VaultAccount {
    pub admin: String,
    /// Monotonic, starts at 1. Deposits tag the round they land in.
    pub round: u64,
    pub is_open: bool,
    /// Shares minted in the current round.
    pub total_shares: u64,
    pub total_lifetime_shares: u64,
    pub target_usd_micro: u64,
    pub current_usd_micro: u64,
    pub fee_bps: u64,
    pub fees_collected: u64,
    pub rounds: BTreeMap<u64, RoundLedger>,
}

impl VaultAccount {
    pub fn new(admin: String, target_usd_micro: u64) -> Self {
        Self {
            admin,
            round: 1,
            is_open: false,
            total_shares: 0,
            total_lifetime_shares: 0,
            target_usd_micro,
            current_usd_micro: 0,
            fee_bps: DEFAULT_FEE_BPS,
            fees_collected: 0,
            rounds: BTreeMap::new(),
        }
    }

    fn require_admin(&self, caller: &str) -> Result<(), VacuumError> {
        // Advisory only; the ledger's capability object is the real gate.
        if caller != self.admin {
            return Err(VacuumError::Unauthorized(format!(
                "{caller} does not hold the vault admin capability"
            )));
        }
        Ok(())
    }

    pub fn open(&mut self, caller: &str) -> Result<(), VacuumError> {
        self.require_admin(caller)?;
        self.is_open = true;
        Ok(())
    }

    pub fn close(&mut self, caller: &str) -> Result<(), VacuumError> {
        self.require_admin(caller)?;
        self.is_open = false;
        Ok(())
    }

    pub fn set_target_usd(&mut self, caller: &str, target_usd_micro: u64) -> Result<(), VacuumError> {
        self.require_admin(caller)?;
        self.target_usd_micro = target_usd_micro;
        Ok(())
    }

    /// Mint shares for a claimed valuation. One micro-USD is one share,
    /// so `shares = floor(usd * 1e6)` by construction of the input.
    pub fn deposit(
        &mut self,
        membership: &mut Membership,
        valuation_micro_usd: u64,
        guard: &PriceValidationGuard,
    ) -> Result<DepositReceipt, VacuumError> {
        if !self.is_open {
            return Err(VacuumError::Validation {
                field: "vault".into(),
                message: "vault is closed to deposits".into(),
            });
        }
        let usd = valuation_micro_usd as f64 / USD_SHARE_SCALE as f64;
        guard.validate(&[usd])?;

        let shares = valuation_micro_usd;
        self.total_shares = self.total_shares.saturating_add(shares);
        self.total_lifetime_shares = self.total_lifetime_shares.saturating_add(shares);
        self.current_usd_micro = self.current_usd_micro.saturating_add(valuation_micro_usd);
        membership.lifetime_shares = membership.lifetime_shares.saturating_add(shares);

        Ok(DepositReceipt {
            depositor: membership.member.clone(),
            shares,
            round: self.round,
        })
    }

    /// Finalize the current round against its gross proceeds: retain the
    /// fee, snapshot the share base, advance the round counter.
    pub fn new_round(&mut self, caller: &str, gross_proceeds: u64) -> Result<(), VacuumError> {
        self.require_admin(caller)?;
        let fee = (gross_proceeds as u128 * self.fee_bps as u128 / 10_000) as u64;
        let net = gross_proceeds.saturating_sub(fee);
        self.fees_collected = self.fees_collected.saturating_add(fee);
        self.rounds.insert(
            self.round,
            RoundLedger {
                proceeds_net: net,
                total_shares: self.total_shares,
            },
        );
        self.round += 1;
        self.total_shares = 0;
        self.current_usd_micro = 0;
        Ok(())
    }

    /// Pro-rata payout for a receipt from a finalized round. Takes the
    /// receipt by value: a claimed receipt no longer exists.
    pub fn claim(
        &mut self,
        receipt: DepositReceipt,
        membership: &mut Membership,
    ) -> Result<u64, VacuumError> {
        let payout = self.settle(&receipt)?;
        membership.total_earned = membership.total_earned.saturating_add(payout);
        Ok(payout)
    }

    /// Same eligibility as claim, but the payout stays in the vault as
    /// the member's staked balance.
    pub fn stake(
        &mut self,
        receipt: DepositReceipt,
        membership: &mut Membership,
    ) -> Result<u64, VacuumError> {
        let payout = self.settle(&receipt)?;
        membership.staked_amount = membership.staked_amount.saturating_add(payout);
        membership.total_earned = membership.total_earned.saturating_add(payout);
        Ok(payout)
    }

    fn settle(&self, receipt: &DepositReceipt) -> Result<u64, VacuumError> {
        if receipt.round >= self.round {
            return Err(VacuumError::Validation {
                field: "receipt".into(),
                message: format!(
                    "round {} has not been finalized yet",
                    receipt.round
                ),
            });
        }
        let Some(ledger) = self.rounds.get(&receipt.round) else {
            return Err(VacuumError::Validation {
                field: "receipt".into(),
                message: format!("no ledger entry for round {}", receipt.round),
            });
        };
        if ledger.total_shares == 0 {
            return Ok(0);
        }
        let payout =
            ledger.proceeds_net as u128 * receipt.shares as u128 / ledger.total_shares as u128;
        Ok(payout as u64)
    }
}
