// SPDX-License-Identifier: MIT

//! Op builders for the vault's on-ledger interface. Each helper returns
//! the exact op sequence one interaction submits; the CLI glues these
//! straight into `AssetLedgerGateway::submit`.

use crate::common::constants::CLOCK_OBJECT_ID;
use crate::domain::types::AssetId;
use crate::infrastructure::ledger::LedgerOp;

pub fn create_membership(vault: &str) -> Vec<LedgerOp> {
    vec![LedgerOp::CreateMembership {
        vault: vault.to_string(),
        clock: CLOCK_OBJECT_ID.to_string(),
    }]
}

pub fn claim(vault: &str, receipt: &str, membership: &str) -> Vec<LedgerOp> {
    vec![LedgerOp::Claim {
        vault: vault.to_string(),
        receipt: receipt.to_string(),
        membership: membership.to_string(),
        clock: CLOCK_OBJECT_ID.to_string(),
    }]
}

pub fn stake(vault: &str, receipt: &str, membership: &str) -> Vec<LedgerOp> {
    vec![LedgerOp::Stake {
        vault: vault.to_string(),
        receipt: receipt.to_string(),
        membership: membership.to_string(),
        clock: CLOCK_OBJECT_ID.to_string(),
    }]
}

pub fn vote(proposal: &str, membership: &str, vote_for: bool) -> Vec<LedgerOp> {
    vec![LedgerOp::Vote {
        proposal: proposal.to_string(),
        membership: membership.to_string(),
        vote_for,
        clock: CLOCK_OBJECT_ID.to_string(),
    }]
}

pub fn open_vault(admin_cap: &str, vault: &str) -> Vec<LedgerOp> {
    vec![LedgerOp::OpenVault {
        admin_cap: admin_cap.to_string(),
        vault: vault.to_string(),
    }]
}

pub fn close_vault(admin_cap: &str, vault: &str) -> Vec<LedgerOp> {
    vec![LedgerOp::CloseVault {
        admin_cap: admin_cap.to_string(),
        vault: vault.to_string(),
    }]
}

pub fn set_target_usd_value(admin_cap: &str, vault: &str, target_usd_micro: u64) -> Vec<LedgerOp> {
    vec![LedgerOp::SetTargetValue {
        admin_cap: admin_cap.to_string(),
        vault: vault.to_string(),
        target_usd_micro,
    }]
}

pub fn new_round(admin_cap: &str, vault: &str) -> Vec<LedgerOp> {
    vec![LedgerOp::NewRound {
        admin_cap: admin_cap.to_string(),
        vault: vault.to_string(),
    }]
}

pub fn create_asset_vault(admin_cap: &str, vault: &str, asset: AssetId) -> Vec<LedgerOp> {
    vec![LedgerOp::CreateAssetVault {
        admin_cap: admin_cap.to_string(),
        vault: vault.to_string(),
        asset,
    }]
}
