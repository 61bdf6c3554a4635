// SPDX-License-Identifier: MIT

pub mod rpc;

use serde::{Deserialize, Serialize};

use crate::domain::error::VacuumError;
use crate::domain::types::AssetId;

/// One coin-like object holding part of an asset's balance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FundUnit {
    pub object_id: String,
    pub quantity: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FundUnitPage {
    pub units: Vec<FundUnit>,
    pub next_cursor: Option<String>,
}

/// A single spendable handle over an asset's entire balance. When more
/// than one fund-unit backs it, the batch must merge `merged` into
/// `primary` before any op spends the handle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsolidatedHandle {
    pub asset: AssetId,
    pub primary: String,
    pub merged: Vec<String>,
    pub quantity: u64,
}

impl ConsolidatedHandle {
    pub fn needs_merge(&self) -> bool {
        !self.merged.is_empty()
    }
}

/// Ordered ledger operations. A batch is applied atomically by the
/// ledger: either every op executes or none does.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum LedgerOp {
    MergeUnits {
        primary: String,
        others: Vec<String>,
    },
    Swap {
        pool_id: String,
        a_to_b: bool,
        asset_a: AssetId,
        asset_b: AssetId,
        handle: String,
        /// Exact input; set only on the first step of a route.
        amount_in: Option<u64>,
        /// Minimum acceptable output; set only on the last step.
        min_out: Option<u64>,
    },
    TransferToSink {
        handle: String,
        sink: String,
    },
    DepositToVault {
        vault: String,
        asset_vault: String,
        handle: String,
        claimed_usd_micro: u64,
        clock: String,
    },
    /// Informational audit record; never load-bearing for correctness.
    LogSwap {
        asset: AssetId,
        input_amount: u64,
        estimated_out: u64,
        clock: String,
    },
    CreateReceipt {
        vault: String,
        reward_preference: u8,
    },
    CreateMembership {
        vault: String,
        clock: String,
    },
    Claim {
        vault: String,
        receipt: String,
        membership: String,
        clock: String,
    },
    Stake {
        vault: String,
        receipt: String,
        membership: String,
        clock: String,
    },
    Vote {
        proposal: String,
        membership: String,
        vote_for: bool,
        clock: String,
    },
    OpenVault {
        admin_cap: String,
        vault: String,
    },
    CloseVault {
        admin_cap: String,
        vault: String,
    },
    SetTargetValue {
        admin_cap: String,
        vault: String,
        target_usd_micro: u64,
    },
    NewRound {
        admin_cap: String,
        vault: String,
    },
    CreateAssetVault {
        admin_cap: String,
        vault: String,
        asset: AssetId,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitReceipt {
    pub digest: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BalanceChange {
    pub owner: String,
    pub asset: AssetId,
    pub amount: i128,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinalizedExecution {
    pub digest: String,
    pub success: bool,
    pub balance_changes: Vec<BalanceChange>,
}

/// On-ledger vault read projection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VaultProjection {
    pub admin: String,
    pub round: u64,
    pub is_open: bool,
    pub total_shares: u64,
    pub total_lifetime_shares: u64,
    pub target_usd_micro: u64,
    pub current_usd_micro: u64,
    pub fees_collected_bps: u64,
}

/// One owned asset as reported by the all-balances listing, with the
/// metadata needed to present and classify it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OwnedBalance {
    pub asset: AssetId,
    pub total: u64,
    pub decimals: u8,
    pub symbol: String,
    pub name: String,
}

/// External system boundary: fund-unit enumeration and atomic batch
/// submission. Finality is a distinct call keyed by digest; submission
/// itself cannot be cancelled once issued.
pub trait AssetLedgerGateway: Send + Sync {
    fn list_balances(
        &self,
        owner: &str,
    ) -> impl std::future::Future<Output = Result<Vec<OwnedBalance>, VacuumError>> + Send;

    fn list_fund_units(
        &self,
        owner: &str,
        asset: &AssetId,
        cursor: Option<&str>,
    ) -> impl std::future::Future<Output = Result<FundUnitPage, VacuumError>> + Send;

    fn submit(
        &self,
        ops: &[LedgerOp],
        gas_budget: u64,
    ) -> impl std::future::Future<Output = Result<SubmitReceipt, VacuumError>> + Send;

    fn await_finality(
        &self,
        digest: &str,
    ) -> impl std::future::Future<Output = Result<FinalizedExecution, VacuumError>> + Send;

    fn vault_state(
        &self,
        vault: &str,
    ) -> impl std::future::Future<Output = Result<VaultProjection, VacuumError>> + Send;
}

impl<T: AssetLedgerGateway> AssetLedgerGateway for &T {
    async fn list_balances(&self, owner: &str) -> Result<Vec<OwnedBalance>, VacuumError> {
        (**self).list_balances(owner).await
    }

    async fn list_fund_units(
        &self,
        owner: &str,
        asset: &AssetId,
        cursor: Option<&str>,
    ) -> Result<FundUnitPage, VacuumError> {
        (**self).list_fund_units(owner, asset, cursor).await
    }

    async fn submit(&self, ops: &[LedgerOp], gas_budget: u64) -> Result<SubmitReceipt, VacuumError> {
        (**self).submit(ops, gas_budget).await
    }

    async fn await_finality(&self, digest: &str) -> Result<FinalizedExecution, VacuumError> {
        (**self).await_finality(digest).await
    }

    async fn vault_state(&self, vault: &str) -> Result<VaultProjection, VacuumError> {
        (**self).vault_state(vault).await
    }
}

impl<T: AssetLedgerGateway> AssetLedgerGateway for std::sync::Arc<T> {
    async fn list_balances(&self, owner: &str) -> Result<Vec<OwnedBalance>, VacuumError> {
        (**self).list_balances(owner).await
    }

    async fn list_fund_units(
        &self,
        owner: &str,
        asset: &AssetId,
        cursor: Option<&str>,
    ) -> Result<FundUnitPage, VacuumError> {
        (**self).list_fund_units(owner, asset, cursor).await
    }

    async fn submit(&self, ops: &[LedgerOp], gas_budget: u64) -> Result<SubmitReceipt, VacuumError> {
        (**self).submit(ops, gas_budget).await
    }

    async fn await_finality(&self, digest: &str) -> Result<FinalizedExecution, VacuumError> {
        (**self).await_finality(digest).await
    }

    async fn vault_state(&self, vault: &str) -> Result<VaultProjection, VacuumError> {
        (**self).vault_state(vault).await
    }
}
