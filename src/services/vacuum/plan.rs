// SPDX-License-Identifier: MIT

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::common::constants::{BURN_SINK_ADDRESS, CLOCK_OBJECT_ID, USD_SHARE_SCALE};
use crate::domain::error::VacuumError;
use crate::domain::types::{AssetId, AssetOutcome, DisposalAction, Route};
use crate::infrastructure::ledger::{ConsolidatedHandle, LedgerOp};

/// A swap candidate: full consolidated balance plus its resolved route.
#[derive(Debug, Clone)]
pub struct SwapIntent {
    pub handle: ConsolidatedHandle,
    pub route: Route,
    pub symbol: String,
    pub usd_value: f64,
}

/// A committed burn/donate candidate. `handle` is `None` when no
/// fund-units exist, which the builder treats as a no-op.
#[derive(Debug, Clone)]
pub struct DisposalIntent {
    pub asset: AssetId,
    pub symbol: String,
    pub handle: Option<ConsolidatedHandle>,
    pub action: DisposalAction,
    pub usd_value: f64,
}

/// The ordered op list for one run, submitted as a single atomic unit.
/// Partial application is impossible by construction: the ledger either
/// applies every op or rolls the whole batch back.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchPlan {
    pub ops: Vec<LedgerOp>,
    pub planned: Vec<AssetOutcome>,
    pub total_value_usd: f64,
}

/// Assembles the per-asset op sub-sequences (merge, then swap or
/// disposal, then audit-log). Ordering across assets is free; ordering
/// within one asset's sub-sequence is mandatory.
#[derive(Debug, Clone)]
pub struct BatchTransactionBuilder {
    pub slippage_bps: u64,
    pub burn_sink: String,
    pub clock: String,
    /// Pool vault receiving donations; donations fail without it.
    pub vault_id: Option<String>,
    /// Per-asset sub-vault objects inside the pool vault.
    pub asset_vaults: HashMap<AssetId, String>,
    /// Emit informational LogSwap ops after each swap.
    pub audit_log: bool,
}

impl BatchTransactionBuilder {
    pub fn new(slippage_bps: u64) -> Self {
        Self {
            slippage_bps,
            burn_sink: BURN_SINK_ADDRESS.to_string(),
            clock: CLOCK_OBJECT_ID.to_string(),
            vault_id: None,
            asset_vaults: HashMap::new(),
            audit_log: true,
        }
    }

    pub fn with_vault(mut self, vault_id: String, asset_vaults: HashMap<AssetId, String>) -> Self {
        self.vault_id = Some(vault_id);
        self.asset_vaults = asset_vaults;
        self
    }

    /// `floor(amount_out × (1 − slippage))`, slippage in basis points.
    pub fn minimum_output(&self, amount_out: u64) -> u64 {
        let numerator = (amount_out as u128) * (10_000u128 - self.slippage_bps.min(10_000) as u128);
        (numerator / 10_000) as u64
    }

    pub fn build(
        &self,
        swaps: &[SwapIntent],
        disposals: &[DisposalIntent],
    ) -> Result<BatchPlan, VacuumError> {
        let mut ops = Vec::new();
        let mut planned = Vec::new();
        let mut donated_any = false;

        for intent in swaps {
            if intent.handle.quantity == 0 {
                continue;
            }
            self.push_swap_ops(&mut ops, intent)?;
            planned.push(AssetOutcome {
                asset: intent.handle.asset.clone(),
                symbol: intent.symbol.clone(),
                action: DisposalAction::Swap,
                input_quantity: intent.handle.quantity,
                estimated_out: intent.route.amount_out,
                usd_value: intent.usd_value,
            });
        }

        for intent in disposals {
            let Some(handle) = &intent.handle else {
                // Nothing on the ledger to burn or donate; idempotent no-op.
                tracing::debug!(target: "plan", asset = %intent.asset, "Skipping disposal with no fund-units");
                continue;
            };
            if handle.quantity == 0 {
                continue;
            }
            match intent.action {
                DisposalAction::Burn => self.push_burn_ops(&mut ops, handle),
                DisposalAction::Donate => {
                    self.push_donate_ops(&mut ops, intent, handle)?;
                    donated_any = true;
                }
                DisposalAction::Swap => {
                    return Err(VacuumError::Validation {
                        field: "disposal".into(),
                        message: format!("{} reached disposal with action=swap", intent.asset),
                    });
                }
            }
            planned.push(AssetOutcome {
                asset: intent.asset.clone(),
                symbol: intent.symbol.clone(),
                action: intent.action,
                input_quantity: handle.quantity,
                estimated_out: 0,
                usd_value: intent.usd_value,
            });
        }

        if planned.is_empty() {
            // Refuse to contact the gateway with an empty batch.
            return Err(VacuumError::NothingToDo);
        }

        if donated_any {
            let vault = self.vault_id.clone().ok_or_else(|| VacuumError::Config(
                "donation planned but no pool vault configured".into(),
            ))?;
            ops.push(LedgerOp::CreateReceipt {
                vault,
                reward_preference: 0,
            });
        }

        let total_value_usd = planned.iter().map(|p| p.usd_value).sum();
        Ok(BatchPlan {
            ops,
            planned,
            total_value_usd,
        })
    }

    fn push_merge_if_needed(&self, ops: &mut Vec<LedgerOp>, handle: &ConsolidatedHandle) {
        if handle.needs_merge() {
            ops.push(LedgerOp::MergeUnits {
                primary: handle.primary.clone(),
                others: handle.merged.clone(),
            });
        }
    }

    fn push_swap_ops(&self, ops: &mut Vec<LedgerOp>, intent: &SwapIntent) -> Result<(), VacuumError> {
        let handle = &intent.handle;
        let route = &intent.route;
        if route.steps.is_empty() {
            return Err(VacuumError::NoRoute {
                asset: handle.asset.clone(),
            });
        }

        self.push_merge_if_needed(ops, handle);

        let min_out = self.minimum_output(route.amount_out);
        let last = route.steps.len() - 1;
        for (idx, step) in route.steps.iter().enumerate() {
            // Only the first step fixes the exact input and only the last
            // enforces the output floor; intermediate hops pass through
            // whatever the prior hop produced.
            ops.push(LedgerOp::Swap {
                pool_id: step.pool_id.clone(),
                a_to_b: step.a_to_b,
                asset_a: step.asset_a.clone(),
                asset_b: step.asset_b.clone(),
                handle: handle.primary.clone(),
                amount_in: (idx == 0).then_some(handle.quantity),
                min_out: (idx == last).then_some(min_out),
            });
        }

        if self.audit_log {
            ops.push(LedgerOp::LogSwap {
                asset: handle.asset.clone(),
                input_amount: handle.quantity,
                estimated_out: route.amount_out,
                clock: self.clock.clone(),
            });
        }
        Ok(())
    }

    fn push_burn_ops(&self, ops: &mut Vec<LedgerOp>, handle: &ConsolidatedHandle) {
        self.push_merge_if_needed(ops, handle);
        ops.push(LedgerOp::TransferToSink {
            handle: handle.primary.clone(),
            sink: self.burn_sink.clone(),
        });
    }

    fn push_donate_ops(
        &self,
        ops: &mut Vec<LedgerOp>,
        intent: &DisposalIntent,
        handle: &ConsolidatedHandle,
    ) -> Result<(), VacuumError> {
        let vault = self.vault_id.clone().ok_or_else(|| {
            VacuumError::Config("donation planned but no pool vault configured".into())
        })?;
        let asset_vault = self
            .asset_vaults
            .get(&intent.asset)
            .cloned()
            .ok_or_else(|| VacuumError::Validation {
                field: "asset_vaults".into(),
                message: format!("no pool sub-vault registered for {}", intent.asset),
            })?;

        self.push_merge_if_needed(ops, handle);
        ops.push(LedgerOp::DepositToVault {
            vault,
            asset_vault,
            handle: handle.primary.clone(),
            claimed_usd_micro: usd_to_micro(intent.usd_value),
            clock: self.clock.clone(),
        });
        Ok(())
    }
}

pub fn usd_to_micro(usd: f64) -> u64 {
    if usd <= 0.0 {
        return 0;
    }
    (usd * USD_SHARE_SCALE as f64).floor() as u64
}
