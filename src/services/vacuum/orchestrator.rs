// SPDX-License-Identifier: MIT

use std::collections::HashMap;
use std::time::Duration;

use futures::StreamExt;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;

use crate::common::constants::{
    DEFAULT_GAS_BUDGET, DEFAULT_ROUTE_CALL_DELAY_MS, DEFAULT_ROUTE_CONCURRENCY,
    DEFAULT_SLIPPAGE_BPS, MAX_ASSETS_PER_BATCH,
};
use crate::common::parsing::normalize_address;
use crate::domain::error::VacuumError;
use crate::domain::types::{AssetId, DisposalAction, RunSummary};
use crate::infrastructure::aggregator::RouteSource;
use crate::infrastructure::ledger::AssetLedgerGateway;
use crate::services::vacuum::consolidate::consolidate;
use crate::services::vacuum::context::{RunContext, RunStage};
use crate::services::vacuum::guard::PriceValidationGuard;
use crate::services::vacuum::plan::{BatchTransactionBuilder, DisposalIntent, SwapIntent};

#[derive(Debug, Clone)]
pub struct VacuumRunSettings {
    pub slippage_bps: u64,
    /// Route fan-out is bounded and paced; the aggregator meters us.
    pub max_route_concurrency: usize,
    pub route_call_delay: Duration,
    pub gas_budget: u64,
    pub dry_run: bool,
    pub guard: PriceValidationGuard,
    pub vault_id: Option<String>,
    pub asset_vaults: HashMap<AssetId, String>,
}

impl Default for VacuumRunSettings {
    fn default() -> Self {
        Self {
            slippage_bps: DEFAULT_SLIPPAGE_BPS,
            max_route_concurrency: DEFAULT_ROUTE_CONCURRENCY,
            route_call_delay: Duration::from_millis(DEFAULT_ROUTE_CALL_DELAY_MS),
            gas_budget: DEFAULT_GAS_BUDGET,
            dry_run: false,
            guard: PriceValidationGuard::default(),
            vault_id: None,
            asset_vaults: HashMap::new(),
        }
    }
}

/// Coordinates one end-to-end vacuum run: consolidate, resolve,
/// classify, confirm, build, submit, summarize.
///
/// All run state lives in the caller-owned [`RunContext`]; the
/// orchestrator itself is stateless between calls and safe to reuse.
pub struct VacuumOrchestrator<G, R> {
    gateway: G,
    routes: R,
    settings: VacuumRunSettings,
}

impl<G: AssetLedgerGateway, R: RouteSource> VacuumOrchestrator<G, R> {
    pub fn new(gateway: G, routes: R, settings: VacuumRunSettings) -> Self {
        Self {
            gateway,
            routes,
            settings,
        }
    }

    pub fn settings(&self) -> &VacuumRunSettings {
        &self.settings
    }

    /// Stage one: consolidate every selected asset, resolve routes for
    /// swap candidates, and stage route-less assets for disposal.
    ///
    /// Recoverable per-asset conditions (zero balance, listing failure,
    /// no route) never abort preparation; they end up itemized in the
    /// context instead.
    pub async fn prepare(&self, ctx: &mut RunContext) -> Result<(), VacuumError> {
        if ctx.stage != RunStage::Draft {
            return Err(VacuumError::Validation {
                field: "stage".into(),
                message: "prepare() requires a draft context".into(),
            });
        }

        let mut candidates: Vec<_> = ctx
            .selected
            .iter()
            .filter(|b| b.selected && b.asset != ctx.target_asset)
            .cloned()
            .collect();
        if candidates.len() > MAX_ASSETS_PER_BATCH {
            tracing::warn!(
                target: "vacuum",
                selected = candidates.len(),
                cap = MAX_ASSETS_PER_BATCH,
                "Selection exceeds batch cap; deferring the excess to a later run"
            );
            candidates.truncate(MAX_ASSETS_PER_BATCH);
        }

        for balance in &candidates {
            match consolidate(&self.gateway, &ctx.owner, &balance.asset).await {
                Ok(Some(handle)) => {
                    ctx.handles.insert(balance.asset.clone(), handle);
                }
                Ok(None) => {
                    // Zero balance: silently skipped, not a failure.
                    tracing::debug!(target: "vacuum", asset = %balance.asset, "No fund-units; skipping");
                }
                Err(e) => {
                    tracing::warn!(target: "vacuum", asset = %balance.asset, error = %e, "Balance listing failed; dropping asset from run");
                    ctx.failed.push((balance.asset.clone(), e.to_string()));
                }
            }
        }

        // Assets the caller already marked for burn/donate skip routing.
        let mut to_route = Vec::new();
        for balance in &candidates {
            let Some(handle) = ctx.handles.get(&balance.asset) else {
                continue;
            };
            match balance.disposal {
                DisposalAction::Swap => to_route.push((balance.asset.clone(), handle.quantity)),
                chosen => ctx.classifier.stage(balance.asset.clone(), Some(chosen))?,
            }
        }

        let delay = self.settings.route_call_delay;
        let target = ctx.target_asset.clone();
        let resolved: Vec<(AssetId, Option<crate::domain::types::Route>)> =
            futures::stream::iter(to_route.into_iter().map(|(asset, quantity)| {
                let routes = &self.routes;
                let target = target.clone();
                async move {
                    sleep(delay).await;
                    let route = match routes.resolve(&asset, &target, quantity).await {
                        Ok(r) => r,
                        Err(e) => {
                            tracing::warn!(target: "vacuum", asset = %asset, error = %e, "Route resolution errored; treating as no-route");
                            None
                        }
                    };
                    (asset, route)
                }
            }))
            .buffer_unordered(self.settings.max_route_concurrency.max(1))
            .collect()
            .await;

        for (asset, route) in resolved {
            match route {
                Some(route) => {
                    ctx.routes.insert(asset, route);
                }
                None => {
                    tracing::info!(target: "vacuum", asset = %asset, "No route; staging disposal fallback");
                    ctx.classifier.stage(asset, None)?;
                }
            }
        }

        ctx.stage = RunStage::Prepared;
        Ok(())
    }

    /// Stage two: gate on confirmation, validate donations, build the
    /// atomic batch, submit, and wait for finality.
    ///
    /// Cancellation is honored only before submission; once the batch
    /// is in flight the run can be observed but not stopped.
    pub async fn execute(
        &self,
        ctx: &mut RunContext,
        cancel: &CancellationToken,
    ) -> Result<RunSummary, VacuumError> {
        if ctx.stage != RunStage::Prepared {
            return Err(VacuumError::Validation {
                field: "stage".into(),
                message: "execute() requires a prepared context".into(),
            });
        }
        if ctx.classifier.has_pending() {
            return Err(VacuumError::ConfirmationRequired {
                burn_count: ctx.classifier.pending_burns(),
            });
        }

        let mut swaps = Vec::new();
        for (asset, route) in &ctx.routes {
            let Some(handle) = ctx.handles.get(asset) else {
                continue;
            };
            let balance = ctx.balance_of(asset);
            swaps.push(SwapIntent {
                handle: handle.clone(),
                route: route.clone(),
                symbol: balance.map(|b| b.symbol.clone()).unwrap_or_default(),
                usd_value: balance.map(|b| b.usd_value).unwrap_or(0.0),
            });
        }

        let mut disposals = Vec::new();
        let mut donation_values = Vec::new();
        for (asset, action) in ctx.classifier.committed() {
            let balance = ctx.balance_of(&asset);
            let usd_value = balance.map(|b| b.usd_value).unwrap_or(0.0);
            if action == DisposalAction::Donate {
                donation_values.push(usd_value);
            }
            disposals.push(DisposalIntent {
                handle: ctx.handles.get(&asset).cloned(),
                symbol: balance.map(|b| b.symbol.clone()).unwrap_or_default(),
                asset,
                action,
                usd_value,
            });
        }

        // Valuation bounds run before the builder and before any ledger
        // traffic for this run.
        self.settings.guard.validate(&donation_values)?;

        let mut builder = BatchTransactionBuilder::new(self.settings.slippage_bps);
        if let Some(vault) = &self.settings.vault_id {
            builder = builder.with_vault(vault.clone(), self.settings.asset_vaults.clone());
        }
        let plan = builder.build(&swaps, &disposals)?;

        let mut summary = RunSummary {
            digest: None,
            swapped: Vec::new(),
            burned: Vec::new(),
            donated: Vec::new(),
            failed_assets: ctx.failed.clone(),
            total_output_received: 0,
            total_value_usd: plan.total_value_usd,
        };
        for outcome in &plan.planned {
            match outcome.action {
                DisposalAction::Swap => summary.swapped.push(outcome.clone()),
                DisposalAction::Burn => summary.burned.push(outcome.clone()),
                DisposalAction::Donate => summary.donated.push(outcome.clone()),
            }
        }

        if self.settings.dry_run {
            tracing::info!(target: "vacuum", ops = plan.ops.len(), "Dry run; not submitting");
            return Ok(summary);
        }

        if cancel.is_cancelled() {
            return Err(VacuumError::Cancelled);
        }

        let receipt = self.gateway.submit(&plan.ops, self.settings.gas_budget).await?;
        ctx.stage = RunStage::Submitted;
        tracing::info!(target: "vacuum", digest = %receipt.digest, "Batch submitted; awaiting finality");

        let finalized = self.gateway.await_finality(&receipt.digest).await?;
        summary.digest = Some(finalized.digest.clone());
        // Ledgers report the canonical zero-padded owner form; compare
        // addresses normalized so a short-form config still gets credited.
        let owner = normalize_address(&ctx.owner).unwrap_or_else(|| ctx.owner.clone());
        summary.total_output_received = finalized
            .balance_changes
            .iter()
            .filter(|c| {
                normalize_address(&c.owner).unwrap_or_else(|| c.owner.clone()) == owner
                    && c.asset == ctx.target_asset
                    && c.amount > 0
            })
            .map(|c| c.amount as u64)
            .sum();

        tracing::info!(
            target: "vacuum",
            digest = %finalized.digest,
            swapped = summary.swapped.len(),
            burned = summary.burned.len(),
            donated = summary.donated.len(),
            output = summary.total_output_received,
            "Run complete"
        );
        Ok(summary)
    }
}
