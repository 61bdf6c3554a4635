// SPDX-License-Identifier: MIT

use serde::{Deserialize, Serialize};

use crate::common::parsing::normalize_asset_tag;

/// Canonical asset identifier. Constructed only through normalization so
/// equality is meaningful regardless of how the tag was written upstream.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AssetId(String);

impl AssetId {
    pub fn parse(raw: &str) -> Option<Self> {
        normalize_asset_tag(raw).map(AssetId)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for AssetId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// What happens to an asset in a run. Swap is the default for anything
/// with liquidity; burn and donate are the route-less fallbacks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisposalAction {
    Swap,
    Burn,
    Donate,
}

/// One refreshed wallet balance. Never persisted; rebuilt per refresh.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetBalance {
    pub asset: AssetId,
    pub symbol: String,
    pub name: String,
    pub decimals: u8,
    /// Total quantity in smallest units, summed across all fund-units.
    pub quantity: u64,
    pub price_usd: f64,
    pub usd_value: f64,
    pub is_dust: bool,
    pub selected: bool,
    pub disposal: DisposalAction,
}

impl AssetBalance {
    /// Threshold-relative dust test. A positive balance with no price
    /// data counts as dust: those are exactly the tokens nobody quotes.
    pub fn dust_flag(usd_value: f64, price_usd: f64, quantity: u64, threshold_usd: f64) -> bool {
        if quantity == 0 {
            return false;
        }
        if usd_value > 0.0 {
            usd_value < threshold_usd
        } else {
            price_usd == 0.0
        }
    }
}

/// One hop through a liquidity pool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteStep {
    pub pool_id: String,
    /// Swap direction within the pool's (asset_a, asset_b) pair.
    pub a_to_b: bool,
    pub asset_a: AssetId,
    pub asset_b: AssetId,
}

impl RouteStep {
    pub fn input_asset(&self) -> &AssetId {
        if self.a_to_b { &self.asset_a } else { &self.asset_b }
    }

    pub fn output_asset(&self) -> &AssetId {
        if self.a_to_b { &self.asset_b } else { &self.asset_a }
    }
}

/// A resolved conversion path. Ephemeral: recomputed every run, never
/// cached, because quotes go stale faster than runs recur.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Route {
    pub from: AssetId,
    pub to: AssetId,
    pub amount_in: u64,
    pub amount_out: u64,
    pub price_impact: Option<f64>,
    pub steps: Vec<RouteStep>,
}

impl Route {
    /// Builds a route only if the steps form a connected path from
    /// `from` to `to`. Empty steps is "no route", not a zero-hop route.
    pub fn try_new(
        from: AssetId,
        to: AssetId,
        amount_in: u64,
        amount_out: u64,
        price_impact: Option<f64>,
        steps: Vec<RouteStep>,
    ) -> Option<Self> {
        if steps.is_empty() {
            return None;
        }
        if !Self::is_continuous(&from, &to, &steps) {
            return None;
        }
        Some(Self {
            from,
            to,
            amount_in,
            amount_out,
            price_impact,
            steps,
        })
    }

    /// Each step's output must feed the next step's input, and the ends
    /// must match the route's declared endpoints.
    pub fn is_continuous(from: &AssetId, to: &AssetId, steps: &[RouteStep]) -> bool {
        let Some(first) = steps.first() else {
            return false;
        };
        let Some(last) = steps.last() else {
            return false;
        };
        if first.input_asset() != from || last.output_asset() != to {
            return false;
        }
        for window in steps.windows(2) {
            if let [a, b] = window
                && a.output_asset() != b.input_asset()
            {
                return false;
            }
        }
        true
    }
}

/// Per-asset outcome in a finished run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetOutcome {
    pub asset: AssetId,
    pub symbol: String,
    pub action: DisposalAction,
    pub input_quantity: u64,
    pub estimated_out: u64,
    pub usd_value: f64,
}

/// Itemized result of one vacuum run. Either a full success with
/// per-asset outcomes or the run failed before any ledger mutation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunSummary {
    pub digest: Option<String>,
    pub swapped: Vec<AssetOutcome>,
    pub burned: Vec<AssetOutcome>,
    pub donated: Vec<AssetOutcome>,
    /// Assets dropped from the run with the stage-local reason.
    pub failed_assets: Vec<(AssetId, String)>,
    /// Reference-asset units actually received, from balance changes.
    pub total_output_received: u64,
    pub total_value_usd: f64,
}

impl RunSummary {
    pub fn planned_count(&self) -> usize {
        self.swapped.len() + self.burned.len() + self.donated.len()
    }
}
