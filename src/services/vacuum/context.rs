// SPDX-License-Identifier: MIT

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::types::{AssetBalance, AssetId, DisposalAction, Route};
use crate::infrastructure::ledger::ConsolidatedHandle;
use crate::services::vacuum::classify::FallbackClassifier;

/// Where a run currently sits. Stages only move forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunStage {
    Draft,
    Prepared,
    Submitted,
}

/// Everything one vacuum run carries between stages: selected assets,
/// consolidated handles, resolved routes, and disposal decisions.
///
/// The context is owned by the caller and serializable, so a half-built
/// run can be inspected (or shown for confirmation) without any state
/// hiding inside the orchestrator. Nothing here is shared across runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunContext {
    pub owner: String,
    pub target_asset: AssetId,
    pub selected: Vec<AssetBalance>,
    pub handles: BTreeMap<AssetId, ConsolidatedHandle>,
    pub routes: BTreeMap<AssetId, Route>,
    pub classifier: FallbackClassifier,
    /// Per-asset failures absorbed during preparation.
    pub failed: Vec<(AssetId, String)>,
    pub stage: RunStage,
}

impl RunContext {
    pub fn new(owner: String, target_asset: AssetId, selected: Vec<AssetBalance>) -> Self {
        Self {
            owner,
            target_asset,
            selected,
            handles: BTreeMap::new(),
            routes: BTreeMap::new(),
            classifier: FallbackClassifier::default(),
            failed: Vec::new(),
            stage: RunStage::Draft,
        }
    }

    pub fn balance_of(&self, asset: &AssetId) -> Option<&AssetBalance> {
        self.selected.iter().find(|b| &b.asset == asset)
    }

    /// Disposal preview for the confirmation gate: the exact assets and
    /// values the user must acknowledge before anything is destroyed.
    pub fn disposal_preview(&self) -> Vec<(AssetId, DisposalAction, f64)> {
        self.classifier
            .preview()
            .into_iter()
            .map(|(asset, action)| {
                let usd = self.balance_of(&asset).map(|b| b.usd_value).unwrap_or(0.0);
                (asset, action, usd)
            })
            .collect()
    }

    /// Confirm the previewed disposals; burns stay inert without this.
    pub fn confirm_disposals(&mut self) -> Result<(), crate::domain::error::VacuumError> {
        self.classifier.commit_all()
    }
}
