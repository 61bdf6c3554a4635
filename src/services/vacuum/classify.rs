// SPDX-License-Identifier: MIT

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::error::VacuumError;
use crate::domain::types::{AssetId, DisposalAction};

/// Lifecycle of a route-less asset's disposal decision.
///
/// Burn destroys value irreversibly, so it can never be bundled into a
/// run silently: every disposal passes through `PendingConfirmation`
/// and only an explicit commit moves it onward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DisposalState {
    Unclassified,
    PendingConfirmation(DisposalAction),
    Committed(DisposalAction),
}

/// Assigns disposal actions to assets the resolver found no route for.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FallbackClassifier {
    entries: BTreeMap<AssetId, DisposalState>,
}

impl FallbackClassifier {
    /// Stage a route-less asset. Burn is the suggested default; donate
    /// is the caller's alternative. Swap is not a valid fallback.
    pub fn stage(&mut self, asset: AssetId, chosen: Option<DisposalAction>) -> Result<(), VacuumError> {
        let action = chosen.unwrap_or(DisposalAction::Burn);
        if action == DisposalAction::Swap {
            return Err(VacuumError::Validation {
                field: "disposal".into(),
                message: format!("{asset} has no route; swap is not a disposal fallback"),
            });
        }
        self.entries
            .insert(asset, DisposalState::PendingConfirmation(action));
        Ok(())
    }

    /// The exact set awaiting confirmation, for the preview step.
    pub fn preview(&self) -> Vec<(AssetId, DisposalAction)> {
        self.entries
            .iter()
            .filter_map(|(asset, state)| match state {
                DisposalState::PendingConfirmation(action) => Some((asset.clone(), *action)),
                _ => None,
            })
            .collect()
    }

    pub fn pending_burns(&self) -> usize {
        self.entries
            .values()
            .filter(|s| matches!(s, DisposalState::PendingConfirmation(DisposalAction::Burn)))
            .count()
    }

    pub fn has_pending(&self) -> bool {
        self.entries
            .values()
            .any(|s| matches!(s, DisposalState::PendingConfirmation(_)))
    }

    /// Commit the previewed set. Every named asset must currently be
    /// pending; anything else means the preview the user saw is stale.
    pub fn commit(&mut self, assets: &[AssetId]) -> Result<(), VacuumError> {
        for asset in assets {
            match self.entries.get(asset) {
                Some(DisposalState::PendingConfirmation(_)) => {}
                _ => {
                    return Err(VacuumError::Validation {
                        field: "disposal".into(),
                        message: format!("{asset} is not awaiting confirmation"),
                    });
                }
            }
        }
        for asset in assets {
            if let Some(state) = self.entries.get_mut(asset)
                && let DisposalState::PendingConfirmation(action) = *state
            {
                *state = DisposalState::Committed(action);
            }
        }
        Ok(())
    }

    /// Commit everything currently pending.
    pub fn commit_all(&mut self) -> Result<(), VacuumError> {
        let pending: Vec<AssetId> = self.preview().into_iter().map(|(a, _)| a).collect();
        self.commit(&pending)
    }

    /// Disposal actions that made it through confirmation.
    pub fn committed(&self) -> BTreeMap<AssetId, DisposalAction> {
        self.entries
            .iter()
            .filter_map(|(asset, state)| match state {
                DisposalState::Committed(action) => Some((asset.clone(), *action)),
                _ => None,
            })
            .collect()
    }

    pub fn state_of(&self, asset: &AssetId) -> DisposalState {
        self.entries
            .get(asset)
            .copied()
            .unwrap_or(DisposalState::Unclassified)
    }
}
