// SPDX-License-Identifier: MIT

use crate::domain::error::VacuumError;
use crate::domain::types::AssetId;
use crate::infrastructure::ledger::{AssetLedgerGateway, ConsolidatedHandle};

/// Enumerates every fund-unit of an asset and folds them into one
/// spendable handle.
///
/// The listing must be walked to the last page: a first-page sum
/// understates the true balance and breaks the "balance becomes zero"
/// guarantee. The returned quantity is authoritative as of enumeration
/// time; staleness between enumeration and submission is an accepted,
/// bounded risk and is not retried here.
///
/// Returns `None` when the owner holds no units of the asset, which
/// makes burn-with-nothing-to-burn a no-op instead of an error.
pub async fn consolidate<G: AssetLedgerGateway>(
    gateway: &G,
    owner: &str,
    asset: &AssetId,
) -> Result<Option<ConsolidatedHandle>, VacuumError> {
    let mut units = Vec::new();
    let mut cursor: Option<String> = None;

    loop {
        let page = gateway
            .list_fund_units(owner, asset, cursor.as_deref())
            .await
            .map_err(|e| VacuumError::BalanceListing {
                asset: asset.clone(),
                reason: e.to_string(),
            })?;
        units.extend(page.units);
        match page.next_cursor {
            Some(next) => cursor = Some(next),
            None => break,
        }
    }

    let quantity: u64 = units.iter().map(|u| u.quantity).sum();
    if units.is_empty() || quantity == 0 {
        return Ok(None);
    }

    let mut ids = units.into_iter().map(|u| u.object_id);
    let Some(primary) = ids.next() else {
        return Ok(None);
    };
    let merged: Vec<String> = ids.collect();

    tracing::debug!(
        target: "consolidate",
        asset = %asset,
        unit_count = merged.len() + 1,
        quantity,
        "Consolidated fund-units"
    );

    Ok(Some(ConsolidatedHandle {
        asset: asset.clone(),
        primary,
        merged,
        quantity,
    }))
}
