// SPDX-License-Identifier: MIT

use crate::common::constants::REFERENCE_ASSET_TAG;
use crate::domain::error::VacuumError;
use crate::domain::types::{AssetBalance, AssetId, DisposalAction};
use crate::infrastructure::ledger::AssetLedgerGateway;
use crate::infrastructure::pricing::PriceFeed;

/// Refresh the owner's balances and classify each against the dust
/// threshold. Dust assets come back pre-selected; nothing is cached.
pub async fn refresh_balances<G: AssetLedgerGateway>(
    gateway: &G,
    prices: &PriceFeed,
    owner: &str,
    threshold_usd: f64,
) -> Result<Vec<AssetBalance>, VacuumError> {
    let owned = gateway.list_balances(owner).await?;

    let mut balances = Vec::with_capacity(owned.len());
    for entry in owned {
        if entry.total == 0 {
            continue;
        }
        let price_usd = prices.price_usd(&entry.asset).await;
        let usd_value = price_usd * entry.total as f64 / 10f64.powi(entry.decimals as i32);
        let is_dust = AssetBalance::dust_flag(usd_value, price_usd, entry.total, threshold_usd);
        balances.push(AssetBalance {
            asset: entry.asset,
            symbol: entry.symbol,
            name: entry.name,
            decimals: entry.decimals,
            quantity: entry.total,
            price_usd,
            usd_value,
            is_dust,
            selected: is_dust,
            disposal: DisposalAction::Swap,
        });
    }

    let reference = AssetId::parse(REFERENCE_ASSET_TAG)
        .ok_or_else(|| VacuumError::Config("reference asset tag failed to normalize".into()))?;
    sort_for_display(&mut balances, &reference);
    tracing::debug!(
        target: "vacuum",
        total = balances.len(),
        dust = balances.iter().filter(|b| b.is_dust).count(),
        "Balances refreshed"
    );
    Ok(balances)
}

/// Reference asset pinned first, then dust ascending by USD value, then
/// the rest descending. Matches the order a holder reviews them in.
pub fn sort_for_display(balances: &mut [AssetBalance], reference: &AssetId) {
    balances.sort_by(|a, b| {
        let a_ref = &a.asset == reference;
        let b_ref = &b.asset == reference;
        b_ref
            .cmp(&a_ref)
            .then(b.is_dust.cmp(&a.is_dust))
            .then_with(|| {
                if a.is_dust && b.is_dust {
                    a.usd_value.total_cmp(&b.usd_value)
                } else {
                    b.usd_value.total_cmp(&a.usd_value)
                }
            })
    });
}

/// The subset a run actually operates on: selected, non-reference.
pub fn selected_dust(balances: &[AssetBalance], target: &AssetId) -> Vec<AssetBalance> {
    balances
        .iter()
        .filter(|b| b.selected && &b.asset != target)
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn balance(tag: &str, usd: f64, dust: bool) -> AssetBalance {
        AssetBalance {
            asset: AssetId::parse(tag).unwrap(),
            symbol: "T".into(),
            name: "Token".into(),
            decimals: 9,
            quantity: 1_000,
            price_usd: 1.0,
            usd_value: usd,
            is_dust: dust,
            selected: dust,
            disposal: DisposalAction::Swap,
        }
    }

    #[test]
    fn reference_asset_sorts_first_then_dust_ascending() {
        let reference = AssetId::parse(REFERENCE_ASSET_TAG).unwrap();
        let mut balances = vec![
            balance("0xa::a::A", 0.50, true),
            balance("0xb::b::B", 42.0, false),
            balance(REFERENCE_ASSET_TAG, 10.0, false),
            balance("0xc::c::C", 0.05, true),
        ];
        sort_for_display(&mut balances, &reference);

        assert_eq!(balances[0].asset, reference);
        // Dust ascending by value, then non-dust.
        assert!(balances[1].is_dust && balances[2].is_dust);
        assert!(balances[1].usd_value <= balances[2].usd_value);
        assert!(!balances[3].is_dust);
    }

    #[test]
    fn selection_excludes_reference_asset_even_if_selected() {
        let target = AssetId::parse(REFERENCE_ASSET_TAG).unwrap();
        let mut reference = balance(REFERENCE_ASSET_TAG, 0.10, true);
        reference.selected = true;
        let balances = vec![reference, balance("0xa::a::A", 0.50, true)];

        let picked = selected_dust(&balances, &target);
        assert_eq!(picked.len(), 1);
        assert_eq!(picked[0].asset, AssetId::parse("0xa::a::A").unwrap());
    }
}
