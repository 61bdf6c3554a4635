// SPDX-License-Identifier: MIT

use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use config::{Config, Environment, File};
use serde::Deserialize;

use crate::common::constants::{
    DEFAULT_DUST_THRESHOLD_USD, DEFAULT_GAS_BUDGET, DEFAULT_ROUTE_CALL_DELAY_MS,
    DEFAULT_ROUTE_CONCURRENCY, DEFAULT_SLIPPAGE_BPS, MAX_DUST_VALUE_USD, MIN_DUST_VALUE_USD,
    REFERENCE_ASSET_TAG,
};
use crate::common::parsing::normalize_address;
use crate::domain::error::VacuumError;
use crate::domain::types::AssetId;

#[derive(Debug, Deserialize, Clone)]
pub struct GlobalSettings {
    // Identity
    pub owner_address: String,

    // Endpoints
    pub rpc_url: String,
    pub aggregator_url: String,
    pub price_api_url: String,

    // Run parameters
    #[serde(default = "default_target_asset")]
    pub target_asset: String,
    #[serde(default = "default_dust_threshold")]
    pub dust_threshold_usd: f64,
    #[serde(default = "default_slippage_bps")]
    pub slippage_bps: u64,
    #[serde(default = "default_route_concurrency")]
    pub max_route_concurrency: usize,
    #[serde(default = "default_route_call_delay_ms")]
    pub route_call_delay_ms: u64,
    #[serde(default = "default_min_dust_value")]
    pub min_dust_value_usd: f64,
    #[serde(default = "default_max_dust_value")]
    pub max_dust_value_usd: f64,
    #[serde(default = "default_gas_budget")]
    pub gas_budget: u64,

    // Finality polling
    #[serde(default = "default_finality_poll_ms")]
    pub finality_poll_ms: u64,
    #[serde(default = "default_finality_timeout_ms")]
    pub finality_timeout_ms: u64,

    // Pooled vault (optional; donations need all three)
    pub vault_id: Option<String>,
    pub admin_cap_id: Option<String>,
    /// Asset tag -> per-asset sub-vault object id.
    pub asset_vaults: Option<HashMap<String, String>>,

    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default = "default_false")]
    pub log_json: bool,
}

// Defaults
fn default_target_asset() -> String {
    REFERENCE_ASSET_TAG.to_string()
}
fn default_dust_threshold() -> f64 {
    DEFAULT_DUST_THRESHOLD_USD
}
fn default_slippage_bps() -> u64 {
    DEFAULT_SLIPPAGE_BPS
}
fn default_route_concurrency() -> usize {
    DEFAULT_ROUTE_CONCURRENCY
}
fn default_route_call_delay_ms() -> u64 {
    DEFAULT_ROUTE_CALL_DELAY_MS
}
fn default_min_dust_value() -> f64 {
    MIN_DUST_VALUE_USD
}
fn default_max_dust_value() -> f64 {
    MAX_DUST_VALUE_USD
}
fn default_gas_budget() -> u64 {
    DEFAULT_GAS_BUDGET
}
fn default_finality_poll_ms() -> u64 {
    500
}
fn default_finality_timeout_ms() -> u64 {
    60_000
}
fn default_log_level() -> String {
    "info".to_string()
}
fn default_false() -> bool {
    false
}

impl GlobalSettings {
    pub fn load_with_path(path: Option<&str>) -> Result<Self, VacuumError> {
        // Load .env file if it exists
        dotenvy::dotenv().ok();

        let mut builder = Config::builder();
        if let Some(selected_path) = path {
            builder = builder.add_source(File::from(Path::new(selected_path)).required(true));
        } else {
            builder = builder.add_source(File::with_name("config").required(false));
        }
        // Deterministic precedence: CLI (in main) > env/.env > profile file.
        builder = builder.add_source(Environment::with_prefix("DUSTVAC"));

        let mut settings: GlobalSettings = builder.build()?.try_deserialize()?;
        settings.validate()?;
        // Carry the canonical form forward so address comparisons against
        // ledger-reported owners hold regardless of how it was written.
        if let Some(canonical) = normalize_address(&settings.owner_address) {
            settings.owner_address = canonical;
        }
        Ok(settings)
    }

    pub fn load() -> Result<Self, VacuumError> {
        Self::load_with_path(None)
    }

    fn validate(&self) -> Result<(), VacuumError> {
        if self.owner_address.trim().is_empty() {
            return Err(VacuumError::Config("owner_address is missing".to_string()));
        }
        normalize_address(&self.owner_address).ok_or_else(|| {
            VacuumError::Config(format!(
                "owner_address is not a valid address: {}",
                self.owner_address
            ))
        })?;
        if self.rpc_url.trim().is_empty() {
            return Err(VacuumError::Config("rpc_url is missing".to_string()));
        }
        if self.slippage_bps >= 10_000 {
            return Err(VacuumError::Config(
                "slippage_bps must be below 10000".to_string(),
            ));
        }
        if self.min_dust_value_usd >= self.max_dust_value_usd {
            return Err(VacuumError::Config(
                "min_dust_value_usd must be below max_dust_value_usd".to_string(),
            ));
        }
        AssetId::parse(&self.target_asset).ok_or_else(|| {
            VacuumError::Config(format!("target_asset is not a valid tag: {}", self.target_asset))
        })?;
        Ok(())
    }

    pub fn target_asset(&self) -> Result<AssetId, VacuumError> {
        AssetId::parse(&self.target_asset).ok_or_else(|| {
            VacuumError::Config(format!("target_asset is not a valid tag: {}", self.target_asset))
        })
    }

    pub fn route_call_delay(&self) -> Duration {
        Duration::from_millis(self.route_call_delay_ms)
    }

    /// Normalized asset-vault map; malformed tags are rejected rather
    /// than silently skipped so a typo cannot strand a donation.
    pub fn asset_vaults(&self) -> Result<HashMap<AssetId, String>, VacuumError> {
        let mut resolved = HashMap::new();
        if let Some(raw) = &self.asset_vaults {
            for (tag, object_id) in raw {
                let asset = AssetId::parse(tag).ok_or_else(|| {
                    VacuumError::Config(format!("asset_vaults key is not a valid tag: {tag}"))
                })?;
                resolved.insert(asset, object_id.clone());
            }
        }
        Ok(resolved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal() -> GlobalSettings {
        GlobalSettings {
            owner_address: "0xa11ce".into(),
            rpc_url: "http://localhost:9000".into(),
            aggregator_url: "http://localhost:9001/find_routes".into(),
            price_api_url: "http://localhost:9002/pairs".into(),
            target_asset: default_target_asset(),
            dust_threshold_usd: default_dust_threshold(),
            slippage_bps: default_slippage_bps(),
            max_route_concurrency: default_route_concurrency(),
            route_call_delay_ms: default_route_call_delay_ms(),
            min_dust_value_usd: default_min_dust_value(),
            max_dust_value_usd: default_max_dust_value(),
            gas_budget: default_gas_budget(),
            finality_poll_ms: default_finality_poll_ms(),
            finality_timeout_ms: default_finality_timeout_ms(),
            vault_id: None,
            admin_cap_id: None,
            asset_vaults: None,
            log_level: default_log_level(),
            log_json: false,
        }
    }

    #[test]
    fn defaults_pass_validation() {
        assert!(minimal().validate().is_ok());
        assert!(minimal().target_asset().is_ok());
    }

    #[test]
    fn out_of_range_slippage_and_inverted_bounds_are_rejected() {
        let mut settings = minimal();
        settings.slippage_bps = 10_000;
        assert!(settings.validate().is_err());

        let mut settings = minimal();
        settings.min_dust_value_usd = 200.0;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn asset_vault_map_normalizes_keys_and_rejects_typos() {
        let mut settings = minimal();
        settings.asset_vaults = Some(HashMap::from([(
            "0xA::dust::DUST".to_string(),
            "0xvaultobj".to_string(),
        )]));
        let resolved = settings.asset_vaults().unwrap();
        let key = AssetId::parse("0xa::dust::DUST").unwrap();
        assert_eq!(resolved.get(&key), Some(&"0xvaultobj".to_string()));

        settings.asset_vaults = Some(HashMap::from([(
            "not-a-tag".to_string(),
            "0xvaultobj".to_string(),
        )]));
        assert!(settings.asset_vaults().is_err());
    }
}
