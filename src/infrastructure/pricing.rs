// SPDX-License-Identifier: MIT

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use reqwest::Client;
use serde_json::Value;
use tokio::sync::RwLock;
use url::Url;

use crate::domain::error::VacuumError;
use crate::domain::types::AssetId;

const CACHE_TTL: Duration = Duration::from_secs(60);

/// Market-price lookups for valuation display and dust classification.
///
/// Prices here are advisory: they drive the caller-supplied USD figures
/// that PriceValidationGuard later bounds, they are never authoritative.
#[derive(Clone)]
pub struct PriceFeed {
    client: Client,
    endpoint: Url,
    cache: Arc<RwLock<HashMap<AssetId, (f64, Instant)>>>,
}

impl PriceFeed {
    pub fn new(price_api_url: &str) -> Result<Self, VacuumError> {
        let endpoint = Url::parse(price_api_url)
            .map_err(|e| VacuumError::Config(format!("Invalid price API URL: {e}")))?;
        let client = Client::builder()
            .timeout(Duration::from_secs(5))
            .build()
            .map_err(|e| VacuumError::Connection(e.to_string()))?;
        Ok(Self {
            client,
            endpoint,
            cache: Arc::new(RwLock::new(HashMap::new())),
        })
    }

    /// USD price for one asset, 0.0 when the asset is unquoted. Lookup
    /// failures are soft: an unpriced dust token is still dust.
    pub async fn price_usd(&self, asset: &AssetId) -> f64 {
        if let Some(price) = self.cached(asset).await {
            return price;
        }

        let mut url = self.endpoint.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.push(asset.as_str());
        }

        let price = match self.client.get(url).send().await {
            Ok(resp) if resp.status().is_success() => resp
                .json::<Value>()
                .await
                .ok()
                .and_then(|v| extract_pair_price(&v))
                .unwrap_or(0.0),
            Ok(resp) => {
                tracing::debug!(target: "pricing", asset = %asset, status = resp.status().as_u16(), "Price lookup rejected");
                0.0
            }
            Err(e) => {
                tracing::debug!(target: "pricing", asset = %asset, error = %e, "Price lookup failed");
                0.0
            }
        };

        if price > 0.0 {
            self.cache
                .write()
                .await
                .insert(asset.clone(), (price, Instant::now()));
        }
        price
    }

    async fn cached(&self, asset: &AssetId) -> Option<f64> {
        let cache = self.cache.read().await;
        let (price, stored_at) = cache.get(asset)?;
        if stored_at.elapsed() < CACHE_TTL {
            Some(*price)
        } else {
            None
        }
    }
}

fn extract_pair_price(payload: &Value) -> Option<f64> {
    let pairs = payload.get("pairs")?.as_array()?;
    let first = pairs.first()?;
    match first.get("priceUsd")? {
        Value::String(s) => s.parse::<f64>().ok().filter(|p| *p > 0.0),
        Value::Number(n) => n.as_f64().filter(|p| *p > 0.0),
        _ => None,
    }
}
