// SPDX-License-Identifier: MIT

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use url::Url;

use crate::common::parsing::parse_u64_amount;
use crate::domain::error::VacuumError;
use crate::domain::types::{AssetId, Route, RouteStep};

/// Anything that can answer "how do I turn `from` into `to`". The
/// orchestrator is generic over this so runs can be driven by the live
/// aggregator or a canned source in tests.
pub trait RouteSource: Send + Sync {
    fn resolve(
        &self,
        from: &AssetId,
        to: &AssetId,
        amount_in: u64,
    ) -> impl std::future::Future<Output = Result<Option<Route>, VacuumError>> + Send;
}

/// Resolves swap routes against an external aggregator service.
///
/// The provider's response schema drifts across versions, so everything
/// coming back passes through one strict adapter; any shape the adapter
/// does not recognize is treated as "no route", never as a crash.
pub struct RouteResolver {
    client: Client,
    endpoint: Url,
}

impl RouteSource for RouteResolver {
    async fn resolve(
        &self,
        from: &AssetId,
        to: &AssetId,
        amount_in: u64,
    ) -> Result<Option<Route>, VacuumError> {
        RouteResolver::resolve(self, from, to, amount_in).await
    }
}

impl RouteResolver {
    pub fn new(aggregator_url: &str) -> Result<Self, VacuumError> {
        let endpoint = Url::parse(aggregator_url)
            .map_err(|e| VacuumError::Config(format!("Invalid aggregator URL: {e}")))?;
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| VacuumError::Connection(e.to_string()))?;
        Ok(Self { client, endpoint })
    }

    /// Pure query; `Ok(None)` covers both "no liquidity" and degraded
    /// network conditions. The two cases differ only in the logs.
    pub async fn resolve(
        &self,
        from: &AssetId,
        to: &AssetId,
        amount_in: u64,
    ) -> Result<Option<Route>, VacuumError> {
        if amount_in == 0 {
            // Empty balance: no point spending an aggregator request.
            return Ok(None);
        }

        let mut url = self.endpoint.clone();
        url.query_pairs_mut()
            .append_pair("from", from.as_str())
            .append_pair("target", to.as_str())
            .append_pair("amount", &amount_in.to_string())
            .append_pair("by_amount_in", "true");

        let response = match self.client.get(url).send().await {
            Ok(r) => r,
            Err(e) => {
                tracing::warn!(target: "aggregator", asset = %from, error = %e, "Route query transport failure; degrading to no-route");
                return Ok(None);
            }
        };

        if !response.status().is_success() {
            tracing::warn!(target: "aggregator", asset = %from, status = response.status().as_u16(), "Route query rejected; degrading to no-route");
            return Ok(None);
        }

        let payload: Value = match response.json().await {
            Ok(v) => v,
            Err(e) => {
                tracing::warn!(target: "aggregator", asset = %from, error = %e, "Route response was not JSON; degrading to no-route");
                return Ok(None);
            }
        };

        let route = normalize_route_payload(&payload, from, to, amount_in);
        if route.is_none() {
            tracing::debug!(target: "aggregator", asset = %from, "No usable route in aggregator response");
        }
        Ok(route)
    }
}

/// Raw quote shape, covering the field-name variants seen across
/// aggregator versions. Unrecognized layouts fail deserialization and
/// the caller reads that as no-route.
#[derive(Debug, Deserialize)]
struct RawQuote {
    #[serde(default, alias = "amountOut", deserialize_with = "amount_field")]
    amount_out: Option<u64>,
    #[serde(default, alias = "priceImpact")]
    price_impact: Option<f64>,
    #[serde(default, alias = "path")]
    routes: Vec<RawStep>,
}

#[derive(Debug, Deserialize)]
struct RawStep {
    #[serde(default, alias = "poolAddress", alias = "pool")]
    pool_id: Option<String>,
    #[serde(default = "default_true", alias = "a2b", alias = "a_to_b")]
    a_to_b: bool,
    #[serde(default, alias = "coinTypeA", alias = "tokenA")]
    coin_type_a: Option<String>,
    #[serde(default, alias = "coinTypeB", alias = "tokenB")]
    coin_type_b: Option<String>,
}

fn default_true() -> bool {
    true
}

/// Amounts arrive as JSON strings or bare numbers depending on provider.
fn amount_field<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::String(s) => parse_u64_amount(&s),
        Value::Number(n) => n.as_u64(),
        _ => None,
    })
}

/// Normalize an aggregator payload into the canonical [`Route`].
///
/// Fails closed: missing amounts, empty or discontinuous step lists, and
/// asset tags that do not normalize all yield `None`.
pub fn normalize_route_payload(
    payload: &Value,
    from: &AssetId,
    to: &AssetId,
    amount_in: u64,
) -> Option<Route> {
    // The quote may sit at the top level or under result/data.
    let body = payload
        .get("result")
        .or_else(|| payload.get("data"))
        .unwrap_or(payload);

    let raw: RawQuote = serde_json::from_value(body.clone()).ok()?;
    let amount_out = raw.amount_out?;
    if amount_out == 0 || raw.routes.is_empty() {
        return None;
    }

    let mut steps = Vec::with_capacity(raw.routes.len());
    for raw_step in raw.routes {
        let pool_id = raw_step.pool_id.filter(|p| !p.is_empty())?;
        let asset_a = AssetId::parse(&raw_step.coin_type_a?)?;
        let asset_b = AssetId::parse(&raw_step.coin_type_b?)?;
        steps.push(RouteStep {
            pool_id,
            a_to_b: raw_step.a_to_b,
            asset_a,
            asset_b,
        });
    }

    Route::try_new(
        from.clone(),
        to.clone(),
        amount_in,
        amount_out,
        raw.price_impact,
        steps,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn from_asset() -> AssetId {
        AssetId::parse("0xa::dust::DUST").unwrap()
    }

    fn to_asset() -> AssetId {
        AssetId::parse("0x2::sui::SUI").unwrap()
    }

    #[test]
    fn snake_case_payload_normalizes() {
        let payload = json!({
            "result": {
                "amount_in": "1000000",
                "amount_out": "2000000",
                "price_impact": 0.12,
                "routes": [{
                    "pool_id": "0xpool1",
                    "a_to_b": true,
                    "coin_type_a": "0xa::dust::DUST",
                    "coin_type_b": "0x2::sui::SUI",
                }],
            }
        });
        let route =
            normalize_route_payload(&payload, &from_asset(), &to_asset(), 1_000_000).unwrap();
        assert_eq!(route.amount_out, 2_000_000);
        assert_eq!(route.steps.len(), 1);
        assert_eq!(route.price_impact, Some(0.12));
    }

    #[test]
    fn camel_case_payload_normalizes_to_same_route() {
        let snake = json!({
            "data": {
                "amount_out": 2_000_000u64,
                "routes": [{
                    "pool_id": "0xpool1",
                    "a2b": true,
                    "coin_type_a": "0xa::dust::DUST",
                    "coin_type_b": "0x2::sui::SUI",
                }],
            }
        });
        let camel = json!({
            "data": {
                "amountOut": "2000000",
                "path": [{
                    "poolAddress": "0xpool1",
                    "coinTypeA": "0xA::dust::DUST",
                    "coinTypeB": "0x2::sui::SUI",
                }],
            }
        });
        let a = normalize_route_payload(&snake, &from_asset(), &to_asset(), 5).unwrap();
        let b = normalize_route_payload(&camel, &from_asset(), &to_asset(), 5).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn junk_shapes_fail_closed() {
        for payload in [
            json!({}),
            json!({"result": {"amount_out": "2000000", "routes": []}}),
            json!({"result": {"routes": [{"pool_id": "0xp"}]}}),
            json!({"result": {"amount_out": "0", "routes": [{"pool_id": "0xp"}]}}),
            json!("not an object"),
            json!({"result": {"amount_out": "10", "routes": [{
                "pool_id": "",
                "coin_type_a": "0xa::dust::DUST",
                "coin_type_b": "0x2::sui::SUI",
            }]}}),
        ] {
            assert!(
                normalize_route_payload(&payload, &from_asset(), &to_asset(), 5).is_none(),
                "expected fail-closed for {payload}"
            );
        }
    }

    #[test]
    fn discontinuous_steps_are_no_route() {
        let payload = json!({
            "result": {
                "amount_out": "10",
                "routes": [{
                    "pool_id": "0xpool1",
                    "a_to_b": true,
                    "coin_type_a": "0xother::x::X",
                    "coin_type_b": "0x2::sui::SUI",
                }],
            }
        });
        assert!(normalize_route_payload(&payload, &from_asset(), &to_asset(), 5).is_none());
    }

    #[tokio::test]
    async fn zero_amount_short_circuits_without_network() {
        // Unroutable endpoint: any network attempt would error, and a
        // transport error degrades to None anyway, so assert via the
        // instant return instead.
        let resolver = RouteResolver::new("http://127.0.0.1:1/find_routes").unwrap();
        let started = std::time::Instant::now();
        let route = resolver
            .resolve(&from_asset(), &to_asset(), 0)
            .await
            .unwrap();
        assert!(route.is_none());
        assert!(started.elapsed() < Duration::from_millis(50));
    }
}
