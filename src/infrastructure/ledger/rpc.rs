// SPDX-License-Identifier: MIT

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use reqwest::Client;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tokio::time::sleep;
use url::Url;

use crate::common::retry::retry_async;
use crate::domain::error::VacuumError;
use crate::domain::types::AssetId;
use crate::infrastructure::ledger::{
    AssetLedgerGateway, FinalizedExecution, FundUnitPage, LedgerOp, OwnedBalance, SubmitReceipt,
    VaultProjection,
};

/// JSON-RPC gateway to a full node. The node applies a submitted batch
/// atomically; this client never retries a submission on its own.
pub struct RpcLedgerGateway {
    client: Client,
    endpoint: Url,
    request_id: AtomicU64,
    finality_poll: Duration,
    finality_timeout: Duration,
}

impl RpcLedgerGateway {
    pub fn new(
        rpc_url: &str,
        finality_poll_ms: u64,
        finality_timeout_ms: u64,
    ) -> Result<Self, VacuumError> {
        let endpoint = Url::parse(rpc_url)
            .map_err(|e| VacuumError::Config(format!("Invalid ledger RPC URL: {e}")))?;
        let client = Client::builder()
            .timeout(Duration::from_secs(15))
            .build()
            .map_err(|e| VacuumError::Connection(e.to_string()))?;
        Ok(Self {
            client,
            endpoint,
            request_id: AtomicU64::new(1),
            finality_poll: Duration::from_millis(finality_poll_ms.max(50)),
            finality_timeout: Duration::from_millis(finality_timeout_ms),
        })
    }

    async fn call<T: DeserializeOwned>(&self, method: &str, params: Value) -> Result<T, VacuumError> {
        let id = self.request_id.fetch_add(1, Ordering::Relaxed);
        let body = json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": method,
            "params": params,
        });

        let response = self
            .client
            .post(self.endpoint.clone())
            .json(&body)
            .send()
            .await
            .map_err(|e| VacuumError::Connection(format!("{method}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(VacuumError::ApiCall {
                provider: "ledger".into(),
                status: status.as_u16(),
            });
        }

        let envelope: Value = response
            .json()
            .await
            .map_err(|e| VacuumError::Connection(format!("{method}: invalid JSON: {e}")))?;

        if let Some(err) = envelope.get("error") {
            let message = err
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("unknown RPC error");
            return Err(VacuumError::LedgerExecution {
                digest: None,
                reason: format!("{method}: {message}"),
            });
        }

        let result = envelope
            .get("result")
            .cloned()
            .ok_or_else(|| VacuumError::Connection(format!("{method}: missing result")))?;
        serde_json::from_value(result)
            .map_err(|e| VacuumError::Connection(format!("{method}: malformed result: {e}")))
    }

    /// Reads are idempotent, so transient failures get retried with
    /// backoff. Submissions never come through here.
    async fn read<T: DeserializeOwned>(&self, method: &str, params: Value) -> Result<T, VacuumError> {
        retry_async(
            |attempt| {
                if attempt > 1 {
                    tracing::debug!(target: "ledger", method, attempt, "Retrying read call");
                }
                self.call(method, params.clone())
            },
            3,
            Duration::from_millis(200),
        )
        .await
    }
}

impl AssetLedgerGateway for RpcLedgerGateway {
    async fn list_balances(&self, owner: &str) -> Result<Vec<OwnedBalance>, VacuumError> {
        self.read("ledger_getAllBalances", json!([owner])).await
    }

    async fn list_fund_units(
        &self,
        owner: &str,
        asset: &AssetId,
        cursor: Option<&str>,
    ) -> Result<FundUnitPage, VacuumError> {
        // Listing failures abort the asset, not the run; the caller maps
        // this into a per-asset error and moves on.
        self.read(
            "ledger_getFundUnits",
            json!([owner, asset.as_str(), cursor]),
        )
        .await
    }

    async fn submit(&self, ops: &[LedgerOp], gas_budget: u64) -> Result<SubmitReceipt, VacuumError> {
        tracing::info!(target: "ledger", op_count = ops.len(), gas_budget, "Submitting atomic batch");
        self.call("ledger_submitBatch", json!([ops, gas_budget])).await
    }

    async fn await_finality(&self, digest: &str) -> Result<FinalizedExecution, VacuumError> {
        let deadline = tokio::time::Instant::now() + self.finality_timeout;
        loop {
            let status: Option<FinalizedExecution> = self
                .read("ledger_getExecutionStatus", json!([digest]))
                .await?;
            if let Some(finalized) = status {
                if !finalized.success {
                    return Err(VacuumError::LedgerExecution {
                        digest: Some(digest.to_string()),
                        reason: "batch rolled back by ledger".into(),
                    });
                }
                return Ok(finalized);
            }
            if tokio::time::Instant::now() >= deadline {
                return Err(VacuumError::LedgerExecution {
                    digest: Some(digest.to_string()),
                    reason: "finality wait timed out".into(),
                });
            }
            sleep(self.finality_poll).await;
        }
    }

    async fn vault_state(&self, vault: &str) -> Result<VaultProjection, VacuumError> {
        self.read("vault_getState", json!([vault])).await
    }
}
