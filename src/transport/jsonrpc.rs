// JSON-RPC transport layer implementation
// This file implements the JSON-RPC client used for read-only venue calls
// (eth_call) and deployed-code checks (eth_getCode) against an EVM node
//
// Numan Thabit 2025 Nov

use crate::errors::RouterError;
use crate::metrics::VENUE_CALL_LATENCY;
use crate::venues::adapter::VenueClient;
use alloy_primitives::{Address, Bytes};
use backoff::{future::retry, ExponentialBackoff};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

#[derive(Debug, Clone)]
pub struct JsonRpc {
    http: Client,
    url: String,
    next_id: Arc<AtomicU64>,
    max_elapsed: Duration,
}

#[derive(Debug, Deserialize)]
struct RpcErrorBody {
    code: i64,
    message: String,
}

#[derive(Debug, Deserialize)]
struct RpcEnvelope<T> {
    result: Option<T>,
    error: Option<RpcErrorBody>,
}

impl<T> RpcEnvelope<T> {
    fn into_result(self, method: &str) -> Result<T, RouterError> {
        if let Some(err) = self.error {
            return Err(RouterError::Transport(format!(
                "{method}: rpc error {}: {}",
                err.code, err.message
            )));
        }
        self.result
            .ok_or_else(|| RouterError::Transport(format!("{method}: empty result")))
    }
}

impl JsonRpc {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, RouterError> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| RouterError::Transport(format!("build http client: {e}")))?;
        Ok(Self {
            http,
            url: url.into(),
            next_id: Arc::new(AtomicU64::new(1)),
            max_elapsed: Duration::from_secs(30),
        })
    }

    /// Cap on total time spent retrying one request.
    pub fn with_max_elapsed(mut self, max_elapsed: Duration) -> Self {
        self.max_elapsed = max_elapsed;
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.url
    }

    /// Send one request, retrying transport failures with backoff. Errors the
    /// node reports (reverts, bad params) are returned without retrying.
    pub async fn request<T: DeserializeOwned>(
        &self,
        method: &'static str,
        params: Value,
    ) -> Result<T, RouterError> {
        let backoff = ExponentialBackoff {
            initial_interval: Duration::from_millis(100),
            max_interval: Duration::from_secs(5),
            max_elapsed_time: Some(self.max_elapsed),
            multiplier: 2.0,
            ..Default::default()
        };
        let timer = VENUE_CALL_LATENCY.with_label_values(&[method]).start_timer();
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let payload = json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": method,
            "params": params,
        });

        let result = retry(backoff, || {
            let payload = payload.clone();
            async move {
                let resp = self
                    .http
                    .post(&self.url)
                    .json(&payload)
                    .send()
                    .await
                    .map_err(|e| {
                        backoff::Error::transient(RouterError::Transport(format!(
                            "{method} send: {e}"
                        )))
                    })?;
                let status = resp.status();
                if status.is_server_error() || status.as_u16() == 429 {
                    return Err(backoff::Error::transient(RouterError::Transport(format!(
                        "{method}: http {status}"
                    ))));
                }
                if !status.is_success() {
                    return Err(backoff::Error::permanent(RouterError::Transport(format!(
                        "{method}: http {status}"
                    ))));
                }
                let envelope: RpcEnvelope<T> = resp.json().await.map_err(|e| {
                    backoff::Error::permanent(RouterError::Transport(format!(
                        "{method} decode: {e}"
                    )))
                })?;
                envelope.into_result(method).map_err(backoff::Error::permanent)
            }
        })
        .await;
        timer.observe_duration();
        if let Err(err) = &result {
            debug!(method, error = %err, "json-rpc request failed");
        }
        result
    }

    pub async fn eth_call(&self, target: Address, data: Bytes) -> Result<Bytes, RouterError> {
        self.request(
            "eth_call",
            json!([{ "to": target, "data": data }, "latest"]),
        )
        .await
    }

    pub async fn get_code(&self, target: Address) -> Result<Bytes, RouterError> {
        self.request("eth_getCode", json!([target, "latest"])).await
    }
}

impl VenueClient for JsonRpc {
    async fn call(&self, target: Address, calldata: Bytes) -> Result<Bytes, RouterError> {
        self.eth_call(target, calldata)
            .await
            .map_err(|e| RouterError::VenueCall {
                target,
                reason: e.to_string(),
            })
    }

    async fn code_size(&self, target: Address) -> Result<usize, RouterError> {
        Ok(self.get_code(target).await?.len())
    }
}
