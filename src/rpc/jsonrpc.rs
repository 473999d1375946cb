//! JSON-RPC 2.0 gateway over HTTP
//!
//! The one concrete [`RpcGateway`] implementation. Each logical operation
//! is a single POST; the request timeout is the only place a submission can
//! hang, and it surfaces as [`RpcError::Timeout`] for the caller to handle.

use async_trait::async_trait;
use base64::Engine;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use super::gateway::{AccountState, RpcError, RpcGateway, TxHash};
use crate::message::Address;
use crate::transaction::SignedEnvelope;

/// Default per-request timeout
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// JSON-RPC 2.0 client for a single node endpoint
pub struct JsonRpcGateway {
    client: reqwest::Client,
    endpoint: String,
    request_id: AtomicU64,
}

#[derive(Serialize)]
struct RpcRequest<'a> {
    jsonrpc: &'static str,
    id: u64,
    method: &'a str,
    params: serde_json::Value,
}

#[derive(Deserialize)]
struct RpcResponse<T> {
    result: Option<T>,
    error: Option<RpcErrorObject>,
}

#[derive(Deserialize)]
struct RpcErrorObject {
    code: i64,
    message: String,
}

#[derive(Deserialize)]
struct SubmitResult {
    hash: String,
}

#[derive(Deserialize)]
struct BalanceResult {
    balance: String,
}

#[derive(Deserialize)]
struct AccountStateResult {
    balance: String,
    seqno: u32,
    deployed: bool,
    #[serde(default)]
    public_key: Option<String>,
}

impl JsonRpcGateway {
    /// Connect to a node endpoint with the default request timeout
    pub fn new(endpoint: &str) -> Result<Self, RpcError> {
        Self::with_timeout(endpoint, DEFAULT_REQUEST_TIMEOUT)
    }

    pub fn with_timeout(endpoint: &str, timeout: Duration) -> Result<Self, RpcError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| RpcError::Transport(e.to_string()))?;
        Ok(Self {
            client,
            endpoint: endpoint.to_string(),
            request_id: AtomicU64::new(1),
        })
    }

    async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        params: serde_json::Value,
    ) -> Result<T, RpcError> {
        let request = RpcRequest {
            jsonrpc: "2.0",
            id: self.request_id.fetch_add(1, Ordering::Relaxed),
            method,
            params,
        };

        log::debug!("rpc call {} -> {}", method, self.endpoint);

        let response = self
            .client
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let response: RpcResponse<T> = response.json().await.map_err(map_reqwest_error)?;

        if let Some(error) = response.error {
            return Err(RpcError::Node {
                code: error.code,
                message: error.message,
            });
        }

        response
            .result
            .ok_or_else(|| RpcError::InvalidResponse("missing result".into()))
    }
}

fn map_reqwest_error(e: reqwest::Error) -> RpcError {
    if e.is_timeout() {
        RpcError::Timeout
    } else if e.is_decode() {
        RpcError::InvalidResponse(e.to_string())
    } else {
        RpcError::Transport(e.to_string())
    }
}

fn parse_balance(balance: &str) -> Result<u64, RpcError> {
    balance
        .parse()
        .map_err(|_| RpcError::InvalidResponse(format!("bad balance {:?}", balance)))
}

#[async_trait]
impl RpcGateway for JsonRpcGateway {
    async fn submit(&self, envelope: &SignedEnvelope) -> Result<TxHash, RpcError> {
        let message = base64::engine::general_purpose::STANDARD.encode(envelope.to_bytes());
        let result: SubmitResult = self
            .call("sendMessage", json!({ "message": message }))
            .await?;
        Ok(TxHash(result.hash))
    }

    async fn get_balance(&self, address: &Address) -> Result<u64, RpcError> {
        let result: BalanceResult = self
            .call("getBalance", json!({ "address": address.to_string() }))
            .await?;
        parse_balance(&result.balance)
    }

    async fn get_account_state(&self, address: &Address) -> Result<AccountState, RpcError> {
        let result: AccountStateResult = self
            .call("getAccountState", json!({ "address": address.to_string() }))
            .await?;
        Ok(AccountState {
            balance: parse_balance(&result.balance)?,
            seqno: result.seqno,
            deployed: result.deployed,
            public_key: result.public_key,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_balance() {
        assert_eq!(parse_balance("0").unwrap(), 0);
        assert_eq!(parse_balance("1000000").unwrap(), 1_000_000);
        assert!(parse_balance("1.5").is_err());
        assert!(parse_balance("-1").is_err());
    }

    #[test]
    fn test_request_serialization() {
        let request = RpcRequest {
            jsonrpc: "2.0",
            id: 7,
            method: "getBalance",
            params: json!({"address": "0:00"}),
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["jsonrpc"], "2.0");
        assert_eq!(value["id"], 7);
        assert_eq!(value["method"], "getBalance");
    }

    #[test]
    fn test_error_response_parsing() {
        let raw = r#"{"jsonrpc":"2.0","id":1,"error":{"code":-32000,"message":"no funds"}}"#;
        let response: RpcResponse<SubmitResult> = serde_json::from_str(raw).unwrap();
        let error = response.error.unwrap();
        assert_eq!(error.code, -32000);
        assert_eq!(error.message, "no funds");
    }

    #[test]
    fn test_result_response_parsing() {
        let raw = r#"{"jsonrpc":"2.0","id":1,"result":{"hash":"abc123"}}"#;
        let response: RpcResponse<SubmitResult> = serde_json::from_str(raw).unwrap();
        assert_eq!(response.result.unwrap().hash, "abc123");
    }
}
