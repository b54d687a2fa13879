// Lotus node JSON-RPC client
//
// Only the handful of read calls the explorer needs: mining info, peers and
// the mempool. Requests authenticate with HTTP basic auth.

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::sync::atomic::{AtomicU64, Ordering};

use crate::geoip::GeoIpResult;
use crate::upstream::{send_raw, UpstreamError};

const SERVICE: &str = "rpc";

/// RPC_INVALID_ADDRESS_OR_KEY, returned for unknown txids
const RPC_NOT_FOUND_CODE: i64 = -5;

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct MiningInfo {
    pub blocks: i64,
    pub difficulty: f64,
    pub networkhashps: f64,
    pub pooledtx: i64,
    pub chain: String,
    pub warnings: String,
}

/// One `getpeerinfo` entry. Fields the explorer does not use are passed
/// through untouched.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct PeerInfo {
    pub addr: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geoip: Option<GeoIpResult>,
}

#[async_trait]
pub trait NodeRpc: Send + Sync {
    async fn mining_info(&self) -> Result<MiningInfo, UpstreamError>;
    async fn peer_info(&self) -> Result<Vec<PeerInfo>, UpstreamError>;
    async fn raw_mempool(&self) -> Result<Vec<String>, UpstreamError>;
    /// Verbose `getrawtransaction`
    async fn raw_transaction(&self, txid: &str) -> Result<Value, UpstreamError>;
}

#[derive(Deserialize)]
struct RpcResponse<T> {
    result: Option<T>,
    error: Option<RpcErrorBody>,
}

#[derive(Deserialize)]
struct RpcErrorBody {
    code: i64,
    message: String,
}

pub struct HttpNodeRpc {
    client: Client,
    url: String,
    user: String,
    password: String,
    next_id: AtomicU64,
}

impl HttpNodeRpc {
    pub fn new(
        client: Client,
        url: impl Into<String>,
        user: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            client,
            url: url.into(),
            user: user.into(),
            password: password.into(),
            next_id: AtomicU64::new(1),
        }
    }

    async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        params: Value,
    ) -> Result<T, UpstreamError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let request = self
            .client
            .post(&self.url)
            .basic_auth(&self.user, Some(&self.password))
            .json(&json!({
                "jsonrpc": "1.0",
                "id": id,
                "method": method,
                "params": params,
            }));

        let (status, body) = send_raw(SERVICE, request).await?;
        tracing::trace!(method, status = status.as_u16(), "RPC call");
        parse_response(status.is_success(), status.as_u16(), &body)
    }
}

/// Nodes report RPC errors with a non-2xx status and a JSON error body, so the
/// body is inspected before the status.
fn parse_response<T: DeserializeOwned>(
    success: bool,
    status: u16,
    body: &[u8],
) -> Result<T, UpstreamError> {
    match serde_json::from_slice::<RpcResponse<T>>(body) {
        Ok(RpcResponse {
            error: Some(error), ..
        }) => {
            if error.code == RPC_NOT_FOUND_CODE {
                Err(UpstreamError::NotFound { service: SERVICE })
            } else {
                Err(UpstreamError::Rpc {
                    code: error.code,
                    message: error.message,
                })
            }
        }
        Ok(RpcResponse {
            result: Some(result),
            ..
        }) => Ok(result),
        Ok(_) => Err(UpstreamError::decode(SERVICE, "response has neither result nor error")),
        Err(_) if !success => Err(UpstreamError::Status {
            service: SERVICE,
            status,
        }),
        Err(e) => Err(UpstreamError::decode(SERVICE, e)),
    }
}

#[async_trait]
impl NodeRpc for HttpNodeRpc {
    async fn mining_info(&self) -> Result<MiningInfo, UpstreamError> {
        self.call("getmininginfo", json!([])).await
    }

    async fn peer_info(&self) -> Result<Vec<PeerInfo>, UpstreamError> {
        self.call("getpeerinfo", json!([])).await
    }

    async fn raw_mempool(&self) -> Result<Vec<String>, UpstreamError> {
        self.call("getrawmempool", json!([])).await
    }

    async fn raw_transaction(&self, txid: &str) -> Result<Value, UpstreamError> {
        self.call("getrawtransaction", json!([txid, true])).await
    }
}
