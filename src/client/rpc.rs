use base64::{engine::general_purpose::STANDARD, Engine};
use serde::de::DeserializeOwned;
use serde_derive::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

use crate::{config::BroadcastMode, Error, Result};

/// JSON-RPC 2.0 client for the tendermint RPC endpoint of a node.
#[derive(Debug, Clone)]
pub struct RpcClient {
    http: reqwest::Client,
    url: String,
}

#[derive(Debug, Deserialize)]
struct RpcResponse<T> {
    result: Option<T>,
    error: Option<RpcError>,
}

#[derive(Debug, Deserialize)]
struct RpcError {
    code: i64,
    message: String,
    #[serde(default)]
    data: String,
}

#[derive(Debug, Deserialize)]
struct AbciQueryResult {
    response: AbciQueryResponse,
}

#[derive(Debug, Deserialize)]
struct AbciQueryResponse {
    #[serde(default)]
    code: u32,
    #[serde(default)]
    log: String,
    #[serde(default)]
    value: Option<String>,
}

/// `tcp://host:port` and bare `host:port` both become `http://host:port`.
pub fn node_url(node: &str) -> String {
    if let Some(rest) = node.strip_prefix("tcp://") {
        format!("http://{rest}")
    } else if node.starts_with("http://") || node.starts_with("https://") {
        node.to_owned()
    } else {
        format!("http://{node}")
    }
}

impl RpcClient {
    pub fn new(http: reqwest::Client, node: &str) -> Self {
        Self {
            http,
            url: node_url(node),
        }
    }

    async fn call<T: DeserializeOwned>(&self, method: &str, params: Value) -> Result<T> {
        debug!(url = %self.url, method, %params, "rpc call");
        let request = json!({
            "jsonrpc": "2.0",
            "id": "nscli",
            "method": method,
            "params": params,
        });

        let response: RpcResponse<T> = self
            .http
            .post(&self.url)
            .json(&request)
            .send()
            .await?
            .json()
            .await?;

        if let Some(error) = response.error {
            return Err(Error::Rpc {
                code: error.code,
                message: error.message,
                data: error.data,
            });
        }
        response
            .result
            .ok_or_else(|| Error::CustomError(format!("rpc {method} returned no result")))
    }

    pub async fn status(&self) -> Result<Value> {
        self.call("status", json!({})).await
    }

    pub async fn validators(&self, height: Option<u64>) -> Result<Value> {
        self.call("validators", height_params(height)).await
    }

    pub async fn block(&self, height: Option<u64>) -> Result<Value> {
        self.call("block", height_params(height)).await
    }

    pub async fn tx(&self, hash: &[u8], prove: bool) -> Result<Value> {
        self.call("tx", json!({ "hash": STANDARD.encode(hash), "prove": prove }))
            .await
    }

    pub async fn tx_search(&self, query: &str, page: u32, per_page: u32, prove: bool) -> Result<Value> {
        self.call(
            "tx_search",
            json!({
                "query": query,
                "prove": prove,
                "page": page.to_string(),
                "per_page": per_page.to_string(),
            }),
        )
        .await
    }

    /// Runs an ABCI query and returns the raw response value.
    pub async fn abci_query(&self, path: &str, data: &[u8], prove: bool) -> Result<Vec<u8>> {
        let result: AbciQueryResult = self
            .call(
                "abci_query",
                json!({
                    "path": path,
                    "data": hex::encode(data),
                    "height": "0",
                    "prove": prove,
                }),
            )
            .await?;

        let response = result.response;
        if response.code != 0 {
            return Err(Error::AbciQuery {
                path: path.to_owned(),
                code: response.code,
                log: response.log,
            });
        }
        match response.value {
            Some(value) => Ok(STANDARD.decode(value)?),
            None => Ok(vec![]),
        }
    }

    pub async fn broadcast_tx(&self, tx: &[u8], mode: BroadcastMode) -> Result<Value> {
        self.call(mode.rpc_method(), json!({ "tx": STANDARD.encode(tx) }))
            .await
    }
}

fn height_params(height: Option<u64>) -> Value {
    match height {
        Some(height) => json!({ "height": height.to_string() }),
        None => json!({}),
    }
}
