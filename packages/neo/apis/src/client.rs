//! This module implements the `NeoRpcClient` to interact with a source ledger
//! node over JSON-RPC 2.0.

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

use base64::{engine::general_purpose::STANDARD, Engine as _};
use reqwest::Client;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{json, Value};

use crate::{
    error::NeoRpcError,
    types::{ApplicationLog, Block, StateRoot, Uint160, Uint256},
};

const RPC_METHOD_GET_BLOCK: &str = "getblock";
const RPC_METHOD_GET_APPLICATION_LOG: &str = "getapplicationlog";
const RPC_METHOD_GET_STATE_ROOT: &str = "getstateroot";
const RPC_METHOD_GET_PROOF: &str = "getproof";

/// A JSON-RPC client over an ordered list of seed nodes.
///
/// Calls go to the last seed that answered; on a transport failure the next
/// seed is tried until every seed has been attempted once.
#[derive(Debug)]
pub struct NeoRpcClient {
    client: Client,
    seeds: Vec<String>,
    preferred: AtomicUsize,
    next_id: AtomicU64,
}

#[derive(Serialize)]
struct Request<'a, P> {
    jsonrpc: &'static str,
    id: u64,
    method: &'a str,
    params: P,
}

#[derive(Deserialize)]
struct Response {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<ErrorObject>,
}

#[derive(Deserialize)]
struct ErrorObject {
    code: i64,
    message: String,
}

impl NeoRpcClient {
    /// Create a new client over the given seed URLs.
    /// # Errors
    /// Returns [`NeoRpcError::NoSeeds`] if `seeds` is empty.
    pub fn new(seeds: Vec<String>) -> Result<Self, NeoRpcError> {
        Self::with_client(Client::new(), seeds)
    }

    /// Create a new client reusing an existing HTTP client.
    /// # Errors
    /// Returns [`NeoRpcError::NoSeeds`] if `seeds` is empty.
    pub fn with_client(client: Client, seeds: Vec<String>) -> Result<Self, NeoRpcError> {
        if seeds.is_empty() {
            return Err(NeoRpcError::NoSeeds);
        }
        Ok(Self {
            client,
            seeds,
            preferred: AtomicUsize::new(0),
            next_id: AtomicU64::new(1),
        })
    }

    /// The configured seed URLs.
    #[must_use]
    pub fn seeds(&self) -> &[String] {
        &self.seeds
    }

    /// Fetches the verbose block at `index`, or `None` if it does not exist yet.
    /// # Errors
    /// Returns an error if the request fails or the response cannot be decoded.
    pub async fn get_block(&self, index: u32) -> Result<Option<Block>, NeoRpcError> {
        absent_if_unknown(self.call(RPC_METHOD_GET_BLOCK, json!([index, 1])).await)
    }

    /// Fetches the application log of a transaction.
    /// # Errors
    /// Returns an error if the request fails or the response cannot be decoded.
    pub async fn get_application_log(&self, txid: Uint256) -> Result<ApplicationLog, NeoRpcError> {
        self.call(RPC_METHOD_GET_APPLICATION_LOG, json!([txid.to_string()]))
            .await
    }

    /// Fetches the state root at `index`, or `None` if it has not been computed yet.
    /// # Errors
    /// Returns an error if the request fails or the response cannot be decoded.
    pub async fn get_state_root(&self, index: u32) -> Result<Option<StateRoot>, NeoRpcError> {
        absent_if_unknown(self.call(RPC_METHOD_GET_STATE_ROOT, json!([index])).await)
    }

    /// Fetches the storage proof of `key` in `contract` against `root`.
    /// Returns `None` if the node has no such item.
    /// # Errors
    /// Returns an error if the request fails or the proof is not valid base64.
    pub async fn get_proof(
        &self,
        root: Uint256,
        contract: Uint160,
        key: &[u8],
    ) -> Result<Option<Vec<u8>>, NeoRpcError> {
        let params = json!([root.to_string(), contract.to_string(), STANDARD.encode(key)]);
        let proof: Option<String> =
            absent_if_unknown(self.call(RPC_METHOD_GET_PROOF, params).await)?;
        proof
            .map(|proof| {
                STANDARD.decode(proof).map_err(|e| NeoRpcError::Decode {
                    method: RPC_METHOD_GET_PROOF,
                    reason: e.to_string(),
                })
            })
            .transpose()
    }

    async fn call<P, R>(&self, method: &'static str, params: P) -> Result<R, NeoRpcError>
    where
        P: Serialize + Send + Sync,
        R: DeserializeOwned,
    {
        let request = Request {
            jsonrpc: "2.0",
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
            method,
            params,
        };

        let start = self.preferred.load(Ordering::Relaxed);
        let mut last_error = String::new();
        for attempt in 0..self.seeds.len() {
            let idx = (start + attempt) % self.seeds.len();
            let seed = &self.seeds[idx];
            match self.post(seed, &request).await {
                Ok(response) => {
                    if idx != start {
                        tracing::info!(seed = %seed, method, "switched rpc seed");
                        self.preferred.store(idx, Ordering::Relaxed);
                    }
                    return decode_response(method, response);
                }
                Err(e) => {
                    tracing::warn!(seed = %seed, method, error = %e, "rpc seed unreachable");
                    last_error = e.to_string();
                }
            }
        }

        Err(NeoRpcError::Unreachable {
            seeds: self.seeds.len(),
            last: last_error,
        })
    }

    async fn post<P: Serialize + Sync>(
        &self,
        seed: &str,
        request: &Request<'_, P>,
    ) -> Result<Response, reqwest::Error> {
        self.client
            .post(seed)
            .json(request)
            .send()
            .await?
            .error_for_status()?
            .json::<Response>()
            .await
    }
}

fn decode_response<R: DeserializeOwned>(
    method: &'static str,
    response: Response,
) -> Result<R, NeoRpcError> {
    if let Some(error) = response.error {
        return Err(NeoRpcError::Rpc {
            method,
            code: error.code,
            message: error.message,
        });
    }
    let result = response
        .result
        .ok_or(NeoRpcError::EmptyResult { method })?;
    serde_json::from_value(result).map_err(|e| NeoRpcError::Decode {
        method,
        reason: e.to_string(),
    })
}

fn absent_if_unknown<T>(result: Result<T, NeoRpcError>) -> Result<Option<T>, NeoRpcError> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(e) if e.is_unknown_item() => Ok(None),
        Err(e) => Err(e),
    }
}
