//! JSON-RPC 2.0 over HTTP.
//!
//! One POST per request. Quantities travel as `0x`-prefixed hex strings and
//! are converted at this layer; everything above it sees typed values.

use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};

use reqwest::Client;
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use whitelist_proto::{Address, Bytes, CallRequest, TransactionReceipt, TransactionRequest, TxHash};

use crate::RpcClientError;

/// Empty positional parameter list.
const NO_PARAMS: [(); 0] = [];

#[derive(Debug, Serialize)]
struct JsonRpcRequest<'a, P> {
    jsonrpc: &'static str,
    id: u64,
    method: &'a str,
    params: P,
}

#[derive(Debug, Deserialize)]
struct JsonRpcResponse {
    /// `null` for pending lookups, so absence and null both land here.
    #[serde(default)]
    result: serde_json::Value,
    error: Option<JsonRpcError>,
}

#[derive(Debug, Deserialize)]
struct JsonRpcError {
    code: i64,
    message: String,
}

/// Receipt as returned by `eth_getTransactionReceipt`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RpcReceipt {
    transaction_hash: TxHash,
    block_number: Option<String>,
    /// Absent on pre-Byzantium chains, where a mined transaction succeeded.
    status: Option<String>,
    contract_address: Option<Address>,
}

impl RpcReceipt {
    fn into_receipt(self) -> Result<TransactionReceipt, RpcClientError> {
        let block_number = self.block_number.as_deref().map(parse_quantity).transpose()?;
        let success = match self.status.as_deref() {
            Some(status) => parse_quantity(status)? == 1,
            None => true,
        };
        Ok(TransactionReceipt {
            transaction_hash: self.transaction_hash,
            block_number,
            success,
            contract_address: self.contract_address,
        })
    }
}

/// JSON-RPC client for a single endpoint.
///
/// Cheap to clone; clones share the HTTP connection pool and request ids.
#[derive(Debug, Clone)]
pub struct RpcClient {
    http: Client,
    url: String,
    next_id: Arc<AtomicU64>,
}

impl RpcClient {
    /// Create a client for the endpoint at `url`.
    pub fn new(url: impl Into<String>) -> Self {
        Self { http: Client::new(), url: url.into(), next_id: Arc::new(AtomicU64::new(1)) }
    }

    /// Endpoint URL.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Send a raw request and decode its result.
    ///
    /// # Errors
    ///
    /// - [`RpcClientError::Http`] if the request could not be sent
    /// - [`RpcClientError::Status`] on a non-success HTTP status
    /// - [`RpcClientError::Rpc`] if the node returned an error object
    /// - [`RpcClientError::Decode`] if the result has an unexpected shape
    pub async fn request<P, R>(&self, method: &str, params: P) -> Result<R, RpcClientError>
    where
        P: Serialize + Send,
        R: DeserializeOwned,
    {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let body = JsonRpcRequest { jsonrpc: "2.0", id, method, params };
        tracing::trace!(method, id, "rpc request");

        let response = self.http.post(&self.url).json(&body).send().await?;
        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(RpcClientError::Status { status: status.as_u16(), body: text });
        }

        decode_response(&text)
    }

    /// `eth_chainId`.
    pub async fn chain_id(&self) -> Result<u64, RpcClientError> {
        let quantity: String = self.request("eth_chainId", NO_PARAMS).await?;
        parse_quantity(&quantity)
    }

    /// `eth_accounts`. The active account comes first.
    pub async fn accounts(&self) -> Result<Vec<Address>, RpcClientError> {
        self.request("eth_accounts", NO_PARAMS).await
    }

    /// `eth_call` against the latest block.
    pub async fn call(&self, request: &CallRequest) -> Result<Bytes, RpcClientError> {
        self.request("eth_call", (request, "latest")).await
    }

    /// `eth_sendTransaction`, signed by the node.
    pub async fn send_transaction(&self, request: &TransactionRequest) -> Result<TxHash, RpcClientError> {
        self.request("eth_sendTransaction", [request]).await
    }

    /// `eth_getTransactionReceipt`. `None` while the transaction is pending.
    pub async fn transaction_receipt(
        &self,
        hash: TxHash,
    ) -> Result<Option<TransactionReceipt>, RpcClientError> {
        let receipt: Option<RpcReceipt> = self.request("eth_getTransactionReceipt", [hash]).await?;
        receipt.map(RpcReceipt::into_receipt).transpose()
    }
}

fn decode_response<R: DeserializeOwned>(text: &str) -> Result<R, RpcClientError> {
    let response: JsonRpcResponse = serde_json::from_str(text).map_err(RpcClientError::decode)?;
    if let Some(error) = response.error {
        return Err(RpcClientError::Rpc { code: error.code, message: error.message });
    }
    serde_json::from_value(response.result).map_err(RpcClientError::decode)
}

/// Parse a `0x`-prefixed hex quantity.
pub(crate) fn parse_quantity(quantity: &str) -> Result<u64, RpcClientError> {
    let digits = quantity
        .strip_prefix("0x")
        .ok_or_else(|| RpcClientError::Decode(format!("quantity {quantity:?} lacks 0x prefix")))?;
    if digits.is_empty() {
        return Err(RpcClientError::Decode("empty quantity".to_string()));
    }
    u64::from_str_radix(digits, 16).map_err(RpcClientError::decode)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quantities_parse_as_hex() {
        assert_eq!(parse_quantity("0x5").unwrap(), 5);
        assert_eq!(parse_quantity("0x0").unwrap(), 0);
        assert_eq!(parse_quantity("0xaa36a7").unwrap(), 11_155_111);
    }

    #[test]
    fn malformed_quantities_are_rejected() {
        assert!(parse_quantity("5").is_err());
        assert!(parse_quantity("0x").is_err());
        assert!(parse_quantity("0xzz").is_err());
    }

    #[test]
    fn request_serializes_positional_params() {
        let call = CallRequest::new(Address::repeat_byte(0x11), Bytes::from(vec![0x18, 0x16]));
        let body = JsonRpcRequest { jsonrpc: "2.0", id: 7, method: "eth_call", params: (&call, "latest") };
        let json = serde_json::to_value(&body).unwrap();

        assert_eq!(json["id"], 7);
        assert_eq!(json["params"][0]["data"], "0x1816");
        assert_eq!(json["params"][1], "latest");
        assert_eq!(serde_json::to_value(JsonRpcRequest {
            jsonrpc: "2.0",
            id: 1,
            method: "eth_accounts",
            params: NO_PARAMS,
        })
        .unwrap()["params"], serde_json::json!([]));
    }

    #[test]
    fn error_object_wins_over_result() {
        let text = r#"{"jsonrpc":"2.0","id":1,"error":{"code":4001,"message":"User denied"}}"#;
        let result: Result<String, _> = decode_response(text);
        assert!(matches!(result, Err(RpcClientError::Rpc { code: 4001, .. })));
    }

    #[test]
    fn null_result_decodes_as_pending_receipt() {
        let text = r#"{"jsonrpc":"2.0","id":1,"result":null}"#;
        let receipt: Option<RpcReceipt> = decode_response(text).unwrap();
        assert!(receipt.is_none());
    }

    #[test]
    fn null_result_is_an_error_for_required_values() {
        let text = r#"{"jsonrpc":"2.0","id":1,"result":null}"#;
        let result: Result<String, _> = decode_response(text);
        assert!(matches!(result, Err(RpcClientError::Decode(_))));
    }

    #[test]
    fn receipt_status_maps_to_success() {
        let text = r#"{"jsonrpc":"2.0","id":1,"result":{
            "transactionHash":"0x1111111111111111111111111111111111111111111111111111111111111111",
            "blockNumber":"0x10",
            "status":"0x0",
            "contractAddress":null
        }}"#;
        let receipt: Option<RpcReceipt> = decode_response(text).unwrap();
        let receipt = receipt.unwrap().into_receipt().unwrap();

        assert_eq!(receipt.transaction_hash, TxHash::repeat_byte(0x11));
        assert_eq!(receipt.block_number, Some(16));
        assert!(!receipt.success);
        assert_eq!(receipt.contract_address, None);
    }

    #[test]
    fn deployment_receipt_carries_contract_address() {
        let text = r#"{"jsonrpc":"2.0","id":1,"result":{
            "transactionHash":"0x2222222222222222222222222222222222222222222222222222222222222222",
            "blockNumber":"0x1",
            "contractAddress":"0x3333333333333333333333333333333333333333"
        }}"#;
        let receipt: Option<RpcReceipt> = decode_response(text).unwrap();
        let receipt = receipt.unwrap().into_receipt().unwrap();

        assert!(receipt.success);
        assert_eq!(receipt.contract_address, Some(Address::repeat_byte(0x33)));
    }
}
