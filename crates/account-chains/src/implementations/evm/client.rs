//! JSON-RPC upstream client for EVM nodes, plus the optional explorer API used
//! for address history.

use super::rpc::{
	quantity_u128, quantity_u256, quantity_u64, ExplorerResponse, ExplorerTransaction, FeeHistory,
	JsonRpcRequest, JsonRpcResponse, RpcBlock, RpcReceipt, RpcTransaction,
};
use crate::retry::RetryPolicy;
use account_types::{AdaptorError, Result};
use alloy::primitives::U256;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::debug;

/// `balanceOf(address)`
const BALANCE_OF_SELECTOR: &str = "70a08231";

/// Upstream collaborator of the EVM adaptor.
#[async_trait]
pub trait EvmRpcClient: Send + Sync {
	/// Latest block when `number` is `None`. Fails with `NotFound` for unknown blocks.
	async fn block_by_number(&self, number: Option<u64>) -> Result<RpcBlock>;

	async fn block_by_hash(&self, hash: &str) -> Result<RpcBlock>;

	async fn balance(&self, address: &str) -> Result<U256>;

	async fn erc20_balance(&self, token: &str, owner: &str) -> Result<U256>;

	async fn transaction_count(&self, address: &str) -> Result<u64>;

	async fn gas_price(&self) -> Result<u128>;

	async fn fee_history(&self, blocks: u64, percentiles: &[f64]) -> Result<FeeHistory>;

	async fn transaction_by_hash(&self, hash: &str) -> Result<Option<RpcTransaction>>;

	async fn transaction_receipt(&self, hash: &str) -> Result<Option<RpcReceipt>>;

	/// Address history from the explorer; `UpstreamUnavailable` when none is configured.
	async fn transactions_by_address(&self, address: &str) -> Result<Vec<ExplorerTransaction>>;
}

#[derive(Debug, Clone)]
pub struct ExplorerConfig {
	pub url: String,
	pub api_key: Option<String>,
}

pub struct HttpEvmClient {
	http: reqwest::Client,
	rpc_url: String,
	explorer: Option<ExplorerConfig>,
	retry: RetryPolicy,
}

impl HttpEvmClient {
	pub fn new(rpc_url: impl Into<String>) -> Self {
		Self {
			http: reqwest::Client::new(),
			rpc_url: rpc_url.into(),
			explorer: None,
			retry: RetryPolicy::new(),
		}
	}

	pub fn with_explorer(mut self, explorer: ExplorerConfig) -> Self {
		self.explorer = Some(explorer);
		self
	}

	pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
		self.retry = retry;
		self
	}

	async fn call<T: DeserializeOwned>(&self, method: &str, params: serde_json::Value) -> Result<T> {
		self.retry
			.retry(method, || self.call_once(method, params.clone()))
			.await
	}

	async fn call_once<T: DeserializeOwned>(
		&self,
		method: &str,
		params: serde_json::Value,
	) -> Result<T> {
		debug!("JSON-RPC {} {}", method, params);

		let response = self
			.http
			.post(&self.rpc_url)
			.json(&JsonRpcRequest::new(method, params))
			.send()
			.await
			.map_err(|e| AdaptorError::UpstreamUnavailable(format!("{}: {}", method, e)))?;

		let status = response.status();
		if !status.is_success() {
			return Err(AdaptorError::UpstreamUnavailable(format!(
				"{} returned {}",
				method, status
			)));
		}

		let body: JsonRpcResponse = response
			.json()
			.await
			.map_err(|e| AdaptorError::UpstreamUnavailable(format!("{}: {}", method, e)))?;

		if let Some(error) = body.error {
			return Err(AdaptorError::UpstreamUnavailable(format!(
				"{} failed with code {}: {}",
				method, error.code, error.message
			)));
		}

		serde_json::from_value(body.result.unwrap_or(serde_json::Value::Null)).map_err(|e| {
			AdaptorError::UpstreamUnavailable(format!("{}: unexpected result: {}", method, e))
		})
	}

	async fn explorer_txlist(
		&self,
		explorer: &ExplorerConfig,
		address: &str,
	) -> Result<Vec<ExplorerTransaction>> {
		let mut query = vec![
			("module", "account"),
			("action", "txlist"),
			("address", address),
			("startblock", "0"),
			("sort", "desc"),
		];
		if let Some(key) = &explorer.api_key {
			query.push(("apikey", key.as_str()));
		}

		debug!("Explorer txlist for {}", address);
		let response: ExplorerResponse = self
			.http
			.get(&explorer.url)
			.query(&query)
			.send()
			.await
			.and_then(|r| r.error_for_status())
			.map_err(|e| AdaptorError::UpstreamUnavailable(format!("explorer: {}", e)))?
			.json()
			.await
			.map_err(|e| AdaptorError::UpstreamUnavailable(format!("explorer: {}", e)))?;

		if response.status != "1" {
			// "0" with an empty list is how explorers say "no history"
			if response.result.as_array().is_some_and(|r| r.is_empty()) {
				return Ok(Vec::new());
			}
			return Err(AdaptorError::UpstreamUnavailable(format!(
				"explorer: {} ({})",
				response.message, response.result
			)));
		}

		serde_json::from_value(response.result)
			.map_err(|e| AdaptorError::UpstreamUnavailable(format!("explorer: {}", e)))
	}
}

fn balance_of_call(owner: &str) -> String {
	let owner = owner.trim_start_matches("0x").to_lowercase();
	format!("0x{}{:0>64}", BALANCE_OF_SELECTOR, owner)
}

#[async_trait]
impl EvmRpcClient for HttpEvmClient {
	async fn block_by_number(&self, number: Option<u64>) -> Result<RpcBlock> {
		let tag = match number {
			Some(n) => format!("0x{:x}", n),
			None => "latest".to_string(),
		};
		let block: Option<RpcBlock> = self.call("eth_getBlockByNumber", json!([tag, true])).await?;
		block.ok_or_else(|| AdaptorError::NotFound(format!("block {}", tag)))
	}

	async fn block_by_hash(&self, hash: &str) -> Result<RpcBlock> {
		let block: Option<RpcBlock> = self.call("eth_getBlockByHash", json!([hash, true])).await?;
		block.ok_or_else(|| AdaptorError::NotFound(format!("block {}", hash)))
	}

	async fn balance(&self, address: &str) -> Result<U256> {
		let value: String = self.call("eth_getBalance", json!([address, "latest"])).await?;
		quantity_u256(&value)
	}

	async fn erc20_balance(&self, token: &str, owner: &str) -> Result<U256> {
		let value: String = self
			.call(
				"eth_call",
				json!([{"to": token, "data": balance_of_call(owner)}, "latest"]),
			)
			.await?;
		quantity_u256(&value)
	}

	async fn transaction_count(&self, address: &str) -> Result<u64> {
		let value: String = self
			.call("eth_getTransactionCount", json!([address, "latest"]))
			.await?;
		quantity_u64(&value)
	}

	async fn gas_price(&self) -> Result<u128> {
		let value: String = self.call("eth_gasPrice", json!([])).await?;
		quantity_u128(&value)
	}

	async fn fee_history(&self, blocks: u64, percentiles: &[f64]) -> Result<FeeHistory> {
		self.call(
			"eth_feeHistory",
			json!([format!("0x{:x}", blocks), "latest", percentiles]),
		)
		.await
	}

	async fn transaction_by_hash(&self, hash: &str) -> Result<Option<RpcTransaction>> {
		self.call("eth_getTransactionByHash", json!([hash])).await
	}

	async fn transaction_receipt(&self, hash: &str) -> Result<Option<RpcReceipt>> {
		self.call("eth_getTransactionReceipt", json!([hash])).await
	}

	async fn transactions_by_address(&self, address: &str) -> Result<Vec<ExplorerTransaction>> {
		let explorer = self.explorer.as_ref().ok_or_else(|| {
			AdaptorError::UpstreamUnavailable("no block explorer configured".to_string())
		})?;

		self.retry
			.retry("explorer txlist", || self.explorer_txlist(explorer, address))
			.await
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use account_types::ErrorKind;
	use std::time::Duration;
	use wiremock::matchers::{body_partial_json, method, query_param, query_param_is_missing};
	use wiremock::{Mock, MockServer, ResponseTemplate};

	const OWNER: &str = "0x7E5F4552091A69125d5DfCb7b8C2659029395Bdf";

	fn client(server: &MockServer) -> HttpEvmClient {
		HttpEvmClient::new(server.uri()).with_retry(
			RetryPolicy::new()
				.with_max_retries(1)
				.with_initial_interval(Duration::from_millis(1)),
		)
	}

	fn rpc_result(result: serde_json::Value) -> ResponseTemplate {
		ResponseTemplate::new(200).set_body_json(json!({"jsonrpc": "2.0", "id": 1, "result": result}))
	}

	#[test]
	fn test_balance_of_call_data() {
		assert_eq!(
			balance_of_call(OWNER),
			"0x70a082310000000000000000000000007e5f4552091a69125d5dfcb7b8c2659029395bdf"
		);
	}

	#[tokio::test]
	async fn test_balance() {
		let server = MockServer::start().await;
		Mock::given(method("POST"))
			.and(body_partial_json(json!({"method": "eth_getBalance", "params": [OWNER, "latest"]})))
			.respond_with(rpc_result(json!("0xde0b6b3a7640000")))
			.mount(&server)
			.await;

		let balance = client(&server).balance(OWNER).await.unwrap();
		assert_eq!(balance.to_string(), "1000000000000000000");
	}

	#[tokio::test]
	async fn test_null_block_is_not_found() {
		let server = MockServer::start().await;
		Mock::given(method("POST"))
			.and(body_partial_json(json!({"method": "eth_getBlockByNumber", "params": ["0x3039", true]})))
			.respond_with(rpc_result(serde_json::Value::Null))
			.expect(1)
			.mount(&server)
			.await;

		let err = client(&server).block_by_number(Some(12345)).await.unwrap_err();
		assert_eq!(err.kind(), ErrorKind::NotFound);
	}

	#[tokio::test]
	async fn test_rpc_error_is_unavailable() {
		let server = MockServer::start().await;
		Mock::given(method("POST"))
			.respond_with(ResponseTemplate::new(200).set_body_json(json!({
				"jsonrpc": "2.0",
				"id": 1,
				"error": {"code": -32005, "message": "rate limited"}
			})))
			.expect(2)
			.mount(&server)
			.await;

		let err = client(&server).gas_price().await.unwrap_err();
		assert_eq!(err.kind(), ErrorKind::UpstreamUnavailable);
		assert!(err.to_string().contains("rate limited"));
	}

	#[tokio::test]
	async fn test_explorer_txlist() {
		let server = MockServer::start().await;
		Mock::given(method("GET"))
			.and(query_param("action", "txlist"))
			.and(query_param("address", OWNER))
			.and(query_param("apikey", "secret"))
			.and(query_param_is_missing("endblock"))
			.respond_with(ResponseTemplate::new(200).set_body_json(json!({
				"status": "1",
				"message": "OK",
				"result": [{
					"blockNumber": "17000000",
					"timeStamp": "1681000000",
					"hash": format!("0x{}", "01".repeat(32)),
					"from": OWNER,
					"to": "0x0000000000000000000000000000000000000001",
					"value": "5",
					"gas": "21000",
					"gasPrice": "1000000000",
					"gasUsed": "21000",
					"isError": "0",
					"contractAddress": ""
				}]
			})))
			.mount(&server)
			.await;

		let client = client(&server).with_explorer(ExplorerConfig {
			url: server.uri(),
			api_key: Some("secret".into()),
		});
		let txs = client.transactions_by_address(OWNER).await.unwrap();
		assert_eq!(txs.len(), 1);
		assert_eq!(txs[0].gas_used, "21000");
	}

	#[tokio::test]
	async fn test_explorer_empty_history() {
		let server = MockServer::start().await;
		Mock::given(method("GET"))
			.respond_with(ResponseTemplate::new(200).set_body_json(json!({
				"status": "0",
				"message": "No transactions found",
				"result": []
			})))
			.mount(&server)
			.await;

		let client = client(&server).with_explorer(ExplorerConfig {
			url: server.uri(),
			api_key: None,
		});
		assert!(client.transactions_by_address(OWNER).await.unwrap().is_empty());
	}

	#[tokio::test]
	async fn test_missing_explorer_is_unavailable() {
		let client = HttpEvmClient::new("http://127.0.0.1:1");
		let err = client.transactions_by_address(OWNER).await.unwrap_err();
		assert_eq!(err.kind(), ErrorKind::UpstreamUnavailable);
	}
}
