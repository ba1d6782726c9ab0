//! Rosetta upstream client for the Internet Computer ledger.

use super::rosetta::{
	AccountBalanceRequest, AccountBalanceResponse, AccountIdentifier, Block, BlockRequest,
	BlockResponse, BlockTransaction, ConstructionMetadataRequest, ConstructionMetadataResponse,
	ErrorBody, NetworkIdentifier, NetworkRequest, NetworkStatusResponse, PartialBlockIdentifier,
	SearchTransactionsRequest, SearchTransactionsResponse, TransactionIdentifier,
};
use crate::retry::RetryPolicy;
use account_types::{AdaptorError, Result};
use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use tracing::debug;

pub const DEFAULT_BLOCKCHAIN: &str = "Internet Computer";
/// Network identifier of the ICP ledger canister on mainnet.
pub const DEFAULT_NETWORK: &str = "00000000000000020101";

/// Upstream collaborator of the ICP adaptor.
#[async_trait]
pub trait RosettaClient: Send + Sync {
	async fn network_status(&self) -> Result<NetworkStatusResponse>;

	/// Fails with `NotFound` when the node has no such block.
	async fn block(&self, block: PartialBlockIdentifier) -> Result<Block>;

	async fn account_balance(&self, address: &str) -> Result<AccountBalanceResponse>;

	async fn transactions_by_account(&self, address: &str) -> Result<Vec<BlockTransaction>>;

	async fn transaction_by_hash(&self, hash: &str) -> Result<Option<BlockTransaction>>;

	/// Ledger transfer fee in e8s, if the node reports one.
	async fn suggested_fee(&self) -> Result<Option<u128>>;
}

pub struct HttpRosettaClient {
	http: reqwest::Client,
	base_url: String,
	network: NetworkIdentifier,
	retry: RetryPolicy,
}

impl HttpRosettaClient {
	pub fn new(base_url: impl Into<String>) -> Self {
		Self {
			http: reqwest::Client::new(),
			base_url: base_url.into().trim_end_matches('/').to_string(),
			network: NetworkIdentifier {
				blockchain: DEFAULT_BLOCKCHAIN.to_string(),
				network: DEFAULT_NETWORK.to_string(),
			},
			retry: RetryPolicy::new(),
		}
	}

	pub fn with_network(mut self, network: impl Into<String>) -> Self {
		self.network.network = network.into();
		self
	}

	pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
		self.retry = retry;
		self
	}

	pub fn network(&self) -> &NetworkIdentifier {
		&self.network
	}

	async fn post<B, R>(&self, path: &str, body: &B) -> Result<R>
	where
		B: Serialize + Sync,
		R: DeserializeOwned,
	{
		self.retry
			.retry(path, || self.post_once(path, body))
			.await
	}

	async fn post_once<B, R>(&self, path: &str, body: &B) -> Result<R>
	where
		B: Serialize + Sync,
		R: DeserializeOwned,
	{
		let url = format!("{}{}", self.base_url, path);
		debug!("POST {}", url);

		let response = self
			.http
			.post(&url)
			.json(body)
			.send()
			.await
			.map_err(|e| AdaptorError::UpstreamUnavailable(format!("{}: {}", path, e)))?;

		let status = response.status();
		let bytes = response
			.bytes()
			.await
			.map_err(|e| AdaptorError::UpstreamUnavailable(format!("{}: {}", path, e)))?;

		if !status.is_success() {
			return Err(match serde_json::from_slice::<ErrorBody>(&bytes) {
				Ok(error) if error.is_not_found() => AdaptorError::NotFound(error.message),
				Ok(error) => AdaptorError::UpstreamUnavailable(format!(
					"{} returned {} (code {}): {}",
					path, status, error.code, error.message
				)),
				Err(_) => AdaptorError::UpstreamUnavailable(format!("{} returned {}", path, status)),
			});
		}

		serde_json::from_slice(&bytes).map_err(|e| {
			AdaptorError::UpstreamUnavailable(format!("{}: unexpected response body: {}", path, e))
		})
	}
}

#[async_trait]
impl RosettaClient for HttpRosettaClient {
	async fn network_status(&self) -> Result<NetworkStatusResponse> {
		self.post(
			"/network/status",
			&NetworkRequest {
				network_identifier: &self.network,
			},
		)
		.await
	}

	async fn block(&self, block: PartialBlockIdentifier) -> Result<Block> {
		let description = format!("{:?}", block);
		let response: BlockResponse = self
			.post(
				"/block",
				&BlockRequest {
					network_identifier: &self.network,
					block_identifier: block,
				},
			)
			.await?;

		response
			.block
			.ok_or_else(|| AdaptorError::NotFound(format!("block {}", description)))
	}

	async fn account_balance(&self, address: &str) -> Result<AccountBalanceResponse> {
		self.post(
			"/account/balance",
			&AccountBalanceRequest {
				network_identifier: &self.network,
				account_identifier: AccountIdentifier {
					address: address.to_string(),
				},
			},
		)
		.await
	}

	async fn transactions_by_account(&self, address: &str) -> Result<Vec<BlockTransaction>> {
		let response: SearchTransactionsResponse = self
			.post(
				"/search/transactions",
				&SearchTransactionsRequest {
					network_identifier: &self.network,
					account_identifier: Some(AccountIdentifier {
						address: address.to_string(),
					}),
					transaction_identifier: None,
				},
			)
			.await?;
		Ok(response.transactions)
	}

	async fn transaction_by_hash(&self, hash: &str) -> Result<Option<BlockTransaction>> {
		let response: SearchTransactionsResponse = self
			.post(
				"/search/transactions",
				&SearchTransactionsRequest {
					network_identifier: &self.network,
					account_identifier: None,
					transaction_identifier: Some(TransactionIdentifier {
						hash: hash.to_string(),
					}),
				},
			)
			.await?;
		Ok(response.transactions.into_iter().next())
	}

	async fn suggested_fee(&self) -> Result<Option<u128>> {
		let response: ConstructionMetadataResponse = self
			.post(
				"/construction/metadata",
				&ConstructionMetadataRequest {
					network_identifier: &self.network,
					options: serde_json::json!({}),
				},
			)
			.await?;

		match response.suggested_fee.first() {
			Some(amount) => amount.value.parse::<u128>().map(Some).map_err(|e| {
				AdaptorError::UpstreamUnavailable(format!(
					"suggested fee '{}' is not an integer: {}",
					amount.value, e
				))
			}),
			None => Ok(None),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use account_types::ErrorKind;
	use std::time::Duration;
	use wiremock::matchers::{body_partial_json, method, path};
	use wiremock::{Mock, MockServer, ResponseTemplate};

	fn client(server: &MockServer) -> HttpRosettaClient {
		HttpRosettaClient::new(server.uri()).with_retry(
			RetryPolicy::new()
				.with_max_retries(2)
				.with_initial_interval(Duration::from_millis(1)),
		)
	}

	fn block_json(index: u64) -> serde_json::Value {
		serde_json::json!({
			"block_identifier": {"index": index, "hash": "d105abebd1bf7325bca6917c04a73fed2b120a431c00c6996f1fa46d558d1b3f"},
			"parent_block_identifier": {"index": index - 1, "hash": "aa".repeat(32)},
			"timestamp": 1700000000123u64,
			"transactions": []
		})
	}

	#[tokio::test]
	async fn test_block_by_index() {
		let server = MockServer::start().await;
		Mock::given(method("POST"))
			.and(path("/block"))
			.and(body_partial_json(serde_json::json!({
				"network_identifier": {"blockchain": "Internet Computer", "network": DEFAULT_NETWORK},
				"block_identifier": {"index": 20675780}
			})))
			.respond_with(
				ResponseTemplate::new(200).set_body_json(serde_json::json!({"block": block_json(20675780)})),
			)
			.expect(1)
			.mount(&server)
			.await;

		let block = client(&server)
			.block(PartialBlockIdentifier::index(20675780))
			.await
			.unwrap();
		assert_eq!(block.block_identifier.index, 20675780);
		assert_eq!(block.timestamp, 1700000000123);
	}

	#[tokio::test]
	async fn test_missing_block_is_not_found() {
		let server = MockServer::start().await;
		Mock::given(method("POST"))
			.and(path("/block"))
			.respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
			.mount(&server)
			.await;

		let err = client(&server)
			.block(PartialBlockIdentifier::index(1))
			.await
			.unwrap_err();
		assert_eq!(err.kind(), ErrorKind::NotFound);
	}

	#[tokio::test]
	async fn test_not_found_error_body_is_not_retried() {
		let server = MockServer::start().await;
		Mock::given(method("POST"))
			.and(path("/block"))
			.respond_with(ResponseTemplate::new(500).set_body_json(serde_json::json!({
				"code": 700,
				"message": "Internal server error",
				"retriable": false,
				"details": {"error_message": "Block not found"}
			})))
			.expect(1)
			.mount(&server)
			.await;

		let err = client(&server)
			.block(PartialBlockIdentifier::hash("00"))
			.await
			.unwrap_err();
		assert_eq!(err.kind(), ErrorKind::NotFound);
	}

	#[tokio::test]
	async fn test_server_errors_are_retried_then_surface_as_unavailable() {
		let server = MockServer::start().await;
		Mock::given(method("POST"))
			.and(path("/network/status"))
			.respond_with(ResponseTemplate::new(503))
			.expect(3)
			.mount(&server)
			.await;

		let err = client(&server).network_status().await.unwrap_err();
		assert_eq!(err.kind(), ErrorKind::UpstreamUnavailable);
		assert!(err.is_retryable());
	}

	#[tokio::test]
	async fn test_suggested_fee() {
		let server = MockServer::start().await;
		Mock::given(method("POST"))
			.and(path("/construction/metadata"))
			.respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
				"metadata": {},
				"suggested_fee": [{"value": "10000", "currency": {"symbol": "ICP", "decimals": 8}}]
			})))
			.mount(&server)
			.await;

		assert_eq!(client(&server).suggested_fee().await.unwrap(), Some(10_000));
	}

	#[tokio::test]
	async fn test_transaction_by_hash_empty_result() {
		let server = MockServer::start().await;
		Mock::given(method("POST"))
			.and(path("/search/transactions"))
			.and(body_partial_json(serde_json::json!({
				"transaction_identifier": {"hash": "f840"}
			})))
			.respond_with(
				ResponseTemplate::new(200)
					.set_body_json(serde_json::json!({"transactions": [], "total_count": 0})),
			)
			.mount(&server)
			.await;

		assert!(client(&server)
			.transaction_by_hash("f840")
			.await
			.unwrap()
			.is_none());
	}

	#[tokio::test]
	async fn test_connection_refused_is_unavailable() {
		let client = HttpRosettaClient::new("http://127.0.0.1:1").with_retry(RetryPolicy::none());
		let err = client.account_balance("00").await.unwrap_err();
		assert_eq!(err.kind(), ErrorKind::UpstreamUnavailable);
	}
}
