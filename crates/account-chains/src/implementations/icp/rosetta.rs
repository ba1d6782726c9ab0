//! Rosetta API wire types used by the Internet Computer adaptor.

use serde::{Deserialize, Serialize};

pub const OPERATION_TRANSACTION: &str = "TRANSACTION";
pub const OPERATION_FEE: &str = "FEE";
pub const STATUS_COMPLETED: &str = "COMPLETED";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkIdentifier {
	pub blockchain: String,
	pub network: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockIdentifier {
	pub index: u64,
	pub hash: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartialBlockIdentifier {
	#[serde(skip_serializing_if = "Option::is_none")]
	pub index: Option<u64>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub hash: Option<String>,
}

impl PartialBlockIdentifier {
	pub fn index(index: u64) -> Self {
		Self {
			index: Some(index),
			hash: None,
		}
	}

	pub fn hash(hash: impl Into<String>) -> Self {
		Self {
			index: None,
			hash: Some(hash.into()),
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountIdentifier {
	pub address: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionIdentifier {
	pub hash: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Currency {
	pub symbol: String,
	pub decimals: u32,
}

impl Currency {
	pub fn icp() -> Self {
		Self {
			symbol: "ICP".to_string(),
			decimals: 8,
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Amount {
	/// Signed integer in the currency's smallest unit.
	pub value: String,
	pub currency: Currency,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationIdentifier {
	pub index: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Operation {
	pub operation_identifier: OperationIdentifier,
	#[serde(rename = "type")]
	pub kind: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub status: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub account: Option<AccountIdentifier>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub amount: Option<Amount>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionMetadata {
	#[serde(default)]
	pub block_height: Option<u64>,
	#[serde(default)]
	pub memo: Option<u64>,
	/// Nanoseconds since the epoch.
	#[serde(default)]
	pub timestamp: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
	pub transaction_identifier: TransactionIdentifier,
	#[serde(default)]
	pub operations: Vec<Operation>,
	#[serde(default)]
	pub metadata: Option<TransactionMetadata>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
	pub block_identifier: BlockIdentifier,
	pub parent_block_identifier: BlockIdentifier,
	/// Milliseconds since the epoch.
	pub timestamp: u64,
	#[serde(default)]
	pub transactions: Vec<Transaction>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NetworkRequest<'a> {
	pub network_identifier: &'a NetworkIdentifier,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NetworkStatusResponse {
	pub current_block_identifier: BlockIdentifier,
	pub current_block_timestamp: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct BlockRequest<'a> {
	pub network_identifier: &'a NetworkIdentifier,
	pub block_identifier: PartialBlockIdentifier,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BlockResponse {
	#[serde(default)]
	pub block: Option<Block>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AccountBalanceRequest<'a> {
	pub network_identifier: &'a NetworkIdentifier,
	pub account_identifier: AccountIdentifier,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AccountBalanceResponse {
	pub block_identifier: BlockIdentifier,
	#[serde(default)]
	pub balances: Vec<Amount>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchTransactionsRequest<'a> {
	pub network_identifier: &'a NetworkIdentifier,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub account_identifier: Option<AccountIdentifier>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub transaction_identifier: Option<TransactionIdentifier>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BlockTransaction {
	pub block_identifier: BlockIdentifier,
	pub transaction: Transaction,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchTransactionsResponse {
	#[serde(default)]
	pub transactions: Vec<BlockTransaction>,
	#[serde(default)]
	pub total_count: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ConstructionMetadataRequest<'a> {
	pub network_identifier: &'a NetworkIdentifier,
	pub options: serde_json::Value,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ConstructionMetadataResponse {
	#[serde(default)]
	pub suggested_fee: Vec<Amount>,
}

/// Error body returned with non-2xx responses.
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorBody {
	pub code: u32,
	pub message: String,
	#[serde(default)]
	pub retriable: bool,
	#[serde(default)]
	pub details: Option<serde_json::Value>,
}

impl ErrorBody {
	/// Rosetta has no dedicated not-found status; nodes describe it in the
	/// message or details.
	pub fn is_not_found(&self) -> bool {
		let details = self
			.details
			.as_ref()
			.map(|d| d.to_string())
			.unwrap_or_default();
		let text = format!("{} {}", self.message, details).to_lowercase();
		text.contains("not found") || text.contains("does not exist")
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_partial_block_identifier_skips_missing_fields() {
		let json = serde_json::to_string(&PartialBlockIdentifier::index(20675780)).unwrap();
		assert_eq!(json, r#"{"index":20675780}"#);

		let json = serde_json::to_string(&PartialBlockIdentifier::hash("ab")).unwrap();
		assert_eq!(json, r#"{"hash":"ab"}"#);
	}

	#[test]
	fn test_error_body_not_found_detection() {
		let body: ErrorBody = serde_json::from_str(
			r#"{"code":700,"message":"Internal server error","retriable":false,
				"details":{"error_message":"Block not found: 99999999"}}"#,
		)
		.unwrap();
		assert!(body.is_not_found());

		let body: ErrorBody =
			serde_json::from_str(r#"{"code":700,"message":"Ledger unreachable","retriable":true}"#)
				.unwrap();
		assert!(!body.is_not_found());
	}
}
