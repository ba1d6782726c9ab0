//! JSON-RPC and block explorer wire types for EVM nodes.
//!
//! Quantities arrive as `0x`-prefixed hex strings from the node and as decimal
//! strings from the explorer; both are kept as text and parsed on use.

use account_types::{AdaptorError, Result};
use alloy::primitives::U256;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
pub struct JsonRpcRequest<'a> {
	pub jsonrpc: &'static str,
	pub id: u64,
	pub method: &'a str,
	pub params: serde_json::Value,
}

impl<'a> JsonRpcRequest<'a> {
	pub fn new(method: &'a str, params: serde_json::Value) -> Self {
		Self {
			jsonrpc: "2.0",
			id: 1,
			method,
			params,
		}
	}
}

#[derive(Debug, Deserialize)]
pub struct JsonRpcResponse {
	#[serde(default)]
	pub result: Option<serde_json::Value>,
	#[serde(default)]
	pub error: Option<JsonRpcError>,
}

#[derive(Debug, Deserialize)]
pub struct JsonRpcError {
	pub code: i64,
	pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RpcTransaction {
	pub hash: String,
	pub from: String,
	#[serde(default)]
	pub to: Option<String>,
	pub value: String,
	pub gas: String,
	#[serde(default)]
	pub gas_price: Option<String>,
	#[serde(default)]
	pub block_number: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RpcBlock {
	pub number: String,
	pub hash: String,
	pub parent_hash: String,
	pub timestamp: String,
	#[serde(default)]
	pub base_fee_per_gas: Option<String>,
	#[serde(default)]
	pub transactions: Vec<RpcTransaction>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RpcReceipt {
	pub transaction_hash: String,
	/// `0x1` on success, `0x0` when reverted.
	#[serde(default)]
	pub status: Option<String>,
	pub gas_used: String,
	#[serde(default)]
	pub effective_gas_price: Option<String>,
	#[serde(default)]
	pub contract_address: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeeHistory {
	#[serde(default)]
	pub base_fee_per_gas: Vec<String>,
	#[serde(default)]
	pub reward: Option<Vec<Vec<String>>>,
}

/// Envelope of every explorer API answer.
#[derive(Debug, Deserialize)]
pub struct ExplorerResponse {
	pub status: String,
	pub message: String,
	pub result: serde_json::Value,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExplorerTransaction {
	pub hash: String,
	pub block_number: String,
	pub time_stamp: String,
	pub from: String,
	#[serde(default)]
	pub to: String,
	pub value: String,
	pub gas_price: String,
	pub gas_used: String,
	#[serde(default)]
	pub is_error: String,
	#[serde(default)]
	pub contract_address: String,
}

/// The node answered, but with a value that can never parse; retrying won't help.
fn malformed(kind: &str, value: &str) -> AdaptorError {
	AdaptorError::Internal(format!("node returned malformed {} '{}'", kind, value))
}

/// Parses a hex quantity (`0x1a`).
pub fn quantity_u64(value: &str) -> Result<u64> {
	let digits = value.strip_prefix("0x").ok_or_else(|| malformed("quantity", value))?;
	u64::from_str_radix(digits, 16).map_err(|_| malformed("quantity", value))
}

pub fn quantity_u128(value: &str) -> Result<u128> {
	let digits = value.strip_prefix("0x").ok_or_else(|| malformed("quantity", value))?;
	u128::from_str_radix(digits, 16).map_err(|_| malformed("quantity", value))
}

/// Parses a hex quantity or a 32-byte `eth_call` word; `0x` alone is zero.
pub fn quantity_u256(value: &str) -> Result<U256> {
	let digits = value.strip_prefix("0x").ok_or_else(|| malformed("quantity", value))?;
	if digits.is_empty() {
		return Ok(U256::ZERO);
	}
	U256::from_str_radix(digits, 16).map_err(|_| malformed("quantity", value))
}

/// Parses a decimal explorer field.
pub fn decimal_u128(value: &str) -> Result<u128> {
	value.parse::<u128>().map_err(|_| malformed("number", value))
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_quantities() {
		assert_eq!(quantity_u64("0x13b8e04").unwrap(), 20680196);
		assert_eq!(quantity_u128("0x3b9aca00").unwrap(), 1_000_000_000);
		assert_eq!(quantity_u256("0x").unwrap(), U256::ZERO);
		assert_eq!(
			quantity_u256("0x0000000000000000000000000000000000000000000000000de0b6b3a7640000")
				.unwrap(),
			U256::from(1_000_000_000_000_000_000u128)
		);

		assert!(quantity_u64("12").is_err());
		assert!(quantity_u64("0xzz").is_err());
		assert!(decimal_u128("0x10").is_err());
	}

	#[test]
	fn test_malformed_quantity_is_not_retryable() {
		let err = quantity_u128("0xnot-hex").unwrap_err();
		assert_eq!(err.kind(), account_types::ErrorKind::Internal);
		assert!(!err.is_retryable());
		assert!(err.to_string().contains("0xnot-hex"));
	}

	#[test]
	fn test_block_deserializes_with_full_transactions() {
		let block: RpcBlock = serde_json::from_value(serde_json::json!({
			"number": "0x10",
			"hash": format!("0x{}", "ab".repeat(32)),
			"parentHash": format!("0x{}", "cd".repeat(32)),
			"timestamp": "0x6553f100",
			"baseFeePerGas": "0x7",
			"transactions": [{
				"hash": format!("0x{}", "01".repeat(32)),
				"from": "0x7e5f4552091a69125d5dfcb7b8c2659029395bdf",
				"to": null,
				"value": "0x0",
				"gas": "0x5208",
				"gasPrice": "0x3b9aca00",
				"blockNumber": "0x10"
			}]
		}))
		.unwrap();

		assert_eq!(block.transactions.len(), 1);
		assert!(block.transactions[0].to.is_none());
		assert_eq!(block.base_fee_per_gas.as_deref(), Some("0x7"));
	}
}
