//! Request and response records for the chain account operations.
//!
//! These are plain value objects: each one lives for a single call and carries
//! chain-native text encodings (hex hashes, address strings, decimal amounts).

use crate::chains::ChainName;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupportChainsRequest {
	pub chain: ChainName,
	#[serde(default)]
	pub coin: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupportChainsResponse {
	pub support: bool,
	pub message: String,
}

impl SupportChainsResponse {
	pub fn supported(message: impl Into<String>) -> Self {
		Self {
			support: true,
			message: message.into(),
		}
	}

	pub fn unsupported(message: impl Into<String>) -> Self {
		Self {
			support: false,
			message: message.into(),
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConvertAddressRequest {
	pub chain: ChainName,
	/// Hex encoded public key, `0x` prefix optional.
	pub public_key: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConvertAddressResponse {
	pub address: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidAddressRequest {
	pub chain: ChainName,
	pub address: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidAddressResponse {
	pub valid: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockNumberRequest {
	pub chain: ChainName,
	pub height: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockHashRequest {
	pub chain: ChainName,
	pub hash: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockHeaderNumberRequest {
	pub chain: ChainName,
	/// Latest block when absent.
	#[serde(default)]
	pub height: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockHeader {
	pub height: u64,
	pub hash: String,
	pub parent_hash: String,
	/// Unix seconds.
	pub timestamp: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockResponse {
	pub header: BlockHeader,
	pub transactions: Vec<TransactionInfo>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountRequest {
	pub chain: ChainName,
	pub address: String,
	#[serde(default)]
	pub coin: Option<String>,
	#[serde(default)]
	pub contract_address: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountResponse {
	pub network: String,
	pub address: String,
	/// Balance in the smallest unit of the coin or token.
	pub balance: String,
	/// Nonce or sequence number; zero for an account never seen on chain.
	pub sequence: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeRequest {
	pub chain: ChainName,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeResponse {
	pub fast_fee: String,
	pub normal_fee: String,
	pub slow_fee: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxAddressRequest {
	pub chain: ChainName,
	pub address: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxAddressResponse {
	pub transactions: Vec<TransactionInfo>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxHashRequest {
	pub chain: ChainName,
	pub hash: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxHashResponse {
	pub transaction: TransactionInfo,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TxStatus {
	Pending,
	Success,
	Failed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionInfo {
	pub hash: String,
	pub from: String,
	pub to: String,
	pub amount: String,
	pub fee: String,
	pub status: TxStatus,
	pub height: Option<u64>,
	/// Unix seconds, when the upstream reports it.
	pub timestamp: Option<u64>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub contract_address: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnSignTransactionRequest {
	pub chain: ChainName,
	/// Encoded [`crate::TransferIntent`] envelope.
	pub base64_tx: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnSignTransactionResponse {
	pub un_sign_tx: String,
}
