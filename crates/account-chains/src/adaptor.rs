//! The operation contract every chain integration implements.

use account_types::{
	AccountRequest, AccountResponse, AdaptorError, BlockHashRequest, BlockHeader,
	BlockHeaderNumberRequest, BlockNumberRequest, BlockResponse, ChainName, ConvertAddressRequest,
	ConvertAddressResponse, FeeRequest, FeeResponse, RequestContext, Result, SupportChainsRequest,
	SupportChainsResponse, TxAddressRequest, TxAddressResponse, TxHashRequest, TxHashResponse,
	UnSignTransactionRequest, UnSignTransactionResponse, ValidAddressRequest,
	ValidAddressResponse,
};
use async_trait::async_trait;

/// Chain adaptor trait for serving account queries on one blockchain.
///
/// Operations that may reach an upstream node take a [`RequestContext`] and
/// must validate their input before issuing any upstream call. Adaptors hold
/// no mutable state, so one instance serves any number of concurrent calls.
#[async_trait]
pub trait ChainAdaptor: Send + Sync {
	/// Name this adaptor is registered under.
	fn chain(&self) -> &ChainName;

	fn support_chains(&self, request: &SupportChainsRequest) -> SupportChainsResponse;

	fn convert_address(&self, request: &ConvertAddressRequest) -> Result<ConvertAddressResponse>;

	fn valid_address(&self, request: &ValidAddressRequest) -> ValidAddressResponse;

	async fn get_block_by_number(
		&self,
		ctx: &RequestContext,
		request: &BlockNumberRequest,
	) -> Result<BlockResponse>;

	async fn get_block_by_hash(
		&self,
		ctx: &RequestContext,
		request: &BlockHashRequest,
	) -> Result<BlockResponse>;

	async fn get_block_header_by_number(
		&self,
		ctx: &RequestContext,
		request: &BlockHeaderNumberRequest,
	) -> Result<BlockHeader>;

	async fn get_account(
		&self,
		ctx: &RequestContext,
		request: &AccountRequest,
	) -> Result<AccountResponse>;

	async fn get_fee(&self, ctx: &RequestContext, request: &FeeRequest) -> Result<FeeResponse>;

	async fn get_tx_by_address(
		&self,
		ctx: &RequestContext,
		request: &TxAddressRequest,
	) -> Result<TxAddressResponse>;

	async fn get_tx_by_hash(
		&self,
		ctx: &RequestContext,
		request: &TxHashRequest,
	) -> Result<TxHashResponse>;

	async fn build_unsign_transaction(
		&self,
		ctx: &RequestContext,
		request: &UnSignTransactionRequest,
	) -> Result<UnSignTransactionResponse>;
}

/// Chain-specific address rules: derivation from a public key and syntax checks.
///
/// Both functions are pure. Every address returned by `derive_address` must
/// satisfy `is_valid_address`.
pub trait AddressNormalizer: Send + Sync {
	fn derive_address(&self, public_key: &[u8]) -> Result<String>;

	fn is_valid_address(&self, address: &str) -> bool;

	fn ensure_valid_address(&self, address: &str) -> Result<()> {
		if self.is_valid_address(address) {
			Ok(())
		} else {
			Err(AdaptorError::InvalidAddress(format!(
				"'{}' is not a valid address",
				address
			)))
		}
	}
}

/// Decodes a hex public key, tolerating a `0x` prefix.
pub fn decode_public_key(public_key: &str) -> Result<Vec<u8>> {
	let trimmed = public_key
		.strip_prefix("0x")
		.or_else(|| public_key.strip_prefix("0X"))
		.unwrap_or(public_key);

	if trimmed.is_empty() {
		return Err(AdaptorError::InvalidPublicKey(
			"public key is empty".to_string(),
		));
	}

	hex::decode(trimmed)
		.map_err(|e| AdaptorError::InvalidPublicKey(format!("public key is not hex: {}", e)))
}

/// True when `hash` is exactly `bytes` bytes of hex, with an optional `0x`.
pub fn is_hex_hash(hash: &str, bytes: usize) -> bool {
	let digits = hash.strip_prefix("0x").unwrap_or(hash);
	digits.len() == bytes * 2 && digits.bytes().all(|b| b.is_ascii_hexdigit())
}

/// Parses an integer amount in base units; fractional amounts are rejected
/// since no chain here has sub-unit precision.
pub fn parse_base_units(amount: &str) -> Result<u128> {
	if amount.contains('.') {
		let (integer, fraction) = amount.split_once('.').unwrap_or((amount, ""));
		if !fraction.bytes().all(|b| b == b'0') {
			return Err(AdaptorError::MalformedEnvelope(format!(
				"amount '{}' has a fractional base unit",
				amount
			)));
		}
		return parse_base_units(integer);
	}

	amount
		.parse::<u128>()
		.map_err(|e| AdaptorError::MalformedEnvelope(format!("amount '{}': {}", amount, e)))
}
