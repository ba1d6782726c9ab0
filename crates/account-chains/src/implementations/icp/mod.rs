//! Internet Computer adaptor backed by a Rosetta node.
//!
//! Addresses are ledger account identifiers (see [`address`]). Amounts are
//! integer e8s; the unsigned blob is the hex encoding of the JSON transfer
//! operations a Rosetta construction flow expects.

pub mod address;
pub mod client;
pub mod rosetta;

pub use address::IcpAddress;
pub use client::{HttpRosettaClient, RosettaClient};

use crate::adaptor::{
	decode_public_key, is_hex_hash, parse_base_units, AddressNormalizer, ChainAdaptor,
};
use account_types::{
	AccountRequest, AccountResponse, AdaptorError, BlockHashRequest, BlockHeader,
	BlockHeaderNumberRequest, BlockNumberRequest, BlockResponse, ChainName, ConvertAddressRequest,
	ConvertAddressResponse, ErrorKind, FeeRequest, FeeResponse, FeeTiers, RequestContext, Result,
	SupportChainsRequest, SupportChainsResponse, TransactionInfo, TransferIntent, TxAddressRequest,
	TxAddressResponse, TxHashRequest, TxHashResponse, TxStatus, UnSignTransactionRequest,
	UnSignTransactionResponse, ValidAddressRequest, ValidAddressResponse,
};
use async_trait::async_trait;
use rosetta::{
	AccountIdentifier, Amount, Block, Currency, Operation, OperationIdentifier, PartialBlockIdentifier,
	Transaction, OPERATION_FEE, OPERATION_TRANSACTION, STATUS_COMPLETED,
};
use serde::Serialize;
use std::sync::Arc;
use tracing::debug;

const SYMBOL: &str = "ICP";
const NANOS_PER_SEC: u64 = 1_000_000_000;
const MILLIS_PER_SEC: u64 = 1_000;

pub struct IcpAdaptor {
	chain: ChainName,
	client: Arc<dyn RosettaClient>,
}

impl IcpAdaptor {
	pub fn new(client: Arc<dyn RosettaClient>) -> Self {
		Self {
			chain: ChainName::icp(),
			client,
		}
	}

	/// Registers the adaptor under a different name, e.g. a test network.
	pub fn with_chain(mut self, chain: ChainName) -> Self {
		self.chain = chain;
		self
	}

	async fn transfer_fee(&self, ctx: &RequestContext) -> Result<u128> {
		ctx.run("suggested_fee", self.client.suggested_fee())
			.await?
			.ok_or_else(|| {
				AdaptorError::UpstreamUnavailable("node reported no suggested fee".to_string())
			})
	}
}

/// Hashes are 32 bytes of hex; anything else cannot name a block or transaction.
fn block_or_tx_hash(hash: &str) -> Result<&str> {
	if !is_hex_hash(hash, 32) {
		return Err(AdaptorError::NotFound(format!("no block or transaction with hash '{}'", hash)));
	}
	Ok(hash.strip_prefix("0x").unwrap_or(hash))
}

fn header(block: &Block) -> BlockHeader {
	BlockHeader {
		height: block.block_identifier.index,
		hash: block.block_identifier.hash.clone(),
		parent_hash: block.parent_block_identifier.hash.clone(),
		timestamp: block.timestamp / MILLIS_PER_SEC,
	}
}

fn block_response(block: Block) -> BlockResponse {
	let header = header(&block);
	let transactions = block
		.transactions
		.iter()
		.map(|tx| transaction_info(tx, header.height, Some(header.timestamp)))
		.collect();

	BlockResponse {
		header,
		transactions,
	}
}

/// `block_timestamp` is used when the transaction metadata carries none.
fn transaction_info(
	tx: &Transaction,
	height: u64,
	block_timestamp: Option<u64>,
) -> TransactionInfo {
	let mut from = String::new();
	let mut to = String::new();
	let mut amount = String::from("0");
	let mut fee = String::from("0");

	for op in &tx.operations {
		let (Some(account), Some(value)) = (&op.account, &op.amount) else {
			continue;
		};
		match op.kind.as_str() {
			OPERATION_TRANSACTION => match value.value.strip_prefix('-') {
				Some(debit) => {
					from = account.address.clone();
					amount = debit.to_string();
				}
				None => {
					to = account.address.clone();
					amount = value.value.clone();
				}
			},
			OPERATION_FEE => {
				fee = value.value.trim_start_matches('-').to_string();
			}
			_ => {}
		}
	}

	let metadata = tx.metadata.clone().unwrap_or_default();

	TransactionInfo {
		hash: tx.transaction_identifier.hash.clone(),
		from,
		to,
		amount,
		fee,
		status: transaction_status(tx),
		height: Some(metadata.block_height.unwrap_or(height)),
		timestamp: metadata
			.timestamp
			.map(|ns| ns / NANOS_PER_SEC)
			.or(block_timestamp),
		contract_address: None,
	}
}

fn transaction_status(tx: &Transaction) -> TxStatus {
	let mut statuses = tx.operations.iter().filter_map(|op| op.status.as_deref()).peekable();
	if statuses.peek().is_none() {
		return TxStatus::Pending;
	}
	if statuses.all(|status| status == STATUS_COMPLETED) {
		TxStatus::Success
	} else {
		TxStatus::Failed
	}
}

#[derive(Debug, Serialize)]
struct UnsignedTransfer {
	operations: Vec<Operation>,
	metadata: TransferMetadata,
}

#[derive(Debug, Serialize)]
struct TransferMetadata {
	memo: u64,
}

fn transfer_operation(index: u64, kind: &str, address: &str, value: String) -> Operation {
	Operation {
		operation_identifier: OperationIdentifier { index },
		kind: kind.to_string(),
		status: None,
		account: Some(AccountIdentifier {
			address: address.to_string(),
		}),
		amount: Some(Amount {
			value,
			currency: Currency::icp(),
		}),
	}
}

fn unsigned_transfer(intent: &TransferIntent, amount: u64, fee: u128) -> UnsignedTransfer {
	UnsignedTransfer {
		operations: vec![
			transfer_operation(0, OPERATION_TRANSACTION, &intent.from, format!("-{}", amount)),
			transfer_operation(1, OPERATION_TRANSACTION, &intent.to, amount.to_string()),
			transfer_operation(2, OPERATION_FEE, &intent.from, format!("-{}", fee)),
		],
		metadata: TransferMetadata {
			memo: intent.nonce,
		},
	}
}

#[async_trait]
impl ChainAdaptor for IcpAdaptor {
	fn chain(&self) -> &ChainName {
		&self.chain
	}

	fn support_chains(&self, request: &SupportChainsRequest) -> SupportChainsResponse {
		let coin = request.coin.as_str();
		if request.chain == self.chain
			&& (coin.is_empty() || coin.eq_ignore_ascii_case(SYMBOL) || coin == self.chain.as_str())
		{
			SupportChainsResponse::supported(format!("{} is supported", self.chain))
		} else {
			SupportChainsResponse::unsupported(format!(
				"{} does not support coin '{}'",
				self.chain, request.coin
			))
		}
	}

	fn convert_address(&self, request: &ConvertAddressRequest) -> Result<ConvertAddressResponse> {
		let key = decode_public_key(&request.public_key)?;
		Ok(ConvertAddressResponse {
			address: IcpAddress.derive_address(&key)?,
		})
	}

	fn valid_address(&self, request: &ValidAddressRequest) -> ValidAddressResponse {
		ValidAddressResponse {
			valid: IcpAddress.is_valid_address(&request.address),
		}
	}

	async fn get_block_by_number(
		&self,
		ctx: &RequestContext,
		request: &BlockNumberRequest,
	) -> Result<BlockResponse> {
		let block = ctx
			.run("block", self.client.block(PartialBlockIdentifier::index(request.height)))
			.await?;
		Ok(block_response(block))
	}

	async fn get_block_by_hash(
		&self,
		ctx: &RequestContext,
		request: &BlockHashRequest,
	) -> Result<BlockResponse> {
		let hash = block_or_tx_hash(&request.hash)?;
		let block = ctx
			.run("block", self.client.block(PartialBlockIdentifier::hash(hash)))
			.await?;
		Ok(block_response(block))
	}

	async fn get_block_header_by_number(
		&self,
		ctx: &RequestContext,
		request: &BlockHeaderNumberRequest,
	) -> Result<BlockHeader> {
		let height = match request.height {
			Some(height) => height,
			None => {
				let status = ctx.run("network_status", self.client.network_status()).await?;
				status.current_block_identifier.index
			}
		};

		let block = ctx
			.run("block", self.client.block(PartialBlockIdentifier::index(height)))
			.await?;
		Ok(header(&block))
	}

	async fn get_account(
		&self,
		ctx: &RequestContext,
		request: &AccountRequest,
	) -> Result<AccountResponse> {
		IcpAddress.ensure_valid_address(&request.address)?;
		if let Some(contract) = &request.contract_address {
			debug!("Ignoring contract address {} on {}", contract, self.chain);
		}

		// the ledger has no record of an account that never received funds
		let balance = match ctx
			.run("account_balance", self.client.account_balance(&request.address))
			.await
		{
			Ok(response) => response
				.balances
				.into_iter()
				.find(|amount| amount.currency.symbol == SYMBOL)
				.map(|amount| amount.value)
				.unwrap_or_else(|| "0".to_string()),
			Err(e) if e.kind() == ErrorKind::NotFound => {
				debug!("Account {} unknown to the ledger: {}", request.address, e);
				"0".to_string()
			}
			Err(e) => return Err(e),
		};

		Ok(AccountResponse {
			network: self.chain.to_string(),
			address: request.address.clone(),
			balance,
			sequence: 0,
		})
	}

	async fn get_fee(&self, ctx: &RequestContext, _: &FeeRequest) -> Result<FeeResponse> {
		let fee = self.transfer_fee(ctx).await?;
		Ok(FeeTiers::flat(fee).into())
	}

	async fn get_tx_by_address(
		&self,
		ctx: &RequestContext,
		request: &TxAddressRequest,
	) -> Result<TxAddressResponse> {
		IcpAddress.ensure_valid_address(&request.address)?;

		let found = ctx
			.run(
				"search_transactions",
				self.client.transactions_by_account(&request.address),
			)
			.await?;

		Ok(TxAddressResponse {
			transactions: found
				.iter()
				.map(|entry| transaction_info(&entry.transaction, entry.block_identifier.index, None))
				.collect(),
		})
	}

	async fn get_tx_by_hash(
		&self,
		ctx: &RequestContext,
		request: &TxHashRequest,
	) -> Result<TxHashResponse> {
		let hash = block_or_tx_hash(&request.hash)?;

		let entry = ctx
			.run("search_transactions", self.client.transaction_by_hash(hash))
			.await?
			.ok_or_else(|| AdaptorError::NotFound(format!("transaction {}", request.hash)))?;

		Ok(TxHashResponse {
			transaction: transaction_info(&entry.transaction, entry.block_identifier.index, None),
		})
	}

	async fn build_unsign_transaction(
		&self,
		ctx: &RequestContext,
		request: &UnSignTransactionRequest,
	) -> Result<UnSignTransactionResponse> {
		let intent = TransferIntent::decode(&request.base64_tx)?;
		IcpAddress.ensure_valid_address(&intent.from)?;
		IcpAddress.ensure_valid_address(&intent.to)?;

		let amount = u64::try_from(parse_base_units(&intent.amount)?).map_err(|_| {
			AdaptorError::MalformedEnvelope(format!("amount {} exceeds the e8s range", intent.amount))
		})?;

		let fee = self.transfer_fee(ctx).await?;
		let payload = serde_json::to_vec(&unsigned_transfer(&intent, amount, fee))
			.map_err(|e| AdaptorError::Internal(format!("failed to serialize transfer: {}", e)))?;

		Ok(UnSignTransactionResponse {
			un_sign_tx: hex::encode(payload),
		})
	}
}
