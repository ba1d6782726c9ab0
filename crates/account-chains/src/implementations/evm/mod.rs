//! Adaptor for Ethereum and other EVM chains reached over JSON-RPC.
//!
//! One adaptor instance serves one configured chain; the chain id is baked into
//! every unsigned transaction it builds.

pub mod address;
pub mod client;
pub mod fee;
pub mod rpc;

pub use address::EvmAddress;
pub use client::{EvmRpcClient, ExplorerConfig, HttpEvmClient};

use crate::adaptor::{
	decode_public_key, is_hex_hash, parse_base_units, AddressNormalizer, ChainAdaptor,
};
use account_types::{
	AccountRequest, AccountResponse, AdaptorError, BlockHashRequest, BlockHeader,
	BlockHeaderNumberRequest, BlockNumberRequest, BlockResponse, ChainName, ConvertAddressRequest,
	ConvertAddressResponse, FeeRequest, FeeResponse, RequestContext, Result, SupportChainsRequest,
	SupportChainsResponse, TransactionInfo, TransferIntent, TxAddressRequest, TxAddressResponse,
	TxHashRequest, TxHashResponse, TxStatus, UnSignTransactionRequest, UnSignTransactionResponse,
	ValidAddressRequest, ValidAddressResponse,
};
use alloy::consensus::{SignableTransaction, TxEip1559};
use alloy::primitives::{TxKind, U256};
use async_trait::async_trait;
use rpc::{
	decimal_u128, quantity_u128, quantity_u256, quantity_u64, ExplorerTransaction, RpcBlock,
	RpcReceipt, RpcTransaction,
};
use std::sync::Arc;

/// Gas used by a plain value transfer.
pub const TRANSFER_GAS_LIMIT: u64 = 21_000;

pub struct EvmAdaptor {
	chain: ChainName,
	chain_id: u64,
	client: Arc<dyn EvmRpcClient>,
}

impl EvmAdaptor {
	pub fn new(chain: ChainName, chain_id: u64, client: Arc<dyn EvmRpcClient>) -> Self {
		Self {
			chain,
			chain_id,
			client,
		}
	}

	pub fn chain_id(&self) -> u64 {
		self.chain_id
	}
}

fn tx_hash(hash: &str) -> Result<String> {
	if !is_hex_hash(hash, 32) {
		return Err(AdaptorError::NotFound(format!("no block or transaction with hash '{}'", hash)));
	}
	let digits = hash.strip_prefix("0x").unwrap_or(hash);
	Ok(format!("0x{}", digits.to_lowercase()))
}

fn block_response(block: RpcBlock) -> Result<BlockResponse> {
	let header = header(&block)?;
	let transactions = block
		.transactions
		.iter()
		.map(|tx| included_transaction(tx, header.height, header.timestamp))
		.collect::<Result<Vec<_>>>()?;

	Ok(BlockResponse {
		header,
		transactions,
	})
}

fn header(block: &RpcBlock) -> Result<BlockHeader> {
	Ok(BlockHeader {
		height: quantity_u64(&block.number)?,
		hash: block.hash.clone(),
		parent_hash: block.parent_hash.clone(),
		timestamp: quantity_u64(&block.timestamp)?,
	})
}

/// Block listings carry no receipts: the fee is the declared gas cap and the
/// status reflects inclusion only.
fn included_transaction(tx: &RpcTransaction, height: u64, timestamp: u64) -> Result<TransactionInfo> {
	let gas = quantity_u128(&tx.gas)?;
	let gas_price = tx.gas_price.as_deref().map(quantity_u128).transpose()?.unwrap_or(0);

	Ok(TransactionInfo {
		hash: tx.hash.clone(),
		from: tx.from.clone(),
		to: tx.to.clone().unwrap_or_default(),
		amount: quantity_u256(&tx.value)?.to_string(),
		fee: gas.saturating_mul(gas_price).to_string(),
		status: TxStatus::Success,
		height: Some(height),
		timestamp: Some(timestamp),
		contract_address: None,
	})
}

fn receipt_transaction(tx: &RpcTransaction, receipt: Option<&RpcReceipt>) -> Result<TransactionInfo> {
	let height = tx.block_number.as_deref().map(quantity_u64).transpose()?;

	let (status, fee, contract_address) = match receipt {
		Some(receipt) => {
			let gas_used = quantity_u128(&receipt.gas_used)?;
			let price = receipt
				.effective_gas_price
				.as_deref()
				.or(tx.gas_price.as_deref())
				.map(quantity_u128)
				.transpose()?
				.unwrap_or(0);
			let status = match receipt.status.as_deref() {
				Some("0x1") => TxStatus::Success,
				Some(_) => TxStatus::Failed,
				// pre-Byzantium receipts have no status
				None => TxStatus::Success,
			};
			(status, gas_used.saturating_mul(price), receipt.contract_address.clone())
		}
		None => (TxStatus::Pending, 0, None),
	};

	Ok(TransactionInfo {
		hash: tx.hash.clone(),
		from: tx.from.clone(),
		to: tx.to.clone().unwrap_or_default(),
		amount: quantity_u256(&tx.value)?.to_string(),
		fee: fee.to_string(),
		status,
		height,
		timestamp: None,
		contract_address,
	})
}

fn explorer_transaction(tx: &ExplorerTransaction) -> Result<TransactionInfo> {
	let fee = decimal_u128(&tx.gas_used)?.saturating_mul(decimal_u128(&tx.gas_price)?);
	let height = u64::try_from(decimal_u128(&tx.block_number)?).ok();
	let timestamp = u64::try_from(decimal_u128(&tx.time_stamp)?).ok();

	Ok(TransactionInfo {
		hash: tx.hash.clone(),
		from: tx.from.clone(),
		to: tx.to.clone(),
		amount: tx.value.clone(),
		fee: fee.to_string(),
		status: if tx.is_error == "1" {
			TxStatus::Failed
		} else {
			TxStatus::Success
		},
		height,
		timestamp,
		contract_address: (!tx.contract_address.is_empty()).then(|| tx.contract_address.clone()),
	})
}

#[async_trait]
impl ChainAdaptor for EvmAdaptor {
	fn chain(&self) -> &ChainName {
		&self.chain
	}

	fn support_chains(&self, request: &SupportChainsRequest) -> SupportChainsResponse {
		if request.chain == self.chain {
			SupportChainsResponse::supported(format!(
				"{} (chain id {}) is supported",
				self.chain, self.chain_id
			))
		} else {
			SupportChainsResponse::unsupported(format!("{} is not served here", request.chain))
		}
	}

	fn convert_address(&self, request: &ConvertAddressRequest) -> Result<ConvertAddressResponse> {
		let key = decode_public_key(&request.public_key)?;
		Ok(ConvertAddressResponse {
			address: EvmAddress.derive_address(&key)?,
		})
	}

	fn valid_address(&self, request: &ValidAddressRequest) -> ValidAddressResponse {
		ValidAddressResponse {
			valid: EvmAddress.is_valid_address(&request.address),
		}
	}

	async fn get_block_by_number(
		&self,
		ctx: &RequestContext,
		request: &BlockNumberRequest,
	) -> Result<BlockResponse> {
		let block = ctx
			.run("eth_getBlockByNumber", self.client.block_by_number(Some(request.height)))
			.await?;
		block_response(block)
	}

	async fn get_block_by_hash(
		&self,
		ctx: &RequestContext,
		request: &BlockHashRequest,
	) -> Result<BlockResponse> {
		let hash = tx_hash(&request.hash)?;
		let block = ctx
			.run("eth_getBlockByHash", self.client.block_by_hash(&hash))
			.await?;
		block_response(block)
	}

	async fn get_block_header_by_number(
		&self,
		ctx: &RequestContext,
		request: &BlockHeaderNumberRequest,
	) -> Result<BlockHeader> {
		let block = ctx
			.run("eth_getBlockByNumber", self.client.block_by_number(request.height))
			.await?;
		header(&block)
	}

	async fn get_account(
		&self,
		ctx: &RequestContext,
		request: &AccountRequest,
	) -> Result<AccountResponse> {
		EvmAddress.ensure_valid_address(&request.address)?;
		let contract = request
			.contract_address
			.as_deref()
			.filter(|c| !c.is_empty());
		if let Some(contract) = contract {
			EvmAddress.ensure_valid_address(contract)?;
		}

		let balance = async {
			match contract {
				Some(token) => self.client.erc20_balance(token, &request.address).await,
				None => self.client.balance(&request.address).await,
			}
		};
		let nonce = self.client.transaction_count(&request.address);

		let (balance, sequence) = ctx
			.run("get_account", async { futures::try_join!(balance, nonce) })
			.await?;

		Ok(AccountResponse {
			network: self.chain.to_string(),
			address: request.address.clone(),
			balance: balance.to_string(),
			sequence,
		})
	}

	async fn get_fee(&self, ctx: &RequestContext, _: &FeeRequest) -> Result<FeeResponse> {
		let estimate = ctx
			.run("fee_estimate", fee::estimate(self.client.as_ref()))
			.await?;
		Ok(estimate.tiers.into())
	}

	async fn get_tx_by_address(
		&self,
		ctx: &RequestContext,
		request: &TxAddressRequest,
	) -> Result<TxAddressResponse> {
		EvmAddress.ensure_valid_address(&request.address)?;

		let found = ctx
			.run("txlist", self.client.transactions_by_address(&request.address))
			.await?;

		Ok(TxAddressResponse {
			transactions: found
				.iter()
				.map(explorer_transaction)
				.collect::<Result<Vec<_>>>()?,
		})
	}

	async fn get_tx_by_hash(
		&self,
		ctx: &RequestContext,
		request: &TxHashRequest,
	) -> Result<TxHashResponse> {
		let hash = tx_hash(&request.hash)?;

		let (tx, receipt) = ctx
			.run("get_transaction", async {
				futures::try_join!(
					self.client.transaction_by_hash(&hash),
					self.client.transaction_receipt(&hash)
				)
			})
			.await?;

		let tx = tx.ok_or_else(|| AdaptorError::NotFound(format!("transaction {}", request.hash)))?;
		Ok(TxHashResponse {
			transaction: receipt_transaction(&tx, receipt.as_ref())?,
		})
	}

	async fn build_unsign_transaction(
		&self,
		ctx: &RequestContext,
		request: &UnSignTransactionRequest,
	) -> Result<UnSignTransactionResponse> {
		let intent = TransferIntent::decode(&request.base64_tx)?;
		EvmAddress.ensure_valid_address(&intent.from)?;
		let to = EvmAddress::parse(&intent.to)?;
		let value = U256::from(parse_base_units(&intent.amount)?);

		let estimate = ctx
			.run("fee_estimate", fee::estimate(self.client.as_ref()))
			.await?;

		let tx = TxEip1559 {
			chain_id: self.chain_id,
			nonce: intent.nonce,
			gas_limit: TRANSFER_GAS_LIMIT,
			max_fee_per_gas: estimate.tiers.normal(),
			max_priority_fee_per_gas: estimate.priority_fee(),
			to: TxKind::Call(to),
			value,
			..Default::default()
		};

		Ok(UnSignTransactionResponse {
			un_sign_tx: format!("0x{}", hex::encode(tx.encoded_for_signing())),
		})
	}
}
