//! Fake adaptor used by the registry and dispatcher tests.

use crate::adaptor::ChainAdaptor;
use account_types::{
	AccountRequest, AccountResponse, AdaptorError, BlockHashRequest, BlockHeader,
	BlockHeaderNumberRequest, BlockNumberRequest, BlockResponse, ChainName, ConvertAddressRequest,
	ConvertAddressResponse, FeeRequest, FeeResponse, FeeTiers, RequestContext, Result,
	SupportChainsRequest, SupportChainsResponse, TxAddressRequest, TxAddressResponse,
	TxHashRequest, TxHashResponse, UnSignTransactionRequest, UnSignTransactionResponse,
	ValidAddressRequest, ValidAddressResponse,
};
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};

pub struct StaticAdaptor {
	chain: ChainName,
	failure: Option<AdaptorError>,
	calls: AtomicUsize,
}

impl StaticAdaptor {
	pub fn new(chain: &str) -> Self {
		Self {
			chain: ChainName::from(chain),
			failure: None,
			calls: AtomicUsize::new(0),
		}
	}

	pub fn failing_with(mut self, error: AdaptorError) -> Self {
		self.failure = Some(error);
		self
	}

	pub fn calls(&self) -> usize {
		self.calls.load(Ordering::SeqCst)
	}

	fn touch(&self) -> Result<()> {
		self.calls.fetch_add(1, Ordering::SeqCst);
		match &self.failure {
			Some(error) => Err(error.clone()),
			None => Ok(()),
		}
	}

	fn header(&self) -> BlockHeader {
		BlockHeader {
			height: 1,
			hash: "00".repeat(32),
			parent_hash: "00".repeat(32),
			timestamp: 0,
		}
	}
}

#[async_trait]
impl ChainAdaptor for StaticAdaptor {
	fn chain(&self) -> &ChainName {
		&self.chain
	}

	fn support_chains(&self, request: &SupportChainsRequest) -> SupportChainsResponse {
		self.calls.fetch_add(1, Ordering::SeqCst);
		if request.chain == self.chain {
			SupportChainsResponse::supported("static")
		} else {
			SupportChainsResponse::unsupported("static")
		}
	}

	fn convert_address(&self, _: &ConvertAddressRequest) -> Result<ConvertAddressResponse> {
		self.touch()?;
		Ok(ConvertAddressResponse {
			address: "static".to_string(),
		})
	}

	fn valid_address(&self, _: &ValidAddressRequest) -> ValidAddressResponse {
		self.calls.fetch_add(1, Ordering::SeqCst);
		ValidAddressResponse { valid: true }
	}

	async fn get_block_by_number(
		&self,
		_: &RequestContext,
		_: &BlockNumberRequest,
	) -> Result<BlockResponse> {
		self.touch()?;
		Ok(BlockResponse {
			header: self.header(),
			transactions: vec![],
		})
	}

	async fn get_block_by_hash(
		&self,
		_: &RequestContext,
		_: &BlockHashRequest,
	) -> Result<BlockResponse> {
		self.touch()?;
		Ok(BlockResponse {
			header: self.header(),
			transactions: vec![],
		})
	}

	async fn get_block_header_by_number(
		&self,
		_: &RequestContext,
		_: &BlockHeaderNumberRequest,
	) -> Result<BlockHeader> {
		self.touch()?;
		Ok(self.header())
	}

	async fn get_account(&self, _: &RequestContext, request: &AccountRequest) -> Result<AccountResponse> {
		self.touch()?;
		Ok(AccountResponse {
			network: self.chain.to_string(),
			address: request.address.clone(),
			balance: "0".to_string(),
			sequence: 0,
		})
	}

	async fn get_fee(&self, _: &RequestContext, _: &FeeRequest) -> Result<FeeResponse> {
		self.touch()?;
		Ok(FeeTiers::flat(10_000).into())
	}

	async fn get_tx_by_address(
		&self,
		_: &RequestContext,
		_: &TxAddressRequest,
	) -> Result<TxAddressResponse> {
		self.touch()?;
		Ok(TxAddressResponse {
			transactions: vec![],
		})
	}

	async fn get_tx_by_hash(&self, _: &RequestContext, request: &TxHashRequest) -> Result<TxHashResponse> {
		self.touch()?;
		Err(AdaptorError::NotFound(format!("transaction {}", request.hash)))
	}

	async fn build_unsign_transaction(
		&self,
		_: &RequestContext,
		_: &UnSignTransactionRequest,
	) -> Result<UnSignTransactionResponse> {
		self.touch()?;
		Ok(UnSignTransactionResponse {
			un_sign_tx: "00".to_string(),
		})
	}
}
