//! Chain-agnostic entry point for the account operations.
//!
//! The dispatcher resolves the adaptor for the requested chain and forwards the
//! call. Unknown chains fail with `UnsupportedChain` before any adaptor runs;
//! adaptor failures keep their kind and gain the operation and chain name.

use crate::adaptor::ChainAdaptor;
use crate::registry::AdaptorRegistry;
use account_types::{
	AccountRequest, AccountResponse, AdaptorError, BlockHashRequest, BlockHeader,
	BlockHeaderNumberRequest, BlockNumberRequest, BlockResponse, ChainName, ConvertAddressRequest,
	ConvertAddressResponse, FeeRequest, FeeResponse, RequestContext, Result, SupportChainsRequest,
	SupportChainsResponse, TxAddressRequest, TxAddressResponse, TxHashRequest, TxHashResponse,
	UnSignTransactionRequest, UnSignTransactionResponse, ValidAddressRequest,
	ValidAddressResponse,
};
use std::sync::Arc;
use tracing::{debug, instrument, warn};

#[derive(Debug, Clone)]
pub struct AccountDispatcher {
	registry: Arc<AdaptorRegistry>,
}

impl AccountDispatcher {
	pub fn new(registry: Arc<AdaptorRegistry>) -> Self {
		Self { registry }
	}

	pub fn registry(&self) -> &AdaptorRegistry {
		&self.registry
	}

	pub fn list_chains(&self) -> Vec<ChainName> {
		self.registry.chains()
	}

	/// Never fails: an unknown chain is reported as unsupported.
	#[instrument(skip(self, request), fields(chain = %request.chain))]
	pub fn support_chains(&self, request: &SupportChainsRequest) -> SupportChainsResponse {
		match self.registry.get(&request.chain) {
			Some(adaptor) => adaptor.support_chains(request),
			None => {
				debug!("Support query for unregistered chain");
				SupportChainsResponse::unsupported(format!(
					"Chain {} is not supported",
					request.chain
				))
			}
		}
	}

	#[instrument(skip(self, request), fields(chain = %request.chain))]
	pub fn convert_address(&self, request: &ConvertAddressRequest) -> Result<ConvertAddressResponse> {
		let adaptor = self.resolve("ConvertAddress", &request.chain)?;
		adaptor
			.convert_address(request)
			.map_err(|e| failed("ConvertAddress", &request.chain, e))
	}

	#[instrument(skip(self, request), fields(chain = %request.chain))]
	pub fn valid_address(&self, request: &ValidAddressRequest) -> Result<ValidAddressResponse> {
		let adaptor = self.resolve("ValidAddress", &request.chain)?;
		Ok(adaptor.valid_address(request))
	}

	#[instrument(skip(self, ctx, request), fields(chain = %request.chain, height = request.height))]
	pub async fn get_block_by_number(
		&self,
		ctx: &RequestContext,
		request: &BlockNumberRequest,
	) -> Result<BlockResponse> {
		let adaptor = self.resolve("GetBlockByNumber", &request.chain)?;
		adaptor
			.get_block_by_number(ctx, request)
			.await
			.map_err(|e| failed("GetBlockByNumber", &request.chain, e))
	}

	#[instrument(skip(self, ctx, request), fields(chain = %request.chain))]
	pub async fn get_block_by_hash(
		&self,
		ctx: &RequestContext,
		request: &BlockHashRequest,
	) -> Result<BlockResponse> {
		let adaptor = self.resolve("GetBlockByHash", &request.chain)?;
		adaptor
			.get_block_by_hash(ctx, request)
			.await
			.map_err(|e| failed("GetBlockByHash", &request.chain, e))
	}

	#[instrument(skip(self, ctx, request), fields(chain = %request.chain))]
	pub async fn get_block_header_by_number(
		&self,
		ctx: &RequestContext,
		request: &BlockHeaderNumberRequest,
	) -> Result<BlockHeader> {
		let adaptor = self.resolve("GetBlockHeaderByNumber", &request.chain)?;
		adaptor
			.get_block_header_by_number(ctx, request)
			.await
			.map_err(|e| failed("GetBlockHeaderByNumber", &request.chain, e))
	}

	#[instrument(skip(self, ctx, request), fields(chain = %request.chain))]
	pub async fn get_account(
		&self,
		ctx: &RequestContext,
		request: &AccountRequest,
	) -> Result<AccountResponse> {
		let adaptor = self.resolve("GetAccount", &request.chain)?;
		adaptor
			.get_account(ctx, request)
			.await
			.map_err(|e| failed("GetAccount", &request.chain, e))
	}

	#[instrument(skip(self, ctx, request), fields(chain = %request.chain))]
	pub async fn get_fee(&self, ctx: &RequestContext, request: &FeeRequest) -> Result<FeeResponse> {
		let adaptor = self.resolve("GetFee", &request.chain)?;
		adaptor
			.get_fee(ctx, request)
			.await
			.map_err(|e| failed("GetFee", &request.chain, e))
	}

	#[instrument(skip(self, ctx, request), fields(chain = %request.chain))]
	pub async fn get_tx_by_address(
		&self,
		ctx: &RequestContext,
		request: &TxAddressRequest,
	) -> Result<TxAddressResponse> {
		let adaptor = self.resolve("GetTxByAddress", &request.chain)?;
		adaptor
			.get_tx_by_address(ctx, request)
			.await
			.map_err(|e| failed("GetTxByAddress", &request.chain, e))
	}

	#[instrument(skip(self, ctx, request), fields(chain = %request.chain))]
	pub async fn get_tx_by_hash(
		&self,
		ctx: &RequestContext,
		request: &TxHashRequest,
	) -> Result<TxHashResponse> {
		let adaptor = self.resolve("GetTxByHash", &request.chain)?;
		adaptor
			.get_tx_by_hash(ctx, request)
			.await
			.map_err(|e| failed("GetTxByHash", &request.chain, e))
	}

	#[instrument(skip(self, ctx, request), fields(chain = %request.chain))]
	pub async fn build_unsign_transaction(
		&self,
		ctx: &RequestContext,
		request: &UnSignTransactionRequest,
	) -> Result<UnSignTransactionResponse> {
		let adaptor = self.resolve("BuildUnSignTransaction", &request.chain)?;
		adaptor
			.build_unsign_transaction(ctx, request)
			.await
			.map_err(|e| failed("BuildUnSignTransaction", &request.chain, e))
	}

	fn resolve(&self, operation: &str, chain: &ChainName) -> Result<Arc<dyn ChainAdaptor>> {
		self.registry
			.get_required(chain)
			.map_err(|e| failed(operation, chain, e))
	}
}

fn failed(operation: &str, chain: &ChainName, error: AdaptorError) -> AdaptorError {
	if error.is_invalid_input() {
		debug!("{} rejected for {}: {}", operation, chain, error);
	} else {
		warn!("{} failed for {}: {}", operation, chain, error);
	}
	error.with_context(operation, chain)
}
