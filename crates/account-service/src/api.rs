//! JSON API over the account dispatcher.
//!
//! Every operation is a `POST /api/v1/<operation>` taking the request record
//! as its body. Failures map to a status code by error kind and carry
//! `{error, message, retryable}`.

use account_chains::AccountDispatcher;
use account_types::{
	AccountRequest, AccountResponse, AdaptorError, BlockHashRequest, BlockHeader,
	BlockHeaderNumberRequest, BlockNumberRequest, BlockResponse, ChainName, ConvertAddressRequest,
	ConvertAddressResponse, ErrorKind, FeeRequest, FeeResponse, RequestContext,
	SupportChainsRequest, SupportChainsResponse, TxAddressRequest, TxAddressResponse,
	TxHashRequest, TxHashResponse, UnSignTransactionRequest, UnSignTransactionResponse,
	ValidAddressRequest, ValidAddressResponse,
};
use axum::{
	extract::State,
	http::StatusCode,
	response::{IntoResponse, Json, Response},
	routing::{get, post},
	Router,
};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

#[derive(Clone)]
pub struct AppState {
	dispatcher: AccountDispatcher,
	request_timeout: Duration,
}

impl AppState {
	pub fn new(dispatcher: AccountDispatcher, request_timeout: Duration) -> Self {
		Self {
			dispatcher,
			request_timeout,
		}
	}

	fn context(&self) -> RequestContext {
		RequestContext::new().with_timeout(self.request_timeout)
	}
}

pub fn router(state: AppState) -> Router {
	Router::new()
		.route("/health", get(health_check))
		.route("/api/v1/chains", get(list_chains))
		.route("/api/v1/support_chains", post(support_chains))
		.route("/api/v1/convert_address", post(convert_address))
		.route("/api/v1/valid_address", post(valid_address))
		.route("/api/v1/get_block_by_number", post(get_block_by_number))
		.route("/api/v1/get_block_by_hash", post(get_block_by_hash))
		.route("/api/v1/get_block_header_by_number", post(get_block_header_by_number))
		.route("/api/v1/get_account", post(get_account))
		.route("/api/v1/get_fee", post(get_fee))
		.route("/api/v1/get_tx_by_address", post(get_tx_by_address))
		.route("/api/v1/get_tx_by_hash", post(get_tx_by_hash))
		.route("/api/v1/build_unsign_transaction", post(build_unsign_transaction))
		.with_state(state)
		.layer(TraceLayer::new_for_http())
		.layer(CorsLayer::permissive())
}

/// Error body returned for every failed operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
	pub error: ErrorKind,
	pub message: String,
	pub retryable: bool,
}

pub struct ApiError(AdaptorError);

impl From<AdaptorError> for ApiError {
	fn from(error: AdaptorError) -> Self {
		Self(error)
	}
}

pub fn status_for(kind: ErrorKind) -> StatusCode {
	match kind {
		ErrorKind::UnsupportedChain
		| ErrorKind::InvalidPublicKey
		| ErrorKind::InvalidAddress
		| ErrorKind::MalformedEnvelope => StatusCode::BAD_REQUEST,
		ErrorKind::NotFound => StatusCode::NOT_FOUND,
		ErrorKind::UpstreamUnavailable | ErrorKind::Cancelled => StatusCode::SERVICE_UNAVAILABLE,
		ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
	}
}

impl IntoResponse for ApiError {
	fn into_response(self) -> Response {
		let kind = self.0.kind();
		let body = ErrorResponse {
			error: kind,
			message: self.0.to_string(),
			retryable: self.0.is_retryable(),
		};
		(status_for(kind), Json(body)).into_response()
	}
}

type ApiResult<T> = std::result::Result<Json<T>, ApiError>;

/// Liveness with the list of served chains
async fn health_check(State(state): State<AppState>) -> Json<serde_json::Value> {
	Json(serde_json::json!({
		"status": "ok",
		"chains": state.dispatcher.list_chains(),
		"timestamp": chrono::Utc::now().timestamp()
	}))
}

async fn list_chains(State(state): State<AppState>) -> Json<Vec<ChainName>> {
	Json(state.dispatcher.list_chains())
}

async fn support_chains(
	State(state): State<AppState>,
	Json(request): Json<SupportChainsRequest>,
) -> Json<SupportChainsResponse> {
	Json(state.dispatcher.support_chains(&request))
}

async fn convert_address(
	State(state): State<AppState>,
	Json(request): Json<ConvertAddressRequest>,
) -> ApiResult<ConvertAddressResponse> {
	Ok(Json(state.dispatcher.convert_address(&request)?))
}

async fn valid_address(
	State(state): State<AppState>,
	Json(request): Json<ValidAddressRequest>,
) -> ApiResult<ValidAddressResponse> {
	Ok(Json(state.dispatcher.valid_address(&request)?))
}

async fn get_block_by_number(
	State(state): State<AppState>,
	Json(request): Json<BlockNumberRequest>,
) -> ApiResult<BlockResponse> {
	let ctx = state.context();
	Ok(Json(state.dispatcher.get_block_by_number(&ctx, &request).await?))
}

async fn get_block_by_hash(
	State(state): State<AppState>,
	Json(request): Json<BlockHashRequest>,
) -> ApiResult<BlockResponse> {
	let ctx = state.context();
	Ok(Json(state.dispatcher.get_block_by_hash(&ctx, &request).await?))
}

async fn get_block_header_by_number(
	State(state): State<AppState>,
	Json(request): Json<BlockHeaderNumberRequest>,
) -> ApiResult<BlockHeader> {
	let ctx = state.context();
	Ok(Json(
		state
			.dispatcher
			.get_block_header_by_number(&ctx, &request)
			.await?,
	))
}

async fn get_account(
	State(state): State<AppState>,
	Json(request): Json<AccountRequest>,
) -> ApiResult<AccountResponse> {
	let ctx = state.context();
	Ok(Json(state.dispatcher.get_account(&ctx, &request).await?))
}

async fn get_fee(
	State(state): State<AppState>,
	Json(request): Json<FeeRequest>,
) -> ApiResult<FeeResponse> {
	let ctx = state.context();
	Ok(Json(state.dispatcher.get_fee(&ctx, &request).await?))
}

async fn get_tx_by_address(
	State(state): State<AppState>,
	Json(request): Json<TxAddressRequest>,
) -> ApiResult<TxAddressResponse> {
	let ctx = state.context();
	Ok(Json(state.dispatcher.get_tx_by_address(&ctx, &request).await?))
}

async fn get_tx_by_hash(
	State(state): State<AppState>,
	Json(request): Json<TxHashRequest>,
) -> ApiResult<TxHashResponse> {
	let ctx = state.context();
	Ok(Json(state.dispatcher.get_tx_by_hash(&ctx, &request).await?))
}

async fn build_unsign_transaction(
	State(state): State<AppState>,
	Json(request): Json<UnSignTransactionRequest>,
) -> ApiResult<UnSignTransactionResponse> {
	let ctx = state.context();
	Ok(Json(
		state
			.dispatcher
			.build_unsign_transaction(&ctx, &request)
			.await?,
	))
}

#[cfg(test)]
mod tests {
	use super::*;
	use account_chains::implementations::HttpRosettaClient;
	use account_chains::{AdaptorRegistry, IcpAdaptor, RetryPolicy};
	use axum::body::{to_bytes, Body};
	use axum::http::{header, Method, Request};
	use serde_json::{json, Value};
	use std::sync::Arc;
	use tower::ServiceExt;

	const PUBLIC_KEY: &str = "ab51a3b2dbc7c123ac8e93873611358fff297ea67ca9472125ba54af79c025e4";
	const ACCOUNT: &str = "9ca25295843f8a11bcfb2cff56a2ed236d91aafa96c1584cf9befdf6a3e96c69";

	// Nothing listens on port 1, so every upstream call fails fast.
	fn app() -> Router {
		let client = HttpRosettaClient::new("http://127.0.0.1:1").with_retry(RetryPolicy::none());
		let registry = AdaptorRegistry::new()
			.with_adaptor(Arc::new(IcpAdaptor::new(Arc::new(client))))
			.unwrap();
		let state = AppState::new(
			AccountDispatcher::new(Arc::new(registry)),
			Duration::from_secs(5),
		);
		router(state)
	}

	async fn send(method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
		let request = Request::builder().method(method).uri(uri);
		let request = match body {
			Some(body) => request
				.header(header::CONTENT_TYPE, "application/json")
				.body(Body::from(body.to_string()))
				.unwrap(),
			None => request.body(Body::empty()).unwrap(),
		};

		let response = app().oneshot(request).await.unwrap();
		let status = response.status();
		let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
		(status, serde_json::from_slice(&bytes).unwrap())
	}

	async fn post_json(uri: &str, body: Value) -> (StatusCode, Value) {
		send(Method::POST, uri, Some(body)).await
	}

	#[tokio::test]
	async fn test_health_and_chain_list() {
		let (status, body) = send(Method::GET, "/health", None).await;
		assert_eq!(status, StatusCode::OK);
		assert_eq!(body["status"], "ok");
		assert_eq!(body["chains"], json!(["Icp"]));

		let (status, body) = send(Method::GET, "/api/v1/chains", None).await;
		assert_eq!(status, StatusCode::OK);
		assert_eq!(body, json!(["Icp"]));
	}

	#[tokio::test]
	async fn test_local_operations() {
		let (status, body) = post_json(
			"/api/v1/convert_address",
			json!({"chain": "Icp", "public_key": PUBLIC_KEY}),
		)
		.await;
		assert_eq!(status, StatusCode::OK);
		assert_eq!(body["address"], ACCOUNT);

		let (status, body) = post_json(
			"/api/v1/valid_address",
			json!({"chain": "Icp", "address": "not-an-account"}),
		)
		.await;
		assert_eq!(status, StatusCode::OK);
		assert_eq!(body["valid"], false);

		let (status, body) =
			post_json("/api/v1/support_chains", json!({"chain": "Dogecoin"})).await;
		assert_eq!(status, StatusCode::OK);
		assert_eq!(body["support"], false);
	}

	#[tokio::test]
	async fn test_validation_errors_are_bad_requests() {
		let (status, body) = post_json("/api/v1/get_fee", json!({"chain": "Dogecoin"})).await;
		assert_eq!(status, StatusCode::BAD_REQUEST);
		assert_eq!(body["error"], "UNSUPPORTED_CHAIN");
		assert_eq!(body["retryable"], false);

		let (status, body) = post_json(
			"/api/v1/convert_address",
			json!({"chain": "Icp", "public_key": "zz"}),
		)
		.await;
		assert_eq!(status, StatusCode::BAD_REQUEST);
		assert_eq!(body["error"], "INVALID_PUBLIC_KEY");

		let (status, body) = post_json(
			"/api/v1/build_unsign_transaction",
			json!({"chain": "Icp", "base64_tx": "not base64"}),
		)
		.await;
		assert_eq!(status, StatusCode::BAD_REQUEST);
		assert_eq!(body["error"], "MALFORMED_ENVELOPE");
	}

	#[tokio::test]
	async fn test_malformed_hash_is_not_found() {
		let (status, body) = post_json(
			"/api/v1/get_tx_by_hash",
			json!({"chain": "Icp", "hash": "xyz"}),
		)
		.await;
		assert_eq!(status, StatusCode::NOT_FOUND);
		assert_eq!(body["error"], "NOT_FOUND");
		assert!(body["message"].as_str().unwrap().contains("GetTxByHash on Icp"));
	}

	#[tokio::test]
	async fn test_unreachable_upstream_is_unavailable() {
		let (status, body) = post_json("/api/v1/get_fee", json!({"chain": "Icp"})).await;
		assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
		assert_eq!(body["error"], "UPSTREAM_UNAVAILABLE");
		assert_eq!(body["retryable"], true);
	}

	#[test]
	fn test_status_mapping() {
		assert_eq!(status_for(ErrorKind::InvalidAddress), StatusCode::BAD_REQUEST);
		assert_eq!(status_for(ErrorKind::Cancelled), StatusCode::SERVICE_UNAVAILABLE);
		assert_eq!(status_for(ErrorKind::Internal), StatusCode::INTERNAL_SERVER_ERROR);
	}
}
