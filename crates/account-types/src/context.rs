//! Per-call cancellation and timeout signal.
//!
//! A `RequestContext` travels with every operation that may reach an upstream
//! node. Adaptors issue their upstream calls through [`RequestContext::run`],
//! which aborts the call as soon as the caller cancels or the deadline passes.

use crate::errors::{AdaptorError, Result};
use std::future::Future;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone)]
pub struct RequestContext {
	cancel: CancellationToken,
	timeout: Option<Duration>,
}

impl Default for RequestContext {
	fn default() -> Self {
		Self::new()
	}
}

impl RequestContext {
	/// A context with no deadline that is never cancelled unless asked to.
	pub fn new() -> Self {
		Self {
			cancel: CancellationToken::new(),
			timeout: None,
		}
	}

	pub fn with_timeout(mut self, timeout: Duration) -> Self {
		self.timeout = Some(timeout);
		self
	}

	/// Ties this context to a token owned by the caller, e.g. one cancelled
	/// when the HTTP client disconnects.
	pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
		self.cancel = token;
		self
	}

	pub fn timeout(&self) -> Option<Duration> {
		self.timeout
	}

	pub fn cancellation_token(&self) -> &CancellationToken {
		&self.cancel
	}

	pub fn cancel(&self) {
		self.cancel.cancel();
	}

	pub fn is_cancelled(&self) -> bool {
		self.cancel.is_cancelled()
	}

	/// Runs an upstream future under this context.
	///
	/// Cancellation yields `Cancelled`; an elapsed deadline yields
	/// `UpstreamUnavailable`. The inner future is dropped in both cases.
	pub async fn run<F, T>(&self, operation: &str, fut: F) -> Result<T>
	where
		F: Future<Output = Result<T>>,
	{
		if self.cancel.is_cancelled() {
			return Err(AdaptorError::Cancelled(format!(
				"{} cancelled before dispatch",
				operation
			)));
		}

		let bounded = async {
			match self.timeout {
				Some(limit) => tokio::time::timeout(limit, fut).await.map_err(|_| {
					AdaptorError::UpstreamUnavailable(format!(
						"{} timed out after {}ms",
						operation,
						limit.as_millis()
					))
				})?,
				None => fut.await,
			}
		};

		tokio::select! {
			biased;
			_ = self.cancel.cancelled() => Err(AdaptorError::Cancelled(format!(
				"{} cancelled by caller",
				operation
			))),
			result = bounded => result,
		}
	}
}
