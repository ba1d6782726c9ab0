//! Error types returned across the adaptor boundary.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, AdaptorError>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AdaptorError {
	#[error("Unsupported chain: {0}")]
	UnsupportedChain(String),

	#[error("Invalid public key: {0}")]
	InvalidPublicKey(String),

	#[error("Invalid address: {0}")]
	InvalidAddress(String),

	#[error("Malformed envelope: {0}")]
	MalformedEnvelope(String),

	#[error("Not found: {0}")]
	NotFound(String),

	#[error("Upstream unavailable: {0}")]
	UpstreamUnavailable(String),

	#[error("Cancelled: {0}")]
	Cancelled(String),

	#[error("Internal error: {0}")]
	Internal(String),
}

/// Discriminant of [`AdaptorError`], used for wire codes and retry decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
	UnsupportedChain,
	InvalidPublicKey,
	InvalidAddress,
	MalformedEnvelope,
	NotFound,
	UpstreamUnavailable,
	Cancelled,
	Internal,
}

impl ErrorKind {
	pub fn as_str(&self) -> &'static str {
		match self {
			ErrorKind::UnsupportedChain => "UNSUPPORTED_CHAIN",
			ErrorKind::InvalidPublicKey => "INVALID_PUBLIC_KEY",
			ErrorKind::InvalidAddress => "INVALID_ADDRESS",
			ErrorKind::MalformedEnvelope => "MALFORMED_ENVELOPE",
			ErrorKind::NotFound => "NOT_FOUND",
			ErrorKind::UpstreamUnavailable => "UPSTREAM_UNAVAILABLE",
			ErrorKind::Cancelled => "CANCELLED",
			ErrorKind::Internal => "INTERNAL",
		}
	}
}

impl fmt::Display for ErrorKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl AdaptorError {
	pub fn kind(&self) -> ErrorKind {
		match self {
			AdaptorError::UnsupportedChain(_) => ErrorKind::UnsupportedChain,
			AdaptorError::InvalidPublicKey(_) => ErrorKind::InvalidPublicKey,
			AdaptorError::InvalidAddress(_) => ErrorKind::InvalidAddress,
			AdaptorError::MalformedEnvelope(_) => ErrorKind::MalformedEnvelope,
			AdaptorError::NotFound(_) => ErrorKind::NotFound,
			AdaptorError::UpstreamUnavailable(_) => ErrorKind::UpstreamUnavailable,
			AdaptorError::Cancelled(_) => ErrorKind::Cancelled,
			AdaptorError::Internal(_) => ErrorKind::Internal,
		}
	}

	/// Only transport-level failures are worth retrying; bad input stays bad.
	pub fn is_retryable(&self) -> bool {
		matches!(self, AdaptorError::UpstreamUnavailable(_))
	}

	/// True for errors detected locally from the request itself.
	pub fn is_invalid_input(&self) -> bool {
		matches!(
			self,
			AdaptorError::UnsupportedChain(_)
				| AdaptorError::InvalidPublicKey(_)
				| AdaptorError::InvalidAddress(_)
				| AdaptorError::MalformedEnvelope(_)
		)
	}

	/// Prefixes the message with the operation and chain, keeping the kind.
	pub fn with_context(self, operation: &str, chain: impl fmt::Display) -> Self {
		self.map_message(|message| format!("{} on {}: {}", operation, chain, message))
	}

	fn map_message(self, f: impl FnOnce(String) -> String) -> Self {
		match self {
			AdaptorError::UnsupportedChain(m) => AdaptorError::UnsupportedChain(f(m)),
			AdaptorError::InvalidPublicKey(m) => AdaptorError::InvalidPublicKey(f(m)),
			AdaptorError::InvalidAddress(m) => AdaptorError::InvalidAddress(f(m)),
			AdaptorError::MalformedEnvelope(m) => AdaptorError::MalformedEnvelope(f(m)),
			AdaptorError::NotFound(m) => AdaptorError::NotFound(f(m)),
			AdaptorError::UpstreamUnavailable(m) => AdaptorError::UpstreamUnavailable(f(m)),
			AdaptorError::Cancelled(m) => AdaptorError::Cancelled(f(m)),
			AdaptorError::Internal(m) => AdaptorError::Internal(f(m)),
		}
	}
}
