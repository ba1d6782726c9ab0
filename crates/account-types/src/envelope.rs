//! Chain-agnostic transfer envelope.
//!
//! Callers describe a transfer once as a [`TransferIntent`], encode it with
//! [`TransferIntent::encode`] and hand the resulting string to any chain's
//! build operation. The wire form is compact JSON wrapped in standard padded
//! base64, so it is plain ASCII and survives any transport field.
//!
//! Only the canonical form is accepted: every field present, in declaration
//! order, with no extra keys or whitespace. Decoding and re-encoding an
//! accepted envelope reproduces it byte for byte.
//!
//! Only the owning adaptor decodes an envelope; the intent's meaning (units of
//! `amount`, use of `nonce`, the signature placeholder) is chain specific.

use crate::errors::{AdaptorError, Result};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TransferIntent {
	pub nonce: u64,
	pub from: String,
	pub to: String,
	/// Non-negative decimal string in the chain's smallest unit.
	pub amount: String,
	/// Placeholder for an externally produced signature; may be empty.
	pub signature: String,
}

impl TransferIntent {
	pub fn new(
		nonce: u64,
		from: impl Into<String>,
		to: impl Into<String>,
		amount: impl Into<String>,
	) -> Self {
		Self {
			nonce,
			from: from.into(),
			to: to.into(),
			amount: amount.into(),
			signature: String::new(),
		}
	}

	pub fn with_signature(mut self, signature: impl Into<String>) -> Self {
		self.signature = signature.into();
		self
	}

	/// Serializes the intent and wraps it for transport.
	pub fn encode(&self) -> Result<String> {
		if !is_decimal_amount(&self.amount) {
			return Err(AdaptorError::MalformedEnvelope(format!(
				"amount '{}' is not a non-negative decimal",
				self.amount
			)));
		}

		let json = serde_json::to_vec(self)
			.map_err(|e| AdaptorError::Internal(format!("Failed to serialize intent: {}", e)))?;
		Ok(STANDARD.encode(json))
	}

	/// Unwraps and validates an envelope.
	///
	/// Fails with `MalformedEnvelope` when the base64 layer is corrupt, the
	/// JSON is missing a field or carries an unknown one, the nonce is not a
	/// non-negative integer, the amount is not a non-negative decimal string,
	/// or the payload is not in canonical form.
	pub fn decode(envelope: &str) -> Result<Self> {
		let json = STANDARD
			.decode(envelope)
			.map_err(|e| AdaptorError::MalformedEnvelope(format!("invalid base64: {}", e)))?;

		let intent: TransferIntent = serde_json::from_slice(&json)
			.map_err(|e| AdaptorError::MalformedEnvelope(format!("invalid payload: {}", e)))?;

		if !is_decimal_amount(&intent.amount) {
			return Err(AdaptorError::MalformedEnvelope(format!(
				"amount '{}' is not a non-negative decimal",
				intent.amount
			)));
		}

		let canonical = serde_json::to_vec(&intent)
			.map_err(|e| AdaptorError::Internal(format!("Failed to serialize intent: {}", e)))?;
		if canonical != json {
			return Err(AdaptorError::MalformedEnvelope(
				"payload is not in canonical form".to_string(),
			));
		}

		Ok(intent)
	}
}

/// `digits` or `digits.digits`; no sign, exponent or surrounding whitespace.
pub fn is_decimal_amount(amount: &str) -> bool {
	let (integer, fraction) = match amount.split_once('.') {
		Some((integer, fraction)) => (integer, Some(fraction)),
		None => (amount, None),
	};

	let all_digits = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());

	all_digits(integer) && fraction.map_or(true, all_digits)
}
