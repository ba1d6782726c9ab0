//! Internet Computer account identifiers.
//!
//! An account identifier is derived from the self-authenticating principal of
//! an Ed25519 key and the default (all zero) subaccount:
//!
//! ```text
//! principal  = sha224(der(public_key)) || 0x02
//! hash       = sha224("\x0Aaccount-id" || principal || subaccount)
//! account_id = crc32(hash) || hash
//! ```
//!
//! The 32-byte result is rendered as 64 lowercase hex characters.

use crate::adaptor::AddressNormalizer;
use account_types::{AdaptorError, Result};
use sha2::{Digest, Sha224};

/// DER SubjectPublicKeyInfo header for a raw Ed25519 key.
const ED25519_DER_PREFIX: [u8; 12] = [
	0x30, 0x2a, 0x30, 0x05, 0x06, 0x03, 0x2b, 0x65, 0x70, 0x03, 0x21, 0x00,
];
const ED25519_KEY_LEN: usize = 32;
const SELF_AUTHENTICATING_TAG: u8 = 0x02;
const ACCOUNT_DOMAIN_SEPARATOR: &[u8] = b"\x0Aaccount-id";
const DEFAULT_SUBACCOUNT: [u8; 32] = [0u8; 32];

pub const ACCOUNT_ID_LEN: usize = 32;

#[derive(Debug, Clone, Copy, Default)]
pub struct IcpAddress;

impl IcpAddress {
	/// Self-authenticating principal bytes (29 bytes) for an Ed25519 key.
	pub fn principal(public_key: &[u8]) -> Result<Vec<u8>> {
		if public_key.len() != ED25519_KEY_LEN {
			return Err(AdaptorError::InvalidPublicKey(format!(
				"expected {} byte Ed25519 key, got {} bytes",
				ED25519_KEY_LEN,
				public_key.len()
			)));
		}

		let mut der = Vec::with_capacity(ED25519_DER_PREFIX.len() + ED25519_KEY_LEN);
		der.extend_from_slice(&ED25519_DER_PREFIX);
		der.extend_from_slice(public_key);

		let mut principal = Sha224::digest(&der).to_vec();
		principal.push(SELF_AUTHENTICATING_TAG);
		Ok(principal)
	}

	pub fn account_identifier(principal: &[u8], subaccount: &[u8; 32]) -> [u8; ACCOUNT_ID_LEN] {
		let mut hasher = Sha224::new();
		hasher.update(ACCOUNT_DOMAIN_SEPARATOR);
		hasher.update(principal);
		hasher.update(subaccount);
		let hash = hasher.finalize();

		let mut account = [0u8; ACCOUNT_ID_LEN];
		account[..4].copy_from_slice(&crc32fast::hash(&hash).to_be_bytes());
		account[4..].copy_from_slice(&hash);
		account
	}
}

impl AddressNormalizer for IcpAddress {
	fn derive_address(&self, public_key: &[u8]) -> Result<String> {
		let principal = Self::principal(public_key)?;
		let account = Self::account_identifier(&principal, &DEFAULT_SUBACCOUNT);
		Ok(hex::encode(account))
	}

	fn is_valid_address(&self, address: &str) -> bool {
		if address.len() != ACCOUNT_ID_LEN * 2 {
			return false;
		}

		let Ok(bytes) = hex::decode(address) else {
			return false;
		};

		let (checksum, hash) = bytes.split_at(4);
		checksum == &crc32fast::hash(hash).to_be_bytes()[..]
	}
}
