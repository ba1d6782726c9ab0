//! EVM addresses: keccak256 of the uncompressed secp256k1 point, EIP-55 rendered.

use crate::adaptor::AddressNormalizer;
use account_types::{AdaptorError, Result};
use alloy::primitives::{keccak256, Address};
use k256::elliptic_curve::sec1::ToEncodedPoint;

const RAW_KEY_LEN: usize = 64;
const UNCOMPRESSED_TAG: u8 = 0x04;

#[derive(Debug, Clone, Copy, Default)]
pub struct EvmAddress;

impl EvmAddress {
	/// Parses an address that already passed [`AddressNormalizer::is_valid_address`].
	pub fn parse(address: &str) -> Result<Address> {
		if !EvmAddress.is_valid_address(address) {
			return Err(AdaptorError::InvalidAddress(format!(
				"'{}' is not a valid address",
				address
			)));
		}
		address
			.parse::<Address>()
			.map_err(|e| AdaptorError::InvalidAddress(format!("'{}': {}", address, e)))
	}
}

impl AddressNormalizer for EvmAddress {
	fn derive_address(&self, public_key: &[u8]) -> Result<String> {
		let sec1 = if public_key.len() == RAW_KEY_LEN {
			let mut tagged = Vec::with_capacity(RAW_KEY_LEN + 1);
			tagged.push(UNCOMPRESSED_TAG);
			tagged.extend_from_slice(public_key);
			tagged
		} else {
			public_key.to_vec()
		};

		let key = k256::PublicKey::from_sec1_bytes(&sec1).map_err(|_| {
			AdaptorError::InvalidPublicKey(format!(
				"{} bytes are not a secp256k1 public key",
				public_key.len()
			))
		})?;

		let point = key.to_encoded_point(false);
		let hash = keccak256(&point.as_bytes()[1..]);
		Ok(Address::from_slice(&hash[12..]).to_checksum(None))
	}

	fn is_valid_address(&self, address: &str) -> bool {
		let Some(digits) = address.strip_prefix("0x") else {
			return false;
		};
		if digits.len() != 40 || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
			return false;
		}

		let has_lower = digits.bytes().any(|b| b.is_ascii_lowercase());
		let has_upper = digits.bytes().any(|b| b.is_ascii_uppercase());
		if !(has_lower && has_upper) {
			return true;
		}

		// mixed case must carry a correct EIP-55 checksum
		match hex::decode(digits) {
			Ok(bytes) => Address::from_slice(&bytes).to_checksum(None) == address,
			Err(_) => false,
		}
	}
}
