//! Chain identifiers.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Name of a supported chain, e.g. `Icp` or `Ethereum`.
///
/// Names are matched exactly; the registry rejects duplicates.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChainName(String);

impl ChainName {
	pub const ICP: &'static str = "Icp";
	pub const ETHEREUM: &'static str = "Ethereum";

	pub fn new(name: impl Into<String>) -> Self {
		Self(name.into())
	}

	pub fn icp() -> Self {
		Self::new(Self::ICP)
	}

	pub fn ethereum() -> Self {
		Self::new(Self::ETHEREUM)
	}

	pub fn as_str(&self) -> &str {
		&self.0
	}
}

impl fmt::Display for ChainName {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

impl From<&str> for ChainName {
	fn from(name: &str) -> Self {
		Self::new(name)
	}
}

impl From<String> for ChainName {
	fn from(name: String) -> Self {
		Self(name)
	}
}

impl AsRef<str> for ChainName {
	fn as_ref(&self) -> &str {
		&self.0
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_chain_name_constants() {
		assert_eq!(ChainName::icp().as_str(), "Icp");
		assert_eq!(ChainName::ethereum().as_str(), "Ethereum");
	}

	#[test]
	fn test_chain_name_serializes_as_plain_string() {
		let json = serde_json::to_string(&ChainName::icp()).unwrap();
		assert_eq!(json, "\"Icp\"");

		let parsed: ChainName = serde_json::from_str("\"Polygon\"").unwrap();
		assert_eq!(parsed, ChainName::from("Polygon"));
	}
}
