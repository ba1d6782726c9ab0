//! Configuration types for the account service.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Complete service configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AppConfig {
	/// HTTP server settings
	#[serde(default)]
	pub server: ServerConfig,
	/// Chains to serve, keyed by the name callers use
	#[serde(default)]
	pub chains: BTreeMap<String, ChainConfig>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
	#[serde(default = "default_host")]
	pub host: String,
	#[serde(default = "default_port")]
	pub port: u16,
	/// Deadline applied to every upstream-backed request
	#[serde(default = "default_request_timeout_secs")]
	pub request_timeout_secs: u64,
}

impl Default for ServerConfig {
	fn default() -> Self {
		Self {
			host: default_host(),
			port: default_port(),
			request_timeout_secs: default_request_timeout_secs(),
		}
	}
}

/// Per-chain upstream configuration, selected by `kind`.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ChainConfig {
	/// Internet Computer ledger behind a Rosetta node
	Icp(IcpChainConfig),
	/// Ethereum-compatible chain behind a JSON-RPC node
	Evm(EvmChainConfig),
}

impl ChainConfig {
	pub fn rpc_url(&self) -> &str {
		match self {
			ChainConfig::Icp(c) => &c.rpc_url,
			ChainConfig::Evm(c) => &c.rpc_url,
		}
	}

	pub fn set_rpc_url(&mut self, url: String) {
		match self {
			ChainConfig::Icp(c) => c.rpc_url = url,
			ChainConfig::Evm(c) => c.rpc_url = url,
		}
	}

	pub fn max_retries(&self) -> u32 {
		match self {
			ChainConfig::Icp(c) => c.max_retries,
			ChainConfig::Evm(c) => c.max_retries,
		}
	}
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct IcpChainConfig {
	pub rpc_url: String,
	/// Rosetta network identifier; the mainnet ledger when absent
	#[serde(default)]
	pub network: Option<String>,
	#[serde(default = "default_max_retries")]
	pub max_retries: u32,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct EvmChainConfig {
	pub rpc_url: String,
	pub chain_id: u64,
	/// Etherscan-compatible API used for address history
	#[serde(default)]
	pub explorer_url: Option<String>,
	#[serde(default)]
	pub explorer_api_key: Option<String>,
	#[serde(default = "default_max_retries")]
	pub max_retries: u32,
}

fn default_host() -> String {
	"0.0.0.0".to_string()
}

fn default_port() -> u16 {
	8189
}

fn default_request_timeout_secs() -> u64 {
	30
}

fn default_max_retries() -> u32 {
	3
}
