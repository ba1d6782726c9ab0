//! Configuration for the account service.
//!
//! Files may be TOML, JSON or YAML; the format follows the file extension.
//! Environment variables override the port and per-chain RPC endpoints.

pub mod loader;
pub mod types;

pub use loader::ConfigLoader;
pub use types::{AppConfig, ChainConfig, EvmChainConfig, IcpChainConfig, ServerConfig};
