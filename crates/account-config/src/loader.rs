//! Configuration loading from files and environment.

use crate::types::*;
use anyhow::{Context, Result};
use std::path::Path;
use tracing::{debug, info};

/// Overrides the HTTP port.
pub const HTTP_PORT_ENV: &str = "ACCOUNT_HTTP_PORT";
/// Prefix of per-chain RPC URL overrides, e.g. `RPC_URL_ETHEREUM`.
pub const RPC_URL_ENV_PREFIX: &str = "RPC_URL_";

/// Configuration loader
pub struct ConfigLoader;

impl ConfigLoader {
	/// Load configuration from file, apply environment overrides and validate
	pub fn from_file<P: AsRef<Path>>(path: P) -> Result<AppConfig> {
		let path = path.as_ref();
		info!("Loading configuration from {:?}", path);

		let contents = std::fs::read_to_string(path)
			.with_context(|| format!("Failed to read config file: {:?}", path))?;

		let mut config = match path.extension().and_then(|s| s.to_str()) {
			Some("toml") => Self::from_toml(&contents)?,
			Some("json") => Self::from_json(&contents)?,
			Some("yaml") | Some("yml") => Self::from_yaml(&contents)?,
			_ => anyhow::bail!("Unsupported config format: {:?}", path),
		};

		Self::apply_env_overrides(&mut config)?;
		Self::validate_config(&config)?;
		Ok(config)
	}

	/// Load from TOML string
	pub fn from_toml(contents: &str) -> Result<AppConfig> {
		toml::from_str(contents).map_err(|e| anyhow::anyhow!("Failed to parse TOML: {}", e))
	}

	/// Load from JSON string
	pub fn from_json(contents: &str) -> Result<AppConfig> {
		serde_json::from_str(contents).context("Failed to parse JSON")
	}

	/// Load from YAML string
	pub fn from_yaml(contents: &str) -> Result<AppConfig> {
		serde_yaml::from_str(contents).context("Failed to parse YAML")
	}

	fn apply_env_overrides(config: &mut AppConfig) -> Result<()> {
		Self::apply_overrides(config, std::env::vars())
	}

	/// Apply overrides from `(name, value)` pairs shaped like environment variables
	pub fn apply_overrides<I>(config: &mut AppConfig, vars: I) -> Result<()>
	where
		I: IntoIterator<Item = (String, String)>,
	{
		for (name, value) in vars {
			if name == HTTP_PORT_ENV {
				debug!("Overriding HTTP port from environment");
				config.server.port = value
					.parse()
					.with_context(|| format!("Invalid {}: {}", HTTP_PORT_ENV, value))?;
				continue;
			}

			if let Some(suffix) = name.strip_prefix(RPC_URL_ENV_PREFIX) {
				let chain = config
					.chains
					.iter_mut()
					.find(|(chain, _)| chain.to_uppercase() == suffix);
				if let Some((chain, chain_config)) = chain {
					debug!("Overriding RPC URL for chain {} from environment", chain);
					chain_config.set_rpc_url(value);
				}
			}
		}

		Ok(())
	}

	/// Validate configuration
	pub fn validate_config(config: &AppConfig) -> Result<()> {
		if config.chains.is_empty() {
			anyhow::bail!("At least one chain must be configured");
		}

		if config.server.request_timeout_secs == 0 {
			anyhow::bail!("server.request_timeout_secs must be greater than zero");
		}

		for (name, chain) in &config.chains {
			if name.trim().is_empty() {
				anyhow::bail!("Chain names must not be empty");
			}

			check_url(name, "rpc_url", chain.rpc_url())?;

			if let ChainConfig::Evm(evm) = chain {
				if evm.chain_id == 0 {
					anyhow::bail!("Chain {}: chain_id must be greater than zero", name);
				}
				if let Some(explorer) = &evm.explorer_url {
					check_url(name, "explorer_url", explorer)?;
				}
			}
		}

		Ok(())
	}
}

fn check_url(chain: &str, field: &str, url: &str) -> Result<()> {
	if !(url.starts_with("http://") || url.starts_with("https://")) {
		anyhow::bail!("Chain {}: {} must be an http(s) URL, got '{}'", chain, field, url);
	}
	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::io::Write;

	const TOML: &str = r#"
[server]
host = "127.0.0.1"
port = 9000
request_timeout_secs = 10

[chains.Icp]
kind = "icp"
rpc_url = "http://127.0.0.1:8081"
network = "00000000000000020101"

[chains.Ethereum]
kind = "evm"
rpc_url = "https://eth.example.org"
chain_id = 1
explorer_url = "https://api.etherscan.io/api"
explorer_api_key = "key"
max_retries = 5
"#;

	#[test]
	fn test_toml_parsing() {
		let config = ConfigLoader::from_toml(TOML).unwrap();

		assert_eq!(config.server.port, 9000);
		assert_eq!(config.chains.len(), 2);
		assert_eq!(
			config.chains["Icp"],
			ChainConfig::Icp(IcpChainConfig {
				rpc_url: "http://127.0.0.1:8081".into(),
				network: Some("00000000000000020101".into()),
				max_retries: 3,
			})
		);
		match &config.chains["Ethereum"] {
			ChainConfig::Evm(evm) => {
				assert_eq!(evm.chain_id, 1);
				assert_eq!(evm.max_retries, 5);
				assert_eq!(evm.explorer_api_key.as_deref(), Some("key"));
			}
			other => panic!("unexpected chain config {:?}", other),
		}
		ConfigLoader::validate_config(&config).unwrap();
	}

	#[test]
	fn test_server_defaults() {
		let config = ConfigLoader::from_toml(
			r#"
[chains.Icp]
kind = "icp"
rpc_url = "http://localhost:8081"
"#,
		)
		.unwrap();

		assert_eq!(config.server.host, "0.0.0.0");
		assert_eq!(config.server.port, 8189);
		assert_eq!(config.server.request_timeout_secs, 30);
	}

	#[test]
	fn test_json_and_yaml_parsing() {
		let json = r#"{
			"chains": {
				"Polygon": {"kind": "evm", "rpc_url": "https://polygon.example.org", "chain_id": 137}
			}
		}"#;
		let config = ConfigLoader::from_json(json).unwrap();
		assert_eq!(config.chains["Polygon"].rpc_url(), "https://polygon.example.org");

		let yaml = "chains:\n  Icp:\n    kind: icp\n    rpc_url: http://localhost:8081\n";
		let config = ConfigLoader::from_yaml(yaml).unwrap();
		assert!(matches!(config.chains["Icp"], ChainConfig::Icp(_)));
	}

	#[test]
	fn test_unknown_kind_is_rejected() {
		let result = ConfigLoader::from_toml(
			r#"
[chains.Solana]
kind = "svm"
rpc_url = "https://solana.example.org"
"#,
		);
		assert!(result.is_err());
	}

	#[test]
	fn test_overrides() {
		let mut config = ConfigLoader::from_toml(TOML).unwrap();
		ConfigLoader::apply_overrides(
			&mut config,
			vec![
				("ACCOUNT_HTTP_PORT".to_string(), "7000".to_string()),
				("RPC_URL_ETHEREUM".to_string(), "https://other.example.org".to_string()),
				("RPC_URL_DOGECOIN".to_string(), "https://ignored.example.org".to_string()),
			],
		)
		.unwrap();

		assert_eq!(config.server.port, 7000);
		assert_eq!(config.chains["Ethereum"].rpc_url(), "https://other.example.org");
		assert_eq!(config.chains.len(), 2);

		let err = ConfigLoader::apply_overrides(
			&mut config,
			vec![("ACCOUNT_HTTP_PORT".to_string(), "not-a-port".to_string())],
		)
		.unwrap_err();
		assert!(err.to_string().contains("ACCOUNT_HTTP_PORT"));
	}

	#[test]
	fn test_validation() {
		let empty = AppConfig::default();
		assert!(ConfigLoader::validate_config(&empty)
			.unwrap_err()
			.to_string()
			.contains("At least one chain"));

		let mut config = ConfigLoader::from_toml(TOML).unwrap();
		config.chains.get_mut("Icp").unwrap().set_rpc_url("ftp://node".into());
		assert!(ConfigLoader::validate_config(&config).is_err());

		let mut config = ConfigLoader::from_toml(TOML).unwrap();
		if let Some(ChainConfig::Evm(evm)) = config.chains.get_mut("Ethereum") {
			evm.chain_id = 0;
		}
		assert!(ConfigLoader::validate_config(&config)
			.unwrap_err()
			.to_string()
			.contains("chain_id"));

		let mut config = ConfigLoader::from_toml(TOML).unwrap();
		config.server.request_timeout_secs = 0;
		assert!(ConfigLoader::validate_config(&config).is_err());
	}

	#[test]
	fn test_from_file_by_extension() {
		let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
		file.write_all(TOML.as_bytes()).unwrap();

		let config = ConfigLoader::from_file(file.path()).unwrap();
		assert_eq!(config.chains.len(), 2);

		let unsupported = tempfile::Builder::new().suffix(".ini").tempfile().unwrap();
		assert!(ConfigLoader::from_file(unsupported.path())
			.unwrap_err()
			.to_string()
			.contains("Unsupported config format"));

		assert!(ConfigLoader::from_file("/nonexistent/config.toml").is_err());
	}
}
