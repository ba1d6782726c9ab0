//! Adaptor construction from configuration and HTTP server lifecycle.

use crate::api;
use account_chains::implementations::{ExplorerConfig, HttpEvmClient, HttpRosettaClient};
use account_chains::{AccountDispatcher, AdaptorRegistry, EvmAdaptor, IcpAdaptor, RetryPolicy};
use account_config::{AppConfig, ChainConfig};
use account_types::ChainName;
use anyhow::{Context, Result};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Builds one adaptor per configured chain.
pub fn build_registry(config: &AppConfig) -> Result<AdaptorRegistry> {
	let mut registry = AdaptorRegistry::new();

	for (name, chain) in &config.chains {
		let retry = RetryPolicy::new().with_max_retries(chain.max_retries());
		let chain_name = ChainName::from(name.as_str());

		match chain {
			ChainConfig::Icp(icp) => {
				let mut client = HttpRosettaClient::new(&icp.rpc_url).with_retry(retry);
				if let Some(network) = &icp.network {
					client = client.with_network(network);
				}
				let adaptor = IcpAdaptor::new(Arc::new(client)).with_chain(chain_name);
				registry
					.register(Arc::new(adaptor))
					.with_context(|| format!("Failed to register chain {}", name))?;
			}
			ChainConfig::Evm(evm) => {
				let mut client = HttpEvmClient::new(&evm.rpc_url).with_retry(retry);
				if let Some(url) = &evm.explorer_url {
					client = client.with_explorer(ExplorerConfig {
						url: url.clone(),
						api_key: evm.explorer_api_key.clone(),
					});
				}
				let adaptor = EvmAdaptor::new(chain_name, evm.chain_id, Arc::new(client));
				registry
					.register(Arc::new(adaptor))
					.with_context(|| format!("Failed to register chain {}", name))?;
			}
		}
	}

	Ok(registry)
}

/// Serves the API until `shutdown` resolves.
pub async fn serve<F>(config: AppConfig, shutdown: F) -> Result<()>
where
	F: Future<Output = ()> + Send + 'static,
{
	let registry = build_registry(&config)?;
	info!("Serving chains: {:?}", registry.chains());

	let dispatcher = AccountDispatcher::new(Arc::new(registry));
	let state = api::AppState::new(
		dispatcher,
		Duration::from_secs(config.server.request_timeout_secs),
	);
	let app = api::router(state);

	let bind_address = format!("{}:{}", config.server.host, config.server.port);
	let listener = tokio::net::TcpListener::bind(&bind_address)
		.await
		.with_context(|| format!("Failed to bind {}", bind_address))?;

	info!("Account API listening on {}", bind_address);

	axum::serve(listener, app)
		.with_graceful_shutdown(shutdown)
		.await
		.context("HTTP server failed")?;

	Ok(())
}
