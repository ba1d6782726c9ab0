use account_config::{AppConfig, ChainConfig, ConfigLoader};
use account_service::cli::{Cli, Command};
use account_service::server;
use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
	let cli = Cli::parse();

	// Initialize tracing
	setup_tracing(&cli.log_level)?;

	match cli.command {
		Some(Command::Start) | None => start_service(cli).await,
		Some(Command::Validate) => validate_config(cli),
	}
}

async fn start_service(cli: Cli) -> Result<()> {
	info!("Starting wallet chain account service");

	let config = load_config(&cli)?;
	info!("HTTP port: {}", config.server.port);
	info!("Request timeout: {}s", config.server.request_timeout_secs);

	server::serve(config, setup_shutdown_signal()).await?;

	info!("Wallet chain account service stopped");
	Ok(())
}

fn validate_config(cli: Cli) -> Result<()> {
	let config = load_config(&cli)?;
	server::build_registry(&config).context("Failed to build chain adaptors")?;

	info!("Configuration is valid");
	for (name, chain) in &config.chains {
		match chain {
			ChainConfig::Icp(_) => info!("  {} (icp) -> {}", name, chain.rpc_url()),
			ChainConfig::Evm(evm) => {
				info!("  {} (evm, chain id {}) -> {}", name, evm.chain_id, chain.rpc_url());
				if evm.explorer_url.is_none() {
					warn!("  {} has no explorer configured; address history is unavailable", name);
				}
			}
		}
	}

	Ok(())
}

fn load_config(cli: &Cli) -> Result<AppConfig> {
	info!("Loading configuration from: {:?}", cli.config);
	ConfigLoader::from_file(&cli.config).context("Failed to load configuration")
}

fn setup_tracing(log_level: &str) -> Result<()> {
	let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
		.or_else(|_| tracing_subscriber::EnvFilter::try_new(log_level))
		.context("Invalid log level")?;

	tracing_subscriber::registry()
		.with(env_filter)
		.with(tracing_subscriber::fmt::layer())
		.init();

	Ok(())
}

async fn setup_shutdown_signal() {
	let ctrl_c = async {
		if let Err(e) = signal::ctrl_c().await {
			warn!("Failed to listen for Ctrl+C: {}", e);
			std::future::pending::<()>().await;
		}
	};

	#[cfg(unix)]
	let terminate = async {
		match signal::unix::signal(signal::unix::SignalKind::terminate()) {
			Ok(mut stream) => {
				stream.recv().await;
			}
			Err(e) => {
				warn!("Failed to install SIGTERM handler: {}", e);
				std::future::pending::<()>().await;
			}
		}
	};

	#[cfg(not(unix))]
	let terminate = std::future::pending::<()>();

	tokio::select! {
		_ = ctrl_c => {},
		_ = terminate => {},
	}

	info!("Shutdown signal received");
}
