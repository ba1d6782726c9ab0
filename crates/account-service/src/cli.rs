//! Command-line interface definitions.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "wallet-chain-account")]
#[command(about = "Multi-chain wallet account service", long_about = None)]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Cli {
	/// Path to configuration file (TOML, JSON or YAML)
	#[arg(short, long, value_name = "FILE", default_value = "config/local.toml")]
	pub config: PathBuf,

	/// Log level used when RUST_LOG is unset (trace, debug, info, warn, error)
	#[arg(long, env = "ACCOUNT_LOG_LEVEL", default_value = "info")]
	pub log_level: String,

	#[command(subcommand)]
	pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
	/// Start the account service
	Start,
	/// Validate the configuration file
	Validate,
}
