//! Chain adaptor implementations.
//!
//! Available implementations:
//! - `icp`: Internet Computer ledger through a Rosetta node
//! - `evm`: Ethereum and EVM-compatible chains through JSON-RPC

pub mod evm;
pub mod icp;

pub use evm::{EvmAdaptor, EvmAddress, EvmRpcClient, ExplorerConfig, HttpEvmClient};
pub use icp::{HttpRosettaClient, IcpAdaptor, IcpAddress, RosettaClient};
