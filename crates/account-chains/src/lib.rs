//! Chain adaptors for the account service.
//!
//! This crate defines the [`ChainAdaptor`] contract every blockchain
//! integration satisfies, the [`AdaptorRegistry`] that maps chain names to
//! adaptors, and the [`AccountDispatcher`] callers use to reach them without
//! knowing chain-specific details.

pub mod adaptor;
pub mod dispatcher;
pub mod implementations;
pub mod registry;
pub mod retry;

#[cfg(test)]
mod testing;

pub use adaptor::{AddressNormalizer, ChainAdaptor};
pub use dispatcher::AccountDispatcher;
pub use implementations::{EvmAdaptor, IcpAdaptor};
pub use registry::AdaptorRegistry;
pub use retry::RetryPolicy;
