//! Registry for managing chain adaptors.
//!
//! The `AdaptorRegistry` maps chain names to their adaptors. It is filled once
//! during startup and then shared behind an `Arc`; after that point it is only
//! read, so any number of callers may resolve adaptors concurrently without
//! locking.

use crate::adaptor::ChainAdaptor;
use account_types::{AdaptorError, ChainName, Result};
use std::{collections::HashMap, fmt, sync::Arc};
use tracing::info;

pub struct AdaptorRegistry {
	adaptors: HashMap<ChainName, Arc<dyn ChainAdaptor>>,
}

impl AdaptorRegistry {
	/// Creates a new empty registry.
	pub fn new() -> Self {
		Self {
			adaptors: HashMap::new(),
		}
	}

	/// Registers an adaptor under the name it reports.
	///
	/// # Errors
	///
	/// Returns an error if an adaptor for the same chain is already registered.
	pub fn register(&mut self, adaptor: Arc<dyn ChainAdaptor>) -> Result<()> {
		let chain = adaptor.chain().clone();
		info!("Registering chain adaptor for {}", chain);

		if self.adaptors.contains_key(&chain) {
			return Err(AdaptorError::Internal(format!(
				"Chain {} already registered",
				chain
			)));
		}

		self.adaptors.insert(chain, adaptor);
		Ok(())
	}

	/// Builder-style variant of [`AdaptorRegistry::register`].
	pub fn with_adaptor(mut self, adaptor: Arc<dyn ChainAdaptor>) -> Result<Self> {
		self.register(adaptor)?;
		Ok(self)
	}

	pub fn get(&self, chain: &ChainName) -> Option<Arc<dyn ChainAdaptor>> {
		self.adaptors.get(chain).cloned()
	}

	/// Like [`AdaptorRegistry::get`] but fails with `UnsupportedChain`.
	pub fn get_required(&self, chain: &ChainName) -> Result<Arc<dyn ChainAdaptor>> {
		self.get(chain)
			.ok_or_else(|| AdaptorError::UnsupportedChain(format!("Chain {} not configured", chain)))
	}

	pub fn contains(&self, chain: &ChainName) -> bool {
		self.adaptors.contains_key(chain)
	}

	/// All registered chain names, sorted.
	pub fn chains(&self) -> Vec<ChainName> {
		let mut chains: Vec<ChainName> = self.adaptors.keys().cloned().collect();
		chains.sort();
		chains
	}

	pub fn len(&self) -> usize {
		self.adaptors.len()
	}

	pub fn is_empty(&self) -> bool {
		self.adaptors.is_empty()
	}
}

impl Default for AdaptorRegistry {
	fn default() -> Self {
		Self::new()
	}
}

impl fmt::Debug for AdaptorRegistry {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("AdaptorRegistry")
			.field("adaptors", &self.chains())
			.finish()
	}
}
