//! Three-tier fee quotes from `eth_feeHistory`.
//!
//! Each tier is the next block's base fee plus the mean priority reward paid at
//! one percentile over the sampled blocks. Nodes without history fall back to
//! `eth_gasPrice` with all tiers equal.

use super::client::EvmRpcClient;
use super::rpc::{quantity_u128, FeeHistory};
use account_types::{FeeTiers, Result};
use tracing::debug;

pub const FEE_HISTORY_BLOCKS: u64 = 10;
pub const REWARD_PERCENTILES: [f64; 3] = [90.0, 50.0, 10.0];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeeEstimate {
	pub tiers: FeeTiers,
	/// Base fee the tiers were built on; zero for gas price quotes.
	pub base_fee: u128,
}

impl FeeEstimate {
	/// Tip above the base fee implied by the normal tier.
	pub fn priority_fee(&self) -> u128 {
		self.tiers.normal().saturating_sub(self.base_fee)
	}
}

/// Builds tiers from a fee history, or `None` when it carries no usable signal.
pub fn tiers_from_history(history: &FeeHistory) -> Result<Option<FeeEstimate>> {
	let Some(next_base) = history.base_fee_per_gas.last() else {
		return Ok(None);
	};
	let base_fee = quantity_u128(next_base)?;

	let rewards = match &history.reward {
		Some(rewards) if !rewards.is_empty() => rewards,
		_ => return Ok(None),
	};

	let mut sums = [0u128; REWARD_PERCENTILES.len()];
	let mut samples = 0u128;
	for block in rewards {
		if block.len() != REWARD_PERCENTILES.len() {
			continue;
		}
		for (sum, reward) in sums.iter_mut().zip(block) {
			*sum = sum.saturating_add(quantity_u128(reward)?);
		}
		samples += 1;
	}
	if samples == 0 {
		return Ok(None);
	}

	let [high, mid, low] = sums.map(|sum| base_fee.saturating_add(sum / samples));
	Ok(Some(FeeEstimate {
		tiers: FeeTiers::ordered(high, mid, low),
		base_fee,
	}))
}

pub async fn estimate(client: &dyn EvmRpcClient) -> Result<FeeEstimate> {
	let history = client
		.fee_history(FEE_HISTORY_BLOCKS, &REWARD_PERCENTILES)
		.await?;

	if let Some(estimate) = tiers_from_history(&history)? {
		return Ok(estimate);
	}

	debug!("Fee history empty, falling back to gas price");
	let gas_price = client.gas_price().await?;
	Ok(FeeEstimate {
		tiers: FeeTiers::flat(gas_price),
		base_fee: 0,
	})
}

#[cfg(test)]
mod tests {
	use super::*;

	fn history(base: &[&str], reward: Option<Vec<[&str; 3]>>) -> FeeHistory {
		FeeHistory {
			base_fee_per_gas: base.iter().map(|s| s.to_string()).collect(),
			reward: reward.map(|blocks| {
				blocks
					.into_iter()
					.map(|b| b.iter().map(|s| s.to_string()).collect())
					.collect()
			}),
		}
	}

	#[test]
	fn test_tiers_from_history() {
		// base fee 100, rewards averaged over two blocks: 30/20/10
		let h = history(&["0x50", "0x64"], Some(vec![["0x28", "0x14", "0xa"], ["0x14", "0x14", "0xa"]]));
		let estimate = tiers_from_history(&h).unwrap().unwrap();

		assert_eq!(estimate.base_fee, 100);
		assert_eq!(estimate.tiers.fast(), 130);
		assert_eq!(estimate.tiers.normal(), 120);
		assert_eq!(estimate.tiers.slow(), 110);
		assert_eq!(estimate.priority_fee(), 20);
	}

	#[test]
	fn test_tiers_are_reordered_when_rewards_invert() {
		let h = history(&["0x0"], Some(vec![["0x1", "0x3", "0x2"]]));
		let tiers = tiers_from_history(&h).unwrap().unwrap().tiers;

		assert_eq!((tiers.fast(), tiers.normal(), tiers.slow()), (3, 2, 1));
	}

	#[test]
	fn test_empty_history_has_no_signal() {
		assert!(tiers_from_history(&FeeHistory::default()).unwrap().is_none());
		assert!(tiers_from_history(&history(&["0x1"], None)).unwrap().is_none());
		assert!(tiers_from_history(&history(&["0x1"], Some(vec![]))).unwrap().is_none());
	}

	#[test]
	fn test_malformed_history_is_an_error() {
		assert!(tiers_from_history(&history(&["oops"], Some(vec![["0x1", "0x1", "0x1"]]))).is_err());
	}
}
