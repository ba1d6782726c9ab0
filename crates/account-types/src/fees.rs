//! Tiered fee quotes.

use crate::api::FeeResponse;

/// Three fee tiers in the chain's smallest unit.
///
/// Construct through [`FeeTiers::ordered`] or [`FeeTiers::flat`] so that
/// `fast >= normal >= slow` holds for every value handed to a caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeeTiers {
	fast: u128,
	normal: u128,
	slow: u128,
}

impl FeeTiers {
	/// Builds tiers from three noisy candidates: the largest becomes `fast`,
	/// the median `normal` and the smallest `slow`.
	pub fn ordered(fast: u128, normal: u128, slow: u128) -> Self {
		let mut tiers = [fast, normal, slow];
		tiers.sort_unstable_by(|a, b| b.cmp(a));
		Self {
			fast: tiers[0],
			normal: tiers[1],
			slow: tiers[2],
		}
	}

	/// Same fee for every tier, for chains without a fee market.
	pub fn flat(fee: u128) -> Self {
		Self {
			fast: fee,
			normal: fee,
			slow: fee,
		}
	}

	pub fn fast(&self) -> u128 {
		self.fast
	}

	pub fn normal(&self) -> u128 {
		self.normal
	}

	pub fn slow(&self) -> u128 {
		self.slow
	}
}

impl From<FeeTiers> for FeeResponse {
	fn from(tiers: FeeTiers) -> Self {
		FeeResponse {
			fast_fee: tiers.fast.to_string(),
			normal_fee: tiers.normal.to_string(),
			slow_fee: tiers.slow.to_string(),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_ordered_repairs_inversions() {
		let tiers = FeeTiers::ordered(5, 30, 10);
		assert_eq!(tiers.fast(), 30);
		assert_eq!(tiers.normal(), 10);
		assert_eq!(tiers.slow(), 5);
	}

	#[test]
	fn test_ordered_keeps_ties() {
		let tiers = FeeTiers::ordered(10, 10, 3);
		assert_eq!((tiers.fast(), tiers.normal(), tiers.slow()), (10, 10, 3));
	}

	#[test]
	fn test_flat_tiers_to_response() {
		let response: FeeResponse = FeeTiers::flat(10_000).into();
		assert_eq!(response.fast_fee, "10000");
		assert_eq!(response.normal_fee, "10000");
		assert_eq!(response.slow_fee, "10000");
	}
}
