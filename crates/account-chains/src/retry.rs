//! Retry logic for upstream requests.
//!
//! Upstream clients route each request through a [`RetryPolicy`], which retries
//! transport failures with exponential backoff and gives up immediately on
//! anything else (absent blocks, rejected input).

use account_types::Result;
use backoff::{backoff::Backoff, ExponentialBackoff};
use std::future::Future;
use std::time::Duration;
use tracing::warn;

#[derive(Debug, Clone)]
pub struct RetryPolicy {
	backoff: ExponentialBackoff,
	max_retries: u32,
}

impl Default for RetryPolicy {
	fn default() -> Self {
		Self::new()
	}
}

impl RetryPolicy {
	/// Exponential backoff capped at 30 seconds overall, 3 retries.
	pub fn new() -> Self {
		let backoff = ExponentialBackoff {
			max_elapsed_time: Some(Duration::from_secs(30)),
			..Default::default()
		};

		Self {
			backoff,
			max_retries: 3,
		}
	}

	/// Single attempt, no retries.
	pub fn none() -> Self {
		Self::new().with_max_retries(0)
	}

	pub fn with_max_retries(mut self, max_retries: u32) -> Self {
		self.max_retries = max_retries;
		self
	}

	pub fn with_initial_interval(mut self, interval: Duration) -> Self {
		self.backoff.initial_interval = interval;
		self.backoff.current_interval = interval;
		self
	}

	pub fn max_retries(&self) -> u32 {
		self.max_retries
	}

	/// Runs `attempt` until it succeeds, fails with a non-retryable error, or
	/// the retry budget is spent.
	pub async fn retry<F, Fut, T>(&self, operation: &str, mut attempt: F) -> Result<T>
	where
		F: FnMut() -> Fut,
		Fut: Future<Output = Result<T>>,
	{
		let mut backoff = self.backoff.clone();
		backoff.reset();
		let mut attempts = 0;

		loop {
			match attempt().await {
				Ok(result) => return Ok(result),
				Err(e) if !e.is_retryable() => return Err(e),
				Err(e) => {
					attempts += 1;

					if attempts > self.max_retries {
						if self.max_retries > 0 {
							warn!(
								"{} failed after {} attempts, giving up: {}",
								operation, attempts, e
							);
						}
						return Err(e);
					}

					if let Some(delay) = backoff.next_backoff() {
						warn!(
							"{} failed, attempt {}/{}, retrying in {:?}: {}",
							operation, attempts, self.max_retries, delay, e
						);
						tokio::time::sleep(delay).await;
					} else {
						warn!(
							"{} failed, backoff exhausted after {} attempts: {}",
							operation, attempts, e
						);
						return Err(e);
					}
				}
			}
		}
	}
}
