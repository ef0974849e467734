//! Continuously refilling token bucket with first-come-first-served waiters.

// std
use std::time::Duration as StdDuration;
// crates.io
use tokio::{sync::Mutex as FifoMutex, time::Instant};
// self
use crate::{
	_prelude::*,
	error::RateLimitError,
	rate_limit::{Admission, Category},
};

// Keeps float rounding from producing zero-length sleeps.
const MIN_WAIT: StdDuration = StdDuration::from_millis(1);

/// Token bucket admitting at most `permits` calls in any `window`.
///
/// The bucket starts full and refills at `permits / window`, so capacity returns gradually
/// instead of resetting at window boundaries. Waiters queue on a FIFO lock, so the oldest
/// pending caller always gets the next permit.
pub struct TokenBucket {
	category: Category,
	permits: u32,
	window: StdDuration,
	state: Mutex<BucketState>,
	queue: FifoMutex<()>,
}
impl TokenBucket {
	/// Creates a full bucket.
	pub fn new(category: Category, permits: u32, window: StdDuration) -> Self {
		Self {
			category,
			permits,
			window,
			state: Mutex::new(BucketState {
				available: f64::from(permits),
				refilled_at: Instant::now(),
			}),
			queue: FifoMutex::new(()),
		}
	}

	/// Category this bucket charges.
	pub fn category(&self) -> Category {
		self.category
	}

	/// Permit budget per window.
	pub fn permits(&self) -> u32 {
		self.permits
	}

	/// Window the budget applies to.
	pub fn window(&self) -> StdDuration {
		self.window
	}

	/// Suspends until a permit is available, takes it, and reports what is left.
	pub async fn acquire(&self) -> Result<Admission, RateLimitError> {
		let rate = self.rate()?;
		let started = Instant::now();
		let _turn = self.queue.lock().await;

		loop {
			let wait = {
				let mut state = self.state.lock();

				state.refill(Instant::now(), rate, self.permits);

				if state.available >= 1.0 {
					state.available -= 1.0;

					return Ok(Admission {
						category: Some(self.category),
						remaining: Some(state.whole()),
						waited: started.elapsed(),
					});
				}

				StdDuration::from_secs_f64((1.0 - state.available) / rate).max(MIN_WAIT)
			};

			tokio::time::sleep(wait).await;
		}
	}

	/// Whole permits currently available, after accounting for refill.
	pub fn remaining(&self) -> u32 {
		let mut state = self.state.lock();

		if let Ok(rate) = self.rate() {
			state.refill(Instant::now(), rate, self.permits);
		}

		state.whole()
	}

	/// Refill rate in permits per second.
	fn rate(&self) -> Result<f64, RateLimitError> {
		if self.permits == 0 || self.window.is_zero() {
			return Err(RateLimitError::Misconfigured {
				category: self.category,
				permits: self.permits,
				window_ms: self.window.as_millis(),
			});
		}

		Ok(f64::from(self.permits) / self.window.as_secs_f64())
	}
}
impl Debug for TokenBucket {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("TokenBucket")
			.field("category", &self.category)
			.field("permits", &self.permits)
			.field("window", &self.window)
			.field("available", &self.state.lock().available)
			.finish()
	}
}

#[derive(Debug)]
struct BucketState {
	available: f64,
	refilled_at: Instant,
}
impl BucketState {
	fn refill(&mut self, now: Instant, rate: f64, capacity: u32) {
		let elapsed = now.saturating_duration_since(self.refilled_at);

		self.available = (self.available + elapsed.as_secs_f64() * rate).min(f64::from(capacity));
		self.refilled_at = now;
	}

	fn whole(&self) -> u32 {
		self.available.floor() as u32
	}
}
