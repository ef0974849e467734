//! Client-side admission control with one continuously refilling bucket per request category.
//!
//! Every outbound call is classified into a [`Category`] by [`RateLimiter::select`]:
//!
//! 1. the authentication endpoint always draws from the auth bucket;
//! 2. `POST`, `PUT`, and `DELETE` draw from the write bucket;
//! 3. `GET` draws from the read bucket;
//! 4. any other method passes through without consuming a permit.
//!
//! Callers that find their bucket empty are suspended, not rejected, and are served in arrival
//! order within a category.

mod bucket;

pub use bucket::TokenBucket;

// std
use std::time::Duration as StdDuration;
// self
use crate::{_prelude::*, endpoint, error::RateLimitError, method::Method, obs};

/// Rate-limit bucket a request is charged against.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
	/// Calls to the authentication service.
	Auth,
	/// Non-mutating calls.
	Read,
	/// Mutating calls.
	Write,
}
impl Category {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			Category::Auth => "auth",
			Category::Read => "read",
			Category::Write => "write",
		}
	}

	/// Window over which the category's permit budget applies.
	pub const fn window(self) -> StdDuration {
		match self {
			Category::Auth => StdDuration::from_secs(5 * 60),
			Category::Read | Category::Write => StdDuration::from_secs(60),
		}
	}
}
impl Display for Category {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Permit budgets per category; each applies over [`Category::window`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RateLimits {
	/// Authentication calls per five minutes.
	pub auth: u32,
	/// Read calls per minute.
	pub read: u32,
	/// Write calls per minute.
	pub write: u32,
}
impl RateLimits {
	/// Returns the budget configured for `category`.
	pub const fn permits(&self, category: Category) -> u32 {
		match category {
			Category::Auth => self.auth,
			Category::Read => self.read,
			Category::Write => self.write,
		}
	}
}
impl Default for RateLimits {
	fn default() -> Self {
		Self { auth: 10, read: 100, write: 60 }
	}
}

/// Outcome of a successful admission.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Admission {
	/// Bucket that was charged, or `None` for methods that are not limited.
	pub category: Option<Category>,
	/// Permits left in the charged bucket right after admission.
	pub remaining: Option<u32>,
	/// Time spent suspended before the permit was granted.
	pub waited: StdDuration,
}
impl Admission {
	fn unlimited() -> Self {
		Self { category: None, remaining: None, waited: StdDuration::ZERO }
	}
}

/// Three independent buckets (auth, read, write) built from a [`RateLimits`] value.
#[derive(Debug)]
pub struct RateLimiter {
	auth: TokenBucket,
	read: TokenBucket,
	write: TokenBucket,
}
impl RateLimiter {
	/// Creates full buckets for the provided budgets.
	pub fn new(limits: RateLimits) -> Self {
		let bucket = |category| {
			TokenBucket::new(category, limits.permits(category), category.window())
		};

		Self {
			auth: bucket(Category::Auth),
			read: bucket(Category::Read),
			write: bucket(Category::Write),
		}
	}

	/// Picks the bucket for a call, or `None` when the call is not limited.
	pub fn select(method: Method, endpoint: &str) -> Option<Category> {
		if endpoint::is_authentication(endpoint) {
			Some(Category::Auth)
		} else if method.is_write() {
			Some(Category::Write)
		} else if method == Method::Get {
			Some(Category::Read)
		} else {
			None
		}
	}

	/// Returns the bucket backing `category`.
	pub fn bucket(&self, category: Category) -> &TokenBucket {
		match category {
			Category::Auth => &self.auth,
			Category::Read => &self.read,
			Category::Write => &self.write,
		}
	}

	/// Suspends until the call's bucket grants a permit.
	///
	/// Dropping the returned future before it resolves never consumes a permit.
	pub async fn acquire(&self, method: Method, endpoint: &str) -> Result<Admission, RateLimitError> {
		let Some(category) = Self::select(method, endpoint) else {
			return Ok(Admission::unlimited());
		};
		let admission = self.bucket(category).acquire().await?;

		obs::record_admission(category, !admission.waited.is_zero());

		#[cfg(feature = "tracing")]
		{
			if admission.waited.is_zero() {
				tracing::debug!(
					category = category.as_str(),
					remaining = admission.remaining,
					"permit granted"
				);
			} else {
				tracing::info!(
					category = category.as_str(),
					remaining = admission.remaining,
					waited_ms = admission.waited.as_millis() as u64,
					"permit granted after waiting for refill"
				);
			}
		}

		Ok(admission)
	}

	/// Current permit count for `category` without consuming one.
	pub fn remaining(&self, category: Category) -> u32 {
		self.bucket(category).remaining()
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::endpoint::{AUTHENTICATION_SERVICE, CAMPAIGN_SERVICE};

	fn small_limits() -> RateLimits {
		RateLimits { auth: 1, write: 2, read: 3 }
	}

	#[test]
	fn selection_prefers_authentication_endpoint() {
		assert_eq!(RateLimiter::select(Method::Post, AUTHENTICATION_SERVICE), Some(Category::Auth));
		assert_eq!(RateLimiter::select(Method::Get, AUTHENTICATION_SERVICE), Some(Category::Auth));
		assert_eq!(RateLimiter::select(Method::Post, CAMPAIGN_SERVICE), Some(Category::Write));
		assert_eq!(RateLimiter::select(Method::Put, ""), Some(Category::Write));
		assert_eq!(RateLimiter::select(Method::Delete, ""), Some(Category::Write));
		assert_eq!(RateLimiter::select(Method::Get, ""), Some(Category::Read));
		assert_eq!(RateLimiter::select(Method::Patch, ""), None);
		assert_eq!(RateLimiter::select(Method::Head, CAMPAIGN_SERVICE), None);
	}

	#[test]
	fn default_limits_match_platform_quotas() {
		let limits = RateLimits::default();

		assert_eq!((limits.auth, limits.read, limits.write), (10, 100, 60));
		assert_eq!(Category::Auth.window(), StdDuration::from_secs(300));
		assert_eq!(Category::Read.window(), StdDuration::from_secs(60));
		assert_eq!(Category::Write.window(), StdDuration::from_secs(60));
	}

	#[tokio::test]
	async fn acquire_reports_remaining_per_bucket() {
		let limiter = RateLimiter::new(small_limits());
		let auth = limiter
			.acquire(Method::Post, AUTHENTICATION_SERVICE)
			.await
			.expect("Auth admission should succeed.");
		let write = limiter.acquire(Method::Post, "").await.expect("Write admission should succeed.");
		let read = limiter.acquire(Method::Get, "").await.expect("Read admission should succeed.");

		assert_eq!(auth.category, Some(Category::Auth));
		assert_eq!(auth.remaining, Some(0));
		assert_eq!(write.category, Some(Category::Write));
		assert_eq!(write.remaining, Some(1));
		assert_eq!(read.category, Some(Category::Read));
		assert_eq!(read.remaining, Some(2));
	}

	#[tokio::test]
	async fn unlimited_methods_do_not_consume_permits() {
		let limiter = RateLimiter::new(small_limits());
		let admission =
			limiter.acquire(Method::Patch, CAMPAIGN_SERVICE).await.expect("Patch should pass.");

		assert_eq!(admission, Admission::unlimited());
		assert_eq!(limiter.remaining(Category::Read), 3);
		assert_eq!(limiter.remaining(Category::Write), 2);
	}

	#[tokio::test(start_paused = true)]
	async fn second_auth_admission_waits_for_refill() {
		let limiter = RateLimiter::new(small_limits());

		limiter
			.acquire(Method::Post, AUTHENTICATION_SERVICE)
			.await
			.expect("First auth admission should succeed.");

		let blocked = tokio::time::timeout(
			StdDuration::from_secs(299),
			limiter.acquire(Method::Post, AUTHENTICATION_SERVICE),
		)
		.await;

		assert!(blocked.is_err(), "The second auth admission must not resolve inside the window.");

		let admission = limiter
			.acquire(Method::Post, AUTHENTICATION_SERVICE)
			.await
			.expect("Auth admission should resolve once the bucket refills.");

		assert_eq!(admission.remaining, Some(0));
		assert!(!admission.waited.is_zero());
	}

	#[tokio::test]
	async fn misconfigured_bucket_fails_instead_of_granting() {
		let limiter = RateLimiter::new(RateLimits { auth: 0, ..small_limits() });
		let err = limiter
			.acquire(Method::Post, AUTHENTICATION_SERVICE)
			.await
			.expect_err("A zero-permit bucket must report an error.");

		assert!(matches!(err, RateLimitError::Misconfigured { category: Category::Auth, .. }));
	}
}
