//! Request orchestration: admission, expiry guard, and transport dispatch.
//!
//! Every call made through [`Client::request`] runs the same three steps:
//!
//! 1. acquire a permit from the bucket selected for `(method, endpoint)`, suspending while the
//!    bucket is empty;
//! 2. unless the call targets the authentication service, re-authorize with the stored
//!    credentials when the current token has expired (aborting the call if that fails);
//! 3. hand the call to the [`Transport`] with the current token attached.
//!
//! Expiry-triggered refreshes are single-flight: concurrent callers that observe the same
//! stale token queue on one guard, and those arriving after a successful refresh reuse its
//! token instead of authorizing again.

mod authorize;
mod metrics;

pub use metrics::RefreshMetrics;

// self
use crate::{
	_prelude::*,
	auth::{Credentials, Secret, Token, token},
	endpoint,
	method::Method,
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
	options::ClientOptions,
	rate_limit::RateLimiter,
	transport::Transport,
};
#[cfg(feature = "reqwest")]
use crate::{error::ConfigError, transport::ReqwestTransport};

#[cfg(feature = "reqwest")]
/// Client specialized for the crate's default reqwest transport.
pub type ReqwestApiClient = Client<ReqwestTransport>;

/// Authenticated API client bound to a single identity.
///
/// The client owns its options, rate-limit buckets, credentials, and token slot; nothing is
/// shared between independently constructed clients. Token replacement is an atomic swap, so
/// concurrent readers see either the old or the new token.
pub struct Client<T>
where
	T: ?Sized + Transport,
{
	/// Transport used for every outbound call.
	pub transport: Arc<T>,
	/// Shared counters for refresh outcomes.
	pub refresh_metrics: Arc<RefreshMetrics>,
	options: ClientOptions,
	rate_limiter: RateLimiter,
	credentials: RwLock<Option<Credentials>>,
	token: RwLock<Option<Token>>,
	refresh_guard: AsyncMutex<()>,
}
impl<T> Client<T>
where
	T: ?Sized + Transport,
{
	/// Creates a client that dispatches through the caller-provided transport.
	pub fn with_transport(options: ClientOptions, transport: impl Into<Arc<T>>) -> Self {
		Self {
			transport: transport.into(),
			refresh_metrics: Default::default(),
			rate_limiter: RateLimiter::new(options.limits),
			credentials: RwLock::new(None),
			token: RwLock::new(options.token.clone()),
			refresh_guard: AsyncMutex::new(()),
			options,
		}
	}

	/// Construction-time options.
	pub fn options(&self) -> &ClientOptions {
		&self.options
	}

	/// Buckets guarding outbound calls.
	pub fn rate_limiter(&self) -> &RateLimiter {
		&self.rate_limiter
	}

	/// Snapshot of the current token, if any.
	pub fn token(&self) -> Option<Token> {
		self.token.read().clone()
	}

	/// Returns `true` when stored credentials are available for re-authorization.
	pub fn has_credentials(&self) -> bool {
		self.credentials.read().is_some()
	}

	/// Checks whether the current token must be renewed at `now`.
	///
	/// A client without a token is always expired.
	pub fn is_expired_at(&self, now: OffsetDateTime) -> bool {
		token::is_expired_at(self.token.read().as_ref(), now)
	}

	/// Checks expiry against the current UTC clock.
	pub fn is_expired(&self) -> bool {
		self.is_expired_at(OffsetDateTime::now_utc())
	}

	/// Issues an API call, renewing the token first when needed.
	///
	/// Errors from admission, re-authorization, and the transport surface unchanged; a failed
	/// re-authorization aborts the call before it reaches the transport.
	pub async fn request(&self, method: Method, endpoint: &str, args: Value) -> Result<Value> {
		const KIND: FlowKind = FlowKind::Request;

		let span = FlowSpan::request(method.as_str(), endpoint);

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result = span
			.instrument(async {
				self.rate_limiter.acquire(method, endpoint).await?;

				if !endpoint::is_authentication(endpoint) && self.is_expired() {
					self.refresh_if_expired().await?;
				}

				self.send_now(method, endpoint, &args).await
			})
			.await;

		match &result {
			Ok(_) => obs::record_flow_outcome(KIND, FlowOutcome::Success),
			Err(_) => obs::record_flow_outcome(KIND, FlowOutcome::Failure),
		}

		result
	}

	/// Hands a call to the transport with whatever token is current right now.
	async fn send_now(&self, method: Method, endpoint: &str, args: &Value) -> Result<Value> {
		let token: Option<Secret> = self.token.read().as_ref().map(|token| token.value.clone());
		let body = self.transport.send(method, endpoint, args, token.as_ref()).await?;

		Ok(body)
	}

	/// Single-flight re-authorization used by the expiry guard.
	async fn refresh_if_expired(&self) -> Result<()> {
		let _singleflight = self.refresh_guard.lock().await;

		if !self.is_expired() {
			self.refresh_metrics.record_coalesced();

			return Ok(());
		}

		#[cfg(feature = "tracing")]
		tracing::info!("access token expired; re-authorizing with stored credentials");

		self.refresh_token().await?;

		Ok(())
	}
}
#[cfg(feature = "reqwest")]
impl Client<ReqwestTransport> {
	/// Creates a client backed by its own reqwest transport built from `options`.
	pub fn new(options: ClientOptions) -> Result<Self, ConfigError> {
		let transport = ReqwestTransport::from_options(&options)?;

		Ok(Self::with_transport(options, transport))
	}
}
impl<T> Debug for Client<T>
where
	T: ?Sized + Transport,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Client")
			.field("options", &self.options)
			.field("rate_limiter", &self.rate_limiter)
			.field("credentials_set", &self.has_credentials())
			.field("token", &self.token.read())
			.finish()
	}
}
