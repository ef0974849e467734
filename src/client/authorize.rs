//! Credential exchange and re-authorization.
//!
//! [`Client::authorize`] stores the credentials, drops the cached token, and exchanges the
//! credentials at the authentication service. [`Client::refresh_token`] replays the stored
//! credentials through the same exchange; the platform has no lightweight refresh grant.

// self
use crate::{
	_prelude::*,
	auth::{Credentials, Secret, Token},
	client::Client,
	endpoint::AUTHENTICATION_SERVICE,
	error::CredentialError,
	method::Method,
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
	transport::Transport,
};

impl<T> Client<T>
where
	T: ?Sized + Transport,
{
	/// Exchanges `username`/`password` for a token and remembers both for later renewals.
	///
	/// Empty values fail with [`CredentialError`] before anything is sent.
	pub async fn authorize(
		&self,
		username: impl Into<String>,
		password: impl Into<Secret>,
	) -> Result<Token> {
		const KIND: FlowKind = FlowKind::Authorize;

		let span = FlowSpan::new(KIND, "authorize");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let credentials = Credentials::new(username, password);
		let result = span
			.instrument(async move { self.exchange_credentials(credentials?).await })
			.await;

		match &result {
			Ok(_) => obs::record_flow_outcome(KIND, FlowOutcome::Success),
			Err(_) => obs::record_flow_outcome(KIND, FlowOutcome::Failure),
		}

		result
	}

	/// Re-authorizes with the credentials stored by the last [`Client::authorize`] call.
	pub async fn refresh_token(&self) -> Result<Token> {
		const KIND: FlowKind = FlowKind::Refresh;

		let span = FlowSpan::new(KIND, "refresh_token");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result = span
			.instrument(async move {
				self.refresh_metrics.record_attempt();

				let stored = self.credentials.read().clone();
				let credentials = stored.ok_or_else(|| {
					self.refresh_metrics.record_failure();

					Error::from(CredentialError::NotAuthorized)
				})?;
				let token = self.exchange_credentials(credentials).await.inspect_err(|_| {
					self.refresh_metrics.record_failure();
				})?;

				self.refresh_metrics.record_success();

				Ok(token)
			})
			.await;

		match &result {
			Ok(_) => obs::record_flow_outcome(KIND, FlowOutcome::Success),
			Err(_) => obs::record_flow_outcome(KIND, FlowOutcome::Failure),
		}

		result
	}

	async fn exchange_credentials(&self, credentials: Credentials) -> Result<Token> {
		let body = credentials.to_auth_body();

		*self.credentials.write() = Some(credentials);
		*self.token.write() = None;

		self.rate_limiter.acquire(Method::Post, AUTHENTICATION_SERVICE).await?;

		let response = self.send_now(Method::Post, AUTHENTICATION_SERVICE, &body).await?;
		let token = Token::from_auth_response(&response, OffsetDateTime::now_utc())?;

		*self.token.write() = Some(token.clone());

		#[cfg(feature = "tracing")]
		tracing::debug!(expires_at = %token.expires_at(), "stored new access token");

		Ok(token)
	}
}
