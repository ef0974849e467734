//! Access token issued by the authentication service and its fixed-lifetime expiry rule.

// self
use crate::{_prelude::*, auth::Secret, error::TransportError};

/// Lifetime of every access token, measured from the moment it was stored.
pub const TOKEN_LIFETIME: Duration = Duration::hours(1);

/// Access token plus the instant the client stored it.
///
/// Tokens are replaced wholesale on every authorization and never mutated in place.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
	/// Opaque token value attached to outgoing requests.
	pub value: Secret,
	/// Instant the token was stored.
	#[serde(with = "time::serde::rfc3339")]
	pub issued_at: OffsetDateTime,
}
impl Token {
	/// Wraps a token value issued at `issued_at`.
	pub fn new(value: impl Into<Secret>, issued_at: OffsetDateTime) -> Self {
		Self { value: value.into(), issued_at }
	}

	/// Wraps a token value stamped with the current clock.
	pub fn issued_now(value: impl Into<Secret>) -> Self {
		Self::new(value, OffsetDateTime::now_utc())
	}

	/// Instant from which the token must no longer be used.
	pub fn expires_at(&self) -> OffsetDateTime {
		self.issued_at + TOKEN_LIFETIME
	}

	/// Returns `true` once `now` reaches the end of the token lifetime.
	pub fn is_expired_at(&self, now: OffsetDateTime) -> bool {
		self.expires_at() <= now
	}

	/// Checks expiry against the current UTC clock.
	pub fn is_expired(&self) -> bool {
		self.is_expired_at(OffsetDateTime::now_utc())
	}

	/// Pulls the token out of an authentication response and stamps it with `issued_at`.
	///
	/// The value is read from `token` at the top level or nested under `response`.
	pub fn from_auth_response(
		body: &Value,
		issued_at: OffsetDateTime,
	) -> Result<Self, TransportError> {
		let payload = body.get("response").filter(|inner| inner.is_object()).unwrap_or(body);
		let parsed: AuthPayload = serde_path_to_error::deserialize(payload)
			.map_err(|source| TransportError::MissingToken { source })?;

		Ok(Self::new(parsed.token, issued_at))
	}
}
impl Debug for Token {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Token")
			.field("value", &"<redacted>")
			.field("issued_at", &self.issued_at)
			.finish()
	}
}

#[derive(Deserialize)]
struct AuthPayload {
	token: String,
}

/// Expiry check over an optional token.
///
/// Without a token the Unix epoch stands in for `issued_at`, so a client that never
/// authenticated always reads as expired.
pub fn is_expired_at(token: Option<&Token>, now: OffsetDateTime) -> bool {
	let issued_at = token.map_or(OffsetDateTime::UNIX_EPOCH, |token| token.issued_at);

	issued_at + TOKEN_LIFETIME <= now
}

#[cfg(test)]
mod tests {
	// crates.io
	use time::macros::datetime;
	// self
	use super::*;

	#[test]
	fn expires_exactly_at_lifetime() {
		let issued = datetime!(2024-03-01 12:00 UTC);
		let token = Token::new("abc", issued);

		assert!(!token.is_expired_at(issued));
		assert!(!token.is_expired_at(issued + Duration::minutes(59)));
		assert!(token.is_expired_at(issued + TOKEN_LIFETIME));
		assert!(token.is_expired_at(issued + Duration::hours(2)));
	}

	#[test]
	fn missing_token_is_always_expired() {
		assert!(is_expired_at(None, OffsetDateTime::UNIX_EPOCH + TOKEN_LIFETIME));
		assert!(is_expired_at(None, OffsetDateTime::now_utc()));
	}

	#[test]
	fn reads_nested_and_bare_tokens() {
		let issued = datetime!(2024-03-01 12:00 UTC);
		let nested = serde_json::json!({ "response": { "status": "OK", "token": "nested" } });
		let bare = serde_json::json!({ "token": "bare" });

		assert_eq!(
			Token::from_auth_response(&nested, issued)
				.expect("Nested token should parse.")
				.value
				.expose(),
			"nested"
		);
		assert_eq!(
			Token::from_auth_response(&bare, issued).expect("Bare token should parse.").value.expose(),
			"bare"
		);
	}

	#[test]
	fn missing_token_field_is_reported() {
		let body = serde_json::json!({ "response": { "status": "error" } });
		let err = Token::from_auth_response(&body, OffsetDateTime::now_utc())
			.expect_err("A response without a token must be rejected.");

		assert!(matches!(err, TransportError::MissingToken { .. }));
	}

	#[test]
	fn debug_redacts_value() {
		let token = Token::issued_now("very-secret");

		assert!(!format!("{token:?}").contains("very-secret"));
	}
}
