//! Username/password pair exchanged for access tokens.

// self
use crate::{_prelude::*, auth::Secret, error::CredentialError};

/// Credentials remembered by a client so it can re-authorize on its own.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
	/// Account username.
	pub username: String,
	/// Account password; redacted in logs.
	pub password: Secret,
}
impl Credentials {
	/// Validates and wraps a username/password pair.
	///
	/// Both values must be non-empty; the check runs before anything touches the network.
	pub fn new(
		username: impl Into<String>,
		password: impl Into<Secret>,
	) -> Result<Self, CredentialError> {
		let username = username.into();
		let password = password.into();

		if username.is_empty() {
			return Err(CredentialError::MissingUsername);
		}
		if password.is_empty() {
			return Err(CredentialError::MissingPassword);
		}

		Ok(Self { username, password })
	}

	/// Builds the JSON body expected by the authentication service.
	pub fn to_auth_body(&self) -> Value {
		serde_json::json!({
			"auth": {
				"username": self.username,
				"password": self.password.expose(),
			}
		})
	}
}
impl Debug for Credentials {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Credentials")
			.field("username", &self.username)
			.field("password", &"<redacted>")
			.finish()
	}
}
