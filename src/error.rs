//! Client-level error types shared across authorization, admission, and dispatch.

// self
use crate::{_prelude::*, rate_limit::Category};

/// Client-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical client error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Credentials are missing or were never stored.
	#[error(transparent)]
	Credential(#[from] CredentialError),
	/// Admission control failed internally.
	#[error(transparent)]
	RateLimit(#[from] RateLimitError),
	/// Transport failure, passed through unmodified.
	#[error(transparent)]
	Transport(#[from] TransportError),
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
}

/// Credential failures raised before any network call is made.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum CredentialError {
	/// Username was empty.
	#[error("Username is required for authorization.")]
	MissingUsername,
	/// Password was empty.
	#[error("Password is required for authorization.")]
	MissingPassword,
	/// A refresh was requested but `authorize` never stored credentials.
	#[error("No credentials are stored; call authorize first.")]
	NotAuthorized,
}

/// Internal failures of the admission mechanism.
///
/// Exceeding a limit suspends the caller and is never reported through this type.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum RateLimitError {
	/// The bucket for `category` cannot grant permits with its configuration.
	#[error("The {category} bucket is misconfigured: {permits} permits per {window_ms}ms.")]
	Misconfigured {
		/// Bucket category.
		category: Category,
		/// Configured permits per window.
		permits: u32,
		/// Configured window length in milliseconds.
		window_ms: u128,
	},
}

/// Failures surfaced by the underlying transport.
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the API.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// API answered with a non-success status.
	#[error("API responded with status {status}.")]
	Status {
		/// HTTP status code.
		status: u16,
		/// Raw response body, if it could be read.
		body: String,
	},
	/// API response body is not valid JSON.
	#[error("API returned a body that is not valid JSON.")]
	Decode {
		/// Structured parsing failure.
		#[source]
		source: serde_json::Error,
	},
	/// Authentication response does not carry a usable `token` field.
	#[error("Authentication response is missing a token.")]
	MissingToken {
		/// Path-aware parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
	},
	/// Arguments of a query-style call are not a JSON object.
	#[error("Query-style calls need object arguments, found {found}.")]
	QueryArgs {
		/// JSON kind that was supplied.
		found: &'static str,
	},
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred while calling the API.")]
	Io(#[from] std::io::Error),
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		Self::network(e)
	}
}

/// Configuration and validation failures raised while building a client.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// A configured URL cannot be parsed.
	#[error("The {field} URL is invalid.")]
	InvalidUrl {
		/// Option that failed to parse.
		field: &'static str,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// A configured URL uses a scheme other than HTTP(S).
	#[error("The {field} URL must use http or https: {url}.")]
	UnsupportedScheme {
		/// Option that failed validation.
		field: &'static str,
		/// URL that failed validation.
		url: String,
	},
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}
