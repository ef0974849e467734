//! Construction-time configuration for [`Client`](crate::client::Client).

// self
pub use crate::rate_limit::RateLimits;
use crate::{_prelude::*, auth::Token, error::ConfigError};

/// Production API base used when none is configured.
pub const DEFAULT_API_BASE: &str = "https://api.appnexus.com";

/// Options owned by a single client instance.
///
/// `api_base`, `proxy`, and `limits` are fixed once the client is built; `token` only seeds
/// the client's token slot, which the client replaces on every authorization. `api_base` keeps
/// the text it was configured with; [`ClientOptions::api_base_url`] yields the parsed form.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientOptions {
	/// Base URL every endpoint path is resolved against, exactly as configured.
	pub api_base: String,
	/// Optional HTTP(S) proxy for all outbound calls.
	pub proxy: Option<Url>,
	/// Permit budgets per rate-limit category.
	pub limits: RateLimits,
	/// Previously issued token to start with.
	pub token: Option<Token>,
}
impl ClientOptions {
	/// Creates a builder seeded with the defaults.
	pub fn builder() -> ClientOptionsBuilder {
		ClientOptionsBuilder::default()
	}

	/// Parses `api_base`, rejecting anything that is not an HTTP(S) URL.
	pub fn api_base_url(&self) -> Result<Url, ConfigError> {
		parse_url("api_base", &self.api_base)
	}
}
impl Default for ClientOptions {
	fn default() -> Self {
		Self {
			api_base: DEFAULT_API_BASE.to_owned(),
			proxy: None,
			limits: RateLimits::default(),
			token: None,
		}
	}
}

/// Builder for [`ClientOptions`] values.
#[derive(Debug, Default)]
pub struct ClientOptionsBuilder {
	api_base: Option<String>,
	proxy: Option<Url>,
	limits: Option<RateLimits>,
	token: Option<Token>,
}
impl ClientOptionsBuilder {
	/// Overrides the API base URL; it is validated by [`ClientOptionsBuilder::build`].
	pub fn api_base(mut self, url: impl Into<String>) -> Self {
		self.api_base = Some(url.into());

		self
	}

	/// Routes all calls through a proxy.
	pub fn proxy(mut self, url: Url) -> Self {
		self.proxy = Some(url);

		self
	}

	/// Parses and sets the proxy URL.
	pub fn proxy_str(self, url: &str) -> Result<Self, ConfigError> {
		Ok(self.proxy(parse_url("proxy", url)?))
	}

	/// Overrides the per-category permit budgets.
	pub fn limits(mut self, limits: RateLimits) -> Self {
		self.limits = Some(limits);

		self
	}

	/// Seeds the client with an existing token.
	pub fn token(mut self, token: Token) -> Self {
		self.token = Some(token);

		self
	}

	/// Consumes the builder and validates the resulting options.
	pub fn build(self) -> Result<ClientOptions, ConfigError> {
		let options = ClientOptions {
			api_base: self.api_base.unwrap_or_else(|| DEFAULT_API_BASE.to_owned()),
			proxy: self.proxy,
			limits: self.limits.unwrap_or_default(),
			token: self.token,
		};

		options.api_base_url()?;

		if let Some(proxy) = options.proxy.as_ref() {
			validate_url("proxy", proxy)?;
		}

		Ok(options)
	}
}

fn parse_url(field: &'static str, raw: &str) -> Result<Url, ConfigError> {
	let url = Url::parse(raw).map_err(|source| ConfigError::InvalidUrl { field, source })?;

	validate_url(field, &url)?;

	Ok(url)
}

fn validate_url(field: &'static str, url: &Url) -> Result<(), ConfigError> {
	match url.scheme() {
		"http" | "https" => Ok(()),
		_ => Err(ConfigError::UnsupportedScheme { field, url: url.to_string() }),
	}
}
