//! Transport seam between the orchestration layer and the HTTP stack.
//!
//! [`Transport`] is the client's only dependency on an HTTP implementation. The orchestrator
//! decides *when* a call may go out and *which* token it carries; a transport only performs
//! the exchange and hands back the decoded JSON body. [`ReqwestTransport`] is the default
//! implementation behind the `reqwest` feature.

// self
use crate::{_prelude::*, auth::Secret, error::TransportError, method::Method};
#[cfg(feature = "reqwest")]
use crate::{error::ConfigError, options::ClientOptions};

/// Boxed future returned by [`Transport::send`].
pub type TransportFuture<'a, T> =
	Pin<Box<dyn Future<Output = Result<T, TransportError>> + 'a + Send>>;

/// Performs one API exchange.
///
/// Implementations must not retry, and must surface every failure (network, non-success
/// status, undecodable body) as a [`TransportError`]. The orchestrator passes errors through
/// to callers unchanged.
pub trait Transport
where
	Self: 'static + Send + Sync,
{
	/// Sends `args` to `endpoint` with `method`, authorizing with `token` when present.
	fn send<'a>(
		&'a self,
		method: Method,
		endpoint: &'a str,
		args: &'a Value,
		token: Option<&'a Secret>,
	) -> TransportFuture<'a, Value>;
}

/// Reqwest-backed [`Transport`] resolving endpoint paths against an API base URL.
///
/// Query-style methods (`GET`, `DELETE`, `HEAD`) send object arguments as query parameters
/// (see [`append_query`]); every other method sends them as a JSON body. The token is sent verbatim in the
/// `Authorization` header, which is the scheme the AppNexus API expects.
#[cfg(feature = "reqwest")]
#[derive(Clone, Debug)]
pub struct ReqwestTransport {
	client: ReqwestClient,
	api_base: Url,
}
#[cfg(feature = "reqwest")]
impl ReqwestTransport {
	/// Builds a transport for the options' API base, routing through the proxy if one is set.
	pub fn from_options(options: &ClientOptions) -> Result<Self, ConfigError> {
		let mut builder = ReqwestClient::builder();

		if let Some(proxy) = options.proxy.as_ref() {
			builder = builder.proxy(reqwest::Proxy::all(proxy.as_str())?);
		}

		Ok(Self::with_client(builder.build()?, options.api_base_url()?))
	}

	/// Wraps an existing reqwest [`ReqwestClient`].
	pub fn with_client(client: ReqwestClient, api_base: Url) -> Self {
		Self { client, api_base }
	}

	/// Base URL endpoint paths are resolved against.
	pub fn api_base(&self) -> &Url {
		&self.api_base
	}

	async fn exchange(
		&self,
		method: Method,
		endpoint: &str,
		args: &Value,
		token: Option<&Secret>,
	) -> Result<Value, TransportError> {
		let mut url = endpoint_url(&self.api_base, endpoint);
		let query_style = matches!(method, Method::Get | Method::Delete | Method::Head);

		if query_style {
			append_query(&mut url, args)?;
		}

		let mut request = self.client.request(method.into(), url);

		if !query_style && !args.is_null() {
			request = request.json(args);
		}
		if let Some(token) = token {
			request = request.header(reqwest::header::AUTHORIZATION, token.expose());
		}

		let response = request.send().await?;
		let status = response.status();
		let bytes = response.bytes().await?;

		if !status.is_success() {
			return Err(TransportError::Status {
				status: status.as_u16(),
				body: String::from_utf8_lossy(&bytes).into_owned(),
			});
		}
		if bytes.iter().all(u8::is_ascii_whitespace) {
			return Ok(Value::Null);
		}

		serde_json::from_slice(&bytes).map_err(|source| TransportError::Decode { source })
	}
}
#[cfg(feature = "reqwest")]
impl Transport for ReqwestTransport {
	fn send<'a>(
		&'a self,
		method: Method,
		endpoint: &'a str,
		args: &'a Value,
		token: Option<&'a Secret>,
	) -> TransportFuture<'a, Value> {
		Box::pin(self.exchange(method, endpoint, args, token))
	}
}

/// Appends `endpoint` (with an optional `?query`) to the base path, keeping any base prefix.
pub fn endpoint_url(api_base: &Url, endpoint: &str) -> Url {
	let (path, query) = match endpoint.split_once('?') {
		Some((path, query)) => (path, Some(query)),
		None => (endpoint, None),
	};
	let mut url = api_base.clone();
	let joined =
		format!("{}/{}", api_base.path().trim_end_matches('/'), path.trim_start_matches('/'));

	url.set_path(&joined);
	url.set_query(query);

	url
}

/// Appends the non-null entries of an object as query parameters.
///
/// `null` and objects without non-null entries leave `url` untouched. Any other JSON value
/// cannot be expressed as a query string and is rejected.
pub fn append_query(url: &mut Url, args: &Value) -> Result<(), TransportError> {
	let params = match args {
		Value::Null => return Ok(()),
		Value::Object(params) => params,
		other => return Err(TransportError::QueryArgs { found: json_kind(other) }),
	};
	let mut entries = params.iter().filter(|(_, value)| !value.is_null()).peekable();

	if entries.peek().is_none() {
		return Ok(());
	}

	let mut pairs = url.query_pairs_mut();

	for (key, value) in entries {
		match value {
			Value::String(text) => pairs.append_pair(key, text),
			other => pairs.append_pair(key, &other.to_string()),
		};
	}

	Ok(())
}

fn json_kind(value: &Value) -> &'static str {
	match value {
		Value::Null => "null",
		Value::Bool(_) => "boolean",
		Value::Number(_) => "number",
		Value::String(_) => "string",
		Value::Array(_) => "array",
		Value::Object(_) => "object",
	}
}
