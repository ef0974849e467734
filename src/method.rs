//! HTTP methods understood by the client.

// self
use crate::_prelude::*;

/// HTTP method of an outbound API call.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
	/// `GET`
	Get,
	/// `POST`
	Post,
	/// `PUT`
	Put,
	/// `DELETE`
	Delete,
	/// `PATCH`
	Patch,
	/// `HEAD`
	Head,
	/// `OPTIONS`
	Options,
}
impl Method {
	/// Returns the canonical upper-case token for the method.
	pub const fn as_str(self) -> &'static str {
		match self {
			Method::Get => "GET",
			Method::Post => "POST",
			Method::Put => "PUT",
			Method::Delete => "DELETE",
			Method::Patch => "PATCH",
			Method::Head => "HEAD",
			Method::Options => "OPTIONS",
		}
	}

	/// Returns `true` for methods that mutate remote state and count against the write budget.
	pub const fn is_write(self) -> bool {
		matches!(self, Method::Post | Method::Put | Method::Delete)
	}
}
impl Display for Method {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
impl FromStr for Method {
	type Err = UnknownMethod;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.to_ascii_uppercase().as_str() {
			"GET" => Ok(Method::Get),
			"POST" => Ok(Method::Post),
			"PUT" => Ok(Method::Put),
			"DELETE" => Ok(Method::Delete),
			"PATCH" => Ok(Method::Patch),
			"HEAD" => Ok(Method::Head),
			"OPTIONS" => Ok(Method::Options),
			_ => Err(UnknownMethod(s.to_owned())),
		}
	}
}
#[cfg(feature = "reqwest")]
impl From<Method> for reqwest::Method {
	fn from(method: Method) -> Self {
		match method {
			Method::Get => reqwest::Method::GET,
			Method::Post => reqwest::Method::POST,
			Method::Put => reqwest::Method::PUT,
			Method::Delete => reqwest::Method::DELETE,
			Method::Patch => reqwest::Method::PATCH,
			Method::Head => reqwest::Method::HEAD,
			Method::Options => reqwest::Method::OPTIONS,
		}
	}
}

/// Raised when parsing a method name the client does not know.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
#[error("Unknown HTTP method `{0}`.")]
pub struct UnknownMethod(pub String);
