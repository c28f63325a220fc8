//! Client-level error types shared across the interceptor, refresh, store, and transport layers.

// self
use crate::_prelude::*;

/// Client-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

const BODY_PREVIEW_LIMIT: usize = 256;

/// Canonical client error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Session store failure.
	#[error("{0}")]
	Storage(
		#[from]
		#[source]
		crate::store::StoreError,
	),
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Transport failure (DNS, TCP, TLS).
	#[error(transparent)]
	Transport(#[from] TransportError),

	/// The API answered `401` and no refresh token is stored.
	#[error("Session expired and no refresh token is available.")]
	AuthExpired {
		/// Original `401` failure.
		#[source]
		source: Box<Error>,
	},
	/// The refresh endpoint (or persisting its result) failed.
	///
	/// The same source is shared by the request that started the refresh and every request that
	/// waited on it.
	#[error("Token refresh failed.")]
	RefreshFailed {
		/// Shared refresh failure.
		#[source]
		source: Arc<Error>,
	},
	/// The in-flight refresh was abandoned before it settled.
	#[error("Token refresh was interrupted before it settled.")]
	RefreshInterrupted,
	/// The API answered with a non-success status that was not recovered.
	#[error("Request failed with HTTP status {status}.")]
	RequestFailed {
		/// Response status.
		status: StatusCode,
		/// Leading part of the response body, lossily decoded.
		body_preview: String,
	},
	/// A response body could not be decoded.
	#[error("Response body with HTTP status {status} is not valid JSON for the expected type.")]
	Decode {
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
		/// Response status.
		status: StatusCode,
	},
}
impl Error {
	/// Builds a [`Error::RequestFailed`] from a status and raw body.
	pub fn request_failed(status: StatusCode, body: &[u8]) -> Self {
		let end = body.len().min(BODY_PREVIEW_LIMIT);

		Self::RequestFailed { status, body_preview: String::from_utf8_lossy(&body[..end]).into() }
	}

	/// HTTP status carried by the error, if any.
	pub fn status(&self) -> Option<StatusCode> {
		match self {
			Self::RequestFailed { status, .. } | Self::Decode { status, .. } => Some(*status),
			Self::AuthExpired { source } => source.status(),
			_ => None,
		}
	}

	/// Returns `true` for a `401 Unauthorized` request failure.
	pub fn is_unauthorized(&self) -> bool {
		matches!(self, Self::RequestFailed { status: StatusCode::UNAUTHORIZED, .. })
	}
}

/// Configuration and validation failures raised by the client.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// A URL could not be parsed or joined onto the base URL.
	#[error("URL `{value}` is invalid.")]
	InvalidUrl {
		/// Offending input.
		value: String,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// Base URL uses a scheme other than `http`/`https` or cannot carry a path.
	#[error("Base URL `{url}` must be an absolute http(s) URL.")]
	UnsupportedBaseUrl {
		/// Offending URL.
		url: String,
	},
	/// A header value contains characters HTTP does not allow.
	#[error("Header `{name}` has an invalid value.")]
	InvalidHeader {
		/// Header name.
		name: &'static str,
		/// Underlying validation failure.
		#[source]
		source: http::header::InvalidHeaderValue,
	},
	/// A required environment variable is not set.
	#[error("Environment variable `{var}` is not set.")]
	MissingEnv {
		/// Variable name.
		var: &'static str,
	},
	/// Request body could not be serialized.
	#[error("Request body could not be serialized.")]
	Encode(#[from] serde_json::Error),
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

/// Transport-level failures (network, IO).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the API.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
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
