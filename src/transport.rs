//! Transport primitives for API calls.
//!
//! The module exposes [`HttpTransport`] alongside the [`ApiRequest`]/[`ApiResponse`] values it
//! exchanges so downstream crates can plug in custom HTTP stacks (or fakes) without touching the
//! interceptor. Transports report every HTTP status as `Ok`; deciding what counts as a failure is
//! the client's job.

// std
use std::ops::Deref;
// crates.io
use serde::de::DeserializeOwned;
// self
use crate::{_prelude::*, auth::TokenSecret, error::{ConfigError, TransportError}};

/// Boxed future returned by [`HttpTransport::execute`].
pub type TransportFuture<'a> =
	Pin<Box<dyn Future<Output = Result<ApiResponse, TransportError>> + 'a + Send>>;

/// Abstraction over HTTP stacks capable of executing fully-formed API requests.
///
/// Implementations must be `Send + Sync + 'static` so one transport can be shared between the
/// client and its refresh endpoint behind an `Arc`.
pub trait HttpTransport
where
	Self: 'static + Send + Sync,
{
	/// Sends `request` and returns the raw response, whatever its status.
	fn execute(&self, request: ApiRequest) -> TransportFuture<'_>;
}

/// Outbound request handed to a [`HttpTransport`]. Cloneable so it can be replayed.
#[derive(Clone, Debug)]
pub struct ApiRequest {
	/// HTTP method.
	pub method: Method,
	/// Absolute target URL.
	pub url: Url,
	/// Request headers.
	pub headers: HeaderMap,
	/// Optional request body.
	pub body: Option<Vec<u8>>,
}
impl ApiRequest {
	/// Creates a body-less request.
	pub fn new(method: Method, url: Url) -> Self {
		Self { method, url, headers: HeaderMap::new(), body: None }
	}

	/// Inserts (or replaces) a header.
	pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
		self.headers.insert(name, value);

		self
	}

	/// Serializes `body` as JSON and sets the matching content type.
	pub fn json<T>(mut self, body: &T) -> Result<Self, ConfigError>
	where
		T: ?Sized + Serialize,
	{
		self.body = Some(serde_json::to_vec(body)?);
		self.headers.insert(
			http::header::CONTENT_TYPE,
			HeaderValue::from_static("application/json"),
		);

		Ok(self)
	}

	/// Attaches `token` as the `Authorization: Bearer` credential.
	pub fn with_bearer(mut self, token: &TokenSecret) -> Result<Self, ConfigError> {
		self.headers.insert(http::header::AUTHORIZATION, token.bearer_header()?);

		Ok(self)
	}

	/// Current `Authorization` header value, if any.
	pub fn authorization(&self) -> Option<&str> {
		self.headers.get(http::header::AUTHORIZATION).and_then(|value| value.to_str().ok())
	}
}

/// Raw response returned by a [`HttpTransport`].
#[derive(Clone, Debug)]
pub struct ApiResponse {
	/// Response status.
	pub status: StatusCode,
	/// Response headers.
	pub headers: HeaderMap,
	/// Response body bytes.
	pub body: Vec<u8>,
}
impl ApiResponse {
	/// Creates a response with empty headers.
	pub fn new(status: StatusCode, body: impl Into<Vec<u8>>) -> Self {
		Self { status, headers: HeaderMap::new(), body: body.into() }
	}

	/// Returns `true` for 2xx statuses.
	pub fn is_success(&self) -> bool {
		self.status.is_success()
	}

	/// Converts non-2xx responses into [`Error::RequestFailed`].
	pub fn error_for_status(self) -> Result<Self> {
		if self.is_success() { Ok(self) } else { Err(Error::request_failed(self.status, &self.body)) }
	}

	/// Decodes the body as JSON, reporting the failing path on mismatch.
	pub fn json<T>(&self) -> Result<T>
	where
		T: DeserializeOwned,
	{
		let mut de = serde_json::Deserializer::from_slice(&self.body);

		serde_path_to_error::deserialize(&mut de)
			.map_err(|source| Error::Decode { source, status: self.status })
	}
}

/// Thin wrapper around [`ReqwestClient`] so shared HTTP behavior lives in one place.
#[cfg(feature = "reqwest")]
#[derive(Clone, Debug, Default)]
pub struct ReqwestTransport(pub ReqwestClient);
#[cfg(feature = "reqwest")]
impl ReqwestTransport {
	/// Wraps an existing reqwest [`ReqwestClient`].
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}
}
#[cfg(feature = "reqwest")]
impl AsRef<ReqwestClient> for ReqwestTransport {
	fn as_ref(&self) -> &ReqwestClient {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl Deref for ReqwestTransport {
	type Target = ReqwestClient;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl HttpTransport for ReqwestTransport {
	fn execute(&self, request: ApiRequest) -> TransportFuture<'_> {
		let client = self.0.clone();

		Box::pin(async move {
			let ApiRequest { method, url, headers, body } = request;
			let mut builder = client.request(method, url).headers(headers);

			if let Some(body) = body {
				builder = builder.body(body);
			}

			let response = builder.send().await?;
			let status = response.status();
			let headers = response.headers().to_owned();
			let body = response.bytes().await?.to_vec();

			Ok(ApiResponse { status, headers, body })
		})
	}
}
