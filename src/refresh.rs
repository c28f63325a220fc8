//! Token refresh: the endpoint contract, its HTTP implementation, and the single-flight
//! coordinator.
//!
//! [`RefreshEndpoint`] exchanges a refresh token for a new [`SessionCredentials`] pair.
//! [`HttpRefreshEndpoint`] does so with `POST {base_url}auth/refresh` and a
//! `{"refreshToken": ".."}` body, talking to the transport directly so a rejected refresh never
//! loops back through the client's `401` handling. [`RefreshCoordinator`] guarantees at most one
//! refresh call per client is in flight.

mod coordinator;
mod metrics;

pub use coordinator::*;
pub use metrics::RefreshMetrics;

// self
use crate::{
	_prelude::*,
	auth::{SessionCredentials, TokenSecret},
	config::ClientConfig,
	obs::{CallSpan, Stage},
	transport::{ApiRequest, HttpTransport},
};

/// Boxed future returned by [`RefreshEndpoint::refresh`].
pub type RefreshFuture<'a> = Pin<Box<dyn Future<Output = Result<SessionCredentials>> + 'a + Send>>;

/// Exchanges a refresh token for a new access/refresh pair.
pub trait RefreshEndpoint
where
	Self: Send + Sync,
{
	/// Calls the refresh endpoint with `refresh_token`.
	fn refresh<'a>(&'a self, refresh_token: &'a TokenSecret) -> RefreshFuture<'a>;
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RefreshRequestBody<'a> {
	refresh_token: &'a str,
}

/// [`RefreshEndpoint`] backed by a [`HttpTransport`].
pub struct HttpRefreshEndpoint<T>
where
	T: ?Sized + HttpTransport,
{
	transport: Arc<T>,
	url: Url,
	default_headers: HeaderMap,
}
impl<T> HttpRefreshEndpoint<T>
where
	T: ?Sized + HttpTransport,
{
	/// Creates an endpoint that posts to `config.refresh_url()` with the configured default
	/// headers.
	pub fn new(config: &ClientConfig, transport: impl Into<Arc<T>>) -> Self {
		Self {
			transport: transport.into(),
			url: config.refresh_url().clone(),
			default_headers: config.default_headers().clone(),
		}
	}

	fn build_request(&self, refresh_token: &TokenSecret) -> Result<ApiRequest> {
		let mut request = ApiRequest::new(Method::POST, self.url.clone());

		request.headers.extend(self.default_headers.clone());

		Ok(request.json(&RefreshRequestBody { refresh_token: refresh_token.expose() })?)
	}
}
impl<T> RefreshEndpoint for HttpRefreshEndpoint<T>
where
	T: ?Sized + HttpTransport,
{
	fn refresh<'a>(&'a self, refresh_token: &'a TokenSecret) -> RefreshFuture<'a> {
		let span = CallSpan::new(Stage::Refresh, &Method::POST, &self.url);

		Box::pin(span.instrument(async move {
			let request = self.build_request(refresh_token)?;
			let response = self.transport.execute(request).await?.error_for_status()?;

			response.json::<SessionCredentials>()
		}))
	}
}
impl<T> Debug for HttpRefreshEndpoint<T>
where
	T: ?Sized + HttpTransport,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("HttpRefreshEndpoint").field("url", &self.url.as_str()).finish()
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::transport::{ApiResponse, TransportFuture};

	struct EchoTransport {
		seen: Mutex<Vec<ApiRequest>>,
		reply: ApiResponse,
	}
	impl HttpTransport for EchoTransport {
		fn execute(&self, request: ApiRequest) -> TransportFuture<'_> {
			self.seen.lock().push(request);

			let reply = self.reply.clone();

			Box::pin(async move { Ok(reply) })
		}
	}

	fn build_endpoint(reply: ApiResponse) -> (HttpRefreshEndpoint<EchoTransport>, Arc<EchoTransport>) {
		let config = ClientConfig::builder(
			Url::parse("https://api.example.com/v1/").expect("Fixture URL should parse."),
		)
		.api_key("key-1")
		.build()
		.expect("Fixture config should build.");
		let transport = Arc::new(EchoTransport { seen: Mutex::new(Vec::new()), reply });

		(HttpRefreshEndpoint::new(&config, Arc::clone(&transport)), transport)
	}

	#[tokio::test]
	async fn refresh_posts_token_and_decodes_pair() {
		let (endpoint, transport) = build_endpoint(ApiResponse::new(
			StatusCode::OK,
			r#"{"accessToken":"a2","refreshToken":"r2"}"#,
		));
		let pair = endpoint.refresh(&TokenSecret::new("r1")).await.expect("Refresh should succeed.");

		assert_eq!(pair, SessionCredentials::new("a2", "r2"));

		let seen = transport.seen.lock();
		let request = seen.first().expect("Refresh call should reach the transport.");

		assert_eq!(request.method, Method::POST);
		assert_eq!(request.url.as_str(), "https://api.example.com/v1/auth/refresh");
		assert_eq!(request.body.as_deref(), Some(&br#"{"refreshToken":"r1"}"#[..]));
		assert_eq!(request.headers.get("api-key").map(HeaderValue::as_bytes), Some(&b"key-1"[..]));
		assert_eq!(request.authorization(), None);
	}

	#[tokio::test]
	async fn refresh_surfaces_rejections_and_bad_payloads() {
		let (endpoint, _) = build_endpoint(ApiResponse::new(StatusCode::UNAUTHORIZED, "expired"));
		let err = endpoint.refresh(&TokenSecret::new("r1")).await.expect_err("401 should fail.");

		assert_eq!(err.status(), Some(StatusCode::UNAUTHORIZED));

		let (endpoint, _) = build_endpoint(ApiResponse::new(StatusCode::OK, r#"{"accessToken":"a2"}"#));
		let err = endpoint
			.refresh(&TokenSecret::new("r1"))
			.await
			.expect_err("Missing refresh token should fail to decode.");

		assert!(matches!(err, Error::Decode { .. }));
	}
}
