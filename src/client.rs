//! The authenticated API client: bearer injection, `401` recovery, and replay.
//!
//! [`AuthenticatedClient::send`] runs every request through two hooks:
//!
//! - **Outbound** ([`AuthenticatedClient::authorize`]): attach `Authorization: Bearer <access>`
//!   when the session store holds an access token; otherwise send the request as-is.
//! - **Inbound**: a `401` with a stored refresh token either starts the single in-flight refresh
//!   or waits on it, then replays the request once with the rotated token. Replays go straight to
//!   the transport, so a second `401` is returned to the caller instead of refreshing again.
//!
//! A successful refresh stores both new tokens before any waiter is released; a failed one
//! rejects every waiter with the same error and clears both tokens.

// self
use crate::{
	_prelude::*,
	api::PlaylistsApi,
	auth::{SessionKey, TokenSecret},
	config::ClientConfig,
	obs::{self, CallSpan, Stage},
	refresh::{RefreshCoordinator, RefreshEndpoint, RefreshMetrics, RefreshTicket},
	store::SessionStore,
	transport::{ApiRequest, ApiResponse, HttpTransport},
};
#[cfg(feature = "reqwest")]
use crate::{refresh::HttpRefreshEndpoint, transport::ReqwestTransport};

#[cfg(feature = "reqwest")]
/// Client specialized for the crate's default reqwest transport.
pub type ReqwestAuthenticatedClient = AuthenticatedClient<ReqwestTransport>;

/// HTTP client that authenticates requests from a [`SessionStore`] and transparently rotates
/// expired sessions.
///
/// Clones share the transport, store, refresh endpoint, and [`RefreshCoordinator`], so every
/// clone participates in the same single-flight refresh window.
pub struct AuthenticatedClient<T>
where
	T: ?Sized + HttpTransport,
{
	/// Transport used for API calls and replays.
	pub transport: Arc<T>,
	/// Session store holding the access/refresh pair.
	pub store: Arc<dyn SessionStore>,
	/// Endpoint that rotates the pair.
	pub refresh_endpoint: Arc<dyn RefreshEndpoint>,
	config: ClientConfig,
	coordinator: Arc<RefreshCoordinator>,
}
impl<T> AuthenticatedClient<T>
where
	T: ?Sized + HttpTransport,
{
	/// Creates a client from caller-provided transport and refresh endpoint.
	pub fn with_transport(
		config: ClientConfig,
		store: Arc<dyn SessionStore>,
		transport: impl Into<Arc<T>>,
		refresh_endpoint: Arc<dyn RefreshEndpoint>,
	) -> Self {
		Self {
			transport: transport.into(),
			store,
			refresh_endpoint,
			config,
			coordinator: Default::default(),
		}
	}

	/// Configuration the client was built with.
	pub fn config(&self) -> &ClientConfig {
		&self.config
	}

	/// Refresh coordinator shared by this client and its clones.
	pub fn coordinator(&self) -> &RefreshCoordinator {
		&self.coordinator
	}

	/// Refresh counters for this client.
	pub fn refresh_metrics(&self) -> &RefreshMetrics {
		self.coordinator.metrics()
	}

	/// Typed access to the playlist resource.
	pub fn playlists(&self) -> PlaylistsApi<'_, T> {
		PlaylistsApi::new(self)
	}

	/// Builds a request for `path` (relative to the base URL) carrying the default headers.
	pub fn request(&self, method: Method, path: &str) -> Result<ApiRequest> {
		let mut request = ApiRequest::new(method, self.config.endpoint(path)?);

		request.headers.extend(self.config.default_headers().clone());

		Ok(request)
	}

	/// Outbound hook: attaches the stored access token, if any.
	pub fn authorize(&self, request: ApiRequest) -> Result<ApiRequest> {
		match self.store.get(SessionKey::AccessToken)? {
			Some(token) => Ok(request.with_bearer(&token)?),
			None => Ok(request),
		}
	}

	/// Sends `request`, recovering once from an expired access token.
	///
	/// Resolves with the 2xx response, possibly obtained after a refresh and replay. Fails with
	/// [`Error::AuthExpired`] when a `401` arrives and no refresh token is stored,
	/// [`Error::RefreshFailed`] when the refresh is rejected, and [`Error::RequestFailed`] for
	/// every other non-2xx status, including a `401` on the replay.
	pub async fn send(&self, request: ApiRequest) -> Result<ApiResponse> {
		let span = CallSpan::new(Stage::Send, &request.method, &request.url);

		span.instrument(async move {
			let outbound = self.authorize(request)?;

			match self.dispatch(outbound.clone()).await {
				Err(e) if e.is_unauthorized() => self.recover(outbound, e).await,
				result => result,
			}
		})
		.await
	}

	/// Sends `request` and decodes a JSON body.
	pub async fn send_json<R>(&self, request: ApiRequest) -> Result<R>
	where
		R: serde::de::DeserializeOwned,
	{
		self.send(request).await?.json()
	}

	async fn dispatch(&self, request: ApiRequest) -> Result<ApiResponse> {
		self.transport.execute(request).await?.error_for_status()
	}

	async fn recover(&self, request: ApiRequest, unauthorized: Error) -> Result<ApiResponse> {
		let Some(refresh_token) = self.store.get(SessionKey::RefreshToken)? else {
			return Err(Error::AuthExpired { source: Box::new(unauthorized) });
		};
		let access_token = match self.coordinator.begin() {
			RefreshTicket::Follower(pending) => pending.wait().await?,
			RefreshTicket::Leader(lease) => match self.rotate(refresh_token).await {
				Ok(access_token) => {
					lease.resolve(&access_token);

					access_token
				},
				Err(e) => {
					let shared = Arc::new(e);

					lease.reject(Arc::clone(&shared));

					if let Err(e) = self.store.clear() {
						obs::record_session_clear_failure(&e);
					}

					return Err(Error::RefreshFailed { source: shared });
				},
			},
		};

		self.replay(request, &access_token).await
	}

	// Calls the refresh endpoint and persists the new pair before any waiter is released.
	//
	// The store is read again after taking the lease; another leader may have rotated the pair
	// since `observed` was read.
	async fn rotate(&self, observed: TokenSecret) -> Result<TokenSecret> {
		let refresh_token = self.store.get(SessionKey::RefreshToken)?.unwrap_or(observed);
		let credentials = self.refresh_endpoint.refresh(&refresh_token).await?;

		self.store.save_credentials(&credentials)?;

		Ok(credentials.access_token)
	}

	async fn replay(&self, request: ApiRequest, access_token: &TokenSecret) -> Result<ApiResponse> {
		let span = CallSpan::new(Stage::Replay, &request.method, &request.url);

		span.instrument(self.dispatch(request.with_bearer(access_token)?)).await
	}
}
#[cfg(feature = "reqwest")]
impl AuthenticatedClient<ReqwestTransport> {
	/// Creates a client backed by a default reqwest transport that is shared with an
	/// [`HttpRefreshEndpoint`] built from `config`.
	pub fn new(config: ClientConfig, store: Arc<dyn SessionStore>) -> Self {
		Self::with_reqwest(config, store, ReqwestTransport::default())
	}

	/// Same as [`AuthenticatedClient::new`] with a caller-configured reqwest transport (timeouts,
	/// proxies, TLS roots).
	pub fn with_reqwest(
		config: ClientConfig,
		store: Arc<dyn SessionStore>,
		transport: ReqwestTransport,
	) -> Self {
		let transport = Arc::new(transport);
		let refresh_endpoint: Arc<dyn RefreshEndpoint> =
			Arc::new(<HttpRefreshEndpoint<ReqwestTransport>>::new(&config, Arc::clone(&transport)));

		Self::with_transport(config, store, transport, refresh_endpoint)
	}
}
impl<T> Clone for AuthenticatedClient<T>
where
	T: ?Sized + HttpTransport,
{
	fn clone(&self) -> Self {
		Self {
			transport: Arc::clone(&self.transport),
			store: Arc::clone(&self.store),
			refresh_endpoint: Arc::clone(&self.refresh_endpoint),
			config: self.config.clone(),
			coordinator: Arc::clone(&self.coordinator),
		}
	}
}
impl<T> Debug for AuthenticatedClient<T>
where
	T: ?Sized + HttpTransport,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("AuthenticatedClient")
			.field("base_url", &self.config.base_url().as_str())
			.field("refreshing", &self.coordinator.is_refreshing())
			.finish()
	}
}
