//! Demonstrates plugging a custom [`HttpTransport`] and [`RefreshEndpoint`] into the client and
//! watching a burst of concurrent `401`s share a single refresh.
//!
//! 1. Implement [`HttpTransport`] over any HTTP stack (here, an in-memory fake).
//! 2. Implement [`RefreshEndpoint`] to exchange the refresh token for a new pair.
//! 3. Pass both to [`AuthenticatedClient::with_transport`].

// std
use std::{
	sync::{
		Arc,
		atomic::{AtomicUsize, Ordering},
	},
	time::Duration,
};
// crates.io
use color_eyre::Result;
// self
use spotifun_client::{
	auth::{SessionCredentials, TokenSecret},
	client::AuthenticatedClient,
	config::ClientConfig,
	http::{Method, StatusCode},
	refresh::{RefreshEndpoint, RefreshFuture},
	store::{MemoryStore, SessionStore},
	transport::{ApiRequest, ApiResponse, HttpTransport, TransportFuture},
	url::Url,
};

/// Accepts only `Bearer fresh`.
struct InMemoryApi;
impl HttpTransport for InMemoryApi {
	fn execute(&self, request: ApiRequest) -> TransportFuture<'_> {
		let authorized = request.authorization() == Some("Bearer fresh");

		Box::pin(async move {
			Ok(if authorized {
				ApiResponse::new(StatusCode::OK, r#"{"ok":true}"#)
			} else {
				ApiResponse::new(StatusCode::UNAUTHORIZED, r#"{"error":"expired"}"#)
			})
		})
	}
}

/// Slow refresh endpoint that counts its calls.
#[derive(Default)]
struct SlowRefresh {
	calls: AtomicUsize,
}
impl RefreshEndpoint for SlowRefresh {
	fn refresh<'a>(&'a self, _: &'a TokenSecret) -> RefreshFuture<'a> {
		self.calls.fetch_add(1, Ordering::SeqCst);

		Box::pin(async move {
			tokio::time::sleep(Duration::from_millis(50)).await;

			Ok(SessionCredentials::new("fresh", "r2"))
		})
	}
}

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let config = ClientConfig::builder(Url::parse("https://api.example.com/")?).build()?;
	let store: Arc<dyn SessionStore> =
		Arc::new(MemoryStore::with_credentials(&SessionCredentials::new("stale", "r1")));
	let refresh = Arc::new(SlowRefresh::default());
	let client: AuthenticatedClient<InMemoryApi> = AuthenticatedClient::with_transport(
		config,
		Arc::clone(&store),
		InMemoryApi,
		refresh.clone(),
	);
	let calls = (0..5).map(|i| {
		let client = client.clone();

		tokio::spawn(async move {
			let request = client.request(Method::GET, &format!("playlists/{i}"))?;

			client.send(request).await
		})
	});

	for handle in futures::future::join_all(calls).await {
		let response = handle??;

		println!("Replayed call finished with {}.", response.status);
	}

	println!("Refresh endpoint was called {} time(s).", refresh.calls.load(Ordering::SeqCst));
	println!("Requests queued behind it: {}.", client.refresh_metrics().queued());

	Ok(())
}
