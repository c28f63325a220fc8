//! Demonstrates the default reqwest-backed client rotating an expired session: the first call
//! answers `401`, the client refreshes once, persists the new pair, and replays the call.

// std
use std::sync::Arc;
// crates.io
use color_eyre::Result;
use httpmock::prelude::*;
use serde_json::json;
// self
use spotifun_client::{
	api::FetchPlaylistsArgs,
	auth::SessionCredentials,
	client::AuthenticatedClient,
	config::ClientConfig,
	store::{MemoryStore, SessionStore},
	url::Url,
};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let server = MockServer::start_async().await;

	server
		.mock_async(|when, then| {
			when.method(GET).path("/playlists").header("authorization", "Bearer stale");
			then.status(401);
		})
		.await;
	server
		.mock_async(|when, then| {
			when.method(POST).path("/auth/refresh").json_body(json!({ "refreshToken": "r1" }));
			then.status(200)
				.header("content-type", "application/json")
				.json_body(json!({ "accessToken": "fresh", "refreshToken": "r2" }));
		})
		.await;
	server
		.mock_async(|when, then| {
			when.method(GET).path("/playlists").header("authorization", "Bearer fresh");
			then.status(200).header("content-type", "application/json").json_body(json!({
				"data": [],
				"meta": { "page": 1, "pageSize": 10, "totalCount": 0, "pagesCount": 0 }
			}));
		})
		.await;

	let store = Arc::new(MemoryStore::with_credentials(&SessionCredentials::new("stale", "r1")));
	let config = ClientConfig::builder(Url::parse(&server.base_url())?).api_key("demo-key").build()?;
	let client = AuthenticatedClient::new(config, store.clone());
	let page = client.playlists().fetch(&FetchPlaylistsArgs::default()).await?;

	println!("Fetched {} playlists after one refresh.", page.meta.total_count);
	println!("Refresh attempts recorded: {}.", client.refresh_metrics().attempts());

	if let Some(pair) = store.credentials()? {
		println!("Stored refresh token rotated: {}.", pair.refresh_token.expose() == "r2");
	}

	Ok(())
}
