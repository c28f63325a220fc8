#![cfg(feature = "reqwest")]

// crates.io
use httpmock::prelude::*;
use serde_json::json;
use time::macros;
// self
use spotifun_client::{
	_preludet::*,
	api::{CreatePlaylistArgs, FetchPlaylistsArgs, UpdatePlaylistArgs},
	auth::SessionCredentials,
	store::SessionStore,
};

fn playlist_json(id: &str, title: &str) -> serde_json::Value {
	json!({
		"id": id,
		"type": "playlists",
		"attributes": {
			"title": title,
			"description": "",
			"addedAt": "2025-03-01T10:15:00Z",
			"updatedAt": "2025-03-01T10:15:00Z",
			"order": 0,
			"images": { "main": [] },
			"tags": []
		}
	})
}

#[tokio::test]
async fn fetch_sends_query_api_key_and_bearer() {
	let server = MockServer::start_async().await;
	let (client, store) = build_reqwest_test_client(&server.base_url());

	seed_session(store.as_ref(), "a1", "r1");

	let list = server
		.mock_async(|when, then| {
			when.method(GET)
				.path("/playlists")
				.query_param("pageNumber", "2")
				.query_param("pageSize", "5")
				.query_param("search", "road trip")
				.header("api-key", "test-api-key")
				.header("authorization", "Bearer a1");
			then.status(200).header("content-type", "application/json").json_body(json!({
				"data": [playlist_json("pl-1", "Road trip")],
				"meta": { "page": 2, "pageSize": 5, "totalCount": 6, "pagesCount": 2 }
			}));
		})
		.await;
	let args = FetchPlaylistsArgs {
		page_number: Some(2),
		page_size: Some(5),
		search: Some("road trip".into()),
	};
	let page = client.playlists().fetch(&args).await.expect("Fetch should succeed.");

	list.assert_async().await;

	assert_eq!(page.meta.total_count, 6);
	assert_eq!(page.data.len(), 1);
	assert_eq!(page.data[0].attributes.title, "Road trip");
	assert_eq!(page.data[0].attributes.added_at, macros::datetime!(2025-03-01 10:15 UTC));
}

#[tokio::test]
async fn create_wraps_attributes_in_a_resource_envelope() {
	let server = MockServer::start_async().await;
	let (client, store) = build_reqwest_test_client(&server.base_url());

	seed_session(store.as_ref(), "a1", "r1");

	let create = server
		.mock_async(|when, then| {
			when.method(POST).path("/playlists").json_body(json!({
				"data": {
					"type": "playlists",
					"attributes": { "title": "Focus", "description": "Deep work" }
				}
			}));
			then.status(201)
				.header("content-type", "application/json")
				.json_body(json!({ "data": playlist_json("pl-9", "Focus") }));
		})
		.await;
	let args = CreatePlaylistArgs { title: "Focus".into(), description: "Deep work".into() };
	let playlist = client.playlists().create(&args).await.expect("Create should succeed.");

	create.assert_async().await;

	assert_eq!(playlist.id, "pl-9");
	assert_eq!(playlist.kind, "playlists");
}

#[tokio::test]
async fn get_and_update_address_the_item_path() {
	let server = MockServer::start_async().await;
	let (client, store) = build_reqwest_test_client(&server.base_url());

	seed_session(store.as_ref(), "a1", "r1");

	let get = server
		.mock_async(|when, then| {
			when.method(GET).path("/playlists/pl-1");
			then.status(200)
				.header("content-type", "application/json")
				.json_body(json!({ "data": playlist_json("pl-1", "Road trip") }));
		})
		.await;
	let update = server
		.mock_async(|when, then| {
			when.method(PUT).path("/playlists/pl-1").json_body(json!({
				"data": { "type": "playlists", "attributes": { "title": "Night drive" } }
			}));
			then.status(204);
		})
		.await;
	let playlist = client.playlists().get("pl-1").await.expect("Get should succeed.");

	assert_eq!(playlist.attributes.title, "Road trip");

	let args = UpdatePlaylistArgs { title: Some("Night drive".into()), ..Default::default() };

	client.playlists().update("pl-1", &args).await.expect("Update should succeed.");

	get.assert_async().await;
	update.assert_async().await;
}

#[tokio::test]
async fn create_is_replayed_with_its_body_after_a_refresh() {
	let server = MockServer::start_async().await;
	let (client, store) = build_reqwest_test_client(&server.base_url());
	let body = json!({
		"data": { "type": "playlists", "attributes": { "title": "Focus", "description": "" } }
	});

	seed_session(store.as_ref(), "a1", "r1");

	let expired = server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/playlists")
				.header("authorization", "Bearer a1")
				.json_body(body.clone());
			then.status(401);
		})
		.await;
	let refresh = server
		.mock_async(|when, then| {
			when.method(POST).path("/auth/refresh").json_body(json!({ "refreshToken": "r1" }));
			then.status(200)
				.header("content-type", "application/json")
				.json_body(json!({ "accessToken": "a2", "refreshToken": "r2" }));
		})
		.await;
	let replay = server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/playlists")
				.header("authorization", "Bearer a2")
				.json_body(body.clone());
			then.status(201)
				.header("content-type", "application/json")
				.json_body(json!({ "data": playlist_json("pl-2", "Focus") }));
		})
		.await;
	let args = CreatePlaylistArgs { title: "Focus".into(), description: String::new() };
	let playlist = client.playlists().create(&args).await.expect("Replayed create should succeed.");

	expired.assert_async().await;
	refresh.assert_async().await;
	replay.assert_async().await;

	assert_eq!(playlist.id, "pl-2");
	assert_eq!(
		store.credentials().expect("Store should read."),
		Some(SessionCredentials::new("a2", "r2"))
	);
}
