//! Authenticated Spotifun API client: bearer injection, single-flight token refresh with queued
//! replays, and typed playlist endpoints in one crate.
//!
//! The entry point is [`client::AuthenticatedClient`]. Every request it sends picks up the stored
//! access token; a `401` triggers exactly one refresh per burst of failures, concurrent `401`s
//! wait on the in-flight refresh, and every waiter is replayed with the rotated token.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod api;
pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod obs;
pub mod refresh;
pub mod store;
pub mod transport;
#[cfg(all(any(test, feature = "test"), feature = "reqwest"))]
pub mod _preludet {
	//! Convenience re-exports and fixtures for integration tests; enabled via `cfg(test)` or the
	//! `test` crate feature.

	pub use crate::_prelude::*;

	// self
	use crate::{
		auth::SessionCredentials,
		client::AuthenticatedClient,
		config::ClientConfig,
		store::{MemoryStore, SessionStore},
		transport::ReqwestTransport,
	};

	/// Client type alias used by reqwest-backed integration tests.
	pub type ReqwestTestClient = AuthenticatedClient<ReqwestTransport>;

	/// Builds a [`ClientConfig`] rooted at `base_url` with a fixed test API key.
	pub fn test_config(base_url: &str) -> ClientConfig {
		let base_url = Url::parse(base_url).expect("Test base URL should parse.");

		ClientConfig::builder(base_url)
			.api_key("test-api-key")
			.build()
			.expect("Test client configuration should build.")
	}

	/// Seeds `store` with the provided access/refresh pair.
	pub fn seed_session(store: &dyn SessionStore, access: &str, refresh: &str) {
		store
			.save_credentials(&SessionCredentials::new(access, refresh))
			.expect("Seeding the session store should succeed.");
	}

	/// Constructs a reqwest-backed [`AuthenticatedClient`] over an in-memory session store.
	pub fn build_reqwest_test_client(base_url: &str) -> (ReqwestTestClient, Arc<MemoryStore>) {
		let store_backend = Arc::new(MemoryStore::default());
		let store: Arc<dyn SessionStore> = store_backend.clone();
		let client = AuthenticatedClient::new(test_config(base_url), store);

		(client, store_backend)
	}
}

mod _prelude {
	pub use std::{
		collections::{HashMap, VecDeque},
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		sync::Arc,
	};

	pub use http::{HeaderMap, HeaderName, HeaderValue, Method, StatusCode};
	pub use parking_lot::{Mutex, RwLock};
	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use time::OffsetDateTime;
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

pub use http;
#[cfg(feature = "reqwest")] pub use reqwest;
pub use url;
#[cfg(test)] use {color_eyre as _, httpmock as _, spotifun_client as _, tokio as _};
