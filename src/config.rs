//! Client configuration: API base URL, static API key, and refresh endpoint path.

// std
use std::env;
// self
use crate::{_prelude::*, error::ConfigError};

/// Header carrying the static API key on every request.
pub const API_KEY_HEADER: HeaderName = HeaderName::from_static("api-key");

/// Validated client configuration.
#[derive(Clone, Debug)]
pub struct ClientConfig {
	base_url: Url,
	default_headers: HeaderMap,
	refresh_url: Url,
}
impl ClientConfig {
	/// Environment variable holding the API base URL.
	pub const ENV_BASE_URL: &'static str = "SPOTIFUN_BASE_URL";
	/// Environment variable holding the optional API key.
	pub const ENV_API_KEY: &'static str = "SPOTIFUN_API_KEY";
	/// Environment variable overriding the refresh endpoint path.
	pub const ENV_REFRESH_PATH: &'static str = "SPOTIFUN_REFRESH_PATH";
	/// Refresh endpoint path used when none is configured.
	pub const DEFAULT_REFRESH_PATH: &'static str = "auth/refresh";

	/// Creates a new builder rooted at `base_url`.
	pub fn builder(base_url: Url) -> ClientConfigBuilder {
		ClientConfigBuilder::new(base_url)
	}

	/// Loads the configuration from `SPOTIFUN_*` environment variables.
	pub fn from_env() -> Result<Self, ConfigError> {
		Self::from_lookup(|var| env::var(var).ok())
	}

	fn from_lookup(lookup: impl Fn(&'static str) -> Option<String>) -> Result<Self, ConfigError> {
		let raw = lookup(Self::ENV_BASE_URL)
			.ok_or(ConfigError::MissingEnv { var: Self::ENV_BASE_URL })?;
		let base_url = Url::parse(&raw)
			.map_err(|source| ConfigError::InvalidUrl { value: raw.clone(), source })?;
		let mut builder = Self::builder(base_url);

		if let Some(key) = lookup(Self::ENV_API_KEY).filter(|key| !key.is_empty()) {
			builder = builder.api_key(key);
		}
		if let Some(path) = lookup(Self::ENV_REFRESH_PATH).filter(|path| !path.is_empty()) {
			builder = builder.refresh_path(path);
		}

		builder.build()
	}

	/// Base URL every relative API path is joined onto. Always ends with `/`.
	pub fn base_url(&self) -> &Url {
		&self.base_url
	}

	/// Absolute URL of the refresh endpoint.
	pub fn refresh_url(&self) -> &Url {
		&self.refresh_url
	}

	/// Headers applied to every outbound request, including refresh calls.
	pub fn default_headers(&self) -> &HeaderMap {
		&self.default_headers
	}

	/// Resolves a relative API path against the base URL.
	pub fn endpoint(&self, path: &str) -> Result<Url, ConfigError> {
		let trimmed = path.trim_start_matches('/');

		self.base_url
			.join(trimmed)
			.map_err(|source| ConfigError::InvalidUrl { value: path.to_owned(), source })
	}
}

/// Builder for [`ClientConfig`].
#[derive(Clone, Debug)]
pub struct ClientConfigBuilder {
	base_url: Url,
	api_key: Option<String>,
	refresh_path: String,
}
impl ClientConfigBuilder {
	fn new(base_url: Url) -> Self {
		Self { base_url, api_key: None, refresh_path: ClientConfig::DEFAULT_REFRESH_PATH.into() }
	}

	/// Sends `key` in the `API-KEY` header of every request.
	pub fn api_key(mut self, key: impl Into<String>) -> Self {
		self.api_key = Some(key.into());

		self
	}

	/// Overrides the refresh endpoint path (relative to the base URL).
	pub fn refresh_path(mut self, path: impl Into<String>) -> Self {
		self.refresh_path = path.into();

		self
	}

	/// Validates the inputs and produces a [`ClientConfig`].
	pub fn build(self) -> Result<ClientConfig, ConfigError> {
		let mut base_url = self.base_url;

		if !matches!(base_url.scheme(), "http" | "https") || base_url.cannot_be_a_base() {
			return Err(ConfigError::UnsupportedBaseUrl { url: base_url.to_string() });
		}
		if !base_url.path().ends_with('/') {
			let path = format!("{}/", base_url.path());

			base_url.set_path(&path);
		}

		let mut default_headers = HeaderMap::new();

		if let Some(key) = self.api_key {
			let mut value = HeaderValue::try_from(key)
				.map_err(|source| ConfigError::InvalidHeader { name: "api-key", source })?;

			value.set_sensitive(true);
			default_headers.insert(API_KEY_HEADER, value);
		}

		let mut config = ClientConfig { refresh_url: base_url.clone(), base_url, default_headers };

		config.refresh_url = config.endpoint(&self.refresh_path)?;

		Ok(config)
	}
}
