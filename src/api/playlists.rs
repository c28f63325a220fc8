//! Playlist resource: list, fetch, create, update, and delete.

// self
use crate::{
	_prelude::*,
	api::rfc3339,
	client::AuthenticatedClient,
	error::ConfigError,
	transport::{ApiRequest, HttpTransport},
};

const RESOURCE: &str = "playlists";

/// One page of playlists.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaylistsResponse {
	/// Playlists on this page.
	pub data: Vec<Playlist>,
	/// Pagination metadata.
	pub meta: PageMeta,
}

#[derive(Deserialize)]
struct PlaylistEnvelope {
	data: Playlist,
}

#[derive(Serialize)]
struct PlaylistPayload<'a, A> {
	data: PlaylistPayloadData<'a, A>,
}
#[derive(Serialize)]
struct PlaylistPayloadData<'a, A> {
	#[serde(rename = "type")]
	kind: &'static str,
	attributes: &'a A,
}

/// A single playlist resource.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Playlist {
	/// Resource identifier.
	pub id: String,
	/// Resource type, always `playlists`.
	#[serde(rename = "type")]
	pub kind: String,
	/// Playlist fields.
	pub attributes: PlaylistAttributes,
}

/// Fields of a [`Playlist`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistAttributes {
	/// Display title.
	pub title: String,
	/// Free-form description.
	#[serde(default)]
	pub description: String,
	/// Creation instant.
	#[serde(with = "rfc3339")]
	pub added_at: OffsetDateTime,
	/// Last modification instant.
	#[serde(with = "rfc3339")]
	pub updated_at: OffsetDateTime,
	/// Position in the owner's playlist order.
	pub order: i64,
	/// Cover image URLs.
	#[serde(default)]
	pub images: PlaylistImages,
	/// Tag labels.
	#[serde(default)]
	pub tags: Vec<String>,
}

/// Cover images attached to a playlist.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaylistImages {
	/// Main cover image URLs.
	#[serde(default)]
	pub main: Vec<String>,
}

/// Pagination metadata for list responses.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageMeta {
	/// Current page number (1-based).
	pub page: u32,
	/// Items per page.
	pub page_size: u32,
	/// Total number of items.
	pub total_count: u64,
	/// Total number of pages.
	pub pages_count: u32,
}

/// Query parameters for [`PlaylistsApi::fetch`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FetchPlaylistsArgs {
	/// Page to fetch (1-based).
	pub page_number: Option<u32>,
	/// Items per page.
	pub page_size: Option<u32>,
	/// Title search string.
	pub search: Option<String>,
}
impl FetchPlaylistsArgs {
	fn query_pairs(&self) -> Vec<(&'static str, String)> {
		let mut pairs = Vec::new();

		if let Some(page) = self.page_number {
			pairs.push(("pageNumber", page.to_string()));
		}
		if let Some(size) = self.page_size {
			pairs.push(("pageSize", size.to_string()));
		}
		if let Some(search) = self.search.as_deref().filter(|s| !s.is_empty()) {
			pairs.push(("search", search.to_owned()));
		}

		pairs
	}
}

/// Body of [`PlaylistsApi::create`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatePlaylistArgs {
	/// Display title.
	pub title: String,
	/// Free-form description.
	pub description: String,
}

/// Body of [`PlaylistsApi::update`]; unset fields are left unchanged.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdatePlaylistArgs {
	/// New title.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub title: Option<String>,
	/// New description.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub description: Option<String>,
	/// Replacement tag list.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub tags: Option<Vec<String>>,
}

/// Playlist endpoints bound to an [`AuthenticatedClient`].
pub struct PlaylistsApi<'a, T>
where
	T: ?Sized + HttpTransport,
{
	client: &'a AuthenticatedClient<T>,
}
impl<'a, T> PlaylistsApi<'a, T>
where
	T: ?Sized + HttpTransport,
{
	pub(crate) fn new(client: &'a AuthenticatedClient<T>) -> Self {
		Self { client }
	}

	/// Lists playlists matching `args`.
	pub async fn fetch(&self, args: &FetchPlaylistsArgs) -> Result<PlaylistsResponse> {
		let mut request = self.client.request(Method::GET, RESOURCE)?;
		let pairs = args.query_pairs();

		if !pairs.is_empty() {
			request.url.query_pairs_mut().extend_pairs(pairs);
		}

		self.client.send_json(request).await
	}

	/// Fetches one playlist by identifier.
	pub async fn get(&self, id: &str) -> Result<Playlist> {
		let request = self.item_request(Method::GET, id)?;
		let envelope: PlaylistEnvelope = self.client.send_json(request).await?;

		Ok(envelope.data)
	}

	/// Creates a playlist and returns it as stored by the API.
	pub async fn create(&self, args: &CreatePlaylistArgs) -> Result<Playlist> {
		let request = self.client.request(Method::POST, RESOURCE)?.json(&payload(args))?;
		let envelope: PlaylistEnvelope = self.client.send_json(request).await?;

		Ok(envelope.data)
	}

	/// Updates the fields set in `args`.
	pub async fn update(&self, id: &str, args: &UpdatePlaylistArgs) -> Result<()> {
		let request = self.item_request(Method::PUT, id)?.json(&payload(args))?;

		self.client.send(request).await.map(drop)
	}

	/// Deletes a playlist.
	pub async fn delete(&self, id: &str) -> Result<()> {
		let request = self.item_request(Method::DELETE, id)?;

		self.client.send(request).await.map(drop)
	}

	fn item_request(&self, method: Method, id: &str) -> Result<ApiRequest> {
		let mut request = self.client.request(method, RESOURCE)?;

		request
			.url
			.path_segments_mut()
			.map_err(|_| ConfigError::UnsupportedBaseUrl {
				url: self.client.config().base_url().to_string(),
			})?
			.push(id);

		Ok(request)
	}
}
impl<T> Debug for PlaylistsApi<'_, T>
where
	T: ?Sized + HttpTransport,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("PlaylistsApi").field("client", self.client).finish()
	}
}

fn payload<A>(attributes: &A) -> PlaylistPayload<'_, A> {
	PlaylistPayload { data: PlaylistPayloadData { kind: RESOURCE, attributes } }
}
