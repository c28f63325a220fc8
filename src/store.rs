//! Session store contract and built-in backends for the access/refresh pair.

pub mod file;
pub mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

// self
use crate::{
	_prelude::*,
	auth::{SessionCredentials, SessionKey, TokenSecret},
};

/// Key-value store holding the session's access and refresh tokens.
///
/// Calls are synchronous and must not block for long; the client invokes them between
/// suspension points. Backends that can write both keys in one step should override
/// [`credentials`](SessionStore::credentials),
/// [`save_credentials`](SessionStore::save_credentials), and [`clear`](SessionStore::clear) so
/// readers never observe half a pair.
pub trait SessionStore
where
	Self: Send + Sync,
{
	/// Reads the secret stored under `key`.
	fn get(&self, key: SessionKey) -> Result<Option<TokenSecret>, StoreError>;

	/// Stores `value` under `key`, replacing any previous secret.
	fn set(&self, key: SessionKey, value: TokenSecret) -> Result<(), StoreError>;

	/// Removes the secret stored under `key`, if any.
	fn remove(&self, key: SessionKey) -> Result<(), StoreError>;

	/// Returns the stored pair when both halves are present.
	fn credentials(&self) -> Result<Option<SessionCredentials>, StoreError> {
		let access = self.get(SessionKey::AccessToken)?;
		let refresh = self.get(SessionKey::RefreshToken)?;

		Ok(pair_from(access.as_ref(), refresh.as_ref()))
	}

	/// Persists both halves of `credentials`.
	fn save_credentials(&self, credentials: &SessionCredentials) -> Result<(), StoreError> {
		self.set(SessionKey::AccessToken, credentials.access_token.clone())?;
		self.set(SessionKey::RefreshToken, credentials.refresh_token.clone())
	}

	/// Removes both halves of the pair.
	fn clear(&self) -> Result<(), StoreError> {
		self.remove(SessionKey::AccessToken)?;
		self.remove(SessionKey::RefreshToken)
	}
}

/// Error type produced by [`SessionStore`] implementations.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum StoreError {
	/// Serialization failures surfaced by the backend.
	#[error("Serialization error: {message}.")]
	Serialization {
		/// Human-readable error payload.
		message: String,
	},
	/// Backend-level failure for the storage engine.
	#[error("Backend failure: {message}.")]
	Backend {
		/// Human-readable error payload.
		message: String,
	},
}

pub(crate) fn pair_from(
	access: Option<&TokenSecret>,
	refresh: Option<&TokenSecret>,
) -> Option<SessionCredentials> {
	access.zip(refresh).map(|(access_token, refresh_token)| SessionCredentials {
		access_token: access_token.clone(),
		refresh_token: refresh_token.clone(),
	})
}
