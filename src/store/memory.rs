//! Thread-safe in-memory [`SessionStore`] implementation for local development and tests.

// self
use crate::{
	_prelude::*,
	auth::{SessionCredentials, SessionKey, TokenSecret},
	store::{SessionStore, StoreError, pair_from},
};

type StoreMap = Arc<RwLock<HashMap<SessionKey, TokenSecret>>>;

/// Thread-safe storage backend that keeps the session in-process for tests and demos.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore(StoreMap);
impl MemoryStore {
	/// Creates a store pre-populated with `credentials`.
	pub fn with_credentials(credentials: &SessionCredentials) -> Self {
		let store = Self::default();

		store.write_pair(credentials);

		store
	}

	/// Number of keys currently stored.
	pub fn len(&self) -> usize {
		self.0.read().len()
	}

	/// Returns `true` when no token is stored.
	pub fn is_empty(&self) -> bool {
		self.0.read().is_empty()
	}

	fn write_pair(&self, credentials: &SessionCredentials) {
		let mut guard = self.0.write();

		guard.insert(SessionKey::AccessToken, credentials.access_token.clone());
		guard.insert(SessionKey::RefreshToken, credentials.refresh_token.clone());
	}
}
impl SessionStore for MemoryStore {
	fn get(&self, key: SessionKey) -> Result<Option<TokenSecret>, StoreError> {
		Ok(self.0.read().get(&key).cloned())
	}

	fn set(&self, key: SessionKey, value: TokenSecret) -> Result<(), StoreError> {
		self.0.write().insert(key, value);

		Ok(())
	}

	fn remove(&self, key: SessionKey) -> Result<(), StoreError> {
		self.0.write().remove(&key);

		Ok(())
	}

	fn credentials(&self) -> Result<Option<SessionCredentials>, StoreError> {
		let guard = self.0.read();

		Ok(pair_from(guard.get(&SessionKey::AccessToken), guard.get(&SessionKey::RefreshToken)))
	}

	fn save_credentials(&self, credentials: &SessionCredentials) -> Result<(), StoreError> {
		self.write_pair(credentials);

		Ok(())
	}

	fn clear(&self) -> Result<(), StoreError> {
		self.0.write().clear();

		Ok(())
	}
}
