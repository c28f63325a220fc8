//! Simple file-backed [`SessionStore`] that keeps the session across process restarts.

// std
use std::{
	collections::BTreeMap,
	fs::{self, File},
	io::Write,
	path::{Path, PathBuf},
};
// self
use crate::{
	_prelude::*,
	auth::{SessionCredentials, SessionKey, TokenSecret},
	store::{SessionStore, StoreError, pair_from},
};

type Snapshot = BTreeMap<SessionKey, TokenSecret>;

/// Persists the session to a JSON object (`{"accessToken": .., "refreshToken": ..}`) after each
/// mutation.
#[derive(Clone, Debug)]
pub struct FileStore {
	path: PathBuf,
	inner: Arc<RwLock<Snapshot>>,
}
impl FileStore {
	/// Opens (or creates) a store at the provided path, eagerly loading existing data.
	pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
		let path = path.into();

		Self::ensure_parent_exists(&path)?;

		let snapshot = Self::load_snapshot(&path)?;

		Ok(Self { path, inner: Arc::new(RwLock::new(snapshot)) })
	}

	/// Location of the backing file.
	pub fn path(&self) -> &Path {
		&self.path
	}

	fn load_snapshot(path: &Path) -> Result<Snapshot, StoreError> {
		if !path.exists() {
			return Ok(Snapshot::new());
		}

		let bytes = fs::read(path).map_err(|e| StoreError::Backend {
			message: format!("Failed to read {}: {e}", path.display()),
		})?;

		if bytes.iter().all(u8::is_ascii_whitespace) {
			return Ok(Snapshot::new());
		}

		serde_json::from_slice(&bytes).map_err(|e| StoreError::Serialization {
			message: format!("Failed to parse {}: {e}", path.display()),
		})
	}

	fn ensure_parent_exists(path: &Path) -> Result<(), StoreError> {
		if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
			fs::create_dir_all(parent).map_err(|e| StoreError::Backend {
				message: format!("Failed to create store directory {}: {e}", parent.display()),
			})?;
		}

		Ok(())
	}

	fn persist_locked(&self, contents: &Snapshot) -> Result<(), StoreError> {
		Self::ensure_parent_exists(&self.path)?;

		let serialized =
			serde_json::to_vec_pretty(contents).map_err(|e| StoreError::Serialization {
				message: format!("Failed to serialize session snapshot: {e}"),
			})?;
		let mut tmp_path = self.path.clone();

		tmp_path.set_extension("tmp");

		{
			let mut file = File::create(&tmp_path).map_err(|e| StoreError::Backend {
				message: format!("Failed to create {}: {e}", tmp_path.display()),
			})?;

			file.write_all(&serialized).map_err(|e| StoreError::Backend {
				message: format!("Failed to write {}: {e}", tmp_path.display()),
			})?;
			file.sync_all().map_err(|e| StoreError::Backend {
				message: format!("Failed to sync {}: {e}", tmp_path.display()),
			})?;
		}

		fs::rename(&tmp_path, &self.path).map_err(|e| StoreError::Backend {
			message: format!("Failed to replace {}: {e}", self.path.display()),
		})
	}

	fn mutate(&self, apply: impl FnOnce(&mut Snapshot)) -> Result<(), StoreError> {
		let mut guard = self.inner.write();
		let mut next = guard.clone();

		apply(&mut next);
		self.persist_locked(&next)?;
		*guard = next;

		Ok(())
	}
}
impl SessionStore for FileStore {
	fn get(&self, key: SessionKey) -> Result<Option<TokenSecret>, StoreError> {
		Ok(self.inner.read().get(&key).cloned())
	}

	fn set(&self, key: SessionKey, value: TokenSecret) -> Result<(), StoreError> {
		self.mutate(|snapshot| {
			snapshot.insert(key, value);
		})
	}

	fn remove(&self, key: SessionKey) -> Result<(), StoreError> {
		self.mutate(|snapshot| {
			snapshot.remove(&key);
		})
	}

	fn credentials(&self) -> Result<Option<SessionCredentials>, StoreError> {
		let guard = self.inner.read();

		Ok(pair_from(guard.get(&SessionKey::AccessToken), guard.get(&SessionKey::RefreshToken)))
	}

	fn save_credentials(&self, credentials: &SessionCredentials) -> Result<(), StoreError> {
		self.mutate(|snapshot| {
			snapshot.insert(SessionKey::AccessToken, credentials.access_token.clone());
			snapshot.insert(SessionKey::RefreshToken, credentials.refresh_token.clone());
		})
	}

	fn clear(&self) -> Result<(), StoreError> {
		self.mutate(Snapshot::clear)
	}
}

#[cfg(test)]
mod tests {
	// std
	use std::{env, process};
	// self
	use super::*;

	fn temp_path(label: &str) -> PathBuf {
		let unique = format!(
			"spotifun_client_file_store_{label}_{}_{}.json",
			process::id(),
			OffsetDateTime::now_utc().unix_timestamp_nanos(),
		);

		env::temp_dir().join(unique)
	}

	#[test]
	fn save_and_reload_round_trip() {
		let path = temp_path("reload");
		let store = FileStore::open(&path).expect("Failed to open file store snapshot.");

		store
			.save_credentials(&SessionCredentials::new("access-token", "refresh-token"))
			.expect("Failed to save fixture pair to file store.");
		drop(store);

		let reopened = FileStore::open(&path).expect("Failed to reopen file store snapshot.");
		let fetched = reopened
			.credentials()
			.expect("Failed to read pair from file store.")
			.expect("File store lost the pair after reopen.");

		assert_eq!(fetched.access_token.expose(), "access-token");
		assert_eq!(fetched.refresh_token.expose(), "refresh-token");

		let raw = fs::read_to_string(&path).expect("Snapshot file should be readable.");

		assert!(raw.contains("\"accessToken\""));

		fs::remove_file(&path).unwrap_or_else(|e| {
			panic!("Failed to remove temporary file store snapshot {}: {e}", path.display())
		});
	}

	#[test]
	fn clear_persists_empty_snapshot() {
		let path = temp_path("clear");
		let store = FileStore::open(&path).expect("Failed to open file store snapshot.");

		store
			.save_credentials(&SessionCredentials::new("a1", "r1"))
			.expect("Failed to save fixture pair to file store.");
		store.clear().expect("Clearing the file store should succeed.");

		let reopened = FileStore::open(&path).expect("Failed to reopen file store snapshot.");

		for key in SessionKey::ALL {
			assert_eq!(reopened.get(key).expect("Read should succeed."), None);
		}

		fs::remove_file(&path).unwrap_or_else(|e| {
			panic!("Failed to remove temporary file store snapshot {}: {e}", path.display())
		});
	}

	#[test]
	fn open_rejects_corrupt_snapshot() {
		let path = temp_path("corrupt");

		fs::write(&path, b"not json").expect("Fixture file should be writable.");

		let err = FileStore::open(&path).expect_err("Corrupt snapshot should be rejected.");

		assert!(matches!(err, StoreError::Serialization { .. }));

		fs::remove_file(&path).unwrap_or_else(|e| {
			panic!("Failed to remove temporary file store snapshot {}: {e}", path.display())
		});
	}
}
