// std
use std::{env, fs, process, sync::Arc, thread};
// crates.io
use time::OffsetDateTime;
// self
use spotifun_client::{
	auth::{SessionCredentials, SessionKey, TokenSecret},
	store::{FileStore, MemoryStore, SessionStore},
};

fn pair(i: usize) -> SessionCredentials {
	SessionCredentials::new(format!("access-{i}"), format!("refresh-{i}"))
}

#[test]
fn memory_store_clones_share_state() {
	let store = MemoryStore::default();
	let view = store.clone();

	store.save_credentials(&pair(1)).expect("Saving the pair should succeed.");

	assert_eq!(view.credentials().expect("Read should succeed."), Some(pair(1)));

	view.clear().expect("Clearing should succeed.");

	assert!(store.is_empty());
}

#[test]
fn memory_store_never_exposes_a_torn_pair() {
	let store = Arc::new(MemoryStore::with_credentials(&pair(0)));
	let writers: Vec<_> = (1..=4)
		.map(|i| {
			let store = Arc::clone(&store);

			thread::spawn(move || {
				for _ in 0..200 {
					store.save_credentials(&pair(i)).expect("Saving the pair should succeed.");
				}
			})
		})
		.collect();

	for _ in 0..500 {
		let credentials = store
			.credentials()
			.expect("Read should succeed.")
			.expect("The pair should always be present.");
		let access = credentials.access_token.expose().trim_start_matches("access-");
		let refresh = credentials.refresh_token.expose().trim_start_matches("refresh-");

		assert_eq!(access, refresh, "Access and refresh tokens should come from the same save.");
	}

	for writer in writers {
		writer.join().expect("Writer thread should not panic.");
	}
}

#[test]
fn single_key_writes_are_visible_through_the_trait_object() {
	let store: Arc<dyn SessionStore> = Arc::new(MemoryStore::default());

	store.set(SessionKey::AccessToken, TokenSecret::new("a1")).expect("Set should succeed.");

	assert_eq!(store.credentials().expect("Read should succeed."), None);

	store.set(SessionKey::RefreshToken, "r1".into()).expect("Set should succeed.");

	assert_eq!(
		store.credentials().expect("Read should succeed."),
		Some(SessionCredentials::new("a1", "r1"))
	);

	store.remove(SessionKey::AccessToken).expect("Remove should succeed.");

	assert_eq!(store.get(SessionKey::AccessToken).expect("Read should succeed."), None);
	assert_eq!(store.get(SessionKey::RefreshToken).expect("Read should succeed."), Some("r1".into()));
}

#[test]
fn file_store_survives_reopen_and_creates_parent_directories() {
	let dir = env::temp_dir().join(format!(
		"spotifun_client_session_it_{}_{}",
		process::id(),
		OffsetDateTime::now_utc().unix_timestamp_nanos()
	));
	let path = dir.join("nested").join("session.json");
	let store = FileStore::open(&path).expect("Opening a fresh path should succeed.");

	assert_eq!(store.path(), path.as_path());
	assert_eq!(store.credentials().expect("Read should succeed."), None);

	store.save_credentials(&pair(7)).expect("Saving the pair should succeed.");
	store.set(SessionKey::AccessToken, "access-8".into()).expect("Set should succeed.");

	let reopened = FileStore::open(&path).expect("Reopening should succeed.");

	assert_eq!(
		reopened.credentials().expect("Read should succeed."),
		Some(SessionCredentials::new("access-8", "refresh-7"))
	);

	fs::remove_dir_all(&dir).unwrap_or_else(|e| {
		panic!("Failed to remove temporary session directory {}: {e}", dir.display())
	});
}
