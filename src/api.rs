//! Typed wrappers over the Spotifun REST resources, built on [`AuthenticatedClient`].
//!
//! [`AuthenticatedClient`]: crate::client::AuthenticatedClient

pub mod playlists;

pub use playlists::*;

/// `serde(with)` adapter for RFC 3339 timestamps.
pub(crate) mod rfc3339 {
	// crates.io
	use serde::{Deserializer, Serializer, de::Error as _, ser::Error as _};
	use time::format_description::well_known::Rfc3339;
	// self
	use crate::_prelude::*;

	pub(crate) fn serialize<S>(value: &OffsetDateTime, serializer: S) -> Result<S::Ok, S::Error>
	where
		S: Serializer,
	{
		let formatted = value.format(&Rfc3339).map_err(S::Error::custom)?;

		serializer.serialize_str(&formatted)
	}

	pub(crate) fn deserialize<'de, D>(deserializer: D) -> Result<OffsetDateTime, D::Error>
	where
		D: Deserializer<'de>,
	{
		let raw = String::deserialize(deserializer)?;

		OffsetDateTime::parse(&raw, &Rfc3339).map_err(D::Error::custom)
	}
}
