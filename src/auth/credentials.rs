//! Session store keys and the access/refresh credential pair.

// self
use crate::{_prelude::*, auth::TokenSecret};

/// Keys the session store is scoped to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SessionKey {
	/// Short-lived access token attached to API requests.
	#[serde(rename = "accessToken")]
	AccessToken,
	/// Long-lived token exchanged for a new pair.
	#[serde(rename = "refreshToken")]
	RefreshToken,
}
impl SessionKey {
	/// Both keys, access first.
	pub const ALL: [SessionKey; 2] = [SessionKey::AccessToken, SessionKey::RefreshToken];

	/// Returns the stable storage label for the key.
	pub const fn as_str(self) -> &'static str {
		match self {
			SessionKey::AccessToken => "accessToken",
			SessionKey::RefreshToken => "refreshToken",
		}
	}
}
impl Display for SessionKey {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Access/refresh pair issued by the refresh endpoint and persisted together.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionCredentials {
	/// Access token attached as the bearer credential.
	pub access_token: TokenSecret,
	/// Refresh token used for the next rotation.
	pub refresh_token: TokenSecret,
}
impl SessionCredentials {
	/// Creates a pair from raw token strings.
	pub fn new(access_token: impl Into<TokenSecret>, refresh_token: impl Into<TokenSecret>) -> Self {
		Self { access_token: access_token.into(), refresh_token: refresh_token.into() }
	}
}
