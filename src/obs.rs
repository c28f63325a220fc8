//! Optional observability helpers for the interceptor and refresh paths.
//!
//! # Feature Flags
//!
//! - Enable `tracing` (on by default) to emit spans named `spotifun_client.request` with the
//!   `stage`, `method`, and `path` fields, plus a debug event per refresh outcome.
//! - Enable `metrics` to increment the `spotifun_client_refresh_total` counter for every refresh
//!   outcome, labeled by `outcome`.

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// self
use crate::_prelude::*;

/// Stages of a client call observed by spans.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Stage {
	/// First dispatch of a caller's request.
	Send,
	/// Call to the refresh endpoint.
	Refresh,
	/// Re-dispatch of a request with a rotated token.
	Replay,
}
impl Stage {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			Stage::Send => "send",
			Stage::Refresh => "refresh",
			Stage::Replay => "replay",
		}
	}
}
impl Display for Stage {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for refresh activity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RefreshOutcome {
	/// A refresh call was started.
	Attempt,
	/// A request joined an in-flight refresh.
	Queued,
	/// The refresh produced a new pair.
	Success,
	/// The refresh failed and the session was cleared.
	Failure,
	/// The refresh leader went away before settling.
	Interrupted,
}
impl RefreshOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			RefreshOutcome::Attempt => "attempt",
			RefreshOutcome::Queued => "queued",
			RefreshOutcome::Success => "success",
			RefreshOutcome::Failure => "failure",
			RefreshOutcome::Interrupted => "interrupted",
		}
	}
}
impl Display for RefreshOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
