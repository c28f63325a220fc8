// self
use crate::{_prelude::*, obs::Stage, store::StoreError};

/// Type alias that resolves to an instrumented future when tracing is enabled.
#[cfg(feature = "tracing")]
pub type InstrumentedCall<F> = tracing::instrument::Instrumented<F>;
/// Passthrough future type when tracing is disabled.
#[cfg(not(feature = "tracing"))]
pub type InstrumentedCall<F> = F;

/// A span builder used around client calls.
#[derive(Clone, Debug)]
pub struct CallSpan {
	#[cfg(feature = "tracing")]
	span: tracing::Span,
}
impl CallSpan {
	/// Creates a new span tagged with the stage and the request's method + path.
	pub fn new(stage: Stage, method: &Method, url: &Url) -> Self {
		#[cfg(feature = "tracing")]
		{
			let span = tracing::info_span!(
				"spotifun_client.request",
				stage = stage.as_str(),
				method = method.as_str(),
				path = url.path(),
			);

			Self { span }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = (stage, method, url);

			Self {}
		}
	}

	/// Instruments an async block without holding a guard across `.await` points.
	pub fn instrument<Fut>(&self, fut: Fut) -> InstrumentedCall<Fut>
	where
		Fut: Future,
	{
		#[cfg(feature = "tracing")]
		{
			use tracing::Instrument;

			fut.instrument(self.span.clone())
		}
		#[cfg(not(feature = "tracing"))]
		{
			fut
		}
	}
}

/// Reports a session store that could not be cleared after a failed refresh.
pub fn record_session_clear_failure(error: &StoreError) {
	#[cfg(feature = "tracing")]
	{
		tracing::warn!(error = %error, "session could not be cleared after a failed token refresh");
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = error;
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[tokio::test]
	async fn instrument_wraps_future() {
		let url = Url::parse("https://api.example.com/playlists").expect("Fixture URL should parse.");
		let span = CallSpan::new(Stage::Replay, &Method::GET, &url);
		let value = span.instrument(async { 42 }).await;

		assert_eq!(value, 42);
	}

	#[test]
	fn session_clear_failure_without_subscriber() {
		record_session_clear_failure(&StoreError::Backend { message: "disk unreachable".into() });
	}
}
