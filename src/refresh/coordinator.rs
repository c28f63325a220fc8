//! Single-flight refresh state machine.
//!
//! A [`RefreshCoordinator`] is either [`Idle`](RefreshState::Idle) or
//! [`Refreshing`](RefreshState::Refreshing) with a FIFO queue of waiters. The first caller to
//! [`begin`](RefreshCoordinator::begin) while idle receives a [`RefreshLease`] and owns the
//! refresh call; later callers receive a [`PendingRefresh`] that settles when the lease does.
//! The state lock is never held across an `.await`.

// crates.io
use futures::channel::oneshot;
// self
use crate::{
	_prelude::*,
	auth::TokenSecret,
	obs::{self, RefreshOutcome},
	refresh::RefreshMetrics,
};

type Outcome = std::result::Result<TokenSecret, Arc<Error>>;
type Waiter = oneshot::Sender<Outcome>;

#[derive(Debug, Default)]
enum RefreshState {
	#[default]
	Idle,
	Refreshing {
		pending: VecDeque<Waiter>,
	},
}

/// Per-client owner of the refresh flag and the queue of waiting requests.
#[derive(Debug, Default)]
pub struct RefreshCoordinator {
	state: Mutex<RefreshState>,
	metrics: RefreshMetrics,
}
impl RefreshCoordinator {
	/// Joins the current refresh window.
	///
	/// Returns [`RefreshTicket::Leader`] when no refresh is in flight (the coordinator moves to
	/// refreshing), otherwise enqueues a waiter and returns [`RefreshTicket::Follower`].
	pub fn begin(&self) -> RefreshTicket<'_> {
		let mut state = self.state.lock();

		if let RefreshState::Refreshing { pending } = &mut *state {
			let (tx, rx) = oneshot::channel();

			pending.push_back(tx);
			self.metrics.record_queued();
			obs::record_refresh_outcome(RefreshOutcome::Queued);

			return RefreshTicket::Follower(PendingRefresh(rx));
		}

		*state = RefreshState::Refreshing { pending: VecDeque::new() };

		self.metrics.record_attempt();
		obs::record_refresh_outcome(RefreshOutcome::Attempt);

		RefreshTicket::Leader(RefreshLease { coordinator: self, settled: false })
	}

	/// Returns `true` while a refresh call is outstanding.
	pub fn is_refreshing(&self) -> bool {
		matches!(*self.state.lock(), RefreshState::Refreshing { .. })
	}

	/// Number of requests waiting on the in-flight refresh.
	pub fn pending_len(&self) -> usize {
		match &*self.state.lock() {
			RefreshState::Idle => 0,
			RefreshState::Refreshing { pending } => pending.len(),
		}
	}

	/// Refresh counters for this coordinator.
	pub fn metrics(&self) -> &RefreshMetrics {
		&self.metrics
	}

	// `None` drops every waiter, which they observe as an interrupted refresh.
	fn settle(&self, outcome: Option<Outcome>) -> usize {
		let previous = std::mem::take(&mut *self.state.lock());
		let RefreshState::Refreshing { pending } = previous else {
			return 0;
		};
		let released = pending.len();

		match outcome {
			Some(outcome) =>
				for waiter in pending {
					// A waiter whose caller went away simply misses the outcome.
					let _ = waiter.send(outcome.clone());
				},
			None => drop(pending),
		}

		released
	}
}

/// Result of [`RefreshCoordinator::begin`].
#[derive(Debug)]
pub enum RefreshTicket<'a> {
	/// The caller must perform the refresh and settle the lease.
	Leader(RefreshLease<'a>),
	/// A refresh is already in flight; wait for it.
	Follower(PendingRefresh),
}

/// Exclusive right to perform the in-flight refresh.
///
/// Settling the lease releases every waiter in enqueue order and returns the coordinator to idle.
/// Dropping an unsettled lease also returns to idle; its waiters fail with
/// [`Error::RefreshInterrupted`].
#[derive(Debug)]
pub struct RefreshLease<'a> {
	coordinator: &'a RefreshCoordinator,
	settled: bool,
}
impl RefreshLease<'_> {
	/// Hands `token` to every waiter and returns how many were released.
	pub fn resolve(mut self, token: &TokenSecret) -> usize {
		self.settled = true;
		self.coordinator.metrics.record_success();
		obs::record_refresh_outcome(RefreshOutcome::Success);

		self.coordinator.settle(Some(Ok(token.clone())))
	}

	/// Hands `error` to every waiter and returns how many were released.
	pub fn reject(mut self, error: Arc<Error>) -> usize {
		self.settled = true;
		self.coordinator.metrics.record_failure();
		obs::record_refresh_outcome(RefreshOutcome::Failure);

		self.coordinator.settle(Some(Err(error)))
	}
}
impl Drop for RefreshLease<'_> {
	fn drop(&mut self) {
		if !self.settled {
			self.coordinator.metrics.record_failure();
			obs::record_refresh_outcome(RefreshOutcome::Interrupted);
			self.coordinator.settle(None);
		}
	}
}

/// Waiter queued behind an in-flight refresh.
#[derive(Debug)]
pub struct PendingRefresh(oneshot::Receiver<Outcome>);
impl PendingRefresh {
	/// Waits for the in-flight refresh to settle and returns the new access token.
	pub async fn wait(self) -> Result<TokenSecret> {
		match self.0.await {
			Ok(Ok(token)) => Ok(token),
			Ok(Err(source)) => Err(Error::RefreshFailed { source }),
			Err(oneshot::Canceled) => Err(Error::RefreshInterrupted),
		}
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn leader(coordinator: &RefreshCoordinator) -> RefreshLease<'_> {
		match coordinator.begin() {
			RefreshTicket::Leader(lease) => lease,
			RefreshTicket::Follower(_) => panic!("Idle coordinator should hand out a lease."),
		}
	}

	fn follower(coordinator: &RefreshCoordinator) -> PendingRefresh {
		match coordinator.begin() {
			RefreshTicket::Follower(pending) => pending,
			RefreshTicket::Leader(_) => panic!("Busy coordinator should queue the caller."),
		}
	}

	#[tokio::test]
	async fn resolve_releases_waiters_with_the_same_token() {
		let coordinator = RefreshCoordinator::default();
		let lease = leader(&coordinator);
		let first = follower(&coordinator);
		let second = follower(&coordinator);

		assert!(coordinator.is_refreshing());
		assert_eq!(coordinator.pending_len(), 2);
		assert_eq!(lease.resolve(&TokenSecret::new("a3")), 2);
		assert!(!coordinator.is_refreshing());

		for pending in [first, second] {
			let token = pending.wait().await.expect("Waiter should receive the new token.");

			assert_eq!(token.expose(), "a3");
		}

		let metrics = coordinator.metrics();

		assert_eq!((metrics.attempts(), metrics.successes(), metrics.queued()), (1, 1, 2));
	}

	#[tokio::test]
	async fn reject_shares_one_error_across_waiters() {
		let coordinator = RefreshCoordinator::default();
		let lease = leader(&coordinator);
		let pending = follower(&coordinator);
		let cause = Arc::new(Error::request_failed(StatusCode::BAD_REQUEST, b"invalid refresh"));

		assert_eq!(lease.reject(Arc::clone(&cause)), 1);

		match pending.wait().await {
			Err(Error::RefreshFailed { source }) => assert!(Arc::ptr_eq(&source, &cause)),
			other => panic!("Unexpected waiter outcome: {other:?}."),
		}

		assert_eq!(coordinator.metrics().failures(), 1);
	}

	#[tokio::test]
	async fn dropped_lease_interrupts_waiters_and_resets() {
		let coordinator = RefreshCoordinator::default();
		let lease = leader(&coordinator);
		let pending = follower(&coordinator);

		drop(lease);

		assert!(!coordinator.is_refreshing());
		assert!(matches!(pending.wait().await, Err(Error::RefreshInterrupted)));

		// The next 401 starts a fresh refresh instead of queueing forever.
		let _lease = leader(&coordinator);

		assert_eq!(coordinator.metrics().attempts(), 2);
	}

	#[test]
	fn settling_without_waiters_returns_to_idle() {
		let coordinator = RefreshCoordinator::default();

		assert_eq!(leader(&coordinator).resolve(&TokenSecret::new("a2")), 0);
		assert!(!coordinator.is_refreshing());
		assert_eq!(coordinator.pending_len(), 0);
	}
}
