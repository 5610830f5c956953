//! Single-flight session refresh coordination
//!
//! One [`RefreshCoordinator`] per client. The first request that sees a 401
//! receives a [`RefreshLease`] and performs the refresh; every 401 observed
//! while the lease is held is parked in a FIFO queue and woken when the
//! lease settles.

use crate::error::RefreshError;
use crate::request::RequestId;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::oneshot;

/// Outcome broadcast to every queued request
pub type RefreshOutcome = Result<(), Arc<RefreshError>>;

/// A request parked behind an in-flight refresh
#[derive(Debug)]
struct PendingRequest {
    id: RequestId,
    notify: oneshot::Sender<RefreshOutcome>,
}

#[derive(Debug, Default)]
struct RefreshState {
    refreshing: bool,
    queue: VecDeque<PendingRequest>,
}

/// What a request must do after observing a 401
#[derive(Debug)]
pub enum Ticket<'a> {
    /// No refresh was in flight: this request performs it
    Lead(RefreshLease<'a>),
    /// A refresh is in flight: wait for its outcome
    Wait(oneshot::Receiver<RefreshOutcome>),
}

/// Gate ensuring at most one refresh call is in flight
#[derive(Debug, Default)]
pub struct RefreshCoordinator {
    state: Mutex<RefreshState>,
}

impl RefreshCoordinator {
    /// Create an idle coordinator
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Either take the lead on a refresh or join the queue
    ///
    /// The flag check, flag set and enqueue happen under one lock that is
    /// released before the caller awaits anything.
    pub fn enter(&self, id: RequestId) -> Ticket<'_> {
        let mut state = self.state.lock();
        if state.refreshing {
            let (notify, wait) = oneshot::channel();
            state.queue.push_back(PendingRequest { id, notify });
            tracing::debug!(request = %id, queued = state.queue.len(), "queued behind refresh");
            Ticket::Wait(wait)
        } else {
            state.refreshing = true;
            tracing::debug!(request = %id, "leading session refresh");
            Ticket::Lead(RefreshLease {
                coordinator: self,
                settled: false,
            })
        }
    }

    /// Whether a refresh is currently in flight
    #[must_use]
    pub fn is_refreshing(&self) -> bool {
        self.state.lock().refreshing
    }

    /// Number of requests parked behind the in-flight refresh
    #[must_use]
    pub fn queued(&self) -> usize {
        self.state.lock().queue.len()
    }

    /// Clear the flag and wake every parked request in arrival order
    fn settle(&self, outcome: &RefreshOutcome) -> usize {
        let pending = {
            let mut state = self.state.lock();
            state.refreshing = false;
            std::mem::take(&mut state.queue)
        };

        let released = pending.len();
        for request in pending {
            if request.notify.send(outcome.clone()).is_err() {
                tracing::trace!(request = %request.id, "queued request went away before release");
            }
        }
        released
    }
}

/// Exclusive right to perform the refresh
///
/// Dropping an unsettled lease fails the queue with
/// [`RefreshError::Abandoned`] so parked requests never hang.
#[derive(Debug)]
pub struct RefreshLease<'a> {
    coordinator: &'a RefreshCoordinator,
    settled: bool,
}

impl RefreshLease<'_> {
    /// Refresh succeeded: release the queue for replay
    ///
    /// Returns the number of released requests.
    pub fn succeed(mut self) -> usize {
        self.settled = true;
        self.coordinator.settle(&Ok(()))
    }

    /// Refresh failed: reject the queue with the shared error
    ///
    /// Returns the number of rejected requests.
    pub fn fail(mut self, error: Arc<RefreshError>) -> usize {
        self.settled = true;
        self.coordinator.settle(&Err(error))
    }
}

impl Drop for RefreshLease<'_> {
    fn drop(&mut self) {
        if !self.settled {
            self.coordinator
                .settle(&Err(Arc::new(RefreshError::Abandoned)));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lead(coordinator: &RefreshCoordinator) -> RefreshLease<'_> {
        match coordinator.enter(RequestId::new()) {
            Ticket::Lead(lease) => lease,
            Ticket::Wait(_) => panic!("expected to lead"),
        }
    }

    fn wait(coordinator: &RefreshCoordinator) -> oneshot::Receiver<RefreshOutcome> {
        match coordinator.enter(RequestId::new()) {
            Ticket::Wait(rx) => rx,
            Ticket::Lead(_) => panic!("expected to wait"),
        }
    }

    #[test]
    fn first_entrant_leads_others_wait() {
        let coordinator = RefreshCoordinator::new();
        let lease = lead(&coordinator);
        assert!(coordinator.is_refreshing());

        let _a = wait(&coordinator);
        let _b = wait(&coordinator);
        assert_eq!(coordinator.queued(), 2);

        assert_eq!(lease.succeed(), 2);
        assert!(!coordinator.is_refreshing());
        assert_eq!(coordinator.queued(), 0);
    }

    #[tokio::test]
    async fn success_releases_waiters() {
        let coordinator = RefreshCoordinator::new();
        let lease = lead(&coordinator);
        let rx = wait(&coordinator);

        lease.succeed();
        assert!(rx.await.unwrap().is_ok());
    }

    #[tokio::test]
    async fn failure_rejects_waiters_with_shared_error() {
        let coordinator = RefreshCoordinator::new();
        let lease = lead(&coordinator);
        let a = wait(&coordinator);
        let b = wait(&coordinator);

        lease.fail(Arc::new(RefreshError::Rejected { status: 401 }));

        let a = a.await.unwrap().unwrap_err();
        let b = b.await.unwrap().unwrap_err();
        assert!(Arc::ptr_eq(&a, &b));
        assert!(matches!(*a, RefreshError::Rejected { status: 401 }));
    }

    #[tokio::test]
    async fn dropped_lease_abandons_queue() {
        let coordinator = RefreshCoordinator::new();
        let lease = lead(&coordinator);
        let rx = wait(&coordinator);

        drop(lease);

        assert!(!coordinator.is_refreshing());
        let err = rx.await.unwrap().unwrap_err();
        assert!(matches!(*err, RefreshError::Abandoned));
    }

    #[test]
    fn coordinator_is_reusable_after_settle() {
        let coordinator = RefreshCoordinator::new();
        lead(&coordinator).succeed();
        let second = lead(&coordinator);
        second.fail(Arc::new(RefreshError::Abandoned));
        assert!(!coordinator.is_refreshing());
    }
}
