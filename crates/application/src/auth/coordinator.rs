//! Single-flight coordination of token refreshes.
//!
//! The coordinator is a two-state machine, idle or refreshing. The first
//! caller to [`RefreshCoordinator::join`] while idle becomes the leader and
//! receives a [`RefreshLease`]; everyone who joins before the lease is
//! settled gets a [`PendingRefresh`] and is resolved, in join order, with
//! the leader's outcome.
//!
//! State changes happen under a mutex that is never held across an await,
//! so the coordinator is safe on a multi-threaded runtime.

use std::collections::VecDeque;

use parking_lot::Mutex;
use tokio::sync::oneshot;

use crate::error::ClientError;

/// Outcome delivered to waiters: the new access token or the refresh error.
pub type RefreshOutcome = Result<String, ClientError>;

#[derive(Debug, Default)]
struct State {
    refreshing: bool,
    waiters: VecDeque<oneshot::Sender<RefreshOutcome>>,
}

/// Collapses concurrent refresh attempts into one.
#[derive(Debug, Default)]
pub struct RefreshCoordinator {
    state: Mutex<State>,
}

/// What a caller must do after joining the coordinator.
#[derive(Debug)]
pub enum RefreshTicket<'a> {
    /// No refresh was in flight; the caller must perform it and settle.
    Leader(RefreshLease<'a>),
    /// A refresh is in flight; the caller awaits its outcome.
    Waiter(PendingRefresh),
}

impl RefreshCoordinator {
    /// Creates an idle coordinator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true while a leader holds an unsettled lease.
    #[must_use]
    pub fn is_refreshing(&self) -> bool {
        self.state.lock().refreshing
    }

    /// Returns the number of callers queued behind the current refresh.
    #[must_use]
    pub fn waiting(&self) -> usize {
        self.state.lock().waiters.len()
    }

    /// Becomes the leader if idle, otherwise queues behind the in-flight refresh.
    pub fn join(&self) -> RefreshTicket<'_> {
        let mut state = self.state.lock();
        if state.refreshing {
            let (sender, receiver) = oneshot::channel();
            state.waiters.push_back(sender);
            RefreshTicket::Waiter(PendingRefresh { receiver })
        } else {
            state.refreshing = true;
            RefreshTicket::Leader(RefreshLease {
                coordinator: self,
                settled: false,
            })
        }
    }

    /// Rejects every queued waiter without ending the refresh itself.
    ///
    /// Used when the refresh endpoint is observed failing outside the
    /// leader's own call. Returns the number of waiters rejected.
    pub fn reject_waiting(&self, error: &ClientError) -> usize {
        let waiters = std::mem::take(&mut self.state.lock().waiters);
        Self::deliver(waiters, &Err(error.clone()))
    }

    fn settle(&self, outcome: &RefreshOutcome) -> usize {
        let waiters = {
            let mut state = self.state.lock();
            state.refreshing = false;
            std::mem::take(&mut state.waiters)
        };
        Self::deliver(waiters, outcome)
    }

    fn deliver(
        waiters: VecDeque<oneshot::Sender<RefreshOutcome>>,
        outcome: &RefreshOutcome,
    ) -> usize {
        let count = waiters.len();
        for waiter in waiters {
            // A waiter whose caller was dropped no longer cares.
            let _ = waiter.send(outcome.clone());
        }
        count
    }
}

/// Proof of leadership over the in-flight refresh.
///
/// Dropping an unsettled lease (for example because the leader's future was
/// cancelled) rejects all waiters with [`ClientError::RefreshAbandoned`] and
/// returns the coordinator to idle.
#[derive(Debug)]
#[must_use = "an unsettled lease abandons the refresh when dropped"]
pub struct RefreshLease<'a> {
    coordinator: &'a RefreshCoordinator,
    settled: bool,
}

impl RefreshLease<'_> {
    /// Ends the refresh, resolving every waiter in join order.
    ///
    /// Returns the number of waiters resolved.
    pub fn settle(mut self, outcome: &RefreshOutcome) -> usize {
        self.settled = true;
        self.coordinator.settle(outcome)
    }
}

impl Drop for RefreshLease<'_> {
    fn drop(&mut self) {
        if !self.settled {
            tracing::warn!("token refresh abandoned before settling");
            self.coordinator.settle(&Err(ClientError::RefreshAbandoned));
        }
    }
}

/// A queued caller's view of the in-flight refresh.
#[derive(Debug)]
pub struct PendingRefresh {
    receiver: oneshot::Receiver<RefreshOutcome>,
}

impl PendingRefresh {
    /// Waits for the leader to settle.
    ///
    /// # Errors
    ///
    /// Returns the refresh error, or [`ClientError::RefreshAbandoned`] if the
    /// coordinator went away without settling.
    pub async fn outcome(self) -> RefreshOutcome {
        self.receiver
            .await
            .unwrap_or(Err(ClientError::RefreshAbandoned))
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn lead(coordinator: &RefreshCoordinator) -> RefreshLease<'_> {
        match coordinator.join() {
            RefreshTicket::Leader(lease) => lease,
            RefreshTicket::Waiter(_) => panic!("expected to lead"),
        }
    }

    fn wait(coordinator: &RefreshCoordinator) -> PendingRefresh {
        match coordinator.join() {
            RefreshTicket::Waiter(pending) => pending,
            RefreshTicket::Leader(_) => panic!("expected to wait"),
        }
    }

    #[tokio::test]
    async fn test_first_join_leads_and_others_wait() {
        let coordinator = RefreshCoordinator::new();
        assert!(!coordinator.is_refreshing());

        let lease = lead(&coordinator);
        assert!(coordinator.is_refreshing());
        let first = wait(&coordinator);
        let second = wait(&coordinator);
        assert_eq!(coordinator.waiting(), 2);

        assert_eq!(lease.settle(&Ok("T2".to_string())), 2);
        assert!(!coordinator.is_refreshing());
        assert_eq!(coordinator.waiting(), 0);
        assert_eq!(first.outcome().await, Ok("T2".to_string()));
        assert_eq!(second.outcome().await, Ok("T2".to_string()));
    }

    #[tokio::test]
    async fn test_failure_reaches_every_waiter() {
        let coordinator = RefreshCoordinator::new();
        let lease = lead(&coordinator);
        let pending = wait(&coordinator);
        let error = ClientError::Status {
            status: 401,
            message: "refresh token revoked".to_string(),
        };

        lease.settle(&Err(error.clone()));
        assert_eq!(pending.outcome().await, Err(error));
    }

    #[tokio::test]
    async fn test_next_join_after_settle_leads_again() {
        let coordinator = RefreshCoordinator::new();
        lead(&coordinator).settle(&Ok("T2".to_string()));
        let lease = lead(&coordinator);
        lease.settle(&Ok("T3".to_string()));
    }

    #[tokio::test]
    async fn test_dropped_lease_abandons_waiters() {
        let coordinator = RefreshCoordinator::new();
        let lease = lead(&coordinator);
        let pending = wait(&coordinator);

        drop(lease);

        assert!(!coordinator.is_refreshing());
        assert_eq!(pending.outcome().await, Err(ClientError::RefreshAbandoned));
    }

    #[tokio::test]
    async fn test_reject_waiting_keeps_leader_in_place() {
        let coordinator = RefreshCoordinator::new();
        let lease = lead(&coordinator);
        let pending = wait(&coordinator);
        let error = ClientError::Status {
            status: 401,
            message: "refresh rejected".to_string(),
        };

        assert_eq!(coordinator.reject_waiting(&error), 1);
        assert!(coordinator.is_refreshing());
        assert_eq!(pending.outcome().await, Err(error));
        assert_eq!(lease.settle(&Ok("T2".to_string())), 0);
    }

    #[tokio::test]
    async fn test_waiters_resume_in_join_order() {
        let coordinator = RefreshCoordinator::new();
        let parked = Arc::new(AtomicUsize::new(0));
        let order = Arc::new(parking_lot::Mutex::new(Vec::new()));
        let lease = lead(&coordinator);

        let mut handles = Vec::new();
        for name in ["A", "B", "C"] {
            let pending = wait(&coordinator);
            let parked = Arc::clone(&parked);
            let order = Arc::clone(&order);
            handles.push(tokio::spawn(async move {
                parked.fetch_add(1, Ordering::SeqCst);
                let outcome = pending.outcome().await;
                order.lock().push((name, outcome));
            }));
        }
        // Every waiter must be parked on its receiver so the wake order, not
        // the spawn order, decides who resumes first.
        while parked.load(Ordering::SeqCst) < 3 {
            tokio::task::yield_now().await;
        }

        lease.settle(&Ok("T2".to_string()));
        for handle in handles {
            handle.await.unwrap_or_else(|e| panic!("waiter task failed: {e}"));
        }

        let order = order.lock();
        let names: Vec<&str> = order.iter().map(|(name, _)| *name).collect();
        assert_eq!(names, vec!["A", "B", "C"]);
        assert!(order.iter().all(|(_, outcome)| outcome == &Ok("T2".to_string())));
    }
}
