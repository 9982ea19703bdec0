//! Pending request table.
//!
//! Correlates outbound request identifiers with the tasks awaiting their
//! responses. Entries are inserted before the request frame hits the wire
//! (so a fast response cannot race the bookkeeping) and removed by exactly
//! one of: a matching response, a fired deadline, a caller-side cancel, or
//! session teardown. A removed identifier is never resurrected, which is
//! what makes late responses after a timeout or cancel silently droppable.

use std::collections::HashMap;
use std::sync::{Arc, Mutex as StdMutex};

use serde_json::Value;
use tokio::sync::oneshot;

use embermcp_protocol::types::ProgressToken;
use embermcp_protocol::{Error, RequestId, Result};

use crate::progress::ProgressCallback;
use crate::timeout::Deadline;

/// Bookkeeping for one outbound request awaiting its response.
pub(crate) struct PendingEntry {
    /// Method name, kept for log lines
    pub(crate) method: String,
    /// Completion slot the caller awaits
    pub(crate) tx: oneshot::Sender<Result<Value>>,
    /// Progress callback, when the caller registered one
    pub(crate) progress: Option<ProgressCallback>,
    /// Token attached to the outbound request, when any
    pub(crate) progress_token: Option<ProgressToken>,
    /// Deadline armed for this request, when any
    pub(crate) deadline: Option<Arc<Deadline>>,
    /// Last progress value seen, for regression detection
    pub(crate) last_progress: Option<f64>,
}

impl PendingEntry {
    /// Stop the deadline watcher without resolving the entry.
    pub(crate) fn disarm(&self) {
        if let Some(deadline) = &self.deadline {
            deadline.disarm();
        }
    }

    /// Resolve the caller with the final outcome, consuming the entry.
    pub(crate) fn resolve(self, outcome: Result<Value>) {
        self.disarm();
        // The receiver may be gone if the caller's task was dropped.
        let _ = self.tx.send(outcome);
    }
}

/// What the dispatcher needs to deliver one progress notification.
pub(crate) struct ProgressDelivery {
    pub(crate) callback: Option<ProgressCallback>,
    pub(crate) deadline: Option<Arc<Deadline>>,
    /// The value did not increase over the previous one
    pub(crate) regressed: bool,
}

#[derive(Default)]
struct Tables {
    entries: HashMap<RequestId, PendingEntry>,
    tokens: HashMap<ProgressToken, RequestId>,
}

/// The session's pending request table.
#[derive(Default)]
pub(crate) struct PendingRequests {
    tables: StdMutex<Tables>,
}

impl PendingRequests {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Register an entry. Must happen before the frame is written.
    pub(crate) fn insert(&self, id: RequestId, entry: PendingEntry) {
        let mut tables = self.tables.lock().expect("pending table mutex poisoned");
        if let Some(token) = &entry.progress_token {
            tables.tokens.insert(token.clone(), id.clone());
        }
        tables.entries.insert(id, entry);
    }

    /// Resolve the entry for `id` with a response outcome.
    ///
    /// Returns `false` when no entry exists - the response is late and the
    /// caller has already observed a timeout, a cancel, or teardown.
    pub(crate) fn complete(&self, id: &RequestId, outcome: Result<Value>) -> bool {
        match self.take(id) {
            Some(entry) => {
                entry.resolve(outcome);
                true
            }
            None => false,
        }
    }

    /// Remove and return the entry for `id`, unregistering its token.
    pub(crate) fn take(&self, id: &RequestId) -> Option<PendingEntry> {
        let mut tables = self.tables.lock().expect("pending table mutex poisoned");
        let entry = tables.entries.remove(id)?;
        if let Some(token) = &entry.progress_token {
            tables.tokens.remove(token);
        }
        Some(entry)
    }

    /// Resolve every entry with the given error. Called on teardown.
    pub(crate) fn fail_all(&self, error: &Error) {
        let drained: Vec<PendingEntry> = {
            let mut tables = self.tables.lock().expect("pending table mutex poisoned");
            tables.tokens.clear();
            tables.entries.drain().map(|(_, entry)| entry).collect()
        };
        for entry in drained {
            entry.resolve(Err(error.clone()));
        }
    }

    /// Record a progress value for `token` and return what to deliver.
    ///
    /// Returns `None` for unknown tokens (the request already completed,
    /// or the peer invented a token).
    pub(crate) fn observe_progress(
        &self,
        token: &ProgressToken,
        value: f64,
    ) -> Option<ProgressDelivery> {
        let mut tables = self.tables.lock().expect("pending table mutex poisoned");
        let id = tables.tokens.get(token)?.clone();
        let entry = tables.entries.get_mut(&id)?;
        let regressed = entry.last_progress.is_some_and(|previous| value <= previous);
        entry.last_progress = Some(value);
        Some(ProgressDelivery {
            callback: entry.progress.clone(),
            deadline: entry.deadline.clone(),
            regressed,
        })
    }

    /// Number of requests currently awaiting responses.
    pub(crate) fn len(&self) -> usize {
        self.tables
            .lock()
            .expect("pending table mutex poisoned")
            .entries
            .len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn entry(tx: oneshot::Sender<Result<Value>>) -> PendingEntry {
        PendingEntry {
            method: "tools/call".to_string(),
            tx,
            progress: None,
            progress_token: None,
            deadline: None,
            last_progress: None,
        }
    }

    #[tokio::test]
    async fn test_complete_resolves_the_waiter() {
        let pending = PendingRequests::new();
        let (tx, rx) = oneshot::channel();
        pending.insert(RequestId::Number(1), entry(tx));
        assert_eq!(pending.len(), 1);

        assert!(pending.complete(&RequestId::Number(1), Ok(json!({"ok": true}))));
        assert_eq!(pending.len(), 0);
        assert_eq!(rx.await.unwrap().unwrap()["ok"], true);
    }

    #[tokio::test]
    async fn test_late_completion_reports_unknown() {
        let pending = PendingRequests::new();
        assert!(!pending.complete(&RequestId::Number(42), Ok(Value::Null)));
    }

    #[tokio::test]
    async fn test_exactly_one_outcome() {
        let pending = PendingRequests::new();
        let (tx, rx) = oneshot::channel();
        pending.insert(RequestId::Number(1), entry(tx));

        assert!(pending.complete(&RequestId::Number(1), Ok(json!(1))));
        // The id is gone; the second response is a no-op.
        assert!(!pending.complete(&RequestId::Number(1), Ok(json!(2))));
        assert_eq!(rx.await.unwrap().unwrap(), json!(1));
    }

    #[tokio::test]
    async fn test_fail_all_drains_every_waiter() {
        let pending = PendingRequests::new();
        let (tx1, rx1) = oneshot::channel();
        let (tx2, rx2) = oneshot::channel();
        pending.insert(RequestId::Number(1), entry(tx1));
        pending.insert(RequestId::Number(2), entry(tx2));

        pending.fail_all(&Error::ConnectionClosed("gone".to_string()));
        assert_eq!(pending.len(), 0);
        assert!(matches!(
            rx1.await.unwrap(),
            Err(Error::ConnectionClosed(_))
        ));
        assert!(matches!(
            rx2.await.unwrap(),
            Err(Error::ConnectionClosed(_))
        ));
    }

    #[tokio::test]
    async fn test_progress_routing_and_regression() {
        let pending = PendingRequests::new();
        let (tx, _rx) = oneshot::channel();
        let mut e = entry(tx);
        e.progress_token = Some(ProgressToken::Number(7));
        pending.insert(RequestId::Number(1), e);

        let first = pending
            .observe_progress(&ProgressToken::Number(7), 1.0)
            .unwrap();
        assert!(!first.regressed);

        let second = pending
            .observe_progress(&ProgressToken::Number(7), 0.5)
            .unwrap();
        assert!(second.regressed);

        assert!(
            pending
                .observe_progress(&ProgressToken::Number(99), 1.0)
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_take_unregisters_token() {
        let pending = PendingRequests::new();
        let (tx, _rx) = oneshot::channel();
        let mut e = entry(tx);
        e.progress_token = Some(ProgressToken::Number(3));
        pending.insert(RequestId::Number(1), e);

        pending.take(&RequestId::Number(1)).unwrap();
        assert!(
            pending
                .observe_progress(&ProgressToken::Number(3), 1.0)
                .is_none()
        );
    }
}
