//! Per-request deadline tracking.
//!
//! Each outbound request with a timeout arms a [`Deadline`]. A watcher
//! task sleeps until the current expiry and re-checks on wake, because
//! progress notifications may have pushed the expiry out in the meantime.
//! Resets never move the expiry past the hard ceiling, so a request with
//! `max_total_timeout` fails by that point regardless of progress.

use std::sync::{Arc, Mutex as StdMutex};
use std::time::Duration;

use tokio::time::{Instant, sleep_until};
use tokio_util::sync::CancellationToken;

use crate::options::RequestOptions;

/// Deadline state for one in-flight request.
#[derive(Debug)]
pub(crate) struct Deadline {
    base: Duration,
    started_at: Instant,
    hard_limit: Option<Instant>,
    reset_on_progress: bool,
    expires_at: StdMutex<Instant>,
    done: CancellationToken,
}

/// Emitted by [`Deadline::expired`] when a deadline fires.
#[derive(Debug, Clone, Copy)]
pub(crate) struct TimeoutFired {
    /// Time since the request was sent
    pub(crate) elapsed: Duration,
    /// Whether the hard ceiling (rather than the base timeout) expired
    pub(crate) hard: bool,
}

impl Deadline {
    /// Arm a deadline for the given options, or `None` when the caller
    /// disabled timeouts.
    pub(crate) fn arm(options: &RequestOptions) -> Option<Arc<Self>> {
        let base = options.timeout?;
        let started_at = Instant::now();
        let hard_limit = options.max_total_timeout.map(|ceiling| started_at + ceiling);
        let mut expires_at = started_at + base;
        if let Some(limit) = hard_limit {
            expires_at = expires_at.min(limit);
        }
        Some(Arc::new(Self {
            base,
            started_at,
            hard_limit,
            reset_on_progress: options.reset_timeout_on_progress,
            expires_at: StdMutex::new(expires_at),
            done: CancellationToken::new(),
        }))
    }

    /// Push the expiry out to `now + base`, clamped to the hard ceiling.
    /// No-op unless the request opted into progress resets.
    pub(crate) fn reset(&self) {
        if !self.reset_on_progress {
            return;
        }
        let mut next = Instant::now() + self.base;
        if let Some(limit) = self.hard_limit {
            next = next.min(limit);
        }
        *self.expires_at.lock().expect("deadline mutex poisoned") = next;
    }

    /// Stop the watcher; the request completed through another path.
    pub(crate) fn disarm(&self) {
        self.done.cancel();
    }

    /// Wait until the deadline fires or the request completes.
    ///
    /// Returns `None` when the deadline was disarmed first.
    pub(crate) async fn expired(&self) -> Option<TimeoutFired> {
        loop {
            let at = *self.expires_at.lock().expect("deadline mutex poisoned");
            tokio::select! {
                () = self.done.cancelled() => return None,
                () = sleep_until(at) => {
                    let now = Instant::now();
                    let current = *self.expires_at.lock().expect("deadline mutex poisoned");
                    if now >= current {
                        return Some(TimeoutFired {
                            elapsed: now - self.started_at,
                            hard: self.hard_limit.is_some_and(|limit| now >= limit),
                        });
                    }
                    // Progress moved the expiry out while we slept.
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options(timeout_ms: u64) -> RequestOptions {
        RequestOptions::new().with_timeout(Duration::from_millis(timeout_ms))
    }

    #[tokio::test(start_paused = true)]
    async fn test_fires_at_base_timeout() {
        let deadline = Deadline::arm(&options(200)).unwrap();
        let fired = deadline.expired().await.unwrap();
        assert!(fired.elapsed >= Duration::from_millis(200));
        assert!(!fired.hard);
    }

    #[tokio::test(start_paused = true)]
    async fn test_disarm_suppresses_firing() {
        let deadline = Deadline::arm(&options(200)).unwrap();
        let watcher = {
            let deadline = deadline.clone();
            tokio::spawn(async move { deadline.expired().await })
        };
        deadline.disarm();
        assert!(watcher.await.unwrap().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_reset_extends_deadline() {
        let deadline = Deadline::arm(&options(200).reset_on_progress()).unwrap();
        let watcher = {
            let deadline = deadline.clone();
            tokio::spawn(async move { deadline.expired().await })
        };

        // Three resets at 150ms intervals keep the deadline alive well
        // past the base timeout.
        for _ in 0..3 {
            tokio::time::sleep(Duration::from_millis(150)).await;
            deadline.reset();
        }
        let fired = watcher.await.unwrap().unwrap();
        assert!(fired.elapsed >= Duration::from_millis(600));
        assert!(!fired.hard);
    }

    #[tokio::test(start_paused = true)]
    async fn test_reset_without_opt_in_is_ignored() {
        let deadline = Deadline::arm(&options(200)).unwrap();
        tokio::time::sleep(Duration::from_millis(100)).await;
        deadline.reset();
        let fired = deadline.expired().await.unwrap();
        assert!(fired.elapsed < Duration::from_millis(300));
    }

    #[tokio::test(start_paused = true)]
    async fn test_hard_ceiling_caps_resets() {
        let deadline = Deadline::arm(
            &options(200)
                .reset_on_progress()
                .with_max_total_timeout(Duration::from_millis(500)),
        )
        .unwrap();
        let watcher = {
            let deadline = deadline.clone();
            tokio::spawn(async move { deadline.expired().await })
        };

        // Keep resetting forever; the ceiling still wins.
        let resetter = {
            let deadline = deadline.clone();
            tokio::spawn(async move {
                loop {
                    tokio::time::sleep(Duration::from_millis(100)).await;
                    deadline.reset();
                }
            })
        };
        let fired = watcher.await.unwrap().unwrap();
        resetter.abort();

        assert!(fired.hard);
        assert!(fired.elapsed >= Duration::from_millis(500));
        assert!(fired.elapsed < Duration::from_millis(700));
    }
}
