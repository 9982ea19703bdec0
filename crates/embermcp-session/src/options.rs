//! Per-request options: deadlines, progress, and cancellation signals.

use std::time::Duration;

use tokio::sync::watch;

use crate::progress::{ProgressCallback, ProgressUpdate};

/// Default deadline applied to requests that do not override it.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Options governing a single outbound request.
#[derive(Clone)]
pub struct RequestOptions {
    /// Base deadline for the request; `None` disables the deadline entirely
    pub timeout: Option<Duration>,
    /// Whether each progress notification pushes the deadline out to
    /// `now + timeout` again
    pub reset_timeout_on_progress: bool,
    /// Hard ceiling measured from the moment the request is sent; the
    /// request fails at this point no matter how much progress arrived
    pub max_total_timeout: Option<Duration>,
    /// Callback for progress notifications matching this request
    pub on_progress: Option<ProgressCallback>,
    /// Cancellation signal; flipping the watched value to `true` cancels
    /// the request and notifies the peer
    pub signal: Option<watch::Receiver<bool>>,
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self {
            timeout: Some(DEFAULT_REQUEST_TIMEOUT),
            reset_timeout_on_progress: false,
            max_total_timeout: None,
            on_progress: None,
            signal: None,
        }
    }
}

impl RequestOptions {
    /// Create options with the default deadline.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the base deadline.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Disable the deadline entirely.
    pub fn without_timeout(mut self) -> Self {
        self.timeout = None;
        self
    }

    /// Push the deadline out on every progress notification.
    pub fn reset_on_progress(mut self) -> Self {
        self.reset_timeout_on_progress = true;
        self
    }

    /// Set a hard ceiling that progress resets can never extend past.
    pub fn with_max_total_timeout(mut self, ceiling: Duration) -> Self {
        self.max_total_timeout = Some(ceiling);
        self
    }

    /// Register a progress callback.
    ///
    /// Registering a callback also attaches a progress token to the
    /// outbound request so the peer can address its progress frames.
    pub fn with_progress(
        mut self,
        callback: impl Fn(ProgressUpdate) + Send + Sync + 'static,
    ) -> Self {
        self.on_progress = Some(std::sync::Arc::new(callback));
        self
    }

    /// Attach a cancellation signal.
    pub fn with_signal(mut self, signal: watch::Receiver<bool>) -> Self {
        self.signal = Some(signal);
        self
    }
}

impl std::fmt::Debug for RequestOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestOptions")
            .field("timeout", &self.timeout)
            .field("reset_timeout_on_progress", &self.reset_timeout_on_progress)
            .field("max_total_timeout", &self.max_total_timeout)
            .field("on_progress", &self.on_progress.is_some())
            .field("signal", &self.signal.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_has_sixty_second_deadline() {
        let options = RequestOptions::default();
        assert_eq!(options.timeout, Some(Duration::from_secs(60)));
        assert!(!options.reset_timeout_on_progress);
        assert!(options.max_total_timeout.is_none());
    }

    #[test]
    fn test_builder_chain() {
        let options = RequestOptions::new()
            .with_timeout(Duration::from_millis(200))
            .reset_on_progress()
            .with_max_total_timeout(Duration::from_millis(500));
        assert_eq!(options.timeout, Some(Duration::from_millis(200)));
        assert!(options.reset_timeout_on_progress);
        assert_eq!(options.max_total_timeout, Some(Duration::from_millis(500)));
    }

    #[test]
    fn test_without_timeout() {
        assert!(RequestOptions::new().without_timeout().timeout.is_none());
    }
}
