//! Per-invocation context handed to request handlers.
//!
//! The context carries the inbound request's identity, a cooperative
//! cancellation signal, and a [`Peer`] handle for talking back to the
//! other side. The peer handle holds only a weak reference, so a handler
//! stashing its context cannot keep the session alive.

use std::sync::{Arc, Weak};

use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use embermcp_protocol::types::{ProgressToken, notifications::ProgressParams};
use embermcp_protocol::{Error, RequestId, Result, methods};

use crate::options::RequestOptions;
use crate::session::SessionInner;

/// Handle for sending requests and notifications back into the session
/// that invoked a handler.
#[derive(Clone)]
pub struct Peer {
    pub(crate) inner: Weak<SessionInner>,
}

impl Peer {
    /// Issue a request to the other side of the session.
    pub async fn request(
        &self,
        method: &str,
        params: Option<Value>,
        options: RequestOptions,
    ) -> Result<Value> {
        self.upgrade()?.request(method, params, options).await
    }

    /// Send a fire-and-forget notification to the other side.
    pub async fn notify(&self, method: &str, params: Option<Value>) -> Result<()> {
        self.upgrade()?.notify(method, params).await
    }

    fn upgrade(&self) -> Result<Arc<SessionInner>> {
        self.inner
            .upgrade()
            .ok_or_else(|| Error::ConnectionClosed("session dropped".to_string()))
    }
}

impl std::fmt::Debug for Peer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Peer")
            .field("alive", &(self.inner.strong_count() > 0))
            .finish()
    }
}

/// Context for one inbound request invocation.
#[derive(Debug, Clone)]
pub struct RequestContext {
    request_id: RequestId,
    method: String,
    cancellation: CancellationToken,
    progress_token: Option<ProgressToken>,
    peer: Peer,
}

impl RequestContext {
    pub(crate) fn new(
        request_id: RequestId,
        method: String,
        cancellation: CancellationToken,
        progress_token: Option<ProgressToken>,
        peer: Peer,
    ) -> Self {
        Self {
            request_id,
            method,
            cancellation,
            progress_token,
            peer,
        }
    }

    /// Identifier of the request being handled.
    pub fn request_id(&self) -> &RequestId {
        &self.request_id
    }

    /// Method name of the request being handled.
    pub fn method(&self) -> &str {
        &self.method
    }

    /// Whether the peer has cancelled this request.
    ///
    /// Once this returns `true` the eventual return value is discarded,
    /// so long-running handlers should bail out promptly.
    pub fn is_cancelled(&self) -> bool {
        self.cancellation.is_cancelled()
    }

    /// Wait until the peer cancels this request.
    ///
    /// Intended for `tokio::select!` against the handler's real work.
    pub async fn cancelled(&self) {
        self.cancellation.cancelled().await;
    }

    /// Handle for calling back into the session.
    pub fn peer(&self) -> &Peer {
        &self.peer
    }

    /// Report progress for this request.
    ///
    /// No-op when the requester did not attach a progress token.
    pub async fn progress(
        &self,
        progress: f64,
        total: Option<f64>,
        message: Option<String>,
    ) -> Result<()> {
        let Some(token) = &self.progress_token else {
            debug!(method = %self.method, "request carried no progress token; progress dropped");
            return Ok(());
        };
        let params = ProgressParams {
            progress_token: token.clone(),
            progress,
            total,
            message,
        };
        self.peer
            .notify(methods::PROGRESS, Some(serde_json::to_value(params)?))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dead_peer_reports_connection_closed() {
        let peer = Peer { inner: Weak::new() };
        let err = tokio_test::block_on(peer.notify("ping", None)).unwrap_err();
        assert!(matches!(err, Error::ConnectionClosed(_)));
    }

    #[test]
    fn test_cancellation_flag() {
        let token = CancellationToken::new();
        let ctx = RequestContext::new(
            RequestId::Number(1),
            "tools/call".to_string(),
            token.clone(),
            None,
            Peer { inner: Weak::new() },
        );
        assert!(!ctx.is_cancelled());
        token.cancel();
        assert!(ctx.is_cancelled());
    }
}
