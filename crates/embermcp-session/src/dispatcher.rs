//! The session's message loop.
//!
//! One reader task per session owns the receive side of the transport and
//! classifies every inbound frame:
//!
//! - **Responses** complete pending entries; unknown ids are dropped at
//!   debug level, since late responses after a timeout or cancel are
//!   expected.
//! - **Progress notifications** route to the matching sink and reset the
//!   request's deadline, inline on the reader so a progress frame that
//!   arrives before the response is always observed before completion.
//! - **Cancellation notifications** trip the cancellation token of the
//!   referenced in-flight inbound request.
//! - **Requests and other notifications** run in spawned tasks, off the
//!   reader. A handler that calls back into the session therefore cannot
//!   deadlock the loop.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, warn};

use embermcp_protocol::jsonrpc::{self, JsonRpcResponsePayload};
use embermcp_protocol::types::notifications::{CancelledParams, ProgressParams};
use embermcp_protocol::{
    Error, JsonRpcError, JsonRpcMessage, JsonRpcNotification, JsonRpcRequest, JsonRpcResponse,
    error_codes, methods,
};

use crate::context::{Peer, RequestContext};
use crate::progress::{self, ProgressUpdate};
use crate::session::SessionInner;

/// Spawn the reader task for a session.
///
/// The task runs until the transport ends, a receive fails, or the
/// session's shutdown token fires, then tears the session down.
pub(crate) fn spawn_reader(inner: Arc<SessionInner>) -> JoinHandle<()> {
    tokio::spawn(async move {
        debug!("session reader task started");
        let cause = loop {
            tokio::select! {
                () = inner.shutdown.cancelled() => {
                    break "session closed by local endpoint".to_string();
                }
                frame = inner.transport.recv() => match frame {
                    Ok(Some(bytes)) => route_frame(&inner, &bytes).await,
                    Ok(None) => break "transport reached end of stream".to_string(),
                    Err(e) => {
                        error!(error = %e, "transport receive failed");
                        break format!("transport receive failed: {e}");
                    }
                }
            }
        };
        inner.tear_down(&cause).await;
        debug!("session reader task terminated");
    })
}

async fn route_frame(inner: &Arc<SessionInner>, bytes: &[u8]) {
    match jsonrpc::parse_message(bytes) {
        Ok(JsonRpcMessage::Response(response)) => route_response(inner, response),
        Ok(JsonRpcMessage::Request(request)) => route_request(inner, request),
        Ok(JsonRpcMessage::Notification(notification)) => {
            route_notification(inner, notification);
        }
        Err(e) => match jsonrpc::recover_id(bytes) {
            Some(id) => {
                debug!(error = %e, %id, "malformed frame with id; answering parse error");
                let error =
                    JsonRpcError::new(error_codes::PARSE_ERROR, format!("Parse error: {e}"));
                inner.send_response(JsonRpcResponse::err(id, error)).await;
            }
            None => warn!(error = %e, "dropping malformed frame without id"),
        },
    }
}

fn route_response(inner: &Arc<SessionInner>, response: JsonRpcResponse) {
    let Some(id) = response.request_id().cloned() else {
        warn!("dropping response with null id");
        return;
    };
    let outcome = match response.payload {
        JsonRpcResponsePayload::Success { result } => Ok(result),
        JsonRpcResponsePayload::Error { error } => Err(Error::from_wire(&error)),
    };
    if !inner.pending.complete(&id, outcome) {
        debug!(%id, "dropping response for unknown request id");
    }
}

fn route_request(inner: &Arc<SessionInner>, request: JsonRpcRequest) {
    let registry = inner.registry.load();
    let inner = Arc::clone(inner);
    tokio::spawn(async move {
        let JsonRpcRequest {
            method, params, id, ..
        } = request;

        let cancellation = CancellationToken::new();
        let tracked = inner.track_inbound(&id, cancellation.clone());
        let progress_token = progress::extract_progress_token(params.as_ref());
        let ctx = RequestContext::new(
            id.clone(),
            method.clone(),
            cancellation.clone(),
            progress_token,
            Peer {
                inner: Arc::downgrade(&inner),
            },
        );

        let invocation = if let Some(handler) = registry.requests.get(&method) {
            Some(handler(params, ctx))
        } else {
            registry
                .fallback_request
                .as_ref()
                .map(|fallback| fallback(method.clone(), params, ctx))
        };

        let outcome = match invocation {
            Some(future) => match AssertUnwindSafe(future).catch_unwind().await {
                Ok(result) => result,
                Err(panic) => {
                    let message = panic_message(panic.as_ref());
                    error!(%method, panic = %message, "request handler panicked");
                    Err(Error::Internal(format!("handler panicked: {message}")))
                }
            },
            None => {
                debug!(%method, "no handler registered; answering method not found");
                Err(Error::MethodNotFound(method.clone()))
            }
        };

        if tracked {
            inner.untrack_inbound(&id);
        }
        // The peer stopped waiting; neither a result nor an error goes back.
        if cancellation.is_cancelled() {
            debug!(%method, %id, "discarding outcome of cancelled request");
            return;
        }

        let response = match outcome {
            Ok(value) => JsonRpcResponse::ok(id, value),
            Err(err) => JsonRpcResponse::err(id, err.to_wire()),
        };
        inner.send_response(response).await;
    });
}

fn route_notification(inner: &Arc<SessionInner>, notification: JsonRpcNotification) {
    if notification.method == methods::PROGRESS {
        handle_progress(inner, notification);
    } else if notification.method == methods::CANCELLED {
        handle_cancelled(inner, notification);
    } else {
        dispatch_notification(inner, notification);
    }
}

/// Progress is delivered inline on the reader task: routing it through the
/// same queue as the response guarantees the sink observes every progress
/// frame before the caller observes completion.
fn handle_progress(inner: &Arc<SessionInner>, notification: JsonRpcNotification) {
    let Some(params) = notification.params else {
        debug!("dropping progress notification without params");
        return;
    };
    let progress: ProgressParams = match serde_json::from_value(params) {
        Ok(progress) => progress,
        Err(e) => {
            warn!(error = %e, "dropping malformed progress notification");
            return;
        }
    };
    let Some(delivery) = inner
        .pending
        .observe_progress(&progress.progress_token, progress.progress)
    else {
        debug!(token = %progress.progress_token, "dropping progress for unknown token");
        return;
    };
    if delivery.regressed {
        debug!(
            token = %progress.progress_token,
            value = progress.progress,
            "forwarding non-increasing progress value"
        );
    }
    if let Some(deadline) = delivery.deadline {
        deadline.reset();
    }
    if let Some(callback) = delivery.callback {
        callback(ProgressUpdate {
            progress: progress.progress,
            total: progress.total,
            message: progress.message,
        });
    }
}

fn handle_cancelled(inner: &Arc<SessionInner>, notification: JsonRpcNotification) {
    let Some(params) = notification.params else {
        debug!("dropping cancellation notification without params");
        return;
    };
    let cancelled: CancelledParams = match serde_json::from_value(params) {
        Ok(cancelled) => cancelled,
        Err(e) => {
            warn!(error = %e, "dropping malformed cancellation notification");
            return;
        }
    };
    inner.cancel_inbound(&cancelled.request_id, cancelled.reason.as_deref());
}

fn dispatch_notification(inner: &Arc<SessionInner>, notification: JsonRpcNotification) {
    let registry = inner.registry.load();
    let method = notification.method;
    if let Some(handler) = registry.notifications.get(&method) {
        let future = handler(notification.params);
        tokio::spawn(async move {
            if let Err(e) = future.await {
                error!(%method, error = %e, "notification handler failed");
            }
        });
    } else if let Some(fallback) = &registry.fallback_notification {
        let future = fallback(method.clone(), notification.params);
        tokio::spawn(async move {
            if let Err(e) = future.await {
                error!(%method, error = %e, "fallback notification handler failed");
            }
        });
    } else {
        debug!(%method, "dropping notification without handler");
    }
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
