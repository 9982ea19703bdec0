//! Session lifecycle and public API.
//!
//! A [`Session`] is one live MCP connection over one transport. The core is
//! symmetric: both peers correlate requests, route notifications, and host
//! handlers the same way. The configured role only decides who initiates
//! the `initialize` handshake ([`SessionBuilder::client`]) and who answers
//! it ([`SessionBuilder::server`]).
//!
//! Lifecycle: `Created -> Connecting -> Initialized -> Closing -> Closed`.
//! [`SessionBuilder::connect`] drives a session to `Initialized` or fails;
//! [`Session::close`] (or dropping the last handle) drives it to `Closed`,
//! failing every in-flight request with a connection-closed error.

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::sync::{Arc, Mutex as StdMutex, Weak};

use serde_json::Value;
use tokio::sync::{oneshot, watch};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use embermcp_protocol::jsonrpc::{self, JsonRpcMessage, JsonRpcNotification, JsonRpcRequest, JsonRpcResponse};
use embermcp_protocol::types::notifications::CancelledParams;
use embermcp_protocol::types::{
    CallToolParams, CallToolResult, ClientCapabilities, CreateMessageParams, CreateMessageResult,
    Cursor, ElicitParams, ElicitResult, GetPromptParams, GetPromptResult, Implementation,
    InitializeParams, InitializeResult, ListPromptsParams, ListPromptsResult, ListResourcesParams,
    ListResourcesResult, ListRootsResult, ListToolsParams, ListToolsResult, LoggingLevel,
    ProgressToken, ReadResourceParams, ReadResourceResult, ServerCapabilities, SetLevelParams,
};
use embermcp_protocol::{
    Error, PROTOCOL_VERSION, RequestId, Result, SUPPORTED_VERSIONS, methods,
};
use embermcp_transport::Transport;

use crate::capabilities;
use crate::context::{Peer, RequestContext};
use crate::dispatcher;
use crate::options::RequestOptions;
use crate::pending::{PendingEntry, PendingRequests};
use crate::progress;
use crate::registry::{HandlerRegistry, SharedRegistry};
use crate::timeout::Deadline;

/// Lifecycle state of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Built but not yet connected
    Created,
    /// Handshake in progress
    Connecting,
    /// Handshake complete; requests flow in both directions
    Initialized,
    /// Teardown in progress
    Closing,
    /// Fully torn down
    Closed,
}

/// Handshake role: which side initiates `initialize`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Role {
    Client,
    Server,
}

/// Role-specific configuration fixed at connect time.
#[derive(Debug)]
pub(crate) enum RoleConfig {
    Client {
        capabilities: ClientCapabilities,
    },
    Server {
        capabilities: ServerCapabilities,
        instructions: Option<String>,
    },
}

/// What we learned about the peer during the handshake.
#[derive(Debug, Clone)]
pub(crate) struct PeerIdentity {
    pub(crate) info: Implementation,
    pub(crate) protocol_version: String,
    pub(crate) client_capabilities: Option<ClientCapabilities>,
    pub(crate) server_capabilities: Option<ServerCapabilities>,
    pub(crate) instructions: Option<String>,
}

/// Shared state behind every [`Session`] handle.
pub(crate) struct SessionInner {
    pub(crate) role: RoleConfig,
    pub(crate) info: Implementation,
    pub(crate) transport: Arc<dyn Transport>,
    pub(crate) pending: PendingRequests,
    pub(crate) registry: SharedRegistry,
    /// Cancellation tokens for inbound requests currently being handled
    inbound: StdMutex<HashMap<RequestId, CancellationToken>>,
    /// Monotonic outbound request id counter; ids are never reused
    next_request_id: AtomicI64,
    /// Monotonic progress token counter; tokens are never reused
    next_progress_token: AtomicI64,
    pub(crate) state: watch::Sender<SessionState>,
    pub(crate) shutdown: CancellationToken,
    closed: AtomicBool,
    pub(crate) peer: StdMutex<Option<PeerIdentity>>,
    /// Weak self-reference for watcher tasks and peer handles
    self_ref: Weak<SessionInner>,
}

impl SessionInner {
    pub(crate) fn set_state(&self, state: SessionState) {
        self.state.send_replace(state);
    }

    fn current_state(&self) -> SessionState {
        *self.state.borrow()
    }

    /// Issue a request and await exactly one outcome: the response, a
    /// timeout, a cancellation, or connection loss.
    pub(crate) async fn request(
        &self,
        method: &str,
        mut params: Option<Value>,
        options: RequestOptions,
    ) -> Result<Value> {
        if matches!(
            self.current_state(),
            SessionState::Closing | SessionState::Closed
        ) {
            return Err(Error::ConnectionClosed("session is closed".to_string()));
        }

        let id = RequestId::Number(self.next_request_id.fetch_add(1, Ordering::Relaxed));

        // A token is attached whenever progress matters to the caller:
        // for delivery to a callback, or to reset the deadline.
        let progress_token = if options.on_progress.is_some() || options.reset_timeout_on_progress {
            let token =
                ProgressToken::Number(self.next_progress_token.fetch_add(1, Ordering::Relaxed));
            progress::attach_progress_token(&mut params, &token)?;
            Some(token)
        } else {
            None
        };

        let deadline = Deadline::arm(&options);
        let (tx, rx) = oneshot::channel();
        // Insert before the frame hits the wire so a fast response cannot
        // arrive ahead of the bookkeeping.
        self.pending.insert(
            id.clone(),
            PendingEntry {
                method: method.to_string(),
                tx,
                progress: options.on_progress.clone(),
                progress_token,
                deadline: deadline.clone(),
                last_progress: None,
            },
        );

        if let Some(deadline) = deadline {
            let weak = self.self_ref.clone();
            let request_id = id.clone();
            tokio::spawn(async move {
                if let Some(fired) = deadline.expired().await
                    && let Some(inner) = weak.upgrade()
                {
                    let reason = format!("Timed out after {:?}", fired.elapsed);
                    inner
                        .fail_request(
                            &request_id,
                            Error::RequestTimeout {
                                elapsed: fired.elapsed,
                                hard: fired.hard,
                            },
                            Some(reason),
                        )
                        .await;
                }
            });
        }

        if let Some(mut signal) = options.signal {
            let weak = self.self_ref.clone();
            let request_id = id.clone();
            tokio::spawn(async move {
                let cancelled = loop {
                    if *signal.borrow() {
                        break true;
                    }
                    if signal.changed().await.is_err() {
                        break false;
                    }
                };
                if cancelled && let Some(inner) = weak.upgrade() {
                    inner
                        .fail_request(
                            &request_id,
                            Error::Cancelled("cancelled by caller".to_string()),
                            Some("cancelled by caller".to_string()),
                        )
                        .await;
                }
            });
        }

        let request = JsonRpcRequest::new(method, params, id.clone());
        let bytes = jsonrpc::encode_message(&JsonRpcMessage::Request(request))?;
        if let Err(e) = self.transport.send(bytes.into()).await {
            if let Some(entry) = self.pending.take(&id) {
                entry.disarm();
            }
            return Err(e.into());
        }

        match rx.await {
            Ok(outcome) => outcome,
            Err(_) => Err(Error::ConnectionClosed("session closed".to_string())),
        }
    }

    /// Send a fire-and-forget notification.
    pub(crate) async fn notify(&self, method: &str, params: Option<Value>) -> Result<()> {
        let notification = JsonRpcNotification::new(method, params);
        let bytes = jsonrpc::encode_message(&JsonRpcMessage::Notification(notification))?;
        self.transport.send(bytes.into()).await.map_err(Error::from)
    }

    /// Send a response frame; write failures are logged, never fatal.
    pub(crate) async fn send_response(&self, response: JsonRpcResponse) {
        match jsonrpc::encode_message(&JsonRpcMessage::Response(response)) {
            Ok(bytes) => {
                if let Err(e) = self.transport.send(bytes.into()).await {
                    warn!(error = %e, "failed to send response");
                }
            }
            Err(e) => warn!(error = %e, "failed to encode response"),
        }
    }

    /// Fail one pending request, optionally telling the peer to stop.
    ///
    /// The cancellation notification is written before the caller is
    /// released, so a caller observing the failure knows the peer has
    /// already been told.
    pub(crate) async fn fail_request(
        &self,
        id: &RequestId,
        error: Error,
        cancel_reason: Option<String>,
    ) {
        let Some(entry) = self.pending.take(id) else {
            return;
        };
        entry.disarm();
        debug!(%id, method = %entry.method, error = %error, "failing pending request");
        if let Some(reason) = cancel_reason {
            let params = CancelledParams {
                request_id: id.clone(),
                reason: Some(reason),
            };
            match serde_json::to_value(params) {
                Ok(value) => {
                    if let Err(e) = self.notify(methods::CANCELLED, Some(value)).await {
                        debug!(error = %e, "failed to send cancellation notification");
                    }
                }
                Err(e) => debug!(error = %e, "failed to encode cancellation notification"),
            }
        }
        entry.resolve(Err(error));
    }

    /// Track an inbound request for cooperative cancellation.
    ///
    /// Returns `false` on a duplicate id (the peer's bug); the request is
    /// still answered but cannot be addressed by a cancellation.
    pub(crate) fn track_inbound(&self, id: &RequestId, token: CancellationToken) -> bool {
        let mut inbound = self.inbound.lock().expect("inbound mutex poisoned");
        match inbound.entry(id.clone()) {
            Entry::Occupied(_) => {
                warn!(%id, "duplicate in-flight request id from peer");
                false
            }
            Entry::Vacant(slot) => {
                slot.insert(token);
                true
            }
        }
    }

    pub(crate) fn untrack_inbound(&self, id: &RequestId) {
        self.inbound
            .lock()
            .expect("inbound mutex poisoned")
            .remove(id);
    }

    /// Trip the cancellation token of an in-flight inbound request.
    pub(crate) fn cancel_inbound(&self, id: &RequestId, reason: Option<&str>) -> bool {
        let token = self
            .inbound
            .lock()
            .expect("inbound mutex poisoned")
            .get(id)
            .cloned();
        match token {
            Some(token) => {
                debug!(%id, reason = reason.unwrap_or("unspecified"), "peer cancelled in-flight request");
                token.cancel();
                true
            }
            None => {
                debug!(%id, "cancellation for unknown or completed request");
                false
            }
        }
    }

    /// Tear the session down exactly once: stop the reader, fail every
    /// pending request, close the transport.
    pub(crate) async fn tear_down(&self, cause: &str) {
        if self.closed.swap(true, Ordering::SeqCst) {
            return;
        }
        debug!(cause, "tearing down session");
        self.set_state(SessionState::Closing);
        self.shutdown.cancel();
        self.pending
            .fail_all(&Error::ConnectionClosed(cause.to_string()));
        if let Err(e) = self.transport.close().await {
            debug!(error = %e, "transport close failed");
        }
        self.set_state(SessionState::Closed);
    }
}

impl std::fmt::Debug for SessionInner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionInner")
            .field("role", &self.role)
            .field("state", &self.current_state())
            .field("pending", &self.pending.len())
            .finish()
    }
}

/// Cancels the session's shutdown token when the last handle is dropped,
/// so the reader task and its resources never outlive the user's interest.
#[derive(Debug)]
struct CloseGuard {
    shutdown: CancellationToken,
}

impl Drop for CloseGuard {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

/// Builder for a session: role, identity, capabilities, and handlers.
///
/// Handlers registered here are visible from the first frame the session
/// reads. [`Session::on_request`] and [`Session::on_notification`] allow
/// later additions.
pub struct SessionBuilder {
    role: Role,
    info: Implementation,
    client_capabilities: Option<ClientCapabilities>,
    server_capabilities: Option<ServerCapabilities>,
    instructions: Option<String>,
    registry: HandlerRegistry,
}

impl SessionBuilder {
    /// Build a client-role session: it will initiate the handshake.
    pub fn client(info: Implementation) -> Self {
        Self::new(Role::Client, info)
    }

    /// Build a server-role session: it will answer the handshake.
    pub fn server(info: Implementation) -> Self {
        Self::new(Role::Server, info)
    }

    fn new(role: Role, info: Implementation) -> Self {
        Self {
            role,
            info,
            client_capabilities: None,
            server_capabilities: None,
            instructions: None,
            registry: HandlerRegistry::default(),
        }
    }

    /// Explicit client capability overrides, merged field-by-field over
    /// the capabilities inferred from registered handlers.
    pub fn client_capabilities(mut self, capabilities: ClientCapabilities) -> Self {
        self.client_capabilities = Some(capabilities);
        self
    }

    /// Explicit server capability overrides, merged field-by-field over
    /// the capabilities inferred from registered handlers.
    pub fn server_capabilities(mut self, capabilities: ServerCapabilities) -> Self {
        self.server_capabilities = Some(capabilities);
        self
    }

    /// Usage instructions a server sends in its `initialize` result.
    pub fn instructions(mut self, instructions: impl Into<String>) -> Self {
        self.instructions = Some(instructions.into());
        self
    }

    /// Register a request handler for `method`.
    pub fn on_request<F, Fut>(mut self, method: impl Into<String>, handler: F) -> Self
    where
        F: Fn(Option<Value>, RequestContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Value>> + Send + 'static,
    {
        self.registry.on_request(method, handler);
        self
    }

    /// Register a notification handler for `method`.
    pub fn on_notification<F, Fut>(mut self, method: impl Into<String>, handler: F) -> Self
    where
        F: Fn(Option<Value>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<()>> + Send + 'static,
    {
        self.registry.on_notification(method, handler);
        self
    }

    /// Catch-all for requests without a specific handler.
    pub fn fallback_request_handler<F, Fut>(mut self, handler: F) -> Self
    where
        F: Fn(String, Option<Value>, RequestContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Value>> + Send + 'static,
    {
        self.registry.set_fallback_request(handler);
        self
    }

    /// Catch-all for notifications without a specific handler.
    pub fn fallback_notification_handler<F, Fut>(mut self, handler: F) -> Self
    where
        F: Fn(String, Option<Value>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<()>> + Send + 'static,
    {
        self.registry.set_fallback_notification(handler);
        self
    }

    /// Connect over `transport` and drive the handshake to completion.
    ///
    /// A client session sends `initialize`, validates the answered
    /// protocol version against the supported set, and confirms with
    /// `notifications/initialized`. A server session answers the inbound
    /// `initialize` and waits for the client's confirmation. Either way
    /// the returned session is `Initialized`.
    pub async fn connect<T: Transport + 'static>(self, transport: T) -> Result<Session> {
        let role = self.role;
        let role_config = match role {
            Role::Client => {
                let inferred = capabilities::infer_client(&self.registry);
                let merged = capabilities::merge_client(inferred, self.client_capabilities);
                capabilities::audit_client(&merged, &self.registry);
                RoleConfig::Client {
                    capabilities: merged,
                }
            }
            Role::Server => {
                let inferred = capabilities::infer_server(&self.registry);
                let merged = capabilities::merge_server(inferred, self.server_capabilities);
                capabilities::audit_server(&merged, &self.registry);
                RoleConfig::Server {
                    capabilities: merged,
                    instructions: self.instructions,
                }
            }
        };

        let (state_tx, _) = watch::channel(SessionState::Created);
        let inner = Arc::new_cyclic(|self_ref| SessionInner {
            role: role_config,
            info: self.info,
            transport: Arc::new(transport),
            pending: PendingRequests::new(),
            registry: SharedRegistry::new(self.registry),
            inbound: StdMutex::new(HashMap::new()),
            next_request_id: AtomicI64::new(0),
            next_progress_token: AtomicI64::new(0),
            state: state_tx,
            shutdown: CancellationToken::new(),
            closed: AtomicBool::new(false),
            peer: StdMutex::new(None),
            self_ref: self_ref.clone(),
        });

        if role == Role::Server {
            install_handshake_handlers(&inner);
        }
        // Both roles answer ping; a user-registered handler takes precedence.
        if !inner.registry.load().has_request(methods::PING) {
            inner.registry.update(|registry| {
                registry.on_request(methods::PING, |_params, _ctx| async {
                    Ok(serde_json::json!({}))
                });
            });
        }

        inner.set_state(SessionState::Connecting);
        dispatcher::spawn_reader(Arc::clone(&inner));

        let session = Session {
            inner: Arc::clone(&inner),
            guard: Arc::new(CloseGuard {
                shutdown: inner.shutdown.clone(),
            }),
        };

        match role {
            Role::Client => {
                let RoleConfig::Client { capabilities } = &inner.role else {
                    unreachable!("client role carries client capabilities");
                };
                let params = InitializeParams {
                    protocol_version: PROTOCOL_VERSION.to_string(),
                    capabilities: capabilities.clone(),
                    client_info: inner.info.clone(),
                    _meta: None,
                };
                let value = match inner
                    .request(
                        methods::INITIALIZE,
                        Some(serde_json::to_value(params)?),
                        RequestOptions::default(),
                    )
                    .await
                {
                    Ok(value) => value,
                    Err(e) => {
                        inner.tear_down("initialize failed").await;
                        return Err(e);
                    }
                };
                let result: InitializeResult = match serde_json::from_value(value) {
                    Ok(result) => result,
                    Err(e) => {
                        inner.tear_down("invalid initialize result").await;
                        return Err(Error::Protocol(format!("invalid initialize result: {e}")));
                    }
                };
                if !SUPPORTED_VERSIONS.contains(&result.protocol_version.as_str()) {
                    inner.tear_down("protocol version mismatch").await;
                    return Err(Error::VersionMismatch {
                        requested: PROTOCOL_VERSION.to_string(),
                        received: result.protocol_version,
                    });
                }
                info!(
                    server = %result.server_info.name,
                    version = %result.protocol_version,
                    "client session initialized"
                );
                *inner.peer.lock().expect("peer mutex poisoned") = Some(PeerIdentity {
                    info: result.server_info,
                    protocol_version: result.protocol_version,
                    client_capabilities: None,
                    server_capabilities: Some(result.capabilities),
                    instructions: result.instructions,
                });
                if let Err(e) = inner.notify(methods::INITIALIZED, None).await {
                    inner.tear_down("failed to confirm initialization").await;
                    return Err(e);
                }
                inner.set_state(SessionState::Initialized);
            }
            Role::Server => {
                let mut state_rx = inner.state.subscribe();
                loop {
                    let current = *state_rx.borrow_and_update();
                    match current {
                        SessionState::Initialized => break,
                        SessionState::Closing | SessionState::Closed => {
                            return Err(Error::ConnectionClosed(
                                "session closed before initialization completed".to_string(),
                            ));
                        }
                        SessionState::Created | SessionState::Connecting => {}
                    }
                    if state_rx.changed().await.is_err() {
                        return Err(Error::ConnectionClosed("session dropped".to_string()));
                    }
                }
            }
        }

        Ok(session)
    }
}

impl std::fmt::Debug for SessionBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionBuilder")
            .field("role", &self.role)
            .field("info", &self.info)
            .field("registry", &self.registry)
            .finish()
    }
}

/// Install the internal `initialize` / `notifications/initialized`
/// handlers a server session answers the handshake with.
fn install_handshake_handlers(inner: &Arc<SessionInner>) {
    let weak = Arc::downgrade(inner);
    inner.registry.update(move |registry| {
        let init_ref = weak.clone();
        registry.on_request(methods::INITIALIZE, move |params, _ctx| {
            let weak = init_ref.clone();
            async move { handle_initialize(weak, params) }
        });
        let confirm_ref = weak.clone();
        registry.on_notification(methods::INITIALIZED, move |_params| {
            let weak = confirm_ref.clone();
            async move {
                if let Some(inner) = weak.upgrade() {
                    info!("server session initialized");
                    inner.set_state(SessionState::Initialized);
                }
                Ok(())
            }
        });
    });
}

fn handle_initialize(weak: Weak<SessionInner>, params: Option<Value>) -> Result<Value> {
    let inner = weak
        .upgrade()
        .ok_or_else(|| Error::ConnectionClosed("session dropped".to_string()))?;
    let params = params
        .ok_or_else(|| Error::InvalidParams("initialize requires parameters".to_string()))?;
    let init: InitializeParams = serde_json::from_value(params)
        .map_err(|e| Error::InvalidParams(format!("invalid initialize parameters: {e}")))?;

    let RoleConfig::Server {
        capabilities,
        instructions,
    } = &inner.role
    else {
        return Err(Error::Internal(
            "initialize received by client session".to_string(),
        ));
    };

    // When the client's version is supported, speak it; otherwise answer
    // with our preferred version and let the client decide.
    let negotiated = if SUPPORTED_VERSIONS.contains(&init.protocol_version.as_str()) {
        init.protocol_version.clone()
    } else {
        warn!(
            requested = %init.protocol_version,
            preferred = PROTOCOL_VERSION,
            "client requested unsupported protocol version"
        );
        PROTOCOL_VERSION.to_string()
    };

    debug!(client = %init.client_info.name, version = %negotiated, "answering initialize");
    *inner.peer.lock().expect("peer mutex poisoned") = Some(PeerIdentity {
        info: init.client_info,
        protocol_version: negotiated.clone(),
        client_capabilities: Some(init.capabilities),
        server_capabilities: None,
        instructions: None,
    });

    let result = InitializeResult {
        protocol_version: negotiated,
        capabilities: capabilities.clone(),
        server_info: inner.info.clone(),
        instructions: instructions.clone(),
        _meta: None,
    };
    Ok(serde_json::to_value(result)?)
}

/// A handle to one live MCP session.
///
/// Handles are cheap to clone; the session tears down when the last handle
/// is dropped or [`Session::close`] is called.
#[derive(Clone)]
pub struct Session {
    inner: Arc<SessionInner>,
    guard: Arc<CloseGuard>,
}

impl Session {
    /// Current lifecycle state.
    pub fn state(&self) -> SessionState {
        *self.inner.state.borrow()
    }

    /// Number of outbound requests still awaiting responses.
    pub fn pending_requests(&self) -> usize {
        self.inner.pending.len()
    }

    /// The peer's implementation info, once the handshake ran.
    pub fn peer_info(&self) -> Option<Implementation> {
        self.inner
            .peer
            .lock()
            .expect("peer mutex poisoned")
            .as_ref()
            .map(|peer| peer.info.clone())
    }

    /// The protocol version negotiated at the handshake.
    pub fn protocol_version(&self) -> Option<String> {
        self.inner
            .peer
            .lock()
            .expect("peer mutex poisoned")
            .as_ref()
            .map(|peer| peer.protocol_version.clone())
    }

    /// Capabilities the server advertised (populated on client sessions).
    pub fn server_capabilities(&self) -> Option<ServerCapabilities> {
        self.inner
            .peer
            .lock()
            .expect("peer mutex poisoned")
            .as_ref()
            .and_then(|peer| peer.server_capabilities.clone())
    }

    /// Capabilities the client advertised (populated on server sessions).
    pub fn client_capabilities(&self) -> Option<ClientCapabilities> {
        self.inner
            .peer
            .lock()
            .expect("peer mutex poisoned")
            .as_ref()
            .and_then(|peer| peer.client_capabilities.clone())
    }

    /// Instructions the server sent with its `initialize` result.
    pub fn instructions(&self) -> Option<String> {
        self.inner
            .peer
            .lock()
            .expect("peer mutex poisoned")
            .as_ref()
            .and_then(|peer| peer.instructions.clone())
    }

    /// A weak handle for use inside handlers.
    pub fn peer(&self) -> Peer {
        Peer {
            inner: self.inner.self_ref.clone(),
        }
    }

    /// Issue a request and await its outcome.
    pub async fn request(
        &self,
        method: &str,
        params: Option<Value>,
        options: RequestOptions,
    ) -> Result<Value> {
        self.inner.request(method, params, options).await
    }

    /// Send a fire-and-forget notification.
    pub async fn notify(&self, method: &str, params: Option<Value>) -> Result<()> {
        self.inner.notify(method, params).await
    }

    /// Register a request handler after the session is live.
    ///
    /// The addition is one atomic snapshot swap; frames already being
    /// dispatched keep the view they started with.
    pub fn on_request<F, Fut>(&self, method: impl Into<String>, handler: F)
    where
        F: Fn(Option<Value>, RequestContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Value>> + Send + 'static,
    {
        let method = method.into();
        self.inner
            .registry
            .update(|registry| registry.on_request(method, handler));
    }

    /// Register a notification handler after the session is live.
    pub fn on_notification<F, Fut>(&self, method: impl Into<String>, handler: F)
    where
        F: Fn(Option<Value>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<()>> + Send + 'static,
    {
        let method = method.into();
        self.inner
            .registry
            .update(|registry| registry.on_notification(method, handler));
    }

    /// Close the session: stop the reader, fail all pending requests with
    /// a connection-closed error, close the transport. Idempotent.
    pub async fn close(&self) {
        self.inner.tear_down("session closed by local endpoint").await;
    }

    // ---- typed convenience wrappers -------------------------------------

    /// Health check; resolves once the peer answers.
    pub async fn ping(&self) -> Result<()> {
        self.request(methods::PING, None, RequestOptions::default())
            .await
            .map(|_| ())
    }

    /// List the server's tools.
    pub async fn list_tools(&self, cursor: Option<Cursor>) -> Result<ListToolsResult> {
        let params = match cursor {
            Some(cursor) => Some(serde_json::to_value(ListToolsParams {
                cursor: Some(cursor),
            })?),
            None => None,
        };
        let value = self
            .request(methods::LIST_TOOLS, params, RequestOptions::default())
            .await?;
        Ok(serde_json::from_value(value)?)
    }

    /// Call a tool by name.
    pub async fn call_tool(
        &self,
        name: &str,
        arguments: Option<Value>,
        options: RequestOptions,
    ) -> Result<CallToolResult> {
        let params = serde_json::to_value(CallToolParams {
            name: name.to_string(),
            arguments,
        })?;
        let value = self
            .request(methods::CALL_TOOL, Some(params), options)
            .await?;
        Ok(serde_json::from_value(value)?)
    }

    /// List the server's prompts.
    pub async fn list_prompts(&self, cursor: Option<Cursor>) -> Result<ListPromptsResult> {
        let params = match cursor {
            Some(cursor) => Some(serde_json::to_value(ListPromptsParams {
                cursor: Some(cursor),
            })?),
            None => None,
        };
        let value = self
            .request(methods::LIST_PROMPTS, params, RequestOptions::default())
            .await?;
        Ok(serde_json::from_value(value)?)
    }

    /// Expand a prompt template.
    pub async fn get_prompt(
        &self,
        name: &str,
        arguments: Option<HashMap<String, String>>,
    ) -> Result<GetPromptResult> {
        let params = serde_json::to_value(GetPromptParams {
            name: name.to_string(),
            arguments,
        })?;
        let value = self
            .request(methods::GET_PROMPT, Some(params), RequestOptions::default())
            .await?;
        Ok(serde_json::from_value(value)?)
    }

    /// List the server's resources.
    pub async fn list_resources(&self, cursor: Option<Cursor>) -> Result<ListResourcesResult> {
        let params = match cursor {
            Some(cursor) => Some(serde_json::to_value(ListResourcesParams {
                cursor: Some(cursor),
            })?),
            None => None,
        };
        let value = self
            .request(methods::LIST_RESOURCES, params, RequestOptions::default())
            .await?;
        Ok(serde_json::from_value(value)?)
    }

    /// Read a resource by URI.
    pub async fn read_resource(&self, uri: &str) -> Result<ReadResourceResult> {
        let params = serde_json::to_value(ReadResourceParams {
            uri: uri.to_string(),
        })?;
        let value = self
            .request(
                methods::READ_RESOURCE,
                Some(params),
                RequestOptions::default(),
            )
            .await?;
        Ok(serde_json::from_value(value)?)
    }

    /// Ask the server to send log messages at `level` and above.
    pub async fn set_logging_level(&self, level: LoggingLevel) -> Result<()> {
        let params = serde_json::to_value(SetLevelParams { level })?;
        self.request(
            methods::SET_LOGGING_LEVEL,
            Some(params),
            RequestOptions::default(),
        )
        .await
        .map(|_| ())
    }

    /// List the client's filesystem roots (server-side call).
    pub async fn list_roots(&self) -> Result<ListRootsResult> {
        let value = self
            .request(methods::LIST_ROOTS, None, RequestOptions::default())
            .await?;
        Ok(serde_json::from_value(value)?)
    }

    /// Sample from the client's LLM (server-side call).
    pub async fn create_message(
        &self,
        params: CreateMessageParams,
        options: RequestOptions,
    ) -> Result<CreateMessageResult> {
        let value = self
            .request(
                methods::CREATE_MESSAGE,
                Some(serde_json::to_value(params)?),
                options,
            )
            .await?;
        Ok(serde_json::from_value(value)?)
    }

    /// Request structured input from the user (server-side call).
    pub async fn elicit(&self, params: ElicitParams) -> Result<ElicitResult> {
        let value = self
            .request(
                methods::ELICIT,
                Some(serde_json::to_value(params)?),
                RequestOptions::default(),
            )
            .await?;
        Ok(serde_json::from_value(value)?)
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("inner", &self.inner)
            .field("handles", &Arc::strong_count(&self.guard))
            .finish()
    }
}
