//! Handler registry: method name to type-erased async handler.
//!
//! Lookup order for inbound frames is exact method match, then fallback,
//! then the protocol-level default (`-32601` for requests, a silent drop
//! for notifications). The registry is stored behind an atomic snapshot
//! swap so handlers can be added after the session is live: in-flight
//! dispatch keeps the snapshot it loaded, later frames see the new one.

use std::collections::HashMap;
use std::sync::Arc;

use arc_swap::ArcSwap;
use futures::FutureExt;
use futures::future::BoxFuture;
use serde_json::Value;

use embermcp_protocol::Result;

use crate::context::RequestContext;

/// Type-erased handler for inbound requests.
pub(crate) type RequestHandlerFn =
    Arc<dyn Fn(Option<Value>, RequestContext) -> BoxFuture<'static, Result<Value>> + Send + Sync>;

/// Type-erased handler for inbound notifications.
pub(crate) type NotificationHandlerFn =
    Arc<dyn Fn(Option<Value>) -> BoxFuture<'static, Result<()>> + Send + Sync>;

/// Fallback request handler; receives the method name alongside the params.
pub(crate) type FallbackRequestHandlerFn = Arc<
    dyn Fn(String, Option<Value>, RequestContext) -> BoxFuture<'static, Result<Value>>
        + Send
        + Sync,
>;

/// Fallback notification handler; receives the method name alongside the params.
pub(crate) type FallbackNotificationHandlerFn =
    Arc<dyn Fn(String, Option<Value>) -> BoxFuture<'static, Result<()>> + Send + Sync>;

/// One consistent view of every registered handler.
#[derive(Clone, Default)]
pub(crate) struct HandlerRegistry {
    pub(crate) requests: HashMap<String, RequestHandlerFn>,
    pub(crate) notifications: HashMap<String, NotificationHandlerFn>,
    pub(crate) fallback_request: Option<FallbackRequestHandlerFn>,
    pub(crate) fallback_notification: Option<FallbackNotificationHandlerFn>,
}

impl HandlerRegistry {
    /// Register a request handler for `method`.
    pub(crate) fn on_request<F, Fut>(&mut self, method: impl Into<String>, handler: F)
    where
        F: Fn(Option<Value>, RequestContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Value>> + Send + 'static,
    {
        self.requests.insert(
            method.into(),
            Arc::new(move |params, ctx| handler(params, ctx).boxed()),
        );
    }

    /// Register a notification handler for `method`.
    pub(crate) fn on_notification<F, Fut>(&mut self, method: impl Into<String>, handler: F)
    where
        F: Fn(Option<Value>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<()>> + Send + 'static,
    {
        self.notifications.insert(
            method.into(),
            Arc::new(move |params| handler(params).boxed()),
        );
    }

    /// Set the catch-all request handler.
    pub(crate) fn set_fallback_request<F, Fut>(&mut self, handler: F)
    where
        F: Fn(String, Option<Value>, RequestContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Value>> + Send + 'static,
    {
        self.fallback_request = Some(Arc::new(move |method, params, ctx| {
            handler(method, params, ctx).boxed()
        }));
    }

    /// Set the catch-all notification handler.
    pub(crate) fn set_fallback_notification<F, Fut>(&mut self, handler: F)
    where
        F: Fn(String, Option<Value>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<()>> + Send + 'static,
    {
        self.fallback_notification =
            Some(Arc::new(move |method, params| handler(method, params).boxed()));
    }

    pub(crate) fn has_request(&self, method: &str) -> bool {
        self.requests.contains_key(method)
    }

    pub(crate) fn has_notification(&self, method: &str) -> bool {
        self.notifications.contains_key(method)
    }
}

impl std::fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandlerRegistry")
            .field("requests", &self.requests.len())
            .field("notifications", &self.notifications.len())
            .field("fallback_request", &self.fallback_request.is_some())
            .field("fallback_notification", &self.fallback_notification.is_some())
            .finish()
    }
}

/// Atomically swappable registry shared between the dispatcher and the
/// public registration API.
#[derive(Debug)]
pub(crate) struct SharedRegistry {
    current: ArcSwap<HandlerRegistry>,
}

impl SharedRegistry {
    pub(crate) fn new(registry: HandlerRegistry) -> Self {
        Self {
            current: ArcSwap::from_pointee(registry),
        }
    }

    /// Load the current snapshot.
    pub(crate) fn load(&self) -> Arc<HandlerRegistry> {
        self.current.load_full()
    }

    /// Apply a mutation as a single atomic swap.
    pub(crate) fn update(&self, mutate: impl FnOnce(&mut HandlerRegistry)) {
        let mut next = (*self.current.load_full()).clone();
        mutate(&mut next);
        self.current.store(Arc::new(next));
    }
}
