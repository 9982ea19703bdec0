//! # embermcp
//!
//! A compact Model Context Protocol runtime core for Rust: a bidirectional
//! JSON-RPC 2.0 session engine (protocol revision 2025-11-25) over
//! pluggable transports.
//!
//! Either peer may originate requests, send notifications, stream progress,
//! or cancel in flight. The engine provides per-request timeout policies
//! (including progress-driven deadline resets under a hard ceiling),
//! cooperative cancellation that propagates to the peer, a handler registry
//! with fallbacks, and the `initialize` handshake with capability
//! negotiation.
//!
//! This crate re-exports the workspace layers:
//!
//! - [`protocol`] - wire types, codec, error model
//! - [`transport`] - the transport contract and the in-memory pair
//! - [`session`] - the session core and its builder
//!
//! ## Quick start
//!
//! ```no_run
//! use embermcp::prelude::*;
//!
//! # async fn run() -> embermcp::Result<()> {
//! let (client_end, server_end) = InMemoryTransport::pair();
//!
//! let server = tokio::spawn(
//!     SessionBuilder::server(Implementation::new("adder", "1.0.0"))
//!         .on_request("tools/call", |_params, _ctx| async {
//!             Ok(serde_json::json!({ "content": [{ "type": "text", "text": "3" }] }))
//!         })
//!         .connect(server_end),
//! );
//!
//! let client = SessionBuilder::client(Implementation::new("host", "1.0.0"))
//!     .connect(client_end)
//!     .await?;
//! let result = client
//!     .call_tool("add", Some(serde_json::json!({ "a": 1, "b": 2 })), RequestOptions::default())
//!     .await?;
//! # let _ = (result, server);
//! # Ok(())
//! # }
//! ```

pub use embermcp_protocol as protocol;
pub use embermcp_session as session;
pub use embermcp_transport as transport;

pub use embermcp_protocol::{
    Error, JsonRpcError, JsonRpcMessage, JsonRpcNotification, JsonRpcRequest, JsonRpcResponse,
    PROTOCOL_VERSION, RequestId, Result, SUPPORTED_VERSIONS, error_codes, methods,
};
pub use embermcp_session::{
    DEFAULT_REQUEST_TIMEOUT, Peer, ProgressUpdate, RequestContext, RequestOptions, Session,
    SessionBuilder, SessionState,
};
pub use embermcp_transport::{InMemoryTransport, Transport, TransportError};

/// Commonly used items, ready for a glob import.
pub mod prelude {
    pub use embermcp_protocol::types::{
        CallToolParams, CallToolResult, ClientCapabilities, ContentBlock, Implementation,
        ListToolsResult, LoggingLevel, ServerCapabilities, Tool,
    };
    pub use embermcp_protocol::{Error, Result, methods};
    pub use embermcp_session::{
        ProgressUpdate, RequestContext, RequestOptions, Session, SessionBuilder, SessionState,
    };
    pub use embermcp_transport::{InMemoryTransport, Transport};
}
