//! # embermcp-session
//!
//! The session core of the embermcp runtime: a bidirectional JSON-RPC 2.0
//! engine connecting an MCP client and server over any
//! [`Transport`](embermcp_transport::Transport).
//!
//! One reader task per session pulls frames off the transport and routes
//! them: responses complete the pending request table, progress
//! notifications feed callbacks and reset deadlines, cancellations trip
//! handler tokens, and requests run user handlers in their own tasks so a
//! handler may call back into the session without deadlocking the loop.
//!
//! ```no_run
//! use embermcp_protocol::types::Implementation;
//! use embermcp_session::SessionBuilder;
//! use embermcp_transport::InMemoryTransport;
//!
//! # async fn run() -> embermcp_protocol::Result<()> {
//! let (client_end, server_end) = InMemoryTransport::pair();
//!
//! let server = tokio::spawn(
//!     SessionBuilder::server(Implementation::new("demo-server", "0.1.0"))
//!         .on_request("tools/list", |_params, _ctx| async {
//!             Ok(serde_json::json!({ "tools": [] }))
//!         })
//!         .connect(server_end),
//! );
//!
//! let client = SessionBuilder::client(Implementation::new("demo-client", "0.1.0"))
//!     .connect(client_end)
//!     .await?;
//! let tools = client.list_tools(None).await?;
//! # let _ = (tools, server);
//! # Ok(())
//! # }
//! ```

mod capabilities;
mod context;
mod dispatcher;
mod options;
mod pending;
mod progress;
mod registry;
mod session;
mod timeout;

pub use context::{Peer, RequestContext};
pub use options::{DEFAULT_REQUEST_TIMEOUT, RequestOptions};
pub use progress::{ProgressCallback, ProgressUpdate};
pub use session::{Session, SessionBuilder, SessionState};
