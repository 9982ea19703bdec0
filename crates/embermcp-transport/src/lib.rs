//! # embermcp-transport
//!
//! Transport contract for the embermcp runtime and the in-memory duplex
//! pair used to wire two sessions together inside one process.
//!
//! A transport moves whole JSON-RPC frames; how those frames are delimited
//! on the underlying medium (newlines, SSE events, channel items) is the
//! implementation's business. The session core consumes any type
//! implementing [`Transport`].

pub mod error;
pub mod memory;
pub mod traits;

pub use error::{TransportError, TransportResult};
pub use memory::InMemoryTransport;
pub use traits::Transport;
