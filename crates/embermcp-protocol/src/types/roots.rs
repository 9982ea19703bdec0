//! Filesystem roots types (server-initiated `roots/list`).

use serde::{Deserialize, Serialize};

/// A filesystem boundary the client grants the server access to
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Root {
    /// `file://` URI of the root
    pub uri: String,
    /// Human-readable name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// `roots/list` result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListRootsResult {
    /// Roots the client exposes
    pub roots: Vec<Root>,
}
