//! # embermcp-protocol
//!
//! Protocol layer for the embermcp runtime: JSON-RPC 2.0 message types and
//! codec, the MCP payload type model (initialization, capabilities, tools,
//! prompts, resources, logging, sampling, elicitation, roots), and the
//! error model shared across the workspace.
//!
//! This crate is wire-only: it knows nothing about transports or sessions.

pub mod error;
pub mod jsonrpc;
pub mod types;

pub use error::{Error, Result};
pub use jsonrpc::{
    JSONRPC_VERSION, JsonRpcError, JsonRpcMessage, JsonRpcNotification, JsonRpcRequest,
    JsonRpcResponse, JsonRpcVersion, RequestId, ResponseId,
};

/// MCP protocol version implemented by this SDK (latest official spec)
pub const PROTOCOL_VERSION: &str = "2025-11-25";

/// Supported protocol versions in preference order (latest first)
pub const SUPPORTED_VERSIONS: &[&str] = &["2025-11-25", "2025-06-18", "2025-03-26"];

/// SDK name reported in implementation info
pub const SDK_NAME: &str = "embermcp";

/// SDK version reported in implementation info
pub const SDK_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Protocol method names
pub mod methods {
    /// Initialize handshake method
    pub const INITIALIZE: &str = "initialize";
    /// Initialized notification method
    pub const INITIALIZED: &str = "notifications/initialized";
    /// Cancellation notification method
    pub const CANCELLED: &str = "notifications/cancelled";
    /// Progress notification method
    pub const PROGRESS: &str = "notifications/progress";
    /// Health-check method
    pub const PING: &str = "ping";
    /// List available tools method
    pub const LIST_TOOLS: &str = "tools/list";
    /// Call a specific tool method
    pub const CALL_TOOL: &str = "tools/call";
    /// List available prompts method
    pub const LIST_PROMPTS: &str = "prompts/list";
    /// Get a specific prompt method
    pub const GET_PROMPT: &str = "prompts/get";
    /// List available resources method
    pub const LIST_RESOURCES: &str = "resources/list";
    /// Read a specific resource method
    pub const READ_RESOURCE: &str = "resources/read";
    /// Set the server logging level method
    pub const SET_LOGGING_LEVEL: &str = "logging/setLevel";
    /// Log message notification method
    pub const LOGGING_MESSAGE: &str = "notifications/message";
    /// Argument autocompletion method
    pub const COMPLETE: &str = "completion/complete";
    /// LLM sampling method (server -> client)
    pub const CREATE_MESSAGE: &str = "sampling/createMessage";
    /// User elicitation method (server -> client)
    pub const ELICIT: &str = "elicitation/create";
    /// List filesystem roots method (server -> client)
    pub const LIST_ROOTS: &str = "roots/list";
    /// List long-running tasks method
    pub const LIST_TASKS: &str = "tasks/list";
    /// Tool list change notification
    pub const TOOLS_LIST_CHANGED: &str = "notifications/tools/list_changed";
    /// Prompt list change notification
    pub const PROMPTS_LIST_CHANGED: &str = "notifications/prompts/list_changed";
    /// Resource list change notification
    pub const RESOURCES_LIST_CHANGED: &str = "notifications/resources/list_changed";
    /// Roots list change notification
    pub const ROOTS_LIST_CHANGED: &str = "notifications/roots/list_changed";
}

/// Protocol error codes (JSON-RPC standard + MCP extensions)
pub mod error_codes {
    /// Parse error (-32700)
    pub const PARSE_ERROR: i32 = -32700;
    /// Invalid request (-32600)
    pub const INVALID_REQUEST: i32 = -32600;
    /// Method not found (-32601)
    pub const METHOD_NOT_FOUND: i32 = -32601;
    /// Invalid params (-32602)
    pub const INVALID_PARAMS: i32 = -32602;
    /// Internal error (-32603)
    pub const INTERNAL_ERROR: i32 = -32603;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_constants() {
        assert_eq!(PROTOCOL_VERSION, "2025-11-25");
        assert!(SUPPORTED_VERSIONS.contains(&PROTOCOL_VERSION));
        // Preferred version first
        assert_eq!(SUPPORTED_VERSIONS[0], PROTOCOL_VERSION);
    }

    #[test]
    fn test_method_names_follow_namespace_convention() {
        assert!(methods::INITIALIZED.starts_with("notifications/"));
        assert!(methods::CANCELLED.starts_with("notifications/"));
        assert!(methods::PROGRESS.starts_with("notifications/"));
        assert!(methods::TOOLS_LIST_CHANGED.ends_with("list_changed"));
    }
}
