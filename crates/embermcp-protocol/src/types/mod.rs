//! MCP payload types for the 2025-11-25 protocol revision.
//!
//! Wire names are camelCase per the MCP schema; optional fields are elided
//! from serialized frames. Only the shapes the session core and its hosts
//! exchange are modeled here; feature-specific extensions live with their
//! feature.

pub mod capabilities;
pub mod content;
pub mod core;
pub mod elicitation;
pub mod initialization;
pub mod logging;
pub mod notifications;
pub mod prompts;
pub mod resources;
pub mod roots;
pub mod sampling;
pub mod tools;

pub use capabilities::{
    ClientCapabilities, CompletionsCapabilities, ElicitationCapabilities, LoggingCapabilities,
    PromptsCapabilities, ResourcesCapabilities, RootsCapabilities, SamplingCapabilities,
    ServerCapabilities, TasksCapabilities, ToolsCapabilities,
};
pub use content::ContentBlock;
pub use core::{Cursor, EmptyResult, Implementation, ProgressToken, ProtocolVersion, Role};
pub use elicitation::{ElicitAction, ElicitParams, ElicitResult};
pub use initialization::{InitializeParams, InitializeResult, InitializedNotification};
pub use logging::{LoggingLevel, LoggingMessageParams, SetLevelParams};
pub use notifications::{CancelledParams, ProgressParams};
pub use prompts::{
    GetPromptParams, GetPromptResult, ListPromptsParams, ListPromptsResult, Prompt, PromptArgument,
    PromptMessage,
};
pub use resources::{
    ListResourcesParams, ListResourcesResult, ReadResourceParams, ReadResourceResult, Resource,
    ResourceContents,
};
pub use roots::{ListRootsResult, Root};
pub use sampling::{CreateMessageParams, CreateMessageResult, SamplingMessage};
pub use tools::{CallToolParams, CallToolResult, ListToolsParams, ListToolsResult, Tool};
