//! Fundamental types shared across protocol features.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Protocol version string (date-based, e.g. `"2025-11-25"`)
pub type ProtocolVersion = String;

/// Opaque pagination cursor
pub type Cursor = String;

/// Implementation information exchanged as `clientInfo` / `serverInfo`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Implementation {
    /// Programmatic identifier of the implementation
    pub name: String,
    /// Human-readable display name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Implementation version string
    pub version: String,
}

impl Implementation {
    /// Create implementation info from a name and version
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            title: None,
            version: version.into(),
        }
    }

    /// Attach a display title
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }
}

/// Opaque token correlating progress notifications with an in-flight
/// request. Attached under `_meta.progressToken` on the request; echoed by
/// the peer in `notifications/progress`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProgressToken {
    /// String token
    String(String),
    /// Numeric token
    Number(i64),
}

impl fmt::Display for ProgressToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String(s) => write!(f, "{s}"),
            Self::Number(n) => write!(f, "{n}"),
        }
    }
}

impl From<i64> for ProgressToken {
    fn from(n: i64) -> Self {
        Self::Number(n)
    }
}

impl From<&str> for ProgressToken {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

/// Message role in prompt and sampling exchanges
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// End-user message
    User,
    /// Model message
    Assistant,
}

/// Result carrying no fields (e.g. `ping`, `logging/setLevel`)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmptyResult {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_implementation_optional_title() {
        let info = Implementation::new("demo", "1.0.0");
        let wire = serde_json::to_value(&info).unwrap();
        assert!(wire.get("title").is_none());

        let info = info.with_title("Demo Server");
        let wire = serde_json::to_value(&info).unwrap();
        assert_eq!(wire["title"], "Demo Server");
    }

    #[test]
    fn test_progress_token_untagged() {
        let n: ProgressToken = serde_json::from_str("3").unwrap();
        assert_eq!(n, ProgressToken::Number(3));

        let s: ProgressToken = serde_json::from_str("\"tok\"").unwrap();
        assert_eq!(s, ProgressToken::String("tok".to_string()));
        assert_eq!(serde_json::to_string(&s).unwrap(), "\"tok\"");
    }

    #[test]
    fn test_role_lowercase() {
        assert_eq!(serde_json::to_string(&Role::User).unwrap(), "\"user\"");
        assert_eq!(
            serde_json::to_string(&Role::Assistant).unwrap(),
            "\"assistant\""
        );
    }
}
