//! Elicitation types (server-initiated `elicitation/create`).

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// `elicitation/create` parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ElicitParams {
    /// Message shown to the user explaining what is requested
    pub message: String,
    /// JSON Schema constraining the requested input
    #[serde(rename = "requestedSchema")]
    pub requested_schema: Value,
}

/// How the user responded to an elicitation request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElicitAction {
    /// The user provided the requested input
    Accept,
    /// The user explicitly declined
    Decline,
    /// The user dismissed the request without answering
    Cancel,
}

/// `elicitation/create` result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ElicitResult {
    /// The user's action
    pub action: ElicitAction,
    /// Submitted values when the action is `accept`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<Value>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_elicit_result_actions() {
        let accepted: ElicitResult = serde_json::from_value(serde_json::json!({
            "action": "accept",
            "content": {"name": "ada"}
        }))
        .unwrap();
        assert_eq!(accepted.action, ElicitAction::Accept);
        assert_eq!(accepted.content.unwrap()["name"], "ada");

        let declined: ElicitResult =
            serde_json::from_value(serde_json::json!({"action": "decline"})).unwrap();
        assert_eq!(declined.action, ElicitAction::Decline);
        assert!(declined.content.is_none());
    }
}
