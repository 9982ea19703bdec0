//! LLM sampling types (server-initiated `sampling/createMessage`).

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::content::ContentBlock;
use super::core::Role;

/// One message in a sampling conversation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SamplingMessage {
    /// Speaker of the message
    pub role: Role,
    /// Message content
    pub content: ContentBlock,
}

/// `sampling/createMessage` parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateMessageParams {
    /// Conversation to sample from
    pub messages: Vec<SamplingMessage>,
    /// System prompt the server would like used
    #[serde(rename = "systemPrompt", skip_serializing_if = "Option::is_none")]
    pub system_prompt: Option<String>,
    /// Maximum number of tokens to sample
    #[serde(rename = "maxTokens")]
    pub max_tokens: i64,
    /// Sampling temperature
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    /// Sequences that stop sampling
    #[serde(rename = "stopSequences", skip_serializing_if = "Option::is_none")]
    pub stop_sequences: Option<Vec<String>>,
    /// Server's model preferences (hints, priorities)
    #[serde(rename = "modelPreferences", skip_serializing_if = "Option::is_none")]
    pub model_preferences: Option<Value>,
    /// Provider-specific metadata
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,
}

/// `sampling/createMessage` result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateMessageResult {
    /// Role of the sampled message (always assistant in practice)
    pub role: Role,
    /// The sampled content
    pub content: ContentBlock,
    /// Name of the model that produced the message
    pub model: String,
    /// Why sampling stopped
    #[serde(rename = "stopReason", skip_serializing_if = "Option::is_none")]
    pub stop_reason: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_message_wire_names() {
        let params = CreateMessageParams {
            messages: vec![SamplingMessage {
                role: Role::User,
                content: ContentBlock::text("hi"),
            }],
            system_prompt: None,
            max_tokens: 128,
            temperature: None,
            stop_sequences: None,
            model_preferences: None,
            metadata: None,
        };
        let wire = serde_json::to_value(&params).unwrap();
        assert_eq!(wire["maxTokens"], 128);
        assert!(wire.get("systemPrompt").is_none());
    }
}
