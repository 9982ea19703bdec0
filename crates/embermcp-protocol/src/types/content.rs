//! Content blocks carried by tool results, prompts, and sampling messages.

use serde::{Deserialize, Serialize};

/// A single block of content, discriminated by its `type` field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ContentBlock {
    /// Plain text
    Text {
        /// The text content
        text: String,
    },
    /// Base64-encoded image data
    Image {
        /// Base64-encoded payload
        data: String,
        /// MIME type of the image
        #[serde(rename = "mimeType")]
        mime_type: String,
    },
    /// Base64-encoded audio data
    Audio {
        /// Base64-encoded payload
        data: String,
        /// MIME type of the audio
        #[serde(rename = "mimeType")]
        mime_type: String,
    },
}

impl ContentBlock {
    /// Create a text content block
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }

    /// Get the text if this is a text block
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text { text } => Some(text),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_block_tag() {
        let wire = serde_json::to_value(ContentBlock::text("hello")).unwrap();
        assert_eq!(wire["type"], "text");
        assert_eq!(wire["text"], "hello");
    }

    #[test]
    fn test_image_block_wire_names() {
        let block = ContentBlock::Image {
            data: "aGk=".to_string(),
            mime_type: "image/png".to_string(),
        };
        let wire = serde_json::to_value(&block).unwrap();
        assert_eq!(wire["type"], "image");
        assert_eq!(wire["mimeType"], "image/png");
    }

    #[test]
    fn test_as_text() {
        assert_eq!(ContentBlock::text("x").as_text(), Some("x"));
        let image = ContentBlock::Image {
            data: String::new(),
            mime_type: "image/png".to_string(),
        };
        assert_eq!(image.as_text(), None);
    }
}
