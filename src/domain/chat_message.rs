//! Chat payload carried on every destination.
//!
//! [`ChatMessage`] is the only body type the relay understands. It is built
//! either by a client (JOIN / CHAT) or by the lifecycle notifier (LEAVE) and
//! is never mutated after construction.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::ChatError;

/// Kind of event a [`ChatMessage`] represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MessageType {
    /// A user announced themselves on the shared topic.
    Join,
    /// A regular chat line.
    Chat,
    /// A user's connection went away.
    Leave,
}

impl MessageType {
    /// Returns the wire name of this message type.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Join => "JOIN",
            Self::Chat => "CHAT",
            Self::Leave => "LEAVE",
        }
    }
}

/// One event in the chat stream.
///
/// `content` is only meaningful for [`MessageType::Chat`]. `recipient` is
/// only read by the private-send destination and is omitted from JSON when
/// absent, so broadcast messages round-trip unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    /// Text body.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    /// Username of the originating (or, for LEAVE, departed) user.
    pub sender: String,
    /// Event discriminator.
    pub message_type: MessageType,
    /// Target username for private delivery.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recipient: Option<String>,
}

impl ChatMessage {
    /// Builds a JOIN event for `sender`.
    #[must_use]
    pub fn join(sender: impl Into<String>) -> Self {
        Self {
            content: None,
            sender: sender.into(),
            message_type: MessageType::Join,
            recipient: None,
        }
    }

    /// Builds a CHAT event.
    #[must_use]
    pub fn chat(sender: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            sender: sender.into(),
            message_type: MessageType::Chat,
            recipient: None,
        }
    }

    /// Builds a LEAVE event for `sender`. Content is always absent.
    #[must_use]
    pub fn leave(sender: impl Into<String>) -> Self {
        Self {
            content: None,
            sender: sender.into(),
            message_type: MessageType::Leave,
            recipient: None,
        }
    }

    /// Sets the private recipient.
    #[must_use]
    pub fn with_recipient(mut self, recipient: impl Into<String>) -> Self {
        self.recipient = Some(recipient.into());
        self
    }

    /// Checks that the message carries a usable sender.
    ///
    /// The message type is already guaranteed by deserialization; content
    /// is not inspected.
    ///
    /// # Errors
    ///
    /// Returns [`ChatError::InvalidMessage`] if `sender` is empty or only
    /// whitespace.
    pub fn validate(&self) -> Result<(), ChatError> {
        if self.sender.trim().is_empty() {
            return Err(ChatError::InvalidMessage(
                "sender must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn wire_names_are_upper_case() {
        let json = serde_json::to_string(&ChatMessage::join("alice")).unwrap_or_default();
        assert!(json.contains("\"messageType\":\"JOIN\""));
        assert!(json.contains("\"sender\":\"alice\""));
        assert!(!json.contains("content"));
        assert!(!json.contains("recipient"));
    }

    #[test]
    fn deserializes_client_payload() {
        let raw = r#"{"sender":"B","content":"hi","messageType":"CHAT"}"#;
        let Ok(msg) = serde_json::from_str::<ChatMessage>(raw) else {
            panic!("valid payload should parse");
        };
        assert_eq!(msg, ChatMessage::chat("B", "hi"));
    }

    #[test]
    fn unknown_message_type_is_rejected() {
        let raw = r#"{"sender":"B","messageType":"SHOUT"}"#;
        assert!(serde_json::from_str::<ChatMessage>(raw).is_err());
    }

    #[test]
    fn missing_sender_is_rejected() {
        let raw = r#"{"messageType":"JOIN"}"#;
        assert!(serde_json::from_str::<ChatMessage>(raw).is_err());
    }

    #[test]
    fn blank_sender_fails_validation() {
        let msg = ChatMessage::join("   ");
        assert!(matches!(msg.validate(), Err(ChatError::InvalidMessage(_))));
        assert!(ChatMessage::join("carol").validate().is_ok());
    }

    #[test]
    fn leave_has_no_content() {
        let msg = ChatMessage::leave("bob");
        assert_eq!(msg.message_type, MessageType::Leave);
        assert!(msg.content.is_none());
        assert_eq!(msg.message_type.as_str(), "LEAVE");
    }
}
