//! WebSocket frames exchanged with chat clients.
//!
//! Frames are JSON objects shaped after STOMP's commands. Client frames are
//! tagged by `command`, server frames by `frame`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{ChatMessage, ConnectionId};

/// Frames a client can send.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum ClientFrame {
    /// Start receiving messages published on `destination`.
    Subscribe {
        /// Client-chosen subscription id, echoed on every delivered message.
        id: String,
        /// Topic (`/topic/...`) or private queue (`/user/queue/...`).
        destination: String,
        /// Optional receipt id acknowledged once the subscription is live.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        receipt: Option<String>,
    },
    /// Cancel a subscription.
    Unsubscribe {
        /// Id used in the matching `subscribe`.
        id: String,
        /// Optional receipt id.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        receipt: Option<String>,
    },
    /// Send a chat message to an inbound `/app/...` destination.
    Send {
        /// Inbound destination.
        destination: String,
        /// Chat payload.
        body: ChatMessage,
        /// Optional receipt id acknowledged once the message is relayed.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        receipt: Option<String>,
    },
    /// Close the session gracefully.
    Disconnect {
        /// Optional receipt id acknowledged before the socket closes.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        receipt: Option<String>,
    },
}

/// Frames the server sends.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "frame", rename_all = "snake_case")]
pub enum ServerFrame {
    /// First frame on every connection.
    Connected {
        /// Server-assigned connection id.
        connection_id: ConnectionId,
        /// Server version.
        version: String,
    },
    /// A message delivered through one of the client's subscriptions.
    Message {
        /// Subscription id the message matched.
        subscription: String,
        /// Destination it was published on.
        destination: String,
        /// Server-generated message id.
        message_id: String,
        /// Delivery timestamp.
        timestamp: DateTime<Utc>,
        /// Chat payload, unmodified.
        body: ChatMessage,
    },
    /// Acknowledges a client frame that carried a receipt id.
    Receipt {
        /// The receipt id from the client frame.
        receipt_id: String,
    },
    /// A client frame was rejected. The connection stays open.
    Error {
        /// Numeric error code.
        code: u32,
        /// Human-readable message.
        message: String,
    },
}

impl From<&crate::error::ChatError> for ServerFrame {
    fn from(err: &crate::error::ChatError) -> Self {
        Self::Error {
            code: err.error_code(),
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::MessageType;

    #[test]
    fn parses_send_frame() {
        let raw = r#"{
            "command": "send",
            "destination": "/app/chat.addUser",
            "body": {"sender": "B", "messageType": "JOIN"}
        }"#;
        let Ok(ClientFrame::Send {
            destination,
            body,
            receipt,
        }) = serde_json::from_str(raw)
        else {
            panic!("send frame expected");
        };
        assert_eq!(destination, "/app/chat.addUser");
        assert_eq!(body.message_type, MessageType::Join);
        assert!(receipt.is_none());
    }

    #[test]
    fn disconnect_receipt_is_optional() {
        let Ok(ClientFrame::Disconnect { receipt }) =
            serde_json::from_str::<ClientFrame>(r#"{"command":"disconnect"}"#)
        else {
            panic!("disconnect frame expected");
        };
        assert!(receipt.is_none());
    }

    #[test]
    fn client_frames_serialize_as_the_server_reads_them() {
        let frame = ClientFrame::Subscribe {
            id: "public".to_string(),
            destination: "/topic/public".to_string(),
            receipt: None,
        };
        let json = serde_json::to_string(&frame).unwrap_or_default();
        assert!(json.contains("\"command\":\"subscribe\""));
        assert!(!json.contains("receipt"));
        let Ok(parsed) = serde_json::from_str::<ClientFrame>(&json) else {
            panic!("own frame should parse");
        };
        assert_eq!(parsed, frame);
    }

    #[test]
    fn error_frame_is_tagged() {
        let frame = ServerFrame::Error {
            code: 1001,
            message: "malformed frame".to_string(),
        };
        let json = serde_json::to_string(&frame).unwrap_or_default();
        assert!(json.contains("\"frame\":\"error\""));
    }
}
