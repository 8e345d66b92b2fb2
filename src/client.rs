//! WebSocket client for the relay's JSON frame protocol.
//!
//! Used by the `chat-client` binary: connect to `/ws`, subscribe, send JOIN
//! and CHAT, and print what arrives. Every frame the client sends carries a
//! receipt id, so each call returns only after the server processed it.
//! Deliveries that arrive while a receipt is awaited are queued and handed
//! out by [`ChatClient::next_frame`] in arrival order.

use std::collections::VecDeque;
use std::fmt;

use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::{self, Message};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};

use crate::domain::{ChatMessage, ConnectionId, MessageType};
use crate::ws::messages::{ClientFrame, ServerFrame};

/// Errors raised by [`ChatClient`].
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Transport failure.
    #[error("websocket error: {0}")]
    WebSocket(Box<tungstenite::Error>),

    /// A frame could not be encoded or decoded.
    #[error("frame codec error: {0}")]
    Codec(#[from] serde_json::Error),

    /// The server answered with an `error` frame.
    #[error("rejected by server ({code}): {message}")]
    Rejected {
        /// Error code from the frame.
        code: u32,
        /// Error message from the frame.
        message: String,
    },

    /// The first frame was not `connected`.
    #[error("expected a connected frame, got {0}")]
    Handshake(String),

    /// The server closed the connection.
    #[error("connection closed by server")]
    Closed,
}

impl From<tungstenite::Error> for ClientError {
    fn from(err: tungstenite::Error) -> Self {
        Self::WebSocket(Box::new(err))
    }
}

/// A connected chat client.
pub struct ChatClient {
    ws: WebSocketStream<MaybeTlsStream<TcpStream>>,
    connection_id: ConnectionId,
    pending: VecDeque<ServerFrame>,
    next_receipt: u64,
}

impl fmt::Debug for ChatClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChatClient")
            .field("connection_id", &self.connection_id)
            .field("pending", &self.pending.len())
            .finish_non_exhaustive()
    }
}

impl ChatClient {
    /// Connects to `url` (e.g. `ws://localhost:8080/ws`) and waits for the
    /// `connected` frame.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::WebSocket`] if the upgrade fails and
    /// [`ClientError::Handshake`] if the server opens with another frame.
    pub async fn connect(url: &str) -> Result<Self, ClientError> {
        let (ws, _) = connect_async(url).await?;
        let mut client = Self {
            ws,
            connection_id: ConnectionId::new(),
            pending: VecDeque::new(),
            next_receipt: 0,
        };
        match client.read_frame().await? {
            Some(ServerFrame::Connected { connection_id, .. }) => {
                client.connection_id = connection_id;
                tracing::debug!(connection_id = %connection_id, "connected");
                Ok(client)
            }
            Some(other) => Err(ClientError::Handshake(format!("{other:?}"))),
            None => Err(ClientError::Closed),
        }
    }

    /// Connection id assigned by the server.
    #[must_use]
    pub fn connection_id(&self) -> ConnectionId {
        self.connection_id
    }

    /// Subscribes to `destination` under subscription id `id`.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Rejected`] if the server refuses the
    /// destination, or a transport error.
    pub async fn subscribe(&mut self, id: &str, destination: &str) -> Result<(), ClientError> {
        let receipt = self.receipt_id();
        self.send_frame(&ClientFrame::Subscribe {
            id: id.to_string(),
            destination: destination.to_string(),
            receipt: Some(receipt.clone()),
        })
        .await?;
        self.await_receipt(&receipt).await
    }

    /// Sends `body` to the inbound destination `destination`.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Rejected`] if the server refuses the message,
    /// or a transport error.
    pub async fn send(&mut self, destination: &str, body: ChatMessage) -> Result<(), ClientError> {
        let receipt = self.receipt_id();
        self.send_frame(&ClientFrame::Send {
            destination: destination.to_string(),
            body,
            receipt: Some(receipt.clone()),
        })
        .await?;
        self.await_receipt(&receipt).await
    }

    /// Returns the next frame from the server, or `None` once the
    /// connection is closed.
    ///
    /// # Errors
    ///
    /// Returns a transport or codec error.
    pub async fn next_frame(&mut self) -> Result<Option<ServerFrame>, ClientError> {
        if let Some(frame) = self.pending.pop_front() {
            return Ok(Some(frame));
        }
        self.read_frame().await
    }

    /// Sends `disconnect`, waits for its receipt and closes the socket.
    ///
    /// # Errors
    ///
    /// Returns a transport error if the `disconnect` frame cannot be sent.
    pub async fn disconnect(mut self) -> Result<(), ClientError> {
        let receipt = self.receipt_id();
        self.send_frame(&ClientFrame::Disconnect {
            receipt: Some(receipt.clone()),
        })
        .await?;
        loop {
            match self.read_frame().await {
                Ok(Some(ServerFrame::Receipt { receipt_id })) if receipt_id == receipt => break,
                Ok(Some(_)) => {}
                Ok(None) => break,
                Err(err) => {
                    tracing::debug!(error = %err, "connection ended before disconnect receipt");
                    break;
                }
            }
        }
        let _ = self.ws.close(None).await;
        Ok(())
    }

    fn receipt_id(&mut self) -> String {
        self.next_receipt += 1;
        format!("r-{}", self.next_receipt)
    }

    async fn send_frame(&mut self, frame: &ClientFrame) -> Result<(), ClientError> {
        let json = serde_json::to_string(frame)?;
        self.ws.send(Message::text(json)).await?;
        Ok(())
    }

    /// Reads until `receipt` is acknowledged, queueing other frames.
    async fn await_receipt(&mut self, receipt: &str) -> Result<(), ClientError> {
        loop {
            match self.read_frame().await? {
                Some(ServerFrame::Receipt { receipt_id }) if receipt_id == receipt => {
                    return Ok(());
                }
                Some(ServerFrame::Error { code, message }) => {
                    return Err(ClientError::Rejected { code, message });
                }
                Some(frame) => self.pending.push_back(frame),
                None => return Err(ClientError::Closed),
            }
        }
    }

    async fn read_frame(&mut self) -> Result<Option<ServerFrame>, ClientError> {
        while let Some(msg) = self.ws.next().await {
            match msg? {
                Message::Text(text) => return Ok(Some(serde_json::from_str(text.as_str())?)),
                Message::Close(_) => return Ok(None),
                _ => {}
            }
        }
        Ok(None)
    }
}

/// One-line rendering of a server frame for terminal output.
#[must_use]
pub fn describe(frame: &ServerFrame) -> String {
    match frame {
        ServerFrame::Connected { connection_id, .. } => format!("connected as {connection_id}"),
        ServerFrame::Message {
            destination, body, ..
        } => match body.message_type {
            MessageType::Join => format!("[{destination}] {} joined", body.sender),
            MessageType::Leave => format!("[{destination}] {} left", body.sender),
            MessageType::Chat => format!(
                "[{destination}] {} -> {}",
                body.sender,
                body.content.as_deref().unwrap_or_default()
            ),
        },
        ServerFrame::Receipt { receipt_id } => format!("receipt {receipt_id}"),
        ServerFrame::Error { code, message } => format!("error {code}: {message}"),
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn delivered(body: ChatMessage) -> ServerFrame {
        ServerFrame::Message {
            subscription: "public".to_string(),
            destination: "/topic/public".to_string(),
            message_id: "m-1".to_string(),
            timestamp: Utc::now(),
            body,
        }
    }

    #[test]
    fn describes_chat_lines_as_sender_and_content() {
        let line = describe(&delivered(ChatMessage::chat("User1", "Hello, WebSocket!")));
        assert_eq!(line, "[/topic/public] User1 -> Hello, WebSocket!");
    }

    #[test]
    fn describes_lifecycle_events() {
        assert_eq!(
            describe(&delivered(ChatMessage::join("alice"))),
            "[/topic/public] alice joined"
        );
        assert_eq!(
            describe(&delivered(ChatMessage::leave("alice"))),
            "[/topic/public] alice left"
        );
    }

    #[test]
    fn describes_errors_with_code() {
        let frame = ServerFrame::Error {
            code: 2001,
            message: "unknown destination".to_string(),
        };
        assert_eq!(describe(&frame), "error 2001: unknown destination");
    }
}
