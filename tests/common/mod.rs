//! Shared helpers for integration tests: an in-process server and a small
//! WebSocket client speaking the relay's JSON frames.

#![allow(dead_code, clippy::panic)]

use std::net::SocketAddr;
use std::time::Duration;

use chat_relay::app_state::AppState;
use chat_relay::config::ChatConfig;
use chat_relay::domain::ChatMessage;
use chat_relay::server::build_app;
use chat_relay::ws::messages::ServerFrame;
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};

/// How long a test waits for a single frame.
pub const FRAME_TIMEOUT: Duration = Duration::from_secs(5);

/// Starts the relay on an ephemeral port and returns its address.
pub async fn start_server() -> SocketAddr {
    let config = ChatConfig::default();
    let state = AppState::new(&config);
    let app = build_app(state, &config);

    let Ok(listener) = tokio::net::TcpListener::bind("127.0.0.1:0").await else {
        panic!("bind failed");
    };
    let Ok(addr) = listener.local_addr() else {
        panic!("no local addr");
    };
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    addr
}

/// A connected test client.
pub struct Client {
    ws: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

impl Client {
    /// Connects and consumes the `connected` frame.
    pub async fn connect(addr: SocketAddr) -> Self {
        let Ok((ws, _)) = connect_async(format!("ws://{addr}/ws")).await else {
            panic!("ws connect failed");
        };
        let mut client = Self { ws };
        let ServerFrame::Connected { .. } = client.next_frame().await else {
            panic!("connected frame expected first");
        };
        client
    }

    /// Sends a raw JSON frame.
    pub async fn send_json(&mut self, frame: serde_json::Value) {
        if self.ws.send(Message::text(frame.to_string())).await.is_err() {
            panic!("ws send failed");
        }
    }

    /// Subscribes and waits for the receipt.
    pub async fn subscribe(&mut self, id: &str, destination: &str) {
        let receipt = format!("sub-{id}");
        self.send_json(serde_json::json!({
            "command": "subscribe",
            "id": id,
            "destination": destination,
            "receipt": receipt,
        }))
        .await;
        self.expect_receipt(&receipt).await;
    }

    /// Sends a chat payload and waits for the receipt.
    pub async fn send(&mut self, destination: &str, body: &ChatMessage) {
        let receipt = format!("send-{}", uuid::Uuid::new_v4());
        self.send_json(serde_json::json!({
            "command": "send",
            "destination": destination,
            "body": body,
            "receipt": receipt,
        }))
        .await;
        self.expect_receipt(&receipt).await;
    }

    /// Reads frames until the given receipt arrives.
    pub async fn expect_receipt(&mut self, receipt: &str) {
        loop {
            match self.next_frame().await {
                ServerFrame::Receipt { receipt_id } if receipt_id == receipt => return,
                ServerFrame::Error { message, .. } => panic!("unexpected error frame: {message}"),
                _ => {}
            }
        }
    }

    /// Reads the next server frame.
    pub async fn next_frame(&mut self) -> ServerFrame {
        loop {
            let Ok(Some(Ok(msg))) = tokio::time::timeout(FRAME_TIMEOUT, self.ws.next()).await
            else {
                panic!("no frame within timeout");
            };
            if let Message::Text(text) = msg {
                let Ok(frame) = serde_json::from_str::<ServerFrame>(text.as_str()) else {
                    panic!("undecodable frame: {}", text.as_str());
                };
                return frame;
            }
        }
    }

    /// Reads the next `message` frame and returns `(destination, body)`.
    pub async fn next_message(&mut self) -> (String, ChatMessage) {
        loop {
            if let ServerFrame::Message {
                destination, body, ..
            } = self.next_frame().await
            {
                return (destination, body);
            }
        }
    }

    /// Asserts nothing arrives for a short while.
    pub async fn expect_silence(&mut self) {
        let waited = tokio::time::timeout(Duration::from_millis(200), self.ws.next()).await;
        assert!(waited.is_err(), "expected no frame, got {waited:?}");
    }

    /// Closes the socket.
    pub async fn close(mut self) {
        let _ = self.ws.close(None).await;
    }
}
