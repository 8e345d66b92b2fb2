//! WebSocket connection loop.
//!
//! Handles the read/write loop for a single WebSocket connection: client
//! frames are dispatched to the [`ChatService`], and deliveries arriving in
//! the connection's mailbox are written back as `message` frames.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket};
use futures_util::stream::SplitSink;
use futures_util::{SinkExt, StreamExt};

use super::messages::{ClientFrame, ServerFrame};
use super::subscription::SubscriptionManager;
use crate::domain::{ConnectionId, Delivery, Destination, mailbox};
use crate::error::ChatError;
use crate::service::ChatService;

/// What the loop should do after a client frame.
#[derive(Debug, PartialEq, Eq)]
pub enum Step {
    /// Write these frames and keep reading.
    Reply(Vec<ServerFrame>),
    /// Write these frames, then close the socket.
    Close(Vec<ServerFrame>),
}

/// Runs the read/write loop for a single WebSocket connection.
///
/// The session is registered on entry and torn down on exit, whatever the
/// reason for leaving the loop (close frame, socket error, `disconnect`).
pub async fn run_connection(socket: WebSocket, service: Arc<ChatService>, mailbox_capacity: usize) {
    let (mut ws_tx, mut ws_rx) = socket.split();
    let (mailbox_tx, mut inbox) = mailbox(mailbox_capacity);
    let connection_id = service.open(mailbox_tx);
    let mut subs = SubscriptionManager::new();

    let hello = ServerFrame::Connected {
        connection_id,
        version: env!("CARGO_PKG_VERSION").to_string(),
    };
    if send_frame(&mut ws_tx, &hello).await {
        loop {
            tokio::select! {
                msg = ws_rx.next() => {
                    match msg {
                        Some(Ok(Message::Text(text))) => {
                            let step = handle_text_message(&text, connection_id, &service, &mut subs);
                            let (frames, close) = match step {
                                Step::Reply(frames) => (frames, false),
                                Step::Close(frames) => (frames, true),
                            };
                            if !send_frames(&mut ws_tx, &frames).await || close {
                                let _ = ws_tx.send(Message::Close(None)).await;
                                break;
                            }
                        }
                        Some(Ok(Message::Close(_))) | None => break,
                        Some(Err(err)) => {
                            tracing::debug!(connection_id = %connection_id, error = %err, "ws read error");
                            break;
                        }
                        _ => {}
                    }
                }
                delivery = inbox.recv() => {
                    let Some(delivery) = delivery else { break };
                    if !send_frames(&mut ws_tx, &message_frames(&delivery, &subs)).await {
                        break;
                    }
                }
            }
        }
    }

    let _ = service.close(connection_id);
    tracing::debug!(connection_id = %connection_id, "ws connection closed");
}

/// Handles a text frame from the client.
pub fn handle_text_message(
    text: &str,
    connection_id: ConnectionId,
    service: &ChatService,
    subs: &mut SubscriptionManager,
) -> Step {
    let frame = match serde_json::from_str::<ClientFrame>(text) {
        Ok(frame) => frame,
        Err(err) => return error_step(&ChatError::from(err)),
    };

    match frame {
        ClientFrame::Subscribe {
            id,
            destination,
            receipt,
        } => {
            let destination = match Destination::parse(&destination) {
                Ok(d) => d,
                Err(err) => return error_step(&err),
            };
            if let Err(err) = service.subscribe(connection_id, &destination) {
                return error_step(&err);
            }
            if let Some(previous) = subs.subscribe(&id, destination) {
                service.unsubscribe(connection_id, &previous);
            }
            Step::Reply(receipt_frames(receipt))
        }
        ClientFrame::Unsubscribe { id, receipt } => match subs.unsubscribe(&id) {
            Some(destination) => {
                service.unsubscribe(connection_id, &destination);
                Step::Reply(receipt_frames(receipt))
            }
            None => error_step(&ChatError::UnknownSubscription(id)),
        },
        ClientFrame::Send {
            destination,
            body,
            receipt,
        } => match service.dispatch(connection_id, &destination, body) {
            Ok(_) => Step::Reply(receipt_frames(receipt)),
            Err(err) => {
                tracing::debug!(connection_id = %connection_id, destination = %destination, error = %err, "send rejected");
                error_step(&err)
            }
        },
        ClientFrame::Disconnect { receipt } => Step::Close(receipt_frames(receipt)),
    }
}

/// One `message` frame per subscription id matching the delivery.
fn message_frames(delivery: &Delivery, subs: &SubscriptionManager) -> Vec<ServerFrame> {
    let ids = subs.ids_for(&delivery.destination);
    if ids.is_empty() {
        tracing::trace!(destination = %delivery.destination, "no local subscription, dropping delivery");
    }
    ids.into_iter()
        .map(|id| ServerFrame::Message {
            subscription: id.to_string(),
            destination: delivery.destination.to_string(),
            message_id: uuid::Uuid::new_v4().to_string(),
            timestamp: chrono::Utc::now(),
            body: delivery.message.clone(),
        })
        .collect()
}

fn receipt_frames(receipt: Option<String>) -> Vec<ServerFrame> {
    receipt
        .map(|receipt_id| ServerFrame::Receipt { receipt_id })
        .into_iter()
        .collect()
}

fn error_step(err: &ChatError) -> Step {
    Step::Reply(vec![ServerFrame::from(err)])
}

async fn send_frames(ws_tx: &mut SplitSink<WebSocket, Message>, frames: &[ServerFrame]) -> bool {
    for frame in frames {
        if !send_frame(ws_tx, frame).await {
            return false;
        }
    }
    true
}

/// Serializes and writes one frame. Returns `false` once the socket is gone.
async fn send_frame(ws_tx: &mut SplitSink<WebSocket, Message>, frame: &ServerFrame) -> bool {
    let json = match serde_json::to_string(frame) {
        Ok(json) => json,
        Err(err) => {
            tracing::warn!(error = %err, "failed to encode server frame");
            return true;
        }
    };
    ws_tx.send(Message::text(json)).await.is_ok()
}
