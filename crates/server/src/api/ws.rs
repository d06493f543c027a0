//! WebSocket support for live dispatch progress.

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::IntoResponse,
};
use chrono::{DateTime, Utc};
use futures::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use herald_core::DispatchEvent;

use crate::metrics::{WS_CONNECTIONS_ACTIVE, WS_CONNECTIONS_TOTAL, WS_MESSAGES_SENT};
use crate::state::AppState;

/// WebSocket message sent to clients.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WsMessage {
    /// One send finished (successfully or not).
    SendResult {
        sequence: u32,
        phone: String,
        name: String,
        timestamp: DateTime<Utc>,
        success: bool,
        detail: String,
    },
    /// Nothing happened lately; the connection is alive.
    Heartbeat { timestamp: i64 },
}

impl From<DispatchEvent> for WsMessage {
    fn from(event: DispatchEvent) -> Self {
        match event {
            DispatchEvent::Result(entry) => WsMessage::SendResult {
                sequence: entry.sequence,
                phone: entry.phone,
                name: entry.name,
                timestamp: entry.timestamp,
                success: entry.success,
                detail: entry.detail,
            },
            DispatchEvent::Heartbeat { timestamp } => WsMessage::Heartbeat {
                timestamp: timestamp.timestamp(),
            },
        }
    }
}

/// WebSocket upgrade handler.
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_socket(socket, state))
}

/// Handle a single WebSocket connection.
async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let (mut sender, mut receiver) = socket.split();

    // Subscribe to the dispatch event stream
    let mut subscription = state.dispatcher().subscribe();

    WS_CONNECTIONS_TOTAL.inc();
    WS_CONNECTIONS_ACTIVE.inc();

    info!("WebSocket client connected");

    // Forward dispatch events (and heartbeats) to this client
    let send_task = tokio::spawn(async move {
        loop {
            let msg = WsMessage::from(subscription.next().await);
            let msg_type = match &msg {
                WsMessage::SendResult { .. } => "send_result",
                WsMessage::Heartbeat { .. } => "heartbeat",
            };
            WS_MESSAGES_SENT.with_label_values(&[msg_type]).inc();

            match serde_json::to_string(&msg) {
                Ok(json) => {
                    if sender.send(Message::Text(json.into())).await.is_err() {
                        debug!("WebSocket send failed, client disconnected");
                        break;
                    }
                }
                Err(e) => {
                    error!("Failed to serialize WsMessage: {}", e);
                }
            }
        }
    });

    // Handle incoming messages from client (ping/pong, close)
    while let Some(result) = receiver.next().await {
        match result {
            Ok(Message::Close(_)) => {
                debug!("WebSocket client requested close");
                break;
            }
            Ok(Message::Ping(data)) => {
                // Pong is handled automatically by axum
                debug!("Received ping: {:?}", data);
            }
            Ok(Message::Text(text)) => {
                // We don't expect any client messages, but log them
                debug!("Received text message: {}", text);
            }
            Ok(_) => {
                // Ignore other message types
            }
            Err(e) => {
                warn!("WebSocket receive error: {}", e);
                break;
            }
        }
    }

    // Clean up
    send_task.abort();
    WS_CONNECTIONS_ACTIVE.dec();
    info!("WebSocket client disconnected");
}

#[cfg(test)]
mod tests {
    use super::*;
    use herald_core::ResultEntry;

    #[test]
    fn test_send_result_serialization() {
        let entry = ResultEntry {
            sequence: 3,
            phone: "+815011110001".to_string(),
            name: "Aoki".to_string(),
            timestamp: Utc::now(),
            success: true,
            detail: "sent".to_string(),
        };
        let msg = WsMessage::from(DispatchEvent::Result(entry));
        let json = serde_json::to_string(&msg).unwrap();
        assert!(json.contains("\"type\":\"send_result\""));
        assert!(json.contains("\"sequence\":3"));
    }

    #[test]
    fn test_heartbeat_serialization() {
        let msg = WsMessage::from(DispatchEvent::Heartbeat {
            timestamp: Utc::now(),
        });
        let json = serde_json::to_string(&msg).unwrap();
        assert!(json.contains("\"type\":\"heartbeat\""));
    }
}
