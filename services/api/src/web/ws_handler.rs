//! services/api/src/web/ws_handler.rs
//!
//! WebSocket endpoint that pushes generation progress to the browser.
//! Each connection gets a snapshot of the shell, then every event published
//! on the shared channel until either side closes.

use crate::web::{protocol::ServerMessage, state::AppState};
use axum::{
    extract::{
        ws::{Message, WebSocket},
        State, WebSocketUpgrade,
    },
    response::Response,
};
use futures::{Sink, SinkExt, StreamExt};
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;
use tracing::{error, info, warn};

/// The handler for upgrading HTTP requests to WebSocket connections.
pub async fn ws_handler(ws: WebSocketUpgrade, State(app_state): State<Arc<AppState>>) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, app_state))
}

async fn handle_socket(socket: WebSocket, app_state: Arc<AppState>) {
    info!("New WebSocket connection established.");
    let (mut sender, mut receiver) = socket.split();

    // Subscribe before taking the snapshot so no event falls between the two.
    let mut events = app_state.events.subscribe();
    let snapshot = ServerMessage::Snapshot {
        shell: app_state.shell.lock().await.snapshot(),
    };
    if send_message(&mut sender, &snapshot).await.is_err() {
        error!("Failed to send shell snapshot.");
        return;
    }

    loop {
        tokio::select! {
            incoming = receiver.next() => match incoming {
                Some(Ok(Message::Close(_))) | None => {
                    info!("Client disconnected.");
                    break;
                }
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    warn!("WebSocket receive error: {}", e);
                    break;
                }
            },
            event = events.recv() => match event {
                Ok(message) => {
                    if send_message(&mut sender, &message).await.is_err() {
                        error!("Failed to forward event to client.");
                        break;
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    warn!("WebSocket client lagged behind by {} events.", skipped);
                }
                Err(RecvError::Closed) => break,
            },
        }
    }

    info!("WebSocket connection closed.");
}

async fn send_message<S>(sender: &mut S, message: &ServerMessage) -> Result<(), axum::Error>
where
    S: Sink<Message, Error = axum::Error> + Unpin,
{
    let json = serde_json::to_string(message).map_err(axum::Error::new)?;
    sender.send(Message::Text(json.into())).await
}
