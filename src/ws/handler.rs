use std::sync::Arc;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::models::{ClientEnvelope, ErrorMessage};
use crate::ws::hub::{HubCommand, HubHandle};
use crate::AppState;

/// WebSocket handler
pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(app_state): State<Arc<AppState>>,
) -> Response {
    info!("New WebSocket connection attempt");
    let hub = app_state.hub.clone();
    ws.on_upgrade(move |socket| handle_socket(socket, hub))
}

/// Handle WebSocket connection
///
/// The socket is split into a writer task draining the hub's per-connection
/// outbound queue and a reader task forwarding parsed envelopes into the
/// hub's command queue. Whichever side ends first tears the other down, and
/// the trailing `Detach` plays the role of a final leave.
async fn handle_socket(socket: WebSocket, hub: HubHandle) {
    let conn_id = Uuid::new_v4();
    info!("WebSocket connection established: {}", conn_id);

    let (mut sink, mut stream) = socket.split();
    let (out_tx, mut out_rx) = mpsc::unbounded_channel::<String>();
    hub.send(HubCommand::Attach {
        conn: conn_id,
        outbound: out_tx.clone(),
    });

    let mut send_task = tokio::spawn(async move {
        while let Some(payload) = out_rx.recv().await {
            if sink.send(Message::Text(payload)).await.is_err() {
                break;
            }
        }
    });

    let reader_hub = hub.clone();
    let mut recv_task = tokio::spawn(async move {
        while let Some(Ok(message)) = stream.next().await {
            let text = match message {
                Message::Text(text) => text,
                Message::Close(_) => break,
                // Binary frames and ping/pong are not part of the protocol.
                _ => continue,
            };

            match serde_json::from_str::<ClientEnvelope>(&text) {
                Ok(envelope) => reader_hub.send(HubCommand::Envelope {
                    conn: conn_id,
                    envelope,
                }),
                Err(e) => {
                    warn!("Malformed envelope on connection {}: {}", conn_id, e);
                    let reply = serde_json::to_string(&ErrorMessage {
                        error: format!("Malformed message: {}", e),
                    })
                    .unwrap();
                    let _ = out_tx.send(reply);
                }
            }
        }
    });

    // Wait for either task to finish (and finish the other)
    tokio::select! {
        _ = (&mut send_task) => recv_task.abort(),
        _ = (&mut recv_task) => send_task.abort(),
    };

    hub.send(HubCommand::Detach { conn: conn_id });
    info!("WebSocket connection terminated: {}", conn_id);
}
