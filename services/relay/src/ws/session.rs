//! Manages the WebSocket connection lifecycle for one phone call.

use super::{
    dispatch::{CallDispatcher, FALLBACK_REPLY},
    emitter::{ReplyEmitter, WsReplyEmitter},
    protocol::{CallEvent, OutboundMessage},
};
use crate::state::AppState;
use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::Response,
};
use futures_util::StreamExt;
use std::sync::Arc;
use tokio::{sync::Mutex, time::timeout};
use tracing::{error, info, instrument, warn};

/// Axum handler to upgrade an HTTP connection to a WebSocket.
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<Arc<AppState>>) -> Response {
    ws.on_upgrade(|socket| handle_socket(socket, state))
}

/// Main handler for an individual call connection.
///
/// Frames are read one at a time; a dispatch must finish before the next
/// frame is polled, which gives per-connection FIFO ordering. A fixed idle
/// timeout closes the socket when the platform goes quiet.
#[instrument(name = "call_session", skip_all, fields(connection_id))]
async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let connection_id: u32 = rand::random();
    tracing::Span::current().record("connection_id", &connection_id.to_string());
    info!("Telephony stream connected.");

    let (socket_tx, mut socket_rx) = socket.split();
    let socket_tx = Arc::new(Mutex::new(socket_tx));
    let emitter: Arc<dyn ReplyEmitter> = Arc::new(WsReplyEmitter::new(socket_tx.clone()));

    let mut dispatcher = CallDispatcher::new(
        state.completion_client.clone(),
        emitter.clone(),
        state.system_prompt.clone(),
        state.greeting.clone(),
        state.config.stream_replies,
        state.config.max_transcript_turns,
    );

    loop {
        let frame = match timeout(state.config.idle_timeout, socket_rx.next()).await {
            Ok(frame) => frame,
            Err(_) => {
                info!("Connection idle for too long. Closing.");
                break;
            }
        };

        match frame {
            Some(Ok(Message::Text(text))) => match serde_json::from_str::<CallEvent>(&text) {
                Ok(event) => {
                    if let Err(e) = dispatcher.dispatch(event).await {
                        error!(error = ?e, "Failed to write to the call channel. Tearing down.");
                        break;
                    }
                }
                Err(e) => {
                    // Malformed events get a generic failure reply; session
                    // state is left untouched.
                    warn!(error = %e, "Malformed inbound event.");
                    if emitter
                        .emit(OutboundMessage::text(FALLBACK_REPLY))
                        .await
                        .is_err()
                    {
                        break;
                    }
                }
            },
            Some(Ok(Message::Close(_))) => {
                info!("Platform closed the stream.");
                break;
            }
            Some(Ok(Message::Ping(_) | Message::Pong(_) | Message::Binary(_))) => {}
            Some(Err(e)) => {
                error!(error = ?e, "Error receiving from the call stream.");
                break;
            }
            None => break,
        }
    }

    info!("Call session terminated.");
}
