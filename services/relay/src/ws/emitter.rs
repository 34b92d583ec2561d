//! The outbound side of a call session.
//!
//! `ReplyEmitter` is the seam between the dispatcher and the live socket:
//! production code writes JSON text frames, tests substitute a recorder.
//! Writes are fire-and-forget; a failure is a connection-level error and is
//! surfaced to the caller, never retried.

use super::protocol::OutboundMessage;
use anyhow::Result;
use async_trait::async_trait;
use axum::extract::ws::{Message, WebSocket};
use futures_util::{SinkExt, stream::SplitSink};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Pushes structured messages onto the call's channel.
#[async_trait]
pub trait ReplyEmitter: Send + Sync {
    async fn emit(&self, message: OutboundMessage) -> Result<()>;
}

/// Emits messages as JSON text frames on the session's WebSocket.
pub struct WsReplyEmitter {
    sink: Arc<Mutex<SplitSink<WebSocket, Message>>>,
}

impl WsReplyEmitter {
    pub fn new(sink: Arc<Mutex<SplitSink<WebSocket, Message>>>) -> Self {
        Self { sink }
    }
}

#[async_trait]
impl ReplyEmitter for WsReplyEmitter {
    async fn emit(&self, message: OutboundMessage) -> Result<()> {
        let serialized = serde_json::to_string(&message)?;
        let mut sink = self.sink.lock().await;
        sink.send(Message::Text(serialized.into())).await?;
        Ok(())
    }
}
