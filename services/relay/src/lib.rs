//! Voicegate Relay Library Crate
//!
//! This library contains all the core logic for the Voicegate relay service:
//! the application state, configuration, telephony webhook, WebSocket session
//! handling, and routing. The `relay` binary is a thin wrapper around it.

pub mod config;
pub mod handlers;
pub mod router;
pub mod state;
pub mod ws;
