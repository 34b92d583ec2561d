//! WebSocket Call Sessions
//!
//! This module contains the core logic for handling one phone call's
//! event stream over a WebSocket. It is structured into submodules:
//!
//! - `protocol`: Defines the JSON-based message format on the wire.
//! - `emitter`: The outbound side — pushing structured replies onto the socket.
//! - `dispatch`: The per-call state machine reacting to inbound events.
//! - `session`: Manages the connection lifecycle, from upgrade to teardown.

mod dispatch;
pub mod emitter;
pub mod protocol;
pub mod session;

pub use session::ws_handler;
