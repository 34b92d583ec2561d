//! Axum Handlers for the HTTP Surface
//!
//! The telephony platform calls `POST /voice` when a call comes in; the
//! returned markup instructs it to open a bidirectional stream to this
//! service's WebSocket endpoint. Request signatures are validated upstream,
//! so the webhook treats its caller as trusted.

use axum::{
    extract::State,
    http::{StatusCode, header},
    response::IntoResponse,
};
use std::sync::Arc;
use tracing::info;

use crate::state::AppState;

/// Builds the stream markup pointing the caller's platform at our socket endpoint.
pub(crate) fn stream_markup(public_host: &str) -> String {
    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<Response><Connect><Stream url=\"wss://{}/ws\"/></Connect></Response>",
        public_host
    )
}

/// Handles the inbound-call webhook from the telephony platform.
pub async fn voice_webhook(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    info!("Inbound call webhook received. Returning stream markup.");
    (
        [(header::CONTENT_TYPE, "text/xml")],
        stream_markup(&state.config.public_host),
    )
}

/// Liveness probe.
pub async fn health() -> StatusCode {
    StatusCode::OK
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stream_markup_points_at_ws_endpoint() {
        let markup = stream_markup("relay.example.com");

        assert!(markup.starts_with("<?xml"));
        assert!(markup.contains("<Response><Connect>"));
        assert!(markup.contains("wss://relay.example.com/ws"));
    }
}
