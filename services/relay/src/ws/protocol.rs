//! Defines the WebSocket message protocol between the telephony platform and the relay.

use serde::{Deserialize, Serialize};

/// Events sent from the telephony platform to the relay, one per frame.
///
/// Events may arrive in any order; sequencing is enforced by the dispatcher,
/// not the wire format.
#[derive(Deserialize, Debug)]
#[serde(tag = "event", rename_all = "lowercase")]
pub enum CallEvent {
    /// A new call has been connected to this socket.
    Start {
        #[serde(rename = "callSid")]
        call_sid: String,
    },
    /// A finalized speech-to-text result for the caller's last utterance.
    Transcription { text: String },
    /// The caller started speaking over the assistant.
    Interruption,
    /// The call has ended.
    Stop,
}

/// Messages sent from the relay back to the telephony platform.
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum OutboundMessage {
    /// Text for the platform to speak to the caller.
    Text {
        text: String,
        /// Present and true when this is one fragment of a streamed reply.
        #[serde(skip_serializing_if = "Option::is_none")]
        stream: Option<bool>,
    },
}

impl OutboundMessage {
    /// A complete reply.
    pub fn text(text: impl Into<String>) -> Self {
        OutboundMessage::Text {
            text: text.into(),
            stream: None,
        }
    }

    /// One fragment of a streamed reply.
    pub fn fragment(text: impl Into<String>) -> Self {
        OutboundMessage::Text {
            text: text.into(),
            stream: Some(true),
        }
    }
}
