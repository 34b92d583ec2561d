//! The per-call event dispatcher.
//!
//! One `CallDispatcher` exists per WebSocket connection and consumes one
//! inbound event at a time. A call moves `Idle -> Active` on `start`,
//! loops on `Active` for `transcription` and `interruption`, and ends in
//! `Closed` on `stop`. No transition leaves `Closed`; late events are
//! discarded. Events are handled sequentially, so a session never has more
//! than one completion request in flight.

use super::{
    emitter::ReplyEmitter,
    protocol::{CallEvent, OutboundMessage},
};
use anyhow::Result;
use futures_util::StreamExt;
use std::sync::Arc;
use tracing::{debug, info, warn};
use voicegate_core::{
    completion::{CompletionClient, CompletionEvent},
    transcript::{Role, Transcript},
};

/// Spoken to the caller when a reply cannot be produced.
pub(crate) const FALLBACK_REPLY: &str =
    "I apologize, we are experiencing technical difficulties. Please try again.";

/// Where a connection is in its call lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Phase {
    /// Connected, no `start` event seen yet.
    Idle,
    /// A call is live and its transcript is accumulating.
    Active,
    /// The call ended; all further events are discarded.
    Closed,
}

/// State for one live call.
struct CallSession {
    call_sid: String,
    transcript: Transcript,
}

pub(crate) struct CallDispatcher {
    client: Arc<dyn CompletionClient>,
    emitter: Arc<dyn ReplyEmitter>,
    system_prompt: Arc<String>,
    greeting: Arc<String>,
    stream_replies: bool,
    max_turns: usize,
    phase: Phase,
    session: Option<CallSession>,
}

impl CallDispatcher {
    pub(crate) fn new(
        client: Arc<dyn CompletionClient>,
        emitter: Arc<dyn ReplyEmitter>,
        system_prompt: Arc<String>,
        greeting: Arc<String>,
        stream_replies: bool,
        max_turns: usize,
    ) -> Self {
        Self {
            client,
            emitter,
            system_prompt,
            greeting,
            stream_replies,
            max_turns,
            phase: Phase::Idle,
            session: None,
        }
    }

    #[allow(dead_code)]
    pub(crate) fn phase(&self) -> Phase {
        self.phase
    }

    /// Applies one inbound event to the session.
    ///
    /// Provider failures are absorbed here and turned into a fallback reply;
    /// the only errors that propagate are write failures on the outbound
    /// channel, which the session loop treats as fatal for the connection.
    pub(crate) async fn dispatch(&mut self, event: CallEvent) -> Result<()> {
        if self.phase == Phase::Closed {
            debug!("Discarding event received after stop.");
            return Ok(());
        }

        match event {
            CallEvent::Start { call_sid } => self.handle_start(call_sid).await,
            CallEvent::Transcription { text } => self.handle_transcription(text).await,
            CallEvent::Interruption => {
                self.handle_interruption();
                Ok(())
            }
            CallEvent::Stop => {
                self.handle_stop();
                Ok(())
            }
        }
    }

    async fn handle_start(&mut self, call_sid: String) -> Result<()> {
        if self.phase == Phase::Active {
            warn!(%call_sid, "Duplicate start event for an active call. Ignoring.");
            return Ok(());
        }

        let mut transcript = Transcript::new(self.system_prompt.as_str(), self.max_turns);
        transcript.push(Role::Assistant, self.greeting.as_str());

        info!(%call_sid, "Call started.");
        self.session = Some(CallSession {
            call_sid,
            transcript,
        });
        self.phase = Phase::Active;

        self.emitter
            .emit(OutboundMessage::text(self.greeting.as_str()))
            .await
    }

    async fn handle_transcription(&mut self, text: String) -> Result<()> {
        let Some(session) = self.session.as_mut() else {
            warn!("Transcription received before start. Ignoring.");
            return Ok(());
        };
        debug!(call_sid = %session.call_sid, text = %text, "Caller transcription received.");
        session.transcript.push(Role::User, text);

        if self.stream_replies {
            Self::stream_reply(&*self.client, &*self.emitter, session).await
        } else {
            Self::blocking_reply(&*self.client, &*self.emitter, session).await
        }
    }

    async fn blocking_reply(
        client: &dyn CompletionClient,
        emitter: &dyn ReplyEmitter,
        session: &mut CallSession,
    ) -> Result<()> {
        match client.complete(&session.transcript).await {
            Ok(reply) => {
                session.transcript.push(Role::Assistant, reply.clone());
                emitter.emit(OutboundMessage::text(reply)).await
            }
            Err(e) => {
                warn!(
                    call_sid = %session.call_sid,
                    error = ?e,
                    "Completion request failed. Sending fallback reply."
                );
                emitter.emit(OutboundMessage::text(FALLBACK_REPLY)).await
            }
        }
    }

    async fn stream_reply(
        client: &dyn CompletionClient,
        emitter: &dyn ReplyEmitter,
        session: &mut CallSession,
    ) -> Result<()> {
        let mut fragments = match client.stream(&session.transcript).await {
            Ok(stream) => stream,
            Err(e) => {
                warn!(
                    call_sid = %session.call_sid,
                    error = ?e,
                    "Completion stream could not be opened. Sending fallback reply."
                );
                return emitter.emit(OutboundMessage::text(FALLBACK_REPLY)).await;
            }
        };

        let mut reply = String::new();
        while let Some(next) = fragments.next().await {
            match next {
                Ok(CompletionEvent::Fragment(chunk)) => {
                    emitter.emit(OutboundMessage::fragment(chunk.clone())).await?;
                    reply.push_str(&chunk);
                }
                Err(e) => {
                    warn!(
                        call_sid = %session.call_sid,
                        error = ?e,
                        "Reply stream broke mid-flight. Sending fallback reply."
                    );
                    return emitter.emit(OutboundMessage::text(FALLBACK_REPLY)).await;
                }
            }
        }

        if !reply.is_empty() {
            session.transcript.push(Role::Assistant, reply);
        }
        Ok(())
    }

    fn handle_interruption(&mut self) {
        match &self.session {
            Some(session) => {
                // Events are handled sequentially per connection, so no
                // completion call can be in flight here and there is no
                // buffered output left to drop.
                debug!(call_sid = %session.call_sid, "Caller interrupted. Nothing pending to cancel.");
            }
            None => warn!("Interruption received before start. Ignoring."),
        }
    }

    fn handle_stop(&mut self) {
        if let Some(session) = self.session.take() {
            info!(
                call_sid = %session.call_sid,
                turns = session.transcript.len(),
                "Call ended."
            );
        } else {
            debug!("Stop received before start.");
        }
        self.phase = Phase::Closed;
    }
}
