use crate::transcript::{Role, Transcript};
use anyhow::{Result, anyhow};
use async_openai::{
    Client,
    config::OpenAIConfig,
    error::OpenAIError,
    types::{
        ChatCompletionRequestAssistantMessageArgs, ChatCompletionRequestMessage,
        ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
        CreateChatCompletionRequestArgs,
    },
};
use async_trait::async_trait;
use futures::{Stream, StreamExt};
use std::pin::Pin;
use tracing::debug;

/// Represents the events that can be yielded from a streaming reply.
#[derive(Debug, Clone)]
pub enum CompletionEvent {
    /// One incremental piece of the assistant's reply.
    Fragment(String),
}

/// A stream of reply fragments from the completion endpoint.
pub type CompletionStream =
    Pin<Box<dyn Stream<Item = Result<CompletionEvent, OpenAIError>> + Send>>;

/// A generic client for obtaining the next assistant reply for a transcript.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Makes a single, non-streaming call and returns the complete reply.
    async fn complete(&self, transcript: &Transcript) -> Result<String>;

    /// Makes a streaming call, yielding the reply as incremental fragments.
    async fn stream(&self, transcript: &Transcript) -> Result<CompletionStream>;
}

/// An implementation of `CompletionClient` for any OpenAI-compatible API.
pub struct OpenAICompatibleClient {
    client: Client<OpenAIConfig>,
    model: String,
}

impl OpenAICompatibleClient {
    /// Creates a new client for an OpenAI-compatible service.
    ///
    /// # Arguments
    ///
    /// * `config` - The client configuration, including API key and base URL.
    /// * `model` - The model identifier to use for chat completions (e.g., "gpt-4o").
    pub fn new(config: OpenAIConfig, model: String) -> Self {
        Self {
            client: Client::with_config(config),
            model,
        }
    }
}

/// Maps the transcript onto the chat-completion request message types.
///
/// Function turns are skipped: the chat endpoint requires a tool call id for
/// function output, which the wire transcript does not carry.
fn request_messages(transcript: &Transcript) -> Result<Vec<ChatCompletionRequestMessage>> {
    let mut messages: Vec<ChatCompletionRequestMessage> =
        Vec::with_capacity(transcript.len());
    for turn in transcript.turns() {
        match turn.role {
            Role::System => messages.push(
                ChatCompletionRequestSystemMessageArgs::default()
                    .content(turn.content.clone())
                    .build()?
                    .into(),
            ),
            Role::User => messages.push(
                ChatCompletionRequestUserMessageArgs::default()
                    .content(turn.content.clone())
                    .build()?
                    .into(),
            ),
            Role::Assistant => messages.push(
                ChatCompletionRequestAssistantMessageArgs::default()
                    .content(turn.content.clone())
                    .build()?
                    .into(),
            ),
            Role::Function => {
                debug!("Skipping function turn in completion request.");
            }
        }
    }
    Ok(messages)
}

#[async_trait]
impl CompletionClient for OpenAICompatibleClient {
    async fn complete(&self, transcript: &Transcript) -> Result<String> {
        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(request_messages(transcript)?)
            .build()?;

        let response = self.client.chat().create(request).await?;
        let choice = response
            .choices
            .first()
            .ok_or_else(|| anyhow!("Completion response contained no choices."))?;

        choice
            .message
            .content
            .clone()
            .ok_or_else(|| anyhow!("Completion response had no text content."))
    }

    async fn stream(&self, transcript: &Transcript) -> Result<CompletionStream> {
        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(request_messages(transcript)?)
            .stream(true)
            .build()?;

        let stream = self.client.chat().create_stream(request).await?;

        Ok(Box::pin(stream.filter_map(|result| async {
            match result {
                Ok(response) => {
                    let choice = response.choices.first()?;
                    if let Some(content) = &choice.delta.content {
                        if !content.is_empty() {
                            return Some(Ok(CompletionEvent::Fragment(content.clone())));
                        }
                    }
                    None
                }
                Err(e) => Some(Err(e)),
            }
        })))
    }
}
