//! Shared Application State
//!
//! This module defines the `AppState` struct, which holds all shared,
//! clonable resources: the injected completion client, the prompt texts,
//! and the loaded configuration.

use crate::config::Config;
use std::sync::Arc;
use voicegate_core::completion::CompletionClient;

/// The shared application state, created once at startup and passed to all handlers.
/// All fields are public to be accessible from other modules.
#[derive(Clone)]
pub struct AppState {
    pub completion_client: Arc<dyn CompletionClient>,
    pub system_prompt: Arc<String>,
    pub greeting: Arc<String>,
    pub config: Arc<Config>,
}
