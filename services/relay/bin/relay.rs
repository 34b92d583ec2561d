//! Main Entrypoint for the Voicegate Relay
//!
//! This binary is responsible for:
//! 1. Loading configuration from the environment.
//! 2. Initializing logging.
//! 3. Loading prompt texts and wiring the completion client.
//! 4. Constructing the Axum router.
//! 5. Starting the web server and handling graceful shutdown.

use anyhow::Context;
use async_openai::config::OpenAIConfig;
use std::{fs, net::SocketAddr, path::Path, sync::Arc};
use tracing::info;
use voicegate_core::completion::{CompletionClient, OpenAICompatibleClient};
use voicegate_relay::{
    config::{Config, Provider},
    router::create_router,
    state::AppState,
};

const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful assistant answering a phone call. \
Keep replies short and conversational; they will be read aloud to the caller.";
const DEFAULT_GREETING: &str = "Hello! How can I help you today?";

/// Listens for the `Ctrl+C` signal to gracefully shut down the server.
async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install Ctrl+C handler");
    info!("Received shutdown signal. Shutting down gracefully...");
}

/// Reads `<name>.md` from the prompts directory, falling back to the built-in text.
fn load_prompt(prompts_path: &Path, name: &str, fallback: &str) -> String {
    let path = prompts_path.join(format!("{}.md", name));
    match fs::read_to_string(&path) {
        Ok(content) => content.trim().to_string(),
        Err(_) => {
            info!(prompt = %name, "No prompt file found. Using built-in default.");
            fallback.to_string()
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // --- 1. Load Configuration ---
    let config = Config::from_env().context("Failed to load configuration")?;

    // --- 2. Initialize Logging ---
    tracing_subscriber::fmt()
        .with_max_level(config.log_level)
        .with_timer(tracing_subscriber::fmt::time::ChronoLocal::rfc_3339())
        .init();
    info!("Configuration loaded. Initializing application state...");

    // --- 3. Load Prompts and Wire the Completion Client ---
    let system_prompt = Arc::new(load_prompt(
        &config.prompts_path,
        "system_prompt",
        DEFAULT_SYSTEM_PROMPT,
    ));
    let greeting = Arc::new(load_prompt(&config.prompts_path, "greeting", DEFAULT_GREETING));

    let completion_client: Arc<dyn CompletionClient> = match &config.provider {
        Provider::OpenAI => {
            info!("Using OpenAI provider.");
            let api_key = config
                .openai_api_key
                .as_ref()
                .context("OPENAI_API_KEY is required for the 'openai' provider")?;
            let openai_config = OpenAIConfig::new()
                .with_api_key(api_key)
                .with_api_base("https://api.openai.com/v1/");
            Arc::new(OpenAICompatibleClient::new(
                openai_config,
                config.chat_model.clone(),
            ))
        }
        Provider::Gemini => {
            info!("Using Gemini provider.");
            let api_key = config
                .gemini_api_key
                .as_ref()
                .context("GEMINI_API_KEY is required for the 'gemini' provider")?;
            let openai_config = OpenAIConfig::new()
                .with_api_key(api_key)
                .with_api_base("https://generativelanguage.googleapis.com/v1beta/openai");
            Arc::new(OpenAICompatibleClient::new(
                openai_config,
                config.chat_model.clone(),
            ))
        }
    };

    let app_state = Arc::new(AppState {
        completion_client,
        system_prompt,
        greeting,
        config: Arc::new(config.clone()),
    });

    // --- 4. Create Router ---
    let app = create_router(app_state);

    // --- 5. Start Server ---
    info!(
        provider = ?config.provider,
        model = %config.chat_model,
        bind_address = %config.bind_address,
        streaming = config.stream_replies,
        "Service configured. Starting server..."
    );
    let listener = tokio::net::TcpListener::bind(config.bind_address).await?;

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    info!("Server has shut down.");
    Ok(())
}
