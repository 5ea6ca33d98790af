//! Completion backend implementations for MindMate.
//!
//! All clients implement the `mindmate_core::CompletionClient` trait.

pub mod openai_compat;
pub mod scripted;

use std::sync::Arc;

use mindmate_config::AppConfig;
use mindmate_core::CompletionClient;

pub use openai_compat::OpenAiCompatClient;
pub use scripted::{ScriptedClient, ScriptedOutcome};

/// Build the completion client described by the configuration.
///
/// The caller is responsible for having verified the API key first; an
/// absent key is passed through as an empty string and will fail
/// authentication at the endpoint.
pub fn build_client(config: &AppConfig) -> Arc<dyn CompletionClient> {
    let name = if config.api_url.contains("groq.com") {
        "groq"
    } else if config.api_url.contains("openai.com") {
        "openai"
    } else {
        "custom"
    };

    Arc::new(OpenAiCompatClient::new(
        name,
        &config.api_url,
        config.resolved_api_key().unwrap_or_default(),
        std::time::Duration::from_secs(config.request_timeout_secs),
    ))
}
