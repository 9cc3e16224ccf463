//! Command handlers for the ragchat CLI.
//!
//! This module organizes all CLI commands into separate submodules.

pub mod ask;
pub mod serve;

// Re-export command types for convenience
pub use ask::AskCommand;
pub use serve::ServeCommand;

use ragchat_core::{AppConfig, AppResult};
use ragchat_knowledge::{create_search_client, RagSettings};
use std::sync::Arc;

use crate::server::AppState;

/// Build the shared pipeline handles from configuration.
///
/// Missing service credentials are only warned about here; each request then
/// fails with a `ConfigError` naming what is missing.
pub fn build_state(config: &AppConfig) -> AppResult<AppState> {
    let missing = config.missing_settings();
    if !missing.is_empty() {
        tracing::warn!("Missing configuration: {}", missing.join(", "));
    }

    Ok(AppState {
        settings: Arc::new(RagSettings::from_config(config)),
        search: create_search_client(&config.search)?,
        llm: ragchat_llm::create_client(&config.generation)?,
    })
}
