//! LLM provider factory.
//!
//! This module creates LLM clients based on application configuration.

use crate::client::LlmClient;
use crate::providers::AzureOpenAiClient;
use ragchat_core::config::GenerationConfig;
use ragchat_core::{AppError, AppResult};
use std::sync::Arc;

/// Create an LLM client for the configured provider.
///
/// # Arguments
/// * `config` - Generation settings; `config.provider` selects the implementation
///
/// # Returns
/// A shared trait object implementing `LlmClient`
///
/// # Errors
/// Returns `ConfigError` if the provider is unknown, or `InternalError` if
/// the HTTP client cannot be built.
pub fn create_client(config: &GenerationConfig) -> AppResult<Arc<dyn LlmClient>> {
    match config.provider.to_lowercase().as_str() {
        "azure-openai" | "azure" => {
            let client = AzureOpenAiClient::from_config(config)?;
            Ok(Arc::new(client))
        }
        _ => Err(AppError::Config(format!(
            "Unknown generation provider: {}. Supported: azure-openai",
            config.provider
        ))),
    }
}
