//! LLM integration crate for ragchat.
//!
//! This crate provides a provider-agnostic abstraction for chat completion
//! services behind the [`LlmClient`] trait.
//!
//! # Providers
//! - **Azure OpenAI**: chat completions against a named deployment
//!
//! # Example
//! ```no_run
//! use ragchat_core::config::GenerationConfig;
//! use ragchat_llm::{create_client, ChatMessage, LlmClient, LlmRequest};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = create_client(&GenerationConfig::default())?;
//! let request = LlmRequest::new(vec![ChatMessage::user("Hello, world!")]);
//! let response = client.complete(&request).await?;
//! println!("{}", response.content);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod factory;
pub mod providers;

// Re-export main types
pub use client::{ChatMessage, ChatRole, LlmClient, LlmRequest, LlmResponse, LlmUsage};
pub use factory::create_client;
pub use providers::AzureOpenAiClient;
