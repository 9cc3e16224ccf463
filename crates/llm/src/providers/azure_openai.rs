//! Azure OpenAI chat completions provider.
//!
//! API: `POST {endpoint}/openai/deployments/{deployment}/chat/completions?api-version=...`
//! authenticated with an `api-key` header.

use crate::client::{ChatMessage, LlmClient, LlmRequest, LlmResponse, LlmUsage};
use ragchat_core::config::{require, GenerationConfig};
use ragchat_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Longest slice of an upstream error body carried into an error message.
const MAX_ERROR_BODY: usize = 200;

/// Azure chat completions request format.
#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    messages: &'a [ChatMessage],
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

/// Azure chat completions response format.
#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    model: Option<String>,
    #[serde(default)]
    choices: Vec<ChatChoice>,
    #[serde(default)]
    usage: Option<ChatUsage>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatUsage {
    #[serde(default)]
    prompt_tokens: u32,
    #[serde(default)]
    completion_tokens: u32,
}

/// Azure OpenAI LLM client.
pub struct AzureOpenAiClient {
    endpoint: Option<String>,
    api_key: Option<String>,
    deployment: Option<String>,
    api_version: String,

    /// HTTP client
    client: reqwest::Client,
}

impl AzureOpenAiClient {
    /// Create a client from generation settings.
    ///
    /// Missing endpoint, key or deployment are reported when a completion is
    /// attempted, not here.
    pub fn from_config(config: &GenerationConfig) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            endpoint: config.endpoint.clone(),
            api_key: config.api_key.clone(),
            deployment: config.deployment.clone(),
            api_version: config.api_version.clone(),
            client,
        })
    }

    fn completions_url(&self, endpoint: &str, deployment: &str) -> String {
        format!(
            "{}/openai/deployments/{}/chat/completions?api-version={}",
            endpoint.trim_end_matches('/'),
            deployment,
            self.api_version
        )
    }

    /// Convert the first choice of an Azure response to LlmResponse.
    fn convert_response(response: ChatCompletionResponse, deployment: &str) -> AppResult<LlmResponse> {
        let usage = response
            .usage
            .map(|u| LlmUsage::new(u.prompt_tokens, u.completion_tokens))
            .unwrap_or_default();

        let choice = response.choices.into_iter().next().ok_or_else(|| {
            AppError::Generation("generation service returned no choices".to_string())
        })?;

        let content = choice.message.content.ok_or_else(|| {
            AppError::Generation(format!(
                "generation service returned an empty choice (finish_reason: {})",
                choice.finish_reason.as_deref().unwrap_or("unknown")
            ))
        })?;

        Ok(LlmResponse {
            content,
            model: response.model.unwrap_or_else(|| deployment.to_string()),
            usage,
            finish_reason: choice.finish_reason,
        })
    }
}

#[async_trait::async_trait]
impl LlmClient for AzureOpenAiClient {
    fn provider_name(&self) -> &str {
        "azure-openai"
    }

    async fn complete(&self, request: &LlmRequest) -> AppResult<LlmResponse> {
        let endpoint = require(&self.endpoint, "AZURE_OPENAI_ENDPOINT")?;
        let api_key = require(&self.api_key, "AZURE_OPENAI_API_KEY")?;
        let deployment = require(&self.deployment, "AZURE_OPENAI_DEPLOYMENT")?;

        tracing::info!("Sending completion request to Azure OpenAI (deployment: {})", deployment);
        tracing::debug!("Request: {:?}", request);

        let body = ChatCompletionRequest {
            messages: &request.messages,
            temperature: request.temperature,
            max_tokens: request.max_tokens,
        };

        let response = self
            .client
            .post(self.completions_url(endpoint, deployment))
            .header("api-key", api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                AppError::Generation(format!("Failed to reach generation service: {}", e))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            let error_text: String = error_text.chars().take(MAX_ERROR_BODY).collect();
            return Err(AppError::Generation(format!(
                "Azure OpenAI API error ({}): {}",
                status.as_u16(),
                error_text
            )));
        }

        let completion: ChatCompletionResponse = response.json().await.map_err(|e| {
            AppError::Generation(format!("Failed to parse Azure OpenAI response: {}", e))
        })?;

        let response = Self::convert_response(completion, deployment)?;

        tracing::info!("Received completion from Azure OpenAI");
        tracing::debug!(
            "Token usage - Prompt: {}, Completion: {}, Total: {}",
            response.usage.prompt_tokens,
            response.usage.completion_tokens,
            response.usage.total_tokens
        );

        Ok(response)
    }
}
