//! Grounding-constrained answer generation.
//!
//! The model is told to answer only from the supplied reference material.
//! Grounding is enforced by instruction alone; the answer is not checked
//! against the context afterwards.

use crate::rag::question::Question;
use crate::rag::types::REFUSAL_PHRASE;
use ragchat_core::{AppError, AppResult};
use ragchat_llm::{ChatMessage, LlmClient, LlmRequest};

/// Sampling settings for grounded generation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationSettings {
    pub temperature: f32,
    pub max_tokens: u32,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            temperature: 0.3,
            max_tokens: 800,
        }
    }
}

/// Build the fixed system instruction.
pub fn build_system_prompt() -> String {
    format!(
        "You are an assistant that answers questions using only the reference material \
         supplied with each question.\n\n\
         Rules:\n\
         - Base your answer solely on the reference material\n\
         - Do not use general knowledge, outside facts or speculation\n\
         - If the reference material does not contain the answer, reply exactly: \"{}\"\n\
         - Keep the answer concise and factual\n",
        REFUSAL_PHRASE
    )
}

/// Build the user message: the question followed by the full context block.
pub fn build_user_prompt(question: &Question, context: &str) -> String {
    format!("Question:\n{}\n\nReference material:\n{}", question, context)
}

/// Build the two-message conversation sent to the generation service.
pub fn build_messages(question: &Question, context: &str) -> Vec<ChatMessage> {
    vec![
        ChatMessage::system(build_system_prompt()),
        ChatMessage::user(build_user_prompt(question, context)),
    ]
}

/// Generate an answer grounded in `context`.
///
/// Returns the generated text verbatim.
pub async fn generate_answer(
    client: &dyn LlmClient,
    question: &Question,
    context: &str,
    settings: GenerationSettings,
) -> AppResult<String> {
    if context.trim().is_empty() {
        return Err(AppError::Internal(
            "generation requested without reference material".to_string(),
        ));
    }

    tracing::debug!(
        "Generating answer with {} (context: {} bytes)",
        client.provider_name(),
        context.len()
    );

    let request = LlmRequest::new(build_messages(question, context))
        .with_temperature(settings.temperature)
        .with_max_tokens(settings.max_tokens);

    let response = client.complete(&request).await?;

    Ok(response.content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ragchat_llm::{ChatRole, LlmResponse, LlmUsage};
    use std::sync::Mutex;

    struct RecordingClient {
        last: Mutex<Option<LlmRequest>>,
    }

    #[async_trait::async_trait]
    impl LlmClient for RecordingClient {
        fn provider_name(&self) -> &str {
            "recording"
        }

        async fn complete(&self, request: &LlmRequest) -> AppResult<LlmResponse> {
            *self.last.lock().unwrap() = Some(request.clone());
            Ok(LlmResponse {
                content: "  verbatim answer \n".to_string(),
                model: "test".to_string(),
                usage: LlmUsage::default(),
                finish_reason: None,
            })
        }
    }

    #[test]
    fn test_system_prompt_forbids_outside_knowledge() {
        let prompt = build_system_prompt();
        assert!(prompt.contains("only the reference material"));
        assert!(prompt.contains("Do not use general knowledge"));
        assert!(prompt.contains(REFUSAL_PHRASE));
    }

    #[test]
    fn test_user_prompt_has_question_then_context() {
        let question = Question::parse("What is the refund policy?").unwrap();
        let prompt = build_user_prompt(&question, "[policy.pdf] Refunds within 30 days.");
        let q_pos = prompt.find("What is the refund policy?").unwrap();
        let c_pos = prompt.find("[policy.pdf] Refunds within 30 days.").unwrap();
        assert!(q_pos < c_pos);
    }

    #[tokio::test]
    async fn test_generate_sends_two_messages_with_low_temperature() {
        let client = RecordingClient {
            last: Mutex::new(None),
        };
        let question = Question::parse("What is the refund policy?").unwrap();

        let answer = generate_answer(
            &client,
            &question,
            "[policy.pdf] Refunds within 30 days.",
            GenerationSettings::default(),
        )
        .await
        .unwrap();
        assert_eq!(answer, "  verbatim answer \n");

        let request = client.last.lock().unwrap().clone().unwrap();
        assert_eq!(request.messages.len(), 2);
        assert_eq!(request.messages[0].role, ChatRole::System);
        assert_eq!(request.messages[1].role, ChatRole::User);
        assert!(request.temperature.unwrap() <= 0.3);
        assert_eq!(request.max_tokens, Some(800));
    }

    #[tokio::test]
    async fn test_generate_refuses_empty_context() {
        let client = RecordingClient {
            last: Mutex::new(None),
        };
        let question = Question::parse("anything").unwrap();

        let err = generate_answer(&client, &question, "  ", GenerationSettings::default())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Internal(_)));
        assert!(client.last.lock().unwrap().is_none());
    }
}
