//! RAG answering orchestration.
//!
//! Gates the question, retrieves candidates, filters them by relevance and
//! either answers "not found" or generates an answer grounded in what is left.

use crate::rag::context::assemble_context;
use crate::rag::filter::filter_relevant;
use crate::rag::gate::{check_topic, GateDecision};
use crate::rag::generate::{generate_answer, GenerationSettings};
use crate::rag::question::Question;
use crate::rag::types::AnswerPayload;
use crate::search::SearchClient;
use ragchat_core::{AppConfig, AppResult};
use ragchat_llm::LlmClient;

/// Pipeline settings, derived once from the application configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct RagSettings {
    /// Minimum relevance score a candidate needs
    pub min_score: f64,

    /// Candidates requested from the search service
    pub top_k: u32,

    /// Topic allow-list; empty disables the gate
    pub topic_keywords: Vec<String>,

    /// Excerpt cap per document, in characters
    pub max_excerpt_chars: usize,

    /// Sampling settings for generation
    pub generation: GenerationSettings,
}

impl RagSettings {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            min_score: config.retrieval.min_score,
            top_k: config.retrieval.top_k,
            topic_keywords: config.retrieval.topic_keywords.clone(),
            max_excerpt_chars: config.retrieval.max_excerpt_chars,
            generation: GenerationSettings {
                temperature: config.generation.temperature,
                max_tokens: config.generation.max_tokens,
            },
        }
    }
}

impl Default for RagSettings {
    fn default() -> Self {
        Self::from_config(&AppConfig::default())
    }
}

/// Answer a question from the document index, or refuse.
///
/// This function:
/// 1. Applies the topic gate (no network call on reject)
/// 2. Retrieves candidates from the search service
/// 3. Drops candidates below the relevance threshold or without text
/// 4. Short-circuits with "not found" when nothing survives
/// 5. Generates an answer grounded in the assembled context
/// 6. Attaches the surviving documents as sources
pub async fn ask(
    question: &Question,
    settings: &RagSettings,
    search: &dyn SearchClient,
    llm: &dyn LlmClient,
) -> AppResult<AnswerPayload> {
    tracing::info!("RAG answering for question: {}", question);

    if check_topic(question, &settings.topic_keywords) == GateDecision::Reject {
        tracing::info!("Question rejected by topic gate");
        return Ok(AnswerPayload::out_of_domain());
    }

    let candidates = search.search(question.as_str(), settings.top_k).await?;
    tracing::debug!("Retrieved {} candidates before filtering", candidates.len());

    let relevant = filter_relevant(candidates, settings.min_score);
    let context = assemble_context(&relevant, settings.max_excerpt_chars);

    if context.is_empty() {
        tracing::info!(
            "No relevant documents found (all scores below {:.2} or empty)",
            settings.min_score
        );
        return Ok(AnswerPayload::not_found());
    }

    tracing::info!(
        "Grounding answer in {} documents (top score: {:.2})",
        context.sources.len(),
        context.sources.first().map(|s| s.score).unwrap_or(0.0)
    );

    let answer = generate_answer(llm, question, &context.block, settings.generation).await?;

    Ok(AnswerPayload::grounded(answer, context.sources))
}
