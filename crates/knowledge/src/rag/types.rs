//! RAG response types.

use serde::{Deserialize, Serialize};

/// Phrase the model is instructed to emit verbatim when the reference
/// material does not answer the question.
pub const REFUSAL_PHRASE: &str = "I could not find this information in the available documents.";

/// Answer returned when no retrieved document survived relevance gating.
pub const NOT_FOUND_ANSWER: &str = REFUSAL_PHRASE;

/// Answer returned when the topic gate rejects a question.
pub const OUT_OF_DOMAIN_ANSWER: &str =
    "This question is outside the scope of the available documents, so it cannot be answered.";

/// A single source reference used to answer a query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceRef {
    /// Relevance score rounded to 2 decimal places
    pub score: f64,

    /// Display name of the originating document
    pub source: String,
}

impl SourceRef {
    /// Create a source reference, rounding the score for display.
    pub fn new(score: f64, source: impl Into<String>) -> Self {
        Self {
            score: round_score(score),
            source: source.into(),
        }
    }
}

/// Round a relevance score to 2 decimal places.
pub fn round_score(score: f64) -> f64 {
    (score * 100.0).round() / 100.0
}

/// Final payload of one question.
///
/// `sources` is always serialized, as `[]` when nothing grounded the answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnswerPayload {
    /// Generated or fixed answer text
    pub answer: String,

    /// Documents the answer was grounded in, in retrieval order
    pub sources: Vec<SourceRef>,
}

impl AnswerPayload {
    /// Payload for an answer generated from non-empty context.
    pub fn grounded(answer: String, sources: Vec<SourceRef>) -> Self {
        Self { answer, sources }
    }

    /// Payload when no retrieved document was relevant enough.
    pub fn not_found() -> Self {
        Self {
            answer: NOT_FOUND_ANSWER.to_string(),
            sources: Vec::new(),
        }
    }

    /// Payload when the topic gate rejected the question.
    pub fn out_of_domain() -> Self {
        Self {
            answer: OUT_OF_DOMAIN_ANSWER.to_string(),
            sources: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_score() {
        assert_eq!(round_score(2.1), 2.1);
        assert_eq!(round_score(1.23456), 1.23);
        assert_eq!(round_score(0.005), 0.01);
        assert_eq!(round_score(12.999), 13.0);
    }

    #[test]
    fn test_fixed_payloads_have_no_sources() {
        assert!(AnswerPayload::not_found().sources.is_empty());
        assert!(AnswerPayload::out_of_domain().sources.is_empty());
        assert_eq!(AnswerPayload::not_found().answer, REFUSAL_PHRASE);
    }

    #[test]
    fn test_payload_serializes_empty_sources() {
        let json = serde_json::to_value(AnswerPayload::not_found()).unwrap();
        assert_eq!(json["sources"], serde_json::json!([]));
    }

    #[test]
    fn test_payload_keeps_non_ascii_literal() {
        let payload = AnswerPayload::grounded(
            "返金は30日以内です。".to_string(),
            vec![SourceRef::new(2.1, "規約.pdf")],
        );
        let json = serde_json::to_string(&payload).unwrap();
        assert!(json.contains("返金は30日以内です。"));
        assert!(json.contains("規約.pdf"));
        assert!(!json.contains("\\u"));
    }
}
