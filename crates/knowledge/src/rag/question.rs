//! Question extraction from inbound requests.
//!
//! Requests may carry the question in a JSON body (`{"question": ...}`) or in
//! a `question` query parameter. Normalization happens once, here; everything
//! downstream works with a [`Question`].

use ragchat_core::{AppError, AppResult};
use std::fmt;

/// Name of the body key and query parameter holding the question.
pub const QUESTION_KEY: &str = "question";

/// A validated, non-empty question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question(String);

impl Question {
    /// Validate raw text as a question. Whitespace-only text is rejected.
    pub fn parse(raw: &str) -> AppResult<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(missing_question());
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Question {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Pick the question from a structured body or a query parameter.
///
/// The body wins when it holds a non-empty `question` string; otherwise the
/// query parameter is used. A body that is not an object, or whose
/// `question` is not a string, contributes nothing.
pub fn normalize_question(
    body: Option<&serde_json::Value>,
    query_param: Option<&str>,
) -> AppResult<Question> {
    let from_body = body
        .and_then(|b| b.get(QUESTION_KEY))
        .and_then(|v| v.as_str())
        .and_then(|s| Question::parse(s).ok());

    if let Some(question) = from_body {
        return Ok(question);
    }

    query_param
        .and_then(|s| Question::parse(s).ok())
        .ok_or_else(missing_question)
}

/// Like [`normalize_question`], starting from the raw request body bytes.
///
/// A body that is empty or not valid JSON is treated as absent.
pub fn question_from_request(body: &[u8], query_param: Option<&str>) -> AppResult<Question> {
    let parsed = if body.iter().all(u8::is_ascii_whitespace) {
        None
    } else {
        match serde_json::from_slice::<serde_json::Value>(body) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::debug!("Ignoring request body that is not JSON: {}", e);
                None
            }
        }
    };

    normalize_question(parsed.as_ref(), query_param)
}

fn missing_question() -> AppError {
    AppError::BadRequest(
        "question is required, either as a JSON body field or a query parameter".to_string(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_question_parse_trims() {
        let q = Question::parse("  What is the refund policy?\n").unwrap();
        assert_eq!(q.as_str(), "What is the refund policy?");
    }

    #[test]
    fn test_question_parse_rejects_blank() {
        assert!(matches!(Question::parse(""), Err(AppError::BadRequest(_))));
        assert!(matches!(Question::parse(" \t\n"), Err(AppError::BadRequest(_))));
    }

    #[test]
    fn test_body_preferred_over_query() {
        let body = json!({"question": "from body"});
        let q = normalize_question(Some(&body), Some("from query")).unwrap();
        assert_eq!(q.as_str(), "from body");
    }

    #[test]
    fn test_falls_back_to_query() {
        let body = json!({"question": "   "});
        let q = normalize_question(Some(&body), Some("from query")).unwrap();
        assert_eq!(q.as_str(), "from query");

        let q = normalize_question(None, Some("only query")).unwrap();
        assert_eq!(q.as_str(), "only query");
    }

    #[test]
    fn test_non_string_question_ignored() {
        let body = json!({"question": 42});
        assert!(normalize_question(Some(&body), None).is_err());

        let body = json!(["question"]);
        assert!(normalize_question(Some(&body), None).is_err());
    }

    #[test]
    fn test_missing_everywhere_is_bad_request() {
        let body = json!({"query": "wrong key"});
        let err = normalize_question(Some(&body), None).unwrap_err();
        assert!(err.to_string().starts_with("BadRequest: "));
        assert_eq!(err.status_code(), 400);
    }

    #[test]
    fn test_from_raw_body() {
        let body = r#"{"question": "返金ポリシーは？"}"#;
        let q = question_from_request(body.as_bytes(), None).unwrap();
        assert_eq!(q.as_str(), "返金ポリシーは？");

        let q = question_from_request(b"not json", Some("query wins")).unwrap();
        assert_eq!(q.as_str(), "query wins");

        assert!(question_from_request(b"", None).is_err());
    }
}
