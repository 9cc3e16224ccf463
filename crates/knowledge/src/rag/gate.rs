//! Topic gate.
//!
//! Rejects questions that mention none of the allow-listed keywords before
//! any search or generation call is made.

use crate::rag::question::Question;

/// Outcome of the topic gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    Pass,
    Reject,
}

/// Check `question` against the allow-list.
///
/// An empty allow-list disables the gate. Matching is case-sensitive
/// substring containment.
pub fn check_topic(question: &Question, keywords: &[String]) -> GateDecision {
    if keywords.is_empty() {
        return GateDecision::Pass;
    }

    let text = question.as_str();
    match keywords.iter().find(|k| text.contains(k.as_str())) {
        Some(keyword) => {
            tracing::debug!("Topic gate matched keyword '{}'", keyword);
            GateDecision::Pass
        }
        None => GateDecision::Reject,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn q(text: &str) -> Question {
        Question::parse(text).unwrap()
    }

    fn keywords(list: &[&str]) -> Vec<String> {
        list.iter().map(|k| k.to_string()).collect()
    }

    #[test]
    fn test_empty_allow_list_never_rejects() {
        assert_eq!(check_topic(&q("anything at all"), &[]), GateDecision::Pass);
    }

    #[test]
    fn test_matching_keyword_passes() {
        let list = keywords(&["refund", "shipping"]);
        assert_eq!(check_topic(&q("What is the refund policy?"), &list), GateDecision::Pass);
    }

    #[test]
    fn test_no_keyword_rejects() {
        let list = keywords(&["refund", "shipping"]);
        assert_eq!(check_topic(&q("Who won the match?"), &list), GateDecision::Reject);
    }

    #[test]
    fn test_match_is_case_sensitive() {
        let list = keywords(&["Refund"]);
        assert_eq!(check_topic(&q("what is the refund policy?"), &list), GateDecision::Reject);
    }

    #[test]
    fn test_non_ascii_keyword() {
        let list = keywords(&["返金"]);
        assert_eq!(check_topic(&q("返金の条件は？"), &list), GateDecision::Pass);
    }
}
