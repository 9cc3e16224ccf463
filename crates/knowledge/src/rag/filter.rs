//! Relevance filtering of search candidates.
//!
//! The minimum score is the single knob trading recall for hallucination
//! risk. Candidates keep the order the search service returned them in.

use crate::search::SearchDocument;

/// Marker appended to excerpts that were cut short.
const TRUNCATION_MARKER: &str = "...";

/// Keep candidates with `score >= min_score` and non-blank body text.
///
/// A candidate without a usable score counts as scoring zero.
pub fn filter_relevant(candidates: Vec<SearchDocument>, min_score: f64) -> Vec<SearchDocument> {
    let total = candidates.len();

    let kept: Vec<SearchDocument> = candidates
        .into_iter()
        .filter(|doc| {
            let score = doc.effective_score();
            if score < min_score || score.is_nan() {
                tracing::debug!(
                    "Dropping '{}' (score {:.3} below {:.3})",
                    doc.name,
                    score,
                    min_score
                );
                return false;
            }
            if doc.content.trim().is_empty() {
                tracing::debug!("Dropping '{}' (empty body)", doc.name);
                return false;
            }
            true
        })
        .collect();

    tracing::debug!("{} of {} candidates passed relevance filter", kept.len(), total);
    kept
}

/// Share of the kept prefix, at its end, searched for a word boundary.
const BOUNDARY_WINDOW_PERCENT: usize = 15;

/// Cap an excerpt at `max_chars` characters.
///
/// The cut backs up to a whitespace only when one sits near the end of the
/// kept prefix; otherwise it lands exactly on the character limit.
pub fn truncate_excerpt(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }

    let cut = text
        .char_indices()
        .nth(max_chars)
        .map(|(idx, _)| idx)
        .unwrap_or(text.len());
    let truncated = &text[..cut];

    let window = (max_chars * BOUNDARY_WINDOW_PERCENT / 100).max(1);
    let earliest = max_chars.saturating_sub(window);

    let boundary = truncated
        .rfind(char::is_whitespace)
        .filter(|&idx| idx > 0 && truncated[..idx].chars().count() >= earliest);

    match boundary {
        Some(last_space) => {
            format!("{}{}", truncated[..last_space].trim_end(), TRUNCATION_MARKER)
        }
        None => format!("{}{}", truncated, TRUNCATION_MARKER),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(score: Option<f64>, content: &str, name: &str) -> SearchDocument {
        SearchDocument {
            score,
            content: content.to_string(),
            name: name.to_string(),
        }
    }

    #[test]
    fn test_keeps_exactly_matching_candidates_in_order() {
        let candidates = vec![
            doc(Some(0.5), "too low", "a"),
            doc(Some(3.0), "kept first", "b"),
            doc(Some(1.0), "kept at threshold", "c"),
            doc(Some(9.0), "   ", "d"),
            doc(Some(1.5), "kept last", "e"),
        ];

        let kept = filter_relevant(candidates, 1.0);
        let names: Vec<&str> = kept.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["b", "c", "e"]);
    }

    #[test]
    fn test_missing_score_treated_as_zero() {
        let candidates = vec![doc(None, "text", "a")];
        assert!(filter_relevant(candidates.clone(), 1.0).is_empty());
        assert_eq!(filter_relevant(candidates, 0.0).len(), 1);
    }

    #[test]
    fn test_zero_threshold_accepts_any_text() {
        let candidates = vec![
            doc(Some(0.0), "a", "a"),
            doc(Some(0.01), "b", "b"),
            doc(Some(0.0), "", "c"),
        ];
        assert_eq!(filter_relevant(candidates, 0.0).len(), 2);
    }

    #[test]
    fn test_property_over_threshold_grid() {
        let candidates = vec![
            doc(Some(0.3), "x", "a"),
            doc(None, "x", "b"),
            doc(Some(2.1), "x", "c"),
            doc(Some(2.1), "", "d"),
            doc(Some(1.0), "x", "e"),
        ];

        for threshold in [0.0, 0.3, 0.31, 1.0, 2.1, 5.0] {
            let expected: Vec<&SearchDocument> = candidates
                .iter()
                .filter(|d| d.effective_score() >= threshold && !d.content.trim().is_empty())
                .collect();
            let kept = filter_relevant(candidates.clone(), threshold);
            assert_eq!(kept.iter().collect::<Vec<_>>(), expected, "threshold {}", threshold);
        }
    }

    #[test]
    fn test_truncate_short_text_unchanged() {
        assert_eq!(truncate_excerpt("Short text", 100), "Short text");
    }

    #[test]
    fn test_truncate_at_word_boundary() {
        let long = "This is a very long text that needs to be truncated at some point";
        let result = truncate_excerpt(long, 30);
        assert_eq!(result, "This is a very long text that...");
    }

    #[test]
    fn test_truncate_multibyte_without_spaces() {
        let text = "返金は購入後三十日以内に限り受け付けます";
        let result = truncate_excerpt(text, 5);
        assert_eq!(result, "返金は購入...");
    }

    #[test]
    fn test_truncate_ignores_early_space_in_unspaced_text() {
        let text = format!("第1章 {}", "返金は購入後三十日以内に限り受け付けます。".repeat(200));
        let result = truncate_excerpt(&text, 2000);

        assert_eq!(result.chars().count(), 2003);
        assert!(result.starts_with("第1章 返金は"));
        assert!(result.ends_with("..."));
    }

    #[test]
    fn test_truncate_far_space_falls_back_to_char_limit() {
        let result = truncate_excerpt("ab cdefghijklmnopqrstuvwxyz", 20);
        assert_eq!(result, "ab cdefghijklmnopqrs...");
    }
}
