//! Context assembly for grounded generation.

use crate::rag::filter::truncate_excerpt;
use crate::rag::types::SourceRef;
use crate::search::SearchDocument;

/// Separator between labeled fragments in the context block.
const FRAGMENT_SEPARATOR: &str = "\n\n";

/// Reference material built from the surviving candidates, plus the matching
/// source attributions in the same order.
#[derive(Debug, Clone, PartialEq)]
pub struct AssembledContext {
    pub block: String,
    pub sources: Vec<SourceRef>,
}

impl AssembledContext {
    /// True when nothing survived filtering. The caller must answer "not
    /// found" without calling the generator.
    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}

/// Merge relevant documents into one `[name] body` block per document,
/// separated by a blank line.
///
/// Pure function of its input: the same documents always give the same block
/// and the same attributions.
pub fn assemble_context(documents: &[SearchDocument], max_excerpt_chars: usize) -> AssembledContext {
    let fragments: Vec<String> = documents
        .iter()
        .map(|doc| {
            format!(
                "[{}] {}",
                doc.name,
                truncate_excerpt(doc.content.trim(), max_excerpt_chars)
            )
        })
        .collect();

    let sources = documents
        .iter()
        .map(|doc| SourceRef::new(doc.effective_score(), doc.name.clone()))
        .collect();

    AssembledContext {
        block: fragments.join(FRAGMENT_SEPARATOR),
        sources,
    }
}
