//! Grounded question answering over an external document index.
//!
//! Provides the search client and the RAG pipeline that decides which
//! retrieved documents may ground an answer.

pub mod rag;
pub mod search;

#[cfg(test)]
mod tests;

// Re-export commonly used types
pub use rag::{
    ask, normalize_question, question_from_request, AnswerPayload, Question, RagSettings,
    SourceRef,
};
pub use search::{create_search_client, SearchClient, SearchDocument};
