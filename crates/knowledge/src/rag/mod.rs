//! RAG (Retrieval-Augmented Generation) answering system.
//!
//! Answers questions from retrieved documents only, refusing when nothing
//! relevant was found.

pub mod ask;
pub mod context;
pub mod filter;
pub mod gate;
pub mod generate;
pub mod question;
pub mod types;

pub use ask::{ask, RagSettings};
pub use question::{normalize_question, question_from_request, Question};
pub use types::{AnswerPayload, SourceRef};
