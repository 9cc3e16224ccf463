//! Crate-level tests for the answering pipeline.
