//! Flashcard generation pipeline: research, one generation call, extraction, count enforcement.

pub mod cardinality;
pub mod extraction;
pub mod pipeline;
pub mod prompt;
pub mod resilience;
