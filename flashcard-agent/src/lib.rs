//! Research agent runtime: Thought/Action/Observation loop over a tool registry.

pub mod llm;
pub mod model_router;
pub mod prompt;
pub mod runtime;
pub mod scratchpad;
pub mod tools;
