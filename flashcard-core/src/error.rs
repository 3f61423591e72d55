use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum FlashcardError {
    #[error("agent error: {0}")]
    Agent(#[from] AgentError),

    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),

    #[error("tool error: {0}")]
    Tool(#[from] ToolError),

    #[error("extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    #[error("cardinality error: {0}")]
    Cardinality(#[from] CardinalityError),

    #[error("infra error: {0}")]
    Infra(#[from] InfraError),
}

#[derive(Debug, thiserror::Error)]
pub enum AgentError {
    #[error("{stage} timed out after {elapsed:?}")]
    Timeout {
        stage: &'static str,
        elapsed: Duration,
    },

    #[error("prompt rendering failed: {0}")]
    Prompt(String),
}

#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("provider {provider} unavailable: {reason}")]
    ProviderUnavailable { provider: String, reason: String },

    #[error("invalid LLM response: {reason}")]
    InvalidResponse { reason: String },
}

#[derive(Debug, Clone, thiserror::Error, serde::Serialize, serde::Deserialize)]
pub enum ToolError {
    #[error("tool {tool_id} execution failed: {message}")]
    ExecutionFailed { tool_id: String, message: String },

    #[error("tool {tool_id} timed out after {elapsed:?}")]
    Timeout { tool_id: String, elapsed: Duration },
}

#[derive(Debug, thiserror::Error)]
pub enum ExtractionError {
    #[error("response is not a JSON array of question/answer pairs: {0}")]
    NotAnArray(String),

    #[error("no bracketed span found in response")]
    NoBracketedSpan,

    #[error("response contained no usable question/answer pairs")]
    NoUsableCards,
}

#[derive(Debug, thiserror::Error)]
pub enum CardinalityError {
    #[error("requested count {requested} is outside 1..={max}")]
    CountUnavailable { requested: u32, max: u32 },
}

#[derive(Debug, thiserror::Error)]
pub enum InfraError {
    #[error("config error: {0}")]
    Config(String),

    #[error("task join error: {0}")]
    Join(String),
}

/// Request shape violations. The only failure class that reaches callers.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RequestError {
    #[error("topic must not be empty")]
    EmptyTopic,

    #[error("num_questions must be an integer between {min} and {max}")]
    CountOutOfRange { min: u32, max: u32, requested: u32 },
}
