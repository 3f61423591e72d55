//! Parser for Thought/Action/Action Input/Final Answer model output.

use std::sync::LazyLock;

use regex::Regex;

use flashcard_core::tool::ToolCall;

const FINAL_ANSWER: &str = "Final Answer:";
const OBSERVATION_STOP: &str = "\nObservation:";

static ACTION_WITH_INPUT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)Action\s*\d*\s*:[\s]*(.*?)[\s]*Action\s*\d*\s*Input\s*\d*\s*:[\s]*(.*)")
        .expect("action regex is valid")
});
static ACTION_ONLY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)Action\s*\d*\s*:").expect("action regex is valid"));
static ACTION_INPUT_ONLY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)Action\s*\d*\s*Input\s*\d*\s*:")
        .expect("action input regex is valid")
});

/// What the model decided to do this step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AgentStep {
    Action(ToolCall),
    Finish(String),
}

/// Model output that fits neither an action nor a final answer.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("Missing 'Action:' after 'Thought:'")]
    MissingAction,

    #[error("Missing 'Action Input:' after 'Action:'")]
    MissingActionInput,

    #[error("Parsing LLM output produced both a final answer and a parse-able action")]
    AmbiguousStep,

    #[error("Could not parse LLM output")]
    Unparseable,
}

impl ParseError {
    /// Observation fed back to the model so it can correct itself.
    pub fn observation(&self) -> String {
        format!("Invalid Format: {self}")
    }
}

/// Drop anything the model hallucinated after its own action (the stop sequence).
pub fn cut_at_observation(output: &str) -> &str {
    match output.find(OBSERVATION_STOP) {
        Some(idx) => &output[..idx],
        None => output,
    }
}

/// Parse one model turn into an action or a final answer.
pub fn parse_step(output: &str) -> Result<AgentStep, ParseError> {
    let text = cut_at_observation(output);
    let includes_answer = text.contains(FINAL_ANSWER);

    if let Some(caps) = ACTION_WITH_INPUT.captures(text) {
        if includes_answer {
            return Err(ParseError::AmbiguousStep);
        }
        let tool_id = caps.get(1).map_or("", |m| m.as_str()).trim().to_string();
        let input = caps
            .get(2)
            .map_or("", |m| m.as_str())
            .trim()
            .trim_matches('"')
            .to_string();
        return Ok(AgentStep::Action(ToolCall { tool_id, input }));
    }

    if includes_answer {
        let answer = text
            .rsplit(FINAL_ANSWER)
            .next()
            .unwrap_or_default()
            .trim()
            .to_string();
        return Ok(AgentStep::Finish(answer));
    }

    if !ACTION_ONLY.is_match(text) {
        Err(ParseError::MissingAction)
    } else if !ACTION_INPUT_ONLY.is_match(text) {
        Err(ParseError::MissingActionInput)
    } else {
        Err(ParseError::Unparseable)
    }
}
