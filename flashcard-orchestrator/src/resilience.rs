//! Failure-containment boundaries: run a stage, substitute a safe value on error, log what failed.

use std::fmt;
use std::future::Future;

use flashcard_core::card::{Card, GenerationResponse, Provenance};

const MAX_EMERGENCY_CARDS: u32 = 3;
const EMERGENCY_ANSWER: &str =
    "We are experiencing technical difficulties generating detailed flashcards. Please try again later.";

/// Pipeline stage guarded by a boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Research,
    Extraction,
    Enforcement,
    Pipeline,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Research => "research",
            Self::Extraction => "extraction",
            Self::Enforcement => "enforcement",
            Self::Pipeline => "pipeline",
        })
    }
}

/// Value produced by a boundary, with the failure it absorbed if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Guarded<T> {
    pub value: T,
    pub failure: Option<String>,
}

impl<T> Guarded<T> {
    pub fn is_degraded(&self) -> bool {
        self.failure.is_some()
    }
}

/// Run `operation`; on error record the failure and return `fallback()` instead.
pub fn with_fallback<T, E, Op, Fb>(stage: Stage, operation: Op, fallback: Fb) -> Guarded<T>
where
    E: fmt::Display,
    Op: FnOnce() -> Result<T, E>,
    Fb: FnOnce() -> T,
{
    absorb(stage, operation(), fallback)
}

/// Async form of [`with_fallback`].
pub async fn with_fallback_async<T, E, Fut, Fb>(
    stage: Stage,
    operation: Fut,
    fallback: Fb,
) -> Guarded<T>
where
    E: fmt::Display,
    Fut: Future<Output = Result<T, E>>,
    Fb: FnOnce() -> T,
{
    absorb(stage, operation.await, fallback)
}

fn absorb<T, E: fmt::Display>(
    stage: Stage,
    result: Result<T, E>,
    fallback: impl FnOnce() -> T,
) -> Guarded<T> {
    match result {
        Ok(value) => Guarded {
            value,
            failure: None,
        },
        Err(err) => {
            let failure = err.to_string();
            tracing::warn!(stage = %stage, error = %failure, "stage_fallback_engaged");
            Guarded {
                value: fallback(),
                failure: Some(failure),
            }
        }
    }
}

/// Research text used when the reasoning loop fails.
pub fn research_fallback(topic: &str) -> String {
    format!("Basic information about {topic}.")
}

/// Generic cards returned when the whole pipeline fails.
pub fn emergency_cards(topic: &str, count: u32) -> Vec<Card> {
    let n = count.clamp(1, MAX_EMERGENCY_CARDS);
    (0..n)
        .map(|i| Card::new(format!("Question {} about {topic}", i + 1), EMERGENCY_ANSWER))
        .collect()
}

pub fn emergency_response(topic: &str, count: u32) -> GenerationResponse {
    GenerationResponse {
        topic: topic.to_string(),
        cards: emergency_cards(topic, count),
        provenance: Provenance::Emergency,
    }
}
