//! Request-scoped data model: requests, cards, responses and their provenance.

use std::fmt;

use serde::{Deserialize, Serialize, Serializer};

use crate::error::RequestError;

pub const MIN_CARD_COUNT: u32 = 1;
pub const MAX_CARD_COUNT: u32 = 50;

/// A request to generate `count` flashcards about `topic`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub topic: String,
    #[serde(rename = "num_questions", alias = "count")]
    pub count: u32,
    /// Free-text instructions that focus the research.
    #[serde(default, rename = "additional_notes", alias = "notes")]
    pub notes: String,
}

impl GenerationRequest {
    pub fn new(topic: impl Into<String>, count: u32) -> Self {
        Self {
            topic: topic.into(),
            count,
            notes: String::new(),
        }
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = notes.into();
        self
    }

    /// Reject blank topics and counts outside `MIN_CARD_COUNT..=MAX_CARD_COUNT`.
    pub fn validate(&self) -> Result<(), RequestError> {
        self.validate_within(MAX_CARD_COUNT)
    }

    /// Like [`validate`](Self::validate), with a tighter upper bound on the count.
    /// `max_cards` above `MAX_CARD_COUNT` is ignored.
    pub fn validate_within(&self, max_cards: u32) -> Result<(), RequestError> {
        if self.topic.trim().is_empty() {
            return Err(RequestError::EmptyTopic);
        }
        let max = max_cards.clamp(MIN_CARD_COUNT, MAX_CARD_COUNT);
        if !(MIN_CARD_COUNT..=max).contains(&self.count) {
            return Err(RequestError::CountOutOfRange {
                min: MIN_CARD_COUNT,
                max,
                requested: self.count,
            });
        }
        Ok(())
    }
}

/// A single question/answer pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    pub question: String,
    pub answer: String,
}

impl Card {
    pub fn new(question: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            answer: answer.into(),
        }
    }

    pub fn is_well_formed(&self) -> bool {
        !self.question.trim().is_empty() && !self.answer.trim().is_empty()
    }
}

/// Ordered cards; earlier cards are assumed higher-value.
pub type CardSet = Vec<Card>;

/// Why a response is not a full-quality result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Degradation {
    ResearchUnavailable,
    ResearchIncomplete,
    ExtractionFailed,
    Padded { filler: usize },
    CountNotEnforced,
}

impl fmt::Display for Degradation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ResearchUnavailable => f.write_str("research unavailable"),
            Self::ResearchIncomplete => f.write_str("research incomplete"),
            Self::ExtractionFailed => f.write_str("response could not be parsed"),
            Self::Padded { filler: 1 } => f.write_str("padded with 1 filler card"),
            Self::Padded { filler } => write!(f, "padded with {filler} filler cards"),
            Self::CountNotEnforced => f.write_str("card count not enforced"),
        }
    }
}

/// Which quality of data a response was built from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Provenance {
    Full,
    Partial(Vec<Degradation>),
    Emergency,
}

impl Provenance {
    pub fn from_degradations(degradations: Vec<Degradation>) -> Self {
        if degradations.is_empty() {
            Self::Full
        } else {
            Self::Partial(degradations)
        }
    }

    pub fn is_full(&self) -> bool {
        matches!(self, Self::Full)
    }

    pub fn is_emergency(&self) -> bool {
        matches!(self, Self::Emergency)
    }
}

impl fmt::Display for Provenance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Full => f.write_str("Generated based on web search results"),
            Self::Partial(reasons) => {
                let reasons: Vec<String> = reasons.iter().map(ToString::to_string).collect();
                write!(f, "Generated with partial data: {}", reasons.join("; "))
            }
            Self::Emergency => {
                f.write_str("Emergency fallback: limited service, please try again later")
            }
        }
    }
}

impl Serialize for Provenance {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// The pipeline's answer to a `GenerationRequest`.
#[derive(Debug, Clone, Serialize)]
pub struct GenerationResponse {
    pub topic: String,
    pub cards: CardSet,
    #[serde(rename = "source_info")]
    pub provenance: Provenance,
}
