//! Recover question/answer pairs from loosely formatted model output.
//!
//! Two stages only: strict JSON, then the first bracketed span. Anything else
//! becomes the placeholder card.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

use flashcard_core::card::{Card, CardSet};
use flashcard_core::error::ExtractionError;

use crate::resilience::{Stage, with_fallback};

pub const PLACEHOLDER_QUESTION: &str = "What is important about this topic?";
pub const PLACEHOLDER_ANSWER: &str =
    "Please consult study resources on this topic for more details.";

static BRACKETED_SPAN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)\[(.*?)\]").expect("bracket regex is valid"));

/// Strict parse, then bracket scan. Errors when neither yields a usable card.
pub fn try_extract(response: &str) -> Result<CardSet, ExtractionError> {
    tracing::debug!(response_len = response.len(), "extraction_started");

    let strict_err = match parse_card_array(response) {
        Ok(cards) => return Ok(cards),
        Err(err) => err,
    };
    tracing::debug!(error = %strict_err, "strict parse failed, scanning for bracketed span");

    let span = BRACKETED_SPAN
        .find(response)
        .ok_or(ExtractionError::NoBracketedSpan)?;
    tracing::debug!(span_len = span.len(), "bracketed span found");
    parse_card_array(span.as_str())
}

/// Total extraction: never fails, falls back to [`placeholder_cards`].
pub fn extract_cards(response: &str) -> CardSet {
    with_fallback(Stage::Extraction, || try_extract(response), placeholder_cards).value
}

pub fn placeholder_cards() -> CardSet {
    vec![Card::new(PLACEHOLDER_QUESTION, PLACEHOLDER_ANSWER)]
}

fn parse_card_array(text: &str) -> Result<CardSet, ExtractionError> {
    let items: Vec<Value> = serde_json::from_str(text.trim())
        .map_err(|err| ExtractionError::NotAnArray(err.to_string()))?;
    let total = items.len();
    let cards: CardSet = items.iter().filter_map(card_from_value).collect();

    if cards.len() < total {
        tracing::debug!(
            dropped = total - cards.len(),
            kept = cards.len(),
            "dropped malformed card entries"
        );
    }
    if cards.is_empty() {
        return Err(ExtractionError::NoUsableCards);
    }
    Ok(cards)
}

fn card_from_value(value: &Value) -> Option<Card> {
    let question = value.get("question")?.as_str()?;
    let answer = value.get("answer")?.as_str()?;
    let card = Card::new(question, answer);
    card.is_well_formed().then_some(card)
}
