use flashcard_core::card::{Card, CardSet};
use flashcard_core::error::CardinalityError;

/// Cards after count enforcement, and how many of them are filler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Enforced {
    pub cards: CardSet,
    pub filler: usize,
}

/// Make `cards` exactly `count` long: keep the first `count`, or pad with filler.
pub fn enforce_count(
    mut cards: CardSet,
    count: u32,
    topic: &str,
    max: u32,
) -> Result<Enforced, CardinalityError> {
    if count == 0 || count > max {
        return Err(CardinalityError::CountUnavailable {
            requested: count,
            max,
        });
    }

    let target = count as usize;
    let produced = cards.len();
    if produced > target {
        cards.truncate(target);
        tracing::debug!(produced, kept = target, "truncated excess cards");
        return Ok(Enforced { cards, filler: 0 });
    }

    let filler = target - produced;
    cards.extend((produced..target).map(|i| filler_card(i, topic)));
    if filler > 0 {
        tracing::debug!(produced, filler, "padded cards to requested count");
    }
    Ok(Enforced { cards, filler })
}

fn filler_card(i: usize, topic: &str) -> Card {
    Card::new(
        format!("Additional question #{} about {topic}", i + 1),
        format!("Further study on {topic} is recommended."),
    )
}
