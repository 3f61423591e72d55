use std::net::SocketAddr;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

use flashcard_core::card::MAX_CARD_COUNT;
use flashcard_core::config::{FlashcardConfig, MAX_RESEARCH_ITERATIONS};

/// Load and deserialize config from a TOML file.
pub fn load_config(path: &Path) -> Result<FlashcardConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("reading config: {}", path.display()))?;
    let config: FlashcardConfig =
        toml::from_str(&content).with_context(|| format!("parsing config: {}", path.display()))?;
    Ok(config)
}

/// Validate config for internal consistency:
/// - stage model slots exist in [models]
/// - limits and timeouts are in range
/// - the bind address parses
pub fn validate_config(config: &FlashcardConfig) -> Result<()> {
    for (stage, slot) in [
        ("research", &config.research.model_slot),
        ("generation", &config.generation.model_slot),
    ] {
        if !config.models.contains_key(slot) {
            anyhow::bail!("{stage}.model_slot '{slot}' not found in [models]");
        }
    }

    if !(1..=MAX_RESEARCH_ITERATIONS).contains(&config.research.max_iterations) {
        anyhow::bail!(
            "research.max_iterations must be between 1 and {MAX_RESEARCH_ITERATIONS}, got {}",
            config.research.max_iterations
        );
    }

    if !(1..=MAX_CARD_COUNT).contains(&config.generation.max_cards) {
        anyhow::bail!(
            "generation.max_cards must be between 1 and {MAX_CARD_COUNT}, got {}",
            config.generation.max_cards
        );
    }

    for (name, timeout) in [
        ("research.timeout", config.research.timeout),
        ("generation.timeout", config.generation.timeout),
        ("search.timeout", config.search.timeout),
    ] {
        if timeout.is_zero() {
            anyhow::bail!("{name} must be greater than zero");
        }
    }

    if config.search.max_results == 0 {
        anyhow::bail!("search.max_results must be at least 1");
    }

    config
        .server
        .bind_addr
        .parse::<SocketAddr>()
        .with_context(|| format!("server.bind_addr '{}' is not a socket address", config.server.bind_addr))?;

    for (name, slot) in &config.models {
        if slot.model.trim().is_empty() {
            anyhow::bail!("model slot '{name}' has an empty model name");
        }
        if !(0.0..=2.0).contains(&slot.temperature) {
            anyhow::bail!(
                "model slot '{name}' temperature must be between 0.0 and 2.0, got {}",
                slot.temperature
            );
        }
    }

    info!("config validation passed");
    Ok(())
}
