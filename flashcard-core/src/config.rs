use std::collections::HashMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::card::MAX_CARD_COUNT;

pub const DEFAULT_MODEL_SLOT: &str = "default";
pub const MAX_RESEARCH_ITERATIONS: u32 = 25;

/// Top-level configuration loaded from TOML.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FlashcardConfig {
    pub global: GlobalConfig,
    #[serde(default)]
    pub otel: OtelConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub models: HashMap<String, ModelSlotConfig>,
    #[serde(default)]
    pub research: ResearchConfig,
    #[serde(default)]
    pub generation: GenerationConfig,
    #[serde(default)]
    pub search: SearchConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GlobalConfig {
    pub instance_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct OtelConfig {
    pub service_name: Option<String>,
    pub otlp_endpoint: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
        }
    }
}

fn default_bind_addr() -> String {
    "127.0.0.1:8000".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelSlotConfig {
    pub provider: String,
    pub model: String,
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default)]
    pub temperature: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ResearchConfig {
    #[serde(default = "default_model_slot")]
    pub model_slot: String,
    #[serde(default = "default_max_iterations")]
    pub max_iterations: u32,
    #[serde(default = "default_research_timeout", with = "humantime_duration")]
    pub timeout: Duration,
}

impl Default for ResearchConfig {
    fn default() -> Self {
        Self {
            model_slot: default_model_slot(),
            max_iterations: default_max_iterations(),
            timeout: default_research_timeout(),
        }
    }
}

fn default_max_iterations() -> u32 {
    8
}

fn default_research_timeout() -> Duration {
    Duration::from_secs(120)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GenerationConfig {
    #[serde(default = "default_model_slot")]
    pub model_slot: String,
    #[serde(default = "default_generation_timeout", with = "humantime_duration")]
    pub timeout: Duration,
    #[serde(default = "default_max_cards")]
    pub max_cards: u32,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            model_slot: default_model_slot(),
            timeout: default_generation_timeout(),
            max_cards: default_max_cards(),
        }
    }
}

fn default_generation_timeout() -> Duration {
    Duration::from_secs(90)
}

fn default_max_cards() -> u32 {
    MAX_CARD_COUNT
}

fn default_model_slot() -> String {
    DEFAULT_MODEL_SLOT.to_string()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SearchProvider {
    #[default]
    Duckduckgo,
    Disabled,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SearchConfig {
    #[serde(default)]
    pub provider: SearchProvider,
    #[serde(default = "default_max_results")]
    pub max_results: usize,
    #[serde(default = "default_search_timeout", with = "humantime_duration")]
    pub timeout: Duration,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            provider: SearchProvider::default(),
            max_results: default_max_results(),
            timeout: default_search_timeout(),
        }
    }
}

fn default_max_results() -> usize {
    5
}

fn default_search_timeout() -> Duration {
    Duration::from_secs(15)
}

/// Serde helper for human-readable durations like "30s", "2m".
mod humantime_duration {
    use serde::{self, Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(&humantime::format_duration(*duration))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        humantime::parse_duration(s.trim())
            .map_err(|err| serde::de::Error::custom(format!("invalid duration '{s}': {err}")))
    }
}
