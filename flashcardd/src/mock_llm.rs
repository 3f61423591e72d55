use std::sync::LazyLock;

use regex::Regex;

use flashcard_agent::llm::{LlmClient, LlmResponse};
use flashcard_core::card::Card;
use flashcard_core::error::{FlashcardError, LlmError};

static RESEARCH_TOPIC: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"finding information about (.+?), strictly").expect("research topic regex is valid")
});
static GENERATION_TOPIC: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"context about "(.*?)""#).expect("generation topic regex is valid")
});
static GENERATION_COUNT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"generate exactly (\d+) question-answer pairs").expect("count regex is valid")
});

/// Offline model for `provider = "mock"`.
///
/// Answers research prompts with an immediate final answer and generation
/// prompts with a JSON array of exactly the requested size.
pub(crate) struct ScriptedMockLlmClient;

#[async_trait::async_trait]
impl LlmClient for ScriptedMockLlmClient {
    async fn complete(
        &self,
        _system_prompt: &str,
        prompt: &str,
    ) -> Result<LlmResponse, FlashcardError> {
        if let Some(caps) = RESEARCH_TOPIC.captures(prompt) {
            let topic = &caps[1];
            return Ok(LlmResponse::text(format!(
                "I now know enough to answer the question\nFinal Answer: {topic} is a subject with key definitions, core concepts and practical applications."
            )));
        }

        if let Some(caps) = GENERATION_COUNT.captures(prompt) {
            let count: usize = caps[1].parse().map_err(|_| {
                FlashcardError::Llm(LlmError::InvalidResponse {
                    reason: "mock could not read requested count".into(),
                })
            })?;
            let topic = GENERATION_TOPIC
                .captures(prompt)
                .map(|caps| caps[1].to_string())
                .unwrap_or_else(|| "the topic".to_string());
            let cards: Vec<Card> = (1..=count)
                .map(|i| {
                    Card::new(
                        format!("What is key fact #{i} about {topic}?"),
                        format!("Key fact #{i} about {topic}, as summarized by the mock model."),
                    )
                })
                .collect();
            let body = serde_json::to_string_pretty(&cards).map_err(|err| {
                FlashcardError::Llm(LlmError::InvalidResponse {
                    reason: err.to_string(),
                })
            })?;
            return Ok(LlmResponse::text(body));
        }

        Ok(LlmResponse::text("Final Answer: mock response"))
    }
}
