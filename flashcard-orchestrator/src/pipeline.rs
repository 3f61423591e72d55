//! `Pipeline`: the single entry point from a validated request to a response.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::task::JoinHandle;

use flashcard_agent::llm::LlmClient;
use flashcard_agent::runtime::{ResearchAgent, ResearchOutcome};
use flashcard_agent::tools::ToolRegistry;
use flashcard_core::card::{
    CardSet, Degradation, GenerationRequest, GenerationResponse, MAX_CARD_COUNT, Provenance,
};
use flashcard_core::config::FlashcardConfig;
use flashcard_core::error::{AgentError, FlashcardError, InfraError};

use crate::cardinality::{Enforced, enforce_count};
use crate::extraction::{placeholder_cards, try_extract};
use crate::prompt::{GENERATION_SYSTEM_PROMPT, render_generation_prompt};
use crate::resilience::{
    Guarded, Stage, emergency_response, research_fallback, with_fallback, with_fallback_async,
};

/// Limits applied to each request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineSettings {
    pub max_iterations: u32,
    pub research_timeout: Duration,
    pub generation_timeout: Duration,
    pub max_cards: u32,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            max_iterations: 8,
            research_timeout: Duration::from_secs(120),
            generation_timeout: Duration::from_secs(90),
            max_cards: MAX_CARD_COUNT,
        }
    }
}

impl PipelineSettings {
    pub fn from_config(config: &FlashcardConfig) -> Self {
        Self {
            max_iterations: config.research.max_iterations,
            research_timeout: config.research.timeout,
            generation_timeout: config.generation.timeout,
            max_cards: config.generation.max_cards,
        }
    }
}

/// Aborts the spawned pipeline task if the caller stops waiting for it.
struct AbortOnDrop<T>(JoinHandle<T>);

impl<T> Drop for AbortOnDrop<T> {
    fn drop(&mut self) {
        self.0.abort();
    }
}

/// Research → one generation call → extraction → count enforcement.
///
/// Holds only shared, read-only clients; every request's state lives on its own task.
#[derive(Clone)]
pub struct Pipeline {
    research_llm: Arc<dyn LlmClient>,
    generation_llm: Arc<dyn LlmClient>,
    registry: ToolRegistry,
    settings: PipelineSettings,
}

impl Pipeline {
    pub fn new(
        research_llm: Arc<dyn LlmClient>,
        generation_llm: Arc<dyn LlmClient>,
        registry: ToolRegistry,
        settings: PipelineSettings,
    ) -> Self {
        Self {
            research_llm,
            generation_llm,
            registry,
            settings,
        }
    }

    pub fn settings(&self) -> &PipelineSettings {
        &self.settings
    }

    /// Generate cards for a request. Never fails.
    ///
    /// Callers validate with `GenerationRequest::validate_within(settings().max_cards)` first;
    /// only then is the card count exact and generation a single model call.
    ///
    /// The body runs on its own task so that a panic anywhere below is contained
    /// and answered with the emergency response. Dropping the returned future aborts that task.
    pub async fn generate_flashcards(&self, request: &GenerationRequest) -> GenerationResponse {
        let start = Instant::now();
        let pipeline = self.clone();
        let owned = request.clone();
        let mut task =
            AbortOnDrop(tokio::spawn(async move { pipeline.try_generate(&owned).await }));

        let guarded = with_fallback_async(
            Stage::Pipeline,
            async {
                match (&mut task.0).await {
                    Ok(result) => result,
                    Err(err) => Err(FlashcardError::Infra(InfraError::Join(err.to_string()))),
                }
            },
            || emergency_response(&request.topic, request.count),
        )
        .await;

        tracing::info!(
            topic = %request.topic,
            requested = request.count,
            cards = guarded.value.cards.len(),
            source_info = %guarded.value.provenance,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "flashcards_generated"
        );
        guarded.value
    }

    /// Research a topic. Never fails; falls back to a fixed sentence.
    pub async fn conduct_research(&self, topic: &str, notes: &str) -> String {
        self.guarded_research(topic, notes).await.0
    }

    /// The full pipeline without the top-level boundary.
    pub async fn try_generate(
        &self,
        request: &GenerationRequest,
    ) -> Result<GenerationResponse, FlashcardError> {
        let mut degradations = Vec::new();

        let (research, research_degradation) =
            self.guarded_research(&request.topic, &request.notes).await;
        degradations.extend(research_degradation);

        let response_text = self
            .generate_once(&request.topic, &research, request.count)
            .await?;
        let extracted = self.guarded_extraction(&response_text);
        if extracted.is_degraded() {
            degradations.push(Degradation::ExtractionFailed);
        }

        let cards = match enforce_count(
            extracted.value,
            request.count,
            &request.topic,
            self.settings.max_cards,
        ) {
            Ok(Enforced { cards, filler }) => {
                if filler > 0 {
                    degradations.push(Degradation::Padded { filler });
                }
                cards
            }
            Err(err) => {
                tracing::warn!(
                    stage = %Stage::Enforcement,
                    error = %err,
                    "stage_fallback_engaged"
                );
                degradations.push(Degradation::CountNotEnforced);
                let retry_text = self
                    .generate_once(&request.topic, &research, request.count)
                    .await?;
                let retried = self.guarded_extraction(&retry_text);
                if retried.is_degraded() && !degradations.contains(&Degradation::ExtractionFailed)
                {
                    degradations.push(Degradation::ExtractionFailed);
                }
                retried.value
            }
        };

        Ok(GenerationResponse {
            topic: request.topic.clone(),
            cards,
            provenance: Provenance::from_degradations(degradations),
        })
    }

    async fn guarded_research(&self, topic: &str, notes: &str) -> (String, Option<Degradation>) {
        let guarded = with_fallback_async(
            Stage::Research,
            self.research_within_budget(topic, notes),
            || ResearchOutcome {
                text: research_fallback(topic),
                iterations: 0,
                finished: false,
                anomalies: 0,
            },
        )
        .await;

        let degradation = if guarded.is_degraded() {
            Some(Degradation::ResearchUnavailable)
        } else if !guarded.value.finished {
            Some(Degradation::ResearchIncomplete)
        } else {
            None
        };
        (guarded.value.text, degradation)
    }

    async fn research_within_budget(
        &self,
        topic: &str,
        notes: &str,
    ) -> Result<ResearchOutcome, FlashcardError> {
        let agent = ResearchAgent::new(
            self.research_llm.clone(),
            self.registry.clone(),
            self.settings.max_iterations,
        );
        let budget = self.settings.research_timeout;
        tokio::time::timeout(budget, agent.research(topic, notes))
            .await
            .map_err(|_| AgentError::Timeout {
                stage: "research",
                elapsed: budget,
            })?
    }

    async fn generate_once(
        &self,
        topic: &str,
        research: &str,
        count: u32,
    ) -> Result<String, FlashcardError> {
        let prompt = render_generation_prompt(topic, research, count)?;
        let budget = self.settings.generation_timeout;
        tracing::debug!(topic = %topic, count, "generation_started");

        let response = tokio::time::timeout(
            budget,
            self.generation_llm.complete(GENERATION_SYSTEM_PROMPT, &prompt),
        )
        .await
        .map_err(|_| AgentError::Timeout {
            stage: "generation",
            elapsed: budget,
        })??;

        let text = response.into_text();
        tracing::debug!(response_len = text.len(), "generation_finished");
        Ok(text)
    }

    fn guarded_extraction(&self, response: &str) -> Guarded<CardSet> {
        with_fallback(Stage::Extraction, || try_extract(response), placeholder_cards)
    }
}
