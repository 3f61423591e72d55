use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Notify;
use flashcard_agent::llm::{LlmClient, LlmResponse, MockLlmClient};
use flashcard_agent::tools::{DisabledSearchClient, ToolRegistry};
use flashcard_core::card::{Card, GenerationRequest, Provenance};
use flashcard_core::error::{FlashcardError, ToolError};
use flashcard_core::tool::SearchClient;
use flashcard_orchestrator::extraction::{PLACEHOLDER_ANSWER, PLACEHOLDER_QUESTION};
use flashcard_orchestrator::pipeline::{Pipeline, PipelineSettings};

struct StaticSearch(&'static str);

#[async_trait]
impl SearchClient for StaticSearch {
    async fn search(&self, _query: &str) -> Result<String, ToolError> {
        Ok(self.0.to_string())
    }
}

struct PanickingLlm;

#[async_trait]
impl LlmClient for PanickingLlm {
    async fn complete(
        &self,
        _system_prompt: &str,
        _prompt: &str,
    ) -> Result<LlmResponse, FlashcardError> {
        panic!("generation model exploded");
    }
}

struct SlowLlm;

#[async_trait]
impl LlmClient for SlowLlm {
    async fn complete(
        &self,
        _system_prompt: &str,
        _prompt: &str,
    ) -> Result<LlmResponse, FlashcardError> {
        tokio::time::sleep(Duration::from_secs(30)).await;
        Ok(LlmResponse::text("Final Answer: too late"))
    }
}

struct FailingSearch;

#[async_trait]
impl SearchClient for FailingSearch {
    async fn search(&self, _query: &str) -> Result<String, ToolError> {
        Err(ToolError::ExecutionFailed {
            tool_id: "Web Search".into(),
            message: "connection reset".into(),
        })
    }
}

/// Sets its flag when the pending `complete` future is dropped.
struct DropFlag(Arc<AtomicBool>);

impl Drop for DropFlag {
    fn drop(&mut self) {
        self.0.store(true, Ordering::SeqCst);
    }
}

struct HangingLlm {
    entered: Arc<Notify>,
    dropped: Arc<AtomicBool>,
}

#[async_trait]
impl LlmClient for HangingLlm {
    async fn complete(
        &self,
        _system_prompt: &str,
        _prompt: &str,
    ) -> Result<LlmResponse, FlashcardError> {
        let _flag = DropFlag(self.dropped.clone());
        self.entered.notify_one();
        tokio::time::sleep(Duration::from_secs(30)).await;
        Ok(LlmResponse::text("[]"))
    }
}

fn card_json(n: usize) -> String {
    let cards: Vec<Card> = (1..=n)
        .map(|i| Card::new(format!("Question {i}?"), format!("Answer {i}.")))
        .collect();
    serde_json::to_string_pretty(&cards).unwrap()
}

fn healthy_research() -> Arc<MockLlmClient> {
    Arc::new(MockLlmClient::from_texts([
        "I need facts.\nAction: Web Search\nAction Input: photosynthesis",
        "I now know enough to answer the question\nFinal Answer: Photosynthesis converts light energy into chemical energy in chloroplasts.",
    ]))
}

fn pipeline_with(
    research: Arc<dyn LlmClient>,
    generation: Arc<dyn LlmClient>,
    settings: PipelineSettings,
) -> Pipeline {
    let registry = ToolRegistry::research_defaults(Arc::new(StaticSearch(
        "Photosynthesis takes place in the chloroplasts of plant cells.",
    )));
    Pipeline::new(research, generation, registry, settings)
}

fn pipeline(research: Arc<dyn LlmClient>, generation: Arc<dyn LlmClient>) -> Pipeline {
    pipeline_with(research, generation, PipelineSettings::default())
}

#[tokio::test]
async fn healthy_dependencies_give_full_result() {
    let generation = Arc::new(MockLlmClient::from_texts([format!(
        "```json\n{}\n```",
        card_json(5)
    )]));
    let pipeline = pipeline(healthy_research(), generation.clone());

    let response = pipeline
        .generate_flashcards(&GenerationRequest::new("Photosynthesis", 5))
        .await;

    assert_eq!(response.topic, "Photosynthesis");
    assert_eq!(response.cards.len(), 5);
    assert_eq!(response.cards[0], Card::new("Question 1?", "Answer 1."));
    assert_eq!(response.provenance, Provenance::Full);
    assert_eq!(
        response.provenance.to_string(),
        "Generated based on web search results"
    );

    assert_eq!(generation.call_count(), 1);
    let prompt = &generation.prompts()[0];
    assert!(prompt.contains("Photosynthesis converts light energy into chemical energy"));
    assert!(prompt.contains("generate exactly 5 question-answer pairs"));
}

#[tokio::test]
async fn failing_models_give_emergency_cards() {
    let pipeline = pipeline(
        Arc::new(MockLlmClient::unreachable()),
        Arc::new(MockLlmClient::unreachable()),
    );

    let response = pipeline
        .generate_flashcards(&GenerationRequest::new("Photosynthesis", 5))
        .await;

    assert_eq!(response.cards.len(), 3);
    for (i, card) in response.cards.iter().enumerate() {
        assert_eq!(card.question, format!("Question {} about Photosynthesis", i + 1));
        assert!(card.is_well_formed());
    }
    assert!(response.provenance.is_emergency());
}

#[tokio::test]
async fn research_failure_uses_fixed_sentence() {
    let generation = Arc::new(MockLlmClient::from_texts([card_json(2)]));
    let pipeline = pipeline(Arc::new(MockLlmClient::unreachable()), generation.clone());

    assert_eq!(
        pipeline.conduct_research("Quantum Computing", "").await,
        "Basic information about Quantum Computing."
    );

    let response = pipeline
        .generate_flashcards(&GenerationRequest::new("Quantum Computing", 2))
        .await;
    assert_eq!(response.cards.len(), 2);
    assert_eq!(
        response.provenance.to_string(),
        "Generated with partial data: research unavailable"
    );
    assert!(generation.prompts()[0].contains("CONTEXT:\nBasic information about Quantum Computing.\n"));
}

#[tokio::test]
async fn research_timeout_is_absorbed() {
    let generation = Arc::new(MockLlmClient::from_texts([card_json(1)]));
    let settings = PipelineSettings {
        research_timeout: Duration::from_millis(50),
        ..PipelineSettings::default()
    };
    let pipeline = pipeline_with(Arc::new(SlowLlm), generation, settings);

    let response = pipeline
        .generate_flashcards(&GenerationRequest::new("Mitosis", 1))
        .await;
    assert_eq!(response.cards.len(), 1);
    assert_eq!(
        response.provenance.to_string(),
        "Generated with partial data: research unavailable"
    );
}

#[tokio::test]
async fn unparsable_generation_gives_placeholder() {
    let generation = Arc::new(MockLlmClient::from_texts([
        "Osmosis is the movement of water across a semipermeable membrane.",
    ]));
    let pipeline = pipeline(healthy_research(), generation);

    let response = pipeline
        .generate_flashcards(&GenerationRequest::new("Osmosis", 1))
        .await;

    assert_eq!(
        response.cards,
        vec![Card::new(PLACEHOLDER_QUESTION, PLACEHOLDER_ANSWER)]
    );
    assert_eq!(
        response.provenance.to_string(),
        "Generated with partial data: response could not be parsed"
    );
}

#[tokio::test]
async fn excess_cards_are_truncated_in_order() {
    let generation = Arc::new(MockLlmClient::from_texts([card_json(8)]));
    let pipeline = pipeline(healthy_research(), generation);

    let response = pipeline
        .generate_flashcards(&GenerationRequest::new("Photosynthesis", 3))
        .await;

    let questions: Vec<&str> = response.cards.iter().map(|c| c.question.as_str()).collect();
    assert_eq!(questions, vec!["Question 1?", "Question 2?", "Question 3?"]);
    assert!(response.provenance.is_full());
}

#[tokio::test]
async fn missing_cards_are_padded_after_originals() {
    let generation = Arc::new(MockLlmClient::from_texts([card_json(2)]));
    let pipeline = pipeline(healthy_research(), generation);

    let response = pipeline
        .generate_flashcards(&GenerationRequest::new("Photosynthesis", 4))
        .await;

    assert_eq!(response.cards.len(), 4);
    assert_eq!(response.cards[1], Card::new("Question 2?", "Answer 2."));
    assert_eq!(
        response.cards[2].question,
        "Additional question #3 about Photosynthesis"
    );
    assert_eq!(
        response.cards[3].answer,
        "Further study on Photosynthesis is recommended."
    );
    assert_eq!(
        response.provenance.to_string(),
        "Generated with partial data: padded with 2 filler cards"
    );
}

#[tokio::test]
async fn exhausted_research_is_marked_incomplete() {
    let research = Arc::new(MockLlmClient::from_texts([
        "Action: Web Search\nAction Input: photosynthesis",
        "Action: Web Search\nAction Input: chlorophyll",
    ]));
    let generation = Arc::new(MockLlmClient::from_texts([card_json(2)]));
    let settings = PipelineSettings {
        max_iterations: 2,
        ..PipelineSettings::default()
    };
    let pipeline = pipeline_with(research, generation.clone(), settings);

    let response = pipeline
        .generate_flashcards(&GenerationRequest::new("Photosynthesis", 2))
        .await;

    assert_eq!(response.cards.len(), 2);
    assert_eq!(
        response.provenance.to_string(),
        "Generated with partial data: research incomplete"
    );
    assert!(generation.prompts()[0].contains("Photosynthesis takes place in the chloroplasts"));
}

#[tokio::test]
async fn unvalidated_zero_count_regenerates_without_enforcement() {
    let generation = Arc::new(MockLlmClient::from_texts([card_json(4), card_json(4)]));
    let pipeline = pipeline(healthy_research(), generation.clone());

    let response = pipeline
        .generate_flashcards(&GenerationRequest::new("Photosynthesis", 0))
        .await;

    assert_eq!(generation.call_count(), 2);
    assert_eq!(response.cards.len(), 4);
    assert_eq!(
        response.provenance.to_string(),
        "Generated with partial data: card count not enforced"
    );
}

#[tokio::test]
async fn count_at_configured_limit_is_exact_in_one_call() {
    let generation = Arc::new(MockLlmClient::from_texts([card_json(12)]));
    let settings = PipelineSettings {
        max_cards: 10,
        ..PipelineSettings::default()
    };
    let pipeline = pipeline_with(healthy_research(), generation.clone(), settings);
    let request = GenerationRequest::new("Photosynthesis", 10);
    request
        .validate_within(pipeline.settings().max_cards)
        .unwrap();

    let response = pipeline.generate_flashcards(&request).await;

    assert_eq!(generation.call_count(), 1);
    assert_eq!(response.cards.len(), 10);
    assert!(response.provenance.is_full());
}

#[tokio::test]
async fn failing_search_marks_research_unavailable() {
    let research = Arc::new(MockLlmClient::from_texts([
        "Action: Web Search\nAction Input: photosynthesis",
    ]));
    let generation = Arc::new(MockLlmClient::from_texts([card_json(3)]));
    let registry = ToolRegistry::research_defaults(Arc::new(FailingSearch));
    let pipeline = Pipeline::new(research, generation.clone(), registry, PipelineSettings::default());

    let response = pipeline
        .generate_flashcards(&GenerationRequest::new("Photosynthesis", 3))
        .await;

    assert_eq!(response.cards.len(), 3);
    assert_eq!(response.cards[2], Card::new("Question 3?", "Answer 3."));
    assert_eq!(
        response.provenance.to_string(),
        "Generated with partial data: research unavailable"
    );
    assert!(generation.prompts()[0].contains("Basic information about Photosynthesis."));
}

#[tokio::test]
async fn dropping_the_request_aborts_in_flight_work() {
    let entered = Arc::new(Notify::new());
    let dropped = Arc::new(AtomicBool::new(false));
    let generation = Arc::new(HangingLlm {
        entered: entered.clone(),
        dropped: dropped.clone(),
    });
    let pipeline = pipeline(healthy_research(), generation);
    let request = GenerationRequest::new("Photosynthesis", 2);

    tokio::select! {
        _ = pipeline.generate_flashcards(&request) => panic!("generation should still be pending"),
        _ = entered.notified() => {}
    }

    let deadline = tokio::time::Instant::now() + Duration::from_secs(2);
    while !dropped.load(Ordering::SeqCst) {
        assert!(
            tokio::time::Instant::now() < deadline,
            "generation call kept running after the caller went away"
        );
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}

#[tokio::test]
async fn panic_in_generation_is_contained() {
    let pipeline = pipeline(healthy_research(), Arc::new(PanickingLlm));

    let response = pipeline
        .generate_flashcards(&GenerationRequest::new("Osmosis", 2))
        .await;

    assert_eq!(response.cards.len(), 2);
    assert_eq!(response.cards[1].question, "Question 2 about Osmosis");
    assert!(response.provenance.is_emergency());
}

#[tokio::test]
async fn disabled_search_still_produces_cards() {
    let research = Arc::new(MockLlmClient::from_texts([
        "Action: Web Search\nAction Input: osmosis",
        "Final Answer: Water moves toward higher solute concentration.",
    ]));
    let generation = Arc::new(MockLlmClient::from_texts([card_json(3)]));
    let registry = ToolRegistry::research_defaults(Arc::new(DisabledSearchClient));
    let pipeline = Pipeline::new(research.clone(), generation, registry, PipelineSettings::default());

    let response = pipeline
        .generate_flashcards(&GenerationRequest::new("Osmosis", 3).with_notes("exam prep"))
        .await;

    assert_eq!(response.cards.len(), 3);
    assert!(response.provenance.is_full());
    let research_prompts = research.prompts();
    assert!(research_prompts[0].contains("exam prep"));
    assert!(research_prompts[1].contains("Observation: No good search result found"));
}

#[tokio::test]
async fn every_valid_count_yields_exact_length() {
    for count in [1u32, 7, 50] {
        let generation = Arc::new(MockLlmClient::from_texts([card_json(5)]));
        let pipeline = pipeline(healthy_research(), generation);
        let response = pipeline
            .generate_flashcards(&GenerationRequest::new("Photosynthesis", count))
            .await;
        assert_eq!(response.cards.len(), count as usize);
        assert!(response.cards.iter().all(Card::is_well_formed));
    }
}
