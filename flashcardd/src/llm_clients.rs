use std::sync::Arc;

use rig::client::CompletionClient;

use flashcard_agent::llm::{LlmClient, RigLlmClient};
use flashcard_agent::model_router::{ModelRole, ModelRouter};
use flashcard_agent::tools::{DisabledSearchClient, DuckDuckGoSearchClient, ToolRegistry};
use flashcard_core::config::{FlashcardConfig, ModelSlotConfig, SearchConfig, SearchProvider};
use flashcard_core::error::{FlashcardError, InfraError};
use flashcard_core::tool::SearchClient;
use flashcard_orchestrator::pipeline::{Pipeline, PipelineSettings};

use crate::mock_llm::ScriptedMockLlmClient;

/// Construct every client named by the config and wire them into one pipeline.
pub fn build_pipeline(config: &FlashcardConfig) -> Result<Pipeline, FlashcardError> {
    let router = ModelRouter::from_config(config);

    let (research_slot, research_cfg) = router.resolve_for(ModelRole::Research)?;
    let research_llm = build_llm_client(research_slot, research_cfg)?;
    let generation_llm = if router.shares_slot() {
        research_llm.clone()
    } else {
        let (slot, cfg) = router.resolve_for(ModelRole::Generation)?;
        build_llm_client(slot, cfg)?
    };

    let search = build_search_client(&config.search)?;
    let registry = ToolRegistry::research_defaults(search);

    tracing::info!(
        research_slot = %router.slot_name(ModelRole::Research),
        generation_slot = %router.slot_name(ModelRole::Generation),
        tools = %registry.names().join(", "),
        "pipeline clients initialized"
    );

    Ok(Pipeline::new(
        research_llm,
        generation_llm,
        registry,
        PipelineSettings::from_config(config),
    ))
}

pub fn build_llm_client(
    slot_name: &str,
    slot: &ModelSlotConfig,
) -> Result<Arc<dyn LlmClient>, FlashcardError> {
    match slot.provider.as_str() {
        "mock" => Ok(Arc::new(ScriptedMockLlmClient)),
        provider => {
            let env_var = resolve_api_key_env_var(provider);
            let key = std::env::var(&env_var).map_err(|_| {
                config_error(format!(
                    "{env_var} is required when model slot '{slot_name}' uses provider='{provider}'"
                ))
            })?;

            let base_url = slot
                .base_url
                .as_deref()
                .or_else(|| default_base_url(provider));

            let client: Result<rig::providers::openai::CompletionsClient, _> =
                if let Some(url) = base_url {
                    rig::providers::openai::CompletionsClient::builder()
                        .api_key(&key)
                        .base_url(url)
                        .build()
                } else if provider == "openai" {
                    rig::providers::openai::CompletionsClient::new(&key)
                } else {
                    return Err(config_error(format!(
                        "provider '{provider}' requires a base_url in model slot '{slot_name}'"
                    )));
                };

            let client =
                client.map_err(|e| config_error(format!("failed to create LLM client: {e}")))?;

            Ok(Arc::new(RigLlmClient::new(
                client.completion_model(&slot.model),
                provider,
                slot.temperature,
            )))
        }
    }
}

pub fn build_search_client(search: &SearchConfig) -> Result<Arc<dyn SearchClient>, FlashcardError> {
    match search.provider {
        SearchProvider::Duckduckgo => {
            let client = DuckDuckGoSearchClient::new(search.timeout, search.max_results)?;
            Ok(Arc::new(client))
        }
        SearchProvider::Disabled => Ok(Arc::new(DisabledSearchClient)),
    }
}

fn default_base_url(provider: &str) -> Option<&'static str> {
    match provider {
        "groq" => Some("https://api.groq.com/openai/v1"),
        "fireworks" => Some("https://api.fireworks.ai/inference/v1"),
        "xai" => Some("https://api.x.ai/v1"),
        "mistral" => Some("https://api.mistral.ai/v1"),
        _ => None,
    }
}

fn resolve_api_key_env_var(provider: &str) -> String {
    match provider {
        "openai" => "OPENAI_API_KEY".into(),
        "groq" => "GROQ_API_KEY".into(),
        "fireworks" => "FIREWORKS_API_KEY".into(),
        "xai" => "XAI_API_KEY".into(),
        "mistral" => "MISTRAL_API_KEY".into(),
        other => format!("{}_API_KEY", other.to_ascii_uppercase().replace('-', "_")),
    }
}

fn config_error(message: String) -> FlashcardError {
    FlashcardError::Infra(InfraError::Config(message))
}
