use std::collections::HashMap;

use flashcard_core::config::{FlashcardConfig, ModelSlotConfig};
use flashcard_core::error::{FlashcardError, InfraError};

/// Which pipeline stage a model is requested for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelRole {
    Research,
    Generation,
}

/// Maps logical model slot names to model configurations.
pub struct ModelRouter {
    slots: HashMap<String, ModelSlotConfig>,
    research_slot: String,
    generation_slot: String,
}

impl ModelRouter {
    pub fn new(
        slots: HashMap<String, ModelSlotConfig>,
        research_slot: impl Into<String>,
        generation_slot: impl Into<String>,
    ) -> Self {
        Self {
            slots,
            research_slot: research_slot.into(),
            generation_slot: generation_slot.into(),
        }
    }

    pub fn from_config(config: &FlashcardConfig) -> Self {
        Self::new(
            config.models.clone(),
            config.research.model_slot.clone(),
            config.generation.model_slot.clone(),
        )
    }

    /// Resolve a slot name to its model configuration.
    pub fn resolve(&self, slot: &str) -> Result<&ModelSlotConfig, FlashcardError> {
        self.slots.get(slot).ok_or_else(|| {
            FlashcardError::Infra(InfraError::Config(format!(
                "model slot '{slot}' not found in [models]"
            )))
        })
    }

    /// Resolve the slot configured for a pipeline stage.
    pub fn resolve_for(&self, role: ModelRole) -> Result<(&str, &ModelSlotConfig), FlashcardError> {
        let slot_name = self.slot_name(role);
        Ok((slot_name, self.resolve(slot_name)?))
    }

    pub fn slot_name(&self, role: ModelRole) -> &str {
        match role {
            ModelRole::Research => &self.research_slot,
            ModelRole::Generation => &self.generation_slot,
        }
    }

    /// True when both stages resolve to the same slot and can share a client.
    pub fn shares_slot(&self) -> bool {
        self.research_slot == self.generation_slot
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slot(provider: &str, model: &str) -> ModelSlotConfig {
        ModelSlotConfig {
            provider: provider.into(),
            model: model.into(),
            base_url: None,
            temperature: 0.0,
        }
    }

    fn make_router(generation_slot: &str) -> ModelRouter {
        let mut slots = HashMap::new();
        slots.insert("default".into(), slot("openai", "gpt-4o"));
        slots.insert("cheap".into(), slot("groq", "llama-3.1-8b-instant"));
        ModelRouter::new(slots, "default", generation_slot)
    }

    #[test]
    fn resolve_existing_slot() {
        let router = make_router("default");
        let cfg = router.resolve("default").unwrap();
        assert_eq!(cfg.provider, "openai");
        assert_eq!(cfg.model, "gpt-4o");
    }

    #[test]
    fn resolve_missing_slot_errors() {
        let router = make_router("default");
        let err = router.resolve("nonexistent").unwrap_err();
        assert!(err.to_string().contains("model slot 'nonexistent'"));
    }

    #[test]
    fn resolve_for_role_uses_stage_slot() {
        let router = make_router("cheap");
        let (name, cfg) = router.resolve_for(ModelRole::Generation).unwrap();
        assert_eq!(name, "cheap");
        assert_eq!(cfg.provider, "groq");
        assert!(!router.shares_slot());
    }
}
