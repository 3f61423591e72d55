use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use flashcard_core::error::{FlashcardError, InfraError, LlmError};

/// A text completion returned by a model.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LlmResponse {
    /// Text content from the assistant (if any).
    pub text: Option<String>,
}

impl LlmResponse {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
        }
    }

    pub fn into_text(self) -> String {
        self.text.unwrap_or_default()
    }
}

/// Abstraction over text completion used by both the research loop and card generation.
/// This decouples the pipeline from any specific LLM provider.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Perform a single completion call.
    ///
    /// `system_prompt` - the system instruction text (may be empty).
    /// `prompt` - the fully rendered user prompt.
    async fn complete(
        &self,
        system_prompt: &str,
        prompt: &str,
    ) -> Result<LlmResponse, FlashcardError>;
}

/// An LlmClient implementation that wraps a rig CompletionModel.
pub struct RigLlmClient<M: rig::completion::CompletionModel> {
    model: M,
    provider: String,
    temperature: f64,
}

impl<M: rig::completion::CompletionModel> RigLlmClient<M> {
    pub fn new(model: M, provider: impl Into<String>, temperature: f64) -> Self {
        Self {
            model,
            provider: provider.into(),
            temperature,
        }
    }
}

#[async_trait]
impl<M> LlmClient for RigLlmClient<M>
where
    M: rig::completion::CompletionModel + Send + Sync + 'static,
    M::Response: Send + Sync,
{
    async fn complete(
        &self,
        system_prompt: &str,
        prompt: &str,
    ) -> Result<LlmResponse, FlashcardError> {
        let mut builder = self
            .model
            .completion_request(prompt.to_string())
            .temperature(self.temperature);
        if !system_prompt.is_empty() {
            builder = builder.preamble(system_prompt.to_string());
        }
        let request = builder.build();

        let response = self
            .model
            .completion(request)
            .await
            .map_err(|err| map_completion_error(&self.provider, err, prompt))?;

        let mut text: Option<String> = None;
        for content in response.choice.iter() {
            if let rig::message::AssistantContent::Text(t) = content {
                match text.as_mut() {
                    Some(existing) => existing.push_str(&t.text),
                    None => text = Some(t.text.clone()),
                }
            }
        }

        Ok(LlmResponse { text })
    }
}

/// A response the provider sent but we could not read is `InvalidResponse`;
/// everything else means the provider could not be used.
fn map_completion_error(
    provider: &str,
    err: rig::completion::CompletionError,
    prompt: &str,
) -> FlashcardError {
    use rig::completion::CompletionError;

    let err = match err {
        CompletionError::ResponseError(reason) => LlmError::InvalidResponse { reason },
        CompletionError::JsonError(e) => LlmError::InvalidResponse {
            reason: e.to_string(),
        },
        other => LlmError::ProviderUnavailable {
            provider: provider.to_string(),
            reason: format!("{other}\nprompt_preview: {}", truncate_debug(prompt, 500)),
        },
    };
    FlashcardError::Llm(err)
}

pub(crate) fn truncate_debug(value: &str, max_chars: usize) -> String {
    let char_count = value.chars().count();
    if char_count <= max_chars {
        return value.to_string();
    }
    let truncated: String = value.chars().take(max_chars).collect();
    format!("{}...(+{} chars)", truncated, char_count - max_chars)
}

/// A scripted reply for [`MockLlmClient`].
#[derive(Debug, Clone)]
pub enum MockReply {
    Text(String),
    Fail(String),
}

impl MockReply {
    fn into_result(self) -> Result<LlmResponse, FlashcardError> {
        match self {
            Self::Text(text) => Ok(LlmResponse::text(text)),
            Self::Fail(reason) => Err(FlashcardError::Llm(LlmError::ProviderUnavailable {
                provider: "mock".into(),
                reason,
            })),
        }
    }
}

/// A mock LLM client for testing. Replays scripted replies and records prompts.
pub struct MockLlmClient {
    replies: Mutex<VecDeque<MockReply>>,
    when_exhausted: MockReply,
    prompts: Mutex<Vec<String>>,
}

impl MockLlmClient {
    pub fn new(replies: Vec<MockReply>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            when_exhausted: MockReply::Text("No more mock responses".into()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn from_texts<I, S>(texts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(
            texts
                .into_iter()
                .map(|text| MockReply::Text(text.into()))
                .collect(),
        )
    }

    /// A client whose every call fails, as if the endpoint were unreachable.
    pub fn unreachable() -> Self {
        Self {
            replies: Mutex::new(VecDeque::new()),
            when_exhausted: MockReply::Fail("connection refused".into()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Prompts received so far, in call order.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts
            .lock()
            .map(|prompts| prompts.clone())
            .unwrap_or_default()
    }

    pub fn call_count(&self) -> usize {
        self.prompts().len()
    }
}

#[async_trait]
impl LlmClient for MockLlmClient {
    async fn complete(
        &self,
        _system_prompt: &str,
        prompt: &str,
    ) -> Result<LlmResponse, FlashcardError> {
        if let Ok(mut prompts) = self.prompts.lock() {
            prompts.push(prompt.to_string());
        }
        let next = self
            .replies
            .lock()
            .map_err(|_| {
                FlashcardError::Infra(InfraError::Config("mock llm lock poisoned".to_string()))
            })?
            .pop_front();
        next.unwrap_or_else(|| self.when_exhausted.clone())
            .into_result()
    }
}
