//! `ResearchAgent`: Thought/Action/Observation loop until a final answer or the iteration cap.

mod helpers;
pub mod parser;
mod recovery;

use std::sync::Arc;
use std::time::Instant;

use flashcard_core::config::MAX_RESEARCH_ITERATIONS;
use flashcard_core::error::FlashcardError;

use crate::llm::LlmClient;
use crate::prompt::{RESEARCH_SYSTEM_PROMPT, render_research_prompt};
use crate::scratchpad::Scratchpad;
use crate::tools::ToolRegistry;

use helpers::truncate_summary;
use parser::{AgentStep, cut_at_observation, parse_step};

/// Result of one research run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResearchOutcome {
    pub text: String,
    pub iterations: u32,
    /// True when the model emitted a final answer before the cap.
    pub finished: bool,
    /// Malformed steps that were fed back to the model.
    pub anomalies: u32,
}

/// Reasoning loop over a tool registry.
pub struct ResearchAgent {
    llm: Arc<dyn LlmClient>,
    registry: ToolRegistry,
    max_iterations: u32,
}

impl ResearchAgent {
    pub fn new(llm: Arc<dyn LlmClient>, registry: ToolRegistry, max_iterations: u32) -> Self {
        Self {
            llm,
            registry,
            max_iterations: max_iterations.clamp(1, MAX_RESEARCH_ITERATIONS),
        }
    }

    pub fn max_iterations(&self) -> u32 {
        self.max_iterations
    }

    /// Research a topic. Model and tool failures propagate; malformed steps do not.
    pub async fn research(
        &self,
        topic: &str,
        notes: &str,
    ) -> Result<ResearchOutcome, FlashcardError> {
        let start = Instant::now();
        let tools = self.registry.render_descriptions();
        let tool_names = self.registry.names().join(", ");
        let mut scratchpad = Scratchpad::new();
        let mut anomalies: u32 = 0;

        tracing::info!(
            topic = %topic,
            max_iterations = self.max_iterations,
            "research_started"
        );

        for iteration in 1..=self.max_iterations {
            let prompt =
                render_research_prompt(topic, notes, &tools, &tool_names, &scratchpad.render())?;

            tracing::debug!(iteration, "thinking: calling LLM");
            let raw = self
                .llm
                .complete(RESEARCH_SYSTEM_PROMPT, &prompt)
                .await?
                .into_text();
            let output = cut_at_observation(&raw);

            match parse_step(output) {
                Ok(AgentStep::Finish(answer)) => {
                    tracing::info!(
                        iterations = iteration,
                        anomalies,
                        elapsed_ms = start.elapsed().as_millis() as u64,
                        answer = %truncate_summary(&answer, 200),
                        "research_completed"
                    );
                    return Ok(ResearchOutcome {
                        text: answer,
                        iterations: iteration,
                        finished: true,
                        anomalies,
                    });
                }
                Ok(AgentStep::Action(call)) => {
                    let Some(tool) = self.registry.get(&call.tool_id) else {
                        self.recover_unknown_tool(
                            &mut scratchpad,
                            output,
                            &call.tool_id,
                            iteration,
                            &mut anomalies,
                        );
                        continue;
                    };

                    tracing::debug!(
                        iteration,
                        tool_id = %call.tool_id,
                        input = %truncate_summary(&call.input, 120),
                        "acting: executing tool call"
                    );
                    let observation = tool.call(&call.input).await.inspect_err(|err| {
                        tracing::warn!(
                            iteration,
                            tool_id = %call.tool_id,
                            error = %err,
                            "research_tool_failed"
                        );
                    })?;
                    scratchpad.record_observation(output, observation);
                }
                Err(err) => {
                    self.recover_parse_error(&mut scratchpad, output, &err, iteration, &mut anomalies);
                }
            }
        }

        let text = scratchpad.best_text();
        tracing::warn!(
            iterations = self.max_iterations,
            anomalies,
            text_len = text.len(),
            "research_iterations_exhausted"
        );
        Ok(ResearchOutcome {
            text,
            iterations: self.max_iterations,
            finished: false,
            anomalies,
        })
    }
}
