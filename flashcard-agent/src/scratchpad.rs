/// How an observation was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ObservationKind {
    /// Output of a successful tool call.
    Tool,
    /// Corrective feedback after malformed model output.
    Anomaly,
}

/// One Thought/Action/Observation round.
#[derive(Debug, Clone, PartialEq, Eq)]
struct ScratchpadStep {
    model_output: String,
    observation: String,
    kind: ObservationKind,
}

/// Accumulated transcript shown to the model on every iteration.
#[derive(Debug, Clone, Default)]
pub struct Scratchpad {
    steps: Vec<ScratchpadStep>,
}

impl Scratchpad {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_observation(&mut self, model_output: &str, observation: impl Into<String>) {
        self.push(model_output, observation.into(), ObservationKind::Tool);
    }

    pub fn record_anomaly(&mut self, model_output: &str, observation: impl Into<String>) {
        self.push(model_output, observation.into(), ObservationKind::Anomaly);
    }

    fn push(&mut self, model_output: &str, observation: String, kind: ObservationKind) {
        self.steps.push(ScratchpadStep {
            model_output: model_output.trim_end().to_string(),
            observation,
            kind,
        });
    }

    /// Render as the `agent_scratchpad` prompt variable.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for step in &self.steps {
            out.push_str(&step.model_output);
            out.push_str("\nObservation: ");
            out.push_str(&step.observation);
            out.push_str("\nThought: ");
        }
        out
    }

    /// Best text available when the loop stops without a final answer:
    /// every non-empty tool observation, else the last non-empty model output.
    pub fn best_text(&self) -> String {
        let observations: Vec<&str> = self
            .steps
            .iter()
            .filter(|step| step.kind == ObservationKind::Tool)
            .map(|step| step.observation.trim())
            .filter(|text| !text.is_empty())
            .collect();
        if !observations.is_empty() {
            return observations.join("\n\n");
        }

        self.steps
            .iter()
            .rev()
            .map(|step| step.model_output.trim())
            .find(|text| !text.is_empty())
            .unwrap_or_default()
            .to_string()
    }
}
