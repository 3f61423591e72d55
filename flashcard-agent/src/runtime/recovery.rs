use crate::scratchpad::Scratchpad;

use super::ResearchAgent;
use super::parser::ParseError;

impl ResearchAgent {
    /// Feed a format error back to the model as an observation.
    pub(super) fn recover_parse_error(
        &self,
        scratchpad: &mut Scratchpad,
        model_output: &str,
        err: &ParseError,
        iteration: u32,
        anomalies: &mut u32,
    ) {
        *anomalies += 1;
        tracing::warn!(
            iteration,
            anomalies = *anomalies,
            error = %err,
            "research_parse_error_recovered"
        );
        scratchpad.record_anomaly(model_output, err.observation());
    }

    /// Tell the model which tools exist after it asked for one that does not.
    pub(super) fn recover_unknown_tool(
        &self,
        scratchpad: &mut Scratchpad,
        model_output: &str,
        attempted_tool_id: &str,
        iteration: u32,
        anomalies: &mut u32,
    ) {
        *anomalies += 1;
        let available = self.registry.names().join(", ");
        tracing::warn!(
            iteration,
            anomalies = *anomalies,
            attempted_tool_id = %attempted_tool_id,
            available_tools = %available,
            "research_unknown_tool_recovered"
        );
        scratchpad.record_anomaly(
            model_output,
            unknown_tool_observation(attempted_tool_id, &available),
        );
    }
}

pub(super) fn unknown_tool_observation(attempted_tool_id: &str, available: &str) -> String {
    format!("{attempted_tool_id} is not a valid tool, try one of [{available}].")
}
