use minijinja::{Environment, context};

use flashcard_core::error::AgentError;

pub const RESEARCH_SYSTEM_PROMPT: &str =
    "You are a research assistant gathering material for educational flashcards.";

const RESEARCH_TEMPLATE: &str = r#"You are a research assistant tasked with finding information about {{ topic }}, strictly in service of helping the user
accomplish the following goal and nothing else:

{{ additional_notes }}

Your goal is to gather comprehensive information about this topic that could be used to create educational flashcards.
If it's a technical topic, related to an IT tool, then:

Think about:
1. Key definitions and core concepts
2. Best practices when using it
3. The architecture of its internals and how they create implementation nuances
4. How you can help the user deeply understand everything
5. Potential technical interview questions

Otherwise:

Think about:
1. Key definitions and concepts
2. Important facts and figures
3. Historical context if relevant
4. Different perspectives or approaches to the topic
5. Recent developments or current understanding

You have access to the following tools:
{{ tools }}

Use the format:
Thought: I need to find out about...
Action: the action to take, should be one of [{{ tool_names }}]
Action Input: the input to the action
Observation: result of the action
... (this Thought/Action/Action Input/Observation can repeat N times)
Thought: I now know enough to answer the question
Final Answer: the comprehensive information about the topic

Thought: {{ agent_scratchpad }}"#;

/// Render the research prompt for one loop iteration.
pub fn render_research_prompt(
    topic: &str,
    additional_notes: &str,
    tools: &str,
    tool_names: &str,
    agent_scratchpad: &str,
) -> Result<String, AgentError> {
    let mut env = Environment::new();
    env.add_template("research", RESEARCH_TEMPLATE)
        .map_err(|e| AgentError::Prompt(e.to_string()))?;
    let tmpl = env
        .get_template("research")
        .map_err(|e| AgentError::Prompt(e.to_string()))?;

    tmpl.render(context! {
        topic => topic,
        additional_notes => additional_notes,
        tools => tools,
        tool_names => tool_names,
        agent_scratchpad => agent_scratchpad,
    })
    .map_err(|e| AgentError::Prompt(e.to_string()))
}
