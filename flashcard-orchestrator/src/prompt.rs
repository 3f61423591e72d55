use minijinja::{Environment, context};

use flashcard_core::error::AgentError;

pub const GENERATION_SYSTEM_PROMPT: &str =
    "You are a helpful educational assistant that creates flashcards for studying.";

const GENERATION_TEMPLATE: &str = r#"You are a helpful educational assistant that creates flashcards for studying.

Based on the following context about "{{ topic }}", generate exactly {{ count }} question-answer pairs that would make good flashcards.

Make the questions diverse, covering different aspects of the topic.
Ensure questions are clear and specific.
Make answers concise but comprehensive enough to be valuable for learning.

IMPORTANT: You MUST respond in valid JSON format ONLY! Your entire response should be a valid JSON array with objects containing "question" and "answer" fields.

CONTEXT:
{{ context }}

INSTRUCTIONS FOR RESPONSE FORMAT:
You must respond ONLY with a valid JSON array. Each element should be an object with "question" and "answer" properties.
Do not include any text before or after the JSON array.

Example format:
[
  {"question": "What is the definition of an amphibian?", "answer": "A vertebrate animal capable of living both in water and on land."},
  {"question": "What is metamorphosis in amphibians?", "answer": "The transformation process from larval stage to adult form."}
]

Remember to generate exactly {{ count }} question-answer pairs and ensure your output is valid JSON."#;

/// Render the flashcard generation prompt from the research context.
pub fn render_generation_prompt(
    topic: &str,
    context: &str,
    count: u32,
) -> Result<String, AgentError> {
    let mut env = Environment::new();
    env.add_template("generation", GENERATION_TEMPLATE)
        .map_err(|e| AgentError::Prompt(e.to_string()))?;
    let tmpl = env
        .get_template("generation")
        .map_err(|e| AgentError::Prompt(e.to_string()))?;

    tmpl.render(context! {
        topic => topic,
        context => context,
        count => count,
    })
    .map_err(|e| AgentError::Prompt(e.to_string()))
}
