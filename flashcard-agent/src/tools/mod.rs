//! Tool registry and the built-in research tools.

mod length;
mod search;

use std::sync::Arc;

use flashcard_core::tool::{SearchClient, Tool, ToolSpec};

pub use length::LengthTool;
pub use search::{DisabledSearchClient, DuckDuckGoSearchClient, NO_RESULTS, WebSearchTool};

/// Named tools visible to the research agent, in registration order.
#[derive(Clone, Default)]
pub struct ToolRegistry {
    tools: Vec<Arc<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The two capabilities the research agent works with: web search and array length.
    pub fn research_defaults(search: Arc<dyn SearchClient>) -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(WebSearchTool::new(search)));
        registry.register(Arc::new(LengthTool));
        registry
    }

    /// Add a tool. A tool with the same name is replaced and returned.
    pub fn register(&mut self, tool: Arc<dyn Tool>) -> Option<Arc<dyn Tool>> {
        let name = tool.spec().name;
        match self.tools.iter().position(|t| t.spec().name == name) {
            Some(idx) => Some(std::mem::replace(&mut self.tools[idx], tool)),
            None => {
                self.tools.push(tool);
                None
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools
            .iter()
            .find(|tool| tool.spec().name == name)
            .cloned()
    }

    pub fn specs(&self) -> Vec<ToolSpec> {
        self.tools.iter().map(|tool| tool.spec()).collect()
    }

    pub fn names(&self) -> Vec<String> {
        self.specs().into_iter().map(|spec| spec.name).collect()
    }

    /// One `name: description` line per tool, for the research prompt.
    pub fn render_descriptions(&self) -> String {
        self.specs()
            .iter()
            .map(|spec| format!("{}: {}", spec.name, spec.description))
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}
