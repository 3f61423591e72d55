use async_trait::async_trait;

use flashcard_core::error::ToolError;
use flashcard_core::tool::{Tool, ToolSpec};

/// Counts the elements of a JSON array, or the characters of any other input.
pub struct LengthTool;

#[async_trait]
impl Tool for LengthTool {
    fn spec(&self) -> ToolSpec {
        ToolSpec {
            name: "Length of an array".into(),
            description: "A helpful tool to calculate the length of an array".into(),
        }
    }

    async fn call(&self, input: &str) -> Result<String, ToolError> {
        let trimmed = input.trim();
        let length = match serde_json::from_str::<serde_json::Value>(trimmed) {
            Ok(serde_json::Value::Array(items)) => items.len(),
            _ => trimmed.chars().count(),
        };
        Ok(length.to_string())
    }
}
