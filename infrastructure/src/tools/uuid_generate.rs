//! uuid_generate: produce random identifiers

use async_trait::async_trait;
use serde_json::{Map, Value};
use taskpilot_application::Tool;
use taskpilot_domain::{ToolCapabilities, ToolContext, ToolDefinition, ToolError, ToolParameter};
use uuid::Uuid;

pub const UUID_GENERATE: &str = "uuid_generate";

const MAX_COUNT: u64 = 20;

pub struct UuidGenerateTool {
    definition: ToolDefinition,
}

impl Default for UuidGenerateTool {
    fn default() -> Self {
        Self::new()
    }
}

impl UuidGenerateTool {
    pub fn new() -> Self {
        Self {
            definition: ToolDefinition::new(
                UUID_GENERATE,
                "Generate one or more random UUIDs (v4), one per line.",
                ToolCapabilities::regular(),
            )
            .with_parameter(
                ToolParameter::new("count", "How many UUIDs to generate (1-20)", false)
                    .with_type("number"),
            ),
        }
    }
}

#[async_trait]
impl Tool for UuidGenerateTool {
    fn definition(&self) -> &ToolDefinition {
        &self.definition
    }

    async fn execute(
        &self,
        args: &Map<String, Value>,
        _ctx: &ToolContext,
    ) -> Result<String, ToolError> {
        let count = match args.get("count") {
            None | Some(Value::Null) => 1,
            Some(value) => value
                .as_u64()
                .filter(|n| (1..=MAX_COUNT).contains(n))
                .ok_or_else(|| {
                    ToolError::invalid_argument(format!(
                        "count must be an integer between 1 and {}",
                        MAX_COUNT
                    ))
                })?,
        };
        let ids: Vec<String> = (0..count).map(|_| Uuid::new_v4().to_string()).collect();
        Ok(ids.join("\n"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_generates_requested_count() {
        let tool = UuidGenerateTool::new();
        let ctx = ToolContext::new("toolcall-1", 0, "p", "p");
        let mut args = Map::new();
        args.insert("count".into(), Value::from(3));

        let output = tool.execute(&args, &ctx).await.unwrap();
        let ids: Vec<&str> = output.lines().collect();
        assert_eq!(ids.len(), 3);
        assert!(ids.iter().all(|id| Uuid::parse_str(id).is_ok()));
    }

    #[tokio::test]
    async fn test_rejects_out_of_range_count() {
        let tool = UuidGenerateTool::new();
        let ctx = ToolContext::new("toolcall-1", 0, "p", "p");
        let mut args = Map::new();
        args.insert("count".into(), Value::from(0));

        assert!(tool.execute(&args, &ctx).await.is_err());
        assert_eq!(tool.execute(&Map::new(), &ctx).await.unwrap().lines().count(), 1);
    }
}
