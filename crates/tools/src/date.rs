//! Current date and time tool.

use async_trait::async_trait;
use colloquy_core::context::CallContext;
use colloquy_core::error::ToolError;
use colloquy_core::tool::Tool;

pub struct DateTool;

#[async_trait]
impl Tool for DateTool {
    fn name(&self) -> &str {
        "get_today_date"
    }

    fn description(&self) -> &str {
        "Get today's date and time in RFC3339 format"
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {}
        })
    }

    async fn execute(&self, _ctx: &CallContext, _arguments: &str) -> Result<String, ToolError> {
        Ok(chrono::Local::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn returns_rfc3339_now() {
        let before = chrono::Utc::now() - chrono::TimeDelta::seconds(2);
        let out = DateTool
            .execute(&CallContext::background(), "{}")
            .await
            .unwrap();

        let parsed = chrono::DateTime::parse_from_rfc3339(&out).unwrap();
        assert!(parsed >= before);
        assert!(parsed <= chrono::Utc::now() + chrono::TimeDelta::seconds(2));
    }

    #[tokio::test]
    async fn ignores_arguments() {
        let out = DateTool
            .execute(&CallContext::background(), "not json")
            .await;
        assert!(out.is_ok());
    }

    #[test]
    fn tool_definition() {
        let def = DateTool.definition();
        assert_eq!(def.name, "get_today_date");
        assert_eq!(def.parameters["type"], "object");
    }
}
