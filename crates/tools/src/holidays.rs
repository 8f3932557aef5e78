//! Public holidays tool backed by an ICS feed.

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, NaiveTime, Utc};
use colloquy_core::context::CallContext;
use colloquy_core::error::ToolError;
use colloquy_core::tool::Tool;
use serde::Deserialize;

use crate::calendar::{CalendarEvent, load_calendar};

pub struct HolidaysTool {
    feed_url: String,
    client: reqwest::Client,
}

impl HolidaysTool {
    pub fn new(feed_url: impl Into<String>) -> Result<Self, ToolError> {
        Ok(Self {
            feed_url: feed_url.into(),
            client: crate::http_client()?,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
struct HolidaysArgs {
    #[serde(default)]
    before_date: Option<DateTime<FixedOffset>>,
    #[serde(default)]
    after_date: Option<DateTime<FixedOffset>>,
    #[serde(default)]
    max_count: Option<i64>,
}

impl HolidaysArgs {
    fn parse(arguments: &str) -> Result<Self, ToolError> {
        if arguments.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_json::from_str(arguments).map_err(|e| ToolError::InvalidArguments(e.to_string()))
    }

    fn limit(&self) -> Option<usize> {
        self.max_count
            .filter(|&n| n > 0)
            .map(|n| usize::try_from(n).unwrap_or(usize::MAX))
    }
}

/// Apply date bounds and the count limit, rendering `YYYY-MM-DD: name` lines.
fn select_holidays(events: &[CalendarEvent], args: &HolidaysArgs) -> Vec<String> {
    let before = args.before_date.map(|d| d.with_timezone(&Utc));
    let after = args.after_date.map(|d| d.with_timezone(&Utc));

    events
        .iter()
        .filter_map(|event| event.all_day_start.map(|date| (date, event)))
        .filter(|(date, _)| {
            let at = date.and_time(NaiveTime::MIN).and_utc();
            before.is_none_or(|b| at <= b) && after.is_none_or(|a| at >= a)
        })
        .take(args.limit().unwrap_or(usize::MAX))
        .map(|(date, event)| format!("{}: {}", date.format("%Y-%m-%d"), event.summary))
        .collect()
}

#[async_trait]
impl Tool for HolidaysTool {
    fn name(&self) -> &str {
        "get_holidays"
    }

    fn description(&self) -> &str {
        "Gets local bank and public holidays. Each line is a single holiday in the format 'YYYY-MM-DD: Holiday Name'."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "before_date": {
                    "type": "string",
                    "description": "Optional date in RFC3339 format to get holidays before this date. If not provided, all holidays will be returned."
                },
                "after_date": {
                    "type": "string",
                    "description": "Optional date in RFC3339 format to get holidays after this date. If not provided, all holidays will be returned."
                },
                "max_count": {
                    "type": "integer",
                    "description": "Optional maximum number of holidays to return. If not provided, all holidays will be returned."
                }
            }
        })
    }

    async fn execute(&self, ctx: &CallContext, arguments: &str) -> Result<String, ToolError> {
        let args = HolidaysArgs::parse(arguments)?;
        let events = load_calendar(ctx, &self.client, &self.feed_url).await?;
        Ok(select_holidays(&events, &args).join("\n"))
    }
}
