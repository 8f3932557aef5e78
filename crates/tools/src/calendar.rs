//! ICS calendar feed loading.
//!
//! Parsing (line unfolding, parameter quoting, component nesting) is done
//! by `ical`; this module only picks `DTSTART` and `SUMMARY` out of each
//! `VEVENT`.

use std::time::Duration;

use chrono::NaiveDate;
use colloquy_core::context::CallContext;
use colloquy_core::error::ToolError;
use ical::property::Property;
use tracing::debug;

const FEED_TIMEOUT: Duration = Duration::from_secs(30);
const SERVICE: &str = "calendar feed";

/// A single `VEVENT` from a calendar feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarEvent {
    /// Start date, only when `DTSTART` is an all-day value.
    pub all_day_start: Option<NaiveDate>,
    pub summary: String,
}

/// Fetch and parse the calendar at `url`, returning events in feed order.
pub async fn load_calendar(
    ctx: &CallContext,
    client: &reqwest::Client,
    url: &str,
) -> Result<Vec<CalendarEvent>, ToolError> {
    let request = async {
        let response = client
            .get(url)
            .timeout(FEED_TIMEOUT)
            .send()
            .await
            .map_err(|e| ToolError::upstream(SERVICE, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ToolError::UpstreamStatus {
                service: SERVICE.into(),
                status: status.as_u16(),
            });
        }

        response
            .text()
            .await
            .map_err(|e| ToolError::upstream(SERVICE, e))
    };

    let body = ctx.run(request).await??;
    let events = parse_calendar(&body)?;
    debug!(url, events = events.len(), "Loaded calendar");
    Ok(events)
}

/// Parse an ICS document into its events.
///
/// Only `VEVENT`s directly under a `VCALENDAR` are returned; properties of
/// nested components such as `VALARM` never leak into an event.
pub fn parse_calendar(input: &str) -> Result<Vec<CalendarEvent>, ToolError> {
    let mut events = Vec::new();
    let mut calendars = 0;

    for calendar in ical::IcalParser::new(input.as_bytes()) {
        let calendar = calendar.map_err(|e| ToolError::upstream(SERVICE, e))?;
        calendars += 1;
        events.extend(calendar.events.iter().map(|event| to_event(&event.properties)));
    }

    if calendars == 0 {
        return Err(ToolError::upstream(SERVICE, "missing BEGIN:VCALENDAR"));
    }
    Ok(events)
}

fn to_event(properties: &[Property]) -> CalendarEvent {
    let mut event = CalendarEvent {
        all_day_start: None,
        summary: String::new(),
    };

    for property in properties {
        let Some(value) = property.value.as_deref() else {
            continue;
        };
        if property.name.eq_ignore_ascii_case("DTSTART") {
            event.all_day_start = parse_all_day(value, is_date_valued(property));
        } else if property.name.eq_ignore_ascii_case("SUMMARY") {
            event.summary = unescape_text(value);
        }
    }

    event
}

fn is_date_valued(property: &Property) -> bool {
    property
        .params
        .iter()
        .flatten()
        .filter(|(name, _)| name.eq_ignore_ascii_case("VALUE"))
        .any(|(_, values)| values.iter().any(|v| v.eq_ignore_ascii_case("DATE")))
}

fn parse_all_day(value: &str, date_typed: bool) -> Option<NaiveDate> {
    let value = value.trim();
    if !date_typed && value.len() != 8 {
        return None;
    }
    NaiveDate::parse_from_str(value, "%Y%m%d").ok()
}

fn unescape_text(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n' | 'N') => out.push('\n'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}
