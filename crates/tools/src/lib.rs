//! Built-in tool implementations for Colloquy.
//!
//! Tools give the assistant access to live data: today's date, the public
//! holiday calendar, current weather conditions, and stock quotes.
//!
//! Weather and stock tools need an API key; without one they are left out
//! of the registry and a warning is logged.

pub mod calendar;
pub mod date;
pub mod holidays;
pub mod stock;
pub mod weather;

use colloquy_config::ToolsConfig;
use colloquy_core::error::ToolError;
use colloquy_core::tool::ToolRegistry;
use tracing::{info, warn};

pub use date::DateTool;
pub use holidays::HolidaysTool;
pub use stock::StockTool;
pub use weather::WeatherTool;

/// Build the tool registry from configuration.
///
/// Registration order: weather, stock, date, holidays.
pub fn build_registry(config: &ToolsConfig) -> Result<ToolRegistry, ToolError> {
    let mut registry = ToolRegistry::new();

    match &config.weather_api_key {
        Some(key) => {
            registry.register(Box::new(WeatherTool::new(key, &config.weather_api_url)?));
            info!(tool = "get_weather", "Registered tool");
        }
        None => warn!("WEATHER_API_KEY not set, weather tool disabled"),
    }

    match &config.stock_api_key {
        Some(key) => {
            registry.register(Box::new(StockTool::new(key, &config.stock_api_url)?));
            info!(tool = "get_stock_price", "Registered tool");
        }
        None => warn!("STOCK_API_KEY not set, stock tool disabled"),
    }

    registry.register(Box::new(DateTool));
    registry.register(Box::new(HolidaysTool::new(&config.holidays_feed_url)?));

    Ok(registry)
}

/// HTTP client for the network-backed tools. Timeouts are set per request.
pub(crate) fn http_client() -> Result<reqwest::Client, ToolError> {
    reqwest::Client::builder()
        .build()
        .map_err(|e| ToolError::ClientSetup(e.to_string()))
}
