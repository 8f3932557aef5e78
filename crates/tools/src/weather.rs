//! Current weather conditions from WeatherAPI.com.

use std::time::Duration;

use async_trait::async_trait;
use colloquy_core::context::CallContext;
use colloquy_core::error::ToolError;
use colloquy_core::tool::Tool;
use reqwest::StatusCode;
use serde::Deserialize;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
const SERVICE: &str = "weather API";

pub struct WeatherTool {
    api_key: String,
    base_url: String,
    client: reqwest::Client,
}

impl WeatherTool {
    pub fn new(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Result<Self, ToolError> {
        Ok(Self {
            api_key: api_key.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client: crate::http_client()?,
        })
    }

    async fn current(&self, ctx: &CallContext, location: &str) -> Result<CurrentWeather, ToolError> {
        let url = format!("{}/current.json", self.base_url);
        let request = async {
            let response = self
                .client
                .get(&url)
                .query(&[("key", self.api_key.as_str()), ("q", location), ("aqi", "no")])
                .timeout(REQUEST_TIMEOUT)
                .send()
                .await
                .map_err(|e| ToolError::upstream(SERVICE, e))?;

            match response.status() {
                StatusCode::OK => {}
                StatusCode::NOT_FOUND => return Err(ToolError::LocationNotFound(location.into())),
                StatusCode::UNAUTHORIZED => {
                    return Err(ToolError::InvalidApiKey("weather service".into()));
                }
                StatusCode::BAD_REQUEST => return Err(ToolError::InvalidLocation(location.into())),
                other => {
                    return Err(ToolError::UpstreamStatus {
                        service: SERVICE.into(),
                        status: other.as_u16(),
                    });
                }
            }

            response
                .json::<CurrentWeather>()
                .await
                .map_err(|e| ToolError::upstream(SERVICE, format!("failed to parse weather data: {e}")))
        };

        ctx.run(request).await?
    }
}

#[derive(Debug, Deserialize)]
struct WeatherArgs {
    #[serde(default)]
    location: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct CurrentWeather {
    location: WeatherLocation,
    current: Conditions,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct WeatherLocation {
    name: String,
    region: String,
    country: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Conditions {
    temp_f: f64,
    feelslike_f: f64,
    humidity: i64,
    wind_mph: f64,
    condition: ConditionText,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ConditionText {
    text: String,
}

impl CurrentWeather {
    fn render(&self) -> String {
        let mut place = self.location.name.clone();
        for part in [&self.location.region, &self.location.country] {
            if !part.is_empty() {
                place.push_str(", ");
                place.push_str(part);
            }
        }

        format!(
            "Weather in {place}: {}°F ({}), Feels like: {}°F, Humidity: {}%, Wind: {:.1} mph",
            self.current.temp_f as i64,
            self.current.condition.text,
            self.current.feelslike_f as i64,
            self.current.humidity,
            self.current.wind_mph,
        )
    }
}

#[async_trait]
impl Tool for WeatherTool {
    fn name(&self) -> &str {
        "get_weather"
    }

    fn description(&self) -> &str {
        "Get current weather conditions at the given location"
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "location": {
                    "type": "string",
                    "description": "City name, ZIP code, or latitude,longitude coordinates"
                }
            },
            "required": ["location"]
        })
    }

    async fn execute(&self, ctx: &CallContext, arguments: &str) -> Result<String, ToolError> {
        let args: WeatherArgs = serde_json::from_str(arguments)
            .map_err(|e| ToolError::InvalidArguments(e.to_string()))?;

        let location = args.location.trim();
        if location.is_empty() {
            return Err(ToolError::InvalidArguments(
                "location is required for weather information".into(),
            ));
        }

        Ok(self.current(ctx, location).await?.render())
    }
}
