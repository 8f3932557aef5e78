//! Stock quotes from Alpha Vantage.
//!
//! Three endpoints are used, all under `{base}/query`:
//! `GLOBAL_QUOTE` for the price, `OVERVIEW` for the company name (best
//! effort), and `SYMBOL_SEARCH` to turn a company name into a ticker.

use std::time::Duration;

use async_trait::async_trait;
use colloquy_core::context::CallContext;
use colloquy_core::error::ToolError;
use colloquy_core::tool::Tool;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
const SERVICE: &str = "stock API";

/// Inputs longer than this are treated as company names, not tickers.
const MAX_TICKER_LEN: usize = 5;

pub struct StockTool {
    api_key: String,
    base_url: String,
    client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct StockArgs {
    #[serde(default)]
    symbol: String,
    #[serde(default)]
    detailed: bool,
}

/// A parsed `GLOBAL_QUOTE` plus the optional company name.
#[derive(Debug, Clone, Default, PartialEq)]
struct Quote {
    symbol: String,
    name: Option<String>,
    price: f64,
    change: f64,
    change_percent: f64,
    volume: i64,
    high: f64,
    low: f64,
    open: f64,
    previous_close: f64,
}

impl StockTool {
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

    /// GET `{base}/query` with the given parameters and decode the JSON body.
    async fn query(&self, ctx: &CallContext, params: &[(&str, &str)]) -> Result<Value, ToolError> {
        let url = format!("{}/query", self.base_url);
        let request = async {
            let response = self
                .client
                .get(&url)
                .query(params)
                .query(&[("apikey", self.api_key.as_str())])
                .timeout(REQUEST_TIMEOUT)
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
                .json::<Value>()
                .await
                .map_err(|e| ToolError::upstream(SERVICE, e))
        };

        ctx.run(request).await?
    }

    async fn resolve_symbol(&self, ctx: &CallContext, keywords: &str) -> Result<String, ToolError> {
        let body = self
            .query(ctx, &[("function", "SYMBOL_SEARCH"), ("keywords", keywords)])
            .await
            .map_err(|e| match e {
                ToolError::Interrupted(i) => ToolError::Interrupted(i),
                other => {
                    debug!(keywords, error = %other, "Symbol search failed");
                    ToolError::SymbolNotFound(keywords.into())
                }
            })?;

        body["bestMatches"]
            .as_array()
            .and_then(|matches| matches.first())
            .and_then(|best| best["1. symbol"].as_str())
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .ok_or_else(|| ToolError::SymbolNotFound(keywords.into()))
    }

    async fn quote(&self, ctx: &CallContext, symbol: &str) -> Result<Quote, ToolError> {
        let body = self
            .query(ctx, &[("function", "GLOBAL_QUOTE"), ("symbol", symbol)])
            .await?;
        parse_quote(symbol, &body)
    }

    async fn company_name(&self, ctx: &CallContext, symbol: &str) -> Result<String, ToolError> {
        let body = self
            .query(ctx, &[("function", "OVERVIEW"), ("symbol", symbol)])
            .await?;
        body["Name"]
            .as_str()
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .ok_or_else(|| ToolError::upstream(SERVICE, "overview has no company name"))
    }
}

fn parse_quote(symbol: &str, body: &Value) -> Result<Quote, ToolError> {
    let quote = body
        .get("Global Quote")
        .and_then(Value::as_object)
        .filter(|q| !q.is_empty())
        .ok_or_else(|| ToolError::NoQuoteData(symbol.into()))?;

    let number = |key: &str| {
        quote
            .get(key)
            .and_then(Value::as_str)
            .and_then(|s| s.trim().trim_end_matches('%').parse::<f64>().ok())
            .unwrap_or(0.0)
    };

    Ok(Quote {
        symbol: symbol.into(),
        name: None,
        price: number("05. price"),
        change: number("09. change"),
        change_percent: number("10. change percent"),
        volume: quote
            .get("06. volume")
            .and_then(Value::as_str)
            .and_then(|s| s.trim().parse::<i64>().ok())
            .unwrap_or(0),
        high: number("03. high"),
        low: number("04. low"),
        open: number("02. open"),
        previous_close: number("08. previous close"),
    })
}

impl Quote {
    fn glyph(&self) -> char {
        if self.change < 0.0 { '▼' } else { '▲' }
    }

    fn render_simple(&self) -> String {
        let figures = format!(
            "${:.2} {}{:.2} ({:.2}%)",
            self.price,
            self.glyph(),
            self.change.abs(),
            self.change_percent.abs()
        );
        match &self.name {
            Some(name) => format!("{name} ({}): {figures}", self.symbol),
            None => format!("{}: {figures}", self.symbol),
        }
    }

    fn render_detailed(&self) -> String {
        let name = self.name.as_deref().unwrap_or(&self.symbol);
        [
            format!("Stock: {name} ({})", self.symbol),
            format!("Price: ${:.2}", self.price),
            format!(
                "Change: {}${:.2} ({:.2}%)",
                self.glyph(),
                self.change.abs(),
                self.change_percent.abs()
            ),
            format!("Open: ${:.2}", self.open),
            format!("High: ${:.2}", self.high),
            format!("Low: ${:.2}", self.low),
            format!("Previous Close: ${:.2}", self.previous_close),
            format!("Volume: {}", group_thousands(self.volume)),
        ]
        .join("\n")
    }
}

/// Format an integer with comma thousands separators.
fn group_thousands(n: i64) -> String {
    let digits = n.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if n < 0 {
        out.push('-');
    }
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

#[async_trait]
impl Tool for StockTool {
    fn name(&self) -> &str {
        "get_stock_price"
    }

    fn description(&self) -> &str {
        "Get current stock price and information for a given stock symbol or company name"
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "symbol": {
                    "type": "string",
                    "description": "Stock symbol (e.g., AAPL, GOOGL, MSFT) or company name"
                },
                "detailed": {
                    "type": "boolean",
                    "description": "Whether to return detailed information including daily change, volume, etc. Defaults to false."
                }
            },
            "required": ["symbol"]
        })
    }

    async fn execute(&self, ctx: &CallContext, arguments: &str) -> Result<String, ToolError> {
        let args: StockArgs = serde_json::from_str(arguments)
            .map_err(|e| ToolError::InvalidArguments(e.to_string()))?;

        let requested = args.symbol.trim().to_uppercase();
        if requested.is_empty() {
            return Err(ToolError::InvalidArguments("stock symbol is required".into()));
        }

        let symbol = if requested.chars().count() > MAX_TICKER_LEN {
            self.resolve_symbol(ctx, &requested).await?
        } else {
            requested
        };

        let mut quote = self.quote(ctx, &symbol).await?;

        quote.name = match self.company_name(ctx, &symbol).await {
            Ok(name) => Some(name),
            Err(ToolError::Interrupted(i)) => return Err(i.into()),
            Err(e) => {
                debug!(symbol = %symbol, error = %e, "Company overview unavailable");
                None
            }
        };

        Ok(if args.detailed {
            quote.render_detailed()
        } else {
            quote.render_simple()
        })
    }
}
