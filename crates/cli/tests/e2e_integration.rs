//! End-to-end tests for the Colloquy reply pipeline.
//!
//! These wire the real tool registry (pointed at a local fake upstream),
//! the assistant orchestrator, a scripted completion client, and the
//! in-memory conversation store.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use axum::extract::Query;
use axum::routing::get;
use axum::{Json, Router};
use colloquy_assistant::Assistant;
use colloquy_config::ToolsConfig;
use colloquy_core::context::CallContext;
use colloquy_core::error::{AssistantError, ProviderError};
use colloquy_core::message::{Conversation, Message, MessageToolCall, Role};
use colloquy_core::provider::{Provider, ProviderRequest, ProviderResponse, Usage};
use colloquy_core::store::ConversationStore;
use colloquy_store::InMemoryStore;
use colloquy_tools::build_registry;

// ── Mock Provider ────────────────────────────────────────────────────────

/// A completion client that replays scripted responses and records requests.
struct ScriptedProvider {
    responses: Mutex<VecDeque<ProviderResponse>>,
    requests: Mutex<Vec<ProviderRequest>>,
}

impl ScriptedProvider {
    fn new(responses: Vec<ProviderResponse>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    fn request(&self, n: usize) -> ProviderRequest {
        self.requests.lock().unwrap()[n].clone()
    }
}

#[async_trait::async_trait]
impl Provider for ScriptedProvider {
    fn name(&self) -> &str {
        "e2e_mock"
    }

    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
        self.requests.lock().unwrap().push(request);
        let next = self.responses.lock().unwrap().pop_front();
        Ok(next.unwrap_or_else(|| panic!("ScriptedProvider exhausted after {} calls", self.calls())))
    }
}

fn text_response(text: &str) -> ProviderResponse {
    ProviderResponse {
        choices: vec![Message::assistant(text)],
        usage: Some(Usage {
            prompt_tokens: 10,
            completion_tokens: 5,
            total_tokens: 15,
        }),
        model: "mock-model".into(),
    }
}

fn tool_response(calls: Vec<MessageToolCall>) -> ProviderResponse {
    ProviderResponse {
        choices: vec![Message::assistant_with_tool_calls("", calls)],
        usage: None,
        model: "mock-model".into(),
    }
}

fn call(id: &str, name: &str, args: serde_json::Value) -> MessageToolCall {
    MessageToolCall {
        id: id.into(),
        name: name.into(),
        arguments: args.to_string(),
    }
}

// ── Fake upstream ────────────────────────────────────────────────────────

const FEED: &str = "BEGIN:VCALENDAR\r\n\
VERSION:2.0\r\n\
BEGIN:VEVENT\r\n\
DTSTART;VALUE=DATE:20300101\r\n\
SUMMARY:New Year's Day\r\n\
END:VEVENT\r\n\
BEGIN:VEVENT\r\n\
DTSTART;VALUE=DATE:20300423\r\n\
SUMMARY:Sant Jordi\r\n\
END:VEVENT\r\n\
END:VCALENDAR\r\n";

async fn weather(Query(params): Query<HashMap<String, String>>) -> Json<serde_json::Value> {
    let place = params.get("q").cloned().unwrap_or_default();
    Json(serde_json::json!({
        "location": { "name": place, "region": "", "country": "Spain" },
        "current": {
            "temp_f": 68.0,
            "feelslike_f": 68.0,
            "humidity": 50,
            "wind_mph": 5.0,
            "condition": { "text": "Sunny" }
        }
    }))
}

async fn alpha_vantage(Query(params): Query<HashMap<String, String>>) -> Json<serde_json::Value> {
    match params.get("function").map(String::as_str) {
        Some("GLOBAL_QUOTE") => Json(serde_json::json!({
            "Global Quote": {
                "05. price": "150.0000",
                "09. change": "-2.5000",
                "10. change percent": "-1.6393%"
            }
        })),
        Some("OVERVIEW") => Json(serde_json::json!({ "Name": "Apple Inc" })),
        _ => Json(serde_json::json!({ "bestMatches": [] })),
    }
}

async fn fake_upstream() -> String {
    let router = Router::new()
        .route("/weather/current.json", get(weather))
        .route("/stocks/query", get(alpha_vantage))
        .route("/holidays.ics", get(|| async { FEED }));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}")
}

fn tools_config(base: &str) -> ToolsConfig {
    ToolsConfig {
        weather_api_key: Some("weather-key".into()),
        stock_api_key: Some("stock-key".into()),
        holidays_feed_url: format!("{base}/holidays.ics"),
        weather_api_url: format!("{base}/weather"),
        stock_api_url: format!("{base}/stocks"),
    }
}

// ── Tests ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn e2e_tools_feed_reply_and_conversation_is_persisted() {
    let base = fake_upstream().await;
    let registry = Arc::new(build_registry(&tools_config(&base)).unwrap());

    let provider = Arc::new(ScriptedProvider::new(vec![
        tool_response(vec![
            call("call_w", "get_weather", serde_json::json!({"location": "Barcelona"})),
            call("call_s", "get_stock_price", serde_json::json!({"symbol": "AAPL"})),
        ]),
        tool_response(vec![call(
            "call_h",
            "get_holidays",
            serde_json::json!({"max_count": 1}),
        )]),
        text_response("Sunny in Barcelona, AAPL is down, next holiday is New Year's Day."),
    ]));
    let assistant = Assistant::new(provider.clone(), registry, "gpt-4.1");
    let store = InMemoryStore::new();

    let mut conversation = Conversation::new();
    conversation.push(Message::user("Weather, AAPL and next holiday?"));

    let turn = assistant
        .reply_turn(&CallContext::background(), &conversation)
        .await
        .unwrap();

    assert_eq!(provider.calls(), 3);
    assert!(turn.content.starts_with("Sunny in Barcelona"));

    let results: Vec<(&str, &str)> = turn
        .messages
        .iter()
        .filter(|m| m.role == Role::Tool)
        .map(|m| (m.tool_call_id.as_deref().unwrap(), m.content.as_str()))
        .collect();
    assert_eq!(results.len(), 3);
    assert_eq!(results[0].0, "call_w");
    assert!(results[0].1.starts_with("Weather in Barcelona, Spain: 68°F (Sunny)"));
    assert_eq!(results[1].0, "call_s");
    assert_eq!(results[1].1, "Apple Inc (AAPL): $150.00 ▼2.50 (1.64%)");
    assert_eq!(results[2], ("call_h", "2030-01-01: New Year's Day"));

    // The tool definitions reach the completion client in registration order.
    let names: Vec<String> = provider
        .request(0)
        .tools
        .iter()
        .map(|t| t.name.clone())
        .collect();
    assert_eq!(
        names,
        vec!["get_weather", "get_stock_price", "get_today_date", "get_holidays"]
    );

    conversation.extend(turn.messages);
    store.save(&conversation).await.unwrap();

    let saved = store.get(&conversation.id).await.unwrap();
    assert_eq!(saved.messages.len(), 1 + 6);
    assert_eq!(saved.messages.last().unwrap().role, Role::Assistant);
}

#[tokio::test]
async fn e2e_disabled_tool_is_reported_to_the_model() {
    // No weather key: the weather tool is not registered at all.
    let registry = Arc::new(build_registry(&ToolsConfig::default()).unwrap());

    let provider = Arc::new(ScriptedProvider::new(vec![
        tool_response(vec![call(
            "call_1",
            "get_weather",
            serde_json::json!({"location": "Paris"}),
        )]),
        text_response("I can't check the weather right now."),
    ]));
    let assistant = Assistant::new(provider.clone(), registry, "gpt-4.1");

    let mut conversation = Conversation::new();
    conversation.push(Message::user("Weather in Paris?"));

    let turn = assistant
        .reply_turn(&CallContext::background(), &conversation)
        .await
        .unwrap();

    assert_eq!(turn.messages[1].content, "Error: tool not found: get_weather");

    // The error text is what the model sees on the next call.
    let second = provider.request(1);
    let last = second.messages.last().unwrap();
    assert_eq!(last.role, Role::Tool);
    assert!(last.content.starts_with("Error:"));
}

#[tokio::test]
async fn e2e_title_then_reply() {
    let provider = Arc::new(ScriptedProvider::new(vec![
        text_response("Weather in Barcelona"),
        text_response("It's sunny."),
    ]));
    let assistant = Assistant::new(
        provider.clone(),
        Arc::new(build_registry(&ToolsConfig::default()).unwrap()),
        "gpt-4.1",
    )
    .with_title_model("gpt-4-turbo");

    let mut conversation = Conversation::new();
    conversation.push(Message::user("What is the weather in Barcelona?"));

    let ctx = CallContext::background();
    conversation.title = assistant.title(&ctx, &conversation).await.unwrap();
    let reply = assistant.reply(&ctx, &conversation).await.unwrap();

    assert_eq!(conversation.title, "Weather in Barcelona");
    assert_eq!(reply, "It's sunny.");
    assert_eq!(provider.request(0).model, "gpt-4-turbo");
    assert_eq!(provider.request(1).model, "gpt-4.1");
}

#[tokio::test]
async fn e2e_empty_conversation_makes_no_calls() {
    let provider = Arc::new(ScriptedProvider::new(vec![]));
    let assistant = Assistant::new(
        provider.clone(),
        Arc::new(build_registry(&ToolsConfig::default()).unwrap()),
        "gpt-4.1",
    );

    let err = assistant
        .reply(&CallContext::background(), &Conversation::new())
        .await
        .unwrap_err();
    assert!(matches!(err, AssistantError::EmptyConversation));
    assert_eq!(provider.calls(), 0);
}
