//! Shared test helpers for orchestrator tests.

use std::collections::VecDeque;
use std::sync::Mutex;

use colloquy_core::context::{CallContext, CancelHandle};
use colloquy_core::error::{Interrupted, ProviderError, ToolError};
use colloquy_core::message::{Message, MessageToolCall};
use colloquy_core::provider::{Provider, ProviderRequest, ProviderResponse, Usage};
use colloquy_core::tool::Tool;

/// A provider that replays scripted results and records every request.
///
/// Once the script runs out, the `repeat` response (if any) is returned
/// forever; otherwise the call panics.
pub struct ScriptedProvider {
    script: Mutex<VecDeque<Result<ProviderResponse, ProviderError>>>,
    repeat: Option<ProviderResponse>,
    requests: Mutex<Vec<ProviderRequest>>,
}

impl ScriptedProvider {
    pub fn new(script: Vec<Result<ProviderResponse, ProviderError>>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            repeat: None,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Always answer with `response`.
    pub fn repeating(response: ProviderResponse) -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            repeat: Some(response),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn requests(&self) -> Vec<ProviderRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl Provider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted_mock"
    }

    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
        let call = {
            let mut requests = self.requests.lock().unwrap();
            requests.push(request);
            requests.len()
        };

        if let Some(next) = self.script.lock().unwrap().pop_front() {
            return next;
        }
        match &self.repeat {
            Some(response) => Ok(response.clone()),
            None => panic!("ScriptedProvider: no more responses (call #{call})"),
        }
    }
}

/// A provider whose completions never finish.
pub struct StalledProvider;

#[async_trait::async_trait]
impl Provider for StalledProvider {
    fn name(&self) -> &str {
        "stalled_mock"
    }

    async fn complete(&self, _request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
        std::future::pending().await
    }
}

/// Returns its `text` argument.
pub struct EchoTool;

#[async_trait::async_trait]
impl Tool for EchoTool {
    fn name(&self) -> &str {
        "echo"
    }

    fn description(&self) -> &str {
        "Echo the text back"
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": { "text": { "type": "string" } },
            "required": ["text"]
        })
    }

    async fn execute(&self, _ctx: &CallContext, arguments: &str) -> Result<String, ToolError> {
        let args: serde_json::Value = serde_json::from_str(arguments)
            .map_err(|e| ToolError::InvalidArguments(e.to_string()))?;
        args["text"]
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| ToolError::InvalidArguments("text is required".into()))
    }
}

/// Fails every call with an upstream error.
pub struct FailingTool;

#[async_trait::async_trait]
impl Tool for FailingTool {
    fn name(&self) -> &str {
        "always_fails"
    }

    fn description(&self) -> &str {
        "Always fails"
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({ "type": "object" })
    }

    async fn execute(&self, _ctx: &CallContext, _arguments: &str) -> Result<String, ToolError> {
        Err(ToolError::upstream("test service", "upstream down"))
    }
}

/// Cancels the caller's context from inside the tool call, then reports
/// the interruption the way an HTTP tool would.
pub struct CancellingTool {
    handle: CancelHandle,
}

impl CancellingTool {
    pub fn new(handle: CancelHandle) -> Self {
        Self { handle }
    }
}

#[async_trait::async_trait]
impl Tool for CancellingTool {
    fn name(&self) -> &str {
        "cancel_caller"
    }

    fn description(&self) -> &str {
        "Cancels the running reply"
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({ "type": "object" })
    }

    async fn execute(&self, _ctx: &CallContext, _arguments: &str) -> Result<String, ToolError> {
        self.handle.cancel();
        Err(Interrupted::Cancelled.into())
    }
}

fn usage() -> Option<Usage> {
    Some(Usage {
        prompt_tokens: 10,
        completion_tokens: 5,
        total_tokens: 15,
    })
}

/// Create a simple text response (no tool calls).
pub fn make_text_response(text: &str) -> ProviderResponse {
    ProviderResponse {
        choices: vec![Message::assistant(text)],
        usage: usage(),
        model: "mock-model".into(),
    }
}

/// Create a response requesting the given tool calls.
pub fn make_tool_call_response(tool_calls: Vec<MessageToolCall>) -> ProviderResponse {
    ProviderResponse {
        choices: vec![Message::assistant_with_tool_calls("", tool_calls)],
        usage: usage(),
        model: "mock-model".into(),
    }
}

/// A response with no candidates at all.
pub fn make_empty_response() -> ProviderResponse {
    ProviderResponse {
        choices: vec![],
        usage: None,
        model: "mock-model".into(),
    }
}

/// Helper to create a tool call.
pub fn make_tool_call(name: &str, args: serde_json::Value) -> MessageToolCall {
    MessageToolCall {
        id: format!("call_{name}"),
        name: name.to_string(),
        arguments: serde_json::to_string(&args).unwrap(),
    }
}
