//! Reply loop and title generation.

use std::sync::Arc;

use colloquy_core::context::CallContext;
use colloquy_core::error::AssistantError;
use colloquy_core::message::{Conversation, Message, Role};
use colloquy_core::provider::{Provider, ProviderRequest};
use colloquy_core::tool::ToolRegistry;
use tracing::{debug, info, warn};

/// Completion calls allowed per reply before giving up.
pub const DEFAULT_MAX_ITERATIONS: u32 = 15;

/// Generated titles are cut to this many characters.
pub const MAX_TITLE_CHARS: usize = 80;

const REPLY_INSTRUCTION: &str =
    "You are a helpful, concise AI assistant. Provide accurate, safe, and clear responses.";

const TITLE_INSTRUCTION: &str = "Generate a concise, descriptive title that summarizes the user's question or topic.
The title should be 2-5 words maximum, no more than 80 characters, and should NOT answer the question.
Focus on extracting the main subject matter only.

Examples:
- \"What is the weather in Barcelona?\" → \"Weather in Barcelona\"
- \"How do I bake chocolate chip cookies?\" → \"Chocolate Chip Cookie Recipe\"
- \"Tell me about the history of ancient Rome\" → \"Ancient Roman History\"
- \"What are the best restaurants in Paris?\" → \"Paris Restaurant Recommendations\"";

/// The outcome of one reply loop.
#[derive(Debug, Clone)]
pub struct Turn {
    /// Text of the final assistant message.
    pub content: String,

    /// Every message the loop produced, in order: assistant tool-call
    /// messages, their tool results, and the final assistant message.
    pub messages: Vec<Message>,
}

/// Orchestrates completion calls and tool dispatch for a conversation.
///
/// Holds no per-conversation state; one instance serves every request.
pub struct Assistant {
    provider: Arc<dyn Provider>,
    tools: Arc<ToolRegistry>,
    model: String,
    title_model: String,
    temperature: Option<f32>,
    max_iterations: u32,
}

impl Assistant {
    pub fn new(
        provider: Arc<dyn Provider>,
        tools: Arc<ToolRegistry>,
        model: impl Into<String>,
    ) -> Self {
        let model = model.into();
        Self {
            provider,
            tools,
            title_model: model.clone(),
            model,
            temperature: None,
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }

    /// Use a different model for title generation.
    pub fn with_title_model(mut self, model: impl Into<String>) -> Self {
        self.title_model = model.into();
        self
    }

    /// Set the maximum number of completion calls per reply.
    pub fn with_max_iterations(mut self, max: u32) -> Self {
        self.max_iterations = max;
        self
    }

    pub fn with_temperature(mut self, temperature: Option<f32>) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    /// Generate the assistant's reply to `conversation`.
    pub async fn reply(
        &self,
        ctx: &CallContext,
        conversation: &Conversation,
    ) -> Result<String, AssistantError> {
        Ok(self.reply_turn(ctx, conversation).await?.content)
    }

    /// Run the reply loop and return the final text with every message
    /// produced along the way, for the caller to persist.
    ///
    /// Tool failures are fed back to the model as `Error: ...` results.
    /// Completion failures, an empty choice list, cancellation and running
    /// out of iterations end the turn with an error.
    pub async fn reply_turn(
        &self,
        ctx: &CallContext,
        conversation: &Conversation,
    ) -> Result<Turn, AssistantError> {
        if conversation.is_empty() {
            return Err(AssistantError::EmptyConversation);
        }

        info!(
            conversation_id = %conversation.id,
            messages = conversation.messages.len(),
            "Generating reply for conversation"
        );

        let mut prompt = Vec::with_capacity(conversation.messages.len() + 1);
        prompt.push(Message::system(REPLY_INSTRUCTION));
        prompt.extend(conversation.messages.iter().filter_map(replayable));

        let definitions = self.tools.definitions();
        let mut produced = Vec::new();

        for iteration in 1..=self.max_iterations {
            ctx.check()?;

            debug!(
                conversation_id = %conversation.id,
                iteration,
                "Requesting completion"
            );

            let request = ProviderRequest::new(&self.model, prompt.clone())
                .with_tools(definitions.clone())
                .with_temperature(self.temperature);

            let response = ctx.run(self.provider.complete(request)).await??;
            let message = response
                .into_first_choice()
                .ok_or(AssistantError::NoChoices)?;

            if !message.has_tool_calls() {
                let content = message.content.clone();
                produced.push(message);
                return Ok(Turn {
                    content,
                    messages: produced,
                });
            }

            debug!(tool_count = message.tool_calls.len(), "Executing tool calls");

            let calls = message.tool_calls.clone();
            prompt.push(message.clone());
            produced.push(message);

            for call in &calls {
                let output = match self.tools.execute(ctx, &call.name, &call.arguments).await {
                    Ok(output) => output,
                    Err(e) => {
                        warn!(tool = %call.name, error = %e, "Tool execution failed");
                        format!("Error: {e}")
                    }
                };

                let result = Message::tool_result(&call.id, output);
                prompt.push(result.clone());
                produced.push(result);
            }
        }

        // A cancel that landed while the last tools ran wins over the limit.
        ctx.check()?;

        warn!(
            conversation_id = %conversation.id,
            limit = self.max_iterations,
            "Tool iteration limit reached without a reply"
        );
        Err(AssistantError::TooManyToolCalls {
            limit: self.max_iterations,
        })
    }

    /// Generate a short title for `conversation` with a single completion.
    pub async fn title(
        &self,
        ctx: &CallContext,
        conversation: &Conversation,
    ) -> Result<String, AssistantError> {
        if conversation.is_empty() {
            return Err(AssistantError::EmptyTitleConversation);
        }

        info!(conversation_id = %conversation.id, "Generating title for conversation");

        let mut prompt = Vec::with_capacity(conversation.messages.len() + 1);
        prompt.push(Message::system(TITLE_INSTRUCTION));
        prompt.extend(
            conversation
                .messages
                .iter()
                .map(|m| Message::user(m.content.as_str())),
        );

        let request = ProviderRequest::new(&self.title_model, prompt);
        let response = ctx.run(self.provider.complete(request)).await??;
        let raw = response
            .into_first_choice()
            .ok_or(AssistantError::NoChoices)?
            .content;

        clean_title(&raw).ok_or(AssistantError::EmptyTitle)
    }
}

/// Stored messages that are sent back to the model. Assistant messages go
/// back as plain text; tool results and system messages are dropped.
fn replayable(message: &Message) -> Option<Message> {
    match message.role {
        Role::User => Some(Message::user(message.content.as_str())),
        Role::Assistant => Some(Message::assistant(message.content.as_str())),
        Role::System | Role::Tool => None,
    }
}

fn clean_title(raw: &str) -> Option<String> {
    let collapsed = raw.replace('\n', " ");
    let trimmed =
        collapsed.trim_matches(|c| matches!(c, ' ' | '\t' | '\r' | '\n' | '-' | '"' | '\''));
    if trimmed.is_empty() {
        return None;
    }
    Some(trimmed.chars().take(MAX_TITLE_CHARS).collect())
}
