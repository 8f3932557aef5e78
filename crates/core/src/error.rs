//! Error types for the Colloquy domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each bounded context has its own error enum.

use thiserror::Error;

/// Why an outbound call was abandoned before it completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Interrupted {
    #[error("operation cancelled")]
    Cancelled,

    #[error("deadline exceeded")]
    DeadlineExceeded,
}

// --- Bounded context errors ---

#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    #[error("API request failed: {message} (status: {status_code})")]
    ApiError { status_code: u16, message: String },

    #[error("Rate limited by provider")]
    RateLimited,

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("Invalid response from provider: {0}")]
    InvalidResponse(String),

    #[error("Network error: {0}")]
    Network(String),
}

#[derive(Debug, Clone, Error)]
pub enum ToolError {
    #[error("tool not found: {0}")]
    NotFound(String),

    #[error("invalid tool arguments: {0}")]
    InvalidArguments(String),

    #[error("location '{0}' not found")]
    LocationNotFound(String),

    #[error("invalid API key for {0}")]
    InvalidApiKey(String),

    #[error("invalid location format or missing parameters: {0}")]
    InvalidLocation(String),

    #[error("{service} returned status: {status}")]
    UpstreamStatus { service: String, status: u16 },

    #[error("request to {service} failed: {reason}")]
    Upstream { service: String, reason: String },

    #[error("could not find stock symbol for '{0}'")]
    SymbolNotFound(String),

    #[error("no quote data found for symbol {0}")]
    NoQuoteData(String),

    #[error("HTTP client setup failed: {0}")]
    ClientSetup(String),

    #[error("tool call interrupted: {0}")]
    Interrupted(#[from] Interrupted),
}

impl ToolError {
    /// Shorthand for an upstream transport or decoding failure.
    pub fn upstream(service: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        Self::Upstream {
            service: service.into(),
            reason: reason.to_string(),
        }
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("conversation not found: {0}")]
    NotFound(String),

    #[error("storage error: {0}")]
    Storage(String),
}

#[derive(Debug, Clone, Error)]
pub enum AssistantError {
    #[error("conversation has no messages")]
    EmptyConversation,

    #[error("cannot generate a title for an empty conversation")]
    EmptyTitleConversation,

    #[error("no choices returned by the completion API")]
    NoChoices,

    #[error("empty response from the completion API for title generation")]
    EmptyTitle,

    #[error("too many tool calls, unable to generate reply after {limit} iterations")]
    TooManyToolCalls { limit: u32 },

    #[error("completion call failed: {0}")]
    Provider(#[from] ProviderError),

    #[error("reply generation interrupted: {0}")]
    Interrupted(#[from] Interrupted),
}
