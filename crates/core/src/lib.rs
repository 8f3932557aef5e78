//! # Colloquy Core
//!
//! Domain types, traits, and error definitions for the Colloquy assistant.
//! This crate has **no transport dependencies**: it defines the domain model
//! that the provider, tool, store, and assistant crates implement against.
//!
//! ## Design Philosophy
//!
//! Every collaborator of the orchestration loop is a trait here:
//! - [`Provider`] is the LLM completion client
//! - [`Tool`] is a callable capability, collected in a [`ToolRegistry`]
//! - [`ConversationStore`] persists conversations
//!
//! Implementations live in their own crates and are injected explicitly, so
//! tests can substitute scripted fakes without touching global state.

pub mod context;
pub mod error;
pub mod message;
pub mod provider;
pub mod store;
pub mod tool;

// Re-export key types at crate root for ergonomics
pub use context::{CallContext, CancelHandle};
pub use error::{AssistantError, Interrupted, ProviderError, StoreError, ToolError};
pub use message::{Conversation, ConversationId, Message, MessageToolCall, Role};
pub use provider::{Provider, ProviderRequest, ProviderResponse, ToolDefinition};
pub use store::ConversationStore;
pub use tool::{Tool, ToolRegistry};
