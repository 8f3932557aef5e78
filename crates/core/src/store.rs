//! Conversation store trait: persistence boundary for conversations.
//!
//! The assistant never touches the store; its caller loads a conversation,
//! runs the assistant, appends the returned messages, and saves.

use async_trait::async_trait;

use crate::error::StoreError;
use crate::message::{Conversation, ConversationId};

#[async_trait]
pub trait ConversationStore: Send + Sync {
    /// Backend name (e.g., "memory", "file").
    fn name(&self) -> &str;

    /// Fetch a conversation; `StoreError::NotFound` if absent.
    async fn get(&self, id: &ConversationId) -> Result<Conversation, StoreError>;

    /// Insert or replace a conversation.
    async fn save(&self, conversation: &Conversation) -> Result<(), StoreError>;

    /// All conversations, most recently updated first.
    async fn list(&self) -> Result<Vec<Conversation>, StoreError>;

    /// Delete a conversation. Returns whether it existed.
    async fn delete(&self, id: &ConversationId) -> Result<bool, StoreError>;
}
