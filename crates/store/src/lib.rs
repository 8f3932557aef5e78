//! Conversation store implementations for Colloquy.

pub mod file;
pub mod in_memory;

pub use file::FileStore;
pub use in_memory::InMemoryStore;

use colloquy_core::message::Conversation;

/// Most recently updated first.
pub(crate) fn sort_recent_first(conversations: &mut [Conversation]) {
    conversations.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
}
