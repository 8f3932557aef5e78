//! The assistant orchestrator for Colloquy.
//!
//! Drives the bounded completion/tool-dispatch loop that produces a reply,
//! and the one-shot completion that names a conversation.

pub mod assistant;

#[cfg(test)]
mod test_helpers;

pub use assistant::{Assistant, DEFAULT_MAX_ITERATIONS, MAX_TITLE_CHARS, Turn};
