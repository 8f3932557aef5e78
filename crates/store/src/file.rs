//! File-based store: one JSON document per conversation.
//!
//! Layout: `<dir>/<conversation-id>.json`, pretty-printed so the files stay
//! human-inspectable. Default location: `~/.colloquy/conversations/`.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use colloquy_core::error::StoreError;
use colloquy_core::message::{Conversation, ConversationId};
use colloquy_core::store::ConversationStore;
use tracing::{debug, warn};

pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Create a store rooted at `dir`. The directory is created on first save.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Ids become file names, so only a safe character set is accepted.
    fn path_for(&self, id: &ConversationId) -> Option<PathBuf> {
        let raw = id.as_str();
        let safe = !raw.is_empty()
            && raw
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        safe.then(|| self.dir.join(format!("{raw}.json")))
    }

    async fn read_file(path: &Path) -> Result<Conversation, StoreError> {
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| StoreError::Storage(format!("Failed to read {}: {e}", path.display())))?;
        serde_json::from_str(&content)
            .map_err(|e| StoreError::Storage(format!("Corrupted conversation file {}: {e}", path.display())))
    }
}

#[async_trait]
impl ConversationStore for FileStore {
    fn name(&self) -> &str {
        "file"
    }

    async fn get(&self, id: &ConversationId) -> Result<Conversation, StoreError> {
        let path = self
            .path_for(id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        if !tokio::fs::try_exists(&path).await.unwrap_or(false) {
            return Err(StoreError::NotFound(id.to_string()));
        }
        Self::read_file(&path).await
    }

    async fn save(&self, conversation: &Conversation) -> Result<(), StoreError> {
        let path = self.path_for(&conversation.id).ok_or_else(|| {
            StoreError::Storage(format!("Invalid conversation id: {}", conversation.id))
        })?;

        tokio::fs::create_dir_all(&self.dir).await.map_err(|e| {
            StoreError::Storage(format!("Failed to create store directory: {e}"))
        })?;

        let content = serde_json::to_string_pretty(conversation)
            .map_err(|e| StoreError::Storage(format!("Failed to serialize conversation: {e}")))?;

        // Write-then-rename so a crash never leaves a half-written file.
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, content)
            .await
            .map_err(|e| StoreError::Storage(format!("Failed to write conversation: {e}")))?;
        tokio::fs::rename(&tmp, &path)
            .await
            .map_err(|e| StoreError::Storage(format!("Failed to write conversation: {e}")))?;

        debug!(conversation_id = %conversation.id, path = %path.display(), "Conversation saved");
        Ok(())
    }

    async fn list(&self) -> Result<Vec<Conversation>, StoreError> {
        let mut entries = match tokio::fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(StoreError::Storage(format!("Failed to list conversations: {e}"))),
        };

        let mut conversations = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| StoreError::Storage(format!("Failed to list conversations: {e}")))?
        {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            match Self::read_file(&path).await {
                Ok(conv) => conversations.push(conv),
                Err(e) => warn!(error = %e, "Skipping unreadable conversation file"),
            }
        }

        crate::sort_recent_first(&mut conversations);
        Ok(conversations)
    }

    async fn delete(&self, id: &ConversationId) -> Result<bool, StoreError> {
        let Some(path) = self.path_for(id) else {
            return Ok(false);
        };
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(StoreError::Storage(format!("Failed to delete conversation: {e}"))),
        }
    }
}
