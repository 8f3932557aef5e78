pub mod chat;
pub mod config_cmd;
pub mod conversations;
pub mod show;
pub mod title;
pub mod tools;

use std::sync::Arc;

use anyhow::Context;
use colloquy_assistant::Assistant;
use colloquy_config::{AppConfig, StoreBackend};
use colloquy_core::context::{CallContext, CancelHandle};
use colloquy_core::store::ConversationStore;
use colloquy_store::{FileStore, InMemoryStore};

pub fn load_config() -> anyhow::Result<AppConfig> {
    AppConfig::load().context("failed to load configuration")
}

/// Wire the completion client and tool registry into an assistant.
pub fn build_assistant(config: &AppConfig) -> anyhow::Result<Assistant> {
    if !config.has_api_key() {
        anyhow::bail!(
            "no completion API key configured; set COLLOQUY_API_KEY or OPENAI_API_KEY, or add api_key to {}",
            AppConfig::config_dir().join("config.toml").display()
        );
    }

    let provider = colloquy_providers::build_from_config(config)
        .context("failed to build completion client")?;
    let tools = colloquy_tools::build_registry(&config.tools).context("failed to build tools")?;

    Ok(Assistant::new(Arc::new(provider), Arc::new(tools), &config.model)
        .with_title_model(&config.title_model)
        .with_max_iterations(config.max_tool_iterations)
        .with_temperature(config.temperature))
}

pub fn build_store(config: &AppConfig) -> Arc<dyn ConversationStore> {
    match config.store.backend {
        StoreBackend::File => Arc::new(FileStore::new(config.store.resolved_path())),
        StoreBackend::Memory => Arc::new(InMemoryStore::new()),
    }
}

/// A context cancelled by Ctrl-C. Abort the returned task once the
/// guarded work is done.
pub fn ctrl_c_context() -> (CallContext, tokio::task::JoinHandle<()>) {
    let (ctx, handle) = CallContext::with_cancel();
    let watcher = tokio::spawn(cancel_on_ctrl_c(handle));
    (ctx, watcher)
}

async fn cancel_on_ctrl_c(handle: CancelHandle) {
    if tokio::signal::ctrl_c().await.is_ok() {
        tracing::warn!("Interrupted, cancelling in-flight request");
        handle.cancel();
    }
}
