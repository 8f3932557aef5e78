//! `colloquy title`: regenerate and store a conversation's title.

use anyhow::Context;
use colloquy_core::message::ConversationId;

pub async fn run(id: String) -> anyhow::Result<()> {
    let config = super::load_config()?;
    let assistant = super::build_assistant(&config)?;
    let store = super::build_store(&config);

    let mut conversation = store
        .get(&ConversationId::from(id.as_str()))
        .await
        .with_context(|| format!("failed to load conversation {id}"))?;

    let (ctx, watcher) = super::ctrl_c_context();
    let title = assistant.title(&ctx, &conversation).await;
    watcher.abort();

    conversation.title = title?;
    store
        .save(&conversation)
        .await
        .context("failed to save conversation")?;

    println!("{}", conversation.title);
    Ok(())
}
