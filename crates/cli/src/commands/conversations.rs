//! `colloquy conversations`: list stored conversations, most recent first.

pub async fn run() -> anyhow::Result<()> {
    let config = super::load_config()?;
    let store = super::build_store(&config);
    let conversations = store.list().await?;

    if conversations.is_empty() {
        println!("No conversations stored ({} backend).", store.name());
        return Ok(());
    }

    for conv in &conversations {
        let title = if conv.title.is_empty() {
            "(untitled)"
        } else {
            conv.title.as_str()
        };
        println!(
            "{}  {}  {:>3} messages  {}",
            conv.id,
            conv.updated_at.format("%Y-%m-%d %H:%M"),
            conv.messages.len(),
            title
        );
    }

    Ok(())
}
