//! `colloquy show`: print one stored conversation.

use std::fmt::Write;

use anyhow::Context;
use colloquy_core::message::{Conversation, ConversationId, Role};

pub async fn run(id: String) -> anyhow::Result<()> {
    let config = super::load_config()?;
    let store = super::build_store(&config);

    let conversation = store
        .get(&ConversationId::from(id.as_str()))
        .await
        .with_context(|| format!("failed to load conversation {id}"))?;

    print!("{}", render(&conversation));
    Ok(())
}

fn render(conversation: &Conversation) -> String {
    let mut out = String::new();
    let title = if conversation.title.is_empty() {
        "(untitled)"
    } else {
        conversation.title.as_str()
    };

    let _ = writeln!(out, "{title}");
    let _ = writeln!(
        out,
        "{}  created {}  updated {}",
        conversation.id,
        conversation.created_at.format("%Y-%m-%d %H:%M"),
        conversation.updated_at.format("%Y-%m-%d %H:%M")
    );

    for message in &conversation.messages {
        let label = match message.role {
            Role::User => "You",
            Role::Assistant => "Assistant",
            Role::System => "System",
            Role::Tool => "Tool",
        };
        let _ = writeln!(out);
        let _ = writeln!(out, "{label} > {}", message.content);
        for call in &message.tool_calls {
            let _ = writeln!(out, "  calls {}({})", call.name, call.arguments);
        }
    }

    out
}
