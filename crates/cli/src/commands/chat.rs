//! `colloquy chat`: interactive or single-message chat.

use std::io::Write;

use anyhow::Context;
use colloquy_assistant::Assistant;
use colloquy_core::context::CallContext;
use colloquy_core::error::AssistantError;
use colloquy_core::message::{Conversation, ConversationId, Message};
use colloquy_core::store::ConversationStore;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::warn;

pub async fn run(conversation: Option<String>, message: Option<String>) -> anyhow::Result<()> {
    let config = super::load_config()?;
    let assistant = super::build_assistant(&config)?;
    let store = super::build_store(&config);

    let mut conversation = match conversation {
        Some(id) => store
            .get(&ConversationId::from(id.as_str()))
            .await
            .with_context(|| format!("failed to load conversation {id}"))?,
        None => Conversation::new(),
    };

    if let Some(text) = message {
        let reply = exchange(&assistant, store.as_ref(), &mut conversation, &text).await?;
        println!("{reply}");
        return Ok(());
    }

    println!();
    println!("  Conversation: {}", conversation.id);
    if !conversation.title.is_empty() {
        println!("  Title:        {}", conversation.title);
    }
    println!("  Model:        {}", config.model);
    println!("  Tools:        {}", assistant.tools().names().join(", "));
    println!();
    println!("  Type your message and press Enter.");
    println!("  Type 'exit' or press Ctrl+D to quit. Ctrl+C cancels a pending reply.");
    println!();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        print!("  You > ");
        std::io::stdout().flush()?;

        let line = tokio::select! {
            line = lines.next_line() => line?,
            _ = tokio::signal::ctrl_c() => None,
        };
        let Some(line) = line else { break };

        let text = line.trim();
        if text.is_empty() {
            continue;
        }
        if text == "exit" || text == "quit" {
            break;
        }

        match exchange(&assistant, store.as_ref(), &mut conversation, text).await {
            Ok(reply) => {
                println!();
                for line in reply.lines() {
                    println!("  Assistant > {line}");
                }
                println!();
            }
            Err(e) => {
                eprintln!("  [Error] {e:#}");
                println!();
            }
        }
    }

    println!();
    Ok(())
}

/// One user turn: append the message, name the conversation if it has no
/// title yet, run the reply loop, and persist the result.
///
/// On failure the user message is removed again so the stored history
/// never ends with an unanswered message.
pub async fn exchange(
    assistant: &Assistant,
    store: &dyn ConversationStore,
    conversation: &mut Conversation,
    text: &str,
) -> anyhow::Result<String> {
    conversation.push(Message::user(text));

    let (ctx, watcher) = super::ctrl_c_context();
    let outcome = respond(assistant, &ctx, conversation).await;
    watcher.abort();

    let reply = match outcome {
        Ok(reply) => reply,
        Err(e) => {
            conversation.messages.pop();
            return Err(e.into());
        }
    };

    store
        .save(conversation)
        .await
        .context("failed to save conversation")?;
    Ok(reply)
}

async fn respond(
    assistant: &Assistant,
    ctx: &CallContext,
    conversation: &mut Conversation,
) -> Result<String, AssistantError> {
    if conversation.title.is_empty() {
        match assistant.title(ctx, conversation).await {
            Ok(title) => conversation.title = title,
            Err(e) => warn!(error = %e, "Title generation failed"),
        }
    }

    let turn = assistant.reply_turn(ctx, conversation).await?;
    conversation.push(Message::assistant(turn.content.as_str()));
    Ok(turn.content)
}
