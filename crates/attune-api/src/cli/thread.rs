//! `attune thread`: print a stored conversation.

use anyhow::{Result, bail};
use attune_types::chat::ThreadRole;
use console::style;

use crate::state::AppState;

pub async fn show(state: &AppState, user: &str, id: &str, json: bool) -> Result<()> {
    let Some(thread) = state.assistant.thread(user, id).await? else {
        bail!("thread '{id}' not found");
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&thread)?);
        return Ok(());
    }

    println!();
    println!(
        "  Thread {} ({} messages)",
        style(&thread.thread_id).cyan().bold(),
        thread.messages.len()
    );
    println!();
    for message in &thread.messages {
        let who = match message.role {
            ThreadRole::User => style("you").green().bold(),
            ThreadRole::Assistant => style("attune").magenta().bold(),
        };
        println!(
            "  {} {}",
            who,
            style(message.created_at.format("%Y-%m-%d %H:%M")).dim()
        );
        for line in message.content.lines() {
            println!("    {line}");
        }
        println!();
    }

    Ok(())
}
