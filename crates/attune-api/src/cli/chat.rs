//! `attune chat`: one message in, one reply out.

use anyhow::Result;
use console::style;

use crate::state::AppState;

pub async fn send_message(
    state: &AppState,
    user: &str,
    thread: Option<String>,
    message: &str,
    json: bool,
) -> Result<()> {
    let reply = state.assistant.handle_message(user, message, thread).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&reply)?);
        return Ok(());
    }

    println!();
    if reply.is_crisis {
        println!("  {}", style("You are not alone.").red().bold());
        println!();
    }
    for line in reply.text.lines() {
        println!("  {line}");
    }
    println!();

    let mut footer = format!("route: {}", reply.route);
    if let Some(thread_id) = &reply.thread_id {
        footer.push_str(&format!("  thread: {thread_id}"));
    }
    println!("  {}", style(footer).dim());

    if let Some(err) = &reply.memory_write_error {
        println!(
            "  {} memory not saved: {err}",
            style("!").yellow().bold()
        );
    }
    println!();

    Ok(())
}
