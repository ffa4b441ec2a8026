//! Attune CLI entry point.
//!
//! Binary name: `attune`
//!
//! Parses CLI arguments, sets up tracing, wires the database, credential
//! pools and model providers, then dispatches to a command handler.

mod cli;
mod state;

use clap::Parser;

use cli::{Cli, Commands, ProfileAction};
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 if cli.quiet => "error",
        0 => "warn",
        1 => "info,attune=debug",
        _ => "trace",
    };
    attune_observe::tracing_setup::init_tracing_with_default(cli.otel, filter)
        .map_err(|e| anyhow::anyhow!("failed to initialize tracing: {e}"))?;

    let result = run(cli).await;
    attune_observe::tracing_setup::shutdown_tracing();
    result
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let state = AppState::init().await?;

    match cli.command {
        Commands::Chat {
            user,
            thread,
            message,
        } => {
            cli::chat::send_message(&state, &user, thread, &message.join(" "), cli.json).await?;
        }

        Commands::Assess {
            user,
            kind,
            answers,
        } => {
            cli::assess::submit(&state, &user, &kind, &answers, cli.json).await?;
        }

        Commands::Assessment { user, id } => {
            cli::assess::show(&state, &user, &id, cli.json).await?;
        }

        Commands::Thread { user, id } => {
            cli::thread::show(&state, &user, &id, cli.json).await?;
        }

        Commands::Profile { action } => match action {
            ProfileAction::Set {
                user,
                goal,
                struggle,
                style,
                reduce_overwhelm,
                context,
            } => {
                let update = cli::profile::ProfileUpdate {
                    goals: goal,
                    struggles: struggle,
                    style,
                    reduce_overwhelm,
                    context,
                };
                cli::profile::set(&state, &user, update, cli.json).await?;
            }
            ProfileAction::Show { user } => {
                cli::profile::show(&state, &user, cli.json).await?;
            }
        },
    }

    Ok(())
}
