//! CLI command definitions for the `attune` binary.
//!
//! A thin shell over `AssistantService`: every command takes the acting
//! user explicitly with `--user`.

pub mod assess;
pub mod chat;
pub mod profile;
pub mod thread;

use clap::{Parser, Subcommand};

/// ADHD support assistant: coaching chat and self-screening.
#[derive(Parser)]
#[command(name = "attune", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output machine-readable JSON instead of styled text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress all output except errors.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Detailed output (-v for verbose, -vv for debug/trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Export spans through OpenTelemetry (stdout exporter).
    #[arg(long, global = true, env = "ATTUNE_OTEL")]
    pub otel: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Send a message to the assistant.
    Chat {
        /// Acting user id.
        #[arg(long)]
        user: String,

        /// Continue an existing thread instead of starting a new one.
        #[arg(long)]
        thread: Option<String>,

        /// Message text (joined with spaces).
        #[arg(required = true, num_args = 1..)]
        message: Vec<String>,
    },

    /// Submit a screening and get an explanation.
    Assess {
        #[arg(long)]
        user: String,

        /// Screening kind: asrs6, asrs18 or extended.
        #[arg(long, default_value = "asrs6")]
        kind: String,

        /// Comma-separated answers on the 0-4 scale, in question order.
        #[arg(long)]
        answers: String,
    },

    /// Show a stored screening result.
    Assessment {
        #[arg(long)]
        user: String,

        /// Assessment id.
        id: String,
    },

    /// Show a conversation thread.
    Thread {
        #[arg(long)]
        user: String,

        /// Thread id.
        id: String,
    },

    /// Manage the user profile used to personalise replies.
    Profile {
        #[command(subcommand)]
        action: ProfileAction,
    },
}

#[derive(Subcommand)]
pub enum ProfileAction {
    /// Create or replace a profile.
    Set {
        #[arg(long)]
        user: String,

        /// A goal (repeatable).
        #[arg(long)]
        goal: Vec<String>,

        /// A struggle (repeatable).
        #[arg(long)]
        struggle: Vec<String>,

        /// Preferred communication style (e.g. "gentle", "direct").
        #[arg(long)]
        style: Option<String>,

        /// Prefer shorter, lower-pressure replies.
        #[arg(long)]
        reduce_overwhelm: bool,

        /// Work or study context.
        #[arg(long)]
        context: Option<String>,
    },

    /// Show the stored profile.
    Show {
        #[arg(long)]
        user: String,
    },
}
