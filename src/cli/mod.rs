//! Command-line interface for the Agora engagement engine.

pub mod commands;
pub mod id_resolver;
pub mod output;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "agora")]
#[command(about = "Agora - alumni association proposal and engagement platform", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output in JSON format
    #[arg(short, long, global = true)]
    pub json: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize Agora configuration and database
    Init(commands::init::InitArgs),

    /// Submit, edit, list, and advance proposals
    Proposal(commands::proposal::ProposalArgs),

    /// Cast or toggle votes on proposals and comments
    Vote(commands::vote::VoteArgs),

    /// Comment threads on proposals and executions
    Comment(commands::comment::CommentArgs),

    /// Execution records: outcomes, attendance, documentation
    Execution(commands::execution::ExecutionArgs),

    /// Run the expiry scan once or keep it running on schedule
    Scan(commands::scan::ScanArgs),

    /// Serve the engagement HTTP API
    Serve(commands::serve::ServeArgs),
}

/// Print an error in the requested format and exit non-zero.
pub fn handle_error(err: anyhow::Error, json_mode: bool) {
    if json_mode {
        let payload = serde_json::json!({
            "success": false,
            "error": format!("{err:#}"),
        });
        eprintln!(
            "{}",
            serde_json::to_string_pretty(&payload).unwrap_or_default()
        );
    } else {
        eprintln!("Error: {err:#}");
    }
    std::process::exit(1);
}
