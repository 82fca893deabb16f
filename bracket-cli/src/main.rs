//! Bracket CLI - run a tournament bracket from the terminal
//!
//! Commands:
//! - new: Draw teams, load the bracket and start a journal
//! - status: Show the bracket from a journal
//! - resolve: Record a match result
//! - convert: Convert legacy `.game` brackets to JSON

mod convert_cmd;
mod new_cmd;
mod output;
mod resolve_cmd;
mod status_cmd;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "bracket")]
#[command(about = "Double-elimination tournament bracket runner")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Draw teams and start a new tournament
    New(new_cmd::NewArgs),
    /// Show the current state of a tournament
    Status(status_cmd::StatusArgs),
    /// Record the result of a match
    Resolve(resolve_cmd::ResolveArgs),
    /// Convert legacy .game bracket files to JSON
    Convert(convert_cmd::ConvertArgs),
}

fn main() -> anyhow::Result<()> {
    // Logs go to stderr so stdout stays parseable
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::New(args) => new_cmd::run(args),
        Commands::Status(args) => status_cmd::run(args),
        Commands::Resolve(args) => resolve_cmd::run(args),
        Commands::Convert(args) => convert_cmd::run(args),
    }
}
