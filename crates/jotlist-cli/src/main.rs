//! Jotlist CLI - Command-line interface for jotlist
//!
//! Provides commands for:
//! - Managing list items (add, edit, done, list)
//! - Session control (login, logout)
//! - Synchronization (sync, status, run)

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

use commands::{
    auth::{LoginCommand, LogoutCommand},
    items::{AddCommand, DoneCommand, EditCommand, ListCommand},
    sync::{RunCommand, StatusCommand, SyncCommand},
};

#[derive(Debug, Parser)]
#[command(name = "jotlist", version, about = "Offline-first synced item list")]
pub struct Cli {
    /// Verbose output (can be repeated: -v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Use alternate config file
    #[arg(long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Add a new item
    Add(AddCommand),
    /// Replace an item's text
    Edit(EditCommand),
    /// Delete an item
    Done(DoneCommand),
    /// Show the working list
    List(ListCommand),
    /// Store the sync credential and run an initial sync
    Login(LoginCommand),
    /// End the session and detach items from the server
    Logout(LogoutCommand),
    /// Run one sync attempt now
    Sync(SyncCommand),
    /// Show list and session status
    Status(StatusCommand),
    /// Run the sync scheduler in the foreground until interrupted
    Run(RunCommand),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup tracing
    let filter = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .init();

    let ctx = commands::AppContext::init(cli.config.as_deref()).await?;

    match cli.command {
        Commands::Add(cmd) => cmd.execute(&ctx).await,
        Commands::Edit(cmd) => cmd.execute(&ctx).await,
        Commands::Done(cmd) => cmd.execute(&ctx).await,
        Commands::List(cmd) => cmd.execute(&ctx).await,
        Commands::Login(cmd) => cmd.execute(&ctx).await,
        Commands::Logout(cmd) => cmd.execute(&ctx).await,
        Commands::Sync(cmd) => cmd.execute(&ctx).await,
        Commands::Status(cmd) => cmd.execute(&ctx).await,
        Commands::Run(cmd) => cmd.execute(&ctx).await,
    }
}
