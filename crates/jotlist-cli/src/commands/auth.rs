//! Session commands - login and logout

use anyhow::Result;
use clap::Args;
use tracing::info;

use jotlist_api::TokenStorage;
use jotlist_sync::SyncOutcome;

use super::AppContext;

/// Store the sync credential and run an initial sync
#[derive(Debug, Args)]
pub struct LoginCommand {
    /// Bearer token for the sync service
    pub token: String,
}

impl LoginCommand {
    pub async fn execute(&self, ctx: &AppContext) -> Result<()> {
        ctx.tokens.store(&self.token)?;

        // Gaining a credential triggers an immediate attempt
        let engine = ctx.session.engine();
        engine.set_token(Some(self.token.clone()));
        ctx.session.scheduler().handle().enable();
        let outcome = engine.attempt().await?;

        match outcome {
            SyncOutcome::Completed => println!("Logged in; initial sync complete."),
            SyncOutcome::AuthInvalid => {
                ctx.tokens.clear()?;
                anyhow::bail!("The server rejected this credential");
            }
            other => {
                info!(outcome = ?other, "Initial sync did not complete");
                println!("Logged in; initial sync pending ({other:?}).");
            }
        }
        Ok(())
    }
}

/// End the session: stop syncing and detach items from the server
#[derive(Debug, Args)]
pub struct LogoutCommand {}

impl LogoutCommand {
    pub async fn execute(&self, ctx: &AppContext) -> Result<()> {
        ctx.session.engine().end_session().await?;
        ctx.tokens.clear()?;
        println!("Logged out; unsynced items kept as local drafts.");
        Ok(())
    }
}
