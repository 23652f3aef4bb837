//! Sync commands - one-shot sync, status, and the foreground run loop

use anyhow::Result;
use clap::Args;
use tokio_util::sync::CancellationToken;
use tracing::info;

use jotlist_api::TokenStorage;
use jotlist_sync::SyncOutcome;

use super::AppContext;

/// Run one sync attempt now
#[derive(Debug, Args)]
pub struct SyncCommand {}

impl SyncCommand {
    pub async fn execute(&self, ctx: &AppContext) -> Result<()> {
        let Some(token) = ctx.stored_token()? else {
            anyhow::bail!("Not logged in. Run 'jotlist login <token>' first.");
        };

        let engine = ctx.session.engine();
        engine.set_token(Some(token));
        ctx.session.scheduler().handle().enable();

        let outcome = engine.attempt().await?;
        match outcome {
            SyncOutcome::Completed => println!("Sync complete."),
            SyncOutcome::RateLimited => println!("Rate limited; try again shortly."),
            SyncOutcome::AuthInvalid => {
                ctx.tokens.clear()?;
                println!("Credential rejected; logged out. Unsynced items kept as drafts.");
            }
            SyncOutcome::Failed => println!("Sync failed; local state unchanged."),
            other => println!("Sync skipped ({other:?})."),
        }
        Ok(())
    }
}

/// Show list and session status
#[derive(Debug, Args)]
pub struct StatusCommand {}

impl StatusCommand {
    pub async fn execute(&self, ctx: &AppContext) -> Result<()> {
        let items = ctx.session.engine().items().await?;
        let pending = items.iter().filter(|(_, r)| r.is_pending()).count();
        let local = items.iter().filter(|(id, _)| id.is_local()).count();

        println!("Items:          {}", items.len());
        println!("Pending edits:  {pending}");
        println!("Local-only ids: {local}");
        println!(
            "Logged in:      {}",
            if ctx.stored_token()?.is_some() { "yes" } else { "no" }
        );
        if items.len() > ctx.config.list.max_len {
            println!(
                "warning: list exceeds the soft cap of {} items; only the first {} sync",
                ctx.config.list.max_len, ctx.config.list.max_len
            );
        }
        Ok(())
    }
}

/// Run the sync scheduler in the foreground until interrupted
#[derive(Debug, Args)]
pub struct RunCommand {}

impl RunCommand {
    pub async fn execute(&self, ctx: &AppContext) -> Result<()> {
        let Some(token) = ctx.stored_token()? else {
            anyhow::bail!("Not logged in. Run 'jotlist login <token>' first.");
        };

        ctx.session.login(token);
        info!("Scheduler running; press Ctrl-C to stop");

        let shutdown = CancellationToken::new();
        let signal_token = shutdown.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                signal_token.cancel();
            }
        });

        shutdown.cancelled().await;
        info!("Shutting down");
        ctx.session.scheduler().disable();

        // If the server invalidated the credential while running, drop it
        if !ctx.session.engine().has_token() {
            ctx.tokens.clear()?;
        }
        Ok(())
    }
}
