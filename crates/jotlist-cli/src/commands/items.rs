//! Item commands - add, edit, done, list
//!
//! Mutations are purely local; they land on the server through the next
//! sync cycle (`jotlist sync` or the foreground `jotlist run` loop).

use anyhow::Result;
use clap::Args;
use serde_json::json;

use jotlist_core::domain::ItemId;
use jotlist_core::ports::Notifier;

use super::AppContext;

/// Add a new item with the given text
#[derive(Debug, Args)]
pub struct AddCommand {
    /// Item text
    pub text: String,
}

impl AddCommand {
    pub async fn execute(&self, ctx: &AppContext) -> Result<()> {
        let id = ctx
            .session
            .engine()
            .create_item(Some(json!(self.text)))
            .await?;
        println!("Added {id}");
        if let Some(notice) = ctx.notices.current() {
            println!("warning: {notice:?}");
        }
        Ok(())
    }
}

/// Replace an item's text
#[derive(Debug, Args)]
pub struct EditCommand {
    /// Item id (as shown by `jotlist list`)
    pub id: ItemId,
    /// New item text
    pub text: String,
}

impl EditCommand {
    pub async fn execute(&self, ctx: &AppContext) -> Result<()> {
        ctx.session
            .engine()
            .update_item(&self.id, Some(json!(self.text)))
            .await?;
        println!("Updated {}", self.id);
        Ok(())
    }
}

/// Delete an item (tombstone; carried to the server on the next sync)
#[derive(Debug, Args)]
pub struct DoneCommand {
    /// Item id (as shown by `jotlist list`)
    pub id: ItemId,
}

impl DoneCommand {
    pub async fn execute(&self, ctx: &AppContext) -> Result<()> {
        ctx.session.engine().update_item(&self.id, None).await?;
        println!("Deleted {}", self.id);
        Ok(())
    }
}

/// Print the working list
#[derive(Debug, Args)]
pub struct ListCommand {}

impl ListCommand {
    pub async fn execute(&self, ctx: &AppContext) -> Result<()> {
        let items = ctx.session.engine().items().await?;
        if items.is_empty() {
            println!("(no items)");
            return Ok(());
        }
        for (id, record) in items {
            let text = match &record.value {
                Some(serde_json::Value::String(s)) => s.clone(),
                Some(other) => other.to_string(),
                None => "(deleted)".to_string(),
            };
            let marker = if record.is_pending() { "*" } else { " " };
            println!("{marker} {id}  {text}");
        }
        Ok(())
    }
}
