//! Sync transport port and failure taxonomy
//!
//! One RPC-style exchange: the client submits its batch of local payloads
//! and receives the server's complete authoritative set back. Failures
//! are classified into the three cases the engine reacts to differently;
//! everything else is an opaque cycle failure.

use anyhow::Result;
use thiserror::Error;

use crate::domain::record::{AuthoritativeItem, SyncPayload};

/// Classified transport failure
#[derive(Debug, Error)]
pub enum TransportError {
    /// The server no longer recognizes the credential; the session must
    /// end (non-retryable without a new credential)
    #[error("credential no longer recognized by server")]
    AuthInvalid,

    /// The server refused the exchange for rate reasons; retried
    /// naturally on the next scheduled tick
    #[error("rate limited by server")]
    RateLimited,

    /// Network, parse, or unexpected-status failure; reported silently
    /// as a cycle failure and retried on the next tick
    #[error(transparent)]
    Failed(#[from] anyhow::Error),
}

/// Port trait for the sync network exchange
#[async_trait::async_trait]
pub trait SyncTransport: Send + Sync {
    /// Submit `batch` under `token` and return the server's complete
    /// authoritative record set
    async fn exchange(
        &self,
        token: &str,
        batch: &[SyncPayload],
    ) -> Result<Vec<AuthoritativeItem>, TransportError>;
}
