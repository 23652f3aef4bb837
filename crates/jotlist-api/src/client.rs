//! HTTP sync transport
//!
//! One POST per sync cycle: the request body is the batch of local
//! payloads, the response body is the server's complete authoritative
//! record set for the account (never a delta).
//!
//! Status classification:
//!
//! | Status      | Meaning                                        |
//! |-------------|------------------------------------------------|
//! | 200         | Parse body as the authoritative array          |
//! | 404         | Credential invalid - session must end          |
//! | 429         | Rate limited - user-visible notice, no change  |
//! | anything else, or a transport/parse error | silent cycle failure |

use std::time::Duration;

use anyhow::{anyhow, Context};
use reqwest::{Client, StatusCode};
use tracing::{debug, warn};

use jotlist_core::domain::{AuthoritativeItem, SyncPayload};
use jotlist_core::ports::{SyncTransport, TransportError};

/// Path of the sync endpoint relative to the API base URL
const SYNC_PATH: &str = "/item/sync";

/// `SyncTransport` adapter over HTTP
///
/// Wraps `reqwest::Client` with the base URL and bearer authentication.
/// The base URL is injectable so tests can point the transport at a mock
/// server.
pub struct HttpSyncTransport {
    /// The underlying HTTP client
    client: Client,
    /// Base URL for API requests
    base_url: String,
}

impl HttpSyncTransport {
    /// Creates a transport against the given base URL
    ///
    /// # Arguments
    /// * `base_url` - API origin, e.g. `https://api.jotlist.io`
    /// * `timeout` - per-request timeout
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    /// The sync endpoint URL
    fn sync_url(&self) -> String {
        format!("{}{SYNC_PATH}", self.base_url.trim_end_matches('/'))
    }
}

#[async_trait::async_trait]
impl SyncTransport for HttpSyncTransport {
    async fn exchange(
        &self,
        token: &str,
        batch: &[SyncPayload],
    ) -> Result<Vec<AuthoritativeItem>, TransportError> {
        debug!(items = batch.len(), "Submitting sync batch");

        let response = self
            .client
            .post(self.sync_url())
            .bearer_auth(token)
            .json(batch)
            .send()
            .await
            .context("Sync request failed to send")?;

        match response.status() {
            StatusCode::OK => {
                let items: Vec<AuthoritativeItem> = response
                    .json()
                    .await
                    .context("Failed to parse authoritative response body")?;
                debug!(items = items.len(), "Received authoritative snapshot");
                Ok(items)
            }
            StatusCode::NOT_FOUND => {
                warn!("Server no longer recognizes the credential");
                Err(TransportError::AuthInvalid)
            }
            StatusCode::TOO_MANY_REQUESTS => {
                debug!("Server rate-limited the sync attempt");
                Err(TransportError::RateLimited)
            }
            status => Err(TransportError::Failed(anyhow!(
                "Unexpected sync response status: {status}"
            ))),
        }
    }
}
