//! Port definitions (hexagonal architecture)
//!
//! Traits the sync engine depends on, implemented by adapter crates:
//!
//! - [`ItemStore`] - durable key->JSON persistence (`jotlist-store`)
//! - [`ItemController`] - per-item payload/merge capability
//!   (`jotlist-sync` ships the default implementation)
//! - [`SyncTransport`] - the network exchange (`jotlist-api`)
//! - [`StatusSink`] / [`Notifier`] - status and user-notice collaborators
//!   (`jotlist-sync` ships in-process defaults)

pub mod controller;
pub mod item_store;
pub mod status;
pub mod transport;

pub use controller::{ItemController, MergeEffects, MergeOutcome};
pub use item_store::{ItemStore, Records};
pub use status::{Notifier, StatusSink, UserNotice};
pub use transport::{SyncTransport, TransportError};
