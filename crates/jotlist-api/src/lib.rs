//! Jotlist API - Sync endpoint client
//!
//! Provides:
//! - [`HttpSyncTransport`] - the `SyncTransport` adapter over the
//!   bearer-authenticated `/item/sync` endpoint, with response status
//!   classification into the engine's failure taxonomy
//! - [`KeyringTokenStorage`] / [`MemoryTokenStorage`] - credential
//!   storage behind the [`TokenStorage`] trait
//!
//! ## Modules
//!
//! - [`client`] - HTTP transport implementation
//! - [`auth`] - bearer credential storage

pub mod auth;
pub mod client;

pub use auth::{KeyringTokenStorage, MemoryTokenStorage, TokenStorage};
pub use client::HttpSyncTransport;
