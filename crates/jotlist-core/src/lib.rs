//! Jotlist Core - Domain logic and business rules
//!
//! This crate contains the hexagonal architecture core with:
//! - **Domain types** - `ItemId`, `RemoteRecord`, `LocalRecord`, `WorkingList`
//! - **Port definitions** - Traits for adapters: `ItemStore`, `ItemController`,
//!   `SyncTransport`, `StatusSink`, `Notifier`
//! - **Configuration** - Typed YAML configuration with defaults and validation
//!
//! # Architecture
//!
//! This crate follows the hexagonal (ports & adapters) architecture pattern.
//! The domain module contains pure business logic with no I/O.
//! Ports define trait interfaces that adapter crates implement; the sync
//! engine in `jotlist-sync` only ever talks to those interfaces.

pub mod config;
pub mod domain;
pub mod ports;
