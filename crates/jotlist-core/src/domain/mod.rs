//! Domain types for the jotlist sync model
//!
//! Pure data: identifiers, the two persisted records kept per item, the
//! ordered working list, and the wire types exchanged with the server.
//! No I/O happens here; the ports module defines the seams adapters plug
//! into.

pub mod errors;
pub mod id;
pub mod list;
pub mod record;

pub use errors::DomainError;
pub use id::ItemId;
pub use list::{ListOrder, WorkingList};
pub use record::{AuthoritativeItem, LocalRecord, RemoteRecord, SyncPayload};
