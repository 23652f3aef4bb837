//! Jotlist Sync - Scheduler and reconciliation engine
//!
//! The stateful heart of the client: decides *when* to sync (debounce,
//! idle ceiling, rate guard) and *how* to fold the server's authoritative
//! snapshot into locally-mutated state without losing unsynced edits.
//!
//! ## Modules
//!
//! - [`scheduler`] - timer-driven scheduling loop (`SyncScheduler`)
//! - [`engine`] - sync attempts and the reconciliation algorithm
//!   (`SyncEngine`)
//! - [`controller`] - the default per-item merge policy
//!   (`VersionedItemController`) and the id->controller arena
//! - [`session`] - login/logout transitions and the logout collapse
//! - [`status`] - in-process status and notice collaborators
//!
//! At most one sync attempt is in flight at any time; reconciliation
//! mutates the durable store from a single logical thread of control.

pub mod controller;
pub mod engine;
pub mod scheduler;
pub mod session;
pub mod status;

pub use controller::{ControllerArena, VersionedItemController};
pub use engine::{SyncEngine, SyncOutcome};
pub use scheduler::{SchedulerHandle, SyncScheduler};
pub use session::SessionManager;
pub use status::{NoticeBoard, SyncStatus};
