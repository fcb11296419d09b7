//! Orchestration services over the marketplace and store ports.

mod lifecycle;
mod sync;

pub use lifecycle::{DisposeError, LifecycleError, LifecycleResult, LifecycleService};
pub use sync::{BatchFailure, BatchReport, SyncError, SyncResult, SyncService};
