//! Shared types for the Playmate kiosk
//!
//! Domain models and wire-protocol types used by kiosk-server and its
//! tests. Pure data: no I/O, no runtime dependencies.

pub mod models;
pub mod sync;
pub mod util;

// Re-exports
pub use models::{AttendanceRecord, Member, Session, Subject};
pub use serde::{Deserialize, Serialize};
pub use sync::{
    ApiResponse, AttendanceSyncEntry, AttendanceSyncOutcome, AttendanceSyncReport,
    AttendanceSyncRequest,
};
