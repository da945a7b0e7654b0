//! Data models
//!
//! Shared between kiosk-server, its HTTP API and the sync protocol.
//! All IDs are `i64` (SQLite INTEGER PRIMARY KEY).

pub mod attendance;
pub mod member;

// Re-exports
pub use attendance::*;
pub use member::*;
