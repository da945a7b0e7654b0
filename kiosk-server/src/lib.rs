//! Playmate Kiosk Server — local-first attendance for a sports club
//!
//! Members check in and out by ID or phone number; the kiosk caches
//! the member directory and every attendance record locally, then
//! periodically reconciles with the remote spreadsheet-backed API.
//! The device keeps working with no connectivity; sync catches up.
//!
//! # Module structure
//!
//! ```text
//! kiosk-server/src/
//! ├── core/        # config, state, server lifecycle, tasks
//! ├── api/         # HTTP routes and handlers
//! ├── db/          # SQLite pool + repositories
//! ├── directory/   # member directory (read-through cache)
//! ├── ledger/      # check-in/check-out state machine + sync protocol
//! ├── session/     # credentials (token provider seam)
//! ├── sync/        # remote API client + background worker
//! └── utils/       # errors, logging, time helpers
//! ```

pub mod api;
pub mod core;
pub mod db;
pub mod directory;
pub mod ledger;
pub mod session;
pub mod sync;
pub mod utils;

// Re-export public types
pub use crate::core::{Config, Server, ServerState};
pub use directory::MemberDirectory;
pub use ledger::AttendanceLedger;
pub use session::{AuthToken, SessionManager, StaticTokenProvider, TokenProvider};
pub use sync::{RemoteApi, SyncService, SyncWorker};
pub use utils::logger::{init_logger, init_logger_with_file};
pub use utils::{AppError, AppResult};
