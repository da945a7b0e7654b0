//! Remote sync: API contract, HTTP client and background worker

pub mod service;
pub mod worker;

use async_trait::async_trait;
use shared::models::Member;
use shared::sync::{AttendanceSyncEntry, AttendanceSyncReport};

use crate::utils::AppResult;

pub use service::SyncService;
pub use worker::SyncWorker;

/// Contract with the remote spreadsheet-backed API.
///
/// The trait seam keeps the ledger and directory testable against an
/// in-process mock; [`SyncService`] is the production implementation.
#[async_trait]
pub trait RemoteApi: Send + Sync {
    /// Full member list for the club
    async fn fetch_members(&self, club_id: &str, token: &str) -> AppResult<Vec<Member>>;

    /// Push one batch of attendance entries; the server evaluates each
    /// entry independently and reports per-entry outcomes.
    async fn push_attendance(
        &self,
        club_id: &str,
        token: &str,
        entries: Vec<AttendanceSyncEntry>,
    ) -> AppResult<AttendanceSyncReport>;
}
