//! Attendance Ledger
//!
//! Owns the check-in/check-out state machine per subject per local
//! day, durability of unsynced records, and the reconciliation
//! protocol against the remote API.
//!
//! Rules it guarantees:
//! - at most one open record per (subject, local day);
//! - a record is persisted locally before any network involvement;
//! - unresolved identifiers are still durably recorded as visitor
//!   entries, even though the caller is told "not found";
//! - `synced` only flips to true after the server accepted the whole
//!   batch (all-or-nothing bookkeeping, no partial credit).

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use shared::models::{AttendanceRecord, Session, Subject};
use shared::sync::AttendanceSyncEntry;
use shared::util::now_millis;
use tokio::sync::Mutex;

use crate::db::repository::{attendance, sync_state};
use crate::db::DbService;
use crate::directory::MemberDirectory;
use crate::session::SessionManager;
use crate::sync::RemoteApi;
use crate::utils::time::local_date;
use crate::utils::{AppError, AppResult};

pub struct AttendanceLedger {
    db: DbService,
    directory: Arc<MemberDirectory>,
    remote: Arc<dyn RemoteApi>,
    session: Arc<SessionManager>,
    /// Minimum age of an open record before it can be checked out;
    /// guards against a double-tap closing a fresh check-in.
    debounce: Duration,
    /// Serializes the query-then-write section of `log_attendance`
    punch_lock: Mutex<()>,
    /// Collapses overlapping sync triggers into a no-op
    sync_in_flight: AtomicBool,
}

impl AttendanceLedger {
    pub fn new(
        db: DbService,
        directory: Arc<MemberDirectory>,
        remote: Arc<dyn RemoteApi>,
        session: Arc<SessionManager>,
        debounce: Duration,
    ) -> Self {
        Self {
            db,
            directory,
            remote,
            session,
            debounce,
            punch_lock: Mutex::new(()),
            sync_in_flight: AtomicBool::new(false),
        }
    }

    /// Resolve an operator-submitted identifier and toggle attendance.
    ///
    /// Unresolved identifiers still produce a durable visitor record —
    /// the physical visit happened — but the caller gets a not-found
    /// error so the kiosk can flag the input.
    pub async fn process_identifier(&self, identifier: &str) -> AppResult<AttendanceRecord> {
        let identifier = identifier.trim();
        if identifier.is_empty() {
            return Err(AppError::validation("identifier must not be empty"));
        }

        match self.directory.resolve_identifier(identifier).await? {
            Some(member) => {
                tracing::info!(
                    member_id = member.id,
                    name = %member.display_name(),
                    "Identifier resolved, logging attendance"
                );
                self.log_attendance(Subject::Member(member.id), "").await
            }
            None => {
                tracing::warn!(identifier, "Unknown identifier, recording visitor entry");
                match self
                    .log_attendance(Subject::Visitor(identifier.to_string()), "")
                    .await
                {
                    // The visit is already on record from seconds ago;
                    // the user-facing verdict stays "not found".
                    Ok(_) | Err(AppError::TooSoon(_)) => {}
                    Err(other) => return Err(other),
                }
                Err(AppError::not_found(format!(
                    "No member found with ID or phone: {identifier}"
                )))
            }
        }
    }

    /// Check-in/check-out state machine for one subject.
    ///
    /// An open record for (subject, today) means this call is a
    /// check-out; otherwise it is a check-in. Both paths leave the
    /// record unsynced.
    pub async fn log_attendance(
        &self,
        subject: Subject,
        notes: &str,
    ) -> AppResult<AttendanceRecord> {
        let _guard = self.punch_lock.lock().await;

        let now = Utc::now();
        let today = local_date(now);

        if let Some(open) = attendance::find_open_on(&self.db.pool, &subject, today).await? {
            let age = now.signed_duration_since(open.session.check_in());
            if age < chrono::Duration::from_std(self.debounce).unwrap_or_default() {
                return Err(AppError::too_soon(format!(
                    "Checked in {} seconds ago; try again shortly",
                    age.num_seconds().max(0)
                )));
            }

            // Session::close clamps check_out to >= check_in
            let check_out = match open.session.close(now) {
                Some(Session::Closed { check_out, .. }) => check_out,
                _ => {
                    return Err(AppError::database(format!(
                        "attendance {}: open record already closed",
                        open.id
                    )))
                }
            };
            let record = attendance::set_check_out(&self.db.pool, open.id, check_out).await?;
            tracing::info!(record_id = record.id, "Check-out recorded");
            return Ok(record);
        }

        let days_to_expiry = match &subject {
            Subject::Member(id) => {
                let member = self
                    .directory
                    .get_by_id(*id)
                    .await?
                    .ok_or_else(|| AppError::not_found(format!("Member {id} not found")))?;
                Some(member.days_to_expiry(now))
            }
            Subject::Visitor(_) => None,
        };

        let record = attendance::insert(
            &self.db.pool,
            attendance::NewAttendance {
                subject: &subject,
                date: today,
                check_in: now,
                days_to_expiry,
                notes,
            },
        )
        .await?;
        tracing::info!(record_id = record.id, "Check-in recorded");
        Ok(record)
    }

    /// Push every unsynced record to the remote API in one batch.
    ///
    /// Returns `Ok(false)` when another sync is already in flight
    /// (overlapping scheduled and manual triggers collapse into a
    /// no-op), `Ok(true)` when this call completed a sync round.
    pub async fn sync_unsynced(&self) -> AppResult<bool> {
        if self.sync_in_flight.swap(true, Ordering::SeqCst) {
            tracing::debug!("Sync already in progress, skipping");
            return Ok(false);
        }
        let result = self.run_sync().await;
        self.sync_in_flight.store(false, Ordering::SeqCst);
        result
    }

    async fn run_sync(&self) -> AppResult<bool> {
        let unsynced = attendance::find_unsynced(&self.db.pool).await?;

        if unsynced.is_empty() {
            sync_state::touch_attendance_sync(&self.db.pool, now_millis()).await?;
            tracing::debug!("No unsynced attendance, nothing to push");
            return Ok(true);
        }

        let entries: Vec<AttendanceSyncEntry> =
            unsynced.iter().map(AttendanceSyncEntry::from_record).collect();
        let count = entries.len();

        let token = self.session.bearer().await?;
        let report = self
            .remote
            .push_attendance(self.session.club_id(), &token, entries)
            .await?;

        // All-or-nothing bookkeeping: a single rejected entry fails the
        // batch and nothing is marked synced; the whole set is retried
        // on the next cycle.
        if !report.all_accepted() {
            return Err(AppError::server(format!(
                "Failed to sync some records:\n{}",
                report.failure_summary()
            )));
        }

        // Mark only rows still in the state the server saw. A check-out
        // landing mid-push changed its row, which therefore stays
        // unsynced and is pushed again next cycle.
        let snapshots: Vec<(i64, Option<i64>)> = unsynced
            .iter()
            .map(|r| (r.id, r.session.check_out().map(|t| t.timestamp_millis())))
            .collect();
        attendance::mark_synced(&self.db.pool, &snapshots).await?;
        sync_state::touch_attendance_sync(&self.db.pool, now_millis()).await?;

        tracing::info!(count, "Attendance batch accepted and marked synced");
        Ok(true)
    }
}
