//! Shared test harness: on-disk sqlite, in-process mock of the remote
//! API, and a fully wired directory + ledger.
#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use tempfile::TempDir;
use tokio::sync::Mutex;

use kiosk_server::db::repository::member;
use kiosk_server::db::DbService;
use kiosk_server::{
    AppError, AppResult, AttendanceLedger, MemberDirectory, RemoteApi, SessionManager,
    StaticTokenProvider,
};
use shared::models::Member;
use shared::sync::{AttendanceSyncEntry, AttendanceSyncOutcome, AttendanceSyncReport};

/// Programmable stand-in for the remote spreadsheet API
pub struct MockRemote {
    /// Member list served by fetch_members
    pub members: Mutex<Vec<Member>>,
    /// Simulate a network failure on fetch_members
    pub fail_fetch: AtomicBool,
    /// Simulate a network failure on push_attendance
    pub fail_push: AtomicBool,
    /// Verdict to return for the next pushes; None = accept everything
    pub queued_report: Mutex<Option<AttendanceSyncReport>>,
    /// Artificial latency inside push_attendance
    pub push_delay: Mutex<Duration>,
    pub fetch_calls: AtomicUsize,
    pub push_calls: AtomicUsize,
    /// Every batch that reached the mock, in order
    pub pushed: Mutex<Vec<Vec<AttendanceSyncEntry>>>,
}

impl MockRemote {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            members: Mutex::new(Vec::new()),
            fail_fetch: AtomicBool::new(false),
            fail_push: AtomicBool::new(false),
            queued_report: Mutex::new(None),
            push_delay: Mutex::new(Duration::ZERO),
            fetch_calls: AtomicUsize::new(0),
            push_calls: AtomicUsize::new(0),
            pushed: Mutex::new(Vec::new()),
        })
    }

    pub async fn set_members(&self, members: Vec<Member>) {
        *self.members.lock().await = members;
    }

    pub async fn reject_with(&self, report: AttendanceSyncReport) {
        *self.queued_report.lock().await = Some(report);
    }
}

#[async_trait]
impl RemoteApi for MockRemote {
    async fn fetch_members(&self, _club_id: &str, _token: &str) -> AppResult<Vec<Member>> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_fetch.load(Ordering::SeqCst) {
            return Err(AppError::transport("connection refused"));
        }
        Ok(self.members.lock().await.clone())
    }

    async fn push_attendance(
        &self,
        _club_id: &str,
        _token: &str,
        entries: Vec<AttendanceSyncEntry>,
    ) -> AppResult<AttendanceSyncReport> {
        self.push_calls.fetch_add(1, Ordering::SeqCst);
        let delay = *self.push_delay.lock().await;
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        if self.fail_push.load(Ordering::SeqCst) {
            return Err(AppError::transport("connection refused"));
        }
        let count = entries.len();
        self.pushed.lock().await.push(entries);

        if let Some(report) = self.queued_report.lock().await.clone() {
            return Ok(report);
        }
        // Default: server accepts everything
        Ok(AttendanceSyncReport {
            success_count: count,
            failure_count: 0,
            results: (0..count)
                .map(|index| AttendanceSyncOutcome {
                    success: true,
                    index,
                    error: None,
                })
                .collect(),
        })
    }
}

pub struct Harness {
    _tmp: TempDir,
    pub db: DbService,
    pub remote: Arc<MockRemote>,
    pub session: Arc<SessionManager>,
    pub directory: Arc<MemberDirectory>,
    pub ledger: Arc<AttendanceLedger>,
}

impl Harness {
    /// Default 10 s debounce, as in production
    pub async fn new() -> Self {
        Self::with_debounce(Duration::from_secs(10)).await
    }

    pub async fn with_debounce(debounce: Duration) -> Self {
        let tmp = TempDir::new().expect("tempdir");
        let db = DbService::new(&tmp.path().join("kiosk.db"))
            .await
            .expect("open db");

        let remote = MockRemote::new();
        let session = Arc::new(SessionManager::new(
            "test-club",
            Arc::new(StaticTokenProvider::new("test-token")),
        ));
        let directory = Arc::new(MemberDirectory::new(
            db.clone(),
            remote.clone(),
            session.clone(),
        ));
        let ledger = Arc::new(AttendanceLedger::new(
            db.clone(),
            directory.clone(),
            remote.clone(),
            session.clone(),
            debounce,
        ));

        Self {
            _tmp: tmp,
            db,
            remote,
            session,
            directory,
            ledger,
        }
    }

    /// Seed the local directory without going through refresh()
    pub async fn seed_members(&self, members: &[Member]) {
        member::replace_all(&self.db.pool, members)
            .await
            .expect("seed members");
    }
}

/// A member expiring `expiry_days` whole days (plus a few hours) from now
pub fn make_member(id: i64, phone: &str, expiry_days: i64) -> Member {
    let now = Utc::now();
    Member {
        row_number: id,
        id,
        first_name: format!("First{id}"),
        last_name: format!("Last{id}"),
        email: format!("member{id}@example.com"),
        phone: phone.to_string(),
        place: "Court A".into(),
        join_date: now - chrono::Duration::days(365),
        status: "Active".into(),
        expiry_date: now + chrono::Duration::days(expiry_days) + chrono::Duration::hours(6),
        notes: None,
    }
}
