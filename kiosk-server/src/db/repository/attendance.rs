//! Attendance Repository
//!
//! The ledger is the only writer of this table. Records are never
//! deleted; a check-out mutates the row once and flips it back to
//! unsynced.

use chrono::{DateTime, NaiveDate, Utc};
use shared::models::{AttendanceRecord, Session, Subject};
use sqlx::SqlitePool;

use super::{RepoError, RepoResult};

const ATTENDANCE_SELECT: &str = "SELECT id, member_id, visitor_ref, date, check_in_time, check_out_time, days_to_expiry, notes, synced FROM attendance";

/// Insert payload for a fresh check-in
pub struct NewAttendance<'a> {
    pub subject: &'a Subject,
    pub date: NaiveDate,
    pub check_in: DateTime<Utc>,
    pub days_to_expiry: Option<i64>,
    pub notes: &'a str,
}

#[derive(sqlx::FromRow)]
struct AttendanceRow {
    id: i64,
    member_id: Option<i64>,
    visitor_ref: Option<String>,
    date: String,
    check_in_time: i64,
    check_out_time: Option<i64>,
    days_to_expiry: Option<i64>,
    notes: String,
    synced: bool,
}

fn millis_to_datetime(millis: i64, field: &str, id: i64) -> RepoResult<DateTime<Utc>> {
    DateTime::<Utc>::from_timestamp_millis(millis).ok_or_else(|| {
        RepoError::Database(format!("attendance {id}: corrupt {field} timestamp {millis}"))
    })
}

impl AttendanceRow {
    fn into_record(self) -> RepoResult<AttendanceRecord> {
        let subject = match (self.member_id, self.visitor_ref) {
            (Some(id), None) => Subject::Member(id),
            (None, Some(raw)) => Subject::Visitor(raw),
            _ => {
                return Err(RepoError::Database(format!(
                    "attendance {}: row has no usable subject",
                    self.id
                )))
            }
        };

        let check_in = millis_to_datetime(self.check_in_time, "check_in_time", self.id)?;
        let session = match self.check_out_time {
            None => Session::Open { check_in },
            Some(out) => Session::Closed {
                check_in,
                check_out: millis_to_datetime(out, "check_out_time", self.id)?,
            },
        };

        let date = NaiveDate::parse_from_str(&self.date, "%Y-%m-%d")
            .map_err(|e| RepoError::Database(format!("attendance {}: bad date: {e}", self.id)))?;

        Ok(AttendanceRecord {
            id: self.id,
            subject,
            date,
            session,
            days_to_expiry: self.days_to_expiry,
            notes: self.notes,
            synced: self.synced,
        })
    }
}

fn subject_columns(subject: &Subject) -> (Option<i64>, Option<&str>) {
    match subject {
        Subject::Member(id) => (Some(*id), None),
        Subject::Visitor(raw) => (None, Some(raw.as_str())),
    }
}

pub async fn insert(pool: &SqlitePool, data: NewAttendance<'_>) -> RepoResult<AttendanceRecord> {
    let (member_id, visitor_ref) = subject_columns(data.subject);
    let result = sqlx::query(
        "INSERT INTO attendance (member_id, visitor_ref, date, check_in_time, check_out_time, days_to_expiry, notes, synced) VALUES (?1, ?2, ?3, ?4, NULL, ?5, ?6, 0)",
    )
    .bind(member_id)
    .bind(visitor_ref)
    .bind(data.date.format("%Y-%m-%d").to_string())
    .bind(data.check_in.timestamp_millis())
    .bind(data.days_to_expiry)
    .bind(data.notes)
    .execute(pool)
    .await?;

    let id = result.last_insert_rowid();
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database(format!("attendance {id} missing after insert")))
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<AttendanceRecord>> {
    let sql = format!("{ATTENDANCE_SELECT} WHERE id = ?");
    let row = sqlx::query_as::<_, AttendanceRow>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    row.map(AttendanceRow::into_record).transpose()
}

/// The open record for (subject, local day), if any. The uniqueness
/// invariant means there is at most one.
pub async fn find_open_on(
    pool: &SqlitePool,
    subject: &Subject,
    date: NaiveDate,
) -> RepoResult<Option<AttendanceRecord>> {
    let date = date.format("%Y-%m-%d").to_string();
    let row = match subject {
        Subject::Member(id) => {
            let sql = format!(
                "{ATTENDANCE_SELECT} WHERE member_id = ? AND date = ? AND check_out_time IS NULL LIMIT 1"
            );
            sqlx::query_as::<_, AttendanceRow>(&sql)
                .bind(id)
                .bind(&date)
                .fetch_optional(pool)
                .await?
        }
        Subject::Visitor(raw) => {
            let sql = format!(
                "{ATTENDANCE_SELECT} WHERE visitor_ref = ? AND date = ? AND check_out_time IS NULL LIMIT 1"
            );
            sqlx::query_as::<_, AttendanceRow>(&sql)
                .bind(raw)
                .bind(&date)
                .fetch_optional(pool)
                .await?
        }
    };
    row.map(AttendanceRow::into_record).transpose()
}

/// Count of open records for (subject, day); invariant checks in tests
pub async fn count_open_on(
    pool: &SqlitePool,
    subject: &Subject,
    date: NaiveDate,
) -> RepoResult<i64> {
    let (member_id, visitor_ref) = subject_columns(subject);
    let n = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM attendance WHERE date = ?1 AND check_out_time IS NULL AND ((?2 IS NOT NULL AND member_id = ?2) OR (?3 IS NOT NULL AND visitor_ref = ?3))",
    )
    .bind(date.format("%Y-%m-%d").to_string())
    .bind(member_id)
    .bind(visitor_ref)
    .fetch_one(pool)
    .await?;
    Ok(n)
}

/// Close an open record. Also flips `synced` back to 0: the mutated
/// row has to make the next sync batch again.
pub async fn set_check_out(
    pool: &SqlitePool,
    id: i64,
    check_out: DateTime<Utc>,
) -> RepoResult<AttendanceRecord> {
    let rows = sqlx::query(
        "UPDATE attendance SET check_out_time = ?1, synced = 0 WHERE id = ?2 AND check_out_time IS NULL",
    )
    .bind(check_out.timestamp_millis())
    .bind(id)
    .execute(pool)
    .await?;

    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("open attendance record {id}")));
    }
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database(format!("attendance {id} missing after update")))
}

/// All unsynced records, oldest first (sync batch order)
pub async fn find_unsynced(pool: &SqlitePool) -> RepoResult<Vec<AttendanceRecord>> {
    let sql = format!("{ATTENDANCE_SELECT} WHERE synced = 0 ORDER BY check_in_time ASC");
    let rows = sqlx::query_as::<_, AttendanceRow>(&sql).fetch_all(pool).await?;
    rows.into_iter().map(AttendanceRow::into_record).collect()
}

pub async fn find_recent(pool: &SqlitePool, limit: i64) -> RepoResult<Vec<AttendanceRecord>> {
    let sql = format!("{ATTENDANCE_SELECT} ORDER BY check_in_time DESC LIMIT ?");
    let rows = sqlx::query_as::<_, AttendanceRow>(&sql)
        .bind(limit)
        .fetch_all(pool)
        .await?;
    rows.into_iter().map(AttendanceRow::into_record).collect()
}

/// Flip `synced` for rows still in exactly the state that was pushed:
/// each snapshot is (id, check_out_time at push time). A row mutated
/// since the snapshot (a check-out landing mid-push) keeps synced = 0
/// and makes the next batch.
pub async fn mark_synced(pool: &SqlitePool, snapshots: &[(i64, Option<i64>)]) -> RepoResult<()> {
    if snapshots.is_empty() {
        return Ok(());
    }
    let mut tx = pool.begin().await?;
    for (id, check_out_time) in snapshots {
        // IS instead of = so a NULL snapshot matches a still-open row
        sqlx::query("UPDATE attendance SET synced = 1 WHERE id = ?1 AND check_out_time IS ?2")
            .bind(*id)
            .bind(*check_out_time)
            .execute(&mut *tx)
            .await?;
    }
    tx.commit().await?;
    Ok(())
}

pub async fn count_unsynced(pool: &SqlitePool) -> RepoResult<i64> {
    let n = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM attendance WHERE synced = 0")
        .fetch_one(pool)
        .await?;
    Ok(n)
}

pub async fn count_for_date(pool: &SqlitePool, date: NaiveDate) -> RepoResult<i64> {
    let n = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM attendance WHERE date = ?")
        .bind(date.format("%Y-%m-%d").to_string())
        .fetch_one(pool)
        .await?;
    Ok(n)
}
