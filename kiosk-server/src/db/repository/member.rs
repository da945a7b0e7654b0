//! Member Repository

use chrono::{DateTime, Utc};
use shared::models::Member;
use sqlx::SqlitePool;

use super::{RepoError, RepoResult};

const MEMBER_SELECT: &str = "SELECT id, row_number, first_name, last_name, email, phone, place, join_date, status, expiry_date, notes FROM members";

#[derive(sqlx::FromRow)]
struct MemberRow {
    id: i64,
    row_number: i64,
    first_name: String,
    last_name: String,
    email: String,
    phone: String,
    place: String,
    join_date: i64,
    status: String,
    expiry_date: i64,
    notes: Option<String>,
}

fn millis_to_datetime(millis: i64, field: &str, id: i64) -> RepoResult<DateTime<Utc>> {
    DateTime::<Utc>::from_timestamp_millis(millis)
        .ok_or_else(|| RepoError::Database(format!("member {id}: corrupt {field} timestamp {millis}")))
}

impl MemberRow {
    fn into_member(self) -> RepoResult<Member> {
        Ok(Member {
            row_number: self.row_number,
            id: self.id,
            first_name: self.first_name,
            last_name: self.last_name,
            email: self.email,
            phone: self.phone,
            place: self.place,
            join_date: millis_to_datetime(self.join_date, "join_date", self.id)?,
            status: self.status,
            expiry_date: millis_to_datetime(self.expiry_date, "expiry_date", self.id)?,
            notes: self.notes,
        })
    }
}

pub async fn find_all(pool: &SqlitePool) -> RepoResult<Vec<Member>> {
    let sql = format!("{MEMBER_SELECT} ORDER BY row_number");
    let rows = sqlx::query_as::<_, MemberRow>(&sql).fetch_all(pool).await?;
    rows.into_iter().map(MemberRow::into_member).collect()
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Member>> {
    let sql = format!("{MEMBER_SELECT} WHERE id = ?");
    let row = sqlx::query_as::<_, MemberRow>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    row.map(MemberRow::into_member).transpose()
}

/// Single-query identifier resolution: exact id match or exact phone
/// match, first match wins (id wins over phone for the same input).
pub async fn find_by_id_or_phone(pool: &SqlitePool, identifier: &str) -> RepoResult<Option<Member>> {
    let sql = format!(
        "{MEMBER_SELECT} WHERE CAST(id AS TEXT) = ?1 OR phone = ?1 ORDER BY CASE WHEN CAST(id AS TEXT) = ?1 THEN 0 ELSE 1 END, row_number LIMIT 1"
    );
    let row = sqlx::query_as::<_, MemberRow>(&sql)
        .bind(identifier)
        .fetch_optional(pool)
        .await?;
    row.map(MemberRow::into_member).transpose()
}

pub async fn count(pool: &SqlitePool) -> RepoResult<i64> {
    let n = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM members")
        .fetch_one(pool)
        .await?;
    Ok(n)
}

/// Atomically replace the whole member set (directory refresh is a
/// full replace, not a merge).
pub async fn replace_all(pool: &SqlitePool, members: &[Member]) -> RepoResult<()> {
    let mut tx = pool.begin().await?;

    sqlx::query("DELETE FROM members").execute(&mut *tx).await?;

    for m in members {
        sqlx::query(
            "INSERT INTO members (id, row_number, first_name, last_name, email, phone, place, join_date, status, expiry_date, notes) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
        )
        .bind(m.id)
        .bind(m.row_number)
        .bind(&m.first_name)
        .bind(&m.last_name)
        .bind(&m.email)
        .bind(&m.phone)
        .bind(&m.place)
        .bind(m.join_date.timestamp_millis())
        .bind(&m.status)
        .bind(m.expiry_date.timestamp_millis())
        .bind(&m.notes)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;
    Ok(())
}
