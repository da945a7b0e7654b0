//! Sync State Repository (Singleton)
//!
//! One row holding the last successful member-refresh and
//! attendance-sync timestamps.

use serde::Serialize;
use shared::util::now_millis;
use sqlx::SqlitePool;

use super::{RepoError, RepoResult};

const SINGLETON_ID: i64 = 1;

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct SyncState {
    pub id: i64,
    pub last_member_sync_time: Option<i64>,
    pub last_attendance_sync_time: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
}

pub async fn get_or_create(pool: &SqlitePool) -> RepoResult<SyncState> {
    if let Some(state) = get(pool).await? {
        return Ok(state);
    }

    let now = now_millis();
    sqlx::query("INSERT INTO sync_state (id, created_at, updated_at) VALUES (?, ?, ?)")
        .bind(SINGLETON_ID)
        .bind(now)
        .bind(now)
        .execute(pool)
        .await?;

    get(pool)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create sync state".into()))
}

pub async fn get(pool: &SqlitePool) -> RepoResult<Option<SyncState>> {
    let state = sqlx::query_as::<_, SyncState>(
        "SELECT id, last_member_sync_time, last_attendance_sync_time, created_at, updated_at FROM sync_state WHERE id = ?",
    )
    .bind(SINGLETON_ID)
    .fetch_optional(pool)
    .await?;
    Ok(state)
}

pub async fn touch_member_sync(pool: &SqlitePool, at: i64) -> RepoResult<()> {
    get_or_create(pool).await?;
    sqlx::query("UPDATE sync_state SET last_member_sync_time = ?1, updated_at = ?1 WHERE id = ?2")
        .bind(at)
        .bind(SINGLETON_ID)
        .execute(pool)
        .await?;
    Ok(())
}

pub async fn touch_attendance_sync(pool: &SqlitePool, at: i64) -> RepoResult<()> {
    get_or_create(pool).await?;
    sqlx::query(
        "UPDATE sync_state SET last_attendance_sync_time = ?1, updated_at = ?1 WHERE id = ?2",
    )
    .bind(at)
    .bind(SINGLETON_ID)
    .execute(pool)
    .await?;
    Ok(())
}
