//! Sync API Handlers

use axum::{extract::State, Json};
use serde::Serialize;

use crate::core::ServerState;
use crate::db::repository::{attendance, sync_state};
use crate::utils::AppResult;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncTriggerResponse {
    /// Members now in the directory after the refresh
    pub members_refreshed: usize,
    /// False when another sync was already in flight
    pub attendance_synced: bool,
}

/// POST /api/sync - manual refresh + sync, same path the scheduler
/// takes. An in-flight background sync makes `attendance_synced`
/// false rather than running twice.
pub async fn trigger(State(state): State<ServerState>) -> AppResult<Json<SyncTriggerResponse>> {
    let members = state.directory.refresh().await?;
    let ran = state.ledger.sync_unsynced().await?;
    Ok(Json(SyncTriggerResponse {
        members_refreshed: members.len(),
        attendance_synced: ran,
    }))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncStatus {
    pub last_member_sync_time: Option<i64>,
    pub last_attendance_sync_time: Option<i64>,
    pub pending_attendance: i64,
    pub member_count: i64,
}

/// GET /api/sync/status - sync cursor and pending work
pub async fn status(State(state): State<ServerState>) -> AppResult<Json<SyncStatus>> {
    let cursor = sync_state::get_or_create(&state.db.pool).await?;
    let pending = attendance::count_unsynced(&state.db.pool).await?;
    let member_count = state.directory.member_count().await?;
    Ok(Json(SyncStatus {
        last_member_sync_time: cursor.last_member_sync_time,
        last_attendance_sync_time: cursor.last_attendance_sync_time,
        pending_attendance: pending,
        member_count,
    }))
}
