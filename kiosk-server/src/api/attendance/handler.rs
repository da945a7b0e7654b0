//! Attendance API Handlers

use axum::{
    extract::{Query, State},
    Json,
};
use chrono::Local;
use serde::{Deserialize, Serialize};
use shared::models::AttendanceRecord;

use crate::core::ServerState;
use crate::db::repository::attendance;
use crate::utils::AppResult;

#[derive(Deserialize)]
pub struct PunchRequest {
    pub identifier: String,
}

/// POST /api/attendance - toggle check-in/check-out for an identifier
///
/// 404 carries the unknown-identifier message (the visitor record is
/// still persisted); 422 means the debounce guard tripped.
pub async fn punch(
    State(state): State<ServerState>,
    Json(payload): Json<PunchRequest>,
) -> AppResult<Json<AttendanceRecord>> {
    let record = state.ledger.process_identifier(&payload.identifier).await?;
    Ok(Json(record))
}

#[derive(Deserialize)]
pub struct ListQuery {
    pub limit: Option<i64>,
}

/// GET /api/attendance?limit=N - recent records, newest first
pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<Vec<AttendanceRecord>>> {
    let limit = query.limit.unwrap_or(100).clamp(1, 1000);
    let records = attendance::find_recent(&state.db.pool, limit).await?;
    Ok(Json(records))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TodayCount {
    pub date: String,
    pub count: i64,
}

/// GET /api/attendance/today/count - visits recorded today
pub async fn today_count(State(state): State<ServerState>) -> AppResult<Json<TodayCount>> {
    let today = Local::now().date_naive();
    let count = attendance::count_for_date(&state.db.pool, today).await?;
    Ok(Json(TodayCount {
        date: today.format("%Y-%m-%d").to_string(),
        count,
    }))
}
