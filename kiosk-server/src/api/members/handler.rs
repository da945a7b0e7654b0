//! Member API Handlers
//!
//! Read-only: the directory is refreshed from the remote system, never
//! edited locally.

use axum::{
    extract::{Path, State},
    Json,
};
use shared::models::Member;

use crate::core::ServerState;
use crate::utils::{AppError, AppResult};

/// GET /api/members - cached directory, in row order
pub async fn list(State(state): State<ServerState>) -> AppResult<Json<Vec<Member>>> {
    let members = state.directory.list().await?;
    Ok(Json(members))
}

/// GET /api/members/{id}
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Member>> {
    let member = state
        .directory
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Member {id}")))?;
    Ok(Json(member))
}
