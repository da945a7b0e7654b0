//! SyncService — HTTP client for the remote spreadsheet API
//!
//! The API is a single endpoint dispatching on an `action` query
//! parameter; the bearer token travels as an `authorization` query
//! parameter (quirk of the spreadsheet web-app host, which drops
//! Authorization headers on redirect).

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use shared::models::Member;
use shared::sync::{ApiResponse, AttendanceSyncEntry, AttendanceSyncReport, AttendanceSyncRequest};

use super::RemoteApi;
use crate::utils::{AppError, AppResult};

pub struct SyncService {
    client: Client,
    base_url: String,
}

impl SyncService {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::internal(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    fn query_params<'a>(
        club_id: &'a str,
        action: &'a str,
        token: &str,
    ) -> [(&'static str, String); 3] {
        [
            ("sportsClubId", club_id.to_string()),
            ("action", action.to_string()),
            ("authorization", format!("Bearer {token}")),
        ]
    }

    fn unwrap_envelope<T>(resp: ApiResponse<T>, action: &str) -> AppResult<T> {
        if !resp.is_success() {
            let detail = resp.message.unwrap_or_else(|| resp.status.clone());
            return Err(AppError::server(format!(
                "{action} failed: API returned error status: {detail}"
            )));
        }
        resp.data
            .ok_or_else(|| AppError::server(format!("{action} failed: response carried no data")))
    }
}

#[async_trait]
impl RemoteApi for SyncService {
    async fn fetch_members(&self, club_id: &str, token: &str) -> AppResult<Vec<Member>> {
        let response = self
            .client
            .get(&self.base_url)
            .query(&Self::query_params(club_id, "getMembers", token))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(AppError::server(format!(
                "getMembers failed with HTTP {}",
                response.status()
            )));
        }

        let envelope: ApiResponse<Vec<Member>> = response
            .json()
            .await
            .map_err(|e| AppError::server(format!("getMembers: malformed response: {e}")))?;
        Self::unwrap_envelope(envelope, "getMembers")
    }

    async fn push_attendance(
        &self,
        club_id: &str,
        token: &str,
        entries: Vec<AttendanceSyncEntry>,
    ) -> AppResult<AttendanceSyncReport> {
        let body = AttendanceSyncRequest {
            attendance_list: entries,
        };

        let response = self
            .client
            .post(&self.base_url)
            .query(&Self::query_params(club_id, "recordBulkAttendance", token))
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(AppError::server(format!(
                "recordBulkAttendance failed with HTTP {}",
                response.status()
            )));
        }

        let envelope: ApiResponse<AttendanceSyncReport> = response.json().await.map_err(|e| {
            AppError::server(format!("recordBulkAttendance: malformed response: {e}"))
        })?;
        Self::unwrap_envelope(envelope, "recordBulkAttendance")
    }
}
