//! Attendance sync wire protocol
//!
//! Used by kiosk-server to push unsynced attendance to the remote
//! spreadsheet-backed API and to fetch the member directory. All time
//! fields travel as ISO-8601 UTC strings with millisecond precision.

use serde::{Deserialize, Serialize};

use crate::models::{AttendanceRecord, Subject};
use crate::util::millis_to_iso;

/// Wire member id used for visitor records. The local model carries
/// the raw identifier instead; the sentinel exists only on the wire.
pub const GUEST_WIRE_MEMBER_ID: i64 = -1;

/// Envelope every remote endpoint responds with
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    /// "success" on the happy path, anything else is an error
    pub status: String,
    pub data: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn is_success(&self) -> bool {
        self.status == "success"
    }
}

/// One attendance record projected into the sync batch
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceSyncEntry {
    pub member_id: i64,
    /// Calendar date of the visit (YYYY-MM-DD)
    pub date: String,
    /// ISO millis UTC
    pub check_in_time: String,
    /// ISO millis UTC, absent while the visit is still open
    #[serde(skip_serializing_if = "Option::is_none")]
    pub check_out_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl AttendanceSyncEntry {
    pub fn from_record(record: &AttendanceRecord) -> Self {
        let (member_id, notes) = match &record.subject {
            Subject::Member(id) => (*id, None),
            // Raw identifier travels in notes so the server can tell
            // distinct guests apart.
            Subject::Visitor(raw) => (GUEST_WIRE_MEMBER_ID, Some(raw.clone())),
        };
        Self {
            member_id,
            date: record.date.format("%Y-%m-%d").to_string(),
            check_in_time: millis_to_iso(record.session.check_in().timestamp_millis()),
            check_out_time: record
                .session
                .check_out()
                .map(|t| millis_to_iso(t.timestamp_millis())),
            notes,
        }
    }
}

/// Batch request body (`attendanceList` wrapper expected by the API)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceSyncRequest {
    pub attendance_list: Vec<AttendanceSyncEntry>,
}

/// Per-entry outcome reported by the server
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttendanceSyncOutcome {
    pub success: bool,
    /// Index into the submitted batch
    pub index: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Aggregate server verdict for a submitted batch
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceSyncReport {
    pub success_count: usize,
    pub failure_count: usize,
    #[serde(default)]
    pub results: Vec<AttendanceSyncOutcome>,
}

impl AttendanceSyncReport {
    pub fn all_accepted(&self) -> bool {
        self.failure_count == 0
    }

    /// Human-readable list of rejected entries, one line per failure
    pub fn failure_summary(&self) -> String {
        self.results
            .iter()
            .filter(|r| !r.success)
            .map(|r| {
                format!(
                    "Record {}: {}",
                    r.index,
                    r.error.as_deref().unwrap_or("unknown error")
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Session;
    use chrono::{NaiveDate, TimeZone, Utc};

    fn open_record(subject: Subject) -> AttendanceRecord {
        AttendanceRecord {
            id: 7,
            subject,
            date: NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
            session: Session::Open {
                check_in: Utc.with_ymd_and_hms(2025, 6, 1, 9, 0, 0).unwrap(),
            },
            days_to_expiry: Some(5),
            notes: String::new(),
            synced: false,
        }
    }

    #[test]
    fn test_entry_projection_for_member() {
        let entry = AttendanceSyncEntry::from_record(&open_record(Subject::Member(42)));
        assert_eq!(entry.member_id, 42);
        assert_eq!(entry.date, "2025-06-01");
        assert_eq!(entry.check_in_time, "2025-06-01T09:00:00.000Z");
        assert!(entry.check_out_time.is_none());
        assert!(entry.notes.is_none());

        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["memberId"], 42);
        assert!(json.get("checkOutTime").is_none());
    }

    #[test]
    fn test_entry_projection_for_visitor() {
        let entry =
            AttendanceSyncEntry::from_record(&open_record(Subject::Visitor("unknown-123".into())));
        assert_eq!(entry.member_id, GUEST_WIRE_MEMBER_ID);
        assert_eq!(entry.notes.as_deref(), Some("unknown-123"));
    }

    #[test]
    fn test_report_failure_summary() {
        let report = AttendanceSyncReport {
            success_count: 1,
            failure_count: 2,
            results: vec![
                AttendanceSyncOutcome {
                    success: true,
                    index: 0,
                    error: None,
                },
                AttendanceSyncOutcome {
                    success: false,
                    index: 1,
                    error: Some("duplicate row".into()),
                },
                AttendanceSyncOutcome {
                    success: false,
                    index: 2,
                    error: None,
                },
            ],
        };
        assert!(!report.all_accepted());
        let summary = report.failure_summary();
        assert!(summary.contains("Record 1: duplicate row"));
        assert!(summary.contains("Record 2: unknown error"));
    }

    #[test]
    fn test_api_response_envelope() {
        let raw = r#"{"status":"success","data":{"successCount":2,"failureCount":0,"results":[]}}"#;
        let resp: ApiResponse<AttendanceSyncReport> = serde_json::from_str(raw).unwrap();
        assert!(resp.is_success());
        assert!(resp.data.unwrap().all_accepted());

        let raw = r#"{"status":"error","data":null,"message":"bad token"}"#;
        let resp: ApiResponse<AttendanceSyncReport> = serde_json::from_str(raw).unwrap();
        assert!(!resp.is_success());
    }
}
