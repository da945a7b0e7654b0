//! Attendance Model
//!
//! One record per check-in event, optionally completed by a check-out.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::util::iso_millis;

/// Who an attendance record belongs to.
///
/// Unrecognized identifiers are still durably recorded as visits: the
/// raw input becomes the `Visitor` payload and doubles as the dedup
/// key, so distinct unknown inputs never collide with each other.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Subject {
    /// A member resolved through the directory.
    Member(i64),
    /// An unresolved identifier, kept verbatim.
    Visitor(String),
}

impl Subject {
    pub fn member_id(&self) -> Option<i64> {
        match self {
            Subject::Member(id) => Some(*id),
            Subject::Visitor(_) => None,
        }
    }

    pub fn is_visitor(&self) -> bool {
        matches!(self, Subject::Visitor(_))
    }
}

/// Check-in/check-out state of a single visit.
///
/// `Closed` always satisfies `check_out >= check_in`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum Session {
    #[serde(rename_all = "camelCase")]
    Open {
        #[serde(with = "iso_millis")]
        check_in: DateTime<Utc>,
    },
    #[serde(rename_all = "camelCase")]
    Closed {
        #[serde(with = "iso_millis")]
        check_in: DateTime<Utc>,
        #[serde(with = "iso_millis")]
        check_out: DateTime<Utc>,
    },
}

impl Session {
    pub fn check_in(&self) -> DateTime<Utc> {
        match self {
            Session::Open { check_in } | Session::Closed { check_in, .. } => *check_in,
        }
    }

    pub fn check_out(&self) -> Option<DateTime<Utc>> {
        match self {
            Session::Open { .. } => None,
            Session::Closed { check_out, .. } => Some(*check_out),
        }
    }

    pub fn is_open(&self) -> bool {
        matches!(self, Session::Open { .. })
    }

    /// Complete an open session. Returns `None` if already closed.
    pub fn close(&self, at: DateTime<Utc>) -> Option<Session> {
        match self {
            Session::Open { check_in } => Some(Session::Closed {
                check_in: *check_in,
                check_out: at.max(*check_in),
            }),
            Session::Closed { .. } => None,
        }
    }
}

/// A single attendance row.
///
/// `date` is the local calendar day used as the dedup key; all
/// instants inside `session` are UTC. `synced` is false at creation
/// and after every mutation until a sync round-trip confirms the
/// server accepted the record.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceRecord {
    pub id: i64,
    #[serde(flatten)]
    pub subject: Subject,
    pub date: NaiveDate,
    #[serde(flatten)]
    pub session: Session,
    pub days_to_expiry: Option<i64>,
    pub notes: String,
    pub synced: bool,
}

impl AttendanceRecord {
    pub fn is_open(&self) -> bool {
        self.session.is_open()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_session_close_is_total_over_both_states() {
        let check_in = Utc.with_ymd_and_hms(2025, 6, 1, 9, 0, 0).unwrap();
        let later = check_in + chrono::Duration::seconds(15);

        let open = Session::Open { check_in };
        let closed = open.close(later).unwrap();
        assert_eq!(closed.check_in(), check_in);
        assert_eq!(closed.check_out(), Some(later));

        // Closing a closed session is a no-op
        assert!(closed.close(later).is_none());
    }

    #[test]
    fn test_session_close_clamps_to_check_in() {
        let check_in = Utc.with_ymd_and_hms(2025, 6, 1, 9, 0, 0).unwrap();
        let earlier = check_in - chrono::Duration::seconds(5);
        let closed = Session::Open { check_in }.close(earlier).unwrap();
        assert!(closed.check_out().unwrap() >= check_in);
    }

    #[test]
    fn test_subject_accessors() {
        assert_eq!(Subject::Member(42).member_id(), Some(42));
        assert!(Subject::Visitor("unknown-123".into()).is_visitor());
        assert_eq!(Subject::Visitor("x".into()).member_id(), None);
    }

    #[test]
    fn test_record_serializes_with_flattened_subject() {
        let record = AttendanceRecord {
            id: 1,
            subject: Subject::Member(42),
            date: NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
            session: Session::Open {
                check_in: Utc.with_ymd_and_hms(2025, 6, 1, 9, 0, 0).unwrap(),
            },
            days_to_expiry: Some(5),
            notes: String::new(),
            synced: false,
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["kind"], "member");
        assert_eq!(json["state"], "open");
        assert_eq!(json["checkIn"], "2025-06-01T09:00:00.000Z");
    }
}
