//! Member Model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::util::iso_millis;

/// Club member as delivered by the remote directory.
///
/// `id` is assigned by the remote system and is the stable lookup key;
/// `phone` is an alternate lookup key but is not guaranteed unique
/// (first match wins). The ledger never mutates members — the whole
/// set is replaced on each successful directory refresh.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    pub row_number: i64,
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub place: String,
    #[serde(with = "iso_millis")]
    pub join_date: DateTime<Utc>,
    pub status: String,
    #[serde(with = "iso_millis")]
    pub expiry_date: DateTime<Utc>,
    pub notes: Option<String>,
}

impl Member {
    pub fn is_active(&self) -> bool {
        self.status.eq_ignore_ascii_case("active")
    }

    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// Whole days until membership expiry, truncated toward zero.
    /// Negative means "expired N days ago".
    pub fn days_to_expiry(&self, now: DateTime<Utc>) -> i64 {
        const DAY_MS: i64 = 86_400_000;
        (self.expiry_date.timestamp_millis() - now.timestamp_millis()) / DAY_MS
    }
}
