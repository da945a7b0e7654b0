//! Time helpers
//!
//! Day grouping uses the device's local time zone; all persisted and
//! transmitted instants are UTC millis. Conversion happens here and at
//! the wire boundary, never inside repositories.

use chrono::{DateTime, Local, NaiveDate, NaiveTime, Utc};

/// Local calendar day for a UTC instant (the attendance dedup key)
pub fn local_date(instant: DateTime<Utc>) -> NaiveDate {
    instant.with_timezone(&Local).date_naive()
}

/// Parse a "HH:MM" daily sync time, falling back to 21:00
pub fn parse_sync_time(value: &str) -> NaiveTime {
    NaiveTime::parse_from_str(value, "%H:%M").unwrap_or_else(|e| {
        tracing::warn!("Failed to parse SYNC_TIME '{}': {}, falling back to 21:00", value, e);
        NaiveTime::from_hms_opt(21, 0, 0).unwrap_or(NaiveTime::MIN)
    })
}

/// Duration until the next local occurrence of `target` (today if
/// still ahead, otherwise tomorrow)
pub fn duration_until_next_local(target: NaiveTime) -> std::time::Duration {
    let now = Local::now();
    let today = now.date_naive();

    let target_date = if now.time() >= target {
        today + chrono::Duration::days(1)
    } else {
        today
    };

    let target_datetime = target_date
        .and_time(target)
        .and_local_timezone(Local)
        .latest()
        .unwrap_or_else(|| {
            // DST gap: shift by a minute and take what resolves
            (target_date.and_time(target) + chrono::Duration::minutes(1))
                .and_local_timezone(Local)
                .latest()
                .unwrap_or_else(|| now + chrono::Duration::hours(1))
        });

    target_datetime
        .signed_duration_since(now)
        .to_std()
        .unwrap_or(std::time::Duration::from_secs(60))
}
