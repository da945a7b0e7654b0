use chrono::{DateTime, NaiveDateTime, Utc};

/// Wire timestamp format: ISO-8601 UTC with millisecond precision.
pub const ISO_MILLIS: &str = "%Y-%m-%dT%H:%M:%S%.3fZ";

/// Current UTC timestamp (milliseconds)
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// Format Unix millis as an ISO-8601 UTC string with milliseconds
pub fn millis_to_iso(millis: i64) -> String {
    DateTime::<Utc>::from_timestamp_millis(millis)
        .unwrap_or_default()
        .format(ISO_MILLIS)
        .to_string()
}

/// Parse an ISO-8601 UTC string (millisecond precision) into Unix millis
pub fn iso_to_millis(value: &str) -> Result<i64, chrono::ParseError> {
    let naive = NaiveDateTime::parse_from_str(value, ISO_MILLIS)?;
    Ok(naive.and_utc().timestamp_millis())
}

/// serde adapter for `DateTime<Utc>` fields carried as ISO millis strings
pub mod iso_millis {
    use chrono::{DateTime, NaiveDateTime, Utc};
    use serde::{self, Deserialize, Deserializer, Serializer};

    use super::ISO_MILLIS;

    pub fn serialize<S>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&value.format(ISO_MILLIS).to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        NaiveDateTime::parse_from_str(&raw, ISO_MILLIS)
            .map(|naive| naive.and_utc())
            .map_err(serde::de::Error::custom)
    }
}
