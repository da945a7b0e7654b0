use std::path::PathBuf;

/// Kiosk server configuration
///
/// Every field can be overridden through an environment variable:
///
/// | Variable | Default | Meaning |
/// |----------|---------|---------|
/// | WORK_DIR | /var/lib/playmate/kiosk | working directory (db, logs) |
/// | HTTP_PORT | 8900 | HTTP API port |
/// | DATABASE_PATH | <WORK_DIR>/kiosk.db | sqlite file |
/// | SYNC_BASE_URL | (empty) | remote spreadsheet API endpoint |
/// | SPORTS_CLUB_ID | (empty) | tenant id sent with every request |
/// | AUTH_TOKEN | (empty) | static bearer token |
/// | SYNC_ENABLED | true | run the background sync worker |
/// | SYNC_INTERVAL_HOURS | 24 | periodic sync cadence |
/// | SYNC_TIME | 21:00 | daily fixed-time sync (local) |
/// | DEBOUNCE_SECS | 10 | min age before check-out is accepted |
/// | REQUEST_TIMEOUT_SECS | 30 | remote call timeout |
/// | ENVIRONMENT | development | development \| production |
#[derive(Debug, Clone)]
pub struct Config {
    pub work_dir: PathBuf,
    pub http_port: u16,
    pub database_path: PathBuf,
    pub sync_base_url: String,
    pub club_id: String,
    pub auth_token: String,
    pub sync_enabled: bool,
    pub sync_interval_hours: u64,
    pub sync_time: String,
    pub debounce_secs: u64,
    pub request_timeout_secs: u64,
    pub environment: String,
}

fn env_parsed<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

impl Config {
    /// Load configuration from environment variables, with defaults
    pub fn from_env() -> Self {
        let work_dir = PathBuf::from(
            std::env::var("WORK_DIR").unwrap_or_else(|_| "/var/lib/playmate/kiosk".into()),
        );
        let database_path = std::env::var("DATABASE_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| work_dir.join("kiosk.db"));

        Self {
            work_dir,
            http_port: env_parsed("HTTP_PORT", 8900),
            database_path,
            sync_base_url: std::env::var("SYNC_BASE_URL").unwrap_or_default(),
            club_id: std::env::var("SPORTS_CLUB_ID").unwrap_or_default(),
            auth_token: std::env::var("AUTH_TOKEN").unwrap_or_default(),
            sync_enabled: env_parsed("SYNC_ENABLED", true),
            sync_interval_hours: env_parsed("SYNC_INTERVAL_HOURS", 24),
            sync_time: std::env::var("SYNC_TIME").unwrap_or_else(|_| "21:00".into()),
            debounce_secs: env_parsed("DEBOUNCE_SECS", 10),
            request_timeout_secs: env_parsed("REQUEST_TIMEOUT_SECS", 30),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into()),
        }
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}
