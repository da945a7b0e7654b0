//! Server state — shared references to every service

use std::sync::Arc;
use std::time::Duration;

use crate::core::Config;
use crate::db::DbService;
use crate::directory::MemberDirectory;
use crate::ledger::AttendanceLedger;
use crate::session::{SessionManager, StaticTokenProvider};
use crate::sync::{RemoteApi, SyncService};
use crate::utils::AppResult;

/// Shared application state. Cheap to clone: everything inside is an
/// `Arc` or a pooled handle. No ambient globals — the ledger and
/// directory get their storage handle injected here, nowhere else.
#[derive(Clone)]
pub struct ServerState {
    pub config: Config,
    pub db: DbService,
    pub session: Arc<SessionManager>,
    pub remote: Arc<dyn RemoteApi>,
    pub directory: Arc<MemberDirectory>,
    pub ledger: Arc<AttendanceLedger>,
}

impl ServerState {
    /// Wire up storage, session, remote client, directory and ledger
    pub async fn initialize(config: &Config) -> AppResult<Self> {
        std::fs::create_dir_all(&config.work_dir).map_err(|e| {
            crate::utils::AppError::internal(format!(
                "Failed to create work dir {}: {e}",
                config.work_dir.display()
            ))
        })?;

        let db = DbService::new(&config.database_path).await?;

        let session = Arc::new(SessionManager::new(
            config.club_id.clone(),
            Arc::new(StaticTokenProvider::new(config.auth_token.clone())),
        ));

        let remote: Arc<dyn RemoteApi> = Arc::new(SyncService::new(
            config.sync_base_url.clone(),
            Duration::from_secs(config.request_timeout_secs),
        )?);

        let directory = Arc::new(MemberDirectory::new(
            db.clone(),
            remote.clone(),
            session.clone(),
        ));

        let ledger = Arc::new(AttendanceLedger::new(
            db.clone(),
            directory.clone(),
            remote.clone(),
            session.clone(),
            Duration::from_secs(config.debounce_secs),
        ));

        Ok(Self {
            config: config.clone(),
            db,
            session,
            remote,
            directory,
            ledger,
        })
    }
}
