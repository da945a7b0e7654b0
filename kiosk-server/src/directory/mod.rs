//! Member Directory
//!
//! Read-through cache of the club's member list. `refresh()` is the
//! only mutator and is a full replace: the remote list is the source
//! of truth and local members are never edited.

use std::sync::Arc;

use shared::models::Member;
use shared::util::now_millis;

use crate::db::repository::{member, sync_state};
use crate::db::DbService;
use crate::session::SessionManager;
use crate::sync::RemoteApi;
use crate::utils::AppResult;

pub struct MemberDirectory {
    db: DbService,
    remote: Arc<dyn RemoteApi>,
    session: Arc<SessionManager>,
}

impl MemberDirectory {
    pub fn new(db: DbService, remote: Arc<dyn RemoteApi>, session: Arc<SessionManager>) -> Self {
        Self { db, remote, session }
    }

    /// Fetch the full member list and atomically replace the local
    /// set. On any failure local data stays untouched and the cause is
    /// returned for the caller (scheduler or operator) to retry.
    pub async fn refresh(&self) -> AppResult<Vec<Member>> {
        let token = self.session.bearer().await?;
        let members = self
            .remote
            .fetch_members(self.session.club_id(), &token)
            .await?;

        member::replace_all(&self.db.pool, &members).await?;
        sync_state::touch_member_sync(&self.db.pool, now_millis()).await?;

        tracing::info!(count = members.len(), "Member directory refreshed");
        Ok(members)
    }

    /// Exact id match or exact phone match, first match wins. The
    /// caller is not told which key matched.
    pub async fn resolve_identifier(&self, identifier: &str) -> AppResult<Option<Member>> {
        Ok(member::find_by_id_or_phone(&self.db.pool, identifier).await?)
    }

    pub async fn get_by_id(&self, id: i64) -> AppResult<Option<Member>> {
        Ok(member::find_by_id(&self.db.pool, id).await?)
    }

    pub async fn list(&self) -> AppResult<Vec<Member>> {
        Ok(member::find_all(&self.db.pool).await?)
    }

    pub async fn member_count(&self) -> AppResult<i64> {
        Ok(member::count(&self.db.pool).await?)
    }
}
