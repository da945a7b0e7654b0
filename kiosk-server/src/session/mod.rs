//! Session and credentials
//!
//! The identity provider is an external collaborator; all the server
//! needs from it is a bearer token and the club (tenant) id. Tokens
//! are time-limited, so [`SessionManager`] caches the latest one and
//! re-requests when fewer than five minutes of validity remain.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use tokio::sync::RwLock;

use crate::utils::{AppError, AppResult};

/// Re-request a token when this little validity is left
const REFRESH_MARGIN: Duration = Duration::seconds(300);

/// A bearer token with its estimated expiry
#[derive(Debug, Clone)]
pub struct AuthToken {
    pub value: String,
    pub expires_at: DateTime<Utc>,
}

impl AuthToken {
    /// Stale means "inside the refresh margin", not necessarily expired
    pub fn is_stale(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at - REFRESH_MARGIN
    }
}

/// Source of fresh bearer tokens (the opaque identity provider)
#[async_trait]
pub trait TokenProvider: Send + Sync {
    async fn issue(&self) -> AppResult<AuthToken>;
}

/// Serves a fixed token from configuration, with the one-hour
/// estimated validity the upstream provider uses.
pub struct StaticTokenProvider {
    token: String,
}

impl StaticTokenProvider {
    pub fn new(token: impl Into<String>) -> Self {
        Self { token: token.into() }
    }
}

#[async_trait]
impl TokenProvider for StaticTokenProvider {
    async fn issue(&self) -> AppResult<AuthToken> {
        if self.token.is_empty() {
            return Err(AppError::auth("AUTH_TOKEN is not configured"));
        }
        Ok(AuthToken {
            value: self.token.clone(),
            expires_at: Utc::now() + Duration::hours(1),
        })
    }
}

/// Holds the club id and a cached token, refreshing on demand
pub struct SessionManager {
    club_id: String,
    provider: Arc<dyn TokenProvider>,
    cached: RwLock<Option<AuthToken>>,
}

impl SessionManager {
    pub fn new(club_id: impl Into<String>, provider: Arc<dyn TokenProvider>) -> Self {
        Self {
            club_id: club_id.into(),
            provider,
            cached: RwLock::new(None),
        }
    }

    pub fn club_id(&self) -> &str {
        &self.club_id
    }

    /// Current bearer token value, refreshed through the provider when
    /// the cached one is stale or absent.
    pub async fn bearer(&self) -> AppResult<String> {
        if self.club_id.is_empty() {
            return Err(AppError::auth("Missing club id"));
        }

        let now = Utc::now();
        {
            let cached = self.cached.read().await;
            if let Some(token) = cached.as_ref() {
                if !token.is_stale(now) {
                    return Ok(token.value.clone());
                }
            }
        }

        let mut cached = self.cached.write().await;
        // Another caller may have refreshed while we waited for the lock
        if let Some(token) = cached.as_ref() {
            if !token.is_stale(now) {
                return Ok(token.value.clone());
            }
        }

        let token = self.provider.issue().await?;
        let value = token.value.clone();
        *cached = Some(token);
        Ok(value)
    }
}
