//! HTTP server lifecycle
//!
//! Binds the axum router, starts the background sync worker, and
//! shuts both down gracefully on ctrl-c.

use std::time::Duration;

use crate::api;
use crate::core::tasks::{BackgroundTasks, TaskKind};
use crate::core::{Config, ServerState};
use crate::sync::SyncWorker;
use crate::utils::time::parse_sync_time;

pub struct Server {
    config: Config,
    state: ServerState,
}

impl Server {
    pub fn with_state(config: Config, state: ServerState) -> Self {
        Self { config, state }
    }

    pub async fn run(self) -> anyhow::Result<()> {
        let mut tasks = BackgroundTasks::new();

        if self.config.sync_enabled {
            let worker = SyncWorker::new(
                self.state.directory.clone(),
                self.state.ledger.clone(),
                Duration::from_secs(self.config.sync_interval_hours * 3600),
                parse_sync_time(&self.config.sync_time),
                tasks.shutdown_token(),
            );
            tasks.spawn("sync_worker", TaskKind::Periodic, worker.run());
        } else {
            tracing::warn!("Background sync disabled by configuration");
        }

        let app = api::build_app(self.state.clone());
        let addr = format!("0.0.0.0:{}", self.config.http_port);
        let listener = tokio::net::TcpListener::bind(&addr).await?;
        tracing::info!("Kiosk server listening on {addr}");

        axum::serve(listener, app)
            .with_graceful_shutdown(async {
                let _ = tokio::signal::ctrl_c().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tasks.shutdown().await;
        Ok(())
    }
}
