//! SyncWorker — background scheduler for directory refresh and
//! attendance sync
//!
//! Two triggers: a plain interval (default 24 h) and a daily
//! fixed-time run (default 21:00 local). Each cycle refreshes the
//! member directory and then pushes unsynced attendance. Failures are
//! logged and retried on the next trigger; the worker never backs off
//! beyond its cadence and never self-reschedules on error.

use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveTime;
use tokio_util::sync::CancellationToken;

use crate::directory::MemberDirectory;
use crate::ledger::AttendanceLedger;
use crate::utils::time::duration_until_next_local;

pub struct SyncWorker {
    directory: Arc<MemberDirectory>,
    ledger: Arc<AttendanceLedger>,
    interval: Duration,
    daily_at: NaiveTime,
    shutdown: CancellationToken,
}

impl SyncWorker {
    pub fn new(
        directory: Arc<MemberDirectory>,
        ledger: Arc<AttendanceLedger>,
        interval: Duration,
        daily_at: NaiveTime,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            directory,
            ledger,
            interval,
            daily_at,
            shutdown,
        }
    }

    pub async fn run(self) {
        tracing::info!(
            interval_hours = self.interval.as_secs() / 3600,
            daily_at = %self.daily_at.format("%H:%M"),
            "Sync worker started"
        );

        // Catch up on startup: the device may have been off for days
        self.run_cycle().await;

        let mut interval = tokio::time::interval(self.interval);
        interval.tick().await; // skip immediate tick

        loop {
            let until_daily = duration_until_next_local(self.daily_at);

            tokio::select! {
                _ = self.shutdown.cancelled() => {
                    tracing::info!("Sync worker shutting down");
                    break;
                }
                _ = interval.tick() => {
                    self.run_cycle().await;
                }
                _ = tokio::time::sleep(until_daily) => {
                    self.run_cycle().await;
                }
            }
        }

        tracing::info!("Sync worker stopped");
    }

    /// One refresh-then-sync cycle. Errors are logged, not propagated:
    /// the next trigger is the retry.
    async fn run_cycle(&self) {
        match self.directory.refresh().await {
            Ok(members) => tracing::debug!(count = members.len(), "Directory refresh ok"),
            Err(e) => tracing::error!("Directory refresh failed, will retry next cycle: {e}"),
        }

        match self.ledger.sync_unsynced().await {
            Ok(true) => tracing::debug!("Attendance sync cycle complete"),
            Ok(false) => tracing::debug!("Attendance sync skipped, another sync in flight"),
            Err(e) => tracing::error!("Attendance sync failed, will retry next cycle: {e}"),
        }
    }
}
