//! Session Sweeper
//!
//! Removes sessions past their absolute expiry, then active-session records
//! whose session is gone. Runs once at start-up and then periodically.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;

use crate::domain::repository::{ActiveSessionRepository, SessionRepository};
use crate::error::AccountsResult;

/// Rows removed by one sweep
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SweepReport {
    pub expired_sessions: u64,
    pub stale_active_sessions: u64,
}

pub struct SessionSweeper<R>
where
    R: SessionRepository + ActiveSessionRepository,
{
    repo: Arc<R>,
}

impl<R> SessionSweeper<R>
where
    R: SessionRepository + ActiveSessionRepository + Send + Sync + 'static,
{
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    pub async fn sweep(&self) -> AccountsResult<SweepReport> {
        let expired_sessions = self.repo.delete_expired_sessions().await?;
        let stale_active_sessions = self.repo.delete_stale_active_sessions().await?;

        Ok(SweepReport {
            expired_sessions,
            stale_active_sessions,
        })
    }

    /// Sweep every `interval` until the task is aborted
    ///
    /// Failures are logged and the next tick tries again.
    pub fn spawn(self, interval: Duration) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            // the first tick completes immediately; start-up already swept
            ticker.tick().await;

            loop {
                ticker.tick().await;
                match self.sweep().await {
                    Ok(report) => {
                        if report != SweepReport::default() {
                            tracing::info!(
                                sessions_deleted = report.expired_sessions,
                                active_records_deleted = report.stale_active_sessions,
                                "Session sweep completed"
                            );
                        }
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "Session sweep failed");
                    }
                }
            }
        })
    }
}
