//! security log plumbing: async writer and retention sweeper.
//!
//! the log is write-only from the application's point of view. entries
//! are appended off the request path and pruned once they outlive the
//! retention window.

use std::time::Duration;

use tracing::{info, warn};

use givestream_db::{GivestreamDb, Store};
use givestream_types::NewSecurityLog;

/// how often the retention sweeper runs.
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(60 * 60);

/// handle for appending security log entries without blocking a request.
///
/// writes happen on a spawned task; failures are logged and dropped,
/// never surfaced to the request that produced the entry.
#[derive(Clone)]
pub struct SecurityLogWriter {
    db: GivestreamDb,
}

impl SecurityLogWriter {
    /// create a writer over the given database handle.
    pub fn new(db: GivestreamDb) -> Self {
        Self { db }
    }

    /// queue an entry for persistence, fire-and-forget.
    pub fn record(&self, entry: NewSecurityLog) {
        let db = self.db.clone();
        tokio::spawn(async move {
            if let Err(e) = db.append_security_log(&entry).await {
                warn!(error = %e, "failed to persist security log entry");
            }
        });
    }
}

/// retention sweeper for expired security log entries.
#[derive(Clone)]
pub struct SecurityLogSweeper {
    db: GivestreamDb,
    retention: chrono::Duration,
}

impl SecurityLogSweeper {
    /// create a sweeper that deletes entries older than `retention_days`.
    pub fn new(db: GivestreamDb, retention_days: i64) -> Self {
        Self {
            db,
            retention: chrono::Duration::days(retention_days),
        }
    }

    /// run one sweep cycle; returns the number of entries removed.
    pub async fn sweep(&self) -> u64 {
        let cutoff = chrono::Utc::now() - self.retention;
        match self.db.sweep_security_logs(cutoff).await {
            Ok(0) => 0,
            Ok(removed) => {
                info!(removed, "security log retention sweep completed");
                removed
            }
            Err(e) => {
                warn!(error = %e, "security log retention sweep failed");
                0
            }
        }
    }

    /// spawn the background sweep task.
    ///
    /// sweeps immediately, then every `interval`. ticks missed while a
    /// sweep runs long are skipped rather than bunched.
    pub fn spawn(self, interval: Duration) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            info!(
                retention_days = self.retention.num_days(),
                interval_secs = interval.as_secs(),
                "starting security log retention sweeper"
            );

            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

            loop {
                ticker.tick().await;
                self.sweep().await;
            }
        })
    }
}
