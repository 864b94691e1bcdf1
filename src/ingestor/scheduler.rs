//! Background refresh scheduler.
//!
//! Periodically scans for providers whose last refresh is older than their
//! configured period and refreshes them one at a time. Refreshes for one
//! provider never block the web layer; playlist generation always reads
//! whatever the store currently holds.

use std::time::Duration;
use tokio::time::interval;
use tracing::{debug, error, info};

use crate::config::RefreshConfig;
use crate::database::Database;

use super::IngestorService;

pub struct RefreshScheduler {
    database: Database,
    ingestor: IngestorService,
    check_interval: Duration,
    run_missed_immediately: bool,
}

impl RefreshScheduler {
    pub fn new(database: Database, ingestor: IngestorService, config: &RefreshConfig) -> Self {
        Self {
            database,
            ingestor,
            check_interval: Duration::from_secs(config.check_interval_seconds.max(1)),
            run_missed_immediately: config.run_missed_immediately,
        }
    }

    pub async fn start(self) {
        info!(
            "Refresh scheduler started, checking every {:?}",
            self.check_interval
        );

        let mut ticker = interval(self.check_interval);
        if !self.run_missed_immediately {
            // Skip the immediate first tick, leaving overdue providers for
            // the next regular pass
            ticker.tick().await;
        }

        loop {
            ticker.tick().await;
            self.run_due_refreshes().await;
        }
    }

    async fn run_due_refreshes(&self) {
        let due = match self.database.list_providers_due_refresh().await {
            Ok(due) => due,
            Err(e) => {
                error!("Failed to query providers due refresh: {}", e);
                return;
            }
        };

        if due.is_empty() {
            debug!("No providers due refresh");
            return;
        }

        info!("{} provider(s) due refresh", due.len());
        for provider in due {
            if let Err(e) = self.ingestor.refresh_provider(&provider).await {
                error!("Refresh failed for provider '{}': {}", provider.name, e);
            }
        }
    }
}
