//! Background sync loop.
//!
//! A single long-lived task alternating between a fixed-interval timer and
//! a shutdown signal. Shutdown is honored between ticks only; an
//! in-progress pass is allowed to finish before the loop exits.

use std::future::Future;
use std::time::Duration;

use tokio::time::MissedTickBehavior;
use tracing::info;

use crate::account::Account;
use crate::sync::{RemoteObserver, SyncEngine};

/// Default interval between sync passes.
pub const DEFAULT_SYNC_INTERVAL: Duration = Duration::from_secs(30 * 60);

/// Daemon loop configuration.
#[derive(Debug, Clone)]
pub struct DaemonConfig {
    /// Time between sync ticks.
    pub interval: Duration,
    /// Mailbox to reconcile for every account.
    pub mailbox: String,
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            interval: DEFAULT_SYNC_INTERVAL,
            mailbox: "INBOX".to_string(),
        }
    }
}

/// Runs the sync loop until the shutdown future resolves.
///
/// The first tick fires immediately, doubling as the initial sync. Every
/// tick syncs all accounts sequentially; per-account failures are logged
/// by the engine and never abort the tick or the loop.
pub async fn run<R: RemoteObserver>(
    engine: &SyncEngine<R>,
    accounts: &[Account],
    config: &DaemonConfig,
    shutdown: impl Future<Output = ()>,
) {
    let mut ticker = tokio::time::interval(config.interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    tokio::pin!(shutdown);

    info!(
        interval_secs = config.interval.as_secs(),
        accounts = accounts.len(),
        mailbox = %config.mailbox,
        "daemon started"
    );

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let reports = engine.sync_all(accounts, &config.mailbox).await;
                let failed = reports.iter().filter(|r| !r.is_success()).count();
                info!(total = reports.len(), failed, "tick complete");
            }
            () = &mut shutdown => {
                info!("shutdown signal received");
                break;
            }
        }
    }
}
