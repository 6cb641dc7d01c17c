//! Full-mailbox reconciliation engine.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tracing::{debug, info, warn};

use super::diff::diff;
use super::observer::RemoteObserver;
use super::report::{SyncFailure, SyncOutcome, SyncReport};
use crate::account::Account;
use crate::cache::CacheRepository;

/// Serializes reconciliation passes per (account, mailbox) key.
///
/// The daemon and a manual `sync` invocation may race on the same mailbox;
/// whichever arrives second waits for the first to finish.
#[derive(Default)]
struct PassLocks {
    locks: Mutex<HashMap<(String, String), Arc<tokio::sync::Mutex<()>>>>,
}

impl PassLocks {
    fn for_key(&self, account: &str, mailbox: &str) -> Arc<tokio::sync::Mutex<()>> {
        let mut locks = self.locks.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        Arc::clone(
            locks
                .entry((account.to_string(), mailbox.to_string()))
                .or_default(),
        )
    }
}

/// Reconciles remote mailbox state into the local cache, one account and
/// mailbox at a time.
pub struct SyncEngine<R> {
    cache: Arc<CacheRepository>,
    observer: R,
    locks: PassLocks,
}

impl<R: RemoteObserver> SyncEngine<R> {
    /// Creates an engine over the given cache and observer.
    pub fn new(cache: Arc<CacheRepository>, observer: R) -> Self {
        Self {
            cache,
            observer,
            locks: PassLocks::default(),
        }
    }

    /// Returns the cache this engine writes to.
    #[must_use]
    pub fn cache(&self) -> &Arc<CacheRepository> {
        &self.cache
    }

    /// Runs one full reconciliation pass for one (account, mailbox) pair.
    ///
    /// Never returns an error: failures are classified into the report so
    /// one broken account cannot abort its siblings. On failure the cache
    /// retains its pre-pass state.
    pub async fn full_sync(&self, account: &Account, mailbox: &str) -> SyncReport {
        let lock = self.locks.for_key(&account.email, mailbox);
        let _guard = lock.lock().await;

        let outcome = match self.reconcile(account, mailbox).await {
            Ok(outcome) => outcome,
            Err(failure) => SyncOutcome::Failed(failure),
        };

        SyncReport {
            account: account.email.clone(),
            mailbox: mailbox.to_string(),
            outcome,
        }
    }

    /// Syncs every account sequentially and returns one report each.
    ///
    /// Sequential by design: it bounds concurrent network and cache load,
    /// and the per-key locks keep a future parallel version safe without
    /// changing this contract.
    pub async fn sync_all(&self, accounts: &[Account], mailbox: &str) -> Vec<SyncReport> {
        let mut reports = Vec::with_capacity(accounts.len());
        for account in accounts {
            let report = self.full_sync(account, mailbox).await;
            match &report.outcome {
                SyncOutcome::Completed { .. } => info!(%report, "sync pass"),
                SyncOutcome::Failed(failure) => {
                    warn!(account = %account.email, mailbox, %failure, "sync pass failed");
                }
            }
            reports.push(report);
        }
        reports
    }

    async fn reconcile(
        &self,
        account: &Account,
        mailbox: &str,
    ) -> Result<SyncOutcome, SyncFailure> {
        // Session lifecycle (including logout on error paths) is owned by
        // the observer; a failure here leaves the cache untouched.
        let remote = self
            .observer
            .observe(account, mailbox)
            .await
            .map_err(SyncFailure::from)?;

        let cached = self
            .cache
            .entries(&account.email, mailbox)
            .await
            .map_err(|e| SyncFailure::Cache(e.to_string()))?;

        let delta = diff(&account.email, mailbox, &remote, &cached);
        debug!(
            account = %account.email,
            mailbox,
            remote = remote.len(),
            cached = cached.len(),
            added = delta.additions.len(),
            updated = delta.updates.len(),
            removed = delta.removals.len(),
            "reconciled"
        );

        if !delta.is_noop() {
            self.cache
                .apply(
                    &account.email,
                    mailbox,
                    &delta.additions,
                    &delta.updates,
                    &delta.removals,
                )
                .await
                .map_err(|e| SyncFailure::Cache(e.to_string()))?;
        }

        Ok(SyncOutcome::Completed {
            added: delta.additions.len(),
            updated: delta.updates.len(),
            removed: delta.removals.len(),
            unchanged: delta.unchanged,
        })
    }
}
