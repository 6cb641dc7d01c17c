//! Integration tests for the reconciliation engine and daemon loop.
//!
//! A fake observer stands in for the IMAP server so passes run entirely
//! in-process against an in-memory cache.

#![allow(clippy::unwrap_used)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use mailsync_core::{
    Account, CacheEntry, CacheRepository, DaemonConfig, RemoteObserver, SyncEngine, SyncFailure,
    SyncOutcome, daemon,
};
use mailsync_imap::{Error as ImapError, Flag, MessageMeta, Uid};

#[derive(Default)]
struct FakeInner {
    mailboxes: Mutex<HashMap<String, Vec<MessageMeta>>>,
    failing: Mutex<HashMap<String, &'static str>>,
    observations: AtomicUsize,
}

/// Scripted remote state per account email; cloneable so tests keep a
/// handle after the engine takes ownership.
#[derive(Default, Clone)]
struct FakeObserver {
    inner: Arc<FakeInner>,
}

impl FakeObserver {
    fn set_mailbox(&self, email: &str, messages: Vec<MessageMeta>) {
        self.inner
            .mailboxes
            .lock()
            .unwrap()
            .insert(email.to_string(), messages);
    }

    fn fail_with(&self, email: &str, kind: &'static str) {
        self.inner
            .failing
            .lock()
            .unwrap()
            .insert(email.to_string(), kind);
    }

    fn observation_count(&self) -> usize {
        self.inner.observations.load(Ordering::SeqCst)
    }
}

impl RemoteObserver for FakeObserver {
    async fn observe(
        &self,
        account: &Account,
        _mailbox: &str,
    ) -> mailsync_imap::Result<Vec<MessageMeta>> {
        self.inner.observations.fetch_add(1, Ordering::SeqCst);

        if let Some(kind) = self.inner.failing.lock().unwrap().get(&account.email) {
            return Err(match *kind {
                "auth" => ImapError::Auth("a1 NO invalid credentials".to_string()),
                "mailbox" => ImapError::Mailbox("a2 NO unknown mailbox".to_string()),
                "connect" => ImapError::Connect("connection refused".to_string()),
                _ => ImapError::ConnectionClosed,
            });
        }

        Ok(self
            .inner
            .mailboxes
            .lock()
            .unwrap()
            .get(&account.email)
            .cloned()
            .unwrap_or_default())
    }
}

fn account(email: &str) -> Account {
    let mut account = Account::with_email(email);
    account.password = "secret".to_string();
    account
}

fn message(uid: u32, flags: &[Flag]) -> MessageMeta {
    MessageMeta {
        uid: Uid::new(uid),
        flags: flags.to_vec(),
    }
}

async fn engine_over(observer: &FakeObserver) -> SyncEngine<FakeObserver> {
    let cache = Arc::new(CacheRepository::in_memory().await.unwrap());
    SyncEngine::new(cache, observer.clone())
}

#[tokio::test]
async fn test_first_pass_populates_cache() {
    let observer = FakeObserver::default();
    let acct = account("a@example.com");
    observer.set_mailbox(
        &acct.email,
        vec![message(3, &[Flag::Seen]), message(5, &[]), message(9, &[])],
    );
    let engine = engine_over(&observer).await;

    let report = engine.full_sync(&acct, "INBOX").await;
    assert_eq!(
        report.outcome,
        SyncOutcome::Completed {
            added: 3,
            updated: 0,
            removed: 0,
            unchanged: 0,
        }
    );

    let entries = engine.cache().entries(&acct.email, "INBOX").await.unwrap();
    assert_eq!(entries.len(), 3);
    assert_eq!(entries[0].uid, 3);
    assert_eq!(entries[0].flags, "\\Seen");
}

#[tokio::test]
async fn test_second_pass_is_idempotent() {
    let observer = FakeObserver::default();
    let acct = account("a@example.com");
    observer.set_mailbox(&acct.email, vec![message(3, &[Flag::Seen]), message(5, &[])]);
    let engine = engine_over(&observer).await;

    let first = engine.full_sync(&acct, "INBOX").await;
    assert!(first.is_success());

    let second = engine.full_sync(&acct, "INBOX").await;
    assert_eq!(
        second.outcome,
        SyncOutcome::Completed {
            added: 0,
            updated: 0,
            removed: 0,
            unchanged: 2,
        }
    );
}

#[tokio::test]
async fn test_remote_changes_are_reconciled() {
    let observer = FakeObserver::default();
    let acct = account("a@example.com");
    observer.set_mailbox(&acct.email, vec![message(3, &[]), message(5, &[])]);
    let engine = engine_over(&observer).await;
    engine.full_sync(&acct, "INBOX").await;

    // Message 3 read, 5 expunged, 8 arrived.
    observer.set_mailbox(&acct.email, vec![message(3, &[Flag::Seen]), message(8, &[])]);

    let report = engine.full_sync(&acct, "INBOX").await;
    assert_eq!(
        report.outcome,
        SyncOutcome::Completed {
            added: 1,
            updated: 1,
            removed: 1,
            unchanged: 0,
        }
    );

    let entries = engine.cache().entries(&acct.email, "INBOX").await.unwrap();
    let uids: Vec<u32> = entries.iter().map(|e| e.uid).collect();
    assert_eq!(uids, vec![3, 8]);
    assert_eq!(entries[0].flags, "\\Seen");
}

#[tokio::test]
async fn test_failed_account_does_not_block_siblings() {
    let observer = FakeObserver::default();
    let broken = account("broken@example.com");
    let healthy = account("healthy@example.com");
    observer.fail_with(&broken.email, "mailbox");
    observer.set_mailbox(&healthy.email, vec![message(1, &[]), message(2, &[])]);
    let engine = engine_over(&observer).await;

    let reports = engine
        .sync_all(&[broken.clone(), healthy.clone()], "INBOX")
        .await;

    assert_eq!(reports.len(), 2);
    assert!(matches!(
        reports[0].outcome,
        SyncOutcome::Failed(SyncFailure::Mailbox(_))
    ));
    assert!(reports[1].is_success());

    let healthy_entries = engine
        .cache()
        .entries(&healthy.email, "INBOX")
        .await
        .unwrap();
    assert_eq!(healthy_entries.len(), 2);
    let broken_entries = engine
        .cache()
        .entries(&broken.email, "INBOX")
        .await
        .unwrap();
    assert!(broken_entries.is_empty());
}

#[tokio::test]
async fn test_failure_leaves_cache_untouched() {
    let observer = FakeObserver::default();
    let acct = account("a@example.com");
    observer.set_mailbox(&acct.email, vec![message(3, &[]), message(5, &[])]);
    let engine = engine_over(&observer).await;
    engine.full_sync(&acct, "INBOX").await;

    observer.fail_with(&acct.email, "transport");
    let report = engine.full_sync(&acct, "INBOX").await;
    assert!(matches!(
        report.outcome,
        SyncOutcome::Failed(SyncFailure::Transport(_))
    ));

    let entries = engine.cache().entries(&acct.email, "INBOX").await.unwrap();
    assert_eq!(entries.len(), 2, "cache must retain pre-pass state");
}

#[tokio::test]
async fn test_classified_failures() {
    let observer = FakeObserver::default();
    let auth = account("auth@example.com");
    let connect = account("connect@example.com");
    observer.fail_with(&auth.email, "auth");
    observer.fail_with(&connect.email, "connect");
    let engine = engine_over(&observer).await;

    let report = engine.full_sync(&auth, "INBOX").await;
    let SyncOutcome::Failed(failure) = &report.outcome else {
        panic!("expected failure");
    };
    assert!(matches!(failure, SyncFailure::Auth(_)));
    assert!(!failure.is_retry_worthy());

    let report = engine.full_sync(&connect, "INBOX").await;
    let SyncOutcome::Failed(failure) = &report.outcome else {
        panic!("expected failure");
    };
    assert!(matches!(failure, SyncFailure::Connect(_)));
    assert!(failure.is_retry_worthy());
}

#[tokio::test]
async fn test_reader_never_observes_torn_state() {
    let cache = Arc::new(CacheRepository::in_memory().await.unwrap());
    let now = chrono::Utc::now();
    let entries: Vec<_> = (1..=50)
        .map(|uid| CacheEntry {
            account_email: "a@example.com".to_string(),
            mailbox: "INBOX".to_string(),
            uid,
            flags: String::new(),
            synced_at: now,
        })
        .collect();
    cache
        .apply("a@example.com", "INBOX", &entries, &[], &[])
        .await
        .unwrap();

    // Flip every entry's flags in one apply while a reader polls.
    let updates: Vec<_> = entries
        .iter()
        .map(|e| CacheEntry {
            flags: "\\Seen".to_string(),
            ..e.clone()
        })
        .collect();

    let writer_cache = Arc::clone(&cache);
    let writer = tokio::spawn(async move {
        writer_cache
            .apply("a@example.com", "INBOX", &[], &updates, &[])
            .await
            .unwrap();
    });

    for _ in 0..10 {
        let snapshot = cache.entries("a@example.com", "INBOX").await.unwrap();
        assert_eq!(snapshot.len(), 50);
        let seen = snapshot.iter().filter(|e| e.flags == "\\Seen").count();
        assert!(
            seen == 0 || seen == 50,
            "torn state: {seen} of 50 entries updated"
        );
        tokio::task::yield_now().await;
    }

    writer.await.unwrap();
    let snapshot = cache.entries("a@example.com", "INBOX").await.unwrap();
    assert!(snapshot.iter().all(|e| e.flags == "\\Seen"));
}

// Real time, not `start_paused`: sqlx's sqlite driver pings its worker
// thread whenever a connection returns to the pool, and under a paused
// clock that park lets tokio auto-advance straight into the pool's
// acquire timeout, failing every cache access with `PoolTimedOut`.
#[tokio::test]
async fn test_daemon_ticks_until_shutdown() {
    let observer = FakeObserver::default();
    let acct = account("a@example.com");
    observer.set_mailbox(&acct.email, vec![message(1, &[])]);
    let engine = Arc::new(engine_over(&observer).await);

    let (stop_tx, stop_rx) = tokio::sync::oneshot::channel::<()>();
    let config = DaemonConfig {
        interval: Duration::from_secs(60),
        mailbox: "INBOX".to_string(),
    };

    let daemon_engine = Arc::clone(&engine);
    let accounts = vec![acct];
    let handle = tokio::spawn(async move {
        daemon::run(&daemon_engine, &accounts, &config, async {
            let _ = stop_rx.await;
        })
        .await;
    });

    // First tick fires immediately; waiting past two intervals yields at
    // least three passes.
    tokio::time::sleep(Duration::from_secs(150)).await;
    assert!(observer.observation_count() >= 3);

    stop_tx.send(()).unwrap();
    handle.await.unwrap();

    let entries = engine
        .cache()
        .entries("a@example.com", "INBOX")
        .await
        .unwrap();
    assert_eq!(entries.len(), 1);
}
