//! Remote/local reconciliation diff.

use std::collections::BTreeMap;

use chrono::Utc;
use mailsync_imap::MessageMeta;

use crate::cache::{CacheEntry, normalize_flags};

/// The changes one reconciliation pass must apply to the cache.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct MailboxDelta {
    /// Entries present remotely but absent locally.
    pub additions: Vec<CacheEntry>,
    /// Entries present in both with differing flags.
    pub updates: Vec<CacheEntry>,
    /// UIDs present locally but absent remotely.
    pub removals: Vec<u32>,
    /// Entries present in both with identical flags.
    pub unchanged: usize,
}

impl MailboxDelta {
    /// Returns true if the pass found nothing to change.
    #[must_use]
    pub fn is_noop(&self) -> bool {
        self.additions.is_empty() && self.updates.is_empty() && self.removals.is_empty()
    }
}

/// Diffs the server's current state against the cached entries for one
/// (account, mailbox) pair.
///
/// Pure function: does not touch the network or the database, so the
/// reconciliation rules are testable in isolation.
#[must_use]
pub fn diff(
    account_email: &str,
    mailbox: &str,
    remote: &[MessageMeta],
    cached: &[CacheEntry],
) -> MailboxDelta {
    let now = Utc::now();
    let local: BTreeMap<u32, &CacheEntry> = cached.iter().map(|e| (e.uid, e)).collect();

    let mut delta = MailboxDelta::default();
    let mut seen = std::collections::BTreeSet::new();

    for message in remote {
        let uid = message.uid.get();
        // Servers may repeat a UID across FETCH responses; first wins.
        if !seen.insert(uid) {
            continue;
        }
        let flags = normalize_flags(&message.flags);

        match local.get(&uid) {
            None => delta.additions.push(CacheEntry {
                account_email: account_email.to_string(),
                mailbox: mailbox.to_string(),
                uid,
                flags,
                synced_at: now,
            }),
            Some(entry) if entry.flags == flags => delta.unchanged += 1,
            Some(_) => delta.updates.push(CacheEntry {
                account_email: account_email.to_string(),
                mailbox: mailbox.to_string(),
                uid,
                flags,
                synced_at: now,
            }),
        }
    }

    for entry in cached {
        if !seen.contains(&entry.uid) {
            delta.removals.push(entry.uid);
        }
    }

    delta
}
