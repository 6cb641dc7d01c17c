//! Cache data models.

use chrono::{DateTime, Utc};
use mailsync_imap::Flag;

/// One cached message record, keyed by (account, mailbox, uid).
///
/// Holds only the minimal metadata needed to detect change: the flag set
/// and the time it was last reconciled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry {
    /// Account the message belongs to.
    pub account_email: String,
    /// Mailbox name as accepted by SELECT.
    pub mailbox: String,
    /// Server-assigned UID.
    pub uid: u32,
    /// Normalized flag set (see [`normalize_flags`]).
    pub flags: String,
    /// When this entry was last written by a reconciliation pass.
    pub synced_at: DateTime<Utc>,
}

/// Normalizes a flag list into a canonical comparison key.
///
/// Flags are sorted and joined with a single space so that server-side
/// reordering between fetches does not register as a change.
#[must_use]
pub fn normalize_flags(flags: &[Flag]) -> String {
    let mut forms: Vec<&str> = flags.iter().map(Flag::as_str).collect();
    forms.sort_unstable();
    forms.dedup();
    forms.join(" ")
}
