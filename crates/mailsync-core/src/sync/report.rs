//! Per-pass sync outcomes.

use std::fmt;

use mailsync_imap::Error as ImapError;

/// Outcome of one reconciliation pass for one (account, mailbox) pair.
///
/// Failures are values, never unhandled faults: a failed account must not
/// abort sibling accounts in the same tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncReport {
    /// Account email the pass ran for.
    pub account: String,
    /// Mailbox that was reconciled.
    pub mailbox: String,
    /// What happened.
    pub outcome: SyncOutcome,
}

impl SyncReport {
    /// Returns true if the pass completed.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self.outcome, SyncOutcome::Completed { .. })
    }
}

impl fmt::Display for SyncReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}: {}", self.account, self.mailbox, self.outcome)
    }
}

/// Success counts or a classified failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    /// The pass completed and the cache reflects server state.
    Completed {
        /// Entries present remotely but not locally.
        added: usize,
        /// Entries whose flags changed.
        updated: usize,
        /// Entries no longer present remotely.
        removed: usize,
        /// Entries already in sync.
        unchanged: usize,
    },
    /// The pass failed; the cache retains its pre-pass state.
    Failed(SyncFailure),
}

impl fmt::Display for SyncOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Completed {
                added,
                updated,
                removed,
                unchanged,
            } => write!(
                f,
                "synced ({added} added, {updated} updated, {removed} removed, {unchanged} unchanged)"
            ),
            Self::Failed(failure) => write!(f, "failed: {failure}"),
        }
    }
}

/// Classified sync failure.
///
/// Transport failures are worth retrying on a later tick; auth and mailbox
/// failures are not without operator intervention.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncFailure {
    /// Dial or greeting failure.
    Connect(String),
    /// LOGIN rejected.
    Auth(String),
    /// SELECT rejected (e.g. mailbox does not exist).
    Mailbox(String),
    /// Connection dropped or timed out mid-exchange.
    Transport(String),
    /// The server violated the expected grammar or rejected a command
    /// outside the classified cases.
    Protocol(String),
    /// Local persistence failure; nothing was committed.
    Cache(String),
}

impl SyncFailure {
    /// Returns true if retrying on a later tick could plausibly succeed.
    #[must_use]
    pub const fn is_retry_worthy(&self) -> bool {
        matches!(self, Self::Connect(_) | Self::Transport(_) | Self::Cache(_))
    }
}

impl fmt::Display for SyncFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Connect(msg) => write!(f, "connect: {msg}"),
            Self::Auth(msg) => write!(f, "auth: {msg}"),
            Self::Mailbox(msg) => write!(f, "mailbox: {msg}"),
            Self::Transport(msg) => write!(f, "transport: {msg}"),
            Self::Protocol(msg) => write!(f, "protocol: {msg}"),
            Self::Cache(msg) => write!(f, "cache: {msg}"),
        }
    }
}

impl From<ImapError> for SyncFailure {
    fn from(error: ImapError) -> Self {
        match error {
            ImapError::Connect(msg) => Self::Connect(msg),
            ImapError::InvalidDnsName(e) => Self::Connect(e.to_string()),
            ImapError::Auth(msg) => Self::Auth(msg),
            ImapError::Mailbox(msg) => Self::Mailbox(msg),
            ImapError::Io(_) | ImapError::Tls(_) | ImapError::ConnectionClosed => {
                Self::Transport(error.to_string())
            }
            other => Self::Protocol(other.to_string()),
        }
    }
}
