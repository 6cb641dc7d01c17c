//! Mailbox reconciliation.
//!
//! A pass is always a full reconciliation: re-enumerate the remote
//! mailbox, diff against the cache, apply the delta atomically. Full sync
//! is correct under arbitrary server-side reordering, external client
//! modifications, and identifier reuse, which is the right trade-off for a
//! periodic low-frequency background job.

mod diff;
mod engine;
mod observer;
mod report;

pub use diff::{MailboxDelta, diff};
pub use engine::SyncEngine;
pub use observer::{ImapObserver, RemoteObserver};
pub use report::{SyncFailure, SyncOutcome, SyncReport};
