//! # mailsync-core
//!
//! Core logic for the `mailsync` mailbox mirror.
//!
//! This crate provides:
//! - Account configuration and the on-disk account store
//! - The local message cache (`SQLite`)
//! - The full-mailbox reconciliation engine
//! - The periodic background sync loop
//!
//! Protocol work lives in `mailsync-imap`; rendering, credential
//! acquisition, and process supervision are external collaborators.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

pub mod account;
pub mod cache;
pub mod daemon;
mod error;
pub mod sync;

pub use account::{Account, AccountStore, Provider};
pub use cache::{CacheEntry, CacheRepository, default_cache_path, normalize_flags};
pub use daemon::{DEFAULT_SYNC_INTERVAL, DaemonConfig};
pub use error::{Error, Result};
pub use sync::{
    ImapObserver, MailboxDelta, RemoteObserver, SyncEngine, SyncFailure, SyncOutcome, SyncReport,
    diff,
};
