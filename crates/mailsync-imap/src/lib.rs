//! # mailsync-imap
//!
//! A minimal, line-oriented IMAP protocol driver covering exactly what a
//! periodic mailbox sync and a provider-aware search need: tagged LOGIN,
//! SELECT, UID SEARCH (standard `TEXT` or Gmail `X-GM-RAW`), UID FETCH of
//! UIDs and flags, and LOGOUT.
//!
//! ## Design
//!
//! - **Session per operation**: a [`Session`] wraps one TLS connection and
//!   one tag counter, drives one command at a time, and is discarded after
//!   the operation. No pooling, no reuse across accounts.
//! - **Explicit tag correlation**: commands get sequential tags (`a1`,
//!   `a2`, ...); the reader consumes lines until the tagged completion,
//!   classifying each line with a transport-independent parser.
//! - **TLS via rustls**: secure connections without an OpenSSL dependency.
//!
//! ## Quick Start
//!
//! ```ignore
//! use mailsync_imap::{search, Endpoint, SearchVariant};
//!
//! #[tokio::main]
//! async fn main() -> mailsync_imap::Result<()> {
//!     let endpoint = Endpoint::new("imap.gmail.com", 993);
//!     let uids = search(
//!         &endpoint,
//!         "user@gmail.com",
//!         "app-password",
//!         SearchVariant::GmailRaw,
//!         "INBOX",
//!         "from:billing has:attachment",
//!     )
//!     .await?;
//!     println!("{} matches", uids.len());
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

pub mod command;
mod error;
pub mod line;
pub mod response;
pub mod search;
pub mod session;
pub mod stream;
pub mod tag;
pub mod types;

pub use error::{Error, Result};
pub use response::{Completion, Event};
pub use search::{Endpoint, SearchVariant, search};
pub use session::{MessageMeta, Session};
pub use stream::{ImapStream, connect_tls};
pub use tag::TagGenerator;
pub use types::{Flag, Status, Uid};
