//! Provider-aware mailbox search.
//!
//! Gmail-family servers accept their full query syntax through the
//! `X-GM-RAW` extension; everything else falls back to the standard
//! `TEXT` search key. The variant is not validated client-side — an
//! unsupported extension simply surfaces as a server-side BAD.

use crate::Result;
use crate::session::Session;
use crate::types::Uid;

/// Which UID SEARCH variant to issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchVariant {
    /// `UID SEARCH X-GM-RAW "<query>"` (Gmail-family servers).
    GmailRaw,
    /// `UID SEARCH TEXT "<query>"` (standard IMAP).
    #[default]
    Text,
}

impl SearchVariant {
    /// Returns the search key for the wire.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::GmailRaw => "X-GM-RAW",
            Self::Text => "TEXT",
        }
    }
}

/// A server endpoint to dial.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    /// Server hostname.
    pub host: String,
    /// Server port.
    pub port: u16,
}

impl Endpoint {
    /// Creates a new endpoint.
    #[must_use]
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }
}

/// Runs one search against the server and returns the matched UIDs in the
/// order the server reported them.
///
/// The resolver opens and closes its own session (login, select, search,
/// logout); it never shares an authenticated connection with a sync pass.
///
/// # Errors
///
/// Returns [`crate::Error::Connect`] / [`crate::Error::Auth`] /
/// [`crate::Error::Mailbox`] for the setup steps, and
/// [`crate::Error::SearchFailed`] carrying the raw tagged line when the
/// search itself is rejected.
pub async fn search(
    endpoint: &Endpoint,
    email: &str,
    secret: &str,
    variant: SearchVariant,
    mailbox: &str,
    query: &str,
) -> Result<Vec<Uid>> {
    let mut session = Session::open(&endpoint.host, endpoint.port).await?;
    let result = run_search(&mut session, email, secret, variant, mailbox, query).await;
    session.close().await;
    result
}

async fn run_search<S>(
    session: &mut Session<S>,
    email: &str,
    secret: &str,
    variant: SearchVariant,
    mailbox: &str,
    query: &str,
) -> Result<Vec<Uid>>
where
    S: tokio::io::AsyncRead + tokio::io::AsyncWrite + Unpin,
{
    session.login(email, secret).await?;
    let _ = session.select(mailbox).await?;
    session.uid_search(variant.key(), query).await
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_variant_keys() {
        assert_eq!(SearchVariant::GmailRaw.key(), "X-GM-RAW");
        assert_eq!(SearchVariant::Text.key(), "TEXT");
        assert_eq!(SearchVariant::default(), SearchVariant::Text);
    }
}
