//! Remote mailbox observation.

use std::future::Future;

use mailsync_imap::{MessageMeta, Session};
use tokio::io::{AsyncRead, AsyncWrite};

use crate::account::Account;

/// One-shot observation of a remote mailbox's message state.
///
/// The trait seam keeps the reconciliation rules testable without a
/// server; the production implementation is [`ImapObserver`].
pub trait RemoteObserver: Send + Sync {
    /// Observes the (uid, flags) snapshot of one mailbox.
    ///
    /// One call owns one protocol session end to end: open, login, select,
    /// enumerate, logout — with logout on every exit path.
    fn observe(
        &self,
        account: &Account,
        mailbox: &str,
    ) -> impl Future<Output = mailsync_imap::Result<Vec<MessageMeta>>> + Send;
}

/// Production observer: one TLS session per observation, never reused.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImapObserver;

impl RemoteObserver for ImapObserver {
    async fn observe(
        &self,
        account: &Account,
        mailbox: &str,
    ) -> mailsync_imap::Result<Vec<MessageMeta>> {
        let mut session = Session::open(&account.imap_host, account.imap_port).await?;
        let result = enumerate(&mut session, account, mailbox).await;
        session.close().await;
        result
    }
}

async fn enumerate<S>(
    session: &mut Session<S>,
    account: &Account,
    mailbox: &str,
) -> mailsync_imap::Result<Vec<MessageMeta>>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    session.login(&account.email, &account.password).await?;
    let exists = session.select(mailbox).await?;
    if exists == Some(0) {
        // The server explicitly reported an empty mailbox; skip the FETCH
        // round-trip. A missing EXISTS line means unknown, not empty.
        return Ok(Vec::new());
    }
    session.fetch_flags().await
}
