//! Single-connection IMAP protocol session.
//!
//! A [`Session`] owns one connection and one tag counter, and drives exactly
//! one command at a time: write the tagged line, then consume server lines
//! until the completion for that tag arrives. Sessions exist for the duration
//! of one logical operation (login, select, operation, logout) and are
//! discarded afterwards; they are never pooled or shared across accounts.

use tokio::io::{AsyncRead, AsyncWrite};

use crate::command;
use crate::line::LineStream;
use crate::response::{self, Completion, Event};
use crate::stream::{ImapStream, connect_tls};
use crate::tag::TagGenerator;
use crate::types::{Flag, Status, Uid};
use crate::{Error, Result};

/// UID plus the minimal metadata needed to detect change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageMeta {
    /// Server-assigned UID.
    pub uid: Uid,
    /// Flags currently set on the message, in server order.
    pub flags: Vec<Flag>,
}

/// An authenticated-capable IMAP session over one connection.
pub struct Session<S> {
    stream: LineStream<S>,
    tags: TagGenerator,
}

impl Session<ImapStream> {
    /// Dials the endpoint over TLS and consumes the server greeting.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Connect`] if the dial fails or the greeting cannot
    /// be read.
    pub async fn open(host: &str, port: u16) -> Result<Self> {
        let stream = connect_tls(host, port)
            .await
            .map_err(|e| Error::Connect(e.to_string()))?;
        Self::from_stream(stream)
            .await
            .map_err(|e| Error::Connect(e.to_string()))
    }
}

impl<S> Session<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    /// Wraps an already-connected stream, reading and discarding the
    /// server greeting line.
    ///
    /// # Errors
    ///
    /// Returns an error if the greeting cannot be read.
    pub async fn from_stream(stream: S) -> Result<Self> {
        let mut stream = LineStream::new(stream);
        let greeting = stream.read_line().await?;
        tracing::trace!(greeting = greeting.trim_end(), "greeting");

        Ok(Self {
            stream,
            tags: TagGenerator::default(),
        })
    }

    /// Issues a tagged LOGIN with both arguments quoted.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Auth`] if the server answers NO or BAD, or a
    /// transport error if the exchange is cut short.
    pub async fn login(&mut self, email: &str, secret: &str) -> Result<()> {
        let tag = self.tags.next();
        let completion = self
            .execute(&command::login(&tag, email, secret), &tag)
            .await?
            .1;
        tracing::debug!(%email, status = %completion.status, "LOGIN");

        match completion.status {
            Status::Ok => Ok(()),
            _ => Err(Error::Auth(completion.raw_line())),
        }
    }

    /// Issues a tagged SELECT for the quoted mailbox name.
    ///
    /// Returns the message count from the untagged EXISTS response, or
    /// `None` when the server did not send one; absence must not be read
    /// as an empty mailbox.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Mailbox`] if the server answers NO or BAD.
    pub async fn select(&mut self, mailbox: &str) -> Result<Option<u32>> {
        let tag = self.tags.next();
        let (events, completion) = self.execute(&command::select(&tag, mailbox), &tag).await?;
        tracing::debug!(mailbox, status = %completion.status, "SELECT");

        if !completion.status.is_ok() {
            return Err(Error::Mailbox(completion.raw_line()));
        }

        let exists = events.iter().find_map(|event| match event {
            Event::Exists(n) => Some(*n),
            _ => None,
        });
        Ok(exists)
    }

    /// Issues a tagged UID SEARCH with the given search key (`X-GM-RAW` or
    /// `TEXT`) and returns the matched UIDs in the order seen.
    ///
    /// A `* SEARCH` response with no ids is an empty result, not an error.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SearchFailed`] carrying the raw tagged line if the
    /// server answers NO or BAD.
    pub async fn uid_search(&mut self, key: &str, query: &str) -> Result<Vec<Uid>> {
        let tag = self.tags.next();
        let (events, completion) = self
            .execute(&command::uid_search(&tag, key, query), &tag)
            .await?;

        if !completion.status.is_ok() {
            return Err(Error::SearchFailed(completion.raw_line()));
        }

        let mut uids = Vec::new();
        for event in events {
            if let Event::SearchHit(ids) = event {
                uids.extend(ids);
            }
        }
        tracing::debug!(hits = uids.len(), "UID SEARCH");
        Ok(uids)
    }

    /// Enumerates the selected mailbox via `UID FETCH 1:* (UID FLAGS)`.
    ///
    /// FETCH responses without a UID attribute are skipped; an empty
    /// mailbox yields an empty vector.
    ///
    /// # Errors
    ///
    /// Returns [`Error::No`]/[`Error::Bad`] on a rejected command.
    pub async fn fetch_flags(&mut self) -> Result<Vec<MessageMeta>> {
        let tag = self.tags.next();
        let (events, completion) = self.execute(&command::uid_fetch_flags(&tag), &tag).await?;

        match completion.status {
            Status::Ok => {}
            Status::No => return Err(Error::No(completion.text)),
            Status::Bad => return Err(Error::Bad(completion.text)),
        }

        let mut messages = Vec::new();
        for event in events {
            if let Event::FetchFlags {
                uid: Some(uid),
                flags,
                ..
            } = event
            {
                messages.push(MessageMeta { uid, flags });
            }
        }
        tracing::debug!(messages = messages.len(), "UID FETCH");
        Ok(messages)
    }

    /// Issues a best-effort LOGOUT and releases the connection.
    ///
    /// The server's answer is ignored; this must be called on every exit
    /// path of an operation so sockets are not leaked to the server side.
    pub async fn close(mut self) {
        let tag = self.tags.next();
        if let Err(e) = self.stream.write_command(&command::logout(&tag)).await {
            tracing::trace!(error = %e, "LOGOUT write failed");
        }
        // Connection drops here; reading the BYE/completion is pointless.
    }

    /// Writes one tagged command and reads lines until the completion for
    /// that tag, accumulating untagged events along the way.
    async fn execute(&mut self, line: &str, tag: &str) -> Result<(Vec<Event>, Completion)> {
        self.stream.write_command(line).await?;

        let mut events = Vec::new();
        loop {
            let raw = self.stream.read_line().await?;
            match response::parse(&raw)? {
                Event::Completion(completion) if completion.tag == tag => {
                    return Ok((events, completion));
                }
                // Completions for foreign tags cannot occur with one
                // in-flight command; drop them like any other noise.
                Event::Completion(_) | Event::Other(_) => {}
                event => events.push(event),
            }
        }
    }
}
