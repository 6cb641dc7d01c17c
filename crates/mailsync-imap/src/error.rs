//! Error types for the IMAP driver.

use thiserror::Error;

/// Errors that can occur during IMAP operations.
///
/// Transport failures (`Io`, `Tls`, `Connect`, `ConnectionClosed`) are kept
/// distinct from protocol-level rejections (`Auth`, `Mailbox`, `SearchFailed`,
/// `No`, `Bad`) so callers can decide whether a retry is sensible.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error during network operations.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// TLS handshake or encryption error.
    #[error("TLS error: {0}")]
    Tls(#[from] rustls::Error),

    /// Invalid DNS name for TLS.
    #[error("Invalid DNS name: {0}")]
    InvalidDnsName(#[from] rustls::pki_types::InvalidDnsNameError),

    /// Dialing failed or the server greeting could not be read.
    #[error("Connect failed: {0}")]
    Connect(String),

    /// The server closed the connection before a tagged completion arrived.
    #[error("Connection closed mid-command")]
    ConnectionClosed,

    /// Protocol parsing error.
    #[error("Protocol error at position {position}: {message}")]
    Parse {
        /// Byte position where the error occurred.
        position: usize,
        /// Description of what went wrong.
        message: String,
    },

    /// LOGIN was rejected by the server.
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// SELECT was rejected by the server.
    #[error("Mailbox error: {0}")]
    Mailbox(String),

    /// UID SEARCH was rejected; carries the raw tagged server line.
    #[error("Search failed: {0}")]
    SearchFailed(String),

    /// Server returned NO for a command with no more specific mapping.
    #[error("Server returned NO: {0}")]
    No(String),

    /// Server returned BAD for a command with no more specific mapping.
    #[error("Server returned BAD: {0}")]
    Bad(String),

    /// Protocol violation or unexpected data.
    #[error("Protocol error: {0}")]
    Protocol(String),
}

impl Error {
    /// Returns true if this error is a transport failure rather than a
    /// protocol-level rejection.
    #[must_use]
    pub const fn is_transport(&self) -> bool {
        matches!(
            self,
            Self::Io(_) | Self::Tls(_) | Self::Connect(_) | Self::ConnectionClosed
        )
    }
}

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;
