//! Core protocol types shared by the session and parser.

use std::fmt;

/// A server-assigned message UID.
///
/// Unique within a mailbox and non-decreasing as assigned by the server,
/// but not guaranteed contiguous.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Uid(pub u32);

impl Uid {
    /// Creates a new UID.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Returns the raw value.
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }
}

impl fmt::Display for Uid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for Uid {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

/// Completion status of a tagged response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// Command succeeded.
    Ok,
    /// Command failed (operational error).
    No,
    /// Command was rejected (protocol error).
    Bad,
}

impl Status {
    /// Returns true for `OK`.
    #[must_use]
    pub const fn is_ok(self) -> bool {
        matches!(self, Self::Ok)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ok => write!(f, "OK"),
            Self::No => write!(f, "NO"),
            Self::Bad => write!(f, "BAD"),
        }
    }
}

/// A message flag as reported in a FETCH FLAGS list.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Flag {
    /// Message has been read (`\Seen`).
    Seen,
    /// Message has been answered (`\Answered`).
    Answered,
    /// Message is flagged/starred (`\Flagged`).
    Flagged,
    /// Message is marked for deletion (`\Deleted`).
    Deleted,
    /// Message is a draft (`\Draft`).
    Draft,
    /// Recent flag (`\Recent`, IMAP4rev1 only).
    Recent,
    /// Server- or client-defined keyword.
    Keyword(String),
}

impl Flag {
    /// Parses a flag from its wire form.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s {
            "\\Seen" => Self::Seen,
            "\\Answered" => Self::Answered,
            "\\Flagged" => Self::Flagged,
            "\\Deleted" => Self::Deleted,
            "\\Draft" => Self::Draft,
            "\\Recent" => Self::Recent,
            other => Self::Keyword(other.to_string()),
        }
    }

    /// Returns the wire form of the flag.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Seen => "\\Seen",
            Self::Answered => "\\Answered",
            Self::Flagged => "\\Flagged",
            Self::Deleted => "\\Deleted",
            Self::Draft => "\\Draft",
            Self::Recent => "\\Recent",
            Self::Keyword(s) => s,
        }
    }
}

impl fmt::Display for Flag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_uid_ordering() {
        assert!(Uid::new(3) < Uid::new(10));
        assert_eq!(Uid::new(7).get(), 7);
    }

    #[test]
    fn test_flag_roundtrip() {
        for raw in ["\\Seen", "\\Answered", "\\Flagged", "\\Deleted", "\\Draft"] {
            assert_eq!(Flag::parse(raw).as_str(), raw);
        }
        assert_eq!(Flag::parse("$Important"), Flag::Keyword("$Important".into()));
    }

    #[test]
    fn test_status_display() {
        assert_eq!(Status::Ok.to_string(), "OK");
        assert_eq!(Status::No.to_string(), "NO");
        assert_eq!(Status::Bad.to_string(), "BAD");
        assert!(Status::Ok.is_ok());
        assert!(!Status::Bad.is_ok());
    }
}
