//! Server response parser.
//!
//! Each CRLF-terminated line from the server is classified into a structured
//! [`Event`]. Only the grammar the sync and search paths depend on is parsed
//! in full; every other untagged line is surfaced as [`Event::Other`] for the
//! caller to inspect or discard. Keeping the parser free of any I/O makes the
//! grammar testable independent of transport.

use crate::types::{Flag, Status, Uid};
use crate::{Error, Result};

/// A parsed server line.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// `* SEARCH` followed by zero or more UIDs.
    SearchHit(Vec<Uid>),
    /// `* <n> EXISTS` message count for the selected mailbox.
    Exists(u32),
    /// `* <n> FETCH (...)` carrying UID and flags.
    FetchFlags {
        /// Message sequence number.
        seq: u32,
        /// UID, when the server included one in the attribute list.
        uid: Option<Uid>,
        /// Flags currently set on the message.
        flags: Vec<Flag>,
    },
    /// Tagged command completion.
    Completion(Completion),
    /// Any other line (untagged data or continuation); kept verbatim.
    Other(String),
}

/// A tagged completion line: `<tag> OK|NO|BAD <text>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    /// The command tag this completion answers.
    pub tag: String,
    /// Completion status.
    pub status: Status,
    /// Remainder of the line (the provider's human-readable text).
    pub text: String,
}

impl Completion {
    /// Reconstructs the raw server line, for diagnostics.
    #[must_use]
    pub fn raw_line(&self) -> String {
        if self.text.is_empty() {
            format!("{} {}", self.tag, self.status)
        } else {
            format!("{} {} {}", self.tag, self.status, self.text)
        }
    }
}

/// Parses one server line (with or without trailing CRLF).
///
/// # Errors
///
/// Returns [`Error::Parse`] when a line matches a known shape but carries
/// malformed data (e.g. a non-numeric UID in a `* SEARCH` result).
pub fn parse(line: &str) -> Result<Event> {
    let line = line.trim_end_matches(['\r', '\n']);

    if let Some(rest) = line.strip_prefix("* ") {
        return parse_untagged(rest, line);
    }
    if line.starts_with('+') {
        // Continuation requests never occur on the paths we drive.
        return Ok(Event::Other(line.to_string()));
    }
    parse_tagged(line)
}

fn parse_untagged(rest: &str, full: &str) -> Result<Event> {
    if rest == "SEARCH" {
        return Ok(Event::SearchHit(Vec::new()));
    }
    if let Some(ids) = rest.strip_prefix("SEARCH ") {
        return parse_search_ids(ids, full);
    }

    // Numeric untagged data: `<n> EXISTS`, `<n> FETCH (...)`, etc.
    if let Some((first, tail)) = rest.split_once(' ') {
        if let Ok(n) = first.parse::<u32>() {
            if tail == "EXISTS" {
                return Ok(Event::Exists(n));
            }
            if let Some(attrs) = tail.strip_prefix("FETCH ") {
                return parse_fetch_attrs(n, attrs, full);
            }
        }
    }

    Ok(Event::Other(full.to_string()))
}

fn parse_search_ids(ids: &str, full: &str) -> Result<Event> {
    let mut uids = Vec::new();
    for token in ids.split_ascii_whitespace() {
        let value: u32 = token.parse().map_err(|_| Error::Parse {
            position: offset_of(full, token),
            message: format!("expected UID, got {token:?}"),
        })?;
        uids.push(Uid::new(value));
    }
    Ok(Event::SearchHit(uids))
}

/// Parses the parenthesized attribute list of a FETCH response, extracting
/// UID and FLAGS and skipping anything else.
fn parse_fetch_attrs(seq: u32, attrs: &str, full: &str) -> Result<Event> {
    let inner = attrs
        .strip_prefix('(')
        .and_then(|s| s.strip_suffix(')'))
        .ok_or_else(|| Error::Parse {
            position: offset_of(full, attrs),
            message: "FETCH attributes not parenthesized".to_string(),
        })?;

    let mut uid = None;
    let mut flags = Vec::new();
    let mut tokens = inner.split_ascii_whitespace();

    while let Some(token) = tokens.next() {
        match token.to_ascii_uppercase().as_str() {
            "UID" => {
                let value = tokens.next().ok_or_else(|| Error::Parse {
                    position: full.len(),
                    message: "UID attribute missing value".to_string(),
                })?;
                let n: u32 = value.parse().map_err(|_| Error::Parse {
                    position: offset_of(full, value),
                    message: format!("expected UID, got {value:?}"),
                })?;
                uid = Some(Uid::new(n));
            }
            "FLAGS" => {
                // Flag lists are flat (no nesting), so collecting tokens
                // until the closing paren is sufficient.
                for flag_token in tokens.by_ref() {
                    let trimmed = flag_token.trim_start_matches('(');
                    let done = trimmed.ends_with(')');
                    let name = trimmed.trim_end_matches(')');
                    if !name.is_empty() {
                        flags.push(Flag::parse(name));
                    }
                    if done {
                        break;
                    }
                }
            }
            _ => {}
        }
    }

    Ok(Event::FetchFlags { seq, uid, flags })
}

fn parse_tagged(line: &str) -> Result<Event> {
    let Some((tag, rest)) = line.split_once(' ') else {
        return Ok(Event::Other(line.to_string()));
    };

    let (word, text) = match rest.split_once(' ') {
        Some((word, text)) => (word, text),
        None => (rest, ""),
    };

    let status = match word {
        "OK" => Status::Ok,
        "NO" => Status::No,
        "BAD" => Status::Bad,
        _ => return Ok(Event::Other(line.to_string())),
    };

    Ok(Event::Completion(Completion {
        tag: tag.to_string(),
        status,
        text: text.to_string(),
    }))
}

fn offset_of(haystack: &str, needle: &str) -> usize {
    // The needle is always a subslice of the haystack here.
    needle.as_ptr() as usize - haystack.as_ptr() as usize
}
