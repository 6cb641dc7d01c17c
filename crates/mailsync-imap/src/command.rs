//! IMAP command construction.
//!
//! Every command is a single CRLF-terminated line. String arguments are
//! always sent as quoted strings: wrapped in double quotes with backslash
//! and double-quote characters escaped. No other escaping is applied.

/// Quotes a string argument for the wire.
///
/// Backslash becomes `\\`, double quote becomes `\"`, and the result is
/// wrapped in double quotes.
#[must_use]
pub fn quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        if c == '\\' || c == '"' {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('"');
    out
}

/// Builds a tagged LOGIN command line.
#[must_use]
pub fn login(tag: &str, email: &str, secret: &str) -> String {
    format!("{tag} LOGIN {} {}\r\n", quote(email), quote(secret))
}

/// Builds a tagged SELECT command line.
#[must_use]
pub fn select(tag: &str, mailbox: &str) -> String {
    format!("{tag} SELECT {}\r\n", quote(mailbox))
}

/// Builds a tagged UID SEARCH command line for the given search key.
///
/// `key` is `X-GM-RAW` for Gmail-family servers or `TEXT` for generic
/// IMAP; the query is quoted either way.
#[must_use]
pub fn uid_search(tag: &str, key: &str, query: &str) -> String {
    format!("{tag} UID SEARCH {key} {}\r\n", quote(query))
}

/// Builds a tagged UID FETCH command enumerating UIDs and flags for the
/// whole mailbox.
#[must_use]
pub fn uid_fetch_flags(tag: &str) -> String {
    format!("{tag} UID FETCH 1:* (UID FLAGS)\r\n")
}

/// Builds a tagged LOGOUT command line.
#[must_use]
pub fn logout(tag: &str) -> String {
    format!("{tag} LOGOUT\r\n")
}
