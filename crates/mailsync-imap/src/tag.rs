//! IMAP command tag generator.
//!
//! Tags are used to match commands with their responses.

use std::sync::atomic::{AtomicU32, Ordering};

/// Tag generator for IMAP commands.
///
/// Generates unique sequential tags in the format "a1", "a2", etc.,
/// scoped to one session.
#[derive(Debug)]
pub struct TagGenerator {
    counter: AtomicU32,
    prefix: char,
}

impl TagGenerator {
    /// Creates a new tag generator with the given prefix.
    #[must_use]
    pub const fn new(prefix: char) -> Self {
        Self {
            counter: AtomicU32::new(0),
            prefix,
        }
    }

    /// Generates the next tag.
    ///
    /// # Panics
    ///
    /// Panics if the tag counter would overflow `u32::MAX`. In practice, this
    /// would require 4+ billion tags in a single session, which is unrealistic.
    #[must_use]
    pub fn next(&self) -> String {
        let n = self.counter.fetch_add(1, Ordering::Relaxed);
        if n == u32::MAX {
            panic!("tag counter overflow: generated {n} tags in this session");
        }
        format!("{}{}", self.prefix, n + 1)
    }
}

impl Default for TagGenerator {
    fn default() -> Self {
        Self::new('a')
    }
}
