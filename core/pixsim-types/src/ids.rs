//! Identifier types for console log entries.
//!
//! Entry ids are monotonic per generator, so sorting by id equals sorting by
//! insertion order even when two entries share a millisecond timestamp.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Identifier of a single console log entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntryId(u64);

impl EntryId {
    /// Creates an entry id from a raw sequence number.
    #[must_use]
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// Returns the underlying sequence number.
    #[must_use]
    pub const fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl FromStr for EntryId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.trim_start_matches('#').parse()?))
    }
}

/// Hands out strictly increasing entry ids, starting at 1.
#[derive(Debug, Clone, Default)]
pub struct EntryIdGenerator {
    last: u64,
}

impl EntryIdGenerator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the next id. Never repeats for the lifetime of the generator.
    pub fn next_id(&mut self) -> EntryId {
        self.last = self.last.saturating_add(1);
        EntryId(self.last)
    }

    /// The most recently issued id, if any.
    #[must_use]
    pub fn last(&self) -> Option<EntryId> {
        (self.last > 0).then_some(EntryId(self.last))
    }
}
