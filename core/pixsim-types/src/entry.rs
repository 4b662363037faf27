use crate::{EntryId, Error, Timestamp};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// What produced a console log line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    /// A command typed by the user.
    Input,
    /// The rendered result of a successful command.
    Output,
    /// A failed command.
    Error,
    /// Informational text emitted by the console itself.
    Info,
}

impl EntryKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntryKind::Input => "input",
            EntryKind::Output => "output",
            EntryKind::Error => "error",
            EntryKind::Info => "info",
        }
    }
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntryKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "input" => Ok(EntryKind::Input),
            "output" => Ok(EntryKind::Output),
            "error" => Ok(EntryKind::Error),
            "info" => Ok(EntryKind::Info),
            other => Err(Error::UnknownEntryKind(other.to_string())),
        }
    }
}

/// A single line in the console log. Immutable once created.
///
/// `result` carries the structured value behind an `output` entry so a
/// front end can render it richly; `content` is always the plain-text form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsoleEntry {
    pub id: EntryId,
    pub timestamp: Timestamp,
    pub kind: EntryKind,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<serde_json::Value>,
}

impl ConsoleEntry {
    #[must_use]
    pub fn new(id: EntryId, kind: EntryKind, content: impl Into<String>) -> Self {
        Self {
            id,
            timestamp: Timestamp::now(),
            kind,
            content: content.into(),
            result: None,
        }
    }

    /// Attaches the structured result value.
    #[must_use]
    pub fn with_result(mut self, result: serde_json::Value) -> Self {
        self.result = Some(result);
        self
    }

    pub fn is_error(&self) -> bool {
        self.kind == EntryKind::Error
    }
}
