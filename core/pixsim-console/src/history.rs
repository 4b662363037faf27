//! Console log and command recall.
//!
//! Two lists are kept. The entry log holds every input, output, error and
//! info line, capped FIFO. The recall list holds distinct commands for
//! up/down navigation: re-running a command moves it to the newest slot.

use pixsim_types::{ConsoleEntry, EntryId, EntryIdGenerator, EntryKind};
use serde_json::Value;
use std::collections::VecDeque;
use std::fmt::Display;

use crate::config::ConsoleConfig;

#[derive(Debug, Clone)]
pub struct CommandLog {
    entries: VecDeque<ConsoleEntry>,
    ids: EntryIdGenerator,
    max_history: usize,
    commands: Vec<String>,
    max_commands: usize,
    /// Index into `commands`; `None` means no selection.
    cursor: Option<usize>,
    pretty: bool,
}

impl Default for CommandLog {
    fn default() -> Self {
        Self::new(&ConsoleConfig::default())
    }
}

impl CommandLog {
    pub fn new(config: &ConsoleConfig) -> Self {
        Self {
            entries: VecDeque::new(),
            ids: EntryIdGenerator::new(),
            max_history: config.max_history.max(1),
            commands: Vec::new(),
            max_commands: config.max_command_history.max(1),
            cursor: None,
            pretty: config.serialize_pretty,
        }
    }

    /// A log with the given entry cap and default everything else.
    pub fn with_max_history(max_history: usize) -> Self {
        Self::new(&ConsoleConfig {
            max_history,
            ..ConsoleConfig::default()
        })
    }

    // ================================================================
    // Entry log
    // ================================================================

    /// Appends an entry with a fresh id and timestamp, evicting the oldest
    /// entries beyond the cap.
    pub fn add_entry(&mut self, kind: EntryKind, content: impl Into<String>, result: Option<Value>) -> EntryId {
        let id = self.ids.next_id();
        let mut entry = ConsoleEntry::new(id, kind, content);
        entry.result = result;
        self.entries.push_back(entry);
        while self.entries.len() > self.max_history {
            self.entries.pop_front();
        }
        id
    }

    pub fn info(&mut self, message: impl Into<String>) -> EntryId {
        self.add_entry(EntryKind::Info, message, None)
    }

    /// Records `command` as input and adds it to the recall list.
    /// Blank commands are ignored and return `None`.
    pub fn record_input(&mut self, command: &str) -> Option<EntryId> {
        let command = command.trim();
        if command.is_empty() {
            return None;
        }
        let id = self.add_entry(EntryKind::Input, command, None);
        self.push_command(command);
        self.reset_history_nav();
        Some(id)
    }

    /// Records the outcome of a command as an `output` or `error` entry.
    pub fn record_result<E: Display>(&mut self, result: Result<Value, E>) -> &ConsoleEntry {
        match result {
            Ok(value) => {
                let text = render(&value, self.pretty);
                self.add_entry(EntryKind::Output, text, Some(value));
            }
            Err(e) => {
                self.add_entry(EntryKind::Error, e.to_string(), None);
            }
        }
        &self.entries[self.entries.len() - 1]
    }

    /// Runs `command` through `evaluator`, logging input and outcome.
    ///
    /// Evaluation errors are logged, not returned, so a session survives a
    /// bad command. Returns the outcome entry, or `None` for blank input.
    pub fn execute<F, E>(&mut self, command: &str, evaluator: F) -> Option<ConsoleEntry>
    where
        F: FnOnce(&str) -> Result<Value, E>,
        E: Display,
    {
        self.record_input(command)?;
        let result = evaluator(command.trim());
        Some(self.record_result(result).clone())
    }

    /// Entries, oldest first.
    pub fn entries(&self) -> impl Iterator<Item = &ConsoleEntry> {
        self.entries.iter()
    }

    pub fn last_entry(&self) -> Option<&ConsoleEntry> {
        self.entries.back()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Empties the entry log. The recall list is kept.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    // ================================================================
    // Command recall
    // ================================================================

    fn push_command(&mut self, command: &str) {
        self.commands.retain(|c| c != command);
        self.commands.push(command.to_string());
        if self.commands.len() > self.max_commands {
            let excess = self.commands.len() - self.max_commands;
            self.commands.drain(..excess);
        }
    }

    /// Distinct commands, oldest first.
    pub fn command_history(&self) -> &[String] {
        &self.commands
    }

    /// Moves toward older commands, stopping at the oldest.
    /// `None` only when there is no history at all.
    pub fn history_up(&mut self) -> Option<&str> {
        if self.commands.is_empty() {
            return None;
        }
        let next = match self.cursor {
            None => self.commands.len() - 1,
            Some(i) => i.saturating_sub(1),
        };
        self.cursor = Some(next);
        Some(&self.commands[next])
    }

    /// Moves toward newer commands. Past the newest the selection is cleared
    /// and an empty string is returned, meaning "clear the input".
    pub fn history_down(&mut self) -> &str {
        match self.cursor {
            Some(i) if i + 1 < self.commands.len() => {
                self.cursor = Some(i + 1);
                &self.commands[i + 1]
            }
            _ => {
                self.cursor = None;
                ""
            }
        }
    }

    pub fn reset_history_nav(&mut self) {
        self.cursor = None;
    }

    pub fn history_cursor(&self) -> Option<usize> {
        self.cursor
    }
}

/// Plain-text form of a result: strings verbatim, objects and arrays as
/// JSON, everything else via its JSON literal.
pub fn render(value: &Value, pretty: bool) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Object(_) | Value::Array(_) if pretty => {
            serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
        }
        other => other.to_string(),
    }
}
