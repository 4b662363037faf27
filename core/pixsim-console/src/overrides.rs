//! Undo stack for parameter overrides.

use crate::error::ConsoleError;
use crate::live::walk;
use crate::stores::DataStoreRegistry;
use pixsim_types::OverrideRecord;
use serde_json::Value;
use std::collections::VecDeque;
use tracing::{debug, info};

/// What [`OverrideHistory::undo`] did.
#[derive(Debug, Clone, PartialEq)]
pub enum UndoOutcome {
    /// The most recent override was reverted.
    Restored(OverrideRecord),
    NothingToUndo,
}

impl UndoOutcome {
    /// Short console message.
    pub fn message(&self) -> String {
        match self {
            UndoOutcome::Restored(rec) => match &rec.old_value {
                Some(old) => format!("restored {} to {old}", rec.dotted()),
                None => format!("removed {}", rec.dotted()),
            },
            UndoOutcome::NothingToUndo => "nothing to undo".to_string(),
        }
    }
}

/// Bounded stack of override records, newest last.
#[derive(Debug, Clone)]
pub struct OverrideHistory {
    records: VecDeque<OverrideRecord>,
    max_records: usize,
}

impl OverrideHistory {
    pub fn new(max_records: usize) -> Self {
        Self {
            records: VecDeque::new(),
            max_records: max_records.max(1),
        }
    }

    /// Writes `value` at `target_id.path` and records the previous value,
    /// or that there was none.
    ///
    /// The write goes through the store's writer; a store without one is
    /// read-only. Nothing is recorded if the write fails.
    pub fn apply(
        &mut self,
        stores: &DataStoreRegistry,
        target_id: &str,
        path: Vec<String>,
        value: Value,
    ) -> Result<OverrideRecord, ConsoleError> {
        let state = stores
            .get_state(target_id)
            .ok_or_else(|| ConsoleError::UnknownStore(target_id.to_string()))?;
        let old_value = walk(&state, path.iter().map(String::as_str)).cloned();

        stores.write_state(target_id, &path, value.clone())?;

        let record = OverrideRecord::new(target_id, path, old_value, value);
        debug!(target = %record.dotted(), "override applied");
        self.push(record.clone());
        Ok(record)
    }

    /// Appends an externally applied override.
    pub fn push(&mut self, record: OverrideRecord) {
        self.records.push_back(record);
        while self.records.len() > self.max_records {
            self.records.pop_front();
        }
    }

    /// Pops the latest record and re-applies its old value. A key the
    /// override created is removed again.
    ///
    /// If the write fails the record is put back so the undo can be retried.
    pub fn undo(&mut self, stores: &DataStoreRegistry) -> Result<UndoOutcome, ConsoleError> {
        let Some(record) = self.records.pop_back() else {
            return Ok(UndoOutcome::NothingToUndo);
        };

        let reverted = match &record.old_value {
            Some(old) => stores.write_state(&record.target_id, &record.path, old.clone()),
            None => stores.remove_state(&record.target_id, &record.path),
        };
        if let Err(e) = reverted {
            self.records.push_back(record);
            return Err(e);
        }

        info!(target = %record.dotted(), "override undone");
        Ok(UndoOutcome::Restored(record))
    }

    pub fn records(&self) -> impl Iterator<Item = &OverrideRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
