use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::models::schedule::{SchedulePatch, ScheduleRow};

/// Editable list of weekly slots attached to a course request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScheduleEditor {
    rows: Vec<ScheduleRow>,
}

impl ScheduleEditor {
    pub fn seeded() -> Self {
        Self {
            rows: vec![ScheduleRow::default()],
        }
    }

    pub fn from_rows(rows: Vec<ScheduleRow>) -> Self {
        let mut editor = Self { rows };
        editor.rows.iter_mut().for_each(ScheduleRow::recompute);
        editor
    }

    pub fn add(&mut self) -> usize {
        self.rows.push(ScheduleRow::default());
        self.rows.len() - 1
    }

    /// Removes the slot at `index`. Returns `None` for an index that does not exist.
    pub fn remove(&mut self, index: usize) -> Option<ScheduleRow> {
        if index >= self.rows.len() {
            warn!("schedule remove ignored: index {} out of range ({})", index, self.rows.len());
            return None;
        }
        Some(self.rows.remove(index))
    }

    /// Merges `patch` into slot `index` and recomputes its duration.
    /// Out-of-range indices are logged and ignored.
    pub fn patch(&mut self, index: usize, patch: SchedulePatch) -> bool {
        match self.rows.get_mut(index) {
            Some(row) => {
                row.apply(patch);
                true
            }
            None => {
                warn!("schedule patch ignored: index {} out of range ({})", index, self.rows.len());
                false
            }
        }
    }

    /// Puts back a single empty slot if the list has been emptied.
    pub fn ensure_seeded(&mut self) {
        if self.rows.is_empty() {
            self.rows.push(ScheduleRow::default());
        }
    }

    pub fn rows(&self) -> &[ScheduleRow] {
        &self.rows
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ScheduleRow> {
        self.rows.iter()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
