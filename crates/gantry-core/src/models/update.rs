//! Date window changes produced by structural edits.

use jiff::civil::Date;
use serde::{Deserialize, Serialize};

use super::Task;

/// New date window for one task or milestone.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DateUpdate {
    pub id: String,
    pub start_date: Date,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<Date>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<u32>,
}

impl DateUpdate {
    /// Captures the current window of a dated task.
    pub fn from_task(task: &Task) -> Option<Self> {
        Some(Self {
            id: task.id.clone(),
            start_date: task.start_date?,
            end_date: task.end_date,
            duration: task.duration,
        })
    }

    /// Writes this window onto `task`.
    pub fn apply_to(&self, task: &mut Task) {
        task.start_date = Some(self.start_date);
        if !task.is_milestone() {
            task.end_date = self.end_date;
            task.duration = self.duration.or(task.duration);
        }
    }
}
