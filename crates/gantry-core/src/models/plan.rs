//! Plan, section and timeline models plus the JSON persistence boundary.

use jiff::civil::Date;
use serde::{Deserialize, Serialize};

use super::{DateUpdate, Task};
use crate::error::Result;

/// The overall date bound of a plan.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Timeline {
    pub start_date: Date,
    pub end_date: Date,
}

impl Timeline {
    /// Returns the bound widened to cover `task`, or `None` when the task is
    /// undated or already inside the current bound.
    pub fn widened(current: Option<&Timeline>, task: &Task) -> Option<Timeline> {
        let start = task.start_date?;
        let end = task.resolved_end().unwrap_or(start).max(start);
        match current {
            None => Some(Timeline {
                start_date: start,
                end_date: end,
            }),
            Some(bound) if start < bound.start_date || end > bound.end_date => Some(Timeline {
                start_date: bound.start_date.min(start),
                end_date: bound.end_date.max(end),
            }),
            Some(_) => None,
        }
    }
}

/// A named group of tasks; names are unique within a plan.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Section {
    pub name: String,
    #[serde(default)]
    pub tasks: Vec<Task>,
}

impl Section {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tasks: Vec::new(),
        }
    }

    /// Replaces the task with the same id, or appends it.
    pub fn upsert(&mut self, task: Task) {
        match self.tasks.iter_mut().find(|existing| existing.id == task.id) {
            Some(existing) => *existing = task,
            None => self.tasks.push(task),
        }
    }
}

/// A complete structured project plan.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Plan {
    #[serde(default)]
    pub sections: Vec<Section>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeline: Option<Timeline>,
}

impl Plan {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn section(&self, name: &str) -> Option<&Section> {
        self.sections.iter().find(|section| section.name == name)
    }

    pub(crate) fn section_mut(&mut self, name: &str) -> Option<&mut Section> {
        self.sections.iter_mut().find(|section| section.name == name)
    }

    /// Iterates every task and milestone in section order.
    pub fn tasks(&self) -> impl Iterator<Item = &Task> {
        self.sections.iter().flat_map(|section| section.tasks.iter())
    }

    pub fn find_task(&self, id: &str) -> Option<&Task> {
        self.tasks().find(|task| task.id == id)
    }

    /// Name of the section holding `id`.
    pub fn section_of(&self, id: &str) -> Option<&str> {
        self.sections
            .iter()
            .find(|section| section.tasks.iter().any(|task| task.id == id))
            .map(|section| section.name.as_str())
    }

    /// Widens the timeline over every dated task. Never shrinks it.
    pub fn widen_timeline(&mut self) {
        let mut timeline = self.timeline;
        for task in self.tasks() {
            if let Some(widened) = Timeline::widened(timeline.as_ref(), task) {
                timeline = Some(widened);
            }
        }
        self.timeline = timeline;
    }

    /// Returns a new plan with `updates` written onto the matching tasks and
    /// the timeline widened over the result.
    pub fn with_updates(&self, updates: &[DateUpdate]) -> Plan {
        let mut plan = self.clone();
        for update in updates {
            let task = plan
                .sections
                .iter_mut()
                .flat_map(|section| section.tasks.iter_mut())
                .find(|task| task.id == update.id);
            if let Some(task) = task {
                update.apply_to(task);
            }
        }
        plan.widen_timeline();
        plan
    }
}

/// Converts a plan to its JSON representation for external storage.
pub fn serialize(plan: &Plan) -> Result<serde_json::Value> {
    Ok(serde_json::to_value(plan)?)
}

/// Rebuilds a plan from its JSON representation.
pub fn deserialize(value: serde_json::Value) -> Result<Plan> {
    Ok(serde_json::from_value(value)?)
}
