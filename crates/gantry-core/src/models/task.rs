//! Task and milestone model.

use jiff::civil::Date;
use serde::{Deserialize, Serialize};

use crate::dates;

/// Whether an entry is a durable task or a zero-length milestone.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum TaskKind {
    /// Unit of work spanning `duration` days
    #[default]
    Task,

    /// Single point in time
    Milestone,
}

impl TaskKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskKind::Task => "task",
            TaskKind::Milestone => "milestone",
        }
    }
}

/// A task or milestone inside a section.
///
/// Milestones never carry a duration or an end date; their single instant is
/// `start_date`. An entry with dependencies and no start date is *pending*
/// until all of its dependencies have a known end date.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Globally unique identifier
    pub id: String,

    /// Task or milestone
    #[serde(rename = "type")]
    pub kind: TaskKind,

    /// Human readable label
    pub label: String,

    /// First day of the task, or the milestone's date
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<Date>,

    /// Length in whole days (tasks only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<u32>,

    /// `start_date + duration` (tasks only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<Date>,

    /// Ids this entry starts after
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dependencies: Vec<String>,
}

impl Task {
    /// Creates an undated task.
    pub fn new_task(id: impl Into<String>, label: impl Into<String>, duration: u32) -> Self {
        Self {
            id: id.into(),
            kind: TaskKind::Task,
            label: label.into(),
            start_date: None,
            duration: Some(duration),
            end_date: None,
            dependencies: Vec::new(),
        }
    }

    /// Creates an undated milestone.
    pub fn new_milestone(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind: TaskKind::Milestone,
            label: label.into(),
            start_date: None,
            duration: None,
            end_date: None,
            dependencies: Vec::new(),
        }
    }

    /// Sets the dependency list.
    pub fn after<I, S>(mut self, dependencies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.dependencies = dependencies.into_iter().map(Into::into).collect();
        self
    }

    /// Returns a copy scheduled to start on `start`, or unchanged when the end
    /// date would fall outside the supported range.
    pub fn starting(mut self, start: Date) -> Self {
        if let Some(scheduled) = self.scheduled_at(start) {
            self = scheduled;
        }
        self
    }

    pub fn is_milestone(&self) -> bool {
        self.kind == TaskKind::Milestone
    }

    /// True while the entry waits on dependencies for its date.
    pub fn is_pending(&self) -> bool {
        self.start_date.is_none() && !self.dependencies.is_empty()
    }

    /// The date dependents start on: a task's end date or a milestone's
    /// instant.
    pub fn resolved_end(&self) -> Option<Date> {
        match self.kind {
            TaskKind::Milestone => self.start_date,
            TaskKind::Task => self.end_date.or_else(|| {
                let start = self.start_date?;
                dates::add_days(start, i64::from(self.duration.unwrap_or(0)))
            }),
        }
    }

    /// Returns a copy placed at `start` with its end recomputed from the
    /// duration.
    pub fn scheduled_at(&self, start: Date) -> Option<Task> {
        let mut task = self.clone();
        task.start_date = Some(start);
        match self.kind {
            TaskKind::Milestone => {
                task.duration = None;
                task.end_date = None;
            }
            TaskKind::Task => {
                let duration = self.duration.unwrap_or(0);
                task.duration = Some(duration);
                task.end_date = Some(dates::add_days(start, i64::from(duration))?);
            }
        }
        Some(task)
    }
}
