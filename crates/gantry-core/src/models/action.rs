//! Queued plan mutations emitted by the stream session.

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use super::{Task, Timeline};

/// A task or milestone together with the section it belongs to.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TaskPayload {
    pub section: String,
    pub task: Task,
}

impl TaskPayload {
    pub fn new(section: impl Into<String>, task: Task) -> Self {
        Self {
            section: section.into(),
            task,
        }
    }
}

/// One atomic mutation of a plan, tagged by kind.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", content = "payload", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Action {
    /// Create a section unless one with the same name exists
    AddSection { name: String },
    AddTask(TaskPayload),
    UpdateTask(TaskPayload),
    AddMilestone(TaskPayload),
    UpdateMilestone(TaskPayload),
    /// Replace the timeline wholesale
    UpdateTimeline(Timeline),
    /// Retry marker for an entry whose dependencies were unknown
    ResolveDependency(TaskPayload),
    /// Run the whole-plan dependency sweep
    ProcessDependencies,
}

impl Action {
    /// Builds the add action matching the task's kind.
    pub fn add(payload: TaskPayload) -> Self {
        if payload.task.is_milestone() {
            Action::AddMilestone(payload)
        } else {
            Action::AddTask(payload)
        }
    }

    /// Builds the update action matching the task's kind.
    pub fn update(payload: TaskPayload) -> Self {
        if payload.task.is_milestone() {
            Action::UpdateMilestone(payload)
        } else {
            Action::UpdateTask(payload)
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Action::AddSection { .. } => "ADD_SECTION",
            Action::AddTask(_) => "ADD_TASK",
            Action::UpdateTask(_) => "UPDATE_TASK",
            Action::AddMilestone(_) => "ADD_MILESTONE",
            Action::UpdateMilestone(_) => "UPDATE_MILESTONE",
            Action::UpdateTimeline(_) => "UPDATE_TIMELINE",
            Action::ResolveDependency(_) => "RESOLVE_DEPENDENCY",
            Action::ProcessDependencies => "PROCESS_DEPENDENCIES",
        }
    }
}

/// An [`Action`] stamped with the time it was emitted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BufferedAction {
    pub action: Action,
    pub timestamp: Timestamp,
}

impl BufferedAction {
    pub fn new(action: Action) -> Self {
        Self {
            action,
            timestamp: Timestamp::now(),
        }
    }
}

impl From<Action> for BufferedAction {
    fn from(action: Action) -> Self {
        Self::new(action)
    }
}
