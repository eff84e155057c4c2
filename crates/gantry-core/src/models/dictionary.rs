//! Flat id index over a plan's tasks.

use std::collections::HashMap;

use jiff::civil::Date;
use serde::{Deserialize, Serialize};

use super::{Plan, Task};

/// Lookup of resolved end dates by task or milestone id.
pub trait EndDates {
    fn end_date(&self, id: &str) -> Option<Date>;

    /// Latest end date across `dependencies`, or `None` if the list is empty
    /// or any id is still unknown.
    fn start_after(&self, dependencies: &[String]) -> Option<Date> {
        let mut latest: Option<Date> = None;
        for id in dependencies {
            let end = self.end_date(id)?;
            latest = Some(latest.map_or(end, |current| current.max(end)));
        }
        latest
    }
}

impl EndDates for HashMap<String, Date> {
    fn end_date(&self, id: &str) -> Option<Date> {
        self.get(id).copied()
    }
}

/// Id-keyed mirror of every task in a [`Plan`].
///
/// This is a derived cache kept in lock-step with the plan for O(1)
/// dependency lookups; the plan stays the source of truth.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct TaskDictionary(HashMap<String, Task>);

impl TaskDictionary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds the index from a plan.
    pub fn from_plan(plan: &Plan) -> Self {
        Self(
            plan.tasks()
                .map(|task| (task.id.clone(), task.clone()))
                .collect(),
        )
    }

    pub fn get(&self, id: &str) -> Option<&Task> {
        self.0.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.0.contains_key(id)
    }

    pub fn insert(&mut self, task: Task) {
        self.0.insert(task.id.clone(), task);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Task> {
        self.0.values()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }
}

impl EndDates for TaskDictionary {
    fn end_date(&self, id: &str) -> Option<Date> {
        self.0.get(id).and_then(Task::resolved_end)
    }
}
