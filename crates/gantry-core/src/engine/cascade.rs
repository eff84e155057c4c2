//! Structural edit propagation: task moves and section rescaling.
//!
//! Both edits restore the same invariant: for every dependency edge
//! `parent -> child`, `child.start >= parent.end`. Cascades only move a
//! dependent as far as needed to satisfy it; entries that already satisfy it
//! stop the walk.

use std::collections::{HashMap, HashSet};

use jiff::civil::Date;

use crate::{
    dates,
    models::{Action, BufferedAction, DateUpdate, Plan, Task, TaskPayload},
};

/// Dated window of one entry during a cascade.
#[derive(Debug, Clone, Copy)]
struct Window {
    start: Date,
    end: Date,
    duration: Option<u32>,
    milestone: bool,
}

impl Window {
    fn of(task: &Task) -> Option<Self> {
        let start = task.start_date?;
        Some(Self {
            start,
            end: task.resolved_end().unwrap_or(start),
            duration: task.duration,
            milestone: task.is_milestone(),
        })
    }

    /// Same length, starting on `start`.
    fn starting(self, start: Date) -> Option<Self> {
        let end = if self.milestone {
            start
        } else {
            dates::add_days(start, i64::from(self.duration.unwrap_or(0)))?
        };
        Some(Self { start, end, ..self })
    }

    /// Same length, ending on `end`.
    fn ending(self, end: Date) -> Option<Self> {
        if self.milestone {
            return Some(Self {
                start: end,
                end,
                ..self
            });
        }
        let start = dates::add_days(end, -i64::from(self.duration.unwrap_or(0)))?;
        Some(Self { start, end, ..self })
    }
}

/// Working copy of the plan's dates plus the updates recorded so far.
struct Schedule {
    windows: HashMap<String, Window>,
    dependencies: HashMap<String, Vec<String>>,
    dependents: HashMap<String, Vec<String>>,
    updates: Vec<DateUpdate>,
}

impl Schedule {
    fn new(plan: &Plan) -> Self {
        let mut windows = HashMap::new();
        let mut dependencies = HashMap::new();
        let mut dependents: HashMap<String, Vec<String>> = HashMap::new();
        for task in plan.tasks() {
            if let Some(window) = Window::of(task) {
                windows.insert(task.id.clone(), window);
            }
            for parent in &task.dependencies {
                dependents
                    .entry(parent.clone())
                    .or_default()
                    .push(task.id.clone());
            }
            dependencies.insert(task.id.clone(), task.dependencies.clone());
        }
        Self {
            windows,
            dependencies,
            dependents,
            updates: Vec::new(),
        }
    }

    fn set(&mut self, id: &str, window: Window) {
        self.windows.insert(id.to_string(), window);
        let update = DateUpdate {
            id: id.to_string(),
            start_date: window.start,
            end_date: (!window.milestone).then_some(window.end),
            duration: if window.milestone {
                None
            } else {
                window.duration
            },
        };
        match self.updates.iter_mut().find(|existing| existing.id == id) {
            Some(existing) => *existing = update,
            None => self.updates.push(update),
        }
    }

    /// Earliest start allowed for `id` by its dated dependencies.
    fn earliest_start(&self, id: &str) -> Option<Date> {
        self.dependencies
            .get(id)?
            .iter()
            .filter_map(|parent| self.windows.get(parent).map(|w| w.end))
            .max()
    }

    /// Pushes every transitive dependent of `parent` to start no earlier
    /// than its dependencies' ends.
    fn push_forward(&mut self, parent: &str, path: &mut HashSet<String>) {
        let children = self.dependents.get(parent).cloned().unwrap_or_default();
        path.insert(parent.to_string());
        for child in children {
            if path.contains(&child) {
                continue;
            }
            let (Some(window), Some(required)) =
                (self.windows.get(&child).copied(), self.earliest_start(&child))
            else {
                continue;
            };
            if window.start >= required {
                continue;
            }
            if let Some(moved) = window.starting(required) {
                self.set(&child, moved);
                self.push_forward(&child, path);
            }
        }
        path.remove(parent);
    }

    /// Pulls every transitive dependency of `child` back so it ends no later
    /// than the child starts.
    fn pull_backward(&mut self, child: &str, path: &mut HashSet<String>) {
        let Some(child_start) = self.windows.get(child).map(|w| w.start) else {
            return;
        };
        let parents = self.dependencies.get(child).cloned().unwrap_or_default();
        path.insert(child.to_string());
        for parent in parents {
            if path.contains(&parent) {
                continue;
            }
            let Some(window) = self.windows.get(&parent).copied() else {
                continue;
            };
            if window.end <= child_start {
                continue;
            }
            if let Some(moved) = window.ending(child_start) {
                self.set(&parent, moved);
                self.pull_backward(&parent, path);
            }
        }
        path.remove(child);
    }
}

/// Computes date updates for structural edits against a plan snapshot.
///
/// The plan is never mutated; apply the returned updates with
/// [`Plan::with_updates`] or queue them via [`updates_to_actions`].
pub struct Propagator<'a> {
    plan: &'a Plan,
}

impl<'a> Propagator<'a> {
    pub fn new(plan: &'a Plan) -> Self {
        Self { plan }
    }

    /// Moves `task_id` to start on `new_start` and cascades.
    ///
    /// Moving later pushes dependents forward; moving earlier pulls
    /// dependencies back. Unknown or undated ids produce no updates.
    pub fn on_task_moved(&self, task_id: &str, new_start: Date) -> Vec<DateUpdate> {
        let mut schedule = Schedule::new(self.plan);
        let Some(window) = schedule.windows.get(task_id).copied() else {
            return Vec::new();
        };
        let Some(moved) = window.starting(new_start) else {
            return Vec::new();
        };
        schedule.set(task_id, moved);

        let mut path = HashSet::new();
        if new_start > window.start {
            schedule.push_forward(task_id, &mut path);
        } else if new_start < window.start {
            schedule.pull_backward(task_id, &mut path);
        }
        schedule.updates
    }

    /// Rescales `tasks` (normally one section) by `ratio` around `anchor`,
    /// then pushes any dependents forward.
    ///
    /// The scaled span is rounded to whole days and never shorter than one
    /// day per task; every task keeps at least one day, milestones keep zero.
    /// An invalid ratio, no dated tasks or a zero-day span yield no updates.
    pub fn calculate_section_resize(
        &self,
        tasks: &[Task],
        ratio: f64,
        anchor: Date,
    ) -> Vec<DateUpdate> {
        if !ratio.is_finite() || ratio <= 0.0 {
            return Vec::new();
        }
        let windows: Vec<(&str, Window)> = tasks
            .iter()
            .filter_map(|task| Some((task.id.as_str(), Window::of(task)?)))
            .collect();
        let (Some(min_start), Some(max_end)) = (
            windows.iter().map(|(_, w)| w.start).min(),
            windows.iter().map(|(_, w)| w.end).max(),
        ) else {
            return Vec::new();
        };
        let Some(original_days) =
            dates::days_between(min_start, max_end).filter(|days| *days > 0)
        else {
            return Vec::new();
        };

        let scaled_days = (ratio * original_days as f64).round() as i64;
        let new_days = scaled_days.max(windows.len() as i64);
        let new_ratio = new_days as f64 / original_days as f64;

        let mut schedule = Schedule::new(self.plan);
        for (id, window) in &windows {
            let Some(offset) = dates::days_between(min_start, window.start) else {
                continue;
            };
            let new_offset = (offset as f64 * new_ratio).round() as i64;
            let Some(start) = dates::add_days(anchor, new_offset) else {
                continue;
            };
            let resized = if window.milestone {
                *window
            } else {
                let duration = f64::from(window.duration.unwrap_or(0)) * new_ratio;
                let duration = (duration.round() as u32).clamp(1, dates::MAX_DURATION_DAYS);
                Window {
                    duration: Some(duration),
                    ..*window
                }
            };
            if let Some(moved) = resized.starting(start) {
                schedule.set(id, moved);
            }
        }

        let mut path = HashSet::new();
        for (id, _) in &windows {
            schedule.push_forward(id, &mut path);
        }
        schedule.updates
    }

    /// Rescales the named section. The anchor defaults to the section's
    /// earliest start.
    pub fn resize_section(&self, name: &str, ratio: f64, anchor: Option<Date>) -> Vec<DateUpdate> {
        let Some(section) = self.plan.section(name) else {
            return Vec::new();
        };
        let anchor = anchor.or_else(|| section.tasks.iter().filter_map(|t| t.start_date).min());
        match anchor {
            Some(anchor) => self.calculate_section_resize(&section.tasks, ratio, anchor),
            None => Vec::new(),
        }
    }
}

/// Turns updates into `UPDATE_TASK` / `UPDATE_MILESTONE` actions so they can
/// flow through the action queue. Updates for unknown ids are dropped.
pub fn updates_to_actions(plan: &Plan, updates: &[DateUpdate]) -> Vec<BufferedAction> {
    updates
        .iter()
        .filter_map(|update| {
            let section = plan.section_of(&update.id)?;
            let mut task = plan.find_task(&update.id)?.clone();
            update.apply_to(&mut task);
            Some(BufferedAction::new(Action::update(TaskPayload::new(
                section, task,
            ))))
        })
        .collect()
}
