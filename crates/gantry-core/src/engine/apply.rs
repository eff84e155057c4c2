//! Pure application of queued actions to a plan.

use std::collections::VecDeque;

use log::{debug, warn};

use super::resolve::resolve_all;
use crate::models::{
    Action, BufferedAction, EndDates, Plan, Section, Task, TaskDictionary, TaskPayload, Timeline,
};

/// Result of applying one action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Applied {
    pub plan: Plan,
    pub dictionary: TaskDictionary,
    /// Actions to append to the back of the queue
    pub requeue: Vec<BufferedAction>,
}

/// Applies one action, returning a fresh plan and dictionary.
///
/// Never fails. Entry actions for an unknown section are no-ops, an `ADD_*`
/// for an existing id replaces it, and an entry whose dependencies are still
/// unknown is stored undated with a `RESOLVE_DEPENDENCY` retry in
/// [`Applied::requeue`]. A retry that still cannot resolve is returned
/// unchanged; callers bound retries (see [`drain`]).
pub fn apply(
    plan: &Plan,
    action: &BufferedAction,
    dictionary: &TaskDictionary,
    iteration_cap: usize,
) -> Applied {
    let mut next = Applied {
        plan: plan.clone(),
        dictionary: dictionary.clone(),
        requeue: Vec::new(),
    };

    match &action.action {
        Action::AddSection { name } => {
            if next.plan.section(name).is_none() {
                next.plan.sections.push(Section::new(name.clone()));
            }
        }
        Action::AddTask(payload)
        | Action::UpdateTask(payload)
        | Action::AddMilestone(payload)
        | Action::UpdateMilestone(payload) => {
            if next.plan.section(&payload.section).is_none() {
                debug!(
                    "{} for '{}' ignored: no section '{}'",
                    action.action.name(),
                    payload.task.id,
                    payload.section
                );
                return next;
            }
            let task = resolve_entry(&payload.task, &next.dictionary);
            if task.is_pending() {
                next.requeue.push(BufferedAction::new(Action::ResolveDependency(
                    TaskPayload::new(payload.section.clone(), task.clone()),
                )));
            }
            store(&mut next, &payload.section, task);
        }
        Action::UpdateTimeline(timeline) => {
            // Entries dated by the applier itself may lie outside the
            // session's bound; the timeline must still cover them.
            next.plan.timeline = Some(*timeline);
            next.plan.widen_timeline();
        }
        Action::ResolveDependency(payload) => {
            let already_dated = next
                .plan
                .find_task(&payload.task.id)
                .is_some_and(|task| task.start_date.is_some());
            if already_dated || next.plan.section(&payload.section).is_none() {
                return next;
            }
            let task = resolve_entry(&payload.task, &next.dictionary);
            if task.is_pending() {
                next.requeue.push(action.clone());
                return next;
            }
            store(&mut next, &payload.section, task);
        }
        Action::ProcessDependencies => {
            let resolution = resolve_all(&next.plan.sections, iteration_cap);
            next.plan.sections = resolution.sections;
            next.plan.widen_timeline();
            next.dictionary = TaskDictionary::from_plan(&next.plan);
        }
    }
    next
}

/// Dates a pending entry from the dictionary when every dependency is known.
fn resolve_entry(task: &Task, dictionary: &TaskDictionary) -> Task {
    if !task.is_pending() {
        return task.clone();
    }
    dictionary
        .start_after(&task.dependencies)
        .and_then(|start| task.scheduled_at(start))
        .unwrap_or_else(|| task.clone())
}

/// Upserts `task` into `section`, keeping ids unique across the plan, the
/// dictionary in step and the timeline covering every dated entry.
fn store(next: &mut Applied, section: &str, task: Task) {
    for other in next.plan.sections.iter_mut().filter(|s| s.name != section) {
        other.tasks.retain(|existing| existing.id != task.id);
    }
    if let Some(timeline) = Timeline::widened(next.plan.timeline.as_ref(), &task) {
        next.plan.timeline = Some(timeline);
    }
    if let Some(target) = next.plan.section_mut(section) {
        next.dictionary.insert(task.clone());
        target.upsert(task);
    }
}

/// An action waiting in the queue with the number of failed retries so far.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueuedAction {
    pub action: BufferedAction,
    pub attempts: usize,
}

impl From<BufferedAction> for QueuedAction {
    fn from(action: BufferedAction) -> Self {
        Self {
            action,
            attempts: 0,
        }
    }
}

/// Outcome of [`drain`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DrainOutcome {
    pub plan: Plan,
    pub dictionary: TaskDictionary,
    /// Actions applied, retries included
    pub applied: usize,
    /// Retries still waiting for a dependency; feed them to the next drain
    pub parked: Vec<QueuedAction>,
    /// Ids whose retries hit the cap and were dropped
    pub dropped: Vec<String>,
}

/// FIFO queue processor shared by [`drain`] and the async engine.
///
/// A failed retry is parked rather than spun on. Parked retries rejoin the
/// back of the queue when an entry they wait on gets dated, or after a
/// `PROCESS_DEPENDENCIES` sweep. Only those wake-ups count as attempts
/// against `iteration_cap`, so unrelated actions in between cost nothing.
#[derive(Debug, Default)]
pub(crate) struct Drainer {
    queue: VecDeque<QueuedAction>,
    parked: Vec<QueuedAction>,
    iteration_cap: usize,
    pub(crate) applied: usize,
    pub(crate) dropped: Vec<String>,
}

impl Drainer {
    pub(crate) fn new(queue: impl IntoIterator<Item = QueuedAction>, iteration_cap: usize) -> Self {
        Self {
            queue: queue.into_iter().collect(),
            iteration_cap,
            ..Self::default()
        }
    }

    /// Retries parked by an earlier drain; they stay parked until something
    /// they wait on is dated.
    pub(crate) fn with_parked(mut self, parked: Vec<QueuedAction>) -> Self {
        self.parked = parked;
        self
    }

    pub(crate) fn extend(&mut self, actions: impl IntoIterator<Item = QueuedAction>) {
        self.queue.extend(actions);
    }

    /// Applies the next queued action, or returns `None` when only parked
    /// retries remain.
    pub(crate) fn step(&mut self, plan: &Plan, dictionary: &TaskDictionary) -> Option<Applied> {
        let queued = self.queue.pop_front()?;
        let is_retry = matches!(queued.action.action, Action::ResolveDependency(_));
        let applied = apply(plan, &queued.action, dictionary, self.iteration_cap);
        debug!("applied {}", queued.action.action.name());
        self.applied += 1;

        for action in &applied.requeue {
            if is_retry && action == &queued.action {
                let attempts = queued.attempts + 1;
                if attempts >= self.iteration_cap {
                    let id = retry_id(action);
                    warn!("dropping dependency retry for '{id}' after {attempts} attempts");
                    self.dropped.push(id);
                } else {
                    self.parked.push(QueuedAction {
                        action: action.clone(),
                        attempts,
                    });
                }
            } else {
                self.queue.push_back(action.clone().into());
            }
        }
        self.wake(&queued.action.action, &applied.dictionary);
        Some(applied)
    }

    /// Moves the parked retries that `action` may have unblocked to the back
    /// of the queue.
    fn wake(&mut self, action: &Action, dictionary: &TaskDictionary) {
        if self.parked.is_empty() {
            return;
        }
        let (ready, waiting): (Vec<_>, Vec<_>) = std::mem::take(&mut self.parked)
            .into_iter()
            .partition(|retry| unblocks(action, retry, dictionary));
        self.parked = waiting;
        self.queue.extend(ready);
    }

    /// Remaining queue and parked retries, kept apart.
    pub(crate) fn into_parts(self) -> (VecDeque<QueuedAction>, Vec<QueuedAction>) {
        (self.queue, self.parked)
    }

    pub(crate) fn into_parked(mut self) -> Vec<QueuedAction> {
        self.parked.extend(self.queue);
        self.parked
    }
}

/// Whether applying `action` may let the parked `retry` resolve: the sweep
/// wakes everything, an entry action only wakes retries waiting on its id
/// once that id has an end date.
fn unblocks(action: &Action, retry: &QueuedAction, dictionary: &TaskDictionary) -> bool {
    let Action::ResolveDependency(waiting) = &retry.action.action else {
        return true;
    };
    match action {
        Action::ProcessDependencies => true,
        Action::AddTask(payload)
        | Action::UpdateTask(payload)
        | Action::AddMilestone(payload)
        | Action::UpdateMilestone(payload)
        | Action::ResolveDependency(payload) => {
            waiting.task.dependencies.contains(&payload.task.id)
                && dictionary.end_date(&payload.task.id).is_some()
        }
        Action::AddSection { .. } | Action::UpdateTimeline(_) => false,
    }
}

fn retry_id(action: &BufferedAction) -> String {
    match &action.action {
        Action::ResolveDependency(payload) => payload.task.id.clone(),
        other => other.name().to_string(),
    }
}

/// Applies `actions` in FIFO order, including any retries queued on the way.
pub fn drain(
    plan: &Plan,
    dictionary: &TaskDictionary,
    actions: impl IntoIterator<Item = QueuedAction>,
    iteration_cap: usize,
) -> DrainOutcome {
    let mut drainer = Drainer::new(actions, iteration_cap);
    let mut plan = plan.clone();
    let mut dictionary = dictionary.clone();
    while let Some(applied) = drainer.step(&plan, &dictionary) {
        plan = applied.plan;
        dictionary = applied.dictionary;
    }
    let applied = drainer.applied;
    let dropped = std::mem::take(&mut drainer.dropped);
    DrainOutcome {
        plan,
        dictionary,
        applied,
        parked: drainer.into_parked(),
        dropped,
    }
}
