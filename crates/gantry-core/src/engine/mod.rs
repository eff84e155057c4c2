//! Plan engine: action application, dependency resolution and structural
//! edits.
//!
//! # Architecture Overview
//!
//! ```text
//! ┌─────────────────┐    ┌─────────────────┐    ┌─────────────────┐
//! │  StreamSession  │    │     Engine      │    │   Propagator    │
//! │ (BufferedAction │───▶│ (apply / drain, │───▶│ (move, resize   │
//! │    emission)    │    │  resolve_all)   │    │   cascades)     │
//! └─────────────────┘    └─────────────────┘    └─────────────────┘
//!      Parsing             Plan mutation         User edits
//! ```
//!
//! ## Submodules
//!
//! - [`apply`]: pure single-action application and synchronous [`drain`]
//! - [`resolve`]: whole-plan fixed-point resolver
//! - [`cascade`]: move and section-resize propagation
//! - [`builder`]: [`EngineBuilder`] and [`EngineConfig`]
//!
//! The functions in these submodules are pure: plan and dictionary in,
//! fresh plan and dictionary out. [`Engine`] is the stateful host wrapper
//! that owns one plan, its dictionary and the FIFO queue.
//!
//! # Usage
//!
//! ```rust
//! use gantry_core::{EngineBuilder, StreamSession};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let engine = EngineBuilder::new().with_iteration_cap(10).build()?;
//! let mut session = StreamSession::new();
//!
//! for fragment in ["```\nsection Bu", "ild\nDesign :t1, 2025-01-01, 2d\n```\n"] {
//!     engine.enqueue(session.consume(fragment).actions);
//!     engine.drain().await?;
//! }
//! engine.enqueue(session.finish().actions);
//! engine.drain().await?;
//!
//! assert_eq!(engine.plan().tasks().count(), 1);
//! # Ok(())
//! # }
//! ```

use std::{
    collections::VecDeque,
    sync::{
        atomic::{AtomicBool, Ordering},
        Mutex, MutexGuard, PoisonError,
    },
};

use log::info;

pub mod apply;
pub mod builder;
pub mod cascade;
pub mod resolve;

#[cfg(test)]
mod tests;

pub use apply::{apply, drain, Applied, DrainOutcome, QueuedAction};
pub use builder::{EngineBuilder, EngineConfig, DEFAULT_ITERATION_CAP};
pub use cascade::{updates_to_actions, Propagator};
pub use resolve::{resolve_all, Resolution, Unresolved, UnresolvedReason};

use apply::Drainer;

use crate::{
    error::{GanttError, Result},
    models::{BufferedAction, DateUpdate, Plan, TaskDictionary},
};

/// Summary of one drain.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DrainReport {
    /// Actions applied, retries included
    pub applied: usize,
    /// Retries left waiting for a dependency
    pub parked: usize,
    /// Ids whose retries hit the iteration cap
    pub dropped: Vec<String>,
}

#[derive(Debug, Default)]
struct EngineState {
    plan: Plan,
    dictionary: TaskDictionary,
    queue: VecDeque<QueuedAction>,
    /// Retries waiting for progress from a later action
    parked: Vec<QueuedAction>,
}

/// Owns a plan, its dictionary and the action queue.
///
/// Only one drain may run at a time; a concurrent [`Engine::drain`] (or
/// [`Engine::apply_all`]) fails with [`GanttError::DrainInProgress`]
/// instead of interleaving with the running one.
#[derive(Debug)]
pub struct Engine {
    config: EngineConfig,
    state: Mutex<EngineState>,
    draining: AtomicBool,
}

/// Clears the draining flag when dropped.
struct DrainGuard<'a>(&'a AtomicBool);

impl Drop for DrainGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl Engine {
    pub(crate) fn new(config: EngineConfig, plan: Plan) -> Self {
        let dictionary = TaskDictionary::from_plan(&plan);
        Self {
            config,
            state: Mutex::new(EngineState {
                plan,
                dictionary,
                queue: VecDeque::new(),
                parked: Vec::new(),
            }),
            draining: AtomicBool::new(false),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Snapshot of the current plan.
    pub fn plan(&self) -> Plan {
        self.state().plan.clone()
    }

    /// Snapshot of the current dictionary.
    pub fn dictionary(&self) -> TaskDictionary {
        self.state().dictionary.clone()
    }

    /// Number of queued actions, parked retries included.
    pub fn queued(&self) -> usize {
        let state = self.state();
        state.queue.len() + state.parked.len()
    }

    /// Appends actions to the back of the queue.
    pub fn enqueue(&self, actions: impl IntoIterator<Item = BufferedAction>) {
        self.state()
            .queue
            .extend(actions.into_iter().map(QueuedAction::from));
    }

    /// Queues date updates from a structural edit as update actions.
    pub fn enqueue_updates(&self, updates: &[DateUpdate]) {
        let mut state = self.state();
        let actions = updates_to_actions(&state.plan, updates);
        state
            .queue
            .extend(actions.into_iter().map(QueuedAction::from));
    }

    /// Applies only the front action. Returns false when nothing but parked
    /// retries is left.
    pub fn apply_next(&self) -> Result<bool> {
        let _guard = self.begin_drain()?;
        let mut state = self.state();
        let Some(queued) = state.queue.pop_front() else {
            return Ok(false);
        };
        let parked = std::mem::take(&mut state.parked);
        let mut drainer = Drainer::new([queued], self.config.iteration_cap).with_parked(parked);
        if let Some(applied) = drainer.step(&state.plan, &state.dictionary) {
            state.plan = applied.plan;
            state.dictionary = applied.dictionary;
        }
        let (queue, parked) = drainer.into_parts();
        state.queue.extend(queue);
        state.parked = parked;
        Ok(true)
    }

    /// Drains the queue synchronously.
    pub fn apply_all(&self) -> Result<DrainReport> {
        let _guard = self.begin_drain()?;
        let mut state = self.state();
        let mut drainer = Drainer::new(std::mem::take(&mut state.queue), self.config.iteration_cap)
            .with_parked(std::mem::take(&mut state.parked));
        while let Some(applied) = drainer.step(&state.plan, &state.dictionary) {
            state.plan = applied.plan;
            state.dictionary = applied.dictionary;
        }
        let applied = drainer.applied;
        let dropped = std::mem::take(&mut drainer.dropped);
        state.parked = drainer.into_parked();
        Ok(DrainReport {
            applied,
            parked: state.parked.len(),
            dropped,
        })
    }

    /// Drains the queue in FIFO order, yielding to the runtime between
    /// actions when configured. Actions enqueued while draining are picked
    /// up by the same drain.
    pub async fn drain(&self) -> Result<DrainReport> {
        let _guard = self.begin_drain()?;
        let parked = std::mem::take(&mut self.state().parked);
        let mut drainer = Drainer::new(Vec::new(), self.config.iteration_cap).with_parked(parked);

        loop {
            let progressed = {
                let mut state = self.state();
                let incoming = std::mem::take(&mut state.queue);
                drainer.extend(incoming);
                match drainer.step(&state.plan, &state.dictionary) {
                    Some(applied) => {
                        state.plan = applied.plan;
                        state.dictionary = applied.dictionary;
                        true
                    }
                    None => false,
                }
            };
            if !progressed {
                break;
            }
            if self.config.yield_between_actions {
                tokio::task::yield_now().await;
            }
        }

        let applied = drainer.applied;
        let dropped = std::mem::take(&mut drainer.dropped);
        let parked = drainer.into_parked();
        let report = DrainReport {
            applied,
            parked: parked.len(),
            dropped,
        };
        self.state().parked.extend(parked);
        Ok(report)
    }

    /// Discards the plan, dictionary and queue.
    pub fn reset(&self) {
        info!("resetting engine state");
        *self.state() = EngineState::default();
    }

    fn begin_drain(&self) -> Result<DrainGuard<'_>> {
        self.draining
            .compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
            .map_err(|_| GanttError::DrainInProgress)?;
        Ok(DrainGuard(&self.draining))
    }

    fn state(&self) -> MutexGuard<'_, EngineState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
