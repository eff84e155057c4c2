//! Builder for creating and configuring Engine instances.

use super::Engine;
use crate::{
    error::{GanttError, Result},
    models::Plan,
};

/// Default bound shared by dependency retries and the fixed-point sweep.
pub const DEFAULT_ITERATION_CAP: usize = 10;

/// Engine settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineConfig {
    /// Maximum retries for one unresolved dependency, and maximum passes of
    /// the whole-plan resolver
    pub iteration_cap: usize,

    /// Yield to the async runtime between actions while draining
    pub yield_between_actions: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            iteration_cap: DEFAULT_ITERATION_CAP,
            yield_between_actions: true,
        }
    }
}

/// Builder for creating and configuring Engine instances.
#[derive(Debug, Clone, Default)]
pub struct EngineBuilder {
    config: EngineConfig,
    plan: Option<Plan>,
}

impl EngineBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the iteration cap used by retries and the dependency sweep.
    pub fn with_iteration_cap(mut self, cap: usize) -> Self {
        self.config.iteration_cap = cap;
        self
    }

    /// Controls whether `drain` yields between actions.
    pub fn with_yield(mut self, yield_between_actions: bool) -> Self {
        self.config.yield_between_actions = yield_between_actions;
        self
    }

    /// Starts from an existing plan instead of an empty one.
    pub fn with_plan(mut self, plan: Option<Plan>) -> Self {
        self.plan = plan;
        self
    }

    /// Builds the configured engine.
    ///
    /// # Errors
    ///
    /// Returns `GanttError::InvalidInput` if the iteration cap is zero.
    pub fn build(self) -> Result<Engine> {
        if self.config.iteration_cap == 0 {
            return Err(GanttError::invalid_input("iteration_cap")
                .with_reason("must be at least 1"));
        }
        Ok(Engine::new(self.config, self.plan.unwrap_or_default()))
    }
}
