//! Parameter structures for structural edits.
//!
//! These carry no framework derives beyond serde so any host (the CLI, a
//! UI layer) can wrap them with its own argument parsing and convert via
//! `.into()`. [`MoveTask::updates`] and [`ResizeSection::updates`] validate
//! against the plan and run the matching [`Propagator`] cascade.
//!
//! ```rust
//! use gantry_core::{
//!     models::{Plan, Section, Task},
//!     params::MoveTask,
//! };
//! use jiff::civil::date;
//!
//! let mut section = Section::new("Build");
//! section.upsert(Task::new_task("t1", "Design", 2).starting(date(2025, 1, 1)));
//! let mut plan = Plan::new();
//! plan.sections.push(section);
//!
//! let params = MoveTask {
//!     task_id: "t1".to_string(),
//!     new_start: date(2025, 1, 6),
//! };
//! let updates = params.updates(&plan).unwrap();
//! assert_eq!(updates[0].start_date, date(2025, 1, 6));
//! ```

use jiff::civil::Date;
use serde::{Deserialize, Serialize};

use crate::{
    engine::Propagator,
    error::{GanttError, Result},
    models::{DateUpdate, Plan},
};

/// Move one task or milestone to a new start date.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MoveTask {
    /// Id of the entry to move
    pub task_id: String,
    /// New start date
    pub new_start: Date,
}

impl MoveTask {
    /// Runs the move cascade. Fails when the id is unknown or still waiting
    /// on a dependency.
    pub fn updates(&self, plan: &Plan) -> Result<Vec<DateUpdate>> {
        let task = plan
            .find_task(&self.task_id)
            .ok_or_else(|| GanttError::TaskNotFound {
                id: self.task_id.clone(),
            })?;
        if task.start_date.is_none() {
            return Err(GanttError::invalid_input("task_id")
                .with_reason(format!("'{}' has no date yet", self.task_id)));
        }
        Ok(Propagator::new(plan).on_task_moved(&self.task_id, self.new_start))
    }
}

/// Rescale every entry of a section by a ratio.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ResizeSection {
    /// Section name
    pub section: String,
    /// Scale factor, e.g. `2.0` doubles the section's span
    pub ratio: f64,
    /// Date the rescaled section starts on; defaults to its earliest start
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub anchor: Option<Date>,
}

impl ResizeSection {
    /// Checks the ratio is a positive, finite number.
    pub fn validate(&self) -> Result<()> {
        if !self.ratio.is_finite() || self.ratio <= 0.0 {
            return Err(GanttError::invalid_input("ratio")
                .with_reason(format!("must be a positive number, got {}", self.ratio)));
        }
        Ok(())
    }

    /// Runs the section rescale cascade.
    pub fn updates(&self, plan: &Plan) -> Result<Vec<DateUpdate>> {
        self.validate()?;
        if plan.section(&self.section).is_none() {
            return Err(GanttError::SectionNotFound {
                name: self.section.clone(),
            });
        }
        Ok(Propagator::new(plan).resize_section(&self.section, self.ratio, self.anchor))
    }
}
