//! Data models for plans, tasks and queued actions.
//!
//! Display implementations for these models live in [`crate::display`] so
//! that data structures stay separate from presentation.
//!
//! # Overview
//!
//! - [`Plan`] holds named [`Section`]s of [`Task`]s plus an optional
//!   [`Timeline`] bound. It is the source of truth.
//! - [`TaskDictionary`] is a flat id index mirroring the plan for dependency
//!   lookups.
//! - [`BufferedAction`] wraps one [`Action`], the unit of change the stream
//!   session emits and the applier consumes.
//! - [`DateUpdate`] is a new date window produced by a structural edit.
//!
//! # Examples
//!
//! ```rust
//! use gantry_core::models::{Plan, Section, Task};
//! use jiff::civil::date;
//!
//! let mut section = Section::new("Build");
//! section.upsert(Task::new_task("t1", "Design", 2).starting(date(2025, 1, 1)));
//!
//! let mut plan = Plan::new();
//! plan.sections.push(section);
//! plan.widen_timeline();
//!
//! let timeline = plan.timeline.unwrap();
//! assert_eq!(timeline.end_date, date(2025, 1, 3));
//! ```

pub mod action;
pub mod dictionary;
pub mod plan;
pub mod summary;
pub mod task;
pub mod update;


pub use action::{Action, BufferedAction, TaskPayload};
pub use dictionary::{EndDates, TaskDictionary};
pub use plan::{deserialize, serialize, Plan, Section, Timeline};
pub use summary::StreamSummary;
pub use task::{Task, TaskKind};
pub use update::DateUpdate;
