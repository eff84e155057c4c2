//! Display formatting for plans, summaries and structural edits.
//!
//! Domain models implement [`std::fmt::Display`] directly (see [`models`]);
//! collections and alternative renderings get newtype wrappers.
//!
//! ```text
//! ┌─────────────────┐    ┌─────────────────┐    ┌─────────────────┐
//! │  Domain Models  │    │ Display Wrappers│    │   Formatted     │
//! │ (Plan, Task...) │───▶│ (Updates,       │───▶│    Output       │
//! │                 │    │  GanttSource)   │    │ (markdown/text) │
//! └─────────────────┘    └─────────────────┘    └─────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`models`]: markdown Display for [`Plan`](crate::models::Plan),
//!   [`Task`](crate::models::Task) and
//!   [`StreamSummary`](crate::models::StreamSummary)
//! - [`collections`]: [`Updates`] wrapper for date changes
//! - [`source`]: [`GanttSource`], the plan written back as chart text
//!
//! ## Usage
//!
//! ```rust
//! use gantry_core::{
//!     display::GanttSource,
//!     models::{Plan, Section, Task},
//! };
//! use jiff::civil::date;
//!
//! let mut section = Section::new("Build");
//! section.upsert(Task::new_task("t1", "Design", 2).starting(date(2025, 1, 1)));
//! let mut plan = Plan::new();
//! plan.sections.push(section);
//!
//! let markdown = plan.to_string();
//! assert!(markdown.contains("## Build"));
//!
//! let source = GanttSource(&plan).to_string();
//! assert!(source.contains("Design :t1, 2025-01-01, 2d"));
//! ```

pub mod collections;
pub mod models;
pub mod source;

pub use collections::Updates;
pub use source::GanttSource;
