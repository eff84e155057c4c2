//! Core library for the Gantry incremental Gantt planner.
//!
//! Gantt chart text arrives in arbitrary fragments (typically streamed from
//! a text generator). This crate turns those fragments into a structured,
//! dependency-consistent [`Plan`] and keeps it consistent under structural
//! edits.
//!
//! # Pipeline
//!
//! ```text
//! fragments ─▶ StreamSession ─▶ BufferedAction queue ─▶ Engine ─▶ Plan
//!                                                         ▲
//!                          Propagator (move / resize) ────┘
//! ```
//!
//! - [`parser`]: line reconstruction and the single-line grammar
//! - [`stream`]: the per-session state machine emitting actions
//! - [`engine`]: action application, the fixed-point resolver, cascades
//! - [`models`]: plan, task, action and dictionary types
//! - [`display`]: markdown formatting and chart text regeneration
//! - [`params`]: validated parameters for structural edits
//!
//! # Quick Start
//!
//! ```rust
//! use gantry_core::{EngineBuilder, StreamSession};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let engine = EngineBuilder::new().build()?;
//! let mut session = StreamSession::new();
//!
//! let text = "```mermaid\ngantt\nsection Build\n\
//!             Design :t1, 2025-01-01, 2d\nCode :t2, after t1, 3d\n```\n";
//! engine.enqueue(session.consume(text).actions);
//! engine.enqueue(session.finish().actions);
//! engine.drain().await?;
//!
//! let plan = engine.plan();
//! println!("{plan}");
//! # Ok(())
//! # }
//! ```

pub mod dates;
pub mod display;
pub mod engine;
pub mod error;
pub mod models;
pub mod params;
pub mod parser;
pub mod stream;

// Re-export commonly used types
pub use display::{GanttSource, Updates};
pub use engine::{
    DrainReport, Engine, EngineBuilder, EngineConfig, Propagator, DEFAULT_ITERATION_CAP,
};
pub use error::{GanttError, Result};
pub use models::{
    Action, BufferedAction, DateUpdate, Plan, Section, StreamSummary, Task, TaskDictionary,
    TaskKind, Timeline,
};
pub use params::{MoveTask, ResizeSection};
pub use stream::{ChunkOutput, StreamSession};
