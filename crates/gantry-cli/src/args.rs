use std::path::PathBuf;

use clap::{Args as ClapArgs, Parser, Subcommand};
use gantry_core::{params::*, DEFAULT_ITERATION_CAP};
use jiff::civil::Date;

/// Stream Gantt chart text into a structured, editable project plan
///
/// Gantry reads Mermaid-style Gantt chart text, resolves task dependencies
/// into concrete dates and keeps them consistent when tasks are moved or
/// sections are rescaled. The resulting plan is stored as JSON.
#[derive(Parser)]
#[command(version, about, name = "gantry")]
pub struct Args {
    /// Path to the plan JSON file. Defaults to
    /// $XDG_DATA_HOME/gantry/plan.json
    #[arg(long, global = true)]
    pub plan_file: Option<PathBuf>,

    /// Maximum resolver passes and dependency retries per entry
    #[arg(long, global = true, default_value_t = DEFAULT_ITERATION_CAP)]
    pub iteration_cap: usize,

    /// Disable colored output and use plain text
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands; without one, the saved plan is shown.
#[derive(Subcommand)]
pub enum Commands {
    /// Parse chart text into a new plan and save it
    #[command(alias = "p")]
    Parse(ParseArgs),
    /// Show the saved plan
    #[command(alias = "s")]
    Show(ShowArgs),
    /// Move a task to a new start date and cascade the change
    #[command(alias = "mv")]
    Move(MoveArgs),
    /// Rescale a section's span by a ratio
    #[command(alias = "rs")]
    Resize(ResizeArgs),
}

/// Parse chart text
///
/// The text is fed to the parser in fragments of `--chunk-size` characters,
/// as it would arrive from a streaming source.
#[derive(ClapArgs)]
pub struct ParseArgs {
    /// File to read; standard input when omitted
    pub input: Option<PathBuf>,

    /// Characters per streamed fragment
    #[arg(long, default_value_t = 64, value_parser = clap::value_parser!(u64).range(1..))]
    pub chunk_size: u64,

    /// Print the plan as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(ClapArgs, Default)]
pub struct ShowArgs {
    /// Print the plan as JSON
    #[arg(long, conflicts_with = "source")]
    pub json: bool,

    /// Print the plan as Gantt chart text
    #[arg(long)]
    pub source: bool,
}

#[derive(ClapArgs)]
pub struct MoveArgs {
    /// Id of the task or milestone to move
    pub task_id: String,
    /// New start date (YYYY-MM-DD)
    pub new_start: Date,
}

impl From<MoveArgs> for MoveTask {
    fn from(val: MoveArgs) -> Self {
        MoveTask {
            task_id: val.task_id,
            new_start: val.new_start,
        }
    }
}

#[derive(ClapArgs)]
pub struct ResizeArgs {
    /// Section name
    pub section: String,
    /// Scale factor, e.g. 2 doubles the section's span
    pub ratio: f64,
    /// Date the section starts on after rescaling; defaults to its current
    /// earliest start
    #[arg(long)]
    pub anchor: Option<Date>,
}

impl From<ResizeArgs> for ResizeSection {
    fn from(val: ResizeArgs) -> Self {
        ResizeSection {
            section: val.section,
            ratio: val.ratio,
            anchor: val.anchor,
        }
    }
}
