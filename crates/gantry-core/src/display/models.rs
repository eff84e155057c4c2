//! Display implementations for domain models.
//!
//! All output is markdown, suitable for the CLI's terminal renderer.

use std::fmt;

use crate::models::{Plan, Section, StreamSummary, Task, TaskKind, Timeline};

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl fmt::Display for Timeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} → {}", self.start_date, self.end_date)
    }
}

impl fmt::Display for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "- **{}** (`{}`)", self.label, self.id)?;
        match (self.start_date, self.is_milestone()) {
            (Some(start), true) => write!(f, ": ◆ {start}")?,
            (Some(start), false) => {
                write!(f, ": {start}")?;
                if let Some(end) = self.resolved_end() {
                    write!(f, " → {end}")?;
                }
                if let Some(days) = self.duration {
                    write!(f, " ({days}d)")?;
                }
            }
            (None, _) => write!(f, ": _pending_")?,
        }
        if !self.dependencies.is_empty() {
            write!(f, ", after {}", self.dependencies.join(", "))?;
        }
        writeln!(f)
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "## {}", self.name)?;
        writeln!(f)?;
        if self.tasks.is_empty() {
            writeln!(f, "No tasks in this section.")?;
        }
        for task in &self.tasks {
            write!(f, "{task}")?;
        }
        writeln!(f)
    }
}

impl fmt::Display for Plan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "# Plan")?;
        writeln!(f)?;
        if let Some(timeline) = &self.timeline {
            writeln!(f, "- Timeline: {timeline}")?;
        }
        let total = self.tasks().count();
        let pending = self.tasks().filter(|t| t.is_pending()).count();
        writeln!(f, "- Entries: {total} ({pending} pending)")?;
        writeln!(f)?;

        if self.sections.is_empty() {
            return writeln!(f, "No sections in this plan.");
        }
        for section in &self.sections {
            write!(f, "{section}")?;
        }
        Ok(())
    }
}

impl fmt::Display for StreamSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(header) = self.last_header() {
            writeln!(f, "### {header}")?;
            writeln!(f)?;
        }
        if let Some(title) = &self.title {
            writeln!(f, "**{title}**")?;
            writeln!(f)?;
        }
        write!(
            f,
            "{} sections, {} tasks, {} milestones",
            self.sections, self.tasks, self.milestones
        )?;
        if self.pending > 0 {
            write!(f, " ({} waiting on dependencies)", self.pending)?;
        }
        writeln!(f)
    }
}
