//! The plan written back as Gantt chart text.

use std::{collections::HashMap, fmt};

use jiff::civil::Date;

use crate::models::{EndDates, Plan, Task};

/// Renders a plan in the line grammar the parser accepts.
///
/// A dependent keeps its `after` form while its start still equals the
/// latest end of its dependencies; once moved away from that it is written
/// with its explicit date. Parsing the output again yields the same dates.
pub struct GanttSource<'a>(pub &'a Plan);

impl GanttSource<'_> {
    fn start_field(task: &Task, ends: &HashMap<String, Date>) -> Option<String> {
        let after = || format!("after {}", task.dependencies.join(" "));
        match task.start_date {
            Some(start)
                if !task.dependencies.is_empty()
                    && ends.start_after(&task.dependencies) == Some(start) =>
            {
                Some(after())
            }
            Some(start) => Some(start.to_string()),
            None if !task.dependencies.is_empty() => Some(after()),
            None => None,
        }
    }
}

impl fmt::Display for GanttSource<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ends: HashMap<String, Date> = self
            .0
            .tasks()
            .filter_map(|task| Some((task.id.clone(), task.resolved_end()?)))
            .collect();

        writeln!(f, "gantt")?;
        writeln!(f, "    dateFormat YYYY-MM-DD")?;
        for section in &self.0.sections {
            writeln!(f, "    section {}", section.name)?;
            for task in &section.tasks {
                let Some(start) = Self::start_field(task, &ends) else {
                    continue;
                };
                if task.is_milestone() {
                    writeln!(f, "    {} :milestone, {}, {start}", task.label, task.id)?;
                } else if let Some(days) = task.duration {
                    writeln!(f, "    {} :{}, {start}, {days}d", task.label, task.id)?;
                }
            }
        }
        Ok(())
    }
}
