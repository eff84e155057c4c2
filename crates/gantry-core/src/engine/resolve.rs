//! Whole-plan fixed-point dependency resolution.

use std::collections::{HashMap, HashSet};

use jiff::civil::Date;
use log::warn;

use crate::models::{EndDates, Section, Task};

/// Why an entry is still undated after resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnresolvedReason {
    /// The named dependency does not exist in the plan
    MissingDependency(String),
    /// The entry depends, directly or transitively, on itself
    Cycle,
    /// The named dependency exists but is itself unresolved
    Blocked(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Unresolved {
    pub id: String,
    pub reason: UnresolvedReason,
}

/// Outcome of [`resolve_all`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    /// Copy of the input with every resolvable date filled in
    pub sections: Vec<Section>,
    /// Passes run, including the final no-change pass
    pub passes: usize,
    /// False when the cap stopped the loop while dates were still changing
    pub converged: bool,
    pub unresolved: Vec<Unresolved>,
}

/// Repeatedly dates every pending entry from its dependencies' end dates
/// until a pass changes nothing or `iteration_cap` passes have run.
///
/// Each pass reads the end dates as updated so far in that same pass, so a
/// chain declared in dependency order resolves in one pass and any ordering
/// resolves to the same dates. Never fails: entries that cannot be dated
/// keep their undefined date and are listed in [`Resolution::unresolved`].
pub fn resolve_all(sections: &[Section], iteration_cap: usize) -> Resolution {
    let mut sections = sections.to_vec();
    let mut ends: HashMap<String, Date> = sections
        .iter()
        .flat_map(|section| section.tasks.iter())
        .filter_map(|task| Some((task.id.clone(), task.resolved_end()?)))
        .collect();

    let mut passes = 0;
    let mut converged = false;
    while passes < iteration_cap {
        passes += 1;
        let mut changed = false;
        for task in sections.iter_mut().flat_map(|s| s.tasks.iter_mut()) {
            if !task.is_pending() {
                continue;
            }
            let Some(scheduled) = ends
                .start_after(&task.dependencies)
                .and_then(|start| task.scheduled_at(start))
            else {
                continue;
            };
            if let Some(end) = scheduled.resolved_end() {
                ends.insert(scheduled.id.clone(), end);
            }
            *task = scheduled;
            changed = true;
        }
        if !changed {
            converged = true;
            break;
        }
    }

    let unresolved = classify_unresolved(&sections);
    if !converged {
        warn!("dependency resolution stopped at the iteration cap ({iteration_cap} passes)");
    }
    for entry in &unresolved {
        warn!("unresolved dependency for '{}': {:?}", entry.id, entry.reason);
    }

    Resolution {
        sections,
        passes,
        converged,
        unresolved,
    }
}

fn classify_unresolved(sections: &[Section]) -> Vec<Unresolved> {
    let tasks: HashMap<&str, &Task> = sections
        .iter()
        .flat_map(|section| section.tasks.iter())
        .map(|task| (task.id.as_str(), task))
        .collect();

    sections
        .iter()
        .flat_map(|section| section.tasks.iter())
        .filter(|task| task.is_pending())
        .map(|task| {
            let missing = task
                .dependencies
                .iter()
                .find(|id| !tasks.contains_key(id.as_str()));
            let reason = if let Some(id) = missing {
                UnresolvedReason::MissingDependency(id.clone())
            } else if reaches(&tasks, &task.id, &task.id, &mut HashSet::new()) {
                UnresolvedReason::Cycle
            } else {
                let blocker = task
                    .dependencies
                    .iter()
                    .find(|id| tasks.get(id.as_str()).is_some_and(|t| t.is_pending()))
                    .cloned()
                    .unwrap_or_default();
                UnresolvedReason::Blocked(blocker)
            };
            Unresolved {
                id: task.id.clone(),
                reason,
            }
        })
        .collect()
}

/// Whether `target` is reachable from `from` through pending dependencies.
fn reaches<'a>(
    tasks: &HashMap<&'a str, &'a Task>,
    from: &str,
    target: &str,
    seen: &mut HashSet<&'a str>,
) -> bool {
    let Some(task) = tasks.get(from) else {
        return false;
    };
    for dependency in &task.dependencies {
        let Some((&id, next)) = tasks.get_key_value(dependency.as_str()) else {
            continue;
        };
        if !next.is_pending() {
            continue;
        }
        if id == target {
            return true;
        }
        if seen.insert(id) && reaches(tasks, id, target, seen) {
            return true;
        }
    }
    false
}
