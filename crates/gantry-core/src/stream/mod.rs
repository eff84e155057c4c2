//! Per-session stream state machine.
//!
//! A [`StreamSession`] consumes text fragments in arrival order and turns
//! the Gantt lines inside chart blocks into [`BufferedAction`]s:
//!
//! ```text
//! fragments ──▶ LineReconstructor ──▶ parse_line ──▶ BufferedAction queue
//!                                         ▲
//!                                         └── running TaskDictionary
//! ```
//!
//! Chart blocks are fenced code blocks (```` ``` ````), or raw chart text
//! opened by a bare `gantt` line. Markdown `#` headers outside blocks feed
//! the running [`StreamSummary`]. Leaving a block emits one
//! `PROCESS_DEPENDENCIES` action so forward references get a final sweep.
//!
//! The session owns no plan; it only threads its own state from call to
//! call. Dropping it (or calling [`StreamSession::reset`]) cancels the
//! session without side effects.

use std::collections::{HashMap, HashSet};

use jiff::civil::Date;
use log::debug;

use crate::{
    models::{
        Action, BufferedAction, EndDates, StreamSummary, Task, TaskDictionary, TaskPayload,
        Timeline,
    },
    parser::{parse_line, LineReconstructor, ParsedLine},
};


/// Result of feeding one chunk to a session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChunkOutput {
    /// Actions emitted for the lines this chunk completed, in order
    pub actions: Vec<BufferedAction>,

    /// Rendered summary, present only when it changed during this chunk
    pub summary: Option<String>,
}

/// Transient state for one streamed plan.
#[derive(Debug, Clone, Default)]
pub struct StreamSession {
    lines: LineReconstructor,
    in_block: bool,
    implicit_block: bool,
    current_section: Option<String>,
    known_sections: HashSet<String>,
    dictionary: TaskDictionary,
    timeline: Option<Timeline>,
    summary: StreamSummary,
}

impl StreamSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Consumes one fragment of text.
    pub fn consume(&mut self, chunk: &str) -> ChunkOutput {
        let before = self.summary.clone();
        let mut actions = Vec::new();
        for line in self.lines.feed(chunk) {
            self.process_line(&line, &mut actions);
        }
        self.output(&before, actions)
    }

    /// Signals end of stream: flushes an unterminated last line and closes
    /// any open block.
    pub fn finish(&mut self) -> ChunkOutput {
        let before = self.summary.clone();
        let mut actions = Vec::new();
        if let Some(line) = self.lines.flush() {
            self.process_line(&line, &mut actions);
        }
        if self.in_block {
            self.leave_block(&mut actions);
        }
        self.output(&before, actions)
    }

    /// Discards all session state.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn summary(&self) -> &StreamSummary {
        &self.summary
    }

    /// Index of every entry emitted so far.
    pub fn dictionary(&self) -> &TaskDictionary {
        &self.dictionary
    }

    pub fn timeline(&self) -> Option<&Timeline> {
        self.timeline.as_ref()
    }

    pub fn in_block(&self) -> bool {
        self.in_block
    }

    pub fn current_section(&self) -> Option<&str> {
        self.current_section.as_deref()
    }

    fn output(&self, before: &StreamSummary, actions: Vec<BufferedAction>) -> ChunkOutput {
        let summary = (*before != self.summary).then(|| self.summary.to_string());
        ChunkOutput { actions, summary }
    }

    fn process_line(&mut self, line: &str, actions: &mut Vec<BufferedAction>) {
        let trimmed = line.trim();

        if trimmed.starts_with("```") {
            if self.in_block {
                self.leave_block(actions);
            } else {
                self.enter_block(false);
            }
            return;
        }

        if trimmed.starts_with('#') {
            if self.in_block && !self.implicit_block {
                return;
            }
            if self.in_block {
                self.leave_block(actions);
            }
            let header = trimmed.trim_start_matches('#').trim();
            if !header.is_empty() {
                self.summary.headers.push(header.to_string());
            }
            return;
        }

        if !self.in_block {
            if trimmed == "gantt" {
                self.enter_block(true);
            }
            return;
        }

        match parse_line(line, self.current_section.as_deref(), &self.dictionary) {
            ParsedLine::Skip => {
                if let Some(title) = trimmed.strip_prefix("title ") {
                    self.summary.title = Some(title.trim().to_string());
                }
            }
            ParsedLine::Section { name } => self.open_section(name, actions),
            ParsedLine::Task(task) | ParsedLine::Milestone(task) => self.emit_entry(task, actions),
        }
    }

    /// Each block starts with no open section and no known section names.
    fn enter_block(&mut self, implicit: bool) {
        self.in_block = true;
        self.implicit_block = implicit;
        self.current_section = None;
        self.known_sections.clear();
    }

    fn leave_block(&mut self, actions: &mut Vec<BufferedAction>) {
        self.in_block = false;
        self.implicit_block = false;
        self.current_section = None;
        push(actions, Action::ProcessDependencies);
    }

    fn open_section(&mut self, name: String, actions: &mut Vec<BufferedAction>) {
        if self.known_sections.insert(name.clone()) {
            self.summary.sections += 1;
            push(actions, Action::AddSection { name: name.clone() });
        }
        self.current_section = Some(name);
    }

    fn emit_entry(&mut self, task: Task, actions: &mut Vec<BufferedAction>) {
        let Some(section) = self.current_section.clone() else {
            return;
        };

        let existing = self.dictionary.contains(&task.id);
        if !existing {
            if task.is_milestone() {
                self.summary.milestones += 1;
            } else {
                self.summary.tasks += 1;
            }
        }

        let widened = Timeline::widened(self.timeline.as_ref(), &task);
        self.dictionary.insert(task.clone());
        self.summary.pending = unresolved_count(&self.dictionary);

        let payload = TaskPayload::new(section, task);
        push(
            actions,
            if existing {
                Action::update(payload)
            } else {
                Action::add(payload)
            },
        );

        if let Some(timeline) = widened {
            self.timeline = Some(timeline);
            push(actions, Action::UpdateTimeline(timeline));
        }
    }
}

/// Pending entries that stay undated even after following every
/// dependency chain through the entries seen so far.
fn unresolved_count(dictionary: &TaskDictionary) -> usize {
    let mut ends: HashMap<String, Date> = dictionary
        .iter()
        .filter_map(|task| Some((task.id.clone(), task.resolved_end()?)))
        .collect();
    loop {
        let dated: Vec<(String, Date)> = dictionary
            .iter()
            .filter(|task| !ends.contains_key(&task.id))
            .filter_map(|task| {
                let start = ends.start_after(&task.dependencies)?;
                let end = task.scheduled_at(start)?.resolved_end()?;
                Some((task.id.clone(), end))
            })
            .collect();
        if dated.is_empty() {
            break;
        }
        ends.extend(dated);
    }
    dictionary
        .iter()
        .filter(|task| task.is_pending() && !ends.contains_key(&task.id))
        .count()
}

fn push(actions: &mut Vec<BufferedAction>, action: Action) {
    debug!("emit {}", action.name());
    actions.push(BufferedAction::new(action));
}
