//! Single-line Gantt grammar.
//!
//! Accepted forms, checked in order:
//!
//! ```text
//! gantt | title ... | dateFormat ... | ``` | blank      -> Skip
//! section <name>                                       -> Section
//! <label>: milestone, <YYYY-MM-DD>                     -> Milestone
//! <label>: milestone, after <id>...                    -> Milestone
//! <label>:<id>, <YYYY-MM-DD>, <N>d                     -> Task
//! <label>:<id>, after <id>..., <N>d                    -> Task
//! ```
//!
//! A milestone may also name its id explicitly
//! (`<label>: milestone, <id>, <date-or-after>[, 0d]`); otherwise its id is
//! the slug of its label. Anything unrecognised is `Skip`, as is every
//! entry line seen before the first `section`.
//!
//! A dependent starts on the same day its dependency ends, not the day
//! after.

use jiff::civil::Date;

use crate::{
    dates,
    models::{EndDates, Task},
};

/// Keywords whose lines carry no plan data.
const SKIP_KEYWORDS: &[&str] = &[
    "gantt",
    "title",
    "dateFormat",
    "axisFormat",
    "tickInterval",
    "excludes",
    "includes",
    "todayMarker",
    "weekday",
    "accTitle",
    "accDescr",
];

/// Typed result of parsing one line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedLine {
    Skip,
    Section { name: String },
    Task(Task),
    Milestone(Task),
}

/// The start column of an entry line.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Start {
    On(Date),
    After(Vec<String>),
}

/// Parses one line.
///
/// `known` supplies the end dates of entries seen so far. An entry that
/// starts after an id missing from `known` is returned undated, with its
/// dependency list filled in, for later resolution.
pub fn parse_line<K: EndDates + ?Sized>(
    line: &str,
    current_section: Option<&str>,
    known: &K,
) -> ParsedLine {
    let line = line.trim();
    if is_skip_line(line) {
        return ParsedLine::Skip;
    }

    if let Some(name) = line.strip_prefix("section ") {
        let name = name.trim();
        if name.is_empty() {
            return ParsedLine::Skip;
        }
        return ParsedLine::Section {
            name: name.to_string(),
        };
    }

    if current_section.is_none() {
        return ParsedLine::Skip;
    }

    let Some((label, rest)) = line.split_once(':') else {
        return ParsedLine::Skip;
    };
    let label = label.trim();
    if label.is_empty() {
        return ParsedLine::Skip;
    }
    let fields: Vec<&str> = rest.split(',').map(str::trim).collect();

    let parsed = match fields.split_first() {
        Some((first, tail)) if first.eq_ignore_ascii_case("milestone") => {
            parse_milestone(label, tail, known).map(ParsedLine::Milestone)
        }
        _ => parse_task(label, &fields, known).map(ParsedLine::Task),
    };
    parsed.unwrap_or(ParsedLine::Skip)
}

/// Derives a milestone id from its label.
pub fn slugify(label: &str) -> String {
    let mut slug = String::with_capacity(label.len());
    for c in label.chars() {
        if c.is_alphanumeric() {
            slug.extend(c.to_lowercase());
        } else if !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
    }
    while slug.ends_with('-') {
        slug.pop();
    }
    slug
}

fn is_skip_line(line: &str) -> bool {
    if line.is_empty() || line.starts_with("```") || line.starts_with("%%") {
        return true;
    }
    let word = line.split_whitespace().next().unwrap_or_default();
    // `weekday planning :t1, 2025-01-01, 2d` is an entry, not a directive.
    let entry_shaped = is_entry_shaped(line);
    SKIP_KEYWORDS.iter().any(|keyword| {
        (word == *keyword && !entry_shaped)
            || word
                .strip_prefix(keyword)
                .is_some_and(|tail| tail.starts_with(':'))
    })
}

/// `<label> : <field>, <field>...`
fn is_entry_shaped(line: &str) -> bool {
    line.split_once(':')
        .is_some_and(|(_, fields)| fields.contains(','))
}

fn parse_milestone<K: EndDates + ?Sized>(
    label: &str,
    fields: &[&str],
    known: &K,
) -> Option<Task> {
    // A trailing duration (usually `0d`) is tolerated and ignored.
    let fields = match fields.split_last() {
        Some((last, head)) if fields.len() > 1 && dates::parse_duration(last, false).is_some() => {
            head
        }
        _ => fields,
    };

    let (id, start) = match fields {
        [start] => (slugify(label), *start),
        [id, start] if is_valid_id(id) => ((*id).to_string(), *start),
        _ => return None,
    };
    if id.is_empty() {
        return None;
    }

    let milestone = Task::new_milestone(id, label);
    schedule(milestone, parse_start(start)?, known)
}

fn parse_task<K: EndDates + ?Sized>(label: &str, fields: &[&str], known: &K) -> Option<Task> {
    let [id, start, duration] = fields else {
        return None;
    };
    if !is_valid_id(id) {
        return None;
    }
    let start = parse_start(start)?;
    let duration =
        dates::parse_duration(duration, true).or_else(|| dates::parse_duration(duration, false))?;

    schedule(Task::new_task(*id, label, duration), start, known)
}

fn schedule<K: EndDates + ?Sized>(task: Task, start: Start, known: &K) -> Option<Task> {
    match start {
        Start::On(date) => task.scheduled_at(date),
        Start::After(dependencies) => {
            let task = task.after(dependencies);
            match known.start_after(&task.dependencies) {
                Some(date) => task.scheduled_at(date),
                None => Some(task),
            }
        }
    }
}

fn parse_start(field: &str) -> Option<Start> {
    let mut words = field.split_whitespace();
    let first = words.next()?;
    if first.eq_ignore_ascii_case("after") {
        let ids: Vec<String> = words.map(str::to_string).collect();
        if ids.is_empty() {
            return None;
        }
        return Some(Start::After(ids));
    }
    dates::parse_date(field).map(Start::On)
}

fn is_valid_id(id: &str) -> bool {
    !id.is_empty()
        && !id.eq_ignore_ascii_case("milestone")
        && !id.chars().any(char::is_whitespace)
        && dates::parse_date(id).is_none()
}
