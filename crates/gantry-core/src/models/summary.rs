//! Running, human-readable summary of a streamed plan.

use serde::{Deserialize, Serialize};

/// Counters and headings collected while a session consumes text.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct StreamSummary {
    /// Chart title from a `title` line
    pub title: Option<String>,

    /// Markdown `#` headers seen outside chart blocks, in order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub headers: Vec<String>,

    pub sections: usize,
    pub tasks: usize,
    pub milestones: usize,

    /// Entries still waiting on a dependency at emission time
    pub pending: usize,
}

impl StreamSummary {
    /// The most recent header, if any.
    pub fn last_header(&self) -> Option<&str> {
        self.headers.last().map(String::as_str)
    }
}
