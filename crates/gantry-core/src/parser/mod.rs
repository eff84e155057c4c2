//! Line reconstruction and the Gantt line grammar.
//!
//! - [`lines`]: turns arbitrarily chunked text into complete lines
//! - [`grammar`]: parses one line into a [`ParsedLine`]

pub mod grammar;
pub mod lines;


pub use grammar::{parse_line, slugify, ParsedLine};
pub use lines::LineReconstructor;
