//! Reassembles complete lines from arbitrarily split text fragments.

/// Buffers text fragments and yields newline-terminated lines.
///
/// An unterminated remainder is carried over to the next [`feed`] call, so a
/// line is never split across two results regardless of how the source text
/// was chunked.
///
/// [`feed`]: LineReconstructor::feed
#[derive(Debug, Clone, Default)]
pub struct LineReconstructor {
    partial: String,
}

impl LineReconstructor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `chunk` and returns every line it completes, without the line
    /// terminator. A trailing `\r` is stripped as well.
    pub fn feed(&mut self, chunk: &str) -> Vec<String> {
        self.partial.push_str(chunk);
        let Some(last_newline) = self.partial.rfind('\n') else {
            return Vec::new();
        };

        let remainder = self.partial.split_off(last_newline + 1);
        let complete = std::mem::replace(&mut self.partial, remainder);
        complete
            .split_terminator('\n')
            .map(|line| line.strip_suffix('\r').unwrap_or(line).to_string())
            .collect()
    }

    /// The unterminated text buffered so far.
    pub fn partial(&self) -> &str {
        &self.partial
    }

    /// Takes the unterminated remainder as a final line, if there is one.
    pub fn flush(&mut self) -> Option<String> {
        if self.partial.is_empty() {
            return None;
        }
        let line = std::mem::take(&mut self.partial);
        Some(line.strip_suffix('\r').unwrap_or(&line).to_string())
    }

    pub fn clear(&mut self) {
        self.partial.clear();
    }
}
