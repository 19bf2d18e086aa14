//! Per-run log text

use serde::{Deserialize, Serialize};

/// Ordered log lines of one run.
///
/// A segment appended without a line break leaves the last line open, so
/// fine-grained ticks such as download dots accumulate on a single line.
/// There is no size limit; a run is bounded in duration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogAccumulator {
    lines: Vec<String>,
    open: bool,
}

impl LogAccumulator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.lines.clear();
        self.open = false;
    }

    /// Append `text`, closing the line afterwards when `newline` is set.
    ///
    /// Line breaks embedded in `text` start new lines; carriage returns are
    /// dropped.
    pub fn append(&mut self, text: &str, newline: bool) {
        for (index, segment) in text.split('\n').enumerate() {
            let segment = segment.trim_end_matches('\r');
            match self.lines.last_mut() {
                Some(last) if index == 0 && self.open => last.push_str(segment),
                _ => self.lines.push(segment.to_string()),
            }
        }
        self.open = !newline;
    }

    /// Append a complete line
    pub fn push_line(&mut self, line: impl AsRef<str>) {
        self.append(line.as_ref(), true);
    }

    #[must_use]
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// The whole log, lines joined with `\n`
    #[must_use]
    pub fn text(&self) -> String {
        self.lines.join("\n")
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Whether the last line still waits for more text
    #[must_use]
    pub fn is_line_open(&self) -> bool {
        self.open
    }
}
