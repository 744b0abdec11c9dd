use std::sync::{Mutex, MutexGuard, PoisonError};
use thiserror::Error;

use super::{DEFAULT_COMMENT_PREFIX, LINE_SEPARATOR};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BufferError {
    #[error("unable to set line #{index}: out of bounds (document has {len} lines)")]
    OutOfRange { index: usize, len: usize },
}

/// A line handed out by the scanning cursor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScannedLine {
    /// 1-based line number in the document
    pub number: usize,
    pub text: String,
}

impl ScannedLine {
    /// 0-based index for [`LineBuffer::set`]
    pub fn index(&self) -> usize {
        self.number - 1
    }
}

#[derive(Debug)]
struct State {
    /// Index of the next line to read
    cursor: usize,
    lines: Vec<String>,
}

/// Document lines plus a forward-only scanning cursor
///
/// Every operation takes the internal lock, so the buffer can be shared
/// behind an `Arc` between the scan loop and resolution tasks.
#[derive(Debug)]
pub struct LineBuffer {
    state: Mutex<State>,
    comment: String,
}

impl LineBuffer {
    pub fn new(lines: Vec<String>) -> Self {
        Self {
            state: Mutex::new(State { cursor: 0, lines }),
            comment: DEFAULT_COMMENT_PREFIX.to_string(),
        }
    }

    /// Split `text` into lines (`\n` or `\r\n`).
    pub fn parse(text: &str) -> Self {
        Self::new(text.lines().map(str::to_owned).collect())
    }

    /// Lines starting with `prefix` are skipped by the scanner.
    /// An empty prefix disables comments.
    pub fn with_comment_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.comment = prefix.into();
        self
    }

    pub fn comment_prefix(&self) -> &str {
        &self.comment
    }

    pub fn len(&self) -> usize {
        self.lock().lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Return the next non-comment line and advance the cursor past it.
    pub fn next(&self) -> Option<ScannedLine> {
        let mut state = self.lock();

        while state.cursor < state.lines.len() {
            let index = state.cursor;
            state.cursor += 1;

            let text = &state.lines[index];
            if self.comment.is_empty() || !text.starts_with(self.comment.as_str()) {
                return Some(ScannedLine {
                    number: index + 1,
                    text: text.clone(),
                });
            }
        }

        None
    }

    /// Like [`next`](Self::next), but zero-length lines are skipped too.
    pub fn next_non_empty(&self) -> Option<ScannedLine> {
        loop {
            let line = self.next()?;
            if !line.text.is_empty() {
                return Some(line);
            }
        }
    }

    /// Step the cursor back by one line.
    pub fn back(&self) {
        let mut state = self.lock();
        state.cursor = state.cursor.saturating_sub(1);
    }

    /// Overwrite the line at `index` (0-based).
    pub fn set(&self, index: usize, text: impl Into<String>) -> Result<(), BufferError> {
        let mut state = self.lock();

        let len = state.lines.len();
        match state.lines.get_mut(index) {
            Some(line) => {
                *line = text.into();
                Ok(())
            }
            None => Err(BufferError::OutOfRange { index, len }),
        }
    }

    pub fn line(&self, index: usize) -> Option<String> {
        self.lock().lines.get(index).cloned()
    }

    /// Serialize the document back to text.
    pub fn join(&self) -> String {
        self.lock().lines.join(LINE_SEPARATOR)
    }

    pub fn into_lines(self) -> Vec<String> {
        self.state
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner)
            .lines
    }

    // A panicking writer cannot leave a line half-written, so a poisoned
    // lock still guards consistent data.
    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn buffer(text: &str) -> LineBuffer {
        LineBuffer::parse(text).with_comment_prefix("//")
    }

    #[test]
    fn test_next_skips_comments_but_keeps_them() {
        let lines = buffer("first\n// comment\nsecond");

        let first = lines.next().unwrap();
        assert_eq!(first.number, 1);
        assert_eq!(first.text, "first");

        let second = lines.next().unwrap();
        assert_eq!(second.number, 3);
        assert_eq!(second.text, "second");

        assert!(lines.next().is_none());
        assert_eq!(lines.join(), "first\n// comment\nsecond");
    }

    #[test]
    fn test_default_comment_prefix_is_hash() {
        let lines = LineBuffer::parse("# skipped\n// kept");
        assert_eq!(lines.comment_prefix(), "#");
        assert_eq!(lines.next().unwrap().text, "// kept");
    }

    #[test]
    fn test_empty_comment_prefix_disables_comments() {
        let lines = LineBuffer::parse("# a").with_comment_prefix("");
        assert_eq!(lines.next().unwrap().text, "# a");
    }

    #[test]
    fn test_next_non_empty() {
        let lines = buffer("\n\n// note\n\ntext\n");

        let line = lines.next_non_empty().unwrap();
        assert_eq!(line.number, 5);
        assert_eq!(line.text, "text");
        assert!(lines.next_non_empty().is_none());
    }

    #[test]
    fn test_cursor_is_not_reset_after_end() {
        let lines = buffer("only");
        assert!(lines.next().is_some());
        assert!(lines.next().is_none());
        assert!(lines.next().is_none());
    }

    #[test]
    fn test_back_rereads_previous_line() {
        let lines = buffer("a\nb");
        lines.next();
        lines.next();
        lines.back();

        assert_eq!(lines.next().unwrap().text, "b");
    }

    #[test]
    fn test_back_at_start_is_noop() {
        let lines = buffer("a");
        lines.back();
        assert_eq!(lines.next().unwrap().number, 1);
    }

    #[test]
    fn test_set_replaces_single_line() {
        let lines = buffer("a\nb\nc");
        lines.set(1, "x\ny").unwrap();

        assert_eq!(lines.len(), 3);
        assert_eq!(lines.line(1).as_deref(), Some("x\ny"));
        assert_eq!(lines.join(), "a\nx\ny\nc");
    }

    #[test]
    fn test_set_out_of_bounds() {
        let lines = buffer("a\nb");

        let err = lines.set(2, "z").unwrap_err();
        assert_eq!(err, BufferError::OutOfRange { index: 2, len: 2 });
        assert_eq!(lines.into_lines(), vec!["a", "b"]);
    }

    #[test]
    fn test_parse_handles_crlf() {
        let lines = LineBuffer::parse("a\r\nb\r\n");
        assert_eq!(lines.into_lines(), vec!["a", "b"]);
    }

    #[test]
    fn test_concurrent_sets_do_not_interfere() {
        let lines = Arc::new(LineBuffer::parse(&"x\n".repeat(64)));

        let handles: Vec<_> = (0..64)
            .map(|i| {
                let lines = Arc::clone(&lines);
                std::thread::spawn(move || lines.set(i, format!("line {i}")).unwrap())
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        for i in 0..64 {
            assert_eq!(lines.line(i).unwrap(), format!("line {i}"));
        }
    }
}
