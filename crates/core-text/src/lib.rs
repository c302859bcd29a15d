//! Rope-based text buffer with a single caret.
//!
//! Offsets are character offsets (Unicode scalar values), which is also the
//! native index space of `ropey`. Every mutating operation validates its range
//! before touching the rope, so a rejected call leaves both content and caret
//! untouched.
//!
//! Invariant (must hold after every public call): `caret <= len_chars()`.

use ropey::Rope;
use thiserror::Error;

pub mod selection;
pub use selection::Selection;

/// Range contract violation. Callers are expected to pass valid offsets; this
/// surfaces loudly instead of clamping so a bad caller cannot silently corrupt
/// the buffer.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum BufferError {
    #[error("range {start}..{end} out of bounds for buffer of length {len}")]
    OutOfRange { start: usize, end: usize, len: usize },
}

/// A text buffer backed by a `ropey::Rope`.
#[derive(Clone, Default)]
pub struct Buffer {
    rope: Rope,
    caret: usize,
}

impl std::fmt::Debug for Buffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Buffer")
            .field("len_chars", &self.rope.len_chars())
            .field("caret", &self.caret)
            .finish()
    }
}

impl Buffer {
    /// Empty buffer with the caret at 0.
    pub fn new() -> Self {
        Self::default()
    }

    /// Construct a buffer from an in-memory string slice. Caret starts at 0.
    pub fn from_str(content: &str) -> Self {
        Self {
            rope: Rope::from_str(content),
            caret: 0,
        }
    }

    /// Number of characters in the buffer.
    pub fn len_chars(&self) -> usize {
        self.rope.len_chars()
    }

    pub fn is_empty(&self) -> bool {
        self.rope.len_chars() == 0
    }

    pub fn caret(&self) -> usize {
        self.caret
    }

    /// Move the caret. Fails with `OutOfRange` past the end of the buffer.
    pub fn set_caret(&mut self, offset: usize) -> Result<(), BufferError> {
        self.check_range(offset, offset)?;
        self.caret = offset;
        Ok(())
    }

    /// Full buffer contents.
    pub fn text(&self) -> String {
        self.rope.to_string()
    }

    /// Total number of lines in the buffer.
    pub fn line_count(&self) -> usize {
        self.rope.len_lines()
    }

    /// Return the requested line as an owned `String` (including trailing newline if present).
    pub fn line(&self, idx: usize) -> Option<String> {
        if idx < self.rope.len_lines() {
            Some(self.rope.line(idx).to_string())
        } else {
            None
        }
    }

    /// Swap in entirely new content. The caret is clamped to the new length.
    pub fn replace(&mut self, content: &str) {
        self.rope = Rope::from_str(content);
        self.caret = self.caret.min(self.rope.len_chars());
    }

    /// Insert `text` at `offset`; the caret lands just after the inserted text.
    pub fn insert_at(&mut self, offset: usize, text: &str) -> Result<(), BufferError> {
        self.check_range(offset, offset)?;
        self.rope.insert(offset, text);
        self.caret = offset + text.chars().count();
        Ok(())
    }

    /// Delete `[start, end)` and return the removed text. The caret moves to `start`.
    pub fn delete_range(&mut self, start: usize, end: usize) -> Result<String, BufferError> {
        self.check_range(start, end)?;
        let removed = self.rope.slice(start..end).to_string();
        self.rope.remove(start..end);
        self.caret = start;
        Ok(removed)
    }

    /// Text in `[start, end)`.
    pub fn text_in_range(&self, start: usize, end: usize) -> Result<String, BufferError> {
        self.check_range(start, end)?;
        Ok(self.rope.slice(start..end).to_string())
    }

    fn check_range(&self, start: usize, end: usize) -> Result<(), BufferError> {
        let len = self.rope.len_chars();
        if start <= end && end <= len {
            Ok(())
        } else {
            Err(BufferError::OutOfRange { start, end, len })
        }
    }
}
