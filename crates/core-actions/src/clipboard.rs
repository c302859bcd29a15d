//! Copy / cut / paste between a `Buffer` and the system clipboard.
//!
//! The clipboard is an external collaborator behind the `Clipboard` trait:
//! `SystemClipboard` talks to the OS through `arboard`, `MemoryClipboard` keeps
//! the payload in-process (headless sessions and tests).
//!
//! Paste semantics: clipboard text is inserted at the caret followed by one
//! trailing space, and the caret lands just after the pasted text (before the
//! space). Pasted line breaks are folded to LF like loaded text. A clipboard
//! holding non-textual data makes paste a logged no-op.

use core_state::normalize_line_endings;
use core_text::{Buffer, BufferError, Selection};
use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Error)]
pub enum ClipboardError {
    #[error("system clipboard unavailable: {0}")]
    Unavailable(String),
    #[error("clipboard access failed: {0}")]
    Access(String),
}

/// Failure of a buffer editing operation.
#[derive(Debug, Error)]
pub enum EditError {
    #[error(transparent)]
    OutOfRange(#[from] BufferError),
    #[error(transparent)]
    Clipboard(#[from] ClipboardError),
}

/// Process-wide clipboard surface.
pub trait Clipboard {
    fn write_text(&mut self, text: &str) -> Result<(), ClipboardError>;
    /// `Ok(None)` when the clipboard holds no textual payload.
    fn read_text(&mut self) -> Result<Option<String>, ClipboardError>;
}

impl<C: Clipboard + ?Sized> Clipboard for Box<C> {
    fn write_text(&mut self, text: &str) -> Result<(), ClipboardError> {
        (**self).write_text(text)
    }
    fn read_text(&mut self) -> Result<Option<String>, ClipboardError> {
        (**self).read_text()
    }
}

/// In-process clipboard. `contents == None` models a non-textual payload.
#[derive(Debug, Default, Clone)]
pub struct MemoryClipboard {
    contents: Option<String>,
}

impl MemoryClipboard {
    pub fn with_text(text: impl Into<String>) -> Self {
        Self {
            contents: Some(text.into()),
        }
    }

    /// Simulate another application placing non-text data on the clipboard.
    pub fn clear_to_non_text(&mut self) {
        self.contents = None;
    }

    pub fn contents(&self) -> Option<&str> {
        self.contents.as_deref()
    }
}

impl Clipboard for MemoryClipboard {
    fn write_text(&mut self, text: &str) -> Result<(), ClipboardError> {
        self.contents = Some(text.to_string());
        Ok(())
    }
    fn read_text(&mut self) -> Result<Option<String>, ClipboardError> {
        Ok(self.contents.clone())
    }
}

/// OS clipboard via `arboard`. Construction fails on headless systems.
pub struct SystemClipboard {
    inner: arboard::Clipboard,
}

impl SystemClipboard {
    pub fn new() -> Result<Self, ClipboardError> {
        arboard::Clipboard::new()
            .map(|inner| Self { inner })
            .map_err(|e| ClipboardError::Unavailable(e.to_string()))
    }
}

impl Clipboard for SystemClipboard {
    fn write_text(&mut self, text: &str) -> Result<(), ClipboardError> {
        self.inner
            .set_text(text.to_string())
            .map_err(|e| ClipboardError::Access(e.to_string()))
    }

    fn read_text(&mut self) -> Result<Option<String>, ClipboardError> {
        match self.inner.get_text() {
            Ok(text) => Ok(Some(text)),
            Err(arboard::Error::ContentNotAvailable) => Ok(None),
            Err(e) => Err(ClipboardError::Access(e.to_string())),
        }
    }
}

/// Result of a paste attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PasteOutcome {
    /// `chars` clipboard characters were inserted (plus the trailing space).
    Inserted { chars: usize },
    /// Clipboard held no text; buffer untouched.
    NonTextualClipboard,
}

pub struct ClipboardBridge<C: Clipboard = Box<dyn Clipboard>> {
    clipboard: C,
}

impl<C: Clipboard> ClipboardBridge<C> {
    pub fn new(clipboard: C) -> Self {
        Self { clipboard }
    }

    pub fn clipboard(&self) -> &C {
        &self.clipboard
    }

    pub fn clipboard_mut(&mut self) -> &mut C {
        &mut self.clipboard
    }

    /// Put the selected text on the clipboard. An empty selection copies "".
    pub fn copy(&mut self, buffer: &Buffer, selection: Selection) -> Result<String, EditError> {
        let text = buffer.text_in_range(selection.start, selection.end)?;
        self.clipboard.write_text(&text)?;
        debug!(target: "clipboard", chars = selection.len(), "copy");
        Ok(text)
    }

    /// Copy then delete the selection. The range is validated and the clipboard
    /// written before the buffer changes, so a failure leaves the buffer as-is.
    pub fn cut(&mut self, buffer: &mut Buffer, selection: Selection) -> Result<String, EditError> {
        let text = self.copy(buffer, selection)?;
        buffer.delete_range(selection.start, selection.end)?;
        debug!(target: "clipboard", chars = selection.len(), caret = buffer.caret(), "cut");
        Ok(text)
    }

    /// Insert clipboard text plus one trailing space at `caret`.
    pub fn paste(&mut self, buffer: &mut Buffer, caret: usize) -> Result<PasteOutcome, EditError> {
        if caret > buffer.len_chars() {
            return Err(BufferError::OutOfRange {
                start: caret,
                end: caret,
                len: buffer.len_chars(),
            }
            .into());
        }
        let Some(text) = self.clipboard.read_text()? else {
            info!(target: "clipboard", "paste_non_textual_ignored");
            return Ok(PasteOutcome::NonTextualClipboard);
        };
        let mut payload = normalize_line_endings(&text).text;
        let chars = payload.chars().count();
        payload.push(' ');
        buffer.insert_at(caret, &payload)?;
        buffer.set_caret(caret + chars)?;
        debug!(target: "clipboard", chars, caret = buffer.caret(), "paste");
        Ok(PasteOutcome::Inserted { chars })
    }
}
