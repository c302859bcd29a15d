//! Editor session: the single active document slot.
//!
//! An `EditorSession` owns one `Buffer`, the optional backing path and the
//! fingerprint of the text last written to (or loaded from) disk. Dirty state
//! is never tracked as a flag; it is always derived by comparing the current
//! fingerprint against the recorded one, so reverting an edit by hand makes
//! the session clean again.
//!
//! Untitled documents have no saved fingerprint. They compare against the
//! fingerprint of the content they were created with instead, which makes an
//! untouched new document clean and any edit to it dirty.
//!
//! Core invariants (must hold after every public call):
//! * `saved_fingerprint` is `None` only while the document has never been
//!   loaded from or saved to a path.
//! * When set, `is_dirty() == (fingerprint() != saved_fingerprint)`.
//! * Fingerprints are always computed over `disk_text()`, the exact form a
//!   save would write.
//!
//! The session is reused across documents for the lifetime of the process.
//! Exclusive `&mut` access covers the "no concurrent mutation during I/O"
//! requirement; all I/O runs synchronously on the event thread.

use core_text::{Buffer, BufferError};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

pub mod fingerprint;
pub mod line_ending;

pub use fingerprint::{Fingerprint, fingerprint};
pub use line_ending::{LineEnding, NormalizedText, normalize_line_endings};

#[derive(Debug)]
pub struct EditorSession {
    buffer: Buffer,
    backing_path: Option<PathBuf>,
    saved_fingerprint: Option<Fingerprint>,
    /// Fingerprint of the content an untitled document started from.
    baseline: Fingerprint,
    line_ending: LineEnding,
}

impl Default for EditorSession {
    fn default() -> Self {
        Self::new()
    }
}

impl EditorSession {
    /// Empty untitled session.
    pub fn new() -> Self {
        Self {
            buffer: Buffer::new(),
            backing_path: None,
            saved_fingerprint: None,
            baseline: Fingerprint::of(""),
            line_ending: LineEnding::Lf,
        }
    }

    /// Replace the document. With a path the loaded text is the clean
    /// reference; without one the document is untitled and clean until edited.
    pub fn load(&mut self, path: Option<PathBuf>, content: &str) {
        let norm = normalize_line_endings(content);
        if norm.mixed {
            warn!(target: "session", path = ?path, "mixed_line_endings_detected");
        }
        self.line_ending = norm.style;
        self.buffer.replace(&norm.text);
        self.buffer.set_caret(0).ok();
        let fp = self.fingerprint();
        self.baseline = fp;
        self.saved_fingerprint = path.as_ref().map(|_| fp);
        debug!(
            target: "session",
            path = ?path,
            chars = self.buffer.len_chars(),
            line_ending = self.line_ending.label(),
            fingerprint = ?fp,
            "session_loaded"
        );
        self.backing_path = path;
    }

    /// Record a successful write of `disk_text()` to `path`.
    pub fn mark_saved(&mut self, path: PathBuf) {
        let fp = self.fingerprint();
        debug!(target: "session", path = %path.display(), fingerprint = ?fp, "session_marked_saved");
        self.saved_fingerprint = Some(fp);
        self.baseline = fp;
        self.backing_path = Some(path);
    }

    pub fn is_dirty(&self) -> bool {
        let current = self.fingerprint();
        match self.saved_fingerprint {
            Some(saved) => current != saved,
            None => current != self.baseline,
        }
    }

    /// Fingerprint of the current on-disk form.
    pub fn fingerprint(&self) -> Fingerprint {
        Fingerprint::of(&self.disk_text())
    }

    /// Buffer text with line endings re-expanded to the document's style.
    pub fn disk_text(&self) -> String {
        let text = self.buffer.text();
        self.line_ending.expand(&text).into_owned()
    }

    /// Insert `text` at `offset` with its line breaks folded to LF, the form
    /// the buffer holds. Returns the number of chars inserted.
    pub fn insert_text(&mut self, offset: usize, text: &str) -> Result<usize, BufferError> {
        let norm = normalize_line_endings(text);
        self.buffer.insert_at(offset, &norm.text)?;
        Ok(norm.text.chars().count())
    }

    pub fn buffer(&self) -> &Buffer {
        &self.buffer
    }

    pub fn buffer_mut(&mut self) -> &mut Buffer {
        &mut self.buffer
    }

    pub fn backing_path(&self) -> Option<&Path> {
        self.backing_path.as_deref()
    }

    pub fn saved_fingerprint(&self) -> Option<Fingerprint> {
        self.saved_fingerprint
    }

    pub fn line_ending(&self) -> LineEnding {
        self.line_ending
    }

    /// File name of the backing path, if any.
    pub fn file_name(&self) -> Option<String> {
        self.backing_path
            .as_deref()
            .and_then(Path::file_name)
            .map(|n| n.to_string_lossy().into_owned())
    }
}
