//! The single-owner application context.
//!
//! `Workbench` bundles the view registry, the editor session, the save
//! coordinator and the clipboard bridge behind one explicitly constructed
//! value. Every operation runs to completion on the caller's thread; the
//! `&mut self` receivers are what keep a close confirmation from interleaving
//! with edits or a second close.

use crate::{ViewHost, ViewId, ViewRegistry, ViewTitles};
use core_actions::{
    Clipboard, ClipboardBridge, CloseGuard, CloseReason, CloseResolution, ConfirmationPrompt,
    DestinationPicker, EditError, FsPersistence, IoFailure, PasteOutcome, Persistence,
    SaveCoordinator, SaveOutcome,
};
use core_state::{EditorSession, LineEnding};
use core_text::{BufferError, Selection};
use std::path::{Path, PathBuf};
use tracing::info;

/// Snapshot of the session for status displays.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionStatus {
    pub document: String,
    pub path: Option<PathBuf>,
    pub dirty: bool,
    pub line_ending: LineEnding,
    pub chars: usize,
    pub caret: usize,
    pub fingerprint: String,
}

pub struct Workbench<H, P = FsPersistence, C = Box<dyn Clipboard>>
where
    H: ViewHost,
    P: Persistence,
    C: Clipboard,
{
    host: H,
    registry: ViewRegistry,
    session: EditorSession,
    coordinator: SaveCoordinator<P>,
    clipboard: ClipboardBridge<C>,
    titles: ViewTitles,
}

impl<H, P, C> Workbench<H, P, C>
where
    H: ViewHost,
    P: Persistence,
    C: Clipboard,
{
    /// Create both views on `host` and an empty untitled session.
    pub fn new(
        mut host: H,
        coordinator: SaveCoordinator<P>,
        clipboard: ClipboardBridge<C>,
        titles: ViewTitles,
    ) -> Self {
        let registry = ViewRegistry::create(&mut host, &titles);
        Self {
            host,
            registry,
            session: EditorSession::new(),
            coordinator,
            clipboard,
            titles,
        }
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn registry(&self) -> &ViewRegistry {
        &self.registry
    }

    pub fn session(&self) -> &EditorSession {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut EditorSession {
        &mut self.session
    }

    pub fn clipboard_mut(&mut self) -> &mut C {
        self.clipboard.clipboard_mut()
    }

    /// Empty untitled document in the editor view.
    pub fn new_file(&mut self) {
        let title = self.titles.untitled.clone();
        self.registry
            .open_document_in_editor(&mut self.host, &mut self.session, "", &title, None);
        info!(target: "views", "new_file");
    }

    /// Load `path` through the coordinator and show it in the editor. A read
    /// failure leaves the session and views untouched.
    pub fn open_file(&mut self, path: &Path) -> Result<(), IoFailure> {
        self.coordinator.open(&mut self.session, path)?;
        let title = self.editing_title(path);
        self.registry.surface_editor(&mut self.host, &title);
        Ok(())
    }

    /// Ask `picker` for a source file and open it. `Ok(None)` when cancelled.
    pub fn open_with_picker(
        &mut self,
        picker: &mut dyn DestinationPicker,
    ) -> Result<Option<PathBuf>, IoFailure> {
        let Some((path, content)) = self.coordinator.pick_and_read(picker)? else {
            return Ok(None);
        };
        self.show_loaded(path.clone(), &content);
        Ok(Some(path))
    }

    fn editing_title(&self, path: &Path) -> String {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        self.titles.editing(&name)
    }

    fn show_loaded(&mut self, path: PathBuf, content: &str) {
        let title = self.editing_title(&path);
        info!(target: "views", file = %path.display(), "open_in_editor");
        self.registry.open_document_in_editor(
            &mut self.host,
            &mut self.session,
            content,
            &title,
            Some(path),
        );
    }

    pub fn save(&mut self, picker: &mut dyn DestinationPicker) -> Result<SaveOutcome, IoFailure> {
        let outcome = self.coordinator.save(&mut self.session, picker)?;
        self.after_save(&outcome);
        Ok(outcome)
    }

    pub fn save_as(
        &mut self,
        picker: &mut dyn DestinationPicker,
    ) -> Result<SaveOutcome, IoFailure> {
        let outcome = self.coordinator.save_as(&mut self.session, picker)?;
        self.after_save(&outcome);
        Ok(outcome)
    }

    fn after_save(&mut self, outcome: &SaveOutcome) {
        if let SaveOutcome::Saved(_) = outcome {
            self.refresh_editor_title();
        }
    }

    fn refresh_editor_title(&mut self) {
        let title = match self.session.file_name() {
            Some(name) => self.titles.editing(&name),
            None => self.titles.untitled.clone(),
        };
        self.registry
            .set_title(&mut self.host, ViewId::Editor, &title);
    }

    /// Handle a close attempt on `view`. Editor closes go through the close
    /// guard; the REPL view has nothing to guard.
    pub fn request_close(
        &mut self,
        view: ViewId,
        picker: &mut dyn DestinationPicker,
        prompt: &mut dyn ConfirmationPrompt,
    ) -> CloseResolution {
        let resolution = match view {
            ViewId::Repl => CloseResolution::Closed(CloseReason::Clean),
            ViewId::Editor => {
                let resolution =
                    CloseGuard::run(&mut self.session, &mut self.coordinator, picker, prompt);
                if let CloseResolution::Closed(CloseReason::Saved(_)) = &resolution {
                    self.refresh_editor_title();
                }
                resolution
            }
        };
        if resolution.is_closed() {
            self.registry.hide(&mut self.host, view);
        }
        resolution
    }

    pub fn copy(&mut self, selection: Selection) -> Result<String, EditError> {
        self.clipboard.copy(self.session.buffer(), selection)
    }

    pub fn cut(&mut self, selection: Selection) -> Result<String, EditError> {
        self.clipboard.cut(self.session.buffer_mut(), selection)
    }

    pub fn paste(&mut self, caret: usize) -> Result<PasteOutcome, EditError> {
        self.clipboard.paste(self.session.buffer_mut(), caret)
    }

    /// Direct typing: insert at the caret.
    pub fn type_text(&mut self, text: &str) -> Result<(), BufferError> {
        let caret = self.session.buffer().caret();
        self.insert_text(caret, text).map(|_| ())
    }

    /// Insert `text` at `offset`; returns the number of chars inserted.
    pub fn insert_text(&mut self, offset: usize, text: &str) -> Result<usize, BufferError> {
        self.session.insert_text(offset, text)
    }

    pub fn status(&self) -> SessionStatus {
        let buffer = self.session.buffer();
        SessionStatus {
            document: self
                .session
                .file_name()
                .unwrap_or_else(|| self.titles.untitled.clone()),
            path: self.session.backing_path().map(Path::to_path_buf),
            dirty: self.session.is_dirty(),
            line_ending: self.session.line_ending(),
            chars: buffer.len_chars(),
            caret: buffer.caret(),
            fingerprint: self.session.fingerprint().to_hex(),
        }
    }
}
