//! View registry and the workbench context object.
//!
//! The shell has exactly two views: the REPL view (always present, shown at
//! startup) and the editor view (hidden until a document is opened). Both are
//! owned by a `ViewRegistry`, which lives inside the `Workbench` together with
//! the single `EditorSession`. The workbench is constructed once at startup and
//! passed to whatever needs it; there is no ambient global state.
//!
//! Rendering is the host's business. The registry only tells the host which
//! view to show or hide and what its title is, through `ViewHost`.
//!
//! Invariants (must hold after every public call):
//! * Exactly one REPL view and one editor view exist per registry.
//! * The editor view's close requests are routed through the close guard
//!   (`ViewHost::on_close_requested` is registered at creation).
//! * The recorded title of a view is the last title pushed to the host.

use core_state::EditorSession;
use std::path::PathBuf;
use tracing::debug;

mod workbench;
pub use workbench::{SessionStatus, Workbench};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ViewId {
    Repl,
    Editor,
}

impl ViewId {
    pub fn as_str(self) -> &'static str {
        match self {
            ViewId::Repl => "repl",
            ViewId::Editor => "editor",
        }
    }
}

/// Host view surface (window system, terminal, test recorder...).
pub trait ViewHost {
    fn show(&mut self, view: ViewId);
    fn hide(&mut self, view: ViewId);
    fn set_title(&mut self, view: ViewId, title: &str);
    /// Close attempts on `view` must be reported back (as a close request to
    /// the workbench) instead of closing the view directly.
    fn on_close_requested(&mut self, view: ViewId);
}

/// Title configuration for both views.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewTitles {
    pub repl: String,
    pub editor: String,
    pub untitled: String,
    pub editing_prefix: String,
}

impl Default for ViewTitles {
    fn default() -> Self {
        Self {
            repl: "Daemonium Bibliotheca".to_string(),
            editor: "Daemonium Bibliotheca Editor".to_string(),
            untitled: "New File".to_string(),
            editing_prefix: "Editing: ".to_string(),
        }
    }
}

impl ViewTitles {
    /// Title for an editor showing `file_name`.
    pub fn editing(&self, file_name: &str) -> String {
        format!("{}{}", self.editing_prefix, file_name)
    }
}

#[derive(Debug, Clone)]
struct ViewSlot {
    title: String,
    visible: bool,
}

#[derive(Debug)]
pub struct ViewRegistry {
    repl: ViewSlot,
    editor: ViewSlot,
}

impl ViewRegistry {
    /// Create both views: the REPL view shown, the editor view hidden with its
    /// close requests intercepted.
    /// Only `Workbench::new` builds a registry.
    pub(crate) fn create(host: &mut dyn ViewHost, titles: &ViewTitles) -> Self {
        host.set_title(ViewId::Repl, &titles.repl);
        host.set_title(ViewId::Editor, &titles.editor);
        host.on_close_requested(ViewId::Editor);
        host.show(ViewId::Repl);
        debug!(target: "views", "views_created");
        Self {
            repl: ViewSlot {
                title: titles.repl.clone(),
                visible: true,
            },
            editor: ViewSlot {
                title: titles.editor.clone(),
                visible: false,
            },
        }
    }

    /// Load `content` into the session (clean, with `path` as backing file)
    /// and surface the editor view under `title`.
    pub fn open_document_in_editor(
        &mut self,
        host: &mut dyn ViewHost,
        session: &mut EditorSession,
        content: &str,
        title: &str,
        path: Option<PathBuf>,
    ) {
        session.load(path, content);
        self.surface_editor(host, title);
    }

    /// Retitle and show the editor view over whatever the session now holds.
    pub fn surface_editor(&mut self, host: &mut dyn ViewHost, title: &str) {
        self.set_title(host, ViewId::Editor, title);
        self.show(host, ViewId::Editor);
    }

    pub fn set_title(&mut self, host: &mut dyn ViewHost, view: ViewId, title: &str) {
        host.set_title(view, title);
        self.slot_mut(view).title = title.to_string();
        debug!(target: "views", view = view.as_str(), title, "view_title_set");
    }

    pub fn show(&mut self, host: &mut dyn ViewHost, view: ViewId) {
        host.show(view);
        self.slot_mut(view).visible = true;
        debug!(target: "views", view = view.as_str(), "view_shown");
    }

    pub fn hide(&mut self, host: &mut dyn ViewHost, view: ViewId) {
        host.hide(view);
        self.slot_mut(view).visible = false;
        debug!(target: "views", view = view.as_str(), "view_hidden");
    }

    pub fn is_visible(&self, view: ViewId) -> bool {
        self.slot(view).visible
    }

    pub fn title(&self, view: ViewId) -> &str {
        &self.slot(view).title
    }

    fn slot(&self, view: ViewId) -> &ViewSlot {
        match view {
            ViewId::Repl => &self.repl,
            ViewId::Editor => &self.editor,
        }
    }

    fn slot_mut(&mut self, view: ViewId) -> &mut ViewSlot {
        match view {
            ViewId::Repl => &mut self.repl,
            ViewId::Editor => &mut self.editor,
        }
    }
}
