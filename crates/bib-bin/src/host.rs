//! Terminal view surface.
//!
//! Both views share one terminal. Showing a view prints its banner and makes
//! its title the terminal title; hiding the focused view hands focus back to
//! the REPL view.

use core_model::{ViewHost, ViewId};
use core_terminal::{LineStyle, TerminalBackend};
use std::cell::RefCell;
use std::rc::Rc;
use tracing::{debug, warn};

/// Shared handle on the terminal backend. The host and the prompts write to
/// the same terminal on the main thread.
pub struct Console<B> {
    inner: Rc<RefCell<B>>,
}

impl<B> Clone for Console<B> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<B: TerminalBackend> Console<B> {
    pub fn new(backend: B) -> Self {
        Self {
            inner: Rc::new(RefCell::new(backend)),
        }
    }

    pub fn line(&self, text: &str, style: LineStyle) {
        if let Err(e) = self.inner.borrow_mut().write_line(text, style) {
            warn!(target: "runtime", error = %e, "terminal_write_failed");
        }
    }

    pub fn prompt(&self, text: &str) {
        if let Err(e) = self.inner.borrow_mut().write_prompt(text) {
            warn!(target: "runtime", error = %e, "terminal_write_failed");
        }
    }

    pub fn title(&self, text: &str) {
        if let Err(e) = self.inner.borrow_mut().set_title(text) {
            warn!(target: "runtime", error = %e, "terminal_title_failed");
        }
    }

    #[cfg(test)]
    pub fn with_backend<R>(&self, f: impl FnOnce(&B) -> R) -> R {
        f(&self.inner.borrow())
    }
}

pub struct TerminalHost<B> {
    console: Console<B>,
    repl_title: String,
    editor_title: String,
    focused: ViewId,
}

impl<B: TerminalBackend> TerminalHost<B> {
    pub fn new(console: Console<B>) -> Self {
        Self {
            console,
            repl_title: String::new(),
            editor_title: String::new(),
            focused: ViewId::Repl,
        }
    }

    pub fn focused(&self) -> ViewId {
        self.focused
    }

    fn title_of(&self, view: ViewId) -> &str {
        match view {
            ViewId::Repl => &self.repl_title,
            ViewId::Editor => &self.editor_title,
        }
    }
}

impl<B: TerminalBackend> ViewHost for TerminalHost<B> {
    fn show(&mut self, view: ViewId) {
        self.focused = view;
        let title = self.title_of(view).to_string();
        self.console.line(&format!("== {title} =="), LineStyle::Heading);
        self.console.title(&title);
    }

    fn hide(&mut self, view: ViewId) {
        self.console
            .line(&format!("({} closed)", self.title_of(view)), LineStyle::Notice);
        if self.focused == view {
            self.focused = ViewId::Repl;
            let repl = self.repl_title.clone();
            self.console.title(&repl);
        }
    }

    fn set_title(&mut self, view: ViewId, title: &str) {
        match view {
            ViewId::Repl => self.repl_title = title.to_string(),
            ViewId::Editor => self.editor_title = title.to_string(),
        }
        if self.focused == view {
            self.console.title(title);
        }
    }

    // `:close` and `:q` are the only close attempts; the runtime routes both
    // through the workbench.
    fn on_close_requested(&mut self, view: ViewId) {
        debug!(target: "views", view = view.as_str(), "close_interception_registered");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_terminal::CrosstermBackend;

    fn host() -> (TerminalHost<CrosstermBackend<Vec<u8>>>, Console<CrosstermBackend<Vec<u8>>>) {
        let console = Console::new(CrosstermBackend::plain(Vec::new()));
        (TerminalHost::new(console.clone()), console)
    }

    fn written(console: &Console<CrosstermBackend<Vec<u8>>>) -> String {
        console.with_backend(|b| String::from_utf8_lossy(b.writer()).into_owned())
    }

    #[test]
    fn show_prints_banner_and_focuses() {
        let (mut host, console) = host();
        host.set_title(ViewId::Editor, "New File");
        host.show(ViewId::Editor);
        assert_eq!(host.focused(), ViewId::Editor);
        assert_eq!(written(&console), "== New File ==\n");
    }

    #[test]
    fn hiding_focused_view_returns_to_repl() {
        let (mut host, console) = host();
        host.set_title(ViewId::Repl, "Daemonium Bibliotheca");
        host.set_title(ViewId::Editor, "Editing: a.ritual");
        host.show(ViewId::Editor);
        host.hide(ViewId::Editor);
        assert_eq!(host.focused(), ViewId::Repl);
        assert!(written(&console).ends_with("(Editing: a.ritual closed)\n"));
    }
}
