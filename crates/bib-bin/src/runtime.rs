//! Event loop: REPL commands and direct typing against the workbench.

use crate::commands::{CommandParser, HELP, ParsedCommand};
use crate::host::{Console, TerminalHost};
use crate::prompt::{LineConfirm, LinePicker, PromptInput};
use core_actions::{CloseReason, CloseResolution, PasteOutcome, SaveOutcome};
use core_events::{Event, InputEvent};
use core_model::{ViewId, Workbench};
use core_terminal::{LineStyle, TerminalBackend};
use core_text::Selection;
use crossbeam_channel::Receiver;
use std::fmt;
use std::ops::ControlFlow;
use std::path::Path;
use tracing::{debug, error, info, warn};

pub type Shell<B> = Workbench<TerminalHost<B>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownReason {
    CommandQuit,
    InputClosed,
    ChannelClosed,
}

impl ShutdownReason {
    fn as_str(&self) -> &'static str {
        match self {
            ShutdownReason::CommandQuit => "command_quit",
            ShutdownReason::InputClosed => "input_closed",
            ShutdownReason::ChannelClosed => "channel_closed",
        }
    }
}

impl fmt::Display for ShutdownReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

type Step = ControlFlow<ShutdownReason>;

pub struct ShellRuntime<B: TerminalBackend> {
    workbench: Shell<B>,
    console: Console<B>,
    rx: Receiver<Event>,
}

impl<B: TerminalBackend + 'static> ShellRuntime<B> {
    pub fn new(workbench: Shell<B>, console: Console<B>, rx: Receiver<Event>) -> Self {
        Self {
            workbench,
            console,
            rx,
        }
    }

    pub fn workbench(&self) -> &Shell<B> {
        &self.workbench
    }

    /// Open the startup document, if any. A failure is reported and the shell
    /// starts with only the REPL view.
    pub fn open_initial(&mut self, path: Option<&Path>) {
        let Some(path) = path else {
            return;
        };
        if let Err(e) = self.workbench.open_file(path) {
            self.console.line(&e.to_string(), LineStyle::Error);
        }
    }

    pub fn run(&mut self) -> ShutdownReason {
        let span = tracing::debug_span!(target: "runtime", "event_loop");
        let _enter_loop = span.enter();
        self.console
            .line("type :help for commands", LineStyle::Notice);

        let reason = loop {
            self.console.prompt(match self.workbench.host().focused() {
                ViewId::Repl => "repl> ",
                ViewId::Editor => "edit> ",
            });
            let event = match self.rx.recv() {
                Ok(event) => event,
                Err(_) => break ShutdownReason::ChannelClosed,
            };
            let step = match event {
                Event::Input(InputEvent::Line(line)) => self.handle_line(&line),
                Event::Shutdown => Step::Break(ShutdownReason::InputClosed),
            };
            if let ControlFlow::Break(reason) = step {
                break reason;
            }
        };

        if reason != ShutdownReason::CommandQuit && self.workbench.session().is_dirty() {
            warn!(target: "runtime", reason = reason.as_str(), "shutdown_with_unsaved_changes");
        }
        info!(target: "runtime", reason = reason.as_str(), "shutdown");
        reason
    }

    fn handle_line(&mut self, line: &str) -> Step {
        if line.trim_start().starts_with(':') {
            let command = CommandParser::parse(line);
            debug!(target: "runtime.command", command = command.name(), "command_parsed");
            return self.execute(command);
        }
        if line.trim().is_empty() {
            return Step::Continue(());
        }
        if !self.editor_visible() {
            self.console.line(
                "no document open (:new or :open, :help for commands)",
                LineStyle::Notice,
            );
            return Step::Continue(());
        }
        let mut typed = line.to_string();
        typed.push('\n');
        if let Err(e) = self.workbench.type_text(&typed) {
            self.console.line(&e.to_string(), LineStyle::Error);
        }
        Step::Continue(())
    }

    fn execute(&mut self, command: ParsedCommand) -> Step {
        match command {
            ParsedCommand::New => {
                if self.release_document()? {
                    self.workbench.new_file();
                }
            }
            ParsedCommand::Open(Some(path)) => {
                if self.release_document()? {
                    if let Err(e) = self.workbench.open_file(&path) {
                        self.console.line(&e.to_string(), LineStyle::Error);
                    }
                }
            }
            ParsedCommand::Open(None) => {
                if self.release_document()? {
                    let (result, closed) =
                        self.with_prompts(|wb, picker, _| wb.open_with_picker(picker));
                    match result {
                        Ok(Some(_)) => {}
                        Ok(None) => self.console.line("open cancelled", LineStyle::Notice),
                        Err(e) => self.console.line(&e.to_string(), LineStyle::Error),
                    }
                    input_still_open(closed)?;
                }
            }
            ParsedCommand::Save if self.require_editor() => self.save(false)?,
            ParsedCommand::SaveAs if self.require_editor() => self.save(true)?,
            ParsedCommand::Close if self.require_editor() => {
                self.close_editor()?;
            }
            ParsedCommand::Quit => {
                if self.editor_visible() && !self.close_editor()? {
                    return Step::Continue(());
                }
                return Step::Break(ShutdownReason::CommandQuit);
            }
            ParsedCommand::Copy { start, end } if self.require_editor() => {
                match self.workbench.copy(Selection::new(start, end)) {
                    Ok(text) => self.notice_chars("copied", text.chars().count()),
                    Err(e) => self.console.line(&e.to_string(), LineStyle::Error),
                }
            }
            ParsedCommand::Cut { start, end } if self.require_editor() => {
                match self.workbench.cut(Selection::new(start, end)) {
                    Ok(text) => self.notice_chars("cut", text.chars().count()),
                    Err(e) => self.console.line(&e.to_string(), LineStyle::Error),
                }
            }
            ParsedCommand::Paste(offset) if self.require_editor() => {
                let caret = offset.unwrap_or_else(|| self.workbench.session().buffer().caret());
                match self.workbench.paste(caret) {
                    Ok(PasteOutcome::Inserted { chars }) => self.notice_chars("pasted", chars),
                    Ok(PasteOutcome::NonTextualClipboard) => self
                        .console
                        .line("clipboard holds no text", LineStyle::Notice),
                    Err(e) => self.console.line(&e.to_string(), LineStyle::Error),
                }
            }
            ParsedCommand::Insert { offset, text } if self.require_editor() => {
                if let Err(e) = self.workbench.insert_text(offset, &text) {
                    self.console.line(&e.to_string(), LineStyle::Error);
                }
            }
            ParsedCommand::Delete { start, end } if self.require_editor() => {
                let buffer = self.workbench.session_mut().buffer_mut();
                match buffer.delete_range(start, end) {
                    Ok(removed) => self.notice_chars("deleted", removed.chars().count()),
                    Err(e) => self.console.line(&e.to_string(), LineStyle::Error),
                }
            }
            ParsedCommand::Caret(offset) if self.require_editor() => {
                let buffer = self.workbench.session_mut().buffer_mut();
                if let Err(e) = buffer.set_caret(offset) {
                    self.console.line(&e.to_string(), LineStyle::Error);
                }
            }
            ParsedCommand::Print if self.require_editor() => self.print_document(),
            ParsedCommand::Status => self.print_status(),
            ParsedCommand::Help => {
                for (usage, text) in HELP {
                    self.console
                        .line(&format!("  {usage:<22}{text}"), LineStyle::Plain);
                }
            }
            ParsedCommand::Invalid { usage } => self
                .console
                .line(&format!("usage: {usage}"), LineStyle::Error),
            ParsedCommand::Unknown(name) => self
                .console
                .line(&format!("unknown command: :{name}"), LineStyle::Error),
            // Editor-only commands while the editor is hidden; `require_editor`
            // already reported it.
            _ => {}
        }
        Step::Continue(())
    }

    fn save(&mut self, save_as: bool) -> Step {
        let (result, closed) = self.with_prompts(|wb, picker, _| {
            if save_as {
                wb.save_as(picker)
            } else {
                wb.save(picker)
            }
        });
        match result {
            Ok(SaveOutcome::Saved(path)) => self
                .console
                .line(&format!("saved {}", path.display()), LineStyle::Notice),
            Ok(SaveOutcome::Cancelled) => self.console.line("save cancelled", LineStyle::Notice),
            Err(e) => self.console.line(&e.to_string(), LineStyle::Error),
        }
        input_still_open(closed)
    }

    /// Run the close flow on the editor view. `Continue(true)` when it closed.
    fn close_editor(&mut self) -> ControlFlow<ShutdownReason, bool> {
        let (resolution, closed) = self.with_prompts(|wb, picker, confirm| {
            wb.request_close(ViewId::Editor, picker, confirm)
        });
        match &resolution {
            CloseResolution::Closed(CloseReason::Saved(path)) => self
                .console
                .line(&format!("saved {}", path.display()), LineStyle::Notice),
            CloseResolution::Closed(CloseReason::Discarded) => {
                self.console.line("changes discarded", LineStyle::Notice)
            }
            CloseResolution::Closed(CloseReason::Clean) => {}
            CloseResolution::KeptOpen => self.console.line("close cancelled", LineStyle::Notice),
        }
        input_still_open(closed)?;
        ControlFlow::Continue(resolution.is_closed())
    }

    /// Before another document replaces a visible one with unsaved edits, run
    /// the close flow. `Continue(false)` when the user kept the current one.
    fn release_document(&mut self) -> ControlFlow<ShutdownReason, bool> {
        if !self.editor_visible() || !self.workbench.session().is_dirty() {
            return ControlFlow::Continue(true);
        }
        self.close_editor()
    }

    fn with_prompts<R>(
        &mut self,
        f: impl FnOnce(&mut Shell<B>, &mut LinePicker<'_, B>, &mut LineConfirm<'_, B>) -> R,
    ) -> (R, bool) {
        let input = PromptInput::new(&self.rx);
        let mut picker = LinePicker::new(&input, self.console.clone());
        let mut confirm = LineConfirm::new(&input, self.console.clone());
        let out = f(&mut self.workbench, &mut picker, &mut confirm);
        (out, input.is_closed())
    }

    fn editor_visible(&self) -> bool {
        self.workbench.registry().is_visible(ViewId::Editor)
    }

    fn require_editor(&self) -> bool {
        let visible = self.editor_visible();
        if !visible {
            self.console
                .line("no document open (:new or :open)", LineStyle::Notice);
        }
        visible
    }

    fn notice_chars(&self, verb: &str, chars: usize) {
        self.console
            .line(&format!("{verb} {chars} chars"), LineStyle::Notice);
    }

    fn print_document(&self) {
        let buffer = self.workbench.session().buffer();
        let text = buffer.text();
        for (idx, line) in text.split('\n').enumerate() {
            self.console
                .line(&format!("{:>4} | {line}", idx + 1), LineStyle::Plain);
        }
    }

    fn print_status(&self) {
        let status = self.workbench.status();
        let marker = if status.dirty { " [modified]" } else { "" };
        self.console
            .line(&format!("{}{marker}", status.document), LineStyle::Heading);
        if let Some(path) = &status.path {
            self.console
                .line(&format!("path: {}", path.display()), LineStyle::Plain);
        }
        self.console.line(
            &format!(
                "line endings: {}  chars: {}  caret: {}",
                status.line_ending.label(),
                status.chars,
                status.caret
            ),
            LineStyle::Plain,
        );
        self.console
            .line(&format!("sha256: {}", status.fingerprint), LineStyle::Notice);
    }
}

fn input_still_open(prompt_input_closed: bool) -> ControlFlow<ShutdownReason> {
    if prompt_input_closed {
        error!(target: "runtime", "input_closed_during_prompt");
        return ControlFlow::Break(ShutdownReason::InputClosed);
    }
    ControlFlow::Continue(())
}
