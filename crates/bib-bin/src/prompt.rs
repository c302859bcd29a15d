//! Line-based picker and close confirmation.
//!
//! Both read their answer as the next line from the event channel the REPL
//! itself consumes. An empty line means no selection; end of input answers
//! `Cancel` and marks the input closed so the loop can stop afterwards.

use crate::host::Console;
use core_actions::{
    CloseChoice, ConfirmationPrompt, ConfirmationRequest, DestinationPicker, PickRequest,
};
use core_events::{Event, InputEvent};
use core_terminal::{LineStyle, TerminalBackend};
use crossbeam_channel::Receiver;
use std::cell::Cell;
use std::path::PathBuf;
use tracing::debug;

pub struct PromptInput<'a> {
    rx: &'a Receiver<Event>,
    closed: Cell<bool>,
}

impl<'a> PromptInput<'a> {
    pub fn new(rx: &'a Receiver<Event>) -> Self {
        Self {
            rx,
            closed: Cell::new(false),
        }
    }

    pub fn is_closed(&self) -> bool {
        self.closed.get()
    }

    fn next_line(&self) -> Option<String> {
        if self.closed.get() {
            return None;
        }
        match self.rx.recv() {
            Ok(Event::Input(InputEvent::Line(line))) => Some(line),
            Ok(Event::Shutdown) | Err(_) => {
                debug!(target: "runtime", "prompt_input_closed");
                self.closed.set(true);
                None
            }
        }
    }
}

pub struct LinePicker<'a, B> {
    input: &'a PromptInput<'a>,
    console: Console<B>,
}

impl<'a, B: TerminalBackend> LinePicker<'a, B> {
    pub fn new(input: &'a PromptInput<'a>, console: Console<B>) -> Self {
        Self { input, console }
    }
}

impl<B: TerminalBackend> DestinationPicker for LinePicker<'_, B> {
    fn choose(&mut self, request: &PickRequest<'_>) -> Option<PathBuf> {
        let filters = request
            .filters
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("; ");
        self.console.line(request.title, LineStyle::Heading);
        if !filters.is_empty() {
            self.console.line(&filters, LineStyle::Notice);
        }
        self.console.prompt("path> ");
        match self.input.next_line() {
            Some(line) if !line.trim().is_empty() => Some(PathBuf::from(line.trim())),
            _ => {
                self.console.line("no file selected", LineStyle::Notice);
                None
            }
        }
    }
}

pub struct LineConfirm<'a, B> {
    input: &'a PromptInput<'a>,
    console: Console<B>,
}

impl<'a, B: TerminalBackend> LineConfirm<'a, B> {
    pub fn new(input: &'a PromptInput<'a>, console: Console<B>) -> Self {
        Self { input, console }
    }
}

fn parse_choice(answer: &str) -> Option<CloseChoice> {
    match answer.trim().to_ascii_lowercase().as_str() {
        "s" | "save" => Some(CloseChoice::Save),
        "a" | "saveas" | "save as" => Some(CloseChoice::SaveAs),
        "d" | "discard" => Some(CloseChoice::Discard),
        "" | "c" | "cancel" => Some(CloseChoice::Cancel),
        _ => None,
    }
}

impl<B: TerminalBackend> ConfirmationPrompt for LineConfirm<'_, B> {
    fn confirm(&mut self, request: &ConfirmationRequest) -> CloseChoice {
        if let Some(failure) = request.last_failure() {
            self.console
                .line(&format!("save failed: {failure}"), LineStyle::Error);
        }
        self.console.line(
            &format!("\"{}\" has unsaved changes.", request.document()),
            LineStyle::Heading,
        );
        loop {
            self.console.prompt("[s]ave, save [a]s, [d]iscard, [c]ancel? ");
            let Some(answer) = self.input.next_line() else {
                return CloseChoice::Cancel;
            };
            match parse_choice(&answer) {
                Some(choice) => return choice,
                None => self
                    .console
                    .line("answer s, a, d or c", LineStyle::Notice),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_actions::{CloseGuard, CloseStep, FileFilter, PickPurpose};
    use core_events::event_channel;
    use core_state::EditorSession;
    use core_terminal::CrosstermBackend;

    fn pending() -> ConfirmationRequest {
        let mut session = EditorSession::new();
        session.load(Some(PathBuf::from("rite.ritual")), "old");
        session.buffer_mut().insert_at(0, "new ").unwrap();
        match CloseGuard::request_close(&session) {
            CloseStep::Confirm(request) => request,
            other => panic!("expected Confirm, got {:?}", other),
        }
    }

    fn console() -> Console<CrosstermBackend<Vec<u8>>> {
        Console::new(CrosstermBackend::plain(Vec::new()))
    }

    fn request(filters: &[FileFilter]) -> PickRequest<'_> {
        PickRequest {
            purpose: PickPurpose::SaveAs,
            title: "Save As",
            filters,
        }
    }

    #[test]
    fn picker_returns_trimmed_path() {
        let (tx, rx) = event_channel();
        tx.send(Event::line("  out/rite.ritual ")).unwrap();
        let input = PromptInput::new(&rx);
        let console = console();
        let filters = [FileFilter::new("Ritual", &["*.ritual"])];
        let mut picker = LinePicker::new(&input, console.clone());
        assert_eq!(
            picker.choose(&request(&filters)),
            Some(PathBuf::from("out/rite.ritual"))
        );
        let shown = console.with_backend(|b| String::from_utf8_lossy(b.writer()).into_owned());
        assert!(shown.contains("Ritual (*.ritual)"));
    }

    #[test]
    fn picker_empty_line_is_no_selection() {
        let (tx, rx) = event_channel();
        tx.send(Event::line("")).unwrap();
        let input = PromptInput::new(&rx);
        let mut picker = LinePicker::new(&input, console());
        assert_eq!(picker.choose(&request(&[])), None);
        assert!(!input.is_closed());
    }

    #[test]
    fn confirm_reasks_until_recognized() {
        let (tx, rx) = event_channel();
        tx.send(Event::line("maybe")).unwrap();
        tx.send(Event::line("D")).unwrap();
        let input = PromptInput::new(&rx);
        let mut confirm = LineConfirm::new(&input, console());
        let req = pending();
        assert_eq!(confirm.confirm(&req), CloseChoice::Discard);
    }

    #[test]
    fn end_of_input_cancels_and_closes() {
        let (tx, rx) = event_channel();
        tx.send(Event::Shutdown).unwrap();
        let input = PromptInput::new(&rx);
        let mut confirm = LineConfirm::new(&input, console());
        let req = pending();
        assert_eq!(confirm.confirm(&req), CloseChoice::Cancel);
        assert!(input.is_closed());
        assert_eq!(confirm.confirm(&req), CloseChoice::Cancel);
    }

    #[test]
    fn choices_parse() {
        assert_eq!(parse_choice("save"), Some(CloseChoice::Save));
        assert_eq!(parse_choice("a"), Some(CloseChoice::SaveAs));
        assert_eq!(parse_choice(""), Some(CloseChoice::Cancel));
        assert_eq!(parse_choice("x"), None);
    }
}
