//! Close confirmation flow for the editor view.
//!
//! Modelled as an explicit state machine instead of a modal dialog:
//!
//! ```text
//! request_close ──clean──▶ Allow(Clean)
//!      │dirty
//!      ▼
//! Confirm(request) ──Save/SaveAs ok──▶ Allow(Saved)
//!      ▲    │       ──Discard──────▶ Allow(Discarded)
//!      │    │       ──Cancel───────▶ KeepOpen
//!      └────┘ save failed / destination pick cancelled
//! ```
//!
//! A pending confirmation is a `ConfirmationRequest` token that is consumed by
//! `resolve`, so a confirmation cannot be answered twice and no other close can
//! be started against the same session while one is outstanding. A failed
//! save always loops back to `Confirm`; the view is never closed with
//! unresolved dirty state.

use crate::io_ops::{DestinationPicker, IoFailure, Persistence, SaveCoordinator, SaveOutcome};
use core_state::EditorSession;
use std::path::PathBuf;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseChoice {
    Save,
    SaveAs,
    Discard,
    Cancel,
}

/// Why a close was allowed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CloseReason {
    Clean,
    Saved(PathBuf),
    Discarded,
}

#[derive(Debug, PartialEq, Eq)]
pub enum CloseStep {
    Allow(CloseReason),
    Confirm(ConfirmationRequest),
    KeepOpen,
}

/// Terminal result of a driven close flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CloseResolution {
    Closed(CloseReason),
    KeptOpen,
}

impl CloseResolution {
    pub fn is_closed(&self) -> bool {
        matches!(self, CloseResolution::Closed(_))
    }
}

/// Pending decision point. Not `Clone`: answering it consumes it.
#[derive(Debug, PartialEq, Eq)]
pub struct ConfirmationRequest {
    document: String,
    attempt: u32,
    last_failure: Option<String>,
}

impl ConfirmationRequest {
    fn first(session: &EditorSession) -> Self {
        Self {
            document: session.file_name().unwrap_or_else(|| "untitled".to_string()),
            attempt: 1,
            last_failure: None,
        }
    }

    fn retry(self, failure: Option<String>) -> Self {
        Self {
            attempt: self.attempt + 1,
            last_failure: failure,
            ..self
        }
    }

    /// Display name of the document with pending changes.
    pub fn document(&self) -> &str {
        &self.document
    }

    /// 1 for the first presentation, incremented on every re-presentation.
    pub fn attempt(&self) -> u32 {
        self.attempt
    }

    /// Error message of the save that sent the flow back here, if any.
    pub fn last_failure(&self) -> Option<&str> {
        self.last_failure.as_deref()
    }

    /// Apply the user's choice.
    pub fn resolve<P: Persistence>(
        self,
        choice: CloseChoice,
        session: &mut EditorSession,
        coordinator: &mut SaveCoordinator<P>,
        picker: &mut dyn DestinationPicker,
    ) -> CloseStep {
        info!(target: "close_guard", ?choice, attempt = self.attempt, "close_choice");
        match choice {
            CloseChoice::Discard => CloseStep::Allow(CloseReason::Discarded),
            CloseChoice::Cancel => CloseStep::KeepOpen,
            CloseChoice::Save => {
                let result = coordinator.save(session, picker);
                self.after_save(result)
            }
            CloseChoice::SaveAs => {
                let result = coordinator.save_as(session, picker);
                self.after_save(result)
            }
        }
    }

    fn after_save(self, result: Result<SaveOutcome, IoFailure>) -> CloseStep {
        match result {
            Ok(SaveOutcome::Saved(path)) => CloseStep::Allow(CloseReason::Saved(path)),
            Ok(SaveOutcome::Cancelled) => CloseStep::Confirm(self.retry(None)),
            Err(e) => {
                warn!(target: "close_guard", error = %e, "close_save_failed");
                CloseStep::Confirm(self.retry(Some(e.to_string())))
            }
        }
    }
}

/// Presents a confirmation and returns the user's choice.
pub trait ConfirmationPrompt {
    fn confirm(&mut self, request: &ConfirmationRequest) -> CloseChoice;
}

impl<F> ConfirmationPrompt for F
where
    F: FnMut(&ConfirmationRequest) -> CloseChoice,
{
    fn confirm(&mut self, request: &ConfirmationRequest) -> CloseChoice {
        self(request)
    }
}

pub struct CloseGuard;

impl CloseGuard {
    /// Start a close attempt: clean sessions close immediately, dirty ones
    /// yield a confirmation request.
    pub fn request_close(session: &EditorSession) -> CloseStep {
        if session.is_dirty() {
            info!(target: "close_guard", "close_blocked_dirty");
            CloseStep::Confirm(ConfirmationRequest::first(session))
        } else {
            CloseStep::Allow(CloseReason::Clean)
        }
    }

    /// Drive the flow to a terminal outcome, presenting the prompt as often
    /// as the state machine asks for it.
    pub fn run<P: Persistence>(
        session: &mut EditorSession,
        coordinator: &mut SaveCoordinator<P>,
        picker: &mut dyn DestinationPicker,
        prompt: &mut dyn ConfirmationPrompt,
    ) -> CloseResolution {
        let mut step = Self::request_close(session);
        loop {
            step = match step {
                CloseStep::Allow(reason) => {
                    info!(target: "close_guard", ?reason, "close_allowed");
                    return CloseResolution::Closed(reason);
                }
                CloseStep::KeepOpen => {
                    info!(target: "close_guard", "close_aborted");
                    return CloseResolution::KeptOpen;
                }
                CloseStep::Confirm(request) => {
                    let choice = prompt.confirm(&request);
                    request.resolve(choice, session, coordinator, picker)
                }
            };
        }
    }
}
