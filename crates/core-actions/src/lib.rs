//! Editing actions over the single editor session.
//!
//! * `clipboard`   - copy / cut / paste between a buffer and the clipboard
//! * `io_ops`      - save, save-as and open (the I/O boundary)
//! * `close_guard` - confirmation flow gating editor view closure
//!
//! Every external collaborator (clipboard, disk, destination picker,
//! confirmation prompt) sits behind a trait so hosts plug in their own
//! presentation and tests run without a UI.

pub mod clipboard;
pub mod close_guard;
pub mod io_ops;

pub use clipboard::{
    Clipboard, ClipboardBridge, ClipboardError, EditError, MemoryClipboard, PasteOutcome,
    SystemClipboard,
};
pub use close_guard::{
    CloseChoice, CloseGuard, CloseReason, CloseResolution, CloseStep, ConfirmationPrompt,
    ConfirmationRequest,
};
pub use io_ops::{
    DestinationPicker, FileFilter, FsPersistence, IoFailure, Persistence, PickPurpose,
    PickRequest, SaveCoordinator, SaveOutcome,
};
