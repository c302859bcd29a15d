//! Core event types and channel helpers for the shell's event loop.

use std::sync::atomic::{AtomicU64, Ordering};

use crossbeam_channel::{Receiver, Sender, bounded};

// The loop uses a bounded channel sized by `EVENT_CHANNEL_CAP`. The input
// thread blocks on `send` when the loop falls behind rather than dropping lines.
pub const EVENT_CHANNEL_CAP: usize = 1024;

pub static CHANNEL_SEND_FAILURES: AtomicU64 = AtomicU64::new(0);

/// Top-level event enum consumed by the central event loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Input(InputEvent),
    Shutdown,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputEvent {
    /// One line of input with its line terminator stripped.
    Line(String),
}

impl Event {
    pub fn line(text: impl Into<String>) -> Self {
        Event::Input(InputEvent::Line(text.into()))
    }
}

pub fn event_channel() -> (Sender<Event>, Receiver<Event>) {
    bounded(EVENT_CHANNEL_CAP)
}

/// Send `event`, recording a failure when the receiver is gone.
/// Returns false once the loop has shut down.
pub fn send_event(tx: &Sender<Event>, event: Event) -> bool {
    match tx.send(event) {
        Ok(()) => true,
        Err(_) => {
            CHANNEL_SEND_FAILURES.fetch_add(1, Ordering::Relaxed);
            tracing::debug!(target: "runtime", "event_channel_closed");
            false
        }
    }
}
