//! Blocking line reader feeding the event loop.
//!
//! The reader owns a `BufRead` (stdin in the binary, a cursor in tests) on a
//! dedicated thread. Each line is sent as `Event::Input(InputEvent::Line)` with
//! its terminator stripped; end of input or a read error sends
//! `Event::Shutdown` and ends the thread.

use std::io::BufRead;
use std::thread::{self, JoinHandle};

use core_events::{Event, send_event};
use crossbeam_channel::Sender;

#[inline]
pub(crate) fn log_line_read(line: &str) {
    tracing::trace!(target: "input", line_len = line.len(), "line_read");
}

fn strip_terminator(line: &mut String) {
    if line.ends_with('\n') {
        line.pop();
        if line.ends_with('\r') {
            line.pop();
        }
    }
}

/// Spawn the reader thread. The thread exits after sending `Shutdown` or when
/// the receiving side has gone away.
pub fn spawn_line_reader<R>(mut reader: R, tx: Sender<Event>) -> JoinHandle<()>
where
    R: BufRead + Send + 'static,
{
    thread::spawn(move || {
        tracing::debug!(target: "input", "line_reader_started");
        loop {
            let mut line = String::new();
            match reader.read_line(&mut line) {
                Ok(0) => {
                    tracing::debug!(target: "input", "line_reader_eof");
                    send_event(&tx, Event::Shutdown);
                    break;
                }
                Ok(_) => {
                    strip_terminator(&mut line);
                    log_line_read(&line);
                    if !send_event(&tx, Event::line(line)) {
                        break;
                    }
                }
                Err(e) => {
                    tracing::warn!(target: "input", error = %e, "line_reader_error");
                    send_event(&tx, Event::Shutdown);
                    break;
                }
            }
        }
    })
}
