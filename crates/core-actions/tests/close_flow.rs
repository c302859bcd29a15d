mod common;
use common::*;

use core_actions::{CloseChoice, CloseGuard, CloseReason, CloseResolution, SaveCoordinator};
use core_state::EditorSession;
use std::path::{Path, PathBuf};

fn dirty_at(path: &str) -> EditorSession {
    let mut s = EditorSession::new();
    s.load(Some(PathBuf::from(path)), "ritual text");
    s.buffer_mut().insert_at(0, "edited ").unwrap();
    s
}

#[test]
fn clean_session_never_prompts() {
    let mut session = EditorSession::new();
    session.load(Some(PathBuf::from("clean.ritual")), "unchanged");
    let mut coord = SaveCoordinator::new(ScriptedDisk::default());
    let mut picker = ScriptedPicker::new(vec![]);
    let mut prompt = ScriptedPrompt::new(&[]);
    let out = CloseGuard::run(&mut session, &mut coord, &mut picker, &mut prompt);
    assert_eq!(out, CloseResolution::Closed(CloseReason::Clean));
    assert_eq!(prompt.presented(), 0);
}

#[test]
fn dirty_session_prompts_exactly_once_when_save_succeeds() {
    let mut session = dirty_at("a.ritual");
    let mut coord = SaveCoordinator::new(ScriptedDisk::default());
    let mut picker = ScriptedPicker::new(vec![]);
    let mut prompt = ScriptedPrompt::new(&[CloseChoice::Save]);
    let out = CloseGuard::run(&mut session, &mut coord, &mut picker, &mut prompt);
    assert_eq!(
        out,
        CloseResolution::Closed(CloseReason::Saved(PathBuf::from("a.ritual")))
    );
    assert_eq!(prompt.presented(), 1);
    assert_eq!(picker.requests, 0, "existing path is overwritten without picking");
    assert!(!session.is_dirty());
    assert_eq!(
        coord.persistence_mut().files.get(Path::new("a.ritual")).map(String::as_str),
        Some("edited ritual text")
    );
}

#[test]
fn failed_save_re_presents_then_discard_closes() {
    let mut session = dirty_at("locked.ritual");
    let mut coord = SaveCoordinator::new(ScriptedDisk::failing(1));
    let mut picker = ScriptedPicker::new(vec![]);
    let mut prompt = ScriptedPrompt::new(&[CloseChoice::Save, CloseChoice::Discard]);
    let out = CloseGuard::run(&mut session, &mut coord, &mut picker, &mut prompt);
    assert_eq!(out, CloseResolution::Closed(CloseReason::Discarded));
    assert_eq!(prompt.presented(), 2);
    let (_, attempt, failure) = &prompt.seen[1];
    assert_eq!(*attempt, 2);
    assert!(failure.as_deref().unwrap().contains("read-only"));
    assert!(session.is_dirty(), "nothing was written");
}

#[test]
fn failed_save_then_retry_succeeds() {
    let mut session = dirty_at("flaky.ritual");
    let mut coord = SaveCoordinator::new(ScriptedDisk::failing(1));
    let mut picker = ScriptedPicker::new(vec![]);
    let mut prompt = ScriptedPrompt::new(&[CloseChoice::Save, CloseChoice::Save]);
    let out = CloseGuard::run(&mut session, &mut coord, &mut picker, &mut prompt);
    assert!(out.is_closed());
    assert_eq!(coord.persistence_mut().write_attempts, 2);
    assert!(!session.is_dirty());
}

#[test]
fn save_as_cancelled_pick_returns_to_prompt_then_cancel_keeps_open() {
    let mut session = dirty_at("orig.ritual");
    let before = session.buffer().text();
    let mut coord = SaveCoordinator::new(ScriptedDisk::default());
    let mut picker = ScriptedPicker::new(vec![None]);
    let mut prompt = ScriptedPrompt::new(&[CloseChoice::SaveAs, CloseChoice::Cancel]);
    let out = CloseGuard::run(&mut session, &mut coord, &mut picker, &mut prompt);
    assert_eq!(out, CloseResolution::KeptOpen);
    assert_eq!(prompt.presented(), 2);
    assert_eq!(session.backing_path(), Some(Path::new("orig.ritual")));
    assert_eq!(session.buffer().text(), before);
    assert!(coord.persistence_mut().files.is_empty());
}

#[test]
fn untitled_save_goes_through_picker() {
    let mut session = EditorSession::new();
    session.buffer_mut().insert_at(0, "new rite").unwrap();
    let mut coord = SaveCoordinator::new(ScriptedDisk::default());
    let mut picker = ScriptedPicker::new(vec![Some(PathBuf::from("chosen.ritual"))]);
    let mut prompt = ScriptedPrompt::new(&[CloseChoice::Save]);
    let out = CloseGuard::run(&mut session, &mut coord, &mut picker, &mut prompt);
    assert_eq!(
        out,
        CloseResolution::Closed(CloseReason::Saved(PathBuf::from("chosen.ritual")))
    );
    assert_eq!(prompt.seen[0].0, "untitled");
    assert_eq!(session.backing_path(), Some(Path::new("chosen.ritual")));
}

#[test]
fn untouched_new_document_closes_without_prompt() {
    let mut session = EditorSession::new();
    session.load(None, "");
    let mut coord = SaveCoordinator::new(ScriptedDisk::default());
    let mut picker = ScriptedPicker::new(vec![]);
    let mut prompt = ScriptedPrompt::new(&[]);
    let out = CloseGuard::run(&mut session, &mut coord, &mut picker, &mut prompt);
    assert_eq!(out, CloseResolution::Closed(CloseReason::Clean));
}

#[test]
fn blocked_close_is_logged_under_close_guard_target() {
    use std::io::Write;
    use std::sync::{Arc, Mutex};
    use tracing_subscriber::fmt::MakeWriter;

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);
    impl Write for Captured {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }
        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }
    impl<'a> MakeWriter<'a> for Captured {
        type Writer = Captured;
        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    let captured = Captured::default();
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .with_ansi(false)
        .without_time()
        .with_writer(captured.clone())
        .finish();

    let mut session = dirty_at("log.ritual");
    tracing::subscriber::with_default(subscriber, || {
        let mut coord = SaveCoordinator::new(ScriptedDisk::default());
        let mut picker = ScriptedPicker::new(vec![]);
        let mut prompt = ScriptedPrompt::new(&[CloseChoice::Cancel]);
        CloseGuard::run(&mut session, &mut coord, &mut picker, &mut prompt);
    });

    let output = String::from_utf8(captured.0.lock().unwrap().clone()).unwrap();
    assert!(output.contains("close_guard: close_blocked_dirty"));
    assert!(output.contains("close_aborted"));
}
