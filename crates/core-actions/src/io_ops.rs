//! Save / save-as / open coordination.
//!
//! `SaveCoordinator` is the I/O boundary for the editor session. Disk access
//! goes through the `Persistence` trait and path selection through
//! `DestinationPicker`, so both can be replaced by the host (native dialogs)
//! or by tests (in-memory fakes).
//!
//! Failure policy: every I/O failure is logged and returned as `IoFailure`;
//! session state (`backing_path`, saved fingerprint, buffer) is only updated
//! after the disk operation succeeded. Writes are plain overwrite-in-place.
//! A cancelled pick is a normal outcome (`SaveOutcome::Cancelled`), not an error.

use core_state::EditorSession;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{error, info};

#[derive(Debug, Error)]
pub enum IoFailure {
    #[error("could not read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("could not write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl IoFailure {
    pub fn path(&self) -> &Path {
        match self {
            IoFailure::Read { path, .. } | IoFailure::Write { path, .. } => path,
        }
    }
}

/// Plain-text file persistence.
pub trait Persistence {
    fn read_text(&mut self, path: &Path) -> std::io::Result<String>;
    fn write_text(&mut self, path: &Path, text: &str) -> std::io::Result<()>;
}

/// `std::fs` backed persistence.
#[derive(Debug, Default, Clone, Copy)]
pub struct FsPersistence;

impl Persistence for FsPersistence {
    fn read_text(&mut self, path: &Path) -> std::io::Result<String> {
        if !path.is_file() {
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "not a regular file",
            ));
        }
        std::fs::read_to_string(path)
    }

    fn write_text(&mut self, path: &Path, text: &str) -> std::io::Result<()> {
        std::fs::write(path, text.as_bytes())
    }
}

/// Named group of accepted file patterns, e.g. `Ritual (*.ritual)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileFilter {
    pub description: String,
    pub patterns: Vec<String>,
}

impl FileFilter {
    pub fn new(description: impl Into<String>, patterns: &[&str]) -> Self {
        Self {
            description: description.into(),
            patterns: patterns.iter().map(|p| p.to_string()).collect(),
        }
    }
}

impl std::fmt::Display for FileFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.description, self.patterns.join(", "))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickPurpose {
    Open,
    SaveAs,
}

/// What the picker is asked to choose.
#[derive(Debug, Clone, Copy)]
pub struct PickRequest<'a> {
    pub purpose: PickPurpose,
    pub title: &'a str,
    pub filters: &'a [FileFilter],
}

/// Source / destination selection collaborator. `None` means no selection.
pub trait DestinationPicker {
    fn choose(&mut self, request: &PickRequest<'_>) -> Option<PathBuf>;
}

impl<F> DestinationPicker for F
where
    F: FnMut(&PickRequest<'_>) -> Option<PathBuf>,
{
    fn choose(&mut self, request: &PickRequest<'_>) -> Option<PathBuf> {
        self(request)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    Saved(PathBuf),
    /// The destination pick was cancelled; nothing changed.
    Cancelled,
}

pub struct SaveCoordinator<P: Persistence = FsPersistence> {
    persistence: P,
    open_filters: Vec<FileFilter>,
    save_filters: Vec<FileFilter>,
}

impl Default for SaveCoordinator<FsPersistence> {
    fn default() -> Self {
        Self::new(FsPersistence)
    }
}

impl<P: Persistence> SaveCoordinator<P> {
    /// Coordinator with the default filter set (`.ritual` and `.txt` for open,
    /// `.ritual` for save-as).
    pub fn new(persistence: P) -> Self {
        Self {
            persistence,
            open_filters: vec![
                FileFilter::new("Ritual", &["*.ritual"]),
                FileFilter::new("Text", &["*.txt"]),
            ],
            save_filters: vec![FileFilter::new("Ritual", &["*.ritual"])],
        }
    }

    pub fn with_filters(mut self, open: Vec<FileFilter>, save: Vec<FileFilter>) -> Self {
        self.open_filters = open;
        self.save_filters = save;
        self
    }

    pub fn persistence_mut(&mut self) -> &mut P {
        &mut self.persistence
    }

    /// Overwrite the backing file, or fall back to `save_as` when untitled.
    pub fn save(
        &mut self,
        session: &mut EditorSession,
        picker: &mut dyn DestinationPicker,
    ) -> Result<SaveOutcome, IoFailure> {
        match session.backing_path().map(Path::to_path_buf) {
            Some(path) => {
                self.write_to(session, path.clone())?;
                Ok(SaveOutcome::Saved(path))
            }
            None => {
                info!(target: "io", "save_without_path_delegates_to_save_as");
                self.save_as(session, picker)
            }
        }
    }

    /// Always ask for a destination, then write there.
    pub fn save_as(
        &mut self,
        session: &mut EditorSession,
        picker: &mut dyn DestinationPicker,
    ) -> Result<SaveOutcome, IoFailure> {
        let request = PickRequest {
            purpose: PickPurpose::SaveAs,
            title: "Save As",
            filters: &self.save_filters,
        };
        let Some(path) = picker.choose(&request) else {
            info!(target: "io", "save_as_cancelled");
            return Ok(SaveOutcome::Cancelled);
        };
        self.write_to(session, path.clone())?;
        Ok(SaveOutcome::Saved(path))
    }

    /// Read `path` and load it into the session. On failure the session keeps
    /// its previous document.
    pub fn open(&mut self, session: &mut EditorSession, path: &Path) -> Result<(), IoFailure> {
        let content = self.read(path)?;
        session.load(Some(path.to_path_buf()), &content);
        info!(target: "io", file = %path.display(), size_bytes = content.len(), "open_ok");
        Ok(())
    }

    /// Ask the picker for a source file and read it. `Ok(None)` when cancelled.
    /// The caller decides how the content reaches the session.
    pub fn pick_and_read(
        &mut self,
        picker: &mut dyn DestinationPicker,
    ) -> Result<Option<(PathBuf, String)>, IoFailure> {
        let request = PickRequest {
            purpose: PickPurpose::Open,
            title: "Select source file...",
            filters: &self.open_filters,
        };
        let Some(path) = picker.choose(&request) else {
            info!(target: "io", "open_cancelled");
            return Ok(None);
        };
        let content = self.read(&path)?;
        Ok(Some((path, content)))
    }

    /// Read `path` as text without touching any session.
    pub fn read(&mut self, path: &Path) -> Result<String, IoFailure> {
        self.persistence.read_text(path).map_err(|source| {
            error!(target: "io", file = %path.display(), error = %source, "file_open_error");
            IoFailure::Read {
                path: path.to_path_buf(),
                source,
            }
        })
    }

    fn write_to(&mut self, session: &mut EditorSession, path: PathBuf) -> Result<(), IoFailure> {
        let text = session.disk_text();
        match self.persistence.write_text(&path, &text) {
            Ok(()) => {
                info!(target: "io", file = %path.display(), size_bytes = text.len(), "save_ok");
                session.mark_saved(path);
                Ok(())
            }
            Err(source) => {
                error!(target: "io", file = %path.display(), error = %source, "file_write_error");
                Err(IoFailure::Write { path, source })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn never(_: &PickRequest<'_>) -> Option<PathBuf> {
        panic!("picker must not be consulted")
    }

    #[test]
    fn save_overwrites_backing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("spell.ritual");
        std::fs::write(&path, "old").unwrap();
        let mut session = EditorSession::new();
        session.load(Some(path.clone()), "old");
        session.buffer_mut().insert_at(3, " new").unwrap();
        assert!(session.is_dirty());

        let mut coord = SaveCoordinator::default();
        let outcome = coord.save(&mut session, &mut never).unwrap();
        assert_eq!(outcome, SaveOutcome::Saved(path.clone()));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "old new");
        assert!(!session.is_dirty());
    }

    #[test]
    fn save_preserves_crlf_style() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("win.txt");
        let mut session = EditorSession::new();
        session.load(Some(path.clone()), "a\r\nb\r\n");
        let end = session.buffer().len_chars();
        session.buffer_mut().insert_at(end, "c\n").unwrap();
        SaveCoordinator::default()
            .save(&mut session, &mut never)
            .unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "a\r\nb\r\nc\r\n");
        assert!(!session.is_dirty());
    }

    #[test]
    fn save_untitled_asks_for_destination() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("new.ritual");
        let mut session = EditorSession::new();
        session.buffer_mut().insert_at(0, "rite").unwrap();

        let mut asked = Vec::new();
        let mut picker = |req: &PickRequest<'_>| -> Option<PathBuf> {
            asked.push((req.purpose, req.filters.to_vec()));
            Some(dest.clone())
        };
        let outcome = SaveCoordinator::default()
            .save(&mut session, &mut picker)
            .unwrap();
        assert_eq!(outcome, SaveOutcome::Saved(dest.clone()));
        assert_eq!(asked.len(), 1);
        assert_eq!(asked[0].0, PickPurpose::SaveAs);
        assert_eq!(asked[0].1, vec![FileFilter::new("Ritual", &["*.ritual"])]);
        assert_eq!(session.backing_path(), Some(dest.as_path()));
        assert_eq!(std::fs::read_to_string(&dest).unwrap(), "rite");
    }

    #[test]
    fn save_as_cancel_changes_nothing() {
        let mut session = EditorSession::new();
        session.load(Some(PathBuf::from("keep.ritual")), "abc");
        session.buffer_mut().insert_at(0, "x").unwrap();
        let before_fp = session.saved_fingerprint();

        let outcome = SaveCoordinator::default()
            .save_as(&mut session, &mut |_: &PickRequest<'_>| -> Option<PathBuf> { None })
            .unwrap();
        assert_eq!(outcome, SaveOutcome::Cancelled);
        assert_eq!(session.backing_path(), Some(Path::new("keep.ritual")));
        assert_eq!(session.saved_fingerprint(), before_fp);
        assert_eq!(session.buffer().text(), "xabc");
        assert!(session.is_dirty());
    }

    #[test]
    fn write_failure_keeps_session_state() {
        let dir = tempfile::tempdir().unwrap();
        let bad = dir.path().join("missing_dir").join("f.ritual");
        let mut session = EditorSession::new();
        session.buffer_mut().insert_at(0, "data").unwrap();
        let err = SaveCoordinator::default()
            .save_as(&mut session, &mut |_: &PickRequest<'_>| -> Option<PathBuf> {
                Some(bad.clone())
            })
            .unwrap_err();
        assert!(matches!(err, IoFailure::Write { .. }));
        assert_eq!(err.path(), bad.as_path());
        assert!(session.backing_path().is_none());
        assert!(session.saved_fingerprint().is_none());
        assert!(session.is_dirty());
    }

    #[test]
    fn open_loads_clean_document() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("in.txt");
        std::fs::write(&path, "line1\nline2").unwrap();
        let mut session = EditorSession::new();
        SaveCoordinator::default().open(&mut session, &path).unwrap();
        assert_eq!(session.buffer().text(), "line1\nline2");
        assert_eq!(session.backing_path(), Some(path.as_path()));
        assert!(!session.is_dirty());
    }

    #[test]
    fn open_failure_keeps_previous_document() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = EditorSession::new();
        session.load(Some(PathBuf::from("prev.ritual")), "previous");
        let err = SaveCoordinator::default()
            .open(&mut session, &dir.path().join("absent.ritual"))
            .unwrap_err();
        assert!(matches!(err, IoFailure::Read { .. }));
        assert_eq!(session.buffer().text(), "previous");
        assert_eq!(session.backing_path(), Some(Path::new("prev.ritual")));
    }

    #[test]
    fn directories_are_not_opened() {
        let dir = tempfile::tempdir().unwrap();
        let mut coord = SaveCoordinator::default();
        let err = coord.read(dir.path()).unwrap_err();
        assert!(matches!(err, IoFailure::Read { .. }));
    }

    #[test]
    fn pick_and_read_cancel_is_none() {
        let mut coord = SaveCoordinator::default();
        let picked = coord
            .pick_and_read(&mut |req: &PickRequest<'_>| -> Option<PathBuf> {
                assert_eq!(req.purpose, PickPurpose::Open);
                assert_eq!(req.filters.len(), 2);
                None
            })
            .unwrap();
        assert!(picked.is_none());
    }
}
