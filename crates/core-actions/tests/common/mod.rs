#![allow(dead_code)] // Shared across integration tests; each test binary uses a subset of helpers.

use core_actions::{CloseChoice, ConfirmationRequest, Persistence, PickRequest};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// In-memory disk whose writes can be scripted to fail.
#[derive(Default)]
pub struct ScriptedDisk {
    pub files: HashMap<PathBuf, String>,
    pub failing_writes: usize,
    pub write_attempts: usize,
}

impl ScriptedDisk {
    pub fn failing(times: usize) -> Self {
        Self {
            failing_writes: times,
            ..Self::default()
        }
    }
}

impl Persistence for ScriptedDisk {
    fn read_text(&mut self, path: &Path) -> std::io::Result<String> {
        self.files
            .get(path)
            .cloned()
            .ok_or_else(|| std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"))
    }

    fn write_text(&mut self, path: &Path, text: &str) -> std::io::Result<()> {
        self.write_attempts += 1;
        if self.failing_writes > 0 {
            self.failing_writes -= 1;
            return Err(std::io::Error::new(
                std::io::ErrorKind::PermissionDenied,
                "disk is read-only",
            ));
        }
        self.files.insert(path.to_path_buf(), text.to_string());
        Ok(())
    }
}

/// Prompt answering from a fixed script and recording every request it saw.
pub struct ScriptedPrompt {
    answers: Vec<CloseChoice>,
    pub seen: Vec<(String, u32, Option<String>)>,
}

impl ScriptedPrompt {
    pub fn new(answers: &[CloseChoice]) -> Self {
        Self {
            answers: answers.iter().rev().copied().collect(),
            seen: Vec::new(),
        }
    }

    pub fn presented(&self) -> usize {
        self.seen.len()
    }
}

impl core_actions::ConfirmationPrompt for ScriptedPrompt {
    fn confirm(&mut self, request: &ConfirmationRequest) -> CloseChoice {
        self.seen.push((
            request.document().to_string(),
            request.attempt(),
            request.last_failure().map(str::to_string),
        ));
        self.answers
            .pop()
            .expect("prompt presented more often than scripted")
    }
}

/// Picker returning each scripted answer in order.
pub struct ScriptedPicker {
    answers: Vec<Option<PathBuf>>,
    pub requests: usize,
}

impl ScriptedPicker {
    pub fn new(answers: Vec<Option<PathBuf>>) -> Self {
        Self {
            answers: answers.into_iter().rev().collect(),
            requests: 0,
        }
    }
}

impl core_actions::DestinationPicker for ScriptedPicker {
    fn choose(&mut self, _request: &PickRequest<'_>) -> Option<PathBuf> {
        self.requests += 1;
        self.answers.pop().flatten()
    }
}
