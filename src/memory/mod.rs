//! Flat-file memory log — the append-only note store injected into every
//! prompt.
//!
//! One note per line, format `[YYYY-MM-DD HH:MM] <note text>`. Entries are
//! immutable once written; the only mutation is full truncation (wipe). The
//! file is created lazily on the first note and loaded wholesale at startup.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::Local;
use tracing::{info, warn};

use crate::error::AppError;

/// Rendered in place of the log when no notes are stored.
pub const EMPTY_MARKER: &str = "No stored memories.";

pub struct MemoryLog {
    path: PathBuf,
    entries: Vec<String>,
}

impl MemoryLog {
    /// Load the log from `path`. A missing file is an empty log; a read
    /// failure is logged and treated as empty rather than propagated.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = match fs::read_to_string(&path) {
            Ok(content) => content
                .lines()
                .filter(|l| !l.trim().is_empty())
                .map(|l| l.to_string())
                .collect(),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "could not read memory log");
                Vec::new()
            }
        };
        Self { path, entries }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Append a timestamped note to the file and the in-memory copy.
    ///
    /// Embedded newlines are collapsed to spaces so the one-note-per-line
    /// file invariant holds.
    pub fn record(&mut self, note: &str) -> Result<(), AppError> {
        let note = flatten(note);
        let entry = format!("[{}] {}", Local::now().format("%Y-%m-%d %H:%M"), note);

        let mut file = fs::OpenOptions::new()
            .append(true)
            .create(true)
            .open(&self.path)
            .map_err(|e| AppError::Memory(format!("cannot open {}: {e}", self.path.display())))?;
        writeln!(file, "{entry}")
            .map_err(|e| AppError::Memory(format!("cannot append {}: {e}", self.path.display())))?;

        self.entries.push(entry);
        Ok(())
    }

    /// Delete the backing file if present and reset the in-memory copy.
    pub fn wipe(&mut self) -> Result<(), AppError> {
        match fs::remove_file(&self.path) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                return Err(AppError::Memory(format!(
                    "cannot delete {}: {e}",
                    self.path.display()
                )));
            }
        }
        info!(entries = self.entries.len(), "memory log wiped");
        self.entries.clear();
        Ok(())
    }

    /// The full log as one block for prompt injection, or [`EMPTY_MARKER`].
    pub fn render(&self) -> String {
        if self.entries.is_empty() {
            EMPTY_MARKER.to_string()
        } else {
            self.entries.join("\n")
        }
    }
}

fn flatten(note: &str) -> String {
    note.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn setup() -> (TempDir, MemoryLog) {
        let dir = TempDir::new().unwrap();
        let log = MemoryLog::load(dir.path().join("memory.txt"));
        (dir, log)
    }

    #[test]
    fn missing_file_loads_empty() {
        let (_dir, log) = setup();
        assert!(log.is_empty());
        assert_eq!(log.render(), EMPTY_MARKER);
    }

    #[test]
    fn record_appends_timestamped_line() {
        let (_dir, mut log) = setup();
        log.record("the sky is blue").unwrap();

        assert_eq!(log.len(), 1);
        let entry = &log.entries()[0];
        assert!(entry.ends_with("the sky is blue"));
        // Prefix shape: "[YYYY-MM-DD HH:MM] "
        assert!(entry.starts_with('['));
        assert_eq!(&entry[5..6], "-");
        assert_eq!(&entry[8..9], "-");
        assert_eq!(&entry[11..12], " ");
        assert_eq!(&entry[14..15], ":");
        assert_eq!(&entry[17..19], "] ");
    }

    #[test]
    fn record_preserves_casing() {
        let (_dir, mut log) = setup();
        log.record("Mum's Birthday is May 4th").unwrap();
        assert!(log.entries()[0].ends_with("Mum's Birthday is May 4th"));
    }

    #[test]
    fn record_flattens_newlines() {
        let (_dir, mut log) = setup();
        log.record("line one\nline two").unwrap();
        assert_eq!(log.len(), 1);
        assert!(log.entries()[0].ends_with("line one line two"));
    }

    #[test]
    fn entries_survive_reload() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("memory.txt");

        let mut log = MemoryLog::load(&path);
        log.record("first").unwrap();
        log.record("second").unwrap();

        let reloaded = MemoryLog::load(&path);
        assert_eq!(reloaded.len(), 2);
        assert!(reloaded.entries()[0].ends_with("first"));
        assert!(reloaded.entries()[1].ends_with("second"));
    }

    #[test]
    fn wipe_removes_file_and_entries() {
        let (_dir, mut log) = setup();
        log.record("ephemeral").unwrap();
        assert!(log.path().exists());

        log.wipe().unwrap();
        assert!(log.is_empty());
        assert!(!log.path().exists());
        assert_eq!(log.render(), EMPTY_MARKER);
    }

    #[test]
    fn wipe_without_file_is_ok() {
        let (_dir, mut log) = setup();
        log.wipe().unwrap();
        assert!(log.is_empty());
    }

    #[test]
    fn render_joins_entries_in_order() {
        let (_dir, mut log) = setup();
        log.record("a").unwrap();
        log.record("b").unwrap();

        let block = log.render();
        let lines: Vec<&str> = block.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].ends_with("a"));
        assert!(lines[1].ends_with("b"));
    }
}
