//! Where log output goes.
//!
//! Command-line actions log to stderr. The TUI owns the terminal, so while it
//! runs events are appended to a file in the data directory instead.

use std::fs::{self, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::fmt::writer::BoxMakeWriter;

/// File name of the TUI log inside the data directory.
pub const LOG_FILE: &str = "dailydo.log";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogTarget {
    Stderr,
    File(PathBuf),
}

impl LogTarget {
    /// The log file for a TUI session using `data_dir`.
    pub fn for_tui(data_dir: &Path) -> Self {
        LogTarget::File(data_dir.join(LOG_FILE))
    }

    /// Whether the writer can emit terminal colour codes.
    pub fn ansi(&self) -> bool {
        matches!(self, LogTarget::Stderr)
    }

    /// Builds the writer for this target.
    ///
    /// A log file that cannot be opened discards events rather than falling back to stderr.
    pub fn make_writer(&self) -> BoxMakeWriter {
        match self {
            LogTarget::Stderr => BoxMakeWriter::new(io::stderr),
            LogTarget::File(path) => match open_append(path) {
                Ok(file) => BoxMakeWriter::new(Mutex::new(file)),
                Err(_) => BoxMakeWriter::new(io::sink),
            },
        }
    }
}

fn open_append(path: &Path) -> io::Result<fs::File> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    OpenOptions::new().create(true).append(true).open(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn emit(target: &LogTarget, message: &str) {
        let subscriber = tracing_subscriber::fmt()
            .with_writer(target.make_writer())
            .with_ansi(target.ansi())
            .finish();
        tracing::subscriber::with_default(subscriber, || tracing::warn!("{message}"));
    }

    #[test]
    fn tui_target_appends_to_data_dir_file() {
        let dir = tempfile::tempdir().unwrap();
        let data_dir = dir.path().join("data");
        let target = LogTarget::for_tui(&data_dir);
        assert!(!target.ansi());

        emit(&target, "failed to save tasks");
        emit(&target, "second session");

        let log = fs::read_to_string(data_dir.join(LOG_FILE)).unwrap();
        assert!(log.contains("failed to save tasks"));
        assert!(log.contains("second session"));
        assert!(!log.contains('\u{1b}'));
    }

    #[test]
    fn unopenable_log_file_is_discarded() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, "").unwrap();
        let target = LogTarget::File(blocker.join(LOG_FILE));
        emit(&target, "dropped");
        assert!(!blocker.join(LOG_FILE).exists());
    }
}
