use std::fs;
use std::io;
use std::path::Path;
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::info;
use crate::board::{DayBoard, ImportPolicy};
use crate::models::Task;
use crate::storage::{KeyValueStore, StoreError};

/// Version written into export files.
pub const EXPORT_VERSION: &str = "1.0";

/// Largest timestamp magnitude, in unix milliseconds, accepted on import.
pub const MAX_TIMESTAMP_MILLIS: i64 = 8_640_000_000_000_000;

/// The document written by export and read back by import.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ExportFile {
    pub todos: Vec<Task>,
    pub export_date: String,
    pub version: String,
}

impl ExportFile {
    pub fn new(todos: Vec<Task>, at: DateTime<Local>) -> Self {
        Self { todos, export_date: at.to_rfc3339(), version: EXPORT_VERSION.to_string() }
    }
}

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("failed to read import file: {0}")]
    Io(#[from] io::Error),

    #[error("import file is not valid JSON: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("import file has no 'todos' list")]
    MissingTodos,

    #[error("task '{id}' has a timestamp out of range")]
    OutOfRange { id: String },

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Parses an export document, returning its task records.
///
/// Only the `todos` field is required; `exportDate` and `version` are informational.
/// Timestamps beyond the JavaScript `Date` range are rejected.
pub fn parse_export(s: &str) -> Result<Vec<Task>, ImportError> {
    let mut doc: Value = serde_json::from_str(s)?;
    match doc.get_mut("todos").map(Value::take) {
        Some(todos @ Value::Array(_)) => {
            let tasks: Vec<Task> = serde_json::from_value(todos)?;
            match tasks.iter().find(|t| !timestamps_in_range(t)) {
                Some(t) => Err(ImportError::OutOfRange { id: t.id.clone() }),
                None => Ok(tasks),
            }
        }
        _ => Err(ImportError::MissingTodos),
    }
}

fn timestamps_in_range(task: &Task) -> bool {
    let ok = |millis: i64| millis.unsigned_abs() <= MAX_TIMESTAMP_MILLIS as u64;
    ok(task.created_at) && task.completed_at.map_or(true, ok)
}

pub fn read_export(path: &Path) -> Result<Vec<Task>, ImportError> {
    let s = fs::read_to_string(path)?;
    parse_export(&s)
}

/// Writes `tasks` as a pretty-printed export document.
pub fn write_export(path: &Path, tasks: &[Task]) -> Result<(), StoreError> {
    let doc = ExportFile::new(tasks.to_vec(), Local::now());
    let s = serde_json::to_string_pretty(&doc)?;
    fs::write(path, s).map_err(|source| StoreError::Io { key: path.display().to_string(), source })?;
    info!(path = %path.display(), count = tasks.len(), "exported tasks");
    Ok(())
}

/// Reads an export file and merges it into `board`. Returns the duplicate ids.
pub fn import_file<S: KeyValueStore>(
    board: &mut DayBoard<S>,
    path: &Path,
    policy: ImportPolicy,
) -> Result<Vec<String>, ImportError> {
    let incoming = read_export(path)?;
    Ok(board.import(incoming, policy)?)
}
