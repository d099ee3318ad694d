//! The durable, append-only run log.
//!
//! Every handler invocation appends exactly one record to the notebook it is
//! working on; filename collisions append warning records. The log is loaded
//! (or initialized empty) once at run start, passed by mutable reference into
//! every handler, and serialized back to disk exactly once at run end.
//!
//! The JSON shape is a top-level mapping from notebook name to an ordered
//! record list, plus the reserved `warnings` key.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};
use log::warn;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Output type tag attached to successful records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecordKind {
    #[serde(rename = "multi-item-pdf")]
    MultiItemPdf,
    #[serde(rename = "unsupported-separate-file")]
    UnsupportedSeparateFile,
    #[serde(rename = "single-resource")]
    SingleResource,
    #[serde(rename = "text-only-pdf")]
    TextOnlyPdf,
}

/// One outcome record: a note-level operation, or a file-level parse failure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NoteRecord {
    /// Source export file name.
    pub file: String,
    /// Sanitized note title. Absent on file-level records.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    /// Identifier used in the artifact name; empty in preservation mode.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note_id: Option<String>,
    #[serde(default)]
    pub success: bool,
    /// Final artifact path, present on success.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_path: Option<String>,
    pub notebook: String,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<RecordKind>,
    /// Human-readable failure message, present when `success` is false.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Advisory note on successful records (e.g. why a file was saved apart).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl NoteRecord {
    /// A successful note-level outcome.
    pub fn success(
        file: &str,
        notebook: &str,
        note: &str,
        note_id: &str,
        kind: RecordKind,
        file_path: &Path,
    ) -> Self {
        Self {
            file: file.to_string(),
            note: Some(note.to_string()),
            note_id: Some(note_id.to_string()),
            success: true,
            file_path: Some(file_path.to_string_lossy().into_owned()),
            notebook: notebook.to_string(),
            kind: Some(kind),
            error: None,
            warning: None,
            timestamp: Utc::now(),
        }
    }

    /// A failed note-level outcome.
    pub fn failure(file: &str, notebook: &str, note: &str, note_id: &str, error: String) -> Self {
        Self {
            file: file.to_string(),
            note: Some(note.to_string()),
            note_id: Some(note_id.to_string()),
            success: false,
            file_path: None,
            notebook: notebook.to_string(),
            kind: None,
            error: Some(error),
            warning: None,
            timestamp: Utc::now(),
        }
    }

    /// A file-level failure (the export file itself could not be processed).
    pub fn file_error(file: &str, notebook: &str, error: String) -> Self {
        Self {
            file: file.to_string(),
            note: None,
            note_id: None,
            success: false,
            file_path: None,
            notebook: notebook.to_string(),
            kind: None,
            error: Some(error),
            warning: None,
            timestamp: Utc::now(),
        }
    }

    /// Attaches an advisory warning message.
    pub fn with_warning(mut self, warning: &str) -> Self {
        self.warning = Some(warning.to_string());
        self
    }
}

/// One filename-collision substitution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollisionWarning {
    #[serde(rename = "type")]
    pub kind: String,
    pub original: String,
    pub deduped: String,
    pub message: String,
}

/// Accumulating mapping from notebook name to outcome records.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct RunLog {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<CollisionWarning>,
    #[serde(flatten)]
    pub notebooks: BTreeMap<String, Vec<NoteRecord>>,
}

impl RunLog {
    /// Loads the log from `path`, or an empty log if the file is absent or
    /// unparsable. A corrupt log never aborts a run.
    pub fn load(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(raw) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                warn!("run log {} is unparsable, starting fresh: {e}", path.display());
                Self::default()
            }),
            Err(_) => Self::default(),
        }
    }

    /// Serializes the full log to `path`, overwriting any previous content.
    pub fn save(&self, path: &Path) -> Result<()> {
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    /// Starts a fresh record list for a notebook, replacing entries from any
    /// previous run over the same export file.
    pub fn open_notebook(&mut self, notebook: &str) {
        self.notebooks.insert(notebook.to_string(), Vec::new());
    }

    /// Appends one outcome record to a notebook's list.
    pub fn append(&mut self, notebook: &str, record: NoteRecord) {
        self.notebooks
            .entry(notebook.to_string())
            .or_default()
            .push(record);
    }

    /// Records one collision substitution.
    pub fn warn_collision(&mut self, original: &str, deduped: &str) {
        let message =
            format!("File collision: '{original}' already exists, using '{deduped}'");
        warn!("{message}");
        self.warnings.push(CollisionWarning {
            kind: "filename-collision".to_string(),
            original: original.to_string(),
            deduped: deduped.to_string(),
            message,
        });
    }

    /// Records for one notebook, empty if the notebook is unknown.
    pub fn records(&self, notebook: &str) -> &[NoteRecord] {
        self.notebooks
            .get(notebook)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }
}
