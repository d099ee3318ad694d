//! The migration configuration and run driver.
//!
//! A migration is configured declaratively through [`MigrationConfig`]'s
//! builder, validated with [`preflight_check`](MigrationConfig::preflight_check),
//! and executed with [`migrate`](MigrationConfig::migrate): every export file
//! in the input directory is processed start-to-finish, in sorted order, with
//! its notes routed one at a time in document order. Everything is
//! synchronous and single-threaded; the only shared mutable state is the run
//! log, threaded by mutable reference through every handler.

use std::fs;
use std::path::{Path, PathBuf};

use log::{info, warn};

use crate::collector::{list_export_files, parse_export_file};
use crate::error::{Error, Result};
use crate::router::{NotebookTarget, route};
use crate::runlog::{NoteRecord, RunLog};
use crate::types::MigrationReport;

/// Configuration for one migration run, built with the builder pattern.
///
/// ```rust,no_run
/// use ikou::MigrationConfig;
///
/// # fn main() -> ikou::error::Result<()> {
/// let config = MigrationConfig::builder()
///     .input_path("./input_data")
///     .output_path("./EverNote Notes")
///     .log_path("./extraction_log.json")
///     .build()?;
///
/// let report = config.migrate()?;
/// println!("{} artifacts, {} failures", report.artifacts, report.failures);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, derive_builder::Builder)]
#[builder(setter(into, strip_option), build_fn(validate = "Self::validate"))]
pub struct MigrationConfig {
    /// Directory scanned (non-recursively) for `.enex` export files.
    pub input_path: PathBuf,

    /// Root directory that receives one subdirectory per notebook.
    pub output_path: PathBuf,

    /// Location of the durable JSON run log. Loaded at start, rewritten at
    /// run end.
    #[builder(default = "PathBuf::from(\"extraction_log.json\")")]
    pub log_path: PathBuf,

    /// Keep original note titles as filenames, suppressing the identifier
    /// prefix everywhere.
    #[builder(default)]
    pub preserve_filenames: bool,
}

impl MigrationConfig {
    /// Creates a new builder for configuring a migration.
    pub fn builder() -> MigrationConfigBuilder {
        MigrationConfigBuilder::default()
    }

    /// Validates the configuration against the filesystem before any work.
    ///
    /// Missing required external input is the only condition allowed to
    /// terminate a whole run, and it is caught here.
    pub fn preflight_check(&self) -> Result<&Self> {
        if self.input_path.as_os_str().is_empty() {
            return Err(Error::Configuration("input path is required".to_string()));
        }
        if self.output_path.as_os_str().is_empty() {
            return Err(Error::Configuration("output path is required".to_string()));
        }
        if !self.input_path.exists() {
            return Err(Error::NotFound(format!(
                "Input directory does not exist: {:?}",
                self.input_path
            )));
        }
        if !self.input_path.is_dir() {
            return Err(Error::InvalidPath(
                self.input_path.clone(),
                "Input path is not a directory.".to_string(),
            ));
        }
        Ok(self)
    }

    /// Runs the migration: processes every export file, accumulates the run
    /// log, and persists it once at the end.
    pub fn migrate(&self) -> Result<MigrationReport> {
        self.preflight_check()?;
        fs::create_dir_all(&self.output_path)?;

        let mut log = RunLog::load(&self.log_path);
        let warnings_before = log.warnings.len();

        let files = list_export_files(&self.input_path)?;
        if files.is_empty() {
            info!("no export files found in {}", self.input_path.display());
        }

        let mut processed: Vec<String> = Vec::new();
        for file in &files {
            let notebook = self.process_export_file(file, &mut log);
            processed.push(notebook);
        }

        log.save(&self.log_path)?;
        Ok(summarize(&log, &processed, warnings_before))
    }

    /// Processes one export file. Returns the notebook name it logged under.
    fn process_export_file(&self, file: &Path, log: &mut RunLog) -> String {
        let notebook = file
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let file_name = file
            .file_name()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();

        info!("processing notebook '{notebook}' from {file_name}");
        log.open_notebook(&notebook);

        let notes = match parse_export_file(file) {
            Ok(notes) => notes,
            Err(e) => {
                warn!("abandoning {file_name}: {e}");
                log.append(
                    &notebook,
                    NoteRecord::file_error(&file_name, &notebook, e.to_string()),
                );
                return notebook;
            }
        };

        let dir = self.output_path.join(&notebook);
        let target = NotebookTarget {
            notebook: &notebook,
            source_file: &file_name,
            dir: &dir,
            preserve_filenames: self.preserve_filenames,
        };
        for note in &notes {
            route(note, &target, log);
        }
        notebook
    }
}

impl MigrationConfigBuilder {
    fn validate(&self) -> std::result::Result<(), String> {
        if let Some(path) = &self.input_path {
            if path.as_os_str().is_empty() {
                return Err("input_path must not be empty".to_string());
            }
        }
        if let Some(path) = &self.output_path {
            if path.as_os_str().is_empty() {
                return Err("output_path must not be empty".to_string());
            }
        }
        Ok(())
    }
}

/// Summarizes the notebooks touched by this run.
fn summarize(log: &RunLog, processed: &[String], warnings_before: usize) -> MigrationReport {
    let mut report = MigrationReport {
        notebooks: processed.len(),
        collisions: log.warnings.len().saturating_sub(warnings_before),
        ..Default::default()
    };
    for notebook in processed {
        for record in log.records(notebook) {
            if record.success {
                report.artifacts += 1;
            } else {
                report.failures += 1;
            }
        }
    }
    report
}
