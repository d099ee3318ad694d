//! Ikou - Evernote Export Migration Library
//!
//! This crate converts Evernote export archives (ENEX files bundling notes
//! with base64-encoded attachments) into a directory tree of PDF and
//! original-format files, and can mirror that tree into a remote file store.
//!
//! Per note, the router decides between three output strategies: a merged
//! multi-item PDF (text plus mergeable attachments), a single passthrough
//! file, or a text-rendered PDF. Attachments that cannot be merged (videos,
//! archives, office documents, ...) are saved separately next to the merged
//! PDF. Every outcome is recorded in a durable JSON run log.
//!
//! # Getting Started
//!
//! Configure a migration with the `MigrationConfig` builder, then execute it:
//!
//! ```rust,no_run
//! use ikou::MigrationConfig;
//!
//! fn main() -> ikou::error::Result<()> {
//!     let config = MigrationConfig::builder()
//!         .input_path("./input_data")
//!         .output_path("./EverNote Notes")
//!         .log_path("./extraction_log.json")
//!         .preserve_filenames(false)
//!         .build()?;
//!
//!     let report = config.migrate()?;
//!     println!(
//!         "{} notebooks, {} artifacts, {} failures",
//!         report.notebooks, report.artifacts, report.failures
//!     );
//!     Ok(())
//! }
//! ```
//!
//! To mirror the output tree afterwards, hand any [`upload::RemoteStore`]
//! implementation to [`upload::upload_directory`].

pub mod assemble;
pub mod collector;
pub mod error;
pub mod migrate;
pub mod path_utils;
pub mod render;
pub mod router;
pub mod runlog;
pub mod types;
pub mod upload;

// Publicly expose the main configuration struct and its builder
pub use migrate::{MigrationConfig, MigrationConfigBuilder};

// Re-export core types for direct access
pub use types::{Attachment, FileCategory, MigrationReport, Note};

/// Prelude module for convenient imports.
///
/// Re-exports the most commonly used types so a single
/// `use ikou::prelude::*;` covers typical usage.
pub mod prelude {
    pub use super::{
        Attachment, FileCategory, MigrationConfig, MigrationConfigBuilder, MigrationReport, Note,
        error, types,
    };
    pub use crate::assemble::{AssemblyOutcome, assemble};
    pub use crate::router::{NotebookTarget, Routing, decide, route};
    pub use crate::runlog::{NoteRecord, RecordKind, RunLog};
    pub use crate::upload::{DirectoryStore, RemoteStore, upload_directory};
    pub use std::path::{Path, PathBuf};
}
