//! Core data types, classification rules and reports for the Ikou migration library.
//!
//! This module defines the fundamental data structures used throughout Ikou:
//! - Parsed source records (`Note`, `Attachment`)
//! - Content classification (`FileCategory` and the extension sets behind it)
//! - MIME-to-extension resolution
//! - Reporting types (`MigrationReport`)

use std::path::Path;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Raster formats that can be rendered onto a PDF page.
pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "bmp", "tiff", "webp"];

/// Formats that are already PDF and merge without re-encoding.
pub const PDF_EXTENSIONS: &[&str] = &["pdf"];

/// Formats that can never be embedded in a merged PDF and are saved separately:
/// archives, video, audio, html and office documents.
pub const UNSUPPORTED_EXTENSIONS: &[&str] = &[
    // archives
    "zip", "rar", "7z", "tar", "gz", "bz2",
    // video
    "mp4", "avi", "mov", "mkv", "webm", "flv", "wmv",
    // audio
    "mp3", "wav", "flac", "ogg", "m4a", "aac",
    // html
    "html", "htm", "mhtml",
    // office documents
    "doc", "docx", "xls", "xlsx", "ppt", "pptx",
];

/// How a file participates in multi-item assembly, decided by extension alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FileCategory {
    /// A raster image; rendered to a single PDF page before merging.
    Image,
    /// An existing PDF; merged page-for-page without re-encoding.
    Pdf,
    /// A known non-mergeable format (archive, video, audio, html, office).
    Unsupported,
    /// An extension outside every known set. Kept distinct from
    /// `Unsupported` for diagnostics only; both are excluded from merging.
    Unknown,
}

impl FileCategory {
    /// Whether this category can contribute pages to a merged PDF.
    pub fn mergeable(self) -> bool {
        matches!(self, FileCategory::Image | FileCategory::Pdf)
    }
}

/// Classifies a file by its extension, case-insensitively.
///
/// The decision never inspects file contents; a mislabeled payload surfaces
/// later as a render failure, not here.
pub fn classify(path: &Path) -> FileCategory {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();

    if IMAGE_EXTENSIONS.contains(&ext.as_str()) {
        FileCategory::Image
    } else if PDF_EXTENSIONS.contains(&ext.as_str()) {
        FileCategory::Pdf
    } else if UNSUPPORTED_EXTENSIONS.contains(&ext.as_str()) {
        FileCategory::Unsupported
    } else {
        FileCategory::Unknown
    }
}

/// Resolves a MIME string to a dotted file extension (e.g. `".jpg"`).
///
/// The fixed table pins the types Evernote actually emits so resolution is
/// deterministic across platforms; everything else falls back to the
/// `mime_guess` reverse lookup. Returns an empty string when nothing is
/// recognized.
pub fn extension_for_mime(mime: &str) -> String {
    let pinned = match mime {
        "image/jpeg" => Some("jpg"),
        "image/png" => Some("png"),
        "image/gif" => Some("gif"),
        "image/bmp" => Some("bmp"),
        "image/tiff" => Some("tiff"),
        "image/webp" => Some("webp"),
        "application/pdf" => Some("pdf"),
        "text/html" => Some("html"),
        "text/plain" => Some("txt"),
        "video/mp4" => Some("mp4"),
        "video/quicktime" => Some("mov"),
        "audio/mpeg" => Some("mp3"),
        "audio/wav" | "audio/x-wav" => Some("wav"),
        "application/zip" => Some("zip"),
        _ => None,
    };

    match pinned {
        Some(ext) => format!(".{ext}"),
        None => mime_guess::get_mime_extensions_str(mime)
            .and_then(|exts| exts.first())
            .map(|ext| format!(".{ext}"))
            .unwrap_or_default(),
    }
}

/// One embedded binary resource of a note.
///
/// `mime` and `data` mirror the source document: either may be absent or
/// empty, in which case the attachment is unusable and skipped at the
/// narrowest scope.
#[derive(Debug, Clone, Default)]
pub struct Attachment {
    /// MIME string from the resource's `mime` element.
    pub mime: Option<String>,
    /// Base64 text payload from the resource's `data` element.
    pub data: Option<String>,
}

impl Attachment {
    /// Whether both required fields are present and non-empty.
    pub fn is_usable(&self) -> bool {
        self.mime.as_deref().is_some_and(|m| !m.trim().is_empty())
            && self.data.as_deref().is_some_and(|d| !d.trim().is_empty())
    }

    /// The dotted extension inferred from the MIME string, or `""`.
    pub fn extension(&self) -> String {
        self.mime
            .as_deref()
            .map(extension_for_mime)
            .unwrap_or_default()
    }

    /// Decodes the base64 payload into raw bytes.
    ///
    /// Export files wrap base64 text across lines, so ASCII whitespace is
    /// stripped before decoding.
    pub fn payload(&self) -> Result<Vec<u8>> {
        let data = self
            .data
            .as_deref()
            .filter(|d| !d.trim().is_empty())
            .ok_or_else(|| Error::MissingField("resource data".to_string()))?;
        let compact: String = data.chars().filter(|c| !c.is_whitespace()).collect();
        Ok(STANDARD.decode(compact)?)
    }
}

/// One unit of migration, parsed from a single `note` element.
///
/// Constructed once by the collector, consumed immediately by the router,
/// never mutated. Only its derived outputs and log records persist.
#[derive(Debug, Clone, Default)]
pub struct Note {
    /// Note title. Absence is a hard skip for the router.
    pub title: Option<String>,
    /// Plain text, flattened from the note's content markup.
    pub text: Option<String>,
    /// Attachments in source order; order is preserved through assembly.
    pub attachments: Vec<Attachment>,
}

impl Note {
    /// Whether the note carries usable text (non-empty after trimming).
    pub fn has_text(&self) -> bool {
        self.text.as_deref().is_some_and(|t| !t.trim().is_empty())
    }
}

/// Summary of one migration run, derived from the run log's entries for the
/// notebooks processed in that run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MigrationReport {
    /// Export files processed (including ones that failed to parse).
    pub notebooks: usize,
    /// Output artifacts produced (merged PDFs, passthrough files, text PDFs
    /// and separately saved unsupported files).
    pub artifacts: usize,
    /// Recorded per-note and per-file failures.
    pub failures: usize,
    /// Filename collisions resolved by suffixing during this run.
    pub collisions: usize,
}
