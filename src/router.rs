//! Note routing: deciding the output strategy for each note and running it.
//!
//! A parsed note lands here exactly once. The router classifies its content
//! profile, dispatches to the matching handler, manages output naming and
//! collision avoidance, and appends a structured outcome to the run log.
//! Per-note and per-resource failures become log records at the narrowest
//! scope and never abort sibling notes.

use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info, warn};

use crate::assemble::assemble;
use crate::error::Error;
use crate::path_utils::{ScratchDir, dedup_path, new_note_id, sanitize_title};
use crate::render::text::render_text;
use crate::runlog::{NoteRecord, RecordKind, RunLog};
use crate::types::Note;

/// Length of the generated note identifier prefix.
const NOTE_ID_LENGTH: usize = 6;

/// Terminal routing states for one note.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Routing {
    /// No title: hard skip, no output, no log record.
    TitleMissing,
    /// More than one attachment, or text alongside attachments: one merged
    /// PDF plus separately saved unsupported files.
    MultiItem,
    /// Exactly one attachment and no text: passthrough copy in its original
    /// format.
    SingleResource,
    /// Text and nothing else: a text-rendered PDF.
    TextOnly,
    /// Neither text nor attachments: no output, no log record.
    Empty,
}

/// Decides the output strategy for a note. Order matters and is exact:
/// title, then multi-item, then single resource, then text-only.
pub fn decide(note: &Note) -> Routing {
    if note.title.is_none() {
        return Routing::TitleMissing;
    }
    let resources = note.attachments.len();
    if resources > 1 || (note.has_text() && resources >= 1) {
        return Routing::MultiItem;
    }
    if resources == 1 {
        return Routing::SingleResource;
    }
    if note.has_text() {
        return Routing::TextOnly;
    }
    Routing::Empty
}

/// Where a note's artifacts go and how they are labeled.
#[derive(Debug)]
pub struct NotebookTarget<'a> {
    /// Notebook name (the export file's stem).
    pub notebook: &'a str,
    /// Source export file name, recorded with every outcome.
    pub source_file: &'a str,
    /// Output directory owned by this notebook.
    pub dir: &'a Path,
    /// Suppress identifier prefixes in every artifact name.
    pub preserve_filenames: bool,
}

/// Routes one note to its handler.
pub fn route(note: &Note, target: &NotebookTarget<'_>, log: &mut RunLog) {
    let Some(title) = note.title.as_deref() else {
        return;
    };
    let routing = decide(note);
    if routing == Routing::Empty {
        return;
    }

    let safe_title = sanitize_title(title);
    let note_id = if target.preserve_filenames {
        String::new()
    } else {
        new_note_id(NOTE_ID_LENGTH)
    };

    if let Err(e) = fs::create_dir_all(target.dir) {
        log.append(
            target.notebook,
            NoteRecord::failure(
                target.source_file,
                target.notebook,
                &safe_title,
                &note_id,
                format!("Cannot create notebook directory: {e}"),
            ),
        );
        return;
    }

    match routing {
        Routing::MultiItem => handle_multi_item(note, target, &safe_title, &note_id, log),
        Routing::SingleResource => handle_single_resource(note, target, &safe_title, &note_id, log),
        Routing::TextOnly => handle_text_only(note, target, &safe_title, &note_id, log),
        // both ruled out above
        Routing::TitleMissing | Routing::Empty => {}
    }
}

/// Joins the identifier and title the way the naming contract spells it:
/// `"{id} - {rest}"`, with the identifier and its separator omitted entirely
/// in preservation mode.
fn prefixed(note_id: &str, rest: &str) -> String {
    if note_id.is_empty() {
        rest.to_string()
    } else {
        format!("{note_id} - {rest}")
    }
}

fn handle_text_only(
    note: &Note,
    target: &NotebookTarget<'_>,
    safe_title: &str,
    note_id: &str,
    log: &mut RunLog,
) {
    // text-only names join id and title with a bare dash, unlike the others
    let file_name = if note_id.is_empty() {
        format!("{safe_title}.pdf")
    } else {
        format!("{note_id}-{safe_title}.pdf")
    };
    let path = dedup_path(&target.dir.join(file_name), log);

    let text = note.text.as_deref().unwrap_or_default();
    match render_text(text, &path) {
        Ok(()) => {
            info!("created text-only PDF: {}", path.display());
            log.append(
                target.notebook,
                NoteRecord::success(
                    target.source_file,
                    target.notebook,
                    safe_title,
                    note_id,
                    RecordKind::TextOnlyPdf,
                    &path,
                ),
            );
        }
        Err(e) => {
            warn!("text-only PDF failed for '{safe_title}': {e}");
            log.append(
                target.notebook,
                NoteRecord::failure(
                    target.source_file,
                    target.notebook,
                    safe_title,
                    note_id,
                    format!("PDF creation failed: {e}"),
                ),
            );
        }
    }
}

fn handle_single_resource(
    note: &Note,
    target: &NotebookTarget<'_>,
    safe_title: &str,
    note_id: &str,
    log: &mut RunLog,
) {
    // only the first (and only) resource is used
    let Some(attachment) = note.attachments.first() else {
        return;
    };
    if !attachment.is_usable() {
        log.append(
            target.notebook,
            NoteRecord::failure(
                target.source_file,
                target.notebook,
                safe_title,
                note_id,
                "Missing mime type or resource data".to_string(),
            ),
        );
        return;
    }

    let file_name = prefixed(note_id, &format!("{safe_title}{}", attachment.extension()));
    let path = dedup_path(&target.dir.join(file_name), log);

    let written = attachment
        .payload()
        .and_then(|bytes| fs::write(&path, bytes).map_err(Error::from));
    match written {
        Ok(()) => {
            info!("saved single resource: {}", path.display());
            log.append(
                target.notebook,
                NoteRecord::success(
                    target.source_file,
                    target.notebook,
                    safe_title,
                    note_id,
                    RecordKind::SingleResource,
                    &path,
                ),
            );
        }
        Err(e) => {
            warn!("single resource failed for '{safe_title}': {e}");
            log.append(
                target.notebook,
                NoteRecord::failure(
                    target.source_file,
                    target.notebook,
                    safe_title,
                    note_id,
                    format!("Base64 decoding or file write failed: {e}"),
                ),
            );
        }
    }
}

fn handle_multi_item(
    note: &Note,
    target: &NotebookTarget<'_>,
    safe_title: &str,
    note_id: &str,
    log: &mut RunLog,
) {
    let mut scratch = match ScratchDir::create(target.dir, "resources") {
        Ok(scratch) => scratch,
        Err(e) => {
            log.append(
                target.notebook,
                NoteRecord::failure(
                    target.source_file,
                    target.notebook,
                    safe_title,
                    note_id,
                    format!("Cannot create scratch directory: {e}"),
                ),
            );
            return;
        }
    };

    // Materialize each usable attachment into the scratch directory, in
    // source order. A resource missing its mime or data fields, or carrying
    // an undecodable payload, is skipped here, not escalated.
    let mut resource_paths: Vec<PathBuf> = Vec::new();
    for (idx, attachment) in note.attachments.iter().enumerate() {
        if !attachment.is_usable() {
            debug!("note '{safe_title}': resource {idx} lacks mime or data, skipping");
            continue;
        }
        let path = scratch.claim(&format!("resource_{idx}{}", attachment.extension()));
        match attachment
            .payload()
            .and_then(|bytes| fs::write(&path, bytes).map_err(Error::from))
        {
            Ok(()) => resource_paths.push(path),
            Err(e) => warn!("note '{safe_title}': error decoding resource {idx}: {e}"),
        }
    }

    let pdf_name = prefixed(note_id, &format!("{safe_title}-MultiItem.pdf"));
    let out_path = dedup_path(&target.dir.join(pdf_name), log);

    match assemble(note.text.as_deref(), &resource_paths, &out_path) {
        Ok(outcome) => {
            if outcome.created {
                info!("created multi-item PDF: {}", out_path.display());
                log.append(
                    target.notebook,
                    NoteRecord::success(
                        target.source_file,
                        target.notebook,
                        safe_title,
                        note_id,
                        RecordKind::MultiItemPdf,
                        &out_path,
                    ),
                );
            }
            relocate_unsupported(&outcome.unsupported, target, safe_title, note_id, log);
        }
        Err(e) => {
            warn!("multi-item PDF failed for '{safe_title}': {e}");
            log.append(
                target.notebook,
                NoteRecord::failure(
                    target.source_file,
                    target.notebook,
                    safe_title,
                    note_id,
                    format!("PDF creation failed: {e}"),
                ),
            );
        }
    }
    // scratch drop deletes the decoded files that were not renamed away and
    // removes the directory iff it ended up empty
}

/// Moves each unsupported file out of the scratch directory to a final,
/// collision-guarded location of its own, logging one record per file.
fn relocate_unsupported(
    unsupported: &[PathBuf],
    target: &NotebookTarget<'_>,
    safe_title: &str,
    note_id: &str,
    log: &mut RunLog,
) {
    if unsupported.is_empty() {
        return;
    }
    info!(
        "note '{safe_title}' has {} unsupported file(s), saving separately",
        unsupported.len()
    );

    for file in unsupported {
        let original_name = file
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let separate_name = prefixed(note_id, &format!("{safe_title}-{original_name}"));
        let separate_path = dedup_path(&target.dir.join(separate_name), log);

        match fs::rename(file, &separate_path) {
            Ok(()) => {
                info!("saved separately: {}", separate_path.display());
                log.append(
                    target.notebook,
                    NoteRecord::success(
                        target.source_file,
                        target.notebook,
                        safe_title,
                        note_id,
                        RecordKind::UnsupportedSeparateFile,
                        &separate_path,
                    )
                    .with_warning("File type not supported in PDF merge - saved separately"),
                );
            }
            Err(e) => {
                warn!("could not relocate {}: {e}", file.display());
                log.append(
                    target.notebook,
                    NoteRecord::failure(
                        target.source_file,
                        target.notebook,
                        safe_title,
                        note_id,
                        format!("Could not save unsupported file '{original_name}': {e}"),
                    ),
                );
            }
        }
    }
}
