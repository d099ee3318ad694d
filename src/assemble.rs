//! Multi-item assembly: combining note text and attachments into one PDF.
//!
//! Given optional text and an ordered list of attachment files, renders the
//! mergeable parts into transient page PDFs, merges them in order, and hands
//! back the parts that cannot be merged. Transient PDFs live in a scratch
//! directory scoped to this call and are released on every exit path; the
//! caller's attachment files are never deleted here.

use std::path::{Path, PathBuf};

use log::warn;

use crate::error::{Error, Result};
use crate::path_utils::{ScratchDir, new_note_id};
use crate::render::image::render_image;
use crate::render::merge::merge_pdfs;
use crate::render::text::render_text;
use crate::types::{FileCategory, classify};

/// Result of one multi-item assembly.
#[derive(Debug)]
pub struct AssemblyOutcome {
    /// Whether a merged PDF was actually written to the output path.
    pub created: bool,
    /// Attachment files that could not participate in the merge. Ownership
    /// transfers to the caller, who relocates or deletes them.
    pub unsupported: Vec<PathBuf>,
}

/// Assembles `text` and `attachments` (in order) into a merged PDF at
/// `out_path`.
///
/// A render or merge failure escalates as an error: it is a different
/// failure class from "this type isn't supported", which merely lands the
/// file in the unsupported list.
pub fn assemble(
    text: Option<&str>,
    attachments: &[PathBuf],
    out_path: &Path,
) -> Result<AssemblyOutcome> {
    let parent = out_path.parent().ok_or_else(|| {
        Error::InvalidPath(out_path.to_path_buf(), "output path has no parent".to_string())
    })?;
    let mut scratch = ScratchDir::create(parent, "pages")?;

    let mut queue: Vec<PathBuf> = Vec::new();
    let mut unsupported: Vec<PathBuf> = Vec::new();

    if let Some(text) = text.filter(|t| !t.trim().is_empty()) {
        let page = scratch.claim(&format!("text_{}.pdf", new_note_id(6)));
        render_text(text, &page).map_err(|e| Error::Render(format!("text page: {e}")))?;
        queue.push(page);
    }

    for (idx, path) in attachments.iter().enumerate() {
        match classify(path) {
            FileCategory::Pdf => queue.push(path.clone()),
            FileCategory::Image => {
                let page = scratch.claim(&format!("img_{idx}_{}.pdf", new_note_id(6)));
                render_image(path, &page).map_err(|e| {
                    Error::Render(format!("image page for {}: {e}", path.display()))
                })?;
                queue.push(page);
            }
            FileCategory::Unsupported | FileCategory::Unknown => {
                warn!(
                    "file type not supported in PDF merge: {}",
                    path.display()
                );
                unsupported.push(path.clone());
            }
        }
    }

    if queue.is_empty() {
        return Ok(AssemblyOutcome {
            created: false,
            unsupported,
        });
    }

    let pages = merge_pdfs(&queue, out_path).map_err(|e| Error::Merge(e.to_string()))?;
    Ok(AssemblyOutcome {
        created: pages > 0,
        unsupported,
    })
}
