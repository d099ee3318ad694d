//! Ordered concatenation of PDF documents.
//!
//! Inputs are appended page-for-page in list order into a fresh document
//! with a new page tree. An input that fails to open is skipped with a
//! diagnostic and the remaining inputs are still merged; a partial merge is
//! preferred over a total failure.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use log::warn;
use lopdf::{Document, Object, ObjectId, dictionary};

use crate::error::Result;

/// Merges the readable `inputs`, in order, into `out_path`.
///
/// Returns the number of pages collected. When zero pages were collected no
/// file is written; callers distinguish "nothing to create" by the count,
/// not by an error.
pub fn merge_pdfs(inputs: &[PathBuf], out_path: &Path) -> Result<usize> {
    let mut max_id = 1u32;
    let mut page_order: Vec<ObjectId> = Vec::new();
    let mut objects: BTreeMap<ObjectId, Object> = BTreeMap::new();

    for path in inputs {
        let mut doc = match Document::load(path) {
            Ok(doc) => doc,
            Err(e) => {
                warn!("skipping unreadable PDF {}: {e}", path.display());
                continue;
            }
        };
        doc.renumber_objects_with(max_id);
        max_id = doc.max_id + 1;
        page_order.extend(doc.get_pages().into_values());
        objects.extend(doc.objects);
    }

    if page_order.is_empty() {
        return Ok(0);
    }

    let mut merged = Document::with_version("1.5");
    // the per-document roots are replaced by a fresh page tree and catalog
    merged.objects = objects
        .into_iter()
        .filter(|(_, object)| !is_root_object(object))
        .collect();
    merged.max_id = max_id;

    let pages_id = merged.new_object_id();
    for &page_id in &page_order {
        if let Ok(dict) = merged
            .get_object_mut(page_id)
            .and_then(Object::as_dict_mut)
        {
            dict.set("Parent", pages_id);
        }
    }

    let kids: Vec<Object> = page_order.iter().map(|&id| id.into()).collect();
    let page_count = page_order.len();
    merged.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => page_count as i64,
        }),
    );
    let catalog_id = merged.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    merged.trailer.set("Root", catalog_id);
    merged.renumber_objects();
    merged.compress();
    merged.save(out_path)?;
    Ok(page_count)
}

/// Whether an object is a document-structure root superseded by the merge.
fn is_root_object(object: &Object) -> bool {
    object
        .as_dict()
        .and_then(|dict| dict.get(b"Type"))
        .and_then(Object::as_name)
        .map(|name| matches!(name, b"Catalog" | b"Pages" | b"Outlines"))
        .unwrap_or(false)
}
