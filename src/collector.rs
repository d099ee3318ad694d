//! Export-file discovery and ENEX parsing.
//!
//! An export file is an XML document whose root holds zero or more `note`
//! elements; each note has a `title`, an optional `content` child carrying
//! escaped markup, and zero or more `resource` children with `mime` and
//! base64 `data` elements. This module turns one export file into a sequence
//! of [`Note`] records and flattens the content markup into plain text.

use std::fs;
use std::path::{Path, PathBuf};

use quick_xml::Reader;
use quick_xml::events::Event;

use crate::error::{Error, Result};
use crate::types::{Attachment, Note};

/// Lists the `.enex` files directly inside `input_dir`, sorted by name so
/// runs process notebooks in a deterministic order.
pub fn list_export_files(input_dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files: Vec<PathBuf> = fs::read_dir(input_dir)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| {
            path.is_file()
                && path
                    .extension()
                    .and_then(|e| e.to_str())
                    .is_some_and(|e| e.eq_ignore_ascii_case("enex"))
        })
        .collect();
    files.sort();
    Ok(files)
}

/// Parses one export file into its notes, in document order.
///
/// A malformed file yields a [`Error::Parse`] and abandons only that file;
/// sibling export files are unaffected.
pub fn parse_export_file(path: &Path) -> Result<Vec<Note>> {
    let raw = fs::read_to_string(path)?;
    parse_notes(&raw).map_err(|e| Error::Parse(path.to_path_buf(), e.to_string()))
}

/// Parses ENEX markup into notes.
pub fn parse_notes(xml: &str) -> Result<Vec<Note>> {
    let mut reader = Reader::from_str(xml);
    let mut notes = Vec::new();

    let mut stack: Vec<Vec<u8>> = Vec::new();
    let mut note: Option<Note> = None;
    let mut attachment: Option<Attachment> = None;
    let mut title = String::new();
    let mut content = String::new();
    let mut mime = String::new();
    let mut data = String::new();

    loop {
        match reader.read_event()? {
            Event::Start(start) => {
                let name = start.name().as_ref().to_vec();
                match name.as_slice() {
                    b"note" => {
                        note = Some(Note::default());
                        title.clear();
                        content.clear();
                    }
                    b"resource" if note.is_some() => {
                        attachment = Some(Attachment::default());
                        mime.clear();
                        data.clear();
                    }
                    _ => {}
                }
                stack.push(name);
            }
            Event::End(end) => {
                match end.name().as_ref() {
                    b"note" => {
                        if let Some(mut finished) = note.take() {
                            let trimmed = title.trim();
                            finished.title =
                                (!trimmed.is_empty()).then(|| trimmed.to_string());
                            finished.text = flatten_content(&content);
                            notes.push(finished);
                        }
                    }
                    b"resource" => {
                        if let (Some(mut finished), Some(parent)) =
                            (attachment.take(), note.as_mut())
                        {
                            let mime = mime.trim();
                            let data = data.trim();
                            finished.mime = (!mime.is_empty()).then(|| mime.to_string());
                            finished.data = (!data.is_empty()).then(|| data.to_string());
                            parent.attachments.push(finished);
                        }
                    }
                    _ => {}
                }
                stack.pop();
            }
            Event::Text(text) => {
                let value = match text.unescape() {
                    Ok(cow) => cow.into_owned(),
                    Err(_) => String::from_utf8_lossy(text.as_ref()).into_owned(),
                };
                append_field(&stack, &mut title, &mut content, &mut mime, &mut data, &value);
            }
            Event::CData(cdata) => {
                let value = String::from_utf8_lossy(&cdata.into_inner()).into_owned();
                append_field(&stack, &mut title, &mut content, &mut mime, &mut data, &value);
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(notes)
}

/// Routes a text chunk to the field the element stack currently addresses.
fn append_field(
    stack: &[Vec<u8>],
    title: &mut String,
    content: &mut String,
    mime: &mut String,
    data: &mut String,
    value: &str,
) {
    let Some(last) = stack.last() else { return };
    let parent = stack.len().checked_sub(2).map(|i| stack[i].as_slice());

    match (parent, last.as_slice()) {
        (Some(b"note"), b"title") => title.push_str(value),
        (Some(b"note"), b"content") => content.push_str(value),
        (Some(b"resource"), b"mime") => mime.push_str(value),
        (Some(b"resource"), b"data") => data.push_str(value),
        _ => {}
    }
}

/// Flattens escaped content markup into plain text: every text node, joined
/// with newlines and trimmed. Malformed markup yields `None`; the note may
/// still carry resources worth processing.
pub fn flatten_content(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    let mut reader = Reader::from_str(trimmed);
    let mut parts: Vec<String> = Vec::new();
    loop {
        match reader.read_event() {
            Ok(Event::Text(text)) => {
                let value = match text.unescape() {
                    Ok(cow) => cow.into_owned(),
                    Err(_) => String::from_utf8_lossy(text.as_ref()).into_owned(),
                };
                parts.push(value);
            }
            Ok(Event::CData(cdata)) => {
                parts.push(String::from_utf8_lossy(&cdata.into_inner()).into_owned());
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(_) => return None,
        }
    }

    let joined = parts.join("\n");
    let flat = joined.trim();
    (!flat.is_empty()).then(|| flat.to_string())
}
