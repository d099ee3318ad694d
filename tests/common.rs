//! Common test utilities for the Ikou crate.
//!
//! Provides ENEX document builders, dummy image/PDF fixtures, and helpers
//! for inspecting generated PDF files.

use std::io::Cursor;
use std::path::Path;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use image::{ImageFormat, Rgb, RgbImage, Rgba, RgbaImage};
use lopdf::Document;

use ikou::render::text::render_text;

/// Builds the XML for a single `note` element.
///
/// `content_body` is inner en-note markup (e.g. `"<div>Hello</div>"`);
/// resources are `(mime, base64_data)` pairs.
#[allow(dead_code)]
pub fn note_xml(
    title: Option<&str>,
    content_body: Option<&str>,
    resources: &[(&str, String)],
) -> String {
    let mut xml = String::from("<note>");
    if let Some(title) = title {
        xml.push_str(&format!("<title>{title}</title>"));
    }
    if let Some(body) = content_body {
        xml.push_str(&format!(
            "<content><![CDATA[<?xml version=\"1.0\" encoding=\"UTF-8\"?>\
             <en-note>{body}</en-note>]]></content>"
        ));
    }
    for (mime, data) in resources {
        xml.push_str(&format!(
            "<resource><data encoding=\"base64\">{data}</data><mime>{mime}</mime></resource>"
        ));
    }
    xml.push_str("</note>");
    xml
}

/// Wraps note elements into a full export document.
#[allow(dead_code)]
pub fn enex_document(notes: &[String]) -> String {
    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\
         <en-export export-date=\"20240101T000000Z\" application=\"Evernote\">{}</en-export>",
        notes.concat()
    )
}

/// Base64-encodes bytes the way export files do: wrapped across lines.
#[allow(dead_code)]
pub fn b64_wrapped(bytes: &[u8]) -> String {
    let encoded = STANDARD.encode(bytes);
    encoded
        .as_bytes()
        .chunks(60)
        .map(|chunk| std::str::from_utf8(chunk).unwrap())
        .collect::<Vec<_>>()
        .join("\n")
}

/// An in-memory PNG of the given size, solid red.
#[allow(dead_code)]
pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = RgbImage::from_pixel(width, height, Rgb([200, 30, 30]));
    let mut cursor = Cursor::new(Vec::new());
    img.write_to(&mut cursor, ImageFormat::Png).unwrap();
    cursor.into_inner()
}

/// An in-memory PNG with an alpha channel (half-transparent green).
#[allow(dead_code)]
pub fn rgba_png_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = RgbaImage::from_pixel(width, height, Rgba([30, 200, 30, 128]));
    let mut cursor = Cursor::new(Vec::new());
    img.write_to(&mut cursor, ImageFormat::Png).unwrap();
    cursor.into_inner()
}

/// Writes a small single-page PDF to `path` and returns its bytes.
#[allow(dead_code)]
pub fn write_sample_pdf(path: &Path) -> Vec<u8> {
    render_text("sample attachment page", path).unwrap();
    std::fs::read(path).unwrap()
}

/// Number of pages in the PDF at `path`.
#[allow(dead_code)]
pub fn page_count(path: &Path) -> usize {
    Document::load(path).unwrap().get_pages().len()
}

/// Operators of a page's content stream, in order (1-based page number).
#[allow(dead_code)]
pub fn page_operators(path: &Path, page_number: u32) -> Vec<String> {
    let mut doc = Document::load(path).unwrap();
    doc.decompress();
    let page_id = *doc.get_pages().get(&page_number).unwrap();
    let content = doc.get_page_content(page_id).unwrap();
    lopdf::content::Content::decode(&content)
        .unwrap()
        .operations
        .into_iter()
        .map(|op| op.operator)
        .collect()
}
