//! Unit tests for core Ikou functionality.
//!
//! Tests individual components in isolation without full pipeline execution.

use std::fs;
use std::path::{Path, PathBuf};

use ikou::collector::{flatten_content, parse_notes};
use ikou::prelude::*;
use ikou::render::image::render_image;
use ikou::render::merge::merge_pdfs;
use ikou::render::text::render_text;
use ikou::types::{classify, extension_for_mime};

mod common;
use common::{b64_wrapped, enex_document, note_xml, page_count, page_operators, png_bytes};

#[test]
fn test_classify_by_extension() {
    assert_eq!(classify(Path::new("photo.jpg")), FileCategory::Image);
    assert_eq!(classify(Path::new("photo.JPG")), FileCategory::Image);
    assert_eq!(classify(Path::new("scan.webp")), FileCategory::Image);
    assert_eq!(classify(Path::new("document.pdf")), FileCategory::Pdf);
    assert_eq!(classify(Path::new("video.mp4")), FileCategory::Unsupported);
    assert_eq!(classify(Path::new("archive.zip")), FileCategory::Unsupported);
    assert_eq!(classify(Path::new("page.html")), FileCategory::Unsupported);
    assert_eq!(classify(Path::new("report.docx")), FileCategory::Unsupported);
    assert_eq!(classify(Path::new("file.xyz")), FileCategory::Unknown);
    assert_eq!(classify(Path::new("no_extension")), FileCategory::Unknown);
}

#[test]
fn test_unknown_and_unsupported_both_excluded_from_merge() {
    assert!(!FileCategory::Unsupported.mergeable());
    assert!(!FileCategory::Unknown.mergeable());
    assert!(FileCategory::Image.mergeable());
    assert!(FileCategory::Pdf.mergeable());
}

#[test]
fn test_extension_for_mime_is_deterministic() {
    let first = extension_for_mime("image/jpeg");
    let second = extension_for_mime("image/jpeg");
    assert_eq!(first, second);
    assert!(first == ".jpg" || first == ".jpeg");

    assert_eq!(extension_for_mime("application/pdf"), ".pdf");
    assert_eq!(extension_for_mime("image/png"), ".png");
    assert_eq!(extension_for_mime("video/mp4"), ".mp4");
    assert_eq!(extension_for_mime("application/x-not-a-real-type"), "");
}

#[test]
fn test_attachment_payload_strips_line_wrapping() {
    let attachment = Attachment {
        mime: Some("image/png".to_string()),
        data: Some(b64_wrapped(b"hello attachment bytes")),
    };
    assert!(attachment.is_usable());
    assert_eq!(attachment.payload().unwrap(), b"hello attachment bytes");
}

#[test]
fn test_attachment_without_fields_is_unusable() {
    assert!(!Attachment::default().is_usable());
    let missing_data = Attachment {
        mime: Some("image/png".to_string()),
        data: None,
    };
    assert!(!missing_data.is_usable());
    let blank_mime = Attachment {
        mime: Some("  ".to_string()),
        data: Some("QQ==".to_string()),
    };
    assert!(!blank_mime.is_usable());
}

#[test]
fn test_parse_notes_extracts_titles_text_and_resources() {
    let xml = enex_document(&[
        note_xml(
            Some("First"),
            Some("<div>A</div><div>B</div>"),
            &[("image/png", "QQ==".to_string())],
        ),
        note_xml(None, Some("<div>untitled</div>"), &[]),
    ]);

    let notes = parse_notes(&xml).unwrap();
    assert_eq!(notes.len(), 2);

    assert_eq!(notes[0].title.as_deref(), Some("First"));
    assert_eq!(notes[0].text.as_deref(), Some("A\nB"));
    assert_eq!(notes[0].attachments.len(), 1);
    assert_eq!(notes[0].attachments[0].mime.as_deref(), Some("image/png"));
    assert_eq!(notes[0].attachments[0].data.as_deref(), Some("QQ=="));

    assert!(notes[1].title.is_none());
    assert_eq!(notes[1].text.as_deref(), Some("untitled"));
}

#[test]
fn test_parse_notes_with_malformed_content_keeps_resources() {
    let xml = enex_document(&[
        "<note><title>Broken</title>\
         <content><![CDATA[<en-note><div>A</wrong></en-note>]]></content>\
         <resource><data>QQ==</data><mime>application/pdf</mime></resource></note>"
            .to_string(),
    ]);
    let notes = parse_notes(&xml).unwrap();
    assert_eq!(notes.len(), 1);
    assert!(notes[0].text.is_none());
    assert_eq!(notes[0].attachments.len(), 1);
}

#[test]
fn test_flatten_content_joins_text_nodes() {
    assert_eq!(
        flatten_content("<en-note><div>A</div><div>B</div></en-note>").as_deref(),
        Some("A\nB")
    );
    assert_eq!(flatten_content("plain text").as_deref(), Some("plain text"));
    assert_eq!(flatten_content("<en-note></en-note>"), None);
    assert_eq!(flatten_content(""), None);
}

#[test]
fn test_render_text_blank_lines_become_gaps_not_paragraphs() {
    let tmp = tempfile::tempdir().unwrap();
    let out = tmp.path().join("text.pdf");
    render_text("A\n\nB", &out).unwrap();

    assert_eq!(page_count(&out), 1);
    let operators = page_operators(&out, 1);
    // one text op per paragraph; the blank line contributes no empty Tj
    let text_ops = operators.iter().filter(|op| *op == "Tj").count();
    assert_eq!(text_ops, 2);
}

#[test]
fn test_render_text_paginates_long_input() {
    let tmp = tempfile::tempdir().unwrap();
    let out = tmp.path().join("long.pdf");
    let text = (0..120)
        .map(|i| format!("paragraph number {i}"))
        .collect::<Vec<_>>()
        .join("\n");
    render_text(&text, &out).unwrap();
    assert!(page_count(&out) > 1);
}

#[test]
fn test_render_image_single_page_at_native_size() {
    let tmp = tempfile::tempdir().unwrap();
    let src = tmp.path().join("small.png");
    fs::write(&src, png_bytes(100, 80)).unwrap();

    let out = tmp.path().join("small.pdf");
    render_image(&src, &out).unwrap();
    assert_eq!(page_count(&out), 1);
    assert!(page_operators(&out, 1).contains(&"Do".to_string()));
}

#[test]
fn test_render_image_flattens_alpha() {
    let tmp = tempfile::tempdir().unwrap();
    let src = tmp.path().join("alpha.png");
    fs::write(&src, common::rgba_png_bytes(32, 32)).unwrap();

    let out = tmp.path().join("alpha.pdf");
    render_image(&src, &out).unwrap();
    assert_eq!(page_count(&out), 1);
}

#[test]
fn test_render_image_rejects_undecodable_input() {
    let tmp = tempfile::tempdir().unwrap();
    let src = tmp.path().join("garbage.png");
    fs::write(&src, b"definitely not an image").unwrap();

    let out = tmp.path().join("garbage.pdf");
    assert!(render_image(&src, &out).is_err());
    assert!(!out.exists());
}

#[test]
fn test_merge_preserves_page_order() {
    let tmp = tempfile::tempdir().unwrap();
    let text_pdf = tmp.path().join("text.pdf");
    render_text("text page", &text_pdf).unwrap();

    let img_src = tmp.path().join("img.png");
    fs::write(&img_src, png_bytes(64, 64)).unwrap();
    let image_pdf = tmp.path().join("image.pdf");
    render_image(&img_src, &image_pdf).unwrap();

    let out = tmp.path().join("merged.pdf");
    let pages = merge_pdfs(&[text_pdf, image_pdf], &out).unwrap();
    assert_eq!(pages, 2);
    assert_eq!(page_count(&out), 2);

    // page 1 came from the text renderer, page 2 from the image renderer
    assert!(page_operators(&out, 1).contains(&"Tj".to_string()));
    assert!(page_operators(&out, 2).contains(&"Do".to_string()));
}

#[test]
fn test_merge_skips_unreadable_inputs() {
    let tmp = tempfile::tempdir().unwrap();
    let good = tmp.path().join("good.pdf");
    render_text("good page", &good).unwrap();
    let bad = tmp.path().join("bad.pdf");
    fs::write(&bad, b"not a pdf at all").unwrap();

    let out = tmp.path().join("merged.pdf");
    let pages = merge_pdfs(&[bad.clone(), good], &out).unwrap();
    assert_eq!(pages, 1);
    assert_eq!(page_count(&out), 1);
}

#[test]
fn test_merge_with_no_readable_pages_writes_nothing() {
    let tmp = tempfile::tempdir().unwrap();
    let bad = tmp.path().join("bad.pdf");
    fs::write(&bad, b"still not a pdf").unwrap();

    let out = tmp.path().join("merged.pdf");
    assert_eq!(merge_pdfs(&[bad], &out).unwrap(), 0);
    assert!(!out.exists());
}

#[test]
fn test_runlog_round_trip_and_reserved_warnings_key() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("log.json");

    let mut log = RunLog::default();
    log.open_notebook("Notebook");
    log.append(
        "Notebook",
        NoteRecord::success(
            "Notebook.enex",
            "Notebook",
            "My Note",
            "A3B9K2",
            RecordKind::TextOnlyPdf,
            &PathBuf::from("/out/A3B9K2-My Note.pdf"),
        ),
    );
    log.warn_collision("a.pdf", "a_1.pdf");
    log.save(&path).unwrap();

    let raw: serde_json::Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    assert!(raw.get("Notebook").unwrap().is_array());
    assert_eq!(
        raw["Notebook"][0]["type"],
        serde_json::json!("text-only-pdf")
    );
    assert_eq!(raw["warnings"][0]["type"], serde_json::json!("filename-collision"));

    let reloaded = RunLog::load(&path);
    assert_eq!(reloaded.records("Notebook").len(), 1);
    assert!(reloaded.records("Notebook")[0].success);
    assert_eq!(reloaded.warnings.len(), 1);
}

#[test]
fn test_runlog_unparsable_file_loads_empty() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("log.json");
    fs::write(&path, "{ this is not json").unwrap();

    let log = RunLog::load(&path);
    assert!(log.notebooks.is_empty());
    assert!(log.warnings.is_empty());
}

#[test]
fn test_runlog_open_notebook_resets_previous_entries() {
    let mut log = RunLog::default();
    log.append(
        "Notebook",
        NoteRecord::file_error("Notebook.enex", "Notebook", "stale".to_string()),
    );
    log.open_notebook("Notebook");
    assert!(log.records("Notebook").is_empty());
}
