//! Plain text to PDF rendering.
//!
//! Each non-blank source line becomes one left-aligned 11pt paragraph,
//! word-wrapped to the printable width; each blank line becomes a fixed
//! vertical gap instead of an empty text operation. Paragraphs flow onto
//! successive Letter pages automatically.

use std::path::Path;

use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, Stream, StringFormat, dictionary};

use crate::error::Result;
use crate::render::{PAGE_HEIGHT, PAGE_WIDTH, TEXT_MARGIN, encode_win_ansi};

const FONT_SIZE: f32 = 11.0;
/// Baseline-to-baseline distance within a paragraph.
const LEADING: f32 = 14.0;
/// Extra space after each paragraph.
const PARAGRAPH_GAP: f32 = 12.0;
/// Height of the gap a blank source line produces (0.2 inch).
const BLANK_LINE_GAP: f32 = 14.4;

/// Renders `text` into a paginated PDF at `out_path`.
pub fn render_text(text: &str, out_path: &Path) -> Result<()> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
        "Encoding" => "WinAnsiEncoding",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });

    let max_width = PAGE_WIDTH - 2.0 * TEXT_MARGIN;
    // (baseline y, encoded line) per page
    let mut pages: Vec<Vec<(f32, Vec<u8>)>> = Vec::new();
    let mut current: Vec<(f32, Vec<u8>)> = Vec::new();
    let mut y = PAGE_HEIGHT - TEXT_MARGIN;

    for line in text.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            y = (y - BLANK_LINE_GAP).max(TEXT_MARGIN);
            continue;
        }
        for wrapped in wrap_paragraph(trimmed, max_width) {
            y -= LEADING;
            if y < TEXT_MARGIN {
                pages.push(std::mem::take(&mut current));
                y = PAGE_HEIGHT - TEXT_MARGIN - LEADING;
            }
            current.push((y, encode_win_ansi(&wrapped)));
        }
        y -= PARAGRAPH_GAP;
    }
    // a document always has at least one page, even for all-blank input
    pages.push(current);

    let mut kids: Vec<Object> = Vec::with_capacity(pages.len());
    for lines in pages {
        let mut ops = vec![
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec!["F1".into(), FONT_SIZE.into()]),
        ];
        for (baseline, encoded) in lines {
            ops.push(Operation::new(
                "Tm",
                vec![
                    1.into(),
                    0.into(),
                    0.into(),
                    1.into(),
                    TEXT_MARGIN.into(),
                    baseline.into(),
                ],
            ));
            ops.push(Operation::new(
                "Tj",
                vec![Object::String(encoded, StringFormat::Hexadecimal)],
            ));
        }
        ops.push(Operation::new("ET", vec![]));

        let content = Content { operations: ops };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode()?));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "MediaBox" => vec![0.into(), 0.into(), PAGE_WIDTH.into(), PAGE_HEIGHT.into()],
            "Resources" => resources_id,
        });
        kids.push(page_id.into());
    }

    let page_count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => page_count,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc.compress();
    doc.save(out_path)?;
    Ok(())
}

/// Greedy word-wrap against coarse Helvetica advance widths. Words wider
/// than the printable width are hard-split on character boundaries.
fn wrap_paragraph(paragraph: &str, max_width: f32) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut current_width = 0.0;
    let space_width = glyph_width(' ') * FONT_SIZE;

    for word in paragraph.split_whitespace() {
        let word_width: f32 = word.chars().map(|c| glyph_width(c) * FONT_SIZE).sum();

        if word_width > max_width {
            // flush, then hard-split the oversized word
            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
                current_width = 0.0;
            }
            let mut piece = String::new();
            let mut piece_width = 0.0;
            for c in word.chars() {
                let w = glyph_width(c) * FONT_SIZE;
                if piece_width + w > max_width && !piece.is_empty() {
                    lines.push(std::mem::take(&mut piece));
                    piece_width = 0.0;
                }
                piece.push(c);
                piece_width += w;
            }
            current = piece;
            current_width = piece_width;
            continue;
        }

        let needed = if current.is_empty() {
            word_width
        } else {
            space_width + word_width
        };
        if current_width + needed > max_width && !current.is_empty() {
            lines.push(std::mem::take(&mut current));
            current_width = 0.0;
            current.push_str(word);
            current_width += word_width;
        } else {
            if !current.is_empty() {
                current.push(' ');
            }
            current.push_str(word);
            current_width += needed;
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

/// Approximate Helvetica advance width as a fraction of the font size.
fn glyph_width(c: char) -> f32 {
    match c {
        'i' | 'j' | 'l' | 'I' | '.' | ',' | ';' | ':' | '\'' | '|' | '!' => 0.28,
        'f' | 't' | 'r' | ' ' | '(' | ')' | '[' | ']' | '-' | '"' => 0.33,
        'm' | 'w' | 'M' | 'W' | '@' | '%' => 0.89,
        'A'..='Z' | '0'..='9' => 0.67,
        _ => 0.5,
    }
}
