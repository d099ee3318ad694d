//! Single-artifact PDF renderers and the merge engine.
//!
//! This module contains the three page-producing building blocks used by
//! multi-item assembly: plain text to a paginated PDF, a raster image to a
//! single fitted page, and ordered concatenation of existing PDFs. All three
//! build documents directly with `lopdf` primitives.

pub mod image;
pub mod merge;
pub mod text;

/// US Letter page width, in points.
pub(crate) const PAGE_WIDTH: f32 = 612.0;
/// US Letter page height, in points.
pub(crate) const PAGE_HEIGHT: f32 = 792.0;
/// Margin around rendered text, in points (1 inch).
pub(crate) const TEXT_MARGIN: f32 = 72.0;
/// Margin around a placed image, in points (0.5 inch).
pub(crate) const IMAGE_MARGIN: f32 = 36.0;

/// Encodes text as WinAnsi bytes for the built-in Type1 fonts.
///
/// ASCII and Latin-1 pass through; a handful of common punctuation marks map
/// into the WinAnsi 0x80 range; everything else degrades to `?`.
pub(crate) fn encode_win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match c {
            c if (c as u32) < 0x80 => c as u8,
            '\u{a0}'..='\u{ff}' => c as u8,
            '\u{2018}' => 0x91,
            '\u{2019}' => 0x92,
            '\u{201c}' => 0x93,
            '\u{201d}' => 0x94,
            '\u{2013}' => 0x96,
            '\u{2014}' => 0x97,
            '\u{2022}' => 0x95,
            '\u{2026}' => 0x85,
            _ => b'?',
        })
        .collect()
}
