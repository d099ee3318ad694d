//! Raster image to single-page PDF rendering.
//!
//! The image is decoded, flattened to opaque truecolor, and placed on one
//! Letter page with a fixed half-inch margin on every side. Oversized images
//! are downscaled uniformly; smaller images keep their native pixel size
//! (one pixel per point).

use std::path::Path;

use image::{Rgb, RgbImage};
use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, Stream, dictionary};

use crate::error::Result;
use crate::render::{IMAGE_MARGIN, PAGE_HEIGHT, PAGE_WIDTH};

/// Renders the image at `image_path` onto a single PDF page at `out_path`.
pub fn render_image(image_path: &Path, out_path: &Path) -> Result<()> {
    let decoded = image::open(image_path)?;

    // The target format has no transparency: composite alpha sources onto an
    // opaque white canvas, using the alpha channel as the blend mask. Every
    // other mode converts straight to truecolor.
    let rgb: RgbImage = if decoded.color().has_alpha() {
        let rgba = decoded.to_rgba8();
        let (w, h) = rgba.dimensions();
        let mut flat = RgbImage::from_pixel(w, h, Rgb([255, 255, 255]));
        for (x, y, pixel) in rgba.enumerate_pixels() {
            let alpha = pixel[3] as u16;
            let blend = |channel: u8| -> u8 {
                ((channel as u16 * alpha + 255 * (255 - alpha)) / 255) as u8
            };
            flat.put_pixel(x, y, Rgb([blend(pixel[0]), blend(pixel[1]), blend(pixel[2])]));
        }
        flat
    } else {
        decoded.to_rgb8()
    };

    let (width, height) = rgb.dimensions();
    let (display_width, display_height) = fit_to_page(width as f32, height as f32);
    let x = (PAGE_WIDTH - display_width) / 2.0;
    let y = (PAGE_HEIGHT - display_height) / 2.0;

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let image_id = doc.add_object(Stream::new(
        dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => width as i64,
            "Height" => height as i64,
            "ColorSpace" => "DeviceRGB",
            "BitsPerComponent" => 8,
        },
        rgb.into_raw(),
    ));
    let resources_id = doc.add_object(dictionary! {
        "XObject" => dictionary! { "Im0" => image_id },
    });

    let ops = vec![
        Operation::new("q", vec![]),
        Operation::new(
            "cm",
            vec![
                display_width.into(),
                0.into(),
                0.into(),
                display_height.into(),
                x.into(),
                y.into(),
            ],
        ),
        Operation::new("Do", vec!["Im0".into()]),
        Operation::new("Q", vec![]),
    ];
    let content = Content { operations: ops };
    let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode()?));
    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "Contents" => content_id,
        "MediaBox" => vec![0.into(), 0.into(), PAGE_WIDTH.into(), PAGE_HEIGHT.into()],
        "Resources" => resources_id,
    });

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => vec![page_id.into()],
            "Count" => 1,
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

/// Display dimensions for an image of `width` x `height` points.
///
/// When either dimension exceeds the margin-adjusted page area, the image is
/// scaled uniformly so the binding dimension (width for landscape, height
/// for portrait and square) meets its margin limit. Otherwise the native
/// size is kept.
fn fit_to_page(width: f32, height: f32) -> (f32, f32) {
    let max_width = PAGE_WIDTH - 2.0 * IMAGE_MARGIN;
    let max_height = PAGE_HEIGHT - 2.0 * IMAGE_MARGIN;
    let aspect = width / height;

    if width > max_width || height > max_height {
        if aspect > 1.0 {
            (max_width, max_width / aspect)
        } else {
            (max_height * aspect, max_height)
        }
    } else {
        (width, height)
    }
}
