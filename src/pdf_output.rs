//! PDF output: wrap an encoded canvas into a single-page document.
//!
//! The page is sized exactly to the canvas in pixel units (one PDF user
//! unit per pixel), so orientation follows the dimensions: landscape
//! when width > height, portrait otherwise. The canvas is embedded as a
//! DCTDecode (JPEG) image XObject drawn across the full media box.

use crate::constants::INTERMEDIATE_JPEG_QUALITY;
use crate::error::{ConvertError, Result};
use image::codecs::jpeg::JpegEncoder;
use image::RgbImage;
use lopdf::{dictionary, Document, Object, Stream};
use std::io::Cursor;

/// Build a single-page PDF containing `canvas` as its only content.
///
/// The embedded image is JPEG-encoded at [`INTERMEDIATE_JPEG_QUALITY`],
/// independent of the user quality setting.
pub fn build_single_page_pdf(canvas: &RgbImage) -> Result<Vec<u8>> {
    let (width, height) = canvas.dimensions();

    let mut jpeg_bytes = Vec::new();
    let encoder =
        JpegEncoder::new_with_quality(Cursor::new(&mut jpeg_bytes), INTERMEDIATE_JPEG_QUALITY);
    canvas
        .write_with_encoder(encoder)
        .map_err(|e| encode_error(e.to_string()))?;

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
            "Filter" => "DCTDecode",
        },
        jpeg_bytes,
    ));

    // Scale the unit image square up to the full page.
    let content = format!("q\n{} 0 0 {} 0 0 cm\n/Im0 Do\nQ", width, height);
    let content_id = doc.add_object(Stream::new(dictionary! {}, content.into_bytes()));

    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "MediaBox" => vec![
            0.into(),
            0.into(),
            (width as i64).into(),
            (height as i64).into(),
        ],
        "Contents" => content_id,
        "Resources" => dictionary! {
            "XObject" => dictionary! {
                "Im0" => image_id,
            },
        },
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

    let mut bytes = Vec::new();
    doc.save_to(&mut Cursor::new(&mut bytes))
        .map_err(|e| encode_error(e.to_string()))?;

    if bytes.is_empty() {
        return Err(encode_error("writer produced an empty document".to_string()));
    }

    Ok(bytes)
}

fn encode_error(detail: String) -> ConvertError {
    ConvertError::Encode {
        format: "pdf".to_string(),
        detail,
    }
}
