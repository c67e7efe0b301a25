//! PDF rasterization: first page of a PDF byte buffer → JPEG intermediate.
//!
//! Multi-page PDFs are not supported: only page 1 is rendered. This is a
//! documented limitation of the converter, not something to paper over.

use crate::constants::{INTERMEDIATE_JPEG_QUALITY, RASTER_SCALE};
use crate::error::{ConvertError, Result};
use image::codecs::jpeg::JpegEncoder;
use pdfium_render::prelude::*;
use std::io::Cursor;

/// First page of a PDF, rendered at [`RASTER_SCALE`]× the page's
/// intrinsic size and encoded as a JPEG at [`INTERMEDIATE_JPEG_QUALITY`].
#[derive(Debug, Clone)]
pub struct RasterizedPage {
    /// JPEG-encoded page raster.
    pub bytes: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

/// Bind to a pdfium library: alongside the executable first, then the
/// system library paths.
fn bind_pdfium() -> Result<Pdfium> {
    let bindings = Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path("./"))
        .or_else(|_| Pdfium::bind_to_system_library())
        .map_err(|e| {
            ConvertError::PdfEngine(format!(
                "failed to bind pdfium, install libpdfium or place it next to the binary: {:?}",
                e
            ))
        })?;
    Ok(Pdfium::new(bindings))
}

/// Rasterize the first page of `pdf_bytes`.
///
/// The transient raster surface is sized to the scaled page viewport and
/// released once the JPEG blob has been produced.
///
/// # Errors
/// * [`ConvertError::Decode`] if the bytes are not a parseable PDF or
///   the first page cannot be retrieved or rendered.
/// * [`ConvertError::PdfEngine`] if no pdfium library can be bound.
pub fn rasterize_first_page(pdf_bytes: &[u8]) -> Result<RasterizedPage> {
    let pdfium = bind_pdfium()?;

    let document = pdfium
        .load_pdf_from_byte_slice(pdf_bytes, None)
        .map_err(|e| decode_error(format!("{:?}", e)))?;

    let page = document
        .pages()
        .first()
        .map_err(|e| decode_error(format!("failed to retrieve page 1: {:?}", e)))?;

    // Viewport dimensions at the fixed upscale factor.
    let target_width = (page.width().value * RASTER_SCALE) as i32;
    let target_height = (page.height().value * RASTER_SCALE) as i32;
    let render_config = PdfRenderConfig::new()
        .set_target_width(target_width)
        .set_target_height(target_height);

    let bitmap = page
        .render_with_config(&render_config)
        .map_err(|e| decode_error(format!("failed to render page 1: {:?}", e)))?;

    let rendered = bitmap.as_image();
    let rgb = rendered.to_rgb8();
    let (width, height) = rgb.dimensions();

    let mut bytes = Vec::new();
    let encoder = JpegEncoder::new_with_quality(Cursor::new(&mut bytes), INTERMEDIATE_JPEG_QUALITY);
    rgb.write_with_encoder(encoder)
        .map_err(|e| ConvertError::Encode {
            format: "jpeg".to_string(),
            detail: e.to_string(),
        })?;

    if bytes.is_empty() {
        return Err(ConvertError::Encode {
            format: "jpeg".to_string(),
            detail: "rasterizer produced an empty blob".to_string(),
        });
    }

    Ok(RasterizedPage {
        bytes,
        width,
        height,
    })
}

fn decode_error(detail: String) -> ConvertError {
    ConvertError::Decode {
        media_type: "application/pdf".to_string(),
        detail,
    }
}
