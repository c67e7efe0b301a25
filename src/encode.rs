//! Conversion core: decoded source surface → encoded output blob.
//!
//! The pipeline is two explicit stages. PDF sources are rasterized into
//! an intermediate JPEG first ([`crate::rasterize`]); the second stage
//! only ever sees raster image bytes, so the original's "PDF unwraps to
//! an image and re-enters" behavior is structural here rather than a
//! recursive call that happens to terminate.

use crate::constants::{DEFAULT_BACKGROUND, DEFAULT_QUALITY, ICO_MAX_DIMENSION, MAX_QUALITY, MIN_QUALITY};
use crate::error::{ConvertError, Result};
use crate::formats::{OutputFormat, SourceType};
use crate::pdf_output::build_single_page_pdf;
use crate::rasterize::rasterize_first_page;
use crate::record::SourceContent;
use crate::transparency::detect_transparency;
use crate::utils::{format_file_size, parse_hex_color};
use image::codecs::avif::AvifEncoder;
use image::codecs::jpeg::JpegEncoder;
use image::imageops;
use image::{DynamicImage, ImageFormat, Rgb, RgbImage, Rgba, RgbaImage};
use std::io::Cursor;

/// User-facing conversion settings, shared by every record in a batch.
#[derive(Debug, Clone)]
pub struct ConversionOptions {
    /// 1–100. Reaches lossy encoders as `quality / 100`.
    pub quality: u8,
    /// Opaque fill painted beneath every source before encoding.
    pub background: [u8; 3],
}

impl ConversionOptions {
    pub fn new(quality: Option<u8>, background: Option<&str>) -> Result<Self> {
        let quality = quality.unwrap_or(DEFAULT_QUALITY);
        if !(MIN_QUALITY..=MAX_QUALITY).contains(&quality) {
            return Err(ConvertError::InvalidQuality(quality));
        }

        let background = parse_hex_color(background.unwrap_or(DEFAULT_BACKGROUND))?;

        Ok(Self {
            quality,
            background,
        })
    }
}

impl Default for ConversionOptions {
    fn default() -> Self {
        Self {
            quality: DEFAULT_QUALITY,
            background: [255, 255, 255],
        }
    }
}

/// A finished conversion result.
#[derive(Debug, Clone)]
pub struct EncodedOutput {
    pub bytes: Vec<u8>,
    pub media_type: &'static str,
    /// Human-readable size of `bytes`.
    pub size: String,
    /// Computed for PNG sources only.
    pub has_transparency: Option<bool>,
}

/// Convert a source blob into `format`.
///
/// Stage one unwraps PDF sources into a rasterized JPEG; stage two
/// decodes, paints the background, composites, and encodes. The
/// rasterizer never yields PDF, so stage one runs at most once.
pub fn convert_source(
    source: &SourceContent,
    format: OutputFormat,
    options: &ConversionOptions,
) -> Result<EncodedOutput> {
    if source.media_type.is_pdf() {
        let page = rasterize_first_page(&source.bytes)?;
        let intermediate = SourceContent::new(page.bytes, SourceType::Jpeg);
        return encode_image(&intermediate, format, options);
    }

    encode_image(source, format, options)
}

/// Stage two: raster source bytes → encoded blob.
fn encode_image(
    source: &SourceContent,
    format: OutputFormat,
    options: &ConversionOptions,
) -> Result<EncodedOutput> {
    let decoded = decode_source(source)?;
    let has_transparency = detect_transparency(source.media_type, &decoded);

    // The fill is painted under every source, transparent or not;
    // callers that hide the color picker for opaque files only hide UI.
    let canvas = composite_on_background(&decoded, options.background);

    let bytes = match format {
        OutputFormat::Pdf => build_single_page_pdf(&flatten_to_rgb(&canvas))?,
        _ => encode_canvas(&canvas, format, options.quality)?,
    };

    if bytes.is_empty() {
        return Err(ConvertError::Encode {
            format: format.to_string(),
            detail: "encoder produced an empty blob".to_string(),
        });
    }

    let size = format_file_size(bytes.len() as u64);
    Ok(EncodedOutput {
        bytes,
        media_type: format.media_type(),
        size,
        has_transparency,
    })
}

/// Materialize an image surface from source bytes.
pub(crate) fn decode_source(source: &SourceContent) -> Result<DynamicImage> {
    let format = source
        .media_type
        .to_image_format()
        .ok_or_else(|| ConvertError::Load("PDF bytes reached the image decoder".to_string()))?;

    image::load_from_memory_with_format(&source.bytes, format)
        .map_err(|e| ConvertError::Load(e.to_string()))
}

/// Paint the fill color across a canvas of the source's size, then draw
/// the source on top. The result is fully opaque.
fn composite_on_background(image: &DynamicImage, background: [u8; 3]) -> RgbaImage {
    let [r, g, b] = background;
    let mut canvas = RgbaImage::from_pixel(image.width(), image.height(), Rgba([r, g, b, 255]));
    imageops::overlay(&mut canvas, &image.to_rgba8(), 0, 0);
    canvas
}

fn flatten_to_rgb(canvas: &RgbaImage) -> RgbImage {
    RgbImage::from_fn(canvas.width(), canvas.height(), |x, y| {
        let pixel = canvas.get_pixel(x, y);
        Rgb([pixel[0], pixel[1], pixel[2]])
    })
}

/// Format dispatch for raster outputs. Only lossy encoders see the
/// quality value.
fn encode_canvas(canvas: &RgbaImage, format: OutputFormat, quality: u8) -> Result<Vec<u8>> {
    let mut bytes = Vec::new();
    let mut cursor = Cursor::new(&mut bytes);

    let encoded = match format {
        OutputFormat::Jpg | OutputFormat::Jfif => {
            let encoder = JpegEncoder::new_with_quality(&mut cursor, quality);
            flatten_to_rgb(canvas).write_with_encoder(encoder)
        }
        OutputFormat::Avif => {
            let encoder = AvifEncoder::new_with_speed_quality(&mut cursor, 4, quality);
            canvas.write_with_encoder(encoder)
        }
        OutputFormat::Ico => clamp_for_ico(canvas).write_to(&mut cursor, ImageFormat::Ico),
        // PNG, BMP and GIF encode at fixed settings. WebP and TIFF
        // accept the quality setting upstream but the underlying
        // encoders are fixed; see DESIGN.md.
        _ => {
            let image_format = format.to_image_format().ok_or_else(|| ConvertError::Encode {
                format: format.to_string(),
                detail: "format has no raster encoder".to_string(),
            })?;
            canvas.write_to(&mut cursor, image_format)
        }
    };

    encoded.map_err(|e| ConvertError::Encode {
        format: format.to_string(),
        detail: e.to_string(),
    })?;

    Ok(bytes)
}

/// The ICO container caps both axes at 256; downscale to fit, keeping
/// aspect ratio, before handing the canvas to the encoder.
fn clamp_for_ico(canvas: &RgbaImage) -> RgbaImage {
    if canvas.width() <= ICO_MAX_DIMENSION && canvas.height() <= ICO_MAX_DIMENSION {
        return canvas.clone();
    }

    DynamicImage::ImageRgba8(canvas.clone())
        .resize(
            ICO_MAX_DIMENSION,
            ICO_MAX_DIMENSION,
            imageops::FilterType::Lanczos3,
        )
        .to_rgba8()
}
