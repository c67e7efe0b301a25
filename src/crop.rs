//! Crop pipeline: a rectangle drawn on the displayed image becomes a
//! new source blob at natural resolution.
//!
//! The rectangle is always expressed relative to the unzoomed, unpanned
//! displayed image; zoom and pan are viewing aids and never enter the
//! coordinate math. Percentage coordinates are the special case of a
//! 100×100 display size.

use crate::encode::decode_source;
use crate::error::{ConvertError, Result};
use crate::pdf_output::build_single_page_pdf;
use crate::rasterize::rasterize_first_page;
use crate::record::{CropRegion, FileRecord, SourceContent};
use crate::formats::SourceType;
use image::DynamicImage;
use std::io::Cursor;

/// User-drawn rectangle in displayed-image coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DisplayCrop {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Size the image was displayed at when the rectangle was drawn.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DisplaySize {
    pub width: f64,
    pub height: f64,
}

/// Scale a displayed-coordinates rectangle up to natural source pixels
/// and clamp it to the image bounds.
pub fn map_to_natural(
    crop: &DisplayCrop,
    displayed: DisplaySize,
    natural: (u32, u32),
) -> Result<CropRegion> {
    if displayed.width <= 0.0 || displayed.height <= 0.0 {
        return Err(ConvertError::InvalidCrop(format!(
            "displayed size {}x{} is degenerate",
            displayed.width, displayed.height
        )));
    }
    if crop.width <= 0.0 || crop.height <= 0.0 {
        return Err(ConvertError::InvalidCrop(format!(
            "selection {}x{} is empty",
            crop.width, crop.height
        )));
    }

    let (natural_width, natural_height) = natural;
    let scale_x = natural_width as f64 / displayed.width;
    let scale_y = natural_height as f64 / displayed.height;

    let x = ((crop.x * scale_x).round().max(0.0) as u32).min(natural_width.saturating_sub(1));
    let y = ((crop.y * scale_y).round().max(0.0) as u32).min(natural_height.saturating_sub(1));
    let width = ((crop.width * scale_x).round() as u32).min(natural_width - x);
    let height = ((crop.height * scale_y).round() as u32).min(natural_height - y);

    if width == 0 || height == 0 {
        return Err(ConvertError::InvalidCrop(
            "selection maps to an empty pixel region".to_string(),
        ));
    }

    Ok(CropRegion {
        x,
        y,
        width,
        height,
    })
}

/// Replace a record's source with the cropped region, re-encoded in the
/// source's own media type at natural resolution.
///
/// On success the record is re-queued (Pending, `needs_conversion`,
/// result cleared) with the applied region recorded. On any failure the
/// record is left exactly as it was.
pub fn apply_crop(
    record: &mut FileRecord,
    crop: &DisplayCrop,
    displayed: DisplaySize,
) -> Result<()> {
    let source = record
        .source
        .as_ref()
        .ok_or_else(|| ConvertError::SourceUnavailable(record.original_name.clone()))?;

    let (cropped_source, region) = crop_source(source, crop, displayed)?;
    record.replace_source(cropped_source, region);
    Ok(())
}

/// Crop a record inside the session store. This is the store's only
/// crop entry point; the arena is otherwise mutated through intake and
/// the orchestrator.
pub fn crop_record(
    store: &mut crate::store::SessionStore,
    id: crate::record::RecordId,
    crop: &DisplayCrop,
    displayed: DisplaySize,
) -> Result<()> {
    let record = store
        .get_mut(id)
        .ok_or_else(|| ConvertError::InvalidCrop(format!("no record {id}")))?;
    apply_crop(record, crop, displayed)
}

/// Build the replacement source blob without touching the record.
fn crop_source(
    source: &SourceContent,
    crop: &DisplayCrop,
    displayed: DisplaySize,
) -> Result<(SourceContent, CropRegion)> {
    if source.media_type.is_pdf() {
        // A PDF source is rasterized (page 1), cropped, and re-wrapped
        // as a single-page PDF so the media type is preserved.
        let page = rasterize_first_page(&source.bytes)?;
        let intermediate = SourceContent::new(page.bytes, SourceType::Jpeg);
        let decoded = decode_source(&intermediate)?;

        let region = map_to_natural(crop, displayed, (decoded.width(), decoded.height()))?;
        let cropped = extract_region(&decoded, region);
        let bytes = build_single_page_pdf(&cropped.to_rgb8())?;

        return Ok((SourceContent::new(bytes, SourceType::Pdf), region));
    }

    let decoded = decode_source(source)?;
    let region = map_to_natural(crop, displayed, (decoded.width(), decoded.height()))?;
    let cropped = extract_region(&decoded, region);

    let format = source
        .media_type
        .to_image_format()
        .ok_or_else(|| ConvertError::InvalidCrop("source has no raster format".to_string()))?;

    let mut bytes = Vec::new();
    cropped
        .write_to(&mut Cursor::new(&mut bytes), format)
        .map_err(|e| ConvertError::Encode {
            format: source.media_type.to_string(),
            detail: e.to_string(),
        })?;

    Ok((SourceContent::new(bytes, source.media_type), region))
}

/// `DynamicImage::crop_imm` keeps the decoded color type, so a JPEG
/// source stays RGB and re-encodes cleanly.
fn extract_region(image: &DynamicImage, region: CropRegion) -> DynamicImage {
    image.crop_imm(region.x, region.y, region.width, region.height)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formats::OutputFormat;
    use crate::record::{FileStatus, RecordId};
    use image::{ImageFormat, Rgba, RgbaImage};

    fn gradient_png(width: u32, height: u32) -> Vec<u8> {
        let image = RgbaImage::from_fn(width, height, |x, y| {
            Rgba([(x % 256) as u8, (y % 256) as u8, 7, 255])
        });
        let mut bytes = Vec::new();
        image
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .unwrap();
        bytes
    }

    fn png_record(width: u32, height: u32) -> FileRecord {
        FileRecord::new(
            RecordId(1),
            "source.png".to_string(),
            SourceContent::new(gradient_png(width, height), SourceType::Png),
            OutputFormat::Jpg,
        )
    }

    #[test]
    fn test_half_scale_display_doubles_coordinates() {
        // Displayed at 50% of natural size: (10,10,50,50) → (20,20,100,100).
        let crop = DisplayCrop {
            x: 10.0,
            y: 10.0,
            width: 50.0,
            height: 50.0,
        };
        let displayed = DisplaySize {
            width: 100.0,
            height: 100.0,
        };

        let region = map_to_natural(&crop, displayed, (200, 200)).unwrap();
        assert_eq!(
            region,
            CropRegion {
                x: 20,
                y: 20,
                width: 100,
                height: 100
            }
        );
    }

    #[test]
    fn test_percentage_coordinates_are_a_display_size() {
        let crop = DisplayCrop {
            x: 25.0,
            y: 25.0,
            width: 50.0,
            height: 50.0,
        };
        let displayed = DisplaySize {
            width: 100.0,
            height: 100.0,
        };

        let region = map_to_natural(&crop, displayed, (200, 100)).unwrap();
        assert_eq!(
            region,
            CropRegion {
                x: 50,
                y: 25,
                width: 100,
                height: 50
            }
        );
    }

    #[test]
    fn test_selection_is_clamped_to_image_bounds() {
        let crop = DisplayCrop {
            x: 80.0,
            y: 80.0,
            width: 50.0,
            height: 50.0,
        };
        let displayed = DisplaySize {
            width: 100.0,
            height: 100.0,
        };

        let region = map_to_natural(&crop, displayed, (100, 100)).unwrap();
        assert_eq!(
            region,
            CropRegion {
                x: 80,
                y: 80,
                width: 20,
                height: 20
            }
        );
    }

    #[test]
    fn test_empty_selection_is_rejected() {
        let displayed = DisplaySize {
            width: 100.0,
            height: 100.0,
        };
        let crop = DisplayCrop {
            x: 10.0,
            y: 10.0,
            width: 0.0,
            height: 20.0,
        };
        assert!(matches!(
            map_to_natural(&crop, displayed, (100, 100)),
            Err(ConvertError::InvalidCrop(_))
        ));
    }

    #[test]
    fn test_apply_crop_replaces_source_at_natural_resolution() {
        let mut record = png_record(200, 160);
        let crop = DisplayCrop {
            x: 10.0,
            y: 10.0,
            width: 50.0,
            height: 40.0,
        };
        // Displayed at half the natural size.
        let displayed = DisplaySize {
            width: 100.0,
            height: 80.0,
        };

        apply_crop(&mut record, &crop, displayed).unwrap();

        let source = record.source.as_ref().unwrap();
        assert_eq!(source.media_type, SourceType::Png);

        let decoded = image::load_from_memory_with_format(&source.bytes, ImageFormat::Png)
            .unwrap()
            .to_rgba8();
        assert_eq!((decoded.width(), decoded.height()), (100, 80));

        // Top-left of the crop corresponds to natural (20, 20).
        let pixel = decoded.get_pixel(0, 0);
        assert_eq!((pixel[0], pixel[1]), (20, 20));

        assert_eq!(
            record.crop_region,
            Some(CropRegion {
                x: 20,
                y: 20,
                width: 100,
                height: 80
            })
        );
        assert!(record.needs_conversion);
        assert!(record.result.is_none());
        assert_eq!(record.status, FileStatus::Pending);
        assert_eq!(record.original_size, source.bytes.len() as u64);
    }

    #[test]
    fn test_failed_crop_leaves_record_untouched() {
        let mut record = png_record(100, 100);
        record.needs_conversion = false;
        let before_size = record.original_size;

        let crop = DisplayCrop {
            x: 0.0,
            y: 0.0,
            width: -5.0,
            height: 10.0,
        };
        let displayed = DisplaySize {
            width: 100.0,
            height: 100.0,
        };

        assert!(apply_crop(&mut record, &crop, displayed).is_err());
        assert_eq!(record.original_size, before_size);
        assert!(!record.needs_conversion);
        assert!(record.crop_region.is_none());
    }

    #[test]
    fn test_crop_without_source_is_rejected() {
        let mut record = png_record(100, 100);
        record.source = None;

        let crop = DisplayCrop {
            x: 0.0,
            y: 0.0,
            width: 10.0,
            height: 10.0,
        };
        let displayed = DisplaySize {
            width: 100.0,
            height: 100.0,
        };

        assert!(matches!(
            apply_crop(&mut record, &crop, displayed),
            Err(ConvertError::SourceUnavailable(_))
        ));
    }
}
