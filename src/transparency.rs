use crate::formats::SourceType;
use image::{DynamicImage, RgbaImage};

/// True iff any pixel carries an alpha value below fully opaque.
///
/// Short-circuits on the first transparent pixel.
pub fn has_transparency(image: &RgbaImage) -> bool {
    image.pixels().any(|pixel| pixel[3] < u8::MAX)
}

/// Run the transparency scan for PNG sources only.
///
/// Other formats are assumed either always opaque or irrelevant to the
/// background-fill decision, so the scan is skipped and no flag is
/// computed for them.
pub fn detect_transparency(source_type: SourceType, image: &DynamicImage) -> Option<bool> {
    match source_type {
        SourceType::Png => Some(has_transparency(&image.to_rgba8())),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn test_opaque_image_has_no_transparency() {
        let img = RgbaImage::from_pixel(4, 4, Rgba([10, 20, 30, 255]));
        assert!(!has_transparency(&img));
    }

    #[test]
    fn test_single_transparent_pixel_is_detected() {
        let mut img = RgbaImage::from_pixel(4, 4, Rgba([10, 20, 30, 255]));
        img.put_pixel(3, 3, Rgba([10, 20, 30, 254]));
        assert!(has_transparency(&img));
    }

    #[test]
    fn test_fully_transparent_image_is_detected() {
        let img = RgbaImage::from_pixel(2, 2, Rgba([0, 0, 0, 0]));
        assert!(has_transparency(&img));
    }

    #[test]
    fn test_detection_runs_only_for_png() {
        let mut rgba = RgbaImage::from_pixel(2, 2, Rgba([0, 0, 0, 255]));
        rgba.put_pixel(0, 0, Rgba([0, 0, 0, 0]));
        let img = DynamicImage::ImageRgba8(rgba);

        assert_eq!(detect_transparency(SourceType::Png, &img), Some(true));
        assert_eq!(detect_transparency(SourceType::Jpeg, &img), None);
        assert_eq!(detect_transparency(SourceType::Webp, &img), None);
        assert_eq!(detect_transparency(SourceType::Gif, &img), None);
    }

    #[test]
    fn test_opaque_png_reports_false() {
        let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(2, 2, Rgba([1, 2, 3, 255])));
        assert_eq!(detect_transparency(SourceType::Png, &img), Some(false));
    }
}
