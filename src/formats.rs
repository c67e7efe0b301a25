/// Type-safe handling of the conversion format set.
///
/// Two enums cover the two sides of the pipeline: [`SourceType`] is the
/// closed set of media types accepted at intake, [`OutputFormat`] is the
/// closed set of formats a record can be converted to.
use crate::error::{ConvertError, Result};
use image::ImageFormat;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Supported output formats, selectable per record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Jpg,
    Png,
    Webp,
    Avif,
    Bmp,
    Gif,
    Ico,
    /// JPEG bytes under a `.jfif` extension.
    Jfif,
    Tiff,
    Pdf,
}

impl OutputFormat {
    /// File extension used for download naming.
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Jpg => "jpg",
            OutputFormat::Png => "png",
            OutputFormat::Webp => "webp",
            OutputFormat::Avif => "avif",
            OutputFormat::Bmp => "bmp",
            OutputFormat::Gif => "gif",
            OutputFormat::Ico => "ico",
            OutputFormat::Jfif => "jfif",
            OutputFormat::Tiff => "tiff",
            OutputFormat::Pdf => "pdf",
        }
    }

    pub fn media_type(&self) -> &'static str {
        match self {
            OutputFormat::Jpg | OutputFormat::Jfif => "image/jpeg",
            OutputFormat::Png => "image/png",
            OutputFormat::Webp => "image/webp",
            OutputFormat::Avif => "image/avif",
            OutputFormat::Bmp => "image/bmp",
            OutputFormat::Gif => "image/gif",
            OutputFormat::Ico => "image/x-icon",
            OutputFormat::Tiff => "image/tiff",
            OutputFormat::Pdf => "application/pdf",
        }
    }

    /// Whether the user quality setting reaches this format's encoder.
    ///
    /// WebP and TIFF are listed even though the underlying encoders
    /// ignore the value; PNG, BMP, GIF and ICO never see it.
    pub fn uses_quality(&self) -> bool {
        matches!(
            self,
            OutputFormat::Jpg
                | OutputFormat::Jfif
                | OutputFormat::Webp
                | OutputFormat::Avif
                | OutputFormat::Tiff
        )
    }

    /// The `image` crate format backing this output, `None` for PDF.
    pub fn to_image_format(&self) -> Option<ImageFormat> {
        match self {
            OutputFormat::Jpg | OutputFormat::Jfif => Some(ImageFormat::Jpeg),
            OutputFormat::Png => Some(ImageFormat::Png),
            OutputFormat::Webp => Some(ImageFormat::WebP),
            OutputFormat::Avif => Some(ImageFormat::Avif),
            OutputFormat::Bmp => Some(ImageFormat::Bmp),
            OutputFormat::Gif => Some(ImageFormat::Gif),
            OutputFormat::Ico => Some(ImageFormat::Ico),
            OutputFormat::Tiff => Some(ImageFormat::Tiff),
            OutputFormat::Pdf => None,
        }
    }

    pub fn all() -> &'static [OutputFormat] {
        &[
            OutputFormat::Jpg,
            OutputFormat::Png,
            OutputFormat::Webp,
            OutputFormat::Avif,
            OutputFormat::Bmp,
            OutputFormat::Gif,
            OutputFormat::Ico,
            OutputFormat::Jfif,
            OutputFormat::Tiff,
            OutputFormat::Pdf,
        ]
    }

    /// Determine the format for an output path, falling back to JPEG for
    /// unknown or missing extensions.
    pub fn from_path_or_default(path: &Path) -> OutputFormat {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(|ext| OutputFormat::from_str(ext).ok())
            .unwrap_or(OutputFormat::Jpg)
    }
}

impl Default for OutputFormat {
    fn default() -> Self {
        OutputFormat::Jpg
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.extension())
    }
}

impl FromStr for OutputFormat {
    type Err = ConvertError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "jpg" | "jpeg" => Ok(OutputFormat::Jpg),
            "png" => Ok(OutputFormat::Png),
            "webp" => Ok(OutputFormat::Webp),
            "avif" => Ok(OutputFormat::Avif),
            "bmp" => Ok(OutputFormat::Bmp),
            "gif" => Ok(OutputFormat::Gif),
            "ico" => Ok(OutputFormat::Ico),
            "jfif" => Ok(OutputFormat::Jfif),
            "tiff" | "tif" => Ok(OutputFormat::Tiff),
            "pdf" => Ok(OutputFormat::Pdf),
            _ => Err(ConvertError::UnsupportedFormat(s.to_string())),
        }
    }
}

/// Media types accepted at intake.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceType {
    Jpeg,
    Png,
    Webp,
    Avif,
    Bmp,
    Gif,
    Ico,
    Tiff,
    Pdf,
}

impl SourceType {
    /// Map a declared media type to a source type. Returns `None` for
    /// anything outside the allowed set; intake drops those silently.
    pub fn from_media_type(media_type: &str) -> Option<Self> {
        match media_type {
            "image/jpeg" => Some(SourceType::Jpeg),
            "image/png" => Some(SourceType::Png),
            "image/webp" => Some(SourceType::Webp),
            "image/avif" => Some(SourceType::Avif),
            "image/bmp" => Some(SourceType::Bmp),
            "image/gif" => Some(SourceType::Gif),
            "image/x-icon" => Some(SourceType::Ico),
            "image/tiff" => Some(SourceType::Tiff),
            "application/pdf" => Some(SourceType::Pdf),
            _ => None,
        }
    }

    /// Declared media type for a file path, judged by extension the way
    /// a browser file input would declare it.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?;
        match ext.to_lowercase().as_str() {
            "jpg" | "jpeg" | "jfif" => Some(SourceType::Jpeg),
            "png" => Some(SourceType::Png),
            "webp" => Some(SourceType::Webp),
            "avif" => Some(SourceType::Avif),
            "bmp" => Some(SourceType::Bmp),
            "gif" => Some(SourceType::Gif),
            "ico" => Some(SourceType::Ico),
            "tiff" | "tif" => Some(SourceType::Tiff),
            "pdf" => Some(SourceType::Pdf),
            _ => None,
        }
    }

    pub fn media_type(&self) -> &'static str {
        match self {
            SourceType::Jpeg => "image/jpeg",
            SourceType::Png => "image/png",
            SourceType::Webp => "image/webp",
            SourceType::Avif => "image/avif",
            SourceType::Bmp => "image/bmp",
            SourceType::Gif => "image/gif",
            SourceType::Ico => "image/x-icon",
            SourceType::Tiff => "image/tiff",
            SourceType::Pdf => "application/pdf",
        }
    }

    pub fn is_pdf(&self) -> bool {
        matches!(self, SourceType::Pdf)
    }

    /// The `image` crate format used to decode this source, `None` for PDF.
    pub fn to_image_format(&self) -> Option<ImageFormat> {
        match self {
            SourceType::Jpeg => Some(ImageFormat::Jpeg),
            SourceType::Png => Some(ImageFormat::Png),
            SourceType::Webp => Some(ImageFormat::WebP),
            SourceType::Avif => Some(ImageFormat::Avif),
            SourceType::Bmp => Some(ImageFormat::Bmp),
            SourceType::Gif => Some(ImageFormat::Gif),
            SourceType::Ico => Some(ImageFormat::Ico),
            SourceType::Tiff => Some(ImageFormat::Tiff),
            SourceType::Pdf => None,
        }
    }
}

impl fmt::Display for SourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.media_type())
    }
}
