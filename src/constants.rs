pub const DEFAULT_QUALITY: u8 = 95;
pub const MIN_QUALITY: u8 = 1;
pub const MAX_QUALITY: u8 = 100;

pub const DEFAULT_BACKGROUND: &str = "#FFFFFF";

/// Scale applied to a PDF page's intrinsic size when rasterizing it.
/// Fixed; the user quality setting does not reach this stage.
pub const RASTER_SCALE: f32 = 2.0;

/// Quality of the intermediate JPEG produced by PDF rasterization and of
/// the JPEG embedded into PDF output pages. Independent of the user
/// quality setting.
pub const INTERMEDIATE_JPEG_QUALITY: u8 = 95;

/// The ICO container stores dimensions in a single byte per axis; the
/// encoder rejects anything above 256. Canvases are clamped to this edge
/// before ICO encoding.
pub const ICO_MAX_DIMENSION: u32 = 256;

pub const ARCHIVE_FILE_NAME: &str = "converted_images.zip";

/// Media types accepted at intake. Anything else is dropped silently.
pub const ALLOWED_MEDIA_TYPES: &[&str] = &[
    "image/jpeg",
    "image/png",
    "image/webp",
    "image/avif",
    "image/bmp",
    "image/gif",
    "image/x-icon",
    "image/tiff",
    "application/pdf",
];

pub const PROGRESS_SPINNER_TEMPLATE: &str = "{spinner:.green} {msg}";
