use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed input that cannot be parsed as its declared media type.
    #[error("Failed to decode {media_type} input: {detail}")]
    Decode { media_type: String, detail: String },

    /// The source bytes could not be materialized into an image surface.
    #[error("Failed to load image: {0}")]
    Load(String),

    /// The target encoder failed or produced an empty blob.
    #[error("Failed to encode {format} output: {detail}")]
    Encode { format: String, detail: String },

    #[error("Unsupported output format: {0}")]
    UnsupportedFormat(String),

    #[error("Invalid quality value: {0}. Must be between 1 and 100")]
    InvalidQuality(u8),

    #[error("Invalid background color: {0}. Expected a hex RGB string like #FFFFFF")]
    InvalidColor(String),

    #[error("Invalid crop region: {0}")]
    InvalidCrop(String),

    /// No pdfium library could be bound; PDF input cannot be processed.
    #[error("PDF engine unavailable: {0}")]
    PdfEngine(String),

    /// A record restored from a metadata snapshot has no source bytes.
    #[error("Source bytes for '{0}' are not available; the file must be re-added")]
    SourceUnavailable(String),

    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to create output directory: {0}")]
    DirectoryCreationFailed(PathBuf),

    #[error("No convertible files found in input path: {0}")]
    NoInputFilesFound(String),

    #[error("Archive error: {0}")]
    Archive(#[from] zip::result::ZipError),

    #[error("Snapshot error: {0}")]
    Snapshot(#[from] serde_json::Error),

    #[error("Walkdir error: {0}")]
    WalkdirError(#[from] walkdir::Error),
}

pub type Result<T> = std::result::Result<T, ConvertError>;
