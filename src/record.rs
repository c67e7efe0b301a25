//! The per-file data model tracked from intake to download.

use crate::encode::EncodedOutput;
use crate::formats::{OutputFormat, SourceType};
use crate::utils::{base_name, format_file_size};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque token identifying a record for the lifetime of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RecordId(pub(crate) u64);

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "r{:06}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileStatus {
    Pending,
    Converting,
    Done,
}

/// Owned source payload: bytes plus the declared media type. Replaced
/// wholesale when a crop is applied.
#[derive(Debug, Clone)]
pub struct SourceContent {
    pub bytes: Vec<u8>,
    pub media_type: SourceType,
}

impl SourceContent {
    pub fn new(bytes: Vec<u8>, media_type: SourceType) -> Self {
        Self { bytes, media_type }
    }

    pub fn len(&self) -> u64 {
        self.bytes.len() as u64
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// The most recent successful conversion output for a record.
#[derive(Debug, Clone)]
pub struct ResultContent {
    pub bytes: Vec<u8>,
    pub media_type: &'static str,
    pub size: String,
}

/// Last applied crop, in natural source pixels. Display only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CropRegion {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// One user-supplied file tracked through intake, conversion, and
/// download.
#[derive(Debug, Clone)]
pub struct FileRecord {
    pub id: RecordId,
    pub original_name: String,
    pub original_size: u64,
    /// `None` only for records restored from a metadata snapshot; such
    /// records cannot convert until the bytes are re-added.
    pub source: Option<SourceContent>,
    pub status: FileStatus,
    pub needs_conversion: bool,
    pub output_format: OutputFormat,
    pub result: Option<ResultContent>,
    pub has_transparency: Option<bool>,
    pub crop_region: Option<CropRegion>,
    /// 0 or 100; no sub-step granularity.
    pub progress: u8,
}

impl FileRecord {
    pub(crate) fn new(
        id: RecordId,
        name: String,
        source: SourceContent,
        output_format: OutputFormat,
    ) -> Self {
        let original_size = source.len();
        Self {
            id,
            original_name: name,
            original_size,
            source: Some(source),
            status: FileStatus::Pending,
            needs_conversion: true,
            output_format,
            result: None,
            has_transparency: None,
            crop_region: None,
            progress: 0,
        }
    }

    pub fn original_size_display(&self) -> String {
        format_file_size(self.original_size)
    }

    /// Download name: `<base-name>.<format extension>`.
    pub fn output_file_name(&self) -> String {
        format!(
            "{}.{}",
            base_name(&self.original_name),
            self.output_format.extension()
        )
    }

    /// Select a new output format. Always re-queues the record, even
    /// when the format is unchanged.
    pub fn set_output_format(&mut self, format: OutputFormat) {
        self.output_format = format;
        self.invalidate();
    }

    /// Drop any previous result and re-queue the record. The result is
    /// never allowed to go stale: every configuration change funnels
    /// through here.
    pub fn invalidate(&mut self) {
        self.needs_conversion = true;
        self.result = None;
        self.status = FileStatus::Pending;
        self.progress = 0;
    }

    /// Swap in new source bytes (crop pipeline), re-queueing the record.
    pub(crate) fn replace_source(&mut self, source: SourceContent, region: CropRegion) {
        self.original_size = source.len();
        self.source = Some(source);
        self.crop_region = Some(region);
        self.invalidate();
    }

    pub(crate) fn begin_conversion(&mut self) {
        self.status = FileStatus::Converting;
    }

    pub(crate) fn complete_conversion(&mut self, output: EncodedOutput) {
        self.has_transparency = output.has_transparency;
        self.result = Some(ResultContent {
            bytes: output.bytes,
            media_type: output.media_type,
            size: output.size,
        });
        self.status = FileStatus::Done;
        self.needs_conversion = false;
        self.progress = 100;
    }

    /// Roll back a failed conversion: retry-eligible, result absent,
    /// `needs_conversion` still set.
    pub(crate) fn fail_conversion(&mut self) {
        self.status = FileStatus::Pending;
        self.progress = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_record() -> FileRecord {
        FileRecord::new(
            RecordId(1),
            "holiday photo.png".to_string(),
            SourceContent::new(vec![1, 2, 3, 4], SourceType::Png),
            OutputFormat::Jpg,
        )
    }

    fn done_record() -> FileRecord {
        let mut record = test_record();
        record.begin_conversion();
        record.complete_conversion(EncodedOutput {
            bytes: vec![9, 9],
            media_type: "image/jpeg",
            size: "2 Bytes".to_string(),
            has_transparency: Some(false),
        });
        record
    }

    #[test]
    fn test_new_record_is_pending() {
        let record = test_record();
        assert_eq!(record.status, FileStatus::Pending);
        assert!(record.needs_conversion);
        assert_eq!(record.progress, 0);
        assert_eq!(record.original_size, 4);
        assert!(record.result.is_none());
    }

    #[test]
    fn test_output_file_name_swaps_extension() {
        let mut record = test_record();
        assert_eq!(record.output_file_name(), "holiday photo.jpg");

        record.set_output_format(OutputFormat::Webp);
        assert_eq!(record.output_file_name(), "holiday photo.webp");
    }

    #[test]
    fn test_complete_conversion_populates_result() {
        let record = done_record();
        assert_eq!(record.status, FileStatus::Done);
        assert!(!record.needs_conversion);
        assert_eq!(record.progress, 100);
        assert_eq!(record.has_transparency, Some(false));
        assert_eq!(record.result.as_ref().unwrap().media_type, "image/jpeg");
    }

    #[test]
    fn test_format_change_clears_result() {
        let mut record = done_record();
        record.set_output_format(OutputFormat::Png);

        assert!(record.needs_conversion);
        assert!(record.result.is_none());
        assert_eq!(record.status, FileStatus::Pending);
        assert_eq!(record.progress, 0);
    }

    #[test]
    fn test_same_format_still_requeues() {
        let mut record = done_record();
        record.set_output_format(OutputFormat::Jpg);
        assert!(record.needs_conversion);
        assert!(record.result.is_none());
    }

    #[test]
    fn test_failed_conversion_is_retry_eligible() {
        let mut record = test_record();
        record.begin_conversion();
        record.fail_conversion();

        assert_eq!(record.status, FileStatus::Pending);
        assert!(record.needs_conversion);
        assert_eq!(record.progress, 0);
        assert!(record.result.is_none());
    }

    #[test]
    fn test_replace_source_requeues_and_records_region() {
        let mut record = done_record();
        let region = CropRegion {
            x: 5,
            y: 6,
            width: 10,
            height: 12,
        };
        record.replace_source(
            SourceContent::new(vec![7; 16], SourceType::Png),
            region,
        );

        assert_eq!(record.original_size, 16);
        assert_eq!(record.crop_region, Some(region));
        assert!(record.needs_conversion);
        assert!(record.result.is_none());
        assert_eq!(record.status, FileStatus::Pending);
    }

    #[test]
    fn test_record_id_display_is_opaque_token() {
        assert_eq!(RecordId(7).to_string(), "r000007");
    }
}
