//! Session-scoped arena owning every [`FileRecord`].
//!
//! All mutation funnels through explicit access points: intake,
//! per-record format selection, store-wide invalidation, removal, and
//! the orchestrator/crop contracts. Records keep insertion order, which
//! is also batch processing order.

use crate::error::Result;
use crate::formats::{OutputFormat, SourceType};
use crate::record::{CropRegion, FileRecord, FileStatus, RecordId, SourceContent};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Default)]
pub struct SessionStore {
    records: Vec<FileRecord>,
    next_id: u64,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one file. Inputs outside the allowed media-type set are
    /// dropped silently and `None` is returned; this is a best-effort
    /// filter, not an error.
    pub fn add_file(
        &mut self,
        name: &str,
        bytes: Vec<u8>,
        declared_media_type: &str,
        output_format: OutputFormat,
    ) -> Option<RecordId> {
        let media_type = SourceType::from_media_type(declared_media_type)?;
        Some(self.insert(name, SourceContent::new(bytes, media_type), output_format))
    }

    fn insert(
        &mut self,
        name: &str,
        source: SourceContent,
        output_format: OutputFormat,
    ) -> RecordId {
        self.next_id += 1;
        let id = RecordId(self.next_id);
        self.records
            .push(FileRecord::new(id, name.to_string(), source, output_format));
        id
    }

    pub fn get(&self, id: RecordId) -> Option<&FileRecord> {
        self.records.iter().find(|r| r.id == id)
    }

    pub(crate) fn get_mut(&mut self, id: RecordId) -> Option<&mut FileRecord> {
        self.records.iter_mut().find(|r| r.id == id)
    }

    /// Remove a record, dropping its source and result bytes with it.
    /// There is no abort-in-place: an in-flight conversion of the
    /// removed record finishes and its output is discarded; the next
    /// batch pass simply no longer sees the record.
    pub fn remove(&mut self, id: RecordId) -> Option<FileRecord> {
        let index = self.records.iter().position(|r| r.id == id)?;
        Some(self.records.remove(index))
    }

    /// Select a new output format for one record.
    pub fn set_output_format(&mut self, id: RecordId, format: OutputFormat) -> bool {
        match self.get_mut(id) {
            Some(record) => {
                record.set_output_format(format);
                true
            }
            None => false,
        }
    }

    /// A quality or background change invalidates every record.
    pub fn invalidate_all(&mut self) {
        for record in &mut self.records {
            record.invalidate();
        }
    }

    pub fn ids(&self) -> Vec<RecordId> {
        self.records.iter().map(|r| r.id).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FileRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// True when at least one record still needs conversion.
    pub fn has_pending_work(&self) -> bool {
        self.records.iter().any(|r| r.needs_conversion)
    }

    /// Write a metadata snapshot. Binary content is deliberately left
    /// out: sources and results are not durable in this design.
    pub fn save_snapshot(&self, path: &Path) -> Result<()> {
        let snapshot = SessionSnapshot {
            next_id: self.next_id,
            records: self
                .records
                .iter()
                .map(|record| RecordSnapshot {
                    id: record.id.0,
                    name: record.original_name.clone(),
                    original_size: record.original_size,
                    media_type: record.source.as_ref().map(|s| s.media_type),
                    output_format: record.output_format,
                    crop_region: record.crop_region,
                })
                .collect(),
        };

        fs::write(path, serde_json::to_vec_pretty(&snapshot)?)?;
        Ok(())
    }

    /// Restore a metadata snapshot. Every restored record comes back
    /// Pending with `needs_conversion` set and no source bytes; a file
    /// must be re-added before it can convert again. Known product gap,
    /// not a hidden contract.
    pub fn load_snapshot(path: &Path) -> Result<SessionStore> {
        let snapshot: SessionSnapshot = serde_json::from_slice(&fs::read(path)?)?;

        let records = snapshot
            .records
            .into_iter()
            .map(|entry| FileRecord {
                id: RecordId(entry.id),
                original_name: entry.name,
                original_size: entry.original_size,
                source: None,
                status: FileStatus::Pending,
                needs_conversion: true,
                output_format: entry.output_format,
                result: None,
                has_transparency: None,
                crop_region: entry.crop_region,
                progress: 0,
            })
            .collect();

        Ok(SessionStore {
            records,
            // Keep the counter so restored and new ids never collide.
            next_id: snapshot.next_id,
        })
    }
}

#[derive(Serialize, Deserialize)]
struct SessionSnapshot {
    next_id: u64,
    records: Vec<RecordSnapshot>,
}

#[derive(Serialize, Deserialize)]
struct RecordSnapshot {
    id: u64,
    name: String,
    original_size: u64,
    media_type: Option<SourceType>,
    output_format: OutputFormat,
    crop_region: Option<CropRegion>,
}
