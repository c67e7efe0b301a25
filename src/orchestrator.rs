//! Sequential batch conversion over the session store.

use crate::encode::{convert_source, ConversionOptions};
use crate::error::ConvertError;
use crate::record::FileRecord;
use crate::store::SessionStore;

/// Outcome counts for one `convert_all` pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub converted: usize,
    pub failed: usize,
    pub skipped: usize,
}

/// Convert every record that needs it, strictly one at a time.
///
/// Sequential processing is policy, not an accident of the runtime:
/// each conversion allocates a full-resolution raster surface, and
/// concurrent raster work is not assumed safe. Per-record failures are
/// logged, rolled back to Pending (retry-eligible, `needs_conversion`
/// kept), and never abort the rest of the batch.
///
/// `observer` runs after every record state change — once when a record
/// enters Converting and once when it settles — so callers can render
/// live progress.
///
/// A record's `output_format` is read once, when it enters Converting;
/// because processing is single-threaded, a format change can only
/// happen between records and takes effect on the next pass. Ids are
/// snapshotted up front and re-checked, so records removed since the
/// pass started are simply no longer seen.
pub fn convert_all<F>(
    store: &mut SessionStore,
    options: &ConversionOptions,
    mut observer: F,
) -> BatchSummary
where
    F: FnMut(&FileRecord),
{
    let mut summary = BatchSummary::default();

    for id in store.ids() {
        match store.get_mut(id) {
            None => continue,
            Some(record) => {
                if !record.needs_conversion {
                    summary.skipped += 1;
                    continue;
                }
                record.begin_conversion();
            }
        }
        if let Some(record) = store.get(id) {
            observer(record);
        }

        let outcome = match store.get(id) {
            None => continue,
            Some(record) => match &record.source {
                Some(source) => convert_source(source, record.output_format, options),
                None => Err(ConvertError::SourceUnavailable(record.original_name.clone())),
            },
        };

        match outcome {
            Ok(output) => {
                if let Some(record) = store.get_mut(id) {
                    record.complete_conversion(output);
                    summary.converted += 1;
                }
            }
            Err(e) => {
                if let Some(record) = store.get_mut(id) {
                    crate::error!("Conversion failed for {}: {}", record.original_name, e);
                    record.fail_conversion();
                    summary.failed += 1;
                }
            }
        }

        if let Some(record) = store.get(id) {
            observer(record);
        }
    }

    summary
}
