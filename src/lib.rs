pub mod archive;
pub mod cli;
pub mod constants;
pub mod crop;
pub mod encode;
pub mod error;
pub mod formats;
pub mod logger;
pub mod orchestrator;
pub mod pdf_output;
pub mod rasterize;
pub mod record;
pub mod store;
pub mod transparency;
pub mod utils;

pub use archive::{write_archive, write_outputs};
pub use crop::{apply_crop, crop_record, map_to_natural, DisplayCrop, DisplaySize};
pub use encode::{convert_source, ConversionOptions, EncodedOutput};
pub use error::{ConvertError, Result};
pub use formats::{OutputFormat, SourceType};
pub use orchestrator::{convert_all, BatchSummary};
pub use rasterize::{rasterize_first_page, RasterizedPage};
pub use record::{CropRegion, FileRecord, FileStatus, RecordId, SourceContent};
pub use store::SessionStore;
pub use transparency::has_transparency;
pub use utils::format_file_size;
