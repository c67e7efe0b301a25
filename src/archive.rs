//! Download endpoints: loose output files and the batch archive.

use crate::constants::ARCHIVE_FILE_NAME;
use crate::error::{ConvertError, Result};
use crate::store::SessionStore;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

/// Write every converted record as a loose file into `dir`, named
/// `<base-name>.<extension>`. Records without a result are skipped.
pub fn write_outputs(store: &SessionStore, dir: &Path) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(dir)
        .map_err(|_| ConvertError::DirectoryCreationFailed(dir.to_path_buf()))?;

    let mut written = Vec::new();
    for record in store.iter() {
        let result = match &record.result {
            Some(result) => result,
            None => continue,
        };
        let path = dir.join(record.output_file_name());
        fs::write(&path, &result.bytes)?;
        written.push(path);
    }

    Ok(written)
}

/// Package every converted record into a single `converted_images.zip`
/// inside `dir`, with the same per-file naming as loose downloads.
/// Records without a result are skipped. Returns the archive path and
/// the number of entries written.
pub fn write_archive(store: &SessionStore, dir: &Path) -> Result<(PathBuf, usize)> {
    fs::create_dir_all(dir)
        .map_err(|_| ConvertError::DirectoryCreationFailed(dir.to_path_buf()))?;

    let path = dir.join(ARCHIVE_FILE_NAME);
    let mut zip = ZipWriter::new(File::create(&path)?);
    let options =
        SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);

    let mut entries = 0;
    for record in store.iter() {
        let result = match &record.result {
            Some(result) => result,
            None => continue,
        };
        zip.start_file(record.output_file_name(), options)?;
        zip.write_all(&result.bytes)?;
        entries += 1;
    }

    zip.finish()?;
    Ok((path, entries))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encode::EncodedOutput;
    use crate::formats::OutputFormat;
    use std::io::Read;
    use tempfile::TempDir;
    use zip::ZipArchive;

    fn store_with_results() -> SessionStore {
        let mut store = SessionStore::new();
        let done = store
            .add_file("photo.png", vec![1; 8], "image/png", OutputFormat::Jpg)
            .unwrap();
        store
            .add_file("pending.png", vec![2; 8], "image/png", OutputFormat::Png)
            .unwrap();

        if let Some(record) = store.get_mut(done) {
            record.begin_conversion();
            record.complete_conversion(EncodedOutput {
                bytes: b"jpeg-bytes".to_vec(),
                media_type: "image/jpeg",
                size: "10 Bytes".to_string(),
                has_transparency: Some(false),
            });
        }
        store
    }

    #[test]
    fn test_write_outputs_skips_unconverted_records() {
        let temp_dir = TempDir::new().unwrap();
        let store = store_with_results();

        let written = write_outputs(&store, temp_dir.path()).unwrap();
        assert_eq!(written, vec![temp_dir.path().join("photo.jpg")]);
        assert_eq!(fs::read(&written[0]).unwrap(), b"jpeg-bytes");
        assert!(!temp_dir.path().join("pending.png").exists());
    }

    #[test]
    fn test_archive_contains_only_converted_records() {
        let temp_dir = TempDir::new().unwrap();
        let store = store_with_results();

        let (path, entries) = write_archive(&store, temp_dir.path()).unwrap();
        assert_eq!(entries, 1);
        assert_eq!(path.file_name().unwrap(), "converted_images.zip");

        let mut archive = ZipArchive::new(File::open(&path).unwrap()).unwrap();
        assert_eq!(archive.len(), 1);

        let mut entry = archive.by_name("photo.jpg").unwrap();
        let mut contents = Vec::new();
        entry.read_to_end(&mut contents).unwrap();
        assert_eq!(contents, b"jpeg-bytes");
    }

    #[test]
    fn test_archive_of_empty_store_has_no_entries() {
        let temp_dir = TempDir::new().unwrap();
        let store = SessionStore::new();

        let (path, entries) = write_archive(&store, temp_dir.path()).unwrap();
        assert_eq!(entries, 0);
        assert_eq!(ZipArchive::new(File::open(&path).unwrap()).unwrap().len(), 0);
    }
}
