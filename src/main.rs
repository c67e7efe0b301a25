use anyhow::{Context, Result};
use clap::Parser;
use img_convert::cli::{self, Args, Commands};
use img_convert::utils::{base_name, create_progress_spinner, format_file_size};
use img_convert::{
    convert_all, convert_source, crop_record, has_transparency, write_archive, write_outputs,
    ConversionOptions, DisplaySize, FileStatus, OutputFormat, SessionStore, SourceContent,
    SourceType,
};
use img_convert::{info, verbose, warn};
use indicatif::{ProgressBar, ProgressStyle};
use std::fs;
use std::path::{Path, PathBuf};

fn main() -> Result<()> {
    let args = Args::parse();
    img_convert::logger::set_quiet(args.quiet);
    img_convert::logger::set_verbose(args.verbose);

    match args.command {
        Commands::Convert {
            input,
            output,
            format,
            quality,
            background,
        } => run_convert(input, output, format, quality, background),
        Commands::Batch {
            input,
            output,
            format,
            quality,
            background,
            recursive,
            archive,
            save_session,
        } => run_batch(
            input,
            output,
            format,
            quality,
            background,
            recursive,
            archive,
            save_session,
        ),
        Commands::Crop {
            input,
            output,
            rect,
            display_size,
        } => run_crop(input, output, rect, display_size),
        Commands::Info { input } => run_info(&input),
    }
}

fn file_name_of(path: &Path) -> Result<String> {
    Ok(path
        .file_name()
        .with_context(|| format!("{:?} has no file name", path))?
        .to_string_lossy()
        .to_string())
}

fn read_source(path: &Path) -> Result<(String, SourceType, Vec<u8>)> {
    let media_type = SourceType::from_path(path)
        .with_context(|| format!("{:?} is not a supported input type", path))?;
    let bytes = fs::read(path).with_context(|| format!("failed to read {:?}", path))?;
    Ok((file_name_of(path)?, media_type, bytes))
}

fn run_convert(
    input: PathBuf,
    output: Option<PathBuf>,
    format: Option<OutputFormat>,
    quality: Option<u8>,
    background: Option<String>,
) -> Result<()> {
    let (name, media_type, bytes) = read_source(&input)?;
    let original_size = bytes.len() as u64;

    let format = format.unwrap_or_else(|| match &output {
        Some(path) => OutputFormat::from_path_or_default(path),
        None => OutputFormat::default(),
    });
    let options = ConversionOptions::new(quality, background.as_deref())?;

    info!("🔄 Converting {:?} to {}", input, format);
    let pb = create_progress_spinner("Converting...");
    let source = SourceContent::new(bytes, media_type);
    let encoded = convert_source(&source, format, &options)?;
    pb.finish_with_message("✅ Conversion complete");

    let output_path = output.unwrap_or_else(|| {
        PathBuf::from(format!("{}.{}", base_name(&name), format.extension()))
    });
    fs::write(&output_path, &encoded.bytes)
        .with_context(|| format!("failed to write {:?}", output_path))?;

    info!("📁 Output: {:?}", output_path);
    info!("📊 Original size: {}", format_file_size(original_size));
    info!("📈 Converted size: {}", encoded.size);
    if encoded.has_transparency == Some(true) {
        verbose!("Source has transparent pixels; the background fill shows through");
    }

    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn run_batch(
    input: String,
    output: PathBuf,
    format: Option<OutputFormat>,
    quality: Option<u8>,
    background: Option<String>,
    recursive: bool,
    archive: bool,
    save_session: Option<PathBuf>,
) -> Result<()> {
    info!("🚀 Starting batch conversion...");
    let files = cli::collect_input_files(&input, recursive)?;
    if files.is_empty() {
        warn!("No convertible files found in {}", input);
        return Ok(());
    }

    let options = ConversionOptions::new(quality, background.as_deref())?;
    let output_format = format.unwrap_or_default();

    let mut store = SessionStore::new();
    for path in &files {
        let media_type = match SourceType::from_path(path) {
            Some(media_type) => media_type,
            None => continue,
        };
        let bytes = fs::read(path).with_context(|| format!("failed to read {:?}", path))?;
        store.add_file(&file_name_of(path)?, bytes, media_type.media_type(), output_format);
    }

    info!("📊 Found {} files to convert", store.len());

    let progress = ProgressBar::new(store.len() as u64);
    progress.set_style(ProgressStyle::default_bar());

    let summary = convert_all(&mut store, &options, |record| {
        if record.status == FileStatus::Converting {
            progress.set_message(record.original_name.clone());
        } else {
            progress.inc(1);
        }
    });
    progress.finish_and_clear();

    if archive {
        let (path, entries) = write_archive(&store, &output)?;
        info!("📦 Packaged {} files into {:?}", entries, path);
    } else {
        let written = write_outputs(&store, &output)?;
        info!("📁 Wrote {} files to {:?}", written.len(), output);
    }

    if let Some(session_path) = save_session {
        store.save_snapshot(&session_path)?;
        verbose!("Session snapshot written to {:?}", session_path);
    }

    info!("\n📊 Batch Summary:");
    info!("  ✅ Converted: {}", summary.converted);
    info!("  ⏭️  Skipped: {}", summary.skipped);
    if summary.failed > 0 {
        warn!("Failed: {} (retry by re-running the batch)", summary.failed);
    }

    Ok(())
}

fn run_crop(
    input: PathBuf,
    output: Option<PathBuf>,
    rect: String,
    display_size: Option<String>,
) -> Result<()> {
    let rect = cli::parse_rect(&rect)?;
    let displayed = match display_size {
        Some(value) => cli::parse_display_size(&value)?,
        // Percentage coordinates by default.
        None => DisplaySize {
            width: 100.0,
            height: 100.0,
        },
    };

    let (name, media_type, bytes) = read_source(&input)?;
    let mut store = SessionStore::new();
    let id = store
        .add_file(&name, bytes, media_type.media_type(), OutputFormat::default())
        .with_context(|| format!("{:?} is not a supported input type", input))?;

    crop_record(&mut store, id, &rect, displayed)?;

    let record = store.get(id).context("record vanished after crop")?;
    let source = record
        .source
        .as_ref()
        .context("cropped record has no source")?;

    let output_path = output.unwrap_or_else(|| {
        let extension = input
            .extension()
            .map(|e| e.to_string_lossy().to_string())
            .unwrap_or_else(|| "png".to_string());
        PathBuf::from(format!("{}_cropped.{}", base_name(&name), extension))
    });
    fs::write(&output_path, &source.bytes)
        .with_context(|| format!("failed to write {:?}", output_path))?;

    if let Some(region) = record.crop_region {
        info!(
            "✂️  Cropped {}x{} region at ({}, {})",
            region.width, region.height, region.x, region.y
        );
    }
    info!("📁 Output: {:?} ({})", output_path, record.original_size_display());

    Ok(())
}

fn run_info(input: &Path) -> Result<()> {
    let (name, media_type, bytes) = read_source(input)?;

    info!("📋 File: {}", name);
    info!(
        "📦 Size: {} ({} bytes)",
        format_file_size(bytes.len() as u64),
        bytes.len()
    );
    info!("🎭 Media type: {}", media_type);

    if media_type.is_pdf() {
        info!("📄 PDF input: only the first page converts, rasterized at 2x scale");
        return Ok(());
    }

    let image_format = media_type
        .to_image_format()
        .context("media type has no raster decoder")?;
    let decoded = image::load_from_memory_with_format(&bytes, image_format)
        .with_context(|| format!("failed to decode {:?}", input))?;

    info!("📏 Dimensions: {}x{} pixels", decoded.width(), decoded.height());
    info!("🎨 Color type: {:?}", decoded.color());

    if media_type == SourceType::Png {
        let transparent = has_transparency(&decoded.to_rgba8());
        info!("💧 Transparency: {}", if transparent { "yes" } else { "no" });
    }

    Ok(())
}
