use crate::crop::{DisplayCrop, DisplaySize};
use crate::error::{ConvertError, Result};
use crate::formats::{OutputFormat, SourceType};
use clap::{Parser, Subcommand};
use glob::glob;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

#[derive(Parser)]
#[command(
    name = "img-convert",
    about = "A batch image and PDF format converter with cropping support",
    long_about = "img-convert turns images and PDFs into any of ten output formats \
                  (jpg, png, webp, avif, bmp, gif, ico, jfif, tiff, pdf). It paints a \
                  configurable background color behind transparent sources, rasterizes \
                  the first page of PDF inputs, and packages batch results into a zip \
                  archive. Cropping rewrites a file's source so the next conversion \
                  uses the cropped region.",
    version = "0.1.0",
    after_help = "EXAMPLES:\n  \
    img-convert convert photo.png -f webp -q 90\n  \
    img-convert convert scan.pdf page.jpg\n  \
    img-convert batch ./shots ./out -f png --archive\n  \
    img-convert crop photo.jpg --rect 10,10,50,50 --display-size 100x100\n  \
    img-convert info photo.png"
)]
pub struct Args {
    #[arg(long, global = true, help = "Suppress status output")]
    pub quiet: bool,

    #[arg(short = 'v', long, global = true, help = "Verbose status output")]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(
        about = "Convert a single image or PDF file",
        long_about = "Convert one file to the chosen output format. PDF inputs are \
                      rasterized (first page only, at a fixed 2x scale) before \
                      encoding. The background color is painted behind every source, \
                      transparent or not."
    )]
    Convert {
        #[arg(help = "Input file path")]
        input: PathBuf,

        #[arg(help = "Output file path (default: <input-base>.<format> in the current directory)")]
        output: Option<PathBuf>,

        #[arg(
            short = 'f',
            long,
            help = "Output format (jpg, png, webp, avif, bmp, gif, ico, jfif, tiff, pdf)",
            long_help = "Output format. When omitted, the format is taken from the \
                         output path's extension, falling back to jpg."
        )]
        format: Option<OutputFormat>,

        #[arg(
            short = 'q',
            long,
            help = "Encoding quality (1-100, default: 95)",
            long_help = "Encoding quality from 1 to 100. Only lossy formats use it; \
                         png, bmp, gif and ico always encode at fixed settings."
        )]
        quality: Option<u8>,

        #[arg(
            short = 'b',
            long,
            help = "Background fill color as hex RGB (default: #FFFFFF)",
            long_help = "Opaque background painted behind the source before encoding, \
                         e.g. #FF8800. Affects every output, not only transparent ones."
        )]
        background: Option<String>,
    },

    #[command(
        about = "Convert many files sequentially",
        long_about = "Collect files from a directory, glob pattern, or single path, \
                      convert them one at a time, and write the results as loose \
                      files or as a single converted_images.zip archive. A failing \
                      file never stops the rest of the batch."
    )]
    Batch {
        #[arg(
            help = "Input directory, file, or glob pattern",
            long_help = "Input can be a directory, a single file, or a glob such as \
                         './shots/*.png'. Files outside the supported media types are \
                         dropped silently."
        )]
        input: String,

        #[arg(help = "Output directory path")]
        output: PathBuf,

        #[arg(short = 'f', long, help = "Output format applied to every file (default: jpg)")]
        format: Option<OutputFormat>,

        #[arg(short = 'q', long, help = "Encoding quality (1-100, default: 95)")]
        quality: Option<u8>,

        #[arg(short = 'b', long, help = "Background fill color as hex RGB (default: #FFFFFF)")]
        background: Option<String>,

        #[arg(short = 'r', long, help = "Recurse into subdirectories")]
        recursive: bool,

        #[arg(
            short = 'a',
            long,
            help = "Package results into converted_images.zip instead of loose files"
        )]
        archive: bool,

        #[arg(
            long,
            value_name = "PATH",
            help = "Write a metadata session snapshot after the batch",
            long_help = "Write a JSON snapshot of the batch metadata (names, sizes, \
                         formats, crop regions) after conversion. Snapshots never \
                         contain file bytes; a restored session needs its files \
                         re-added."
        )]
        save_session: Option<PathBuf>,
    },

    #[command(
        about = "Crop a file and write the cropped source",
        long_about = "Extract a rectangular region and write it as a new file of the \
                      same media type at natural resolution. The rectangle is given \
                      in displayed-image coordinates together with the displayed \
                      size; zoom and pan never change the math. PDF inputs are \
                      rasterized, cropped, and re-wrapped as a single-page PDF."
    )]
    Crop {
        #[arg(help = "Input file path")]
        input: PathBuf,

        #[arg(help = "Output file path (default: <input-base>_cropped.<ext>)")]
        output: Option<PathBuf>,

        #[arg(
            long,
            value_name = "X,Y,W,H",
            help = "Crop rectangle in displayed coordinates",
            long_help = "Rectangle as 'x,y,width,height' in the coordinate space of \
                         the displayed image. With the default display size of \
                         100x100 these are percentages of the image."
        )]
        rect: String,

        #[arg(
            long,
            value_name = "WxH",
            help = "Displayed size the rectangle refers to (default: 100x100)",
            long_help = "Size the image was displayed at when the rectangle was \
                         drawn, as 'widthxheight'. The crop scales the rectangle by \
                         natural-size / displayed-size."
        )]
        display_size: Option<String>,
    },

    #[command(about = "Display information about an image or PDF file")]
    Info {
        #[arg(help = "File path to analyze")]
        input: PathBuf,
    },
}

/// Collect convertible files from a path, directory, or glob pattern.
///
/// Unsupported files are dropped without comment; an input that matches
/// nothing at all is an error.
pub fn collect_input_files(input: &str, recursive: bool) -> Result<Vec<PathBuf>> {
    let input_path = Path::new(input);
    let mut files = Vec::new();

    if input_path.is_file() {
        if SourceType::from_path(input_path).is_some() {
            files.push(input_path.to_path_buf());
        }
    } else if input_path.is_dir() {
        let walker = if recursive {
            WalkDir::new(input_path).into_iter()
        } else {
            WalkDir::new(input_path).max_depth(1).into_iter()
        };

        for entry in walker.filter_entry(|e| !e.file_name().to_string_lossy().starts_with('.')) {
            let entry = entry?;
            let path = entry.path();
            if path.is_file() && SourceType::from_path(path).is_some() {
                files.push(path.to_path_buf());
            }
        }
        files.sort();
    } else if let Ok(pattern) = glob(input) {
        for entry in pattern.flatten() {
            if entry.is_file() && SourceType::from_path(&entry).is_some() {
                files.push(entry);
            }
        }
        files.sort();
    } else {
        return Err(ConvertError::NoInputFilesFound(input.to_string()));
    }

    Ok(files)
}

/// Parse an `x,y,width,height` rectangle in displayed coordinates.
pub fn parse_rect(value: &str) -> Result<DisplayCrop> {
    let parts: Vec<f64> = value
        .split(',')
        .map(|part| part.trim().parse::<f64>())
        .collect::<std::result::Result<_, _>>()
        .map_err(|_| bad_rect(value))?;

    match parts.as_slice() {
        [x, y, width, height] => Ok(DisplayCrop {
            x: *x,
            y: *y,
            width: *width,
            height: *height,
        }),
        _ => Err(bad_rect(value)),
    }
}

/// Parse a `WIDTHxHEIGHT` displayed size.
pub fn parse_display_size(value: &str) -> Result<DisplaySize> {
    let (width, height) = value
        .split_once(['x', 'X'])
        .ok_or_else(|| bad_size(value))?;

    let width: f64 = width.trim().parse().map_err(|_| bad_size(value))?;
    let height: f64 = height.trim().parse().map_err(|_| bad_size(value))?;

    Ok(DisplaySize { width, height })
}

fn bad_rect(value: &str) -> ConvertError {
    ConvertError::InvalidCrop(format!("expected 'x,y,width,height', got '{value}'"))
}

fn bad_size(value: &str) -> ConvertError {
    ConvertError::InvalidCrop(format!("expected 'WIDTHxHEIGHT', got '{value}'"))
}
