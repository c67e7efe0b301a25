use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use image::{ImageFormat, Rgba, RgbaImage};
use img_convert::encode::{convert_source, ConversionOptions};
use img_convert::transparency::has_transparency;
use img_convert::utils::format_file_size;
use img_convert::{OutputFormat, SourceContent, SourceType};
use std::io::Cursor;

fn png_source(width: u32, height: u32) -> SourceContent {
    let image = RgbaImage::from_fn(width, height, |x, y| {
        Rgba([(x % 256) as u8, (y % 256) as u8, 128, 255])
    });
    let mut bytes = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .unwrap();
    SourceContent::new(bytes, SourceType::Png)
}

fn bench_format_file_size(c: &mut Criterion) {
    c.bench_function("format_file_size", |b| {
        b.iter(|| format_file_size(black_box(1_572_864)))
    });
}

fn bench_transparency_scan(c: &mut Criterion) {
    let mut group = c.benchmark_group("transparency_scan");

    for size in [256u32, 1024].iter() {
        // Fully opaque is the worst case: the scan cannot short-circuit.
        let opaque = RgbaImage::from_pixel(*size, *size, Rgba([10, 20, 30, 255]));
        group.bench_with_input(
            BenchmarkId::new("opaque", format!("{size}x{size}")),
            &opaque,
            |b, image| b.iter(|| has_transparency(black_box(image))),
        );
    }

    group.finish();
}

fn bench_png_to_jpeg(c: &mut Criterion) {
    let source = png_source(640, 480);
    let options = ConversionOptions::default();

    c.bench_function("png_to_jpeg_640x480", |b| {
        b.iter(|| {
            convert_source(
                black_box(&source),
                black_box(OutputFormat::Jpg),
                black_box(&options),
            )
        })
    });
}

fn bench_png_to_pdf(c: &mut Criterion) {
    let source = png_source(320, 240);
    let options = ConversionOptions::default();

    c.bench_function("png_to_pdf_320x240", |b| {
        b.iter(|| {
            convert_source(
                black_box(&source),
                black_box(OutputFormat::Pdf),
                black_box(&options),
            )
        })
    });
}

criterion_group!(
    benches,
    bench_format_file_size,
    bench_transparency_scan,
    bench_png_to_jpeg,
    bench_png_to_pdf
);
criterion_main!(benches);
