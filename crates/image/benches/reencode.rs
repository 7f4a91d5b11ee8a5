//! Benchmarks for the quality search.

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use image::{DynamicImage, Rgb, RgbImage};
use intake_image::{JpegSurfaceEncoder, Reencoder, Surface, detect_format};

fn noisy(width: u32, height: u32) -> DynamicImage {
    DynamicImage::ImageRgb8(RgbImage::from_fn(width, height, |x, y| {
        let v = (x.wrapping_mul(7919) ^ y.wrapping_mul(104_729)) as u8;
        Rgb([v, v.rotate_left(3), v.rotate_right(2)])
    }))
}

fn bench_format_detection(c: &mut Criterion) {
    let jpeg_data = vec![0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, 0x4A, 0x46, 0x49, 0x46];

    c.bench_function("detect_jpeg", |b| {
        b.iter(|| detect_format(black_box(&jpeg_data)))
    });
}

fn bench_quality_search(c: &mut Criterion) {
    let surface = Surface::from_image(&noisy(512, 512));

    c.bench_function("reencode_fits_first_attempt", |b| {
        let reencoder = Reencoder::new(JpegSurfaceEncoder);
        b.iter(|| reencoder.reencode(black_box(&surface)))
    });

    c.bench_function("reencode_walks_schedule", |b| {
        let reencoder = Reencoder::new(JpegSurfaceEncoder).with_threshold(16 * 1024);
        b.iter(|| reencoder.reencode(black_box(&surface)))
    });
}

fn bench_surface_draw(c: &mut Criterion) {
    let image = noisy(1024, 768);
    let mut surface = Surface::new();

    c.bench_function("surface_draw_reused", |b| {
        b.iter(|| surface.draw(black_box(&image)))
    });
}

criterion_group!(benches, bench_format_detection, bench_quality_search, bench_surface_draw);
criterion_main!(benches);
