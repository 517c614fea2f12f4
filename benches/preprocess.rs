//! Preprocessing Benchmarks
//!
//! Performance benchmarks for the image cleanup stages that run before OCR.
//!
//! Run with: `cargo bench --bench preprocess`

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use image::{DynamicImage, GrayImage, Luma};
use std::time::Duration;

use scanlens::preprocess::{
    adaptive_threshold_gaussian, deskew, gaussian_smooth, preprocess, rotate_replicate, Border,
};

/// Synthetic scan: white page with dark horizontal "text lines", slightly tilted
fn create_scanned_page(width: u32, height: u32) -> GrayImage {
    let mut page = GrayImage::from_pixel(width, height, Luma([235u8]));
    for y in (height / 10..height * 9 / 10).step_by(24) {
        for dy in 0..8 {
            for x in width / 10..width * 9 / 10 {
                if (x / 6) % 5 != 0 {
                    page.put_pixel(x, y + dy, Luma([30u8]));
                }
            }
        }
    }
    rotate_replicate(&page, 3.0)
}

/// Benchmark the full preprocessing chain at common page sizes
fn bench_preprocess(c: &mut Criterion) {
    let mut group = c.benchmark_group("preprocess");
    group.measurement_time(Duration::from_secs(10));
    group.sample_size(20);

    for (width, height) in [(425u32, 550u32), (850, 1100)] {
        let page = DynamicImage::ImageLuma8(create_scanned_page(width, height));
        group.throughput(Throughput::Elements(u64::from(width * height)));
        group.bench_with_input(
            BenchmarkId::new("full_chain", format!("{}x{}", width, height)),
            &page,
            |b, page| b.iter(|| preprocess(black_box(page))),
        );
    }

    group.finish();
}

/// Benchmark the individual stages on one page
fn bench_stages(c: &mut Criterion) {
    let page = create_scanned_page(850, 1100);
    let binary = adaptive_threshold_gaussian(&page, 11, 2.0);

    let mut group = c.benchmark_group("preprocess_stages");
    group.sample_size(20);

    group.bench_function("gaussian_5x5", |b| {
        b.iter(|| gaussian_smooth(black_box(&page), 5, Border::Reflect101))
    });
    group.bench_function("adaptive_threshold_11", |b| {
        b.iter(|| adaptive_threshold_gaussian(black_box(&page), 11, 2.0))
    });
    group.bench_function("deskew", |b| b.iter(|| deskew(black_box(&binary), 0.5)));

    group.finish();
}

criterion_group!(benches, bench_preprocess, bench_stages);
criterion_main!(benches);
