//! Pipeline micro-benchmarks
//!
//! Covers the pure CPU stages that run on every upload: alpha cleanup,
//! white-canvas compositing, and output naming. Model inference is
//! deliberately absent; its cost depends on the model file.

use criterion::{criterion_group, criterion_main, Criterion};
use cutout::pipeline::{clean_alpha, flatten_onto_white, sanitize_stem, AlphaCleanupOptions};
use cutout::NamingStrategy;
use image::{DynamicImage, ImageBuffer, Rgba, RgbaImage};
use std::hint::black_box;

/// Gradient alpha so the cleanup has real work on both sides of the
/// threshold.
fn soft_alpha_image(side: u32) -> RgbaImage {
    ImageBuffer::from_fn(side, side, |x, y| {
        let alpha = ((x + y) % 256) as u8;
        Rgba([180, 90, 30, alpha])
    })
}

fn bench_clean_alpha(c: &mut Criterion) {
    let base = soft_alpha_image(512);
    let options = AlphaCleanupOptions::default();

    c.bench_function("clean_alpha_512", |b| {
        b.iter(|| {
            let mut img = base.clone();
            clean_alpha(black_box(&mut img), black_box(&options));
            img
        })
    });
}

fn bench_flatten_onto_white(c: &mut Criterion) {
    let image = DynamicImage::ImageRgba8(soft_alpha_image(512));

    c.bench_function("flatten_onto_white_512", |b| {
        b.iter(|| flatten_onto_white(black_box(&image)))
    });
}

fn bench_naming(c: &mut Criterion) {
    c.bench_function("name_random", |b| {
        b.iter(|| NamingStrategy::Random.generate(black_box("photo.png"), black_box("png")))
    });

    c.bench_function("name_slug_suffix", |b| {
        b.iter(|| {
            NamingStrategy::SlugSuffix
                .generate(black_box("My Holiday Photo (1).JPG"), black_box("jpg"))
        })
    });

    c.bench_function("sanitize_stem", |b| {
        b.iter(|| sanitize_stem(black_box("../uploads/My Holiday Photo (1).JPG")))
    });
}

criterion_group!(
    benches,
    bench_clean_alpha,
    bench_flatten_onto_white,
    bench_naming
);
criterion_main!(benches);
