use criterion::{Criterion, black_box, criterion_group, criterion_main};
use screen_qr::models::PixelBuffer;
use screen_qr::utils::grayscale::{invert, rgb_to_grayscale, upscale_nearest};

fn gray_buffer(width: usize, height: usize) -> PixelBuffer {
    let packed = vec![128u8; width * height * 3];
    PixelBuffer::from_packed_rgb(width, height, &packed).unwrap()
}

fn bench_rgb_to_grayscale_small(c: &mut Criterion) {
    let buffer = gray_buffer(100, 100);
    c.bench_function("rgb_to_grayscale_100x100", |b| {
        b.iter(|| rgb_to_grayscale(black_box(&buffer)))
    });
}

fn bench_rgb_to_grayscale_padded(c: &mut Criterion) {
    // 641 * 3 is not a multiple of 4, so every row carries padding
    let buffer = gray_buffer(641, 480);
    c.bench_function("rgb_to_grayscale_641x480_padded", |b| {
        b.iter(|| rgb_to_grayscale(black_box(&buffer)))
    });
}

fn bench_rgb_to_grayscale_large(c: &mut Criterion) {
    let buffer = gray_buffer(1920, 1080);
    c.bench_function("rgb_to_grayscale_1920x1080", |b| {
        b.iter(|| rgb_to_grayscale(black_box(&buffer)))
    });
}

fn bench_retry_transforms(c: &mut Criterion) {
    let gray = vec![200u8; 300 * 300];
    c.bench_function("invert_300x300", |b| b.iter(|| invert(black_box(&gray))));
    c.bench_function("upscale_nearest_300x300_x3", |b| {
        b.iter(|| upscale_nearest(black_box(&gray), 300, 300, black_box(3)))
    });
}

criterion_group!(
    benches,
    bench_rgb_to_grayscale_small,
    bench_rgb_to_grayscale_padded,
    bench_rgb_to_grayscale_large,
    bench_retry_transforms
);
criterion_main!(benches);
