use criterion::{Criterion, black_box, criterion_group, criterion_main};
use screen_qr::models::PixelBuffer;
use screen_qr::render::{ModuleScale, RenderOptions};
use screen_qr::tools::{
    bench_limit_from_env, dataset_iter, dataset_root_from_env, load_pixel_buffer,
};
use screen_qr::{DecodeHints, Decoder, ECLevel, RqrrDecoder, decode_buffer, generate};

fn rendered_buffer(text: &str, scale: ModuleScale) -> PixelBuffer {
    let symbol = generate(text, ECLevel::M, RenderOptions::with_scale(scale)).unwrap();
    let side = symbol.export.width() as usize;
    PixelBuffer::from_packed_rgb(side, side, symbol.export.as_raw()).unwrap()
}

fn bench_decode_rendered(c: &mut Criterion) {
    for scale in [ModuleScale::X4, ModuleScale::X8] {
        let buffer = rendered_buffer("screen_qr decode bench", scale);
        c.bench_function(&format!("decode_rendered_x{}", scale.pixels()), |b| {
            b.iter(|| decode_buffer(black_box(&buffer)))
        });
    }
}

fn bench_decode_blank_full_effort(c: &mut Criterion) {
    // worst case: every retry pass runs and finds nothing
    let buffer = PixelBuffer::white(200, 200).unwrap();
    let hints = DecodeHints::default();
    c.bench_function("decode_blank_200x200_all_passes", |b| {
        b.iter(|| RqrrDecoder.decode(black_box(&buffer), &hints))
    });
}

fn bench_decode_dataset(c: &mut Criterion) {
    let root = dataset_root_from_env();
    let limit = bench_limit_from_env().or(Some(10));
    let buffers: Vec<PixelBuffer> = dataset_iter(&root, limit, false)
        .filter_map(|path| load_pixel_buffer(path).ok())
        .collect();
    if buffers.is_empty() {
        return;
    }
    c.bench_function("decode_dataset", |b| {
        b.iter(|| {
            for buffer in &buffers {
                black_box(decode_buffer(buffer));
            }
        })
    });
}

criterion_group!(
    benches,
    bench_decode_rendered,
    bench_decode_blank_full_effort,
    bench_decode_dataset
);
criterion_main!(benches);
