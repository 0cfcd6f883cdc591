use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use fadein_core::{LineBreaker, Paint};
use fadein_text::{GlyphCache, GlyphMask, TextEngine, TextStyle};

const PARAGRAPH: &str = "The quick brown fox jumps over the lazy dog. \
    Lorem ipsum dolor sit amet, consectetur adipiscing elit. \
    Sed do eiusmod tempor incididunt ut labore et dolore magna aliqua.";

fn bench_shape_paragraph(c: &mut Criterion) {
    let mut engine = TextEngine::new();
    let style = TextStyle::with_font_size(18.5);

    let mut group = c.benchmark_group("shape_paragraph");
    for &width in &[120.0f32, 360.0, f32::INFINITY] {
        group.bench_with_input(BenchmarkId::from_parameter(width), &width, |b, &width| {
            b.iter(|| engine.shape_text(black_box(PARAGRAPH), black_box(&style), width));
        });
    }
    group.finish();
}

fn bench_relayout_after_resize(c: &mut Criterion) {
    let mut engine = TextEngine::new();
    let paint = Paint::default();
    let mut widths = [240.0f32, 320.0, 400.0].into_iter().cycle();

    c.bench_function("relayout_after_resize", |b| {
        b.iter(|| {
            let width = widths.next().unwrap_or(320.0);
            engine.layout(black_box(PARAGRAPH), &paint, width)
        });
    });
}

fn bench_glyph_cache_hit(c: &mut Criterion) {
    let mut cache: GlyphCache<u32> = GlyphCache::new(256);
    for key in 0..256u32 {
        cache.get_or_rasterize(key, || GlyphMask::from_bitmap(12, 16, vec![255; 12 * 16]));
    }

    c.bench_function("glyph_cache_hit", |b| {
        let mut key = 0u32;
        b.iter(|| {
            key = (key + 1) % 256;
            cache.get_or_rasterize(black_box(key), || None)
        });
    });
}

criterion_group!(
    benches,
    bench_shape_paragraph,
    bench_relayout_after_resize,
    bench_glyph_cache_hit
);
criterion_main!(benches);
