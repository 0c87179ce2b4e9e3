use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use image::{Rgba, RgbaImage};
use rand::{Rng, SeedableRng, rngs::StdRng};
use std::hint::black_box;
use std::path::Path;
use sticker_poster_core::placement::{SearchParams, find_placement};
use sticker_poster_core::prelude::*;

fn generate_stickers(root: &Path, count: usize, min_size: u32, max_size: u32) -> Vec<StickerAsset> {
    let mut rng = StdRng::seed_from_u64(42);
    for i in 0..count {
        let dir = root.join(format!("cat_{}", i % 4));
        std::fs::create_dir_all(&dir).unwrap();
        let w = rng.gen_range(min_size..=max_size);
        let h = rng.gen_range(min_size..=max_size);
        let color = Rgba([rng.r#gen(), rng.r#gen(), rng.r#gen(), 255]);
        RgbaImage::from_pixel(w, h, color)
            .save(dir.join(format!("s_{i:03}.png")))
            .unwrap();
    }
    load(root).unwrap()
}

fn bench_occupancy(c: &mut Criterion) {
    let mut group = c.benchmark_group("occupancy_search");

    for count in [50usize, 200, 500] {
        group.throughput(Throughput::Elements(count as u64));
        group.bench_with_input(BenchmarkId::new("find_and_insert", count), &count, |b, &count| {
            b.iter(|| {
                let mut rng = StdRng::seed_from_u64(7);
                let mut occ = OccupancyIndex::new(2048, 2048, 128);
                let params = SearchParams {
                    max_attempts: 500,
                    candidate_pool: 10,
                    spacing: 0,
                    scoring: Scoring::Centroid,
                };
                for _ in 0..count {
                    let w = rng.gen_range(16..=96);
                    let h = rng.gen_range(16..=96);
                    if let Some(c) = find_placement(&mut rng, &occ, w, h, (2048, 2048), &params) {
                        let _ = occ.insert(PlacementRegion::from_xywh(c.x, c.y, w, h));
                    }
                }
                black_box(occ.len())
            });
        });
    }

    group.finish();
}

fn bench_compose(c: &mut Criterion) {
    let tmp = tempfile::tempdir().unwrap();
    let stickers = generate_stickers(tmp.path(), 40, 24, 120);
    let mut group = c.benchmark_group("compose");
    group.sample_size(10);

    for scoring in [Scoring::Centroid, Scoring::Nearest] {
        group.bench_with_input(
            BenchmarkId::new("poster_1024", format!("{scoring:?}")),
            &scoring,
            |b, &scoring| {
                b.iter(|| {
                    let cfg = PosterConfig::builder()
                        .with_canvas(1024, 768)
                        .count(40)
                        .scoring(scoring)
                        .seed(Some(3))
                        .build();
                    black_box(compose(&stickers, cfg).unwrap().placed_count())
                });
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_occupancy, bench_compose);
criterion_main!(benches);
