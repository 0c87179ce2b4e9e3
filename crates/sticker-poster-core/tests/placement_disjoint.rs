use image::{Rgba, RgbaImage};
use rand::{Rng, SeedableRng};
use std::fs;
use std::path::Path;
use sticker_poster_core::prelude::*;

fn write_sticker(root: &Path, category: &str, name: &str, w: u32, h: u32) {
    let dir = root.join(category);
    fs::create_dir_all(&dir).expect("mkdir");
    RgbaImage::from_pixel(w, h, Rgba([200, 40, 90, 255]))
        .save(dir.join(name))
        .expect("save");
}

fn disjoint(regions: &[PlacementRegion]) -> bool {
    for i in 0..regions.len() {
        for j in (i + 1)..regions.len() {
            let a = &regions[i];
            let b = &regions[j];
            let overlap = !(a.x1 >= b.x2 || b.x1 >= a.x2 || a.y1 >= b.y2 || b.y1 >= a.y2);
            if overlap {
                return false;
            }
        }
    }
    true
}

#[test]
fn four_stickers_on_800_by_600() {
    let tmp = tempfile::tempdir().expect("tempdir");
    write_sticker(tmp.path(), "ch01", "a.png", 40, 30);
    write_sticker(tmp.path(), "ch01", "b.png", 30, 30);
    write_sticker(tmp.path(), "ch02", "c.png", 50, 20);
    write_sticker(tmp.path(), "ch02", "d.png", 25, 45);
    let stickers = load(tmp.path()).expect("load");

    let cfg = PosterConfig::builder()
        .with_canvas(800, 600)
        .count(4)
        .seed(Some(1))
        .build();
    let floor = cfg.min_area_ratio * 480_000.0;
    let out = compose(&stickers, cfg).expect("compose");

    assert_eq!(out.placed_count(), 4);
    let regions = out.regions();
    assert_eq!(regions.len(), 4);
    assert!(disjoint(&regions));
    for r in &regions {
        assert!(r.within(800, 600));
        assert!(r.area() as f64 >= floor);
    }
    assert_eq!(out.image.dimensions(), (800, 600));
}

#[test]
fn many_random_stickers_never_overlap() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let mut rng = rand::rngs::StdRng::seed_from_u64(42);
    for i in 0..40 {
        let w = rng.gen_range(8..=90);
        let h = rng.gen_range(8..=90);
        write_sticker(tmp.path(), &format!("cat{}", i % 5), &format!("s{i}.png"), w, h);
    }
    let stickers = load(tmp.path()).expect("load");

    for scoring in [Scoring::Centroid, Scoring::Nearest] {
        let cfg = PosterConfig::builder()
            .with_canvas(400, 300)
            .count(40)
            .seed(Some(9))
            .scoring(scoring)
            .grid_cell(32)
            .build();
        let out = compose(&stickers, cfg).expect("compose");
        assert!(out.placed_count() <= 40);
        assert_eq!(
            out.placed_count() + out.stats.skipped_no_fit + out.stats.skipped_unreadable,
            out.stats.attempts
        );
        assert!(disjoint(&out.regions()));
    }
}

#[test]
fn spacing_keeps_a_gap() {
    let tmp = tempfile::tempdir().expect("tempdir");
    for i in 0..12 {
        write_sticker(tmp.path(), "c", &format!("s{i}.png"), 20, 20);
    }
    let stickers = load(tmp.path()).expect("load");
    let cfg = PosterConfig::builder()
        .with_canvas(300, 300)
        .count(12)
        .seed(Some(3))
        .spacing(5)
        .build();
    let out = compose(&stickers, cfg).expect("compose");
    let regions = out.regions();
    for i in 0..regions.len() {
        for j in (i + 1)..regions.len() {
            assert!(!regions[i].intersects(&regions[j], 4));
        }
    }
}

#[test]
fn requested_fewer_than_pool() {
    let tmp = tempfile::tempdir().expect("tempdir");
    for i in 0..10 {
        write_sticker(tmp.path(), "c", &format!("s{i}.png"), 16, 16);
    }
    let stickers = load(tmp.path()).expect("load");
    let cfg = PosterConfig::builder()
        .with_canvas(500, 500)
        .count(3)
        .seed(Some(11))
        .build();
    let out = compose(&stickers, cfg).expect("compose");
    assert_eq!(out.placed_count(), 3);
    assert_eq!(out.stats.attempts, 3);
}
