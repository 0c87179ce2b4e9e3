use crate::compositing::{blend_over, flatten, outline_region};
use crate::config::PosterConfig;
use crate::error::Result;
use crate::model::{Layout, Meta, PlacedSticker, PlacementRegion, PosterStats, StickerAsset};
use crate::occupancy::OccupancyIndex;
use crate::placement::{SearchParams, find_placement};
use crate::scaling::{adaptive_scale, scaled_size, uniform};
use crate::transform::{resize, rotate_expand};
use image::{RgbImage, Rgba, RgbaImage};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use tracing::{debug, info, instrument, warn};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Why a sticker was not placed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// No non-overlapping position within the per-sticker attempt budget.
    NoFit,
    /// The image could not be decoded.
    Unreadable,
}

/// Progress notifications emitted while placing.
#[derive(Debug, Clone, Copy)]
pub enum PlacementEvent<'a> {
    Placed {
        sticker: &'a StickerAsset,
        region: PlacementRegion,
        placed: usize,
    },
    Skipped {
        sticker: &'a StickerAsset,
        reason: SkipReason,
    },
}

/// Output of a packing run: layout metadata, run statistics and the flattened poster.
pub struct PlacementResult {
    pub layout: Layout,
    pub stats: PosterStats,
    pub image: RgbImage,
}

impl PlacementResult {
    pub fn placed_count(&self) -> usize {
        self.stats.placed
    }

    pub fn requested_count(&self) -> usize {
        self.stats.requested
    }

    pub fn regions(&self) -> Vec<PlacementRegion> {
        self.layout.regions().copied().collect()
    }
}

/// Places stickers on one canvas. Owns the canvas, the occupancy index and
/// the RNG for the run; nothing is shared between packers.
pub struct StickerPacker {
    cfg: PosterConfig,
    rng: StdRng,
    canvas: RgbaImage,
    occupancy: OccupancyIndex,
}

impl StickerPacker {
    /// Validates `cfg` and prepares an empty canvas.
    pub fn new(cfg: PosterConfig) -> Result<Self> {
        cfg.validate()?;
        let rng = match cfg.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let [r, g, b] = cfg.background;
        let canvas = RgbaImage::from_pixel(cfg.width, cfg.height, Rgba([r, g, b, 255]));
        let occupancy = OccupancyIndex::new(cfg.width, cfg.height, cfg.grid_cell);
        Ok(Self {
            cfg,
            rng,
            canvas,
            occupancy,
        })
    }

    pub fn config(&self) -> &PosterConfig {
        &self.cfg
    }

    pub fn occupancy(&self) -> &OccupancyIndex {
        &self.occupancy
    }

    pub fn place(self, stickers: &[StickerAsset]) -> Result<PlacementResult> {
        self.place_with(stickers, |_| {})
    }

    /// Runs the placement loop, reporting each placed or skipped sticker to `on_event`.
    #[instrument(skip_all, fields(requested = self.cfg.count, pool = stickers.len()))]
    pub fn place_with<F>(mut self, stickers: &[StickerAsset], mut on_event: F) -> Result<PlacementResult>
    where
        F: FnMut(PlacementEvent<'_>),
    {
        let requested = self.cfg.count;
        let ceiling = self.cfg.attempt_ceiling();
        let order = order_stickers(stickers, requested, self.cfg.allow_repeats, &mut self.rng);
        let params = SearchParams::from(&self.cfg);

        let mut placements: Vec<PlacedSticker> = Vec::new();
        let mut stats = PosterStats {
            requested,
            canvas_area: self.cfg.canvas_area(),
            ..Default::default()
        };

        let mut queue: Box<dyn Iterator<Item = &StickerAsset> + '_> = if self.cfg.allow_repeats {
            Box::new(order.iter().copied().cycle())
        } else {
            Box::new(order.iter().copied())
        };

        while placements.len() < requested {
            if stats.attempts >= ceiling {
                info!(placed = placements.len(), ceiling, "reached attempt ceiling");
                break;
            }
            let Some(sticker) = queue.next() else {
                break;
            };
            stats.attempts += 1;

            let src = match image::open(&sticker.path) {
                Ok(img) => img.to_rgba8(),
                Err(e) => {
                    warn!(path = ?sticker.path, error = %e, "skip sticker");
                    stats.skipped_unreadable += 1;
                    on_event(PlacementEvent::Skipped {
                        sticker,
                        reason: SkipReason::Unreadable,
                    });
                    continue;
                }
            };

            match self.place_one(sticker, &src, &params)? {
                Some(placed) => {
                    let region = placed.region;
                    placements.push(placed);
                    if placements.len() % 50 == 0 {
                        info!(placed = placements.len(), requested, "placing stickers");
                    }
                    on_event(PlacementEvent::Placed {
                        sticker,
                        region,
                        placed: placements.len(),
                    });
                }
                None => {
                    debug!(path = ?sticker.path, "no free position");
                    stats.skipped_no_fit += 1;
                    on_event(PlacementEvent::Skipped {
                        sticker,
                        reason: SkipReason::NoFit,
                    });
                }
            }
        }

        stats.placed = placements.len();
        stats.covered_area = self.occupancy.covered_area();
        stats.coverage = if stats.canvas_area > 0 {
            stats.covered_area as f64 / stats.canvas_area as f64
        } else {
            0.0
        };
        info!(placed = stats.placed, requested, attempts = stats.attempts, "placement finished");

        let image = flatten(&self.canvas, self.cfg.background);
        let layout = Layout {
            width: self.cfg.width,
            height: self.cfg.height,
            placements,
            meta: Meta {
                schema_version: "1".into(),
                app: "sticker-poster".into(),
                version: env!("CARGO_PKG_VERSION").into(),
                requested,
                seed: self.cfg.seed,
                background: self.cfg.background,
                dpi: self.cfg.dpi,
            },
        };
        Ok(PlacementResult {
            layout,
            stats,
            image,
        })
    }

    // Scale, rotate, search and commit one decoded sticker.
    fn place_one(
        &mut self,
        sticker: &StickerAsset,
        src: &RgbaImage,
        params: &SearchParams,
    ) -> Result<Option<PlacedSticker>> {
        let (w, h) = src.dimensions();
        let natural_area = (w as u64) * (h as u64);
        let scale = adaptive_scale(&mut self.rng, natural_area, &self.cfg);
        let size = scaled_size((w, h), scale, self.cfg.min_sticker_area());
        let rotation = uniform(&mut self.rng, self.cfg.rotation_range);

        // search on the expanded extent before paying for the resample
        let (rw, rh) = crate::transform::rotated_extent(size.width, size.height, rotation);
        let canvas = (self.cfg.width, self.cfg.height);
        let Some(cand) = find_placement(&mut self.rng, &self.occupancy, rw, rh, canvas, params) else {
            return Ok(None);
        };

        let rotated = rotate_expand(&resize(src, size.width, size.height), rotation);
        let region = PlacementRegion::from_xywh(cand.x, cand.y, rotated.width(), rotated.height());
        self.occupancy.insert(region)?;
        blend_over(&mut self.canvas, &rotated, cand.x, cand.y);
        if self.cfg.outlines {
            outline_region(&mut self.canvas, &region, Rgba([255, 0, 0, 255]));
        }
        Ok(Some(PlacedSticker {
            key: sticker.key(),
            category: sticker.category.clone(),
            region,
            scale: size.scale,
            rotation,
        }))
    }
}

/// Picks and orders the stickers for one run.
///
/// The pool is shuffled, the first `count` kept (the whole pool when
/// `allow_repeats`), sorted by natural area and then interleaved large/small.
pub fn order_stickers<'a, R: rand::Rng + ?Sized>(
    stickers: &'a [StickerAsset],
    count: usize,
    allow_repeats: bool,
    rng: &mut R,
) -> Vec<&'a StickerAsset> {
    let mut pool: Vec<&StickerAsset> = stickers.iter().collect();
    pool.shuffle(rng);
    if !allow_repeats {
        pool.truncate(count);
    }
    // stable: equal areas keep their shuffled order
    pool.sort_by(|a, b| b.area.cmp(&a.area));
    interleave_halves(&pool)
}

/// Round-robin merge of the larger half with the smaller half of a list
/// sorted by descending size: `[0, mid, 1, mid + 1, ...]`.
pub fn interleave_halves<T: Copy>(sorted_desc: &[T]) -> Vec<T> {
    let mid = sorted_desc.len() / 2;
    let mut out = Vec::with_capacity(sorted_desc.len());
    for i in 0..mid {
        out.push(sorted_desc[i]);
        if let Some(&small) = sorted_desc.get(i + mid) {
            out.push(small);
        }
    }
    out.extend_from_slice(&sorted_desc[out.len()..]);
    out
}

/// Composes one poster from `stickers` with `cfg`.
#[instrument(skip_all, fields(width = cfg.width, height = cfg.height))]
pub fn compose(stickers: &[StickerAsset], cfg: PosterConfig) -> Result<PlacementResult> {
    StickerPacker::new(cfg)?.place(stickers)
}

/// Composes one independent poster per seed. With the `parallel` feature the
/// runs are spread over rayon's pool; results keep the order of `seeds`.
pub fn compose_variants(
    stickers: &[StickerAsset],
    cfg: &PosterConfig,
    seeds: &[u64],
) -> Vec<Result<PlacementResult>> {
    let run = |seed: &u64| {
        let mut c = cfg.clone();
        c.seed = Some(*seed);
        compose(stickers, c)
    };
    #[cfg(feature = "parallel")]
    {
        seeds.par_iter().map(run).collect()
    }
    #[cfg(not(feature = "parallel"))]
    {
        seeds.iter().map(run).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interleave_even_and_odd() {
        assert_eq!(interleave_halves(&[6, 5, 4, 3, 2, 1]), vec![6, 3, 5, 2, 4, 1]);
        assert_eq!(interleave_halves(&[5, 4, 3, 2, 1]), vec![5, 3, 4, 2, 1]);
        assert_eq!(interleave_halves(&[1]), vec![1]);
        assert!(interleave_halves::<u8>(&[]).is_empty());
    }

    #[test]
    fn order_truncates_without_repeats() {
        let stickers: Vec<StickerAsset> = (0..8)
            .map(|i| StickerAsset::new(format!("s{i}.png").into(), "c", Some((10 + i, 10))))
            .collect();
        let mut rng = StdRng::seed_from_u64(5);
        assert_eq!(order_stickers(&stickers, 3, false, &mut rng).len(), 3);
        let mut rng = StdRng::seed_from_u64(5);
        assert_eq!(order_stickers(&stickers, 3, true, &mut rng).len(), 8);
    }
}
