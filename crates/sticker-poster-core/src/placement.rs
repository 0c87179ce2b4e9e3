use crate::config::{PosterConfig, Scoring};
use crate::model::PlacementRegion;
use crate::occupancy::{OccupancyIndex, distance};
use rand::Rng;

/// Knobs for the randomized position search.
#[derive(Debug, Clone, Copy)]
pub struct SearchParams {
    /// Random positions tried before giving up on a sticker.
    pub max_attempts: u32,
    /// Stop sampling once this many valid positions are collected.
    pub candidate_pool: usize,
    pub spacing: u32,
    pub scoring: Scoring,
}

impl From<&PosterConfig> for SearchParams {
    fn from(cfg: &PosterConfig) -> Self {
        Self {
            max_attempts: cfg.max_attempts_per_sticker,
            candidate_pool: cfg.candidate_pool,
            spacing: cfg.spacing,
            scoring: cfg.scoring,
        }
    }
}

/// A valid top-left position and its score (lower is better).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candidate {
    pub x: u32,
    pub y: u32,
    pub score: f64,
}

/// Distance-based score pulling new stickers toward existing ones.
pub fn score(
    occ: &OccupancyIndex,
    region: &PlacementRegion,
    scoring: Scoring,
    canvas: (u32, u32),
) -> f64 {
    let c = region.center();
    let canvas_center = (canvas.0 as f64 / 2.0, canvas.1 as f64 / 2.0);
    let d = match scoring {
        Scoring::Centroid => occ.centroid().map(|g| distance(c, g)),
        Scoring::Nearest => occ.nearest_center_distance(c),
    };
    d.unwrap_or_else(|| distance(c, canvas_center))
}

/// Samples random positions for a `w x h` box and returns the best-scored
/// of the first `candidate_pool` non-overlapping ones.
///
/// Returns `None` if the box does not fit on the canvas or no valid
/// position turned up within `max_attempts` samples.
pub fn find_placement<R: Rng + ?Sized>(
    rng: &mut R,
    occ: &OccupancyIndex,
    w: u32,
    h: u32,
    canvas: (u32, u32),
    params: &SearchParams,
) -> Option<Candidate> {
    let (cw, ch) = canvas;
    if w == 0 || h == 0 || w > cw || h > ch {
        return None;
    }
    let max_x = cw - w;
    let max_y = ch - h;

    let mut best: Option<Candidate> = None;
    let mut found = 0usize;
    for _ in 0..params.max_attempts {
        let x = rng.gen_range(0..=max_x);
        let y = rng.gen_range(0..=max_y);
        let region = PlacementRegion::from_xywh(x, y, w, h);
        if occ.overlaps(&region, params.spacing) {
            continue;
        }
        let s = score(occ, &region, params.scoring, canvas);
        if best.is_none_or(|b| s < b.score) {
            best = Some(Candidate { x, y, score: s });
        }
        found += 1;
        if found >= params.candidate_pool {
            break;
        }
    }
    best
}
