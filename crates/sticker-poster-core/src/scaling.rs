use crate::config::{PosterConfig, ScaleBand};
use rand::Rng;

/// Target pixel size of a sticker before rotation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaledSize {
    pub width: u32,
    pub height: u32,
    /// Effective factor relative to the natural size, area floor included.
    pub scale: f32,
}

impl ScaledSize {
    pub fn area(&self) -> u64 {
        (self.width as u64) * (self.height as u64)
    }
}

/// The band whose area bound the sticker falls under (last band otherwise).
pub fn band_for(bands: &[ScaleBand], natural_area: u64) -> Option<&ScaleBand> {
    bands
        .iter()
        .find(|b| b.max_area.is_none_or(|max| natural_area < max))
        .or_else(|| bands.last())
}

/// Uniform sample from `[lo, hi]`; returns `lo` for a degenerate range.
pub fn uniform<R: Rng + ?Sized>(rng: &mut R, (lo, hi): (f32, f32)) -> f32 {
    if hi > lo { rng.gen_range(lo..=hi) } else { lo }
}

/// Band scale times jitter, clamped to `scale_range`.
pub fn adaptive_scale<R: Rng + ?Sized>(rng: &mut R, natural_area: u64, cfg: &PosterConfig) -> f32 {
    let band = band_for(&cfg.scale_bands, natural_area)
        .map(|b| (b.min_scale, b.max_scale))
        .unwrap_or((1.0, 1.0));
    let scale = uniform(rng, band) * uniform(rng, cfg.jitter_range);
    scale.clamp(cfg.scale_range.0, cfg.scale_range.1)
}

/// Applies `scale` to `natural`, then grows the result until its area is at least `min_area`.
pub fn scaled_size(natural: (u32, u32), scale: f32, min_area: f64) -> ScaledSize {
    let (w, h) = natural;
    let mut nw = ((w as f64 * scale as f64).floor() as u32).max(1);
    let mut nh = ((h as f64 * scale as f64).floor() as u32).max(1);
    let area = (nw as f64) * (nh as f64);
    if area < min_area {
        let factor = (min_area / area).sqrt();
        nw = ((nw as f64 * factor).ceil() as u32).max(1);
        nh = ((nh as f64 * factor).ceil() as u32).max(1);
        // float rounding can leave the product a hair under the floor
        while ((nw as f64) * (nh as f64)) < min_area {
            if nw <= nh {
                nw += 1;
            } else {
                nh += 1;
            }
        }
    }
    ScaledSize {
        width: nw,
        height: nh,
        scale: if w > 0 { nw as f32 / w as f32 } else { scale },
    }
}
