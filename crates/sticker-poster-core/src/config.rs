//! Poster composition configuration.
//! Key notes:
//!   - `scale_bands` + `jitter_range` produce the adaptive scale, `scale_range` clamps it
//!   - `min_area_ratio` is a floor on each sticker's scaled area, as a fraction of the canvas
//!   - `candidate_pool`, `max_attempts_per_sticker` and `attempt_ceiling_factor` bound the
//!     randomized search; together with `seed` they make runs reproducible

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// How valid candidates are ranked.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Scoring {
    /// Distance to the centroid of placed stickers (canvas center when empty).
    Centroid,
    /// Distance to the closest placed sticker center (canvas center when empty).
    Nearest,
}

impl FromStr for Scoring {
    type Err = ();
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "centroid" => Ok(Self::Centroid),
            "nearest" | "nearest_neighbor" => Ok(Self::Nearest),
            _ => Err(()),
        }
    }
}

/// One row of the adaptive scale table.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ScaleBand {
    /// Exclusive upper bound on natural area; `None` for the last band.
    pub max_area: Option<u64>,
    pub min_scale: f32,
    pub max_scale: f32,
}

impl ScaleBand {
    pub const fn new(max_area: Option<u64>, min_scale: f32, max_scale: f32) -> Self {
        Self {
            max_area,
            min_scale,
            max_scale,
        }
    }
}

/// Tiny stickers scale up, huge ones scale down.
pub fn default_scale_bands() -> Vec<ScaleBand> {
    vec![
        ScaleBand::new(Some(5_000), 0.7, 1.3),
        ScaleBand::new(Some(20_000), 0.5, 1.0),
        ScaleBand::new(Some(100_000), 0.4, 0.8),
        ScaleBand::new(Some(500_000), 0.25, 0.5),
        ScaleBand::new(None, 0.15, 0.35),
    ]
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PosterConfig {
    /// Canvas width in pixels.
    pub width: u32,
    /// Canvas height in pixels.
    pub height: u32,
    /// Number of stickers requested.
    pub count: usize,

    /// Clamp applied to the adaptive scale factor `(min, max)`.
    #[serde(default = "default_scale_range")]
    pub scale_range: (f32, f32),
    /// Uniform rotation range in degrees `(min, max)`, counter-clockwise positive.
    #[serde(default = "default_rotation_range")]
    pub rotation_range: (f32, f32),
    /// Extra multiplicative jitter on the band scale `(min, max)`.
    #[serde(default = "default_jitter_range")]
    pub jitter_range: (f32, f32),
    #[serde(default = "default_scale_bands")]
    pub scale_bands: Vec<ScaleBand>,
    /// Minimum scaled area per sticker as a fraction of canvas area.
    #[serde(default = "default_min_area_ratio")]
    pub min_area_ratio: f64,

    /// Background RGB.
    #[serde(default = "default_background")]
    pub background: [u8; 3],
    /// DPI written to PNG output.
    #[serde(default = "default_dpi")]
    pub dpi: u32,
    /// RNG seed; `None` seeds from entropy.
    #[serde(default)]
    pub seed: Option<u64>,

    // search controls
    /// Random positions tried per sticker.
    #[serde(default = "default_max_attempts")]
    pub max_attempts_per_sticker: u32,
    /// Valid candidates collected before picking the best-scored one.
    #[serde(default = "default_candidate_pool")]
    pub candidate_pool: usize,
    /// Total sticker attempts allowed = factor * count.
    #[serde(default = "default_attempt_ceiling_factor")]
    pub attempt_ceiling_factor: u32,
    /// Minimum gap in pixels between placed stickers (0 lets them touch).
    #[serde(default)]
    pub spacing: u32,
    #[serde(default = "default_scoring")]
    pub scoring: Scoring,
    /// Cycle through the pool when `count` exceeds the number of stickers.
    #[serde(default)]
    pub allow_repeats: bool,
    /// Cell size of the occupancy grid in pixels.
    #[serde(default = "default_grid_cell")]
    pub grid_cell: u32,
    /// Draw red outlines around placed regions (debug).
    #[serde(default)]
    pub outlines: bool,
}

impl Default for PosterConfig {
    fn default() -> Self {
        Self {
            width: 3840,
            height: 2160,
            count: 200,
            scale_range: default_scale_range(),
            rotation_range: default_rotation_range(),
            jitter_range: default_jitter_range(),
            scale_bands: default_scale_bands(),
            min_area_ratio: default_min_area_ratio(),
            background: default_background(),
            dpi: default_dpi(),
            seed: None,
            max_attempts_per_sticker: default_max_attempts(),
            candidate_pool: default_candidate_pool(),
            attempt_ceiling_factor: default_attempt_ceiling_factor(),
            spacing: 0,
            scoring: default_scoring(),
            allow_repeats: false,
            grid_cell: default_grid_cell(),
            outlines: false,
        }
    }
}

impl PosterConfig {
    /// Validates the configuration parameters.
    ///
    /// Returns an error if:
    /// - Canvas dimensions are zero
    /// - A range has `min > max` or a non-positive scale
    /// - The scale table is empty or its bounds are not increasing
    /// - Search limits are zero
    pub fn validate(&self) -> crate::error::Result<()> {
        use crate::error::PosterError;

        if self.width == 0 || self.height == 0 {
            return Err(PosterError::InvalidDimensions {
                width: self.width,
                height: self.height,
            });
        }

        check_range("scale_range", self.scale_range)?;
        check_range("jitter_range", self.jitter_range)?;
        check_range("rotation_range", self.rotation_range)?;
        if self.scale_range.0 <= 0.0 || self.jitter_range.0 <= 0.0 {
            return Err(PosterError::InvalidConfig(
                "scale_range and jitter_range must be positive".into(),
            ));
        }

        if !(0.0..1.0).contains(&self.min_area_ratio) {
            return Err(PosterError::InvalidConfig(format!(
                "min_area_ratio ({}) must be in [0, 1)",
                self.min_area_ratio
            )));
        }

        if self.scale_bands.is_empty() {
            return Err(PosterError::InvalidConfig("scale_bands is empty".into()));
        }
        let mut prev = 0u64;
        for (i, band) in self.scale_bands.iter().enumerate() {
            check_range("scale_bands", (band.min_scale, band.max_scale))?;
            if band.min_scale <= 0.0 {
                return Err(PosterError::InvalidConfig(format!(
                    "scale_bands[{i}] has a non-positive scale"
                )));
            }
            match band.max_area {
                Some(a) if a <= prev => {
                    return Err(PosterError::InvalidConfig(format!(
                        "scale_bands[{i}].max_area ({a}) must be greater than {prev}"
                    )));
                }
                Some(a) => prev = a,
                None if i + 1 != self.scale_bands.len() => {
                    return Err(PosterError::InvalidConfig(format!(
                        "scale_bands[{i}] is unbounded but not last"
                    )));
                }
                None => {}
            }
        }

        if self.max_attempts_per_sticker == 0 || self.candidate_pool == 0 {
            return Err(PosterError::InvalidConfig(
                "max_attempts_per_sticker and candidate_pool must be at least 1".into(),
            ));
        }
        if self.attempt_ceiling_factor == 0 {
            return Err(PosterError::InvalidConfig(
                "attempt_ceiling_factor must be at least 1".into(),
            ));
        }
        if self.grid_cell == 0 {
            return Err(PosterError::InvalidConfig("grid_cell must be at least 1".into()));
        }

        Ok(())
    }

    pub fn canvas_area(&self) -> u64 {
        (self.width as u64) * (self.height as u64)
    }

    /// Smallest scaled area a sticker may have, in pixels.
    pub fn min_sticker_area(&self) -> f64 {
        self.canvas_area() as f64 * self.min_area_ratio
    }

    /// Upper bound on sticker attempts for one run.
    pub fn attempt_ceiling(&self) -> usize {
        self.count
            .saturating_mul(self.attempt_ceiling_factor as usize)
    }
}

fn check_range(name: &str, (lo, hi): (f32, f32)) -> crate::error::Result<()> {
    if !lo.is_finite() || !hi.is_finite() || lo > hi {
        return Err(crate::error::PosterError::InvalidConfig(format!(
            "{name} ({lo}, {hi}) must be finite with min <= max"
        )));
    }
    Ok(())
}

fn default_scale_range() -> (f32, f32) {
    (0.1, 1.5)
}
fn default_rotation_range() -> (f32, f32) {
    (-30.0, 30.0)
}
fn default_jitter_range() -> (f32, f32) {
    (0.85, 1.15)
}
fn default_min_area_ratio() -> f64 {
    0.0005
}
fn default_background() -> [u8; 3] {
    [255, 255, 255]
}
fn default_dpi() -> u32 {
    300
}
fn default_max_attempts() -> u32 {
    500
}
fn default_candidate_pool() -> usize {
    10
}
fn default_attempt_ceiling_factor() -> u32 {
    10
}
fn default_scoring() -> Scoring {
    Scoring::Centroid
}
fn default_grid_cell() -> u32 {
    128
}

/// Builder for `PosterConfig` for ergonomic construction.
#[derive(Debug, Default, Clone)]
pub struct PosterConfigBuilder {
    cfg: PosterConfig,
}

impl PosterConfigBuilder {
    pub fn new() -> Self {
        Self {
            cfg: PosterConfig::default(),
        }
    }
    pub fn with_canvas(mut self, w: u32, h: u32) -> Self {
        self.cfg.width = w;
        self.cfg.height = h;
        self
    }
    pub fn count(mut self, v: usize) -> Self {
        self.cfg.count = v;
        self
    }
    pub fn scale_range(mut self, min: f32, max: f32) -> Self {
        self.cfg.scale_range = (min, max);
        self
    }
    pub fn rotation_range(mut self, min: f32, max: f32) -> Self {
        self.cfg.rotation_range = (min, max);
        self
    }
    /// Symmetric rotation range `(-deg, deg)`.
    pub fn max_rotation(self, deg: f32) -> Self {
        let d = deg.abs();
        self.rotation_range(-d, d)
    }
    pub fn jitter_range(mut self, min: f32, max: f32) -> Self {
        self.cfg.jitter_range = (min, max);
        self
    }
    pub fn scale_bands(mut self, v: Vec<ScaleBand>) -> Self {
        self.cfg.scale_bands = v;
        self
    }
    pub fn min_area_ratio(mut self, v: f64) -> Self {
        self.cfg.min_area_ratio = v;
        self
    }
    pub fn background(mut self, v: [u8; 3]) -> Self {
        self.cfg.background = v;
        self
    }
    pub fn dpi(mut self, v: u32) -> Self {
        self.cfg.dpi = v;
        self
    }
    pub fn seed(mut self, v: Option<u64>) -> Self {
        self.cfg.seed = v;
        self
    }
    pub fn max_attempts_per_sticker(mut self, v: u32) -> Self {
        self.cfg.max_attempts_per_sticker = v;
        self
    }
    pub fn candidate_pool(mut self, v: usize) -> Self {
        self.cfg.candidate_pool = v;
        self
    }
    pub fn attempt_ceiling_factor(mut self, v: u32) -> Self {
        self.cfg.attempt_ceiling_factor = v;
        self
    }
    pub fn spacing(mut self, v: u32) -> Self {
        self.cfg.spacing = v;
        self
    }
    pub fn scoring(mut self, v: Scoring) -> Self {
        self.cfg.scoring = v;
        self
    }
    pub fn allow_repeats(mut self, v: bool) -> Self {
        self.cfg.allow_repeats = v;
        self
    }
    pub fn grid_cell(mut self, v: u32) -> Self {
        self.cfg.grid_cell = v;
        self
    }
    pub fn outlines(mut self, v: bool) -> Self {
        self.cfg.outlines = v;
        self
    }
    pub fn build(self) -> PosterConfig {
        self.cfg
    }
}

impl PosterConfig {
    /// Create a fluent builder for `PosterConfig`.
    pub fn builder() -> PosterConfigBuilder {
        PosterConfigBuilder::new()
    }
}
