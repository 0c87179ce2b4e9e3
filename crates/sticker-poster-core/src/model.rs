use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Area assumed for stickers whose header could not be read.
pub const FALLBACK_AREA: u64 = 20_000;

/// A sticker image discovered on disk. Immutable once loaded.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StickerAsset {
    pub path: PathBuf,
    /// Name of the category subdirectory the sticker came from.
    pub category: String,
    /// Natural pixel size, `None` when the file could not be read.
    pub dimensions: Option<(u32, u32)>,
    /// Natural pixel area (`FALLBACK_AREA` for unreadable files).
    pub area: u64,
}

impl StickerAsset {
    pub fn new(path: PathBuf, category: impl Into<String>, dimensions: Option<(u32, u32)>) -> Self {
        let area = match dimensions {
            Some((w, h)) => (w as u64) * (h as u64),
            None => FALLBACK_AREA,
        };
        Self {
            path,
            category: category.into(),
            dimensions,
            area,
        }
    }

    pub fn width(&self) -> Option<u32> {
        self.dimensions.map(|(w, _)| w)
    }

    pub fn height(&self) -> Option<u32> {
        self.dimensions.map(|(_, h)| h)
    }

    pub fn is_readable(&self) -> bool {
        self.dimensions.is_some()
    }

    /// Path with `/` separators, used as a stable key in exports.
    pub fn key(&self) -> String {
        self.path.to_string_lossy().replace('\\', "/")
    }
}

/// Committed bounding box of a placed sticker, in canvas pixels.
/// Half-open: `x2`/`y2` are exclusive, so touching boxes do not overlap.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct PlacementRegion {
    pub x1: u32,
    pub y1: u32,
    pub x2: u32,
    pub y2: u32,
}

impl PlacementRegion {
    pub fn new(x1: u32, y1: u32, x2: u32, y2: u32) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// Region with top-left `(x, y)` and size `w x h`.
    pub fn from_xywh(x: u32, y: u32, w: u32, h: u32) -> Self {
        Self::new(x, y, x + w, y + h)
    }

    pub fn width(&self) -> u32 {
        self.x2.saturating_sub(self.x1)
    }

    pub fn height(&self) -> u32 {
        self.y2.saturating_sub(self.y1)
    }

    pub fn area(&self) -> u64 {
        (self.width() as u64) * (self.height() as u64)
    }

    pub fn center(&self) -> (f64, f64) {
        (
            (self.x1 as f64 + self.x2 as f64) / 2.0,
            (self.y1 as f64 + self.y2 as f64) / 2.0,
        )
    }

    /// True if the regions share any pixel once `self` is grown by `spacing` on every side.
    pub fn intersects(&self, other: &PlacementRegion, spacing: u32) -> bool {
        let x1 = self.x1.saturating_sub(spacing);
        let y1 = self.y1.saturating_sub(spacing);
        let x2 = self.x2.saturating_add(spacing);
        let y2 = self.y2.saturating_add(spacing);
        x1 < other.x2 && other.x1 < x2 && y1 < other.y2 && other.y1 < y2
    }

    /// True if `self` lies fully inside a `width x height` canvas.
    pub fn within(&self, width: u32, height: u32) -> bool {
        self.x1 <= self.x2 && self.y1 <= self.y2 && self.x2 <= width && self.y2 <= height
    }
}

/// One sticker committed to the canvas.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlacedSticker {
    pub key: String,
    pub category: String,
    pub region: PlacementRegion,
    /// Final scale factor applied to the natural size (after the area floor).
    pub scale: f32,
    /// Rotation in degrees, counter-clockwise.
    pub rotation: f32,
}

/// Poster-level metadata carried in exports.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Meta {
    /// Schema version of the JSON layout; bump on incompatible changes.
    pub schema_version: String,
    pub app: String,
    pub version: String,
    pub requested: usize,
    pub seed: Option<u64>,
    pub background: [u8; 3],
    pub dpi: u32,
}

/// Canvas size plus every committed placement, in placement order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Layout {
    pub width: u32,
    pub height: u32,
    pub placements: Vec<PlacedSticker>,
    pub meta: Meta,
}

impl Layout {
    pub fn regions(&self) -> impl Iterator<Item = &PlacementRegion> {
        self.placements.iter().map(|p| &p.region)
    }

    pub fn covered_area(&self) -> u64 {
        self.regions().map(|r| r.area()).sum()
    }
}

/// Statistics about one packing run.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct PosterStats {
    pub placed: usize,
    pub requested: usize,
    /// Stickers for which no non-overlapping position was found.
    pub skipped_no_fit: usize,
    /// Stickers that failed to decode.
    pub skipped_unreadable: usize,
    /// Sticker attempts consumed against the attempt ceiling.
    pub attempts: usize,
    pub canvas_area: u64,
    /// Sum of the bounding-box areas of placed stickers.
    pub covered_area: u64,
    /// `covered_area / canvas_area` (0.0 to 1.0).
    pub coverage: f64,
}

impl PosterStats {
    /// Placed / requested as a percentage; 0 when nothing was requested.
    pub fn success_rate(&self) -> f64 {
        if self.requested > 0 {
            self.placed as f64 / self.requested as f64 * 100.0
        } else {
            0.0
        }
    }

    pub fn summary(&self) -> String {
        format!(
            "Placed: {}/{} ({:.1}%), Skipped: {} no fit, {} unreadable, Attempts: {}, Coverage: {:.2}%",
            self.placed,
            self.requested,
            self.success_rate(),
            self.skipped_no_fit,
            self.skipped_unreadable,
            self.attempts,
            self.coverage * 100.0,
        )
    }
}
