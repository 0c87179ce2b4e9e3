//! Core library for composing sticker posters.
//!
//! - Loader: scans `root/<category>/<image>` into `StickerAsset` descriptors
//! - Packer: random non-overlapping placement with adaptive scaling, rotation and
//!   a bias toward already-placed stickers; bounded by per-sticker and global attempt limits
//! - Output: flattened RGB poster, serde-serializable layout and stats, PNG with DPI
//!
//! Quick example:
//! ```ignore
//! use sticker_poster_core::prelude::*;
//! # fn main() -> anyhow::Result<()> {
//! let stickers = load(std::path::Path::new("stickers"))?;
//! let cfg = PosterConfig::builder().with_canvas(1920, 1080).count(80).seed(Some(7)).build();
//! let out = compose(&stickers, cfg)?;
//! println!("placed {}/{}", out.placed_count(), out.requested_count());
//! save_poster(&out.image, std::path::Path::new("poster.png"), 300)?;
//! # Ok(()) }
//! ```

pub mod analysis;
pub mod compositing;
pub mod config;
pub mod error;
pub mod export;
pub mod loader;
pub mod model;
pub mod occupancy;
pub mod pipeline;
pub mod placement;
pub mod scaling;
pub mod transform;

pub use config::*;
pub use error::*;
pub use export::*;
pub use loader::*;
pub use model::*;
pub use pipeline::*;

/// Convenience prelude for common types and functions.
/// Importing `sticker_poster_core::prelude::*` brings the primary APIs into scope.
pub mod prelude {
    pub use crate::analysis::{PosterSizeOption, StickerReport, analyze, recommend_sizes};
    pub use crate::config::{PosterConfig, PosterConfigBuilder, ScaleBand, Scoring};
    pub use crate::loader::{LoadOptions, load, load_with};
    pub use crate::model::{Layout, PlacedSticker, PlacementRegion, PosterStats, StickerAsset};
    pub use crate::occupancy::OccupancyIndex;
    pub use crate::pipeline::{
        PlacementEvent, PlacementResult, SkipReason, StickerPacker, compose, compose_variants,
    };
    pub use crate::{save_poster, stats_json, to_json};
}
