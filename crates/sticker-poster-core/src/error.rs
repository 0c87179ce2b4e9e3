use std::path::PathBuf;
use thiserror::Error;

use crate::model::PlacementRegion;

#[derive(Debug, Error)]
pub enum PosterError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
    #[error("Invalid canvas dimensions: {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("Sticker directory not found: {}", .0.display())]
    MissingDirectory(PathBuf),
    #[error("Region {region:?} overlaps committed region #{existing}")]
    RegionConflict {
        region: PlacementRegion,
        existing: usize,
    },
    #[error("Region {region:?} lies outside the {width}x{height} canvas")]
    OutOfBounds {
        region: PlacementRegion,
        width: u32,
        height: u32,
    },
    #[error("Encoding error: {0}")]
    Encode(String),
}

impl From<png::EncodingError> for PosterError {
    fn from(e: png::EncodingError) -> Self {
        Self::Encode(e.to_string())
    }
}

impl From<globset::Error> for PosterError {
    fn from(e: globset::Error) -> Self {
        Self::InvalidConfig(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, PosterError>;
