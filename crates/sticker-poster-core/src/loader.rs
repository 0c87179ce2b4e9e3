use crate::error::{PosterError, Result};
use crate::model::StickerAsset;
use globset::{Glob, GlobSet, GlobSetBuilder};
use std::path::Path;
use tracing::{debug, instrument, warn};
use walkdir::WalkDir;

/// File filters applied while scanning a sticker tree.
#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    /// If non-empty, only files matching one of these globs are loaded.
    pub include: Vec<String>,
    /// Files matching any of these globs are ignored.
    pub exclude: Vec<String>,
}

/// Scans `root/<category>/<image>` and returns one descriptor per image file.
///
/// Categories and files are visited in file-name order. Files that cannot be
/// read are kept with `FALLBACK_AREA` and no dimensions.
pub fn load(root: &Path) -> Result<Vec<StickerAsset>> {
    load_with(root, &LoadOptions::default())
}

#[instrument(skip(opts), fields(root = %root.display()))]
pub fn load_with(root: &Path, opts: &LoadOptions) -> Result<Vec<StickerAsset>> {
    if !root.is_dir() {
        return Err(PosterError::MissingDirectory(root.to_path_buf()));
    }
    let include = build_globset(&opts.include)?;
    let exclude = build_globset(&opts.exclude)?;

    let mut stickers = Vec::new();
    let walker = WalkDir::new(root)
        .min_depth(2)
        .max_depth(2)
        .sort_by_file_name();
    for entry in walker {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                warn!(error = %e, "skip unreadable entry");
                continue;
            }
        };
        let p = entry.path();
        if !entry.file_type().is_file()
            || !is_image(p)
            || should_skip(p, include.as_ref(), exclude.as_ref())
        {
            continue;
        }
        let category = p
            .parent()
            .and_then(|d| d.file_name())
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let dimensions = match image::image_dimensions(p) {
            Ok(dims) => Some(dims),
            Err(e) => {
                warn!(path = ?p, error = %e, "unreadable sticker, using fallback area");
                None
            }
        };
        stickers.push(StickerAsset::new(p.to_path_buf(), category, dimensions));
    }

    debug!(count = stickers.len(), categories = category_count(&stickers), "stickers loaded");
    Ok(stickers)
}

/// Number of distinct categories in an ordered sticker list.
pub fn category_count(stickers: &[StickerAsset]) -> usize {
    let mut names: Vec<&str> = stickers.iter().map(|s| s.category.as_str()).collect();
    names.sort_unstable();
    names.dedup();
    names.len()
}

fn build_globset(patterns: &[String]) -> Result<Option<GlobSet>> {
    if patterns.is_empty() {
        return Ok(None);
    }
    let mut b = GlobSetBuilder::new();
    for pat in patterns {
        b.add(Glob::new(pat)?);
    }
    Ok(Some(b.build()?))
}

fn should_skip(p: &Path, include: Option<&GlobSet>, exclude: Option<&GlobSet>) -> bool {
    let s = p.to_string_lossy().replace('\\', "/");
    if let Some(ex) = exclude {
        if ex.is_match(&s) {
            return true;
        }
    }
    if let Some(inc) = include {
        if !inc.is_match(&s) {
            return true;
        }
    }
    false
}

pub fn is_image(p: &Path) -> bool {
    matches!(
        p.extension()
            .and_then(|e| e.to_str())
            .map(|s| s.to_ascii_lowercase()),
        Some(ext) if matches!(ext.as_str(), "png" | "jpg" | "jpeg" | "bmp" | "tga" | "gif" | "webp")
    )
}
