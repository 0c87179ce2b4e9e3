//! Sticker set statistics and poster size recommendations.

use crate::model::StickerAsset;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Centimetres per inch.
const CM_PER_INCH: f64 = 2.54;

/// Aspect ratios offered by `recommend_sizes`.
pub const ASPECT_RATIOS: [(f64, &str); 5] = [
    (1.0, "Square"),
    (1.414, "ISO A series (sqrt 2)"),
    (1.5, "Photo 3:2"),
    (1.618, "Golden ratio"),
    (2.0, "Double square"),
];

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StickerReport {
    /// Readable stickers.
    pub count: usize,
    pub unreadable: usize,
    pub categories: usize,
    pub total_area: u64,
    pub mean_area: f64,
    pub median_area: f64,
    pub min_area: u64,
    pub max_area: u64,
    pub mean_width: f64,
    pub mean_height: f64,
    pub per_category_mean: f64,
    pub per_category_min: usize,
    pub per_category_max: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PosterSizeOption {
    pub name: String,
    pub ratio: f64,
    pub width_in: f64,
    pub height_in: f64,
    pub width_cm: f64,
    pub height_cm: f64,
    pub width_px: u32,
    pub height_px: u32,
    pub total_px: u64,
    pub avg_px_per_sticker: f64,
    /// Linear scale that brings the mean sticker to `avg_px_per_sticker`.
    pub suggested_scale: f64,
}

/// Summarizes readable stickers. Returns `None` when there are none.
pub fn analyze(stickers: &[StickerAsset]) -> Option<StickerReport> {
    let readable: Vec<(u32, u32)> = stickers.iter().filter_map(|s| s.dimensions).collect();
    if readable.is_empty() {
        return None;
    }
    let n = readable.len();
    let mut areas: Vec<u64> = readable
        .iter()
        .map(|&(w, h)| (w as u64) * (h as u64))
        .collect();
    areas.sort_unstable();
    let total_area: u64 = areas.iter().sum();
    let median_area = if n % 2 == 1 {
        areas[n / 2] as f64
    } else {
        (areas[n / 2 - 1] + areas[n / 2]) as f64 / 2.0
    };

    let mut per_category: BTreeMap<&str, usize> = BTreeMap::new();
    for s in stickers.iter().filter(|s| s.is_readable()) {
        *per_category.entry(s.category.as_str()).or_default() += 1;
    }
    let categories = per_category.len();

    Some(StickerReport {
        count: n,
        unreadable: stickers.len() - n,
        categories,
        total_area,
        mean_area: total_area as f64 / n as f64,
        median_area,
        min_area: areas[0],
        max_area: areas[n - 1],
        mean_width: readable.iter().map(|&(w, _)| w as f64).sum::<f64>() / n as f64,
        mean_height: readable.iter().map(|&(_, h)| h as f64).sum::<f64>() / n as f64,
        per_category_mean: n as f64 / categories as f64,
        per_category_min: per_category.values().copied().min().unwrap_or(0),
        per_category_max: per_category.values().copied().max().unwrap_or(0),
    })
}

/// Poster sizes that give every sticker at least `min_area_cm2` at `dpi`,
/// assuming only `packing_efficiency` of the poster ends up covered.
pub fn recommend_sizes(
    report: &StickerReport,
    min_area_cm2: f64,
    dpi: u32,
    packing_efficiency: f64,
) -> Vec<PosterSizeOption> {
    let required_in2 =
        report.count as f64 * min_area_cm2 / (CM_PER_INCH * CM_PER_INCH) / packing_efficiency;
    ASPECT_RATIOS
        .iter()
        .map(|&(ratio, name)| {
            let height_in = (required_in2 / ratio).sqrt();
            let width_in = height_in * ratio;
            let width_px = (width_in * dpi as f64) as u32;
            let height_px = (height_in * dpi as f64) as u32;
            let total_px = (width_px as u64) * (height_px as u64);
            let avg_px_per_sticker = total_px as f64 * packing_efficiency / report.count as f64;
            let suggested_scale = if report.mean_area > 0.0 {
                (avg_px_per_sticker / report.mean_area).sqrt()
            } else {
                0.0
            };
            PosterSizeOption {
                name: name.to_string(),
                ratio,
                width_in,
                height_in,
                width_cm: width_in * CM_PER_INCH,
                height_cm: height_in * CM_PER_INCH,
                width_px,
                height_px,
                total_px,
                avg_px_per_sticker,
                suggested_scale,
            }
        })
        .collect()
}

/// Plain-text report in the same shape as the CLI output.
pub fn render_report(
    report: &StickerReport,
    options: &[PosterSizeOption],
    min_area_cm2: f64,
    dpi: u32,
) -> String {
    let mut s = String::new();
    s.push_str("Sticker Analysis Results\n");
    s.push_str("========================\n\n");
    s.push_str(&format!("Total stickers: {}\n", report.count));
    s.push_str(&format!("Categories: {}\n", report.categories));
    s.push_str(&format!("Minimum area per sticker: {min_area_cm2} cm²\n"));
    s.push_str(&format!("DPI: {dpi}\n\n"));
    s.push_str("Recommended poster sizes:\n");
    for o in options {
        s.push_str(&format!("\n{}:\n", o.name));
        s.push_str(&format!(
            "  Dimensions: {:.1} x {:.1} cm\n",
            o.width_cm, o.height_cm
        ));
        s.push_str(&format!("  Pixels: {} x {}\n", o.width_px, o.height_px));
        s.push_str(&format!(
            "  Average area per sticker: {:.0} px²\n",
            o.avg_px_per_sticker
        ));
        s.push_str(&format!("  Suggested scale: {:.2}x\n", o.suggested_scale));
    }
    s
}
