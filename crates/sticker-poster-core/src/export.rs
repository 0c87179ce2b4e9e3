use crate::error::Result;
use crate::model::{Layout, PosterStats};
use image::RgbImage;
use serde_json::{Value, json};
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::Path;

/// Serialize a `Layout` as `{ canvas, placements, meta }`.
pub fn to_json(layout: &Layout) -> Value {
    let placements: Vec<Value> = layout
        .placements
        .iter()
        .map(|p| {
            let r = &p.region;
            json!({
                "key": p.key,
                "category": p.category,
                "region": {"x1": r.x1, "y1": r.y1, "x2": r.x2, "y2": r.y2},
                "frame": {"x": r.x1, "y": r.y1, "w": r.width(), "h": r.height()},
                "scale": p.scale,
                "rotation": p.rotation,
            })
        })
        .collect();
    json!({
        "canvas": {"w": layout.width, "h": layout.height},
        "placements": placements,
        "meta": &layout.meta,
    })
}

/// Stats sidecar, including the derived success rate.
pub fn stats_json(stats: &PosterStats) -> Value {
    json!({
        "placed": stats.placed,
        "requested": stats.requested,
        "skipped_no_fit": stats.skipped_no_fit,
        "skipped_unreadable": stats.skipped_unreadable,
        "attempts": stats.attempts,
        "canvas_area": stats.canvas_area,
        "covered_area": stats.covered_area,
        "coverage": stats.coverage,
        "success_rate": stats.success_rate(),
    })
}

/// Pixels per metre for a DPI value, as stored in the PNG `pHYs` chunk.
pub fn dpi_to_ppm(dpi: u32) -> u32 {
    (dpi as f64 / 0.0254).round() as u32
}

/// Writes an RGB PNG carrying `dpi` as physical pixel dimensions.
pub fn save_png_with_dpi(image: &RgbImage, path: &Path, dpi: u32) -> Result<()> {
    ensure_parent(path)?;
    let file = File::create(path)?;
    let (w, h) = image.dimensions();
    let mut encoder = png::Encoder::new(BufWriter::new(file), w, h);
    encoder.set_color(png::ColorType::Rgb);
    encoder.set_depth(png::BitDepth::Eight);
    if dpi > 0 {
        let ppm = dpi_to_ppm(dpi);
        encoder.set_pixel_dims(Some(png::PixelDimensions {
            xppu: ppm,
            yppu: ppm,
            unit: png::Unit::Meter,
        }));
    }
    let mut writer = encoder.write_header()?;
    writer.write_image_data(image.as_raw())?;
    writer.finish()?;
    Ok(())
}

/// Saves the poster; PNG keeps DPI metadata, other formats go through `image`.
pub fn save_poster(image: &RgbImage, path: &Path, dpi: u32) -> Result<()> {
    let is_png = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("png"));
    if is_png {
        return save_png_with_dpi(image, path, dpi);
    }
    ensure_parent(path)?;
    image.save(path)?;
    Ok(())
}

fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}
