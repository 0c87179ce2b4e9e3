use crate::model::PlacementRegion;
use image::{Rgb, RgbImage, Rgba, RgbaImage};

/// Alpha-blend `src` over `canvas` with its top-left at (dx, dy).
///
/// Source pixels outside the canvas are dropped. Uses straight (non
/// premultiplied) "over": `out = src * a + dst * (1 - a)`.
pub fn blend_over(canvas: &mut RgbaImage, src: &RgbaImage, dx: u32, dy: u32) {
    let (cw, ch) = canvas.dimensions();
    let (sw, sh) = src.dimensions();
    for yy in 0..sh {
        let ty = dy + yy;
        if ty >= ch {
            break;
        }
        for xx in 0..sw {
            let tx = dx + xx;
            if tx >= cw {
                break;
            }
            let s = src.get_pixel(xx, yy).0;
            match s[3] {
                0 => {}
                255 => canvas.put_pixel(tx, ty, Rgba(s)),
                sa => {
                    let d = canvas.get_pixel(tx, ty).0;
                    canvas.put_pixel(tx, ty, Rgba(over(s, d, sa)));
                }
            }
        }
    }
}

fn over(s: [u8; 4], d: [u8; 4], sa: u8) -> [u8; 4] {
    let a = sa as f32 / 255.0;
    let da = d[3] as f32 / 255.0;
    let out_a = a + da * (1.0 - a);
    if out_a <= 0.0 {
        return [0, 0, 0, 0];
    }
    let mut out = [0u8; 4];
    for c in 0..3 {
        let v = (s[c] as f32 * a + d[c] as f32 * da * (1.0 - a)) / out_a;
        out[c] = v.round().clamp(0.0, 255.0) as u8;
    }
    out[3] = (out_a * 255.0).round().clamp(0.0, 255.0) as u8;
    out
}

/// Draws a 1px outline on the edges of `region` (debug aid).
pub fn outline_region(canvas: &mut RgbaImage, region: &PlacementRegion, color: Rgba<u8>) {
    let (cw, ch) = canvas.dimensions();
    if region.x2 <= region.x1 || region.y2 <= region.y1 {
        return;
    }
    let right = region.x2 - 1;
    let bottom = region.y2 - 1;
    for x in region.x1..region.x2.min(cw) {
        if region.y1 < ch {
            canvas.put_pixel(x, region.y1, color);
        }
        if bottom < ch {
            canvas.put_pixel(x, bottom, color);
        }
    }
    for y in region.y1..region.y2.min(ch) {
        if region.x1 < cw {
            canvas.put_pixel(region.x1, y, color);
        }
        if right < cw {
            canvas.put_pixel(right, y, color);
        }
    }
}

/// Flattens an RGBA canvas onto an opaque `background`, dropping alpha.
pub fn flatten(canvas: &RgbaImage, background: [u8; 3]) -> RgbImage {
    let (w, h) = canvas.dimensions();
    let bg = [background[0], background[1], background[2], 255];
    RgbImage::from_fn(w, h, |x, y| {
        let p = canvas.get_pixel(x, y).0;
        let o = match p[3] {
            255 => p,
            a => over(p, bg, a),
        };
        Rgb([o[0], o[1], o[2]])
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blend_respects_alpha() {
        let mut canvas = RgbaImage::from_pixel(4, 4, Rgba([255, 255, 255, 255]));
        let mut src = RgbaImage::from_pixel(2, 2, Rgba([0, 0, 0, 0]));
        src.put_pixel(0, 0, Rgba([0, 0, 0, 255]));
        src.put_pixel(1, 0, Rgba([0, 0, 0, 128]));
        blend_over(&mut canvas, &src, 1, 1);
        assert_eq!(canvas.get_pixel(1, 1).0, [0, 0, 0, 255]);
        assert_eq!(canvas.get_pixel(2, 1).0, [127, 127, 127, 255]);
        assert_eq!(canvas.get_pixel(1, 2).0, [255, 255, 255, 255]);
    }

    #[test]
    fn blend_clips_at_canvas_edge() {
        let mut canvas = RgbaImage::from_pixel(3, 3, Rgba([0, 0, 0, 255]));
        let src = RgbaImage::from_pixel(4, 4, Rgba([9, 9, 9, 255]));
        blend_over(&mut canvas, &src, 2, 2);
        assert_eq!(canvas.get_pixel(2, 2).0, [9, 9, 9, 255]);
        assert_eq!(canvas.get_pixel(1, 1).0, [0, 0, 0, 255]);
    }

    #[test]
    fn flatten_uses_background_for_transparency() {
        let canvas = RgbaImage::from_pixel(1, 1, Rgba([0, 0, 0, 0]));
        let rgb = flatten(&canvas, [10, 20, 30]);
        assert_eq!(rgb.get_pixel(0, 0).0, [10, 20, 30]);
    }
}
