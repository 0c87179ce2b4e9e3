use image::imageops::{self, FilterType};
use image::{Rgba, RgbaImage};

/// Resizes to exactly `w x h` with a Lanczos3 filter.
pub fn resize(src: &RgbaImage, w: u32, h: u32) -> RgbaImage {
    if src.dimensions() == (w, h) {
        return src.clone();
    }
    imageops::resize(src, w.max(1), h.max(1), FilterType::Lanczos3)
}

/// Bounding size of a `w x h` image rotated by `degrees`.
pub fn rotated_extent(w: u32, h: u32, degrees: f32) -> (u32, u32) {
    let theta = (degrees as f64).to_radians();
    let (sin, cos) = (theta.sin().abs(), theta.cos().abs());
    let (w, h) = (w as f64, h as f64);
    // shave float noise so axis-aligned angles keep their exact size
    let nw = (w * cos + h * sin - 1e-6).ceil().max(1.0) as u32;
    let nh = (w * sin + h * cos - 1e-6).ceil().max(1.0) as u32;
    (nw, nh)
}

/// Rotates counter-clockwise by `degrees`, expanding the canvas to fit the
/// whole result. Uncovered pixels are transparent; sampling is bilinear on
/// premultiplied color so edges do not pick up dark fringes.
pub fn rotate_expand(src: &RgbaImage, degrees: f32) -> RgbaImage {
    let (w, h) = src.dimensions();
    if degrees.rem_euclid(360.0).abs() < 1e-4 || w == 0 || h == 0 {
        return src.clone();
    }
    let (nw, nh) = rotated_extent(w, h, degrees);
    let theta = (degrees as f64).to_radians();
    let (sin, cos) = theta.sin_cos();
    let (scx, scy) = (w as f64 / 2.0, h as f64 / 2.0);
    let (dcx, dcy) = (nw as f64 / 2.0, nh as f64 / 2.0);

    let mut out = RgbaImage::from_pixel(nw, nh, Rgba([0, 0, 0, 0]));
    for y in 0..nh {
        for x in 0..nw {
            let dx = x as f64 + 0.5 - dcx;
            let dy = y as f64 + 0.5 - dcy;
            // inverse mapping: rotate the destination offset clockwise
            let sx = dx * cos - dy * sin + scx - 0.5;
            let sy = dx * sin + dy * cos + scy - 0.5;
            if let Some(px) = sample_bilinear(src, sx, sy) {
                out.put_pixel(x, y, px);
            }
        }
    }
    out
}

fn sample_bilinear(src: &RgbaImage, sx: f64, sy: f64) -> Option<Rgba<u8>> {
    let (w, h) = src.dimensions();
    if sx <= -1.0 || sy <= -1.0 || sx >= w as f64 || sy >= h as f64 {
        return None;
    }
    let x0 = sx.floor();
    let y0 = sy.floor();
    let fx = sx - x0;
    let fy = sy - y0;
    let mut acc = [0.0f64; 4];
    for (ox, oy, wgt) in [
        (0.0, 0.0, (1.0 - fx) * (1.0 - fy)),
        (1.0, 0.0, fx * (1.0 - fy)),
        (0.0, 1.0, (1.0 - fx) * fy),
        (1.0, 1.0, fx * fy),
    ] {
        let px = x0 + ox;
        let py = y0 + oy;
        if wgt <= 0.0 || px < 0.0 || py < 0.0 || px >= w as f64 || py >= h as f64 {
            continue;
        }
        let p = src.get_pixel(px as u32, py as u32).0;
        let a = p[3] as f64 / 255.0;
        acc[0] += p[0] as f64 * a * wgt;
        acc[1] += p[1] as f64 * a * wgt;
        acc[2] += p[2] as f64 * a * wgt;
        acc[3] += a * wgt;
    }
    if acc[3] <= 0.0 {
        return None;
    }
    let a = acc[3];
    Some(Rgba([
        (acc[0] / a).round().clamp(0.0, 255.0) as u8,
        (acc[1] / a).round().clamp(0.0, 255.0) as u8,
        (acc[2] / a).round().clamp(0.0, 255.0) as u8,
        (a * 255.0).round().clamp(0.0, 255.0) as u8,
    ]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extent_of_axis_aligned_angles() {
        assert_eq!(rotated_extent(40, 10, 0.0), (40, 10));
        assert_eq!(rotated_extent(40, 10, 90.0), (10, 40));
        assert_eq!(rotated_extent(40, 10, -180.0), (40, 10));
    }

    #[test]
    fn extent_grows_for_diagonal() {
        let (w, h) = rotated_extent(10, 10, 45.0);
        assert_eq!((w, h), (15, 15));
    }

    #[test]
    fn rotate_expand_matches_extent_and_keeps_content() {
        let src = RgbaImage::from_pixel(20, 8, Rgba([200, 10, 10, 255]));
        let out = rotate_expand(&src, 30.0);
        assert_eq!(out.dimensions(), rotated_extent(20, 8, 30.0));
        let (w, h) = out.dimensions();
        assert_eq!(out.get_pixel(w / 2, h / 2).0, [200, 10, 10, 255]);
        // corners of the expanded box are outside the rotated rectangle
        assert_eq!(out.get_pixel(0, 0).0[3], 0);
    }

    #[test]
    fn zero_rotation_is_copy() {
        let src = RgbaImage::from_pixel(3, 5, Rgba([1, 2, 3, 4]));
        assert_eq!(rotate_expand(&src, 0.0), src);
    }
}
