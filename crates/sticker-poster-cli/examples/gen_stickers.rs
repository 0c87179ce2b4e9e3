use image::{Rgba, RgbaImage};
use rand::{Rng, SeedableRng};
use std::fs;
use std::path::Path;

fn random_rgb(rng: &mut impl Rng) -> [u8; 3] {
    [rng.r#gen(), rng.r#gen(), rng.r#gen()]
}

fn draw_ellipse(img: &mut RgbaImage, rgb: [u8; 3], soft: bool) {
    let (w, h) = img.dimensions();
    let (rx, ry) = (w as f32 / 2.0, h as f32 / 2.0);
    for y in 0..h {
        for x in 0..w {
            let dx = (x as f32 + 0.5 - rx) / rx;
            let dy = (y as f32 + 0.5 - ry) / ry;
            let d = (dx * dx + dy * dy).sqrt();
            if d <= 1.0 {
                // soft edge fades over the outer 20%
                let a = if soft {
                    (((1.0 - d) / 0.2).clamp(0.0, 1.0) * 255.0) as u8
                } else {
                    255
                };
                img.put_pixel(x, y, Rgba([rgb[0], rgb[1], rgb[2], a]));
            }
        }
    }
}

fn draw_star(img: &mut RgbaImage, rgb: [u8; 3]) {
    let (w, h) = img.dimensions();
    let (cx, cy) = (w as f32 / 2.0, h as f32 / 2.0);
    let r = cx.min(cy);
    for y in 0..h {
        for x in 0..w {
            let dx = x as f32 + 0.5 - cx;
            let dy = y as f32 + 0.5 - cy;
            let angle = dy.atan2(dx);
            // five points: radius oscillates between 0.45r and r
            let edge = r * (0.725 + 0.275 * (5.0 * angle).cos());
            if (dx * dx + dy * dy).sqrt() <= edge {
                img.put_pixel(x, y, Rgba([rgb[0], rgb[1], rgb[2], 255]));
            }
        }
    }
}

fn draw_badge(img: &mut RgbaImage, rgb: [u8; 3]) {
    let (w, h) = img.dimensions();
    let border = (w.min(h) / 10).max(1);
    for y in 0..h {
        for x in 0..w {
            let edge = x < border || y < border || x >= w - border || y >= h - border;
            let c = if edge { [0, 0, 0] } else { rgb };
            img.put_pixel(x, y, Rgba([c[0], c[1], c[2], 255]));
        }
    }
}

/// One category per natural-area band so every scale band gets exercised.
fn gen_category(
    out: &Path,
    name: &str,
    count: u32,
    side: (u32, u32),
    rng: &mut impl Rng,
) -> anyhow::Result<()> {
    let dir = out.join(name);
    fs::create_dir_all(&dir)?;
    for i in 0..count {
        let w = rng.gen_range(side.0..=side.1);
        let h = rng.gen_range(side.0..=side.1);
        let mut img = RgbaImage::from_pixel(w, h, Rgba([0, 0, 0, 0]));
        let rgb = random_rgb(rng);
        match rng.gen_range(0..4) {
            0 => draw_ellipse(&mut img, rgb, false),
            1 => draw_ellipse(&mut img, rgb, true),
            2 => draw_star(&mut img, rgb),
            _ => draw_badge(&mut img, rgb),
        }
        img.save(dir.join(format!("{name}_{i:03}.png")))?;
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    // Usage: cargo run -p sticker-poster-cli --example gen_stickers -- [out_root]
    // Default out_root: assets/stickers
    let out_root = std::env::args()
        .nth(1)
        .map(std::path::PathBuf::from)
        .unwrap_or_else(|| "assets/stickers".into());
    fs::create_dir_all(&out_root)?;

    let mut rng = rand::rngs::StdRng::seed_from_u64(0xDEADBEEF);
    gen_category(&out_root, "tiny", 60, (24, 64), &mut rng)?;
    gen_category(&out_root, "small", 60, (72, 140), &mut rng)?;
    gen_category(&out_root, "medium", 40, (150, 300), &mut rng)?;
    gen_category(&out_root, "large", 20, (330, 700), &mut rng)?;
    gen_category(&out_root, "huge", 8, (720, 1200), &mut rng)?;

    // an unreadable sticker to exercise skip handling
    fs::write(out_root.join("small").join("broken.png"), b"not a png")?;

    println!("Generated stickers under {}", out_root.display());
    Ok(())
}
