use image::{Rgba, RgbaImage};
use std::fs;
use sticker_poster_core::export::dpi_to_ppm;
use sticker_poster_core::prelude::*;

#[test]
fn export_layout_stats_and_png_dpi() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let cat = tmp.path().join("stickers").join("ch1");
    fs::create_dir_all(&cat).expect("mkdir");
    RgbaImage::from_pixel(20, 12, Rgba([1, 2, 3, 255]))
        .save(cat.join("a.png"))
        .expect("save");
    let stickers = load(&tmp.path().join("stickers")).expect("load");

    let cfg = PosterConfig::builder()
        .with_canvas(120, 90)
        .count(1)
        .seed(Some(8))
        .dpi(300)
        .build();
    let out = compose(&stickers, cfg).expect("compose");

    let layout = to_json(&out.layout);
    let obj = layout.as_object().expect("object");
    assert!(obj.contains_key("canvas"));
    assert!(obj.contains_key("meta"));
    let placements = obj["placements"].as_array().expect("array");
    assert_eq!(placements.len(), out.placed_count());
    assert_eq!(placements[0]["category"], "ch1");

    let stats = stats_json(&out.stats);
    assert_eq!(stats["requested"], 1);

    let png_path = tmp.path().join("out").join("poster.png");
    save_poster(&out.image, &png_path, 300).expect("save poster");
    let decoder = png::Decoder::new(fs::File::open(&png_path).expect("open"));
    let reader = decoder.read_info().expect("read info");
    let info = reader.info();
    assert_eq!((info.width, info.height), (120, 90));
    let dims = info.pixel_dims.expect("pHYs present");
    assert_eq!(dims.xppu, dpi_to_ppm(300));
    assert_eq!(dims.unit, png::Unit::Meter);

    let jpg_path = tmp.path().join("poster.jpg");
    save_poster(&out.image, &jpg_path, 300).expect("save jpeg");
    assert!(jpg_path.exists());
}

#[test]
fn dpi_conversion() {
    assert_eq!(dpi_to_ppm(300), 11811);
    assert_eq!(dpi_to_ppm(72), 2835);
}
