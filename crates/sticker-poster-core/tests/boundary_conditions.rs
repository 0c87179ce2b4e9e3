use sticker_poster_core::config::{PosterConfig, ScaleBand, Scoring};
use sticker_poster_core::error::PosterError;
use sticker_poster_core::pipeline::StickerPacker;

/// Test zero-sized canvas dimensions
#[test]
fn test_zero_width() {
    let cfg = PosterConfig {
        width: 0,
        height: 600,
        ..Default::default()
    };

    match cfg.validate() {
        Err(PosterError::InvalidDimensions { width, height }) => {
            assert_eq!(width, 0);
            assert_eq!(height, 600);
        }
        other => panic!("Expected InvalidDimensions error, got {other:?}"),
    }
}

#[test]
fn test_zero_height_rejected_by_packer() {
    let cfg = PosterConfig {
        width: 800,
        height: 0,
        ..Default::default()
    };
    assert!(matches!(
        StickerPacker::new(cfg),
        Err(PosterError::InvalidDimensions { .. })
    ));
}

#[test]
fn test_defaults_are_valid() {
    assert!(PosterConfig::default().validate().is_ok());
}

#[test]
fn test_inverted_ranges() {
    let cfg = PosterConfig::builder().scale_range(1.2, 0.4).build();
    assert!(matches!(cfg.validate(), Err(PosterError::InvalidConfig(_))));

    let cfg = PosterConfig::builder().rotation_range(10.0, -10.0).build();
    assert!(matches!(cfg.validate(), Err(PosterError::InvalidConfig(_))));

    let cfg = PosterConfig::builder().jitter_range(0.0, 1.0).build();
    assert!(matches!(cfg.validate(), Err(PosterError::InvalidConfig(_))));
}

#[test]
fn test_min_area_ratio_bounds() {
    let cfg = PosterConfig::builder().min_area_ratio(1.0).build();
    assert!(cfg.validate().is_err());
    let cfg = PosterConfig::builder().min_area_ratio(-0.1).build();
    assert!(cfg.validate().is_err());
    let cfg = PosterConfig::builder().min_area_ratio(0.0).build();
    assert!(cfg.validate().is_ok());
}

#[test]
fn test_scale_bands_must_increase() {
    let cfg = PosterConfig::builder()
        .scale_bands(vec![
            ScaleBand::new(Some(10_000), 0.5, 1.0),
            ScaleBand::new(Some(5_000), 0.4, 0.8),
            ScaleBand::new(None, 0.2, 0.3),
        ])
        .build();
    assert!(cfg.validate().is_err());

    let cfg = PosterConfig::builder()
        .scale_bands(vec![
            ScaleBand::new(None, 0.5, 1.0),
            ScaleBand::new(Some(5_000), 0.4, 0.8),
        ])
        .build();
    assert!(cfg.validate().is_err());

    let cfg = PosterConfig::builder().scale_bands(vec![]).build();
    assert!(cfg.validate().is_err());
}

#[test]
fn test_search_limits_nonzero() {
    assert!(PosterConfig::builder().candidate_pool(0).build().validate().is_err());
    assert!(
        PosterConfig::builder()
            .max_attempts_per_sticker(0)
            .build()
            .validate()
            .is_err()
    );
    assert!(
        PosterConfig::builder()
            .attempt_ceiling_factor(0)
            .build()
            .validate()
            .is_err()
    );
    assert!(PosterConfig::builder().grid_cell(0).build().validate().is_err());
}

#[test]
fn test_attempt_ceiling_scales_with_count() {
    let cfg = PosterConfig::builder().count(37).attempt_ceiling_factor(10).build();
    assert_eq!(cfg.attempt_ceiling(), 370);
}

#[test]
fn test_scoring_parse() {
    assert_eq!("centroid".parse::<Scoring>(), Ok(Scoring::Centroid));
    assert_eq!("NEAREST".parse::<Scoring>(), Ok(Scoring::Nearest));
    assert!("closest".parse::<Scoring>().is_err());
}

#[test]
fn test_config_serde_defaults() {
    let cfg: PosterConfig =
        serde_json::from_str(r#"{"width": 640, "height": 480, "count": 12}"#).expect("parse");
    assert_eq!(cfg.width, 640);
    assert_eq!(cfg.scoring, Scoring::Centroid);
    assert_eq!(cfg.scale_bands.len(), 5);
    assert_eq!(cfg.candidate_pool, 10);
    assert!(cfg.validate().is_ok());
}
