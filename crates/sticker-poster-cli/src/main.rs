use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::Context;
use clap::{ArgAction, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use serde::Deserialize;
use sticker_poster_core::analysis::{analyze, recommend_sizes, render_report};
use sticker_poster_core::config::{PosterConfig, ScaleBand, Scoring};
use sticker_poster_core::loader::category_count;
use sticker_poster_core::{
    LoadOptions, PlacementEvent, PlacementResult, SkipReason, StickerAsset, StickerPacker,
    compose_variants, load_with, save_poster, stats_json, to_json,
};
use tracing::{debug, info, warn};

#[derive(Parser, Debug)]
#[command(
    name = "sticker-poster",
    about = "Compose posters from folders of stickers",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
    /// Show progress bars (disable with --progress false or --quiet)
    #[arg(long, default_value_t = true, action=ArgAction::Set, global=true, help_heading = "Logging/UX")]
    progress: bool,
    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action=ArgAction::Count, global=true, help_heading = "Logging/UX")]
    verbose: u8,
    /// Quiet mode (overrides verbose)
    #[arg(
        short,
        long,
        default_value_t = false,
        global = true,
        help_heading = "Logging/UX"
    )]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Place stickers randomly on a canvas and write the poster
    Compose(ComposeArgs),
    /// Report sticker statistics and recommend poster sizes
    Analyze(AnalyzeArgs),
}

#[derive(Parser, Debug, Clone)]
struct ComposeArgs {
    // Input/Output
    /// Sticker root: one subdirectory per category
    #[arg(help_heading = "Input/Output")]
    stickers_dir: PathBuf,
    /// Output image (.png gets DPI metadata)
    #[arg(
        short,
        long,
        default_value = "random_poster.png",
        help_heading = "Input/Output"
    )]
    output: PathBuf,
    /// YAML config file path (values override CLI options)
    #[arg(long, help_heading = "Input/Output")]
    config: Option<PathBuf>,
    /// Include patterns (glob). If set, only files matching any pattern are considered
    #[arg(long, help_heading = "Input/Output")]
    include: Vec<String>,
    /// Exclude patterns (glob). Files matching any pattern will be ignored
    #[arg(long, help_heading = "Input/Output")]
    exclude: Vec<String>,

    // Canvas
    /// Canvas width in pixels
    #[arg(long, default_value_t = 3840, help_heading = "Canvas")]
    width: u32,
    /// Canvas height in pixels
    #[arg(long, default_value_t = 2160, help_heading = "Canvas")]
    height: u32,
    /// Output DPI
    #[arg(long, default_value_t = 300, help_heading = "Canvas")]
    dpi: u32,
    /// Background color as three values: R G B
    #[arg(long, num_args = 3, value_names = ["R", "G", "B"], default_values_t = [255u8, 255, 255], help_heading = "Canvas")]
    bg_color: Vec<u8>,

    // Stickers
    /// Number of stickers to place
    #[arg(short = 'n', long, default_value_t = 200, help_heading = "Stickers")]
    count: usize,
    /// Lower clamp on the adaptive scale factor
    #[arg(long, default_value_t = 0.1, help_heading = "Stickers")]
    min_scale: f32,
    /// Upper clamp on the adaptive scale factor
    #[arg(long, default_value_t = 1.5, help_heading = "Stickers")]
    max_scale: f32,
    /// Maximum rotation in degrees (applied as +/-)
    #[arg(long, default_value_t = 30.0, help_heading = "Stickers")]
    max_rotation: f32,
    /// Minimum sticker area as a fraction of canvas area
    #[arg(long, default_value_t = 0.0005, help_heading = "Stickers")]
    min_area_ratio: f64,
    /// Cycle through the sticker pool when count exceeds it
    #[arg(long, default_value_t = false, help_heading = "Stickers")]
    allow_repeats: bool,
    /// Draw red outlines around placed regions (debug)
    #[arg(long, default_value_t = false, help_heading = "Stickers")]
    outlines: bool,

    // Placement
    /// Random seed for reproducible posters
    #[arg(long, help_heading = "Placement")]
    seed: Option<u64>,
    /// Minimum gap between stickers in pixels
    #[arg(long, default_value_t = 0, help_heading = "Placement")]
    spacing: u32,
    /// Valid positions collected before choosing the best one
    #[arg(long, default_value_t = 10, help_heading = "Placement")]
    candidate_pool: usize,
    /// Random positions tried per sticker
    #[arg(long, default_value_t = 500, help_heading = "Placement")]
    max_attempts: u32,
    /// Total sticker attempts = factor * count
    #[arg(long, default_value_t = 10, help_heading = "Placement")]
    attempt_ceiling_factor: u32,
    /// Candidate scoring: centroid | nearest
    #[arg(long, value_parser = ["centroid", "nearest"], default_value = "centroid", help_heading = "Placement")]
    scoring: String,

    // Export
    /// Write the placement layout (JSON) to this file
    #[arg(long, help_heading = "Export")]
    layout: Option<PathBuf>,
    /// Export run stats (JSON) to this file
    #[arg(long, help_heading = "Export")]
    export_stats: Option<PathBuf>,
    /// Print the merged configuration (json|yaml) and exit
    #[arg(long, num_args = 0..=1, default_missing_value = "json", value_parser = ["json", "yaml"], help_heading = "Export")]
    print_config: Option<String>,
    /// Dry run: compute placements and stats but do not write files
    #[arg(long, default_value_t = false, help_heading = "Export")]
    dry_run: bool,
    /// Number of posters to generate with consecutive seeds
    #[arg(long, default_value_t = 1, help_heading = "Export")]
    variants: usize,
}

#[derive(Parser, Debug, Clone)]
struct AnalyzeArgs {
    /// Sticker root: one subdirectory per category
    stickers_dir: PathBuf,
    /// Minimum printed area per sticker (cm²)
    #[arg(long, default_value_t = 1.0)]
    min_area: f64,
    /// Target DPI
    #[arg(long, default_value_t = 300)]
    dpi: u32,
    /// Fraction of the poster expected to be covered
    #[arg(long, default_value_t = 0.7)]
    efficiency: f64,
    /// Also write the report to this text file
    #[arg(long)]
    report: Option<PathBuf>,
    /// Include patterns (glob)
    #[arg(long)]
    include: Vec<String>,
    /// Exclude patterns (glob)
    #[arg(long)]
    exclude: Vec<String>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing_with_level(cli.quiet, cli.verbose);
    let show_progress = cli.progress && !cli.quiet;
    match &cli.command {
        Commands::Compose(args) => run_compose(args, show_progress),
        Commands::Analyze(args) => run_analyze(args, show_progress),
    }
}

fn run_compose(cli: &ComposeArgs, show_progress: bool) -> anyhow::Result<()> {
    let cfg = build_config(cli)?;

    if let Some(format) = &cli.print_config {
        match format.as_str() {
            "yaml" => println!("{}", serde_yaml::to_string(&cfg)?),
            _ => println!("{}", serde_json::to_string_pretty(&cfg)?),
        }
        return Ok(());
    }
    cfg.validate().context("invalid configuration")?;

    let opts = LoadOptions {
        include: cli.include.clone(),
        exclude: cli.exclude.clone(),
    };
    let stickers = load_with_progress(&cli.stickers_dir, &opts, show_progress)?;
    info!(
        count = stickers.len(),
        categories = category_count(&stickers),
        "loaded stickers"
    );
    if stickers.is_empty() {
        warn!(dir = ?cli.stickers_dir, "no stickers found");
    }

    let start = Instant::now();
    let results: Vec<PlacementResult> = if cli.variants <= 1 {
        vec![place_with_progress(&stickers, cfg.clone(), show_progress)?]
    } else {
        let base = cfg.seed.unwrap_or_else(rand::random);
        let seeds: Vec<u64> = (0..cli.variants as u64)
            .map(|i| base.wrapping_add(i))
            .collect();
        info!(variants = seeds.len(), base_seed = base, "composing variants");
        compose_variants(&stickers, &cfg, &seeds)
            .into_iter()
            .collect::<Result<Vec<_>, _>>()?
    };
    debug!(elapsed = %fmt_dur(start.elapsed()), "placement finished");

    for (i, out) in results.iter().enumerate() {
        let index = (results.len() > 1).then_some(i);
        print_summary(&cfg, out);
        if cli.dry_run {
            println!("{}", out.stats.summary());
            continue;
        }

        let poster_path = indexed_path(&cli.output, index);
        save_poster(&out.image, &poster_path, cfg.dpi)
            .with_context(|| format!("write {}", poster_path.display()))?;
        info!(?poster_path, dpi = cfg.dpi, "poster written");

        if let Some(path) = &cli.layout {
            let layout_path = indexed_path(path, index);
            write_json(&layout_path, &to_json(&out.layout))?;
            info!(?layout_path, "layout written");
        }
        if let Some(path) = &cli.export_stats {
            let stats_path = indexed_path(path, index);
            write_json(&stats_path, &stats_json(&out.stats))?;
            info!(?stats_path, "stats exported");
        }
    }
    Ok(())
}

fn run_analyze(cli: &AnalyzeArgs, show_progress: bool) -> anyhow::Result<()> {
    if cli.efficiency <= 0.0 || cli.efficiency > 1.0 {
        anyhow::bail!("--efficiency must be in (0, 1], got {}", cli.efficiency);
    }
    let opts = LoadOptions {
        include: cli.include.clone(),
        exclude: cli.exclude.clone(),
    };
    let stickers = load_with_progress(&cli.stickers_dir, &opts, show_progress)?;
    let Some(report) = analyze(&stickers) else {
        anyhow::bail!("no readable stickers in {}", cli.stickers_dir.display());
    };
    if report.unreadable > 0 {
        warn!(unreadable = report.unreadable, "some stickers could not be read");
    }
    info!(
        count = report.count,
        mean_area = format!("{:.0}", report.mean_area),
        median_area = format!("{:.0}", report.median_area),
        min_area = report.min_area,
        max_area = report.max_area,
        "sticker areas"
    );
    info!(
        mean_width = format!("{:.1}", report.mean_width),
        mean_height = format!("{:.1}", report.mean_height),
        per_category_mean = format!("{:.1}", report.per_category_mean),
        per_category_min = report.per_category_min,
        per_category_max = report.per_category_max,
        "sticker dimensions"
    );

    let options = recommend_sizes(&report, cli.min_area, cli.dpi, cli.efficiency);
    let text = render_report(&report, &options, cli.min_area, cli.dpi);
    println!("{text}");
    if let Some(path) = &cli.report {
        ensure_parent(path)?;
        fs::write(path, &text).with_context(|| format!("write {}", path.display()))?;
        info!(?path, "report written");
    }
    Ok(())
}

/// CLI values first, then the YAML file (if any) on top.
fn build_config(cli: &ComposeArgs) -> anyhow::Result<PosterConfig> {
    let background = match cli.bg_color.as_slice() {
        [r, g, b] => [*r, *g, *b],
        other => anyhow::bail!("--bg-color takes 3 values, got {}", other.len()),
    };
    let scoring: Scoring = cli
        .scoring
        .parse()
        .map_err(|_| anyhow::anyhow!("unknown scoring: {}", cli.scoring))?;
    let cfg = PosterConfig::builder()
        .with_canvas(cli.width, cli.height)
        .count(cli.count)
        .scale_range(cli.min_scale, cli.max_scale)
        .max_rotation(cli.max_rotation)
        .min_area_ratio(cli.min_area_ratio)
        .background(background)
        .dpi(cli.dpi)
        .seed(cli.seed)
        .spacing(cli.spacing)
        .candidate_pool(cli.candidate_pool)
        .max_attempts_per_sticker(cli.max_attempts)
        .attempt_ceiling_factor(cli.attempt_ceiling_factor)
        .scoring(scoring)
        .allow_repeats(cli.allow_repeats)
        .outlines(cli.outlines)
        .build();

    match &cli.config {
        Some(path) => {
            let file = fs::read_to_string(path)
                .with_context(|| format!("read config {}", path.display()))?;
            let y: YamlConfig = serde_yaml::from_str(&file)
                .with_context(|| format!("parse config {}", path.display()))?;
            y.into_poster_config(cfg)
        }
        None => Ok(cfg),
    }
}

fn load_with_progress(
    dir: &Path,
    opts: &LoadOptions,
    progress: bool,
) -> anyhow::Result<Vec<StickerAsset>> {
    let bar = if progress {
        let b = ProgressBar::new_spinner();
        b.set_style(ProgressStyle::with_template(
            "{spinner:.green} scanning [{elapsed_precise}] {wide_msg}",
        )?);
        b.set_message(dir.display().to_string());
        b.enable_steady_tick(Duration::from_millis(100));
        Some(b)
    } else {
        None
    };
    let stickers =
        load_with(dir, opts).with_context(|| format!("load stickers from {}", dir.display()))?;
    if let Some(b) = &bar {
        b.finish_and_clear();
    }
    Ok(stickers)
}

fn place_with_progress(
    stickers: &[StickerAsset],
    cfg: PosterConfig,
    progress: bool,
) -> anyhow::Result<PlacementResult> {
    let bar = if progress {
        let b = ProgressBar::new(cfg.count as u64);
        b.set_style(ProgressStyle::with_template(
            "{spinner:.green} placing {pos}/{len} [{elapsed_precise}] {wide_msg}",
        )?);
        Some(b)
    } else {
        None
    };
    let packer = StickerPacker::new(cfg)?;
    let out = packer.place_with(stickers, |event| {
        let Some(b) = &bar else { return };
        match event {
            PlacementEvent::Placed {
                sticker, placed, ..
            } => {
                b.set_position(placed as u64);
                b.set_message(display_name(&sticker.path));
            }
            PlacementEvent::Skipped { sticker, reason } => {
                let why = match reason {
                    SkipReason::NoFit => "no fit",
                    SkipReason::Unreadable => "unreadable",
                };
                b.set_message(format!("skipped {} ({why})", display_name(&sticker.path)));
            }
        }
    })?;
    if let Some(b) = &bar {
        b.finish_and_clear();
    }
    Ok(out)
}

fn print_summary(cfg: &PosterConfig, out: &PlacementResult) {
    let dpi = cfg.dpi.max(1) as f64;
    let (w_in, h_in) = (cfg.width as f64 / dpi, cfg.height as f64 / dpi);
    info!(
        width = cfg.width,
        height = cfg.height,
        physical = format!(
            "{:.1}x{:.1} in ({:.1}x{:.1} cm) at {} DPI",
            w_in,
            h_in,
            w_in * 2.54,
            h_in * 2.54,
            cfg.dpi
        ),
        seed = ?out.layout.meta.seed,
        "poster"
    );
    info!(
        placed = out.placed_count(),
        requested = out.requested_count(),
        success_rate = format!("{:.1}%", out.stats.success_rate()),
        coverage = format!("{:.2}%", out.stats.coverage * 100.0),
        attempts = out.stats.attempts,
        "stats"
    );
}

/// `poster.png` -> `poster_2.png` when writing several variants.
fn indexed_path(path: &Path, index: Option<usize>) -> PathBuf {
    let Some(i) = index else {
        return path.to_path_buf();
    };
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("poster");
    let name = match path.extension().and_then(|e| e.to_str()) {
        Some(ext) => format!("{stem}_{i}.{ext}"),
        None => format!("{stem}_{i}"),
    };
    path.with_file_name(name)
}

fn write_json(path: &Path, value: &serde_json::Value) -> anyhow::Result<()> {
    ensure_parent(path)?;
    fs::write(path, serde_json::to_string_pretty(value)?)
        .with_context(|| format!("write {}", path.display()))
}

fn ensure_parent(path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).with_context(|| format!("create {}", parent.display()))?;
    }
    Ok(())
}

fn display_name(p: &Path) -> String {
    p.file_name()
        .and_then(|s| s.to_str())
        .unwrap_or("")
        .to_string()
}

fn fmt_dur(d: Duration) -> String {
    let ms = d.as_secs_f64() * 1000.0;
    if ms >= 1.0 {
        format!("{:.1}ms", ms)
    } else {
        format!("{}us", d.as_micros())
    }
}

fn init_tracing_with_level(quiet: bool, verbose: u8) {
    let level = if quiet {
        "error".to_string()
    } else {
        match verbose {
            0 => "info".into(),
            1 => "debug".into(),
            _ => "trace".into(),
        }
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(level)
        .with_target(false)
        .try_init();
}

#[derive(Debug, Deserialize, Default)]
struct YamlConfig {
    width: Option<u32>,
    height: Option<u32>,
    count: Option<usize>,
    scale_range: Option<(f32, f32)>,
    rotation_range: Option<(f32, f32)>,
    max_rotation: Option<f32>,
    jitter_range: Option<(f32, f32)>,
    scale_bands: Option<Vec<ScaleBand>>,
    min_area_ratio: Option<f64>,
    background: Option<[u8; 3]>,
    dpi: Option<u32>,
    seed: Option<u64>,
    max_attempts_per_sticker: Option<u32>,
    candidate_pool: Option<usize>,
    attempt_ceiling_factor: Option<u32>,
    spacing: Option<u32>,
    scoring: Option<String>,
    allow_repeats: Option<bool>,
    grid_cell: Option<u32>,
    outlines: Option<bool>,
}

impl YamlConfig {
    fn into_poster_config(self, mut cfg: PosterConfig) -> anyhow::Result<PosterConfig> {
        if let Some(v) = self.width {
            cfg.width = v;
        }
        if let Some(v) = self.height {
            cfg.height = v;
        }
        if let Some(v) = self.count {
            cfg.count = v;
        }
        if let Some(v) = self.scale_range {
            cfg.scale_range = v;
        }
        if let Some(v) = self.max_rotation {
            cfg.rotation_range = (-v.abs(), v.abs());
        }
        if let Some(v) = self.rotation_range {
            cfg.rotation_range = v;
        }
        if let Some(v) = self.jitter_range {
            cfg.jitter_range = v;
        }
        if let Some(v) = self.scale_bands {
            cfg.scale_bands = v;
        }
        if let Some(v) = self.min_area_ratio {
            cfg.min_area_ratio = v;
        }
        if let Some(v) = self.background {
            cfg.background = v;
        }
        if let Some(v) = self.dpi {
            cfg.dpi = v;
        }
        if self.seed.is_some() {
            cfg.seed = self.seed;
        }
        if let Some(v) = self.max_attempts_per_sticker {
            cfg.max_attempts_per_sticker = v;
        }
        if let Some(v) = self.candidate_pool {
            cfg.candidate_pool = v;
        }
        if let Some(v) = self.attempt_ceiling_factor {
            cfg.attempt_ceiling_factor = v;
        }
        if let Some(v) = self.spacing {
            cfg.spacing = v;
        }
        if let Some(s) = self.scoring {
            cfg.scoring = s
                .parse()
                .map_err(|_| anyhow::anyhow!("unknown scoring in config: {s}"))?;
        }
        if let Some(v) = self.allow_repeats {
            cfg.allow_repeats = v;
        }
        if let Some(v) = self.grid_cell {
            cfg.grid_cell = v;
        }
        if let Some(v) = self.outlines {
            cfg.outlines = v;
        }
        Ok(cfg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn yaml_overrides_cli_values() {
        let y: YamlConfig = serde_yaml::from_str(
            "width: 1000\nmax_rotation: 12\nscoring: nearest\nbackground: [0, 0, 0]\n",
        )
        .unwrap();
        let cfg = y
            .into_poster_config(PosterConfig::builder().with_canvas(10, 10).count(5).build())
            .unwrap();
        assert_eq!(cfg.width, 1000);
        assert_eq!(cfg.height, 10);
        assert_eq!(cfg.count, 5);
        assert_eq!(cfg.rotation_range, (-12.0, 12.0));
        assert_eq!(cfg.scoring, Scoring::Nearest);
        assert_eq!(cfg.background, [0, 0, 0]);
    }

    #[test]
    fn yaml_rejects_unknown_scoring() {
        let y: YamlConfig = serde_yaml::from_str("scoring: best\n").unwrap();
        assert!(y.into_poster_config(PosterConfig::default()).is_err());
    }

    #[test]
    fn variant_paths_are_indexed() {
        let p = Path::new("out/poster.png");
        assert_eq!(indexed_path(p, None), PathBuf::from("out/poster.png"));
        assert_eq!(indexed_path(p, Some(2)), PathBuf::from("out/poster_2.png"));
        assert_eq!(indexed_path(Path::new("layout"), Some(0)), PathBuf::from("layout_0"));
    }

    #[test]
    fn cli_defaults_build_a_valid_config() {
        let cli = Cli::parse_from(["sticker-poster", "compose", "stickers"]);
        let Commands::Compose(args) = cli.command else {
            panic!("expected compose");
        };
        let cfg = build_config(&args).unwrap();
        assert_eq!((cfg.width, cfg.height, cfg.count), (3840, 2160, 200));
        assert_eq!(cfg.background, [255, 255, 255]);
        assert_eq!(cfg.rotation_range, (-30.0, 30.0));
        assert_eq!(args.output, PathBuf::from("random_poster.png"));
        assert!(cfg.validate().is_ok());
    }
}
