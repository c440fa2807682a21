use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;

use quadcrop::detect::{self, TextLine};
use quadcrop::render::pixmap_to_rgba;
use quadcrop::{CropConfig, CropEngine, PixelRect, output};

#[derive(Debug, Clone, Parser)]
#[command(name = "quadcrop", about = "Crop one or more quadrilateral regions out of an image", version)]
struct Args {
    /// Source image
    image: PathBuf,

    /// JSON list of region rectangles in source pixels
    #[arg(long, conflicts_with = "ocr")]
    regions: Option<PathBuf>,

    /// JSON list of OCR text lines used to detect question regions
    #[arg(long)]
    ocr: Option<PathBuf>,

    /// Simulated view size, e.g. 1080x1920 (defaults to the image size)
    #[arg(long, value_parser = parse_view_size)]
    view: Option<(f32, f32)>,

    /// Config file (defaults to the user config dir)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Output directory for crops (defaults to the pictures dir)
    #[arg(long, short = 'o')]
    out: Option<PathBuf>,

    /// Write the rendered crop view to this PNG
    #[arg(long)]
    preview: Option<PathBuf>,

    /// Number of manually added regions when none are given
    #[arg(long, default_value_t = 0)]
    add: usize,
}

fn parse_view_size(s: &str) -> Result<(f32, f32), String> {
    let (w, h) = s
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got {s:?}"))?;
    let w: f32 = w.trim().parse().map_err(|e| format!("invalid width: {e}"))?;
    let h: f32 = h.trim().parse().map_err(|e| format!("invalid height: {e}"))?;
    if w <= 0.0 || h <= 0.0 {
        return Err("view size must be positive".to_string());
    }
    Ok((w, h))
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&json).with_context(|| format!("Failed to parse {}", path.display()))
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let args = Args::parse();

    let config = CropConfig::load_or_default(args.config.as_deref());
    let default_margin = config.default_margin;
    let image = image::open(&args.image)
        .with_context(|| format!("Failed to open {}", args.image.display()))?
        .to_rgba8();
    let image = Arc::new(image);

    let (view_w, view_h) = args
        .view
        .unwrap_or((image.width() as f32, image.height() as f32));
    let mut engine = CropEngine::new(config);
    engine.on_viewport_resized(view_w, view_h);
    engine.set_image(&image);

    if let Some(path) = &args.regions {
        let rects: Vec<PixelRect> = read_json(path)?;
        engine.set_auto_regions(&rects);
    } else if let Some(path) = &args.ocr {
        let lines: Vec<TextLine> = read_json(path)?;
        let detected = detect::detect_question_regions(&lines, image.width(), image.height());
        let rects: Vec<PixelRect> = detected.iter().map(|q| q.bounds).collect();
        engine.set_auto_regions(&rects);
    }
    for _ in 0..args.add {
        engine.add_region();
    }
    if engine.region_count() == 0 {
        engine.add_default_region(default_margin);
    }
    engine.enter_crop_mode();

    if let Some(path) = &args.preview {
        let frame = engine.render().context("Nothing to render")?;
        output::save_rgba(&pixmap_to_rgba(&frame), path)?;
        log::info!("Preview written to {}", path.display());
    }

    let job = engine
        .extraction_job()
        .context("Cannot extract: image or layout missing")?;
    let crops = job.run_blocking().await?;
    if crops.is_empty() {
        anyhow::bail!("No region could be extracted");
    }

    let dir = match args.out {
        Some(dir) => dir,
        None => output::default_output_dir().context("No pictures directory, pass --out")?,
    };
    let paths = output::save_crops(&dir, crops.iter().map(|c| &c.image))?;
    for path in paths {
        println!("{}", path.display());
    }
    Ok(())
}
