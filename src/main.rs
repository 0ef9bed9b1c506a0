use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use image::ImageReader;
use tracing::{Level, info};

use steelscan::detection::DEFAULT_MODEL_PATH;
use steelscan::{DetectorConfig, Pipeline, YoloDetector};

#[derive(Parser)]
#[command(name = "steelscan")]
#[command(about = "Detect surface defects on steel plates")]
struct Cli {
    /// Process this image without opening the window
    #[arg(value_name = "IMAGE")]
    image_path: Option<PathBuf>,

    /// Path to the detection model weights
    #[arg(long, value_name = "FILE", default_value = DEFAULT_MODEL_PATH)]
    model: PathBuf,

    /// Minimum confidence for a detection to be reported
    #[arg(long, value_name = "THRESHOLD", default_value_t = 0.25)]
    confidence: f32,

    /// IoU above which overlapping detections of one class are merged
    #[arg(long, value_name = "THRESHOLD", default_value_t = 0.7)]
    iou: f32,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Cli::parse();

    tracing_subscriber::fmt()
        .with_max_level(if args.verbose { Level::DEBUG } else { Level::INFO })
        .init();

    let config = DetectorConfig::default()
        .with_model_path(args.model)
        .with_confidence_threshold(args.confidence)
        .with_iou_threshold(args.iou);
    let pipeline = Pipeline::new(Arc::new(YoloDetector::new(config)));

    match args.image_path {
        Some(path) => process_headless(&pipeline, path),
        None => open_window(pipeline),
    }
}

fn process_headless(pipeline: &Pipeline, path: PathBuf) -> anyhow::Result<()> {
    info!("Loading image: {}", path.display());
    let img = ImageReader::open(&path)?
        .with_guessed_format()?
        .decode()
        .map_err(|e| anyhow::anyhow!("Failed to decode image: {}", e))?;

    let outcome = pipeline.run(&path, &img)?;

    println!("\n=== Steel Defect Detection Results ===");
    println!("Total detections: {}", outcome.report.lines.len());
    if outcome.report.is_empty() {
        println!("No defects detected.");
    } else {
        for line in &outcome.report.lines {
            println!("  {}", line);
        }
    }
    println!("Annotated image: {}", outcome.output_path.display());

    Ok(())
}

#[cfg(feature = "gui")]
fn open_window(pipeline: Pipeline) -> anyhow::Result<()> {
    steelscan::gui::run(pipeline)?;
    Ok(())
}

#[cfg(not(feature = "gui"))]
fn open_window(_pipeline: Pipeline) -> anyhow::Result<()> {
    anyhow::bail!("built without the `gui` feature; pass an IMAGE to process it headlessly")
}
