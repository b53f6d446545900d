//! Image classification scoring CLI.
//!
//! Scores a set of images against an ONNX classification model and reports
//! the most likely label per image with a confidence score.
//!
//! Usage:
//! ```
//! imgscore --model-path models/resnet152v2.onnx --labels models/synset_text.txt images/dog.jpg
//! ```
//!
//! Score a whole folder, or a TSV manifest of `<path>\t<label>` lines:
//! ```
//! imgscore --model-path m.onnx --labels labels.txt --images-dir assets/images
//! imgscore --model-path m.onnx --labels labels.txt --manifest tags.tsv --image-root assets/images
//! ```

use clap::Parser;
use imgscore::core::{init_tracing, ModelSpec, ParallelPolicy, PipelineConfig};
use imgscore::inference::OrtEngine;
use imgscore::labels::LabelTable;
use imgscore::pipeline::{read_manifest, scan_directory, ImageRecord, ScoringPipelineBuilder};
use imgscore::report::{JsonLinesReporter, Reporter, TracingReporter};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};

/// Command-line arguments for the scoring CLI.
#[derive(Parser)]
#[command(name = "imgscore")]
#[command(about = "Score images against an ONNX classification model")]
struct Args {
    /// Path to the ONNX model file
    #[arg(short, long)]
    model_path: PathBuf,

    /// Path to the newline-delimited label file
    #[arg(short, long)]
    labels: PathBuf,

    /// Optional JSON file overriding the model spec (tensor names, input
    /// size, layout, pixel regime, class count)
    #[arg(long)]
    model_spec: Option<PathBuf>,

    /// Image file paths to score
    images: Vec<PathBuf>,

    /// Score every raster image in this directory
    #[arg(long)]
    images_dir: Option<PathBuf>,

    /// TSV manifest of `<relative-path>\t<true-label>` lines
    #[arg(long, requires = "image_root")]
    manifest: Option<PathBuf>,

    /// Root the manifest's relative paths are resolved against
    #[arg(long)]
    image_root: Option<PathBuf>,

    /// Number of worker threads for scoring (default: rayon's choice)
    #[arg(long)]
    threads: Option<usize>,

    /// Per-item inference deadline in milliseconds
    #[arg(long)]
    timeout_ms: Option<u64>,

    /// Abort the run on the first per-item error
    #[arg(long)]
    fail_fast: bool,

    /// Number of ONNX sessions in the engine pool
    #[arg(long, default_value_t = 1)]
    session_pool: usize,

    /// Emit one JSON object per image on stdout instead of log lines
    #[arg(long)]
    json: bool,
}

fn collect_records(args: &Args) -> Result<Vec<ImageRecord>, Box<dyn std::error::Error>> {
    let mut records = Vec::new();

    if let (Some(manifest), Some(root)) = (&args.manifest, &args.image_root) {
        records.extend(read_manifest(manifest, root)?);
    }
    if let Some(dir) = &args.images_dir {
        records.extend(scan_directory(dir)?);
    }
    records.extend(args.images.iter().map(ImageRecord::new));

    Ok(records)
}

fn load_model_spec(args: &Args) -> Result<ModelSpec, Box<dyn std::error::Error>> {
    let spec = match &args.model_spec {
        Some(path) => {
            let content = std::fs::read_to_string(path)?;
            serde_json::from_str(&content)?
        }
        None => ModelSpec::resnet152v2(),
    };
    Ok(spec)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();
    let args = Args::parse();

    if !args.model_path.exists() {
        error!("model file not found: {}", args.model_path.display());
        return Err("model file not found".into());
    }

    let records = collect_records(&args)?;
    if records.is_empty() {
        error!("no images to score; pass image paths, --images-dir, or --manifest");
        return Err("no images to score".into());
    }

    let spec = load_model_spec(&args)?;
    info!(
        model = %spec.model_name,
        input = %spec.input_name,
        output = %spec.output_name,
        size = %format_args!("{}x{}", spec.input_width, spec.input_height),
        "loading model"
    );

    // Fatal setup: a missing model or label file aborts before any scoring.
    let engine = OrtEngine::with_pool_size(spec.clone(), &args.model_path, args.session_pool)?;
    let labels = LabelTable::from_file(&args.labels)?;

    let config = PipelineConfig::new()
        .with_fail_fast(args.fail_fast)
        .with_timeout(args.timeout_ms.map(Duration::from_millis))
        .with_parallel(ParallelPolicy::default().with_max_threads(args.threads));

    let pipeline = ScoringPipelineBuilder::new()
        .engine(Arc::new(engine))
        .labels(Arc::new(labels))
        .model_spec(spec)
        .config(config)
        .build()?;

    info!(records = records.len(), "scoring images");
    let outcomes = pipeline.score(&records)?;

    if args.json {
        let mut reporter = JsonLinesReporter::new(std::io::stdout().lock());
        reporter.report(&outcomes);
    } else {
        let mut reporter = TracingReporter::new();
        reporter.report(&outcomes);
    }

    let failures = outcomes.iter().filter(|o| o.result.is_err()).count();
    if failures > 0 {
        info!(failures, "some images could not be scored");
    }

    Ok(())
}
