//! Boxaug: geometry-aware augmentation for detection training data.
//!
//! Boxaug transforms an image together with its bounding boxes, keypoints
//! and masks so the annotations stay consistent with the pixels. Boxes are
//! converted once from the caller's format (`coco`, `pascal_voc`, `yolo`)
//! into a normalized corner-corner form, moved by each transform, filtered
//! by a survival policy, and converted back.
//!
//! # Modules
//!
//! - [`bbox`]: Coordinate model (formats, normalization, area)
//! - [`targets`]: Target bundle, `BboxParams` and box/label synchronization
//! - [`compose`]: Transform contract, composition engine and replay
//! - [`transforms`]: Reference transforms
//! - [`config`]: Pipeline configuration files
//! - [`error`]: Error types for boxaug operations
//!
//! # Example
//!
//! ```
//! use boxaug::bbox::{BBox, BBoxFormat};
//! use boxaug::compose::ReplayCompose;
//! use boxaug::targets::{BboxParams, Image, Targets};
//! use boxaug::transforms::RandomCrop;
//! use rand::{rngs::StdRng, SeedableRng};
//! use serde_json::json;
//!
//! let pipeline = ReplayCompose::new(
//!     vec![Box::new(RandomCrop::new(64, 64, 1.0).unwrap())],
//!     Some(BboxParams::new(BBoxFormat::PascalVoc).with_label_fields(["labels"])),
//! )
//! .unwrap();
//!
//! let targets = Targets::new(Image::zeros((128, 96, 3)))
//!     .with_bboxes(vec![BBox::new([10.0, 10.0, 40.0, 40.0])])
//!     .with_labels("labels", vec![json!(1)]);
//!
//! let out = pipeline.apply(targets.clone(), &mut StdRng::seed_from_u64(7)).unwrap();
//! let again = pipeline.replay(&out.replay, targets).unwrap();
//! assert_eq!(out.targets, again);
//! ```

pub mod bbox;
pub mod compose;
pub mod config;
pub mod error;
pub mod io_json;
pub mod targets;
pub mod transforms;

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{info, Level};

pub use error::AugmentError;

use bbox::{BBoxFormat, Raw};
use io_json::AnnotationDocument;

/// The boxaug CLI application.
#[derive(Parser)]
#[command(name = "boxaug")]
#[command(version, about)]
#[command(propagate_version = true)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Run a pipeline over an annotation document and record its trace.
    Augment(AugmentArgs),
    /// Re-run a recorded trace over an annotation document.
    Replay(ReplayArgs),
    /// Convert the boxes of an annotation document between formats.
    Convert(ConvertArgs),
}

/// Arguments for the augment subcommand.
#[derive(clap::Args)]
struct AugmentArgs {
    /// Annotation document (JSON).
    input: PathBuf,

    /// Pipeline config (YAML or JSON).
    #[arg(short, long)]
    config: PathBuf,

    /// Output file; prints to stdout when omitted.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Seed for the random source (overrides the config's seed).
    #[arg(long, env = "BOXAUG_SEED")]
    seed: Option<u64>,
}

/// Arguments for the replay subcommand.
#[derive(clap::Args)]
struct ReplayArgs {
    /// Annotation document (JSON).
    input: PathBuf,

    /// Pipeline config the trace was recorded with.
    #[arg(short, long)]
    config: PathBuf,

    /// Trace file, or an earlier augment output carrying a `replay` key.
    #[arg(short, long)]
    trace: PathBuf,

    /// Output file; prints to stdout when omitted.
    #[arg(short, long)]
    output: Option<PathBuf>,
}

/// Arguments for the convert subcommand.
#[derive(clap::Args)]
struct ConvertArgs {
    /// Annotation document (JSON).
    input: PathBuf,

    /// Format of the input boxes ('coco', 'pascal_voc', 'yolo', 'normalized').
    #[arg(long)]
    from: String,

    /// Format to write ('coco', 'pascal_voc', 'yolo', 'normalized').
    #[arg(long)]
    to: String,

    /// Output file; prints to stdout when omitted.
    #[arg(short, long)]
    output: Option<PathBuf>,
}

/// Run the boxaug CLI.
///
/// This is the main entry point for the CLI, called from `main.rs`.
pub fn run() -> Result<(), AugmentError> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Some(Commands::Augment(args)) => run_augment(args),
        Some(Commands::Replay(args)) => run_replay(args),
        Some(Commands::Convert(args)) => run_convert(args),
        None => {
            println!("boxaug {}", env!("CARGO_PKG_VERSION"));
            println!();
            println!("Geometry-aware augmentation for detection annotations.");
            println!();
            println!("Run 'boxaug --help' for usage information.");
            Ok(())
        }
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    // A subscriber may already be installed when embedded; keep that one.
    let _ = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Execute the augment subcommand.
fn run_augment(args: AugmentArgs) -> Result<(), AugmentError> {
    let config = config::read_pipeline_config(&args.config)?;
    let pipeline = config.build()?;
    let doc = io_json::read_document(&args.input)?;

    let targets = doc.to_targets()?;
    let result = match args.seed.or(config.seed) {
        Some(seed) => pipeline.apply(targets, &mut StdRng::seed_from_u64(seed))?,
        None => pipeline.apply(targets, &mut rand::rng())?,
    };
    info!(
        fired = result.replay.applied_count(),
        boxes = result.targets.bboxes.as_ref().map_or(0, Vec::len),
        "augmented {}",
        args.input.display()
    );

    let out = AnnotationDocument::from_targets(result.targets, Some(result.replay));
    emit(&out, args.output.as_deref())
}

/// Execute the replay subcommand.
fn run_replay(args: ReplayArgs) -> Result<(), AugmentError> {
    let pipeline = config::read_pipeline_config(&args.config)?.build()?;
    let trace = io_json::read_trace(&args.trace)?;
    let doc = io_json::read_document(&args.input)?;

    let targets = pipeline.replay(&trace, doc.to_targets()?)?;
    let out = AnnotationDocument::from_targets(targets, Some(trace));
    emit(&out, args.output.as_deref())
}

/// Execute the convert subcommand.
fn run_convert(args: ConvertArgs) -> Result<(), AugmentError> {
    let from: BBoxFormat = args.from.parse()?;
    let to: BBoxFormat = args.to.parse()?;
    let mut doc = io_json::read_document(&args.input)?;

    if let Some(bboxes) = doc.bboxes.take() {
        let (rows, cols) = (doc.height, doc.width);
        let normalized = bbox::convert_bboxes_to_normalized(&bboxes, rows, cols, from)?;
        let converted: Vec<bbox::BBox<Raw>> =
            bbox::convert_bboxes_from_normalized(&normalized, rows, cols, to)?;
        doc.bboxes = Some(converted);
    }
    emit(&doc, args.output.as_deref())
}

fn emit(doc: &AnnotationDocument, output: Option<&Path>) -> Result<(), AugmentError> {
    match output {
        Some(path) => io_json::write_document(path, doc),
        None => {
            let json = io_json::to_json_string(doc).map_err(|source| AugmentError::JsonWrite {
                path: PathBuf::from("<stdout>"),
                source,
            })?;
            println!("{}", json);
            Ok(())
        }
    }
}
