//! shapeye: find colored triangles, squares, and rectangles in a sequence
//! of frames and write the annotated frames out.
//!
//! Frames come from still images on disk (a stand-in for a camera), region
//! moves come from a `--move` script (a stand-in for arrow keys), and the
//! annotated frames land as PNGs in the output directory.
//!
//! # Usage
//!
//! ```text
//! shapeye [OPTIONS] <INPUT>...
//! shapeye frames/ --roi 100,80,200,150 --move 3:right --move 5:up+grow
//! ```

#![allow(clippy::print_stdout)]

mod schedule;
mod sink;
mod source;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use shapeye_pipeline::{
    AnnotationStyle, BorderPolicy, CycleResult, Detector, DetectorConfig, Frame, Rect,
    RegionController,
};

use crate::schedule::ScheduledMove;
use crate::sink::{FrameSink, PngDirectory};
use crate::source::{FrameSource, ImageSequence};

/// Shape and color detection inside a movable region of interest.
#[derive(Parser)]
#[command(name = "shapeye", version)]
struct Cli {
    /// Input images (PNG, JPEG, BMP, WebP) or directories of them.
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Directory the annotated frames are written to.
    #[arg(short, long, default_value = "annotated")]
    output: PathBuf,

    /// Initial region as `x,y,width,height`. Defaults to a centred region
    /// a tenth of the frame in each dimension.
    #[arg(long, value_parser = schedule::parse_rect)]
    roi: Option<Rect>,

    /// Region move before a frame: `<frame>:<direction>[+grow|+shrink]`.
    /// May be repeated.
    #[arg(short = 'm', long = "move")]
    moves: Vec<ScheduledMove>,

    /// How many times to replay the input sequence.
    #[arg(
        long,
        default_value_t = 1,
        value_parser = clap::builder::RangedU64ValueParser::<usize>::new().range(1..)
    )]
    loop_count: usize,

    /// Grayscale threshold; brighter pixels are paper.
    #[arg(long, default_value_t = DetectorConfig::DEFAULT_BINARIZE_THRESHOLD)]
    threshold: u8,

    /// Polygon approximation tolerance as a fraction of the perimeter.
    #[arg(long, default_value_t = DetectorConfig::DEFAULT_APPROX_TOLERANCE_FACTOR)]
    tolerance: f64,

    /// Minimum shape width and height in pixels.
    #[arg(long, default_value_t = DetectorConfig::DEFAULT_MIN_SHAPE_DIM)]
    min_size: u32,

    /// Pixels the region moves per command.
    #[arg(long, default_value_t = DetectorConfig::DEFAULT_ROI_STEP)]
    step: u32,

    /// Reject only contours reaching a region corner instead of any edge.
    #[arg(long)]
    corner_only: bool,

    /// Full detector config as a JSON string.
    ///
    /// When provided, all other detector flags are ignored. Missing fields
    /// take their defaults.
    #[arg(long)]
    config_json: Option<String>,

    /// Print one JSON object per frame instead of a text summary.
    #[arg(long)]
    json: bool,

    /// Enable debug logging.
    #[arg(long)]
    debug: bool,
}

/// Build a [`DetectorConfig`] from CLI arguments.
///
/// If `--config-json` is provided it wins over the individual flags.
fn config_from_cli(cli: &Cli) -> Result<DetectorConfig> {
    if let Some(ref json) = cli.config_json {
        return serde_json::from_str(json).context("Error parsing --config-json");
    }

    Ok(DetectorConfig {
        binarize_threshold: cli.threshold,
        approx_tolerance_factor: cli.tolerance,
        min_shape_dim: cli.min_size,
        roi_step: cli.step,
        border_policy: if cli.corner_only {
            BorderPolicy::CornerOnly
        } else {
            BorderPolicy::AnyEdge
        },
        ..DetectorConfig::default()
    })
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.debug {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config = config_from_cli(&cli)?;
    let detector = Detector::new(config).context("Invalid detector config")?;
    let style = AnnotationStyle::default();

    let mut source = ImageSequence::from_inputs(&cli.inputs, cli.loop_count)?;
    let mut sink = PngDirectory::create(cli.output.clone())?;

    tracing::info!("shapeye starting");
    tracing::info!("Frames: {}", source.len());
    tracing::info!("Output: {}", cli.output.display());
    tracing::debug!("Config: {:?}", detector.config());

    run(&cli, &detector, &style, &mut source, &mut sink)
}

/// The processing loop: one cycle per frame until the source runs dry.
fn run(
    cli: &Cli,
    detector: &Detector,
    style: &AnnotationStyle,
    source: &mut impl FrameSource,
    sink: &mut impl FrameSink,
) -> Result<()> {
    let mut region: Option<RegionController> = None;
    let mut last_frame: Option<Frame> = None;
    let mut processed = 0usize;

    for index in 0.. {
        // Moves for this frame go in before the frame is read.
        if let Some(ref region) = region {
            apply_moves(region, &cli.moves, index);
        }

        let mut frame = match source.next_frame() {
            None => break,
            Some(Ok(frame)) => {
                last_frame = Some(frame.clone());
                frame
            }
            Some(Err(e)) => {
                if let Some(ref previous) = last_frame {
                    tracing::warn!("{e:#}; reusing previous frame");
                    previous.clone()
                } else {
                    tracing::warn!("{e:#}; no earlier frame, skipping");
                    continue;
                }
            }
        };

        // The region is sized against the first frame that arrives. Moves
        // scheduled for earlier, unreadable frames are replayed in order.
        if region.is_none() {
            let created = init_region(cli, detector, &frame)?;
            tracing::info!(
                "Capture: {}x{}, region {:?}",
                frame.width(),
                frame.height(),
                created.current_rect()
            );
            for earlier in 0..=index {
                apply_moves(&created, &cli.moves, earlier);
            }
            region = Some(created);
        }
        let Some(ref controller) = region else {
            continue;
        };

        if let Err(e) = controller.check_frame(frame.width(), frame.height()) {
            tracing::warn!("frame {index}: {e}; skipping");
            continue;
        }

        let roi = controller.current_rect();
        let result = detector
            .process_frame(&mut frame, roi, style)
            .with_context(|| format!("frame {index}"))?;
        report(cli.json, index, roi, &result)?;
        sink.write_frame(index, &frame)?;
        processed += 1;
    }

    tracing::info!("Processed {processed} frames");
    Ok(())
}

fn init_region(cli: &Cli, detector: &Detector, frame: &Frame) -> Result<RegionController> {
    let step = detector.config().roi_step;
    let region = match cli.roi {
        Some(rect) => RegionController::with_rect(frame.width(), frame.height(), step, rect),
        None => RegionController::new(frame.width(), frame.height(), step),
    };
    region.context("Failed to set up region of interest")
}

fn apply_moves(region: &RegionController, moves: &[ScheduledMove], index: usize) {
    for command in schedule::due(moves, index) {
        let before = region.current_rect();
        if region.apply_move(command) {
            tracing::debug!(
                "frame {index}: {command:?} moved region {before:?} -> {:?}",
                region.current_rect()
            );
        } else {
            tracing::debug!("frame {index}: {command:?} ignored at {before:?}");
        }
    }
}

/// Per-frame output on stdout.
fn report(json: bool, index: usize, roi: Rect, result: &CycleResult) -> Result<()> {
    if json {
        let line = serde_json::json!({
            "frame": index,
            "roi": roi,
            "labels": result.labels().collect::<Vec<_>>(),
            "stats": result.stats,
        });
        println!("{}", serde_json::to_string(&line)?);
    } else {
        let labels: Vec<String> = result.labels().collect();
        println!(
            "frame {index:>5}: {} contours, {} polygons, {} labeled{}{}",
            result.stats.contours_found,
            result.stats.polygons,
            result.stats.labeled,
            if labels.is_empty() { "" } else { ": " },
            labels.join(", ")
        );
    }
    Ok(())
}
