//! Barcode overlay replay tool.
//!
//! Runs a recorded session (head poses plus decoder messages, one frame per
//! line) through the overlay pipeline with a headless renderer and prints
//! what the viewer would have seen.
//!
//! # Commands
//!
//! - `overlay-replay replay <RECORDING>` - replay a session
//! - `overlay-replay catalog` - list the products the overlay knows

mod recording;
mod renderer;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use barcode_overlay::{FrameInput, OverlayConfig, OverlayPipeline, TickReport};
use clap::{Parser, Subcommand, ValueEnum};
use overlay_catalog::{PreferenceSet, PreferenceTag, ProductCatalog};
use sensor_types::{FrameSize, Timestamp};
use serde::Serialize;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::recording::RecordedFrame;
use crate::renderer::HeadlessRenderer;

/// Replays recorded barcode sessions through the overlay.
#[derive(Parser)]
#[command(name = "overlay-replay")]
#[command(about = "Replay recorded barcode sessions through the overlay", long_about = None)]
#[command(version)]
struct Cli {
    /// Log filter, e.g. "info" or "barcode_overlay=debug"
    #[arg(long, global = true, default_value = "warn", env = "OVERLAY_LOG")]
    log: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay a JSON-lines recording
    Replay {
        /// Recording file, one frame per line
        #[arg(name = "RECORDING")]
        recording: PathBuf,

        /// Overlay config JSON (defaults used when omitted)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Product catalog JSON (built-in table when omitted)
        #[arg(long)]
        catalog: Option<PathBuf>,

        /// Dietary warnings to enable, overriding the config
        #[arg(long = "avoid", value_enum)]
        avoid: Vec<Avoid>,

        /// Capture frame width in pixels
        #[arg(long, default_value_t = 1280)]
        width: u32,

        /// Capture frame height in pixels
        #[arg(long, default_value_t = 960)]
        height: u32,

        /// Output format
        #[arg(long, value_enum, default_value_t = Format::Pretty)]
        format: Format,
    },

    /// List catalog products
    Catalog {
        /// Product catalog JSON (built-in table when omitted)
        #[arg(long)]
        catalog: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Avoid {
    Gluten,
    Lactose,
    Meat,
}

impl From<Avoid> for PreferenceTag {
    fn from(avoid: Avoid) -> Self {
        match avoid {
            Avoid::Gluten => Self::Gluten,
            Avoid::Lactose => Self::Lactose,
            Avoid::Meat => Self::Meat,
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Pretty,
    Json,
}

/// Per-frame output line.
#[derive(Debug, Serialize)]
struct FrameSummary {
    t: f64,
    fresh: bool,
    tracked: usize,
    known: Vec<String>,
    visible: Vec<VisibleIndicator>,
}

#[derive(Debug, Serialize)]
struct VisibleIndicator {
    handle: u64,
    position: [f32; 3],
    label: String,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.log)?;

    match cli.command {
        Commands::Replay {
            recording,
            config,
            catalog,
            avoid,
            width,
            height,
            format,
        } => replay(&ReplayArgs {
            recording,
            config,
            catalog,
            avoid,
            frame: FrameSize::new(width, height),
            format,
        }),
        Commands::Catalog { catalog } => list_catalog(catalog.as_deref()),
    }
}

fn init_tracing(filter: &str) -> Result<()> {
    let filter = EnvFilter::try_new(filter).with_context(|| format!("invalid log filter {filter:?}"))?;
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
    Ok(())
}

struct ReplayArgs {
    recording: PathBuf,
    config: Option<PathBuf>,
    catalog: Option<PathBuf>,
    avoid: Vec<Avoid>,
    frame: FrameSize,
    format: Format,
}

fn load_catalog(path: Option<&Path>) -> Result<ProductCatalog> {
    match path {
        Some(path) => ProductCatalog::from_json_file(path)
            .with_context(|| format!("loading catalog {}", path.display())),
        None => Ok(ProductCatalog::builtin()),
    }
}

fn replay(args: &ReplayArgs) -> Result<()> {
    let mut config = match &args.config {
        Some(path) => OverlayConfig::from_json_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => OverlayConfig::default(),
    };
    if !args.avoid.is_empty() {
        config.preferences = PreferenceSet::from_tags(args.avoid.iter().copied().map(PreferenceTag::from));
    }

    let catalog = Arc::new(load_catalog(args.catalog.as_deref())?);
    let frames = recording::load(&args.recording)?;
    info!(frames = frames.len(), products = catalog.len(), "Starting replay");

    let summaries = run(&config, catalog, &frames, args.frame)?;
    for summary in &summaries {
        match args.format {
            Format::Pretty => print_pretty(summary),
            Format::Json => println!("{}", serde_json::to_string(summary)?),
        }
    }
    Ok(())
}

/// Drives the pipeline through every recorded frame.
fn run(
    config: &OverlayConfig,
    catalog: Arc<ProductCatalog>,
    frames: &[RecordedFrame],
    frame_size: FrameSize,
) -> Result<Vec<FrameSummary>> {
    let mut history = config.pose_history.build()?;
    let mut pipeline = OverlayPipeline::new(config, catalog, HeadlessRenderer::default())?;
    let mailbox = pipeline.mailbox();

    let mut summaries = Vec::with_capacity(frames.len());
    for frame in frames {
        let now = Timestamp::from_nanos(frame.t_ns);
        if let Err(e) = history.record(now.as_secs_f64(), frame.head) {
            warn!(error = %e, t_ns = frame.t_ns, "Skipping head pose");
        }
        if let Some(payload) = frame.payload_json() {
            mailbox.post(payload);
        }

        let input = FrameInput {
            now,
            viewer: frame.head,
            frame: frame_size,
        };
        let report = pipeline.tick(&input, &history);
        let partial = summarize_report(now, &report);
        summaries.push(with_visible(partial, pipeline.indicators().renderer()));
    }
    pipeline.shutdown();
    Ok(summaries)
}

fn summarize_report(now: Timestamp, report: &TickReport<'_>) -> FrameSummary {
    FrameSummary {
        t: now.as_secs_f64(),
        fresh: report.fresh_batch,
        tracked: report.tracked.len(),
        known: report
            .known_products
            .iter()
            .map(|sighting| sighting.product.name.clone())
            .collect(),
        visible: Vec::new(),
    }
}

fn with_visible(mut summary: FrameSummary, renderer: &HeadlessRenderer) -> FrameSummary {
    summary.visible = renderer
        .visible()
        .map(|(handle, view)| VisibleIndicator {
            handle: handle.id(),
            position: view.position.to_array(),
            label: view.label.to_string(),
        })
        .collect();
    summary
}

fn print_pretty(summary: &FrameSummary) {
    println!(
        "t={:>8.3}s tracked={} visible={}{}",
        summary.t,
        summary.tracked,
        summary.visible.len(),
        if summary.fresh { " (new batch)" } else { "" }
    );
    for name in &summary.known {
        println!("  sighted: {name}");
    }
    for indicator in &summary.visible {
        let [x, y, z] = indicator.position;
        println!("  #{} at ({x:.3}, {y:.3}, {z:.3})", indicator.handle);
        for line in indicator.label.lines() {
            println!("      {line}");
        }
    }
}

fn list_catalog(path: Option<&Path>) -> Result<()> {
    let catalog = load_catalog(path)?;
    let mut products: Vec<_> = catalog.iter().collect();
    products.sort_by(|a, b| a.id.cmp(&b.id));
    for product in products {
        println!("{:<14} {:<28} {:>8}", product.id, product.name, product.formatted_price());
    }
    Ok(())
}
