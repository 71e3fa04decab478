//! Courtside CLI — Command-line interface for match clip analysis.
//!
//! Usage:
//!   courtside analyze <CLIP>      Full analysis: intervals, bounces, overlay
//!   courtside calibrate <CLIP>    Find the court corners on the first frame
//!   courtside segment <CLIP>      Print in-play intervals
//!   courtside bounces <FILE>      Bounces from a detection file
//!   courtside info <DIR>          Summarize an analysis report

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use courtside_common::{AppConfig, LoggingConfig, TrailingPolicy};

mod commands;

#[derive(Parser)]
#[command(
    name = "courtside",
    about = "Court calibration, play segmentation and bounce detection for match clips",
    version,
    author
)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Configuration file (defaults to the user config location)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Segmentation overrides shared by commands that segment a clip.
#[derive(Args, Debug, Clone)]
struct SegmentationArgs {
    /// Similarity above which a frame is in play
    #[arg(long)]
    threshold: Option<f64>,

    /// Lower threshold for staying in play (dual-threshold mode)
    #[arg(long)]
    release: Option<f64>,

    /// Discard an interval still open at the end of the clip
    #[arg(long)]
    drop_trailing: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze a clip end to end
    Analyze {
        /// Clip directory (frames/ + clip.json)
        clip: PathBuf,

        /// Precomputed detections for the clip's frames
        #[arg(short, long)]
        detections: PathBuf,

        /// Output directory
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Select the court corners by hand instead of detecting them
        #[arg(long)]
        manual: bool,

        /// Do not read or write the detection cache
        #[arg(long)]
        no_cache: bool,

        #[command(flatten)]
        segmentation: SegmentationArgs,
    },

    /// Calibrate the court on the first frame of a clip
    Calibrate {
        /// Clip directory
        clip: PathBuf,

        /// Select the court corners by hand instead of detecting them
        #[arg(long)]
        manual: bool,
    },

    /// Split a clip into in-play intervals
    Segment {
        /// Clip directory
        clip: PathBuf,

        /// Select the court corners by hand instead of detecting them
        #[arg(long)]
        manual: bool,

        #[command(flatten)]
        segmentation: SegmentationArgs,
    },

    /// Detect bounces in a detection file
    Bounces {
        /// Detection file (detections.json format)
        detections: PathBuf,

        /// Object id of the ball
        #[arg(long)]
        object_id: Option<u32>,

        /// Rolling-mean window over the vertical midpoint
        #[arg(long)]
        window: Option<usize>,

        /// Minimum frame distance between bounces
        #[arg(long)]
        spacing: Option<usize>,
    },

    /// Show an analysis report
    Info {
        /// Output directory containing report.json
        path: PathBuf,

        /// Print the raw report JSON
        #[arg(long)]
        json: bool,
    },
}

impl SegmentationArgs {
    fn apply(&self, config: &mut AppConfig) {
        let segmentation = &mut config.analysis.segmentation;
        if let Some(threshold) = self.threshold {
            segmentation.similarity_threshold = threshold;
        }
        if self.release.is_some() {
            segmentation.release_threshold = self.release;
        }
        if self.drop_trailing {
            segmentation.trailing = TrailingPolicy::Drop;
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => AppConfig::load_from(path)?,
        None => AppConfig::load(),
    };

    // Initialize logging
    let level = if cli.verbose {
        "debug".to_string()
    } else {
        config.logging.level.clone()
    };
    courtside_common::logging::init_logging(&LoggingConfig {
        level,
        json: config.logging.json,
    });

    let result = match cli.command {
        Commands::Analyze {
            clip,
            detections,
            output,
            manual,
            no_cache,
            segmentation,
        } => {
            segmentation.apply(&mut config);
            commands::analyze::run(config, clip, detections, output, manual, no_cache)
        }
        Commands::Calibrate { clip, manual } => commands::calibrate::run(config, clip, manual),
        Commands::Segment {
            clip,
            manual,
            segmentation,
        } => {
            segmentation.apply(&mut config);
            commands::segment::run(config, clip, manual)
        }
        Commands::Bounces {
            detections,
            object_id,
            window,
            spacing,
        } => commands::bounces::run(config, detections, object_id, window, spacing),
        Commands::Info { path, json } => commands::info::run(path, json),
    };

    if let Err(e) = &result {
        tracing::error!("{e:#}");
    }
    result
}
