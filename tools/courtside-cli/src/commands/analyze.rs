//! Analyze a match clip end to end.

use std::path::PathBuf;

use courtside_common::AppConfig;
use courtside_match_engine::{AnalysisJob, MatchPipeline};
use courtside_media::{FrameDirectory, PrecomputedDetector};

use super::with_calibration_mode;

pub fn run(
    config: AppConfig,
    clip: PathBuf,
    detections: PathBuf,
    output: Option<PathBuf>,
    manual: bool,
    no_cache: bool,
) -> anyhow::Result<()> {
    println!("Analyzing clip at: {}", clip.display());
    config.analysis.validate()?;

    let detector = PrecomputedDetector::from_file(&detections)?;
    println!(
        "  Loaded detections for {} frames from {}",
        detector.frame_count(),
        detections.display()
    );

    let job = AnalysisJob {
        input_path: clip,
        output_dir: output.unwrap_or_else(|| config.output_dir.clone()),
        cache_dir: (!no_cache).then(|| config.cache_dir.clone()),
    };

    let mut pipeline = MatchPipeline::new(FrameDirectory, detector, config.analysis).with_progress(
        Box::new(|p| tracing::debug!(stage = ?p.stage, progress = p.progress, "Progress")),
    );
    let outcome = with_calibration_mode(manual, |mode| pipeline.run(&job, mode))?;

    let report = &outcome.report;
    println!("  Calibration: {}", report.calibration.mode);
    println!(
        "  In play: {} interval(s), {} of {} frames ({:.1}s)",
        report.segmentation.intervals.len(),
        report.segmentation.action_frame_count,
        report.source.frame_count,
        report.action_secs()
    );
    println!("  Bounces: {}", report.bounces.len());
    for bounce in &report.bounces {
        println!(
            "    frame {:>6}  court ({:6.2}m, {:6.2}m)",
            bounce.source_frame, bounce.court.x, bounce.court.y
        );
    }
    println!();
    println!("  Filtered clip: {}", outcome.filtered_dir.display());
    println!("  Annotated clip: {}", outcome.annotated_dir.display());
    println!("  Report: {}", outcome.report_path.display());
    println!("\nAnalysis complete.");

    Ok(())
}
