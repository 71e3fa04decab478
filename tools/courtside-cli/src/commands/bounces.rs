//! Detect bounces in a detection file.

use std::path::PathBuf;

use courtside_common::AppConfig;
use courtside_court_model::{DetectionCache, ObservationSequence};
use courtside_processing_core::TrajectoryReconstructor;

pub fn run(
    config: AppConfig,
    detections: PathBuf,
    object_id: Option<u32>,
    window: Option<usize>,
    spacing: Option<usize>,
) -> anyhow::Result<()> {
    let mut trajectory = config.analysis.trajectory;
    if let Some(id) = object_id {
        trajectory.tracked_object_id = id;
    }
    if let Some(window) = window {
        trajectory.rolling_window = window;
    }
    if let Some(spacing) = spacing {
        trajectory.min_peak_spacing = spacing;
    }
    if trajectory.rolling_window == 0 || trajectory.min_peak_spacing == 0 {
        anyhow::bail!("--window and --spacing must be at least 1");
    }

    let cache = DetectionCache::load(&detections)
        .map_err(|e| anyhow::anyhow!("Failed to load detections: {e}"))?;
    let sequence =
        ObservationSequence::from_detections(&cache.to_frames(), trajectory.tracked_object_id);
    println!(
        "Object {}: observed in {} of {} frames",
        sequence.object_id,
        sequence.observed_count(),
        sequence.len()
    );

    let reconstruction = TrajectoryReconstructor::new(&trajectory).reconstruct(&sequence);
    if reconstruction.trajectory.boxes().is_none() {
        println!("  Object never observed; no bounces.");
        return Ok(());
    }

    println!(
        "Bounces (window {}, spacing {}):",
        trajectory.rolling_window, trajectory.min_peak_spacing
    );
    for (frame, point) in reconstruction.contact_points() {
        println!("  frame {frame:>6}  contact ({:8.1}, {:8.1})", point.x, point.y);
    }
    println!("\n{} bounce(s).", reconstruction.bounces.len());

    Ok(())
}
