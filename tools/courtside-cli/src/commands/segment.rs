//! Split a clip into in-play intervals.

use std::path::PathBuf;

use courtside_common::{AppConfig, FrameTiming};
use courtside_match_engine::segment_clip;
use courtside_vision::CourtCalibrator;

use super::{read_clip, with_calibration_mode};

pub fn run(config: AppConfig, clip: PathBuf, manual: bool) -> anyhow::Result<()> {
    config.analysis.validate()?;
    let clip = read_clip(&clip)?;
    let frame = clip
        .frames
        .first()
        .ok_or_else(|| anyhow::anyhow!("Clip has no frames"))?;

    let calibrator = CourtCalibrator::new(&config.analysis);
    let calibration = with_calibration_mode(manual, |mode| calibrator.calibrate(frame, mode))?;

    let seg_config = &config.analysis.segmentation;
    let (_, segmentation) = segment_clip(&clip.frames, &calibration, seg_config);
    let timing = FrameTiming::new(clip.fps);

    match seg_config.release_threshold {
        Some(release) => println!(
            "Threshold: {} (release {release}, dual-threshold)",
            seg_config.similarity_threshold
        ),
        None => println!("Threshold: {}", seg_config.similarity_threshold),
    }
    println!("Intervals:");
    if segmentation.intervals.is_empty() {
        println!("  (none)");
    }
    for interval in &segmentation.intervals {
        println!(
            "  frames {:>6} - {:<6} {:>8.2}s - {:<8.2}s ({} frames, {:.2}s)",
            interval.start_frame,
            interval.end_frame,
            timing.frame_to_secs(interval.start_frame),
            timing.frame_to_secs(interval.end_frame),
            interval.len(),
            timing.span_secs(interval.start_frame, interval.end_frame)
        );
    }
    println!(
        "\n{} of {} frames in play.",
        segmentation.action_frame_count(),
        clip.len()
    );

    Ok(())
}
