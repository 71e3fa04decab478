//! Calibrate the court on the first frame of a clip.

use std::path::PathBuf;

use courtside_common::AppConfig;
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

    println!("Calibration ({}):", calibration.mode);
    let labels = ["top-left", "top-right", "bottom-right", "bottom-left"];
    for (label, p) in labels.iter().zip(calibration.corners.points()) {
        println!("  {label:<13} ({:8.1}, {:8.1})", p.x, p.y);
    }

    println!("Homography (screen -> court meters):");
    for row in calibration.homography.matrix() {
        println!("  [{:>12.6} {:>12.6} {:>12.6}]", row[0], row[1], row[2]);
    }

    let (width, height) = calibration.rectifier.size();
    println!("Rectified view: {width}x{height}");

    Ok(())
}
