pub mod analyze;
pub mod bounces;
pub mod calibrate;
pub mod info;
pub mod segment;

use std::path::Path;

use courtside_media::{FrameDirectory, VideoClip, VideoIo};
use courtside_vision::{CalibrationMode, StdinCornerPicker};

/// Run `f` with manual (terminal picker) or automatic calibration.
pub fn with_calibration_mode<T>(manual: bool, f: impl FnOnce(CalibrationMode<'_>) -> T) -> T {
    if manual {
        let mut picker = StdinCornerPicker::stdin();
        f(CalibrationMode::Manual(&mut picker))
    } else {
        f(CalibrationMode::Automatic)
    }
}

pub fn read_clip(path: &Path) -> anyhow::Result<VideoClip> {
    let clip = FrameDirectory.read_all(path)?;
    println!(
        "Clip: {} ({} frames @ {}fps)",
        path.display(),
        clip.len(),
        clip.fps
    );
    Ok(clip)
}
