//! Courtside Vision
//!
//! Image-level work for match analysis:
//! - **Line mask:** Isolate bright court markings and clean up speckle
//! - **Segments:** Extract straight line segments from the marking edges
//! - **Calibrate:** Obtain court corners (manual or automatic) and rectify frames
//! - **Similarity:** Compare rectified frames by hue/saturation distribution
//! - **Picker:** Interactive four-corner selection contract

pub mod calibrate;
pub mod line_mask;
pub mod picker;
pub mod segments;
pub mod similarity;

pub use calibrate::{Calibration, CalibrationMode, CourtCalibrator};
pub use picker::{CornerPicker, PickerSession, ScriptedCornerPicker, StdinCornerPicker};
pub use similarity::{frame_similarity, HueSaturationHistogram};
