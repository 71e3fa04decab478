//! Courtside Media
//!
//! The collaborators at the edges of the analysis pipeline:
//! - **Video:** Read a clip as an ordered frame sequence with its frame
//!   rate, and write frame sequences back at the same rate
//! - **Detector:** Per-frame object bounding boxes, optionally cached per
//!   session or loaded from a precomputed file

pub mod detector;
pub mod video;

pub use detector::{CachedDetector, Detector, PrecomputedDetector};
pub use video::{FrameDirectory, VideoClip, VideoIo};
