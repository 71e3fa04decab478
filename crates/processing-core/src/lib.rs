//! Courtside Processing Core
//!
//! The algorithmic heart of match analysis:
//! - **Homography:** Solve and apply the screen ↔ court projective transform
//! - **Court Lines:** Turn line segments into four ordered court corners
//! - **Segmenter:** Split a similarity trace into in-play intervals
//! - **Trajectory:** Gap-fill observations and detect bounce events
//! - **Mapper:** Map screen points to court meters and canvas pixels
//!
//! This crate is pure computation: no I/O and no image decoding.
//! All inputs are data; all outputs are data.

pub mod court_lines;
pub mod homography;
pub mod mapper;
pub mod segmenter;
pub mod trajectory;

pub use court_lines::{find_court_corners, CornerSearch, LineSegment};
pub use homography::{compute_homography, Homography};
pub use mapper::{CanvasGeometry, CourtCoordinateMapper};
pub use segmenter::{segment_trace, ActionSegmenter, Segmentation};
pub use trajectory::{detect_events, gap_fill, Reconstruction, TrajectoryReconstructor};
