//! Courtside Court Model
//!
//! Defines the core data contracts of a match analysis session:
//! - **Geometry:** Screen/court/canvas points and the four court corners
//! - **Detections:** Per-frame bounding boxes, observation sequences,
//!   reconstructed trajectories, and the persisted detection cache
//! - **Intervals:** In-play frame ranges produced by segmentation
//! - **Report:** The persisted summary of one analyzed match
//!
//! Screen coordinates are source-frame pixels with `y` growing downward.
//! Court coordinates are meters from the top-left court corner.

pub mod detection;
pub mod error;
pub mod geometry;
pub mod interval;
pub mod report;

pub use detection::*;
pub use error::*;
pub use geometry::*;
pub use interval::*;
pub use report::*;
