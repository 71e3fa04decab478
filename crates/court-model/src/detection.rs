//! Detector output and the per-object sequences derived from it.
//!
//! Detections are keyed by a small integer object id. The ball is
//! conventionally id 1; other ids (players) pass through untouched.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ModelError;
use crate::geometry::Point2D;

/// Identifier of a tracked object within detector output.
pub type ObjectId = u32;

/// Axis-aligned box in screen pixels: `(x1, y1)` top-left, `(x2, y2)` bottom-right.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
}

impl BoundingBox {
    pub fn new(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// The four scalars in `[x1, y1, x2, y2]` order.
    pub fn to_array(&self) -> [f64; 4] {
        [self.x1, self.y1, self.x2, self.y2]
    }

    pub fn from_array(values: [f64; 4]) -> Self {
        Self::new(values[0], values[1], values[2], values[3])
    }

    /// Vertical midpoint `(y1 + y2) / 2`.
    pub fn mid_y(&self) -> f64 {
        (self.y1 + self.y2) / 2.0
    }

    /// Horizontal center.
    pub fn center_x(&self) -> f64 {
        (self.x1 + self.x2) / 2.0
    }

    /// Bottom-center point, where a ball touches the ground.
    pub fn contact_point(&self) -> Point2D {
        Point2D::new(self.center_x(), self.y2)
    }
}

/// Detector output for a single frame.
pub type FrameDetections = BTreeMap<ObjectId, BoundingBox>;

/// Per-frame optional observations of one object.
#[derive(Debug, Clone, PartialEq)]
pub struct ObservationSequence {
    pub object_id: ObjectId,
    pub observations: Vec<Option<BoundingBox>>,
}

impl ObservationSequence {
    pub fn new(object_id: ObjectId, observations: Vec<Option<BoundingBox>>) -> Self {
        Self {
            object_id,
            observations,
        }
    }

    /// Extract one object's sequence from per-frame detector output.
    pub fn from_detections(detections: &[FrameDetections], object_id: ObjectId) -> Self {
        Self {
            object_id,
            observations: detections
                .iter()
                .map(|frame| frame.get(&object_id).copied())
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    /// Number of frames with an observation.
    pub fn observed_count(&self) -> usize {
        self.observations.iter().filter(|o| o.is_some()).count()
    }
}

/// A gap-filled trajectory with one entry per input frame.
///
/// An object that was never observed has no meaningful positions; that
/// case is represented explicitly instead of with interpolated values.
#[derive(Debug, Clone, PartialEq)]
pub enum ReconstructedTrajectory {
    /// Every frame has a box.
    Complete {
        object_id: ObjectId,
        boxes: Vec<BoundingBox>,
    },
    /// The object never appeared; every entry is undefined.
    Unobserved { object_id: ObjectId, len: usize },
}

impl ReconstructedTrajectory {
    pub fn object_id(&self) -> ObjectId {
        match self {
            Self::Complete { object_id, .. } | Self::Unobserved { object_id, .. } => *object_id,
        }
    }

    /// Number of frames covered; equals the source sequence length.
    pub fn len(&self) -> usize {
        match self {
            Self::Complete { boxes, .. } => boxes.len(),
            Self::Unobserved { len, .. } => *len,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Box at a frame; `None` if out of range or the object was never seen.
    pub fn get(&self, frame_index: usize) -> Option<&BoundingBox> {
        match self {
            Self::Complete { boxes, .. } => boxes.get(frame_index),
            Self::Unobserved { .. } => None,
        }
    }

    /// All boxes, when defined.
    pub fn boxes(&self) -> Option<&[BoundingBox]> {
        match self {
            Self::Complete { boxes, .. } => Some(boxes),
            Self::Unobserved { .. } => None,
        }
    }

    /// View as an observation sequence (fully observed or fully absent).
    pub fn to_observations(&self) -> ObservationSequence {
        let observations = match self {
            Self::Complete { boxes, .. } => boxes.iter().copied().map(Some).collect(),
            Self::Unobserved { len, .. } => vec![None; *len],
        };
        ObservationSequence::new(self.object_id(), observations)
    }
}

/// Persisted detector output (`detections.json`), keyed by frame index.
///
/// Frames with no detections may be omitted; readers treat them as empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionCache {
    /// Schema version.
    pub version: String,

    /// Stable identifier of the video/session the detections belong to.
    pub session_id: String,

    /// Number of frames the detector saw.
    pub frame_count: usize,

    /// Frame index → object id → box.
    pub frames: BTreeMap<usize, FrameDetections>,
}

impl DetectionCache {
    pub fn new(session_id: impl Into<String>, detections: &[FrameDetections]) -> Self {
        Self {
            version: "1.0".to_string(),
            session_id: session_id.into(),
            frame_count: detections.len(),
            frames: detections
                .iter()
                .enumerate()
                .filter(|(_, d)| !d.is_empty())
                .map(|(i, d)| (i, d.clone()))
                .collect(),
        }
    }

    /// Expand into one entry per frame.
    pub fn to_frames(&self) -> Vec<FrameDetections> {
        (0..self.frame_count)
            .map(|i| self.frames.get(&i).cloned().unwrap_or_default())
            .collect()
    }

    /// Read a cache file.
    pub fn load(path: &Path) -> Result<Self, ModelError> {
        let content = std::fs::read_to_string(path).map_err(|e| ModelError::IoError {
            path: path.to_path_buf(),
            source: e,
        })?;
        let cache: Self = serde_json::from_str(&content).map_err(|e| ModelError::ParseError {
            path: path.to_path_buf(),
            source: e,
        })?;
        if let Some((&last, _)) = cache.frames.iter().next_back() {
            if last >= cache.frame_count {
                return Err(ModelError::Validation {
                    message: format!(
                        "frame index {last} out of range for {} frames",
                        cache.frame_count
                    ),
                });
            }
        }
        Ok(cache)
    }

    /// Write the cache file, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<(), ModelError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ModelError::IoError {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }
        let json = serde_json::to_string(self).map_err(|e| ModelError::ParseError {
            path: path.to_path_buf(),
            source: e,
        })?;
        std::fs::write(path, json).map_err(|e| ModelError::IoError {
            path: path.to_path_buf(),
            source: e,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_detections() -> Vec<FrameDetections> {
        vec![
            FrameDetections::from([(1, BoundingBox::new(10.0, 20.0, 14.0, 24.0))]),
            FrameDetections::new(),
            FrameDetections::from([
                (1, BoundingBox::new(12.5, 30.25, 16.5, 34.25)),
                (2, BoundingBox::new(100.0, 200.0, 140.0, 320.0)),
            ]),
        ]
    }

    #[test]
    fn test_observation_sequence_from_detections() {
        let seq = ObservationSequence::from_detections(&sample_detections(), 1);
        assert_eq!(seq.len(), 3);
        assert_eq!(seq.observed_count(), 2);
        assert!(seq.observations[1].is_none());
    }

    #[test]
    fn test_contact_point_is_bottom_center() {
        let b = BoundingBox::new(10.0, 20.0, 14.0, 30.0);
        assert_eq!(b.contact_point(), Point2D::new(12.0, 30.0));
        assert_eq!(b.mid_y(), 25.0);
    }

    #[test]
    fn test_unobserved_trajectory_has_no_boxes() {
        let t = ReconstructedTrajectory::Unobserved {
            object_id: 1,
            len: 4,
        };
        assert_eq!(t.len(), 4);
        assert!(t.get(0).is_none());
        assert!(t.boxes().is_none());
        assert_eq!(t.to_observations().observed_count(), 0);
    }

    #[test]
    fn test_detection_cache_round_trip() {
        let dir = std::env::temp_dir().join("courtside_test_detection_cache");
        let _ = std::fs::remove_dir_all(&dir);
        let path = dir.join("detections.json");

        let cache = DetectionCache::new("session-abc", &sample_detections());
        cache.save(&path).unwrap();
        let loaded = DetectionCache::load(&path).unwrap();

        assert_eq!(loaded, cache);
        assert_eq!(loaded.to_frames(), sample_detections());

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_detection_cache_rejects_out_of_range_frames() {
        let dir = std::env::temp_dir().join("courtside_test_detection_cache_range");
        let _ = std::fs::remove_dir_all(&dir);
        let path = dir.join("detections.json");

        let mut cache = DetectionCache::new("session", &sample_detections());
        cache.frame_count = 1;
        cache.save(&path).unwrap();

        assert!(matches!(
            DetectionCache::load(&path),
            Err(ModelError::Validation { .. })
        ));

        std::fs::remove_dir_all(&dir).ok();
    }
}
