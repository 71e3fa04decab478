//! Match report: the persisted result of one analysis session.
//!
//! A report is written once, after every stage of the pipeline has
//! succeeded. It is never updated in place.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ModelError;
use crate::geometry::{CanvasPoint, CourtCorners, Point2D};
use crate::interval::ActionInterval;

/// File name of the report inside an output directory.
pub const REPORT_FILE: &str = "report.json";

/// Top-level report file (`report.json`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchReport {
    /// Schema version.
    pub version: String,

    /// Stable identifier of the analyzed video.
    pub session_id: String,

    /// Creation timestamp (RFC 3339).
    pub created_at: String,

    /// Source clip description.
    pub source: SourceInfo,

    /// Calibration used for the whole session.
    pub calibration: CalibrationRecord,

    /// Segmentation outcome.
    pub segmentation: SegmentationRecord,

    /// Detected bounces, ordered by frame.
    pub bounces: Vec<BounceRecord>,
}

/// Source clip metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceInfo {
    pub path: String,
    pub fps: f64,
    pub width: u32,
    pub height: u32,
    pub frame_count: usize,
}

/// Corners and homography fixed at session start.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalibrationRecord {
    /// How the corners were obtained ("manual" or "automatic").
    pub mode: String,
    pub corners: CourtCorners,
    /// Screen → court-meters matrix, row-major.
    pub homography: [[f64; 3]; 3],
}

/// In-play intervals with the similarity trace they came from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SegmentationRecord {
    pub threshold: f64,
    /// Frame index of `similarity_trace[0]`.
    pub trace_start_frame: usize,
    pub similarity_trace: Vec<f64>,
    pub intervals: Vec<IntervalRecord>,
    /// Number of frames inside any interval.
    pub action_frame_count: usize,
}

/// One in-play interval with its time span.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct IntervalRecord {
    #[serde(flatten)]
    pub interval: ActionInterval,
    pub start_secs: f64,
    pub end_secs: f64,
    /// Time covered by the interval, both end frames included.
    pub duration_secs: f64,
}

/// One bounce event in all three coordinate spaces.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct BounceRecord {
    /// Index within the in-play frame subset.
    pub frame_index: usize,
    /// Index within the source clip.
    pub source_frame: usize,
    pub screen: Point2D,
    pub court: Point2D,
    pub canvas: CanvasPoint,
}

impl MatchReport {
    /// Read `report.json` from an output directory.
    pub fn load(dir: impl AsRef<Path>) -> Result<Self, ModelError> {
        let path = dir.as_ref().join(REPORT_FILE);
        let content = std::fs::read_to_string(&path).map_err(|e| ModelError::IoError {
            path: path.clone(),
            source: e,
        })?;
        serde_json::from_str(&content).map_err(|e| ModelError::ParseError { path, source: e })
    }

    /// Write `report.json` into an output directory and return its path.
    pub fn save(&self, dir: impl AsRef<Path>) -> Result<PathBuf, ModelError> {
        let dir = dir.as_ref();
        std::fs::create_dir_all(dir).map_err(|e| ModelError::IoError {
            path: dir.to_path_buf(),
            source: e,
        })?;

        let path = dir.join(REPORT_FILE);
        let json = serde_json::to_string_pretty(self).map_err(|e| ModelError::ParseError {
            path: path.clone(),
            source: e,
        })?;
        std::fs::write(&path, json).map_err(|e| ModelError::IoError {
            path: path.clone(),
            source: e,
        })?;
        Ok(path)
    }

    /// Current time formatted for `created_at`.
    pub fn timestamp_now() -> String {
        chrono::Utc::now().to_rfc3339()
    }

    /// Total in-play duration in seconds.
    pub fn action_secs(&self) -> f64 {
        self.segmentation.action_frame_count as f64 / self.source.fps
    }
}

/// Stable session identifier for a clip, used to key detection caches.
///
/// FNV-1a over the source path, frame count and frame size, so the same
/// clip maps to the same cache across runs.
pub fn session_id(source: &str, frame_count: usize, width: u32, height: u32) -> String {
    format!("{:016x}", fnv1a_64(&format!("{source}|{frame_count}|{width}x{height}")))
}

/// Identifier of a frame selection within a session, used to key
/// detections computed on that selection only.
pub fn selection_id(session_id: &str, frames: &[usize]) -> String {
    let indices = frames
        .iter()
        .map(|f| f.to_string())
        .collect::<Vec<_>>()
        .join(",");
    format!("{session_id}-{:016x}", fnv1a_64(&indices))
}

fn fnv1a_64(input: &str) -> u64 {
    let mut hash: u64 = 0xcbf29ce484222325;
    for byte in input.as_bytes() {
        hash ^= *byte as u64;
        hash = hash.wrapping_mul(0x100000001b3);
    }
    hash
}
