//! Object detector adapters.
//!
//! Detection itself is an external capability. This module defines the
//! contract the pipeline calls and two adapters around it: a cache that
//! skips recomputation for a session seen before, and a detector that
//! serves boxes produced offline by an external model.

use std::path::{Path, PathBuf};

use courtside_common::{CourtsideError, CourtsideResult};
use courtside_court_model::{DetectionCache, FrameDetections};
use image::RgbImage;

/// File name of a cached detection set.
pub const DETECTIONS_FILE: &str = "detections.json";

/// A frame to detect on, with its index in the source clip.
pub type IndexedFrame<'a> = (usize, &'a RgbImage);

/// Per-frame object detection.
pub trait Detector {
    /// Boxes for one frame, keyed by object id.
    fn detect(&mut self, frame_index: usize, frame: &RgbImage) -> CourtsideResult<FrameDetections>;

    /// Boxes for a sequence of frames, in order.
    fn detect_all(&mut self, frames: &[IndexedFrame<'_>]) -> CourtsideResult<Vec<FrameDetections>> {
        frames
            .iter()
            .map(|(index, frame)| self.detect(*index, frame))
            .collect()
    }

    /// Detector name for logs.
    fn name(&self) -> &str;
}

impl<D: Detector + ?Sized> Detector for &mut D {
    fn detect(&mut self, frame_index: usize, frame: &RgbImage) -> CourtsideResult<FrameDetections> {
        (**self).detect(frame_index, frame)
    }

    fn detect_all(&mut self, frames: &[IndexedFrame<'_>]) -> CourtsideResult<Vec<FrameDetections>> {
        (**self).detect_all(frames)
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

/// Wraps a detector with an on-disk cache keyed by a stable identifier.
///
/// Only batch detection is cached; single-frame calls go straight to the
/// inner detector.
pub struct CachedDetector<D> {
    inner: D,
    cache_key: String,
    cache_path: PathBuf,
}

impl<D: Detector> CachedDetector<D> {
    /// Cache under `cache_dir/<cache_key>/detections.json`.
    pub fn new(inner: D, cache_dir: &Path, cache_key: impl Into<String>) -> Self {
        let cache_key = cache_key.into();
        let cache_path = cache_dir.join(&cache_key).join(DETECTIONS_FILE);
        Self {
            inner,
            cache_key,
            cache_path,
        }
    }

    pub fn cache_path(&self) -> &Path {
        &self.cache_path
    }

    pub fn into_inner(self) -> D {
        self.inner
    }

    fn load_cached(&self, frame_count: usize) -> Option<Vec<FrameDetections>> {
        if !self.cache_path.exists() {
            return None;
        }
        match DetectionCache::load(&self.cache_path) {
            Ok(cache) if cache.session_id == self.cache_key && cache.frame_count == frame_count => {
                Some(cache.to_frames())
            }
            Ok(cache) => {
                tracing::warn!(
                    path = %self.cache_path.display(),
                    cached_frames = cache.frame_count,
                    frame_count,
                    "Detection cache does not match, recomputing"
                );
                None
            }
            Err(e) => {
                tracing::warn!(
                    path = %self.cache_path.display(),
                    "Failed to read detection cache, recomputing: {}",
                    e
                );
                None
            }
        }
    }
}

impl<D: Detector> Detector for CachedDetector<D> {
    fn detect(&mut self, frame_index: usize, frame: &RgbImage) -> CourtsideResult<FrameDetections> {
        self.inner.detect(frame_index, frame)
    }

    fn detect_all(&mut self, frames: &[IndexedFrame<'_>]) -> CourtsideResult<Vec<FrameDetections>> {
        if let Some(cached) = self.load_cached(frames.len()) {
            tracing::info!(
                path = %self.cache_path.display(),
                frames = cached.len(),
                "Using cached detections"
            );
            return Ok(cached);
        }

        tracing::info!(
            detector = self.inner.name(),
            frames = frames.len(),
            "Running detection"
        );
        let detections = self.inner.detect_all(frames)?;
        DetectionCache::new(self.cache_key.clone(), &detections)
            .save(&self.cache_path)
            .map_err(|e| CourtsideError::output(e.to_string()))?;
        Ok(detections)
    }

    fn name(&self) -> &str {
        self.inner.name()
    }
}

/// Serves detections computed offline, indexed by source frame.
#[derive(Debug, Clone)]
pub struct PrecomputedDetector {
    cache: DetectionCache,
}

impl PrecomputedDetector {
    pub fn new(cache: DetectionCache) -> Self {
        Self { cache }
    }

    /// Load a detection file in cache format.
    pub fn from_file(path: &Path) -> CourtsideResult<Self> {
        let cache = DetectionCache::load(path).map_err(|e| {
            CourtsideError::detection(format!("cannot load detections {}: {e}", path.display()))
        })?;
        Ok(Self::new(cache))
    }

    pub fn frame_count(&self) -> usize {
        self.cache.frame_count
    }
}

impl Detector for PrecomputedDetector {
    fn detect(&mut self, frame_index: usize, _frame: &RgbImage) -> CourtsideResult<FrameDetections> {
        if frame_index >= self.cache.frame_count {
            return Err(CourtsideError::detection(format!(
                "no precomputed detections for frame {frame_index} ({} frames available)",
                self.cache.frame_count
            )));
        }
        Ok(self.cache.frames.get(&frame_index).cloned().unwrap_or_default())
    }

    fn name(&self) -> &str {
        "precomputed"
    }
}
