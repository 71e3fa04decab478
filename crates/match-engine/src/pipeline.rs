//! Batch match analysis.
//!
//! One run reads the whole clip, calibrates on the first frame, splits
//! the clip into in-play intervals, reconstructs the ball trajectory on
//! the in-play frames, and writes the filtered clip, the annotated clip
//! and `report.json`. Outputs are written only after every stage has
//! succeeded.

use std::path::{Path, PathBuf};

use courtside_common::{AnalysisConfig, CourtsideError, CourtsideResult, FrameTiming, SegmentationConfig};
use courtside_court_model::{
    selection_id, session_id, BounceRecord, CalibrationRecord, CanvasPoint, FrameDetections,
    IntervalRecord, MatchReport, ObservationSequence, REPORT_FILE, SegmentationRecord, SourceInfo,
};
use courtside_media::detector::IndexedFrame;
use courtside_media::{CachedDetector, Detector, VideoIo};
use courtside_processing_core::{
    segment_trace, CanvasGeometry, CourtCoordinateMapper, Reconstruction, Segmentation,
    TrajectoryReconstructor,
};
use courtside_vision::{frame_similarity, Calibration, CalibrationMode, CourtCalibrator, HueSaturationHistogram};
use image::RgbImage;
use rayon::prelude::*;

use crate::overlay::MiniCourt;

/// Output subdirectory holding the in-play frames only.
pub const FILTERED_CLIP: &str = "filtered";

/// Output subdirectory holding the annotated in-play frames.
pub const ANNOTATED_CLIP: &str = "annotated";

/// Scratch directory inside the output directory while writing.
const STAGING_DIR: &str = ".staging";

/// A match analysis ready to run.
#[derive(Debug, Clone)]
pub struct AnalysisJob {
    /// Source clip.
    pub input_path: PathBuf,

    /// Directory receiving the clips and `report.json`.
    pub output_dir: PathBuf,

    /// Detection cache root. `None` disables caching.
    pub cache_dir: Option<PathBuf>,
}

/// Progress callback for analysis runs.
pub type ProgressCallback = Box<dyn Fn(AnalysisProgress) + Send>;

/// Analysis progress report.
#[derive(Debug, Clone)]
pub struct AnalysisProgress {
    /// Current progress [0.0, 1.0].
    pub progress: f64,

    /// Current stage.
    pub stage: AnalysisStage,
}

/// Stages of an analysis run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalysisStage {
    Reading,
    Calibrating,
    Segmenting,
    Detecting,
    Reconstructing,
    Rendering,
    Writing,
    Complete,
    Failed,
}

impl AnalysisStage {
    fn progress(self) -> f64 {
        match self {
            Self::Reading => 0.0,
            Self::Calibrating => 0.1,
            Self::Segmenting => 0.2,
            Self::Detecting => 0.5,
            Self::Reconstructing => 0.7,
            Self::Rendering => 0.75,
            Self::Writing => 0.9,
            Self::Complete | Self::Failed => 1.0,
        }
    }
}

/// What a successful run produced.
#[derive(Debug, Clone)]
pub struct AnalysisOutcome {
    pub report: MatchReport,
    pub report_path: PathBuf,
    pub filtered_dir: PathBuf,
    pub annotated_dir: PathBuf,
}

/// Everything computed before outputs are written.
#[derive(Debug, Clone)]
pub struct MatchAnalysis {
    pub report: MatchReport,
    pub filtered: Vec<RgbImage>,
    pub annotated: Vec<RgbImage>,
    pub fps: f64,
}

/// Similarity of every frame after the first to the calibrated reference.
///
/// `trace[k]` belongs to frame `k + 1`. Frames are rectified and compared
/// in parallel; the order of the result follows the clip.
pub fn similarity_trace(
    frames: &[RgbImage],
    calibration: &Calibration,
    config: &SegmentationConfig,
) -> Vec<f64> {
    let reference =
        HueSaturationHistogram::from_image(&calibration.reference, config.hue_bins, config.saturation_bins)
            .normalized();
    frames
        .get(1..)
        .unwrap_or_default()
        .par_iter()
        .map(|frame| frame_similarity(&reference, &calibration.rectifier.rectify(frame)))
        .collect()
}

/// Segment a clip against its calibration. Interval bounds are clip frame indices.
pub fn segment_clip(
    frames: &[RgbImage],
    calibration: &Calibration,
    config: &SegmentationConfig,
) -> (Vec<f64>, Segmentation) {
    let trace = similarity_trace(frames, calibration, config);
    let segmentation = segment_trace(&trace, config, 1);
    (trace, segmentation)
}

/// Map each bounce contact point into court meters and canvas pixels.
///
/// `source_frames[k]` is the clip frame of trajectory entry `k`. Bounces
/// whose contact point maps onto the horizon are skipped.
pub fn bounce_records(
    reconstruction: &Reconstruction,
    mapper: &CourtCoordinateMapper,
    source_frames: &[usize],
) -> Vec<BounceRecord> {
    reconstruction
        .contact_points()
        .into_iter()
        .filter_map(|(frame_index, screen)| {
            let Some(court) = mapper.screen_to_court(screen) else {
                tracing::warn!(frame_index, ?screen, "Bounce does not map onto the court plane");
                return None;
            };
            Some(BounceRecord {
                frame_index,
                source_frame: source_frames.get(frame_index).copied().unwrap_or(frame_index),
                screen,
                court,
                canvas: mapper.court_to_canvas(court),
            })
        })
        .collect()
}

/// Replace the outputs in `output_dir` with the staged ones.
fn promote(staging: &Path, output_dir: &Path) -> CourtsideResult<()> {
    for name in [FILTERED_CLIP, ANNOTATED_CLIP, REPORT_FILE] {
        let target = output_dir.join(name);
        if target.is_dir() {
            std::fs::remove_dir_all(&target)?;
        } else if target.exists() {
            std::fs::remove_file(&target)?;
        }
        std::fs::rename(staging.join(name), &target).map_err(|e| {
            CourtsideError::output(format!("cannot move {name} into {}: {e}", output_dir.display()))
        })?;
    }
    std::fs::remove_dir(staging)?;
    Ok(())
}

fn discard(staging: &Path, output_dir: &Path, created: bool) {
    if let Err(e) = std::fs::remove_dir_all(staging) {
        tracing::warn!(path = %staging.display(), "Failed to remove staged outputs: {e}");
    }
    if created {
        // Only succeeds while the directory is still empty.
        std::fs::remove_dir(output_dir).ok();
    }
}

/// Orchestrates one analysis session over a clip.
pub struct MatchPipeline<V, D> {
    video: V,
    detector: D,
    config: AnalysisConfig,
    progress: Option<ProgressCallback>,
}

impl<V: VideoIo, D: Detector> MatchPipeline<V, D> {
    pub fn new(video: V, detector: D, config: AnalysisConfig) -> Self {
        Self {
            video,
            detector,
            config,
            progress: None,
        }
    }

    pub fn with_progress(mut self, progress: ProgressCallback) -> Self {
        self.progress = Some(progress);
        self
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    pub fn into_detector(self) -> D {
        self.detector
    }

    /// Analyze a clip and write every output.
    pub fn run(
        &mut self,
        job: &AnalysisJob,
        mode: CalibrationMode<'_>,
    ) -> CourtsideResult<AnalysisOutcome> {
        tracing::info!(
            input = %job.input_path.display(),
            output = %job.output_dir.display(),
            "Starting match analysis"
        );

        let result = self
            .analyze(job, mode)
            .and_then(|analysis| self.write_outputs(&job.output_dir, analysis));
        match &result {
            Ok(outcome) => {
                self.report_stage(AnalysisStage::Complete);
                tracing::info!(
                    report = %outcome.report_path.display(),
                    intervals = outcome.report.segmentation.intervals.len(),
                    bounces = outcome.report.bounces.len(),
                    "Match analysis complete"
                );
            }
            Err(_) => self.report_stage(AnalysisStage::Failed),
        }
        result
    }

    /// Run every stage in memory without writing outputs.
    pub fn analyze(
        &mut self,
        job: &AnalysisJob,
        mode: CalibrationMode<'_>,
    ) -> CourtsideResult<MatchAnalysis> {
        self.config.validate()?;

        self.report_stage(AnalysisStage::Reading);
        let clip = self.video.read_all(&job.input_path)?;
        let Some((width, height)) = clip.dimensions() else {
            return Err(CourtsideError::input(format!(
                "clip {} has no frames",
                job.input_path.display()
            )));
        };
        let timing = FrameTiming::new(clip.fps);
        let source = job.input_path.display().to_string();
        let session = session_id(&source, clip.len(), width, height);

        self.report_stage(AnalysisStage::Calibrating);
        let calibration = CourtCalibrator::new(&self.config).calibrate(&clip.frames[0], mode)?;

        self.report_stage(AnalysisStage::Segmenting);
        let (trace, segmentation) = segment_clip(&clip.frames, &calibration, &self.config.segmentation);
        let action_frames = segmentation.action_frames();
        let filtered = segmentation.select(&clip.frames);
        tracing::info!(
            intervals = segmentation.intervals.len(),
            action_frames = action_frames.len(),
            total_frames = clip.len(),
            "Segmented clip"
        );

        self.report_stage(AnalysisStage::Detecting);
        let detections = self.detect(&session, &action_frames, &clip.frames, job.cache_dir.as_deref())?;

        self.report_stage(AnalysisStage::Reconstructing);
        let tracked = self.config.trajectory.tracked_object_id;
        let sequence = ObservationSequence::from_detections(&detections, tracked);
        let reconstruction = TrajectoryReconstructor::new(&self.config.trajectory).reconstruct(&sequence);
        let canvas = CanvasGeometry::from_frame(width, height, &self.config.canvas);
        let mapper = CourtCoordinateMapper::new(calibration.homography, canvas, self.config.court);
        let bounces = bounce_records(&reconstruction, &mapper, &action_frames);

        self.report_stage(AnalysisStage::Rendering);
        let boxes: Vec<FrameDetections> = detections
            .iter()
            .enumerate()
            .map(|(i, frame)| {
                let mut frame = frame.clone();
                if let Some(bbox) = reconstruction.trajectory.get(i) {
                    frame.insert(tracked, *bbox);
                }
                frame
            })
            .collect();
        let dots: Vec<CanvasPoint> = bounces.iter().map(|b| b.canvas).collect();
        let annotated = MiniCourt::new(canvas, &self.config.court).render_all(&filtered, &boxes, &dots);

        let report = MatchReport {
            version: "1.0".to_string(),
            session_id: session,
            created_at: MatchReport::timestamp_now(),
            source: SourceInfo {
                path: source,
                fps: timing.fps(),
                width,
                height,
                frame_count: clip.len(),
            },
            calibration: CalibrationRecord {
                mode: calibration.mode.to_string(),
                corners: calibration.corners,
                homography: calibration.homography.matrix(),
            },
            segmentation: SegmentationRecord {
                threshold: self.config.segmentation.similarity_threshold,
                trace_start_frame: segmentation.frame_offset,
                similarity_trace: trace,
                intervals: segmentation
                    .intervals
                    .iter()
                    .map(|&interval| IntervalRecord {
                        interval,
                        start_secs: timing.frame_to_secs(interval.start_frame),
                        end_secs: timing.frame_to_secs(interval.end_frame),
                        duration_secs: timing
                            .span_secs(interval.start_frame, interval.end_frame),
                    })
                    .collect(),
                action_frame_count: segmentation.action_frame_count(),
            },
            bounces,
        };

        Ok(MatchAnalysis {
            report,
            filtered,
            annotated,
            fps: clip.fps,
        })
    }

    /// Detections for the in-play frames, in order, keyed in the cache by
    /// the frame selection.
    fn detect(
        &mut self,
        session: &str,
        action_frames: &[usize],
        frames: &[RgbImage],
        cache_dir: Option<&Path>,
    ) -> CourtsideResult<Vec<FrameDetections>> {
        if action_frames.is_empty() {
            tracing::warn!("No in-play frames, skipping detection");
            return Ok(Vec::new());
        }

        let indexed: Vec<IndexedFrame<'_>> = action_frames
            .iter()
            .filter_map(|&f| frames.get(f).map(|frame| (f, frame)))
            .collect();
        let detections = match cache_dir {
            Some(dir) => {
                CachedDetector::new(&mut self.detector, dir, selection_id(session, action_frames))
                    .detect_all(&indexed)?
            }
            None => self.detector.detect_all(&indexed)?,
        };

        if detections.len() != indexed.len() {
            return Err(CourtsideError::detection(format!(
                "detector returned {} results for {} frames",
                detections.len(),
                indexed.len()
            )));
        }
        Ok(detections)
    }

    /// Write every output into a staging directory, then move the three
    /// entries into place. A failed clip or report write leaves the output
    /// directory as it was.
    fn write_outputs(&self, output_dir: &Path, analysis: MatchAnalysis) -> CourtsideResult<AnalysisOutcome> {
        self.report_stage(AnalysisStage::Writing);
        let created = !output_dir.exists();
        let staging = output_dir.join(STAGING_DIR);

        let written = self
            .write_staged(&staging, &analysis)
            .and_then(|()| promote(&staging, output_dir));
        if let Err(e) = written {
            discard(&staging, output_dir, created);
            return Err(e);
        }

        Ok(AnalysisOutcome {
            report: analysis.report,
            report_path: output_dir.join(REPORT_FILE),
            filtered_dir: output_dir.join(FILTERED_CLIP),
            annotated_dir: output_dir.join(ANNOTATED_CLIP),
        })
    }

    fn write_staged(&self, staging: &Path, analysis: &MatchAnalysis) -> CourtsideResult<()> {
        if staging.exists() {
            std::fs::remove_dir_all(staging)?;
        }
        std::fs::create_dir_all(staging)?;

        self.video
            .write_all(&analysis.filtered, &staging.join(FILTERED_CLIP), analysis.fps)?;
        self.video
            .write_all(&analysis.annotated, &staging.join(ANNOTATED_CLIP), analysis.fps)?;
        analysis
            .report
            .save(staging)
            .map_err(|e| CourtsideError::output(e.to_string()))?;
        Ok(())
    }

    fn report_stage(&self, stage: AnalysisStage) {
        tracing::debug!(?stage, "Analysis stage");
        if let Some(cb) = &self.progress {
            cb(AnalysisProgress {
                progress: stage.progress(),
                stage,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use courtside_common::CourtDimensions;
    use courtside_court_model::{BoundingBox, CourtCorners, Point2D, ReconstructedTrajectory};
    use courtside_processing_core::compute_homography;

    fn mapper() -> CourtCoordinateMapper {
        let corners =
            CourtCorners::from_tuples([(0.0, 0.0), (100.0, 0.0), (100.0, 200.0), (0.0, 200.0)]).unwrap();
        let court = CourtDimensions::default();
        let homography = compute_homography(&corners, &court).unwrap();
        let canvas = CanvasGeometry::from_frame(1920, 1080, &Default::default());
        CourtCoordinateMapper::new(homography, canvas, court)
    }

    #[test]
    fn test_bounce_records_use_source_frames() {
        let reconstruction = Reconstruction {
            trajectory: ReconstructedTrajectory::Complete {
                object_id: 1,
                boxes: vec![
                    BoundingBox::new(46.0, 90.0, 54.0, 100.0),
                    BoundingBox::new(0.0, 0.0, 4.0, 4.0),
                ],
            },
            bounces: vec![0],
        };

        let records = bounce_records(&reconstruction, &mapper(), &[7, 8]);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].frame_index, 0);
        assert_eq!(records[0].source_frame, 7);
        assert_eq!(records[0].screen, Point2D::new(50.0, 100.0));
        assert!((records[0].court.x - 5.485).abs() < 1e-6);
        assert!((records[0].court.y - 11.885).abs() < 1e-6);
        assert!((records[0].canvas.x - 1745).abs() <= 1);
        assert!((records[0].canvas.y - 325).abs() <= 1);
    }

    #[test]
    fn test_unobserved_trajectory_has_no_records() {
        let reconstruction = Reconstruction {
            trajectory: ReconstructedTrajectory::Unobserved { object_id: 1, len: 3 },
            bounces: vec![],
        };
        assert!(bounce_records(&reconstruction, &mapper(), &[0, 1, 2]).is_empty());
    }

    #[test]
    fn test_stage_progress_is_monotonic() {
        let stages = [
            AnalysisStage::Reading,
            AnalysisStage::Calibrating,
            AnalysisStage::Segmenting,
            AnalysisStage::Detecting,
            AnalysisStage::Reconstructing,
            AnalysisStage::Rendering,
            AnalysisStage::Writing,
            AnalysisStage::Complete,
        ];
        assert!(stages.windows(2).all(|w| w[0].progress() < w[1].progress()));
    }
}
