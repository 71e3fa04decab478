//! In-play / dead-time segmentation over a per-frame similarity signal.
//!
//! A two-state machine:
//!
//! ```text
//!   DeadTime ──(similarity > enter)──▶ InAction { start }
//!   InAction ──(similarity ≤ release)─▶ DeadTime        closes [start, previous frame]
//! ```
//!
//! By default `release == enter`, so a single threshold governs both
//! transitions and flicker around it produces short intervals. Setting
//! `release_threshold` below the entry threshold turns on the
//! dual-threshold enhancement.
//!
//! Similarities may be computed in any order (e.g. in parallel), but must
//! be pushed here in frame order.

use courtside_common::{ProgressTicker, SegmentationConfig, TrailingPolicy};
use courtside_court_model::ActionInterval;
use serde::{Deserialize, Serialize};

/// Segmenter state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentState {
    DeadTime,
    InAction { start_frame: usize },
}

/// Streaming segmenter fed one similarity value per frame.
#[derive(Debug)]
pub struct ActionSegmenter {
    enter_threshold: f64,
    release_threshold: f64,
    trailing: TrailingPolicy,
    min_logged_duration: usize,
    frame_offset: usize,
    state: SegmentState,
    pushed: usize,
    intervals: Vec<ActionInterval>,
    ticker: ProgressTicker,
}

impl ActionSegmenter {
    pub fn new(config: &SegmentationConfig) -> Self {
        Self {
            enter_threshold: config.similarity_threshold,
            release_threshold: config
                .release_threshold
                .unwrap_or(config.similarity_threshold),
            trailing: config.trailing,
            min_logged_duration: config.min_logged_duration,
            frame_offset: 0,
            state: SegmentState::DeadTime,
            pushed: 0,
            intervals: Vec::new(),
            ticker: ProgressTicker::new(config.progress_every),
        }
    }

    /// Number the first pushed value as frame `offset` instead of 0.
    ///
    /// The pipeline compares frames against frame 0, so its first value
    /// belongs to frame 1.
    pub fn with_frame_offset(mut self, offset: usize) -> Self {
        self.frame_offset = offset;
        self
    }

    pub fn state(&self) -> SegmentState {
        self.state
    }

    pub fn is_in_action(&self) -> bool {
        matches!(self.state, SegmentState::InAction { .. })
    }

    /// Feed the next frame's similarity. Returns the interval closed by
    /// this frame, if any.
    pub fn push(&mut self, similarity: f64) -> Option<ActionInterval> {
        let frame = self.frame_offset + self.pushed;
        self.pushed += 1;

        if self.ticker.should_report(self.pushed) {
            tracing::debug!(
                frame,
                intervals = self.intervals.len(),
                "Segmentation progress"
            );
        }

        match self.state {
            SegmentState::DeadTime => {
                if similarity > self.enter_threshold {
                    tracing::info!(frame, similarity, "Action started");
                    self.state = SegmentState::InAction { start_frame: frame };
                }
                None
            }
            SegmentState::InAction { start_frame } => {
                if similarity > self.release_threshold {
                    return None;
                }
                let interval = ActionInterval::new(start_frame, frame - 1);
                self.close(interval, similarity);
                Some(interval)
            }
        }
    }

    fn close(&mut self, interval: ActionInterval, similarity: f64) {
        if interval.len() >= self.min_logged_duration {
            tracing::info!(
                start = interval.start_frame,
                end = interval.end_frame,
                duration = interval.len(),
                similarity,
                "Action ended"
            );
        } else {
            tracing::debug!(
                start = interval.start_frame,
                end = interval.end_frame,
                similarity,
                "Short action ended"
            );
        }
        self.intervals.push(interval);
        self.state = SegmentState::DeadTime;
    }

    /// End of stream. A trailing open interval is closed at the last
    /// frame or discarded according to the trailing policy.
    pub fn finish(mut self) -> Segmentation {
        if let SegmentState::InAction { start_frame } = self.state {
            let last = self.frame_offset + self.pushed - 1;
            match self.trailing {
                TrailingPolicy::Close => {
                    tracing::debug!(start_frame, last, "Closing interval open at end of stream");
                    self.intervals.push(ActionInterval::new(start_frame, last));
                }
                TrailingPolicy::Drop => {
                    tracing::debug!(start_frame, "Dropping interval open at end of stream");
                }
            }
        }

        Segmentation {
            frame_offset: self.frame_offset,
            frame_count: self.pushed,
            intervals: self.intervals,
        }
    }
}

/// Completed segmentation of a trace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segmentation {
    /// Frame index of the first classified value.
    pub frame_offset: usize,
    /// Number of classified values.
    pub frame_count: usize,
    /// Ordered, non-overlapping intervals in absolute frame indices.
    pub intervals: Vec<ActionInterval>,
}

impl Segmentation {
    /// Frame indices inside any interval, ascending.
    pub fn action_frames(&self) -> Vec<usize> {
        self.intervals.iter().flat_map(|i| i.frames()).collect()
    }

    pub fn action_frame_count(&self) -> usize {
        self.intervals.iter().map(|i| i.len()).sum()
    }

    pub fn is_action(&self, frame_index: usize) -> bool {
        self.intervals.iter().any(|i| i.contains(frame_index))
    }

    /// Keep the items whose frame lies inside an interval, in order.
    ///
    /// `items[k]` is taken to be frame `k`.
    pub fn select<T: Clone>(&self, items: &[T]) -> Vec<T> {
        self.action_frames()
            .into_iter()
            .filter_map(|frame| items.get(frame).cloned())
            .collect()
    }
}

/// Segment a whole recorded trace.
pub fn segment_trace(
    trace: &[f64],
    config: &SegmentationConfig,
    frame_offset: usize,
) -> Segmentation {
    let mut segmenter = ActionSegmenter::new(config).with_frame_offset(frame_offset);
    for &similarity in trace {
        segmenter.push(similarity);
    }
    segmenter.finish()
}
