//! Trajectory reconstruction and bounce detection.
//!
//! The detector misses the ball on many frames. Gaps are filled by
//! per-component linear interpolation between the nearest observations;
//! frames before the first observation take the first box and frames
//! after the last observation keep the last box.
//!
//! Bounces are local maxima of the smoothed vertical box midpoint. Screen
//! `y` grows downward, so a maximum is the ball at its lowest point on
//! screen, which is where it meets the ground.

use courtside_common::TrajectoryConfig;
use courtside_court_model::{
    BoundingBox, ObservationSequence, Point2D, ReconstructedTrajectory,
};

/// Fill every missing observation.
///
/// Returns [`ReconstructedTrajectory::Unobserved`] when the object is
/// never seen; no positions are invented in that case.
pub fn gap_fill(sequence: &ObservationSequence) -> ReconstructedTrajectory {
    let observed: Vec<(usize, BoundingBox)> = sequence
        .observations
        .iter()
        .enumerate()
        .filter_map(|(i, o)| o.map(|b| (i, b)))
        .collect();

    let (Some(&(first_index, first_box)), Some(&(_, last_box))) =
        (observed.first(), observed.last())
    else {
        return ReconstructedTrajectory::Unobserved {
            object_id: sequence.object_id,
            len: sequence.len(),
        };
    };

    let mut boxes = Vec::with_capacity(sequence.len());
    boxes.extend(std::iter::repeat(first_box).take(first_index));

    for pair in observed.windows(2) {
        let (i0, b0) = pair[0];
        let (i1, b1) = pair[1];
        boxes.push(b0);
        let span = (i1 - i0) as f64;
        for i in (i0 + 1)..i1 {
            let t = (i - i0) as f64 / span;
            boxes.push(lerp_box(&b0, &b1, t));
        }
    }

    boxes.push(last_box);
    let remaining = sequence.len() - boxes.len();
    boxes.extend(std::iter::repeat(last_box).take(remaining));

    ReconstructedTrajectory::Complete {
        object_id: sequence.object_id,
        boxes,
    }
}

fn lerp_box(a: &BoundingBox, b: &BoundingBox, t: f64) -> BoundingBox {
    let a = a.to_array();
    let b = b.to_array();
    BoundingBox::from_array([0, 1, 2, 3].map(|k| a[k] + (b[k] - a[k]) * t))
}

/// Trailing rolling mean; the window shrinks to the available history
/// at the start of the signal.
pub fn rolling_mean(values: &[f64], window: usize) -> Vec<f64> {
    let window = window.max(1);
    let mut out = Vec::with_capacity(values.len());
    let mut sum = 0.0;
    for (i, &v) in values.iter().enumerate() {
        sum += v;
        if i >= window {
            sum -= values[i - window];
        }
        let count = (i + 1).min(window);
        out.push(sum / count as f64);
    }
    out
}

/// Smoothed vertical midpoint of every box.
pub fn smoothed_midpoints(boxes: &[BoundingBox], window: usize) -> Vec<f64> {
    let mid: Vec<f64> = boxes.iter().map(BoundingBox::mid_y).collect();
    rolling_mean(&mid, window)
}

/// Indices of local maxima at least `distance` samples apart.
///
/// A sample is a candidate if it is strictly greater than its left
/// neighbour and the first differing sample to its right; a flat top
/// reports its middle index. The first and last samples are never
/// candidates. Candidates are then kept from the highest down, dropping
/// any that fall within `distance` of one already kept. Among equal
/// heights the later index wins.
pub fn find_peaks(signal: &[f64], distance: usize) -> Vec<usize> {
    let candidates = local_maxima(signal);
    if distance <= 1 || candidates.len() < 2 {
        return candidates;
    }

    let mut by_height: Vec<usize> = (0..candidates.len()).collect();
    by_height.sort_by(|&a, &b| signal[candidates[a]].total_cmp(&signal[candidates[b]]));

    let mut keep = vec![true; candidates.len()];
    for &j in by_height.iter().rev() {
        if !keep[j] {
            continue;
        }
        let peak = candidates[j];
        for k in (0..j).rev() {
            if peak - candidates[k] >= distance {
                break;
            }
            keep[k] = false;
        }
        for k in (j + 1)..candidates.len() {
            if candidates[k] - peak >= distance {
                break;
            }
            keep[k] = false;
        }
    }

    candidates
        .into_iter()
        .zip(keep)
        .filter_map(|(peak, kept)| kept.then_some(peak))
        .collect()
}

fn local_maxima(signal: &[f64]) -> Vec<usize> {
    let mut peaks = Vec::new();
    if signal.len() < 3 {
        return peaks;
    }
    let last = signal.len() - 1;
    let mut i = 1;
    while i < last {
        if signal[i - 1] < signal[i] {
            let mut ahead = i + 1;
            while ahead < last && signal[ahead] == signal[i] {
                ahead += 1;
            }
            if signal[ahead] < signal[i] {
                peaks.push((i + ahead - 1) / 2);
                i = ahead;
            }
        }
        i += 1;
    }
    peaks
}

/// Bounce frame indices along a reconstructed trajectory, ascending.
///
/// An unobserved trajectory has no bounces.
pub fn detect_events(trajectory: &ReconstructedTrajectory, config: &TrajectoryConfig) -> Vec<usize> {
    let Some(boxes) = trajectory.boxes() else {
        return Vec::new();
    };
    let smoothed = smoothed_midpoints(boxes, config.rolling_window);
    find_peaks(&smoothed, config.min_peak_spacing)
}

/// Gap filling and bounce detection for one tracked object.
#[derive(Debug, Clone)]
pub struct TrajectoryReconstructor {
    config: TrajectoryConfig,
}

/// Result of [`TrajectoryReconstructor::reconstruct`].
#[derive(Debug, Clone, PartialEq)]
pub struct Reconstruction {
    pub trajectory: ReconstructedTrajectory,
    /// Bounce frame indices, relative to the input sequence.
    pub bounces: Vec<usize>,
}

impl TrajectoryReconstructor {
    pub fn new(config: &TrajectoryConfig) -> Self {
        Self {
            config: config.clone(),
        }
    }

    pub fn reconstruct(&self, sequence: &ObservationSequence) -> Reconstruction {
        let trajectory = gap_fill(sequence);
        let bounces = detect_events(&trajectory, &self.config);
        tracing::debug!(
            object_id = sequence.object_id,
            frames = sequence.len(),
            observed = sequence.observed_count(),
            bounces = bounces.len(),
            "Reconstructed trajectory"
        );
        Reconstruction {
            trajectory,
            bounces,
        }
    }
}

impl Reconstruction {
    /// Ground contact point (box bottom centre) for each bounce.
    pub fn contact_points(&self) -> Vec<(usize, Point2D)> {
        self.bounces
            .iter()
            .filter_map(|&frame| {
                self.trajectory
                    .get(frame)
                    .map(|b| (frame, b.contact_point()))
            })
            .collect()
    }
}
