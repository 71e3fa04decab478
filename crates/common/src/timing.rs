//! Frame timing utilities.
//!
//! Analysis works on frame indices; reports and logs also want seconds.
//! This module provides:
//! - Frame index to presentation time, and inclusive span durations
//! - A progress ticker for long batch passes

/// Presentation timing of a clip with a constant frame rate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameTiming {
    fps: f64,
}

impl FrameTiming {
    /// Create timing for the given frame rate. Non-positive or non-finite
    /// rates fall back to 30 fps.
    pub fn new(fps: f64) -> Self {
        let fps = if fps.is_finite() && fps > 0.0 {
            fps
        } else {
            tracing::warn!("Invalid frame rate {fps}, assuming 30 fps");
            30.0
        };
        Self { fps }
    }

    /// Frames per second.
    pub fn fps(&self) -> f64 {
        self.fps
    }

    /// Presentation time of a frame in seconds.
    pub fn frame_to_secs(&self, frame_index: usize) -> f64 {
        frame_index as f64 / self.fps
    }

    /// Duration covered by an inclusive frame range.
    pub fn span_secs(&self, start_frame: usize, end_frame: usize) -> f64 {
        (end_frame.saturating_sub(start_frame) + 1) as f64 / self.fps
    }
}

/// Decides when a frame loop should emit a progress line.
#[derive(Debug)]
pub struct ProgressTicker {
    every: usize,
    last_reported: Option<usize>,
}

impl ProgressTicker {
    /// Report every `every` frames. Zero disables reporting.
    pub fn new(every: usize) -> Self {
        Self {
            every,
            last_reported: None,
        }
    }

    /// Returns true for frame indices that are a positive multiple of
    /// the interval, at most once per index.
    pub fn should_report(&mut self, frame_index: usize) -> bool {
        if self.every == 0 || frame_index == 0 || frame_index % self.every != 0 {
            return false;
        }
        if self.last_reported == Some(frame_index) {
            return false;
        }
        self.last_reported = Some(frame_index);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_to_secs_conversion() {
        let timing = FrameTiming::new(25.0);
        assert!((timing.frame_to_secs(50) - 2.0).abs() < 1e-9);
        assert!((timing.frame_to_secs(1) - 0.04).abs() < 1e-9);
    }

    #[test]
    fn test_span_is_inclusive() {
        let timing = FrameTiming::new(10.0);
        assert!((timing.span_secs(0, 9) - 1.0).abs() < 1e-9);
        assert!((timing.span_secs(4, 4) - 0.1).abs() < 1e-9);
    }

    #[test]
    fn test_invalid_fps_falls_back() {
        assert_eq!(FrameTiming::new(0.0).fps(), 30.0);
        assert_eq!(FrameTiming::new(f64::NAN).fps(), 30.0);
    }

    #[test]
    fn test_progress_ticker() {
        let mut ticker = ProgressTicker::new(100);
        assert!(!ticker.should_report(0));
        assert!(!ticker.should_report(99));
        assert!(ticker.should_report(100));
        assert!(!ticker.should_report(100));
        assert!(ticker.should_report(200));

        let mut disabled = ProgressTicker::new(0);
        assert!(!disabled.should_report(100));
    }
}
