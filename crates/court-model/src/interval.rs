//! In-play frame ranges.

use serde::{Deserialize, Serialize};

/// A contiguous run of in-play frames. Both ends are inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ActionInterval {
    pub start_frame: usize,
    pub end_frame: usize,
}

impl ActionInterval {
    pub fn new(start_frame: usize, end_frame: usize) -> Self {
        debug_assert!(start_frame <= end_frame);
        Self {
            start_frame,
            end_frame,
        }
    }

    /// Number of frames in the interval.
    pub fn len(&self) -> usize {
        self.end_frame - self.start_frame + 1
    }

    /// Never true; an interval holds at least one frame.
    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn contains(&self, frame_index: usize) -> bool {
        frame_index >= self.start_frame && frame_index <= self.end_frame
    }

    /// Whether two intervals share at least one frame.
    pub fn overlaps(&self, other: &ActionInterval) -> bool {
        self.start_frame <= other.end_frame && other.start_frame <= self.end_frame
    }

    /// Iterate over the frame indices of the interval.
    pub fn frames(&self) -> std::ops::RangeInclusive<usize> {
        self.start_frame..=self.end_frame
    }
}

/// Check that intervals are ordered by start and pairwise disjoint.
pub fn intervals_are_ordered(intervals: &[ActionInterval]) -> bool {
    intervals
        .windows(2)
        .all(|w| w[0].end_frame < w[1].start_frame)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interval_length_is_inclusive() {
        let interval = ActionInterval::new(3, 7);
        assert_eq!(interval.len(), 5);
        assert!(interval.contains(3));
        assert!(interval.contains(7));
        assert!(!interval.contains(8));
        assert_eq!(interval.frames().count(), 5);
    }

    #[test]
    fn test_overlap() {
        let a = ActionInterval::new(0, 4);
        assert!(a.overlaps(&ActionInterval::new(4, 9)));
        assert!(!a.overlaps(&ActionInterval::new(5, 9)));
    }

    #[test]
    fn test_ordering_check() {
        assert!(intervals_are_ordered(&[
            ActionInterval::new(0, 1),
            ActionInterval::new(3, 4)
        ]));
        assert!(!intervals_are_ordered(&[
            ActionInterval::new(0, 3),
            ActionInterval::new(3, 4)
        ]));
        assert!(intervals_are_ordered(&[]));
    }
}
