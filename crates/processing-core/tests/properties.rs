use courtside_common::{CourtDimensions, SegmentationConfig, TrailingPolicy, TrajectoryConfig};
use courtside_court_model::{
    intervals_are_ordered, BoundingBox, CourtCorners, ObservationSequence, Point2D,
};
use courtside_processing_core::segmenter::SegmentState;
use courtside_processing_core::trajectory::find_peaks;
use courtside_processing_core::{
    compute_homography, detect_events, gap_fill, segment_trace, ActionSegmenter,
};
use proptest::prelude::*;

fn observation() -> impl Strategy<Value = Option<BoundingBox>> {
    prop::option::weighted(
        0.4,
        (0.0..1000.0f64, 0.0..1000.0f64, 1.0..40.0f64).prop_map(|(x, y, size)| {
            BoundingBox::new(x, y, x + size, y + size)
        }),
    )
}

/// Clockwise quads from top-left, one corner per quadrant of a
/// 1000x800 frame.
fn court_quad() -> impl Strategy<Value = [(f64, f64); 4]> {
    (
        (50.0..300.0f64, 50.0..250.0f64),
        (700.0..950.0f64, 50.0..250.0f64),
        (700.0..950.0f64, 500.0..750.0f64),
        (50.0..300.0f64, 500.0..750.0f64),
    )
        .prop_map(|(tl, tr, br, bl)| [tl, tr, br, bl])
}

fn close(a: Point2D, b: Point2D) -> bool {
    (a.x - b.x).abs() < 1e-6 && (a.y - b.y).abs() < 1e-6
}

proptest! {
    #[test]
    fn homography_maps_corners_onto_court(quad in court_quad()) {
        let corners = CourtCorners::from_tuples(quad);
        prop_assume!(corners.is_ok());
        let corners = corners.unwrap();
        let court = CourtDimensions::default();
        let homography = compute_homography(&corners, &court).unwrap();

        for (corner, expected) in corners.points().iter().zip(court.corners()) {
            let expected = Point2D::from(expected);
            let mapped = homography.apply(*corner).unwrap();
            prop_assert!(close(mapped, expected), "{:?} -> {:?}, expected {:?}", corner, mapped, expected);

            let back = homography.apply_inverse(expected).unwrap();
            prop_assert!(close(back, *corner), "{:?} -> {:?}, expected {:?}", expected, back, corner);
        }
    }

    #[test]
    fn gap_fill_preserves_length(observations in prop::collection::vec(observation(), 0..120)) {
        let len = observations.len();
        let trajectory = gap_fill(&ObservationSequence::new(1, observations));
        prop_assert_eq!(trajectory.len(), len);
    }

    #[test]
    fn gap_fill_keeps_observed_boxes(observations in prop::collection::vec(observation(), 1..120)) {
        let sequence = ObservationSequence::new(1, observations.clone());
        let trajectory = gap_fill(&sequence);
        for (i, observed) in observations.iter().enumerate() {
            if let Some(b) = observed {
                prop_assert_eq!(trajectory.get(i), Some(b));
            }
        }
    }

    #[test]
    fn gap_fill_is_idempotent(observations in prop::collection::vec(observation(), 0..120)) {
        let once = gap_fill(&ObservationSequence::new(7, observations));
        let twice = gap_fill(&once.to_observations());
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn bounces_respect_spacing(ys in prop::collection::vec(0.0..720.0f64, 0..400)) {
        let observations = ys
            .iter()
            .map(|&y| Some(BoundingBox::new(0.0, y, 8.0, y + 8.0)))
            .collect();
        let config = TrajectoryConfig::default();
        let trajectory = gap_fill(&ObservationSequence::new(1, observations));
        let events = detect_events(&trajectory, &config);

        for pair in events.windows(2) {
            prop_assert!(pair[1] - pair[0] >= config.min_peak_spacing, "{:?}", events);
        }
    }

    #[test]
    fn peaks_are_interior_local_maxima(signal in prop::collection::vec(0.0..10.0f64, 0..200)) {
        for peak in find_peaks(&signal, 1) {
            prop_assert!(peak > 0 && peak + 1 < signal.len());
            prop_assert!(signal[peak - 1] <= signal[peak]);
            prop_assert!(signal[peak + 1] <= signal[peak]);
        }
    }

    #[test]
    fn intervals_are_ordered_and_disjoint(
        trace in prop::collection::vec(0.5..1.0f64, 0..300),
        offset in 0usize..3,
    ) {
        let segmentation = segment_trace(&trace, &SegmentationConfig::default(), offset);
        prop_assert!(intervals_are_ordered(&segmentation.intervals));
        for interval in &segmentation.intervals {
            prop_assert!(interval.start_frame >= offset);
            prop_assert!(interval.end_frame < offset + trace.len());
        }
    }

    #[test]
    fn replaying_trace_reproduces_intervals(trace in prop::collection::vec(0.5..1.0f64, 0..300)) {
        let config = SegmentationConfig::default();
        let batch = segment_trace(&trace, &config, 1);

        let mut segmenter = ActionSegmenter::new(&config).with_frame_offset(1);
        for &similarity in &trace {
            segmenter.push(similarity);
        }
        prop_assert_eq!(segmenter.finish(), batch.clone());

        // Every action frame is above threshold, every other frame is not.
        for (k, &similarity) in trace.iter().enumerate() {
            let frame = k + 1;
            prop_assert_eq!(
                batch.is_action(frame),
                similarity > config.similarity_threshold
            );
        }
    }

    #[test]
    fn drop_policy_differs_only_in_trailing_interval(
        trace in prop::collection::vec(0.5..1.0f64, 1..300),
    ) {
        let close = segment_trace(&trace, &SegmentationConfig::default(), 0);
        let drop_config = SegmentationConfig {
            trailing: TrailingPolicy::Drop,
            ..SegmentationConfig::default()
        };
        let dropped = segment_trace(&trace, &drop_config, 0);

        let mut segmenter = ActionSegmenter::new(&SegmentationConfig::default());
        for &similarity in &trace {
            segmenter.push(similarity);
        }
        let open_at_end = matches!(segmenter.state(), SegmentState::InAction { .. });

        let expected_len = close.intervals.len() - usize::from(open_at_end);
        prop_assert_eq!(dropped.intervals.len(), expected_len);
        prop_assert_eq!(&dropped.intervals[..], &close.intervals[..expected_len]);
    }
}
