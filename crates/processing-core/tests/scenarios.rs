use courtside_common::{CourtDimensions, SegmentationConfig, TrailingPolicy, TrajectoryConfig};
use courtside_court_model::{
    ActionInterval, BoundingBox, CourtCorners, ObservationSequence, Point2D,
    ReconstructedTrajectory,
};
use courtside_processing_core::{
    compute_homography, detect_events, gap_fill, segment_trace, ActionSegmenter,
};

fn rectangle_corners() -> CourtCorners {
    CourtCorners::from_tuples([(0.0, 0.0), (100.0, 0.0), (100.0, 200.0), (0.0, 200.0)])
        .expect("rectangle corners should be valid")
}

#[test]
fn screen_center_maps_to_court_center() {
    let court = CourtDimensions::default();
    let h = compute_homography(&rectangle_corners(), &court).expect("homography should solve");

    let center = h
        .apply(Point2D::new(50.0, 100.0))
        .expect("center should be finite");
    assert!((center.x - 5.485).abs() < 1e-9, "x = {}", center.x);
    assert!((center.y - 11.885).abs() < 1e-9, "y = {}", center.y);
}

#[test]
fn perspective_corners_map_to_canonical_rectangle() {
    let court = CourtDimensions::default();
    let corners = CourtCorners::from_tuples([
        (577.0, 301.0),
        (1343.0, 298.0),
        (1631.0, 893.0),
        (286.0, 902.0),
    ])
    .expect("broadcast corners should be valid");
    let h = compute_homography(&corners, &court).expect("homography should solve");

    for (corner, expected) in corners.points().iter().zip(court.corners()) {
        let mapped = h.apply(*corner).expect("corner should map");
        assert!((mapped.x - expected.0).abs() < 1e-6);
        assert!((mapped.y - expected.1).abs() < 1e-6);
    }
}

#[test]
fn two_missing_frames_interpolate_linearly() {
    let observations = vec![
        Some(BoundingBox::new(0.0, 0.0, 0.0, 0.0)),
        None,
        None,
        Some(BoundingBox::new(30.0, 0.0, 0.0, 0.0)),
    ];
    let trajectory = gap_fill(&ObservationSequence::new(1, observations));

    let xs: Vec<f64> = trajectory
        .boxes()
        .expect("trajectory should be complete")
        .iter()
        .map(|b| b.x1)
        .collect();
    let expected = [0.0, 10.0, 20.0, 30.0];
    for (x, e) in xs.iter().zip(expected) {
        assert!((x - e).abs() < 1e-9, "{xs:?}");
    }
}

#[test]
fn never_observed_object_yields_no_bounces() {
    let trajectory = gap_fill(&ObservationSequence::new(1, vec![None; 90]));
    assert!(matches!(
        trajectory,
        ReconstructedTrajectory::Unobserved { len: 90, .. }
    ));
    assert!(detect_events(&trajectory, &TrajectoryConfig::default()).is_empty());
}

#[test]
fn similarity_dip_closes_interval_and_trailing_run_is_closed() {
    let trace = [0.9, 0.9, 0.5, 0.9, 0.9];
    let segmentation = segment_trace(&trace, &SegmentationConfig::default(), 0);
    assert_eq!(
        segmentation.intervals,
        vec![ActionInterval::new(0, 1), ActionInterval::new(3, 4)]
    );
}

#[test]
fn similarity_dip_with_drop_policy_keeps_only_closed_interval() {
    let config = SegmentationConfig {
        trailing: TrailingPolicy::Drop,
        ..SegmentationConfig::default()
    };
    let mut segmenter = ActionSegmenter::new(&config);
    let closed: Vec<ActionInterval> = [0.9, 0.9, 0.5, 0.9, 0.9]
        .into_iter()
        .filter_map(|s| segmenter.push(s))
        .collect();
    assert_eq!(closed, vec![ActionInterval::new(0, 1)]);
    assert!(segmenter.is_in_action());
    assert_eq!(segmenter.finish().intervals, closed);
}
