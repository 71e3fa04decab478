//! Court corner search from detected line segments.
//!
//! # Algorithm
//!
//! 1. **Classify** each segment as horizontal or vertical by its angle
//!    (below 45° or above 135° is horizontal).
//! 2. **Intersect** every horizontal with every vertical segment's carrier
//!    line, snapping to integer pixels and keeping points within a margin
//!    around the frame.
//! 3. **Cluster** intersections closer than a pixel tolerance; the first
//!    point seen represents its cluster.
//! 4. **Order** the unique points by angle around their centroid, which
//!    on screen (y down) is clockwise starting near the top-left.
//! 5. **Select** the first four. No quadrilateral-quality scoring happens
//!    unless [`QuadCheck`] asks for it.

use courtside_common::{CalibrationConfig, CalibrationError, CalibrationResult, QuadCheck};
use courtside_court_model::{CourtCorners, Point2D};

/// Parallel-line denominator threshold.
const PARALLEL_EPSILON: f64 = 1e-10;

/// A detected line segment in image pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineSegment {
    pub p0: Point2D,
    pub p1: Point2D,
}

/// Coarse segment orientation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    Horizontal,
    Vertical,
}

impl LineSegment {
    pub fn new(x0: f64, y0: f64, x1: f64, y1: f64) -> Self {
        Self {
            p0: Point2D::new(x0, y0),
            p1: Point2D::new(x1, y1),
        }
    }

    pub fn length(&self) -> f64 {
        self.p0.distance_to(&self.p1)
    }

    /// Absolute direction angle in degrees, in `[0, 180]`.
    pub fn angle_degrees(&self) -> f64 {
        (self.p1.y - self.p0.y)
            .atan2(self.p1.x - self.p0.x)
            .to_degrees()
            .abs()
    }

    pub fn orientation(&self) -> Orientation {
        let angle = self.angle_degrees();
        if !(45.0..=135.0).contains(&angle) {
            Orientation::Horizontal
        } else {
            Orientation::Vertical
        }
    }

    /// Multiply both endpoints by a scale factor.
    pub fn scaled(&self, factor: f64) -> Self {
        Self {
            p0: self.p0.scaled(factor),
            p1: self.p1.scaled(factor),
        }
    }
}

/// Intersection of the infinite carrier lines of two segments, snapped
/// (truncated) to integer pixels. `None` for parallel lines.
pub fn line_intersection(a: &LineSegment, b: &LineSegment) -> Option<Point2D> {
    let (x1, y1, x2, y2) = (a.p0.x, a.p0.y, a.p1.x, a.p1.y);
    let (x3, y3, x4, y4) = (b.p0.x, b.p0.y, b.p1.x, b.p1.y);

    let denom = (x1 - x2) * (y3 - y4) - (y1 - y2) * (x3 - x4);
    if denom.abs() < PARALLEL_EPSILON {
        return None;
    }

    let t = ((x1 - x3) * (y3 - y4) - (y1 - y3) * (x3 - x4)) / denom;
    let x = x1 + t * (x2 - x1);
    let y = y1 + t * (y2 - y1);
    Some(Point2D::new(x.trunc(), y.trunc()))
}

/// All horizontal × vertical intersections inside the frame expanded by `margin`.
pub fn collect_intersections(
    segments: &[LineSegment],
    width: u32,
    height: u32,
    margin: f64,
) -> Vec<Point2D> {
    let (horizontal, vertical): (Vec<&LineSegment>, Vec<&LineSegment>) = segments
        .iter()
        .partition(|s| s.orientation() == Orientation::Horizontal);

    let (w, h) = (width as f64, height as f64);
    let mut points = Vec::new();
    for hs in &horizontal {
        for vs in &vertical {
            let Some(p) = line_intersection(hs, vs) else {
                continue;
            };
            if p.x >= -margin && p.x < w + margin && p.y >= -margin && p.y < h + margin {
                points.push(p);
            }
        }
    }
    points
}

/// Merge points closer than `tolerance` to an earlier kept point.
pub fn cluster_points(points: &[Point2D], tolerance: f64) -> Vec<Point2D> {
    let mut unique: Vec<Point2D> = Vec::new();
    for p in points {
        if !unique.iter().any(|u| u.distance_to(p) < tolerance) {
            unique.push(*p);
        }
    }
    unique
}

/// Sort points by angle around their centroid (clockwise on screen).
pub fn order_clockwise(points: &[Point2D]) -> Vec<Point2D> {
    let Some(center) = Point2D::centroid(points) else {
        return Vec::new();
    };
    let mut ordered = points.to_vec();
    ordered.sort_by(|a, b| {
        let angle_a = (a.y - center.y).atan2(a.x - center.x);
        let angle_b = (b.y - center.y).atan2(b.x - center.x);
        angle_a.total_cmp(&angle_b)
    });
    ordered
}

/// Outcome of a corner search with the counts seen at each stage.
#[derive(Debug, Clone, PartialEq)]
pub struct CornerSearch {
    pub corners: [Point2D; 4],
    pub segment_count: usize,
    pub intersection_count: usize,
    pub unique_count: usize,
}

/// Find four ordered court corners from line segments detected in a
/// `width` × `height` image.
pub fn find_court_corners(
    segments: &[LineSegment],
    width: u32,
    height: u32,
    config: &CalibrationConfig,
) -> CalibrationResult<CornerSearch> {
    let intersections = collect_intersections(segments, width, height, config.bounds_margin);
    let unique = cluster_points(&intersections, config.cluster_tolerance);

    tracing::debug!(
        segments = segments.len(),
        intersections = intersections.len(),
        unique = unique.len(),
        "Court corner search"
    );

    if unique.len() < 4 {
        return Err(CalibrationError::InsufficientCorners {
            found: unique.len(),
        });
    }

    let ordered = order_clockwise(&unique);
    let corners = [ordered[0], ordered[1], ordered[2], ordered[3]];
    check_quadrilateral(&corners, config.quad_check)?;

    Ok(CornerSearch {
        corners,
        segment_count: segments.len(),
        intersection_count: intersections.len(),
        unique_count: unique.len(),
    })
}

fn check_quadrilateral(corners: &[Point2D; 4], check: QuadCheck) -> CalibrationResult<()> {
    match check {
        QuadCheck::Off => Ok(()),
        QuadCheck::ConvexPositiveArea { min_area } => {
            let quad = CourtCorners::new(*corners).map_err(|e| {
                CalibrationError::RejectedQuadrilateral {
                    reason: e.to_string(),
                }
            })?;
            if !quad.is_convex() {
                return Err(CalibrationError::RejectedQuadrilateral {
                    reason: "corners are not convex".to_string(),
                });
            }
            if quad.signed_area() < min_area {
                return Err(CalibrationError::RejectedQuadrilateral {
                    reason: format!(
                        "enclosed area {:.0} px² is below {min_area:.0} px²",
                        quad.signed_area()
                    ),
                });
            }
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Outline of a court with corners (100, 80), (500, 80), (560, 420), (40, 420),
    /// drawn as two slightly offset copies of each side, like the two
    /// edges an edge detector finds on a painted line.
    fn court_outline() -> Vec<LineSegment> {
        vec![
            LineSegment::new(100.0, 80.0, 500.0, 80.0),
            LineSegment::new(102.0, 83.0, 498.0, 83.0),
            LineSegment::new(40.0, 420.0, 560.0, 420.0),
            LineSegment::new(42.0, 417.0, 558.0, 417.0),
            LineSegment::new(100.0, 80.0, 40.0, 420.0),
            LineSegment::new(103.0, 80.0, 43.0, 420.0),
            LineSegment::new(500.0, 80.0, 560.0, 420.0),
            LineSegment::new(497.0, 80.0, 557.0, 420.0),
        ]
    }

    #[test]
    fn test_orientation_classification() {
        assert_eq!(
            LineSegment::new(0.0, 0.0, 100.0, 10.0).orientation(),
            Orientation::Horizontal
        );
        assert_eq!(
            LineSegment::new(100.0, 10.0, 0.0, 0.0).orientation(),
            Orientation::Horizontal
        );
        assert_eq!(
            LineSegment::new(0.0, 0.0, 20.0, 100.0).orientation(),
            Orientation::Vertical
        );
        assert_eq!(
            LineSegment::new(0.0, 0.0, 10.0, 10.0).orientation(),
            Orientation::Vertical
        );
    }

    #[test]
    fn test_intersection_is_truncated() {
        let h = LineSegment::new(0.0, 10.7, 100.0, 10.7);
        let v = LineSegment::new(20.9, 0.0, 20.9, 100.0);
        assert_eq!(line_intersection(&h, &v), Some(Point2D::new(20.0, 10.0)));
    }

    #[test]
    fn test_parallel_lines_do_not_intersect() {
        let a = LineSegment::new(0.0, 0.0, 100.0, 0.0);
        let b = LineSegment::new(0.0, 5.0, 100.0, 5.0);
        assert!(line_intersection(&a, &b).is_none());
    }

    #[test]
    fn test_intersections_respect_margin() {
        let segments = vec![
            LineSegment::new(0.0, 10.0, 50.0, 10.0),
            LineSegment::new(-40.0, 0.0, -40.0, 50.0),
            LineSegment::new(-60.0, 0.0, -60.0, 50.0),
        ];
        let points = collect_intersections(&segments, 100, 100, 50.0);
        assert_eq!(points, vec![Point2D::new(-40.0, 10.0)]);
    }

    #[test]
    fn test_cluster_keeps_first_representative() {
        let points = [
            Point2D::new(10.0, 10.0),
            Point2D::new(15.0, 12.0),
            Point2D::new(40.0, 10.0),
        ];
        let unique = cluster_points(&points, 20.0);
        assert_eq!(unique, vec![Point2D::new(10.0, 10.0), Point2D::new(40.0, 10.0)]);
    }

    #[test]
    fn test_order_clockwise_from_top_left() {
        let points = [
            Point2D::new(100.0, 100.0),
            Point2D::new(0.0, 100.0),
            Point2D::new(100.0, 0.0),
            Point2D::new(0.0, 0.0),
        ];
        assert_eq!(
            order_clockwise(&points),
            vec![
                Point2D::new(0.0, 0.0),
                Point2D::new(100.0, 0.0),
                Point2D::new(100.0, 100.0),
                Point2D::new(0.0, 100.0),
            ]
        );
    }

    #[test]
    fn test_find_corners_on_outline() {
        let search =
            find_court_corners(&court_outline(), 600, 500, &CalibrationConfig::default()).unwrap();
        assert_eq!(search.unique_count, 4);

        let expected = [(100.0, 80.0), (500.0, 80.0), (560.0, 420.0), (40.0, 420.0)];
        for (found, (ex, ey)) in search.corners.iter().zip(expected) {
            assert!(
                (found.x - ex).abs() <= 6.0 && (found.y - ey).abs() <= 6.0,
                "{found:?} not near ({ex}, {ey})"
            );
        }
    }

    #[test]
    fn test_too_few_corners_fails() {
        let segments = vec![
            LineSegment::new(0.0, 10.0, 100.0, 10.0),
            LineSegment::new(50.0, 0.0, 50.0, 100.0),
        ];
        let result = find_court_corners(&segments, 200, 200, &CalibrationConfig::default());
        assert_eq!(result, Err(CalibrationError::InsufficientCorners { found: 1 }));
    }

    #[test]
    fn test_no_segments_reports_zero_corners() {
        let result = find_court_corners(&[], 200, 200, &CalibrationConfig::default());
        assert_eq!(result, Err(CalibrationError::InsufficientCorners { found: 0 }));
    }

    #[test]
    fn test_quad_check_is_opt_in() {
        // Six unique points; the first four by angle start with three collinear ones.
        let segments = vec![
            LineSegment::new(0.0, 0.0, 300.0, 0.0),
            LineSegment::new(0.0, 200.0, 300.0, 200.0),
            LineSegment::new(0.0, 0.0, 0.0, 200.0),
            LineSegment::new(150.0, 0.0, 150.0, 200.0),
            LineSegment::new(300.0, 0.0, 300.0, 200.0),
        ];
        let lenient = find_court_corners(&segments, 400, 300, &CalibrationConfig::default());
        assert!(lenient.is_ok());

        let strict = CalibrationConfig {
            quad_check: QuadCheck::ConvexPositiveArea { min_area: 50_000.0 },
            ..CalibrationConfig::default()
        };
        let result = find_court_corners(&segments, 400, 300, &strict);
        assert!(matches!(
            result,
            Err(CalibrationError::RejectedQuadrilateral { .. })
        ));
    }
}
