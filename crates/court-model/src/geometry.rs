//! Planar geometry types shared by calibration and mapping.

use serde::{Deserialize, Serialize};

use crate::error::ModelError;

/// Cross products smaller than this (px²) count as collinear.
const COLLINEAR_EPSILON: f64 = 1e-6;

/// A 2D point. Units depend on context: screen pixels or court meters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point2D {
    pub x: f64,
    pub y: f64,
}

impl Point2D {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point.
    pub fn distance_to(&self, other: &Point2D) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }

    /// Scale both coordinates by the same factor.
    pub fn scaled(&self, factor: f64) -> Point2D {
        Point2D::new(self.x * factor, self.y * factor)
    }

    /// Mean of a non-empty set of points.
    pub fn centroid(points: &[Point2D]) -> Option<Point2D> {
        if points.is_empty() {
            return None;
        }
        let n = points.len() as f64;
        let sx: f64 = points.iter().map(|p| p.x).sum();
        let sy: f64 = points.iter().map(|p| p.y).sum();
        Some(Point2D::new(sx / n, sy / n))
    }
}

impl From<(f64, f64)> for Point2D {
    fn from((x, y): (f64, f64)) -> Self {
        Self::new(x, y)
    }
}

/// A pixel position on the drawing canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CanvasPoint {
    pub x: i32,
    pub y: i32,
}

impl CanvasPoint {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// The four court corners in screen space, clockwise from top-left:
/// top-left, top-right, bottom-right, bottom-left.
///
/// Construction guarantees no three corners are collinear and the
/// enclosed area is positive in screen orientation (y down).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "[Point2D; 4]", into = "[Point2D; 4]")]
pub struct CourtCorners {
    points: [Point2D; 4],
}

impl CourtCorners {
    /// Validate and wrap four ordered corners.
    pub fn new(points: [Point2D; 4]) -> Result<Self, ModelError> {
        if points.iter().any(|p| !p.x.is_finite() || !p.y.is_finite()) {
            return Err(ModelError::DegenerateCorners {
                reason: "corner coordinates must be finite".to_string(),
            });
        }

        for i in 0..4 {
            let a = points[i];
            let b = points[(i + 1) % 4];
            let c = points[(i + 2) % 4];
            if cross(a, b, c).abs() < COLLINEAR_EPSILON {
                return Err(ModelError::DegenerateCorners {
                    reason: format!("corners {i}, {}, {} are collinear", (i + 1) % 4, (i + 2) % 4),
                });
            }
        }

        let corners = Self { points };
        if corners.signed_area() <= 0.0 {
            return Err(ModelError::DegenerateCorners {
                reason: "corners do not enclose a positive clockwise area".to_string(),
            });
        }
        Ok(corners)
    }

    /// Build from `(x, y)` tuples.
    pub fn from_tuples(points: [(f64, f64); 4]) -> Result<Self, ModelError> {
        Self::new(points.map(Point2D::from))
    }

    /// The ordered corners.
    pub fn points(&self) -> &[Point2D; 4] {
        &self.points
    }

    pub fn top_left(&self) -> Point2D {
        self.points[0]
    }

    pub fn top_right(&self) -> Point2D {
        self.points[1]
    }

    pub fn bottom_right(&self) -> Point2D {
        self.points[2]
    }

    pub fn bottom_left(&self) -> Point2D {
        self.points[3]
    }

    /// Shoelace area, positive for clockwise order on screen.
    pub fn signed_area(&self) -> f64 {
        let mut sum = 0.0;
        for i in 0..4 {
            let p = self.points[i];
            let q = self.points[(i + 1) % 4];
            sum += p.x * q.y - q.x * p.y;
        }
        sum / 2.0
    }

    /// Whether every turn along the boundary bends the same way.
    pub fn is_convex(&self) -> bool {
        let turns: Vec<f64> = (0..4)
            .map(|i| {
                cross(
                    self.points[i],
                    self.points[(i + 1) % 4],
                    self.points[(i + 2) % 4],
                )
            })
            .collect();
        turns.iter().all(|t| *t > 0.0) || turns.iter().all(|t| *t < 0.0)
    }

    /// Multiply every corner by a scale factor (e.g. working → full resolution).
    pub fn scaled(&self, factor: f64) -> Result<Self, ModelError> {
        Self::new(self.points.map(|p| p.scaled(factor)))
    }
}

impl TryFrom<[Point2D; 4]> for CourtCorners {
    type Error = ModelError;

    fn try_from(points: [Point2D; 4]) -> Result<Self, Self::Error> {
        Self::new(points)
    }
}

impl From<CourtCorners> for [Point2D; 4] {
    fn from(corners: CourtCorners) -> Self {
        corners.points
    }
}

/// Z component of `(b - a) × (c - b)`.
fn cross(a: Point2D, b: Point2D, c: Point2D) -> f64 {
    (b.x - a.x) * (c.y - b.y) - (b.y - a.y) * (c.x - b.x)
}
