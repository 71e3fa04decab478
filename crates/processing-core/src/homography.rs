//! Projective transforms between screen space and the court plane.
//!
//! A homography is solved once per session from the four court corners
//! and never changes afterwards. The matrix maps screen pixels to court
//! meters; the inverse is kept alongside for the reverse direction.

use courtside_common::{CalibrationError, CalibrationResult, CourtDimensions};
use courtside_court_model::{CourtCorners, Point2D};
use nalgebra::{Matrix3, SMatrix, SVector};
use serde::{Deserialize, Serialize};

/// Smallest LU pivot, relative to the largest system entry, for the
/// 8x8 system to count as solvable.
const PIVOT_TOLERANCE: f64 = 1e-12;

/// Projective denominators smaller than this map to infinity.
const W_EPSILON: f64 = 1e-12;

/// A 3x3 projective transform together with its inverse.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Homography {
    forward: [[f64; 3]; 3],
    inverse: [[f64; 3]; 3],
}

impl Homography {
    /// Solve the transform taking each `src[i]` to `dst[i]`.
    ///
    /// Direct linear formulation with `h33 = 1`, solved by LU
    /// decomposition.
    pub fn from_correspondences(src: &[Point2D; 4], dst: &[Point2D; 4]) -> CalibrationResult<Self> {
        let mut a = SMatrix::<f64, 8, 8>::zeros();
        let mut b = SVector::<f64, 8>::zeros();

        for i in 0..4 {
            let (x, y) = (src[i].x, src[i].y);
            let (u, v) = (dst[i].x, dst[i].y);

            for (j, value) in [x, y, 1.0, 0.0, 0.0, 0.0, -u * x, -u * y].into_iter().enumerate() {
                a[(2 * i, j)] = value;
            }
            b[2 * i] = u;
            for (j, value) in [0.0, 0.0, 0.0, x, y, 1.0, -v * x, -v * y].into_iter().enumerate() {
                a[(2 * i + 1, j)] = value;
            }
            b[2 * i + 1] = v;
        }

        let scale = a.amax();
        if scale == 0.0 || !scale.is_finite() {
            return Err(CalibrationError::degenerate("corner coordinates are all zero"));
        }

        let lu = a.lu();
        if lu.u().diagonal().amin() < PIVOT_TOLERANCE * scale {
            return Err(CalibrationError::degenerate(
                "linear system for the homography is near-singular",
            ));
        }
        let h = lu.solve(&b).ok_or_else(|| {
            CalibrationError::degenerate("linear system for the homography is singular")
        })?;
        if h.iter().any(|v| !v.is_finite()) {
            return Err(CalibrationError::degenerate("homography has non-finite entries"));
        }

        Self::from_matrix([[h[0], h[1], h[2]], [h[3], h[4], h[5]], [h[6], h[7], 1.0]])
    }

    /// Wrap an explicit matrix, failing if it cannot be inverted.
    pub fn from_matrix(forward: [[f64; 3]; 3]) -> CalibrationResult<Self> {
        let inverse = to_matrix3(&forward)
            .try_inverse()
            .filter(|m| m.iter().all(|v| v.is_finite()))
            .ok_or_else(|| CalibrationError::degenerate("homography matrix is singular"))?;
        Ok(Self {
            forward,
            inverse: to_array(&inverse),
        })
    }

    /// Screen → court matrix, row-major.
    pub fn matrix(&self) -> [[f64; 3]; 3] {
        self.forward
    }

    /// Map a point forward. `None` for points on the vanishing line.
    pub fn apply(&self, point: Point2D) -> Option<Point2D> {
        project(&self.forward, point)
    }

    /// Map a point backward.
    pub fn apply_inverse(&self, point: Point2D) -> Option<Point2D> {
        project(&self.inverse, point)
    }

    /// Compose with an axis scale applied after this transform.
    pub fn then_scale(&self, sx: f64, sy: f64) -> CalibrationResult<Self> {
        let mut forward = self.forward;
        for value in forward[0].iter_mut() {
            *value *= sx;
        }
        for value in forward[1].iter_mut() {
            *value *= sy;
        }
        Self::from_matrix(forward)
    }

    /// Row-major single-precision copy, for image warping.
    pub fn to_f32_row_major(&self) -> [f32; 9] {
        let m = &self.forward;
        [
            m[0][0] as f32,
            m[0][1] as f32,
            m[0][2] as f32,
            m[1][0] as f32,
            m[1][1] as f32,
            m[1][2] as f32,
            m[2][0] as f32,
            m[2][1] as f32,
            m[2][2] as f32,
        ]
    }
}

/// Solve the homography taking the court corners onto the canonical
/// court rectangle `(0, 0)`–`(width_m, length_m)`.
pub fn compute_homography(
    corners: &CourtCorners,
    court: &CourtDimensions,
) -> CalibrationResult<Homography> {
    let dst = court.corners().map(Point2D::from);
    let homography = Homography::from_correspondences(corners.points(), &dst)?;
    tracing::debug!(matrix = ?homography.matrix(), "Solved court homography");
    Ok(homography)
}

fn project(m: &[[f64; 3]; 3], p: Point2D) -> Option<Point2D> {
    let w = m[2][0] * p.x + m[2][1] * p.y + m[2][2];
    if w.abs() < W_EPSILON {
        return None;
    }
    let x = (m[0][0] * p.x + m[0][1] * p.y + m[0][2]) / w;
    let y = (m[1][0] * p.x + m[1][1] * p.y + m[1][2]) / w;
    Some(Point2D::new(x, y))
}

fn to_matrix3(m: &[[f64; 3]; 3]) -> Matrix3<f64> {
    Matrix3::new(
        m[0][0], m[0][1], m[0][2], m[1][0], m[1][1], m[1][2], m[2][0], m[2][1], m[2][2],
    )
}

fn to_array(m: &Matrix3<f64>) -> [[f64; 3]; 3] {
    [
        [m[(0, 0)], m[(0, 1)], m[(0, 2)]],
        [m[(1, 0)], m[(1, 1)], m[(1, 2)]],
        [m[(2, 0)], m[(2, 1)], m[(2, 2)]],
    ]
}
