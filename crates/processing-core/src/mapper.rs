//! Screen → court → canvas coordinate mapping.
//!
//! The canvas is a mini-court drawn in the top-right corner of the output
//! frame. Its geometry is derived once from the frame size:
//!
//! ```text
//!            start_x            end_x   w
//!   buffer ┌─────────────────────┐
//!          │ padding             │
//!          │   ┌─────────────┐   │
//!          │   │ court area  │   │
//!          │   └─────────────┘   │
//!   end_y  └─────────────────────┘
//! ```

use courtside_common::{CanvasLayout, CourtDimensions};
use courtside_court_model::{CanvasPoint, Point2D};

use crate::homography::Homography;

/// Pixel geometry of the canvas box and the court drawn inside it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CanvasGeometry {
    pub start_x: i32,
    pub start_y: i32,
    pub end_x: i32,
    pub end_y: i32,
    pub court_start_x: i32,
    pub court_start_y: i32,
    pub court_end_x: i32,
    pub court_end_y: i32,
}

impl CanvasGeometry {
    /// Place the canvas for an output frame of `width` × `height` pixels.
    pub fn from_frame(width: u32, _height: u32, layout: &CanvasLayout) -> Self {
        let (rect_w, rect_h) = (layout.rect_width as i32, layout.rect_height as i32);
        let (buffer, padding) = (layout.buffer as i32, layout.padding as i32);

        let end_x = width as i32 - buffer;
        let end_y = buffer + rect_h;
        let start_x = end_x - rect_w;
        let start_y = end_y - rect_h;

        Self {
            start_x,
            start_y,
            end_x,
            end_y,
            court_start_x: start_x + padding,
            court_start_y: start_y + padding,
            court_end_x: end_x - padding,
            court_end_y: end_y - padding,
        }
    }

    pub fn court_width(&self) -> i32 {
        self.court_end_x - self.court_start_x
    }

    pub fn court_height(&self) -> i32 {
        self.court_end_y - self.court_start_y
    }

    /// Whether a point lies strictly inside the canvas box.
    pub fn contains(&self, point: CanvasPoint) -> bool {
        point.x > self.start_x
            && point.x < self.end_x
            && point.y > self.start_y
            && point.y < self.end_y
    }

    /// Court meters to canvas pixels (independent per-axis scale).
    pub fn court_to_canvas(&self, meters: Point2D, court: &CourtDimensions) -> CanvasPoint {
        let x = self.court_start_x as f64 + meters.x / court.width_m * self.court_width() as f64;
        let y =
            self.court_start_y as f64 + meters.y / court.length_m * self.court_height() as f64;
        CanvasPoint::new(x as i32, y as i32)
    }
}

/// Maps screen points into court meters and canvas pixels.
#[derive(Debug, Clone, Copy)]
pub struct CourtCoordinateMapper {
    homography: Homography,
    canvas: CanvasGeometry,
    court: CourtDimensions,
}

impl CourtCoordinateMapper {
    pub fn new(homography: Homography, canvas: CanvasGeometry, court: CourtDimensions) -> Self {
        Self {
            homography,
            canvas,
            court,
        }
    }

    pub fn canvas(&self) -> &CanvasGeometry {
        &self.canvas
    }

    pub fn court(&self) -> &CourtDimensions {
        &self.court
    }

    /// Screen pixels to court meters. `None` on the vanishing line.
    pub fn screen_to_court(&self, point: Point2D) -> Option<Point2D> {
        self.homography.apply(point)
    }

    pub fn court_to_canvas(&self, meters: Point2D) -> CanvasPoint {
        self.canvas.court_to_canvas(meters, &self.court)
    }

    /// Screen pixels straight to canvas pixels.
    pub fn screen_to_canvas(&self, point: Point2D) -> Option<CanvasPoint> {
        self.screen_to_court(point).map(|m| self.court_to_canvas(m))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::homography::compute_homography;
    use courtside_court_model::CourtCorners;

    fn geometry() -> CanvasGeometry {
        CanvasGeometry::from_frame(1920, 1080, &CanvasLayout::default())
    }

    #[test]
    fn test_canvas_geometry_top_right() {
        let g = geometry();
        assert_eq!((g.start_x, g.start_y, g.end_x, g.end_y), (1620, 50, 1870, 600));
        assert_eq!(
            (g.court_start_x, g.court_start_y, g.court_end_x, g.court_end_y),
            (1640, 70, 1850, 580)
        );
        assert_eq!((g.court_width(), g.court_height()), (210, 510));
    }

    #[test]
    fn test_court_corners_hit_canvas_court_corners() {
        let g = geometry();
        let court = CourtDimensions::default();
        assert_eq!(
            g.court_to_canvas(Point2D::new(0.0, 0.0), &court),
            CanvasPoint::new(1640, 70)
        );
        assert_eq!(
            g.court_to_canvas(Point2D::new(court.width_m, court.length_m), &court),
            CanvasPoint::new(1850, 580)
        );
    }

    #[test]
    fn test_contains_is_strict() {
        let g = geometry();
        assert!(g.contains(CanvasPoint::new(1700, 300)));
        assert!(!g.contains(CanvasPoint::new(1620, 300)));
        assert!(!g.contains(CanvasPoint::new(1700, 700)));
    }

    #[test]
    fn test_screen_to_canvas_composes() {
        let corners =
            CourtCorners::from_tuples([(0.0, 0.0), (100.0, 0.0), (100.0, 200.0), (0.0, 200.0)])
                .unwrap();
        let court = CourtDimensions::default();
        let homography = compute_homography(&corners, &court).unwrap();
        let mapper = CourtCoordinateMapper::new(homography, geometry(), court);

        let center = mapper.screen_to_court(Point2D::new(50.0, 100.0)).unwrap();
        assert!((center.x - 5.485).abs() < 1e-9);
        assert!((center.y - 11.885).abs() < 1e-9);
        let canvas = mapper.screen_to_canvas(Point2D::new(50.0, 100.0)).unwrap();
        assert!((canvas.x - 1745).abs() <= 1 && (canvas.y - 325).abs() <= 1);
    }
}
