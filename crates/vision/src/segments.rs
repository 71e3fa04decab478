//! Line segment extraction from an edge map.
//!
//! The Hough transform finds infinite lines with enough edge votes. Each
//! line is then walked across the image and the edge pixels along it are
//! split into runs wherever the gap between hits exceeds `max_line_gap`.
//! Runs shorter than `min_line_length` are dropped.

use courtside_common::CalibrationConfig;
use courtside_processing_core::LineSegment;
use image::GrayImage;
use imageproc::hough::{detect_lines, LineDetectionOptions, PolarLine};

const EPSILON: f64 = 1e-6;

/// Detect line segments in an edge map.
pub fn extract_segments(edges: &GrayImage, config: &CalibrationConfig) -> Vec<LineSegment> {
    let options = LineDetectionOptions {
        vote_threshold: config.hough_vote_threshold,
        suppression_radius: config.hough_suppression_radius,
    };
    let lines = detect_lines(edges, options);

    let segments: Vec<LineSegment> = lines
        .iter()
        .flat_map(|line| walk_line(edges, line, config.max_line_gap, config.min_line_length))
        .collect();

    tracing::debug!(
        lines = lines.len(),
        segments = segments.len(),
        "Extracted line segments"
    );
    segments
}

/// Endpoints where a polar line (`x cos θ + y sin θ = r`) crosses the
/// image border, farthest pair first.
fn border_points(width: u32, height: u32, line: &PolarLine) -> Option<((f64, f64), (f64, f64))> {
    let theta = (line.angle_in_degrees as f64).to_radians();
    let (cos_t, sin_t) = (theta.cos(), theta.sin());
    let r = line.r as f64;
    let (max_x, max_y) = ((width - 1) as f64, (height - 1) as f64);

    let mut hits: Vec<(f64, f64)> = Vec::with_capacity(4);
    if sin_t.abs() > EPSILON {
        for x in [0.0, max_x] {
            let y = (r - x * cos_t) / sin_t;
            if (0.0..=max_y).contains(&y) {
                hits.push((x, y));
            }
        }
    }
    if cos_t.abs() > EPSILON {
        for y in [0.0, max_y] {
            let x = (r - y * sin_t) / cos_t;
            if (0.0..=max_x).contains(&x) {
                hits.push((x, y));
            }
        }
    }

    let mut best: Option<((f64, f64), (f64, f64), f64)> = None;
    for (i, a) in hits.iter().enumerate() {
        for b in &hits[i + 1..] {
            let d = (a.0 - b.0).powi(2) + (a.1 - b.1).powi(2);
            if best.map_or(true, |(_, _, bd)| d > bd) {
                best = Some((*a, *b, d));
            }
        }
    }
    best.filter(|(_, _, d)| *d > EPSILON).map(|(a, b, _)| (a, b))
}

fn is_edge_near(edges: &GrayImage, x: f64, y: f64, normal: (f64, f64)) -> bool {
    [0.0, -1.0, 1.0].iter().any(|&offset| {
        let px = (x + normal.0 * offset).round();
        let py = (y + normal.1 * offset).round();
        px >= 0.0
            && py >= 0.0
            && (px as u32) < edges.width()
            && (py as u32) < edges.height()
            && edges.get_pixel(px as u32, py as u32).0[0] > 0
    })
}

fn walk_line(edges: &GrayImage, line: &PolarLine, max_gap: f64, min_length: f64) -> Vec<LineSegment> {
    if edges.width() == 0 || edges.height() == 0 {
        return Vec::new();
    }
    let Some((p0, p1)) = border_points(edges.width(), edges.height(), line) else {
        return Vec::new();
    };

    let theta = (line.angle_in_degrees as f64).to_radians();
    let normal = (theta.cos(), theta.sin());
    let (dx, dy) = (p1.0 - p0.0, p1.1 - p0.1);
    let steps = (dx.abs().max(dy.abs()).ceil() as usize).max(1);
    let step_len = (dx * dx + dy * dy).sqrt() / steps as f64;

    let hits: Vec<(usize, (f64, f64))> = (0..=steps)
        .filter_map(|i| {
            let t = i as f64 / steps as f64;
            let (x, y) = (p0.0 + dx * t, p0.1 + dy * t);
            is_edge_near(edges, x, y, normal).then_some((i, (x, y)))
        })
        .collect();

    let mut segments = Vec::new();
    let mut run_start = 0;
    for k in 1..=hits.len() {
        let split = k == hits.len()
            || (hits[k].0 - hits[k - 1].0) as f64 * step_len > max_gap;
        if !split {
            continue;
        }
        let (a, b) = (hits[run_start].1, hits[k - 1].1);
        let segment = LineSegment::new(a.0, a.1, b.0, b.1);
        if segment.length() >= min_length {
            segments.push(segment);
        }
        run_start = k;
    }
    segments
}

#[cfg(test)]
mod tests {
    use super::*;
    use courtside_processing_core::court_lines::Orientation;
    use image::Luma;

    fn horizontal_edge(y: u32, from: u32, to: u32) -> GrayImage {
        let mut edges = GrayImage::new(200, 100);
        for x in from..to {
            edges.put_pixel(x, y, Luma([255]));
        }
        edges
    }

    #[test]
    fn test_border_points_of_horizontal_line() {
        let line = PolarLine {
            r: 40.0,
            angle_in_degrees: 90,
        };
        let (a, b) = border_points(200, 100, &line).unwrap();
        let xs = [a.0, b.0];
        assert!(xs.contains(&0.0) && xs.contains(&199.0));
        assert!((a.1 - 40.0).abs() < 1e-6 && (b.1 - 40.0).abs() < 1e-6);
    }

    #[test]
    fn test_walk_splits_on_gap() {
        let mut edges = horizontal_edge(40, 10, 90);
        for x in 130..190 {
            edges.put_pixel(x, 40, Luma([255]));
        }
        let line = PolarLine {
            r: 40.0,
            angle_in_degrees: 90,
        };
        let segments = walk_line(&edges, &line, 20.0, 50.0);
        assert_eq!(segments.len(), 2);
        assert!(segments
            .iter()
            .all(|s| s.orientation() == Orientation::Horizontal));
    }

    #[test]
    fn test_walk_drops_short_runs() {
        let edges = horizontal_edge(40, 10, 40);
        let line = PolarLine {
            r: 40.0,
            angle_in_degrees: 90,
        };
        assert!(walk_line(&edges, &line, 20.0, 50.0).is_empty());
    }

    #[test]
    fn test_extract_finds_long_edge() {
        let edges = horizontal_edge(40, 10, 190);
        let segments = extract_segments(&edges, &CalibrationConfig::default());
        assert!(!segments.is_empty());
        assert!(segments.iter().any(|s| s.length() > 150.0));
    }
}
