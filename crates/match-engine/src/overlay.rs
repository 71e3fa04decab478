//! Mini-court overlay rendering.
//!
//! Every annotated frame carries the tracked object boxes and a top-down
//! mini court in the canvas box, with all bounces of the session plotted
//! as translucent dots.

use courtside_common::CourtDimensions;
use courtside_court_model::{BoundingBox, CanvasPoint, FrameDetections};
use courtside_processing_core::CanvasGeometry;
use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_filled_circle_mut, draw_filled_rect_mut};
use imageproc::rect::Rect;
use rayon::prelude::*;

/// Distance of each service line from the net, in meters.
const SERVICE_LINE_FROM_NET_M: f64 = 6.4;

/// Width of a doubles alley, in meters.
const DOUBLES_ALLEY_M: f64 = 1.37;

const LINE_THICKNESS: i32 = 2;
const BOUNCE_RADIUS: i32 = 10;
const BOUNCE_ALPHA: f32 = 0.6;

const BACKGROUND: Rgb<u8> = Rgb([255, 255, 255]);
const LINE_COLOR: Rgb<u8> = Rgb([0, 0, 0]);
const NET_COLOR: Rgb<u8> = Rgb([0, 0, 255]);
const BOUNCE_COLOR: Rgb<u8> = Rgb([255, 0, 0]);
const BOX_COLOR: Rgb<u8> = Rgb([255, 255, 0]);

/// Pixel positions of the interior court lines on the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CourtLines {
    pub net_y: i32,
    pub service_top_y: i32,
    pub service_bottom_y: i32,
    /// Centre service line, drawn between the two service lines.
    pub center_x: i32,
    pub singles_left_x: i32,
    pub singles_right_x: i32,
}

impl CourtLines {
    pub fn new(canvas: &CanvasGeometry, court: &CourtDimensions) -> Self {
        let w = canvas.court_width() as f64;
        let h = canvas.court_height() as f64;
        let service = (court.length_m / 2.0 - SERVICE_LINE_FROM_NET_M) / court.length_m;
        let alley = DOUBLES_ALLEY_M / court.width_m;

        Self {
            net_y: (canvas.court_start_y as f64 + h / 2.0) as i32,
            service_top_y: (canvas.court_start_y as f64 + h * service) as i32,
            service_bottom_y: (canvas.court_end_y as f64 - h * service) as i32,
            center_x: (canvas.court_start_x as f64 + w / 2.0) as i32,
            singles_left_x: (canvas.court_start_x as f64 + w * alley) as i32,
            singles_right_x: (canvas.court_end_x as f64 - w * alley) as i32,
        }
    }
}

/// Draws the mini court, bounce dots and object boxes.
#[derive(Debug, Clone, Copy)]
pub struct MiniCourt {
    canvas: CanvasGeometry,
    lines: CourtLines,
}

impl MiniCourt {
    pub fn new(canvas: CanvasGeometry, court: &CourtDimensions) -> Self {
        Self {
            canvas,
            lines: CourtLines::new(&canvas, court),
        }
    }

    pub fn canvas(&self) -> &CanvasGeometry {
        &self.canvas
    }

    pub fn lines(&self) -> &CourtLines {
        &self.lines
    }

    /// Background box and court markings.
    pub fn draw_court(&self, frame: &mut RgbImage) {
        let c = &self.canvas;
        let l = &self.lines;

        fill(frame, c.start_x, c.start_y, c.end_x, c.end_y, BACKGROUND);
        outline(frame, c.start_x, c.start_y, c.end_x, c.end_y, LINE_COLOR);
        outline(frame, c.court_start_x, c.court_start_y, c.court_end_x, c.court_end_y, LINE_COLOR);

        horizontal(frame, c.court_start_x, c.court_end_x, l.service_top_y, LINE_COLOR);
        horizontal(frame, c.court_start_x, c.court_end_x, l.service_bottom_y, LINE_COLOR);
        vertical(frame, l.center_x, l.service_top_y, l.service_bottom_y, LINE_COLOR);
        vertical(frame, l.singles_left_x, c.court_start_y, c.court_end_y, LINE_COLOR);
        vertical(frame, l.singles_right_x, c.court_start_y, c.court_end_y, LINE_COLOR);
        horizontal(frame, c.court_start_x, c.court_end_x, l.net_y, NET_COLOR);
    }

    /// Blend a dot for each bounce strictly inside the canvas box.
    pub fn draw_bounces(&self, frame: &mut RgbImage, bounces: &[CanvasPoint]) {
        let mut visible = bounces.iter().filter(|p| self.canvas.contains(**p)).peekable();
        if visible.peek().is_none() {
            return;
        }

        let mut overlay = frame.clone();
        for p in visible {
            draw_filled_circle_mut(&mut overlay, (p.x, p.y), BOUNCE_RADIUS, BOUNCE_COLOR);
        }
        blend(frame, &overlay, BOUNCE_ALPHA);
    }

    /// One annotated frame: boxes first, then the mini court on top.
    pub fn render_frame(
        &self,
        frame: &RgbImage,
        boxes: &FrameDetections,
        bounces: &[CanvasPoint],
    ) -> RgbImage {
        let mut out = frame.clone();
        for bbox in boxes.values() {
            draw_box(&mut out, bbox);
        }
        self.draw_court(&mut out);
        self.draw_bounces(&mut out, bounces);
        out
    }

    /// Annotate a frame sequence. `boxes[k]` belongs to `frames[k]`;
    /// frames without an entry get no boxes.
    pub fn render_all(
        &self,
        frames: &[RgbImage],
        boxes: &[FrameDetections],
        bounces: &[CanvasPoint],
    ) -> Vec<RgbImage> {
        let empty = FrameDetections::new();
        frames
            .par_iter()
            .enumerate()
            .map(|(i, frame)| self.render_frame(frame, boxes.get(i).unwrap_or(&empty), bounces))
            .collect()
    }
}

/// Hollow box around a detection. Coordinates are clamped to just
/// outside the frame, so off-frame edges stay invisible; non-finite
/// boxes are skipped.
pub fn draw_box(frame: &mut RgbImage, bbox: &BoundingBox) {
    if [bbox.x1, bbox.y1, bbox.x2, bbox.y2].iter().any(|v| !v.is_finite()) {
        tracing::debug!(?bbox, "Skipping box with non-finite coordinates");
        return;
    }
    let margin = f64::from(LINE_THICKNESS);
    let max_x = f64::from(frame.width()) + margin;
    let max_y = f64::from(frame.height()) + margin;
    let x = |v: f64| v.clamp(-margin, max_x) as i32;
    let y = |v: f64| v.clamp(-margin, max_y) as i32;

    outline(frame, x(bbox.x1), y(bbox.y1), x(bbox.x2), y(bbox.y2), BOX_COLOR);
}

/// `frame = alpha * overlay + (1 - alpha) * frame`, rounded.
fn blend(frame: &mut RgbImage, overlay: &RgbImage, alpha: f32) {
    for (dst, src) in frame.pixels_mut().zip(overlay.pixels()) {
        if *dst == *src {
            continue;
        }
        for (d, s) in dst.0.iter_mut().zip(src.0) {
            *d = (alpha * s as f32 + (1.0 - alpha) * *d as f32).round() as u8;
        }
    }
}

/// Filled rectangle spanning `[x0, x1) × [y0, y1)`, at least one pixel each way.
fn fill(frame: &mut RgbImage, x0: i32, y0: i32, x1: i32, y1: i32, color: Rgb<u8>) {
    let width = x1.saturating_sub(x0).max(1) as u32;
    let height = y1.saturating_sub(y0).max(1) as u32;
    draw_filled_rect_mut(frame, Rect::at(x0, y0).of_size(width, height), color);
}

fn horizontal(frame: &mut RgbImage, x0: i32, x1: i32, y: i32, color: Rgb<u8>) {
    fill(frame, x0, y, x1.saturating_add(1), y.saturating_add(LINE_THICKNESS), color);
}

fn vertical(frame: &mut RgbImage, x: i32, y0: i32, y1: i32, color: Rgb<u8>) {
    fill(frame, x, y0, x.saturating_add(LINE_THICKNESS), y1.saturating_add(1), color);
}

fn outline(frame: &mut RgbImage, x0: i32, y0: i32, x1: i32, y1: i32, color: Rgb<u8>) {
    horizontal(frame, x0, x1, y0, color);
    horizontal(frame, x0, x1, y1.saturating_sub(LINE_THICKNESS - 1), color);
    vertical(frame, x0, y0, y1, color);
    vertical(frame, x1.saturating_sub(LINE_THICKNESS - 1), y0, y1, color);
}
