//! Court-marking isolation.
//!
//! Court lines are painted white: bright and unsaturated against a
//! coloured surface. Thresholding HLS lightness picks them out; a
//! morphological close fills pinholes in the painted stripes, and a
//! light blur softens the mask before edge extraction.

use courtside_common::CalibrationConfig;
use image::{GrayImage, Luma, Rgb, RgbImage};
use imageproc::distance_transform::Norm;
use imageproc::edges::canny;
use imageproc::filter::gaussian_blur_f32;
use imageproc::morphology::close;

/// HLS lightness of an 8-bit pixel: the midpoint of its largest and
/// smallest channel, rounded half up.
pub fn lightness(pixel: &Rgb<u8>) -> u8 {
    let [r, g, b] = pixel.0;
    let max = r.max(g).max(b) as u16;
    let min = r.min(g).min(b) as u16;
    ((max + min + 1) / 2) as u8
}

/// Binary mask (0 / 255) of pixels at or above the lightness threshold.
pub fn lightness_mask(frame: &RgbImage, threshold: u8) -> GrayImage {
    let mut mask = GrayImage::new(frame.width(), frame.height());
    for (x, y, pixel) in frame.enumerate_pixels() {
        if lightness(pixel) >= threshold {
            mask.put_pixel(x, y, Luma([255]));
        }
    }
    mask
}

/// Closed and blurred line-marking mask.
pub fn marking_mask(frame: &RgbImage, config: &CalibrationConfig) -> GrayImage {
    let mask = lightness_mask(frame, config.lightness_threshold);
    let closed = close(&mask, Norm::LInf, config.close_radius);
    gaussian_blur_f32(&closed, config.blur_sigma)
}

/// Edge map of the marking mask.
pub fn marking_edges(frame: &RgbImage, config: &CalibrationConfig) -> GrayImage {
    let mask = marking_mask(frame, config);
    canny(&mask, config.canny_low, config.canny_high)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lightness() {
        assert_eq!(lightness(&Rgb([255, 255, 255])), 255);
        assert_eq!(lightness(&Rgb([0, 0, 0])), 0);
        assert_eq!(lightness(&Rgb([255, 0, 0])), 128);
        assert_eq!(lightness(&Rgb([200, 190, 180])), 190);
    }

    #[test]
    fn test_mask_keeps_white_lines_only() {
        let mut frame = RgbImage::from_pixel(20, 20, Rgb([40, 120, 60]));
        for x in 0..20 {
            frame.put_pixel(x, 10, Rgb([240, 240, 240]));
        }
        let mask = lightness_mask(&frame, 190);
        assert_eq!(mask.get_pixel(5, 10).0[0], 255);
        assert_eq!(mask.get_pixel(5, 5).0[0], 0);
    }

    #[test]
    fn test_close_fills_pinholes() {
        let mut frame = RgbImage::from_pixel(30, 30, Rgb([40, 120, 60]));
        for x in 0..30 {
            for y in 12..18 {
                frame.put_pixel(x, y, Rgb([245, 245, 245]));
            }
        }
        frame.put_pixel(15, 15, Rgb([40, 120, 60]));

        let config = CalibrationConfig::default();
        let mask = lightness_mask(&frame, config.lightness_threshold);
        assert_eq!(mask.get_pixel(15, 15).0[0], 0);
        let closed = close(&mask, Norm::LInf, config.close_radius);
        assert_eq!(closed.get_pixel(15, 15).0[0], 255);
    }

    #[test]
    fn test_edges_follow_marking() {
        let mut frame = RgbImage::from_pixel(60, 60, Rgb([40, 120, 60]));
        for x in 0..60 {
            for y in 28..33 {
                frame.put_pixel(x, y, Rgb([250, 250, 250]));
            }
        }
        let edges = marking_edges(&frame, &CalibrationConfig::default());
        let edge_rows: Vec<u32> = (0..60)
            .filter(|&y| edges.get_pixel(30, y).0[0] > 0)
            .collect();
        assert!(!edge_rows.is_empty());
        assert!(edge_rows.iter().all(|&y| (24..=36).contains(&y)));
    }
}
