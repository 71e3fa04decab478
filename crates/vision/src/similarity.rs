//! Frame similarity by hue/saturation distribution.
//!
//! Each image is reduced to a 2D hue × saturation histogram (8-bit HSV
//! convention: hue in `[0, 180)`, saturation in `[0, 256)`), min-max
//! normalised to `[0, 1]`, and compared with Pearson correlation. A
//! rectified frame showing the empty court correlates strongly with the
//! reference; crowd shots, replays and close-ups do not.

use image::{Rgb, RgbImage};

const HUE_RANGE: f64 = 180.0;
const SATURATION_RANGE: f64 = 256.0;

/// 8-bit hue and saturation of a pixel.
pub fn hue_saturation(pixel: &Rgb<u8>) -> (u8, u8) {
    let [r, g, b] = pixel.0.map(f64::from);
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let delta = max - min;

    let saturation = if max > 0.0 {
        (delta * 255.0 / max).round()
    } else {
        0.0
    };

    if delta == 0.0 {
        return (0, saturation as u8);
    }
    let mut hue = if max == r {
        60.0 * (g - b) / delta
    } else if max == g {
        120.0 + 60.0 * (b - r) / delta
    } else {
        240.0 + 60.0 * (r - g) / delta
    };
    if hue < 0.0 {
        hue += 360.0;
    }
    let mut half = (hue / 2.0).round();
    if half >= HUE_RANGE {
        half -= HUE_RANGE;
    }
    (half as u8, saturation as u8)
}

/// Hue × saturation histogram, row-major by hue bin.
#[derive(Debug, Clone, PartialEq)]
pub struct HueSaturationHistogram {
    hue_bins: usize,
    saturation_bins: usize,
    counts: Vec<f64>,
}

impl HueSaturationHistogram {
    pub fn from_image(image: &RgbImage, hue_bins: usize, saturation_bins: usize) -> Self {
        let hue_bins = hue_bins.max(1);
        let saturation_bins = saturation_bins.max(1);
        let mut counts = vec![0.0; hue_bins * saturation_bins];

        for pixel in image.pixels() {
            let (h, s) = hue_saturation(pixel);
            let hb = ((h as f64 * hue_bins as f64 / HUE_RANGE) as usize).min(hue_bins - 1);
            let sb = ((s as f64 * saturation_bins as f64 / SATURATION_RANGE) as usize)
                .min(saturation_bins - 1);
            counts[hb * saturation_bins + sb] += 1.0;
        }

        Self {
            hue_bins,
            saturation_bins,
            counts,
        }
    }

    pub fn bins(&self) -> (usize, usize) {
        (self.hue_bins, self.saturation_bins)
    }

    pub fn counts(&self) -> &[f64] {
        &self.counts
    }

    /// Rescale so the smallest bin is 0 and the largest is 1. A flat
    /// histogram becomes all zeros.
    pub fn normalized(&self) -> Self {
        let min = self.counts.iter().copied().fold(f64::INFINITY, f64::min);
        let max = self.counts.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let range = max - min;
        let counts = self
            .counts
            .iter()
            .map(|&c| if range > 0.0 { (c - min) / range } else { 0.0 })
            .collect();
        Self {
            counts,
            ..self.clone()
        }
    }

    /// Pearson correlation of bin values. Identical constant histograms
    /// correlate perfectly (1.0).
    pub fn correlation(&self, other: &Self) -> f64 {
        let n = self.counts.len().min(other.counts.len());
        if n == 0 {
            return 1.0;
        }
        let mean_a = self.counts[..n].iter().sum::<f64>() / n as f64;
        let mean_b = other.counts[..n].iter().sum::<f64>() / n as f64;

        let (mut cov, mut var_a, mut var_b) = (0.0, 0.0, 0.0);
        for (a, b) in self.counts[..n].iter().zip(&other.counts[..n]) {
            let (da, db) = (a - mean_a, b - mean_b);
            cov += da * db;
            var_a += da * da;
            var_b += db * db;
        }

        let denom = (var_a * var_b).sqrt();
        if denom > f64::EPSILON {
            cov / denom
        } else {
            1.0
        }
    }
}

/// Similarity of two images: correlation of their normalised hue/saturation histograms.
pub fn frame_similarity(
    reference: &HueSaturationHistogram,
    frame: &RgbImage,
) -> f64 {
    let (hue_bins, saturation_bins) = reference.bins();
    let histogram = HueSaturationHistogram::from_image(frame, hue_bins, saturation_bins).normalized();
    reference.correlation(&histogram)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn court_like() -> RgbImage {
        let mut image = RgbImage::from_pixel(40, 40, Rgb([40, 120, 60]));
        for x in 0..40 {
            image.put_pixel(x, 20, Rgb([250, 250, 250]));
        }
        for y in 0..40 {
            image.put_pixel(10, y, Rgb([60, 90, 200]));
        }
        image
    }

    #[test]
    fn test_hue_saturation_primaries() {
        assert_eq!(hue_saturation(&Rgb([255, 0, 0])), (0, 255));
        assert_eq!(hue_saturation(&Rgb([0, 255, 0])), (60, 255));
        assert_eq!(hue_saturation(&Rgb([0, 0, 255])), (120, 255));
        assert_eq!(hue_saturation(&Rgb([128, 128, 128])), (0, 0));
        assert_eq!(hue_saturation(&Rgb([0, 0, 0])), (0, 0));
    }

    #[test]
    fn test_histogram_counts_every_pixel() {
        let image = court_like();
        let hist = HueSaturationHistogram::from_image(&image, 50, 60);
        assert_eq!(hist.counts().len(), 3000);
        assert_eq!(hist.counts().iter().sum::<f64>(), 1600.0);
    }

    #[test]
    fn test_identical_images_correlate_fully() {
        let image = court_like();
        let reference = HueSaturationHistogram::from_image(&image, 50, 60).normalized();
        assert!((frame_similarity(&reference, &image) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_different_scene_scores_low() {
        let reference = HueSaturationHistogram::from_image(&court_like(), 50, 60).normalized();
        let crowd = RgbImage::from_fn(40, 40, |x, y| {
            Rgb([(x * 6) as u8, (y * 6) as u8, ((x + y) * 3) as u8])
        });
        assert!(frame_similarity(&reference, &crowd) < 0.85);
    }

    #[test]
    fn test_flat_histograms_correlate_fully() {
        let flat = HueSaturationHistogram {
            hue_bins: 2,
            saturation_bins: 2,
            counts: vec![3.0; 4],
        };
        assert_eq!(flat.normalized().counts(), &[0.0; 4]);
        assert_eq!(flat.correlation(&flat), 1.0);
    }
}
