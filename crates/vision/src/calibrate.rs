//! Court calibration.
//!
//! Calibration runs once per session on the first frame. It yields the
//! four court corners, the screen → court homography solved from them,
//! and the rectified (top-down) reference image that every later frame
//! is compared against. None of these change afterwards.

use std::borrow::Cow;

use courtside_common::{
    AnalysisConfig, CalibrationConfig, CalibrationError, CalibrationResult, CourtDimensions,
};
use courtside_court_model::{CourtCorners, Point2D};
use courtside_processing_core::court_lines::find_court_corners;
use courtside_processing_core::{compute_homography, Homography};
use image::imageops::{self, FilterType};
use image::{Rgb, RgbImage};
use imageproc::geometric_transformations::{warp_into, Interpolation, Projection};

use crate::line_mask::marking_edges;
use crate::picker::CornerPicker;
use crate::segments::extract_segments;

/// How corners are obtained.
pub enum CalibrationMode<'a> {
    /// Ask an operator through a picker.
    Manual(&'a mut dyn CornerPicker),
    /// Detect court lines in the frame.
    Automatic,
}

impl CalibrationMode<'_> {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Manual(_) => "manual",
            Self::Automatic => "automatic",
        }
    }
}

/// Screen → rectified-pixel warp for one session.
#[derive(Debug, Clone, Copy)]
pub struct Rectifier {
    projection: Projection,
    width: u32,
    height: u32,
}

impl Rectifier {
    pub fn new(
        homography: &Homography,
        config: &CalibrationConfig,
        court: &CourtDimensions,
    ) -> CalibrationResult<Self> {
        let ppm = config.rectified_pixels_per_meter;
        let pixels = homography.then_scale(ppm, ppm)?;
        let projection = Projection::from_matrix(pixels.to_f32_row_major())
            .ok_or_else(|| CalibrationError::degenerate("rectification warp is not invertible"))?;
        let (width, height) = config.rectified_size(court);
        Ok(Self {
            projection,
            width,
            height,
        })
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Top-down view of the court plane. Pixels outside the source frame are black.
    pub fn rectify(&self, frame: &RgbImage) -> RgbImage {
        let mut out = RgbImage::new(self.width, self.height);
        warp_into(
            frame,
            &self.projection,
            Interpolation::Bilinear,
            Rgb([0, 0, 0]),
            &mut out,
        );
        out
    }
}

/// Everything fixed by calibration.
#[derive(Debug, Clone)]
pub struct Calibration {
    /// "manual" or "automatic".
    pub mode: &'static str,
    pub corners: CourtCorners,
    pub homography: Homography,
    pub rectifier: Rectifier,
    /// Rectified calibration frame.
    pub reference: RgbImage,
}

/// Obtains court corners and derives the session geometry.
#[derive(Debug, Clone)]
pub struct CourtCalibrator {
    config: CalibrationConfig,
    court: CourtDimensions,
}

impl CourtCalibrator {
    pub fn new(config: &AnalysisConfig) -> Self {
        Self {
            config: config.calibration.clone(),
            court: config.court,
        }
    }

    /// Four validated corners, from an operator or from line detection.
    pub fn obtain_corners(
        &self,
        frame: &RgbImage,
        mode: CalibrationMode<'_>,
    ) -> CalibrationResult<CourtCorners> {
        match mode {
            CalibrationMode::Manual(picker) => {
                let points = picker.present(frame)?;
                tracing::info!(?points, "Corners selected manually");
                validate(points)
            }
            CalibrationMode::Automatic => self.detect_corners(frame),
        }
    }

    /// Automatic corner detection.
    ///
    /// Frames wider than the working width are downscaled first; the
    /// corners found are scaled back to full resolution.
    pub fn detect_corners(&self, frame: &RgbImage) -> CalibrationResult<CourtCorners> {
        let (width, height) = frame.dimensions();
        let working_width = self.config.working_width.max(1);

        let (working, scale): (Cow<'_, RgbImage>, f64) = if width > working_width {
            let scale = width as f64 / working_width as f64;
            let working_height = ((height as f64 / scale) as u32).max(1);
            let resized = imageops::resize(frame, working_width, working_height, FilterType::Triangle);
            (Cow::Owned(resized), scale)
        } else {
            (Cow::Borrowed(frame), 1.0)
        };

        let edges = marking_edges(&working, &self.config);
        let segments = extract_segments(&edges, &self.config);
        let search = find_court_corners(&segments, working.width(), working.height(), &self.config)?;

        tracing::debug!(
            segments = search.segment_count,
            intersections = search.intersection_count,
            unique = search.unique_count,
            scale,
            "Detected court corners"
        );

        validate(search.corners.map(|p| p.scaled(scale)))
    }

    pub fn compute_homography(&self, corners: &CourtCorners) -> CalibrationResult<Homography> {
        compute_homography(corners, &self.court)
    }

    pub fn rectifier(&self, homography: &Homography) -> CalibrationResult<Rectifier> {
        Rectifier::new(homography, &self.config, &self.court)
    }

    /// Fixed-size top-down view of a frame.
    pub fn rectify(&self, frame: &RgbImage, homography: &Homography) -> CalibrationResult<RgbImage> {
        Ok(self.rectifier(homography)?.rectify(frame))
    }

    /// Obtain corners, solve the homography and rectify the reference frame.
    pub fn calibrate(
        &self,
        frame: &RgbImage,
        mode: CalibrationMode<'_>,
    ) -> CalibrationResult<Calibration> {
        let mode_name = mode.name();
        let corners = self.obtain_corners(frame, mode)?;
        let homography = self.compute_homography(&corners)?;
        let rectifier = self.rectifier(&homography)?;
        let reference = rectifier.rectify(frame);

        tracing::info!(mode = mode_name, corners = ?corners.points(), "Court calibrated");

        Ok(Calibration {
            mode: mode_name,
            corners,
            homography,
            rectifier,
            reference,
        })
    }
}

fn validate(points: [Point2D; 4]) -> CalibrationResult<CourtCorners> {
    CourtCorners::new(points).map_err(|e| CalibrationError::degenerate(e.to_string()))
}
