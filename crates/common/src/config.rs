//! Application and analysis configuration.
//!
//! Every tunable constant of the analysis lives here, so calibration,
//! segmentation and reconstruction receive an explicit immutable value
//! instead of compiled-in literals.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{CourtsideError, CourtsideResult};

/// Global application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Directory holding detection caches keyed by session id.
    pub cache_dir: PathBuf,

    /// Default directory for analysis outputs.
    pub output_dir: PathBuf,

    /// Analysis parameters.
    #[serde(default)]
    pub analysis: AnalysisConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// All parameters of a match analysis session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub court: CourtDimensions,
    pub calibration: CalibrationConfig,
    pub segmentation: SegmentationConfig,
    pub trajectory: TrajectoryConfig,
    pub canvas: CanvasLayout,
}

/// Real-world court size in meters (doubles court).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CourtDimensions {
    pub width_m: f64,
    pub length_m: f64,
}

/// Optional sanity check applied to automatically detected corners.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum QuadCheck {
    /// Accept the first four corners in angular order as-is.
    #[default]
    Off,
    /// Require a convex quadrilateral enclosing at least `min_area` px².
    ConvexPositiveArea { min_area: f64 },
}

/// Parameters for court calibration and rectification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalibrationConfig {
    /// Frames wider than this are downscaled before line detection.
    pub working_width: u32,
    /// Minimum HLS lightness (0-255) for a pixel to count as line marking.
    pub lightness_threshold: u8,
    /// Radius of the square closing kernel (2 => 5x5).
    pub close_radius: u8,
    /// Gaussian sigma applied to the closed mask.
    pub blur_sigma: f32,
    pub canny_low: f32,
    pub canny_high: f32,
    /// Minimum accumulator votes for a Hough line.
    pub hough_vote_threshold: u32,
    /// Non-maximum suppression radius in Hough space.
    pub hough_suppression_radius: u32,
    /// Segments shorter than this (px) are discarded.
    pub min_line_length: f64,
    /// Largest run of missing edge pixels bridged inside one segment.
    pub max_line_gap: f64,
    /// Intersections may lie this far (px) outside the frame.
    pub bounds_margin: f64,
    /// Intersections closer than this (px) merge into one corner.
    pub cluster_tolerance: f64,
    /// Resolution of the rectified top-down image.
    pub rectified_pixels_per_meter: f64,
    pub quad_check: QuadCheck,
}

/// What happens to an action interval still open when the stream ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TrailingPolicy {
    /// Close it at the last frame.
    #[default]
    Close,
    /// Discard it.
    Drop,
}

/// Parameters for in-play / dead-time segmentation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SegmentationConfig {
    /// A frame is in play when its similarity is strictly above this.
    pub similarity_threshold: f64,
    /// Dual-threshold enhancement: once in play, stay while similarity is
    /// above this lower value. `None` keeps the single-threshold behavior.
    pub release_threshold: Option<f64>,
    pub hue_bins: usize,
    pub saturation_bins: usize,
    pub trailing: TrailingPolicy,
    /// Intervals at least this long are logged when they end.
    pub min_logged_duration: usize,
    /// Emit a progress line every N frames.
    pub progress_every: usize,
}

/// Parameters for trajectory reconstruction and bounce detection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrajectoryConfig {
    /// Object id of the ball in detector output.
    pub tracked_object_id: u32,
    /// Trailing rolling-mean window over the vertical midpoint.
    pub rolling_window: usize,
    /// Minimum frame distance between two reported bounces.
    pub min_peak_spacing: usize,
}

/// Mini-court canvas layout in output-frame pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CanvasLayout {
    /// Background box width.
    pub rect_width: u32,
    /// Background box height.
    pub rect_height: u32,
    /// Distance of the box from the top and right frame edges.
    pub buffer: u32,
    /// Inset of the court drawing inside the box.
    pub padding: u32,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "courtside=debug,warn").
    pub level: String,

    /// Whether to output structured JSON logs.
    pub json: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            cache_dir: data_dir().join("cache"),
            output_dir: PathBuf::from("output"),
            analysis: AnalysisConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for CourtDimensions {
    fn default() -> Self {
        Self {
            width_m: 10.97,
            length_m: 23.77,
        }
    }
}

impl Default for CalibrationConfig {
    fn default() -> Self {
        Self {
            working_width: 1000,
            lightness_threshold: 190,
            close_radius: 2,
            blur_sigma: 1.1,
            canny_low: 50.0,
            canny_high: 150.0,
            hough_vote_threshold: 50,
            hough_suppression_radius: 8,
            min_line_length: 50.0,
            max_line_gap: 20.0,
            bounds_margin: 50.0,
            cluster_tolerance: 20.0,
            rectified_pixels_per_meter: 100.0,
            quad_check: QuadCheck::Off,
        }
    }
}

impl Default for SegmentationConfig {
    fn default() -> Self {
        Self {
            similarity_threshold: 0.85,
            release_threshold: None,
            hue_bins: 50,
            saturation_bins: 60,
            trailing: TrailingPolicy::Close,
            min_logged_duration: 10,
            progress_every: 100,
        }
    }
}

impl Default for TrajectoryConfig {
    fn default() -> Self {
        Self {
            tracked_object_id: 1,
            rolling_window: 5,
            min_peak_spacing: 30,
        }
    }
}

impl Default for CanvasLayout {
    fn default() -> Self {
        Self {
            rect_width: 250,
            rect_height: 550,
            buffer: 50,
            padding: 20,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

impl CourtDimensions {
    /// Canonical court corners in meters, clockwise from top-left.
    pub fn corners(&self) -> [(f64, f64); 4] {
        [
            (0.0, 0.0),
            (self.width_m, 0.0),
            (self.width_m, self.length_m),
            (0.0, self.length_m),
        ]
    }
}

impl CalibrationConfig {
    /// Size of the rectified image for a court of the given dimensions.
    pub fn rectified_size(&self, court: &CourtDimensions) -> (u32, u32) {
        let width = (court.width_m * self.rectified_pixels_per_meter).round() as u32;
        let height = (court.length_m * self.rectified_pixels_per_meter).round() as u32;
        (width.max(1), height.max(1))
    }
}

impl AnalysisConfig {
    /// Reject parameter combinations the algorithms cannot work with.
    pub fn validate(&self) -> CourtsideResult<()> {
        if self.court.width_m <= 0.0 || self.court.length_m <= 0.0 {
            return Err(CourtsideError::config("court dimensions must be positive"));
        }
        if self.calibration.rectified_pixels_per_meter <= 0.0 {
            return Err(CourtsideError::config(
                "rectified_pixels_per_meter must be positive",
            ));
        }
        if self.calibration.blur_sigma <= 0.0 {
            return Err(CourtsideError::config("blur_sigma must be positive"));
        }
        if self.segmentation.hue_bins == 0 || self.segmentation.saturation_bins == 0 {
            return Err(CourtsideError::config("histogram bin counts must be non-zero"));
        }
        if let Some(release) = self.segmentation.release_threshold {
            if release > self.segmentation.similarity_threshold {
                return Err(CourtsideError::config(
                    "release_threshold must not exceed similarity_threshold",
                ));
            }
        }
        if self.trajectory.rolling_window == 0 {
            return Err(CourtsideError::config("rolling_window must be at least 1"));
        }
        if self.trajectory.min_peak_spacing == 0 {
            return Err(CourtsideError::config("min_peak_spacing must be at least 1"));
        }
        Ok(())
    }
}

impl AppConfig {
    /// Load config from the standard location, falling back to defaults.
    pub fn load() -> Self {
        let config_path = config_file_path();
        if config_path.exists() {
            match std::fs::read_to_string(&config_path) {
                Ok(content) => match serde_json::from_str(&content) {
                    Ok(config) => return config,
                    Err(e) => {
                        tracing::warn!("Failed to parse config at {:?}: {}", config_path, e);
                    }
                },
                Err(e) => {
                    tracing::warn!("Failed to read config at {:?}: {}", config_path, e);
                }
            }
        }
        Self::default()
    }

    /// Load config from an explicit path. Unlike [`AppConfig::load`],
    /// a missing or malformed file is an error.
    pub fn load_from(path: &Path) -> CourtsideResult<Self> {
        if !path.exists() {
            return Err(CourtsideError::FileNotFound {
                path: path.to_path_buf(),
            });
        }
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)
            .map_err(|e| CourtsideError::config(format!("{}: {e}", path.display())))?;
        config.analysis.validate()?;
        Ok(config)
    }

    /// Save config to the standard location.
    pub fn save(&self) -> Result<(), std::io::Error> {
        let config_path = config_file_path();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        std::fs::write(config_path, json)
    }
}

/// Standard config file location.
fn config_file_path() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
            PathBuf::from(home).join(".config")
        });
    base.join("courtside").join("config.json")
}

/// Default data directory.
fn data_dir() -> PathBuf {
    let base = std::env::var("XDG_DATA_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
            PathBuf::from(home).join(".local").join("share")
        });
    base.join("courtside")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_reference_constants() {
        let config = AnalysisConfig::default();
        assert_eq!(config.segmentation.similarity_threshold, 0.85);
        assert_eq!(config.segmentation.release_threshold, None);
        assert_eq!(config.trajectory.rolling_window, 5);
        assert_eq!(config.trajectory.min_peak_spacing, 30);
        assert_eq!(config.court.width_m, 10.97);
        assert_eq!(config.court.length_m, 23.77);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_rectified_size_is_one_centimeter_per_pixel() {
        let config = CalibrationConfig::default();
        assert_eq!(
            config.rectified_size(&CourtDimensions::default()),
            (1097, 2377)
        );
    }

    #[test]
    fn test_partial_analysis_json_uses_defaults() {
        let json = r#"{ "segmentation": { "similarity_threshold": 0.9 } }"#;
        let parsed: AnalysisConfig = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.segmentation.similarity_threshold, 0.9);
        assert_eq!(parsed.segmentation.hue_bins, 50);
        assert_eq!(parsed.trajectory.min_peak_spacing, 30);
    }

    #[test]
    fn test_release_above_threshold_is_rejected() {
        let mut config = AnalysisConfig::default();
        config.segmentation.release_threshold = Some(0.95);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_from_missing_file_is_error() {
        let path = std::env::temp_dir().join("courtside_missing_config.json");
        let _ = std::fs::remove_file(&path);
        assert!(matches!(
            AppConfig::load_from(&path),
            Err(CourtsideError::FileNotFound { .. })
        ));
    }

    #[test]
    fn test_quad_check_serialization() {
        let check = QuadCheck::ConvexPositiveArea { min_area: 500.0 };
        let json = serde_json::to_string(&check).unwrap();
        assert!(json.contains("convex_positive_area"));
        let back: QuadCheck = serde_json::from_str(&json).unwrap();
        assert_eq!(back, check);
    }
}
