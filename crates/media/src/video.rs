//! Clip input and output.
//!
//! A clip on disk is a directory:
//!
//! ```text
//! match/
//! ├── clip.json        { "version", "fps", "frame_count", "width", "height" }
//! └── frames/
//!     ├── 000000.png
//!     ├── 000001.png
//!     └── ...
//! ```
//!
//! Container decoding is out of scope; any tool that can dump numbered
//! PNG frames (e.g. `ffmpeg -i match.mp4 -start_number 0 frames/%06d.png`) produces a
//! readable clip once `clip.json` is added.

use std::path::{Path, PathBuf};

use courtside_common::{CourtsideError, CourtsideResult};
use image::RgbImage;
use serde::{Deserialize, Serialize};

/// Manifest file name inside a clip directory.
pub const CLIP_MANIFEST: &str = "clip.json";

/// Frame subdirectory inside a clip directory.
pub const FRAMES_DIR: &str = "frames";

/// Decoded clip: frames in presentation order plus frame rate.
#[derive(Debug, Clone)]
pub struct VideoClip {
    pub frames: Vec<RgbImage>,
    pub fps: f64,
}

impl VideoClip {
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Size of the first frame.
    pub fn dimensions(&self) -> Option<(u32, u32)> {
        self.frames.first().map(|f| f.dimensions())
    }
}

/// Frame-sequence reader and writer.
pub trait VideoIo: Send + Sync {
    /// Read every frame. Fails with an input error when the clip cannot
    /// be opened or holds no frames.
    fn read_all(&self, path: &Path) -> CourtsideResult<VideoClip>;

    /// Persist frames at the given frame rate.
    fn write_all(&self, frames: &[RgbImage], path: &Path, fps: f64) -> CourtsideResult<()>;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ClipManifest {
    version: String,
    fps: f64,
    frame_count: usize,
    width: u32,
    height: u32,
}

/// Clips stored as numbered PNG frames plus a `clip.json` manifest.
#[derive(Debug, Clone, Copy, Default)]
pub struct FrameDirectory;

impl FrameDirectory {
    pub fn new() -> Self {
        Self
    }

    fn frame_path(dir: &Path, index: usize) -> PathBuf {
        dir.join(FRAMES_DIR).join(format!("{index:06}.png"))
    }

    fn read_manifest(dir: &Path) -> CourtsideResult<ClipManifest> {
        let path = dir.join(CLIP_MANIFEST);
        let content = std::fs::read_to_string(&path).map_err(|e| {
            CourtsideError::input(format!("cannot open clip {}: {e}", dir.display()))
        })?;
        serde_json::from_str(&content)
            .map_err(|e| CourtsideError::input(format!("invalid {}: {e}", path.display())))
    }
}

impl VideoIo for FrameDirectory {
    fn read_all(&self, path: &Path) -> CourtsideResult<VideoClip> {
        if !path.is_dir() {
            return Err(CourtsideError::input(format!(
                "cannot open clip {}: not a directory",
                path.display()
            )));
        }
        let manifest = Self::read_manifest(path)?;
        if manifest.frame_count == 0 {
            return Err(CourtsideError::input(format!(
                "clip {} has no frames",
                path.display()
            )));
        }

        let mut frames = Vec::with_capacity(manifest.frame_count);
        for index in 0..manifest.frame_count {
            let frame_path = Self::frame_path(path, index);
            let frame = image::open(&frame_path)
                .map_err(|e| {
                    CourtsideError::input(format!("cannot decode {}: {e}", frame_path.display()))
                })?
                .to_rgb8();
            if frame.dimensions() != (manifest.width, manifest.height) {
                return Err(CourtsideError::input(format!(
                    "{} is {}x{}, expected {}x{}",
                    frame_path.display(),
                    frame.width(),
                    frame.height(),
                    manifest.width,
                    manifest.height
                )));
            }
            frames.push(frame);
        }

        tracing::info!(
            path = %path.display(),
            frames = frames.len(),
            fps = manifest.fps,
            "Read clip"
        );
        Ok(VideoClip {
            frames,
            fps: manifest.fps,
        })
    }

    fn write_all(&self, frames: &[RgbImage], path: &Path, fps: f64) -> CourtsideResult<()> {
        let frames_dir = path.join(FRAMES_DIR);
        if frames_dir.exists() {
            std::fs::remove_dir_all(&frames_dir)?;
        }
        std::fs::create_dir_all(&frames_dir)?;

        for (index, frame) in frames.iter().enumerate() {
            let frame_path = Self::frame_path(path, index);
            frame.save(&frame_path).map_err(|e| {
                CourtsideError::output(format!("cannot write {}: {e}", frame_path.display()))
            })?;
        }

        let (width, height) = frames.first().map(|f| f.dimensions()).unwrap_or((0, 0));
        let manifest = ClipManifest {
            version: "1.0".to_string(),
            fps,
            frame_count: frames.len(),
            width,
            height,
        };
        std::fs::write(
            path.join(CLIP_MANIFEST),
            serde_json::to_string_pretty(&manifest)?,
        )?;

        tracing::info!(path = %path.display(), frames = frames.len(), fps, "Wrote clip");
        Ok(())
    }
}
