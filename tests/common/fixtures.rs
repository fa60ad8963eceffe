//! Test fixture helpers for creating temporary test data.
//!
//! Provides still images and configuration files in temporary directories
//! that are cleaned up when dropped.

use std::path::{Path, PathBuf};

use image::{Rgba, RgbaImage};
use tempfile::TempDir;

/// Still images in a temporary directory with automatic cleanup.
///
/// # Example
///
/// ```ignore
/// let stills = TestStills::new();
/// let logo = stills.solid("logo.png", 1920, 1080, [255, 0, 0, 255]);
/// ```
pub struct TestStills {
    /// The temporary directory containing the images.
    pub dir: TempDir,
}

impl Default for TestStills {
    fn default() -> Self {
        Self::new()
    }
}

impl TestStills {
    /// # Panics
    ///
    /// Panics if the temporary directory cannot be created.
    #[must_use]
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("Failed to create temp directory"),
        }
    }

    /// Write a single-color image and return its path.
    ///
    /// The format follows the file extension.
    ///
    /// # Panics
    ///
    /// Panics if the image cannot be saved.
    pub fn solid(&self, file: &str, width: u32, height: u32, rgba: [u8; 4]) -> PathBuf {
        let path = self.dir.path().join(file);
        RgbaImage::from_pixel(width, height, Rgba(rgba))
            .save(&path)
            .unwrap_or_else(|e| panic!("Failed to save image at {path:?}: {e}"));
        path
    }

    /// Write an image whose pixel at `(x, y)` is `[x, y, x ^ y, 255]`
    /// (truncated to bytes), so every position is distinguishable.
    ///
    /// # Panics
    ///
    /// Panics if the image cannot be saved.
    #[allow(clippy::cast_possible_truncation)]
    pub fn coordinates(&self, file: &str, width: u32, height: u32) -> PathBuf {
        let path = self.dir.path().join(file);
        RgbaImage::from_fn(width, height, |x, y| {
            Rgba([x as u8, y as u8, (x ^ y) as u8, 255])
        })
        .save(&path)
        .unwrap_or_else(|e| panic!("Failed to save image at {path:?}: {e}"));
        path
    }

    /// Path for a file that is never created.
    #[must_use]
    pub fn missing(&self, file: &str) -> PathBuf {
        self.dir.path().join(file)
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        self.dir.path()
    }
}

/// Temporary configuration file with automatic cleanup.
pub struct TestConfig {
    /// The temporary directory containing the config file.
    pub dir: TempDir,
    /// Full path to the config file.
    pub config_path: PathBuf,
}

impl TestConfig {
    /// Write `content` to `config.toml` in a fresh temporary directory.
    ///
    /// # Panics
    ///
    /// Panics if the file cannot be written.
    #[must_use]
    pub fn toml(content: &str) -> Self {
        let dir = TempDir::new().expect("Failed to create temp directory");
        let config_path = dir.path().join("config.toml");
        std::fs::write(&config_path, content).expect("Failed to write config file");
        Self { dir, config_path }
    }

    /// An empty config file.
    #[must_use]
    pub fn empty() -> Self {
        Self::toml("")
    }

    /// # Panics
    ///
    /// Panics if the path is not valid UTF-8.
    #[must_use]
    pub fn path_str(&self) -> &str {
        self.config_path.to_str().expect("Path is not valid UTF-8")
    }
}
