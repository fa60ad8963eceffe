//! Image decoding and pixel conversion for still uploads.

use std::path::Path;

use image::RgbaImage;

use crate::error::{AtemError, Result};

/// Decoded image with random-access RGBA pixel reads.
///
/// Any decoder can feed an upload as long as it provides this.
pub trait RgbaSource {
    fn width(&self) -> u32;
    fn height(&self) -> u32;
    /// Pixel at `(x, y)` as `[r, g, b, a]`.
    fn rgba(&self, x: u32, y: u32) -> [u8; 4];
}

impl RgbaSource for RgbaImage {
    fn width(&self) -> u32 {
        Self::width(self)
    }

    fn height(&self) -> u32 {
        Self::height(self)
    }

    fn rgba(&self, x: u32, y: u32) -> [u8; 4] {
        self.get_pixel(x, y).0
    }
}

/// Decode an image file into 8-bit RGBA.
///
/// # Errors
///
/// Returns a validation error if the file is missing or cannot be decoded.
pub fn decode_rgba(path: &Path) -> Result<RgbaImage> {
    if !path.exists() {
        return Err(AtemError::Validation(format!("{} does not exist", path.display())));
    }

    let img = image::open(path).map_err(|e| AtemError::Validation(e.to_string()))?;
    Ok(img.to_rgba8())
}

/// Convert to interleaved BGRA, row by row, keeping alpha unchanged.
///
/// The output is always `width * height * 4` bytes.
pub fn rgba_to_bgra<S: RgbaSource + ?Sized>(source: &S) -> Vec<u8> {
    let (width, height) = (source.width(), source.height());
    let mut output = Vec::with_capacity(width as usize * height as usize * 4);
    for y in 0..height {
        for x in 0..width {
            let [r, g, b, a] = source.rgba(x, y);
            output.extend_from_slice(&[b, g, r, a]);
        }
    }
    output
}
