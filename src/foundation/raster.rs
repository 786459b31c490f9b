use std::path::Path;

use image::{Rgba, RgbaImage};

use crate::foundation::core::Rgba8;
use crate::foundation::error::{CompositeError, CompositeResult};

/// Owned `width x height` grid of straight-alpha RGBA8 pixels.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RasterImage {
    pixels: RgbaImage,
}

impl RasterImage {
    /// Fully transparent image.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            pixels: RgbaImage::new(width, height),
        }
    }

    /// Image with every pixel set to `px`.
    pub fn filled(width: u32, height: u32, px: Rgba8) -> Self {
        Self {
            pixels: RgbaImage::from_pixel(width, height, Rgba(px.to_array())),
        }
    }

    /// Wrap raw row-major RGBA8 bytes.
    pub fn from_raw(width: u32, height: u32, data: Vec<u8>) -> CompositeResult<Self> {
        let len = data.len();
        RgbaImage::from_raw(width, height, data)
            .map(|pixels| Self { pixels })
            .ok_or_else(|| {
                CompositeError::validation(format!(
                    "raster of {width}x{height} needs {} bytes, got {len}",
                    (width as usize)
                        .saturating_mul(height as usize)
                        .saturating_mul(4)
                ))
            })
    }

    /// Wrap an existing `image` buffer.
    pub fn from_rgba_image(pixels: RgbaImage) -> Self {
        Self { pixels }
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    /// `(width, height)`.
    pub fn dimensions(&self) -> (u32, u32) {
        self.pixels.dimensions()
    }

    /// Size of the pixel storage in bytes.
    pub fn byte_len(&self) -> usize {
        self.pixels.as_raw().len()
    }

    /// Pixel at `(x, y)`. Panics when out of bounds.
    pub fn pixel(&self, x: u32, y: u32) -> Rgba8 {
        Rgba8::from_array(self.pixels.get_pixel(x, y).0)
    }

    /// Pixel at a possibly out-of-bounds signed coordinate.
    pub fn pixel_checked(&self, x: i64, y: i64) -> Option<Rgba8> {
        if x < 0 || y < 0 || x >= i64::from(self.width()) || y >= i64::from(self.height()) {
            return None;
        }
        Some(self.pixel(x as u32, y as u32))
    }

    /// Overwrite the pixel at `(x, y)`. Panics when out of bounds.
    pub fn set_pixel(&mut self, x: u32, y: u32, px: Rgba8) {
        self.pixels.put_pixel(x, y, Rgba(px.to_array()));
    }

    /// Set every pixel to `px`.
    pub fn fill(&mut self, px: Rgba8) {
        let px = px.to_array();
        for chunk in self.as_raw_mut().chunks_exact_mut(4) {
            chunk.copy_from_slice(&px);
        }
    }

    /// Row-major RGBA8 bytes.
    pub fn as_raw(&self) -> &[u8] {
        self.pixels.as_raw()
    }

    /// Mutable row-major RGBA8 bytes.
    pub fn as_raw_mut(&mut self) -> &mut [u8] {
        &mut self.pixels
    }

    /// Borrow the underlying `image` buffer.
    pub fn as_rgba_image(&self) -> &RgbaImage {
        &self.pixels
    }

    /// Unwrap into the underlying `image` buffer.
    pub fn into_rgba_image(self) -> RgbaImage {
        self.pixels
    }

    /// Return `true` when both images have the same dimensions.
    pub fn same_size(&self, other: &RasterImage) -> bool {
        self.dimensions() == other.dimensions()
    }

    /// Copy a `width x height` window whose origin sits at `(x0, y0)` in this image.
    ///
    /// Pixels of the window that fall outside this image are transparent.
    pub fn region(&self, x0: i64, y0: i64, width: u32, height: u32) -> RasterImage {
        let mut out = RasterImage::new(width, height);
        for y in 0..height {
            for x in 0..width {
                if let Some(px) = self.pixel_checked(x0 + i64::from(x), y0 + i64::from(y)) {
                    out.set_pixel(x, y, px);
                }
            }
        }
        out
    }

    /// Mirror the image about its vertical axis.
    pub fn flip_horizontal(&mut self) {
        image::imageops::flip_horizontal_in_place(&mut self.pixels);
    }

    /// Mirror the image about its horizontal axis.
    pub fn flip_vertical(&mut self) {
        image::imageops::flip_vertical_in_place(&mut self.pixels);
    }

    /// Encode as PNG; meant for debugging and golden files.
    pub fn save_png(&self, path: impl AsRef<Path>) -> CompositeResult<()> {
        let path = path.as_ref();
        self.pixels
            .save_with_format(path, image::ImageFormat::Png)
            .map_err(|e| {
                CompositeError::raster(format!("failed to write '{}': {e}", path.display()))
            })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/raster.rs"]
mod tests;
