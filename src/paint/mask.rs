use image::{GrayImage, Luma};

use crate::foundation::core::Rgba8;
use crate::foundation::raster::RasterImage;
use crate::render::composite::over;

/// Luminosity soft mask from a rendered mask group.
///
/// Each pixel is composited over `backdrop` first, so uncovered areas take the backdrop's
/// luminosity.
pub fn luminosity_mask(group: &RasterImage, backdrop: Rgba8) -> GrayImage {
    GrayImage::from_fn(group.width(), group.height(), |x, y| {
        Luma([over(backdrop, group.pixel(x, y)).luminosity()])
    })
}

/// Alpha soft mask: the group's alpha channel.
pub fn alpha_mask(group: &RasterImage) -> GrayImage {
    GrayImage::from_fn(group.width(), group.height(), |x, y| {
        Luma([group.pixel(x, y).a])
    })
}

#[cfg(test)]
#[path = "../../tests/unit/paint/mask.rs"]
mod tests;
