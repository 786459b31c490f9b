use std::sync::Arc;

use crate::foundation::core::Affine;
use crate::foundation::raster::RasterImage;

/// Raster image used as a paint, sampled nearest-neighbor and transparent outside its grid.
#[derive(Clone, Debug)]
pub struct ImagePaint {
    image: Arc<RasterImage>,
    transform: Affine,
}

impl ImagePaint {
    /// `transform` maps the image pixel grid into user space.
    pub fn new(image: Arc<RasterImage>, transform: Affine) -> Self {
        Self { image, transform }
    }

    /// The sampled image.
    pub fn image(&self) -> &RasterImage {
        &self.image
    }

    /// Image-to-user transform.
    pub fn transform(&self) -> Affine {
        self.transform
    }
}
