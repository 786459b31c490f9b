//! Pixel-compositing core of a PDF renderer.
//!
//! The crate turns PDF transparency groups, soft masks and tiling patterns into blended
//! straight-alpha RGBA8 rasters:
//!
//! - [`TransparencyGroupCompositor`] renders a group into a color/alpha buffer pair and removes
//!   the backdrop of non-isolated groups
//! - [`SoftMaskPaint`] modulates another paint's alpha with a mask raster
//! - [`TilingPatternRenderer`] rasterizes a pattern cell, [`TilingPatternCache`] reuses it
//! - [`GlyphOutlineCache`] memoizes glyph outlines per font
//!
//! A content-stream interpreter drives all of it through the small [`Surface`] trait, usually
//! inside a [`PageSession`] that owns the per-page caches.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod foundation;

pub(crate) mod group;
pub(crate) mod paint;
pub(crate) mod pattern;
pub(crate) mod render;
pub(crate) mod session;
pub(crate) mod text;

pub use crate::foundation::core::{Affine, BezPath, Point, Rect, Rgba8, Vec2};
pub use crate::foundation::error::{CompositeError, CompositeResult};
pub use crate::foundation::raster::RasterImage;

pub use crate::group::compositor::{
    BackdropSpec, GroupBufferPair, TransparencyGroupCompositor, remove_backdrop,
};
pub use crate::paint::{
    ExponentialTransfer, FnTransfer, IdentityTransfer, ImagePaint, Paint, SampledTransfer,
    SoftMaskPaint, SoftMaskParams, TransferFunction, alpha_mask, luminosity_mask,
};
pub use crate::pattern::cache::{
    PATTERN_CACHE_BYTES_ENV, PatternCacheKey, PatternCacheOpts, PatternCacheStats,
    SolidColorKey, TilingPatternCache,
};
pub use crate::pattern::color::{ColorSpace, ColorSpaceId, DeviceGray, DeviceRgb, PatternColor};
pub use crate::pattern::tiling::{
    AnchorRect, PatternContent, PatternId, PatternTile, TilingPaint, TilingPattern,
    TilingPatternRenderer,
};
pub use crate::render::composite::{BlendMode, composite_image, composite_pixel, over};
pub use crate::render::raster_surface::{DrawPredicate, RasterSurface};
pub use crate::render::surface::{
    FillRule, GraphicsState, LineCap, LineJoin, StrokeStyle, Surface,
};
pub use crate::session::opts::RenderOpts;
pub use crate::session::page_session::{PageSession, SharedFont};
pub use crate::text::glyph_cache::{FontSource, GlyphCacheStats, GlyphOutlineCache};
