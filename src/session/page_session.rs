use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::foundation::core::{Affine, BezPath};
use crate::foundation::error::CompositeResult;
use crate::group::compositor::{BackdropSpec, TransparencyGroupCompositor};
use crate::pattern::cache::{PatternCacheKey, PatternCacheStats, TilingPatternCache};
use crate::pattern::color::PatternColor;
use crate::pattern::tiling::{PatternTile, TilingPaint, TilingPattern, TilingPatternRenderer};
use crate::render::surface::Surface;
use crate::session::opts::RenderOpts;
use crate::text::glyph_cache::{FontSource, GlyphCacheStats, GlyphOutlineCache};

/// Shared handle to a font, as held by a [`PageSession`].
pub type SharedFont = Arc<dyn FontSource>;

/// Caches and settings for drawing one page.
///
/// The pattern cache and glyph caches live exactly as long as the session; nothing is shared
/// between sessions.
pub struct PageSession {
    opts: RenderOpts,
    initial_matrix: Affine,
    device_transform: Affine,
    pattern_renderer: TilingPatternRenderer,
    pattern_cache: TilingPatternCache,
    // Keyed by the font's address; the cache keeps the font alive so addresses stay unique.
    glyph_caches: HashMap<usize, GlyphOutlineCache<SharedFont>>,
}

impl PageSession {
    /// Start a session.
    ///
    /// `initial_matrix` is the page's initial transform and `device_transform` maps page
    /// space to device pixels.
    pub fn new(
        opts: RenderOpts,
        initial_matrix: Affine,
        device_transform: Affine,
    ) -> CompositeResult<Self> {
        opts.validate()?;
        tracing::debug!(?opts, "page session started");
        Ok(Self {
            pattern_renderer: TilingPatternRenderer::new(opts.max_tile_edge),
            pattern_cache: TilingPatternCache::new(opts.pattern_cache),
            opts,
            initial_matrix,
            device_transform,
            glyph_caches: HashMap::new(),
        })
    }

    /// Session configuration.
    pub fn opts(&self) -> &RenderOpts {
        &self.opts
    }

    /// Initial page transform.
    pub fn initial_matrix(&self) -> Affine {
        self.initial_matrix
    }

    /// Page-to-device transform.
    pub fn device_transform(&self) -> Affine {
        self.device_transform
    }

    /// Rendered tile for `pattern`, from the cache when an equal tile was already rendered.
    pub fn tiling_tile(
        &mut self,
        pattern: &TilingPattern,
        color: Option<&PatternColor>,
    ) -> CompositeResult<Arc<PatternTile>> {
        let key = PatternCacheKey::new(
            pattern.id,
            self.initial_matrix,
            color,
            self.device_transform,
        );
        let renderer = self.pattern_renderer;
        let (initial, device) = (self.initial_matrix, self.device_transform);
        let solid = key.solid_color();
        self.pattern_cache.get_or_create(&key, || {
            renderer.render(pattern, initial, solid, device)
        })
    }

    /// Paint that fills with `pattern` on a surface using the session's device transform.
    pub fn tiling_paint(
        &mut self,
        pattern: &TilingPattern,
        color: Option<&PatternColor>,
    ) -> CompositeResult<TilingPaint> {
        let tile = self.tiling_tile(pattern, color)?;
        Ok(TilingPaint::new(tile, self.device_transform))
    }

    /// Start a transparency group; see [`TransparencyGroupCompositor::begin`].
    pub fn begin_group(
        &self,
        backdrop: Option<&BackdropSpec<'_>>,
        width: u32,
        height: u32,
    ) -> CompositeResult<TransparencyGroupCompositor> {
        TransparencyGroupCompositor::begin(backdrop, width, height)
    }

    /// Outline of `code` in `font`, cached per font for the session.
    pub fn glyph_outline(&mut self, font: &SharedFont, code: u32) -> Arc<BezPath> {
        self.glyph_cache_mut(font).get(code)
    }

    /// Draw glyphs through the cache; each entry is a code and its glyph-to-user transform.
    pub fn show_glyphs(
        &mut self,
        surface: &mut dyn Surface,
        font: &SharedFont,
        glyphs: &[(u32, Affine)],
    ) {
        let cache = self.glyph_cache_mut(font);
        for &(code, glyph_transform) in glyphs {
            let outline = cache.get(code);
            if !outline.elements().is_empty() {
                surface.draw_glyph(&outline, glyph_transform);
            }
        }
    }

    /// Pattern cache counters.
    pub fn pattern_cache_stats(&self) -> PatternCacheStats {
        self.pattern_cache.stats()
    }

    /// Glyph cache counters for `font`, if the session has seen it.
    pub fn glyph_cache_stats(&self, font: &SharedFont) -> Option<GlyphCacheStats> {
        self.glyph_caches
            .get(&font_key(font))
            .map(GlyphOutlineCache::stats)
    }

    /// Drop pattern tiles that no paint references any more.
    pub fn purge_unreferenced_patterns(&mut self) -> usize {
        self.pattern_cache.purge_unreferenced()
    }

    /// Drop every cached tile and outline.
    pub fn release_session(&mut self) {
        self.pattern_cache.release_session();
        self.glyph_caches.clear();
    }

    fn glyph_cache_mut(&mut self, font: &SharedFont) -> &mut GlyphOutlineCache<SharedFont> {
        self.glyph_caches
            .entry(font_key(font))
            .or_insert_with(|| GlyphOutlineCache::new(Arc::clone(font)))
    }
}

fn font_key(font: &SharedFont) -> usize {
    Arc::as_ptr(font).cast::<()>() as usize
}

impl fmt::Debug for PageSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PageSession")
            .field("opts", &self.opts)
            .field("initial_matrix", &self.initial_matrix)
            .field("device_transform", &self.device_transform)
            .field("pattern_cache", &self.pattern_cache.stats())
            .field("fonts", &self.glyph_caches.len())
            .finish()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/page_session.rs"]
mod tests;
