use std::collections::HashMap;
use std::sync::Arc;

use crate::foundation::core::BezPath;

/// Font queries needed to build glyph outlines.
pub trait FontSource: Send + Sync {
    /// Font name, for diagnostics.
    fn name(&self) -> &str;

    /// Whether the font maps `code` to a real glyph.
    fn has_glyph(&self, code: u32) -> bool;

    /// Outline of `code` in normalized glyph space (1000 units per em scaled to 1).
    ///
    /// For codes without a glyph the font returns its fallback outline, usually `.notdef`.
    fn normalized_outline(&self, code: u32) -> anyhow::Result<BezPath>;
}

impl<T: FontSource + ?Sized> FontSource for Arc<T> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn has_glyph(&self, code: u32) -> bool {
        (**self).has_glyph(code)
    }

    fn normalized_outline(&self, code: u32) -> anyhow::Result<BezPath> {
        (**self).normalized_outline(code)
    }
}

/// Counters of a [`GlyphOutlineCache`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GlyphCacheStats {
    /// Lookups answered from the cache.
    pub hits: u64,
    /// Lookups that queried the font.
    pub misses: u64,
    /// Font queries that failed; these are not cached.
    pub failures: u64,
}

/// Character code to outline map for one font.
///
/// Entries live as long as the cache; outlines never change for a given font.
pub struct GlyphOutlineCache<F> {
    font: F,
    outlines: HashMap<u32, Arc<BezPath>>,
    stats: GlyphCacheStats,
}

impl<F: FontSource> GlyphOutlineCache<F> {
    /// Empty cache over `font`.
    pub fn new(font: F) -> Self {
        Self {
            font,
            outlines: HashMap::new(),
            stats: GlyphCacheStats::default(),
        }
    }

    /// The cached font.
    pub fn font(&self) -> &F {
        &self.font
    }

    /// Number of cached outlines.
    pub fn len(&self) -> usize {
        self.outlines.len()
    }

    /// Whether nothing is cached yet.
    pub fn is_empty(&self) -> bool {
        self.outlines.is_empty()
    }

    /// Snapshot of the counters.
    pub fn stats(&self) -> GlyphCacheStats {
        self.stats.clone()
    }

    /// Outline for `code`, querying the font on first use.
    ///
    /// Codes the font has no glyph for still cache the font's fallback outline. A failed
    /// query returns an empty path and is retried on the next call.
    pub fn get(&mut self, code: u32) -> Arc<BezPath> {
        if let Some(path) = self.outlines.get(&code) {
            self.stats.hits += 1;
            return Arc::clone(path);
        }
        self.stats.misses += 1;

        if !self.font.has_glyph(code) {
            tracing::warn!(
                font = self.font.name(),
                code,
                "no glyph for code, using fallback outline"
            );
        }
        match self.font.normalized_outline(code) {
            Ok(path) => {
                let path = Arc::new(path);
                self.outlines.insert(code, Arc::clone(&path));
                path
            }
            Err(e) => {
                self.stats.failures += 1;
                tracing::error!(
                    font = self.font.name(),
                    code,
                    error = %e,
                    "glyph outline unavailable"
                );
                Arc::new(BezPath::new())
            }
        }
    }
}

impl<F: FontSource> std::fmt::Debug for GlyphOutlineCache<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GlyphOutlineCache")
            .field("font", &self.font.name())
            .field("len", &self.outlines.len())
            .field("stats", &self.stats)
            .finish()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/text/glyph_cache.rs"]
mod tests;
