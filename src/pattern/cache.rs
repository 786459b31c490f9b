use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use crate::foundation::core::{Affine, Rgba8};
use crate::foundation::error::CompositeResult;
use crate::foundation::math::affine_key_bits;
use crate::pattern::color::{ColorSpaceId, PatternColor};
use crate::pattern::tiling::{PatternId, PatternTile};

/// Environment variable overriding [`PatternCacheOpts::max_cache_bytes`].
pub const PATTERN_CACHE_BYTES_ENV: &str = "PDF_COMPOSITE_PATTERN_CACHE_BYTES";

/// Budget of a [`TilingPatternCache`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct PatternCacheOpts {
    /// Maximum tile bytes retained.
    pub max_cache_bytes: usize,
    /// Maximum number of retained tiles.
    pub max_entries: usize,
}

impl Default for PatternCacheOpts {
    fn default() -> Self {
        Self {
            max_cache_bytes: 64 * 1024 * 1024,
            max_entries: 256,
        }
    }
}

impl PatternCacheOpts {
    /// Apply [`PATTERN_CACHE_BYTES_ENV`] when it holds a positive integer.
    pub fn with_env_overrides(mut self) -> Self {
        if let Some(bytes) = std::env::var(PATTERN_CACHE_BYTES_ENV)
            .ok()
            .and_then(|v| v.parse::<usize>().ok())
            .filter(|&n| n > 0)
        {
            self.max_cache_bytes = bytes;
        }
        self
    }
}

/// Solid color component of a [`PatternCacheKey`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SolidColorKey {
    /// Colored pattern; no external color.
    None,
    /// Uncolored pattern painted with this RGB value.
    Rgb([u8; 3]),
    /// The color could not be converted; the key matches nothing.
    Unresolved,
}

/// Structural identity of a rendered tile.
///
/// Matrices are compared by value through their bit patterns. The key holds no references
/// to the pattern or the color space, so a cached tile never keeps them alive.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct PatternCacheKey {
    pattern: PatternId,
    initial_matrix: [u64; 6],
    color_space: Option<ColorSpaceId>,
    color: SolidColorKey,
    device: [u64; 6],
}

impl PatternCacheKey {
    /// Key for `pattern` drawn with `color` under the given matrices.
    pub fn new(
        pattern: PatternId,
        initial_matrix: Affine,
        color: Option<&PatternColor>,
        device: Affine,
    ) -> Self {
        let (color_space, color) = match color {
            None => (None, SolidColorKey::None),
            Some(c) => {
                let key = match c.resolve() {
                    Some(rgba) => SolidColorKey::Rgb([rgba.r, rgba.g, rgba.b]),
                    None => SolidColorKey::Unresolved,
                };
                (Some(c.space_id()), key)
            }
        };
        Self {
            pattern,
            initial_matrix: affine_key_bits(initial_matrix),
            color_space,
            color,
            device: affine_key_bits(device),
        }
    }

    /// Pattern identity.
    pub fn pattern(&self) -> PatternId {
        self.pattern
    }

    /// Whether the key can be stored and matched. Keys with an unresolved color cannot.
    pub fn is_cacheable(&self) -> bool {
        self.color != SolidColorKey::Unresolved
    }

    /// Resolved paint of an uncolored pattern.
    pub fn solid_color(&self) -> Option<Rgba8> {
        match self.color {
            SolidColorKey::Rgb([r, g, b]) => Some(Rgba8::opaque(r, g, b)),
            SolidColorKey::None | SolidColorKey::Unresolved => None,
        }
    }
}

/// Counters of a [`TilingPatternCache`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PatternCacheStats {
    /// Lookups answered from the cache.
    pub hits: u64,
    /// Lookups that ran the factory.
    pub misses: u64,
    /// Misses caused by keys that cannot be cached.
    pub uncacheable: u64,
    /// Entries dropped to stay within budget.
    pub evictions: u64,
    /// Entries currently held.
    pub retained_entries: usize,
    /// Tile bytes currently held.
    pub retained_bytes: usize,
}

/// Bounded LRU of rendered pattern tiles for one page session.
///
/// Over budget, the least recently used tiles that nothing outside the cache references are
/// evicted. Tiles still in use stay until they are released, so the budget is exceeded
/// only while callers hold on to tiles.
#[derive(Debug, Default)]
pub struct TilingPatternCache {
    opts: PatternCacheOpts,
    stats: PatternCacheStats,
    entries: HashMap<PatternCacheKey, Arc<PatternTile>>,
    lru: VecDeque<PatternCacheKey>,
}

impl TilingPatternCache {
    /// Empty cache with the given budget.
    pub fn new(opts: PatternCacheOpts) -> Self {
        Self {
            opts,
            stats: PatternCacheStats::default(),
            entries: HashMap::new(),
            lru: VecDeque::new(),
        }
    }

    /// Configured budget.
    pub fn opts(&self) -> PatternCacheOpts {
        self.opts
    }

    /// Snapshot of the counters.
    pub fn stats(&self) -> PatternCacheStats {
        self.stats.clone()
    }

    /// Number of retained tiles.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no tile is retained.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Return the tile cached under `key`, or build it with `factory` and cache it.
    ///
    /// Factory errors are returned and nothing is cached.
    pub fn get_or_create<F>(
        &mut self,
        key: &PatternCacheKey,
        factory: F,
    ) -> CompositeResult<Arc<PatternTile>>
    where
        F: FnOnce() -> CompositeResult<PatternTile>,
    {
        if !key.is_cacheable() {
            self.stats.misses += 1;
            self.stats.uncacheable += 1;
            tracing::warn!(pattern = key.pattern.0, "pattern color unresolved, tile not cached");
            return factory().map(Arc::new);
        }
        if let Some(tile) = self.entries.get(key).cloned() {
            self.stats.hits += 1;
            self.touch(key);
            return Ok(tile);
        }

        self.stats.misses += 1;
        let tile = Arc::new(factory()?);
        let bytes = tile.byte_len();
        if bytes > self.opts.max_cache_bytes || self.opts.max_entries == 0 {
            tracing::debug!(
                pattern = key.pattern.0,
                bytes,
                "pattern tile exceeds cache budget, not retained"
            );
            return Ok(tile);
        }

        self.entries.insert(key.clone(), Arc::clone(&tile));
        self.stats.retained_bytes += bytes;
        self.stats.retained_entries = self.entries.len();
        self.touch(key);
        self.evict_over_budget();
        Ok(tile)
    }

    /// Drop every tile that nothing outside the cache references.
    pub fn purge_unreferenced(&mut self) -> usize {
        let before = self.entries.len();
        let mut i = 0;
        while i < self.lru.len() {
            if self.is_referenced(&self.lru[i]) {
                i += 1;
            } else {
                self.remove_at(i);
            }
        }
        before - self.entries.len()
    }

    /// Drop every entry; the end of a page session.
    pub fn release_session(&mut self) {
        tracing::debug!(
            entries = self.entries.len(),
            bytes = self.stats.retained_bytes,
            "pattern cache released"
        );
        self.entries.clear();
        self.lru.clear();
        self.stats.retained_entries = 0;
        self.stats.retained_bytes = 0;
    }

    fn over_budget(&self) -> bool {
        self.stats.retained_bytes > self.opts.max_cache_bytes
            || self.entries.len() > self.opts.max_entries
    }

    fn is_referenced(&self, key: &PatternCacheKey) -> bool {
        self.entries
            .get(key)
            .is_some_and(|tile| Arc::strong_count(tile) > 1)
    }

    fn evict_over_budget(&mut self) {
        let mut i = 0;
        while self.over_budget() && i < self.lru.len() {
            if self.is_referenced(&self.lru[i]) {
                i += 1;
                continue;
            }
            self.remove_at(i);
            self.stats.evictions += 1;
        }
        if self.over_budget() {
            tracing::debug!(
                entries = self.entries.len(),
                bytes = self.stats.retained_bytes,
                "pattern cache over budget, remaining tiles are in use"
            );
        }
    }

    fn remove_at(&mut self, idx: usize) {
        if let Some(key) = self.lru.remove(idx)
            && let Some(tile) = self.entries.remove(&key)
        {
            self.stats.retained_bytes -= tile.byte_len();
            self.stats.retained_entries = self.entries.len();
        }
    }

    fn touch(&mut self, key: &PatternCacheKey) {
        if let Some(pos) = self.lru.iter().position(|k| k == key) {
            self.lru.remove(pos);
        }
        self.lru.push_back(key.clone());
    }
}

#[cfg(test)]
#[path = "../../tests/unit/pattern/cache.rs"]
mod tests;
