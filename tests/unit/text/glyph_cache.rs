use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use super::*;

#[derive(Default)]
struct CountingFont {
    queries: AtomicUsize,
    fail_next: AtomicBool,
}

impl CountingFont {
    fn queries(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }
}

impl FontSource for CountingFont {
    fn name(&self) -> &str {
        "Counting"
    }

    fn has_glyph(&self, code: u32) -> bool {
        code < 128
    }

    fn normalized_outline(&self, code: u32) -> anyhow::Result<BezPath> {
        self.queries.fetch_add(1, Ordering::SeqCst);
        if self.fail_next.swap(false, Ordering::SeqCst) {
            anyhow::bail!("corrupt glyf table");
        }
        let mut p = BezPath::new();
        if code < 128 {
            p.move_to((0.0, 0.0));
            p.line_to((f64::from(code) / 1000.0, 0.0));
            p.line_to((0.0, 0.7));
            p.close_path();
        } else {
            // .notdef box
            p.move_to((0.0, 0.0));
            p.line_to((0.5, 0.0));
            p.line_to((0.5, 0.7));
            p.close_path();
        }
        Ok(p)
    }
}

#[test]
fn repeated_gets_return_first_outline_without_requerying() {
    let font = Arc::new(CountingFont::default());
    let mut cache = GlyphOutlineCache::new(Arc::clone(&font));
    let first = cache.get(65);
    let second = cache.get(65);
    assert_eq!(first, second);
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(font.queries(), 1);
    assert_eq!(
        cache.stats(),
        GlyphCacheStats {
            hits: 1,
            misses: 1,
            failures: 0
        }
    );
}

#[test]
fn missing_glyph_caches_fallback_outline() {
    let font = Arc::new(CountingFont::default());
    let mut cache = GlyphOutlineCache::new(Arc::clone(&font));
    let notdef = cache.get(500);
    assert!(!notdef.elements().is_empty());
    cache.get(500);
    assert_eq!(font.queries(), 1);
    assert_eq!(cache.len(), 1);
}

#[test]
fn failed_lookup_returns_empty_and_retries() {
    let font = Arc::new(CountingFont::default());
    font.fail_next.store(true, Ordering::SeqCst);
    let mut cache = GlyphOutlineCache::new(Arc::clone(&font));

    let failed = cache.get(66);
    assert!(failed.elements().is_empty());
    assert!(cache.is_empty());

    let ok = cache.get(66);
    assert!(!ok.elements().is_empty());
    assert_eq!(font.queries(), 2);
    assert_eq!(cache.stats().failures, 1);
}

#[test]
fn codes_are_cached_independently() {
    let font = Arc::new(CountingFont::default());
    let mut cache = GlyphOutlineCache::new(Arc::clone(&font));
    assert_ne!(cache.get(1), cache.get(2));
    assert_eq!(cache.len(), 2);
    assert_eq!(cache.font().name(), "Counting");
}
