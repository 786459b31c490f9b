pub(crate) mod glyph_cache;
