use super::*;

#[test]
fn defaults() {
    let opts = RenderOpts::default();
    assert_eq!(opts.max_tile_edge, 3000.0);
    assert_eq!(opts.pattern_cache.max_cache_bytes, 64 * 1024 * 1024);
    assert_eq!(opts.pattern_cache.max_entries, 256);
    assert!(opts.validate().is_ok());
}

#[test]
fn json_fills_missing_fields_with_defaults() {
    let json = r#"{ "pattern_cache": { "max_entries": 8 }, "max_tile_edge": 512 }"#;
    let opts = RenderOpts::from_json_str(json).unwrap();
    assert_eq!(opts.max_tile_edge, 512.0);
    assert_eq!(opts.pattern_cache.max_entries, 8);
    assert_eq!(
        opts.pattern_cache.max_cache_bytes,
        PatternCacheOpts::default().max_cache_bytes
    );
}

#[test]
fn json_round_trips() {
    let opts = RenderOpts {
        max_tile_edge: 100.0,
        ..RenderOpts::default()
    };
    let s = opts.to_json_string().unwrap();
    assert_eq!(RenderOpts::from_json_str(&s).unwrap(), opts);
}

#[test]
fn rejects_bad_json_and_bad_values() {
    assert!(matches!(
        RenderOpts::from_json_str("{ nope").unwrap_err(),
        CompositeError::Serde(_)
    ));
    assert!(matches!(
        RenderOpts::from_json_str(r#"{ "unknown": 1 }"#).unwrap_err(),
        CompositeError::Serde(_)
    ));
    assert!(matches!(
        RenderOpts::from_json_str(r#"{ "max_tile_edge": 0 }"#).unwrap_err(),
        CompositeError::Validation(_)
    ));
}

#[test]
fn missing_file_is_reported() {
    let err = RenderOpts::from_path("/definitely/not/here.json").unwrap_err();
    assert!(err.to_string().contains("not/here.json"));
}
