use super::*;

#[test]
fn luminosity_mask_uses_backdrop_where_uncovered() {
    let mut group = RasterImage::new(2, 1);
    group.set_pixel(0, 0, Rgba8::WHITE);
    let mask = luminosity_mask(&group, Rgba8::BLACK);
    assert_eq!(mask.get_pixel(0, 0).0[0], 255);
    assert_eq!(mask.get_pixel(1, 0).0[0], 0);

    let mask = luminosity_mask(&group, Rgba8::opaque(128, 128, 128));
    assert_eq!(mask.get_pixel(1, 0).0[0], 128);
}

#[test]
fn luminosity_mask_weights_channels() {
    let mut group = RasterImage::new(3, 1);
    group.set_pixel(0, 0, Rgba8::opaque(255, 0, 0));
    group.set_pixel(1, 0, Rgba8::opaque(0, 255, 0));
    group.set_pixel(2, 0, Rgba8::opaque(0, 0, 255));
    let mask = luminosity_mask(&group, Rgba8::BLACK);
    assert_eq!(mask.get_pixel(0, 0).0[0], 76);
    assert_eq!(mask.get_pixel(1, 0).0[0], 150);
    assert_eq!(mask.get_pixel(2, 0).0[0], 29);
}

#[test]
fn alpha_mask_copies_alpha() {
    let mut group = RasterImage::new(2, 1);
    group.set_pixel(1, 0, Rgba8::new(10, 20, 30, 77));
    let mask = alpha_mask(&group);
    assert_eq!(mask.get_pixel(0, 0).0[0], 0);
    assert_eq!(mask.get_pixel(1, 0).0[0], 77);
}
