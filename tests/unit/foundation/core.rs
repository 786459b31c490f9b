use super::*;

#[test]
fn array_roundtrip_preserves_channel_order() {
    let px = Rgba8::from_array([1, 2, 3, 4]);
    assert_eq!(px, Rgba8::new(1, 2, 3, 4));
    assert_eq!(px.to_array(), [1, 2, 3, 4]);
}

#[test]
fn constants_are_straight_alpha() {
    assert_eq!(Rgba8::TRANSPARENT.to_array(), [0, 0, 0, 0]);
    assert_eq!(Rgba8::BLACK.a, 255);
    assert_eq!(Rgba8::opaque(9, 8, 7).with_alpha(3), Rgba8::new(9, 8, 7, 3));
}

#[test]
fn luminosity_ignores_alpha() {
    assert_eq!(Rgba8::new(255, 255, 255, 0).luminosity(), 255);
    assert_eq!(Rgba8::new(128, 128, 128, 255).luminosity(), 128);
}
