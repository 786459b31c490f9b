use super::*;

struct Broken;

impl ColorSpace for Broken {
    fn id(&self) -> ColorSpaceId {
        ColorSpaceId(99)
    }

    fn to_rgb(&self, _components: &[f32]) -> anyhow::Result<[u8; 3]> {
        anyhow::bail!("profile unreadable")
    }
}

#[test]
fn device_spaces_resolve() {
    let rgb = PatternColor::new(Arc::new(DeviceRgb), [1.0, 0.5, 0.0]);
    assert_eq!(rgb.resolve(), Some(Rgba8::opaque(255, 128, 0)));
    assert_eq!(rgb.space_id(), ColorSpaceId::DEVICE_RGB);

    let gray = PatternColor::new(Arc::new(DeviceGray), [0.2]);
    assert_eq!(gray.resolve(), Some(Rgba8::opaque(51, 51, 51)));
    assert_eq!(gray.components(), &[0.2]);
}

#[test]
fn wrong_arity_and_broken_spaces_do_not_resolve() {
    assert_eq!(PatternColor::new(Arc::new(DeviceRgb), [1.0]).resolve(), None);
    assert_eq!(PatternColor::new(Arc::new(Broken), [0.0]).resolve(), None);
}
