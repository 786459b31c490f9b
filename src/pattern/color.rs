use std::fmt;
use std::sync::Arc;

use smallvec::SmallVec;

use crate::foundation::core::Rgba8;
use crate::foundation::math::round_clamp_u8;

/// Stable identity of a color space, compared by value in pattern cache keys.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ColorSpaceId(pub u64);

impl ColorSpaceId {
    /// `DeviceGray`.
    pub const DEVICE_GRAY: Self = Self(1);
    /// `DeviceRGB`.
    pub const DEVICE_RGB: Self = Self(2);
}

/// Converts color components to 8-bit RGB.
///
/// Conversion may fail (an ICC profile or function that cannot be read); the pattern cache
/// treats such colors as never equal to anything.
pub trait ColorSpace: Send + Sync {
    /// Identity used for cache keys.
    fn id(&self) -> ColorSpaceId;

    /// Resolve `components` to RGB.
    fn to_rgb(&self, components: &[f32]) -> anyhow::Result<[u8; 3]>;
}

fn unit_to_u8(c: f32) -> u8 {
    round_clamp_u8(f64::from(c) * 255.0)
}

/// Device RGB: three components in `[0, 1]`.
#[derive(Clone, Copy, Debug, Default)]
pub struct DeviceRgb;

impl ColorSpace for DeviceRgb {
    fn id(&self) -> ColorSpaceId {
        ColorSpaceId::DEVICE_RGB
    }

    fn to_rgb(&self, components: &[f32]) -> anyhow::Result<[u8; 3]> {
        let [r, g, b] = components else {
            anyhow::bail!("DeviceRGB expects 3 components, got {}", components.len());
        };
        Ok([unit_to_u8(*r), unit_to_u8(*g), unit_to_u8(*b)])
    }
}

/// Device gray: one component in `[0, 1]`.
#[derive(Clone, Copy, Debug, Default)]
pub struct DeviceGray;

impl ColorSpace for DeviceGray {
    fn id(&self) -> ColorSpaceId {
        ColorSpaceId::DEVICE_GRAY
    }

    fn to_rgb(&self, components: &[f32]) -> anyhow::Result<[u8; 3]> {
        let [g] = components else {
            anyhow::bail!("DeviceGray expects 1 component, got {}", components.len());
        };
        let g = unit_to_u8(*g);
        Ok([g, g, g])
    }
}

/// Color an uncolored tiling pattern is painted with.
#[derive(Clone)]
pub struct PatternColor {
    components: SmallVec<[f32; 4]>,
    space: Arc<dyn ColorSpace>,
}

impl PatternColor {
    /// Color `components` in `space`.
    pub fn new(space: Arc<dyn ColorSpace>, components: impl IntoIterator<Item = f32>) -> Self {
        Self {
            components: components.into_iter().collect(),
            space,
        }
    }

    /// Color space identity.
    pub fn space_id(&self) -> ColorSpaceId {
        self.space.id()
    }

    /// Raw components.
    pub fn components(&self) -> &[f32] {
        &self.components
    }

    /// Opaque RGB value, or `None` when the color space cannot convert the components.
    pub fn resolve(&self) -> Option<Rgba8> {
        match self.space.to_rgb(&self.components) {
            Ok([r, g, b]) => Some(Rgba8::opaque(r, g, b)),
            Err(e) => {
                tracing::warn!(
                    space = ?self.space.id(),
                    error = %e,
                    "pattern color conversion failed"
                );
                None
            }
        }
    }
}

impl fmt::Debug for PatternColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PatternColor")
            .field("space", &self.space.id())
            .field("components", &self.components)
            .finish()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/pattern/color.rs"]
mod tests;
