use std::time::Duration;

use crate::color::Rgba;
use crate::transition::ColorSet;

pub const DEFAULT_COLOR1: &str = "#DE443B";
pub const DEFAULT_COLOR2: &str = "#006BB4";
pub const DEFAULT_COLOR3: &str = "#162325";

/// Every visual knob of the backdrop effect.
///
/// Colors are stored decoded; use [`EffectParameters::with_hex_colors`] to
/// feed the hex strings the host application works with. Non-color fields are
/// pushed into the uniforms immediately when they change, colors go through
/// the cross-fade in [`crate::transition`].
#[derive(Debug, Clone, PartialEq)]
pub struct EffectParameters {
    /// Rotation applied to the swirl (`uSpinRotation`).
    pub spin_rotation: f32,
    /// How quickly the paint pattern churns (`uSpinSpeed`).
    pub spin_speed: f32,
    /// Offset of the swirl center in normalized screen units.
    pub offset: [f32; 2],
    pub color1: Rgba,
    pub color2: Rgba,
    pub color3: Rgba,
    pub contrast: f32,
    pub lighting: f32,
    pub spin_amount: f32,
    /// Pixelation density; larger values mean finer pixels.
    pub pixel_filter: f32,
    pub spin_ease: f32,
    /// Animate the rotation over time instead of holding a fixed angle.
    pub rotate: bool,
    /// Forward pointer movement into `uMouse`.
    pub mouse_interaction: bool,
    /// Length of the color cross-fade.
    pub transition: Duration,
}

impl Default for EffectParameters {
    fn default() -> Self {
        Self {
            spin_rotation: -2.0,
            spin_speed: 7.0,
            offset: [0.0, 0.0],
            color1: Rgba::from_bytes([0xDE, 0x44, 0x3B, 0xFF]),
            color2: Rgba::from_bytes([0x00, 0x6B, 0xB4, 0xFF]),
            color3: Rgba::from_bytes([0x16, 0x23, 0x25, 0xFF]),
            contrast: 3.5,
            lighting: 0.4,
            spin_amount: 0.25,
            pixel_filter: 745.0,
            spin_ease: 1.0,
            rotate: false,
            mouse_interaction: true,
            transition: Duration::from_millis(800),
        }
    }
}

impl EffectParameters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces all three colors from hex strings; malformed entries become
    /// transparent black.
    pub fn with_hex_colors(mut self, color1: &str, color2: &str, color3: &str) -> Self {
        self.color1 = Rgba::from_hex_or_transparent(color1);
        self.color2 = Rgba::from_hex_or_transparent(color2);
        self.color3 = Rgba::from_hex_or_transparent(color3);
        self
    }

    pub fn colors(&self) -> ColorSet {
        [self.color1, self.color2, self.color3]
    }

    pub fn set_colors(&mut self, colors: ColorSet) {
        [self.color1, self.color2, self.color3] = colors;
    }
}
