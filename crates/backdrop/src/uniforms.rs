use std::fmt;

use bytemuck::{Pod, Zeroable};

use crate::params::EffectParameters;
use crate::surface::SurfaceSize;
use crate::transition::ColorSet;

/// CPU mirror of the `EffectParams` uniform block.
///
/// The field order must match the std140 block declared in
/// [`crate::compile`]; every member is a 4-byte scalar so the struct has no
/// implicit padding and can be uploaded with `bytemuck::bytes_of`.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct EffectUniforms {
    /// Width, height, aspect ratio; the fourth lane is unused.
    pub i_resolution: [f32; 4],
    pub u_color1: [f32; 4],
    pub u_color2: [f32; 4],
    pub u_color3: [f32; 4],
    pub u_offset: [f32; 2],
    pub u_mouse: [f32; 2],
    pub i_time: f32,
    pub u_spin_rotation: f32,
    pub u_spin_speed: f32,
    pub u_contrast: f32,
    pub u_lighting: f32,
    pub u_spin_amount: f32,
    pub u_pixel_filter: f32,
    pub u_spin_ease: f32,
    /// GLSL `bool` is not host-shareable; the shader compares against zero.
    pub u_is_rotate: u32,
    pub _padding: [u32; 3],
}

impl EffectUniforms {
    /// Byte size of the uniform block.
    pub const SIZE: u64 = std::mem::size_of::<Self>() as u64;

    pub fn new(parameters: &EffectParameters, size: SurfaceSize) -> Self {
        let mut uniforms = Self::zeroed();
        uniforms.u_mouse = [0.5, 0.5];
        uniforms.apply_parameters(parameters);
        uniforms.set_colors(&parameters.colors());
        uniforms.set_resolution(size);
        uniforms
    }

    /// Pushes every non-color parameter; colors are owned by the transition engine.
    pub fn apply_parameters(&mut self, parameters: &EffectParameters) {
        self.u_spin_rotation = parameters.spin_rotation;
        self.u_spin_speed = parameters.spin_speed;
        self.u_offset = parameters.offset;
        self.u_contrast = parameters.contrast;
        self.u_lighting = parameters.lighting;
        self.u_spin_amount = parameters.spin_amount;
        self.u_pixel_filter = parameters.pixel_filter;
        self.u_spin_ease = parameters.spin_ease;
        self.u_is_rotate = u32::from(parameters.rotate);
    }

    pub fn set_time(&mut self, seconds: f32) {
        self.i_time = seconds;
    }

    /// Updates width, height and the cached aspect ratio.
    pub fn set_resolution(&mut self, size: SurfaceSize) {
        self.i_resolution = [size.width as f32, size.height as f32, size.aspect(), 0.0];
    }

    pub fn resolution(&self) -> [f32; 3] {
        [
            self.i_resolution[0],
            self.i_resolution[1],
            self.i_resolution[2],
        ]
    }

    pub fn set_colors(&mut self, colors: &ColorSet) {
        self.u_color1 = colors[0].channels();
        self.u_color2 = colors[1].channels();
        self.u_color3 = colors[2].channels();
    }

    pub fn set_pointer(&mut self, position: [f32; 2]) {
        self.u_mouse = position;
    }

    /// Writes one uniform by its shader name.
    pub fn set(&mut self, name: &str, value: UniformValue) -> Result<(), UniformError> {
        let slot = UniformSlot::from_name(name)
            .ok_or_else(|| UniformError::Unknown(name.to_string()))?;
        let mismatch = UniformError::TypeMismatch {
            name: slot.name(),
            expected: slot.kind(),
            found: value.kind(),
        };
        match (slot, value) {
            (UniformSlot::Time, UniformValue::Float(v)) => self.i_time = v,
            (UniformSlot::Resolution, UniformValue::Vec3([w, h, aspect])) => {
                self.i_resolution = [w, h, aspect, 0.0]
            }
            (UniformSlot::SpinRotation, UniformValue::Float(v)) => self.u_spin_rotation = v,
            (UniformSlot::SpinSpeed, UniformValue::Float(v)) => self.u_spin_speed = v,
            (UniformSlot::Offset, UniformValue::Vec2(v)) => self.u_offset = v,
            (UniformSlot::Color1, UniformValue::Vec4(v)) => self.u_color1 = v,
            (UniformSlot::Color2, UniformValue::Vec4(v)) => self.u_color2 = v,
            (UniformSlot::Color3, UniformValue::Vec4(v)) => self.u_color3 = v,
            (UniformSlot::Contrast, UniformValue::Float(v)) => self.u_contrast = v,
            (UniformSlot::Lighting, UniformValue::Float(v)) => self.u_lighting = v,
            (UniformSlot::SpinAmount, UniformValue::Float(v)) => self.u_spin_amount = v,
            (UniformSlot::PixelFilter, UniformValue::Float(v)) => self.u_pixel_filter = v,
            (UniformSlot::SpinEase, UniformValue::Float(v)) => self.u_spin_ease = v,
            (UniformSlot::IsRotate, UniformValue::Bool(v)) => self.u_is_rotate = u32::from(v),
            (UniformSlot::Mouse, UniformValue::Vec2(v)) => self.u_mouse = v,
            _ => return Err(mismatch),
        }
        Ok(())
    }

    /// Reads one uniform by its shader name.
    pub fn get(&self, name: &str) -> Option<UniformValue> {
        let value = match UniformSlot::from_name(name)? {
            UniformSlot::Time => UniformValue::Float(self.i_time),
            UniformSlot::Resolution => UniformValue::Vec3(self.resolution()),
            UniformSlot::SpinRotation => UniformValue::Float(self.u_spin_rotation),
            UniformSlot::SpinSpeed => UniformValue::Float(self.u_spin_speed),
            UniformSlot::Offset => UniformValue::Vec2(self.u_offset),
            UniformSlot::Color1 => UniformValue::Vec4(self.u_color1),
            UniformSlot::Color2 => UniformValue::Vec4(self.u_color2),
            UniformSlot::Color3 => UniformValue::Vec4(self.u_color3),
            UniformSlot::Contrast => UniformValue::Float(self.u_contrast),
            UniformSlot::Lighting => UniformValue::Float(self.u_lighting),
            UniformSlot::SpinAmount => UniformValue::Float(self.u_spin_amount),
            UniformSlot::PixelFilter => UniformValue::Float(self.u_pixel_filter),
            UniformSlot::SpinEase => UniformValue::Float(self.u_spin_ease),
            UniformSlot::IsRotate => UniformValue::Bool(self.u_is_rotate != 0),
            UniformSlot::Mouse => UniformValue::Vec2(self.u_mouse),
        };
        Some(value)
    }
}

/// Named entries of the uniform table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UniformSlot {
    Time,
    Resolution,
    SpinRotation,
    SpinSpeed,
    Offset,
    Color1,
    Color2,
    Color3,
    Contrast,
    Lighting,
    SpinAmount,
    PixelFilter,
    SpinEase,
    IsRotate,
    Mouse,
}

impl UniformSlot {
    pub const ALL: [UniformSlot; 15] = [
        UniformSlot::Time,
        UniformSlot::Resolution,
        UniformSlot::SpinRotation,
        UniformSlot::SpinSpeed,
        UniformSlot::Offset,
        UniformSlot::Color1,
        UniformSlot::Color2,
        UniformSlot::Color3,
        UniformSlot::Contrast,
        UniformSlot::Lighting,
        UniformSlot::SpinAmount,
        UniformSlot::PixelFilter,
        UniformSlot::SpinEase,
        UniformSlot::IsRotate,
        UniformSlot::Mouse,
    ];

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|slot| slot.name() == name)
    }

    pub fn name(self) -> &'static str {
        match self {
            UniformSlot::Time => "iTime",
            UniformSlot::Resolution => "iResolution",
            UniformSlot::SpinRotation => "uSpinRotation",
            UniformSlot::SpinSpeed => "uSpinSpeed",
            UniformSlot::Offset => "uOffset",
            UniformSlot::Color1 => "uColor1",
            UniformSlot::Color2 => "uColor2",
            UniformSlot::Color3 => "uColor3",
            UniformSlot::Contrast => "uContrast",
            UniformSlot::Lighting => "uLighting",
            UniformSlot::SpinAmount => "uSpinAmount",
            UniformSlot::PixelFilter => "uPixelFilter",
            UniformSlot::SpinEase => "uSpinEase",
            UniformSlot::IsRotate => "uIsRotate",
            UniformSlot::Mouse => "uMouse",
        }
    }

    pub fn kind(self) -> UniformKind {
        match self {
            UniformSlot::Resolution => UniformKind::Vec3,
            UniformSlot::Offset | UniformSlot::Mouse => UniformKind::Vec2,
            UniformSlot::Color1 | UniformSlot::Color2 | UniformSlot::Color3 => UniformKind::Vec4,
            UniformSlot::IsRotate => UniformKind::Bool,
            _ => UniformKind::Float,
        }
    }

    /// Index into a [`ColorSet`] for the three color slots.
    pub fn color_index(self) -> Option<usize> {
        match self {
            UniformSlot::Color1 => Some(0),
            UniformSlot::Color2 => Some(1),
            UniformSlot::Color3 => Some(2),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UniformKind {
    Float,
    Vec2,
    Vec3,
    Vec4,
    Bool,
}

impl fmt::Display for UniformKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UniformKind::Float => f.write_str("float"),
            UniformKind::Vec2 => f.write_str("vec2"),
            UniformKind::Vec3 => f.write_str("vec3"),
            UniformKind::Vec4 => f.write_str("vec4"),
            UniformKind::Bool => f.write_str("bool"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UniformValue {
    Float(f32),
    Vec2([f32; 2]),
    Vec3([f32; 3]),
    Vec4([f32; 4]),
    Bool(bool),
}

impl UniformValue {
    pub fn kind(&self) -> UniformKind {
        match self {
            UniformValue::Float(_) => UniformKind::Float,
            UniformValue::Vec2(_) => UniformKind::Vec2,
            UniformValue::Vec3(_) => UniformKind::Vec3,
            UniformValue::Vec4(_) => UniformKind::Vec4,
            UniformValue::Bool(_) => UniformKind::Bool,
        }
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum UniformError {
    #[error("unknown uniform '{0}'")]
    Unknown(String),
    #[error("uniform '{name}' expects a {expected}, got a {found}")]
    TypeMismatch {
        name: &'static str,
        expected: UniformKind,
        found: UniformKind,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn size(width: u32, height: u32) -> SurfaceSize {
        SurfaceSize::new(width, height)
    }

    #[test]
    fn block_is_std140_sized() {
        assert_eq!(std::mem::size_of::<EffectUniforms>(), 128);
        assert_eq!(std::mem::size_of::<EffectUniforms>() % 16, 0);
    }

    #[test]
    fn resolution_carries_exact_aspect_ratio() {
        let mut uniforms = EffectUniforms::new(&EffectParameters::default(), size(1, 1));
        for (w, h) in [(1920u32, 1080u32), (1080, 1920), (333, 7), (1, 1)] {
            uniforms.set_resolution(size(w, h));
            let [width, height, aspect] = uniforms.resolution();
            assert_eq!(width, w as f32);
            assert_eq!(height, h as f32);
            assert_eq!(aspect, w as f32 / h as f32);
        }
    }

    #[test]
    fn new_seeds_pointer_and_parameters() {
        let params = EffectParameters {
            rotate: true,
            pixel_filter: 600.0,
            ..EffectParameters::default()
        };
        let uniforms = EffectUniforms::new(&params, size(800, 600));
        assert_eq!(uniforms.u_mouse, [0.5, 0.5]);
        assert_eq!(uniforms.u_is_rotate, 1);
        assert_eq!(uniforms.u_pixel_filter, 600.0);
        assert_eq!(uniforms.u_color1, params.color1.channels());
    }

    #[test]
    fn set_by_name_round_trips_through_get() {
        let mut uniforms = EffectUniforms::new(&EffectParameters::default(), size(4, 3));
        uniforms
            .set("uContrast", UniformValue::Float(2.0))
            .expect("float uniform");
        uniforms
            .set("uIsRotate", UniformValue::Bool(true))
            .expect("bool uniform");
        uniforms
            .set("uOffset", UniformValue::Vec2([0.1, -0.1]))
            .expect("vec2 uniform");
        assert_eq!(uniforms.get("uContrast"), Some(UniformValue::Float(2.0)));
        assert_eq!(uniforms.get("uIsRotate"), Some(UniformValue::Bool(true)));
        assert_eq!(uniforms.get("uOffset"), Some(UniformValue::Vec2([0.1, -0.1])));
        assert_eq!(
            uniforms.get("iResolution"),
            Some(UniformValue::Vec3([4.0, 3.0, 4.0 / 3.0]))
        );
    }

    #[test]
    fn set_rejects_unknown_names_and_wrong_types() {
        let mut uniforms = EffectUniforms::new(&EffectParameters::default(), size(4, 3));
        assert_eq!(
            uniforms.set("uGlow", UniformValue::Float(1.0)),
            Err(UniformError::Unknown("uGlow".into()))
        );
        assert_eq!(
            uniforms.set("uColor1", UniformValue::Float(1.0)),
            Err(UniformError::TypeMismatch {
                name: "uColor1",
                expected: UniformKind::Vec4,
                found: UniformKind::Float,
            })
        );
    }

    #[test]
    fn every_slot_name_resolves_back() {
        for slot in UniformSlot::ALL {
            assert_eq!(UniformSlot::from_name(slot.name()), Some(slot));
        }
    }
}
