//! Surface and contact parameters of a body

use glam::Vec3;

/// How the anisotropic friction scale is applied
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(i32)]
pub enum AnisotropicFrictionMode {
    /// Scale is ignored
    #[default]
    Disabled = 0,
    /// Scales sliding friction
    Anisotropic = 1,
    /// Scales rolling friction
    AnisotropicRolling = 2,
}

impl AnisotropicFrictionMode {
    /// Decode a raw mode; unknown values fall back to disabled
    #[must_use]
    pub const fn from_raw(raw: i32) -> Self {
        match raw {
            1 => Self::Anisotropic,
            2 => Self::AnisotropicRolling,
            _ => Self::Disabled,
        }
    }
}

/// Contact material of a body
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Material {
    pub friction: f32,
    pub restitution: f32,
    pub rolling_friction: f32,
    pub spinning_friction: f32,
    pub anisotropic_friction: Vec3,
    pub anisotropic_mode: AnisotropicFrictionMode,
    pub contact_stiffness: f32,
    pub contact_damping: f32,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            friction: 0.5,
            restitution: 0.0,
            rolling_friction: 0.0,
            spinning_friction: 0.0,
            anisotropic_friction: Vec3::ONE,
            anisotropic_mode: AnisotropicFrictionMode::Disabled,
            contact_stiffness: 1e18,
            contact_damping: 0.1,
        }
    }
}

impl Material {
    /// Store an anisotropic scale. A unit scale always disables the mode.
    pub fn set_anisotropic_friction(&mut self, scale: Vec3, mode: AnisotropicFrictionMode) {
        self.anisotropic_friction = scale;
        let is_unit = scale == Vec3::ONE;
        self.anisotropic_mode = if is_unit {
            AnisotropicFrictionMode::Disabled
        } else {
            mode
        };
    }
}
