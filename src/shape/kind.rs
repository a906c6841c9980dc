//! Shape variants, axis selection and type discriminants

use glam::Vec3;

use crate::error::PhysicsError;

/// Principal axis of capsules, cylinders and cones
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum Axis {
    /// Aligned with local X
    X = 0,
    /// Aligned with local Y (the default orientation)
    Y = 1,
    /// Aligned with local Z
    Z = 2,
}

impl Axis {
    /// Component index of this axis
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }
}

impl TryFrom<i32> for Axis {
    type Error = PhysicsError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::X),
            1 => Ok(Self::Y),
            2 => Ok(Self::Z),
            other => Err(PhysicsError::InvalidAxis(other)),
        }
    }
}

// Broadphase proxy type boundaries used by the capability predicates.
const IMPLICIT_CONVEX_SHAPES_START: i32 = 7;
const CONVEX_2D: i32 = 18;
const CONCAVE_SHAPES_START: i32 = 20;
const GIMPACT: i32 = 25;
const CONCAVE_SHAPES_END: i32 = 30;
const COMPOUND: i32 = 31;

/// Numeric shape discriminant, stable across the C boundary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum ShapeType {
    /// Solid box
    Box = 0,
    /// Sphere
    Sphere = 8,
    /// Capsule
    Capsule = 10,
    /// Cone
    Cone = 11,
    /// Cylinder
    Cylinder = 13,
    /// Flat box in the XY plane
    Box2d = 17,
    /// Infinite static plane
    StaticPlane = 28,
}

impl ShapeType {
    /// Raw discriminant value
    #[must_use]
    pub const fn raw(self) -> i32 {
        self as i32
    }

    /// Polyhedral shapes come before the implicit convex range
    #[must_use]
    pub const fn is_polyhedral(self) -> bool {
        self.raw() < IMPLICIT_CONVEX_SHAPES_START
    }

    /// Flat convex shapes
    #[must_use]
    pub const fn is_convex_2d(self) -> bool {
        matches!(self, Self::Box2d) || self.raw() == CONVEX_2D
    }

    /// Everything before the concave range is convex
    #[must_use]
    pub const fn is_convex(self) -> bool {
        self.raw() < CONCAVE_SHAPES_START
    }

    /// Shapes strictly inside the concave range
    #[must_use]
    pub const fn is_concave(self) -> bool {
        self.raw() > CONCAVE_SHAPES_START && self.raw() < CONCAVE_SHAPES_END
    }

    /// Concave shapes other than GImpact meshes can never move
    #[must_use]
    pub const fn is_non_moving(self) -> bool {
        self.is_concave() && self.raw() != GIMPACT
    }

    /// Compound shapes
    #[must_use]
    pub const fn is_compound(self) -> bool {
        self.raw() == COMPOUND
    }
}

/// Geometric description of a collision shape
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ShapeKind {
    /// Box with the given half extents
    Box {
        /// Half extents along X, Y, Z
        half_extents: Vec3,
    },
    /// Box in the XY plane with zero thickness
    Box2d {
        /// Half extent along X
        x_half_extent: f32,
        /// Half extent along Y
        y_half_extent: f32,
    },
    /// Sphere around the origin
    Sphere {
        /// Sphere radius
        radius: f32,
    },
    /// Static plane `normal · p = distance`
    Plane {
        /// Unit plane normal
        normal: Vec3,
        /// Plane constant along the normal
        distance: f32,
    },
    /// Capsule whose cylindrical part spans `height` along `axis`
    Capsule {
        /// Cap radius
        radius: f32,
        /// Length of the cylindrical part
        height: f32,
        /// Principal axis
        axis: Axis,
    },
    /// Cylinder described by its bounding half extents
    Cylinder {
        /// Bounding half extents
        half_extents: Vec3,
        /// Principal axis
        axis: Axis,
    },
    /// Cone with its apex toward the positive principal axis
    Cone {
        /// Base radius
        radius: f32,
        /// Apex-to-base height
        height: f32,
        /// Principal axis
        axis: Axis,
    },
}

impl ShapeKind {
    /// Discriminant for this variant
    #[must_use]
    pub const fn shape_type(&self) -> ShapeType {
        match self {
            Self::Box { .. } => ShapeType::Box,
            Self::Box2d { .. } => ShapeType::Box2d,
            Self::Sphere { .. } => ShapeType::Sphere,
            Self::Plane { .. } => ShapeType::StaticPlane,
            Self::Capsule { .. } => ShapeType::Capsule,
            Self::Cylinder { .. } => ShapeType::Cylinder,
            Self::Cone { .. } => ShapeType::Cone,
        }
    }

    /// Axis-aligned half extents in local space.
    ///
    /// Planes are unbounded and report infinity on every axis.
    #[must_use]
    pub fn half_extents(&self) -> Vec3 {
        match *self {
            Self::Box { half_extents } => half_extents,
            Self::Box2d {
                x_half_extent,
                y_half_extent,
            } => Vec3::new(x_half_extent, y_half_extent, 0.0),
            Self::Sphere { radius } => Vec3::splat(radius),
            Self::Plane { .. } => Vec3::splat(f32::INFINITY),
            Self::Capsule {
                radius,
                height,
                axis,
            } => along_axis(axis, radius, radius + height * 0.5),
            Self::Cylinder { half_extents, axis } => {
                let (radius, half_height) = cylinder_dimensions(half_extents, axis);
                along_axis(axis, radius, half_height)
            }
            Self::Cone {
                radius,
                height,
                axis,
            } => along_axis(axis, radius, height * 0.5),
        }
    }
}

/// Extents that are `radial` everywhere except `axial` along `axis`
pub(crate) fn along_axis(axis: Axis, radial: f32, axial: f32) -> Vec3 {
    let mut extents = Vec3::splat(radial);
    extents[axis.index()] = axial;
    extents
}

/// Radius and half height of a cylinder from its bounding half extents.
///
/// X cylinders take their radius from Y; Y and Z cylinders take it from X.
pub(crate) fn cylinder_dimensions(half_extents: Vec3, axis: Axis) -> (f32, f32) {
    let radius = match axis {
        Axis::X => half_extents.y,
        Axis::Y | Axis::Z => half_extents.x,
    };
    (radius, half_extents[axis.index()])
}
