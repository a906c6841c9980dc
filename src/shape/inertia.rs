//! Local inertia tensors (diagonal) for each shape kind

use glam::Vec3;

use super::kind::{Axis, ShapeKind, along_axis, cylinder_dimensions};

/// Collision margin convex shapes are grown by when sizing their inertia
pub const CONVEX_MARGIN: f32 = 0.04;

/// Diagonal inertia of a solid box with the given half extents
pub(crate) fn box_inertia(mass: f32, half_extents: Vec3) -> Vec3 {
    let l = half_extents * 2.0;
    let (x2, y2, z2) = (l.x * l.x, l.y * l.y, l.z * l.z);
    mass / 12.0 * Vec3::new(y2 + z2, x2 + z2, x2 + y2)
}

fn cylinder_inertia(mass: f32, half_extents: Vec3, axis: Axis) -> Vec3 {
    let (radius, half_height) = cylinder_dimensions(half_extents, axis);
    let radius2 = radius * radius;
    let height2 = 4.0 * half_height * half_height;

    let across = mass / 12.0 * height2 + mass / 4.0 * radius2;
    let about_axis = mass / 2.0 * radius2;
    along_axis(axis, across, about_axis)
}

/// Diagonal local inertia of `kind` for the given mass
pub(crate) fn local_inertia(kind: &ShapeKind, mass: f32) -> Vec3 {
    match *kind {
        ShapeKind::Box { half_extents } => box_inertia(mass, half_extents),
        ShapeKind::Box2d {
            x_half_extent,
            y_half_extent,
        } => box_inertia(mass, Vec3::new(x_half_extent, y_half_extent, 0.0)),
        ShapeKind::Sphere { radius } => Vec3::splat(0.4 * mass * radius * radius),
        ShapeKind::Plane { .. } => Vec3::ZERO,
        ShapeKind::Capsule {
            radius,
            height,
            axis,
        } => box_inertia(mass, along_axis(axis, radius, radius + height * 0.5)),
        ShapeKind::Cylinder { half_extents, axis } => cylinder_inertia(mass, half_extents, axis),
        ShapeKind::Cone { .. } => box_inertia(mass, kind.half_extents() + CONVEX_MARGIN),
    }
}
