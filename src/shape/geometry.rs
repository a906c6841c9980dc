//! Engine collision geometry for each shape kind

use std::f32::consts::FRAC_PI_2;

use rapier3d::na::{Isometry3, Translation3, Unit, UnitQuaternion, Vector3};
use rapier3d::prelude::SharedShape;

use super::inertia::CONVEX_MARGIN;
use super::kind::{Axis, ShapeKind, cylinder_dimensions};
use crate::math::vec_to_engine;

/// Engine geometry plus the pose it takes relative to the owning body
#[derive(Clone)]
pub(crate) struct Geometry {
    pub shape: SharedShape,
    pub local_pose: Isometry3<f32>,
}

impl Geometry {
    fn centered(shape: SharedShape) -> Self {
        Self {
            shape,
            local_pose: Isometry3::identity(),
        }
    }

    /// Engine cylinders and cones run along Y; turn them onto `axis`
    fn y_aligned(shape: SharedShape, axis: Axis) -> Self {
        let rotation = match axis {
            Axis::X => UnitQuaternion::from_axis_angle(&Vector3::z_axis(), -FRAC_PI_2),
            Axis::Y => UnitQuaternion::identity(),
            Axis::Z => UnitQuaternion::from_axis_angle(&Vector3::x_axis(), FRAC_PI_2),
        };
        Self {
            shape,
            local_pose: Isometry3::from_parts(Translation3::identity(), rotation),
        }
    }
}

pub(crate) fn build(kind: &ShapeKind) -> Geometry {
    match *kind {
        ShapeKind::Box { half_extents } => Geometry::centered(SharedShape::cuboid(
            half_extents.x,
            half_extents.y,
            half_extents.z,
        )),
        // Flat boxes keep a margin-thick slab so they still have volume.
        ShapeKind::Box2d {
            x_half_extent,
            y_half_extent,
        } => Geometry::centered(SharedShape::cuboid(
            x_half_extent,
            y_half_extent,
            CONVEX_MARGIN,
        )),
        ShapeKind::Sphere { radius } => Geometry::centered(SharedShape::ball(radius)),
        ShapeKind::Plane { normal, distance } => {
            let normal = vec_to_engine(normal);
            Geometry {
                shape: SharedShape::halfspace(Unit::new_normalize(normal)),
                local_pose: Isometry3::from_parts(
                    Translation3::from(normal * distance),
                    UnitQuaternion::identity(),
                ),
            }
        }
        ShapeKind::Capsule {
            radius,
            height,
            axis,
        } => {
            let half_height = height * 0.5;
            let shape = match axis {
                Axis::X => SharedShape::capsule_x(half_height, radius),
                Axis::Y => SharedShape::capsule_y(half_height, radius),
                Axis::Z => SharedShape::capsule_z(half_height, radius),
            };
            Geometry::centered(shape)
        }
        ShapeKind::Cylinder { half_extents, axis } => {
            let (radius, half_height) = cylinder_dimensions(half_extents, axis);
            Geometry::y_aligned(SharedShape::cylinder(half_height, radius), axis)
        }
        ShapeKind::Cone {
            radius,
            height,
            axis,
        } => Geometry::y_aligned(SharedShape::cone(height * 0.5, radius), axis),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;
    use rapier3d::na::Point3;

    fn world_aabb_half_extents(geometry: &Geometry) -> Vector3<f32> {
        geometry.shape.compute_aabb(&geometry.local_pose).half_extents()
    }

    #[test]
    fn test_cylinder_axis_rotation() {
        let half_extents = Vec3::new(1.0, 3.0, 1.0);
        let along_y = build(&ShapeKind::Cylinder {
            half_extents,
            axis: Axis::Y,
        });
        let aabb = world_aabb_half_extents(&along_y);
        assert!((aabb.y - 3.0).abs() < 1e-4);
        assert!((aabb.x - 1.0).abs() < 1e-4);

        let along_z = build(&ShapeKind::Cylinder {
            half_extents: Vec3::new(1.0, 1.0, 3.0),
            axis: Axis::Z,
        });
        let aabb = world_aabb_half_extents(&along_z);
        assert!((aabb.z - 3.0).abs() < 1e-4);
        assert!((aabb.y - 1.0).abs() < 1e-4);
    }

    #[test]
    fn test_cone_apex_follows_axis() {
        let cone = build(&ShapeKind::Cone {
            radius: 1.0,
            height: 2.0,
            axis: Axis::X,
        });
        // The apex sits at +half_height along the principal axis.
        let apex = cone.local_pose * Point3::new(0.0, 1.0, 0.0);
        assert!((apex.x - 1.0).abs() < 1e-5);
        assert!(apex.y.abs() < 1e-5);
    }

    #[test]
    fn test_plane_is_offset_along_normal() {
        let plane = build(&ShapeKind::Plane {
            normal: Vec3::Y,
            distance: 2.5,
        });
        assert!((plane.local_pose.translation.vector.y - 2.5).abs() < 1e-6);
        assert_eq!(
            plane.shape.shape_type(),
            rapier3d::geometry::ShapeType::HalfSpace
        );
    }
}
