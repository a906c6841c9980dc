//! Closest-hit ray queries

use std::rc::Rc;

use glam::Vec3;
use rapier3d::na::{Isometry3, Point3};
use rapier3d::parry::query::Ray;

use super::engine::Engine;
use crate::body::RigidBody;
use crate::math::{vec_from_engine, vec_to_engine};

/// Closest intersection found by a ray test
#[derive(Debug, Clone)]
pub struct RayHit {
    /// World-space hit point
    pub point: Vec3,
    /// World-space surface normal at the hit
    pub normal: Vec3,
    /// Position of the hit along the segment, in `[0, 1]`
    pub fraction: f32,
    /// The body that was hit
    pub body: Rc<RigidBody>,
}

impl Engine {
    /// Closest body hit by the segment `from -> to`.
    ///
    /// A collider is a candidate iff its group intersects `mask` and its mask
    /// intersects `group`. Rays starting inside a solid hit at fraction 0.
    pub fn ray_test_closest(&self, from: Vec3, to: Vec3, group: i32, mask: i32) -> Option<RayHit> {
        let direction = to - from;
        if direction.length_squared() == 0.0 {
            return None;
        }
        let ray = Ray::new(Point3::from(vec_to_engine(from)), vec_to_engine(direction));
        let (group, mask) = (group as u32, mask as u32);

        let mut closest = None;
        let mut closest_fraction = f32::INFINITY;

        for (_, collider) in self.dynamics.colliders.iter() {
            let groups = collider.collision_groups();
            if groups.memberships.bits() & mask == 0 || group & groups.filter.bits() == 0 {
                continue;
            }
            let Some(parent) = collider.parent() else {
                continue;
            };
            let Some(body) = self.dynamics.bodies.get(parent) else {
                continue;
            };

            // Bodies moved since the last step have stale collider poses.
            let local_pose = collider
                .position_wrt_parent()
                .copied()
                .unwrap_or_else(Isometry3::identity);
            let pose = body.position() * local_pose;

            if let Some(hit) = collider
                .shape()
                .cast_ray_and_get_normal(&pose, &ray, 1.0, true)
                && hit.time_of_impact < closest_fraction
            {
                closest_fraction = hit.time_of_impact;
                closest = Some((parent, hit));
            }
        }

        let (parent, hit) = closest?;
        let body = self.dynamics.members.get(&parent)?.upgrade()?;

        Some(RayHit {
            point: from + direction * hit.time_of_impact,
            normal: vec_from_engine(&hit.normal),
            fraction: hit.time_of_impact,
            body,
        })
    }
}
