//! Point-to-point joint parameters and their engine mapping

use glam::Vec3;
use rapier3d::na::Point3;
use rapier3d::prelude::{GenericJoint, GenericJointBuilder, JointAxesMask, JointAxis};

use crate::math::vec_to_engine;

/// Parameter block of a point-to-point constraint
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point2PointParams {
    /// Pivot in body A's local frame
    pub pivot_a: Vec3,
    /// Pivot in body B's local frame
    pub pivot_b: Vec3,
    /// Positional error correction rate
    pub tau: f32,
    /// Velocity damping at the joint
    pub damping: f32,
    /// Largest corrective impulse per step, 0 for unclamped
    pub impulse_clamp: f32,
}

impl Point2PointParams {
    pub fn new(pivot_a: Vec3, pivot_b: Vec3) -> Self {
        Self {
            pivot_a,
            pivot_b,
            tau: 0.3,
            damping: 1.0,
            impulse_clamp: 0.0,
        }
    }

    /// Engine joint for a step of `dt` seconds.
    ///
    /// The pivots are pulled together by per-axis position motors with
    /// stiffness `tau / dt²` and damping `damping / dt`. A positive clamp
    /// limits the motor force so one step never applies more than
    /// `impulse_clamp`; otherwise the force is unbounded.
    pub fn to_engine_joint(&self, dt: f32, contacts_enabled: bool) -> GenericJoint {
        let stiffness = self.tau / (dt * dt);
        let damping = self.damping / dt;
        let max_force = if self.impulse_clamp > 0.0 {
            self.impulse_clamp / dt
        } else {
            f32::MAX
        };

        [JointAxis::LinX, JointAxis::LinY, JointAxis::LinZ]
            .into_iter()
            .fold(GenericJointBuilder::new(JointAxesMask::empty()), |builder, axis| {
                builder
                    .motor_position(axis, 0.0, stiffness, damping)
                    .motor_max_force(axis, max_force)
            })
            .local_anchor1(Point3::from(vec_to_engine(self.pivot_a)))
            .local_anchor2(Point3::from(vec_to_engine(self.pivot_b)))
            .contacts_enabled(contacts_enabled)
            .build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let params = Point2PointParams::new(Vec3::X, Vec3::NEG_X);
        assert_eq!(params.tau, 0.3);
        assert_eq!(params.damping, 1.0);
        assert_eq!(params.impulse_clamp, 0.0);
    }

    #[test]
    fn test_unclamped_joint_follows_tau_and_damping() {
        let mut params = Point2PointParams::new(Vec3::X, Vec3::ZERO);
        params.tau = 0.6;
        params.damping = 0.5;
        let dt = 0.5;
        let joint = params.to_engine_joint(dt, true);

        assert!(joint.locked_axes.is_empty());
        assert!((joint.local_anchor1().x - 1.0).abs() < 1e-6);
        assert!(joint.contacts_enabled);
        let motor = joint.motor(JointAxis::LinX).expect("motor on linear X");
        assert_eq!(motor.max_force, f32::MAX);
        assert!((motor.stiffness - 2.4).abs() < 1e-5);
        assert!((motor.damping - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_clamped_joint_uses_motors() {
        let mut params = Point2PointParams::new(Vec3::ZERO, Vec3::Y);
        params.impulse_clamp = 0.5;
        let dt = 0.25;
        let joint = params.to_engine_joint(dt, false);

        assert!(joint.locked_axes.is_empty());
        assert!(!joint.contacts_enabled);
        let motor = joint.motor(JointAxis::LinY).expect("motor on linear Y");
        assert!((motor.max_force - 2.0).abs() < 1e-6);
        assert!((motor.stiffness - 0.3 / (dt * dt)).abs() < 1e-4);
        assert!((motor.damping - 4.0).abs() < 1e-6);
    }
}
