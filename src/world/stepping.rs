//! Fixed-substep time accumulation and motion-state synchronization

use std::f32::consts::FRAC_PI_4;

use glam::{Quat, Vec3};
use rapier3d::na::{Isometry3, Translation3};

use super::engine::Engine;
use crate::math::{quat_from_engine, quat_to_engine, vec_from_engine};

/// Variable steps shorter than this are skipped
const STEP_EPSILON: f32 = f32::EPSILON;

/// Largest rotation a body may be extrapolated by in one interpolation
const ANGULAR_MOTION_THRESHOLD: f32 = FRAC_PI_4;

/// What one `step_simulation` call will do
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct StepPlan {
    /// Substeps to run, already clamped to the cap
    pub substeps: i32,
    /// Length of each substep
    pub step_size: f32,
    /// Accumulator carried into the next call
    pub local_time: f32,
    /// Offset from the final pose at which motion states are sampled
    pub interpolation_time: f32,
}

/// Decide how many substeps `dt` buys given the carried-over accumulator.
///
/// With `max_substeps > 0` whole `fixed_substep` increments are taken from
/// the accumulated time and the remainder is carried over; increments beyond
/// the cap are discarded. With `max_substeps == 0` a single variable step of
/// `dt` runs, or none if `dt` is effectively zero or negative.
pub(crate) fn plan_step(local_time: f32, dt: f32, max_substeps: i32, fixed_substep: f32) -> StepPlan {
    if max_substeps > 0 {
        let mut local_time = local_time + dt;
        let mut available = 0;
        if local_time >= fixed_substep {
            available = (local_time / fixed_substep) as i32;
            local_time -= available as f32 * fixed_substep;
        }

        StepPlan {
            substeps: available.min(max_substeps),
            step_size: fixed_substep,
            local_time,
            // Graphics lag one substep behind so they never extrapolate ahead.
            interpolation_time: local_time - fixed_substep,
        }
    } else {
        StepPlan {
            substeps: i32::from(dt >= STEP_EPSILON),
            step_size: dt,
            local_time: 0.0,
            interpolation_time: 0.0,
        }
    }
}

/// Extrapolate `pose` by the given velocities over `dt`
pub(crate) fn integrate_transform(
    pose: &Isometry3<f32>,
    linvel: Vec3,
    angvel: Vec3,
    dt: f32,
) -> Isometry3<f32> {
    let translation = vec_from_engine(&pose.translation.vector) + linvel * dt;

    let mut angle = angvel.length();
    if angle * dt > ANGULAR_MOTION_THRESHOLD {
        angle = ANGULAR_MOTION_THRESHOLD / dt;
    }
    let rotation = match angvel.try_normalize() {
        Some(axis) => Quat::from_scaled_axis(axis * angle * dt) * quat_from_engine(&pose.rotation),
        None => quat_from_engine(&pose.rotation),
    };

    Isometry3::from_parts(
        Translation3::new(translation.x, translation.y, translation.z),
        quat_to_engine(rotation.normalize()),
    )
}

impl Engine {
    /// Advance by `dt` and return the substeps actually run
    pub fn step_simulation(&mut self, dt: f32, max_substeps: i32, fixed_substep: f32) -> i32 {
        assert!(
            max_substeps <= 0 || fixed_substep > 0.0,
            "fixed substep must be positive, got {fixed_substep}"
        );

        let plan = plan_step(self.dynamics.local_time, dt, max_substeps.max(0), fixed_substep);
        self.dynamics.local_time = plan.local_time;

        if plan.substeps > 0 {
            self.refresh_joints(plan.step_size);
            for _ in 0..plan.substeps {
                self.single_step(plan.step_size);
            }
        }

        self.synchronize_motion_states(plan.interpolation_time);
        self.clear_forces();

        log::trace!("Stepped {dt}s in {} substeps", plan.substeps);
        plan.substeps
    }

    /// Rebuild joints from their current parameters for substeps of `dt`
    fn refresh_joints(&mut self, dt: f32) {
        let dynamics = &mut self.dynamics;
        for (handle, joint) in dynamics.impulse_joints.iter_mut() {
            let Some(constraint) = dynamics.joints.get(&handle).and_then(|c| c.upgrade()) else {
                continue;
            };
            joint.data = constraint.state().engine_joint(dt);
        }
    }

    /// Copy simulated poses into the motion states of awake dynamic bodies
    fn synchronize_motion_states(&mut self, interpolation_time: f32) {
        for (handle, member) in &self.dynamics.members {
            let Some(member) = member.upgrade() else {
                continue;
            };
            let Some(body) = self.dynamics.bodies.get(*handle) else {
                continue;
            };
            if !body.is_dynamic() || body.is_sleeping() || !body.is_enabled() {
                continue;
            }

            let pose = integrate_transform(
                body.position(),
                vec_from_engine(body.linvel()),
                vec_from_engine(body.angvel()),
                interpolation_time,
            );
            if let Some(motion_state) = member.state().motion_state.as_mut() {
                motion_state.set_world_transform(pose);
            }
        }
    }

    fn clear_forces(&mut self) {
        for (_, body) in self.dynamics.bodies.iter_mut() {
            body.reset_forces(false);
            body.reset_torques(false);
        }
    }
}
