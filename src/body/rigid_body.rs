//! Rigid bodies and their residence inside or outside a world

use std::cell::{RefCell, RefMut};
use std::ffi::c_void;
use std::fmt;
use std::rc::{Rc, Weak};

use glam::{Mat3, Vec3};
use rapier3d::dynamics::RigidBody as EngineBody;
use rapier3d::na::{Point3, Vector3};
use rapier3d::prelude::{
    Collider, ColliderBuilder, ColliderHandle, CoefficientCombineRule, Group, InteractionGroups,
    LockedAxes, MassProperties, RigidBodyActivation, RigidBodyBuilder, RigidBodyHandle,
    RigidBodyType,
};

use super::activation::ActivationState;
use super::material::{AnisotropicFrictionMode, Material};
use super::motion_state::MotionState;
use crate::error::PhysicsError;
use crate::math::{
    Transform, from_engine_isometry, quat_from_engine, read_motion_state_transform,
    to_engine_isometry, vec_from_engine, vec_to_engine,
};
use crate::shape::Shape;
use crate::world::Engine;

/// Number of integer user-index slots on a body
pub const BODY_USER_INDEX_SLOTS: usize = 3;

/// Collision group and mask a body was added to its world with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollisionFilter {
    pub group: i32,
    pub mask: i32,
}

impl CollisionFilter {
    pub const DEFAULT: i32 = 1;
    pub const STATIC: i32 = 2;
    pub const ALL: i32 = -1;

    /// Filter a body gets when added without an explicit one
    #[must_use]
    pub const fn default_for(is_dynamic: bool) -> Self {
        if is_dynamic {
            Self {
                group: Self::DEFAULT,
                mask: Self::ALL,
            }
        } else {
            Self {
                group: Self::STATIC,
                mask: Self::ALL ^ Self::STATIC,
            }
        }
    }

    pub(crate) fn interaction_groups(self) -> InteractionGroups {
        InteractionGroups::new(
            Group::from_bits_retain(self.group as u32),
            Group::from_bits_retain(self.mask as u32),
        )
    }
}

/// Where the engine-side body currently lives
pub(crate) enum Residence {
    /// Not in any world; the body is held directly
    Detached(Box<EngineBody>),
    /// Inserted into a world's body set
    InWorld {
        engine: Weak<RefCell<Engine>>,
        body: RigidBodyHandle,
        collider: Option<ColliderHandle>,
    },
    /// Only observable while moving between the two states above
    Vacant,
}

pub(crate) struct BodyState {
    pub motion_state: Option<MotionState>,
    pub shape: Option<Rc<Shape>>,
    pub material: Material,
    pub mass: f32,
    pub local_inertia: Vec3,
    pub linear_factor: Vec3,
    pub angular_factor: Vec3,
    pub activation: ActivationState,
    pub filter: Option<CollisionFilter>,
    pub user_pointer: *mut c_void,
    pub user_indices: [i32; BODY_USER_INDEX_SLOTS],
    pub residence: Residence,
}

fn upgrade(engine: &Weak<RefCell<Engine>>) -> Rc<RefCell<Engine>> {
    engine
        .upgrade()
        .expect("world dropped while one of its bodies still referenced it")
}

impl BodyState {
    /// Read the engine body wherever it lives
    pub fn read<R>(&self, f: impl FnOnce(&EngineBody) -> R) -> R {
        match &self.residence {
            Residence::Detached(body) => f(body),
            Residence::InWorld { engine, body, .. } => {
                let engine = upgrade(engine);
                let engine = engine.borrow();
                f(&engine.dynamics.bodies[*body])
            }
            Residence::Vacant => unreachable!("body read during a world transfer"),
        }
    }

    /// Mutate the engine body wherever it lives
    pub fn write<R>(&mut self, f: impl FnOnce(&mut EngineBody) -> R) -> R {
        match &mut self.residence {
            Residence::Detached(body) => f(body),
            Residence::InWorld { engine, body, .. } => {
                let engine = upgrade(engine);
                let mut engine = engine.borrow_mut();
                let body = engine
                    .dynamics
                    .bodies
                    .get_mut(*body)
                    .expect("member body missing from its world");
                f(body)
            }
            Residence::Vacant => unreachable!("body written during a world transfer"),
        }
    }

    /// Mutate the engine collider if the body is in a world and has one
    fn write_collider(&mut self, f: impl FnOnce(&mut Collider)) {
        if let Residence::InWorld {
            engine,
            collider: Some(collider),
            ..
        } = &self.residence
        {
            let engine = upgrade(engine);
            let mut engine = engine.borrow_mut();
            if let Some(collider) = engine.dynamics.colliders.get_mut(*collider) {
                f(collider);
            }
        }
    }

    pub fn is_in_world(&self) -> bool {
        matches!(self.residence, Residence::InWorld { .. })
    }

    pub fn is_static(&self) -> bool {
        self.mass == 0.0
    }

    /// Collider for the current shape, material and filter
    pub fn build_collider(&self) -> Option<Collider> {
        let shape = self.shape.as_ref()?;
        let geometry = shape.geometry();
        let filter = self
            .filter
            .unwrap_or_else(|| CollisionFilter::default_for(!self.is_static()));

        Some(
            ColliderBuilder::new(geometry.shape.clone())
                .position(geometry.local_pose)
                .density(0.0)
                .friction(self.material.friction)
                .restitution(self.material.restitution)
                .friction_combine_rule(CoefficientCombineRule::Multiply)
                .restitution_combine_rule(CoefficientCombineRule::Multiply)
                .collision_groups(filter.interaction_groups())
                .build(),
        )
    }

    fn apply_mass_props(&mut self) {
        let body_type = if self.is_static() {
            RigidBodyType::Fixed
        } else {
            RigidBodyType::Dynamic
        };
        let props = mass_properties(self.mass, self.local_inertia);
        self.write(|body| {
            body.set_body_type(body_type, false);
            body.set_additional_mass_properties(props, false);
        });
    }

    fn apply_locked_axes(&mut self) {
        let axes = locked_axes(self.linear_factor, self.angular_factor);
        self.write(|body| body.set_locked_axes(axes, false));
    }

    /// Push an activation state down to the engine body
    pub fn apply_activation(&mut self, activation: ActivationState) {
        self.activation = activation;
        self.write(|body| match activation {
            ActivationState::Active => {
                body.set_enabled(true);
                allow_sleep(body);
                body.wake_up(true);
            }
            ActivationState::IslandSleeping => {
                body.set_enabled(true);
                allow_sleep(body);
                body.sleep();
            }
            ActivationState::WantsDeactivation => {}
            ActivationState::DisableDeactivation => {
                body.set_enabled(true);
                *body.activation_mut() = RigidBodyActivation::cannot_sleep();
                body.wake_up(true);
            }
            ActivationState::DisableSimulation => body.set_enabled(false),
        });
    }

    /// Inverse inertia tensor in world space
    fn inv_inertia_world(&self) -> Mat3 {
        let inv = |i: f32| if i == 0.0 { 0.0 } else { 1.0 / i };
        let local = Mat3::from_diagonal(Vec3::new(
            inv(self.local_inertia.x),
            inv(self.local_inertia.y),
            inv(self.local_inertia.z),
        ));
        let rotation = Mat3::from_quat(self.read(|body| quat_from_engine(body.rotation())));
        rotation * local * rotation.transpose()
    }
}

/// Restore sleep thresholds a previous `DisableDeactivation` removed
fn allow_sleep(body: &mut EngineBody) {
    if body.activation().normalized_linear_threshold < 0.0 {
        *body.activation_mut() = RigidBodyActivation::active();
    }
}

fn mass_properties(mass: f32, inertia: Vec3) -> MassProperties {
    MassProperties::new(Point3::origin(), mass, vec_to_engine(inertia))
}

/// A zero factor component locks that axis
fn locked_axes(linear: Vec3, angular: Vec3) -> LockedAxes {
    let mut axes = LockedAxes::empty();
    let flags = [
        (linear.x, LockedAxes::TRANSLATION_LOCKED_X),
        (linear.y, LockedAxes::TRANSLATION_LOCKED_Y),
        (linear.z, LockedAxes::TRANSLATION_LOCKED_Z),
        (angular.x, LockedAxes::ROTATION_LOCKED_X),
        (angular.y, LockedAxes::ROTATION_LOCKED_Y),
        (angular.z, LockedAxes::ROTATION_LOCKED_Z),
    ];
    for (factor, flag) in flags {
        if factor == 0.0 {
            axes |= flag;
        }
    }
    axes
}

/// A rigid body bound to a shape, a mass and a motion state
pub struct RigidBody {
    state: RefCell<BodyState>,
}

impl RigidBody {
    /// Create a body at `transform`.
    ///
    /// Mass 0 makes the body static with zero inertia; any positive mass
    /// makes it dynamic with inertia computed from `shape`.
    ///
    /// # Errors
    ///
    /// Returns an error if `mass` is negative or NaN
    pub fn try_new(mass: f32, transform: &Transform, shape: Rc<Shape>) -> Result<Rc<Self>, PhysicsError> {
        if !(mass >= 0.0) {
            return Err(PhysicsError::NegativeMass(mass));
        }

        let local_inertia = if mass == 0.0 {
            Vec3::ZERO
        } else {
            shape.calculate_local_inertia(mass)
        };

        let motion_state = MotionState::new(to_engine_isometry(transform));
        let body_type = if mass == 0.0 {
            RigidBodyType::Fixed
        } else {
            RigidBodyType::Dynamic
        };
        let body = RigidBodyBuilder::new(body_type)
            .position(motion_state.world_transform())
            .additional_mass_properties(mass_properties(mass, local_inertia))
            .build();

        log::trace!(
            "Creating rigid body: mass {mass}, {:?} shape",
            shape.shape_type()
        );

        Ok(Rc::new(Self::from_parts(
            Some(motion_state),
            Some(shape),
            mass,
            local_inertia,
            body,
        )))
    }

    /// Create a body, panicking on invalid mass
    ///
    /// # Panics
    /// Panics if `mass` is negative or NaN.
    pub fn new(mass: f32, transform: &Transform, shape: Rc<Shape>) -> Rc<Self> {
        Self::try_new(mass, transform, shape).unwrap_or_else(|e| panic!("{e}"))
    }

    /// Massless, shapeless, immovable body used as a constraint anchor
    pub(crate) fn fixed_anchor() -> Rc<Self> {
        Rc::new(Self::from_parts(
            None,
            None,
            0.0,
            Vec3::ZERO,
            RigidBodyBuilder::fixed().build(),
        ))
    }

    fn from_parts(
        motion_state: Option<MotionState>,
        shape: Option<Rc<Shape>>,
        mass: f32,
        local_inertia: Vec3,
        body: EngineBody,
    ) -> Self {
        Self {
            state: RefCell::new(BodyState {
                motion_state,
                shape,
                material: Material::default(),
                mass,
                local_inertia,
                linear_factor: Vec3::ONE,
                angular_factor: Vec3::ONE,
                activation: ActivationState::Active,
                filter: None,
                user_pointer: std::ptr::null_mut(),
                user_indices: [-1; BODY_USER_INDEX_SLOTS],
                residence: Residence::Detached(Box::new(body)),
            }),
        }
    }

    pub(crate) fn state(&self) -> RefMut<'_, BodyState> {
        self.state.borrow_mut()
    }

    pub fn shape(&self) -> Option<Rc<Shape>> {
        self.state.borrow().shape.clone()
    }

    /// Swap the collision shape. Mass and inertia are left unchanged.
    pub fn set_shape(&self, shape: Rc<Shape>) {
        let mut state = self.state.borrow_mut();
        let geometry = shape.geometry().clone();
        state.shape = Some(shape);
        let collider = state.build_collider();

        if let Residence::InWorld {
            engine,
            body,
            collider: slot,
        } = &mut state.residence
        {
            let engine = upgrade(engine);
            let mut engine = engine.borrow_mut();
            let dynamics = &mut engine.dynamics;

            match *slot {
                Some(handle) => {
                    if let Some(existing) = dynamics.colliders.get_mut(handle) {
                        existing.set_shape(geometry.shape);
                        existing.set_position_wrt_parent(geometry.local_pose);
                    }
                }
                None => {
                    *slot = collider.map(|collider| {
                        dynamics
                            .colliders
                            .insert_with_parent(collider, *body, &mut dynamics.bodies)
                    });
                }
            }
        }
    }

    pub fn restitution(&self) -> f32 {
        self.state.borrow().material.restitution
    }

    pub fn set_restitution(&self, restitution: f32) {
        let mut state = self.state.borrow_mut();
        state.material.restitution = restitution;
        state.write_collider(|collider| collider.set_restitution(restitution));
    }

    pub fn friction(&self) -> f32 {
        self.state.borrow().material.friction
    }

    pub fn set_friction(&self, friction: f32) {
        let mut state = self.state.borrow_mut();
        state.material.friction = friction;
        state.write_collider(|collider| collider.set_friction(friction));
    }

    pub fn rolling_friction(&self) -> f32 {
        self.state.borrow().material.rolling_friction
    }

    pub fn set_rolling_friction(&self, friction: f32) {
        self.state.borrow_mut().material.rolling_friction = friction;
    }

    pub fn spinning_friction(&self) -> f32 {
        self.state.borrow().material.spinning_friction
    }

    pub fn set_spinning_friction(&self, friction: f32) {
        self.state.borrow_mut().material.spinning_friction = friction;
    }

    pub fn anisotropic_friction(&self) -> Vec3 {
        self.state.borrow().material.anisotropic_friction
    }

    pub fn anisotropic_friction_mode(&self) -> AnisotropicFrictionMode {
        self.state.borrow().material.anisotropic_mode
    }

    pub fn set_anisotropic_friction(&self, scale: Vec3, mode: AnisotropicFrictionMode) {
        self.state
            .borrow_mut()
            .material
            .set_anisotropic_friction(scale, mode);
    }

    pub fn contact_stiffness(&self) -> f32 {
        self.state.borrow().material.contact_stiffness
    }

    pub fn contact_damping(&self) -> f32 {
        self.state.borrow().material.contact_damping
    }

    pub fn set_contact_stiffness_and_damping(&self, stiffness: f32, damping: f32) {
        let mut state = self.state.borrow_mut();
        state.material.contact_stiffness = stiffness;
        state.material.contact_damping = damping;
    }

    pub fn mass(&self) -> f32 {
        self.state.borrow().mass
    }

    pub fn local_inertia(&self) -> Vec3 {
        self.state.borrow().local_inertia
    }

    /// Replace mass and diagonal inertia. Mass 0 turns the body static.
    pub fn set_mass_props(&self, mass: f32, inertia: Vec3) {
        let mut state = self.state.borrow_mut();
        state.mass = mass;
        state.local_inertia = inertia;
        state.apply_mass_props();
    }

    pub fn linear_damping(&self) -> f32 {
        self.state.borrow().read(EngineBody::linear_damping)
    }

    pub fn angular_damping(&self) -> f32 {
        self.state.borrow().read(EngineBody::angular_damping)
    }

    /// Set both damping coefficients, each clamped to `[0, 1]`
    pub fn set_damping(&self, linear: f32, angular: f32) {
        let (linear, angular) = (linear.clamp(0.0, 1.0), angular.clamp(0.0, 1.0));
        self.state.borrow_mut().write(|body| {
            body.set_linear_damping(linear);
            body.set_angular_damping(angular);
        });
    }

    pub fn linear_velocity(&self) -> Vec3 {
        self.state.borrow().read(|body| vec_from_engine(body.linvel()))
    }

    pub fn set_linear_velocity(&self, velocity: Vec3) {
        self.state
            .borrow_mut()
            .write(|body| body.set_linvel(vec_to_engine(velocity), false));
    }

    pub fn angular_velocity(&self) -> Vec3 {
        self.state.borrow().read(|body| vec_from_engine(body.angvel()))
    }

    pub fn set_angular_velocity(&self, velocity: Vec3) {
        self.state
            .borrow_mut()
            .write(|body| body.set_angvel(vec_to_engine(velocity), false));
    }

    pub fn linear_factor(&self) -> Vec3 {
        self.state.borrow().linear_factor
    }

    pub fn set_linear_factor(&self, factor: Vec3) {
        let mut state = self.state.borrow_mut();
        state.linear_factor = factor;
        state.apply_locked_axes();
    }

    pub fn angular_factor(&self) -> Vec3 {
        self.state.borrow().angular_factor
    }

    pub fn set_angular_factor(&self, factor: Vec3) {
        let mut state = self.state.borrow_mut();
        state.angular_factor = factor;
        state.apply_locked_axes();
    }

    /// Accumulate a force through the center of mass until forces are cleared
    pub fn apply_central_force(&self, force: Vec3) {
        let mut state = self.state.borrow_mut();
        let force = vec_to_engine(force * state.linear_factor);
        state.write(|body| body.add_force(force, false));
    }

    /// Accumulate a force applied at `rel_pos` from the center of mass
    pub fn apply_force(&self, force: Vec3, rel_pos: Vec3) {
        let linear_factor = self.state.borrow().linear_factor;
        self.apply_central_force(force);
        self.apply_torque(rel_pos.cross(force * linear_factor));
    }

    pub fn apply_torque(&self, torque: Vec3) {
        let mut state = self.state.borrow_mut();
        let torque = vec_to_engine(torque * state.angular_factor);
        state.write(|body| body.add_torque(torque, false));
    }

    /// Change linear velocity by `impulse / mass`
    pub fn apply_central_impulse(&self, impulse: Vec3) {
        let mut state = self.state.borrow_mut();
        if state.mass == 0.0 {
            return;
        }
        let delta = vec_to_engine(impulse * state.linear_factor / state.mass);
        state.write(|body| {
            let velocity = body.linvel() + delta;
            body.set_linvel(velocity, false);
        });
    }

    /// Change angular velocity by the world inverse inertia times `torque`
    pub fn apply_torque_impulse(&self, torque: Vec3) {
        let mut state = self.state.borrow_mut();
        let delta = state.inv_inertia_world() * torque * state.angular_factor;
        let delta: Vector3<f32> = vec_to_engine(delta);
        state.write(|body| {
            let velocity = body.angvel() + delta;
            body.set_angvel(velocity, false);
        });
    }

    /// Apply an impulse at `rel_pos` from the center of mass
    pub fn apply_impulse(&self, impulse: Vec3, rel_pos: Vec3) {
        let (mass, linear_factor) = {
            let state = self.state.borrow();
            (state.mass, state.linear_factor)
        };
        if mass == 0.0 {
            return;
        }
        self.apply_central_impulse(impulse);
        self.apply_torque_impulse(rel_pos.cross(impulse * linear_factor));
    }

    /// Drop accumulated forces and torques
    pub fn clear_forces(&self) {
        self.state.borrow_mut().write(|body| {
            body.reset_forces(false);
            body.reset_torques(false);
        });
    }

    pub fn is_static(&self) -> bool {
        self.state.borrow().is_static()
    }

    pub fn is_kinematic(&self) -> bool {
        self.state.borrow().read(EngineBody::is_kinematic)
    }

    pub fn is_static_or_kinematic(&self) -> bool {
        self.is_static() || self.is_kinematic()
    }

    pub fn is_active(&self) -> bool {
        self.activation_state().is_active()
    }

    pub fn is_in_world(&self) -> bool {
        self.state.borrow().is_in_world()
    }

    /// Current activation state, reflecting sleep decided by the engine
    pub fn activation_state(&self) -> ActivationState {
        let state = self.state.borrow();
        let stored = state.activation;
        if stored.is_pinned() || state.is_static() {
            return stored;
        }

        match (stored, state.read(EngineBody::is_sleeping)) {
            (_, true) => ActivationState::IslandSleeping,
            (ActivationState::IslandSleeping, false) => ActivationState::Active,
            (other, false) => other,
        }
    }

    /// Change the activation state unless deactivation or simulation is disabled
    pub fn set_activation_state(&self, activation: ActivationState) {
        let mut state = self.state.borrow_mut();
        if state.activation.is_pinned() {
            log::trace!("Ignoring activation state {activation:?} on pinned body");
            return;
        }
        state.apply_activation(activation);
    }

    /// Change the activation state unconditionally
    pub fn force_activation_state(&self, activation: ActivationState) {
        self.state.borrow_mut().apply_activation(activation);
    }

    /// Seconds the body has been below its sleep thresholds
    pub fn deactivation_time(&self) -> f32 {
        self.state
            .borrow()
            .read(|body| body.activation().time_since_can_sleep)
    }

    pub fn set_deactivation_time(&self, time: f32) {
        self.state
            .borrow_mut()
            .write(|body| body.activation_mut().time_since_can_sleep = time);
    }

    /// Filter assigned when the body was last added to a world
    pub fn collision_filter(&self) -> Option<CollisionFilter> {
        self.state.borrow().filter
    }

    pub fn user_pointer(&self) -> *mut c_void {
        self.state.borrow().user_pointer
    }

    pub fn set_user_pointer(&self, pointer: *mut c_void) {
        self.state.borrow_mut().user_pointer = pointer;
    }

    /// Read user index `slot` (0, 1 or 2)
    ///
    /// # Panics
    /// Panics if `slot` is out of range.
    pub fn user_index(&self, slot: usize) -> i32 {
        assert!(slot < BODY_USER_INDEX_SLOTS, "body user index slot {slot} out of range");
        self.state.borrow().user_indices[slot]
    }

    /// Write user index `slot` (0, 1 or 2)
    ///
    /// # Panics
    /// Panics if `slot` is out of range.
    pub fn set_user_index(&self, slot: usize, value: i32) {
        assert!(slot < BODY_USER_INDEX_SLOTS, "body user index slot {slot} out of range");
        self.state.borrow_mut().user_indices[slot] = value;
    }

    /// Center-of-mass world transform in exposed layout
    pub fn center_of_mass_transform(&self) -> Transform {
        self.state
            .borrow()
            .read(|body| from_engine_isometry(body.position()))
    }

    /// Teleport the body. Velocities and the motion state are left alone.
    pub fn set_center_of_mass_transform(&self, transform: &Transform) {
        let position = to_engine_isometry(transform);
        self.state
            .borrow_mut()
            .write(|body| body.set_position(position, false));
    }

    pub fn center_of_mass_position(&self) -> Vec3 {
        self.state
            .borrow()
            .read(|body| vec_from_engine(body.translation()))
    }

    /// Inverse of the center-of-mass transform in exposed layout
    pub fn inv_center_of_mass_transform(&self) -> Transform {
        self.state
            .borrow()
            .read(|body| from_engine_isometry(&body.position().inverse()))
    }

    /// Motion-state transform, untransposed, as renderers consume it
    ///
    /// # Panics
    /// Panics on the fixed anchor, which has no motion state.
    pub fn graphics_world_transform(&self) -> Transform {
        let state = self.state.borrow();
        let motion_state = state
            .motion_state
            .as_ref()
            .expect("body has no motion state");
        read_motion_state_transform(motion_state.graphics_world_transform())
    }
}

impl fmt::Debug for RigidBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("RigidBody")
            .field("mass", &state.mass)
            .field("local_inertia", &state.local_inertia)
            .field("activation", &state.activation)
            .field("in_world", &state.is_in_world())
            .finish_non_exhaustive()
    }
}

impl Drop for RigidBody {
    fn drop(&mut self) {
        let state = self.state.get_mut();
        state.motion_state = None;

        if let Residence::InWorld { engine, body, .. } = &state.residence
            && let Some(engine) = engine.upgrade()
        {
            log::warn!("Rigid body dropped while still in a world; removing it");
            match engine.try_borrow_mut() {
                Ok(mut engine) => {
                    engine.remove_body(*body);
                }
                Err(_) => log::error!("World busy while dropping a member body; leaking its engine state"),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::IDENTITY_TRANSFORM;

    const EPS: f32 = 1e-5;

    fn unit_box(mass: f32) -> Rc<RigidBody> {
        RigidBody::new(mass, &IDENTITY_TRANSFORM, Shape::new_box(Vec3::ONE))
    }

    #[test]
    fn test_static_and_dynamic() {
        let ground = unit_box(0.0);
        assert!(ground.is_static());
        assert!(ground.is_static_or_kinematic());
        assert!(!ground.is_kinematic());
        assert_eq!(ground.local_inertia(), Vec3::ZERO);

        let crate_body = RigidBody::new(
            5.0,
            &IDENTITY_TRANSFORM,
            Shape::new_box(Vec3::new(1.0, 2.0, 3.0)),
        );
        assert!(!crate_body.is_static());
        let expected = 5.0 / 12.0 * Vec3::new(52.0, 40.0, 20.0);
        assert!((crate_body.local_inertia() - expected).abs().max_element() < EPS);
    }

    #[test]
    fn test_negative_mass_rejected() {
        let result = RigidBody::try_new(-1.0, &IDENTITY_TRANSFORM, Shape::new_sphere(1.0));
        assert_eq!(result.unwrap_err(), PhysicsError::NegativeMass(-1.0));
    }

    #[test]
    fn test_material_defaults() {
        let body = unit_box(1.0);
        assert_eq!(body.friction(), 0.5);
        assert_eq!(body.restitution(), 0.0);
        assert_eq!(body.rolling_friction(), 0.0);
        assert_eq!(body.spinning_friction(), 0.0);
        assert_eq!(body.contact_stiffness(), 1e18);
        assert_eq!(body.contact_damping(), 0.1);
        assert_eq!(body.anisotropic_friction(), Vec3::ONE);
        assert_eq!(body.anisotropic_friction_mode(), AnisotropicFrictionMode::Disabled);
    }

    #[test]
    fn test_damping_is_clamped() {
        let body = unit_box(1.0);
        body.set_damping(1.5, -0.5);
        assert_eq!(body.linear_damping(), 1.0);
        assert_eq!(body.angular_damping(), 0.0);

        body.set_damping(0.25, 0.75);
        assert_eq!(body.linear_damping(), 0.25);
        assert_eq!(body.angular_damping(), 0.75);
    }

    #[test]
    fn test_center_of_mass_round_trip() {
        let body = unit_box(1.0);
        let t: Transform = [
            [0.0, 0.0, -1.0],
            [0.0, 1.0, 0.0],
            [1.0, 0.0, 0.0],
            [3.0, -2.0, 0.5],
        ];
        body.set_center_of_mass_transform(&t);

        let back = body.center_of_mass_transform();
        for (row, expected) in back.iter().zip(&t) {
            for (a, b) in row.iter().zip(expected) {
                assert!((a - b).abs() < EPS);
            }
        }
        assert_eq!(body.center_of_mass_position(), Vec3::new(3.0, -2.0, 0.5));
    }

    #[test]
    fn test_graphics_transform_is_seeded() {
        let t: Transform = [
            [1.0, 0.0, 0.0],
            [0.0, 1.0, 0.0],
            [0.0, 0.0, 1.0],
            [0.0, 4.0, 0.0],
        ];
        let body = RigidBody::new(1.0, &t, Shape::new_sphere(0.5));
        assert_eq!(body.graphics_world_transform(), t);
    }

    #[test]
    fn test_central_impulse() {
        let body = unit_box(2.0);
        body.apply_central_impulse(Vec3::new(4.0, 0.0, 0.0));
        assert!((body.linear_velocity() - Vec3::new(2.0, 0.0, 0.0)).length() < EPS);

        body.set_linear_factor(Vec3::new(0.0, 1.0, 1.0));
        body.apply_central_impulse(Vec3::new(4.0, 2.0, 0.0));
        assert!((body.linear_velocity() - Vec3::new(2.0, 1.0, 0.0)).length() < EPS);
    }

    #[test]
    fn test_impulse_on_static_body_is_ignored() {
        let body = unit_box(0.0);
        body.apply_impulse(Vec3::X, Vec3::Y);
        assert_eq!(body.linear_velocity(), Vec3::ZERO);
        assert_eq!(body.angular_velocity(), Vec3::ZERO);
    }

    #[test]
    fn test_activation_pinning() {
        let body = unit_box(1.0);
        assert_eq!(body.activation_state(), ActivationState::Active);

        body.force_activation_state(ActivationState::DisableDeactivation);
        body.set_activation_state(ActivationState::IslandSleeping);
        assert_eq!(body.activation_state(), ActivationState::DisableDeactivation);

        body.force_activation_state(ActivationState::WantsDeactivation);
        assert_eq!(body.activation_state(), ActivationState::WantsDeactivation);
        assert!(body.is_active());

        body.set_activation_state(ActivationState::DisableSimulation);
        assert!(!body.is_active());
        body.set_activation_state(ActivationState::Active);
        assert_eq!(body.activation_state(), ActivationState::DisableSimulation);
    }

    #[test]
    fn test_deactivation_time() {
        let body = unit_box(1.0);
        body.set_deactivation_time(1.25);
        assert_eq!(body.deactivation_time(), 1.25);
    }

    #[test]
    fn test_user_slots() {
        let body = unit_box(1.0);
        assert_eq!(body.user_index(2), -1);
        body.set_user_index(2, 42);
        assert_eq!(body.user_index(2), 42);
        assert!(body.user_pointer().is_null());
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn test_user_index_slot_out_of_range() {
        unit_box(1.0).set_user_index(3, 0);
    }

    #[test]
    fn test_set_mass_props_switches_type() {
        let body = unit_box(0.0);
        body.set_mass_props(3.0, Vec3::splat(2.0));
        assert!(!body.is_static());
        assert_eq!(body.mass(), 3.0);
        assert_eq!(body.local_inertia(), Vec3::splat(2.0));

        body.set_mass_props(0.0, Vec3::ZERO);
        assert!(body.is_static());
    }

    #[test]
    fn test_default_filters() {
        assert_eq!(
            CollisionFilter::default_for(true),
            CollisionFilter { group: 1, mask: -1 }
        );
        assert_eq!(
            CollisionFilter::default_for(false),
            CollisionFilter { group: 2, mask: -3 }
        );
    }

    #[test]
    fn test_locked_axes_from_factors() {
        let axes = locked_axes(Vec3::new(1.0, 0.0, 1.0), Vec3::new(0.0, 0.0, 0.5));
        assert_eq!(
            axes,
            LockedAxes::TRANSLATION_LOCKED_Y
                | LockedAxes::ROTATION_LOCKED_X
                | LockedAxes::ROTATION_LOCKED_Y
        );
    }
}
