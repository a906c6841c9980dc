//! Constraint factory
//!
//! Constraints reference their two bodies without owning them. Body B may be
//! the shared fixed sentinel from [`fixed_body`], which pins body A to a
//! point in world space.

mod point2point;

use std::cell::{RefCell, RefMut};
use std::fmt;
use std::rc::{Rc, Weak};

use glam::Vec3;
use rapier3d::prelude::ImpulseJointHandle;

use crate::body::RigidBody;
use crate::world::Engine;

pub use point2point::Point2PointParams;

thread_local! {
    static FIXED_BODY: Rc<RigidBody> = RigidBody::fixed_anchor();
}

/// Immovable sentinel usable as either body of a constraint
pub fn fixed_body() -> Rc<RigidBody> {
    FIXED_BODY.with(Rc::clone)
}

/// Whether `body` is the fixed sentinel
pub fn is_fixed_body(body: &RigidBody) -> bool {
    FIXED_BODY.with(|fixed| std::ptr::eq(Rc::as_ptr(fixed), body))
}

/// Numeric constraint discriminant, stable across the C boundary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum ConstraintType {
    Point2Point = 3,
}

/// Per-type parameter block
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ConstraintKind {
    Point2Point(Point2PointParams),
}

/// One side of a constraint
#[derive(Debug, Clone)]
pub(crate) enum Anchor {
    Body(Weak<RigidBody>),
    Fixed,
}

impl Anchor {
    fn new(body: &Rc<RigidBody>) -> Self {
        if is_fixed_body(body) {
            Self::Fixed
        } else {
            Self::Body(Rc::downgrade(body))
        }
    }
}

/// Where a constraint's engine joint lives while it is in a world
pub(crate) struct JointResidence {
    pub engine: Weak<RefCell<Engine>>,
    pub joint: ImpulseJointHandle,
}

pub(crate) struct ConstraintState {
    pub kind: ConstraintKind,
    pub body_a: Anchor,
    pub body_b: Anchor,
    pub contacts_enabled: bool,
    pub residence: Option<JointResidence>,
}

impl ConstraintState {
    fn point2point_mut(&mut self) -> &mut Point2PointParams {
        match &mut self.kind {
            ConstraintKind::Point2Point(params) => params,
        }
    }

    /// Push the current parameters to the engine joint, if any
    fn sync_joint(&self) {
        let Some(residence) = &self.residence else {
            return;
        };
        let Some(engine) = residence.engine.upgrade() else {
            return;
        };
        let mut engine = engine.borrow_mut();
        let dt = engine.configuration.integration.dt;
        let data = self.engine_joint(dt);

        if let Some((_, joint)) = engine
            .dynamics
            .impulse_joints
            .iter_mut()
            .find(|(handle, _)| *handle == residence.joint)
        {
            joint.data = data;
        }
    }

    pub fn engine_joint(&self, dt: f32) -> rapier3d::prelude::GenericJoint {
        match &self.kind {
            ConstraintKind::Point2Point(params) => params.to_engine_joint(dt, self.contacts_enabled),
        }
    }
}

/// A joint between two bodies
pub struct Constraint {
    state: RefCell<ConstraintState>,
}

impl Constraint {
    /// Pin `pivot_a` on body A to `pivot_b` on body B, both in local frames
    pub fn point_to_point(
        body_a: &Rc<RigidBody>,
        body_b: &Rc<RigidBody>,
        pivot_a: Vec3,
        pivot_b: Vec3,
    ) -> Rc<Self> {
        log::trace!("Creating point-to-point constraint");
        Rc::new(Self {
            state: RefCell::new(ConstraintState {
                kind: ConstraintKind::Point2Point(Point2PointParams::new(pivot_a, pivot_b)),
                body_a: Anchor::new(body_a),
                body_b: Anchor::new(body_b),
                contacts_enabled: true,
                residence: None,
            }),
        })
    }

    pub(crate) fn state(&self) -> RefMut<'_, ConstraintState> {
        self.state.borrow_mut()
    }

    pub(crate) fn mark_detached(&self) {
        self.state.borrow_mut().residence = None;
    }

    pub fn constraint_type(&self) -> ConstraintType {
        match self.state.borrow().kind {
            ConstraintKind::Point2Point(_) => ConstraintType::Point2Point,
        }
    }

    pub fn kind(&self) -> ConstraintKind {
        self.state.borrow().kind
    }

    pub fn is_in_world(&self) -> bool {
        self.state.borrow().residence.is_some()
    }

    /// Point-to-point parameters
    pub fn point2point(&self) -> Point2PointParams {
        match self.state.borrow().kind {
            ConstraintKind::Point2Point(params) => params,
        }
    }

    fn update_point2point(&self, f: impl FnOnce(&mut Point2PointParams)) {
        let mut state = self.state.borrow_mut();
        f(state.point2point_mut());
        state.sync_joint();
    }

    pub fn set_pivot_a(&self, pivot: Vec3) {
        self.update_point2point(|params| params.pivot_a = pivot);
    }

    pub fn set_pivot_b(&self, pivot: Vec3) {
        self.update_point2point(|params| params.pivot_b = pivot);
    }

    pub fn set_tau(&self, tau: f32) {
        self.update_point2point(|params| params.tau = tau);
    }

    pub fn set_damping(&self, damping: f32) {
        self.update_point2point(|params| params.damping = damping);
    }

    /// Cap the corrective impulse per step; 0 removes the cap
    pub fn set_impulse_clamp(&self, clamp: f32) {
        self.update_point2point(|params| params.impulse_clamp = clamp);
    }
}

impl fmt::Debug for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("Constraint")
            .field("kind", &state.kind)
            .field("in_world", &state.residence.is_some())
            .finish_non_exhaustive()
    }
}

impl Drop for Constraint {
    fn drop(&mut self) {
        let Some(residence) = self.state.get_mut().residence.take() else {
            return;
        };
        if let Some(engine) = residence.engine.upgrade() {
            log::warn!("Constraint dropped while still in a world; removing it");
            match engine.try_borrow_mut() {
                Ok(mut engine) => engine.remove_joint(residence.joint),
                Err(_) => log::error!("World busy while dropping a member constraint"),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::IDENTITY_TRANSFORM;
    use crate::shape::Shape;

    #[test]
    fn test_fixed_body_is_shared_sentinel() {
        let a = fixed_body();
        let b = fixed_body();
        assert!(Rc::ptr_eq(&a, &b));
        assert!(a.is_static());
        assert!(a.shape().is_none());
        assert!(is_fixed_body(&a));
    }

    #[test]
    fn test_point_to_point_mutators() {
        let body = RigidBody::new(1.0, &IDENTITY_TRANSFORM, Shape::new_sphere(0.5));
        let constraint = Constraint::point_to_point(&body, &fixed_body(), Vec3::ZERO, Vec3::Y);
        assert_eq!(constraint.constraint_type() as i32, 3);
        assert!(!constraint.is_in_world());

        constraint.set_pivot_a(Vec3::X);
        constraint.set_pivot_b(Vec3::Z);
        constraint.set_tau(0.6);
        constraint.set_damping(0.5);
        constraint.set_impulse_clamp(2.0);

        let params = constraint.point2point();
        assert_eq!(params.pivot_a, Vec3::X);
        assert_eq!(params.pivot_b, Vec3::Z);
        assert_eq!(params.tau, 0.6);
        assert_eq!(params.damping, 0.5);
        assert_eq!(params.impulse_clamp, 2.0);
    }
}
