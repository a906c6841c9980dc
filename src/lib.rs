//! A C-callable rigid-body physics layer built on rapier3d
//!
//! This crate provides:
//! - Collision shapes with Bullet-compatible inertia and type codes
//! - Rigid bodies with motion states, materials and activation states
//! - A stepped dynamics world with closest-hit ray tests
//! - Point-to-point constraints
//! - Debug drawing through a caller-supplied sink
//! - A flat `cph_*` C ABI over opaque handles

pub mod body;
pub mod config;
pub mod constraint;
pub mod error;
pub mod ffi;
pub mod math;
pub mod shape;
pub mod world;

// Re-exports for convenience
pub use glam;
pub use rapier3d;

/// Prelude module for common imports
pub mod prelude {
    pub use crate::body::{ActivationState, AnisotropicFrictionMode, CollisionFilter, RigidBody};
    pub use crate::config::{ConfigError, WorldConfig};
    pub use crate::constraint::{Constraint, ConstraintType, Point2PointParams, fixed_body};
    pub use crate::error::PhysicsError;
    pub use crate::math::{IDENTITY_TRANSFORM, Transform};
    pub use crate::shape::{Axis, Shape, ShapeType};
    pub use crate::world::{DebugDraw, DebugMode, RayHit, World};
    pub use glam::{Quat, Vec3};
}
