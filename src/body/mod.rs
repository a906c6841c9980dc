//! Rigid bodies: lifecycle, motion state and per-body accessors

mod activation;
mod material;
mod motion_state;
mod rigid_body;

pub use activation::ActivationState;
pub use material::{AnisotropicFrictionMode, Material};
pub use motion_state::MotionState;
pub use rigid_body::{BODY_USER_INDEX_SLOTS, CollisionFilter, RigidBody};

pub(crate) use rigid_body::Residence;
