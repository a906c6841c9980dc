//! Dynamics world
//!
//! Owns the engine subsystems and tracks which bodies and constraints are
//! members. Stepping, ray queries and debug drawing all go through [`World`].

mod debug_draw;
mod discrete;
mod engine;
mod raycast;
mod stepping;

pub use debug_draw::{DebugDraw, DebugMode};
pub use discrete::World;
pub(crate) use engine::Engine;
pub use raycast::RayHit;
