//! Math types exchanged with callers and the transform codec

mod transform;

pub use transform::{
    IDENTITY_TRANSFORM, Transform, Vector3, from_engine_isometry, read_motion_state_transform,
    to_engine_isometry,
};
pub(crate) use transform::{quat_from_engine, quat_to_engine, vec_from_engine, vec_to_engine};
