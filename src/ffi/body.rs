//! Rigid-body lifecycle and accessors

use std::ffi::c_void;
use std::rc::Rc;

use super::{
    CphBool, contract_violation, handle, read_transform, read_vec3, require, retain, slot_index,
    to_bool, write_transform, write_vec3,
};
use crate::body::{ActivationState, AnisotropicFrictionMode, BODY_USER_INDEX_SLOTS, RigidBody};
use crate::math::{Transform, Vector3};
use crate::shape::Shape;

/// # Safety
/// `ptr` must be null or a live body handle.
#[track_caller]
unsafe fn body<'a>(ptr: *const RigidBody) -> &'a RigidBody {
    unsafe { handle(ptr, "body") }
}

#[track_caller]
fn activation(raw: i32) -> ActivationState {
    require(ActivationState::try_from(raw))
}

// ============================================================================
// Creation, destruction and shape
// ============================================================================

/// Create a body at `transform`. Mass 0 makes it static; a positive mass
/// makes it dynamic with inertia computed from `shape`.
/// Free with `cph_body_destroy`.
///
/// # Safety
/// `transform` must point to twelve floats and `shape` must be a live
/// shape handle.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn cph_body_create(mass: f32, transform: *const Transform, shape: *const Shape) -> *const RigidBody {
    let shape = unsafe { retain(shape, "shape") };
    let transform = unsafe { read_transform(transform) };
    Rc::into_raw(require(RigidBody::try_new(mass, &transform, shape)))
}

/// Release the body and its motion state. A body still in a world is
/// removed from it first.
///
/// # Safety
/// `body` must come from `cph_body_create` and not be used afterwards.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn cph_body_destroy(body: *const RigidBody) {
    if crate::constraint::is_fixed_body(unsafe { self::body(body) }) {
        contract_violation("the fixed body cannot be destroyed");
    }
    drop(unsafe { Rc::from_raw(body) });
}

/// # Safety
/// `body` and `shape` must be live handles.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn cph_body_set_shape(body: *const RigidBody, shape: *const Shape) {
    let body = unsafe { self::body(body) };
    body.set_shape(unsafe { retain(shape, "shape") });
}

/// Borrowed handle of the body's shape, null for the fixed body
///
/// # Safety
/// `body` must be a live body handle.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn cph_body_get_shape(body: *const RigidBody) -> *const Shape {
    unsafe { self::body(body) }
        .shape()
        .map_or(std::ptr::null(), |shape| Rc::as_ptr(&shape))
}

// ============================================================================
// Material
// ============================================================================

/// # Safety
/// `body` must be a live body handle.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn cph_body_set_restitution(body: *const RigidBody, restitution: f32) {
    unsafe { self::body(body) }.set_restitution(restitution);
}

/// # Safety
/// `body` must be a live body handle.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn cph_body_get_restitution(body: *const RigidBody) -> f32 {
    unsafe { self::body(body) }.restitution()
}

/// # Safety
/// `body` must be a live body handle.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn cph_body_set_friction(body: *const RigidBody, friction: f32) {
    unsafe { self::body(body) }.set_friction(friction);
}

/// # Safety
/// `body` must be a live body handle.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn cph_body_get_friction(body: *const RigidBody) -> f32 {
    unsafe { self::body(body) }.friction()
}

/// # Safety
/// `body` must be a live body handle.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn cph_body_set_rolling_friction(body: *const RigidBody, friction: f32) {
    unsafe { self::body(body) }.set_rolling_friction(friction);
}

/// # Safety
/// `body` must be a live body handle.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn cph_body_get_rolling_friction(body: *const RigidBody) -> f32 {
    unsafe { self::body(body) }.rolling_friction()
}

/// # Safety
/// `body` must be a live body handle.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn cph_body_set_spinning_friction(body: *const RigidBody, friction: f32) {
    unsafe { self::body(body) }.set_spinning_friction(friction);
}

/// # Safety
/// `body` must be a live body handle.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn cph_body_get_spinning_friction(body: *const RigidBody) -> f32 {
    unsafe { self::body(body) }.spinning_friction()
}

/// Mode 0 disables the scale, 1 applies it to sliding friction, 2 to rolling friction.
///
/// # Safety
/// `body` must be a live body handle and `friction` must point to three floats.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn cph_body_set_anisotropic_friction(body: *const RigidBody, friction: *const Vector3, mode: i32) {
    let body = unsafe { self::body(body) };
    let friction = unsafe { read_vec3(friction, "anisotropic friction") };
    body.set_anisotropic_friction(friction, AnisotropicFrictionMode::from_raw(mode));
}

/// # Safety
/// `body` must be a live body handle and `friction` must point to three
/// writable floats.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn cph_body_get_anisotropic_friction(body: *const RigidBody, friction: *mut Vector3) {
    let body = unsafe { self::body(body) };
    unsafe { write_vec3(friction, "anisotropic friction", body.anisotropic_friction()) };
}

/// # Safety
/// `body` must be a live body handle.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn cph_body_set_contact_stiffness_and_damping(body: *const RigidBody, stiffness: f32, damping: f32) {
    unsafe { self::body(body) }.set_contact_stiffness_and_damping(stiffness, damping);
}

/// # Safety
/// `body` must be a live body handle.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn cph_body_get_contact_stiffness(body: *const RigidBody) -> f32 {
    unsafe { self::body(body) }.contact_stiffness()
}

/// # Safety
/// `body` must be a live body handle.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn cph_body_get_contact_damping(body: *const RigidBody) -> f32 {
    unsafe { self::body(body) }.contact_damping()
}

// ============================================================================
// Mass and damping
// ============================================================================

/// # Safety
/// `body` must be a live body handle and `inertia` must point to three floats.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn cph_body_set_mass_props(body: *const RigidBody, mass: f32, inertia: *const Vector3) {
    let body = unsafe { self::body(body) };
    let inertia = unsafe { read_vec3(inertia, "inertia") };
    if !(mass >= 0.0) {
        contract_violation(&format!("mass must not be negative, got {mass}"));
    }
    body.set_mass_props(mass, inertia);
}

/// # Safety
/// `body` must be a live body handle.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn cph_body_get_mass(body: *const RigidBody) -> f32 {
    unsafe { self::body(body) }.mass()
}

/// # Safety
/// `body` must be a live body handle and `inertia` must point to three
/// writable floats.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn cph_body_get_local_inertia(body: *const RigidBody, inertia: *mut Vector3) {
    let body = unsafe { self::body(body) };
    unsafe { write_vec3(inertia, "inertia", body.local_inertia()) };
}

/// Both coefficients are clamped to `[0, 1]`.
///
/// # Safety
/// `body` must be a live body handle.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn cph_body_set_damping(body: *const RigidBody, linear: f32, angular: f32) {
    unsafe { self::body(body) }.set_damping(linear, angular);
}

/// # Safety
/// `body` must be a live body handle.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn cph_body_get_linear_damping(body: *const RigidBody) -> f32 {
    unsafe { self::body(body) }.linear_damping()
}

/// # Safety
/// `body` must be a live body handle.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn cph_body_get_angular_damping(body: *const RigidBody) -> f32 {
    unsafe { self::body(body) }.angular_damping()
}

// ============================================================================
// Velocities and factors
// ============================================================================

/// # Safety
/// `body` must be a live body handle and `velocity` must point to three floats.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn cph_body_set_linear_velocity(body: *const RigidBody, velocity: *const Vector3) {
    let body = unsafe { self::body(body) };
    body.set_linear_velocity(unsafe { read_vec3(velocity, "velocity") });
}

/// # Safety
/// `body` must be a live body handle and `velocity` must point to three
/// writable floats.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn cph_body_get_linear_velocity(body: *const RigidBody, velocity: *mut Vector3) {
    let body = unsafe { self::body(body) };
    unsafe { write_vec3(velocity, "velocity", body.linear_velocity()) };
}

/// # Safety
/// `body` must be a live body handle and `velocity` must point to three floats.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn cph_body_set_angular_velocity(body: *const RigidBody, velocity: *const Vector3) {
    let body = unsafe { self::body(body) };
    body.set_angular_velocity(unsafe { read_vec3(velocity, "velocity") });
}

/// # Safety
/// `body` must be a live body handle and `velocity` must point to three
/// writable floats.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn cph_body_get_angular_velocity(body: *const RigidBody, velocity: *mut Vector3) {
    let body = unsafe { self::body(body) };
    unsafe { write_vec3(velocity, "velocity", body.angular_velocity()) };
}

/// A zero component locks translation along that axis.
///
/// # Safety
/// `body` must be a live body handle and `factor` must point to three floats.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn cph_body_set_linear_factor(body: *const RigidBody, factor: *const Vector3) {
    let body = unsafe { self::body(body) };
    body.set_linear_factor(unsafe { read_vec3(factor, "linear factor") });
}

/// # Safety
/// `body` must be a live body handle and `factor` must point to three
/// writable floats.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn cph_body_get_linear_factor(body: *const RigidBody, factor: *mut Vector3) {
    let body = unsafe { self::body(body) };
    unsafe { write_vec3(factor, "linear factor", body.linear_factor()) };
}

/// A zero component locks rotation about that axis.
///
/// # Safety
/// `body` must be a live body handle and `factor` must point to three floats.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn cph_body_set_angular_factor(body: *const RigidBody, factor: *const Vector3) {
    let body = unsafe { self::body(body) };
    body.set_angular_factor(unsafe { read_vec3(factor, "angular factor") });
}

/// # Safety
/// `body` must be a live body handle and `factor` must point to three
/// writable floats.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn cph_body_get_angular_factor(body: *const RigidBody, factor: *mut Vector3) {
    let body = unsafe { self::body(body) };
    unsafe { write_vec3(factor, "angular factor", body.angular_factor()) };
}

// ============================================================================
// Forces and impulses
// ============================================================================

/// # Safety
/// `body` must be a live body handle and `force` must point to three floats.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn cph_body_apply_central_force(body: *const RigidBody, force: *const Vector3) {
    let body = unsafe { self::body(body) };
    body.apply_central_force(unsafe { read_vec3(force, "force") });
}

/// # Safety
/// `body` must be a live body handle and `impulse` must point to three floats.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn cph_body_apply_central_impulse(body: *const RigidBody, impulse: *const Vector3) {
    let body = unsafe { self::body(body) };
    body.apply_central_impulse(unsafe { read_vec3(impulse, "impulse") });
}

/// # Safety
/// `body` must be a live body handle and both vectors must point to three
/// floats.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn cph_body_apply_force(body: *const RigidBody, force: *const Vector3, rel_pos: *const Vector3) {
    let body = unsafe { self::body(body) };
    body.apply_force(
        unsafe { read_vec3(force, "force") },
        unsafe { read_vec3(rel_pos, "relative position") },
    );
}

/// # Safety
/// `body` must be a live body handle.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn cph_body_clear_forces(body: *const RigidBody) {
    unsafe { self::body(body) }.clear_forces();
}

/// # Safety
/// `body` must be a live body handle and both vectors must point to three
/// floats.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn cph_body_apply_impulse(body: *const RigidBody, impulse: *const Vector3, rel_pos: *const Vector3) {
    let body = unsafe { self::body(body) };
    body.apply_impulse(
        unsafe { read_vec3(impulse, "impulse") },
        unsafe { read_vec3(rel_pos, "relative position") },
    );
}

/// # Safety
/// `body` must be a live body handle and `torque` must point to three floats.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn cph_body_apply_torque(body: *const RigidBody, torque: *const Vector3) {
    let body = unsafe { self::body(body) };
    body.apply_torque(unsafe { read_vec3(torque, "torque") });
}

/// # Safety
/// `body` must be a live body handle and `impulse` must point to three floats.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn cph_body_apply_torque_impulse(body: *const RigidBody, impulse: *const Vector3) {
    let body = unsafe { self::body(body) };
    body.apply_torque_impulse(unsafe { read_vec3(impulse, "torque impulse") });
}

// ============================================================================
// Classification and activation
// ============================================================================

/// # Safety
/// `body` must be a live body handle.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn cph_body_is_static(body: *const RigidBody) -> CphBool {
    to_bool(unsafe { self::body(body) }.is_static())
}

/// # Safety
/// `body` must be a live body handle.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn cph_body_is_kinematic(body: *const RigidBody) -> CphBool {
    to_bool(unsafe { self::body(body) }.is_kinematic())
}

/// # Safety
/// `body` must be a live body handle.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn cph_body_is_static_or_kinematic(body: *const RigidBody) -> CphBool {
    to_bool(unsafe { self::body(body) }.is_static_or_kinematic())
}

/// # Safety
/// `body` must be a live body handle.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn cph_body_get_deactivation_time(body: *const RigidBody) -> f32 {
    unsafe { self::body(body) }.deactivation_time()
}

/// # Safety
/// `body` must be a live body handle.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn cph_body_set_deactivation_time(body: *const RigidBody, time: f32) {
    unsafe { self::body(body) }.set_deactivation_time(time);
}

/// Activation state: 1 active, 2 island sleeping, 3 wants deactivation,
/// 4 disable deactivation, 5 disable simulation
///
/// # Safety
/// `body` must be a live body handle.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn cph_body_get_activation_state(body: *const RigidBody) -> i32 {
    unsafe { self::body(body) }.activation_state().raw()
}

/// Ignored while the body is in state 4 or 5.
///
/// # Safety
/// `body` must be a live body handle; `state` must be in 1..=5.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn cph_body_set_activation_state(body: *const RigidBody, state: i32) {
    let body = unsafe { self::body(body) };
    body.set_activation_state(activation(state));
}

/// # Safety
/// `body` must be a live body handle; `state` must be in 1..=5.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn cph_body_force_activation_state(body: *const RigidBody, state: i32) {
    let body = unsafe { self::body(body) };
    body.force_activation_state(activation(state));
}

/// # Safety
/// `body` must be a live body handle.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn cph_body_is_active(body: *const RigidBody) -> CphBool {
    to_bool(unsafe { self::body(body) }.is_active())
}

/// # Safety
/// `body` must be a live body handle.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn cph_body_is_in_world(body: *const RigidBody) -> CphBool {
    to_bool(unsafe { self::body(body) }.is_in_world())
}

// ============================================================================
// User data
// ============================================================================

/// # Safety
/// `body` must be a live body handle.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn cph_body_set_user_pointer(body: *const RigidBody, user_pointer: *mut c_void) {
    unsafe { self::body(body) }.set_user_pointer(user_pointer);
}

/// # Safety
/// `body` must be a live body handle.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn cph_body_get_user_pointer(body: *const RigidBody) -> *mut c_void {
    unsafe { self::body(body) }.user_pointer()
}

/// # Safety
/// `body` must be a live body handle; `slot` must be 0, 1 or 2.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn cph_body_set_user_index(body: *const RigidBody, slot: i32, user_index: i32) {
    let body = unsafe { self::body(body) };
    body.set_user_index(slot_index(slot, BODY_USER_INDEX_SLOTS, "body"), user_index);
}

/// # Safety
/// `body` must be a live body handle; `slot` must be 0, 1 or 2.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn cph_body_get_user_index(body: *const RigidBody, slot: i32) -> i32 {
    let body = unsafe { self::body(body) };
    body.user_index(slot_index(slot, BODY_USER_INDEX_SLOTS, "body"))
}

// ============================================================================
// Transforms
// ============================================================================

/// # Safety
/// `body` must be a live body handle and `transform` must point to twelve
/// floats.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn cph_body_set_center_of_mass_transform(body: *const RigidBody, transform: *const Transform) {
    let body = unsafe { self::body(body) };
    body.set_center_of_mass_transform(&unsafe { read_transform(transform) });
}

/// # Safety
/// `body` must be a live body handle and `transform` must point to twelve
/// writable floats.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn cph_body_get_center_of_mass_transform(body: *const RigidBody, transform: *mut Transform) {
    let body = unsafe { self::body(body) };
    unsafe { write_transform(transform, body.center_of_mass_transform()) };
}

/// # Safety
/// `body` must be a live body handle and `position` must point to three
/// writable floats.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn cph_body_get_center_of_mass_position(body: *const RigidBody, position: *mut Vector3) {
    let body = unsafe { self::body(body) };
    unsafe { write_vec3(position, "position", body.center_of_mass_position()) };
}

/// # Safety
/// `body` must be a live body handle and `transform` must point to twelve
/// writable floats.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn cph_body_get_inv_center_of_mass_transform(body: *const RigidBody, transform: *mut Transform) {
    let body = unsafe { self::body(body) };
    unsafe { write_transform(transform, body.inv_center_of_mass_transform()) };
}

/// Interpolated motion-state transform, in the layout renderers consume.
///
/// # Safety
/// `body` must be a live body handle other than the fixed body and
/// `transform` must point to twelve writable floats.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn cph_body_get_graphics_world_transform(body: *const RigidBody, transform: *mut Transform) {
    let body = unsafe { self::body(body) };
    if crate::constraint::is_fixed_body(body) {
        contract_violation("the fixed body has no motion state");
    }
    unsafe { write_transform(transform, body.graphics_world_transform()) };
}
