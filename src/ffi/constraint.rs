//! Constraint factory and point-to-point parameters

use std::rc::Rc;

use super::{contract_violation, handle, read_vec3, shared, write_vec3};
use crate::body::RigidBody;
use crate::constraint::{Constraint, ConstraintType, fixed_body};
use crate::math::Vector3;

/// Dereference a constraint handle that must be a point-to-point
///
/// # Safety
/// `ptr` must be null or a live constraint handle.
#[track_caller]
unsafe fn point2point<'a>(ptr: *const Constraint) -> &'a Constraint {
    let constraint = unsafe { handle(ptr, "constraint") };
    if constraint.constraint_type() != ConstraintType::Point2Point {
        contract_violation("constraint is not a point-to-point");
    }
    constraint
}

/// Borrowed handle of the shared immovable body. Never destroy it.
#[unsafe(no_mangle)]
pub extern "C" fn cph_constraint_get_fixed_body() -> *const RigidBody {
    // The thread-local sentinel keeps its own reference for the thread's lifetime.
    Rc::as_ptr(&fixed_body())
}

/// Pin `pivot_a` on body A to `pivot_b` on body B, both in local frames.
/// Free with `cph_constraint_destroy`.
///
/// # Safety
/// Both bodies must be live body handles (body B may be the fixed body) and
/// both pivots must point to three floats.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn cph_constraint_create_point2point(
    body_a: *const RigidBody,
    body_b: *const RigidBody,
    pivot_a: *const Vector3,
    pivot_b: *const Vector3,
) -> *const Constraint {
    let body_a = unsafe { shared(body_a, "body A") };
    let body_b = unsafe { shared(body_b, "body B") };
    let constraint = Constraint::point_to_point(
        &body_a,
        &body_b,
        unsafe { read_vec3(pivot_a, "pivot A") },
        unsafe { read_vec3(pivot_b, "pivot B") },
    );
    Rc::into_raw(constraint)
}

/// Release a constraint. One still in a world is removed from it first.
///
/// # Safety
/// `constraint` must come from a `cph_constraint_create_*` function and not
/// be used afterwards.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn cph_constraint_destroy(constraint: *const Constraint) {
    if constraint.is_null() {
        contract_violation("null constraint handle");
    }
    drop(unsafe { Rc::from_raw(constraint) });
}

/// Numeric constraint type (point-to-point 3)
///
/// # Safety
/// `constraint` must be a live constraint handle.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn cph_constraint_get_type(constraint: *const Constraint) -> i32 {
    unsafe { handle(constraint, "constraint") }.constraint_type() as i32
}

// ============================================================================
// Point-to-point
// ============================================================================

/// # Safety
/// `constraint` must be a live point-to-point handle and `pivot` must point
/// to three floats.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn cph_constraint_point2point_set_pivot_a(constraint: *const Constraint, pivot: *const Vector3) {
    let constraint = unsafe { point2point(constraint) };
    constraint.set_pivot_a(unsafe { read_vec3(pivot, "pivot A") });
}

/// # Safety
/// `constraint` must be a live point-to-point handle and `pivot` must point
/// to three floats.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn cph_constraint_point2point_set_pivot_b(constraint: *const Constraint, pivot: *const Vector3) {
    let constraint = unsafe { point2point(constraint) };
    constraint.set_pivot_b(unsafe { read_vec3(pivot, "pivot B") });
}

/// # Safety
/// `constraint` must be a live point-to-point handle.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn cph_constraint_point2point_set_tau(constraint: *const Constraint, tau: f32) {
    unsafe { point2point(constraint) }.set_tau(tau);
}

/// # Safety
/// `constraint` must be a live point-to-point handle.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn cph_constraint_point2point_set_damping(constraint: *const Constraint, damping: f32) {
    unsafe { point2point(constraint) }.set_damping(damping);
}

/// Largest corrective impulse per step; 0 removes the limit.
///
/// # Safety
/// `constraint` must be a live point-to-point handle.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn cph_constraint_point2point_set_impulse_clamp(constraint: *const Constraint, impulse_clamp: f32) {
    unsafe { point2point(constraint) }.set_impulse_clamp(impulse_clamp);
}

/// # Safety
/// `constraint` must be a live point-to-point handle and `pivot` must point
/// to three writable floats.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn cph_constraint_point2point_get_pivot_a(constraint: *const Constraint, pivot: *mut Vector3) {
    let params = unsafe { point2point(constraint) }.point2point();
    unsafe { write_vec3(pivot, "pivot A", params.pivot_a) };
}

/// # Safety
/// `constraint` must be a live point-to-point handle and `pivot` must point
/// to three writable floats.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn cph_constraint_point2point_get_pivot_b(constraint: *const Constraint, pivot: *mut Vector3) {
    let params = unsafe { point2point(constraint) }.point2point();
    unsafe { write_vec3(pivot, "pivot B", params.pivot_b) };
}

/// # Safety
/// `constraint` must be a live point-to-point handle.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn cph_constraint_point2point_get_tau(constraint: *const Constraint) -> f32 {
    unsafe { point2point(constraint) }.point2point().tau
}

/// # Safety
/// `constraint` must be a live point-to-point handle.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn cph_constraint_point2point_get_damping(constraint: *const Constraint) -> f32 {
    unsafe { point2point(constraint) }.point2point().damping
}

/// # Safety
/// `constraint` must be a live point-to-point handle.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn cph_constraint_point2point_get_impulse_clamp(constraint: *const Constraint) -> f32 {
    unsafe { point2point(constraint) }.point2point().impulse_clamp
}
