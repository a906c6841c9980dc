//! Shape factory and queries

use std::ffi::c_void;
use std::rc::Rc;

use super::{CphBool, handle, read_vec3, require, slot_index, to_bool, write_vec3};
use crate::math::Vector3;
use crate::shape::{Axis, SHAPE_USER_INDEX_SLOTS, Shape};

fn into_handle(shape: Rc<Shape>) -> *const Shape {
    Rc::into_raw(shape)
}

#[track_caller]
fn axis(raw: i32) -> Axis {
    require(Axis::try_from(raw))
}

// ============================================================================
// Creation and destruction
// ============================================================================

/// Box with the given half extents. Free with `cph_shape_destroy`.
///
/// # Safety
/// `half_extents` must point to three floats.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn cph_shape_create_box(half_extents: *const Vector3) -> *const Shape {
    let half_extents = unsafe { read_vec3(half_extents, "half extents") };
    into_handle(require(Shape::try_new_box(half_extents)))
}

#[unsafe(no_mangle)]
pub extern "C" fn cph_shape_create_box_2d(x_half_extent: f32, y_half_extent: f32) -> *const Shape {
    into_handle(require(Shape::try_new_box_2d(x_half_extent, y_half_extent)))
}

#[unsafe(no_mangle)]
pub extern "C" fn cph_shape_create_sphere(radius: f32) -> *const Shape {
    into_handle(require(Shape::try_new_sphere(radius)))
}

/// Static plane `normal · p = distance`
///
/// # Safety
/// `normal` must point to three floats.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn cph_shape_create_plane(normal: *const Vector3, distance: f32) -> *const Shape {
    let normal = unsafe { read_vec3(normal, "plane normal") };
    into_handle(require(Shape::try_new_plane(normal, distance)))
}

/// Capsule whose core segment of length `height` runs along `axis`
#[unsafe(no_mangle)]
pub extern "C" fn cph_shape_create_capsule(radius: f32, height: f32, up_axis: i32) -> *const Shape {
    into_handle(require(Shape::try_new_capsule(radius, height, axis(up_axis))))
}

/// # Safety
/// `half_extents` must point to three floats.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn cph_shape_create_cylinder(half_extents: *const Vector3, up_axis: i32) -> *const Shape {
    let half_extents = unsafe { read_vec3(half_extents, "half extents") };
    into_handle(require(Shape::try_new_cylinder(half_extents, axis(up_axis))))
}

#[unsafe(no_mangle)]
pub extern "C" fn cph_shape_create_cone(radius: f32, height: f32, up_axis: i32) -> *const Shape {
    into_handle(require(Shape::try_new_cone(radius, height, axis(up_axis))))
}

/// Release the caller's reference. Bodies still using the shape keep it alive.
///
/// # Safety
/// `shape` must come from a `cph_shape_create_*` function and not be used
/// afterwards.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn cph_shape_destroy(shape: *const Shape) {
    if shape.is_null() {
        super::contract_violation("null shape handle");
    }
    drop(unsafe { Rc::from_raw(shape) });
}

// ============================================================================
// Queries
// ============================================================================

/// Numeric shape type (box 0, sphere 8, capsule 10, cone 11, cylinder 13,
/// box2d 17, plane 28)
///
/// # Safety
/// `shape` must be a live shape handle.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn cph_shape_get_type(shape: *const Shape) -> i32 {
    unsafe { handle(shape, "shape") }.shape_type().raw()
}

/// # Safety
/// `shape` must be a live shape handle.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn cph_shape_is_polyhedral(shape: *const Shape) -> CphBool {
    to_bool(unsafe { handle(shape, "shape") }.is_polyhedral())
}

/// # Safety
/// `shape` must be a live shape handle.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn cph_shape_is_convex_2d(shape: *const Shape) -> CphBool {
    to_bool(unsafe { handle(shape, "shape") }.is_convex_2d())
}

/// # Safety
/// `shape` must be a live shape handle.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn cph_shape_is_convex(shape: *const Shape) -> CphBool {
    to_bool(unsafe { handle(shape, "shape") }.is_convex())
}

/// # Safety
/// `shape` must be a live shape handle.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn cph_shape_is_non_moving(shape: *const Shape) -> CphBool {
    to_bool(unsafe { handle(shape, "shape") }.is_non_moving())
}

/// # Safety
/// `shape` must be a live shape handle.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn cph_shape_is_concave(shape: *const Shape) -> CphBool {
    to_bool(unsafe { handle(shape, "shape") }.is_concave())
}

/// # Safety
/// `shape` must be a live shape handle.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn cph_shape_is_compound(shape: *const Shape) -> CphBool {
    to_bool(unsafe { handle(shape, "shape") }.is_compound())
}

/// Axis-aligned local half extents
///
/// # Safety
/// `shape` must be a live shape handle and `half_extents` must point to
/// three writable floats.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn cph_shape_get_half_extents(shape: *const Shape, half_extents: *mut Vector3) {
    let shape = unsafe { handle(shape, "shape") };
    unsafe { write_vec3(half_extents, "half extents", shape.half_extents()) };
}

/// Diagonal local inertia for `mass`
///
/// # Safety
/// `shape` must be a live shape handle and `inertia` must point to three
/// writable floats.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn cph_shape_calculate_local_inertia(shape: *const Shape, mass: f32, inertia: *mut Vector3) {
    let shape = unsafe { handle(shape, "shape") };
    if !(mass > 0.0) {
        super::contract_violation(&format!("inertia mass must be positive, got {mass}"));
    }
    unsafe { write_vec3(inertia, "inertia", shape.calculate_local_inertia(mass)) };
}

// ============================================================================
// User data
// ============================================================================

/// # Safety
/// `shape` must be a live shape handle.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn cph_shape_set_user_pointer(shape: *const Shape, user_pointer: *mut c_void) {
    unsafe { handle(shape, "shape") }.set_user_pointer(user_pointer);
}

/// # Safety
/// `shape` must be a live shape handle.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn cph_shape_get_user_pointer(shape: *const Shape) -> *mut c_void {
    unsafe { handle(shape, "shape") }.user_pointer()
}

/// # Safety
/// `shape` must be a live shape handle; `slot` must be 0 or 1.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn cph_shape_set_user_index(shape: *const Shape, slot: i32, user_index: i32) {
    let shape = unsafe { handle(shape, "shape") };
    shape.set_user_index(slot_index(slot, SHAPE_USER_INDEX_SLOTS, "shape"), user_index);
}

/// # Safety
/// `shape` must be a live shape handle; `slot` must be 0 or 1.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn cph_shape_get_user_index(shape: *const Shape, slot: i32) -> i32 {
    let shape = unsafe { handle(shape, "shape") };
    shape.user_index(slot_index(slot, SHAPE_USER_INDEX_SLOTS, "shape"))
}
