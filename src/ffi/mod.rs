//! C Foreign Function Interface
//!
//! Flat `cph_*` functions over opaque handles. Shapes, bodies and
//! constraints cross the boundary as `Rc::into_raw` pointers and worlds as
//! `Box::into_raw` pointers; every create has exactly one destroy.
//!
//! # Safety
//!
//! Every handle must come from the matching create function and must not be
//! used after its destroy. A null handle or any other violated precondition
//! is logged and then panics, which aborts the process because a panic
//! cannot unwind out of an `extern "C"` function.

mod body;
mod constraint;
mod shape;
mod world;

use std::ffi::{CString, c_char, c_void};
use std::mem::ManuallyDrop;
use std::rc::Rc;

use glam::Vec3;

use crate::error::PhysicsError;
use crate::math::{Transform, Vector3};
use crate::world::DebugDraw;

pub use body::*;
pub use constraint::*;
pub use shape::*;
pub use world::*;

// ============================================================================
// C-compatible types
// ============================================================================

/// Two-valued integer boolean
pub type CphBool = i32;

pub const CPH_TRUE: CphBool = 1;
pub const CPH_FALSE: CphBool = 0;

/// Closest hit reported by `cph_world_ray_test_closest`
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct CphRayCastResult {
    /// World-space surface normal at the hit
    pub hit_normal_world: Vector3,
    /// World-space hit point
    pub hit_point_world: Vector3,
    /// Position of the hit along the ray, 1 when nothing was hit
    pub hit_fraction: f32,
    /// Borrowed handle of the hit body, null when nothing was hit
    pub body: *const crate::body::RigidBody,
}

impl CphRayCastResult {
    /// Result reported when the ray hits nothing
    pub const MISS: Self = Self {
        hit_normal_world: [0.0; 3],
        hit_point_world: [0.0; 3],
        hit_fraction: 1.0,
        body: std::ptr::null(),
    };
}

pub type CphDrawLineFn =
    unsafe extern "C" fn(from: *const Vector3, to: *const Vector3, color: *const Vector3, user_data: *mut c_void);

pub type CphDrawContactPointFn = unsafe extern "C" fn(
    point: *const Vector3,
    normal: *const Vector3,
    distance: f32,
    lifetime: i32,
    color: *const Vector3,
    user_data: *mut c_void,
);

pub type CphReportErrorWarningFn = unsafe extern "C" fn(message: *const c_char, user_data: *mut c_void);

/// Debug-draw hooks; any of them may be null
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct CphDebugDrawCallbacks {
    pub draw_line: Option<CphDrawLineFn>,
    pub draw_contact_point: Option<CphDrawContactPointFn>,
    pub report_error_warning: Option<CphReportErrorWarningFn>,
    /// Passed back unchanged to every hook
    pub user_data: *mut c_void,
}

/// Forwards debug events to C function pointers
struct CallbackSink(CphDebugDrawCallbacks);

impl DebugDraw for CallbackSink {
    fn draw_line(&mut self, from: Vec3, to: Vec3, color: Vec3) {
        if let Some(draw_line) = self.0.draw_line {
            let (from, to, color) = (from.to_array(), to.to_array(), color.to_array());
            // SAFETY: the caller registered this hook for exactly this signature.
            unsafe { draw_line(&from, &to, &color, self.0.user_data) };
        }
    }

    fn draw_contact_point(&mut self, point: Vec3, normal: Vec3, distance: f32, lifetime: i32, color: Vec3) {
        if let Some(draw_contact_point) = self.0.draw_contact_point {
            let (point, normal, color) = (point.to_array(), normal.to_array(), color.to_array());
            // SAFETY: the caller registered this hook for exactly this signature.
            unsafe { draw_contact_point(&point, &normal, distance, lifetime, &color, self.0.user_data) };
        }
    }

    fn report_error_warning(&mut self, message: &str) {
        if let Some(report) = self.0.report_error_warning {
            let message = CString::new(message).unwrap_or_default();
            // SAFETY: the string outlives the call.
            unsafe { report(message.as_ptr(), self.0.user_data) };
        }
    }
}

// ============================================================================
// Helpers
// ============================================================================

/// Log and panic; aborts when reached from an `extern "C"` function
#[track_caller]
pub(crate) fn contract_violation(message: &str) -> ! {
    log::error!("Contract violation: {message}");
    panic!("contract violation: {message}");
}

/// Unwrap a constructor result or treat the error as a contract violation
#[track_caller]
fn require<T>(result: Result<T, PhysicsError>) -> T {
    result.unwrap_or_else(|e| contract_violation(&e.to_string()))
}

fn to_bool(value: bool) -> CphBool {
    if value { CPH_TRUE } else { CPH_FALSE }
}

/// Dereference a handle, rejecting null
///
/// # Safety
/// `ptr` must be null or point to a live `T`.
#[track_caller]
unsafe fn handle<'a, T>(ptr: *const T, what: &str) -> &'a T {
    match unsafe { ptr.as_ref() } {
        Some(value) => value,
        None => contract_violation(&format!("null {what} handle")),
    }
}

/// View a handle made by `Rc::into_raw` as an `Rc` without taking ownership
///
/// # Safety
/// `ptr` must be null or come from `Rc::into_raw` (or `Rc::as_ptr` on a
/// live `Rc`) and still be alive.
#[track_caller]
unsafe fn shared<T>(ptr: *const T, what: &str) -> ManuallyDrop<Rc<T>> {
    if ptr.is_null() {
        contract_violation(&format!("null {what} handle"));
    }
    ManuallyDrop::new(unsafe { Rc::from_raw(ptr) })
}

/// Take a new strong reference from a handle
///
/// # Safety
/// Same as [`shared`].
#[track_caller]
unsafe fn retain<T>(ptr: *const T, what: &str) -> Rc<T> {
    Rc::clone(&*unsafe { shared(ptr, what) })
}

/// # Safety
/// `ptr` must be null or point to three readable floats.
#[track_caller]
unsafe fn read_vec3(ptr: *const Vector3, what: &str) -> Vec3 {
    Vec3::from_array(*unsafe { handle(ptr, what) })
}

/// # Safety
/// `ptr` must be null or point to three writable floats.
#[track_caller]
unsafe fn write_vec3(ptr: *mut Vector3, what: &str, value: Vec3) {
    if ptr.is_null() {
        contract_violation(&format!("null {what} output"));
    }
    unsafe { ptr.write(value.to_array()) };
}

/// # Safety
/// `ptr` must be null or point to twelve readable floats.
#[track_caller]
unsafe fn read_transform(ptr: *const Transform) -> Transform {
    *unsafe { handle(ptr, "transform") }
}

/// # Safety
/// `ptr` must be null or point to twelve writable floats.
#[track_caller]
unsafe fn write_transform(ptr: *mut Transform, value: Transform) {
    if ptr.is_null() {
        contract_violation("null transform output");
    }
    unsafe { ptr.write(value) };
}

/// Convert a C slot index, rejecting negatives and values past `slots`
#[track_caller]
fn slot_index(slot: i32, slots: usize, what: &str) -> usize {
    match usize::try_from(slot) {
        Ok(slot) if slot < slots => slot,
        _ => contract_violation(&format!("{what} user index slot {slot} out of range")),
    }
}
