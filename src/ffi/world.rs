//! World lifecycle, membership, stepping, ray tests and debug draw

use std::ffi::{CStr, c_char};

use super::{
    CallbackSink, CphBool, CphDebugDrawCallbacks, CphRayCastResult, contract_violation, handle,
    read_vec3, shared, to_bool, write_vec3,
};
use crate::body::RigidBody;
use crate::config::WorldConfig;
use crate::constraint::Constraint;
use crate::math::Vector3;
use crate::world::{DebugMode, World};

// ============================================================================
// World lifecycle
// ============================================================================

/// Create a world with default settings and zero gravity.
/// Must be freed with `cph_world_destroy`.
#[unsafe(no_mangle)]
pub extern "C" fn cph_world_create() -> *mut World {
    Box::into_raw(Box::new(World::new()))
}

/// Create a world from a RON or JSON configuration file.
///
/// Returns null if the file cannot be loaded; the reason is logged.
///
/// # Safety
/// `path` must be a valid NUL-terminated string.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn cph_world_create_from_file(path: *const c_char) -> *mut World {
    if path.is_null() {
        contract_violation("null configuration path");
    }
    let path = unsafe { CStr::from_ptr(path) }.to_string_lossy();

    match WorldConfig::load(&*path) {
        Ok(config) => Box::into_raw(Box::new(World::with_config(config))),
        Err(e) => {
            log::error!("Failed to load world config {path}: {e}");
            std::ptr::null_mut()
        }
    }
}

/// Destroy a world. Bodies and constraints still in it are detached, not
/// destroyed.
///
/// # Safety
/// `world` must come from `cph_world_create*` and not be used afterwards.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn cph_world_destroy(world: *mut World) {
    if world.is_null() {
        contract_violation("null world handle");
    }
    drop(unsafe { Box::from_raw(world) });
}

/// # Safety
/// `world` must be a live world handle and `gravity` must point to three floats.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn cph_world_set_gravity(world: *const World, gravity: *const Vector3) {
    let world = unsafe { handle(world, "world") };
    world.set_gravity(unsafe { read_vec3(gravity, "gravity") });
}

/// # Safety
/// `world` must be a live world handle and `gravity` must point to three floats.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn cph_world_get_gravity(world: *const World, gravity: *mut Vector3) {
    let world = unsafe { handle(world, "world") };
    unsafe { write_vec3(gravity, "gravity", world.gravity()) };
}

/// Advance the simulation; returns the number of substeps run.
///
/// # Safety
/// `world` must be a live world handle.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn cph_world_step_simulation(
    world: *const World,
    time_step: f32,
    max_sub_steps: i32,
    fixed_time_step: f32,
) -> i32 {
    let world = unsafe { handle(world, "world") };
    if max_sub_steps > 0 && !(fixed_time_step > 0.0) {
        contract_violation(&format!("fixed time step must be positive, got {fixed_time_step}"));
    }
    world.step_simulation(time_step, max_sub_steps, fixed_time_step)
}

// ============================================================================
// Membership
// ============================================================================

/// # Safety
/// `world` and `body` must be live handles.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn cph_world_add_body(world: *const World, body: *const RigidBody) {
    let world = unsafe { handle(world, "world") };
    world.add_body(&*unsafe { shared(body, "body") });
}

/// Add a body with an explicit collision group and mask.
///
/// # Safety
/// `world` and `body` must be live handles.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn cph_world_add_body_with_filter(
    world: *const World,
    body: *const RigidBody,
    group: i32,
    mask: i32,
) {
    let world = unsafe { handle(world, "world") };
    world.add_body_with_filter(&*unsafe { shared(body, "body") }, group, mask);
}

/// Remove a body. The body stays valid.
///
/// # Safety
/// `world` and `body` must be live handles.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn cph_world_remove_body(world: *const World, body: *const RigidBody) {
    let world = unsafe { handle(world, "world") };
    world.remove_body(unsafe { handle(body, "body") });
}

/// # Safety
/// `world` and `constraint` must be live handles.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn cph_world_add_constraint(
    world: *const World,
    constraint: *const Constraint,
    disable_collision_between_linked_bodies: CphBool,
) {
    let world = unsafe { handle(world, "world") };
    world.add_constraint(
        &*unsafe { shared(constraint, "constraint") },
        disable_collision_between_linked_bodies != 0,
    );
}

/// Remove a constraint. The constraint stays valid.
///
/// # Safety
/// `world` and `constraint` must be live handles.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn cph_world_remove_constraint(world: *const World, constraint: *const Constraint) {
    let world = unsafe { handle(world, "world") };
    world.remove_constraint(unsafe { handle(constraint, "constraint") });
}

// ============================================================================
// Queries
// ============================================================================

/// Closest body hit by the segment `ray_from_world -> ray_to_world`.
///
/// Returns `CPH_TRUE` on a hit. When `result` is non-null it receives the
/// hit, or fraction 1 and a null body on a miss.
///
/// # Safety
/// `world` must be a live world handle, the ray ends must point to three
/// floats each and `result` must be null or writable.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn cph_world_ray_test_closest(
    world: *const World,
    ray_from_world: *const Vector3,
    ray_to_world: *const Vector3,
    collision_filter_group: i32,
    collision_filter_mask: i32,
    flags: u32,
    result: *mut CphRayCastResult,
) -> CphBool {
    let world = unsafe { handle(world, "world") };
    let from = unsafe { read_vec3(ray_from_world, "ray start") };
    let to = unsafe { read_vec3(ray_to_world, "ray end") };

    let hit = world.ray_test_closest(from, to, collision_filter_group, collision_filter_mask, flags);

    if let Some(result) = unsafe { result.as_mut() } {
        *result = match &hit {
            Some(hit) => CphRayCastResult {
                hit_normal_world: hit.normal.to_array(),
                hit_point_world: hit.point.to_array(),
                hit_fraction: hit.fraction,
                body: std::rc::Rc::as_ptr(&hit.body),
            },
            None => CphRayCastResult::MISS,
        };
    }
    to_bool(hit.is_some())
}

// ============================================================================
// Debug draw
// ============================================================================

/// Register debug-draw hooks. The first call creates the world's drawer;
/// later calls only replace the hooks.
///
/// # Safety
/// `world` must be a live world handle and `callbacks` must point to a valid
/// callback set whose hooks stay callable while registered.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn cph_world_debug_set_callbacks(
    world: *const World,
    callbacks: *const CphDebugDrawCallbacks,
) {
    let world = unsafe { handle(world, "world") };
    let callbacks = *unsafe { handle(callbacks, "debug callbacks") };
    world.set_debug_draw(Box::new(CallbackSink(callbacks)));
}

/// # Safety
/// `world` must be a live world handle with registered debug callbacks.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn cph_world_debug_set_mode(world: *const World, mode: i32) {
    let world = unsafe { handle(world, "world") };
    require_drawer(world);
    world.set_debug_mode(DebugMode(mode));
}

/// Current debug mode, or 0 if no callbacks were registered.
///
/// # Safety
/// `world` must be a live world handle.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn cph_world_debug_get_mode(world: *const World) -> i32 {
    let world = unsafe { handle(world, "world") };
    world.debug_mode().unwrap_or(DebugMode::NONE).0
}

/// Emit one debug-draw pass for the current state.
///
/// # Safety
/// `world` must be a live world handle. Hooks must not draw into the same
/// world while the pass runs.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn cph_world_debug_draw(world: *const World) {
    unsafe { handle(world, "world") }.debug_draw_world();
}

/// # Safety
/// `world` must be a live world handle with registered debug callbacks and
/// each vector must point to three floats.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn cph_world_debug_draw_line(
    world: *const World,
    p0: *const Vector3,
    p1: *const Vector3,
    color: *const Vector3,
) {
    let world = unsafe { handle(world, "world") };
    require_drawer(world);
    world.debug_draw_line(
        unsafe { read_vec3(p0, "line start") },
        unsafe { read_vec3(p1, "line end") },
        unsafe { read_vec3(color, "color") },
    );
}

/// # Safety
/// `world` must be a live world handle with registered debug callbacks and
/// each vector must point to three floats.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn cph_world_debug_draw_sphere(
    world: *const World,
    position: *const Vector3,
    radius: f32,
    color: *const Vector3,
) {
    let world = unsafe { handle(world, "world") };
    require_drawer(world);
    if !(radius > 0.0) {
        contract_violation(&format!("debug sphere radius must be positive, got {radius}"));
    }
    world.debug_draw_sphere(
        unsafe { read_vec3(position, "sphere position") },
        radius,
        unsafe { read_vec3(color, "color") },
    );
}

#[track_caller]
fn require_drawer(world: &World) {
    if !world.has_debug_draw() {
        contract_violation("debug drawing requires registered callbacks");
    }
}
