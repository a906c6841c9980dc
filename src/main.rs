//! Example simulation demonstrating the physics layer
//!
//! Drops a box onto a ground plane and logs its trajectory. An optional
//! argument names a RON or JSON world configuration file.

use std::rc::Rc;

use cphysics::prelude::*;

/// Logs every line and contact the world reports
struct LogSink;

impl DebugDraw for LogSink {
    fn draw_line(&mut self, from: Vec3, to: Vec3, _color: Vec3) {
        log::trace!("debug line {from} -> {to}");
    }

    fn draw_contact_point(&mut self, point: Vec3, normal: Vec3, distance: f32, _lifetime: i32, _color: Vec3) {
        log::debug!("contact at {point}, normal {normal}, distance {distance:.4}");
    }

    fn report_error_warning(&mut self, message: &str) {
        log::warn!("physics: {message}");
    }
}

fn load_config() -> WorldConfig {
    let default = WorldConfig::default().with_gravity(Vec3::new(0.0, -9.81, 0.0));
    let Some(path) = std::env::args().nth(1) else {
        return default;
    };

    match WorldConfig::load(&path) {
        Ok(config) => {
            log::info!("Using world config from {path}");
            config
        }
        Err(e) => {
            log::error!("Failed to load {path}: {e}; using defaults");
            default
        }
    }
}

fn translated(position: Vec3) -> Transform {
    let mut transform = IDENTITY_TRANSFORM;
    transform[3] = position.to_array();
    transform
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let world = World::with_config(load_config());
    world.set_debug_draw(Box::new(LogSink));
    world.set_debug_mode(DebugMode::CONTACT_POINTS);

    let ground_shape = Shape::new_plane(Vec3::Y, 0.0);
    let ground = RigidBody::new(0.0, &IDENTITY_TRANSFORM, Rc::clone(&ground_shape));
    world.add_body(&ground);

    let box_shape = Shape::new_box(Vec3::splat(0.5));
    let falling = RigidBody::new(1.0, &translated(Vec3::new(0.0, 5.0, 0.0)), box_shape);
    falling.set_restitution(0.3);
    world.add_body(&falling);

    log::info!("Simulating a 1 kg box dropped from 5 m");
    for frame in 0..180 {
        world.step_simulation(1.0 / 60.0, 10, 1.0 / 60.0);

        if frame % 20 == 0 {
            let position = falling.center_of_mass_position();
            let velocity = falling.linear_velocity();
            log::info!(
                "t = {:.2}s  y = {:.3}  vy = {:.3}  {:?}",
                (frame + 1) as f32 / 60.0,
                position.y,
                velocity.y,
                falling.activation_state()
            );
            world.debug_draw_world();
        }
    }

    if let Some(hit) = world.ray_test_closest(Vec3::new(0.0, 10.0, 0.0), Vec3::new(0.0, -1.0, 0.0), -1, -1, 0) {
        log::info!(
            "Ray from above hits {} body at {} (fraction {:.3})",
            if hit.body.is_static() { "static" } else { "dynamic" },
            hit.point,
            hit.fraction
        );
    }

    world.remove_body(&falling);
    world.remove_body(&ground);
    log::info!("Done");
}
