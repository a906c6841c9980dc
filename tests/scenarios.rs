//! End-to-end behavior of the Rust API

use std::cell::RefCell;
use std::rc::Rc;

use cphysics::math::to_engine_isometry;
use cphysics::prelude::*;

const EPS: f32 = 1e-4;

fn init() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn translated(position: Vec3) -> Transform {
    let mut transform = IDENTITY_TRANSFORM;
    transform[3] = position.to_array();
    transform
}

/// Quarter turn about +Y in row-vector layout, origin (1, 2, 3)
fn quarter_turn_y() -> Transform {
    [
        [0.0, 0.0, -1.0],
        [0.0, 1.0, 0.0],
        [1.0, 0.0, 0.0],
        [1.0, 2.0, 3.0],
    ]
}

fn assert_transform_eq(a: &Transform, b: &Transform) {
    for (row_a, row_b) in a.iter().zip(b) {
        for (x, y) in row_a.iter().zip(row_b) {
            assert!((x - y).abs() < EPS, "{a:?} != {b:?}");
        }
    }
}

#[test]
fn test_center_of_mass_transform_round_trip() {
    init();
    let body = RigidBody::new(1.0, &IDENTITY_TRANSFORM, Shape::new_box(Vec3::ONE));
    let t = quarter_turn_y();

    body.set_center_of_mass_transform(&t);
    assert_transform_eq(&body.center_of_mass_transform(), &t);
    assert!((body.center_of_mass_position() - Vec3::new(1.0, 2.0, 3.0)).length() < EPS);

    let composed = to_engine_isometry(&body.inv_center_of_mass_transform()) * to_engine_isometry(&t);
    assert!(composed.translation.vector.norm() < EPS);
    assert!(composed.rotation.angle() < EPS);
}

#[test]
fn test_graphics_transform_is_not_transposed() {
    init();
    let t = quarter_turn_y();
    let body = RigidBody::new(1.0, &t, Shape::new_sphere(0.5));

    let graphics = body.graphics_world_transform();
    for i in 0..3 {
        for j in 0..3 {
            assert!((graphics[i][j] - t[j][i]).abs() < EPS);
        }
    }
    assert_eq!(graphics[3], t[3]);
}

#[test]
fn test_mass_selects_static_and_inertia() {
    init();
    let shape = Shape::new_box(Vec3::new(1.0, 2.0, 3.0));

    let ground = RigidBody::new(0.0, &IDENTITY_TRANSFORM, Rc::clone(&shape));
    assert!(ground.is_static());
    assert_eq!(ground.local_inertia(), Vec3::ZERO);

    let crate_body = RigidBody::new(5.0, &IDENTITY_TRANSFORM, shape);
    assert!(!crate_body.is_static());
    let expected = 5.0 / 12.0 * Vec3::new(16.0 + 36.0, 4.0 + 36.0, 4.0 + 16.0);
    assert!((crate_body.local_inertia() - expected).length() < EPS);
}

#[test]
fn test_removed_body_keeps_state_and_stops_moving() {
    init();
    let world = World::with_config(WorldConfig::default().with_gravity(Vec3::new(0.0, -10.0, 0.0)));
    let body = RigidBody::new(1.0, &translated(Vec3::new(0.0, 10.0, 0.0)), Shape::new_sphere(0.5));
    body.set_friction(0.8);

    world.add_body(&body);
    for _ in 0..10 {
        world.step_simulation(1.0 / 60.0, 1, 1.0 / 60.0);
    }
    let fallen = body.center_of_mass_position();
    assert!(fallen.y < 10.0);

    world.remove_body(&body);
    assert!(!body.is_in_world());
    assert_eq!(body.friction(), 0.8);
    for _ in 0..10 {
        world.step_simulation(1.0 / 60.0, 1, 1.0 / 60.0);
    }
    assert_eq!(body.center_of_mass_position(), fallen);

    world.add_body(&body);
    world.step_simulation(1.0 / 60.0, 1, 1.0 / 60.0);
    assert!(body.center_of_mass_position().y < fallen.y);
}

#[test]
fn test_only_zero_factor_components_lock_axes() {
    init();
    let world = World::with_config(WorldConfig::default().with_gravity(Vec3::new(0.0, -10.0, 0.0)));
    let fall_with = |factor: Vec3, x: f32| {
        let body = RigidBody::new(1.0, &translated(Vec3::new(x, 10.0, 0.0)), Shape::new_sphere(0.5));
        body.set_linear_factor(factor);
        world.add_body(&body);
        body
    };
    let locked = fall_with(Vec3::new(1.0, 0.0, 1.0), 0.0);
    let half = fall_with(Vec3::new(1.0, 0.5, 1.0), 5.0);
    let full = fall_with(Vec3::ONE, 10.0);

    for _ in 0..10 {
        world.step_simulation(1.0 / 60.0, 1, 1.0 / 60.0);
    }

    assert!((locked.center_of_mass_position().y - 10.0).abs() < EPS);
    assert!(full.center_of_mass_position().y < 10.0);
    assert!((half.center_of_mass_position().y - full.center_of_mass_position().y).abs() < EPS);
    assert_eq!(half.linear_factor(), Vec3::new(1.0, 0.5, 1.0));
}

#[test]
fn test_ray_against_ground_plane() {
    init();
    let world = World::new();
    let ground = RigidBody::new(0.0, &IDENTITY_TRANSFORM, Shape::new_plane(Vec3::Y, 0.0));
    world.add_body(&ground);

    let hit = world
        .ray_test_closest(Vec3::new(0.0, 10.0, 0.0), Vec3::new(0.0, -10.0, 0.0), -1, -1, 0)
        .expect("ray crosses the plane");
    assert!((hit.fraction - 0.5).abs() < EPS);
    assert!(hit.point.length() < EPS);
    assert!((hit.normal - Vec3::Y).length() < EPS);
    assert!(Rc::ptr_eq(&hit.body, &ground));

    assert!(
        world
            .ray_test_closest(Vec3::new(0.0, 2.0, 0.0), Vec3::new(0.0, 1.0, 0.0), -1, -1, 0)
            .is_none()
    );
}

#[test]
fn test_ray_picks_closest_body() {
    init();
    let world = World::new();
    let near = RigidBody::new(1.0, &translated(Vec3::new(0.0, 0.0, 2.0)), Shape::new_sphere(0.5));
    let far = RigidBody::new(1.0, &translated(Vec3::new(0.0, 0.0, 6.0)), Shape::new_sphere(0.5));
    world.add_body(&far);
    world.add_body(&near);

    let hit = world
        .ray_test_closest(Vec3::ZERO, Vec3::new(0.0, 0.0, 10.0), -1, -1, 0)
        .expect("ray crosses both spheres");
    assert!(Rc::ptr_eq(&hit.body, &near));
    assert!((hit.point - Vec3::new(0.0, 0.0, 1.5)).length() < EPS);
    assert!((hit.fraction - 0.15).abs() < EPS);
}

fn distance_after(steps: usize, configure: impl FnOnce(&Constraint)) -> f32 {
    let world = World::new();
    let body = RigidBody::new(1.0, &IDENTITY_TRANSFORM, Shape::new_sphere(0.25));
    world.add_body(&body);

    let constraint = Constraint::point_to_point(&body, &fixed_body(), Vec3::ZERO, Vec3::new(2.0, 0.0, 0.0));
    configure(&constraint);
    world.add_constraint(&constraint, true);

    for _ in 0..steps {
        world.step_simulation(1.0 / 60.0, 1, 1.0 / 60.0);
    }
    body.center_of_mass_position().x
}

fn pulled_distance(impulse_clamp: f32) -> f32 {
    distance_after(10, |constraint| constraint.set_impulse_clamp(impulse_clamp))
}

#[test]
fn test_clamped_point_to_point_lags_unclamped() {
    init();
    let unclamped = pulled_distance(0.0);
    let clamped = pulled_distance(0.01);

    assert!(unclamped > 0.5, "unclamped joint barely moved: {unclamped}");
    assert!(clamped < 0.1, "clamped joint moved too far: {clamped}");
    assert!(clamped < unclamped);
}

#[test]
fn test_low_tau_converges_slower() {
    init();
    let soft = distance_after(1, |constraint| constraint.set_tau(0.01));
    let stiff = distance_after(1, |constraint| constraint.set_tau(0.9));

    assert!(soft > 0.0);
    assert!(soft < stiff, "tau 0.01 moved {soft}, tau 0.9 moved {stiff}");
    assert!(soft < 1.0);
}

#[test]
fn test_tau_change_applies_to_joint_in_world() {
    init();
    let world = World::new();
    let body = RigidBody::new(1.0, &IDENTITY_TRANSFORM, Shape::new_sphere(0.25));
    world.add_body(&body);
    let constraint = Constraint::point_to_point(&body, &fixed_body(), Vec3::ZERO, Vec3::new(2.0, 0.0, 0.0));
    world.add_constraint(&constraint, true);

    constraint.set_tau(0.01);
    world.step_simulation(1.0 / 60.0, 1, 1.0 / 60.0);

    let untouched = distance_after(1, |_| {});
    assert!(body.center_of_mass_position().x < untouched);
}

#[test]
fn test_axis_selection_is_observable() {
    init();
    let along_x = Shape::new_capsule(0.5, 2.0, Axis::X);
    let along_y = Shape::new_capsule(0.5, 2.0, Axis::Y);
    let along_z = Shape::new_capsule(0.5, 2.0, Axis::Z);
    assert_eq!(along_x.half_extents(), Vec3::new(1.5, 0.5, 0.5));
    assert_eq!(along_y.half_extents(), Vec3::new(0.5, 1.5, 0.5));
    assert_eq!(along_z.half_extents(), Vec3::new(0.5, 0.5, 1.5));
    assert_eq!(along_x.shape_type(), along_z.shape_type());

    let cone_y = Shape::new_cone(0.5, 2.0, Axis::Y);
    let cone_x = Shape::new_cone(0.5, 2.0, Axis::X);
    assert_eq!(cone_y.half_extents(), Vec3::new(0.5, 1.0, 0.5));
    assert_eq!(cone_x.half_extents(), Vec3::new(1.0, 0.5, 0.5));

    let cylinder = Shape::new_cylinder(Vec3::new(1.0, 2.0, 1.0), Axis::Z);
    assert_eq!(cylinder.shape_type(), ShapeType::Cylinder);
    assert!(Axis::try_from(3).is_err());
}

#[test]
fn test_step_counts() {
    init();
    assert_eq!(World::new().step_simulation(1.0 / 60.0, 10, 1.0 / 60.0), 1);
    assert_eq!(World::new().step_simulation(1.0, 2, 0.25), 2);
    assert_eq!(World::new().step_simulation(0.02, 0, 1.0 / 60.0), 1);
    assert_eq!(World::new().step_simulation(0.0, 0, 1.0 / 60.0), 0);
}

#[test]
fn test_activation_state_pinning() {
    init();
    let body = RigidBody::new(1.0, &IDENTITY_TRANSFORM, Shape::new_sphere(1.0));
    body.force_activation_state(ActivationState::DisableDeactivation);
    body.set_activation_state(ActivationState::WantsDeactivation);
    assert_eq!(body.activation_state().raw(), 4);

    body.force_activation_state(ActivationState::Active);
    body.set_activation_state(ActivationState::WantsDeactivation);
    assert_eq!(body.activation_state().raw(), 3);
}

#[derive(Clone, Default)]
struct Tally(Rc<RefCell<(usize, usize, Vec<String>)>>);

impl DebugDraw for Tally {
    fn draw_line(&mut self, _from: Vec3, _to: Vec3, _color: Vec3) {
        self.0.borrow_mut().0 += 1;
    }

    fn draw_contact_point(&mut self, _point: Vec3, _normal: Vec3, _distance: f32, _lifetime: i32, _color: Vec3) {
        self.0.borrow_mut().1 += 1;
    }

    fn report_error_warning(&mut self, message: &str) {
        self.0.borrow_mut().2.push(message.to_string());
    }
}

#[test]
fn test_debug_drawer_mode_survives_reregistration() {
    init();
    let world = World::new();
    world.set_debug_draw(Box::new(Tally::default()));
    assert_eq!(world.debug_mode(), Some(DebugMode(34825)));

    world.set_debug_mode(DebugMode::WIREFRAME);
    world.set_debug_draw(Box::new(Tally::default()));
    assert_eq!(world.debug_mode(), Some(DebugMode::WIREFRAME));
}

#[test]
fn test_contact_points_are_reported() {
    init();
    let world = World::with_config(WorldConfig::default().with_gravity(Vec3::new(0.0, -10.0, 0.0)));
    let tally = Tally::default();
    world.set_debug_draw(Box::new(tally.clone()));
    world.set_debug_mode(DebugMode::CONTACT_POINTS);

    let ground = RigidBody::new(0.0, &IDENTITY_TRANSFORM, Shape::new_plane(Vec3::Y, 0.0));
    let resting = RigidBody::new(1.0, &translated(Vec3::new(0.0, 0.49, 0.0)), Shape::new_box(Vec3::splat(0.5)));
    world.add_body(&ground);
    world.add_body(&resting);

    for _ in 0..5 {
        world.step_simulation(1.0 / 60.0, 1, 1.0 / 60.0);
    }
    world.debug_draw_world();

    let counts = tally.0.borrow();
    assert_eq!(counts.0, 0);
    assert!(counts.1 > 0);
}

#[test]
fn test_sink_receives_layer_warnings() {
    init();
    let world = World::new();
    let tally = Tally::default();
    world.set_debug_draw(Box::new(tally.clone()));

    let body = RigidBody::new(1.0, &IDENTITY_TRANSFORM, Shape::new_sphere(1.0));
    world.remove_body(&body);
    assert_eq!(tally.0.borrow().2.len(), 1);
}

#[test]
fn test_dropping_member_body_removes_it() {
    init();
    let world = World::new();
    let body = RigidBody::new(1.0, &IDENTITY_TRANSFORM, Shape::new_sphere(1.0));
    world.add_body(&body);
    assert_eq!(world.body_count(), 1);

    drop(body);
    assert_eq!(world.body_count(), 0);
    world.step_simulation(1.0 / 60.0, 1, 1.0 / 60.0);
}

#[test]
fn test_config_file_round_trip() {
    init();
    let path = std::env::temp_dir().join(format!("cphysics-config-{}.ron", std::process::id()));
    let config = WorldConfig::default()
        .with_gravity(Vec3::new(0.0, -3.7, 0.0))
        .with_substeps(1.0 / 120.0, 4);
    config.save_ron(&path).unwrap();

    let loaded = WorldConfig::load(&path).unwrap();
    std::fs::remove_file(&path).unwrap();
    assert_eq!(loaded, config);

    let world = World::with_config(loaded);
    assert_eq!(world.gravity(), Vec3::new(0.0, -3.7, 0.0));
    assert_eq!(world.step(1.0 / 60.0), 2);
}
