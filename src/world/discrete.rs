//! The discrete dynamics world: membership, stepping, queries and debug draw

use std::cell::RefCell;
use std::mem;
use std::rc::{Rc, Weak};

use glam::Vec3;
use rapier3d::prelude::RigidBodyHandle;

use super::debug_draw::{DebugDraw, DebugDrawer, DebugMode, DrawCommand, collect_world, sphere_lines};
use super::engine::Engine;
use super::raycast::RayHit;
use crate::body::{ActivationState, CollisionFilter, Residence, RigidBody};
use crate::config::WorldConfig;
use crate::constraint::{Anchor, Constraint, JointResidence};
use crate::math::{vec_from_engine, vec_to_engine};

/// A simulated world.
///
/// The world references the bodies and constraints added to it without
/// owning them. Removing an object never destroys it, and dropping the world
/// detaches whatever is still a member.
pub struct World {
    // Dropped before the engine.
    debug_drawer: RefCell<Option<DebugDrawer>>,
    engine: Rc<RefCell<Engine>>,
    config: WorldConfig,
}

impl World {
    /// Create a world with default settings and zero gravity
    pub fn new() -> Self {
        Self::with_config(WorldConfig::default())
    }

    /// Create a world from a configuration
    pub fn with_config(config: WorldConfig) -> Self {
        log::debug!("Creating world: gravity {}", config.gravity);
        Self {
            debug_drawer: RefCell::new(None),
            engine: Rc::new(RefCell::new(Engine::new(&config))),
            config,
        }
    }

    pub fn config(&self) -> &WorldConfig {
        &self.config
    }

    pub fn gravity(&self) -> Vec3 {
        vec_from_engine(&self.engine.borrow().dynamics.gravity)
    }

    pub fn set_gravity(&self, gravity: Vec3) {
        self.engine.borrow_mut().dynamics.gravity = vec_to_engine(gravity);
    }

    /// Advance by `dt` seconds in at most `max_substeps` increments of
    /// `fixed_substep`, or one variable step when `max_substeps` is 0.
    ///
    /// Returns the number of substeps actually run.
    ///
    /// # Panics
    /// Panics if `max_substeps > 0` and `fixed_substep` is not positive.
    pub fn step_simulation(&self, dt: f32, max_substeps: i32, fixed_substep: f32) -> i32 {
        self.engine
            .borrow_mut()
            .step_simulation(dt, max_substeps, fixed_substep)
    }

    /// Advance by `dt` using the configured substep settings
    pub fn step(&self, dt: f32) -> i32 {
        self.step_simulation(dt, self.config.max_substeps, self.config.fixed_substep)
    }

    fn is_this_world(&self, engine: &Weak<RefCell<Engine>>) -> bool {
        std::ptr::eq(engine.as_ptr(), Rc::as_ptr(&self.engine))
    }

    /// Add a body with the default filter for its type
    pub fn add_body(&self, body: &Rc<RigidBody>) {
        self.insert_body(body, None);
    }

    /// Add a body with an explicit collision group and mask
    pub fn add_body_with_filter(&self, body: &Rc<RigidBody>, group: i32, mask: i32) {
        self.insert_body(body, Some(CollisionFilter { group, mask }));
    }

    fn insert_body(&self, body: &Rc<RigidBody>, filter: Option<CollisionFilter>) {
        let mut state = body.state();
        if state.is_in_world() {
            drop(state);
            self.warn("Body is already in a world; ignoring add");
            return;
        }
        let Residence::Detached(engine_body) = mem::replace(&mut state.residence, Residence::Vacant)
        else {
            unreachable!("a body outside any world is always detached");
        };

        let is_static = state.is_static();
        state.filter = Some(filter.unwrap_or_else(|| CollisionFilter::default_for(!is_static)));
        let collider = state.build_collider();

        let mut engine = self.engine.borrow_mut();
        let dynamics = &mut engine.dynamics;
        let handle = dynamics.bodies.insert(*engine_body);
        let collider = collider.map(|collider| {
            dynamics
                .colliders
                .insert_with_parent(collider, handle, &mut dynamics.bodies)
        });
        dynamics.members.insert(handle, Rc::downgrade(body));
        drop(engine);

        state.residence = Residence::InWorld {
            engine: Rc::downgrade(&self.engine),
            body: handle,
            collider,
        };
        if is_static && !state.activation.is_pinned() {
            state.apply_activation(ActivationState::IslandSleeping);
        }

        log::debug!(
            "Added {} body to world (group {}, mask {})",
            if is_static { "static" } else { "dynamic" },
            state.filter.map_or(0, |f| f.group),
            state.filter.map_or(0, |f| f.mask),
        );
    }

    /// Remove a body. The body stays valid and keeps its state.
    pub fn remove_body(&self, body: &RigidBody) {
        let mut state = body.state();
        let handle = match &state.residence {
            Residence::InWorld { engine, body, .. } if self.is_this_world(engine) => *body,
            _ => {
                drop(state);
                self.warn("Body is not in this world; ignoring remove");
                return;
            }
        };

        let removed = self
            .engine
            .borrow_mut()
            .remove_body(handle)
            .expect("member body missing from its world");
        state.residence = Residence::Detached(Box::new(removed));
        log::debug!("Removed body from world");
    }

    /// Number of member bodies
    pub fn body_count(&self) -> usize {
        self.engine.borrow().dynamics.members.len()
    }

    /// Number of member constraints
    pub fn constraint_count(&self) -> usize {
        self.engine.borrow().dynamics.joints.len()
    }

    fn resolve_anchor(&self, engine: &mut Engine, anchor: &Anchor) -> Option<RigidBodyHandle> {
        match anchor {
            Anchor::Fixed => Some(engine.anchor()),
            Anchor::Body(body) => {
                let body = body.upgrade()?;
                let state = body.state();
                match &state.residence {
                    Residence::InWorld { engine, body, .. } if self.is_this_world(engine) => Some(*body),
                    _ => None,
                }
            }
        }
    }

    /// Add a constraint between two member bodies
    pub fn add_constraint(&self, constraint: &Rc<Constraint>, disable_collision_between_linked_bodies: bool) {
        let mut state = constraint.state();
        if state.residence.is_some() {
            drop(state);
            self.warn("Constraint is already in a world; ignoring add");
            return;
        }

        let mut engine = self.engine.borrow_mut();
        let body_a = self.resolve_anchor(&mut engine, &state.body_a);
        let body_b = self.resolve_anchor(&mut engine, &state.body_b);
        let (Some(body_a), Some(body_b)) = (body_a, body_b) else {
            drop(engine);
            drop(state);
            self.warn("Constraint bodies must be added to the world before the constraint");
            return;
        };

        state.contacts_enabled = !disable_collision_between_linked_bodies;
        let joint = state.engine_joint(engine.configuration.integration.dt);
        let handle = engine
            .dynamics
            .impulse_joints
            .insert(body_a, body_b, joint, true);
        engine
            .dynamics
            .joints
            .insert(handle, Rc::downgrade(constraint));

        state.residence = Some(JointResidence {
            engine: Rc::downgrade(&self.engine),
            joint: handle,
        });
        log::debug!("Added constraint to world");
    }

    /// Remove a constraint. The constraint stays valid.
    pub fn remove_constraint(&self, constraint: &Constraint) {
        let mut state = constraint.state();
        let handle = match &state.residence {
            Some(residence) if self.is_this_world(&residence.engine) => residence.joint,
            _ => {
                drop(state);
                self.warn("Constraint is not in this world; ignoring remove");
                return;
            }
        };

        self.engine.borrow_mut().remove_joint(handle);
        state.residence = None;
        log::debug!("Removed constraint from world");
    }

    /// Closest body hit by the segment `from -> to`.
    ///
    /// `flags` only affect triangle-mesh shapes and are accepted for
    /// compatibility.
    pub fn ray_test_closest(&self, from: Vec3, to: Vec3, group: i32, mask: i32, flags: u32) -> Option<RayHit> {
        if flags != 0 {
            log::trace!("Ray test flags {flags:#x} have no effect on the available shapes");
        }
        self.engine.borrow().ray_test_closest(from, to, group, mask)
    }

    /// Register a debug sink. The drawer is created on first registration;
    /// later calls replace only the sink and keep the mode.
    pub fn set_debug_draw(&self, sink: Box<dyn DebugDraw>) {
        let mut drawer = self.debug_drawer.borrow_mut();
        match drawer.as_mut() {
            Some(drawer) => drawer.set_sink(sink),
            None => {
                log::debug!("Creating debug drawer");
                *drawer = Some(DebugDrawer::new(sink));
            }
        }
    }

    pub fn has_debug_draw(&self) -> bool {
        self.debug_drawer.borrow().is_some()
    }

    /// Current debug mode, if a drawer exists
    pub fn debug_mode(&self) -> Option<DebugMode> {
        self.debug_drawer.borrow().as_ref().map(|drawer| drawer.mode)
    }

    /// # Panics
    /// Panics if no debug drawer has been registered.
    pub fn set_debug_mode(&self, mode: DebugMode) {
        self.with_drawer(|drawer| drawer.mode = mode);
    }

    fn with_drawer(&self, f: impl FnOnce(&mut DebugDrawer)) {
        let mut drawer = self.debug_drawer.borrow_mut();
        f(drawer
            .as_mut()
            .expect("debug drawing requires a registered debug drawer"));
    }

    /// Emit one full pass of debug primitives for the current state.
    ///
    /// Does nothing without a drawer. Primitives are gathered first and sent
    /// after the engine is released, so sinks may query bodies.
    pub fn debug_draw_world(&self) {
        let mut drawer = self.debug_drawer.borrow_mut();
        let Some(drawer) = drawer.as_mut() else {
            return;
        };
        let commands = collect_world(&self.engine.borrow(), drawer.mode);
        drawer.emit(commands);
    }

    /// # Panics
    /// Panics if no debug drawer has been registered.
    pub fn debug_draw_line(&self, from: Vec3, to: Vec3, color: Vec3) {
        self.with_drawer(|drawer| drawer.emit([DrawCommand::Line { from, to, color }]));
    }

    /// # Panics
    /// Panics if no debug drawer has been registered or `radius` is not positive.
    pub fn debug_draw_sphere(&self, position: Vec3, radius: f32, color: Vec3) {
        assert!(radius > 0.0, "debug sphere radius must be positive, got {radius}");
        self.with_drawer(|drawer| drawer.emit(sphere_lines(position, radius, color)));
    }

    /// Log a caller error and forward it to the debug sink, if any
    pub(crate) fn warn(&self, message: &str) {
        log::warn!("{message}");
        if let Ok(mut drawer) = self.debug_drawer.try_borrow_mut()
            && let Some(drawer) = drawer.as_mut()
        {
            drawer.report(message);
        }
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for World {
    fn drop(&mut self) {
        let (joints, members) = {
            let mut engine = self.engine.borrow_mut();
            let joints = mem::take(&mut engine.dynamics.joints);
            let members: Vec<_> = engine.dynamics.members.drain().collect();
            (joints, members)
        };

        if !joints.is_empty() || !members.is_empty() {
            log::warn!(
                "World dropped with {} bodies and {} constraints; detaching them",
                members.len(),
                joints.len()
            );
        }

        for constraint in joints.values().filter_map(Weak::upgrade) {
            constraint.mark_detached();
        }

        for (handle, body) in members {
            let removed = self.engine.borrow_mut().remove_body(handle);
            if let (Some(body), Some(removed)) = (body.upgrade(), removed) {
                body.state().residence = Residence::Detached(Box::new(removed));
            }
        }

        self.debug_drawer.get_mut().take();
        log::trace!("World destroyed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constraint::fixed_body;
    use crate::math::{IDENTITY_TRANSFORM, Transform};
    use crate::shape::Shape;

    fn at(position: Vec3) -> Transform {
        let mut t = IDENTITY_TRANSFORM;
        t[3] = position.to_array();
        t
    }

    fn ground() -> Rc<RigidBody> {
        RigidBody::new(0.0, &IDENTITY_TRANSFORM, Shape::new_plane(Vec3::Y, 0.0))
    }

    fn ball(height: f32) -> Rc<RigidBody> {
        RigidBody::new(1.0, &at(Vec3::new(0.0, height, 0.0)), Shape::new_sphere(0.5))
    }

    #[derive(Clone, Default)]
    struct Recorder(Rc<RefCell<Vec<String>>>);

    impl DebugDraw for Recorder {
        fn draw_line(&mut self, _from: Vec3, _to: Vec3, _color: Vec3) {
            self.0.borrow_mut().push("line".to_string());
        }

        fn draw_contact_point(&mut self, _point: Vec3, _normal: Vec3, _distance: f32, _lifetime: i32, _color: Vec3) {
            self.0.borrow_mut().push("contact".to_string());
        }

        fn report_error_warning(&mut self, message: &str) {
            self.0.borrow_mut().push(message.to_string());
        }
    }

    #[test]
    fn test_add_and_remove_body() {
        let world = World::new();
        let body = ball(5.0);

        world.add_body(&body);
        assert!(body.is_in_world());
        assert_eq!(world.body_count(), 1);
        assert_eq!(body.collision_filter(), Some(CollisionFilter { group: 1, mask: -1 }));

        world.remove_body(&body);
        assert!(!body.is_in_world());
        assert_eq!(world.body_count(), 0);
        assert_eq!(body.mass(), 1.0);
        assert_eq!(body.center_of_mass_position(), Vec3::new(0.0, 5.0, 0.0));
    }

    #[test]
    fn test_static_body_sleeps_in_world() {
        let world = World::new();
        let ground = ground();
        world.add_body(&ground);
        assert_eq!(ground.activation_state(), ActivationState::IslandSleeping);
        assert!(!ground.is_active());
        assert_eq!(ground.collision_filter(), Some(CollisionFilter { group: 2, mask: -3 }));
    }

    #[test]
    fn test_gravity_moves_member_bodies_only() {
        let world = World::with_config(WorldConfig::default().with_gravity(Vec3::new(0.0, -10.0, 0.0)));
        assert_eq!(world.gravity(), Vec3::new(0.0, -10.0, 0.0));

        let member = ball(5.0);
        let outsider = ball(5.0);
        world.add_body(&member);

        assert_eq!(world.step(1.0 / 60.0), 1);
        assert!(member.center_of_mass_position().y < 5.0);
        assert!(member.linear_velocity().y < 0.0);
        assert_eq!(outsider.center_of_mass_position().y, 5.0);

        world.remove_body(&member);
        let frozen = member.center_of_mass_position();
        world.step(1.0 / 60.0);
        assert_eq!(member.center_of_mass_position(), frozen);
    }

    #[test]
    fn test_double_add_is_ignored() {
        let world = World::new();
        let recorder = Recorder::default();
        world.set_debug_draw(Box::new(recorder.clone()));

        let body = ball(1.0);
        world.add_body(&body);
        world.add_body(&body);
        assert_eq!(world.body_count(), 1);
        assert!(recorder.0.borrow().iter().any(|m| m.contains("already in a world")));

        let other = World::new();
        other.remove_body(&body);
        assert!(body.is_in_world());
    }

    #[test]
    fn test_ray_hits_ground_plane() {
        let world = World::new();
        let ground = ground();
        world.add_body(&ground);

        let hit = world
            .ray_test_closest(Vec3::Y, -Vec3::Y, -1, -1, 0)
            .expect("ray should hit the plane");
        assert!((hit.fraction - 0.5).abs() < 1e-5);
        assert!(hit.point.length() < 1e-5);
        assert!((hit.normal - Vec3::Y).length() < 1e-5);
        assert!(Rc::ptr_eq(&hit.body, &ground));

        // Static bodies are not in group 1's mask.
        assert!(world.ray_test_closest(Vec3::Y, -Vec3::Y, -1, 1, 0).is_none());
        assert!(world.ray_test_closest(Vec3::Y, Vec3::Y, -1, -1, 0).is_none());
    }

    #[test]
    fn test_constraint_requires_member_bodies() {
        let world = World::new();
        let body = ball(2.0);
        let constraint = Constraint::point_to_point(&body, &fixed_body(), Vec3::ZERO, Vec3::new(0.0, 2.0, 0.0));

        world.add_constraint(&constraint, false);
        assert!(!constraint.is_in_world());

        world.add_body(&body);
        world.add_constraint(&constraint, true);
        assert!(constraint.is_in_world());
        assert_eq!(world.constraint_count(), 1);

        world.remove_constraint(&constraint);
        assert!(!constraint.is_in_world());
        assert_eq!(world.constraint_count(), 0);
    }

    #[test]
    fn test_removing_body_detaches_its_constraints() {
        let world = World::new();
        let body = ball(2.0);
        world.add_body(&body);
        let constraint = Constraint::point_to_point(&body, &fixed_body(), Vec3::ZERO, Vec3::new(0.0, 2.0, 0.0));
        world.add_constraint(&constraint, false);

        world.remove_body(&body);
        assert!(!constraint.is_in_world());
        assert_eq!(world.constraint_count(), 0);
    }

    #[test]
    fn test_dropping_world_detaches_members() {
        let body = ball(1.0);
        let constraint = Constraint::point_to_point(&body, &fixed_body(), Vec3::ZERO, Vec3::Y);
        {
            let world = World::new();
            world.add_body(&body);
            world.add_constraint(&constraint, false);
        }
        assert!(!body.is_in_world());
        assert!(!constraint.is_in_world());
        assert_eq!(body.center_of_mass_position(), Vec3::Y);
    }

    #[test]
    fn test_debug_drawer_registration() {
        let world = World::new();
        assert_eq!(world.debug_mode(), None);
        world.debug_draw_world();

        world.set_debug_draw(Box::new(Recorder::default()));
        assert_eq!(world.debug_mode(), Some(DebugMode::DEFAULT));

        world.set_debug_mode(DebugMode::AABB);
        let second = Recorder::default();
        world.set_debug_draw(Box::new(second.clone()));
        assert_eq!(world.debug_mode(), Some(DebugMode::AABB));

        let body = ball(1.0);
        world.add_body(&body);
        assert_eq!(world.body_count(), 1);
        world.debug_draw_world();
        assert!(second.0.borrow().iter().any(|m| m == "line"));
    }

    #[test]
    fn test_debug_primitives() {
        let world = World::new();
        let recorder = Recorder::default();
        world.set_debug_draw(Box::new(recorder.clone()));

        world.debug_draw_line(Vec3::ZERO, Vec3::X, Vec3::ONE);
        world.debug_draw_sphere(Vec3::ZERO, 1.0, Vec3::ONE);
        assert_eq!(recorder.0.borrow().len(), 1 + 36);
    }

    #[test]
    #[should_panic(expected = "registered debug drawer")]
    fn test_debug_line_without_drawer() {
        World::new().debug_draw_line(Vec3::ZERO, Vec3::X, Vec3::ONE);
    }
}
