//! The engine subsystems a world owns
//!
//! Fields are declared in teardown order: Rust drops them top to bottom, so
//! the configuration goes first and the dynamics state last.

use std::rc::Weak;

use rapier3d::na::Vector3;
use rapier3d::parry::query::DefaultQueryDispatcher;
use rapier3d::prelude::*;
use rustc_hash::FxHashMap;

use crate::body::RigidBody;
use crate::config::WorldConfig;
use crate::constraint::Constraint;
use crate::math::vec_to_engine;

/// Tunables shared by every subsystem, plus the contact dispatcher factory
pub(crate) struct CollisionConfiguration {
    pub integration: IntegrationParameters,
}

impl CollisionConfiguration {
    fn new(config: &WorldConfig) -> Self {
        let mut integration = IntegrationParameters::default();
        integration.num_solver_iterations = config.solver_iterations;
        Self { integration }
    }

    /// Narrow phase bound to this configuration's pair dispatcher
    fn create_dispatcher(&self) -> Dispatcher {
        Dispatcher {
            narrow_phase: NarrowPhase::with_query_dispatcher(DefaultQueryDispatcher),
        }
    }
}

/// Exact pair tests producing contact manifolds
pub(crate) struct Dispatcher {
    pub narrow_phase: NarrowPhase,
}

/// Constraint and contact solver state
pub(crate) struct Solver {
    pub pipeline: PhysicsPipeline,
    pub islands: IslandManager,
    pub ccd: CCDSolver,
}

impl Solver {
    fn new() -> Self {
        Self {
            pipeline: PhysicsPipeline::new(),
            islands: IslandManager::new(),
            ccd: CCDSolver::new(),
        }
    }
}

/// Bodies, colliders and joints simulated over the other subsystems
pub(crate) struct DynamicsWorld {
    pub gravity: Vector3<f32>,
    pub bodies: RigidBodySet,
    pub colliders: ColliderSet,
    pub impulse_joints: ImpulseJointSet,
    pub multibody_joints: MultibodyJointSet,
    /// Layer bodies by engine handle, never owning
    pub members: FxHashMap<RigidBodyHandle, Weak<RigidBody>>,
    /// Layer constraints by engine handle, never owning
    pub joints: FxHashMap<ImpulseJointHandle, Weak<Constraint>>,
    /// Immovable body that sentinel-anchored joints attach to
    anchor: Option<RigidBodyHandle>,
    /// Time accumulated towards the next fixed substep
    pub local_time: f32,
}

impl DynamicsWorld {
    fn new(gravity: Vector3<f32>) -> Self {
        Self {
            gravity,
            bodies: RigidBodySet::new(),
            colliders: ColliderSet::new(),
            impulse_joints: ImpulseJointSet::new(),
            multibody_joints: MultibodyJointSet::new(),
            members: FxHashMap::default(),
            joints: FxHashMap::default(),
            anchor: None,
            local_time: 0.0,
        }
    }
}

pub(crate) struct Engine {
    pub configuration: CollisionConfiguration,
    pub dispatcher: Dispatcher,
    pub broadphase: DefaultBroadPhase,
    pub solver: Solver,
    pub dynamics: DynamicsWorld,
}

impl Engine {
    /// Acquire the subsystems in dependency order
    pub fn new(config: &WorldConfig) -> Self {
        let configuration = CollisionConfiguration::new(config);
        let dispatcher = configuration.create_dispatcher();
        let broadphase = DefaultBroadPhase::new();
        let solver = Solver::new();
        let dynamics = DynamicsWorld::new(vec_to_engine(config.gravity));

        Self {
            configuration,
            dispatcher,
            broadphase,
            solver,
            dynamics,
        }
    }

    /// Engine body joints use when their second body is the fixed sentinel
    pub fn anchor(&mut self) -> RigidBodyHandle {
        let dynamics = &mut self.dynamics;
        *dynamics
            .anchor
            .get_or_insert_with(|| dynamics.bodies.insert(RigidBodyBuilder::fixed().build()))
    }

    /// Run one engine step of `dt` seconds
    pub fn single_step(&mut self, dt: f32) {
        self.configuration.integration.dt = dt;

        self.solver.pipeline.step(
            &self.dynamics.gravity,
            &self.configuration.integration,
            &mut self.solver.islands,
            &mut self.broadphase,
            &mut self.dispatcher.narrow_phase,
            &mut self.dynamics.bodies,
            &mut self.dynamics.colliders,
            &mut self.dynamics.impulse_joints,
            &mut self.dynamics.multibody_joints,
            &mut self.solver.ccd,
            None,
            &(),
            &(),
        );
    }

    /// Remove a member body and its collider, returning the engine body
    pub fn remove_body(&mut self, handle: RigidBodyHandle) -> Option<rapier3d::dynamics::RigidBody> {
        self.dynamics.members.remove(&handle);
        let removed = self.dynamics.bodies.remove(
            handle,
            &mut self.solver.islands,
            &mut self.dynamics.colliders,
            &mut self.dynamics.impulse_joints,
            &mut self.dynamics.multibody_joints,
            true,
        );
        self.prune_orphaned_joints();
        removed
    }

    /// Drop bookkeeping for joints the engine removed along with a body
    fn prune_orphaned_joints(&mut self) {
        let impulse_joints = &self.dynamics.impulse_joints;
        let orphaned: Vec<_> = self
            .dynamics
            .joints
            .keys()
            .copied()
            .filter(|handle| impulse_joints.get(*handle).is_none())
            .collect();

        for handle in orphaned {
            if let Some(constraint) = self.dynamics.joints.remove(&handle).and_then(|c| c.upgrade()) {
                log::debug!("Constraint left its world together with a linked body");
                constraint.mark_detached();
            }
        }
    }

    /// Remove a member joint
    pub fn remove_joint(&mut self, handle: ImpulseJointHandle) {
        self.dynamics.joints.remove(&handle);
        self.dynamics.impulse_joints.remove(handle, true);
    }
}
