//! Debug-draw adapter
//!
//! A world owns at most one drawer. The drawer forwards engine draw events
//! to a caller-supplied [`DebugDraw`] sink, filtered by a [`DebugMode`]
//! bitmask.

use std::f32::consts::TAU;
use std::ops::{BitOr, BitOrAssign};

use glam::Vec3;
use rapier3d::na::Point3;
use rapier3d::pipeline::{
    DebugRenderBackend, DebugRenderMode, DebugRenderObject, DebugRenderPipeline, DebugRenderStyle,
};
use smallvec::SmallVec;

use super::engine::Engine;
use crate::math::vec_from_engine;

/// Receiver of debug-draw events
pub trait DebugDraw {
    /// A line segment
    fn draw_line(&mut self, from: Vec3, to: Vec3, color: Vec3);

    /// A contact point with its normal on the second body
    fn draw_contact_point(&mut self, point: Vec3, normal: Vec3, distance: f32, lifetime: i32, color: Vec3);

    /// A warning or error detected by the layer
    fn report_error_warning(&mut self, message: &str);

    /// 3-D text; ignored unless overridden
    fn draw_3d_text(&mut self, _location: Vec3, _text: &str) {}
}

/// Bitmask selecting which events a debug pass emits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DebugMode(pub i32);

impl DebugMode {
    pub const NONE: Self = Self(0);
    pub const WIREFRAME: Self = Self(1);
    pub const AABB: Self = Self(2);
    pub const CONTACT_POINTS: Self = Self(8);
    pub const CONSTRAINTS: Self = Self(1 << 11);
    pub const FRAMES: Self = Self(1 << 15);

    /// Mode a drawer starts with
    pub const DEFAULT: Self =
        Self(Self::WIREFRAME.0 | Self::FRAMES.0 | Self::CONTACT_POINTS.0 | Self::CONSTRAINTS.0);

    #[must_use]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Engine render flags for the line-based parts of this mode
    fn render_mode(self) -> DebugRenderMode {
        let mut mode = DebugRenderMode::empty();
        if self.contains(Self::WIREFRAME) {
            mode |= DebugRenderMode::COLLIDER_SHAPES;
        }
        if self.contains(Self::AABB) {
            mode |= DebugRenderMode::COLLIDER_AABBS;
        }
        if self.contains(Self::CONSTRAINTS) {
            mode |= DebugRenderMode::IMPULSE_JOINTS;
        }
        if self.contains(Self::FRAMES) {
            mode |= DebugRenderMode::RIGID_BODY_AXES;
        }
        mode
    }
}

impl Default for DebugMode {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl BitOr for DebugMode {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for DebugMode {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

/// Color contact points are drawn with
const CONTACT_POINT_COLOR: Vec3 = Vec3::new(1.0, 1.0, 0.0);

const SPHERE_SEGMENTS: usize = 12;

/// One primitive recorded during a pass
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum DrawCommand {
    Line {
        from: Vec3,
        to: Vec3,
        color: Vec3,
    },
    ContactPoint {
        point: Vec3,
        normal: Vec3,
        distance: f32,
        lifetime: i32,
        color: Vec3,
    },
}

impl DrawCommand {
    fn emit(self, sink: &mut dyn DebugDraw) {
        match self {
            Self::Line { from, to, color } => sink.draw_line(from, to, color),
            Self::ContactPoint {
                point,
                normal,
                distance,
                lifetime,
                color,
            } => sink.draw_contact_point(point, normal, distance, lifetime, color),
        }
    }
}

/// Convert the engine's HSLA debug colors to RGB
fn hsla_to_rgb([h, s, l, _]: [f32; 4]) -> Vec3 {
    let c = (1.0 - (2.0 * l - 1.0).abs()) * s;
    let h = (h / 60.0).rem_euclid(6.0);
    let x = c * (1.0 - (h % 2.0 - 1.0).abs());
    let (r, g, b) = match h as u32 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };
    let m = l - c / 2.0;
    Vec3::new(r + m, g + m, b + m)
}

#[derive(Default)]
struct LineCollector {
    commands: Vec<DrawCommand>,
}

impl DebugRenderBackend for LineCollector {
    fn draw_line(&mut self, _object: DebugRenderObject<'_>, a: Point3<f32>, b: Point3<f32>, color: [f32; 4]) {
        self.commands.push(DrawCommand::Line {
            from: vec_from_engine(&a.coords),
            to: vec_from_engine(&b.coords),
            color: hsla_to_rgb(color),
        });
    }
}

/// Record every primitive a full pass over `engine` produces
pub(crate) fn collect_world(engine: &Engine, mode: DebugMode) -> Vec<DrawCommand> {
    let mut collector = LineCollector::default();

    let render_mode = mode.render_mode();
    if !render_mode.is_empty() {
        let mut pipeline = DebugRenderPipeline::new(DebugRenderStyle::default(), render_mode);
        pipeline.render(
            &mut collector,
            &engine.dynamics.bodies,
            &engine.dynamics.colliders,
            &engine.dynamics.impulse_joints,
            &engine.dynamics.multibody_joints,
            &engine.dispatcher.narrow_phase,
        );
    }

    if mode.contains(DebugMode::CONTACT_POINTS) {
        collect_contact_points(engine, &mut collector.commands);
    }

    collector.commands
}

fn collect_contact_points(engine: &Engine, commands: &mut Vec<DrawCommand>) {
    let colliders = &engine.dynamics.colliders;

    for pair in engine.dispatcher.narrow_phase.contact_pairs() {
        let Some(collider) = colliders.get(pair.collider2) else {
            continue;
        };
        let pose = collider.position();

        for manifold in &pair.manifolds {
            // Reported on the second body, pointing towards the first.
            let normal = -vec_from_engine(&manifold.data.normal);
            for contact in &manifold.points {
                let point = pose * contact.local_p2;
                commands.push(DrawCommand::ContactPoint {
                    point: vec_from_engine(&point.coords),
                    normal,
                    distance: contact.dist,
                    lifetime: 0,
                    color: CONTACT_POINT_COLOR,
                });
            }
        }
    }
}

/// Wireframe sphere as three great circles
pub(crate) fn sphere_lines(center: Vec3, radius: f32, color: Vec3) -> SmallVec<[DrawCommand; 3 * SPHERE_SEGMENTS]> {
    let mut lines = SmallVec::new();
    let planes = [(Vec3::X, Vec3::Y), (Vec3::X, Vec3::Z), (Vec3::Y, Vec3::Z)];

    for (u, v) in planes {
        let point_at = |i: usize| {
            let angle = TAU * i as f32 / SPHERE_SEGMENTS as f32;
            center + (u * angle.cos() + v * angle.sin()) * radius
        };
        for i in 0..SPHERE_SEGMENTS {
            lines.push(DrawCommand::Line {
                from: point_at(i),
                to: point_at(i + 1),
                color,
            });
        }
    }
    lines
}

/// The sink plus its mode; one per world
pub(crate) struct DebugDrawer {
    sink: Box<dyn DebugDraw>,
    pub mode: DebugMode,
}

impl DebugDrawer {
    pub fn new(sink: Box<dyn DebugDraw>) -> Self {
        Self {
            sink,
            mode: DebugMode::DEFAULT,
        }
    }

    pub fn set_sink(&mut self, sink: Box<dyn DebugDraw>) {
        self.sink = sink;
    }

    pub fn emit(&mut self, commands: impl IntoIterator<Item = DrawCommand>) {
        for command in commands {
            command.emit(self.sink.as_mut());
        }
    }

    pub fn report(&mut self, message: &str) {
        self.sink.report_error_warning(message);
    }
}
