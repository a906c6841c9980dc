//! Graphics-facing transform owned by every body

use rapier3d::na::Isometry3;

/// The transform renderers read, refreshed by the world after each step
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotionState {
    graphics_world_transform: Isometry3<f32>,
}

impl MotionState {
    pub fn new(start: Isometry3<f32>) -> Self {
        Self {
            graphics_world_transform: start,
        }
    }

    /// Center-of-mass transform handed to the simulation
    pub fn world_transform(&self) -> Isometry3<f32> {
        self.graphics_world_transform
    }

    /// Receive a new center-of-mass transform from the simulation
    pub fn set_world_transform(&mut self, center_of_mass: Isometry3<f32>) {
        self.graphics_world_transform = center_of_mass;
    }

    pub fn graphics_world_transform(&self) -> &Isometry3<f32> {
        &self.graphics_world_transform
    }
}
