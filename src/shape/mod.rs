//! Collision shape factory
//!
//! Shapes are immutable once built. They own no world reference and can be
//! shared between any number of bodies through `Rc<Shape>`.

mod geometry;
mod inertia;
mod kind;

use std::cell::Cell;
use std::ffi::c_void;
use std::fmt;
use std::rc::Rc;

use glam::Vec3;

use crate::error::{PhysicsError, require_positive};

pub(crate) use geometry::Geometry;
pub use inertia::CONVEX_MARGIN;
pub use kind::{Axis, ShapeKind, ShapeType};

/// Number of integer user-index slots on a shape
pub const SHAPE_USER_INDEX_SLOTS: usize = 2;

/// A collision shape with caller metadata slots
pub struct Shape {
    kind: ShapeKind,
    geometry: Geometry,
    user_indices: [Cell<i32>; SHAPE_USER_INDEX_SLOTS],
    user_pointer: Cell<*mut c_void>,
}

impl Shape {
    fn from_kind(kind: ShapeKind) -> Rc<Self> {
        log::trace!("Creating {:?} shape", kind.shape_type());
        Rc::new(Self {
            geometry: geometry::build(&kind),
            kind,
            user_indices: [Cell::new(-1), Cell::new(-1)],
            user_pointer: Cell::new(std::ptr::null_mut()),
        })
    }

    /// Box with the given half extents
    pub fn try_new_box(half_extents: Vec3) -> Result<Rc<Self>, PhysicsError> {
        require_positive("box half extent x", half_extents.x)?;
        require_positive("box half extent y", half_extents.y)?;
        require_positive("box half extent z", half_extents.z)?;
        Ok(Self::from_kind(ShapeKind::Box { half_extents }))
    }

    /// Flat box in the XY plane
    pub fn try_new_box_2d(x_half_extent: f32, y_half_extent: f32) -> Result<Rc<Self>, PhysicsError> {
        require_positive("box2d half extent x", x_half_extent)?;
        require_positive("box2d half extent y", y_half_extent)?;
        Ok(Self::from_kind(ShapeKind::Box2d {
            x_half_extent,
            y_half_extent,
        }))
    }

    /// Sphere of the given radius
    pub fn try_new_sphere(radius: f32) -> Result<Rc<Self>, PhysicsError> {
        require_positive("sphere radius", radius)?;
        Ok(Self::from_kind(ShapeKind::Sphere { radius }))
    }

    /// Static plane `normal · p = distance`; the normal is normalized
    pub fn try_new_plane(normal: Vec3, distance: f32) -> Result<Rc<Self>, PhysicsError> {
        let normal = normal.try_normalize().ok_or(PhysicsError::ZeroNormal)?;
        Ok(Self::from_kind(ShapeKind::Plane { normal, distance }))
    }

    /// Capsule whose cylindrical part of length `height` runs along `axis`
    pub fn try_new_capsule(radius: f32, height: f32, axis: Axis) -> Result<Rc<Self>, PhysicsError> {
        require_positive("capsule radius", radius)?;
        require_positive("capsule height", height)?;
        Ok(Self::from_kind(ShapeKind::Capsule {
            radius,
            height,
            axis,
        }))
    }

    /// Cylinder from its bounding half extents
    pub fn try_new_cylinder(half_extents: Vec3, axis: Axis) -> Result<Rc<Self>, PhysicsError> {
        require_positive("cylinder half extent x", half_extents.x)?;
        require_positive("cylinder half extent y", half_extents.y)?;
        require_positive("cylinder half extent z", half_extents.z)?;
        Ok(Self::from_kind(ShapeKind::Cylinder { half_extents, axis }))
    }

    /// Cone with its apex toward the positive end of `axis`
    pub fn try_new_cone(radius: f32, height: f32, axis: Axis) -> Result<Rc<Self>, PhysicsError> {
        require_positive("cone radius", radius)?;
        require_positive("cone height", height)?;
        Ok(Self::from_kind(ShapeKind::Cone {
            radius,
            height,
            axis,
        }))
    }

    /// Box with the given half extents
    ///
    /// # Panics
    /// Panics if any half extent is not positive.
    pub fn new_box(half_extents: Vec3) -> Rc<Self> {
        Self::try_new_box(half_extents).unwrap_or_else(|e| panic!("{e}"))
    }

    /// Flat box in the XY plane
    ///
    /// # Panics
    /// Panics if either half extent is not positive.
    pub fn new_box_2d(x_half_extent: f32, y_half_extent: f32) -> Rc<Self> {
        Self::try_new_box_2d(x_half_extent, y_half_extent).unwrap_or_else(|e| panic!("{e}"))
    }

    /// Sphere of the given radius
    ///
    /// # Panics
    /// Panics if the radius is not positive.
    pub fn new_sphere(radius: f32) -> Rc<Self> {
        Self::try_new_sphere(radius).unwrap_or_else(|e| panic!("{e}"))
    }

    /// Static plane
    ///
    /// # Panics
    /// Panics if the normal is zero.
    pub fn new_plane(normal: Vec3, distance: f32) -> Rc<Self> {
        Self::try_new_plane(normal, distance).unwrap_or_else(|e| panic!("{e}"))
    }

    /// Capsule
    ///
    /// # Panics
    /// Panics if the radius or height is not positive.
    pub fn new_capsule(radius: f32, height: f32, axis: Axis) -> Rc<Self> {
        Self::try_new_capsule(radius, height, axis).unwrap_or_else(|e| panic!("{e}"))
    }

    /// Cylinder
    ///
    /// # Panics
    /// Panics if any half extent is not positive.
    pub fn new_cylinder(half_extents: Vec3, axis: Axis) -> Rc<Self> {
        Self::try_new_cylinder(half_extents, axis).unwrap_or_else(|e| panic!("{e}"))
    }

    /// Cone
    ///
    /// # Panics
    /// Panics if the radius or height is not positive.
    pub fn new_cone(radius: f32, height: f32, axis: Axis) -> Rc<Self> {
        Self::try_new_cone(radius, height, axis).unwrap_or_else(|e| panic!("{e}"))
    }

    /// Geometric description
    pub fn kind(&self) -> &ShapeKind {
        &self.kind
    }

    pub(crate) fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    /// Numeric discriminant
    pub fn shape_type(&self) -> ShapeType {
        self.kind.shape_type()
    }

    pub fn is_polyhedral(&self) -> bool {
        self.shape_type().is_polyhedral()
    }

    pub fn is_convex_2d(&self) -> bool {
        self.shape_type().is_convex_2d()
    }

    pub fn is_convex(&self) -> bool {
        self.shape_type().is_convex()
    }

    pub fn is_non_moving(&self) -> bool {
        self.shape_type().is_non_moving()
    }

    pub fn is_concave(&self) -> bool {
        self.shape_type().is_concave()
    }

    pub fn is_compound(&self) -> bool {
        self.shape_type().is_compound()
    }

    /// Axis-aligned half extents in local space
    pub fn half_extents(&self) -> Vec3 {
        self.kind.half_extents()
    }

    /// Diagonal local inertia for a body of `mass` built from this shape
    pub fn calculate_local_inertia(&self, mass: f32) -> Vec3 {
        inertia::local_inertia(&self.kind, mass)
    }

    /// Read user index `slot` (0 or 1)
    ///
    /// # Panics
    /// Panics if `slot` is out of range.
    pub fn user_index(&self, slot: usize) -> i32 {
        assert!(slot < SHAPE_USER_INDEX_SLOTS, "shape user index slot {slot} out of range");
        self.user_indices[slot].get()
    }

    /// Write user index `slot` (0 or 1)
    ///
    /// # Panics
    /// Panics if `slot` is out of range.
    pub fn set_user_index(&self, slot: usize, value: i32) {
        assert!(slot < SHAPE_USER_INDEX_SLOTS, "shape user index slot {slot} out of range");
        self.user_indices[slot].set(value);
    }

    pub fn user_pointer(&self) -> *mut c_void {
        self.user_pointer.get()
    }

    pub fn set_user_pointer(&self, pointer: *mut c_void) {
        self.user_pointer.set(pointer);
    }
}

impl fmt::Debug for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Shape")
            .field("kind", &self.kind)
            .field("user_indices", &self.user_indices)
            .field("user_pointer", &self.user_pointer.get())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_non_positive_sizes() {
        assert!(Shape::try_new_box(Vec3::new(1.0, 0.0, 1.0)).is_err());
        assert!(Shape::try_new_box_2d(1.0, -2.0).is_err());
        assert!(Shape::try_new_sphere(0.0).is_err());
        assert!(Shape::try_new_capsule(0.5, 0.0, Axis::Y).is_err());
        assert!(Shape::try_new_cylinder(Vec3::new(1.0, 1.0, -1.0), Axis::Z).is_err());
        assert!(Shape::try_new_cone(-1.0, 1.0, Axis::X).is_err());
        assert_eq!(
            Shape::try_new_plane(Vec3::ZERO, 1.0).unwrap_err(),
            PhysicsError::ZeroNormal
        );
    }

    #[test]
    #[should_panic(expected = "sphere radius must be positive")]
    fn test_panicking_constructor() {
        let _ = Shape::new_sphere(-1.0);
    }

    #[test]
    fn test_plane_normal_is_normalized() {
        let plane = Shape::new_plane(Vec3::new(0.0, 3.0, 0.0), 1.0);
        match plane.kind() {
            ShapeKind::Plane { normal, .. } => assert_eq!(*normal, Vec3::Y),
            other => panic!("unexpected kind {other:?}"),
        }
        assert_eq!(plane.shape_type().raw(), 28);
        assert_eq!(plane.half_extents(), Vec3::splat(f32::INFINITY));
    }

    #[test]
    fn test_type_ids() {
        assert_eq!(Shape::new_box(Vec3::ONE).shape_type().raw(), 0);
        assert_eq!(Shape::new_box_2d(1.0, 1.0).shape_type().raw(), 17);
        assert_eq!(Shape::new_sphere(1.0).shape_type().raw(), 8);
        assert_eq!(Shape::new_capsule(1.0, 1.0, Axis::Y).shape_type().raw(), 10);
        assert_eq!(Shape::new_cylinder(Vec3::ONE, Axis::Y).shape_type().raw(), 13);
        assert_eq!(Shape::new_cone(1.0, 1.0, Axis::Y).shape_type().raw(), 11);
    }

    #[test]
    fn test_axis_selection() {
        let y = Shape::new_capsule(0.5, 2.0, Axis::Y);
        let x = Shape::new_capsule(0.5, 2.0, Axis::X);
        let z = Shape::new_capsule(0.5, 2.0, Axis::Z);

        assert_eq!(y.shape_type(), x.shape_type());
        assert_eq!(y.half_extents(), Vec3::new(0.5, 1.5, 0.5));
        assert_eq!(x.half_extents(), Vec3::new(1.5, 0.5, 0.5));
        assert_eq!(z.half_extents(), Vec3::new(0.5, 0.5, 1.5));
    }

    #[test]
    fn test_user_slots() {
        let shape = Shape::new_sphere(1.0);
        shape.set_user_index(0, 7);
        shape.set_user_index(1, -3);
        assert_eq!(shape.user_index(0), 7);
        assert_eq!(shape.user_index(1), -3);

        let mut token = 5_u32;
        let pointer = (&raw mut token).cast::<c_void>();
        shape.set_user_pointer(pointer);
        assert_eq!(shape.user_pointer(), pointer);
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn test_user_index_slot_out_of_range() {
        Shape::new_box(Vec3::ONE).user_index(2);
    }
}
