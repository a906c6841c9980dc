//! Transform codec between the flat row-vector layout and engine isometries
//!
//! Callers exchange transforms as four rows of three floats: rows 0-2 are the
//! basis in row-vector convention (`v' = v * M`) and row 3 is the origin. The
//! engine stores rotations in column-vector convention (`v' = N * v`), so
//! `N = Mᵀ` and exposed element `(i, j)` is engine element `(j, i)`.
//!
//! There are two readers on purpose. [`from_engine_isometry`] transposes and
//! is used by every center-of-mass accessor. [`read_motion_state_transform`]
//! does not transpose; it backs the graphics transform, which renderers
//! consume as-is.

use glam::{Mat3, Quat, Vec3};
use rapier3d::na::{self, Isometry3, Translation3, UnitQuaternion};

/// Three-component vector as exchanged with callers
pub type Vector3 = [f32; 3];

/// Four rows of three floats: three basis rows followed by the origin
pub type Transform = [[f32; 3]; 4];

/// The identity transform in exposed layout
pub const IDENTITY_TRANSFORM: Transform = [
    [1.0, 0.0, 0.0],
    [0.0, 1.0, 0.0],
    [0.0, 0.0, 1.0],
    [0.0, 0.0, 0.0],
];

/// Convert a glam vector to an engine vector
pub(crate) fn vec_to_engine(v: Vec3) -> na::Vector3<f32> {
    na::Vector3::new(v.x, v.y, v.z)
}

/// Convert an engine vector to a glam vector
pub(crate) fn vec_from_engine(v: &na::Vector3<f32>) -> Vec3 {
    Vec3::new(v.x, v.y, v.z)
}

/// Convert glam Quat to an engine UnitQuaternion
pub(crate) fn quat_to_engine(q: Quat) -> UnitQuaternion<f32> {
    UnitQuaternion::from_quaternion(na::Quaternion::new(q.w, q.x, q.y, q.z))
}

/// Convert an engine UnitQuaternion to glam Quat
pub(crate) fn quat_from_engine(uq: &UnitQuaternion<f32>) -> Quat {
    let q = uq.quaternion();
    Quat::from_xyzw(q.i, q.j, q.k, q.w)
}

/// Build an engine isometry from the exposed layout, transposing the basis.
///
/// The basis rows must form a rotation; scale and shear are not representable
/// by the engine and are lost.
pub fn to_engine_isometry(t: &Transform) -> Isometry3<f32> {
    // Exposed rows are exactly the engine basis columns.
    let basis = Mat3::from_cols(Vec3::from(t[0]), Vec3::from(t[1]), Vec3::from(t[2]));
    let rotation = Quat::from_mat3(&basis).normalize();

    Isometry3::from_parts(
        Translation3::new(t[3][0], t[3][1], t[3][2]),
        quat_to_engine(rotation),
    )
}

/// Write an engine isometry in exposed layout, transposing the basis.
pub fn from_engine_isometry(iso: &Isometry3<f32>) -> Transform {
    let basis = Mat3::from_quat(quat_from_engine(&iso.rotation));
    let origin = iso.translation.vector;

    [
        basis.x_axis.to_array(),
        basis.y_axis.to_array(),
        basis.z_axis.to_array(),
        [origin.x, origin.y, origin.z],
    ]
}

/// Write a motion-state isometry in exposed layout WITHOUT transposing.
///
/// Row `i` of the result is row `i` of the engine basis. Only the graphics
/// world transform goes through here.
pub fn read_motion_state_transform(iso: &Isometry3<f32>) -> Transform {
    let basis = Mat3::from_quat(quat_from_engine(&iso.rotation));
    let origin = iso.translation.vector;

    [
        basis.row(0).to_array(),
        basis.row(1).to_array(),
        basis.row(2).to_array(),
        [origin.x, origin.y, origin.z],
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use rapier3d::na::Point3;

    const EPS: f32 = 1e-5;

    fn assert_transform_eq(a: &Transform, b: &Transform) {
        for (row_a, row_b) in a.iter().zip(b) {
            for (x, y) in row_a.iter().zip(row_b) {
                assert!((x - y).abs() < EPS, "{a:?} != {b:?}");
            }
        }
    }

    /// Quarter turn about +Z, origin (1, 2, 3), in row-vector layout.
    fn quarter_turn_z() -> Transform {
        [
            [0.0, 1.0, 0.0],
            [-1.0, 0.0, 0.0],
            [0.0, 0.0, 1.0],
            [1.0, 2.0, 3.0],
        ]
    }

    #[test]
    fn test_row_vector_layout_maps_to_engine_rotation() {
        let iso = to_engine_isometry(&quarter_turn_z());
        let moved = iso * Point3::new(1.0, 0.0, 0.0);

        // (1,0,0) * M = row 0 = (0,1,0), then translated
        assert!((moved.x - 1.0).abs() < EPS);
        assert!((moved.y - 3.0).abs() < EPS);
        assert!((moved.z - 3.0).abs() < EPS);
    }

    #[test]
    fn test_codec_round_trip() {
        let t = quarter_turn_z();
        assert_transform_eq(&from_engine_isometry(&to_engine_isometry(&t)), &t);

        let tilted = from_engine_isometry(&Isometry3::from_parts(
            Translation3::new(-4.0, 0.5, 9.0),
            UnitQuaternion::from_euler_angles(0.3, -1.1, 2.0),
        ));
        assert_transform_eq(&from_engine_isometry(&to_engine_isometry(&tilted)), &tilted);
    }

    #[test]
    fn test_motion_state_reader_is_untransposed() {
        let iso = to_engine_isometry(&quarter_turn_z());
        let graphics = read_motion_state_transform(&iso);

        assert_transform_eq(
            &graphics,
            &[
                [0.0, -1.0, 0.0],
                [1.0, 0.0, 0.0],
                [0.0, 0.0, 1.0],
                [1.0, 2.0, 3.0],
            ],
        );
    }

    #[test]
    fn test_identity() {
        let iso = to_engine_isometry(&IDENTITY_TRANSFORM);
        assert_eq!(iso, Isometry3::identity());
        assert_transform_eq(&read_motion_state_transform(&iso), &IDENTITY_TRANSFORM);
    }
}
