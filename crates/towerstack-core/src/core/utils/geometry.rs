use nalgebra::{Isometry3, Matrix4, Translation3, UnitQuaternion, Vector3};
use std::fmt;
use std::ops::Mul;

/// A 6-DOF rigid transform: a position in millimetres and an orientation.
///
/// Values are immutable; every operation returns a new frame. Composition reads left to
/// right exactly like a chain of homogeneous matrices, so
/// `frame.compose(&PoseFrame::translation(x, y, z)).compose(&PoseFrame::rotation_z(a))`
/// is `frame * transl(x, y, z) * rotz(a)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PoseFrame {
    iso: Isometry3<f64>,
}

impl PoseFrame {
    pub fn identity() -> Self {
        Self {
            iso: Isometry3::identity(),
        }
    }

    /// Pure translation by `(dx, dy, dz)` millimetres.
    pub fn translation(dx: f64, dy: f64, dz: f64) -> Self {
        Self {
            iso: Isometry3::translation(dx, dy, dz),
        }
    }

    /// Pure rotation about the X axis by `angle` radians.
    pub fn rotation_x(angle: f64) -> Self {
        Self::from_axis_angle(Vector3::x() * angle)
    }

    /// Pure rotation about the Y axis by `angle` radians.
    pub fn rotation_y(angle: f64) -> Self {
        Self::from_axis_angle(Vector3::y() * angle)
    }

    /// Pure rotation about the Z axis by `angle` radians.
    pub fn rotation_z(angle: f64) -> Self {
        Self::from_axis_angle(Vector3::z() * angle)
    }

    fn from_axis_angle(axis_angle: Vector3<f64>) -> Self {
        Self {
            iso: Isometry3::rotation(axis_angle),
        }
    }

    /// Builds a frame from `[x, y, z, rx, ry, rz]` (millimetres, degrees), equivalent to
    /// `transl(x, y, z) * rotz(rz) * roty(ry) * rotx(rx)`.
    pub fn from_xyzrpw(values: [f64; 6]) -> Self {
        let [x, y, z, rx, ry, rz] = values;
        let rotation =
            UnitQuaternion::from_euler_angles(rx.to_radians(), ry.to_radians(), rz.to_radians());
        Self {
            iso: Isometry3::from_parts(Translation3::new(x, y, z), rotation),
        }
    }

    /// Inverse of [`PoseFrame::from_xyzrpw`]: `[x, y, z, rx, ry, rz]` in millimetres and degrees.
    pub fn to_xyzrpw(&self) -> [f64; 6] {
        let t = self.iso.translation.vector;
        let (rx, ry, rz) = self.iso.rotation.euler_angles();
        [
            t.x,
            t.y,
            t.z,
            rx.to_degrees(),
            ry.to_degrees(),
            rz.to_degrees(),
        ]
    }

    /// Returns `child` expressed in this frame's parent coordinate system.
    pub fn compose(&self, child: &PoseFrame) -> PoseFrame {
        PoseFrame {
            iso: self.iso * child.iso,
        }
    }

    pub fn inverse(&self) -> PoseFrame {
        PoseFrame {
            iso: self.iso.inverse(),
        }
    }

    /// Offsets this frame by `dz` along its parent's Z axis.
    ///
    /// The offset is applied on the parent side of the chain, so any tool rotation already
    /// contained in the frame does not tilt the hover direction.
    pub fn with_hover_offset(&self, dz: f64) -> PoseFrame {
        PoseFrame::translation(0.0, 0.0, dz).compose(self)
    }

    pub fn position(&self) -> Vector3<f64> {
        self.iso.translation.vector
    }

    pub fn x(&self) -> f64 {
        self.iso.translation.vector.x
    }

    pub fn y(&self) -> f64 {
        self.iso.translation.vector.y
    }

    pub fn z(&self) -> f64 {
        self.iso.translation.vector.z
    }

    pub fn rotation(&self) -> UnitQuaternion<f64> {
        self.iso.rotation
    }

    pub fn to_homogeneous(&self) -> Matrix4<f64> {
        self.iso.to_homogeneous()
    }

    /// Distance in millimetres between the two frame origins.
    pub fn distance_to(&self, other: &PoseFrame) -> f64 {
        (self.position() - other.position()).norm()
    }

    /// Compares two frames within a linear tolerance (mm) and an angular tolerance (rad).
    pub fn approx_eq(&self, other: &PoseFrame, linear_tol: f64, angular_tol: f64) -> bool {
        self.distance_to(other) <= linear_tol
            && self.iso.rotation.angle_to(&other.iso.rotation) <= angular_tol
    }
}

impl Default for PoseFrame {
    fn default() -> Self {
        Self::identity()
    }
}

impl Mul for PoseFrame {
    type Output = PoseFrame;

    fn mul(self, rhs: PoseFrame) -> PoseFrame {
        self.compose(&rhs)
    }
}

impl fmt::Display for PoseFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [x, y, z, rx, ry, rz] = self.to_xyzrpw();
        write!(
            f,
            "[{:.3}, {:.3}, {:.3}, {:.3}°, {:.3}°, {:.3}°]",
            x, y, z, rx, ry, rz
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::{FRAC_PI_2, PI};

    const LINEAR_TOL: f64 = 1e-6;
    const ANGULAR_TOL: f64 = 1e-9;

    fn sample_frame() -> PoseFrame {
        PoseFrame::from_xyzrpw([350.0, -120.0, 42.0, 10.0, -25.0, 135.0])
    }

    #[test]
    fn translation_moves_origin_without_rotating() {
        let frame = PoseFrame::translation(1.0, 2.0, 3.0);
        assert_eq!(frame.position(), Vector3::new(1.0, 2.0, 3.0));
        assert!(frame.rotation().angle() < ANGULAR_TOL);
    }

    #[test]
    fn compose_applies_child_in_parent_coordinates() {
        let parent = PoseFrame::translation(100.0, 0.0, 0.0).compose(&PoseFrame::rotation_z(FRAC_PI_2));
        let child = PoseFrame::translation(10.0, 0.0, 0.0);
        let result = parent.compose(&child);
        assert!((result.x() - 100.0).abs() < LINEAR_TOL);
        assert!((result.y() - 10.0).abs() < LINEAR_TOL);
        assert!(result.z().abs() < LINEAR_TOL);
    }

    #[test]
    fn compose_is_associative() {
        let a = sample_frame();
        let b = PoseFrame::from_xyzrpw([5.0, 6.0, 7.0, 90.0, 0.0, 0.0]);
        let c = PoseFrame::from_xyzrpw([-3.0, 1.5, 0.0, 0.0, 45.0, 30.0]);
        let left = a.compose(&b).compose(&c);
        let right = a.compose(&b.compose(&c));
        assert!(left.approx_eq(&right, LINEAR_TOL, ANGULAR_TOL));
    }

    #[test]
    fn inverse_undoes_composition() {
        let frame = sample_frame();
        let pose = PoseFrame::from_xyzrpw([12.5, -7.0, 90.0, 180.0, 0.0, -90.0]);
        let round_trip = frame.inverse().compose(&frame.compose(&pose));
        assert!(round_trip.approx_eq(&pose, LINEAR_TOL, ANGULAR_TOL));
    }

    #[test]
    fn mul_operator_matches_compose() {
        let a = sample_frame();
        let b = PoseFrame::rotation_x(PI);
        assert_eq!(a * b, a.compose(&b));
    }

    #[test]
    fn xyzrpw_matches_translate_then_z_y_x_rotation_chain() {
        let values = [10.0, 20.0, 30.0, 15.0, -40.0, 75.0];
        let chained = PoseFrame::translation(10.0, 20.0, 30.0)
            * PoseFrame::rotation_z(75.0f64.to_radians())
            * PoseFrame::rotation_y((-40.0f64).to_radians())
            * PoseFrame::rotation_x(15.0f64.to_radians());
        assert!(PoseFrame::from_xyzrpw(values).approx_eq(&chained, LINEAR_TOL, ANGULAR_TOL));
    }

    #[test]
    fn xyzrpw_round_trips_for_non_degenerate_angles() {
        let values = [350.0, -120.0, 42.0, 10.0, -25.0, 135.0];
        let recovered = PoseFrame::from_xyzrpw(values).to_xyzrpw();
        for (expected, actual) in values.iter().zip(recovered.iter()) {
            assert!((expected - actual).abs() < 1e-9, "{expected} vs {actual}");
        }
    }

    #[test]
    fn hover_offset_follows_parent_z_even_when_tool_is_flipped() {
        let flipped = PoseFrame::translation(50.0, 60.0, 15.0) * PoseFrame::rotation_x(PI);
        let hover = flipped.with_hover_offset(30.0);
        assert!((hover.z() - 45.0).abs() < LINEAR_TOL);
        assert!((hover.x() - 50.0).abs() < LINEAR_TOL);
        assert!((hover.y() - 60.0).abs() < LINEAR_TOL);
        assert!(hover.rotation().angle_to(&flipped.rotation()) < ANGULAR_TOL);
    }

    #[test]
    fn homogeneous_matrix_carries_translation_in_last_column() {
        let m = PoseFrame::translation(1.0, 2.0, 3.0).to_homogeneous();
        assert_eq!(m[(0, 3)], 1.0);
        assert_eq!(m[(1, 3)], 2.0);
        assert_eq!(m[(2, 3)], 3.0);
        assert_eq!(m[(3, 3)], 1.0);
    }

    #[test]
    fn approx_eq_rejects_rotated_frames() {
        let a = PoseFrame::translation(1.0, 1.0, 1.0);
        let b = a * PoseFrame::rotation_z(0.01);
        assert!(!a.approx_eq(&b, LINEAR_TOL, ANGULAR_TOL));
        assert!(a.approx_eq(&b, LINEAR_TOL, 0.02));
    }
}
