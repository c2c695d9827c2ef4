//! Uniformly rotating frames.
use nalgebra::{Matrix3, Rotation3, Vector3};

use super::Operator;

/// Rotation about the z axis by an angle which grows linearly with time.
///
/// Positions are rotated by `R(omega_z t)`. Momenta pick up the frame rotation,
/// `p' = R p + dR/dt q`, so this operator is not inertial.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConstantRotationZOperator {
    /// Angular rate about z, radians per unit time.
    pub omega_z: f64,
}

impl ConstantRotationZOperator {
    /// Construct a new rotating operator.
    #[must_use]
    pub fn new(omega_z: f64) -> Self {
        Self { omega_z }
    }

    /// Rotation at time `t` and its derivative with respect to time.
    #[must_use]
    pub fn rotation_and_rate(&self, t: f64) -> (Rotation3<f64>, Matrix3<f64>) {
        let angle = self.omega_z * t;
        let (sin, cos) = angle.sin_cos();
        let rot = Rotation3::from_axis_angle(&Vector3::z_axis(), angle);
        let rate = Matrix3::new(-sin, -cos, 0.0, cos, -sin, 0.0, 0.0, 0.0, 0.0) * self.omega_z;
        (rot, rate)
    }
}

impl Operator for ConstantRotationZOperator {
    fn apply_qpt(
        &self,
        q: &Vector3<f64>,
        p: &Vector3<f64>,
        t: f64,
    ) -> (Vector3<f64>, Vector3<f64>, f64) {
        let (rot, rate) = self.rotation_and_rate(t);
        (rot.transform_vector(q), rot.transform_vector(p) + rate * q, t)
    }

    fn inverse(&self) -> Box<dyn Operator> {
        Box::new(Self::new(-self.omega_z))
    }

    fn boxed_clone(&self) -> Box<dyn Operator> {
        Box::new(*self)
    }

    fn is_inertial(&self) -> bool {
        self.is_identity()
    }

    fn is_time_independent(&self) -> bool {
        self.is_identity()
    }

    fn is_identity(&self) -> bool {
        self.omega_z == 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn test_roundtrip() {
        let op = ConstantRotationZOperator::new(0.37);
        let q = Vector3::new(1.0, 2.0, 3.0);
        let p = Vector3::new(-0.2, 0.1, 0.4);
        for t in [0.0, 1.0, -4.3, 17.0] {
            let (q1, p1, t1) = op.apply_qpt(&q, &p, t);
            let (q2, p2, t2) = op.inverse().apply_qpt(&q1, &p1, t1);
            assert!((q2 - q).norm() < 1e-12);
            assert!((p2 - p).norm() < 1e-12);
            assert_eq!(t2, t);
        }
    }

    #[test]
    fn test_rate_matches_finite_difference() {
        let op = ConstantRotationZOperator::new(0.5);
        let q = Vector3::new(1.0, 0.5, -0.2);
        let t = 1.3;
        let dt = 1e-6;
        let (_, rate) = op.rotation_and_rate(t);
        let (plus, _) = op.rotation_and_rate(t + dt);
        let (minus, _) = op.rotation_and_rate(t - dt);
        let numeric = (plus.transform_vector(&q) - minus.transform_vector(&q)) / (2.0 * dt);
        assert!((numeric - rate * q).norm() < 1e-8);
    }

    #[test]
    fn test_quarter_turn() {
        let op = ConstantRotationZOperator::new(FRAC_PI_2);
        let (q, p, _) = op.apply_qpt(&Vector3::x(), &Vector3::zeros(), 1.0);
        assert!((q - Vector3::y()).norm() < 1e-12);
        // velocity of the rotated point
        assert!((p - Vector3::new(-FRAC_PI_2, 0.0, 0.0)).norm() < 1e-12);
        assert!(!op.is_inertial());
    }
}
