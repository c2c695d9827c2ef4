//! Operators of the Galilean group.
use nalgebra::{Rotation3, Vector3};

use super::Operator;

/// Translation in space only, `q' = q + shift`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GalileanSpatialTranslationOperator {
    /// Spatial shift.
    pub shift: Vector3<f64>,
}

impl GalileanSpatialTranslationOperator {
    /// Construct a new spatial translation.
    #[must_use]
    pub fn new(shift: Vector3<f64>) -> Self {
        Self { shift }
    }
}

impl Operator for GalileanSpatialTranslationOperator {
    fn apply_qpt(
        &self,
        q: &Vector3<f64>,
        p: &Vector3<f64>,
        t: f64,
    ) -> (Vector3<f64>, Vector3<f64>, f64) {
        (q + self.shift, *p, t)
    }

    fn inverse(&self) -> Box<dyn Operator> {
        Box::new(Self::new(-self.shift))
    }

    fn boxed_clone(&self) -> Box<dyn Operator> {
        Box::new(*self)
    }

    fn is_time_independent(&self) -> bool {
        true
    }

    fn is_identity(&self) -> bool {
        self.shift == Vector3::zeros()
    }
}

/// Translation in space and time, `q' = q + shift` and `t' = t + dt`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GalileanTranslationOperator {
    /// Spatial shift.
    pub shift: Vector3<f64>,

    /// Time shift.
    pub dt: f64,
}

impl GalileanTranslationOperator {
    /// Construct a new space-time translation.
    #[must_use]
    pub fn new(shift: Vector3<f64>, dt: f64) -> Self {
        Self { shift, dt }
    }
}

impl Operator for GalileanTranslationOperator {
    fn apply_qpt(
        &self,
        q: &Vector3<f64>,
        p: &Vector3<f64>,
        t: f64,
    ) -> (Vector3<f64>, Vector3<f64>, f64) {
        (q + self.shift, *p, t + self.dt)
    }

    fn inverse(&self) -> Box<dyn Operator> {
        Box::new(Self::new(-self.shift, -self.dt))
    }

    fn boxed_clone(&self) -> Box<dyn Operator> {
        Box::new(*self)
    }

    fn is_time_independent(&self) -> bool {
        self.dt == 0.0
    }

    fn is_identity(&self) -> bool {
        self.shift == Vector3::zeros() && self.dt == 0.0
    }
}

/// Boost into a frame moving with constant velocity, `q' = q + v t` and `p' = p + v`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GalileanBoostOperator {
    /// Boost velocity.
    pub velocity: Vector3<f64>,
}

impl GalileanBoostOperator {
    /// Construct a new boost.
    #[must_use]
    pub fn new(velocity: Vector3<f64>) -> Self {
        Self { velocity }
    }
}

impl Operator for GalileanBoostOperator {
    fn apply_qpt(
        &self,
        q: &Vector3<f64>,
        p: &Vector3<f64>,
        t: f64,
    ) -> (Vector3<f64>, Vector3<f64>, f64) {
        (q + self.velocity * t, p + self.velocity, t)
    }

    fn inverse(&self) -> Box<dyn Operator> {
        Box::new(Self::new(-self.velocity))
    }

    fn boxed_clone(&self) -> Box<dyn Operator> {
        Box::new(*self)
    }

    fn is_time_independent(&self) -> bool {
        self.is_identity()
    }

    fn is_identity(&self) -> bool {
        self.velocity == Vector3::zeros()
    }
}

/// Fixed rotation of positions and momenta.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GalileanRotationOperator {
    /// Rotation applied to both `q` and `p`.
    pub rotation: Rotation3<f64>,
}

impl GalileanRotationOperator {
    /// Construct a new rotation.
    #[must_use]
    pub fn new(rotation: Rotation3<f64>) -> Self {
        Self { rotation }
    }

    /// Rotation by `angle` radians about the given axis.
    #[must_use]
    pub fn from_axis_angle(axis: &Vector3<f64>, angle: f64) -> Self {
        let rotation = match nalgebra::Unit::try_new(*axis, f64::EPSILON) {
            Some(axis) => Rotation3::from_axis_angle(&axis, angle),
            None => Rotation3::identity(),
        };
        Self { rotation }
    }
}

impl Operator for GalileanRotationOperator {
    fn apply_qpt(
        &self,
        q: &Vector3<f64>,
        p: &Vector3<f64>,
        t: f64,
    ) -> (Vector3<f64>, Vector3<f64>, f64) {
        (
            self.rotation.transform_vector(q),
            self.rotation.transform_vector(p),
            t,
        )
    }

    fn inverse(&self) -> Box<dyn Operator> {
        Box::new(Self::new(self.rotation.inverse()))
    }

    fn boxed_clone(&self) -> Box<dyn Operator> {
        Box::new(*self)
    }

    fn is_time_independent(&self) -> bool {
        true
    }

    fn is_identity(&self) -> bool {
        self.rotation == Rotation3::identity()
    }
}
