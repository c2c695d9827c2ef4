//! # Operators
//!
//! Transformations of phase-space-time positions.
//!
//! An operator maps `(q, p, t)` to `(q', p', t')`. Every operator has an exact
//! inverse, so applying an operator followed by its inverse returns the input.
//!
//! ```
//!     use galdyn_core::coordinates::operators::*;
//!     use nalgebra::Vector3;
//!
//!     let op = OperatorSequence::new(vec![
//!         Box::new(GalileanSpatialTranslationOperator::new(Vector3::new(1.0, 0.0, 0.0))),
//!         Box::new(GalileanBoostOperator::new(Vector3::new(0.0, 0.1, 0.0))),
//!     ]);
//!     let q = Vector3::new(1.0, 2.0, 3.0);
//!     let p = Vector3::new(0.1, 0.2, 0.3);
//!     let (q1, p1, t1) = op.apply_qpt(&q, &p, 5.0);
//!     let (q2, p2, _) = op.inverse().apply_qpt(&q1, &p1, t1);
//!     assert!((q2 - q).norm() < 1e-12);
//!     assert!((p2 - p).norm() < 1e-12);
//! ```

mod galilean;
mod rotating;

use std::fmt::Debug;

use nalgebra::Vector3;
use rayon::prelude::*;

pub use self::galilean::{
    GalileanBoostOperator, GalileanRotationOperator, GalileanSpatialTranslationOperator,
    GalileanTranslationOperator,
};
pub use self::rotating::ConstantRotationZOperator;
use super::{
    AbstractPhaseSpacePositionBase, AbstractPhaseSpaceTimePosition, PhaseSpacePosition,
    PhaseSpaceTimePosition, Times,
};
use crate::errors::{Error, GalResult};

/// Transformation of phase-space-time positions.
///
/// Operator parameters are expressed in the units of the positions they act on.
pub trait Operator: Debug + Send + Sync {
    /// Apply the operator to a single position, momentum and time.
    fn apply_qpt(
        &self,
        q: &Vector3<f64>,
        p: &Vector3<f64>,
        t: f64,
    ) -> (Vector3<f64>, Vector3<f64>, f64);

    /// Exact inverse of this operator.
    fn inverse(&self) -> Box<dyn Operator>;

    /// Copy of this operator behind a new box.
    fn boxed_clone(&self) -> Box<dyn Operator>;

    /// Apply the operator to a position and time only.
    fn apply_qt(&self, q: &Vector3<f64>, t: f64) -> (Vector3<f64>, f64) {
        let (q, _, t) = self.apply_qpt(q, &Vector3::zeros(), t);
        (q, t)
    }

    /// True if the operator maps inertial frames onto inertial frames.
    fn is_inertial(&self) -> bool {
        true
    }

    /// True if the operator does not depend on, or change, the time.
    fn is_time_independent(&self) -> bool {
        false
    }

    /// True if the operator does nothing.
    fn is_identity(&self) -> bool {
        false
    }

    /// Equivalent operator in its simplest form.
    fn simplify(&self) -> Box<dyn Operator> {
        if self.is_identity() {
            return Box::new(IdentityOperator);
        }
        self.boxed_clone()
    }

    /// Apply the operator to every element of a phase-space-time position.
    ///
    /// The result keeps the batch shape and units of the input.
    ///
    /// # Errors
    /// Propagates construction failures of the resulting position.
    fn apply_to(&self, w: &PhaseSpaceTimePosition) -> GalResult<PhaseSpaceTimePosition> {
        let (qp, t): (Vec<_>, Vec<_>) = w
            .q()
            .par_iter()
            .zip(w.p())
            .zip(w.times())
            .map(|((q, p), t)| {
                let (q, p, t) = self.apply_qpt(q, p, t);
                ((q, p), t)
            })
            .with_min_len(1000)
            .unzip();
        let (q, p): (Vec<_>, Vec<_>) = qp.into_iter().unzip();
        let t = Times::PerElement(t).simplify();
        PhaseSpaceTimePosition::with_shape(q, p, t, w.shape(), *w.units())
    }

    /// Apply the operator to a phase-space position without time.
    ///
    /// # Errors
    /// [`Error::ValueError`] if the operator depends on time.
    fn apply_to_static(&self, w: &PhaseSpacePosition) -> GalResult<PhaseSpacePosition> {
        if !self.is_time_independent() {
            return Err(Error::ValueError(format!(
                "Operator {self:?} depends on time, it cannot act on a position without time."
            )));
        }
        let (q, p) = w
            .q()
            .iter()
            .zip(w.p())
            .map(|(q, p)| {
                let (q, p, _) = self.apply_qpt(q, p, 0.0);
                (q, p)
            })
            .unzip();
        PhaseSpacePosition::with_shape(q, p, w.shape(), *w.units())
    }
}

impl Clone for Box<dyn Operator> {
    fn clone(&self) -> Self {
        self.boxed_clone()
    }
}

/// Operator which does nothing.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct IdentityOperator;

impl Operator for IdentityOperator {
    fn apply_qpt(
        &self,
        q: &Vector3<f64>,
        p: &Vector3<f64>,
        t: f64,
    ) -> (Vector3<f64>, Vector3<f64>, f64) {
        (*q, *p, t)
    }

    fn inverse(&self) -> Box<dyn Operator> {
        Box::new(Self)
    }

    fn boxed_clone(&self) -> Box<dyn Operator> {
        Box::new(*self)
    }

    fn is_time_independent(&self) -> bool {
        true
    }

    fn is_identity(&self) -> bool {
        true
    }
}

/// Operators applied one after another, first to last.
#[derive(Debug, Clone, Default)]
pub struct OperatorSequence {
    /// Operators in order of application.
    pub operators: Vec<Box<dyn Operator>>,
}

impl OperatorSequence {
    /// Construct a new sequence.
    #[must_use]
    pub fn new(operators: Vec<Box<dyn Operator>>) -> Self {
        Self { operators }
    }

    /// Append an operator to the end of the sequence.
    #[must_use]
    pub fn then(mut self, operator: impl Operator + 'static) -> Self {
        self.operators.push(Box::new(operator));
        self
    }
}

impl Operator for OperatorSequence {
    fn apply_qpt(
        &self,
        q: &Vector3<f64>,
        p: &Vector3<f64>,
        t: f64,
    ) -> (Vector3<f64>, Vector3<f64>, f64) {
        self.operators
            .iter()
            .fold((*q, *p, t), |(q, p, t), op| op.apply_qpt(&q, &p, t))
    }

    fn inverse(&self) -> Box<dyn Operator> {
        Box::new(Self::new(
            self.operators.iter().rev().map(|op| op.inverse()).collect(),
        ))
    }

    fn boxed_clone(&self) -> Box<dyn Operator> {
        Box::new(self.clone())
    }

    fn is_inertial(&self) -> bool {
        self.operators.iter().all(|op| op.is_inertial())
    }

    fn is_time_independent(&self) -> bool {
        self.operators.iter().all(|op| op.is_time_independent())
    }

    fn is_identity(&self) -> bool {
        self.operators.iter().all(|op| op.is_identity())
    }

    fn simplify(&self) -> Box<dyn Operator> {
        let mut operators: Vec<_> = self
            .operators
            .iter()
            .map(|op| op.simplify())
            .filter(|op| !op.is_identity())
            .collect();
        match operators.len() {
            0 => Box::new(IdentityOperator),
            1 => operators.remove(0),
            _ => Box::new(Self::new(operators)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::units::UnitSystem;

    #[test]
    fn test_identity() {
        let q = Vector3::new(1.0, 2.0, 3.0);
        let p = Vector3::new(4.0, 5.0, 6.0);
        assert_eq!(IdentityOperator.apply_qpt(&q, &p, 1.0), (q, p, 1.0));
        assert!(IdentityOperator.inverse().is_identity());
    }

    #[test]
    fn test_sequence_simplify() {
        let seq = OperatorSequence::default()
            .then(IdentityOperator)
            .then(GalileanSpatialTranslationOperator::new(Vector3::new(1.0, 0.0, 0.0)))
            .then(GalileanSpatialTranslationOperator::new(Vector3::zeros()));
        assert!(!seq.is_identity());
        let simple = seq.simplify();
        let (q, _, _) = simple.apply_qpt(&Vector3::zeros(), &Vector3::zeros(), 0.0);
        assert_eq!(q, Vector3::new(1.0, 0.0, 0.0));
        assert!(format!("{simple:?}").starts_with("GalileanSpatialTranslationOperator"));

        let empty = OperatorSequence::default().then(IdentityOperator).simplify();
        assert!(empty.is_identity());
    }

    #[test]
    fn test_apply_to_positions() {
        let w = PhaseSpaceTimePosition::new(
            vec![Vector3::new(1.0, 0.0, 0.0); 4],
            vec![Vector3::new(0.0, 1.0, 0.0); 4],
            vec![0.0, 1.0, 2.0, 3.0],
            UnitSystem::galactic(),
        )
        .unwrap();
        let boost = GalileanBoostOperator::new(Vector3::new(1.0, 0.0, 0.0));
        let out = boost.apply_to(&w).unwrap();
        assert_eq!(out.shape(), vec![4]);
        assert_eq!(out.q()[3], Vector3::new(4.0, 0.0, 0.0));
        assert_eq!(out.p()[0], Vector3::new(1.0, 1.0, 0.0));
        assert_eq!(out.times(), vec![0.0, 1.0, 2.0, 3.0]);

        let static_w = w.without_time().unwrap();
        assert!(boost.apply_to_static(&static_w).is_err());
        let shift = GalileanSpatialTranslationOperator::new(Vector3::new(0.0, 0.0, 1.0));
        let shifted = shift.apply_to_static(&static_w).unwrap();
        assert_eq!(shifted.q()[0], Vector3::new(1.0, 0.0, 1.0));
    }
}
