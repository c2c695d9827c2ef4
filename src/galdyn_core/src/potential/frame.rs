//! Potentials observed from a transformed frame.
use nalgebra::Vector3;

use super::Potential;
use crate::coordinates::operators::Operator;
use crate::units::UnitSystem;

/// A potential seen through an operator.
///
/// `operator` maps the potential's own frame onto the frame of the inputs, so
/// evaluating at `(q, t)` evaluates the wrapped potential at `operator^-1 (q, t)`.
/// A bar rotating with pattern speed `omega` is a [`PotentialFrame`] over a
/// [`ConstantRotationZOperator`](crate::coordinates::operators::ConstantRotationZOperator)
/// with `omega_z = omega`.
#[derive(Debug)]
pub struct PotentialFrame {
    potential: Box<dyn Potential>,
    operator: Box<dyn Operator>,
    inverse: Box<dyn Operator>,
}

impl PotentialFrame {
    /// Wrap a potential, the operator acts in the potential's units.
    #[must_use]
    pub fn new(potential: impl Potential + 'static, operator: impl Operator + 'static) -> Self {
        let inverse = operator.inverse();
        Self {
            potential: Box::new(potential),
            operator: Box::new(operator),
            inverse,
        }
    }

    /// The wrapped potential.
    #[must_use]
    pub fn potential(&self) -> &dyn Potential {
        self.potential.as_ref()
    }

    /// The operator from the potential's frame to the input frame.
    #[must_use]
    pub fn operator(&self) -> &dyn Operator {
        self.operator.as_ref()
    }
}

impl Potential for PotentialFrame {
    fn units(&self) -> &UnitSystem {
        self.potential.units()
    }

    fn potential_energy(&self, q: &Vector3<f64>, t: f64) -> f64 {
        let (q, t) = self.inverse.apply_qt(q, t);
        self.potential.potential_energy(&q, t)
    }

    fn density(&self, q: &Vector3<f64>, t: f64) -> f64 {
        let (q, t) = self.inverse.apply_qt(q, t);
        self.potential.density(&q, t)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coordinates::operators::{
        ConstantRotationZOperator, GalileanSpatialTranslationOperator, OperatorSequence,
    };
    use crate::potential::{HernquistPotential, LongMuraliBarPotential};

    #[test]
    fn test_translated() {
        let units = UnitSystem::galactic();
        let base = HernquistPotential::new(1e10, 1.0, units);
        let shift = Vector3::new(5.0, 0.0, 0.0);
        let frame = PotentialFrame::new(base, GalileanSpatialTranslationOperator::new(shift));

        let q = Vector3::new(6.0, 1.0, -1.0);
        let expected = base.potential_energy(&(q - shift), 0.0);
        assert!((frame.potential_energy(&q, 0.0) - expected).abs() < 1e-15);

        let grad = frame.gradient(&q, 0.0);
        assert!((grad - base.gradient(&(q - shift), 0.0)).norm() < 1e-9);
    }

    #[test]
    fn test_rotating() {
        let units = UnitSystem::galactic();
        // an off-center clump, so the rotation about z is visible
        let base = HernquistPotential::new(1e10, 1.0, units);
        let shift = Vector3::new(3.0, 0.0, 0.0);
        let omega = 0.05;
        let operator = OperatorSequence::default()
            .then(GalileanSpatialTranslationOperator::new(shift))
            .then(ConstantRotationZOperator::new(omega));
        let frame = PotentialFrame::new(base, operator);

        let q = Vector3::new(4.0, 1.0, 0.5);
        let t = 12.0;
        let (rotated, _) = ConstantRotationZOperator::new(-omega).apply_qt(&q, t);
        let expected = base.potential_energy(&(rotated - shift), t);
        assert!((frame.potential_energy(&q, t) - expected).abs() < 1e-15);
        assert!((frame.density(&q, t) - base.density(&(rotated - shift), t)).abs() < 1e-6);

        let (static_q, _) = ConstantRotationZOperator::new(-omega).apply_qt(&q, 0.0);
        let moved = base.potential_energy(&(static_q - shift), 0.0);
        assert!((moved - expected).abs() > 1e-6);
    }

    #[test]
    fn test_bar_means_of_rotation() {
        let units = UnitSystem::galactic();
        let omega = 0.04;
        let static_bar = LongMuraliBarPotential::new(1e9, 5.0, 0.1, 0.1, 0.0, units);
        let spinning = LongMuraliBarPotential::rotating(1e9, 5.0, 0.1, 0.1, omega, units);
        let framed = PotentialFrame::new(static_bar, ConstantRotationZOperator::new(omega));

        let q = Vector3::new(5.0, 0.0, 0.0);
        for t in [0.0, 55.0, 110.0, 220.0] {
            let expected = spinning.potential_energy(&q, t);
            assert!((framed.potential_energy(&q, t) / expected - 1.0).abs() < 1e-12);
            let acc = spinning.acceleration(&q, t);
            assert!((framed.acceleration(&q, t) - acc).norm() < 1e-6 * acc.norm());
        }
        // half a pattern period later the bar is back along the x axis
        let half_period = std::f64::consts::PI / omega;
        let start = spinning.potential_energy(&q, 0.0);
        assert!((spinning.potential_energy(&q, half_period) / start - 1.0).abs() < 1e-12);
    }
}
