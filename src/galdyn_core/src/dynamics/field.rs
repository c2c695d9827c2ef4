//! Hamiltonian vector field of a potential.
use nalgebra::{SVector, Vector3};

use crate::potential::Potential;
use crate::units::UnitSystem;

/// Phase-space state `[q, p]` as a single vector, as seen by the integrators.
pub type State = SVector<f64, 6>;

/// Pack a position and momentum into a [`State`].
#[inline(always)]
#[must_use]
pub fn to_state(q: &Vector3<f64>, p: &Vector3<f64>) -> State {
    State::new(q.x, q.y, q.z, p.x, p.y, p.z)
}

/// Split a [`State`] into position and momentum.
#[inline(always)]
#[must_use]
pub fn split_state(y: &State) -> (Vector3<f64>, Vector3<f64>) {
    (y.fixed_rows::<3>(0).into_owned(), y.fixed_rows::<3>(3).into_owned())
}

/// Equations of motion in a potential, `dq/dt = p` and `dp/dt = -grad(Phi)`.
#[derive(Debug, Clone, Copy)]
pub struct HamiltonianField<'a> {
    potential: &'a dyn Potential,
}

impl<'a> HamiltonianField<'a> {
    /// Construct the field of a potential.
    #[must_use]
    pub fn new(potential: &'a dyn Potential) -> Self {
        Self { potential }
    }

    /// The potential generating the field.
    #[must_use]
    pub fn potential(&self) -> &'a dyn Potential {
        self.potential
    }

    /// Units of states and times passing through the field.
    #[must_use]
    pub fn units(&self) -> &'a UnitSystem {
        self.potential.units()
    }

    /// Acceleration at a position.
    #[inline(always)]
    #[must_use]
    pub fn acceleration(&self, q: &Vector3<f64>, t: f64) -> Vector3<f64> {
        self.potential.acceleration(q, t)
    }

    /// Time derivative of a state.
    #[must_use]
    pub fn derivative(&self, t: f64, y: &State) -> State {
        let (q, p) = split_state(y);
        to_state(&p, &self.acceleration(&q, t))
    }

    /// Specific energy of a state.
    #[must_use]
    pub fn energy(&self, t: f64, y: &State) -> f64 {
        let (q, p) = split_state(y);
        0.5 * p.norm_squared() + self.potential.potential_energy(&q, t)
    }
}
