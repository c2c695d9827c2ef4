//! Orbits of test particles.
//!
//! An [`Orbit`] is the phase-space trajectory of one particle, saved at a list of
//! times, in the unit system of the potential it was integrated in.
//!
//! ```
//!     use galdyn_core::prelude::*;
//!     use nalgebra::Vector3;
//!
//!     let units = UnitSystem::dimensionless();
//!     let pot = KeplerPotential::new(1.0, units);
//!     let w0 = PhaseSpaceTimePosition::scalar(
//!         Vector3::new(1.0, 0.0, 0.0),
//!         Vector3::new(0.0, 1.0, 0.0),
//!         0.0,
//!         units,
//!     );
//!     let times: Vec<f64> = (0..=10).map(f64::from).collect();
//!     let orbit = evaluate_orbit(&pot, &w0, &times, &DormandPrince::default()).unwrap();
//!     assert_eq!(orbit.len(), 11);
//!     assert!((orbit.apocenter().unwrap() - 1.0).abs() < 1e-7);
//! ```
use itertools::{Itertools, MinMaxResult};
use nalgebra::Vector3;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use super::field::{HamiltonianField, split_state, to_state};
use super::integrator::Integrator;
use crate::coordinates::{
    AbstractPhaseSpacePositionBase, AbstractPhaseSpaceTimePosition, PhaseSpaceTimePosition,
};
use crate::errors::{Error, GalResult};
use crate::io::FileIO;
use crate::potential::Potential;
use crate::units::{Dimension, UnitSystem};

/// Trajectory of a single particle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "OrbitData")]
pub struct Orbit {
    w: PhaseSpaceTimePosition,
}

impl FileIO for Orbit {}

#[derive(Debug, Deserialize)]
struct OrbitData {
    w: PhaseSpaceTimePosition,
}

impl TryFrom<OrbitData> for Orbit {
    type Error = Error;

    fn try_from(data: OrbitData) -> GalResult<Self> {
        Self::new(data.w)
    }
}

impl Orbit {
    /// Wrap a 1-d batch of states ordered in time.
    ///
    /// # Errors
    /// [`Error::ShapeMismatch`] if the batch is not 1-d.
    pub fn new(w: PhaseSpaceTimePosition) -> GalResult<Self> {
        if w.ndim() != 1 {
            return Err(Error::ShapeMismatch(format!(
                "An orbit must be a 1-d batch of states, got shape {:?}.",
                w.shape()
            )));
        }
        Ok(Self { w })
    }

    /// Saved states.
    #[must_use]
    pub fn w(&self) -> &PhaseSpaceTimePosition {
        &self.w
    }

    /// Saved times.
    #[must_use]
    pub fn times(&self) -> Vec<f64> {
        self.w.times()
    }

    /// Units of the saved states.
    #[must_use]
    pub fn units(&self) -> &UnitSystem {
        self.w.units()
    }

    /// Number of saved states.
    #[must_use]
    pub fn len(&self) -> usize {
        self.w.num_particles()
    }

    /// True if no state was saved.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Specific energy at every saved state, in the units of the potential.
    ///
    /// # Errors
    /// [`Error::UnitError`] if the orbit is not convertible to the potential's units.
    pub fn energy(&self, potential: &dyn Potential) -> GalResult<Vec<f64>> {
        self.w.energy(potential)
    }

    /// Specific angular momentum at every saved state.
    #[must_use]
    pub fn angular_momentum(&self) -> Vec<Vector3<f64>> {
        self.w.angular_momentum()
    }

    fn radial_extent(&self) -> GalResult<(f64, f64)> {
        match self
            .w
            .q()
            .iter()
            .map(|q| q.norm())
            .minmax_by(f64::total_cmp)
        {
            MinMaxResult::NoElements => {
                Err(Error::ValueError("Orbit has no saved states.".into()))
            }
            MinMaxResult::OneElement(r) => Ok((r, r)),
            MinMaxResult::MinMax(r_min, r_max) => Ok((r_min, r_max)),
        }
    }

    /// Smallest saved distance from the origin.
    ///
    /// This is limited by the sampling of the saved times.
    ///
    /// # Errors
    /// [`Error::ValueError`] if the orbit is empty.
    pub fn pericenter(&self) -> GalResult<f64> {
        Ok(self.radial_extent()?.0)
    }

    /// Largest saved distance from the origin.
    ///
    /// # Errors
    /// [`Error::ValueError`] if the orbit is empty.
    pub fn apocenter(&self) -> GalResult<f64> {
        Ok(self.radial_extent()?.1)
    }

    /// Last saved state.
    ///
    /// # Errors
    /// [`Error::ValueError`] if the orbit is empty.
    pub fn final_state(&self) -> GalResult<PhaseSpaceTimePosition> {
        if self.is_empty() {
            return Err(Error::ValueError("Orbit has no saved states.".into()));
        }
        self.w.index(self.len() - 1)
    }

    /// Dense output between the saved states, see [`InterpolatedOrbit`].
    ///
    /// # Errors
    /// Same as [`InterpolatedOrbit::new`].
    pub fn interpolate(&self, potential: &dyn Potential) -> GalResult<InterpolatedOrbit> {
        InterpolatedOrbit::new(self.clone(), potential)
    }

    /// State at time `t`, in the units of the orbit.
    ///
    /// The particle is re-integrated from the saved state closest in time, which is
    /// exact to the integrator's tolerance at any time, including outside of the saved
    /// span. [`Orbit::interpolate`] is cheaper for many evaluations.
    ///
    /// # Errors
    /// [`Error::ValueError`] if the orbit is empty, or any failure of the integrator.
    pub fn state_at(
        &self,
        potential: &dyn Potential,
        integrator: &dyn Integrator,
        t: f64,
    ) -> GalResult<PhaseSpaceTimePosition> {
        let times = self.times();
        let Some(nearest) = times.iter().position_min_by(|a, b| {
            (*a - t).abs().total_cmp(&(*b - t).abs())
        }) else {
            return Err(Error::ValueError("Orbit has no saved states.".into()));
        };
        let start = self.w.index(nearest)?;
        if times[nearest] == t {
            return Ok(start);
        }
        tracing::debug!("Re-integrating orbit from t = {} to t = {t}", times[nearest]);
        let orbit = evaluate_orbit(potential, &start, &[t], integrator)?;
        let state = orbit.w.convert_to(self.units())?;
        let (q, p) = (state.q()[0], state.p()[0]);
        Ok(PhaseSpaceTimePosition::scalar(q, p, t, *self.units()))
    }
}

/// Orbit with dense output between its saved states.
///
/// Positions and velocities are cubic Hermite interpolants of the saved states,
/// whose derivatives are the saved velocities and the accelerations of the potential
/// the orbit was integrated in. Interpolation is limited to the saved time span.
#[derive(Debug, Clone, PartialEq)]
pub struct InterpolatedOrbit {
    orbit: Orbit,
    times: Vec<f64>,
    acc: Vec<Vector3<f64>>,
}

impl InterpolatedOrbit {
    /// Interpolate an orbit integrated in `potential`.
    ///
    /// # Errors
    /// [`Error::ValueError`] if there are fewer than two saved states or the saved
    /// times are not strictly monotonic, [`Error::UnitError`] if the orbit is not in
    /// the units of the potential.
    pub fn new(orbit: Orbit, potential: &dyn Potential) -> GalResult<Self> {
        if orbit.len() < 2 {
            return Err(Error::ValueError(
                "Interpolation needs at least two saved states.".into(),
            ));
        }
        if orbit.units() != potential.units() {
            return Err(Error::UnitError(
                "Orbit must be in the unit system of the potential.".into(),
            ));
        }
        let times = orbit.times();
        let direction = (times[1] - times[0]).signum();
        let not_monotonic = times.windows(2).any(|pair| {
            let step = (pair[1] - pair[0]) * direction;
            step.is_nan() || step <= 0.0
        });
        if not_monotonic {
            return Err(Error::ValueError(
                "Saved times of an interpolated orbit must be strictly monotonic.".into(),
            ));
        }
        let acc = potential.acceleration_batch(orbit.w.q(), &times)?;
        Ok(Self { orbit, times, acc })
    }

    /// The saved orbit.
    #[must_use]
    pub fn orbit(&self) -> &Orbit {
        &self.orbit
    }

    /// Position and velocity at time `t`.
    fn interpolate(&self, t: f64) -> GalResult<(Vector3<f64>, Vector3<f64>)> {
        let Some(idx) = self
            .times
            .windows(2)
            .position(|pair| (t - pair[0]) * (t - pair[1]) <= 0.0)
        else {
            return Err(Error::ExceedsLimits(format!(
                "Time {t} is outside of the interpolated orbit."
            )));
        };
        let (q, p) = (self.orbit.w.q(), self.orbit.w.p());
        let h = self.times[idx + 1] - self.times[idx];
        let s = (t - self.times[idx]) / h;
        let (s2, s3) = (s * s, s * s * s);
        let h00 = 2.0 * s3 - 3.0 * s2 + 1.0;
        let h10 = (s3 - 2.0 * s2 + s) * h;
        let h01 = 3.0 * s2 - 2.0 * s3;
        let h11 = (s3 - s2) * h;

        let q_t = q[idx] * h00 + p[idx] * h10 + q[idx + 1] * h01 + p[idx + 1] * h11;
        let p_t =
            p[idx] * h00 + self.acc[idx] * h10 + p[idx + 1] * h01 + self.acc[idx + 1] * h11;
        Ok((q_t, p_t))
    }

    /// State at time `t`, in the units of the orbit.
    ///
    /// # Errors
    /// [`Error::ExceedsLimits`] if `t` is outside of the saved times.
    pub fn state_at(&self, t: f64) -> GalResult<PhaseSpaceTimePosition> {
        let (q, p) = self.interpolate(t)?;
        Ok(PhaseSpaceTimePosition::scalar(q, p, t, *self.orbit.units()))
    }

    /// Orbit sampled at new times.
    ///
    /// # Errors
    /// [`Error::ExceedsLimits`] if any time is outside of the saved times.
    pub fn evaluate(&self, times: &[f64]) -> GalResult<Orbit> {
        let (q, p): (Vec<_>, Vec<_>) = times
            .iter()
            .map(|t| self.interpolate(*t))
            .collect::<GalResult<Vec<_>>>()?
            .into_iter()
            .unzip();
        Orbit::new(PhaseSpaceTimePosition::new(
            q,
            p,
            times.to_vec(),
            *self.orbit.units(),
        )?)
    }
}

/// Integrate a single particle in a potential.
///
/// `times` are in the units of `w0` and must move monotonically away from the time
/// of `w0`. The orbit is returned in the unit system of the potential.
///
/// # Errors
/// [`Error::ShapeMismatch`] if `w0` holds more than one particle, [`Error::UnitError`]
/// if it cannot be converted into the potential's units, or any integrator failure.
pub fn evaluate_orbit(
    potential: &dyn Potential,
    w0: &PhaseSpaceTimePosition,
    times: &[f64],
    integrator: &dyn Integrator,
) -> GalResult<Orbit> {
    if w0.num_particles() != 1 {
        return Err(Error::ShapeMismatch(format!(
            "Initial conditions must hold exactly one particle, got {}.",
            w0.num_particles()
        )));
    }
    let units = *potential.units();
    let t_scale = w0.units().conversion_factor(Dimension::Time, &units)?;
    let w0 = w0.convert_to(&units)?;
    let times: Vec<f64> = times.iter().map(|t| t * t_scale).collect();

    let field = HamiltonianField::new(potential);
    let y0 = to_state(&w0.q()[0], &w0.p()[0]);
    let states = integrator.integrate(&field, &y0, w0.t_at(0)?, &times)?;
    let (q, p): (Vec<_>, Vec<_>) = states.iter().map(split_state).unzip();

    tracing::info!(
        "Integrated orbit to {} saved times with {integrator:?}",
        times.len()
    );
    Orbit::new(PhaseSpaceTimePosition::new(q, p, times, units)?)
}

/// Integrate every particle of a batch over the same output times, in parallel.
///
/// Each particle starts from its own time. Orbits are returned in flat batch order.
///
/// # Errors
/// Fails on the first particle which fails to integrate.
pub fn evaluate_orbits(
    potential: &dyn Potential,
    w0: &PhaseSpaceTimePosition,
    times: &[f64],
    integrator: &dyn Integrator,
) -> GalResult<Vec<Orbit>> {
    let units = *w0.units();
    (0..w0.num_particles())
        .into_par_iter()
        .map(|idx| {
            let start =
                PhaseSpaceTimePosition::scalar(w0.q()[idx], w0.p()[idx], w0.t_at(idx)?, units);
            evaluate_orbit(potential, &start, times, integrator)
        })
        .collect()
}
