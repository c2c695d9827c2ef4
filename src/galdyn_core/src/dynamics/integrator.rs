//! # Integrators
//!
//! Every integrator advances a single [`State`] through a [`HamiltonianField`] and
//! reports the state at each requested output time.
//!
//! Output times must all lie on one side of the start time and be sorted moving away
//! from it, so integration backward in time is supported.
// BSD 3-Clause License
//
// Copyright (c) 2026, galdyn contributors
//
// Redistribution and use in source and binary forms, with or without
// modification, are permitted provided that the following conditions are met:
//
// 1. Redistributions of source code must retain the above copyright notice, this
//    list of conditions and the following disclaimer.
//
// 2. Redistributions in binary form must reproduce the above copyright notice,
//    this list of conditions and the following disclaimer in the documentation
//    and/or other materials provided with the distribution.
//
// 3. Neither the name of the copyright holder nor the names of its
//    contributors may be used to endorse or promote products derived from
//    this software without specific prior written permission.
//
// THIS SOFTWARE IS PROVIDED BY THE COPYRIGHT HOLDERS AND CONTRIBUTORS "AS IS"
// AND ANY EXPRESS OR IMPLIED WARRANTIES, INCLUDING, BUT NOT LIMITED TO, THE
// IMPLIED WARRANTIES OF MERCHANTABILITY AND FITNESS FOR A PARTICULAR PURPOSE ARE
// DISCLAIMED. IN NO EVENT SHALL THE COPYRIGHT HOLDER OR CONTRIBUTORS BE LIABLE
// FOR ANY DIRECT, INDIRECT, INCIDENTAL, SPECIAL, EXEMPLARY, OR CONSEQUENTIAL
// DAMAGES (INCLUDING, BUT NOT LIMITED TO, PROCUREMENT OF SUBSTITUTE GOODS OR
// SERVICES; LOSS OF USE, DATA, OR PROFITS; OR BUSINESS INTERRUPTION) HOWEVER
// CAUSED AND ON ANY THEORY OF LIABILITY, WHETHER IN CONTRACT, STRICT LIABILITY,
// OR TORT (INCLUDING NEGLIGENCE OR OTHERWISE) ARISING IN ANY WAY OUT OF THE USE
// OF THIS SOFTWARE, EVEN IF ADVISED OF THE POSSIBILITY OF SUCH DAMAGE.

use std::fmt::Debug;

use super::field::{HamiltonianField, State, split_state, to_state};
use crate::errors::{Error, GalResult};

/// Numerical integrator of the equations of motion.
pub trait Integrator: Debug + Send + Sync {
    /// Integrate `y0` from `t0`, returning the state at each of `times`.
    ///
    /// # Errors
    /// [`Error::ValueError`] if the output times are not ordered away from `t0`, or
    /// [`Error::Convergence`] if the integration fails.
    fn integrate(
        &self,
        field: &HamiltonianField<'_>,
        y0: &State,
        t0: f64,
        times: &[f64],
    ) -> GalResult<Vec<State>>;
}

/// Direction of integration, `1.0` forward and `-1.0` backward.
///
/// Output times must be finite, on one side of `t0`, and sorted away from it.
pub(crate) fn integration_direction(t0: f64, times: &[f64]) -> GalResult<f64> {
    if !t0.is_finite() || times.iter().any(|t| !t.is_finite()) {
        return Err(Error::ValueError("Integration times must be finite.".into()));
    }
    let dir = match times.last() {
        Some(t_end) if *t_end < t0 => -1.0,
        _ => 1.0,
    };
    let mut last = t0;
    for t in times {
        if (t - last) * dir < 0.0 {
            return Err(Error::ValueError(format!(
                "Output times must be monotonic and start from {t0}, found {t} after {last}."
            )));
        }
        last = *t;
    }
    Ok(dir)
}

/// Adaptive explicit Runge-Kutta integrator of Dormand & Prince (1980).
///
/// Fifth order steps with an embedded fourth order error estimate. Steps are shortened
/// to land exactly on every output time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DormandPrince {
    rtol: f64,
    atol: f64,
    max_steps: usize,
}

// Butcher tableau.
const C2: f64 = 1.0 / 5.0;
const C3: f64 = 3.0 / 10.0;
const C4: f64 = 4.0 / 5.0;
const C5: f64 = 8.0 / 9.0;

const A21: f64 = 1.0 / 5.0;
const A31: f64 = 3.0 / 40.0;
const A32: f64 = 9.0 / 40.0;
const A41: f64 = 44.0 / 45.0;
const A42: f64 = -56.0 / 15.0;
const A43: f64 = 32.0 / 9.0;
const A51: f64 = 19372.0 / 6561.0;
const A52: f64 = -25360.0 / 2187.0;
const A53: f64 = 64448.0 / 6561.0;
const A54: f64 = -212.0 / 729.0;
const A61: f64 = 9017.0 / 3168.0;
const A62: f64 = -355.0 / 33.0;
const A63: f64 = 46732.0 / 5247.0;
const A64: f64 = 49.0 / 176.0;
const A65: f64 = -5103.0 / 18656.0;
const A71: f64 = 35.0 / 384.0;
const A73: f64 = 500.0 / 1113.0;
const A74: f64 = 125.0 / 192.0;
const A75: f64 = -2187.0 / 6784.0;
const A76: f64 = 11.0 / 84.0;

// Difference between the fifth and fourth order weights.
const E1: f64 = 71.0 / 57600.0;
const E3: f64 = -71.0 / 16695.0;
const E4: f64 = 71.0 / 1920.0;
const E5: f64 = -17253.0 / 339_200.0;
const E6: f64 = 22.0 / 525.0;
const E7: f64 = -1.0 / 40.0;

impl DormandPrince {
    /// Construct a new integrator.
    ///
    /// # Errors
    /// [`Error::ValueError`] if a tolerance is not finite and positive, or `max_steps`
    /// is zero.
    pub fn new(rtol: f64, atol: f64, max_steps: usize) -> GalResult<Self> {
        if !(rtol.is_finite() && rtol > 0.0 && atol.is_finite() && atol > 0.0) {
            return Err(Error::ValueError(
                "Tolerances must be finite and positive.".into(),
            ));
        }
        if max_steps == 0 {
            return Err(Error::ValueError("max_steps must be at least 1.".into()));
        }
        Ok(Self {
            rtol,
            atol,
            max_steps,
        })
    }

    /// Single step, returning the new state and its error estimate.
    fn step(&self, field: &HamiltonianField<'_>, t: f64, y: &State, h: f64) -> (State, State) {
        let k1 = field.derivative(t, y);
        let k2 = field.derivative(t + C2 * h, &(y + h * (A21 * k1)));
        let k3 = field.derivative(t + C3 * h, &(y + h * (A31 * k1 + A32 * k2)));
        let k4 = field.derivative(
            t + C4 * h,
            &(y + h * (A41 * k1 + A42 * k2 + A43 * k3)),
        );
        let k5 = field.derivative(
            t + C5 * h,
            &(y + h * (A51 * k1 + A52 * k2 + A53 * k3 + A54 * k4)),
        );
        let k6 = field.derivative(
            t + h,
            &(y + h * (A61 * k1 + A62 * k2 + A63 * k3 + A64 * k4 + A65 * k5)),
        );
        let y_new = y + h * (A71 * k1 + A73 * k3 + A74 * k4 + A75 * k5 + A76 * k6);
        let k7 = field.derivative(t + h, &y_new);
        let err = h * (E1 * k1 + E3 * k3 + E4 * k4 + E5 * k5 + E6 * k6 + E7 * k7);
        (y_new, err)
    }

    /// RMS of the error scaled by the tolerances, a step is accepted below 1.
    fn error_norm(&self, y: &State, y_new: &State, err: &State) -> f64 {
        let sum: f64 = (0..6)
            .map(|idx| {
                let scale = self.atol + self.rtol * y[idx].abs().max(y_new[idx].abs());
                (err[idx] / scale).powi(2)
            })
            .sum();
        (sum / 6.0).sqrt()
    }
}

impl Default for DormandPrince {
    fn default() -> Self {
        Self {
            rtol: 1e-10,
            atol: 1e-12,
            max_steps: 1_000_000,
        }
    }
}

impl Integrator for DormandPrince {
    fn integrate(
        &self,
        field: &HamiltonianField<'_>,
        y0: &State,
        t0: f64,
        times: &[f64],
    ) -> GalResult<Vec<State>> {
        let dir = integration_direction(t0, times)?;
        let span = times.last().map_or(0.0, |t_end| (t_end - t0).abs());

        let mut t = t0;
        let mut y = *y0;
        let mut h = dir * (0.01 * span).max(f64::EPSILON);
        let mut n_steps = 0;
        let mut n_rejected = 0;
        let mut out = Vec::with_capacity(times.len());

        for &t_out in times {
            while (t_out - t) * dir > 0.0 {
                let clipped = (t + h - t_out) * dir >= 0.0;
                let h_try = if clipped { t_out - t } else { h };

                let (y_new, err) = self.step(field, t, &y, h_try);
                let err_norm = self.error_norm(&y, &y_new, &err);
                n_steps += 1;
                if n_steps > self.max_steps {
                    return Err(Error::Convergence(format!(
                        "Exceeded {} steps before reaching t = {t_out}.",
                        self.max_steps
                    )));
                }
                if !err_norm.is_finite() {
                    return Err(Error::Convergence(format!(
                        "Non-finite state encountered at t = {t}."
                    )));
                }

                let factor = if err_norm == 0.0 {
                    5.0
                } else {
                    (0.9 * err_norm.powf(-0.2)).clamp(0.2, 5.0)
                };
                if err_norm <= 1.0 {
                    t = if clipped { t_out } else { t + h_try };
                    y = y_new;
                    // a clipped step says nothing about the natural step size
                    h = if clipped {
                        dir * h.abs().max((h_try * factor).abs())
                    } else {
                        h_try * factor
                    };
                } else {
                    n_rejected += 1;
                    h = h_try * factor;
                    tracing::debug!("Rejected step at t = {t}, error norm {err_norm:.3e}");
                }

                if h.abs() <= 1e-14 * t.abs().max(1.0) {
                    return Err(Error::Convergence(format!(
                        "Step size became too small at t = {t}."
                    )));
                }
            }
            out.push(y);
        }
        tracing::debug!("Dormand-Prince finished, {n_steps} steps, {n_rejected} rejected");
        Ok(out)
    }
}

/// Fixed step kick-drift-kick leapfrog.
///
/// Symplectic and time reversible, so energy errors stay bounded over long
/// integrations. Each interval between output times is split into the fewest equal
/// steps no longer than `dt`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Leapfrog {
    dt: f64,
}

impl Leapfrog {
    /// Construct a new leapfrog integrator with the maximum step `dt`.
    ///
    /// # Errors
    /// [`Error::ValueError`] if `dt` is not finite and positive.
    pub fn new(dt: f64) -> GalResult<Self> {
        if !(dt.is_finite() && dt > 0.0) {
            return Err(Error::ValueError(
                "Leapfrog step size must be finite and positive.".into(),
            ));
        }
        Ok(Self { dt })
    }

    /// Maximum step size.
    #[must_use]
    pub fn dt(&self) -> f64 {
        self.dt
    }
}

impl Integrator for Leapfrog {
    fn integrate(
        &self,
        field: &HamiltonianField<'_>,
        y0: &State,
        t0: f64,
        times: &[f64],
    ) -> GalResult<Vec<State>> {
        let _ = integration_direction(t0, times)?;
        let (mut q, mut p) = split_state(y0);
        let mut t = t0;
        let mut out = Vec::with_capacity(times.len());

        for &t_out in times {
            let interval = t_out - t;
            let n_steps = (interval.abs() / self.dt).ceil() as usize;
            if n_steps > 0 {
                let h = interval / n_steps as f64;
                let mut acc = field.acceleration(&q, t);
                for idx in 0..n_steps {
                    let t_step = t + h * idx as f64;
                    p += 0.5 * h * acc;
                    q += h * p;
                    acc = field.acceleration(&q, t_step + h);
                    p += 0.5 * h * acc;
                }
            }
            t = t_out;
            out.push(to_state(&q, &p));
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::potential::{KeplerPotential, Potential};
    use crate::units::UnitSystem;
    use nalgebra::Vector3;
    use std::f64::consts::PI;

    /// Isotropic harmonic oscillator with unit frequency.
    #[derive(Debug)]
    struct Harmonic(UnitSystem);

    impl Potential for Harmonic {
        fn units(&self) -> &UnitSystem {
            &self.0
        }

        fn potential_energy(&self, q: &Vector3<f64>, _t: f64) -> f64 {
            0.5 * q.norm_squared()
        }

        fn gradient(&self, q: &Vector3<f64>, _t: f64) -> Vector3<f64> {
            *q
        }
    }

    fn check_harmonic(integrator: &dyn Integrator, tol: f64) {
        let pot = Harmonic(UnitSystem::dimensionless());
        let field = HamiltonianField::new(&pot);
        let y0 = to_state(&Vector3::new(1.0, 0.0, 0.5), &Vector3::new(0.0, 1.0, 0.0));
        let times: Vec<f64> = (1..=20).map(|idx| f64::from(idx) * 0.5).collect();
        let states = integrator.integrate(&field, &y0, 0.0, &times).unwrap();
        for (t, y) in times.iter().zip(&states) {
            let (s, c) = t.sin_cos();
            let expected = State::new(c, s, 0.5 * c, -s, c, -0.5 * s);
            assert!((y - expected).norm() < tol, "{integrator:?} t={t}");
        }

        // backward returns to the start
        let back = integrator
            .integrate(&field, &states[19], 10.0, &[5.0, 0.0])
            .unwrap();
        assert!((back[1] - y0).norm() < tol, "{integrator:?}");
    }

    fn check_kepler_energy(integrator: &dyn Integrator, tol: f64) {
        let pot = KeplerPotential::new(1.0, UnitSystem::dimensionless());
        let field = HamiltonianField::new(&pot);
        let y0 = to_state(&Vector3::new(1.0, 0.0, 0.0), &Vector3::new(0.0, 1.0, 0.0));
        let times: Vec<f64> = (1..=10).map(|idx| f64::from(idx) * 2.0 * PI).collect();
        let states = integrator.integrate(&field, &y0, 0.0, &times).unwrap();
        for y in &states {
            assert!((field.energy(0.0, y) + 0.5).abs() < tol, "{integrator:?}");
        }
        // a full period returns to the start
        assert!((states[0] - y0).norm() < 1e3 * tol, "{integrator:?}");
    }

    #[test]
    fn test_dormand_prince() {
        let dp = DormandPrince::new(1e-12, 1e-12, 100_000).unwrap();
        check_harmonic(&dp, 1e-8);
        check_kepler_energy(&dp, 1e-9);
    }

    #[test]
    fn test_leapfrog() {
        let lf = Leapfrog::new(1e-3).unwrap();
        check_harmonic(&lf, 1e-5);
        check_kepler_energy(&lf, 1e-6);
    }

    #[test]
    fn test_invalid() {
        assert!(DormandPrince::new(-1.0, 1e-10, 10).is_err());
        assert!(DormandPrince::new(1e-10, f64::NAN, 10).is_err());
        assert!(Leapfrog::new(0.0).is_err());
        assert!(integration_direction(0.0, &[1.0, 0.5]).is_err());
        assert!(integration_direction(0.0, &[-1.0, 1.0]).is_err());
        assert_eq!(integration_direction(0.0, &[0.0, -1.0]).unwrap(), -1.0);
        assert_eq!(integration_direction(0.0, &[]).unwrap(), 1.0);
    }

    #[test]
    fn test_max_steps() {
        let pot = KeplerPotential::new(1.0, UnitSystem::dimensionless());
        let field = HamiltonianField::new(&pot);
        let y0 = to_state(&Vector3::new(1.0, 0.0, 0.0), &Vector3::new(0.0, 1.0, 0.0));
        let dp = DormandPrince::new(1e-12, 1e-12, 5).unwrap();
        assert!(dp.integrate(&field, &y0, 0.0, &[100.0]).is_err());
    }
}
