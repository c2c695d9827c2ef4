//! # Picard-Chebyshev Integrator
//!
//! The solution over a segment is represented by a Chebyshev series, and Picard
//! iteration refines the series until it stops changing. Each converged segment
//! is a smooth fit, so output times inside it are sampled from the series.
//!
//! The construction of the integration matrices follows
//! "Surfing Chaotic Perturbations in Interplanetary Multi-Flyby Trajectories:
//! Augmented Picard-Chebyshev Integration for Parallel and GPU Computing
//! Architectures", 2022, `<https://doi.org/10.2514/6.2022-1275>`, with the `A`
//! matrix corrected against Darin Koblick, "Parallel High-Precision Orbit Propagation
//! Using The Modified Picard-Chebyshev Method", 2012.
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

use std::f64::consts::PI;
use std::sync::LazyLock;

use nalgebra::{SMatrix, SVector};

use super::field::{HamiltonianField, State};
use super::integrator::{Integrator, integration_direction};
use crate::errors::{Error, GalResult};

/// Maximum number of Picard iterations on a single segment.
const MAX_ITERATIONS: usize = 30;

/// Pre-computed matrices of an `N` node Picard-Chebyshev fit, `NM1 = N - 1`.
#[derive(Debug, Clone)]
pub struct PicardCoefficients<const N: usize, const NM1: usize> {
    /// Chebyshev polynomials evaluated at the nodes.
    c: SMatrix<f64, N, N>,

    /// Integration matrix, derivative samples to series coefficients.
    a: SMatrix<f64, N, NM1>,

    /// Boundary term which pins the series to the initial state.
    sa: SVector<f64, N>,

    /// Chebyshev-Gauss-Lobatto nodes on `[-1, 1]`.
    tau: [f64; N],
}

impl<const N: usize, const NM1: usize> Default for PicardCoefficients<N, NM1> {
    fn default() -> Self {
        // NM1 cannot be derived from N on stable rust, so check it at compile time.
        const { assert!(N - 1 == NM1, "NM1 must be 1 less than N.") };

        // cos(k * arccos(-cos(j pi / (n - 1)))), the k-th polynomial at the j-th node
        fn cheb_t(k: f64, j: f64, n: f64) -> f64 {
            (k * (j + n - 1.0) * PI / (n - 1.0)).cos()
        }

        let n = N as f64;

        let mut c = SMatrix::<f64, N, N>::zeros();
        // T_0 carries the usual factor of one half
        c.fill_column(0, 0.5);
        for j in 0..N {
            for k in 1..N {
                c[(j, k)] = cheb_t(k as f64, j as f64, n);
            }
        }

        let mut a = SMatrix::<f64, NM1, N>::zeros();
        for k in 0..N - 2 {
            for j in 0..N {
                a[(k, j)] = (cheb_t(k as f64, j as f64, n) - cheb_t((k + 2) as f64, j as f64, n))
                    / (((N - 1) * (k + 1)) as f64);
            }
        }
        for j in 0..N {
            a[(N - 2, j)] = cheb_t(n - 2.0, j as f64, n) / ((N - 1).pow(2) as f64);
        }
        a[(N - 2, 0)] /= 2.0;
        a[(N - 2, N - 1)] /= 2.0;

        let s: SVector<f64, NM1> =
            SVector::from_iterator((0..NM1).map(|idx| 2.0 * (-1_f64).powi(idx as i32)));
        let sa: SVector<f64, N> = a.transpose() * s;

        let mut tau = [0.0; N];
        tau.iter_mut()
            .enumerate()
            .for_each(|(j, x)| *x = -(j as f64 * PI / (n - 1.0)).cos());

        Self {
            a: a.transpose(),
            sa,
            c: c.transpose(),
            tau,
        }
    }
}

impl<const N: usize, const NM1: usize> PicardCoefficients<N, NM1> {
    /// Times at which the field is evaluated on the segment `[t0, t1]`.
    pub fn sample_points(&self, t0: f64, t1: f64) -> [f64; N] {
        let w2 = (t1 - t0) / 2.0;
        let w1 = (t1 + t0) / 2.0;
        let mut times = self.tau;
        times.iter_mut().for_each(|x| *x = w2 * (*x) + w1);
        times
    }

    /// Fit the segment `[t0, t1]` starting from `y0`.
    ///
    /// `guess` holds the initial estimate of the state at each sample point.
    ///
    /// # Errors
    /// [`Error::Convergence`] if the iteration does not settle below `tol` relative to
    /// the scale of the state, or the series is not resolved with `N` nodes.
    pub fn step(
        &self,
        field: &HamiltonianField<'_>,
        t0: f64,
        t1: f64,
        y0: &State,
        mut guess: SMatrix<f64, 6, N>,
        tol: f64,
    ) -> GalResult<PicardStep<N>> {
        let times = self.sample_points(t0, t1);
        let w2 = (t1 - t0) / 2.0;
        let scale = y0.amax().max(1.0);

        let mut b: SMatrix<f64, 6, N> = SMatrix::zeros();
        let mut f: SMatrix<f64, 6, N> = SMatrix::zeros();
        let mut last_error = f64::INFINITY;
        for iteration in 0..MAX_ITERATIONS {
            for ((&time, y), mut f_col) in times
                .iter()
                .zip(guess.column_iter())
                .zip(f.column_iter_mut())
            {
                f_col.copy_from(&(w2 * field.derivative(time, &y.into_owned())));
            }

            b.set_column(0, &(f * self.sa + 2.0 * *y0));
            b.fixed_view_mut::<6, NM1>(0, 1).copy_from(&(f * self.a));

            let next = b * self.c;
            let error = (next - guess).amax() / scale;
            guess = next;

            if !error.is_finite() || (iteration > 5 && error > last_error) {
                return Err(Error::Convergence(format!(
                    "Picard iteration diverging, error = {error:.3e}"
                )));
            }
            if error < tol {
                // the highest order terms bound the truncation error of the fit
                let tail = b.column(N - 1).amax().max(b.column(N - 2).amax()) / scale;
                if tail > 1e3 * tol {
                    return Err(Error::Convergence(format!(
                        "Segment not resolved, Chebyshev tail = {tail:.3e}"
                    )));
                }
                return Ok(PicardStep {
                    b,
                    y: guess,
                    t0,
                    t1,
                });
            }
            last_error = error;
        }
        Err(Error::Convergence(format!(
            "Picard iteration did not converge in {MAX_ITERATIONS} iterations."
        )))
    }
}

/// `PicardCoefficients` for a 14th order fit.
pub static PC15: LazyLock<PicardCoefficients<15, 14>> =
    LazyLock::new(PicardCoefficients::default);

/// A converged segment of the Picard-Chebyshev integrator.
#[derive(Debug, Clone)]
pub struct PicardStep<const N: usize> {
    /// Chebyshev series coefficients of each state component.
    b: SMatrix<f64, 6, N>,

    /// State at each sample point.
    pub y: SMatrix<f64, 6, N>,

    /// Start of the segment.
    pub t0: f64,

    /// End of the segment.
    pub t1: f64,
}

impl<const N: usize> PicardStep<N> {
    /// State at the end of the segment.
    #[must_use]
    pub fn final_state(&self) -> State {
        self.y.column(N - 1).into_owned()
    }

    /// Evaluate the fitted solution at `t`.
    ///
    /// # Errors
    /// [`Error::ExceedsLimits`] if `t` is outside of the segment.
    pub fn evaluate(&self, t: f64) -> GalResult<State> {
        let w1 = (self.t0 + self.t1) * 0.5;
        let w2 = (self.t1 - self.t0) * 0.5;
        let tau = (t - w1) / w2;
        if !(-1.0 - 1e-12..=1.0 + 1e-12).contains(&tau) {
            return Err(Error::ExceedsLimits(format!(
                "Time {t} is outside of the fitted segment [{}, {}].",
                self.t0, self.t1
            )));
        }
        let tau = tau.clamp(-1.0, 1.0);

        // Clenshaw recurrence
        let mut b_k1 = State::zeros();
        let mut b_k2 = State::zeros();
        for k in (1..N).rev() {
            let b_k = self.b.column(k) + 2.0 * tau * b_k1 - b_k2;
            b_k2 = b_k1;
            b_k1 = b_k;
        }
        Ok(0.5 * self.b.column(0) + tau * b_k1 - b_k2)
    }
}

/// Picard-Chebyshev integrator with a 15 node fit per segment.
///
/// Segments grow after each success and shrink after each failure.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PicardChebyshev {
    tol: f64,
}

impl PicardChebyshev {
    /// Construct a new integrator, `tol` is relative to the scale of the state.
    ///
    /// # Errors
    /// [`Error::ValueError`] if `tol` is not finite and positive.
    pub fn new(tol: f64) -> GalResult<Self> {
        if !(tol.is_finite() && tol > 0.0) {
            return Err(Error::ValueError(
                "Picard tolerance must be finite and positive.".into(),
            ));
        }
        Ok(Self { tol })
    }
}

impl Integrator for PicardChebyshev {
    fn integrate(
        &self,
        field: &HamiltonianField<'_>,
        y0: &State,
        t0: f64,
        times: &[f64],
    ) -> GalResult<Vec<State>> {
        let dir = integration_direction(t0, times)?;
        let Some(&t_end) = times.last() else {
            return Ok(Vec::new());
        };
        let coefficients = &*PC15;

        let mut out = Vec::with_capacity(times.len());
        let mut next_out = times.iter().take_while(|t| **t == t0).count();
        out.extend(std::iter::repeat_n(*y0, next_out));

        let mut t = t0;
        let mut y = *y0;
        let mut h = t_end - t0;
        let mut n_segments = 0;
        while next_out < times.len() {
            let t1 = if (t + h - t_end) * dir > 0.0 { t_end } else { t + h };
            let guess = SMatrix::<f64, 6, 15>::from_columns(&[y; 15]);
            match coefficients.step(field, t, t1, &y, guess, self.tol) {
                Ok(step) => {
                    let n_inside = times[next_out..]
                        .iter()
                        .take_while(|t_out| (*t_out - t1) * dir <= 0.0)
                        .count();
                    let samples: Vec<_> = times[next_out..next_out + n_inside]
                        .iter()
                        .map(|t_out| {
                            if *t_out == t1 {
                                Ok(step.final_state())
                            } else {
                                step.evaluate(*t_out)
                            }
                        })
                        .collect::<GalResult<_>>()?;
                    out.extend(samples);
                    next_out += n_inside;
                    y = step.final_state();
                    t = t1;
                    h *= 1.3;
                    n_segments += 1;
                }
                Err(error) => {
                    tracing::debug!("Picard segment [{t}, {t1}] failed: {error}");
                    h *= 0.75;
                }
            }
            if h.abs() <= 1e-12 * t.abs().max(1.0) {
                return Err(Error::Convergence(
                    "Failed to converge, segment length became too small.".into(),
                ));
            }
        }
        tracing::debug!("Picard-Chebyshev finished in {n_segments} segments");
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dynamics::field::to_state;
    use crate::potential::{KeplerPotential, Potential};
    use crate::units::UnitSystem;
    use nalgebra::Vector3;

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

    #[test]
    fn test_nodes() {
        let pc = &*PC15;
        let times = pc.sample_points(2.0, 4.0);
        assert!((times[0] - 2.0).abs() < 1e-15);
        assert!((times[14] - 4.0).abs() < 1e-15);
        assert!((times[7] - 3.0).abs() < 1e-15);
    }

    #[test]
    fn test_harmonic() {
        let pot = Harmonic(UnitSystem::dimensionless());
        let field = HamiltonianField::new(&pot);
        let y0 = to_state(&Vector3::new(1.0, 0.0, 0.0), &Vector3::new(0.0, 1.0, 0.0));
        let times: Vec<f64> = (0..=40).map(|idx| f64::from(idx) * 0.25).collect();
        let integrator = PicardChebyshev::new(1e-13).unwrap();
        let states = integrator.integrate(&field, &y0, 0.0, &times).unwrap();
        assert_eq!(states.len(), times.len());
        assert_eq!(states[0], y0);
        for (t, y) in times.iter().zip(&states) {
            let (s, c) = t.sin_cos();
            let expected = State::new(c, s, 0.0, -s, c, 0.0);
            assert!((y - expected).norm() < 1e-9, "t={t} {}", (y - expected).norm());
        }
    }

    #[test]
    fn test_kepler_backward() {
        let pot = KeplerPotential::new(1.0, UnitSystem::dimensionless());
        let field = HamiltonianField::new(&pot);
        let y0 = to_state(&Vector3::new(1.0, 0.0, 0.0), &Vector3::new(0.0, 1.0, 0.0));
        let integrator = PicardChebyshev::new(1e-13).unwrap();
        let states = integrator
            .integrate(&field, &y0, 0.0, &[-PI])
            .unwrap();
        // half a circular orbit backward
        let expected = to_state(&Vector3::new(-1.0, 0.0, 0.0), &Vector3::new(0.0, -1.0, 0.0));
        assert!((states[0] - expected).norm() < 1e-9);
        assert!((field.energy(0.0, &states[0]) + 0.5).abs() < 1e-11);
    }

    #[test]
    fn test_segment_limits() {
        let pot = Harmonic(UnitSystem::dimensionless());
        let field = HamiltonianField::new(&pot);
        let y0 = to_state(&Vector3::new(1.0, 0.0, 0.0), &Vector3::zeros());
        let guess = SMatrix::<f64, 6, 15>::from_columns(&[y0; 15]);
        let step = PC15.step(&field, 0.0, 1.0, &y0, guess, 1e-13).unwrap();
        assert!((step.evaluate(0.0).unwrap() - y0).norm() < 1e-13);
        assert!((step.evaluate(1.0).unwrap() - step.final_state()).norm() < 1e-12);
        assert!(step.evaluate(1.5).is_err());
        assert!(PicardChebyshev::new(0.0).is_err());
    }
}
