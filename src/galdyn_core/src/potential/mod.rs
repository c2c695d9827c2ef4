//! # Potentials
//!
//! Gravitational potentials per unit mass, `Phi(q, t)`.
//!
//! Every potential lives in a [`UnitSystem`], its parameters, inputs and outputs are
//! all expressed in that system. Only [`Potential::potential_energy`] is required,
//! every other quantity has a numerical default which concrete potentials replace
//! with analytic expressions where they exist.
//!
//! ```
//!     use galdyn_core::prelude::*;
//!     use nalgebra::Vector3;
//!
//!     let pot = HernquistPotential::new(1e12, 1.0, UnitSystem::galactic());
//!     let q = Vector3::new(1.0, 2.0, 3.0);
//!     assert!((pot.potential_energy(&q, 0.0) + 0.94871936).abs() < 1e-8);
//!     assert!((pot.gradient(&q, 0.0).x - 0.05347411).abs() < 1e-8);
//! ```
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

mod builtin;
mod composite;
mod frame;
mod param;

use std::f64::consts::PI;
use std::fmt::Debug;

use nalgebra::{Matrix3, Vector3};
use rayon::prelude::*;

pub use self::builtin::{
    HernquistPotential, IsochronePotential, KeplerPotential, LogarithmicPotential,
    LongMuraliBarPotential, MN3ExponentialDiskPotential, MiyamotoNagaiPotential, NFWPotential,
    NullPotential, PlummerPotential,
};
pub use self::composite::{CompositePotential, milky_way_potential, milky_way_potential_2022};
pub use self::frame::PotentialFrame;
pub use self::param::ParameterField;
use crate::errors::{Error, GalResult};
use crate::units::UnitSystem;

/// Finite difference step for a coordinate of the given magnitude.
#[inline(always)]
fn fd_step(x: f64) -> f64 {
    f64::EPSILON.cbrt() * x.abs().max(1.0)
}

/// Gravitational potential per unit mass.
pub trait Potential: Debug + Send + Sync {
    /// Unit system of the parameters, inputs and outputs.
    fn units(&self) -> &UnitSystem;

    /// Potential energy per unit mass at position `q` and time `t`.
    fn potential_energy(&self, q: &Vector3<f64>, t: f64) -> f64;

    /// Gradient of the potential with respect to position.
    ///
    /// Defaults to central finite differences of [`Potential::potential_energy`].
    fn gradient(&self, q: &Vector3<f64>, t: f64) -> Vector3<f64> {
        let mut grad = Vector3::zeros();
        for idx in 0..3 {
            let h = fd_step(q[idx]);
            let mut plus = *q;
            let mut minus = *q;
            plus[idx] += h;
            minus[idx] -= h;
            grad[idx] =
                (self.potential_energy(&plus, t) - self.potential_energy(&minus, t)) / (2.0 * h);
        }
        grad
    }

    /// Hessian of the potential, central finite differences of the gradient.
    fn hessian(&self, q: &Vector3<f64>, t: f64) -> Matrix3<f64> {
        let mut hess = Matrix3::zeros();
        for idx in 0..3 {
            let h = fd_step(q[idx]);
            let mut plus = *q;
            let mut minus = *q;
            plus[idx] += h;
            minus[idx] -= h;
            let column = (self.gradient(&plus, t) - self.gradient(&minus, t)) / (2.0 * h);
            hess.set_column(idx, &column);
        }
        (hess + hess.transpose()) * 0.5
    }

    /// Mass density from Poisson's equation, `laplacian(Phi) / (4 pi G)`.
    fn density(&self, q: &Vector3<f64>, t: f64) -> f64 {
        self.hessian(q, t).trace() / (4.0 * PI * self.units().gravitational_constant())
    }

    /// Acceleration, `-grad(Phi)`.
    fn acceleration(&self, q: &Vector3<f64>, t: f64) -> Vector3<f64> {
        -self.gradient(q, t)
    }

    /// Trace free part of the Hessian.
    fn tidal_tensor(&self, q: &Vector3<f64>, t: f64) -> Matrix3<f64> {
        let hess = self.hessian(q, t);
        hess - Matrix3::identity() * (hess.trace() / 3.0)
    }

    /// Second derivative of the potential along the radial direction.
    ///
    /// # Errors
    /// [`Error::ValueError`] at the origin, where the radial direction is undefined.
    fn d2potential_dr2(&self, q: &Vector3<f64>, t: f64) -> GalResult<f64> {
        let r = q.norm();
        if r == 0.0 {
            return Err(Error::ValueError(
                "The radial direction is undefined at the origin.".into(),
            ));
        }
        let r_hat = q / r;
        Ok(r_hat.dot(&(self.hessian(q, t) * r_hat)))
    }

    /// Speed of a circular orbit through `q`, `sqrt(r dPhi/dr)`.
    ///
    /// Where the radial force is repulsive this is zero.
    fn circular_velocity(&self, q: &Vector3<f64>, t: f64) -> f64 {
        let r = q.norm();
        if r == 0.0 {
            return 0.0;
        }
        let dphi_dr = self.gradient(q, t).dot(q) / r;
        (r * dphi_dr).max(0.0).sqrt()
    }

    /// Potential energy of many positions.
    ///
    /// `t` is empty (time zero), a single time shared by every position, or one
    /// time per position.
    ///
    /// # Errors
    /// [`Error::ShapeMismatch`] if `t` has any other length.
    fn potential_energy_batch(&self, q: &[Vector3<f64>], t: &[f64]) -> GalResult<Vec<f64>> {
        check_batch_times(q.len(), t)?;
        Ok(q.par_iter()
            .enumerate()
            .map(|(idx, q)| self.potential_energy(q, batch_time(t, idx)))
            .with_min_len(1000)
            .collect())
    }

    /// Acceleration at many positions, times broadcast as in
    /// [`Potential::potential_energy_batch`].
    ///
    /// # Errors
    /// [`Error::ShapeMismatch`] if `t` is not broadcastable over `q`.
    fn acceleration_batch(&self, q: &[Vector3<f64>], t: &[f64]) -> GalResult<Vec<Vector3<f64>>> {
        check_batch_times(q.len(), t)?;
        Ok(q.par_iter()
            .enumerate()
            .map(|(idx, q)| self.acceleration(q, batch_time(t, idx)))
            .with_min_len(1000)
            .collect())
    }
}

/// Times must be empty, a single value, or one value per position.
fn check_batch_times(n_positions: usize, t: &[f64]) -> GalResult<()> {
    match t.len() {
        0 | 1 => Ok(()),
        n if n == n_positions => Ok(()),
        n => Err(Error::ShapeMismatch(format!(
            "{n} times cannot be broadcast over {n_positions} positions."
        ))),
    }
}

/// Time of the `idx`-th element of a batch, broadcasting a single time.
#[inline(always)]
fn batch_time(t: &[f64], idx: usize) -> f64 {
    match t {
        [] => 0.0,
        [t] => *t,
        t => t[idx],
    }
}
