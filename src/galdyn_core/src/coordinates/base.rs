//! Capabilities shared by every kind of phase-space position.
//!
//! See [`AbstractPhaseSpacePositionBase`].
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

use std::ops::Range;

use nalgebra::Vector3;

use super::Representation;
use super::shape::num_elements;
use crate::errors::{Error, GalResult};
use crate::units::{Dimension, UnitSystem};

/// Base capability of all phase-space positions.
///
/// A phase-space position is a batch of positions `q` and conjugate momenta `p`.
/// Both are Cartesian 3-vectors stored flat in row-major order over the batch shape,
/// expressed in the unit system returned by [`AbstractPhaseSpacePositionBase::units`].
///
/// Momenta are specific, so `p` is a velocity.
pub trait AbstractPhaseSpacePositionBase: Sized {
    /// Positions, flat over the batch.
    fn q(&self) -> &[Vector3<f64>];

    /// Conjugate momenta at the positions `q`, flat over the batch.
    fn p(&self) -> &[Vector3<f64>];

    /// Batch shape, empty for a single (0-d) phase-space position.
    fn batch_shape(&self) -> &[usize];

    /// Shape of the components, `[3, 3]` for `(q, p)` and `[3, 3, 1]` with time.
    fn component_shape(&self) -> &'static [usize];

    /// Unit system of the stored values.
    fn units(&self) -> &UnitSystem;

    /// Select the `idx`-th entry along the first batch axis, dropping that axis.
    ///
    /// # Errors
    /// [`Error::IndexError`] for 0-d batches or out of bounds indices.
    fn index(&self, idx: usize) -> GalResult<Self>;

    /// Select a range along the first batch axis, keeping that axis.
    ///
    /// # Errors
    /// [`Error::IndexError`] for 0-d batches or out of bounds ranges.
    fn slice(&self, range: Range<usize>) -> GalResult<Self>;

    /// Re-express all values in a different unit system.
    ///
    /// # Errors
    /// [`Error::UnitError`] if the unit systems are not convertible.
    fn convert_to(&self, units: &UnitSystem) -> GalResult<Self>;

    /// Shape of the position and velocity arrays, not including the components.
    fn shape(&self) -> Vec<usize> {
        self.batch_shape().to_vec()
    }

    /// Number of batch dimensions.
    fn ndim(&self) -> usize {
        self.batch_shape().len()
    }

    /// Length of the first batch axis.
    ///
    /// # Errors
    /// [`Error::IndexError`] for 0-d batches, which have no length.
    fn len(&self) -> GalResult<usize> {
        self.batch_shape().first().copied().ok_or_else(|| {
            Error::IndexError("A scalar (0-d) phase-space position has no length.".into())
        })
    }

    /// Total number of phase-space points in the batch.
    fn num_particles(&self) -> usize {
        num_elements(self.batch_shape())
    }

    /// True if the batch contains no phase-space points.
    fn is_empty(&self) -> bool {
        self.num_particles() == 0
    }

    /// Batch shape followed by the total number of components.
    fn full_shape(&self) -> Vec<usize> {
        let mut shape = self.shape();
        shape.push(self.component_shape().iter().sum());
        shape
    }

    /// Phase-space position as rows of `[q, p]` in the requested unit system.
    ///
    /// This does not include the time.
    ///
    /// # Errors
    /// [`Error::UnitError`] if the unit systems are not convertible.
    fn w(&self, units: &UnitSystem) -> GalResult<Vec<[f64; 6]>> {
        let q_scale = self.units().conversion_factor(Dimension::Length, units)?;
        let p_scale = self.units().conversion_factor(Dimension::Speed, units)?;
        Ok(self
            .q()
            .iter()
            .zip(self.p())
            .map(|(q, p)| {
                [
                    q.x * q_scale,
                    q.y * q_scale,
                    q.z * q_scale,
                    p.x * p_scale,
                    p.y * p_scale,
                    p.z * p_scale,
                ]
            })
            .collect())
    }

    /// Specific kinetic energy, `|p|^2 / 2`, in the units of this position.
    fn kinetic_energy(&self) -> Vec<f64> {
        self.p().iter().map(|p| 0.5 * p.norm_squared()).collect()
    }

    /// Specific angular momentum, `q x p`, in the units of this position.
    ///
    /// ```
    ///     use galdyn_core::prelude::*;
    ///     use nalgebra::Vector3;
    ///
    ///     let w = PhaseSpacePosition::scalar(
    ///         Vector3::new(1.0, 0.0, 0.0),
    ///         Vector3::new(0.0, 2.0, 0.0),
    ///         UnitSystem::solar_system(),
    ///     );
    ///     assert_eq!(w.angular_momentum(), vec![Vector3::new(0.0, 0.0, 2.0)]);
    /// ```
    fn angular_momentum(&self) -> Vec<Vector3<f64>> {
        self.q()
            .iter()
            .zip(self.p())
            .map(|(q, p)| q.cross(p))
            .collect()
    }

    /// Positions and differentials converted into the requested representation.
    fn represent_as(&self, repr: Representation) -> (Vec<Vector3<f64>>, Vec<Vector3<f64>>) {
        self.q()
            .iter()
            .zip(self.p())
            .map(|(q, p)| repr.from_cartesian(q, p))
            .unzip()
    }
}
