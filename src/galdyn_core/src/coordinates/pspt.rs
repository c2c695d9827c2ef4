//! Phase-space positions carrying an explicit time.
//!
//! Time is either one value broadcast over the whole batch, or one value per batch
//! element, see [`Times`].
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
use serde::{Deserialize, Serialize};

use super::shape::{check_len, index_first_axis, slice_first_axis};
use super::{AbstractPhaseSpacePositionBase, PhaseSpacePosition};
use crate::errors::{Error, GalResult};
use crate::io::FileIO;
use crate::potential::Potential;
use crate::units::{Dimension, UnitSystem};

/// Time coordinate of a batch of phase-space positions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Times {
    /// One time shared by every element of the batch.
    Scalar(f64),

    /// One time per element, flat in the same order as the positions.
    PerElement(Vec<f64>),
}

impl Times {
    /// Time of the flat element `idx`.
    ///
    /// A scalar time is returned for any index.
    ///
    /// # Errors
    /// [`Error::IndexError`] if per-element times are stored and `idx` is out of bounds.
    pub fn at(&self, idx: usize) -> GalResult<f64> {
        match self {
            Self::Scalar(t) => Ok(*t),
            Self::PerElement(t) => t.get(idx).copied().ok_or_else(|| {
                Error::IndexError(format!(
                    "Time index {idx} is out of bounds for {} times.",
                    t.len()
                ))
            }),
        }
    }

    /// Apply a function to every stored time.
    #[must_use]
    pub fn map(&self, func: impl Fn(f64) -> f64) -> Self {
        match self {
            Self::Scalar(t) => Self::Scalar(func(*t)),
            Self::PerElement(t) => Self::PerElement(t.iter().map(|x| func(*x)).collect()),
        }
    }

    /// Times of a flat range of elements.
    fn select(&self, range: Range<usize>) -> Self {
        match self {
            Self::Scalar(t) => Self::Scalar(*t),
            Self::PerElement(t) => Self::PerElement(t[range].to_vec()),
        }
    }

    /// Collapse per-element times into a scalar when they are all identical.
    #[must_use]
    pub fn simplify(self) -> Self {
        match self {
            Self::PerElement(t) if !t.is_empty() && t.iter().all(|x| *x == t[0]) => {
                Self::Scalar(t[0])
            }
            other => other,
        }
    }
}

impl From<f64> for Times {
    fn from(t: f64) -> Self {
        Self::Scalar(t)
    }
}

impl From<Vec<f64>> for Times {
    fn from(t: Vec<f64>) -> Self {
        Self::PerElement(t)
    }
}

/// Phase-space position with an explicit time coordinate.
pub trait AbstractPhaseSpaceTimePosition: AbstractPhaseSpacePositionBase {
    /// Time coordinate.
    fn t(&self) -> &Times;

    /// Time of the flat element `idx`, broadcasting a scalar time.
    ///
    /// # Errors
    /// [`Error::IndexError`] if `idx` is past the end of the batch.
    fn t_at(&self, idx: usize) -> GalResult<f64> {
        let n = self.num_particles();
        if idx >= n {
            return Err(Error::IndexError(format!(
                "Index {idx} is out of bounds for {n} elements."
            )));
        }
        self.t().at(idx)
    }

    /// Time of every element, flat over the batch.
    fn times(&self) -> Vec<f64> {
        match self.t() {
            Times::Scalar(t) => vec![*t; self.num_particles()],
            Times::PerElement(t) => t.clone(),
        }
    }

    /// Phase-space-time position as rows of `[t, q, p]` in the requested unit system.
    ///
    /// # Errors
    /// [`Error::UnitError`] if the unit systems are not convertible.
    fn wt(&self, units: &UnitSystem) -> GalResult<Vec<[f64; 7]>> {
        let t_scale = self.units().conversion_factor(Dimension::Time, units)?;
        let w = self.w(units)?;
        Ok(w.iter()
            .zip(self.times())
            .map(|(row, t)| {
                let mut out = [0.0; 7];
                out[0] = t * t_scale;
                out[1..].copy_from_slice(row);
                out
            })
            .collect())
    }

    /// Specific potential energy at each element's own time, in the units of the
    /// potential.
    ///
    /// # Errors
    /// [`Error::UnitError`] if the position cannot be converted into the potential's
    /// unit system.
    fn potential_energy(&self, potential: &dyn Potential) -> GalResult<Vec<f64>> {
        let w = self.convert_to(potential.units())?;
        potential.potential_energy_batch(w.q(), &w.times())
    }

    /// Specific total energy, in the units of the potential.
    ///
    /// # Errors
    /// [`Error::UnitError`] if the position cannot be converted into the potential's
    /// unit system.
    fn energy(&self, potential: &dyn Potential) -> GalResult<Vec<f64>> {
        let w = self.convert_to(potential.units())?;
        let pe = potential.potential_energy_batch(w.q(), &w.times())?;
        Ok(w.kinetic_energy()
            .into_iter()
            .zip(pe)
            .map(|(k, p)| k + p)
            .collect())
    }

    /// Drop the time coordinate.
    ///
    /// # Errors
    /// Propagates construction failures of the time-less position.
    fn without_time(&self) -> GalResult<PhaseSpacePosition> {
        PhaseSpacePosition::with_shape(
            self.q().to_vec(),
            self.p().to_vec(),
            self.shape(),
            *self.units(),
        )
    }
}

/// Concrete phase-space position with time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "PhaseSpaceTimePositionData")]
pub struct PhaseSpaceTimePosition {
    /// Cartesian positions.
    q: Vec<Vector3<f64>>,

    /// Cartesian velocities.
    p: Vec<Vector3<f64>>,

    /// Time coordinate.
    t: Times,

    /// Batch shape.
    shape: Vec<usize>,

    /// Units of `q`, `p` and `t`.
    units: UnitSystem,
}

impl FileIO for PhaseSpaceTimePosition {}

/// Stored layout of [`PhaseSpaceTimePosition`], checked on load.
#[derive(Debug, Deserialize)]
struct PhaseSpaceTimePositionData {
    q: Vec<Vector3<f64>>,
    p: Vec<Vector3<f64>>,
    t: Times,
    shape: Vec<usize>,
    units: UnitSystem,
}

impl TryFrom<PhaseSpaceTimePositionData> for PhaseSpaceTimePosition {
    type Error = Error;

    fn try_from(data: PhaseSpaceTimePositionData) -> GalResult<Self> {
        Self::with_shape(data.q, data.p, data.t, data.shape, data.units)
    }
}

impl PhaseSpaceTimePosition {
    /// Construct a 1-d batch of phase-space-time positions.
    ///
    /// ```
    ///     use galdyn_core::prelude::*;
    ///     use nalgebra::Vector3;
    ///
    ///     let w = PhaseSpaceTimePosition::new(
    ///         vec![Vector3::new(8.0, 0.0, 0.0); 2],
    ///         vec![Vector3::new(0.0, 0.22, 0.0); 2],
    ///         vec![0.0, 10.0],
    ///         UnitSystem::galactic(),
    ///     ).unwrap();
    ///     assert_eq!(w.full_shape(), vec![2, 7]);
    ///     assert_eq!(w.index(1).unwrap().t_at(0).unwrap(), 10.0);
    /// ```
    ///
    /// # Errors
    /// [`Error::ShapeMismatch`] if `q`, `p` and per-element `t` have different lengths.
    pub fn new(
        q: Vec<Vector3<f64>>,
        p: Vec<Vector3<f64>>,
        t: impl Into<Times>,
        units: UnitSystem,
    ) -> GalResult<Self> {
        let shape = vec![q.len()];
        Self::with_shape(q, p, t, shape, units)
    }

    /// Construct a single (0-d) phase-space-time position.
    #[must_use]
    pub fn scalar(q: Vector3<f64>, p: Vector3<f64>, t: f64, units: UnitSystem) -> Self {
        Self {
            q: vec![q],
            p: vec![p],
            t: Times::Scalar(t),
            shape: Vec::new(),
            units,
        }
    }

    /// Construct a batch with an arbitrary batch shape from flat row-major storage.
    ///
    /// # Errors
    /// [`Error::ShapeMismatch`] if the storage does not match the shape.
    pub fn with_shape(
        q: Vec<Vector3<f64>>,
        p: Vec<Vector3<f64>>,
        t: impl Into<Times>,
        shape: Vec<usize>,
        units: UnitSystem,
    ) -> GalResult<Self> {
        let t = t.into();
        if q.len() != p.len() {
            return Err(Error::ShapeMismatch(format!(
                "Positions ({}) and momenta ({}) must have the same length.",
                q.len(),
                p.len()
            )));
        }
        if let Times::PerElement(times) = &t {
            if times.len() != q.len() {
                return Err(Error::ShapeMismatch(format!(
                    "Times ({}) must match the number of positions ({}).",
                    times.len(),
                    q.len()
                )));
            }
        }
        check_len(&shape, q.len())?;
        Ok(Self {
            q,
            p,
            t,
            shape,
            units,
        })
    }

    /// Combine single phase-space-time positions which share a time into a 1-d batch.
    ///
    /// # Errors
    /// [`Error::ValueError`] if the list is empty, any item is not a single position,
    /// or the items disagree on time or units.
    pub fn new_simultaneous(items: Vec<Self>) -> GalResult<Self> {
        let Some(first) = items.first() else {
            return Err(Error::ValueError(
                "Simultaneous positions must contain at least one item.".into(),
            ));
        };
        let t = first.t_at(0)?;
        let units = first.units;

        let mut q = Vec::with_capacity(items.len());
        let mut p = Vec::with_capacity(items.len());
        for item in &items {
            if !item.shape.is_empty() {
                return Err(Error::ValueError(
                    "Simultaneous positions must each be a single (0-d) position.".into(),
                ));
            }
            if item.t_at(0)? != t {
                return Err(Error::ValueError(
                    "All positions must be at the same time.".into(),
                ));
            }
            if item.units != units {
                return Err(Error::ValueError(
                    "All positions must share the same unit system.".into(),
                ));
            }
            q.push(item.q[0]);
            p.push(item.p[0]);
        }
        Self::new(q, p, t, units)
    }
}

impl AbstractPhaseSpacePositionBase for PhaseSpaceTimePosition {
    fn q(&self) -> &[Vector3<f64>] {
        &self.q
    }

    fn p(&self) -> &[Vector3<f64>] {
        &self.p
    }

    fn batch_shape(&self) -> &[usize] {
        &self.shape
    }

    fn component_shape(&self) -> &'static [usize] {
        &[3, 3, 1]
    }

    fn units(&self) -> &UnitSystem {
        &self.units
    }

    fn index(&self, idx: usize) -> GalResult<Self> {
        let (range, shape) = index_first_axis(&self.shape, idx)?;
        Ok(Self {
            q: self.q[range.clone()].to_vec(),
            p: self.p[range.clone()].to_vec(),
            t: self.t.select(range),
            shape,
            units: self.units,
        })
    }

    fn slice(&self, range: Range<usize>) -> GalResult<Self> {
        let (range, shape) = slice_first_axis(&self.shape, range)?;
        Ok(Self {
            q: self.q[range.clone()].to_vec(),
            p: self.p[range.clone()].to_vec(),
            t: self.t.select(range),
            shape,
            units: self.units,
        })
    }

    fn convert_to(&self, units: &UnitSystem) -> GalResult<Self> {
        let q_scale = self.units.conversion_factor(Dimension::Length, units)?;
        let p_scale = self.units.conversion_factor(Dimension::Speed, units)?;
        let t_scale = self.units.conversion_factor(Dimension::Time, units)?;
        Ok(Self {
            q: self.q.iter().map(|q| q * q_scale).collect(),
            p: self.p.iter().map(|p| p * p_scale).collect(),
            t: self.t.map(|t| t * t_scale),
            shape: self.shape.clone(),
            units: *units,
        })
    }
}

impl AbstractPhaseSpaceTimePosition for PhaseSpaceTimePosition {
    fn t(&self) -> &Times {
        &self.t
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::potential::{HernquistPotential, KeplerPotential};

    fn batch() -> PhaseSpaceTimePosition {
        PhaseSpaceTimePosition::with_shape(
            (0..6).map(|i| Vector3::new(f64::from(i) + 1.0, 0.0, 0.0)).collect(),
            vec![Vector3::new(0.0, 1.0, 0.0); 6],
            (0..6).map(f64::from).collect::<Vec<_>>(),
            vec![2, 3],
            UnitSystem::galactic(),
        )
        .unwrap()
    }

    #[test]
    fn test_shapes_and_time_indexing() {
        let w = batch();
        assert_eq!(w.full_shape(), vec![2, 3, 7]);
        assert_eq!(w.len().unwrap(), 2);

        let row = w.index(1).unwrap();
        assert_eq!(row.shape(), vec![3]);
        assert_eq!(row.times(), vec![3.0, 4.0, 5.0]);

        let single = row.index(2).unwrap();
        assert_eq!(single.full_shape(), vec![7]);
        assert_eq!(single.t_at(0).unwrap(), 5.0);
        assert_eq!(single.q()[0].x, 6.0);

        let sliced = w.slice(0..1).unwrap();
        assert_eq!(sliced.shape(), vec![1, 3]);
        assert_eq!(sliced.times(), vec![0.0, 1.0, 2.0]);
    }

    #[test]
    fn test_scalar_time_broadcast() {
        let w = PhaseSpaceTimePosition::new(
            vec![Vector3::new(1.0, 0.0, 0.0); 3],
            vec![Vector3::zeros(); 3],
            7.0,
            UnitSystem::galactic(),
        )
        .unwrap();
        assert_eq!(w.times(), vec![7.0; 3]);
        assert_eq!(w.index(2).unwrap().t(), &Times::Scalar(7.0));
        assert!(
            PhaseSpaceTimePosition::new(
                vec![Vector3::zeros(); 3],
                vec![Vector3::zeros(); 3],
                vec![1.0, 2.0],
                UnitSystem::galactic(),
            )
            .is_err()
        );
    }

    #[test]
    fn test_wt() {
        let w = PhaseSpaceTimePosition::scalar(
            Vector3::new(1.0, 2.0, 3.0),
            Vector3::new(0.1, 0.2, 0.3),
            1.0,
            UnitSystem::galactic(),
        );
        let rows = w.wt(&UnitSystem::galactic()).unwrap();
        assert_eq!(rows[0], [1.0, 1.0, 2.0, 3.0, 0.1, 0.2, 0.3]);

        let ss = w.wt(&UnitSystem::solar_system()).unwrap();
        assert!((ss[0][0] - 1e6).abs() < 1e-6);
    }

    #[test]
    fn test_energy() {
        let pot = KeplerPotential::new(1.0, UnitSystem::dimensionless());
        let w = PhaseSpaceTimePosition::scalar(
            Vector3::new(2.0, 0.0, 0.0),
            Vector3::new(0.0, 1.0, 0.0),
            0.0,
            UnitSystem::dimensionless(),
        );
        assert!((w.potential_energy(&pot).unwrap()[0] + 0.5).abs() < 1e-14);
        assert!(w.energy(&pot).unwrap()[0].abs() < 1e-14);

        // units of the position are converted into those of the potential
        let hernquist = HernquistPotential::new(1e12, 1.0, UnitSystem::galactic());
        let w = PhaseSpaceTimePosition::scalar(
            Vector3::new(1.0, 2.0, 3.0),
            Vector3::zeros(),
            0.0,
            UnitSystem::galactic(),
        );
        let w_ss = w.convert_to(&UnitSystem::solar_system()).unwrap();
        let pe = w_ss.potential_energy(&hernquist).unwrap()[0];
        assert!((pe + 0.94871936).abs() < 1e-7);
    }

    #[test]
    fn test_without_time_and_simultaneous() {
        let w = batch();
        let no_time = w.without_time().unwrap();
        assert_eq!(no_time.full_shape(), vec![2, 3, 6]);

        let items: Vec<_> = (0..4)
            .map(|i| {
                PhaseSpaceTimePosition::scalar(
                    Vector3::new(f64::from(i), 0.0, 0.0),
                    Vector3::zeros(),
                    2.0,
                    UnitSystem::galactic(),
                )
            })
            .collect();
        let combined = PhaseSpaceTimePosition::new_simultaneous(items.clone()).unwrap();
        assert_eq!(combined.shape(), vec![4]);
        assert_eq!(combined.t(), &Times::Scalar(2.0));

        assert!(PhaseSpaceTimePosition::new_simultaneous(Vec::new()).is_err());
        let mut bad = items;
        bad.push(PhaseSpaceTimePosition::scalar(
            Vector3::zeros(),
            Vector3::zeros(),
            3.0,
            UnitSystem::galactic(),
        ));
        assert!(PhaseSpaceTimePosition::new_simultaneous(bad).is_err());
    }

    #[test]
    fn test_time_index_out_of_bounds() {
        let w = PhaseSpaceTimePosition::new(
            vec![Vector3::zeros(); 2],
            vec![Vector3::zeros(); 2],
            vec![0.0, 1.0],
            UnitSystem::galactic(),
        )
        .unwrap();
        assert_eq!(w.t_at(1).unwrap(), 1.0);
        assert!(matches!(w.t_at(5), Err(Error::IndexError(_))));
        assert!(matches!(w.t().at(2), Err(Error::IndexError(_))));

        // scalar times broadcast, but not past the end of the batch
        let w = PhaseSpaceTimePosition::new(
            vec![Vector3::zeros(); 2],
            vec![Vector3::zeros(); 2],
            4.0,
            UnitSystem::galactic(),
        )
        .unwrap();
        assert_eq!(w.t().at(10).unwrap(), 4.0);
        assert!(w.t_at(2).is_err());
    }

    /// Same field layout as a position, without any checks.
    #[derive(Serialize)]
    struct Unchecked {
        q: Vec<Vector3<f64>>,
        p: Vec<Vector3<f64>>,
        t: Times,
        shape: Vec<usize>,
        units: UnitSystem,
    }

    #[test]
    fn test_load_checks_shape() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("w.bin");

        let good = Unchecked {
            q: vec![Vector3::new(1.0, 0.0, 0.0)],
            p: vec![Vector3::new(0.0, 1.0, 0.0)],
            t: Times::PerElement(vec![2.0]),
            shape: vec![1],
            units: UnitSystem::galactic(),
        };
        let bytes = bincode::serde::encode_to_vec(&good, bincode::config::legacy()).unwrap();
        std::fs::write(&path, bytes).unwrap();
        let loaded = PhaseSpaceTimePosition::load(&path).unwrap();
        assert_eq!(loaded.times(), vec![2.0]);

        let bad_shape = Unchecked {
            shape: vec![5],
            ..good
        };
        let bytes = bincode::serde::encode_to_vec(&bad_shape, bincode::config::legacy()).unwrap();
        std::fs::write(&path, bytes).unwrap();
        assert!(PhaseSpaceTimePosition::load(&path).is_err());

        let bad_times = Unchecked {
            t: Times::PerElement(vec![1.0, 2.0, 3.0]),
            shape: vec![1],
            ..bad_shape
        };
        let bytes = bincode::serde::encode_to_vec(&bad_times, bincode::config::legacy()).unwrap();
        std::fs::write(&path, bytes).unwrap();
        assert!(PhaseSpaceTimePosition::load(&path).is_err());
    }

    #[test]
    fn test_times_simplify() {
        assert_eq!(Times::from(vec![1.0, 1.0]).simplify(), Times::Scalar(1.0));
        assert_eq!(
            Times::from(vec![1.0, 2.0]).simplify(),
            Times::PerElement(vec![1.0, 2.0])
        );
    }
}
