//! Phase-space positions without time.
use std::ops::Range;

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use super::shape::{check_len, index_first_axis, slice_first_axis};
use super::{AbstractPhaseSpacePositionBase, PhaseSpaceTimePosition, Times};
use crate::errors::{Error, GalResult};
use crate::io::FileIO;
use crate::potential::Potential;
use crate::units::{Dimension, UnitSystem};

/// Phase-space position without an explicit time coordinate.
///
/// Quantities which depend on time, such as the potential energy in a time
/// dependent potential, require the time to be supplied.
pub trait AbstractPhaseSpacePosition: AbstractPhaseSpacePositionBase {
    /// Specific potential energy at time `t`, in the unit system of the potential.
    ///
    /// `t` is expressed in the time unit of the potential.
    ///
    /// # Errors
    /// [`Error::UnitError`] if the position cannot be converted into the potential's
    /// unit system.
    fn potential_energy(&self, potential: &dyn Potential, t: f64) -> GalResult<Vec<f64>> {
        let w = self.convert_to(potential.units())?;
        potential.potential_energy_batch(w.q(), &[t])
    }

    /// Specific total energy at time `t`, in the unit system of the potential.
    ///
    /// # Errors
    /// [`Error::UnitError`] if the position cannot be converted into the potential's
    /// unit system.
    fn energy(&self, potential: &dyn Potential, t: f64) -> GalResult<Vec<f64>> {
        let w = self.convert_to(potential.units())?;
        let pe = potential.potential_energy_batch(w.q(), &[t])?;
        Ok(w.kinetic_energy()
            .into_iter()
            .zip(pe)
            .map(|(k, p)| k + p)
            .collect())
    }

    /// Attach a time, which is expressed in the unit system of this position.
    ///
    /// # Errors
    /// [`Error::ShapeMismatch`] if a per-element time does not match the batch.
    fn with_time(&self, t: impl Into<Times>) -> GalResult<PhaseSpaceTimePosition>;
}

/// Concrete phase-space position without time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "PhaseSpacePositionData")]
pub struct PhaseSpacePosition {
    /// Cartesian positions.
    q: Vec<Vector3<f64>>,

    /// Cartesian velocities.
    p: Vec<Vector3<f64>>,

    /// Batch shape.
    shape: Vec<usize>,

    /// Units of `q` and `p`.
    units: UnitSystem,
}

impl FileIO for PhaseSpacePosition {}

/// Stored layout of [`PhaseSpacePosition`], checked on load.
#[derive(Debug, Deserialize)]
struct PhaseSpacePositionData {
    q: Vec<Vector3<f64>>,
    p: Vec<Vector3<f64>>,
    shape: Vec<usize>,
    units: UnitSystem,
}

impl TryFrom<PhaseSpacePositionData> for PhaseSpacePosition {
    type Error = Error;

    fn try_from(data: PhaseSpacePositionData) -> GalResult<Self> {
        Self::with_shape(data.q, data.p, data.shape, data.units)
    }
}

impl PhaseSpacePosition {
    /// Construct a 1-d batch of phase-space positions.
    ///
    /// # Errors
    /// [`Error::ShapeMismatch`] if `q` and `p` have different lengths.
    pub fn new(q: Vec<Vector3<f64>>, p: Vec<Vector3<f64>>, units: UnitSystem) -> GalResult<Self> {
        let shape = vec![q.len()];
        Self::with_shape(q, p, shape, units)
    }

    /// Construct a single (0-d) phase-space position.
    #[must_use]
    pub fn scalar(q: Vector3<f64>, p: Vector3<f64>, units: UnitSystem) -> Self {
        Self {
            q: vec![q],
            p: vec![p],
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
        shape: Vec<usize>,
        units: UnitSystem,
    ) -> GalResult<Self> {
        if q.len() != p.len() {
            return Err(Error::ShapeMismatch(format!(
                "Positions ({}) and momenta ({}) must have the same length.",
                q.len(),
                p.len()
            )));
        }
        check_len(&shape, q.len())?;
        Ok(Self { q, p, shape, units })
    }

    /// Construct a 1-d batch from raw `[x, y, z]` arrays.
    ///
    /// # Errors
    /// [`Error::ShapeMismatch`] if `q` and `p` have different lengths.
    pub fn from_arrays(q: &[[f64; 3]], p: &[[f64; 3]], units: UnitSystem) -> GalResult<Self> {
        Self::new(
            q.iter().map(|x| Vector3::from(*x)).collect(),
            p.iter().map(|x| Vector3::from(*x)).collect(),
            units,
        )
    }
}

impl AbstractPhaseSpacePositionBase for PhaseSpacePosition {
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
        &[3, 3]
    }

    fn units(&self) -> &UnitSystem {
        &self.units
    }

    fn index(&self, idx: usize) -> GalResult<Self> {
        let (range, shape) = index_first_axis(&self.shape, idx)?;
        Ok(Self {
            q: self.q[range.clone()].to_vec(),
            p: self.p[range].to_vec(),
            shape,
            units: self.units,
        })
    }

    fn slice(&self, range: Range<usize>) -> GalResult<Self> {
        let (range, shape) = slice_first_axis(&self.shape, range)?;
        Ok(Self {
            q: self.q[range.clone()].to_vec(),
            p: self.p[range].to_vec(),
            shape,
            units: self.units,
        })
    }

    fn convert_to(&self, units: &UnitSystem) -> GalResult<Self> {
        let q_scale = self.units.conversion_factor(Dimension::Length, units)?;
        let p_scale = self.units.conversion_factor(Dimension::Speed, units)?;
        Ok(Self {
            q: self.q.iter().map(|q| q * q_scale).collect(),
            p: self.p.iter().map(|p| p * p_scale).collect(),
            shape: self.shape.clone(),
            units: *units,
        })
    }
}

impl AbstractPhaseSpacePosition for PhaseSpacePosition {
    fn with_time(&self, t: impl Into<Times>) -> GalResult<PhaseSpaceTimePosition> {
        PhaseSpaceTimePosition::with_shape(
            self.q.clone(),
            self.p.clone(),
            t,
            self.shape.clone(),
            self.units,
        )
    }
}
