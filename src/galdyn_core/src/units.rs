//! Unit systems.
//!
//! Raw numbers stored in galdyn objects are always paired with a [`UnitSystem`],
//! which records the SI scale of the base length, time, and mass units. Angles are
//! always radians.
//!
//! Named unit systems are kept in a singleton registry, [`UNIT_SYSTEMS`], which
//! contains `galactic`, `solarsystem`, `si`, and `dimensionless` by default.
//!
//! ```
//!     use galdyn_core::units::{UnitSystem, Dimension, unit_system};
//!
//!     let galactic = unit_system("galactic").unwrap();
//!     assert_eq!(galactic, UnitSystem::galactic());
//!
//!     // 1 kpc/Myr in km/s
//!     let si = UnitSystem::si();
//!     let v = galactic.convert(1.0, Dimension::Speed, &si).unwrap() / 1000.0;
//!     assert!((v - 977.792221).abs() < 1e-5);
//! ```
//!
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

use std::collections::HashMap;
use std::str::FromStr;
use std::sync::LazyLock;

use crossbeam::sync::ShardedLock;
use serde::{Deserialize, Serialize};

use crate::constants::{AU, GRAVITATIONAL_CONSTANT, JULIAN_YEAR, KILOPARSEC, MEGAYEAR, SOLAR_MASS};
use crate::errors::{Error, GalResult};

/// Physical dimensions which may be converted between unit systems.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Dimension {
    /// Length.
    Length,

    /// Time.
    Time,

    /// Mass.
    Mass,

    /// Length / Time.
    Speed,

    /// Length / Time^2.
    Acceleration,

    /// Energy per unit mass, Length^2 / Time^2.
    SpecificEnergy,

    /// Angular momentum per unit mass, Length^2 / Time.
    SpecificAngularMomentum,

    /// 1 / Time.
    Frequency,

    /// Mass / Length^3.
    Density,
}

impl Dimension {
    /// Exponents of (length, time, mass) making up this dimension.
    #[must_use]
    pub fn exponents(&self) -> (i32, i32, i32) {
        match self {
            Self::Length => (1, 0, 0),
            Self::Time => (0, 1, 0),
            Self::Mass => (0, 0, 1),
            Self::Speed => (1, -1, 0),
            Self::Acceleration => (1, -2, 0),
            Self::SpecificEnergy => (2, -2, 0),
            Self::SpecificAngularMomentum => (2, -1, 0),
            Self::Frequency => (0, -1, 0),
            Self::Density => (-3, 0, 1),
        }
    }
}

/// A system of base units.
///
/// Each base unit is recorded as its value in SI, so a length of `1.0` in a system
/// with `length_m = 1000.0` is one kilometer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "UnitSystemData")]
pub struct UnitSystem {
    /// Base length unit in meters.
    length_m: f64,

    /// Base time unit in seconds.
    time_s: f64,

    /// Base mass unit in kilograms.
    mass_kg: f64,

    /// Dimensionless systems set G = 1 and cannot be converted to other systems.
    dimensionless: bool,
}

#[derive(Debug, Deserialize)]
struct UnitSystemData {
    length_m: f64,
    time_s: f64,
    mass_kg: f64,
    dimensionless: bool,
}

impl TryFrom<UnitSystemData> for UnitSystem {
    type Error = Error;

    fn try_from(data: UnitSystemData) -> GalResult<Self> {
        if data.dimensionless {
            if [data.length_m, data.time_s, data.mass_kg] != [1.0; 3] {
                return Err(Error::UnitError(
                    "Dimensionless unit systems must have unit scales.".into(),
                ));
            }
            return Ok(Self::dimensionless());
        }
        Self::new(data.length_m, data.time_s, data.mass_kg)
    }
}

impl UnitSystem {
    /// Construct a new unit system from the SI values of its base units.
    ///
    /// # Errors
    /// All scales must be finite and positive.
    pub fn new(length_m: f64, time_s: f64, mass_kg: f64) -> GalResult<Self> {
        if [length_m, time_s, mass_kg]
            .iter()
            .any(|x| !x.is_finite() || *x <= 0.0)
        {
            return Err(Error::UnitError(
                "Unit scales must be finite and positive.".into(),
            ));
        }
        Ok(Self {
            length_m,
            time_s,
            mass_kg,
            dimensionless: false,
        })
    }

    /// kpc, Myr, solar masses.
    #[must_use]
    pub fn galactic() -> Self {
        Self {
            length_m: KILOPARSEC,
            time_s: MEGAYEAR,
            mass_kg: SOLAR_MASS,
            dimensionless: false,
        }
    }

    /// AU, Julian years, solar masses.
    #[must_use]
    pub fn solar_system() -> Self {
        Self {
            length_m: AU,
            time_s: JULIAN_YEAR,
            mass_kg: SOLAR_MASS,
            dimensionless: false,
        }
    }

    /// Meters, seconds, kilograms.
    #[must_use]
    pub fn si() -> Self {
        Self {
            length_m: 1.0,
            time_s: 1.0,
            mass_kg: 1.0,
            dimensionless: false,
        }
    }

    /// Dimensionless system where G = 1.
    #[must_use]
    pub fn dimensionless() -> Self {
        Self {
            length_m: 1.0,
            time_s: 1.0,
            mass_kg: 1.0,
            dimensionless: true,
        }
    }

    /// Base length unit in meters.
    #[must_use]
    pub fn length_m(&self) -> f64 {
        self.length_m
    }

    /// Base time unit in seconds.
    #[must_use]
    pub fn time_s(&self) -> f64 {
        self.time_s
    }

    /// Base mass unit in kilograms.
    #[must_use]
    pub fn mass_kg(&self) -> f64 {
        self.mass_kg
    }

    /// True for the dimensionless system, where G = 1.
    #[must_use]
    pub fn is_dimensionless(&self) -> bool {
        self.dimensionless
    }

    /// Value in SI of one unit of the given dimension.
    #[must_use]
    pub fn scale(&self, dim: Dimension) -> f64 {
        let (l, t, m) = dim.exponents();
        self.length_m.powi(l) * self.time_s.powi(t) * self.mass_kg.powi(m)
    }

    /// Re-express a value of the given dimension in the target unit system.
    ///
    /// # Errors
    /// Conversion between a dimensionless and a dimensional system is not possible.
    pub fn convert(&self, value: f64, dim: Dimension, target: &Self) -> GalResult<f64> {
        Ok(value * self.conversion_factor(dim, target)?)
    }

    /// Multiplicative factor which converts values of `dim` into the target system.
    ///
    /// # Errors
    /// Conversion between a dimensionless and a dimensional system is not possible.
    pub fn conversion_factor(&self, dim: Dimension, target: &Self) -> GalResult<f64> {
        match (self.dimensionless, target.dimensionless) {
            (true, true) => Ok(1.0),
            (false, false) => Ok(self.scale(dim) / target.scale(dim)),
            _ => Err(Error::UnitError(
                "Cannot convert between dimensionless and dimensional unit systems.".into(),
            )),
        }
    }

    /// Gravitational constant expressed in this unit system.
    #[must_use]
    pub fn gravitational_constant(&self) -> f64 {
        if self.dimensionless {
            return 1.0;
        }
        GRAVITATIONAL_CONSTANT * self.mass_kg * self.time_s.powi(2) / self.length_m.powi(3)
    }
}

impl Default for UnitSystem {
    fn default() -> Self {
        Self::galactic()
    }
}

impl FromStr for UnitSystem {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        unit_system(s)
    }
}

/// Registry of named unit systems.
///
/// Names are case insensitive, they are stored lower case.
pub static UNIT_SYSTEMS: LazyLock<ShardedLock<HashMap<String, UnitSystem>>> =
    LazyLock::new(|| {
        let singleton = HashMap::from([
            ("galactic".to_string(), UnitSystem::galactic()),
            ("solarsystem".to_string(), UnitSystem::solar_system()),
            ("si".to_string(), UnitSystem::si()),
            ("dimensionless".to_string(), UnitSystem::dimensionless()),
        ]);
        ShardedLock::new(singleton)
    });

/// Look up a named unit system.
///
/// # Errors
/// [`Error::UnitError`] if the name is not registered.
pub fn unit_system(name: &str) -> GalResult<UnitSystem> {
    let registry = UNIT_SYSTEMS
        .read()
        .map_err(|_| Error::UnitError("Unit system registry lock is poisoned.".into()))?;
    registry
        .get(&name.to_lowercase())
        .copied()
        .ok_or_else(|| Error::UnitError(format!("Unknown unit system '{name}'.")))
}

/// Add or replace a named unit system in the registry.
///
/// # Errors
/// [`Error::UnitError`] if the registry lock has been poisoned.
pub fn register_unit_system(name: &str, usys: UnitSystem) -> GalResult<()> {
    let mut registry = UNIT_SYSTEMS
        .write()
        .map_err(|_| Error::UnitError("Unit system registry lock is poisoned.".into()))?;
    if registry.insert(name.to_lowercase(), usys).is_some() {
        tracing::warn!("Replacing registered unit system '{name}'");
    }
    Ok(())
}
