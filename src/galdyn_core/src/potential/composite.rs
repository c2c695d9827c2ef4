//! Sums of potentials.
use nalgebra::{Matrix3, Vector3};

use super::{
    HernquistPotential, MN3ExponentialDiskPotential, MiyamotoNagaiPotential, NFWPotential,
    Potential,
};
use crate::errors::{Error, GalResult};
use crate::units::UnitSystem;

/// Sum of several potentials which share one unit system.
#[derive(Debug, Default)]
pub struct CompositePotential {
    /// Component potentials, in insertion order.
    components: Vec<(String, Box<dyn Potential>)>,

    /// Shared unit system.
    units: UnitSystem,
}

impl CompositePotential {
    /// Construct an empty composite potential.
    #[must_use]
    pub fn new(units: UnitSystem) -> Self {
        Self {
            components: Vec::new(),
            units,
        }
    }

    /// Build from components already known to share `units`.
    fn from_components<const N: usize>(
        units: UnitSystem,
        components: [(&str, Box<dyn Potential>); N],
    ) -> Self {
        Self {
            components: components
                .into_iter()
                .map(|(name, pot)| (name.to_string(), pot))
                .collect(),
            units,
        }
    }

    /// Add a named component.
    ///
    /// # Errors
    /// [`Error::UnitError`] if the component has a different unit system, or
    /// [`Error::ValueError`] if the name is already used.
    pub fn insert(&mut self, name: &str, potential: impl Potential + 'static) -> GalResult<()> {
        if potential.units() != &self.units {
            return Err(Error::UnitError(format!(
                "Component '{name}' does not share the unit system of the composite potential."
            )));
        }
        if self.components.iter().any(|(key, _)| key == name) {
            return Err(Error::ValueError(format!(
                "Composite potential already has a component named '{name}'."
            )));
        }
        self.components.push((name.to_string(), Box::new(potential)));
        Ok(())
    }

    /// Builder form of [`CompositePotential::insert`].
    ///
    /// # Errors
    /// Same as [`CompositePotential::insert`].
    pub fn with(mut self, name: &str, potential: impl Potential + 'static) -> GalResult<Self> {
        self.insert(name, potential)?;
        Ok(self)
    }

    /// Look up a component by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&dyn Potential> {
        self.components
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, pot)| pot.as_ref())
    }

    /// Names of the components, in insertion order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.components.iter().map(|(key, _)| key.as_str())
    }

    /// Number of components.
    #[must_use]
    pub fn len(&self) -> usize {
        self.components.len()
    }

    /// True if there are no components.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }
}

impl Potential for CompositePotential {
    fn units(&self) -> &UnitSystem {
        &self.units
    }

    fn potential_energy(&self, q: &Vector3<f64>, t: f64) -> f64 {
        self.components
            .iter()
            .map(|(_, pot)| pot.potential_energy(q, t))
            .sum()
    }

    fn gradient(&self, q: &Vector3<f64>, t: f64) -> Vector3<f64> {
        self.components
            .iter()
            .fold(Vector3::zeros(), |acc, (_, pot)| acc + pot.gradient(q, t))
    }

    fn hessian(&self, q: &Vector3<f64>, t: f64) -> Matrix3<f64> {
        self.components
            .iter()
            .fold(Matrix3::zeros(), |acc, (_, pot)| acc + pot.hessian(q, t))
    }

    fn density(&self, q: &Vector3<f64>, t: f64) -> f64 {
        self.components
            .iter()
            .map(|(_, pot)| pot.density(q, t))
            .sum()
    }
}

/// Simple mass model of the Milky Way in galactic units.
///
/// A Miyamoto-Nagai disk, Hernquist bulge and nucleus, and an NFW halo, with the
/// parameters of Bovy (2015) as refit by Price-Whelan for `gala`.
///
/// ```
///     use galdyn_core::prelude::*;
///     use nalgebra::Vector3;
///
///     let mw = milky_way_potential();
///     let vc = mw.circular_velocity(&Vector3::new(8.0, 0.0, 0.0), 0.0);
///     // roughly 230 km/s
///     assert!((vc - 0.237).abs() < 1e-3);
/// ```
#[must_use]
pub fn milky_way_potential() -> CompositePotential {
    let units = UnitSystem::galactic();
    CompositePotential::from_components(
        units,
        [
            (
                "disk",
                Box::new(MiyamotoNagaiPotential::new(6.8e10, 3.0, 0.28, units)),
            ),
            ("bulge", Box::new(HernquistPotential::new(5e9, 1.0, units))),
            (
                "nucleus",
                Box::new(HernquistPotential::new(1.71e9, 0.07, units)),
            ),
            ("halo", Box::new(NFWPotential::new(5.4e11, 15.62, units))),
        ],
    )
}

/// Milky Way mass model of Hunter et al. (2022), in galactic units.
///
/// The disk is an exponential disk built from three Miyamoto-Nagai disks, with
/// Hernquist bulge and nucleus, and an NFW halo.
#[must_use]
pub fn milky_way_potential_2022() -> CompositePotential {
    let units = UnitSystem::galactic();
    CompositePotential::from_components(
        units,
        [
            (
                "disk",
                Box::new(MN3ExponentialDiskPotential::new(4.7717e10, 2.6, 0.3, units)),
            ),
            ("bulge", Box::new(HernquistPotential::new(5e9, 1.0, units))),
            (
                "nucleus",
                Box::new(HernquistPotential::new(1.8142e9, 0.0688, units)),
            ),
            ("halo", Box::new(NFWPotential::new(5.5427e11, 15.626, units))),
        ],
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::potential::KeplerPotential;

    #[test]
    fn test_sum() {
        let units = UnitSystem::dimensionless();
        let pot = CompositePotential::new(units)
            .with("a", KeplerPotential::new(1.0, units))
            .unwrap()
            .with("b", KeplerPotential::new(2.0, units))
            .unwrap();
        let q = Vector3::new(0.0, 0.0, 2.0);
        assert_eq!(pot.len(), 2);
        assert_eq!(pot.potential_energy(&q, 0.0), -1.5);
        assert!((pot.gradient(&q, 0.0) - Vector3::new(0.0, 0.0, 0.75)).norm() < 1e-14);
        assert_eq!(pot.names().collect::<Vec<_>>(), vec!["a", "b"]);
        assert!(pot.get("b").is_some());
    }

    #[test]
    fn test_mismatched_units() {
        let mut pot = CompositePotential::new(UnitSystem::galactic());
        assert!(
            pot.insert("a", KeplerPotential::new(1.0, UnitSystem::solar_system()))
                .is_err()
        );
        pot.insert("a", KeplerPotential::new(1.0, UnitSystem::galactic()))
            .unwrap();
        assert!(
            pot.insert("a", KeplerPotential::new(1.0, UnitSystem::galactic()))
                .is_err()
        );
    }

    #[test]
    fn test_milky_way() {
        let mw = milky_way_potential();
        assert_eq!(mw.len(), 4);
        assert_eq!(mw.units(), &UnitSystem::galactic());
        let q = Vector3::new(8.0, 0.0, 0.0);
        let vc = mw.circular_velocity(&q, 0.0);
        assert!((vc - 0.2370252).abs() < 1e-6);
        assert!(mw.density(&q, 0.0) > 0.0);
    }

    /// `|got - expected| <= atol + rtol |expected|`, elementwise.
    fn assert_close(got: &[f64], expected: &[f64], rtol: f64) {
        for (g, e) in got.iter().zip(expected) {
            assert!((g - e).abs() <= 1e-8 + rtol * e.abs(), "{got:?} != {expected:?}");
        }
    }

    // Reference values were computed with older astropy constants, agreement is a
    // few parts in 1e5.
    #[test]
    fn test_milky_way_reference_values() {
        let mw = milky_way_potential();
        let q = Vector3::new(1.0, 2.0, 3.0);
        assert_close(&[mw.potential_energy(&q, 0.0)], &[-0.19386052], 1e-5);
        assert_close(
            mw.gradient(&q, 0.0).as_slice(),
            &[0.00256403, 0.00512806, 0.01115272],
            3e-5,
        );
        assert_close(&[mw.density(&q, 0.0)], &[33365858.0], 1e-5);
        let hess = Matrix3::new(
            0.00231054, -0.00050698, -0.00101273, -0.00050698, 0.00155006, -0.00202546,
            -0.00101273, -0.00202546, -0.00197444,
        );
        assert_close(mw.hessian(&q, 0.0).as_slice(), hess.as_slice(), 5e-5);
        let tidal = Matrix3::new(
            0.00168182, -0.00050698, -0.00101273, -0.00050698, 0.00092134, -0.00202546,
            -0.00101273, -0.00202546, -0.00260316,
        );
        assert_close(mw.tidal_tensor(&q, 0.0).as_slice(), tidal.as_slice(), 5e-5);
    }

    #[test]
    fn test_milky_way_2022_reference_values() {
        let mw = milky_way_potential_2022();
        assert_eq!(
            mw.names().collect::<Vec<_>>(),
            vec!["disk", "bulge", "nucleus", "halo"]
        );
        let q = Vector3::new(1.0, 2.0, 3.0);
        assert_close(&[mw.potential_energy(&q, 0.0)], &[-0.1906119], 1e-5);
        assert_close(
            mw.gradient(&q, 0.0).as_slice(),
            &[0.00235500422114, 0.00471000844229, 0.0101667940117],
            1e-5,
        );
        assert_close(&[mw.density(&q, 0.0)], &[33_807_052.01837142], 1e-5);
        let hess = Matrix3::new(
            0.0021196, -0.00047082, -0.0008994, -0.00047082, 0.00141337, -0.0017988,
            -0.0008994, -0.0017988, -0.00162186,
        );
        assert_close(mw.hessian(&q, 0.0).as_slice(), hess.as_slice(), 3e-5);
        let tidal = Matrix3::new(
            0.00148256, -0.00047082, -0.0008994, -0.00047082, 0.00077633, -0.0017988,
            -0.0008994, -0.0017988, -0.00225889,
        );
        assert_close(mw.tidal_tensor(&q, 0.0).as_slice(), tidal.as_slice(), 3e-5);
    }
}
