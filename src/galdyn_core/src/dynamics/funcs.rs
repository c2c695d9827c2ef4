//! Orbital quantities around a progenitor, used when releasing stream particles.
//!
//! Positions and velocities are in the units of the potential.
use nalgebra::Vector3;

use crate::errors::{Error, GalResult};
use crate::potential::Potential;

/// Specific angular momentum `q x p`.
#[inline(always)]
#[must_use]
pub fn specific_angular_momentum(q: &Vector3<f64>, p: &Vector3<f64>) -> Vector3<f64> {
    q.cross(p)
}

/// Orbital angular velocity vector, `(q x p) / |q|^2`.
///
/// Zero at the origin.
#[must_use]
pub fn orbital_angular_velocity(q: &Vector3<f64>, p: &Vector3<f64>) -> Vector3<f64> {
    let r2 = q.norm_squared();
    if r2 == 0.0 {
        return Vector3::zeros();
    }
    specific_angular_momentum(q, p) / r2
}

/// Magnitude of the orbital angular velocity.
#[must_use]
pub fn orbital_angular_velocity_mag(q: &Vector3<f64>, p: &Vector3<f64>) -> f64 {
    orbital_angular_velocity(q, p).norm()
}

/// Jacobi radius of a progenitor of mass `prog_mass` at `(q, p)`.
///
/// `r_t = (G m / (Omega^2 - d^2 Phi / dr^2))^(1/3)`
///
/// # Errors
/// [`Error::ValueError`] if the progenitor is at the origin, the mass is negative, or
/// the denominator is not positive and the radius is undefined.
pub fn tidal_radius(
    potential: &dyn Potential,
    q: &Vector3<f64>,
    p: &Vector3<f64>,
    prog_mass: f64,
    t: f64,
) -> GalResult<f64> {
    if q.norm_squared() == 0.0 {
        return Err(Error::ValueError(
            "Tidal radius is undefined at the origin.".into(),
        ));
    }
    if prog_mass.is_nan() || prog_mass < 0.0 {
        return Err(Error::ValueError(format!(
            "Progenitor mass must be non-negative, got {prog_mass}."
        )));
    }
    let omega = orbital_angular_velocity_mag(q, p);
    let denom = omega.powi(2) - potential.d2potential_dr2(q, t)?;
    if denom.is_nan() || denom <= 0.0 {
        return Err(Error::ValueError(format!(
            "Tidal radius is undefined, Omega^2 - d2Phi/dr2 = {denom:e}."
        )));
    }
    let gm = potential.units().gravitational_constant() * prog_mass;
    Ok((gm / denom).cbrt())
}

/// Inner and outer Lagrange points `(L1, L2)` along the progenitor's radial direction.
///
/// # Errors
/// Same as [`tidal_radius`].
pub fn lagrange_points(
    potential: &dyn Potential,
    q: &Vector3<f64>,
    p: &Vector3<f64>,
    prog_mass: f64,
    t: f64,
) -> GalResult<(Vector3<f64>, Vector3<f64>)> {
    let r_t = tidal_radius(potential, q, p, prog_mass, t)?;
    let r_hat = q.normalize();
    Ok((q - r_hat * r_t, q + r_hat * r_t))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::potential::{NFWPotential, milky_way_potential};
    use crate::units::UnitSystem;

    const KMS: f64 = 1.022_712_165_053_707_7e-3;

    #[test]
    fn test_angular_velocity() {
        let q = Vector3::new(2.0, 0.0, 0.0);
        let p = Vector3::new(0.0, 3.0, 0.0);
        assert_eq!(specific_angular_momentum(&q, &p), Vector3::new(0.0, 0.0, 6.0));
        assert_eq!(orbital_angular_velocity(&q, &p), Vector3::new(0.0, 0.0, 1.5));
        assert_eq!(orbital_angular_velocity_mag(&q, &p), 1.5);
        assert_eq!(orbital_angular_velocity(&Vector3::zeros(), &p), Vector3::zeros());
    }

    #[test]
    fn test_tidal_radius() {
        let pot = NFWPotential::new(1e12, 20.0, UnitSystem::galactic());
        let q = Vector3::new(8.0, 0.0, 0.0);
        let p = Vector3::new(8.0, 0.0, 0.0);
        let r_t = tidal_radius(&pot, &q, &p, 1e4, 0.0).unwrap();
        assert!((r_t - 0.063_620_08).abs() < 1e-7, "{r_t}");

        assert!(tidal_radius(&pot, &Vector3::zeros(), &p, 1e4, 0.0).is_err());
        assert!(tidal_radius(&pot, &q, &p, -1.0, 0.0).is_err());
    }

    #[test]
    fn test_lagrange_points() {
        let pot = milky_way_potential();
        let q = Vector3::new(8.0, 0.0, 0.0);
        let p = Vector3::new(0.0, 220.0 * KMS, 0.0);
        let (l1, l2) = lagrange_points(&pot, &q, &p, 1e4, 0.0).unwrap();
        assert!((l1 - Vector3::new(7.970_709_26, 0.0, 0.0)).norm() < 1e-7, "{l1}");
        assert!((l2 - Vector3::new(8.029_290_74, 0.0, 0.0)).norm() < 1e-7, "{l2}");
    }
}
