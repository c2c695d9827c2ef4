//! Coordinate representations of positions and their differentials.
//!
//! Phase-space positions are stored Cartesian, these conversions produce other
//! representations on demand. Position and differential are converted together as
//! the differential of a curvilinear representation depends on the position.
//!
//! Angular components of differentials are angular rates (radians per unit time).
//! Where an angular rate is undefined, on the z axis for the azimuth or at the origin
//! for the polar angle, it is reported as zero.

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

/// Supported coordinate representations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Representation {
    /// (x, y, z) and (d_x, d_y, d_z).
    #[default]
    Cartesian,

    /// (rho, phi, z) and (d_rho, d_phi, d_z).
    Cylindrical,

    /// (r, theta, phi) and (d_r, d_theta, d_phi), theta is the polar angle from +z.
    Spherical,
}

impl Representation {
    /// Convert a Cartesian position and velocity into this representation.
    #[must_use]
    pub fn from_cartesian(
        &self,
        q: &Vector3<f64>,
        p: &Vector3<f64>,
    ) -> (Vector3<f64>, Vector3<f64>) {
        match self {
            Self::Cartesian => (*q, *p),
            Self::Cylindrical => {
                let rho = q.x.hypot(q.y);
                let phi = q.y.atan2(q.x);
                let (sin_phi, cos_phi) = phi.sin_cos();
                let d_rho = p.x * cos_phi + p.y * sin_phi;
                let d_phi = if rho > 0.0 {
                    (-p.x * sin_phi + p.y * cos_phi) / rho
                } else {
                    0.0
                };
                (Vector3::new(rho, phi, q.z), Vector3::new(d_rho, d_phi, p.z))
            }
            Self::Spherical => {
                let r = q.norm();
                let theta = if r > 0.0 { (q.z / r).clamp(-1.0, 1.0).acos() } else { 0.0 };
                let phi = q.y.atan2(q.x);
                let [r_hat, theta_hat, phi_hat] = spherical_basis(theta, phi);

                let d_r = p.dot(&r_hat);
                let d_theta = if r > 0.0 { p.dot(&theta_hat) / r } else { 0.0 };
                let cyl_r = r * theta.sin();
                let d_phi = if cyl_r > 0.0 { p.dot(&phi_hat) / cyl_r } else { 0.0 };
                (Vector3::new(r, theta, phi), Vector3::new(d_r, d_theta, d_phi))
            }
        }
    }

    /// Convert a position and velocity from this representation into Cartesian.
    #[must_use]
    pub fn to_cartesian(
        &self,
        q: &Vector3<f64>,
        p: &Vector3<f64>,
    ) -> (Vector3<f64>, Vector3<f64>) {
        match self {
            Self::Cartesian => (*q, *p),
            Self::Cylindrical => {
                let (rho, phi, z) = (q.x, q.y, q.z);
                let (d_rho, d_phi, d_z) = (p.x, p.y, p.z);
                let (sin_phi, cos_phi) = phi.sin_cos();
                (
                    Vector3::new(rho * cos_phi, rho * sin_phi, z),
                    Vector3::new(
                        d_rho * cos_phi - rho * d_phi * sin_phi,
                        d_rho * sin_phi + rho * d_phi * cos_phi,
                        d_z,
                    ),
                )
            }
            Self::Spherical => {
                let (r, theta, phi) = (q.x, q.y, q.z);
                let (d_r, d_theta, d_phi) = (p.x, p.y, p.z);
                let [r_hat, theta_hat, phi_hat] = spherical_basis(theta, phi);
                (
                    r * r_hat,
                    d_r * r_hat + r * d_theta * theta_hat + r * theta.sin() * d_phi * phi_hat,
                )
            }
        }
    }

    /// Convert between any two representations.
    #[must_use]
    pub fn convert(
        &self,
        target: &Self,
        q: &Vector3<f64>,
        p: &Vector3<f64>,
    ) -> (Vector3<f64>, Vector3<f64>) {
        if self == target {
            return (*q, *p);
        }
        let (q, p) = self.to_cartesian(q, p);
        target.from_cartesian(&q, &p)
    }
}

/// Local orthonormal basis (r_hat, theta_hat, phi_hat) of spherical coordinates.
fn spherical_basis(theta: f64, phi: f64) -> [Vector3<f64>; 3] {
    let (sin_t, cos_t) = theta.sin_cos();
    let (sin_p, cos_p) = phi.sin_cos();
    [
        Vector3::new(sin_t * cos_p, sin_t * sin_p, cos_t),
        Vector3::new(cos_t * cos_p, cos_t * sin_p, -sin_t),
        Vector3::new(-sin_p, cos_p, 0.0),
    ]
}
