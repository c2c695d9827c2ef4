//! Analytic potentials.
//!
//! Masses (or the circular velocity of the logarithmic potential) and the angle of
//! the bar are [`ParameterField`]s and may change with time, length scales are
//! constant.
use std::f64::consts::PI;

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use super::{ParameterField, Potential};
use crate::units::UnitSystem;

/// Potential which is zero everywhere.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NullPotential {
    /// Unit system.
    pub units: UnitSystem,
}

impl NullPotential {
    /// Construct a new null potential.
    #[must_use]
    pub fn new(units: UnitSystem) -> Self {
        Self { units }
    }
}

impl Potential for NullPotential {
    fn units(&self) -> &UnitSystem {
        &self.units
    }

    fn potential_energy(&self, _q: &Vector3<f64>, _t: f64) -> f64 {
        0.0
    }

    fn gradient(&self, _q: &Vector3<f64>, _t: f64) -> Vector3<f64> {
        Vector3::zeros()
    }

    fn density(&self, _q: &Vector3<f64>, _t: f64) -> f64 {
        0.0
    }
}

/// Point mass, `Phi = -G m / r`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KeplerPotential {
    /// Mass.
    pub m: ParameterField,

    /// Unit system.
    pub units: UnitSystem,
}

impl KeplerPotential {
    /// Construct a new point mass potential.
    #[must_use]
    pub fn new(m: impl Into<ParameterField>, units: UnitSystem) -> Self {
        Self { m: m.into(), units }
    }
}

impl Potential for KeplerPotential {
    fn units(&self) -> &UnitSystem {
        &self.units
    }

    fn potential_energy(&self, q: &Vector3<f64>, t: f64) -> f64 {
        -self.units.gravitational_constant() * self.m.evaluate(t) / q.norm()
    }

    fn gradient(&self, q: &Vector3<f64>, t: f64) -> Vector3<f64> {
        let gm = self.units.gravitational_constant() * self.m.evaluate(t);
        q * (gm / q.norm().powi(3))
    }

    fn density(&self, _q: &Vector3<f64>, _t: f64) -> f64 {
        0.0
    }
}

/// Hernquist (1990) bulge, `Phi = -G m / (r + c)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HernquistPotential {
    /// Total mass.
    pub m: ParameterField,

    /// Scale radius.
    pub c: f64,

    /// Unit system.
    pub units: UnitSystem,
}

impl HernquistPotential {
    /// Construct a new Hernquist potential.
    #[must_use]
    pub fn new(m: impl Into<ParameterField>, c: f64, units: UnitSystem) -> Self {
        Self {
            m: m.into(),
            c,
            units,
        }
    }
}

impl Potential for HernquistPotential {
    fn units(&self) -> &UnitSystem {
        &self.units
    }

    fn potential_energy(&self, q: &Vector3<f64>, t: f64) -> f64 {
        -self.units.gravitational_constant() * self.m.evaluate(t) / (q.norm() + self.c)
    }

    fn gradient(&self, q: &Vector3<f64>, t: f64) -> Vector3<f64> {
        let r = q.norm();
        if r == 0.0 {
            return Vector3::zeros();
        }
        let gm = self.units.gravitational_constant() * self.m.evaluate(t);
        q * (gm / ((r + self.c).powi(2) * r))
    }

    fn density(&self, q: &Vector3<f64>, t: f64) -> f64 {
        let r = q.norm();
        self.m.evaluate(t) * self.c / (2.0 * PI * r * (r + self.c).powi(3))
    }
}

/// Plummer (1911) sphere, `Phi = -G m / sqrt(r^2 + b^2)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlummerPotential {
    /// Total mass.
    pub m: ParameterField,

    /// Core radius.
    pub b: f64,

    /// Unit system.
    pub units: UnitSystem,
}

impl PlummerPotential {
    /// Construct a new Plummer potential.
    #[must_use]
    pub fn new(m: impl Into<ParameterField>, b: f64, units: UnitSystem) -> Self {
        Self {
            m: m.into(),
            b,
            units,
        }
    }
}

impl Potential for PlummerPotential {
    fn units(&self) -> &UnitSystem {
        &self.units
    }

    fn potential_energy(&self, q: &Vector3<f64>, t: f64) -> f64 {
        -self.units.gravitational_constant() * self.m.evaluate(t)
            / (q.norm_squared() + self.b.powi(2)).sqrt()
    }

    fn gradient(&self, q: &Vector3<f64>, t: f64) -> Vector3<f64> {
        let gm = self.units.gravitational_constant() * self.m.evaluate(t);
        q * (gm / (q.norm_squared() + self.b.powi(2)).powf(1.5))
    }

    fn density(&self, q: &Vector3<f64>, t: f64) -> f64 {
        let b2 = self.b.powi(2);
        3.0 * self.m.evaluate(t) / (4.0 * PI * self.b.powi(3))
            * (1.0 + q.norm_squared() / b2).powf(-2.5)
    }
}

/// Henon (1959) isochrone, `Phi = -G m / (b + sqrt(r^2 + b^2))`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IsochronePotential {
    /// Total mass.
    pub m: ParameterField,

    /// Core radius.
    pub b: f64,

    /// Unit system.
    pub units: UnitSystem,
}

impl IsochronePotential {
    /// Construct a new isochrone potential.
    #[must_use]
    pub fn new(m: impl Into<ParameterField>, b: f64, units: UnitSystem) -> Self {
        Self {
            m: m.into(),
            b,
            units,
        }
    }
}

impl Potential for IsochronePotential {
    fn units(&self) -> &UnitSystem {
        &self.units
    }

    fn potential_energy(&self, q: &Vector3<f64>, t: f64) -> f64 {
        let s = (q.norm_squared() + self.b.powi(2)).sqrt();
        -self.units.gravitational_constant() * self.m.evaluate(t) / (self.b + s)
    }

    fn gradient(&self, q: &Vector3<f64>, t: f64) -> Vector3<f64> {
        let s = (q.norm_squared() + self.b.powi(2)).sqrt();
        let gm = self.units.gravitational_constant() * self.m.evaluate(t);
        q * (gm / (s * (self.b + s).powi(2)))
    }
}

/// Navarro, Frenk & White (1996) halo, `Phi = -G m ln(1 + r / r_s) / r`.
///
/// `m` is the scale mass, `4 pi rho_0 r_s^3`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NFWPotential {
    /// Scale mass.
    pub m: ParameterField,

    /// Scale radius.
    pub r_s: f64,

    /// Unit system.
    pub units: UnitSystem,
}

impl NFWPotential {
    /// Construct a new NFW potential.
    #[must_use]
    pub fn new(m: impl Into<ParameterField>, r_s: f64, units: UnitSystem) -> Self {
        Self {
            m: m.into(),
            r_s,
            units,
        }
    }
}

impl Potential for NFWPotential {
    fn units(&self) -> &UnitSystem {
        &self.units
    }

    fn potential_energy(&self, q: &Vector3<f64>, t: f64) -> f64 {
        let gm = self.units.gravitational_constant() * self.m.evaluate(t);
        let r = q.norm();
        if r == 0.0 {
            return -gm / self.r_s;
        }
        -gm * (r / self.r_s).ln_1p() / r
    }

    fn gradient(&self, q: &Vector3<f64>, t: f64) -> Vector3<f64> {
        let r = q.norm();
        if r == 0.0 {
            return Vector3::zeros();
        }
        let gm = self.units.gravitational_constant() * self.m.evaluate(t);
        let dphi_dr = gm * ((r / self.r_s).ln_1p() / r.powi(2) - 1.0 / (r * (self.r_s + r)));
        q * (dphi_dr / r)
    }

    fn density(&self, q: &Vector3<f64>, t: f64) -> f64 {
        let x = q.norm() / self.r_s;
        self.m.evaluate(t) / (4.0 * PI * self.r_s.powi(3)) / (x * (1.0 + x).powi(2))
    }
}

/// Miyamoto & Nagai (1975) flattened disk,
/// `Phi = -G m / sqrt(R^2 + (a + sqrt(z^2 + b^2))^2)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MiyamotoNagaiPotential {
    /// Total mass.
    pub m: ParameterField,

    /// Scale length.
    pub a: f64,

    /// Scale height.
    pub b: f64,

    /// Unit system.
    pub units: UnitSystem,
}

impl MiyamotoNagaiPotential {
    /// Construct a new Miyamoto-Nagai disk.
    #[must_use]
    pub fn new(m: impl Into<ParameterField>, a: f64, b: f64, units: UnitSystem) -> Self {
        Self {
            m: m.into(),
            a,
            b,
            units,
        }
    }
}

impl Potential for MiyamotoNagaiPotential {
    fn units(&self) -> &UnitSystem {
        &self.units
    }

    fn potential_energy(&self, q: &Vector3<f64>, t: f64) -> f64 {
        let zb = q.z.hypot(self.b);
        let cyl_r2 = q.x.powi(2) + q.y.powi(2);
        -self.units.gravitational_constant() * self.m.evaluate(t)
            / (cyl_r2 + (self.a + zb).powi(2)).sqrt()
    }

    fn gradient(&self, q: &Vector3<f64>, t: f64) -> Vector3<f64> {
        let gm = self.units.gravitational_constant() * self.m.evaluate(t);
        let zb = q.z.hypot(self.b);
        let cyl_r2 = q.x.powi(2) + q.y.powi(2);
        let denom = (cyl_r2 + (self.a + zb).powi(2)).powf(1.5);
        Vector3::new(
            gm * q.x / denom,
            gm * q.y / denom,
            gm * q.z * (self.a + zb) / (zb * denom),
        )
    }

    fn density(&self, q: &Vector3<f64>, t: f64) -> f64 {
        let zb = q.z.hypot(self.b);
        let cyl_r2 = q.x.powi(2) + q.y.powi(2);
        let num = self.a * cyl_r2 + (self.a + 3.0 * zb) * (self.a + zb).powi(2);
        let denom = (cyl_r2 + (self.a + zb).powi(2)).powf(2.5) * zb.powi(3);
        self.b.powi(2) * self.m.evaluate(t) / (4.0 * PI) * num / denom
    }
}

/// Spherical logarithmic potential, `Phi = v_c^2 / 2 ln(r_s^2 + r^2)`.
///
/// The circular velocity tends to `v_c` at radii much larger than `r_s`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LogarithmicPotential {
    /// Asymptotic circular velocity.
    pub v_c: ParameterField,

    /// Core radius.
    pub r_s: f64,

    /// Unit system.
    pub units: UnitSystem,
}

impl LogarithmicPotential {
    /// Construct a new logarithmic potential.
    #[must_use]
    pub fn new(v_c: impl Into<ParameterField>, r_s: f64, units: UnitSystem) -> Self {
        Self {
            v_c: v_c.into(),
            r_s,
            units,
        }
    }
}

impl Potential for LogarithmicPotential {
    fn units(&self) -> &UnitSystem {
        &self.units
    }

    fn potential_energy(&self, q: &Vector3<f64>, t: f64) -> f64 {
        0.5 * self.v_c.evaluate(t).powi(2) * (self.r_s.powi(2) + q.norm_squared()).ln()
    }

    fn gradient(&self, q: &Vector3<f64>, t: f64) -> Vector3<f64> {
        q * (self.v_c.evaluate(t).powi(2) / (self.r_s.powi(2) + q.norm_squared()))
    }

    fn density(&self, q: &Vector3<f64>, t: f64) -> f64 {
        let rs2 = self.r_s.powi(2);
        let r2 = q.norm_squared();
        let laplacian = self.v_c.evaluate(t).powi(2) * (3.0 * rs2 + r2) / (rs2 + r2).powi(2);
        laplacian / (4.0 * PI * self.units.gravitational_constant())
    }
}

/// Long and Murali (1992) bar.
///
/// A uniform needle of half-length `a` along its long axis, smoothed by a
/// Miyamoto-Nagai profile with scale lengths `b` and `c`. The long axis lies in the
/// x-y plane at angle `alpha` from the x axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LongMuraliBarPotential {
    /// Total mass.
    pub m: ParameterField,

    /// Half-length of the bar.
    pub a: f64,

    /// Scale length of the smoothing.
    pub b: f64,

    /// Scale height of the smoothing.
    pub c: f64,

    /// Position angle of the long axis, radians.
    pub alpha: ParameterField,

    /// Unit system.
    pub units: UnitSystem,
}

impl LongMuraliBarPotential {
    /// Construct a new bar.
    #[must_use]
    pub fn new(
        m: impl Into<ParameterField>,
        a: f64,
        b: f64,
        c: f64,
        alpha: impl Into<ParameterField>,
        units: UnitSystem,
    ) -> Self {
        Self {
            m: m.into(),
            a,
            b,
            c,
            alpha: alpha.into(),
            units,
        }
    }

    /// Bar rotating about z with pattern speed `omega`, along the x axis at `t = 0`.
    #[must_use]
    pub fn rotating(
        m: impl Into<ParameterField>,
        a: f64,
        b: f64,
        c: f64,
        omega: f64,
        units: UnitSystem,
    ) -> Self {
        let alpha = ParameterField::Linear {
            value: 0.0,
            slope: omega,
        };
        Self::new(m, a, b, c, alpha, units)
    }

    /// Position in the frame of the bar, and the sine and cosine of its angle.
    fn to_bar_frame(&self, q: &Vector3<f64>, t: f64) -> (Vector3<f64>, f64, f64) {
        let (sin, cos) = self.alpha.evaluate(t).sin_cos();
        let x = q.x * cos + q.y * sin;
        let y = -q.x * sin + q.y * cos;
        (Vector3::new(x, y, q.z), sin, cos)
    }

    /// Distances from the two ends of the smoothed needle.
    fn end_distances(&self, q: &Vector3<f64>) -> (f64, f64, f64) {
        let s = self.b + q.z.hypot(self.c);
        let t_minus = ((self.a - q.x).powi(2) + q.y.powi(2) + s.powi(2)).sqrt();
        let t_plus = ((self.a + q.x).powi(2) + q.y.powi(2) + s.powi(2)).sqrt();
        (s, t_minus, t_plus)
    }
}

impl Potential for LongMuraliBarPotential {
    fn units(&self) -> &UnitSystem {
        &self.units
    }

    fn potential_energy(&self, q: &Vector3<f64>, t: f64) -> f64 {
        let (q, _, _) = self.to_bar_frame(q, t);
        let (_, t_minus, t_plus) = self.end_distances(&q);
        let k = self.units.gravitational_constant() * self.m.evaluate(t) / (2.0 * self.a);
        k * ((q.x - self.a + t_minus) / (q.x + self.a + t_plus)).ln()
    }

    fn gradient(&self, q: &Vector3<f64>, t: f64) -> Vector3<f64> {
        let (q, sin, cos) = self.to_bar_frame(q, t);
        let (s, t_minus, t_plus) = self.end_distances(&q);
        let k = self.units.gravitational_constant() * self.m.evaluate(t) / (2.0 * self.a);

        let inner = 1.0 / (t_minus * (q.x - self.a + t_minus))
            - 1.0 / (t_plus * (q.x + self.a + t_plus));
        let gx = k * (1.0 / t_minus - 1.0 / t_plus);
        let gy = k * q.y * inner;
        let gz = k * s * inner * q.z / q.z.hypot(self.c);

        Vector3::new(gx * cos - gy * sin, gx * sin + gy * cos, gz)
    }
}

/// Polynomial coefficients in `b / h_R` for the weights (first three rows) and
/// scale lengths (last three rows) of the three disks, Smith et al. (2015), for
/// a sech^2 vertical profile with positive density everywhere.
const MN3_COEFFICIENTS: [[f64; 5]; 6] = [
    [0.0036, -0.0330, 0.1117, -0.1335, 0.1749],
    [-0.0131, 0.1090, -0.3035, 0.2921, -5.7976],
    [-0.0048, 0.0454, -0.1425, 0.1012, 6.7120],
    [-0.0158, 0.0993, -0.2070, -0.7089, 0.6445],
    [-0.0319, 0.1514, -0.1279, -0.9325, 2.6836],
    [-0.0326, 0.1816, -0.2943, -0.6329, 2.3193],
];

/// Exponential disk approximated by three Miyamoto-Nagai disks (Smith et al. 2015).
///
/// The disk has radial scale length `h_r` and a sech^2 vertical profile of scale
/// height `h_z`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MN3ExponentialDiskPotential {
    /// Total mass.
    pub m: ParameterField,

    /// Radial scale length.
    pub h_r: f64,

    /// Vertical scale height.
    pub h_z: f64,

    /// Unit system.
    pub units: UnitSystem,
}

impl MN3ExponentialDiskPotential {
    /// Construct a new disk.
    #[must_use]
    pub fn new(m: impl Into<ParameterField>, h_r: f64, h_z: f64, units: UnitSystem) -> Self {
        Self {
            m: m.into(),
            h_r,
            h_z,
            units,
        }
    }

    /// The three Miyamoto-Nagai disks at time `t`.
    #[must_use]
    pub fn disks(&self, t: f64) -> [MiyamotoNagaiPotential; 3] {
        let hzr = self.h_z / self.h_r;
        let b_hr = -0.033 * hzr.powi(3) + 0.262 * hzr.powi(2) + 0.659 * hzr;
        let powers = [b_hr.powi(4), b_hr.powi(3), b_hr.powi(2), b_hr, 1.0];
        let poly = |row: &[f64; 5]| row.iter().zip(powers).map(|(k, x)| k * x).sum::<f64>();

        let m = self.m.evaluate(t);
        let b = b_hr * self.h_r;
        std::array::from_fn(|idx| {
            let weight = poly(&MN3_COEFFICIENTS[idx]);
            let a = poly(&MN3_COEFFICIENTS[idx + 3]) * self.h_r;
            MiyamotoNagaiPotential::new(m * weight, a, b, self.units)
        })
    }
}

impl Potential for MN3ExponentialDiskPotential {
    fn units(&self) -> &UnitSystem {
        &self.units
    }

    fn potential_energy(&self, q: &Vector3<f64>, t: f64) -> f64 {
        self.disks(t)
            .iter()
            .map(|disk| disk.potential_energy(q, t))
            .sum()
    }

    fn gradient(&self, q: &Vector3<f64>, t: f64) -> Vector3<f64> {
        self.disks(t)
            .iter()
            .fold(Vector3::zeros(), |acc, disk| acc + disk.gradient(q, t))
    }

    fn density(&self, q: &Vector3<f64>, t: f64) -> f64 {
        self.disks(t).iter().map(|disk| disk.density(q, t)).sum()
    }
}
