//! Physical constants and unit scales.
//!
//! All values are expressed in SI.

/// Newtonian gravitational constant in m^3 / (kg s^2), CODATA 2018.
pub const GRAVITATIONAL_CONSTANT: f64 = 6.674_30e-11;

/// Nominal solar mass in kg, derived from the IAU 2015 nominal solar GM.
pub const SOLAR_MASS: f64 = 1.988_409_870_698_051e30;

/// Astronomical unit in meters (IAU 2012 exact definition).
pub const AU: f64 = 1.495_978_707e11;

/// Parsec in meters.
pub const PARSEC: f64 = 3.085_677_581_491_367_3e16;

/// Kiloparsec in meters.
pub const KILOPARSEC: f64 = 1e3 * PARSEC;

/// Length of a day in seconds.
pub const DAY: f64 = 86_400.0;

/// Julian year in seconds.
pub const JULIAN_YEAR: f64 = 365.25 * DAY;

/// Megayear (Julian) in seconds.
pub const MEGAYEAR: f64 = 1e6 * JULIAN_YEAR;

/// Kilometer per second in m/s.
pub const KM_PER_S: f64 = 1e3;
