//! # Dynamics
//! Integration of test particles through potentials.
//!
//! The equations of motion of a [`Potential`](crate::potential::Potential) are
//! wrapped in a [`HamiltonianField`], which any [`Integrator`] can advance. Orbits
//! and mock streams are built on top of these.
//!
//! There are three integrators:
//!
//! - [`DormandPrince`], adaptive 5th order Runge-Kutta, for general use.
//! - [`Leapfrog`], fixed step and symplectic, for long integrations.
//! - [`PicardChebyshev`], smooth segments fit by Chebyshev polynomials.

mod field;
pub mod funcs;
mod integrator;
mod mockstream;
mod orbit;
mod picard;

pub use self::field::{HamiltonianField, State, split_state, to_state};
pub use self::funcs::{lagrange_points, tidal_radius};
pub use self::integrator::{DormandPrince, Integrator, Leapfrog};
pub use self::mockstream::{FardalStreamDF, MockStream, MockStreamGenerator, StreamSample};
pub use self::orbit::{InterpolatedOrbit, Orbit, evaluate_orbit, evaluate_orbits};
pub use self::picard::{PC15, PicardChebyshev, PicardCoefficients, PicardStep};
