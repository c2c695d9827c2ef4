//! # galdyn Core
//! Phase-space coordinates, gravitational potentials, and orbit integration for
//! galactic dynamics.
//!
//! Positions are batches of Cartesian `(q, p)` pairs with an optional time, carrying
//! the unit system they are expressed in. Potentials evaluate in their own unit
//! system, and positions are converted into it when they meet.
//!
//! ```
//!     use galdyn_core::prelude::*;
//!     use nalgebra::Vector3;
//!
//!     let mw = milky_way_potential();
//!     let sun = PhaseSpaceTimePosition::scalar(
//!         Vector3::new(8.0, 0.0, 0.0),
//!         Vector3::new(0.0, 0.237, 0.0),
//!         0.0,
//!         UnitSystem::galactic(),
//!     );
//!     let orbit = evaluate_orbit(&mw, &sun, &[50.0, 100.0], &DormandPrince::default()).unwrap();
//!     assert!((orbit.apocenter().unwrap() - 8.0).abs() < 0.05);
//! ```
//!

pub mod config;
pub mod constants;
pub mod coordinates;
pub mod dynamics;
pub mod errors;
pub mod io;
pub mod potential;
pub mod units;

/// Common useful imports
pub mod prelude {
    pub use crate::config::{DynamicsConfig, IntegratorConfig, IntegratorKind, StreamConfig};
    pub use crate::coordinates::{
        AbstractPhaseSpacePosition, AbstractPhaseSpacePositionBase,
        AbstractPhaseSpaceTimePosition, PhaseSpacePosition, PhaseSpaceTimePosition,
        Representation, Times,
    };
    pub use crate::dynamics::{
        DormandPrince, FardalStreamDF, HamiltonianField, Integrator, InterpolatedOrbit, Leapfrog,
        MockStream, MockStreamGenerator, Orbit, PicardChebyshev, evaluate_orbit, evaluate_orbits,
        lagrange_points, tidal_radius,
    };
    pub use crate::errors::{Error, GalResult};
    pub use crate::io::FileIO;
    pub use crate::potential::{
        CompositePotential, HernquistPotential, IsochronePotential, KeplerPotential,
        LogarithmicPotential, LongMuraliBarPotential, MN3ExponentialDiskPotential,
        MiyamotoNagaiPotential, NFWPotential, NullPotential, ParameterField, PlummerPotential,
        Potential, PotentialFrame, milky_way_potential, milky_way_potential_2022,
    };
    pub use crate::units::{Dimension, UnitSystem};
}
