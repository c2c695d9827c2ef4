//! # Coordinates
//!
//! Phase-space positions, with and without time, and the [`operators`] which act on
//! them.
//!
//! All phase-space positions share [`AbstractPhaseSpacePositionBase`]. Positions
//! without time refine it with [`AbstractPhaseSpacePosition`] and positions with time
//! with [`AbstractPhaseSpaceTimePosition`].

mod base;
pub mod operators;
mod psp;
mod pspt;
mod representation;
mod shape;

pub use self::base::AbstractPhaseSpacePositionBase;
pub use self::psp::{AbstractPhaseSpacePosition, PhaseSpacePosition};
pub use self::pspt::{AbstractPhaseSpaceTimePosition, PhaseSpaceTimePosition, Times};
pub use self::representation::Representation;

/// Public names of the coordinates namespace, in order.
pub const EXPORTS: [&str; 6] = [
    "operators",
    "AbstractPhaseSpacePositionBase",
    "AbstractPhaseSpacePosition",
    "PhaseSpacePosition",
    "AbstractPhaseSpaceTimePosition",
    "PhaseSpaceTimePosition",
];
