//! Potential parameters which may vary with time.
//!
//! A parameter is constant, linear in time, or any user function of time.
use serde::{Deserialize, Serialize};

/// Value of a potential parameter as a function of time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ParameterField {
    /// Constant in time.
    Constant(f64),

    /// `value + slope * t`.
    Linear {
        /// Value at `t = 0`.
        value: f64,

        /// Rate of change per unit time.
        slope: f64,
    },

    /// Arbitrary function of time.
    ///
    /// Functions cannot be saved, serializing a potential holding one fails.
    #[serde(skip)]
    Function(fn(f64) -> f64),
}

impl ParameterField {
    /// Value of the parameter at time `t`.
    #[inline(always)]
    #[must_use]
    pub fn evaluate(&self, t: f64) -> f64 {
        match self {
            Self::Constant(value) => *value,
            Self::Linear { value, slope } => value + slope * t,
            Self::Function(func) => func(t),
        }
    }

    /// True if the parameter does not change with time.
    #[must_use]
    pub fn is_constant(&self) -> bool {
        match self {
            Self::Constant(_) => true,
            Self::Linear { slope, .. } => *slope == 0.0,
            Self::Function(_) => false,
        }
    }
}

impl From<f64> for ParameterField {
    fn from(value: f64) -> Self {
        Self::Constant(value)
    }
}
