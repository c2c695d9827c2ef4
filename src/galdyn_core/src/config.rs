//! Runtime configuration of integrators and stream generation.
//!
//! Every field has a default, so partial JSON documents are accepted:
//!
//! ```
//!     use galdyn_core::config::{DynamicsConfig, IntegratorKind};
//!
//!     let config = DynamicsConfig::from_json(
//!         r#"{"integrator": {"kind": "Leapfrog", "leapfrog_dt": 0.5}}"#,
//!     ).unwrap();
//!     assert_eq!(config.integrator.kind, IntegratorKind::Leapfrog);
//!     assert_eq!(config.integrator.leapfrog_dt, 0.5);
//!     assert_eq!(config.stream.seed, 0);
//! ```
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::dynamics::{DormandPrince, Integrator, Leapfrog, PicardChebyshev};
use crate::errors::{Error, GalResult};
use crate::io::FileIO;

/// Integration scheme selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum IntegratorKind {
    /// Adaptive Dormand-Prince 5(4).
    #[default]
    DormandPrince,

    /// Fixed step kick-drift-kick leapfrog.
    Leapfrog,

    /// Picard-Chebyshev iteration.
    PicardChebyshev,
}

/// Integrator settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IntegratorConfig {
    /// Which integrator to construct.
    pub kind: IntegratorKind,

    /// Relative tolerance of adaptive integrators.
    pub rtol: f64,

    /// Absolute tolerance of adaptive integrators.
    pub atol: f64,

    /// Maximum number of accepted plus rejected steps before giving up.
    pub max_steps: usize,

    /// Step size of the leapfrog integrator, in the time unit of the potential.
    pub leapfrog_dt: f64,

    /// Convergence tolerance of the Picard iteration, relative to the state scale.
    pub picard_tol: f64,
}

impl Default for IntegratorConfig {
    fn default() -> Self {
        Self {
            kind: IntegratorKind::default(),
            rtol: 1e-10,
            atol: 1e-12,
            max_steps: 1_000_000,
            leapfrog_dt: 0.1,
            picard_tol: 1e-13,
        }
    }
}

impl IntegratorConfig {
    /// Construct the configured integrator.
    ///
    /// # Errors
    /// [`Error::ValueError`] if tolerances or step sizes are not finite and positive.
    pub fn build(&self) -> GalResult<Box<dyn Integrator>> {
        Ok(match self.kind {
            IntegratorKind::DormandPrince => Box::new(DormandPrince::new(
                self.rtol,
                self.atol,
                self.max_steps,
            )?),
            IntegratorKind::Leapfrog => Box::new(Leapfrog::new(self.leapfrog_dt)?),
            IntegratorKind::PicardChebyshev => Box::new(PicardChebyshev::new(self.picard_tol)?),
        })
    }
}

/// Mock stream generation settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamConfig {
    /// Seed of the random number generator.
    pub seed: u64,

    /// Release a pair of particles every `release_every` saved progenitor times.
    pub release_every: usize,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            release_every: 1,
        }
    }
}

/// Top level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DynamicsConfig {
    /// Integrator settings.
    pub integrator: IntegratorConfig,

    /// Stream settings.
    pub stream: StreamConfig,
}

impl FileIO for DynamicsConfig {}

impl DynamicsConfig {
    /// Parse configuration from a JSON document.
    ///
    /// # Errors
    /// Fails on malformed JSON, or if the resulting settings are invalid.
    pub fn from_json(json: &str) -> GalResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read configuration from a JSON file.
    ///
    /// # Errors
    /// Fails if the file cannot be read, or [`DynamicsConfig::from_json`] fails.
    pub fn from_json_file(path: impl AsRef<Path>) -> GalResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json(&contents)
    }

    /// Check that all settings are usable.
    ///
    /// # Errors
    /// [`Error::ValueError`] describing the first invalid setting.
    pub fn validate(&self) -> GalResult<()> {
        let _ = self.integrator.build()?;
        if self.stream.release_every == 0 {
            return Err(Error::ValueError(
                "Stream release_every must be at least 1.".into(),
            ));
        }
        Ok(())
    }
}
