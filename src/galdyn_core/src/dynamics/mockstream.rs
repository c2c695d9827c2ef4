//! Mock stellar streams by particle spray.
//!
//! Pairs of particles are released from near the Lagrange points of a progenitor
//! along its orbit, following the distribution function of Fardal, Huang and Weinberg
//! (2015), "Generation of mock tidal streams". Each particle is then integrated as a
//! test particle in the host potential, the progenitor's own gravity is ignored.
use itertools::Itertools;
use nalgebra::Vector3;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::StandardNormal;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use super::field::{HamiltonianField, split_state, to_state};
use super::funcs::{orbital_angular_velocity_mag, tidal_radius};
use super::integrator::Integrator;
use super::orbit::{Orbit, evaluate_orbit};
use crate::config::{DynamicsConfig, StreamConfig};
use crate::coordinates::{AbstractPhaseSpacePositionBase, PhaseSpaceTimePosition};
use crate::errors::{Error, GalResult};
use crate::io::FileIO;
use crate::potential::Potential;

/// Release distribution of Fardal et al. (2015).
///
/// Offsets are in units of the tidal radius for positions, and of the tidal radius
/// times the orbital angular velocity for velocities.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FardalStreamDF {
    /// Mean radial offset.
    pub kr_bar: f64,

    /// Mean azimuthal velocity offset, scaled by the sampled radial offset.
    pub kvphi_bar: f64,

    /// Mean vertical offset.
    pub kz_bar: f64,

    /// Mean vertical velocity offset.
    pub kvz_bar: f64,

    /// Spread of the radial offset.
    pub sigma_kr: f64,

    /// Spread of the azimuthal velocity offset.
    pub sigma_kvphi: f64,

    /// Spread of the vertical offset.
    pub sigma_kz: f64,

    /// Spread of the vertical velocity offset.
    pub sigma_kvz: f64,
}

impl Default for FardalStreamDF {
    fn default() -> Self {
        Self {
            kr_bar: 2.0,
            kvphi_bar: 0.3,
            kz_bar: 0.0,
            kvz_bar: 0.0,
            sigma_kr: 0.5,
            sigma_kvphi: 0.5,
            sigma_kz: 0.5,
            sigma_kvz: 0.5,
        }
    }
}

/// Initial conditions of one released pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StreamSample {
    /// Position of the leading particle.
    pub q_lead: Vector3<f64>,

    /// Velocity of the leading particle.
    pub p_lead: Vector3<f64>,

    /// Position of the trailing particle.
    pub q_trail: Vector3<f64>,

    /// Velocity of the trailing particle.
    pub p_trail: Vector3<f64>,
}

impl FardalStreamDF {
    /// Draw a leading and trailing particle around a progenitor at `(q, p)` at time `t`.
    ///
    /// Everything is in the units of the potential, including `prog_mass`. The
    /// leading particle is released from the inner Lagrange point, the trailing one
    /// from the outer, with mirrored offsets.
    ///
    /// # Errors
    /// [`Error::ValueError`] if the progenitor has no angular momentum, or the tidal
    /// radius is undefined.
    pub fn sample<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        potential: &dyn Potential,
        q: &Vector3<f64>,
        p: &Vector3<f64>,
        prog_mass: f64,
        t: f64,
    ) -> GalResult<StreamSample> {
        let l_vec = q.cross(p);
        let l_mag = l_vec.norm();
        if l_mag == 0.0 {
            return Err(Error::ValueError(
                "Progenitor on a radial orbit, the orbital plane is undefined.".into(),
            ));
        }
        let z_hat = l_vec / l_mag;
        let r_hat = q.normalize();
        let phi_hat = (p - r_hat * p.dot(&r_hat)).normalize();

        let r_t = tidal_radius(potential, q, p, prog_mass, t)?;
        let v_circ = orbital_angular_velocity_mag(q, p) * r_t;

        let kr = self.kr_bar + rng.sample::<f64, _>(StandardNormal) * self.sigma_kr;
        let kvphi =
            kr * (self.kvphi_bar + rng.sample::<f64, _>(StandardNormal) * self.sigma_kvphi);
        let kz = self.kz_bar + rng.sample::<f64, _>(StandardNormal) * self.sigma_kz;
        let kvz = self.kvz_bar + rng.sample::<f64, _>(StandardNormal) * self.sigma_kvz;

        let dq = (r_hat * kr + z_hat * kz) * r_t;
        let dp = (phi_hat * kvphi + z_hat * kvz) * v_circ;
        Ok(StreamSample {
            q_lead: q - dq,
            p_lead: p - dp,
            q_trail: q + dq,
            p_trail: p + dp,
        })
    }
}

/// Result of a stream generation run, in the units of the host potential.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MockStream {
    /// Leading arm at the final time, one particle per release.
    pub lead: PhaseSpaceTimePosition,

    /// Trailing arm at the final time, one particle per release.
    pub trail: PhaseSpaceTimePosition,

    /// Orbit of the progenitor.
    pub progenitor: Orbit,

    /// Release time of each pair, matching the order of `lead` and `trail`.
    pub release_times: Vec<f64>,
}

impl FileIO for MockStream {}

/// Releases and integrates stream particles along a progenitor orbit.
#[derive(Debug)]
pub struct MockStreamGenerator<'a> {
    df: FardalStreamDF,
    potential: &'a dyn Potential,
    integrator: Box<dyn Integrator>,
    config: StreamConfig,
}

impl<'a> MockStreamGenerator<'a> {
    /// Construct a new generator.
    ///
    /// # Errors
    /// [`Error::ValueError`] if `release_every` is zero.
    pub fn new(
        df: FardalStreamDF,
        potential: &'a dyn Potential,
        integrator: impl Integrator + 'static,
        config: StreamConfig,
    ) -> GalResult<Self> {
        if config.release_every == 0 {
            return Err(Error::ValueError(
                "Stream release_every must be at least 1.".into(),
            ));
        }
        Ok(Self {
            df,
            potential,
            integrator: Box::new(integrator),
            config,
        })
    }

    /// Construct a generator with the default distribution function, from a
    /// configuration.
    ///
    /// # Errors
    /// Fails if the configuration is invalid.
    pub fn from_config(potential: &'a dyn Potential, config: &DynamicsConfig) -> GalResult<Self> {
        config.validate()?;
        Ok(Self {
            df: FardalStreamDF::default(),
            potential,
            integrator: config.integrator.build()?,
            config: config.stream.clone(),
        })
    }

    /// The release distribution.
    #[must_use]
    pub fn df(&self) -> &FardalStreamDF {
        &self.df
    }

    /// Generate a stream.
    ///
    /// The progenitor is integrated from `prog_w0` through `times` (in the units of
    /// `prog_w0`), and a pair is released at every `release_every`-th saved time
    /// before the last. `prog_mass` is in the mass unit of the potential.
    ///
    /// # Errors
    /// [`Error::ValueError`] if there is no time to release particles at, or any
    /// failure of the release distribution or the integrator.
    pub fn run(
        &self,
        prog_w0: &PhaseSpaceTimePosition,
        prog_mass: f64,
        times: &[f64],
    ) -> GalResult<MockStream> {
        let progenitor = evaluate_orbit(self.potential, prog_w0, times, self.integrator.as_ref())?;
        let prog_times = progenitor.times();
        let Some(&t_final) = prog_times.last() else {
            return Err(Error::ValueError(
                "At least one output time is required to generate a stream.".into(),
            ));
        };
        let release_idx = (0..prog_times.len() - 1)
            .step_by(self.config.release_every)
            .collect_vec();
        if release_idx.is_empty() {
            tracing::warn!("No release times before the final time, the stream is empty.");
        }

        let field = HamiltonianField::new(self.potential);
        let w = progenitor.w();
        let released: Vec<_> = release_idx
            .par_iter()
            .map(|&idx| {
                let t_release = prog_times[idx];
                let mut rng = StdRng::seed_from_u64(self.config.seed.wrapping_add(idx as u64));
                let sample = self.df.sample(
                    &mut rng,
                    self.potential,
                    &w.q()[idx],
                    &w.p()[idx],
                    prog_mass,
                    t_release,
                )?;
                let lead = self.integrator.integrate(
                    &field,
                    &to_state(&sample.q_lead, &sample.p_lead),
                    t_release,
                    &[t_final],
                )?;
                let trail = self.integrator.integrate(
                    &field,
                    &to_state(&sample.q_trail, &sample.p_trail),
                    t_release,
                    &[t_final],
                )?;
                let (q_lead, p_lead) = split_state(&lead[0]);
                let (q_trail, p_trail) = split_state(&trail[0]);
                Ok((q_lead, p_lead, q_trail, p_trail))
            })
            .collect::<GalResult<_>>()?;

        let (q_lead, p_lead, q_trail, p_trail): (Vec<_>, Vec<_>, Vec<_>, Vec<_>) =
            released.into_iter().multiunzip();
        let release_times = release_idx.iter().map(|&idx| prog_times[idx]).collect_vec();
        let units = *self.potential.units();

        tracing::info!(
            "Generated mock stream with {} particle pairs, released over [{}, {t_final}]",
            release_times.len(),
            prog_times[0]
        );
        Ok(MockStream {
            lead: PhaseSpaceTimePosition::new(q_lead, p_lead, t_final, units)?,
            trail: PhaseSpaceTimePosition::new(q_trail, p_trail, t_final, units)?,
            progenitor,
            release_times,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coordinates::AbstractPhaseSpaceTimePosition;
    use crate::dynamics::Leapfrog;
    use crate::potential::milky_way_potential;
    use crate::units::UnitSystem;

    fn progenitor() -> PhaseSpaceTimePosition {
        PhaseSpaceTimePosition::scalar(
            Vector3::new(10.0, 0.0, 0.0),
            Vector3::new(0.0, 0.2, 0.02),
            0.0,
            UnitSystem::galactic(),
        )
    }

    #[test]
    fn test_sample_mirrored() {
        let pot = milky_way_potential();
        let df = FardalStreamDF::default();
        let mut rng = StdRng::seed_from_u64(3);
        let q = Vector3::new(10.0, 0.0, 0.0);
        let p = Vector3::new(0.0, 0.2, 0.0);
        let r_t = tidal_radius(&pot, &q, &p, 1e5, 0.0).unwrap();

        let mut lead_r = 0.0;
        let mut trail_r = 0.0;
        for _ in 0..100 {
            let sample = df.sample(&mut rng, &pot, &q, &p, 1e5, 0.0).unwrap();
            assert!(((sample.q_lead - q) + (sample.q_trail - q)).norm() < 1e-12);
            assert!(((sample.p_lead - p) + (sample.p_trail - p)).norm() < 1e-12);
            lead_r += sample.q_lead.norm();
            trail_r += sample.q_trail.norm();
        }
        lead_r /= 100.0;
        trail_r /= 100.0;
        assert!(lead_r < 10.0 && trail_r > 10.0);
        // mean radial offset is kr_bar tidal radii
        assert!((trail_r - 10.0 - 2.0 * r_t).abs() < 0.3 * r_t);
    }

    #[test]
    fn test_radial_orbit() {
        let pot = milky_way_potential();
        let mut rng = StdRng::seed_from_u64(0);
        let q = Vector3::new(10.0, 0.0, 0.0);
        let res = FardalStreamDF::default().sample(&mut rng, &pot, &q, &q, 1e5, 0.0);
        assert!(res.is_err());
    }

    #[test]
    fn test_run() {
        let pot = milky_way_potential();
        let config = StreamConfig {
            seed: 7,
            release_every: 2,
        };
        let generator = MockStreamGenerator::new(
            FardalStreamDF::default(),
            &pot,
            Leapfrog::new(0.1).unwrap(),
            config,
        )
        .unwrap();
        let times: Vec<f64> = (0..=20).map(|idx| f64::from(idx) * 10.0).collect();
        let stream = generator.run(&progenitor(), 1e6, &times).unwrap();

        assert_eq!(stream.lead.num_particles(), 10);
        assert_eq!(stream.trail.num_particles(), 10);
        assert_eq!(stream.release_times[..3], [0.0, 20.0, 40.0]);
        assert_eq!(stream.progenitor.len(), 21);
        assert_eq!(stream.lead.t_at(9).unwrap(), 200.0);

        // the leading arm is more bound than the progenitor, the trailing arm less
        let e_prog = stream.progenitor.energy(&pot).unwrap()[0];
        let mean = |e: Vec<f64>| e.iter().sum::<f64>() / e.len() as f64;
        let e_lead = mean(stream.lead.energy(&pot).unwrap());
        let e_trail = mean(stream.trail.energy(&pot).unwrap());
        assert!(e_lead < e_prog && e_prog < e_trail, "{e_lead} {e_prog} {e_trail}");

        let again = generator.run(&progenitor(), 1e6, &times).unwrap();
        assert_eq!(again, stream);

        let other = MockStreamGenerator::new(
            FardalStreamDF::default(),
            &pot,
            Leapfrog::new(0.1).unwrap(),
            StreamConfig {
                seed: 8,
                release_every: 2,
            },
        )
        .unwrap()
        .run(&progenitor(), 1e6, &times)
        .unwrap();
        assert_ne!(other.lead, stream.lead);
    }

    #[test]
    fn test_from_config() {
        let pot = milky_way_potential();
        let mut config = DynamicsConfig::default();
        config.stream.release_every = 0;
        assert!(MockStreamGenerator::from_config(&pot, &config).is_err());

        config.stream.release_every = 5;
        let generator = MockStreamGenerator::from_config(&pot, &config).unwrap();
        assert_eq!(generator.df(), &FardalStreamDF::default());
        let stream = generator.run(&progenitor(), 1e5, &[0.0, 50.0]).unwrap();
        assert_eq!(stream.release_times, vec![0.0]);
        assert!(generator.run(&progenitor(), 1e5, &[]).is_err());
    }
}
