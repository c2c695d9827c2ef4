//! Orbit integration through the public interface.
use galdyn_core::coordinates::operators::{
    ConstantRotationZOperator, GalileanSpatialTranslationOperator, OperatorSequence,
};
use galdyn_core::prelude::*;
use nalgebra::Vector3;

fn progenitor() -> PhaseSpaceTimePosition {
    PhaseSpaceTimePosition::scalar(
        Vector3::new(10.0, 0.0, 0.0),
        Vector3::new(0.0, 0.2, 0.02),
        0.0,
        UnitSystem::galactic(),
    )
}

fn output_times() -> Vec<f64> {
    (1..=50).map(|idx| f64::from(idx) * 10.0).collect()
}

#[test]
fn integrators_agree() {
    let mw = milky_way_potential();
    let times = output_times();

    let reference = evaluate_orbit(&mw, &progenitor(), &times, &DormandPrince::default()).unwrap();
    let picard = evaluate_orbit(
        &mw,
        &progenitor(),
        &times,
        &PicardChebyshev::new(1e-12).unwrap(),
    )
    .unwrap();
    let leapfrog =
        evaluate_orbit(&mw, &progenitor(), &times, &Leapfrog::new(0.05).unwrap()).unwrap();

    for ((q_ref, q_pc), q_lf) in reference
        .w()
        .q()
        .iter()
        .zip(picard.w().q())
        .zip(leapfrog.w().q())
    {
        assert!((q_ref - q_pc).norm() < 1e-5, "{q_ref} {q_pc}");
        assert!((q_ref - q_lf).norm() < 1e-2, "{q_ref} {q_lf}");
    }

    let energy = reference.energy(&mw).unwrap();
    for e in &energy {
        assert!((e - energy[0]).abs() < 1e-8 * energy[0].abs());
    }
    let pericenter = reference.pericenter().unwrap();
    let apocenter = reference.apocenter().unwrap();
    assert!(pericenter < apocenter);
    assert!(apocenter < 10.5);
}

#[test]
fn integrator_from_config() {
    let config = DynamicsConfig::from_json(
        r#"{"integrator": {"kind": "PicardChebyshev", "picard_tol": 1e-12}}"#,
    )
    .unwrap();
    let integrator = config.integrator.build().unwrap();
    let mw = milky_way_potential();
    let orbit = evaluate_orbit(&mw, &progenitor(), &[100.0], integrator.as_ref()).unwrap();
    assert_eq!(orbit.len(), 1);
}

#[test]
fn jacobi_energy_in_rotating_potential() {
    let units = UnitSystem::galactic();
    let pattern_speed = 0.03;
    let clump = PotentialFrame::new(
        HernquistPotential::new(2e10, 0.5, units),
        OperatorSequence::default()
            .then(GalileanSpatialTranslationOperator::new(Vector3::new(
                2.0, 0.0, 0.0,
            )))
            .then(ConstantRotationZOperator::new(pattern_speed)),
    );
    let pot = CompositePotential::new(units)
        .with("halo", NFWPotential::new(5.4e11, 15.62, units))
        .unwrap()
        .with("clump", clump)
        .unwrap();

    let w0 = PhaseSpaceTimePosition::scalar(
        Vector3::new(8.0, 0.0, 0.0),
        Vector3::new(0.0, 0.15, 0.0),
        0.0,
        units,
    );
    let orbit = evaluate_orbit(&pot, &w0, &output_times(), &DormandPrince::default()).unwrap();

    let jacobi: Vec<f64> = orbit
        .energy(&pot)
        .unwrap()
        .iter()
        .zip(orbit.angular_momentum())
        .map(|(e, l)| e - pattern_speed * l.z)
        .collect();
    for e_j in &jacobi {
        assert!((e_j - jacobi[0]).abs() < 1e-7 * jacobi[0].abs());
    }
    // energy alone is not conserved in a rotating potential
    let energy = orbit.energy(&pot).unwrap();
    assert!(
        energy
            .iter()
            .any(|e| (e - energy[0]).abs() > 1e-5 * energy[0].abs())
    );
}

#[test]
fn orbit_file_io() {
    let mw = milky_way_potential();
    let orbit = evaluate_orbit(&mw, &progenitor(), &output_times(), &DormandPrince::default())
        .unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("orbit.bin");
    let _ = orbit.save(&path).unwrap();
    assert_eq!(Orbit::load(&path).unwrap(), orbit);
}
