//! Mock stream generation through the public interface.
use galdyn_core::prelude::*;
use nalgebra::Vector3;
use tracing_subscriber::EnvFilter;

fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

#[test]
fn stream_from_config_file() {
    init_logging();
    let dir = tempfile::tempdir().unwrap();
    let config_path = dir.path().join("config.json");
    std::fs::write(
        &config_path,
        r#"{
            "integrator": {"kind": "Leapfrog", "leapfrog_dt": 0.2},
            "stream": {"seed": 11, "release_every": 4}
        }"#,
    )
    .unwrap();
    let config = DynamicsConfig::from_json_file(&config_path).unwrap();

    let mw = milky_way_potential();
    let generator = MockStreamGenerator::from_config(&mw, &config).unwrap();
    let prog = PhaseSpaceTimePosition::scalar(
        Vector3::new(12.0, 0.0, 1.0),
        Vector3::new(0.0, 0.19, 0.0),
        0.0,
        UnitSystem::galactic(),
    );
    let times: Vec<f64> = (0..=40).map(|idx| f64::from(idx) * 5.0).collect();
    let stream = generator.run(&prog, 1e6, &times).unwrap();

    assert_eq!(stream.release_times.len(), 10);
    assert_eq!(stream.lead.shape(), vec![10]);
    assert_eq!(stream.trail.shape(), vec![10]);

    // every particle ends up near the progenitor
    let prog_final = stream.progenitor.final_state().unwrap().q()[0];
    for q in stream.lead.q().iter().chain(stream.trail.q()) {
        assert!((q - prog_final).norm() < 5.0, "{q}");
    }

    let stream_path = dir.path().join("stream.bin");
    let _ = stream.save(&stream_path).unwrap();
    assert_eq!(MockStream::load(&stream_path).unwrap(), stream);
}

#[test]
fn progenitor_in_other_units() {
    init_logging();
    let mw = milky_way_potential();
    let generator = MockStreamGenerator::new(
        FardalStreamDF::default(),
        &mw,
        DormandPrince::default(),
        StreamConfig::default(),
    )
    .unwrap();

    let kms = 1.0227121650537077e-3;
    let galactic = PhaseSpaceTimePosition::scalar(
        Vector3::new(10.0, 0.0, 0.0),
        Vector3::new(0.0, 200.0 * kms, 0.0),
        0.0,
        UnitSystem::galactic(),
    );
    let si = galactic.convert_to(&UnitSystem::si()).unwrap();
    let myr = UnitSystem::galactic().scale(Dimension::Time);

    let a = generator.run(&galactic, 1e5, &[0.0, 10.0, 20.0]).unwrap();
    let b = generator
        .run(&si, 1e5, &[0.0, 10.0 * myr, 20.0 * myr])
        .unwrap();
    assert_eq!(b.lead.units(), &UnitSystem::galactic());
    for (qa, qb) in a.lead.q().iter().zip(b.lead.q()) {
        assert!((qa - qb).norm() < 1e-6);
    }
}
