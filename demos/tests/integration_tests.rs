//! Integration tests for the demo suite.

use approx::assert_abs_diff_eq;

use qtrot_demos::{TfimConfig, TfimRunner};
use qtrot_sim::DType;

/// Small rings track exact evolution closely.
#[test]
fn test_tfim_run_matches_exact() {
    let config = TfimConfig {
        nqubits: 4,
        dt: 0.01,
        total_time: 0.3,
        ..TfimConfig::default()
    };
    let result = TfimRunner::new(config).run().unwrap();

    assert_eq!(result.n_steps, 30);
    assert_eq!(result.gates, 8);
    assert!(result.fidelity > 0.9999, "fidelity {}", result.fidelity);
    assert_abs_diff_eq!(result.trotter_energy, result.exact_energy, epsilon = 1e-3);
    assert!(result.ground_energy <= result.exact_energy + 1e-9);
}

/// Odd rings work too.
#[test]
fn test_tfim_run_odd_ring() {
    let config = TfimConfig {
        nqubits: 5,
        total_time: 0.2,
        ..TfimConfig::default()
    };
    let result = TfimRunner::new(config).run().unwrap();
    // Parts of 3 and 2 bonds, swept twice.
    assert_eq!(result.gates, 10);
    assert!(result.fidelity > 0.99);
}

/// Single precision still runs end to end.
#[test]
fn test_tfim_single_precision() {
    let config = TfimConfig {
        nqubits: 4,
        total_time: 0.2,
        precision: DType::Complex64,
        ..TfimConfig::default()
    };
    let runner = TfimRunner::new(config);
    assert_eq!(runner.hamiltonian().unwrap().dtype(), DType::Complex64);
    let result = runner.run().unwrap();
    assert!(result.fidelity > 0.99);
}

/// Config files may omit fields and must not carry unknown ones.
#[test]
fn test_config_parsing() {
    let config = TfimConfig::from_json(r#"{"nqubits": 3, "precision": "complex64"}"#).unwrap();
    assert_eq!(config.nqubits, 3);
    assert_eq!(config.precision, DType::Complex64);
    assert_eq!(config.dt, TfimConfig::default().dt);

    assert!(TfimConfig::from_json(r#"{"qubits": 3}"#).is_err());
}

/// Invalid parameters surface as errors rather than panics.
#[test]
fn test_invalid_config_rejected() {
    let too_small = TfimConfig {
        nqubits: 1,
        ..TfimConfig::default()
    };
    assert!(TfimRunner::new(too_small).run().is_err());

    let bad_dt = TfimConfig {
        nqubits: 3,
        dt: -0.1,
        ..TfimConfig::default()
    };
    assert!(TfimRunner::new(bad_dt).run().is_err());
}
