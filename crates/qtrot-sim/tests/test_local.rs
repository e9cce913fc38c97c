//! Tests for local Hamiltonian construction, dense reconstruction and scaling.

use std::sync::Arc;

use approx::assert_abs_diff_eq;
use ndarray::{Array1, Array2};
use num_complex::Complex64;

use qtrot_sim::backend::{DType, NalgebraBackend};
use qtrot_sim::dense::DenseHamiltonian;
use qtrot_sim::local::{LocalHamiltonian, LocalHamiltonianBuilder, TermId};
use qtrot_sim::{SimError, matrices, models};

fn assert_matrix_close(a: &Array2<Complex64>, b: &Array2<Complex64>, tol: f64) {
    assert_eq!(a.dim(), b.dim());
    for (x, y) in a.iter().zip(b.iter()) {
        assert!((x - y).norm() < tol, "{x} != {y}");
    }
}

fn z() -> DenseHamiltonian {
    DenseHamiltonian::new(1, matrices::pauli_z()).unwrap()
}

/// Sum of `term` embedded on every ring bond by explicit Kronecker products.
fn brute_force_ring(nqubits: usize, term: &Array2<Complex64>) -> Array2<Complex64> {
    let dim = 1 << nqubits;
    let mut total = Array2::<Complex64>::zeros((dim, dim));
    for i in 0..nqubits {
        let j = (i + 1) % nqubits;
        // Move qubit j next to i with a permutation of basis states.
        let mut embedded = Array2::<Complex64>::zeros((dim, dim));
        for row in 0..dim {
            for col in 0..dim {
                let bit = |x: usize, q: usize| (x >> (nqubits - 1 - q)) & 1;
                let rest_equal = (0..nqubits)
                    .filter(|&q| q != i && q != j)
                    .all(|q| bit(row, q) == bit(col, q));
                if rest_equal {
                    let r = 2 * bit(row, i) + bit(row, j);
                    let c = 2 * bit(col, i) + bit(col, j);
                    embedded[[row, col]] = term[[r, c]];
                }
            }
        }
        total = total + embedded;
    }
    total
}

// ---------------------------------------------------------------------------
// Construction
// ---------------------------------------------------------------------------

#[test]
fn tfim_ring_parts_layout() {
    let ring = models::tfim_ring(4, 1.0).unwrap();
    assert_eq!(ring.nqubits(), 4);
    assert_eq!(ring.terms().len(), 1);

    let parts: Vec<Vec<Vec<usize>>> = ring
        .parts()
        .iter()
        .map(|p| p.placements().iter().map(|(t, _)| t.clone()).collect())
        .collect();
    assert_eq!(
        parts,
        vec![vec![vec![0, 1], vec![2, 3]], vec![vec![1, 2], vec![3, 0]]]
    );
    assert_eq!(ring.parts()[1].get(&[3, 0]), Some(TermId(0)));
}

#[test]
fn odd_ring_gives_first_part_extra_bond() {
    let ring = models::tfim_ring(3, 0.5).unwrap();
    let sizes: Vec<usize> = ring.parts().iter().map(|p| p.len()).collect();
    assert_eq!(sizes, vec![2, 1]);
    assert_eq!(ring.parts()[0].get(&[2, 0]), Some(TermId(0)));
}

#[test]
fn uniform_term_needs_two_sites() {
    let term = models::tfim_term(1.0).unwrap();
    assert!(matches!(
        LocalHamiltonian::from_uniform_term(1, term),
        Err(SimError::InvalidQubitCount(1))
    ));
}

#[test]
fn term_target_mismatch_rejected() {
    let mut builder = LocalHamiltonianBuilder::new();
    let bond = builder.term(models::tfim_term(1.0).unwrap());
    builder.part([(vec![0usize, 1, 2], bond)]);
    let err = builder.build().unwrap_err();
    assert!(matches!(
        &err,
        SimError::TermTargetMismatch { supported: 2, .. }
    ));
    assert_eq!(err.to_string(), "Term targets [0, 1, 2] but supports 2 qubits");
}

#[test]
fn mixed_dtypes_rejected() {
    let single = Arc::new(NalgebraBackend::with_dtype(DType::Complex64));
    let mut builder = LocalHamiltonianBuilder::new();
    let a = builder.term(z());
    let b = builder.term(DenseHamiltonian::with_backend(1, matrices::pauli_x(), single).unwrap());
    builder.part([([0usize], a), ([1], b)]);
    assert!(matches!(
        builder.build(),
        Err(SimError::DTypeMismatch {
            first: DType::Complex128,
            second: DType::Complex64
        })
    ));
}

#[test]
fn invalid_placements_rejected() {
    let mut builder = LocalHamiltonianBuilder::new();
    let a = builder.term(z());
    builder.part([([0usize], a), ([0], a)]);
    assert!(matches!(
        builder.build(),
        Err(SimError::DuplicateTargets { part: 0, .. })
    ));

    let mut builder = LocalHamiltonianBuilder::new();
    let bond = builder.term(models::tfim_term(1.0).unwrap());
    builder.part([([1usize, 1], bond)]);
    assert!(matches!(builder.build(), Err(SimError::DuplicateQubit(_))));

    let mut builder = LocalHamiltonianBuilder::new();
    builder.term(z());
    builder.part([([0usize], TermId(4))]);
    assert!(matches!(builder.build(), Err(SimError::UnknownTerm(4))));

    assert!(matches!(
        LocalHamiltonianBuilder::new().build(),
        Err(SimError::EmptyHamiltonian)
    ));
}

#[test]
fn iteration_is_restartable() {
    let ring = models::tfim_ring(4, 1.0).unwrap();
    let first: Vec<Vec<usize>> = ring.iter().map(|(t, _)| t.to_vec()).collect();
    let second: Vec<Vec<usize>> = (&ring).into_iter().map(|(t, _)| t.to_vec()).collect();
    assert_eq!(first, second);
    assert_eq!(first, vec![vec![0, 1], vec![2, 3], vec![1, 2], vec![3, 0]]);
}

// ---------------------------------------------------------------------------
// Dense reconstruction
// ---------------------------------------------------------------------------

#[test]
fn uniform_ring_matches_brute_force() {
    for n in [2, 4, 6] {
        let term = models::xxz_term(0.7).unwrap();
        let expected = brute_force_ring(n, term.matrix());
        let ring = LocalHamiltonian::from_uniform_term(n, term).unwrap();
        let dense = ring.to_dense().unwrap();
        assert_matrix_close(dense.matrix(), &expected, 1e-12);
    }
}

#[test]
fn tfim_ring_matches_explicit_hamiltonian() {
    let ring = models::tfim_ring(4, 1.0).unwrap();
    let dense = ring.to_dense().unwrap();
    let explicit = models::tfim_dense(4, 1.0).unwrap();
    assert_matrix_close(dense.matrix(), explicit.matrix(), 1e-12);
}

#[test]
fn asymmetric_term_respects_target_order() {
    // X on the first target, Z on the second.
    let xz = DenseHamiltonian::new(2, matrices::kron(&matrices::pauli_x(), &matrices::pauli_z()))
        .unwrap();
    let mut builder = LocalHamiltonianBuilder::new();
    let id = builder.term(xz);
    builder.part([([1usize, 0], id)]);
    let h = builder.build().unwrap();
    let dense = h.to_dense().unwrap();
    let expected = matrices::kron(&matrices::pauli_z(), &matrices::pauli_x());
    assert_matrix_close(dense.matrix(), &expected, 1e-15);
}

#[test]
fn too_many_qubits_for_labels() {
    let ring = models::tfim_ring(27, 1.0).unwrap();
    assert!(matches!(
        ring.to_dense(),
        Err(SimError::CapacityExceeded { needed: 54, available: 52 })
    ));
}

// ---------------------------------------------------------------------------
// Scaling and expectation
// ---------------------------------------------------------------------------

#[test]
fn scale_shared_term_once() {
    let ring = models::tfim_ring(4, 0.8).unwrap();
    let c = 2.5_f64;
    let scaled = &ring * c;
    assert_eq!(scaled.terms().len(), 1);
    assert_eq!(scaled.parts(), ring.parts());

    let expected = ring.to_dense().unwrap().matrix().mapv(|z| z * c);
    assert_matrix_close(scaled.to_dense().unwrap().matrix(), &expected, 1e-12);
}

#[test]
fn complex_scale_of_local_hamiltonian() {
    let ring = models::tfim_ring(2, 1.0).unwrap();
    let i = Complex64::new(0.0, 1.0);
    let scaled = ring.scale(i);
    let expected = ring.to_dense().unwrap().matrix().mapv(|z| z * i);
    assert_matrix_close(scaled.to_dense().unwrap().matrix(), &expected, 1e-12);
}

#[test]
fn local_expectation_matches_dense() {
    let ring = models::tfim_ring(4, 0.6).unwrap();
    let dense = ring.to_dense().unwrap();
    let state = Array1::from_shape_fn(16, |k| Complex64::new(1.0 + k as f64, 0.5 * k as f64));

    let local = ring.expectation(state.view(), true).unwrap();
    let reference = dense.expectation(state.view(), true).unwrap();
    assert_abs_diff_eq!(local, reference, epsilon = 1e-10);

    let short = Array1::from_elem(8, Complex64::new(1.0, 0.0));
    assert!(matches!(
        ring.expectation(short.view(), false),
        Err(SimError::DimensionMismatch { expected: 16, got: 8 })
    ));
}
