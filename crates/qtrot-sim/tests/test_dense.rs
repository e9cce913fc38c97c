//! Tests for dense Hamiltonian construction, caches and algebra.

use std::sync::Arc;

use approx::assert_abs_diff_eq;
use ndarray::{Array1, Array2, Array3, array};
use num_complex::Complex64;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use qtrot_sim::backend::{DType, NalgebraBackend};
use qtrot_sim::dense::{DenseHamiltonian, MatmulOutput, OperandKind};
use qtrot_sim::{SimError, matrices};

fn c(re: f64) -> Complex64 {
    Complex64::new(re, 0.0)
}

fn random_hermitian(nqubits: usize, seed: u64) -> Array2<Complex64> {
    let mut rng = StdRng::seed_from_u64(seed);
    let dim = 1 << nqubits;
    let m = Array2::from_shape_fn((dim, dim), |_| {
        Complex64::new(rng.gen_range(-1.0..1.0), rng.gen_range(-1.0..1.0))
    });
    let mt = m.t().mapv(|z| z.conj());
    (&m + &mt).mapv(|z| z * 0.5)
}

fn assert_matrix_close(a: &Array2<Complex64>, b: &Array2<Complex64>, tol: f64) {
    assert_eq!(a.dim(), b.dim());
    for (x, y) in a.iter().zip(b.iter()) {
        assert!((x - y).norm() < tol, "{x} != {y}");
    }
}

// ---------------------------------------------------------------------------
// Construction
// ---------------------------------------------------------------------------

#[test]
fn construct_reads_back_matrix() {
    let m = random_hermitian(2, 1);
    let h = DenseHamiltonian::new(2, m.clone()).unwrap();
    assert_eq!(h.matrix(), &m);
    assert_eq!(h.nqubits(), 2);
    assert_eq!(h.dim(), 4);
    assert_eq!(h.dtype(), DType::Complex128);
}

#[test]
fn shape_mismatch_rejected() {
    let err = DenseHamiltonian::new(2, Array2::eye(8)).unwrap_err();
    assert!(matches!(
        err,
        SimError::ShapeMismatch { nqubits: 2, rows: 8, cols: 8 }
    ));

    let rect = Array2::<Complex64>::zeros((4, 2));
    assert!(matches!(
        DenseHamiltonian::new(2, rect),
        Err(SimError::ShapeMismatch { .. })
    ));
}

#[test]
fn zero_qubits_rejected() {
    assert!(matches!(
        DenseHamiltonian::new(0, Array2::eye(1)),
        Err(SimError::InvalidQubitCount(0))
    ));
}

#[test]
fn error_message_names_shape() {
    let err = DenseHamiltonian::new(1, Array2::eye(4)).unwrap_err();
    assert_eq!(
        err.to_string(),
        "The Hamiltonian is defined for 1 qubits while the given matrix has shape (4, 4)"
    );
}

// ---------------------------------------------------------------------------
// Spectrum and exponential
// ---------------------------------------------------------------------------

#[test]
fn eigenvectors_diagonalise() {
    let mut h = DenseHamiltonian::new(2, random_hermitian(2, 7)).unwrap();
    let values = h.eigenvalues().unwrap().clone();
    let vectors = h.eigenvectors().unwrap().clone();
    let diag = Array2::from_diag(&values.mapv(c));
    let rebuilt = vectors.dot(&diag).dot(&vectors.t().mapv(|z| z.conj()));
    assert_matrix_close(&rebuilt, h.matrix(), 1e-10);
    for w in values.windows(2) {
        assert!(w[0] <= w[1]);
    }
}

#[test]
fn ground_state_has_lowest_energy() {
    let mut h = DenseHamiltonian::new(2, random_hermitian(2, 11)).unwrap();
    let ground = h.ground_state().unwrap();
    let lowest = h.eigenvalues().unwrap()[0];
    let energy = h.expectation(ground.view(), false).unwrap();
    assert_abs_diff_eq!(energy, lowest, epsilon = 1e-10);
}

#[test]
fn exponential_of_zero_is_identity() {
    let mut h = DenseHamiltonian::new(3, random_hermitian(3, 3)).unwrap();
    let e = h.exponential(0.0).unwrap();
    assert_matrix_close(e, &Array2::eye(8), 1e-12);
}

#[test]
fn exponential_of_pauli_z() {
    let mut h = DenseHamiltonian::new(1, matrices::pauli_z()).unwrap();
    let t = 0.3_f64;
    let e = h.exponential(t).unwrap();
    let expected = array![
        [Complex64::from_polar(1.0, -t), c(0.0)],
        [c(0.0), Complex64::from_polar(1.0, t)]
    ];
    assert_matrix_close(e, &expected, 1e-12);
}

#[test]
fn exponential_accepts_complex_parameter() {
    // exp(-i·(-i)·Z) = exp(-Z)
    let mut h = DenseHamiltonian::new(1, matrices::pauli_z()).unwrap();
    let e = h.exponential(Complex64::new(0.0, -1.0)).unwrap();
    assert_abs_diff_eq!(e[[0, 0]].re, (-1.0_f64).exp(), epsilon = 1e-12);
    assert_abs_diff_eq!(e[[1, 1]].re, 1.0_f64.exp(), epsilon = 1e-12);
}

#[test]
fn expectation_normalisation() {
    let h = DenseHamiltonian::new(1, matrices::pauli_z()).unwrap();
    let state = array![c(2.0), c(0.0)];
    assert_abs_diff_eq!(h.expectation(state.view(), false).unwrap(), 4.0);
    assert_abs_diff_eq!(h.expectation(state.view(), true).unwrap(), 1.0);

    let wrong = Array1::from_elem(4, c(0.5));
    assert!(matches!(
        h.expectation(wrong.view(), false),
        Err(SimError::DimensionMismatch { expected: 2, got: 4 })
    ));
}

// ---------------------------------------------------------------------------
// Algebra
// ---------------------------------------------------------------------------

#[test]
fn add_then_sub_is_identity() {
    let a = DenseHamiltonian::new(2, random_hermitian(2, 21)).unwrap();
    let b = DenseHamiltonian::new(2, random_hermitian(2, 22)).unwrap();
    let sum = (&a + &b).unwrap();
    let back = (&sum - &b).unwrap();
    assert_matrix_close(back.matrix(), a.matrix(), 1e-12);
}

#[test]
fn scalar_addition_is_shift_by_identity() {
    let h = DenseHamiltonian::new(1, matrices::pauli_x()).unwrap();
    let shifted = &h + 2.0;
    assert_eq!(shifted.matrix(), &array![[c(2.0), c(1.0)], [c(1.0), c(2.0)]]);
    assert_eq!((2.0 + &h).matrix(), shifted.matrix());

    let lowered = &h - 1.0;
    assert_eq!(lowered.matrix(), &array![[c(-1.0), c(1.0)], [c(1.0), c(-1.0)]]);

    let reflected = 1.0 - &h;
    assert_eq!(reflected.matrix(), &array![[c(1.0), c(-1.0)], [c(-1.0), c(1.0)]]);
    assert_eq!(h.rsub_operand(1.0).unwrap().matrix(), reflected.matrix());
}

#[test]
fn qubit_count_mismatch_rejected() {
    let a = DenseHamiltonian::new(1, matrices::pauli_x()).unwrap();
    let b = DenseHamiltonian::new(2, Array2::eye(4)).unwrap();
    assert!(matches!(
        &a + &b,
        Err(SimError::QubitCountMismatch { op: "added", left: 1, right: 2 })
    ));
    assert!(matches!(
        &a - &b,
        Err(SimError::QubitCountMismatch { op: "subtracted", .. })
    ));
    assert!(matches!(
        a.matmul(&b),
        Err(SimError::QubitCountMismatch { op: "multiplied", .. })
    ));
}

#[test]
fn dtype_mismatch_rejected() {
    let single = Arc::new(NalgebraBackend::with_dtype(DType::Complex64));
    let a = DenseHamiltonian::with_backend(1, matrices::pauli_x(), single).unwrap();
    let b = DenseHamiltonian::new(1, matrices::pauli_z()).unwrap();
    assert!(matches!(
        &a + &b,
        Err(SimError::DTypeMismatch {
            first: DType::Complex64,
            second: DType::Complex128
        })
    ));
}

#[test]
fn unsupported_operands_rejected() {
    let h = DenseHamiltonian::new(1, matrices::pauli_x()).unwrap();
    let v = Array1::from_elem(2, c(1.0));
    let err = h.add_operand(&v).unwrap_err();
    assert!(matches!(
        err,
        SimError::UnsupportedOperand { op: "addition", kind: OperandKind::Vector }
    ));
    assert_eq!(err.to_string(), "Hamiltonian addition with vector is not implemented");

    assert!(matches!(
        h.matmul(2.0),
        Err(SimError::UnsupportedOperand { kind: OperandKind::Scalar, .. })
    ));
}

#[test]
fn scale_by_one_and_zero() {
    let mut h = DenseHamiltonian::new(2, random_hermitian(2, 5)).unwrap();
    let same = &h * 1.0;
    assert_eq!(same.matrix(), h.matrix());

    h.eigenvectors().unwrap();
    let mut zero = &h * 0.0;
    assert!(zero.matrix().iter().all(|z| z.norm() == 0.0));
    assert_eq!(zero.eigenvectors().unwrap(), &Array2::<Complex64>::eye(4));
    assert!(zero.eigenvalues().unwrap().iter().all(|&v| v == 0.0));
}

#[test]
fn negative_scale_keeps_cached_spectrum_sorted() {
    let mut h = DenseHamiltonian::new(2, random_hermitian(2, 9)).unwrap();
    let values = h.eigenvalues().unwrap().clone();
    h.eigenvectors().unwrap();

    let mut flipped = -&h;
    let flipped_values = flipped.eigenvalues().unwrap().clone();
    for w in flipped_values.windows(2) {
        assert!(w[0] <= w[1]);
    }
    assert_abs_diff_eq!(flipped_values[0], -values[3], epsilon = 1e-12);

    // Cached eigenvectors still diagonalise the scaled operator.
    let vectors = flipped.eigenvectors().unwrap().clone();
    let diag = Array2::from_diag(&flipped_values.mapv(c));
    let rebuilt = vectors.dot(&diag).dot(&vectors.t().mapv(|z| z.conj()));
    assert_matrix_close(&rebuilt, flipped.matrix(), 1e-10);
}

#[test]
fn complex_scale_multiplies_matrix() {
    let h = DenseHamiltonian::new(1, matrices::pauli_z()).unwrap();
    let i = Complex64::new(0.0, 1.0);
    let scaled = &h * i;
    assert_eq!(scaled.matrix()[[0, 0]], i);
    assert_eq!(scaled.matrix()[[1, 1]], -i);
}

#[test]
fn elementwise_multiplication() {
    let h = DenseHamiltonian::new(1, matrices::pauli_x()).unwrap();
    let mask = array![[c(1.0), c(3.0)], [c(0.0), c(1.0)]];
    let product = h.mul_operand(&mask).unwrap();
    assert_eq!(product.matrix(), &array![[c(0.0), c(3.0)], [c(0.0), c(0.0)]]);

    let wrong = Array2::<Complex64>::eye(4);
    assert!(matches!(
        h.mul_operand(&wrong),
        Err(SimError::DimensionMismatch { expected: 2, got: 4 })
    ));
}

#[test]
fn matmul_dispatches_on_rank() {
    let x = DenseHamiltonian::new(1, matrices::pauli_x()).unwrap();
    let z = DenseHamiltonian::new(1, matrices::pauli_z()).unwrap();

    let xz = x.matmul(&z).unwrap().into_operator().unwrap();
    assert_eq!(xz.matrix(), &matrices::pauli_x().dot(&matrices::pauli_z()));

    let ket = array![c(1.0), c(0.0)];
    let flipped = x.matmul(&ket).unwrap().into_vector().unwrap();
    assert_eq!(flipped, array![c(0.0), c(1.0)]);

    let m = matrices::pauli_y();
    assert!(matches!(x.matmul(&m).unwrap(), MatmulOutput::Matrix(_)));

    let tensor = Array3::<Complex64>::zeros((2, 2, 2)).into_dyn();
    assert!(matches!(
        x.matmul(tensor.view()),
        Err(SimError::UnsupportedRank(3))
    ));
    let vector = ket.clone().into_dyn();
    assert!(matches!(
        x.matmul(vector.view()).unwrap(),
        MatmulOutput::Vector(_)
    ));
}

#[test]
fn single_precision_backend_rounds_entries() {
    let single = Arc::new(NalgebraBackend::with_dtype(DType::Complex64));
    let m = array![[c(0.1), c(0.0)], [c(0.0), c(0.2)]];
    let h = DenseHamiltonian::with_backend(1, m, single).unwrap();
    assert_eq!(h.dtype(), DType::Complex64);
    assert_eq!(h.matrix()[[0, 0]].re, f64::from(0.1_f32));
}
