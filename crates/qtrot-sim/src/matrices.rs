//! Single-qubit Pauli matrices and Kronecker products.

use ndarray::{Array2, array};
use num_complex::Complex64;

const ZERO: Complex64 = Complex64::new(0.0, 0.0);
const ONE: Complex64 = Complex64::new(1.0, 0.0);
const I: Complex64 = Complex64::new(0.0, 1.0);

/// 2×2 identity.
pub fn identity() -> Array2<Complex64> {
    Array2::eye(2)
}

/// Pauli X.
pub fn pauli_x() -> Array2<Complex64> {
    array![[ZERO, ONE], [ONE, ZERO]]
}

/// Pauli Y.
pub fn pauli_y() -> Array2<Complex64> {
    array![[ZERO, -I], [I, ZERO]]
}

/// Pauli Z.
pub fn pauli_z() -> Array2<Complex64> {
    array![[ONE, ZERO], [ZERO, -ONE]]
}

/// `a ⊗ b`, with `a` acting on the more significant qubits.
pub fn kron(a: &Array2<Complex64>, b: &Array2<Complex64>) -> Array2<Complex64> {
    ndarray::linalg::kron(a, b)
}

/// Kronecker product of a sequence of factors, left to right.
///
/// An empty sequence yields the 1×1 identity.
pub fn kron_all<'a>(factors: impl IntoIterator<Item = &'a Array2<Complex64>>) -> Array2<Complex64> {
    factors
        .into_iter()
        .fold(Array2::eye(1), |acc, factor| kron(&acc, factor))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paulis_square_to_identity() {
        for p in [pauli_x(), pauli_y(), pauli_z()] {
            assert_eq!(p.dot(&p), identity());
        }
    }

    #[test]
    fn test_kron_all_ordering() {
        let zx = kron_all([&pauli_z(), &pauli_x()]);
        // |01> -> Z|0> ⊗ X|1> = |00>
        assert_eq!(zx[[0, 1]], ONE);
        assert_eq!(zx[[2, 3]], -ONE);
        assert_eq!(kron_all([]).dim(), (1, 1));
    }
}
