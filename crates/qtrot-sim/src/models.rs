//! Standard spin-chain terms and their brute-force references.

use ndarray::Array2;
use num_complex::Complex64;

use crate::dense::DenseHamiltonian;
use crate::error::SimResult;
use crate::local::LocalHamiltonian;
use crate::matrices::{identity, kron, kron_all, pauli_x, pauli_y, pauli_z};

/// Transverse-field Ising bond `-Z⊗Z - field·X⊗I`.
pub fn tfim_term(field: f64) -> SimResult<DenseHamiltonian> {
    let zz = kron(&pauli_z(), &pauli_z());
    let xi = kron(&pauli_x(), &identity());
    let c = Complex64::new(field, 0.0);
    DenseHamiltonian::new(2, -zz - xi.mapv(|v| v * c))
}

/// XXZ bond `X⊗X + Y⊗Y + delta·Z⊗Z`.
pub fn xxz_term(delta: f64) -> SimResult<DenseHamiltonian> {
    let xx = kron(&pauli_x(), &pauli_x());
    let yy = kron(&pauli_y(), &pauli_y());
    let zz = kron(&pauli_z(), &pauli_z());
    let c = Complex64::new(delta, 0.0);
    DenseHamiltonian::new(2, xx + yy + zz.mapv(|v| v * c))
}

/// Periodic transverse-field Ising ring in local form.
pub fn tfim_ring(nqubits: usize, field: f64) -> SimResult<LocalHamiltonian> {
    LocalHamiltonian::from_uniform_term(nqubits, tfim_term(field)?)
}

/// Periodic transverse-field Ising ring built from explicit Kronecker products.
///
/// `H = -Σ_i Z_i Z_{i+1} - field·Σ_i X_i` with `i+1` taken mod `nqubits`.
pub fn tfim_dense(nqubits: usize, field: f64) -> SimResult<DenseHamiltonian> {
    let dim = 1usize << nqubits;
    let mut matrix = Array2::<Complex64>::zeros((dim, dim));
    let c = Complex64::new(field, 0.0);
    for i in 0..nqubits {
        let next = (i + 1) % nqubits;
        let zz = site_product(nqubits, &[(i, pauli_z()), (next, pauli_z())]);
        let x = site_product(nqubits, &[(i, pauli_x())]);
        matrix = matrix - zz - x.mapv(|v| v * c);
    }
    DenseHamiltonian::new(nqubits, matrix)
}

/// `⊗_q A_q` with the given single-qubit factors and the identity elsewhere.
fn site_product(nqubits: usize, factors: &[(usize, Array2<Complex64>)]) -> Array2<Complex64> {
    let eye = identity();
    let operands: Vec<&Array2<Complex64>> = (0..nqubits)
        .map(|q| {
            factors
                .iter()
                .find(|(site, _)| *site == q)
                .map_or(&eye, |(_, m)| m)
        })
        .collect();
    kron_all(operands)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tfim_term_entries() {
        let t = tfim_term(1.0).unwrap();
        // Diagonal is -ZZ: (-1, +1, +1, -1).
        let diag: Vec<f64> = t.matrix().diag().iter().map(|z| z.re).collect();
        assert_eq!(diag, vec![-1.0, 1.0, 1.0, -1.0]);
        // -X on qubit 0 couples |00> and |10>.
        assert_eq!(t.matrix()[[0, 2]], Complex64::new(-1.0, 0.0));
    }

    #[test]
    fn test_xxz_is_hermitian() {
        let t = xxz_term(0.5).unwrap();
        let m = t.matrix();
        assert_eq!(m, &m.t().mapv(|z| z.conj()));
    }

    #[test]
    fn test_tfim_dense_two_site_ring_counts_bond_twice() {
        let h = tfim_dense(2, 0.0).unwrap();
        assert_eq!(h.matrix()[[0, 0]], Complex64::new(-2.0, 0.0));
    }
}
