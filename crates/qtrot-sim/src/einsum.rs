//! Labelled outer-product contraction.
//!
//! Only the subset of einsum needed to embed local operators is supported:
//! two operands with disjoint labels, and an output that is a permutation of
//! all input labels (`"ab,cd->cadb"`). Labels come from a fixed 52-letter
//! alphabet, which caps dense reconstructions at 26 qubits.

use ndarray::{Array2, ArrayD, ArrayView2, ArrayViewD, IxDyn};
use num_complex::Complex64;
use rustc_hash::FxHashMap;

use crate::backend::Backend;
use crate::error::{SimError, SimResult};

/// Axis labels available to a contraction, in allocation order.
pub const EINSUM_LABELS: &str = "abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Largest register [`embed`] can address (two labels per qubit).
pub const MAX_EMBED_QUBITS: usize = EINSUM_LABELS.len() / 2;

/// Outer product of `a` and `b`, axes permuted as the subscripts describe.
pub fn outer(
    subscripts: &str,
    a: ArrayViewD<'_, Complex64>,
    b: ArrayViewD<'_, Complex64>,
) -> SimResult<ArrayD<Complex64>> {
    let invalid = |reason: &str| SimError::InvalidSubscripts {
        subscripts: subscripts.to_string(),
        reason: reason.to_string(),
    };

    let (inputs, output) = subscripts
        .split_once("->")
        .ok_or_else(|| invalid("missing '->'"))?;
    let (lhs, rhs) = inputs
        .split_once(',')
        .ok_or_else(|| invalid("expected exactly two operands"))?;
    if lhs.chars().count() != a.ndim() || rhs.chars().count() != b.ndim() {
        return Err(invalid("operand rank does not match its labels"));
    }

    let mut position: FxHashMap<char, usize> = FxHashMap::default();
    for (axis, label) in lhs.chars().chain(rhs.chars()).enumerate() {
        if !EINSUM_LABELS.contains(label) {
            return Err(invalid("label outside the a-zA-Z alphabet"));
        }
        if position.insert(label, axis).is_some() {
            return Err(invalid("labels shared between or within operands"));
        }
    }
    if output.chars().count() != position.len() {
        return Err(invalid("output must list every input label once"));
    }
    let mut permutation = Vec::with_capacity(position.len());
    for label in output.chars() {
        let axis = position
            .remove(&label)
            .ok_or_else(|| invalid("output label missing from inputs or repeated"))?;
        permutation.push(axis);
    }

    let shape: Vec<usize> = a.shape().iter().chain(b.shape()).copied().collect();
    let mut data = Vec::with_capacity(a.len() * b.len());
    for x in a.iter() {
        data.extend(b.iter().map(|y| x * y));
    }
    let product = ArrayD::from_shape_vec(IxDyn(&shape), data)
        .map_err(|e| SimError::Linalg(format!("einsum: {e}")))?;
    Ok(product
        .permuted_axes(IxDyn(&permutation))
        .as_standard_layout()
        .into_owned())
}

/// Embed a `k`-qubit operator acting on `targets` into an `nqubits` register.
///
/// Returns the `2^n × 2^n` matrix of `term ⊗ I` with the term's i-th tensor
/// factor on qubit `targets[i]`. Qubit 0 is the most significant bit.
/// The contraction and the identity come from `backend`.
pub fn embed(
    backend: &dyn Backend,
    term: ArrayView2<'_, Complex64>,
    targets: &[usize],
    nqubits: usize,
) -> SimResult<Array2<Complex64>> {
    let needed = 2 * nqubits;
    if needed > EINSUM_LABELS.len() {
        return Err(SimError::CapacityExceeded {
            needed,
            available: EINSUM_LABELS.len(),
        });
    }
    if let Some(&qubit) = targets.iter().find(|&&q| q >= nqubits) {
        return Err(SimError::QubitOutOfRange {
            qubit,
            n_qubits: nqubits,
        });
    }

    let labels: Vec<char> = EINSUM_LABELS.chars().take(needed).collect();
    let k = targets.len();
    let n_rest = nqubits - k;

    let term_labels: String = targets
        .iter()
        .map(|&q| labels[q])
        .chain(targets.iter().map(|&q| labels[q + nqubits]))
        .collect();
    let rest_labels: String = labels.iter().filter(|l| !term_labels.contains(**l)).collect();
    let out_labels: String = labels.iter().collect();

    let term_tensor = term
        .to_shape(IxDyn(&vec![2; 2 * k]))
        .map_err(|e| SimError::Linalg(format!("embed: {e}")))?;
    let eye = backend.eye(1 << n_rest);
    let eye_tensor = eye
        .to_shape(IxDyn(&vec![2; 2 * n_rest]))
        .map_err(|e| SimError::Linalg(format!("embed: {e}")))?;

    let full = backend.einsum(
        &format!("{term_labels},{rest_labels}->{out_labels}"),
        term_tensor.view(),
        eye_tensor.view(),
    )?;
    let dim = 1usize << nqubits;
    full.into_shape_with_order((dim, dim))
        .map_err(|e| SimError::Linalg(format!("embed: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::NalgebraBackend;
    use ndarray::{array, linalg::kron};

    fn c(re: f64) -> Complex64 {
        Complex64::new(re, 0.0)
    }

    #[test]
    fn test_outer_matches_kron() {
        let a = array![[c(1.0), c(2.0)], [c(3.0), c(4.0)]];
        let b = array![[c(0.0), c(1.0)], [c(1.0), c(0.0)]];
        let out = outer("ab,cd->acbd", a.view().into_dyn(), b.view().into_dyn()).unwrap();
        let matrix = out.into_shape_with_order((4, 4)).unwrap();
        assert_eq!(matrix, kron(&a, &b));
    }

    #[test]
    fn test_outer_rejects_bad_subscripts() {
        let a = array![c(1.0), c(2.0)];
        let b = array![c(3.0), c(4.0)];
        for bad in ["a,b", "a,a->aa", "a,b->a", "ab,c->abc", "a,b->ac", "a;b->ab"] {
            assert!(
                matches!(
                    outer(bad, a.view().into_dyn(), b.view().into_dyn()),
                    Err(SimError::InvalidSubscripts { .. })
                ),
                "{bad} should be rejected"
            );
        }
    }

    #[test]
    fn test_embed_first_qubits_is_kron_with_identity() {
        let x = array![[c(0.0), c(1.0)], [c(1.0), c(0.0)]];
        let embedded = embed(&NalgebraBackend::new(), x.view(), &[0], 2).unwrap();
        assert_eq!(embedded, kron(&x, &Array2::eye(2)));
        let embedded = embed(&NalgebraBackend::new(), x.view(), &[1], 2).unwrap();
        assert_eq!(embedded, kron(&Array2::eye(2), &x));
    }

    #[test]
    fn test_embed_reversed_targets_swaps_factors() {
        let x = array![[c(0.0), c(1.0)], [c(1.0), c(0.0)]];
        let z = array![[c(1.0), c(0.0)], [c(0.0), c(-1.0)]];
        let xz = kron(&x, &z);
        // X on qubit 1, Z on qubit 0.
        let embedded = embed(&NalgebraBackend::new(), xz.view(), &[1, 0], 2).unwrap();
        assert_eq!(embedded, kron(&z, &x));
    }

    #[test]
    fn test_embed_capacity() {
        let x = Array2::<Complex64>::eye(2);
        assert!(matches!(
            embed(&NalgebraBackend::new(), x.view(), &[0], MAX_EMBED_QUBITS + 1),
            Err(SimError::CapacityExceeded { needed: 54, available: 52 })
        ));
    }

    #[test]
    fn test_embed_out_of_range() {
        let x = Array2::<Complex64>::eye(2);
        assert!(matches!(
            embed(&NalgebraBackend::new(), x.view(), &[3], 2),
            Err(SimError::QubitOutOfRange { qubit: 3, n_qubits: 2 })
        ));
    }
}
