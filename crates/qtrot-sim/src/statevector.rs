//! Dense statevector used to check Trotter circuits against exact evolution.
//!
//! Amplitudes are stored big-endian: qubit 0 is the most significant bit of
//! the basis index, matching the Kronecker ordering of the Hamiltonian types.

use ndarray::{Array1, Array2, ArrayView2};
use num_complex::Complex64;
use rustc_hash::FxHashSet;
use tracing::trace;

use qtrot_ir::Circuit;

use crate::error::{SimError, SimResult};

const ZERO: Complex64 = Complex64::new(0.0, 0.0);
const ONE: Complex64 = Complex64::new(1.0, 0.0);

/// A pure state of `num_qubits` qubits.
#[derive(Debug, Clone, PartialEq)]
pub struct Statevector {
    /// The state amplitudes (2^n complex numbers).
    amplitudes: Array1<Complex64>,
    /// Number of qubits.
    num_qubits: usize,
}

impl Statevector {
    /// Create a new statevector initialized to |0...0⟩.
    pub fn zero(num_qubits: usize) -> SimResult<Self> {
        Self::basis(num_qubits, 0)
    }

    /// The computational basis state `|index⟩`.
    pub fn basis(num_qubits: usize, index: usize) -> SimResult<Self> {
        if num_qubits == 0 || num_qubits >= usize::BITS as usize {
            return Err(SimError::InvalidQubitCount(num_qubits));
        }
        let dim = 1usize << num_qubits;
        if index >= dim {
            return Err(SimError::DimensionMismatch {
                expected: dim,
                got: index,
            });
        }
        let mut amplitudes = Array1::from_elem(dim, ZERO);
        amplitudes[index] = ONE;
        Ok(Self {
            amplitudes,
            num_qubits,
        })
    }

    /// Wrap existing amplitudes; the length must be a power of two ≥ 2.
    pub fn from_amplitudes(amplitudes: Array1<Complex64>) -> SimResult<Self> {
        let dim = amplitudes.len();
        if dim < 2 || !dim.is_power_of_two() {
            return Err(SimError::DimensionMismatch {
                expected: dim.next_power_of_two().max(2),
                got: dim,
            });
        }
        Ok(Self {
            num_qubits: dim.trailing_zeros() as usize,
            amplitudes,
        })
    }

    /// Get the number of qubits.
    pub fn num_qubits(&self) -> usize {
        self.num_qubits
    }

    /// The amplitudes in the computational basis.
    pub fn amplitudes(&self) -> &Array1<Complex64> {
        &self.amplitudes
    }

    /// Consume the state, returning its amplitudes.
    pub fn into_amplitudes(self) -> Array1<Complex64> {
        self.amplitudes
    }

    /// Euclidean norm.
    pub fn norm(&self) -> f64 {
        self.amplitudes.iter().map(|a| a.norm_sqr()).sum::<f64>().sqrt()
    }

    /// `⟨self|other⟩`.
    pub fn inner(&self, other: &Statevector) -> SimResult<Complex64> {
        if self.amplitudes.len() != other.amplitudes.len() {
            return Err(SimError::DimensionMismatch {
                expected: self.amplitudes.len(),
                got: other.amplitudes.len(),
            });
        }
        Ok(self
            .amplitudes
            .iter()
            .zip(other.amplitudes.iter())
            .map(|(a, b)| a.conj() * b)
            .sum())
    }

    /// `|⟨self|other⟩|²`.
    pub fn fidelity(&self, other: &Statevector) -> SimResult<f64> {
        Ok(self.inner(other)?.norm_sqr())
    }

    // =========================================================================
    // Gate application
    // =========================================================================

    /// Apply a `2^k × 2^k` matrix to the ordered qubits `targets`.
    ///
    /// `targets[0]` is the most significant qubit of the matrix's basis.
    pub fn apply_matrix(
        &mut self,
        matrix: ArrayView2<'_, Complex64>,
        targets: &[usize],
    ) -> SimResult<()> {
        let k = targets.len();
        let local_dim = 1usize << k;
        if matrix.dim() != (local_dim, local_dim) {
            return Err(SimError::TermTargetMismatch {
                targets: targets.to_vec(),
                supported: matrix.nrows().trailing_zeros() as usize,
            });
        }
        let mut seen = FxHashSet::default();
        for &q in targets {
            if q >= self.num_qubits {
                return Err(SimError::QubitOutOfRange {
                    qubit: q,
                    n_qubits: self.num_qubits,
                });
            }
            if !seen.insert(q) {
                return Err(SimError::DuplicateQubit(targets.to_vec()));
            }
        }

        let masks: Vec<usize> = targets
            .iter()
            .map(|&q| 1usize << (self.num_qubits - 1 - q))
            .collect();
        let target_mask: usize = masks.iter().fold(0, |acc, m| acc | m);
        let offsets: Vec<usize> = (0..local_dim)
            .map(|local| {
                masks
                    .iter()
                    .enumerate()
                    .filter(|(i, _)| (local >> (k - 1 - i)) & 1 == 1)
                    .fold(0, |acc, (_, m)| acc | m)
            })
            .collect();

        let mut buffer = vec![ZERO; local_dim];
        for base in (0..self.amplitudes.len()).filter(|i| i & target_mask == 0) {
            for (slot, &offset) in buffer.iter_mut().zip(&offsets) {
                *slot = self.amplitudes[base | offset];
            }
            for (row, &offset) in offsets.iter().enumerate() {
                self.amplitudes[base | offset] = matrix
                    .row(row)
                    .iter()
                    .zip(&buffer)
                    .map(|(m, a)| m * a)
                    .sum();
            }
        }
        Ok(())
    }

    /// Apply every instruction of `circuit` in order.
    pub fn apply_circuit(&mut self, circuit: &Circuit) -> SimResult<()> {
        if circuit.num_qubits() != self.num_qubits {
            return Err(SimError::DimensionMismatch {
                expected: self.amplitudes.len(),
                got: 1usize << circuit.num_qubits(),
            });
        }
        trace!(gates = circuit.len(), "applying circuit");
        for instruction in circuit.instructions() {
            let matrix = instruction.gate.matrix();
            self.apply_matrix(matrix.view(), &instruction.targets())?;
        }
        Ok(())
    }
}

/// Full `2^n × 2^n` unitary of a circuit, built one basis column at a time.
pub fn circuit_unitary(circuit: &Circuit) -> SimResult<Array2<Complex64>> {
    let n = circuit.num_qubits();
    let dim = 1usize << n;
    let mut unitary = Array2::from_elem((dim, dim), ZERO);
    for column in 0..dim {
        let mut state = Statevector::basis(n, column)?;
        state.apply_circuit(circuit)?;
        unitary.column_mut(column).assign(state.amplitudes());
    }
    Ok(unitary)
}
