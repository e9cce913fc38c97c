//! Quantum gate types.
//!
//! Matrices use the big-endian convention: the first qubit operand of an
//! instruction addresses the most significant bit of the gate's basis index.

use ndarray::{Array2, array};
use num_complex::Complex64;
use serde::{Deserialize, Serialize};

use crate::error::{IrError, IrResult};

const ZERO: Complex64 = Complex64::new(0.0, 0.0);
const ONE: Complex64 = Complex64::new(1.0, 0.0);

/// Fixed gates used to prepare and permute states around a Trotter step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StandardGate {
    /// Hadamard gate.
    H,
    /// Controlled-X (CNOT) gate.
    CX,
    /// SWAP gate.
    Swap,
}

impl StandardGate {
    /// Lowercase gate mnemonic.
    #[inline]
    pub fn name(&self) -> &'static str {
        match self {
            StandardGate::H => "h",
            StandardGate::CX => "cx",
            StandardGate::Swap => "swap",
        }
    }

    /// Arity of the gate.
    #[inline]
    pub fn num_qubits(&self) -> u32 {
        match self {
            StandardGate::H => 1,
            StandardGate::CX | StandardGate::Swap => 2,
        }
    }

    /// Big-endian matrix; for `CX` the first operand is the control.
    pub fn matrix(&self) -> Array2<Complex64> {
        match self {
            StandardGate::H => {
                let h = Complex64::new(std::f64::consts::FRAC_1_SQRT_2, 0.0);
                array![[h, h], [h, -h]]
            }
            StandardGate::CX => array![
                [ONE, ZERO, ZERO, ZERO],
                [ZERO, ONE, ZERO, ZERO],
                [ZERO, ZERO, ZERO, ONE],
                [ZERO, ZERO, ONE, ZERO],
            ],
            StandardGate::Swap => array![
                [ONE, ZERO, ZERO, ZERO],
                [ZERO, ZERO, ONE, ZERO],
                [ZERO, ONE, ZERO, ZERO],
                [ZERO, ZERO, ZERO, ONE],
            ],
        }
    }
}

/// A local operator given by an explicit `2^k × 2^k` matrix.
///
/// The matrix is the gate's parameter: [`Circuit::set_parameters`] swaps it
/// without touching the qubits the gate is placed on. Unitarity is not
/// checked, so non-unitary propagators (complex time steps) are allowed.
///
/// [`Circuit::set_parameters`]: crate::Circuit::set_parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitaryGate {
    num_qubits: u32,
    matrix: Array2<Complex64>,
}

impl UnitaryGate {
    /// Create a unitary gate acting on `num_qubits` qubits.
    pub fn new(num_qubits: u32, matrix: Array2<Complex64>) -> IrResult<Self> {
        check_shape(num_qubits, &matrix)?;
        Ok(Self { num_qubits, matrix })
    }

    /// Number of qubits the gate acts on.
    pub fn num_qubits(&self) -> u32 {
        self.num_qubits
    }

    /// The current matrix parameter.
    pub fn matrix(&self) -> &Array2<Complex64> {
        &self.matrix
    }

    /// Replace the matrix parameter, keeping the gate's arity.
    pub fn set_matrix(&mut self, matrix: Array2<Complex64>) -> IrResult<()> {
        check_shape(self.num_qubits, &matrix)?;
        self.matrix = matrix;
        Ok(())
    }
}

fn check_shape(num_qubits: u32, matrix: &Array2<Complex64>) -> IrResult<()> {
    let expected = 1usize << num_qubits;
    let (rows, cols) = matrix.dim();
    if num_qubits == 0 || rows != expected || cols != expected {
        return Err(IrError::MatrixShape {
            num_qubits,
            expected,
            rows,
            cols,
        });
    }
    Ok(())
}

/// A quantum gate, either standard or an explicit unitary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GateKind {
    /// A standard gate with known semantics.
    Standard(StandardGate),
    /// A gate defined by its matrix.
    Unitary(UnitaryGate),
}

impl GateKind {
    /// Get the name of this gate.
    #[inline]
    pub fn name(&self) -> &str {
        match self {
            GateKind::Standard(g) => g.name(),
            GateKind::Unitary(_) => "unitary",
        }
    }

    /// Get the number of qubits.
    #[inline]
    pub fn num_qubits(&self) -> u32 {
        match self {
            GateKind::Standard(g) => g.num_qubits(),
            GateKind::Unitary(g) => g.num_qubits(),
        }
    }
}

/// A gate with associated metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Gate {
    /// The kind of gate.
    pub kind: GateKind,
    /// Optional label for the gate.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl Gate {
    /// Create a new gate from a standard gate.
    pub fn standard(gate: StandardGate) -> Self {
        Self {
            kind: GateKind::Standard(gate),
            label: None,
        }
    }

    /// Create a unitary gate from its matrix; the arity is inferred from the side length.
    pub fn unitary(matrix: Array2<Complex64>) -> IrResult<Self> {
        let side = matrix.nrows();
        let num_qubits = if side.is_power_of_two() {
            side.trailing_zeros()
        } else {
            0
        };
        Ok(Self {
            kind: GateKind::Unitary(UnitaryGate::new(num_qubits, matrix)?),
            label: None,
        })
    }

    /// Add a label to the gate.
    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Get the name of this gate.
    pub fn name(&self) -> &str {
        self.kind.name()
    }

    /// Get the number of qubits.
    pub fn num_qubits(&self) -> u32 {
        self.kind.num_qubits()
    }

    /// The gate's matrix in the computational basis.
    pub fn matrix(&self) -> Array2<Complex64> {
        match &self.kind {
            GateKind::Standard(g) => g.matrix(),
            GateKind::Unitary(g) => g.matrix().clone(),
        }
    }

    /// True if the gate carries a replaceable matrix parameter.
    pub fn is_parameterized(&self) -> bool {
        matches!(self.kind, GateKind::Unitary(_))
    }
}

impl From<StandardGate> for Gate {
    fn from(gate: StandardGate) -> Self {
        Gate::standard(gate)
    }
}

impl From<UnitaryGate> for Gate {
    fn from(gate: UnitaryGate) -> Self {
        Self {
            kind: GateKind::Unitary(gate),
            label: None,
        }
    }
}
