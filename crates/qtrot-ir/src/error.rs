//! Error types for the IR crate.

use crate::circuit::GateId;
use crate::qubit::QubitId;
use thiserror::Error;

/// Errors that can occur in IR operations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum IrError {
    /// Qubit not found in circuit.
    #[error("Qubit {qubit} not found in {num_qubits}-qubit circuit{}", format_gate_context(.gate_name))]
    QubitNotFound {
        /// The qubit that was not found.
        qubit: QubitId,
        /// Width of the circuit.
        num_qubits: u32,
        /// Optional gate name for context.
        gate_name: Option<String>,
    },

    /// Gate requires different number of qubits.
    #[error("Gate '{gate_name}' requires {expected} qubits, got {got}")]
    QubitCountMismatch {
        /// Name of the gate.
        gate_name: String,
        /// Expected number of qubits.
        expected: u32,
        /// Actual number of qubits provided.
        got: u32,
    },

    /// Duplicate qubit in operation.
    #[error("Duplicate qubit {qubit} in operation{}", format_gate_context(.gate_name))]
    DuplicateQubit {
        /// The duplicate qubit.
        qubit: QubitId,
        /// Optional gate name for context.
        gate_name: Option<String>,
    },

    /// A unitary matrix does not have the shape its qubit count requires.
    #[error("Unitary on {num_qubits} qubits must be {expected}x{expected}, got {rows}x{cols}")]
    MatrixShape {
        /// Number of qubits the gate acts on.
        num_qubits: u32,
        /// Required side length (2^num_qubits).
        expected: usize,
        /// Rows of the offending matrix.
        rows: usize,
        /// Columns of the offending matrix.
        cols: usize,
    },

    /// Gate handle does not refer to an instruction of this circuit.
    #[error("Gate {0} not found in circuit")]
    GateNotFound(GateId),

    /// Gate has no matrix parameter that could be replaced.
    #[error("Gate {gate} ('{gate_name}') is not parameterised")]
    NotParameterized {
        /// The gate handle.
        gate: GateId,
        /// Name of the gate.
        gate_name: String,
    },
}

/// Helper function to format optional gate context.
#[allow(clippy::ref_option)]
fn format_gate_context(gate_name: &Option<String>) -> String {
    match gate_name {
        Some(name) => format!(" (gate: {name})"),
        None => String::new(),
    }
}

/// Result type for IR operations.
pub type IrResult<T> = Result<T, IrError>;
