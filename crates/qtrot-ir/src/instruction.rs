//! Circuit instructions combining gates with operands.

use serde::{Deserialize, Serialize};

use crate::gate::Gate;
use crate::qubit::QubitId;

/// A gate placed on an ordered tuple of qubits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Instruction {
    /// The gate.
    pub gate: Gate,
    /// Qubits this instruction operates on, in gate-operand order.
    pub qubits: Vec<QubitId>,
}

impl Instruction {
    /// Create a gate instruction.
    pub fn gate(gate: impl Into<Gate>, qubits: impl IntoIterator<Item = QubitId>) -> Self {
        Self {
            gate: gate.into(),
            qubits: qubits.into_iter().collect(),
        }
    }

    /// Name of the placed gate.
    pub fn name(&self) -> &str {
        self.gate.name()
    }

    /// Qubit indices as `usize`, in operand order.
    pub fn targets(&self) -> Vec<usize> {
        self.qubits.iter().map(|q| q.index()).collect()
    }
}
