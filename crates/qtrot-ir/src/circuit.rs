//! High-level circuit builder API.

use ndarray::Array2;
use num_complex::Complex64;
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{IrError, IrResult};
use crate::gate::{Gate, GateKind, StandardGate};
use crate::instruction::Instruction;
use crate::qubit::QubitId;

/// Handle to an instruction of a [`Circuit`].
///
/// Circuits are append-only, so a handle stays valid (and keeps pointing at
/// the same placement) for the lifetime of the circuit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct GateId(pub usize);

impl fmt::Display for GateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "g{}", self.0)
    }
}

/// A quantum circuit.
///
/// An ordered list of gate placements on a fixed-width register.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Circuit {
    /// Name of the circuit.
    name: String,
    /// Register width.
    num_qubits: u32,
    /// Instructions in application order.
    instructions: Vec<Instruction>,
}

impl Circuit {
    /// Create a circuit with a given number of qubits.
    pub fn with_size(name: impl Into<String>, num_qubits: u32) -> Self {
        Self {
            name: name.into(),
            num_qubits,
            instructions: vec![],
        }
    }

    /// Append a gate placed on `qubits`, returning its handle.
    pub fn add(
        &mut self,
        gate: impl Into<Gate>,
        qubits: impl IntoIterator<Item = QubitId>,
    ) -> IrResult<GateId> {
        let instruction = Instruction::gate(gate, qubits);
        self.validate(&instruction)?;
        let id = GateId(self.instructions.len());
        self.instructions.push(instruction);
        Ok(id)
    }

    fn validate(&self, instruction: &Instruction) -> IrResult<()> {
        let gate_name = instruction.name();
        let expected = instruction.gate.num_qubits();
        let got = instruction.qubits.len() as u32;
        if expected != got {
            return Err(IrError::QubitCountMismatch {
                gate_name: gate_name.to_string(),
                expected,
                got,
            });
        }
        let mut seen = FxHashSet::default();
        for &qubit in &instruction.qubits {
            if qubit.0 >= self.num_qubits {
                return Err(IrError::QubitNotFound {
                    qubit,
                    num_qubits: self.num_qubits,
                    gate_name: Some(gate_name.to_string()),
                });
            }
            if !seen.insert(qubit) {
                return Err(IrError::DuplicateQubit {
                    qubit,
                    gate_name: Some(gate_name.to_string()),
                });
            }
        }
        Ok(())
    }

    // =========================================================================
    // Gate helpers
    // =========================================================================

    /// Apply Hadamard gate.
    pub fn h(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.add(StandardGate::H, [qubit])?;
        Ok(self)
    }

    /// Apply CNOT (CX) gate.
    pub fn cx(&mut self, control: QubitId, target: QubitId) -> IrResult<&mut Self> {
        self.add(StandardGate::CX, [control, target])?;
        Ok(self)
    }

    /// Apply SWAP gate.
    pub fn swap(&mut self, q1: QubitId, q2: QubitId) -> IrResult<&mut Self> {
        self.add(StandardGate::Swap, [q1, q2])?;
        Ok(self)
    }

    /// Apply an arbitrary matrix on the given qubits and return its handle.
    pub fn unitary(
        &mut self,
        matrix: Array2<Complex64>,
        qubits: impl IntoIterator<Item = QubitId>,
    ) -> IrResult<GateId> {
        self.add(Gate::unitary(matrix)?, qubits)
    }

    // =========================================================================
    // Re-parameterisation
    // =========================================================================

    /// Replace the matrices of existing unitary gates.
    ///
    /// Every entry is validated before any gate is modified, so on error the
    /// circuit is left unchanged. Gate placements are never altered.
    pub fn set_parameters(
        &mut self,
        parameters: impl IntoIterator<Item = (GateId, Array2<Complex64>)>,
    ) -> IrResult<()> {
        let parameters: Vec<_> = parameters.into_iter().collect();
        for (id, matrix) in &parameters {
            let instruction = self.instructions.get(id.0).ok_or(IrError::GateNotFound(*id))?;
            match &instruction.gate.kind {
                GateKind::Unitary(gate) => {
                    let expected = 1usize << gate.num_qubits();
                    let (rows, cols) = matrix.dim();
                    if rows != expected || cols != expected {
                        return Err(IrError::MatrixShape {
                            num_qubits: gate.num_qubits(),
                            expected,
                            rows,
                            cols,
                        });
                    }
                }
                GateKind::Standard(g) => {
                    return Err(IrError::NotParameterized {
                        gate: *id,
                        gate_name: g.name().to_string(),
                    });
                }
            }
        }
        for (id, matrix) in parameters {
            if let GateKind::Unitary(gate) = &mut self.instructions[id.0].gate.kind {
                gate.set_matrix(matrix)?;
            }
        }
        Ok(())
    }

    /// The matrix parameter of a unitary gate.
    pub fn parameters(&self, id: GateId) -> Option<&Array2<Complex64>> {
        match &self.instructions.get(id.0)?.gate.kind {
            GateKind::Unitary(gate) => Some(gate.matrix()),
            GateKind::Standard(_) => None,
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Get the circuit name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the number of qubits.
    pub fn num_qubits(&self) -> usize {
        self.num_qubits as usize
    }

    /// Number of instructions.
    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    /// True if no gates have been added.
    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    /// Instructions in application order.
    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    /// Look up a single instruction by handle.
    pub fn instruction(&self, id: GateId) -> Option<&Instruction> {
        self.instructions.get(id.0)
    }

    /// Get the circuit depth (longest chain of gates sharing qubits).
    pub fn depth(&self) -> usize {
        let mut layer = vec![0usize; self.num_qubits as usize];
        for inst in &self.instructions {
            let next = inst.qubits.iter().map(|q| layer[q.index()]).max().unwrap_or(0) + 1;
            for q in &inst.qubits {
                layer[q.index()] = next;
            }
        }
        layer.into_iter().max().unwrap_or(0)
    }
}
