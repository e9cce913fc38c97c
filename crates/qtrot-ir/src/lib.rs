//! qtrot Circuit Intermediate Representation
//!
//! This crate provides the circuit data structures the Trotter builder in
//! `qtrot-sim` emits into: a fixed-width register and an ordered list of gate
//! placements, each placement addressed by a stable [`GateId`].
//!
//! # Core Components
//!
//! - **Qubits**: [`QubitId`] for addressing the register (qubit 0 is the most
//!   significant bit of a basis index)
//! - **Gates**: [`StandardGate`] for built-in gates and [`UnitaryGate`] for
//!   local operators given by an explicit matrix
//! - **Instructions**: [`Instruction`] combining a gate with its ordered operands
//! - **Circuit**: [`Circuit`] with `add` and `set_parameters`
//!
//! # Example: Re-parameterising a Local Unitary
//!
//! ```rust
//! use qtrot_ir::{Circuit, QubitId};
//! use ndarray::Array2;
//! use num_complex::Complex64;
//!
//! let mut circuit = Circuit::with_size("step", 3);
//! let gate = circuit.unitary(Array2::eye(4), [QubitId(2), QubitId(0)]).unwrap();
//!
//! // Swap the matrix without touching the placement.
//! let phase = Array2::eye(4).mapv(|z: Complex64| z * Complex64::new(0.0, 1.0));
//! circuit.set_parameters([(gate, phase.clone())]).unwrap();
//!
//! assert_eq!(circuit.parameters(gate), Some(&phase));
//! assert_eq!(circuit.len(), 1);
//! ```

pub mod circuit;
pub mod error;
pub mod gate;
pub mod instruction;
pub mod qubit;

pub use circuit::{Circuit, GateId};
pub use error::{IrError, IrResult};
pub use gate::{Gate, GateKind, StandardGate, UnitaryGate};
pub use instruction::Instruction;
pub use qubit::QubitId;
