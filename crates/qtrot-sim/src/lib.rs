//! `qtrot-sim`: dense and local Hamiltonians with Trotter circuit synthesis.
//!
//! - [`DenseHamiltonian`]: full `2^n × 2^n` operator with memoised spectrum
//!   and matrix exponential, closed under `+`, `-`, scalar `*` and `matmul`
//! - [`LocalHamiltonian`]: sum of small terms on qubit subsets, grouped into
//!   parts; reconstructs its dense form by tensor embedding and emits a
//!   second-order Trotter circuit as a `qtrot_ir::Circuit`
//! - [`Statevector`]: reference simulator used to check circuits
//!
//! Linear algebra runs on a [`Backend`] handle held by every Hamiltonian;
//! [`NalgebraBackend`] is the default.
//!
//! # Quick start
//!
//! ```rust
//! use qtrot_sim::models;
//!
//! // Periodic transverse-field Ising ring on 4 sites.
//! let mut ring = models::tfim_ring(4, 1.0).unwrap();
//! let dense = ring.to_dense().unwrap();
//! assert_eq!(dense.matrix().dim(), (16, 16));
//!
//! // Two parts swept forward then backward: 8 local gates.
//! let circuit = ring.trotter_circuit(0.05).unwrap();
//! assert_eq!(circuit.len(), 8);
//! assert_eq!(circuit.num_qubits(), 4);
//! ```

pub mod backend;
pub mod dense;
pub mod einsum;
pub mod error;
pub mod evolution;
pub mod local;
pub mod matrices;
pub mod models;
pub mod statevector;
pub mod trotter;

pub use backend::{Backend, DType, NalgebraBackend, default_backend};
pub use dense::{DenseHamiltonian, MatmulOutput, Operand, OperandKind};
pub use error::{SimError, SimResult};
pub use evolution::{StateEvolution, exact_evolve};
pub use local::{LocalHamiltonian, LocalHamiltonianBuilder, Part, TermId};
pub use statevector::{Statevector, circuit_unitary};
pub use trotter::TrotterStep;
