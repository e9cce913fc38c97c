//! Error types for the sim crate.

use thiserror::Error;

use crate::backend::DType;
use crate::dense::OperandKind;

/// Errors produced by Hamiltonian construction, arithmetic and Trotter synthesis.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SimError {
    /// Qubit count must be at least 1.
    #[error("nqubits must be a positive integer but is {0}")]
    InvalidQubitCount(usize),

    /// Matrix side does not match the qubit count.
    #[error("The Hamiltonian is defined for {nqubits} qubits while the given matrix has shape ({rows}, {cols})")]
    ShapeMismatch {
        /// Declared qubit count.
        nqubits: usize,
        /// Rows of the offending matrix.
        rows: usize,
        /// Columns of the offending matrix.
        cols: usize,
    },

    /// Binary operation between Hamiltonians on different registers.
    #[error("Only Hamiltonians with the same number of qubits can be {op} ({left} vs {right})")]
    QubitCountMismatch {
        /// Past-tense verb of the operation ("added", "subtracted", "multiplied").
        op: &'static str,
        /// Qubits of the left operand.
        left: usize,
        /// Qubits of the right operand.
        right: usize,
    },

    /// Operand kind not supported by an operator.
    #[error("Hamiltonian {op} with {kind} is not implemented")]
    UnsupportedOperand {
        /// Operation name.
        op: &'static str,
        /// Rejected operand kind.
        kind: OperandKind,
    },

    /// Matrix product with a tensor of unsupported rank.
    #[error("Cannot multiply Hamiltonian with rank-{0} tensor")]
    UnsupportedRank(usize),

    /// Vector or matrix operand with the wrong leading dimension.
    #[error("Operand dimension {got} does not match Hamiltonian dimension {expected}")]
    DimensionMismatch {
        /// Dimension of the Hamiltonian (2^nqubits).
        expected: usize,
        /// Dimension of the operand.
        got: usize,
    },

    /// Element types of two operators differ.
    #[error("Terms of different types {first} and {second} were given")]
    DTypeMismatch {
        /// Element type seen first.
        first: DType,
        /// Conflicting element type.
        second: DType,
    },

    /// Term placed on a qubit subset of the wrong size.
    #[error("Term targets {targets:?} but supports {supported} qubits")]
    TermTargetMismatch {
        /// The qubit subset.
        targets: Vec<usize>,
        /// Qubit count of the term.
        supported: usize,
    },

    /// The same qubit subset appears twice in one part.
    #[error("Targets {targets:?} appear more than once in part {part}")]
    DuplicateTargets {
        /// Index of the part.
        part: usize,
        /// The repeated qubit subset.
        targets: Vec<usize>,
    },

    /// A qubit subset names the same qubit twice.
    #[error("Targets {0:?} contain a repeated qubit")]
    DuplicateQubit(Vec<usize>),

    /// A registered term was never placed on any qubits.
    #[error("Term id {0} was registered but never placed")]
    UnplacedTerm(usize),

    /// A placement refers to a term id the Hamiltonian does not own.
    #[error("Unknown term id {0}")]
    UnknownTerm(usize),

    /// A placement references a qubit index that is out of range.
    #[error("Term references qubit {qubit} but the Hamiltonian only has {n_qubits} qubits")]
    QubitOutOfRange {
        /// The offending qubit index.
        qubit: usize,
        /// Number of qubits in the Hamiltonian.
        n_qubits: usize,
    },

    /// Hamiltonian contains no terms.
    #[error("Local Hamiltonian has no terms")]
    EmptyHamiltonian,

    /// Not enough contraction labels for the requested tensor ranks.
    #[error("Not enough einsum labels: {needed} needed but only {available} available")]
    CapacityExceeded {
        /// Labels the contraction would need.
        needed: usize,
        /// Size of the label alphabet.
        available: usize,
    },

    /// Malformed contraction subscripts.
    #[error("Invalid einsum subscripts '{subscripts}': {reason}")]
    InvalidSubscripts {
        /// The subscripts string.
        subscripts: String,
        /// What is wrong with it.
        reason: String,
    },

    /// Numeric backend failure.
    #[error("Linear algebra error: {0}")]
    Linalg(String),

    /// Time step outside the accepted range.
    #[error("Invalid time step {0}")]
    InvalidTimeStep(f64),

    /// n_steps must be ≥ 1.
    #[error("n_steps must be at least 1, got {0}")]
    InvalidSteps(usize),

    /// Circuit builder returned an error.
    #[error("Circuit IR error: {0}")]
    Ir(#[from] qtrot_ir::IrError),
}

/// Result type for simulation operations.
pub type SimResult<T> = Result<T, SimError>;
