//! Full-matrix Hamiltonians.
//!
//! A [`DenseHamiltonian`] stores the `2^n × 2^n` matrix of an operator on `n`
//! qubits together with lazily computed spectral data:
//!
//! - eigenvalues / eigenvectors, memoised from the first request;
//! - `exp(-i·a·H)` for the most recently requested `a` (a single slot).
//!
//! Arithmetic never mutates: every operator returns a fresh instance, so a
//! cache can never outlive the matrix it was computed from. Scaling by a real
//! number carries the spectral caches over when they already exist.
//!
//! # Example
//!
//! ```rust
//! use qtrot_sim::dense::DenseHamiltonian;
//! use qtrot_sim::matrices;
//!
//! let mut h = DenseHamiltonian::new(1, matrices::pauli_z()).unwrap();
//! assert_eq!(h.eigenvalues().unwrap().to_vec(), vec![-1.0, 1.0]);
//!
//! // Scaling by a negative number reverses the cached spectrum.
//! let mut scaled = &h * -2.0;
//! assert_eq!(scaled.eigenvalues().unwrap().to_vec(), vec![-2.0, 2.0]);
//! ```

use std::fmt;
use std::ops::{Add, Mul, Neg, Sub};
use std::sync::Arc;

use ndarray::{Array1, Array2, ArrayView1, ArrayView2, ArrayViewD, Axis, Ix1, Ix2, s};
use num_complex::Complex64;
use tracing::debug;

use crate::backend::{Backend, DType, default_backend};
use crate::error::{SimError, SimResult};

/// `exp(-i·a·H)` memoised for one value of `a`.
#[derive(Debug, Clone)]
struct ExpCache {
    a: Complex64,
    result: Array2<Complex64>,
}

/// Hamiltonian stored as a dense matrix in the computational basis.
#[derive(Debug, Clone)]
pub struct DenseHamiltonian {
    nqubits: usize,
    matrix: Array2<Complex64>,
    backend: Arc<dyn Backend>,
    eigenvalues: Option<Array1<f64>>,
    eigenvectors: Option<Array2<Complex64>>,
    exp: Option<ExpCache>,
}

impl DenseHamiltonian {
    /// Create a Hamiltonian on the default double-precision backend.
    ///
    /// Fails if `nqubits == 0` or if `matrix` is not `(2^nqubits, 2^nqubits)`.
    pub fn new(nqubits: usize, matrix: Array2<Complex64>) -> SimResult<Self> {
        Self::with_backend(nqubits, matrix, default_backend())
    }

    /// Create a Hamiltonian whose numerics run on `backend`.
    pub fn with_backend(
        nqubits: usize,
        matrix: Array2<Complex64>,
        backend: Arc<dyn Backend>,
    ) -> SimResult<Self> {
        if nqubits == 0 {
            return Err(SimError::InvalidQubitCount(nqubits));
        }
        let (rows, cols) = matrix.dim();
        let expected = u32::try_from(nqubits)
            .ok()
            .and_then(|n| 1usize.checked_shl(n));
        if expected != Some(rows) || rows != cols {
            return Err(SimError::ShapeMismatch {
                nqubits,
                rows,
                cols,
            });
        }
        let matrix = backend.cast(matrix);
        Ok(Self {
            nqubits,
            matrix,
            backend,
            eigenvalues: None,
            eigenvectors: None,
            exp: None,
        })
    }

    /// The identity operator on `nqubits` qubits.
    pub fn identity(nqubits: usize) -> SimResult<Self> {
        let dim = u32::try_from(nqubits)
            .ok()
            .and_then(|n| 1usize.checked_shl(n))
            .ok_or(SimError::InvalidQubitCount(nqubits))?;
        Self::new(nqubits, Array2::eye(dim))
    }

    /// Same register and backend, new matrix, empty caches.
    fn derived(&self, matrix: Array2<Complex64>) -> Self {
        Self {
            nqubits: self.nqubits,
            matrix: self.backend.cast(matrix),
            backend: Arc::clone(&self.backend),
            eigenvalues: None,
            eigenvectors: None,
            exp: None,
        }
    }

    /// Number of qubits.
    pub fn nqubits(&self) -> usize {
        self.nqubits
    }

    /// Side length of the matrix (`2^nqubits`).
    pub fn dim(&self) -> usize {
        self.matrix.nrows()
    }

    /// The matrix in the computational basis.
    pub fn matrix(&self) -> &Array2<Complex64> {
        &self.matrix
    }

    /// Element type of the matrix.
    pub fn dtype(&self) -> DType {
        self.backend.dtype()
    }

    /// The numeric backend this Hamiltonian computes with.
    pub fn backend(&self) -> &Arc<dyn Backend> {
        &self.backend
    }

    // =========================================================================
    // Spectral data
    // =========================================================================

    /// Eigenvalues in ascending order, computed on first use.
    ///
    /// Uses the values-only solver unless eigenvectors were already computed.
    pub fn eigenvalues(&mut self) -> SimResult<&Array1<f64>> {
        let values = match self.eigenvalues.take() {
            Some(values) => values,
            None => {
                debug!(nqubits = self.nqubits, "computing eigenvalues");
                self.backend.eigvalsh(&self.matrix)?
            }
        };
        let values: &Array1<f64> = self.eigenvalues.insert(values);
        Ok(values)
    }

    /// Eigenvectors as the columns of a unitary, ordered like [`eigenvalues`].
    ///
    /// The joint decomposition also refreshes the eigenvalue cache.
    ///
    /// [`eigenvalues`]: DenseHamiltonian::eigenvalues
    pub fn eigenvectors(&mut self) -> SimResult<&Array2<Complex64>> {
        let vectors = match self.eigenvectors.take() {
            Some(vectors) => vectors,
            None => {
                debug!(nqubits = self.nqubits, "computing eigendecomposition");
                let (values, vectors) = self.backend.eigh(&self.matrix)?;
                self.eigenvalues = Some(values);
                vectors
            }
        };
        let vectors: &Array2<Complex64> = self.eigenvectors.insert(vectors);
        Ok(vectors)
    }

    /// Eigenvector of the lowest eigenvalue.
    pub fn ground_state(&mut self) -> SimResult<Array1<Complex64>> {
        Ok(self.eigenvectors()?.column(0).to_owned())
    }

    /// `exp(-i·a·H)`.
    ///
    /// Only the most recent `a` is cached; asking for a different value
    /// replaces the cached result.
    pub fn exponential(&mut self, a: impl Into<Complex64>) -> SimResult<&Array2<Complex64>> {
        let a = a.into();
        let cache = match self.exp.take() {
            Some(cache) if cache.a == a => cache,
            _ => {
                debug!(nqubits = self.nqubits, %a, "computing matrix exponential");
                let factor = Complex64::new(0.0, -1.0) * a;
                let generator = self.matrix.mapv(|h| h * factor);
                let result = self.backend.cast(self.backend.expm(&generator)?);
                ExpCache { a, result }
            }
        };
        Ok(&self.exp.insert(cache).result)
    }

    /// Real expectation value `⟨ψ|H|ψ⟩`, divided by `⟨ψ|ψ⟩` if `normalize`.
    pub fn expectation(&self, state: ArrayView1<'_, Complex64>, normalize: bool) -> SimResult<f64> {
        if state.len() != self.dim() {
            return Err(SimError::DimensionMismatch {
                expected: self.dim(),
                got: state.len(),
            });
        }
        let h_state = self.matrix.dot(&state);
        let value = state
            .iter()
            .zip(h_state.iter())
            .map(|(s, hs)| s.conj() * hs)
            .sum::<Complex64>()
            .re;
        if normalize {
            let norm: f64 = state.iter().map(|s| s.norm_sqr()).sum();
            Ok(value / norm)
        } else {
            Ok(value)
        }
    }

    // =========================================================================
    // Algebra
    // =========================================================================

    fn check_compatible(&self, other: &Self, op: &'static str) -> SimResult<()> {
        if self.nqubits != other.nqubits {
            return Err(SimError::QubitCountMismatch {
                op,
                left: self.nqubits,
                right: other.nqubits,
            });
        }
        if self.dtype() != other.dtype() {
            return Err(SimError::DTypeMismatch {
                first: self.dtype(),
                second: other.dtype(),
            });
        }
        Ok(())
    }

    /// `H + c·I`.
    fn shifted(&self, c: Complex64) -> Self {
        let mut matrix = self.matrix.clone();
        matrix.diag_mut().mapv_inplace(|d| d + c);
        self.derived(matrix)
    }

    /// `self + rhs`, where a scalar stands for `scalar × identity`.
    pub fn add_operand<'a>(&self, rhs: impl Into<Operand<'a>>) -> SimResult<Self> {
        match rhs.into() {
            Operand::Operator(other) => {
                self.check_compatible(other, "added")?;
                Ok(self.derived(&self.matrix + &other.matrix))
            }
            Operand::Scalar(c) => Ok(self.shifted(c)),
            other => Err(SimError::UnsupportedOperand {
                op: "addition",
                kind: other.kind(),
            }),
        }
    }

    /// `self - rhs`, where a scalar stands for `scalar × identity`.
    pub fn sub_operand<'a>(&self, rhs: impl Into<Operand<'a>>) -> SimResult<Self> {
        match rhs.into() {
            Operand::Operator(other) => {
                self.check_compatible(other, "subtracted")?;
                Ok(self.derived(&self.matrix - &other.matrix))
            }
            Operand::Scalar(c) => Ok(self.shifted(-c)),
            other => Err(SimError::UnsupportedOperand {
                op: "subtraction",
                kind: other.kind(),
            }),
        }
    }

    /// `lhs - self`.
    pub fn rsub_operand<'a>(&self, lhs: impl Into<Operand<'a>>) -> SimResult<Self> {
        match lhs.into() {
            Operand::Operator(other) => {
                self.check_compatible(other, "subtracted")?;
                Ok(self.derived(&other.matrix - &self.matrix))
            }
            Operand::Scalar(c) => Ok(self.scale(-1.0).shifted(c)),
            other => Err(SimError::UnsupportedOperand {
                op: "subtraction",
                kind: other.kind(),
            }),
        }
    }

    /// Multiply by a scalar, or elementwise by a matrix of the same shape.
    pub fn mul_operand<'a>(&self, rhs: impl Into<Operand<'a>>) -> SimResult<Self> {
        match rhs.into() {
            Operand::Scalar(c) => Ok(self.scale(c)),
            Operand::Matrix(m) => {
                if m.dim() != self.matrix.dim() {
                    return Err(SimError::DimensionMismatch {
                        expected: self.dim(),
                        got: m.nrows(),
                    });
                }
                Ok(self.derived(&self.matrix * &m))
            }
            Operand::Tensor(t) if t.ndim() == 2 => {
                let m = t.into_dimensionality::<Ix2>().map_err(shape_error)?;
                self.mul_operand(Operand::Matrix(m))
            }
            other => Err(SimError::UnsupportedOperand {
                op: "multiplication",
                kind: other.kind(),
            }),
        }
    }

    /// Scalar multiple `c·H`.
    ///
    /// Existing spectral caches are carried over for real `c`: a positive
    /// factor keeps the eigenvectors, a negative one reverses both orders,
    /// zero leaves the identity as eigenbasis. A non-real factor drops them.
    pub fn scale(&self, c: impl Into<Complex64>) -> Self {
        let c = c.into();
        let mut scaled = self.derived(self.matrix.mapv(|h| h * c));
        if c.im != 0.0 {
            return scaled;
        }
        let r = c.re;
        if let Some(values) = &self.eigenvalues {
            scaled.eigenvalues = Some(if r >= 0.0 {
                values.mapv(|v| v * r)
            } else {
                values.slice(s![..;-1]).mapv(|v| v * r)
            });
        }
        if let Some(vectors) = &self.eigenvectors {
            scaled.eigenvectors = Some(if r > 0.0 {
                vectors.clone()
            } else if r == 0.0 {
                self.backend.eye(vectors.nrows())
            } else {
                vectors.slice(s![.., ..;-1]).to_owned()
            });
        }
        scaled
    }

    /// Matrix product with another Hamiltonian, a state vector or a matrix.
    pub fn matmul<'a>(&self, rhs: impl Into<Operand<'a>>) -> SimResult<MatmulOutput> {
        match rhs.into() {
            Operand::Operator(other) => {
                self.check_compatible(other, "multiplied")?;
                let product = self.backend.matmul(self.matrix.view(), other.matrix.view());
                Ok(MatmulOutput::Operator(self.derived(product)))
            }
            Operand::Vector(v) => {
                self.check_rows(v.len())?;
                let column = self.backend.matmul(self.matrix.view(), v.insert_axis(Axis(1)));
                Ok(MatmulOutput::Vector(column.column(0).to_owned()))
            }
            Operand::Matrix(m) => {
                self.check_rows(m.nrows())?;
                Ok(MatmulOutput::Matrix(self.backend.matmul(self.matrix.view(), m)))
            }
            Operand::Tensor(t) => match t.ndim() {
                1 => self.matmul(Operand::Vector(
                    t.into_dimensionality::<Ix1>().map_err(shape_error)?,
                )),
                2 => self.matmul(Operand::Matrix(
                    t.into_dimensionality::<Ix2>().map_err(shape_error)?,
                )),
                rank => Err(SimError::UnsupportedRank(rank)),
            },
            Operand::Scalar(_) => Err(SimError::UnsupportedOperand {
                op: "matrix multiplication",
                kind: OperandKind::Scalar,
            }),
        }
    }

    fn check_rows(&self, got: usize) -> SimResult<()> {
        if got != self.dim() {
            return Err(SimError::DimensionMismatch {
                expected: self.dim(),
                got,
            });
        }
        Ok(())
    }
}

fn shape_error(e: ndarray::ShapeError) -> SimError {
    SimError::Linalg(format!("operand shape: {e}"))
}

// =============================================================================
// Operands
// =============================================================================

/// Right-hand side of a Hamiltonian operator.
#[derive(Debug, Clone)]
pub enum Operand<'a> {
    /// A number, read as `number × identity` by addition and subtraction.
    Scalar(Complex64),
    /// Another dense Hamiltonian.
    Operator(&'a DenseHamiltonian),
    /// A state vector.
    Vector(ArrayView1<'a, Complex64>),
    /// A matrix.
    Matrix(ArrayView2<'a, Complex64>),
    /// A tensor of any rank; ranks 1 and 2 behave like vectors and matrices.
    Tensor(ArrayViewD<'a, Complex64>),
}

impl Operand<'_> {
    /// The operand's kind, as reported in errors.
    pub fn kind(&self) -> OperandKind {
        match self {
            Operand::Scalar(_) => OperandKind::Scalar,
            Operand::Operator(_) => OperandKind::Operator,
            Operand::Vector(_) => OperandKind::Vector,
            Operand::Matrix(_) => OperandKind::Matrix,
            Operand::Tensor(t) => OperandKind::Tensor(t.ndim()),
        }
    }
}

/// Kind of an [`Operand`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperandKind {
    /// Real or complex number.
    Scalar,
    /// Dense Hamiltonian.
    Operator,
    /// Rank-1 array.
    Vector,
    /// Rank-2 array.
    Matrix,
    /// Array of the given rank.
    Tensor(usize),
}

impl fmt::Display for OperandKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OperandKind::Scalar => write!(f, "scalar"),
            OperandKind::Operator => write!(f, "Hamiltonian"),
            OperandKind::Vector => write!(f, "vector"),
            OperandKind::Matrix => write!(f, "matrix"),
            OperandKind::Tensor(rank) => write!(f, "rank-{rank} tensor"),
        }
    }
}

impl From<f64> for Operand<'_> {
    fn from(value: f64) -> Self {
        Operand::Scalar(Complex64::new(value, 0.0))
    }
}

impl From<Complex64> for Operand<'_> {
    fn from(value: Complex64) -> Self {
        Operand::Scalar(value)
    }
}

impl<'a> From<&'a DenseHamiltonian> for Operand<'a> {
    fn from(value: &'a DenseHamiltonian) -> Self {
        Operand::Operator(value)
    }
}

impl<'a> From<ArrayView1<'a, Complex64>> for Operand<'a> {
    fn from(value: ArrayView1<'a, Complex64>) -> Self {
        Operand::Vector(value)
    }
}

impl<'a> From<&'a Array1<Complex64>> for Operand<'a> {
    fn from(value: &'a Array1<Complex64>) -> Self {
        Operand::Vector(value.view())
    }
}

impl<'a> From<ArrayView2<'a, Complex64>> for Operand<'a> {
    fn from(value: ArrayView2<'a, Complex64>) -> Self {
        Operand::Matrix(value)
    }
}

impl<'a> From<&'a Array2<Complex64>> for Operand<'a> {
    fn from(value: &'a Array2<Complex64>) -> Self {
        Operand::Matrix(value.view())
    }
}

impl<'a> From<ArrayViewD<'a, Complex64>> for Operand<'a> {
    fn from(value: ArrayViewD<'a, Complex64>) -> Self {
        Operand::Tensor(value)
    }
}

/// Result of [`DenseHamiltonian::matmul`].
#[derive(Debug, Clone)]
pub enum MatmulOutput {
    /// Product of two Hamiltonians.
    Operator(DenseHamiltonian),
    /// `H·ψ` for a state vector ψ.
    Vector(Array1<Complex64>),
    /// `H·M` for a matrix M.
    Matrix(Array2<Complex64>),
}

impl MatmulOutput {
    /// The product Hamiltonian, if the right operand was one.
    pub fn into_operator(self) -> Option<DenseHamiltonian> {
        match self {
            MatmulOutput::Operator(h) => Some(h),
            _ => None,
        }
    }

    /// The product vector, if the right operand was one.
    pub fn into_vector(self) -> Option<Array1<Complex64>> {
        match self {
            MatmulOutput::Vector(v) => Some(v),
            _ => None,
        }
    }

    /// The product matrix, if the right operand was one.
    pub fn into_matrix(self) -> Option<Array2<Complex64>> {
        match self {
            MatmulOutput::Matrix(m) => Some(m),
            _ => None,
        }
    }
}

// =============================================================================
// Operator overloads
// =============================================================================

impl Add<&DenseHamiltonian> for &DenseHamiltonian {
    type Output = SimResult<DenseHamiltonian>;

    fn add(self, rhs: &DenseHamiltonian) -> Self::Output {
        self.add_operand(rhs)
    }
}

impl Sub<&DenseHamiltonian> for &DenseHamiltonian {
    type Output = SimResult<DenseHamiltonian>;

    fn sub(self, rhs: &DenseHamiltonian) -> Self::Output {
        self.sub_operand(rhs)
    }
}

impl Add<f64> for &DenseHamiltonian {
    type Output = DenseHamiltonian;

    fn add(self, rhs: f64) -> DenseHamiltonian {
        self.shifted(Complex64::new(rhs, 0.0))
    }
}

impl Add<&DenseHamiltonian> for f64 {
    type Output = DenseHamiltonian;

    fn add(self, rhs: &DenseHamiltonian) -> DenseHamiltonian {
        rhs + self
    }
}

impl Sub<f64> for &DenseHamiltonian {
    type Output = DenseHamiltonian;

    fn sub(self, rhs: f64) -> DenseHamiltonian {
        self.shifted(Complex64::new(-rhs, 0.0))
    }
}

impl Sub<&DenseHamiltonian> for f64 {
    type Output = DenseHamiltonian;

    fn sub(self, rhs: &DenseHamiltonian) -> DenseHamiltonian {
        rhs.scale(-1.0).shifted(Complex64::new(self, 0.0))
    }
}

impl Mul<f64> for &DenseHamiltonian {
    type Output = DenseHamiltonian;

    fn mul(self, rhs: f64) -> DenseHamiltonian {
        self.scale(rhs)
    }
}

impl Mul<Complex64> for &DenseHamiltonian {
    type Output = DenseHamiltonian;

    fn mul(self, rhs: Complex64) -> DenseHamiltonian {
        self.scale(rhs)
    }
}

impl Mul<&DenseHamiltonian> for f64 {
    type Output = DenseHamiltonian;

    fn mul(self, rhs: &DenseHamiltonian) -> DenseHamiltonian {
        rhs.scale(self)
    }
}

impl Neg for &DenseHamiltonian {
    type Output = DenseHamiltonian;

    fn neg(self) -> DenseHamiltonian {
        self.scale(-1.0)
    }
}
