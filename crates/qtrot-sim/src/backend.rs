//! Numeric backend handle.
//!
//! Hamiltonians hold an `Arc<dyn Backend>` chosen at construction time; the
//! backend provides the dense linear algebra (Hermitian eigensolver, matrix
//! exponential, products) and the labelled contraction used for embedding
//! local terms. Matrices are exchanged as `ndarray` arrays.

use std::fmt;
use std::sync::Arc;

use nalgebra::DMatrix;
use ndarray::{Array1, Array2, ArrayD, ArrayView2, ArrayViewD};
use num_complex::Complex64;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::einsum;
use crate::error::{SimError, SimResult};

/// Element type of Hamiltonian matrices.
///
/// Storage is always `Complex64` (`Complex<f64>`); `Complex64` precision rounds
/// every entry to single precision on construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DType {
    /// Single-precision complex (two `f32`).
    Complex64,
    /// Double-precision complex (two `f64`).
    #[default]
    Complex128,
}

impl fmt::Display for DType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DType::Complex64 => write!(f, "complex64"),
            DType::Complex128 => write!(f, "complex128"),
        }
    }
}

/// Dense linear-algebra services consumed by the Hamiltonian types.
pub trait Backend: fmt::Debug + Send + Sync {
    /// Human-readable backend name.
    fn name(&self) -> &str;

    /// Element type produced by this backend.
    fn dtype(&self) -> DType;

    /// Round a matrix to the backend's element type.
    fn cast(&self, matrix: Array2<Complex64>) -> Array2<Complex64> {
        match self.dtype() {
            DType::Complex128 => matrix,
            DType::Complex64 => matrix.mapv_into(|z| {
                Complex64::new(f64::from(z.re as f32), f64::from(z.im as f32))
            }),
        }
    }

    /// Eigenvalues of a Hermitian matrix, ascending.
    fn eigvalsh(&self, matrix: &Array2<Complex64>) -> SimResult<Array1<f64>>;

    /// Eigenvalues (ascending) and eigenvectors (as columns) of a Hermitian matrix.
    fn eigh(&self, matrix: &Array2<Complex64>) -> SimResult<(Array1<f64>, Array2<Complex64>)>;

    /// Matrix exponential `exp(matrix)`.
    fn expm(&self, matrix: &Array2<Complex64>) -> SimResult<Array2<Complex64>>;

    /// Matrix-matrix product.
    fn matmul(&self, a: ArrayView2<'_, Complex64>, b: ArrayView2<'_, Complex64>) -> Array2<Complex64> {
        a.dot(&b)
    }

    /// Identity of the given dimension.
    fn eye(&self, dim: usize) -> Array2<Complex64> {
        Array2::eye(dim)
    }

    /// Outer-product contraction over labelled axes (see [`einsum::outer`]).
    fn einsum(
        &self,
        subscripts: &str,
        a: ArrayViewD<'_, Complex64>,
        b: ArrayViewD<'_, Complex64>,
    ) -> SimResult<ArrayD<Complex64>> {
        einsum::outer(subscripts, a, b)
    }
}

/// Default backend: `nalgebra` dense decompositions on copies of the `ndarray` data.
#[derive(Debug, Clone, Copy, Default)]
pub struct NalgebraBackend {
    dtype: DType,
}

impl NalgebraBackend {
    /// Double-precision backend.
    pub fn new() -> Self {
        Self::default()
    }

    /// Backend producing the given element type.
    pub fn with_dtype(dtype: DType) -> Self {
        Self { dtype }
    }
}

impl Backend for NalgebraBackend {
    fn name(&self) -> &str {
        "nalgebra"
    }

    fn dtype(&self) -> DType {
        self.dtype
    }

    fn eigvalsh(&self, matrix: &Array2<Complex64>) -> SimResult<Array1<f64>> {
        let m = to_nalgebra(matrix, "eigvalsh")?;
        trace!(dim = m.nrows(), "hermitian eigenvalues");
        let mut values: Vec<f64> = m.symmetric_eigenvalues().iter().copied().collect();
        values.sort_by(f64::total_cmp);
        Ok(Array1::from(values))
    }

    fn eigh(&self, matrix: &Array2<Complex64>) -> SimResult<(Array1<f64>, Array2<Complex64>)> {
        let m = to_nalgebra(matrix, "eigh")?;
        let dim = m.nrows();
        trace!(dim, "hermitian eigendecomposition");
        let eig = nalgebra::SymmetricEigen::try_new(m, f64::EPSILON, 0)
            .ok_or_else(|| SimError::Linalg("eigh: eigensolver did not converge".into()))?;

        let mut order: Vec<usize> = (0..dim).collect();
        order.sort_by(|&i, &j| eig.eigenvalues[i].total_cmp(&eig.eigenvalues[j]));

        let values = order.iter().map(|&i| eig.eigenvalues[i]).collect::<Array1<f64>>();
        let vectors = Array2::from_shape_fn((dim, dim), |(r, c)| eig.eigenvectors[(r, order[c])]);
        Ok((values, vectors))
    }

    fn expm(&self, matrix: &Array2<Complex64>) -> SimResult<Array2<Complex64>> {
        let m = to_nalgebra(matrix, "expm")?;
        trace!(dim = m.nrows(), "matrix exponential");
        Ok(from_nalgebra(&m.exp()))
    }
}

/// Fresh handle to the default double-precision backend.
pub fn default_backend() -> Arc<dyn Backend> {
    Arc::new(NalgebraBackend::new())
}

fn to_nalgebra(matrix: &Array2<Complex64>, op: &str) -> SimResult<DMatrix<Complex64>> {
    let (rows, cols) = matrix.dim();
    if rows != cols {
        return Err(SimError::Linalg(format!("{op}: matrix is {rows}x{cols}, not square")));
    }
    if matrix.iter().any(|z| !z.re.is_finite() || !z.im.is_finite()) {
        return Err(SimError::Linalg(format!("{op}: matrix has non-finite entries")));
    }
    Ok(DMatrix::from_fn(rows, cols, |i, j| matrix[[i, j]]))
}

fn from_nalgebra(matrix: &DMatrix<Complex64>) -> Array2<Complex64> {
    Array2::from_shape_fn((matrix.nrows(), matrix.ncols()), |(i, j)| matrix[(i, j)])
}
