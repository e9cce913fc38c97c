//! Hamiltonians given as sums of local terms.
//!
//! A [`LocalHamiltonian`] is `H = Σ H_k`, where every term `H_k` is a small
//! [`DenseHamiltonian`] placed on an ordered tuple of qubits. Placements are
//! grouped into *parts*: the Trotter builder applies the parts in order, then
//! again in reverse order, so the partition decides the splitting.
//!
//! Terms are registered once and referenced by [`TermId`]. Placing the same
//! id on several qubit tuples shares one operator between sites, so scaling
//! or exponentiating it happens once per term rather than once per site.
//!
//! # Example
//!
//! ```rust
//! use qtrot_sim::local::LocalHamiltonianBuilder;
//! use qtrot_sim::models;
//!
//! let mut builder = LocalHamiltonianBuilder::new();
//! let bond = builder.term(models::tfim_term(1.0).unwrap());
//! builder.part([([0, 1], bond)]);
//! builder.part([([1, 2], bond)]);
//! let mut h = builder.build().unwrap();
//!
//! assert_eq!(h.nqubits(), 3);
//! let circuit = h.trotter_circuit(0.1).unwrap();
//! assert_eq!(circuit.len(), 4);
//! ```

use std::fmt;
use std::ops::Mul;

use ndarray::ArrayView1;
use num_complex::Complex64;
use rustc_hash::FxHashSet;
use tracing::debug;

use qtrot_ir::{Circuit, GateId};

use crate::backend::DType;
use crate::dense::DenseHamiltonian;
use crate::einsum;
use crate::error::{SimError, SimResult};
use crate::statevector::Statevector;
use crate::trotter::TrotterStep;

/// Handle of a term registered with a [`LocalHamiltonianBuilder`].
///
/// Ids are dense indices assigned in registration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TermId(pub usize);

impl fmt::Display for TermId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "h{}", self.0)
    }
}

/// One group of term placements, applied together in a Trotter sweep.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Part {
    placements: Vec<(Vec<usize>, TermId)>,
}

impl Part {
    /// Placements in insertion order.
    pub fn placements(&self) -> &[(Vec<usize>, TermId)] {
        &self.placements
    }

    /// The term placed on exactly `targets`, if any.
    pub fn get(&self, targets: &[usize]) -> Option<TermId> {
        self.placements
            .iter()
            .find(|(t, _)| t.as_slice() == targets)
            .map(|&(_, id)| id)
    }

    /// Number of placements.
    pub fn len(&self) -> usize {
        self.placements.len()
    }

    /// True if the part places no terms.
    pub fn is_empty(&self) -> bool {
        self.placements.is_empty()
    }
}

// =============================================================================
// Builder
// =============================================================================

/// Collects terms and parts, validating everything in [`build`].
///
/// [`build`]: LocalHamiltonianBuilder::build
#[derive(Debug, Clone, Default)]
pub struct LocalHamiltonianBuilder {
    terms: Vec<DenseHamiltonian>,
    parts: Vec<Part>,
}

impl LocalHamiltonianBuilder {
    /// Empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a term, returning the id used to place it.
    pub fn term(&mut self, term: DenseHamiltonian) -> TermId {
        self.terms.push(term);
        TermId(self.terms.len() - 1)
    }

    /// Append a part made of `(targets, term)` placements.
    pub fn part<I, T>(&mut self, placements: I) -> &mut Self
    where
        I: IntoIterator<Item = (T, TermId)>,
        T: AsRef<[usize]>,
    {
        self.parts.push(Part {
            placements: placements
                .into_iter()
                .map(|(targets, id)| (targets.as_ref().to_vec(), id))
                .collect(),
        });
        self
    }

    /// Validate the placements and assemble the Hamiltonian.
    ///
    /// The register size is the number of distinct qubits used; every qubit
    /// index must lie below it.
    pub fn build(self) -> SimResult<LocalHamiltonian> {
        let Self { terms, parts } = self;

        let dtype = match terms.first() {
            Some(first) => first.dtype(),
            None => return Err(SimError::EmptyHamiltonian),
        };
        if let Some(other) = terms.iter().find(|t| t.dtype() != dtype) {
            return Err(SimError::DTypeMismatch {
                first: dtype,
                second: other.dtype(),
            });
        }

        let mut placed = vec![false; terms.len()];
        let mut qubits = FxHashSet::default();
        for (index, part) in parts.iter().enumerate() {
            let mut seen_targets = FxHashSet::default();
            for (targets, id) in part.placements() {
                let term = terms.get(id.0).ok_or(SimError::UnknownTerm(id.0))?;
                if targets.len() != term.nqubits() {
                    return Err(SimError::TermTargetMismatch {
                        targets: targets.clone(),
                        supported: term.nqubits(),
                    });
                }
                let unique: FxHashSet<usize> = targets.iter().copied().collect();
                if unique.len() != targets.len() {
                    return Err(SimError::DuplicateQubit(targets.clone()));
                }
                if !seen_targets.insert(targets.as_slice()) {
                    return Err(SimError::DuplicateTargets {
                        part: index,
                        targets: targets.clone(),
                    });
                }
                qubits.extend(unique);
                placed[id.0] = true;
            }
        }
        if qubits.is_empty() {
            return Err(SimError::EmptyHamiltonian);
        }
        if let Some(unplaced) = placed.iter().position(|&p| !p) {
            return Err(SimError::UnplacedTerm(unplaced));
        }

        let nqubits = qubits.len();
        if let Some(&qubit) = qubits.iter().find(|&&q| q >= nqubits) {
            return Err(SimError::QubitOutOfRange {
                qubit,
                n_qubits: nqubits,
            });
        }

        debug!(
            nqubits,
            terms = terms.len(),
            parts = parts.len(),
            "built local Hamiltonian"
        );
        Ok(LocalHamiltonian {
            nqubits,
            dtype,
            terms,
            parts,
            trotter: None,
        })
    }
}

// =============================================================================
// LocalHamiltonian
// =============================================================================

/// Sum of dense terms on qubit subsets, grouped into ordered parts.
#[derive(Debug, Clone)]
pub struct LocalHamiltonian {
    nqubits: usize,
    dtype: DType,
    /// Distinct terms, indexed by [`TermId`].
    terms: Vec<DenseHamiltonian>,
    parts: Vec<Part>,
    /// Cached Trotter step, `None` until the first [`trotter_circuit`] call.
    ///
    /// [`trotter_circuit`]: LocalHamiltonian::trotter_circuit
    trotter: Option<TrotterStep>,
}

impl LocalHamiltonian {
    /// Start a builder.
    pub fn builder() -> LocalHamiltonianBuilder {
        LocalHamiltonianBuilder::new()
    }

    /// Tile a two-qubit `term` over a periodic ring of `nqubits` sites.
    ///
    /// The first part holds the bonds `(0,1), (2,3), …` and the second
    /// `(1,2), (3,4), …`, both wrapping around the ring. For odd rings the
    /// first part gets the extra bond `(n-1, 0)`, which overlaps `(0,1)` on
    /// qubit 0. Those two factors do not commute, so the Trotter step of an
    /// odd ring is only first-order accurate.
    pub fn from_uniform_term(nqubits: usize, term: DenseHamiltonian) -> SimResult<Self> {
        if nqubits < 2 {
            return Err(SimError::InvalidQubitCount(nqubits));
        }
        let mut builder = LocalHamiltonianBuilder::new();
        let id = builder.term(term);
        let even = (0..nqubits / 2 + nqubits % 2).map(|i| ([2 * i, (2 * i + 1) % nqubits], id));
        let odd = (0..nqubits / 2).map(|i| ([2 * i + 1, (2 * i + 2) % nqubits], id));
        builder.part(even);
        builder.part(odd);
        builder.build()
    }

    /// Register size.
    pub fn nqubits(&self) -> usize {
        self.nqubits
    }

    /// Element type shared by all terms.
    pub fn dtype(&self) -> DType {
        self.dtype
    }

    /// Distinct terms, indexed by [`TermId`].
    pub fn terms(&self) -> &[DenseHamiltonian] {
        &self.terms
    }

    /// The term registered as `id`.
    pub fn term(&self, id: TermId) -> Option<&DenseHamiltonian> {
        self.terms.get(id.0)
    }

    /// Parts in sweep order.
    pub fn parts(&self) -> &[Part] {
        &self.parts
    }

    /// `(targets, term)` pairs in part order, then insertion order.
    pub fn iter(&self) -> Terms<'_> {
        Terms {
            hamiltonian: self,
            part: 0,
            index: 0,
        }
    }

    /// `(targets, term id)` pairs in the same order as [`iter`].
    ///
    /// [`iter`]: LocalHamiltonian::iter
    pub fn placements(&self) -> impl Iterator<Item = (&[usize], TermId)> + '_ {
        self.parts
            .iter()
            .flat_map(|part| part.placements().iter().map(|(t, id)| (t.as_slice(), *id)))
    }

    /// Sum every placed term embedded into the full register.
    ///
    /// Fails with [`SimError::CapacityExceeded`] beyond
    /// [`MAX_EMBED_QUBITS`](crate::einsum::MAX_EMBED_QUBITS) qubits.
    pub fn to_dense(&self) -> SimResult<DenseHamiltonian> {
        let backend = self.terms[0].backend();
        debug!(nqubits = self.nqubits, "reconstructing dense Hamiltonian");
        let matrix = self
            .iter()
            .map(|(targets, term)| {
                einsum::embed(backend.as_ref(), term.matrix().view(), targets, self.nqubits)
            })
            .reduce(|sum, embedded| Ok(sum? + &embedded?))
            .ok_or(SimError::EmptyHamiltonian)??;
        DenseHamiltonian::with_backend(self.nqubits, matrix, backend.clone())
    }

    /// `c·H`, scaling each distinct term once.
    ///
    /// Part structure and placements are unchanged; the Trotter cache is not
    /// carried over.
    pub fn scale(&self, c: impl Into<Complex64>) -> Self {
        let c = c.into();
        Self {
            nqubits: self.nqubits,
            dtype: self.dtype,
            terms: self.terms.iter().map(|t| t.scale(c)).collect(),
            parts: self.parts.clone(),
            trotter: None,
        }
    }

    /// Circuit for one symmetric Trotter step of length `dt`.
    ///
    /// The first call builds the circuit. Later calls with a different `dt`
    /// only replace gate matrices, so [`GateId`]s stay valid across calls;
    /// repeating the current `dt` returns the cached circuit untouched.
    /// If recomputing the matrices fails the cached circuit is dropped.
    pub fn trotter_circuit(&mut self, dt: f64) -> SimResult<&Circuit> {
        if !dt.is_finite() {
            return Err(SimError::InvalidTimeStep(dt));
        }
        let step = match self.trotter.take() {
            Some(mut step) => {
                step.reparameterize(&mut self.terms, dt)?;
                step
            }
            None => TrotterStep::build(self.nqubits, &mut self.terms, &self.parts, dt)?,
        };
        let step: &TrotterStep = self.trotter.insert(step);
        Ok(step.circuit())
    }

    /// The cached Trotter step, if a circuit was built.
    pub fn trotter_step(&self) -> Option<&TrotterStep> {
        self.trotter.as_ref()
    }

    /// Gates generated by `term` in the cached Trotter circuit.
    pub fn term_gates(&self, term: TermId) -> Option<&[GateId]> {
        self.trotter.as_ref()?.gates_for(term)
    }

    /// `⟨ψ|H|ψ⟩` summed term by term, without forming the dense matrix.
    pub fn expectation(&self, state: ArrayView1<'_, Complex64>, normalize: bool) -> SimResult<f64> {
        let psi = Statevector::from_amplitudes(state.to_owned())?;
        if psi.num_qubits() != self.nqubits {
            return Err(SimError::DimensionMismatch {
                expected: 1usize << self.nqubits,
                got: state.len(),
            });
        }
        let mut value = 0.0;
        for (targets, term) in self {
            let mut h_psi = psi.clone();
            h_psi.apply_matrix(term.matrix().view(), targets)?;
            value += psi.inner(&h_psi)?.re;
        }
        if normalize {
            value /= psi.norm().powi(2);
        }
        Ok(value)
    }
}

impl Mul<f64> for &LocalHamiltonian {
    type Output = LocalHamiltonian;

    fn mul(self, rhs: f64) -> LocalHamiltonian {
        self.scale(rhs)
    }
}

impl Mul<Complex64> for &LocalHamiltonian {
    type Output = LocalHamiltonian;

    fn mul(self, rhs: Complex64) -> LocalHamiltonian {
        self.scale(rhs)
    }
}

impl<'a> IntoIterator for &'a LocalHamiltonian {
    type Item = (&'a [usize], &'a DenseHamiltonian);
    type IntoIter = Terms<'a>;

    fn into_iter(self) -> Terms<'a> {
        self.iter()
    }
}

/// Iterator over the placed terms of a [`LocalHamiltonian`].
#[derive(Debug, Clone)]
pub struct Terms<'a> {
    hamiltonian: &'a LocalHamiltonian,
    part: usize,
    index: usize,
}

impl<'a> Iterator for Terms<'a> {
    type Item = (&'a [usize], &'a DenseHamiltonian);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(part) = self.hamiltonian.parts.get(self.part) {
            if let Some((targets, id)) = part.placements.get(self.index) {
                self.index += 1;
                return Some((targets.as_slice(), &self.hamiltonian.terms[id.0]));
            }
            self.part += 1;
            self.index = 0;
        }
        None
    }
}
