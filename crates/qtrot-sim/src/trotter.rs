//! Second-order Trotter step circuits.
//!
//! One step of `exp(-i·H·dt)` for `H = Σ_k H_k` is approximated by the
//! symmetric product
//!
//! ```text
//! U(dt) = Π_{k forward} exp(-i·H_k·dt/2) · Π_{k backward} exp(-i·H_k·dt/2)
//! ```
//!
//! where the forward sweep visits the parts of a [`LocalHamiltonian`] in order
//! and the backward sweep visits them in reverse. Each factor becomes one
//! unitary gate on the term's own qubits.
//!
//! The step is second-order only when the placements within each part commute.
//! Overlapping placements in one part, like the wrap-around bond of an odd
//! ring from [`from_uniform_term`], reduce it to first order.
//!
//! A [`TrotterStep`] records which gates every term produced, so a new time
//! step only recomputes one exponential per distinct term and pushes it into
//! the existing gates. The circuit topology never changes after [`build`].
//!
//! [`LocalHamiltonian`]: crate::local::LocalHamiltonian
//! [`build`]: TrotterStep::build
//! [`from_uniform_term`]: crate::local::LocalHamiltonian::from_uniform_term

use tracing::debug;

use qtrot_ir::{Circuit, Gate, GateId, QubitId};

use crate::dense::DenseHamiltonian;
use crate::error::{SimError, SimResult};
use crate::local::{Part, TermId};

/// A built Trotter step circuit and the gate placements of every term.
#[derive(Debug, Clone)]
pub struct TrotterStep {
    dt: f64,
    circuit: Circuit,
    /// Gate handles generated by each term, indexed by [`TermId`].
    term_gates: Vec<Vec<GateId>>,
}

impl TrotterStep {
    /// Emit the gate sequence of one symmetric step of length `dt`.
    pub(crate) fn build(
        nqubits: usize,
        terms: &mut [DenseHamiltonian],
        parts: &[Part],
        dt: f64,
    ) -> SimResult<Self> {
        let width = u32::try_from(nqubits).map_err(|_| SimError::InvalidQubitCount(nqubits))?;
        let mut circuit = Circuit::with_size("trotter_step", width);
        let mut term_gates = vec![Vec::new(); terms.len()];

        for part in parts.iter().chain(parts.iter().rev()) {
            for (targets, id) in part.placements() {
                let unitary = terms[id.0].exponential(dt / 2.0)?.clone();
                let gate = Gate::unitary(unitary)?.with_label(format!("exp({id})"));
                let qubits = targets.iter().map(|&q| QubitId::from(q));
                term_gates[id.0].push(circuit.add(gate, qubits)?);
            }
        }

        debug!(
            dt,
            gates = circuit.len(),
            depth = circuit.depth(),
            "built Trotter step circuit"
        );
        Ok(Self {
            dt,
            circuit,
            term_gates,
        })
    }

    /// Move the step to a new `dt` by replacing gate matrices in place.
    ///
    /// Each distinct term is exponentiated once, however many gates it owns.
    /// A call with the current `dt` does nothing.
    pub(crate) fn reparameterize(
        &mut self,
        terms: &mut [DenseHamiltonian],
        dt: f64,
    ) -> SimResult<()> {
        if self.dt == dt {
            return Ok(());
        }
        let mut updates = Vec::with_capacity(self.circuit.len());
        for (term, gates) in terms.iter_mut().zip(&self.term_gates) {
            if gates.is_empty() {
                continue;
            }
            let unitary = term.exponential(dt / 2.0)?;
            updates.extend(gates.iter().map(|&gate| (gate, unitary.clone())));
        }
        self.circuit.set_parameters(updates)?;
        debug!(from = self.dt, to = dt, gates = self.circuit.len(), "reparameterized Trotter step");
        self.dt = dt;
        Ok(())
    }

    /// Time step the gate matrices currently implement.
    pub fn dt(&self) -> f64 {
        self.dt
    }

    /// The step circuit.
    pub fn circuit(&self) -> &Circuit {
        &self.circuit
    }

    /// Gates generated by `term`, in circuit order.
    pub fn gates_for(&self, term: TermId) -> Option<&[GateId]> {
        self.term_gates.get(term.0).map(Vec::as_slice)
    }
}
