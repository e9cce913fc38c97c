//! Time evolution of states under a local Hamiltonian.

use ndarray::Array1;
use num_complex::Complex64;
use tracing::{debug, info};

use crate::dense::DenseHamiltonian;
use crate::error::{SimError, SimResult};
use crate::local::LocalHamiltonian;
use crate::statevector::Statevector;

/// Repeated Trotter steps of a fixed length.
#[derive(Debug, Clone)]
pub struct StateEvolution {
    /// Hamiltonian generating the evolution.
    pub hamiltonian: LocalHamiltonian,
    /// Length of one Trotter step.
    pub dt: f64,
}

impl StateEvolution {
    /// Create an evolution with step `dt`.
    pub fn new(hamiltonian: LocalHamiltonian, dt: f64) -> SimResult<Self> {
        validate_dt(dt)?;
        Ok(Self { hamiltonian, dt })
    }

    /// Number of steps covering `total_time`, rounded to the nearest integer.
    pub fn n_steps(&self, total_time: f64) -> SimResult<usize> {
        validate_dt(self.dt)?;
        let steps = (total_time / self.dt).round();
        if !steps.is_finite() || steps < 1.0 {
            return Err(SimError::InvalidSteps(0));
        }
        Ok(steps as usize)
    }

    /// Evolve `state` to `total_time` with [`n_steps`](Self::n_steps) Trotter steps.
    pub fn evolve(&mut self, state: &Statevector, total_time: f64) -> SimResult<Statevector> {
        let n_steps = self.n_steps(total_time)?;
        info!(
            nqubits = self.hamiltonian.nqubits(),
            dt = self.dt,
            n_steps,
            "starting Trotter evolution"
        );
        let circuit = self.hamiltonian.trotter_circuit(self.dt)?;
        let mut evolved = state.clone();
        for step in 0..n_steps {
            evolved.apply_circuit(circuit)?;
            debug!(step, norm = evolved.norm(), "applied Trotter step");
        }
        Ok(evolved)
    }
}

/// Apply `exp(-i·H·t)` exactly.
pub fn exact_evolve(
    hamiltonian: &mut DenseHamiltonian,
    state: &Statevector,
    t: f64,
) -> SimResult<Statevector> {
    if state.amplitudes().len() != hamiltonian.dim() {
        return Err(SimError::DimensionMismatch {
            expected: hamiltonian.dim(),
            got: state.amplitudes().len(),
        });
    }
    let propagator = hamiltonian.exponential(t)?;
    let amplitudes: Array1<Complex64> = propagator.dot(state.amplitudes());
    Statevector::from_amplitudes(amplitudes)
}

fn validate_dt(dt: f64) -> SimResult<()> {
    if !dt.is_finite() || dt <= 0.0 {
        return Err(SimError::InvalidTimeStep(dt));
    }
    Ok(())
}
