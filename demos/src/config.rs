//! Run configuration for the TFIM demo.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use qtrot_sim::DType;

/// Parameters of one transverse-field Ising evolution.
///
/// Missing fields in a config file fall back to [`TfimConfig::default`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TfimConfig {
    /// Ring size.
    pub nqubits: usize,
    /// Transverse field strength.
    pub field: f64,
    /// Trotter step length.
    pub dt: f64,
    /// Evolution time.
    pub total_time: f64,
    /// Element type of the Hamiltonian matrices.
    pub precision: DType,
}

impl Default for TfimConfig {
    fn default() -> Self {
        Self {
            nqubits: 6,
            field: 1.0,
            dt: 0.05,
            total_time: 1.0,
            precision: DType::Complex128,
        }
    }
}

impl TfimConfig {
    /// Parse a JSON configuration.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("invalid TFIM configuration")
    }

    /// Read a JSON configuration file.
    pub fn load(path: &Path) -> Result<Self> {
        let json = fs::read_to_string(path)
            .with_context(|| format!("cannot read config file {}", path.display()))?;
        Self::from_json(&json)
    }
}
