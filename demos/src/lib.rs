//! qtrot Demo Suite
//!
//! Runnable demonstrations of the `qtrot-sim` Trotter engine:
//!
//! - **TFIM evolution**: a periodic transverse-field Ising ring evolved with
//!   the second-order Trotter circuit and checked against exact evolution
//!
//! ```rust
//! use qtrot_demos::{TfimConfig, TfimRunner};
//!
//! let config = TfimConfig { nqubits: 4, total_time: 0.2, ..TfimConfig::default() };
//! let result = TfimRunner::new(config).run().unwrap();
//! assert!(result.fidelity > 0.999);
//! ```

pub mod config;
pub mod runner;

pub use config::TfimConfig;
pub use runner::{TfimResult, TfimRunner};

/// Print a demo section.
pub fn print_section(title: &str) {
    println!();
    println!("▶ {title}");
    println!("{}", "─".repeat(40));
}

/// Print a result line.
pub fn print_result(label: &str, value: impl std::fmt::Display) {
    println!("  {label}: {value}");
}
