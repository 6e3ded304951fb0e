// Copyright © 2021-2023 HQS Quantum Simulations GmbH. All Rights Reserved.
//
// Licensed under the Apache License, Version 2.0 (the "License"); you may not use this file except
// in compliance with the License. You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software distributed under the
// License is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either
// express or implied. See the License for the specific language governing permissions and
// limitations under the License.

//! Module for the SP2 solver drivers.
//!
//! The drivers are sequential loops over the row-parallel primitives of
//! [`crate::algebra`]. All variants consume a Hamiltonian and a validated
//! [`Config`] and produce a [`Solution`] holding the spin-degenerate density
//! matrix ρ together with the convergence diagnostics of the run.

use crate::config::{Config, MatrixKind};
use crate::ellpack::EllpackMatrix;
use crate::matrix_market::read_matrix_market_file;
use crate::{DensimatError, Real};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

mod normalize;
pub use normalize::*;

mod basic;
pub use basic::*;

mod fermi;
pub use fermi::*;

mod implicit;
pub use implicit::*;

/// Hard ceiling on occupation (outer) iterations of the Fermi driver.
pub(crate) const MAX_OCCUPATION_ITER: usize = 100;

/// The solver variant used to build the density matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "json_schema", derive(schemars::JsonSchema))]
pub enum Algorithm {
    /// Zero-temperature second-order spectral projection.
    Basic,
    /// Finite-temperature truncated SP2 Fermi expansion.
    Fermi,
    /// Implicit recursive Fermi-operator expansion.
    Implicit,
}

impl FromStr for Algorithm {
    type Err = DensimatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "basic" => Ok(Algorithm::Basic),
            "fermi" => Ok(Algorithm::Fermi),
            "implicit" => Ok(Algorithm::Implicit),
            _ => Err(DensimatError::GenericError {
                msg: format!("unknown algorithm '{s}', expected basic, fermi or implicit"),
            }),
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Algorithm::Basic => write!(f, "basic"),
            Algorithm::Fermi => write!(f, "fermi"),
            Algorithm::Implicit => write!(f, "implicit"),
        }
    }
}

/// Linear solver used per level of the implicit driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "json_schema", derive(schemars::JsonSchema))]
pub enum ImplicitMethod {
    /// Solve every level directly with the matrix conjugate gradient.
    ConjugateGradient,
    /// Keep a running approximate inverse refined by Newton-Schulz sweeps,
    /// bootstrapped once by a conjugate-gradient solve against the identity.
    NewtonSchulz,
}

impl FromStr for ImplicitMethod {
    type Err = DensimatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "cg" | "conjugate-gradient" => Ok(ImplicitMethod::ConjugateGradient),
            "ns" | "newton-schulz" => Ok(ImplicitMethod::NewtonSchulz),
            _ => Err(DensimatError::GenericError {
                msg: format!("unknown implicit method '{s}', expected cg or newton-schulz"),
            }),
        }
    }
}

impl fmt::Display for ImplicitMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImplicitMethod::ConjugateGradient => write!(f, "cg"),
            ImplicitMethod::NewtonSchulz => write!(f, "newton-schulz"),
        }
    }
}

/// How a driver loop terminated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "json_schema", derive(schemars::JsonSchema))]
pub enum Outcome {
    /// The convergence criterion of the algorithm fired.
    Converged,
    /// The iteration ceiling was reached; the returned ρ is the best effort.
    IterationLimit,
}

/// Result of a density-matrix build.
#[derive(Debug, Clone)]
pub struct Solution {
    /// The density matrix, scaled by 2 for spin degeneracy.
    pub rho: EllpackMatrix,
    /// Total number of driver iterations.
    pub iterations: usize,
    /// Trace of the projector before the spin doubling.
    pub occupation: Real,
    /// Final chemical potential estimate.
    pub mu: Real,
    /// Inverse temperature estimate; −1000 marks a degenerate residual.
    pub beta: Real,
    /// Per-step branch signs of the Fermi recursion, empty for other drivers.
    pub sign_list: Vec<i8>,
    /// Termination classification.
    pub outcome: Outcome,
}

/// Reads or generates the Hamiltonian described by a configuration.
///
/// A configured input file wins; otherwise a synthetic banded Hamiltonian of
/// the configured shape is generated. In both cases the per-row capacity is the
/// adjusted one.
///
/// # Arguments
///
/// * `config` - The validated configuration.
///
/// # Returns
///
/// * `Ok(EllpackMatrix)` - The Hamiltonian.
/// * `Err(DensimatError)` - Validation, parse or generation failure.
pub fn initialize_hamiltonian(config: &Config) -> Result<EllpackMatrix, DensimatError> {
    config.validate()?;
    if config.matrix_kind != MatrixKind::Ellpack {
        return Err(DensimatError::UnsupportedMatrixType { mtype: 1 });
    }
    let capacity = config.adjusted_row_capacity();
    match (&config.hmat_path, config.generate) {
        (Some(path), false) => read_matrix_market_file(path, Some(capacity)),
        _ => EllpackMatrix::banded(config.n, capacity, config.amp, config.alpha, config.eps),
    }
}

/// Builds the density matrix of a Hamiltonian with the configured solver variant.
///
/// # Arguments
///
/// * `h` - The Hamiltonian matrix.
/// * `config` - The solver configuration; validated before dispatch.
///
/// # Returns
///
/// * `Ok(Solution)` - The density matrix and run diagnostics.
/// * `Err(DensimatError)` - Invalid parameters, capacity overflow or an
///   unconverged linear solver.
pub fn build_density_matrix(
    h: &EllpackMatrix,
    config: &Config,
) -> Result<Solution, DensimatError> {
    config.validate()?;
    match config.algorithm {
        Algorithm::Basic => sp2_basic(h, config),
        Algorithm::Fermi => sp2_fermi(h, config),
        Algorithm::Implicit => implicit_fermi(h, config),
    }
}
