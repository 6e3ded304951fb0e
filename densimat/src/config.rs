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

//! Module for the solver configuration value.
//!
//! A [`Config`] bundles every parameter the frontends can set and is threaded
//! explicitly through all driver calls. [`Config::validate`] is the single
//! fatal gate for invalid parameters; everything downstream may assume a
//! validated configuration.

use crate::ellpack::adjust_row_capacity;
use crate::solver::{Algorithm, ImplicitMethod};
use crate::{DensimatError, Real};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Storage layout selector of the Hamiltonian matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "json_schema", derive(schemars::JsonSchema))]
pub enum MatrixKind {
    /// Dense storage. Accepted on the command line for compatibility but not
    /// supported by this ELLPACK-R implementation.
    Dense,
    /// Row-compressed ELLPACK-R storage.
    Ellpack,
}

impl MatrixKind {
    /// Maps the numeric command-line selector (1 dense, 2 ellpack) to a kind.
    ///
    /// # Arguments
    ///
    /// * `mtype` - The numeric selector.
    ///
    /// # Returns
    ///
    /// * `Ok(MatrixKind)` - The corresponding kind.
    /// * `Err(DensimatError::UnsupportedMatrixType)` - Unknown selector.
    pub fn from_selector(mtype: usize) -> Result<Self, DensimatError> {
        match mtype {
            1 => Ok(MatrixKind::Dense),
            2 => Ok(MatrixKind::Ellpack),
            _ => Err(DensimatError::UnsupportedMatrixType { mtype }),
        }
    }
}

/// All parameters of a density-matrix build.
///
/// # Example
///
/// ```
/// use densimat::config::Config;
///
/// let mut config = Config::default();
/// config.n = 1024;
/// config.m = 256;
/// config.validate().unwrap();
/// assert_eq!(config.occupation(), 512.0);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "json_schema", derive(schemars::JsonSchema))]
#[serde(default)]
pub struct Config {
    /// Order N of the Hamiltonian.
    pub n: usize,
    /// Requested per-row capacity M; 0 means one full row. The allocated
    /// capacity is [`Config::adjusted_row_capacity`].
    pub m: usize,
    /// Storage layout of the Hamiltonian.
    pub matrix_kind: MatrixKind,
    /// Solver variant to run.
    pub algorithm: Algorithm,
    /// Linear-solver choice of the implicit driver.
    pub implicit_method: ImplicitMethod,
    /// Minimum SP2 iterations before the error-history rule may terminate.
    pub min_iter: usize,
    /// Maximum SP2 iterations.
    pub max_iter: usize,
    /// Recursion depth of the Fermi and implicit expansions.
    pub n_steps: usize,
    /// Fixed number of occupation (outer) iterations of the Fermi main loop;
    /// 0 iterates until the occupation error falls below `occ_limit`.
    pub occupation_steps: usize,
    /// Target number of occupied states; 0 or less derives it from `band_fill`.
    pub n_occ: Real,
    /// Band filling fraction used when `n_occ` is not given.
    pub band_fill: Real,
    /// Inverse temperature 1/kT of the implicit driver.
    pub beta: Real,
    /// Initial chemical potential of the implicit driver.
    pub mu: Real,
    /// Scale applied to the Gershgorin bounds of the Fermi driver.
    pub t_scale: Real,
    /// Numeric drop threshold ε of the sparse primitives.
    pub eps: Real,
    /// Idempotency tolerance τ of the basic SP2 branch rule.
    pub idem_tol: Real,
    /// Occupation error limit of the Fermi driver.
    pub occ_limit: Real,
    /// Limit below which response traces are treated as degenerate.
    pub trace_limit: Real,
    /// Residual tolerance of the matrix conjugate-gradient solver.
    pub cg_tol: Real,
    /// Amplitude of the synthetic band generator.
    pub amp: Real,
    /// Decay rate of the synthetic band generator.
    pub alpha: Real,
    /// Hamiltonian input file in Matrix Market format.
    pub hmat_path: Option<PathBuf>,
    /// Generate a synthetic Hamiltonian instead of reading one.
    pub generate: bool,
    /// Write the density matrix after the solve.
    pub write_density: bool,
    /// Emit per-iteration diagnostics.
    pub debug: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            n: 1600,
            m: 1600,
            matrix_kind: MatrixKind::Ellpack,
            algorithm: Algorithm::Basic,
            implicit_method: ImplicitMethod::ConjugateGradient,
            min_iter: 25,
            max_iter: 100,
            n_steps: 18,
            occupation_steps: 0,
            n_occ: 0.0,
            band_fill: 0.5,
            beta: 0.0,
            mu: 0.0,
            t_scale: 1.0,
            eps: 1.0e-5,
            idem_tol: 1.0e-14,
            occ_limit: 1.0e-9,
            trace_limit: 1.0e-12,
            cg_tol: 1.0e-12,
            amp: 1.0,
            alpha: 1.0,
            hmat_path: None,
            generate: false,
            write_density: false,
            debug: false,
        }
    }
}

impl Config {
    /// Checks the configuration for fatal parameter errors.
    ///
    /// # Returns
    ///
    /// * `Ok(())` - The configuration is usable.
    /// * `Err(DensimatError::NonPositiveDimension)` - N is zero.
    /// * `Err(DensimatError::InvalidThreshold)` - A threshold is negative.
    /// * `Err(DensimatError::UnsupportedMatrixType)` - Dense storage requested.
    pub fn validate(&self) -> Result<(), DensimatError> {
        if self.n == 0 {
            return Err(DensimatError::NonPositiveDimension {
                name: "N",
                value: 0,
            });
        }
        if self.matrix_kind == MatrixKind::Dense {
            return Err(DensimatError::UnsupportedMatrixType { mtype: 1 });
        }
        for threshold in [self.eps, self.idem_tol, self.occ_limit, self.trace_limit] {
            if threshold < 0.0 {
                return Err(DensimatError::InvalidThreshold {
                    value: threshold as f64,
                });
            }
        }
        Ok(())
    }

    /// Returns the per-row capacity after the standard adjustment.
    pub fn adjusted_row_capacity(&self) -> usize {
        adjust_row_capacity(self.n, self.m)
    }

    /// Returns the target number of occupied states.
    ///
    /// An explicit `n_occ` wins; otherwise the band filling fraction of the
    /// matrix order is used.
    pub fn occupation(&self) -> Real {
        if self.n_occ > 0.0 {
            self.n_occ
        } else {
            self.band_fill * self.n as Real
        }
    }
}
