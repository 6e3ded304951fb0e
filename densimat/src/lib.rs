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

//! densimat - sparse density-matrix construction for quantum molecular dynamics.
//!
//! densimat computes the single-particle density matrix ρ that projects onto the
//! occupied subspace of a real symmetric Hamiltonian H, as needed by density
//! functional tight-binding calculations of non-metallic material systems.
//! All solvers are built from generalized sparse matrix-matrix operations over a
//! row-compressed ELLPACK-R storage format with a numeric drop threshold.
//!
//! Three solver variants share the same primitives:
//!
//! * [`solver::Algorithm::Basic`] - the zero-temperature second-order spectral
//!   projection recursion (SP2),
//! * [`solver::Algorithm::Fermi`] - a truncated finite-temperature SP2 expansion
//!   with Newton-Raphson refinement of the chemical potential,
//! * [`solver::Algorithm::Implicit`] - an implicit recursive Fermi-operator
//!   expansion solved per level with a matrix conjugate-gradient or
//!   Newton-Schulz linear solver.

use thiserror::Error;

/// The version of densimat.
pub const DENSIMAT_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Real scalar type of all matrix values.
///
/// Single or double precision is a build-time choice: the default is `f64`,
/// enabling the `single-precision` feature switches the whole crate to `f32`.
#[cfg(feature = "single-precision")]
pub type Real = f32;
/// Real scalar type of all matrix values.
///
/// Single or double precision is a build-time choice: the default is `f64`,
/// enabling the `single-precision` feature switches the whole crate to `f32`.
#[cfg(not(feature = "single-precision"))]
pub type Real = f64;

/// Errors that can occur in densimat.
#[derive(Debug, Error)]
pub enum DensimatError {
    /// Error when a row of an ELLPACK-R matrix needs more surviving entries than its capacity.
    #[error("Row {row} needs {needed} entries but the per-row capacity is {capacity}")]
    RowCapacityExceeded {
        /// Row that overflowed.
        row: usize,
        /// Number of entries the row would need to store.
        needed: usize,
        /// Fixed per-row capacity of the matrix.
        capacity: usize,
    },
    /// Error when a dimension parameter is zero or negative at configuration time.
    #[error("Dimension parameter {name} must be positive, got {value}")]
    NonPositiveDimension {
        /// Name of the offending parameter.
        name: &'static str,
        /// Value that was supplied.
        value: isize,
    },
    /// Error when the numeric drop threshold is negative.
    #[error("The drop threshold must be non-negative, got {value}")]
    InvalidThreshold {
        /// Threshold that was supplied.
        value: f64,
    },
    /// Error when a matrix type other than ELLPACK-R is requested.
    #[error("Matrix type {mtype} is not supported, this implementation is ELLPACK-R (2) only")]
    UnsupportedMatrixType {
        /// Requested matrix type selector.
        mtype: usize,
    },
    /// Error when two matrices of incompatible shape are handed to a primitive.
    #[error("Shape mismatch: expected a matrix of order {expected}, got order {found}")]
    ShapeMismatch {
        /// Order expected by the primitive.
        expected: usize,
        /// Order of the operand that was passed.
        found: usize,
    },
    /// Error when an entry is assigned to a (row, column) slot that is already occupied.
    #[error("Entry ({row}, {col}) is already stored and cannot be assigned twice")]
    DuplicateEntry {
        /// Row of the duplicate.
        row: usize,
        /// Column of the duplicate.
        col: usize,
    },
    /// Error when an entry references a row or column outside the matrix.
    #[error("Entry ({row}, {col}) lies outside a matrix of order {order}")]
    IndexOutOfRange {
        /// Row index of the entry.
        row: usize,
        /// Column index of the entry.
        col: usize,
        /// Order of the matrix.
        order: usize,
    },
    /// Error when a Matrix Market file cannot be parsed.
    #[error("Matrix Market parse error on line {line}: {msg}")]
    MatrixMarketParse {
        /// 1-based line number in the input.
        line: usize,
        /// Description of the problem.
        msg: String,
    },
    /// Error when the Gershgorin spectral width of a Hamiltonian is zero.
    #[error("Gershgorin bounds coincide, the spectrum cannot be normalized")]
    SingularSpectrum,
    /// Error when the conjugate-gradient solver exceeds its iteration cap.
    #[error(
        "Conjugate gradient did not converge within {iterations} iterations (residual norm {residual_norm:e})"
    )]
    LinearSolverNotConverged {
        /// Number of iterations that were performed.
        iterations: usize,
        /// Frobenius norm of the final residual.
        residual_norm: f64,
    },
    /// Transparent propagation of I/O errors.
    #[error(transparent)]
    Io(#[from] std::io::Error),
    /// Generic error in densimat.
    #[error("Error occured: {msg}")]
    GenericError {
        /// Error message
        msg: String,
    },
}

pub mod algebra;
pub mod config;
pub mod ellpack;
pub mod generate;
pub mod matrix_market;
pub mod prelude;
pub mod solver;
