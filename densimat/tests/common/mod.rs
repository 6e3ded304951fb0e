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

#![allow(dead_code)]

use densimat::ellpack::EllpackMatrix;
use densimat::Real;
use nalgebra as na;
use rand::Rng;

/// Builds the dense mirror of an ELLPACK-R matrix for verification.
pub fn create_na_matrix_from_ellpack(matrix: &EllpackMatrix) -> na::DMatrix<Real> {
    let n = matrix.order();
    let mut dense = na::DMatrix::<Real>::zeros(n, n);
    for i in 0..n {
        for (j, v) in matrix.row_entries(i) {
            dense[(i, j)] = v;
        }
    }
    dense
}

/// Builds an ELLPACK-R matrix from a dense one, storing all non-zeroes and the diagonal.
pub fn ellpack_from_dense(dense: &na::DMatrix<Real>, row_capacity: usize) -> EllpackMatrix {
    let n = dense.nrows();
    let mut matrix = EllpackMatrix::zero(n, row_capacity).unwrap();
    for i in 0..n {
        for j in 0..n {
            let v = dense[(i, j)];
            if v != 0.0 || i == j {
                matrix.insert(i, j, v).unwrap();
            }
        }
    }
    matrix
}

/// Builds a diagonal Hamiltonian from the given eigenvalues.
pub fn diagonal_hamiltonian(values: &[Real]) -> EllpackMatrix {
    let n = values.len();
    let mut matrix = EllpackMatrix::zero(n, n).unwrap();
    for (i, &v) in values.iter().enumerate() {
        matrix.insert(i, i, v).unwrap();
    }
    matrix
}

/// Builds a random dense symmetric matrix with entries in [-1, 1].
pub fn random_symmetric_dense(n: usize, rng: &mut impl Rng) -> na::DMatrix<Real> {
    let mut dense = na::DMatrix::<Real>::zeros(n, n);
    for i in 0..n {
        for j in 0..=i {
            let v: Real = rng.random_range(-1.0..1.0);
            dense[(i, j)] = v;
            dense[(j, i)] = v;
        }
    }
    dense
}

/// Checks the structural invariants every primitive output must satisfy.
pub fn assert_structural_invariants(matrix: &EllpackMatrix, eps: Real) {
    let n = matrix.order();
    for i in 0..n {
        let (cols, vals) = matrix.row(i);
        assert!(
            cols.len() <= matrix.row_capacity(),
            "row {i} exceeds the per-row capacity"
        );
        let mut seen = vec![false; n];
        let mut has_diagonal = false;
        for (&c, &v) in cols.iter().zip(vals.iter()) {
            assert!(c < n, "row {i} stores the out-of-range column {c}");
            assert!(!seen[c], "row {i} stores the column {c} twice");
            seen[c] = true;
            if c == i {
                has_diagonal = true;
            } else {
                assert!(
                    v.abs() > eps,
                    "row {i} keeps the off-diagonal ({i}, {c}) = {v} below the drop threshold"
                );
            }
        }
        assert!(has_diagonal, "row {i} has no stored diagonal entry");
    }
}

/// Asserts that two dense matrices agree entrywise within `tol`.
pub fn assert_dense_close(a: &na::DMatrix<Real>, b: &na::DMatrix<Real>, tol: Real) {
    assert_eq!(a.nrows(), b.nrows());
    for i in 0..a.nrows() {
        for j in 0..a.ncols() {
            assert!(
                (a[(i, j)] - b[(i, j)]).abs() <= tol,
                "entry ({i}, {j}) differs: {} vs {}",
                a[(i, j)],
                b[(i, j)]
            );
        }
    }
}
