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

use crate::ellpack::EllpackMatrix;
use crate::{DensimatError, Real};
use rayon::prelude::*;

/// Computes the Gershgorin eigenvalue bounds of a matrix.
///
/// Per row i, with d the diagonal value and r the sum of off-diagonal
/// magnitudes, every eigenvalue of A lies in the union of the intervals
/// \[d − r, d + r\]; the returned pair encloses that union.
///
/// # Arguments
///
/// * `a` - The matrix to bound.
///
/// # Returns
///
/// * `(e_min, e_max)` - Lower and upper eigenvalue bound.
pub fn gershgorin(a: &EllpackMatrix) -> (Real, Real) {
    a.par_row_indices()
        .map(|i| {
            let (cols, vals) = a.row(i);
            let mut diag = 0.0;
            let mut radius = 0.0;
            for (&c, &v) in cols.iter().zip(vals.iter()) {
                if c == i {
                    diag = v;
                } else {
                    radius += v.abs();
                }
            }
            (diag - radius, diag + radius)
        })
        .reduce(
            || (Real::INFINITY, Real::NEG_INFINITY),
            |acc, row| (acc.0.min(row.0), acc.1.max(row.1)),
        )
}

/// Computes tr(A·B) without materializing the product.
///
/// # Arguments
///
/// * `a` - Left factor.
/// * `b` - Right factor.
///
/// # Returns
///
/// * `Ok(Real)` - The trace Σ_i Σ_j A\[i\]\[j\]·B\[j\]\[i\].
/// * `Err(DensimatError::ShapeMismatch)` - The operands have different order.
pub fn trace_mult(a: &EllpackMatrix, b: &EllpackMatrix) -> Result<Real, DensimatError> {
    if a.order() != b.order() {
        return Err(DensimatError::ShapeMismatch {
            expected: a.order(),
            found: b.order(),
        });
    }
    let mut partials = vec![0.0; a.order()];
    partials.par_iter_mut().enumerate().for_each(|(i, slot)| {
        let (cols, vals) = a.row(i);
        *slot = cols
            .iter()
            .zip(vals.iter())
            .map(|(&j, &v)| v * b.get(j, i))
            .sum::<Real>();
    });
    Ok(partials.iter().sum())
}

/// Computes the Frobenius norm squared, the sum of all squared stored values.
///
/// # Arguments
///
/// * `a` - The matrix to measure.
///
/// # Returns
///
/// * `Real` - The sum of squares.
pub fn sum_squares(a: &EllpackMatrix) -> Real {
    let mut partials = vec![0.0; a.order()];
    partials.par_iter_mut().enumerate().for_each(|(i, slot)| {
        let (_, vals) = a.row(i);
        *slot = vals.iter().map(|&v| v * v).sum::<Real>();
    });
    partials.iter().sum()
}
