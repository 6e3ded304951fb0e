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

use crate::ellpack::{EllpackMatrix, RowWorkspace};
use crate::{DensimatError, Real};
use rayon::prelude::*;

fn check_same_order(a: &EllpackMatrix, b: &EllpackMatrix) -> Result<(), DensimatError> {
    if a.order() != b.order() {
        return Err(DensimatError::ShapeMismatch {
            expected: a.order(),
            found: b.order(),
        });
    }
    Ok(())
}

/// Computes the thresholded symmetric square `out = X·X` together with tr(X) and tr(X²).
///
/// Every output row i accumulates the sparse vector w\[k\] = Σ_j X\[i\]\[j\]·X\[j\]\[k\]
/// in a per-thread [`RowWorkspace`] using the row-stamp discipline, then
/// compacts the survivors of the drop rule back into `out`. The two traces fall
/// out of the same sweep: tr(X) from the stored diagonal of X, tr(X²) from the
/// accumulated diagonal of the square before any dropping.
///
/// # Arguments
///
/// * `x` - The matrix to square.
/// * `out` - The output matrix, overwritten row by row. Must not alias `x`.
/// * `eps` - The numeric drop threshold.
///
/// # Returns
///
/// * `Ok((tr_x, tr_x2))` - The traces of X and X².
/// * `Err(DensimatError::ShapeMismatch)` - The operands have different order.
/// * `Err(DensimatError::RowCapacityExceeded)` - An output row overflowed.
pub fn multiply_x2(
    x: &EllpackMatrix,
    out: &mut EllpackMatrix,
    eps: Real,
) -> Result<(Real, Real), DensimatError> {
    check_same_order(x, out)?;
    let order = x.order();
    // Per-row trace contributions are collected and summed in row order, so the
    // result does not depend on how rayon partitions the rows.
    let mut partials = vec![(0.0, 0.0); order];
    out.par_rows_mut()
        .zip_eq(partials.par_iter_mut())
        .try_for_each_init(
            || RowWorkspace::new(order),
            |workspace, ((i, row), partial)| -> Result<(), DensimatError> {
                workspace.start_row(i);
                let (x_cols, x_vals) = x.row(i);
                let mut trace_x = 0.0;
                for (&j, &a) in x_cols.iter().zip(x_vals.iter()) {
                    if j == i {
                        trace_x += a;
                    }
                    let (y_cols, y_vals) = x.row(j);
                    for (&k, &b) in y_cols.iter().zip(y_vals.iter()) {
                        workspace.accumulate(k, a * b);
                    }
                }
                *partial = (trace_x, workspace.value(i));
                workspace.compact_into(i, eps, row)
            },
        )?;
    Ok(partials
        .iter()
        .fold((0.0, 0.0), |acc, p| (acc.0 + p.0, acc.1 + p.1)))
}

/// Computes the thresholded generalized product `C ← α·A·B + β·C`.
///
/// Same sparse-accumulator discipline as [`multiply_x2`]: the β·C contribution
/// of row i is deposited first, then the α·A·B terms, and the row is compacted
/// with the drop rule. `C` must not alias `A` or `B`.
///
/// # Arguments
///
/// * `a` - Left factor.
/// * `b` - Right factor.
/// * `c` - Accumulated output.
/// * `alpha` - Scale of the product.
/// * `beta` - Scale of the previous content of `c`.
/// * `eps` - The numeric drop threshold.
///
/// # Returns
///
/// * `Ok(())` - The product was accumulated.
/// * `Err(DensimatError::ShapeMismatch)` - The operands have different order.
/// * `Err(DensimatError::RowCapacityExceeded)` - An output row overflowed.
pub fn multiply(
    a: &EllpackMatrix,
    b: &EllpackMatrix,
    c: &mut EllpackMatrix,
    alpha: Real,
    beta: Real,
    eps: Real,
) -> Result<(), DensimatError> {
    check_same_order(a, b)?;
    check_same_order(a, c)?;
    let order = a.order();
    c.par_rows_mut().try_for_each_init(
        || RowWorkspace::new(order),
        |workspace, (i, row)| {
            workspace.start_row(i);
            if beta != 0.0 {
                let stored = *row.nnz;
                for idx in 0..stored {
                    workspace.accumulate(row.cols[idx], beta * row.vals[idx]);
                }
            }
            let (a_cols, a_vals) = a.row(i);
            for (&j, &av) in a_cols.iter().zip(a_vals.iter()) {
                let coeff = alpha * av;
                let (b_cols, b_vals) = b.row(j);
                for (&k, &bv) in b_cols.iter().zip(b_vals.iter()) {
                    workspace.accumulate(k, coeff * bv);
                }
            }
            workspace.compact_into(i, eps, row)
        },
    )
}
