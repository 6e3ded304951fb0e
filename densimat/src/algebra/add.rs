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

/// Computes the thresholded weighted sum `A ← α·A + β·B` in place.
///
/// Row i of A and row i of B are merged through the per-thread accumulator and
/// compacted with the drop rule; the structure of A changes where entries
/// cancel below ε or fill in from B. Aliasing `a` and `b` is forbidden, which
/// the borrow rules enforce.
///
/// # Arguments
///
/// * `a` - Matrix that is updated.
/// * `b` - Matrix that is added.
/// * `alpha` - Scale of `a`.
/// * `beta` - Scale of `b`.
/// * `eps` - The numeric drop threshold.
///
/// # Returns
///
/// * `Ok(())` - The sum was stored in `a`.
/// * `Err(DensimatError::ShapeMismatch)` - The operands have different order.
/// * `Err(DensimatError::RowCapacityExceeded)` - A result row overflowed.
pub fn add(
    a: &mut EllpackMatrix,
    b: &EllpackMatrix,
    alpha: Real,
    beta: Real,
    eps: Real,
) -> Result<(), DensimatError> {
    if a.order() != b.order() {
        return Err(DensimatError::ShapeMismatch {
            expected: a.order(),
            found: b.order(),
        });
    }
    let order = a.order();
    a.par_rows_mut().try_for_each_init(
        || RowWorkspace::new(order),
        |workspace, (i, row)| {
            workspace.start_row(i);
            let stored = *row.nnz;
            for idx in 0..stored {
                workspace.accumulate(row.cols[idx], alpha * row.vals[idx]);
            }
            let (b_cols, b_vals) = b.row(i);
            for (&j, &v) in b_cols.iter().zip(b_vals.iter()) {
                workspace.accumulate(j, beta * v);
            }
            workspace.compact_into(i, eps, row)
        },
    )
}

/// Computes `A ← α·A + β·I` in place.
///
/// The diagonal entry of every row is written unconditionally, even when β is
/// zero; scaled off-diagonal entries falling to magnitude ≤ ε are dropped.
///
/// # Arguments
///
/// * `a` - Matrix that is updated.
/// * `alpha` - Scale of `a`.
/// * `beta` - Shift added to the diagonal.
/// * `eps` - The numeric drop threshold.
///
/// # Returns
///
/// * `Ok(())` - The matrix was updated.
/// * `Err(DensimatError::RowCapacityExceeded)` - A full row had no stored
///   diagonal to absorb the shift.
pub fn scale_add_identity(
    a: &mut EllpackMatrix,
    alpha: Real,
    beta: Real,
    eps: Real,
) -> Result<(), DensimatError> {
    a.par_rows_mut().try_for_each(|(i, row)| {
        let mut stored = *row.nnz;
        if stored == 0 {
            row.cols[0] = i;
            row.vals[0] = beta;
            *row.nnz = 1;
            return Ok(());
        }
        if row.cols[0] != i {
            // Restore the diagonal-first convention for hand-assembled rows.
            match row.cols[..stored].iter().position(|&c| c == i) {
                Some(p) => {
                    row.cols.swap(0, p);
                    row.vals.swap(0, p);
                }
                None => {
                    if stored == row.cols.len() {
                        return Err(DensimatError::RowCapacityExceeded {
                            row: i,
                            needed: stored + 1,
                            capacity: row.cols.len(),
                        });
                    }
                    row.cols[stored] = i;
                    row.vals[stored] = 0.0;
                    row.cols.swap(0, stored);
                    row.vals.swap(0, stored);
                    stored += 1;
                }
            }
        }
        row.vals[0] = alpha * row.vals[0] + beta;
        let mut kept = 1;
        for idx in 1..stored {
            let v = alpha * row.vals[idx];
            if v.abs() > eps {
                row.cols[kept] = row.cols[idx];
                row.vals[kept] = v;
                kept += 1;
            }
        }
        *row.nnz = kept;
        Ok(())
    })
}

/// Multiplies every stored value of `a` by `gamma` in place. No entries are pruned.
///
/// # Arguments
///
/// * `a` - Matrix that is scaled.
/// * `gamma` - Scale factor.
pub fn scale_inplace(a: &mut EllpackMatrix, gamma: Real) {
    a.par_rows_mut().for_each(|(_, row)| {
        let stored = *row.nnz;
        for v in &mut row.vals[..stored] {
            *v *= gamma;
        }
    });
}
