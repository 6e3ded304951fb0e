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

use crate::ellpack::RowMut;
use crate::{DensimatError, Real};

/// Reusable per-thread scratch for assembling one sparse output row at a time.
///
/// The workspace holds a dense accumulator of length N and an integer stamp
/// vector of the same length. A column is considered touched for the current
/// row when its stamp equals `row + 1`; stale stamps from earlier rows never
/// collide with the current one, so neither vector is cleared between rows.
/// This is what keeps the symmetric square linear in the output row size.
///
/// A workspace is private to the thread that owns it and must never be shared
/// between rows being assembled concurrently.
#[derive(Debug, Clone)]
pub struct RowWorkspace {
    accumulator: Vec<Real>,
    stamps: Vec<usize>,
    touched: Vec<usize>,
    stamp: usize,
}

impl RowWorkspace {
    /// Creates a workspace for matrices of order `order`.
    pub fn new(order: usize) -> Self {
        Self {
            accumulator: vec![0.0; order],
            stamps: vec![0; order],
            touched: Vec::with_capacity(64),
            stamp: 0,
        }
    }

    /// Begins accumulation of output row `row`.
    pub fn start_row(&mut self, row: usize) {
        self.stamp = row + 1;
        self.touched.clear();
    }

    /// Adds `term` to the accumulator slot of column `col`.
    ///
    /// The first touch of a column in the current row resets its slot, so stale
    /// values from earlier rows are never observed.
    #[inline]
    pub fn accumulate(&mut self, col: usize, term: Real) {
        if self.stamps[col] != self.stamp {
            self.stamps[col] = self.stamp;
            self.accumulator[col] = 0.0;
            self.touched.push(col);
        }
        self.accumulator[col] += term;
    }

    /// Returns the accumulated value of column `col` for the current row.
    #[inline]
    pub fn value(&self, col: usize) -> Real {
        if self.stamps[col] == self.stamp {
            self.accumulator[col]
        } else {
            0.0
        }
    }

    /// Compacts the accumulated row into `out`, applying the drop rule.
    ///
    /// Off-diagonal entries with magnitude ≤ `eps` are discarded; the diagonal
    /// entry is written to slot 0 unconditionally, even when it was never
    /// touched.
    ///
    /// # Arguments
    ///
    /// * `row` - The output row index, which also selects the diagonal column.
    /// * `eps` - The numeric drop threshold.
    /// * `out` - Exclusive view of the output row.
    ///
    /// # Returns
    ///
    /// * `Ok(())` - The row was written.
    /// * `Err(DensimatError::RowCapacityExceeded)` - More entries survive the
    ///   drop rule than the row can hold.
    pub fn compact_into(
        &self,
        row: usize,
        eps: Real,
        out: RowMut<'_>,
    ) -> Result<(), DensimatError> {
        let capacity = out.cols.len();
        let mut needed = 1;
        for &c in &self.touched {
            if c != row && self.accumulator[c].abs() > eps {
                needed += 1;
            }
        }
        if needed > capacity {
            return Err(DensimatError::RowCapacityExceeded {
                row,
                needed,
                capacity,
            });
        }

        out.cols[0] = row;
        out.vals[0] = self.value(row);
        let mut stored = 1;
        for &c in &self.touched {
            if c == row {
                continue;
            }
            let v = self.accumulator[c];
            if v.abs() > eps {
                out.cols[stored] = c;
                out.vals[stored] = v;
                stored += 1;
            }
        }
        *out.nnz = stored;
        Ok(())
    }
}
