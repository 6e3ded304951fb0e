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

use crate::{DensimatError, Real};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops;

/// Round a requested per-row capacity up to a multiple of 32 and cap it at the matrix order.
///
/// A request of 0 is interpreted as "one full row". This is the adjustment every
/// frontend applies before allocating Hamiltonian and density matrices.
///
/// # Arguments
///
/// * `order` - The order N of the matrix.
/// * `row_capacity` - The requested number of non-zeroes per row, 0 for N.
///
/// # Returns
///
/// * `usize` - The adjusted per-row capacity M with M ≤ N.
pub fn adjust_row_capacity(order: usize, row_capacity: usize) -> usize {
    let mut m = if row_capacity == 0 { order } else { row_capacity };
    if m % 32 > 0 {
        m += 32 - m % 32;
    }
    m.min(order)
}

/// Exclusive view of a single row of an [`EllpackMatrix`].
///
/// The column and value slices have the full per-row capacity M; only the first
/// `*nnz` slots hold stored entries. Rows handed out by
/// [`EllpackMatrix::par_rows_mut`] are disjoint, so primitives can fill them
/// from different threads without synchronization.
#[derive(Debug)]
pub struct RowMut<'a> {
    /// Occupancy count of the row.
    pub nnz: &'a mut usize,
    /// Column indices, capacity M.
    pub cols: &'a mut [usize],
    /// Stored values, capacity M.
    pub vals: &'a mut [Real],
}

/// Square sparse matrix in row-compressed ELLPACK-R storage.
///
/// For every row the matrix keeps an occupancy count `nnz[i]`, up to M column
/// indices and up to M values. Column and value buffers are contiguous with row
/// i occupying the index range `[i·M, i·M + M)`. Stored columns within a row are
/// unordered except that the diagonal entry, when present, sits in slot 0.
///
/// # Example
///
/// ```
/// use densimat::ellpack::EllpackMatrix;
///
/// let mut h = EllpackMatrix::zero(2, 2).unwrap();
/// h.insert(0, 0, 1.0).unwrap();
/// h.insert(0, 1, -0.5).unwrap();
/// h.insert(1, 1, 2.0).unwrap();
/// h.insert(1, 0, -0.5).unwrap();
///
/// assert_eq!(h.get(0, 1), -0.5);
/// assert_eq!(h.trace(), 3.0);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "EllpackMatrixSerialize")]
#[serde(into = "EllpackMatrixSerialize")]
pub struct EllpackMatrix {
    /// Order N of the matrix.
    order: usize,
    /// Fixed per-row capacity M.
    row_capacity: usize,
    /// Occupancy count per row.
    nnz: Vec<usize>,
    /// Column indices, length N·M.
    cols: Vec<usize>,
    /// Stored values, length N·M.
    vals: Vec<Real>,
}

#[cfg(feature = "json_schema")]
impl schemars::JsonSchema for EllpackMatrix {
    fn schema_name() -> String {
        "EllpackMatrix".to_string()
    }

    fn json_schema(gen: &mut schemars::gen::SchemaGenerator) -> schemars::schema::Schema {
        <EllpackMatrixSerialize>::json_schema(gen)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[cfg_attr(feature = "json_schema", derive(schemars::JsonSchema))]
#[cfg_attr(feature = "json_schema", schemars(deny_unknown_fields))]
/// # EllpackMatrix
///
/// Coordinate-list form of an ELLPACK-R matrix used for (de)serialization.
struct EllpackMatrixSerialize {
    /// Order N of the matrix.
    order: usize,
    /// Fixed per-row capacity M.
    row_capacity: usize,
    /// Stored entries in the form (row, column, value).
    entries: Vec<(usize, usize, Real)>,
}

impl TryFrom<EllpackMatrixSerialize> for EllpackMatrix {
    type Error = DensimatError;
    fn try_from(value: EllpackMatrixSerialize) -> Result<Self, Self::Error> {
        let mut matrix = EllpackMatrix::zero(value.order, value.row_capacity)?;
        for (row, col, val) in value.entries {
            matrix.insert(row, col, val)?;
        }
        matrix.ensure_diagonals()?;
        Ok(matrix)
    }
}

impl From<EllpackMatrix> for EllpackMatrixSerialize {
    fn from(value: EllpackMatrix) -> Self {
        let entries = (0..value.order())
            .flat_map(|i| {
                let (cols, vals) = value.row(i);
                cols.iter()
                    .zip(vals.iter())
                    .map(move |(&j, &v)| (i, j, v))
                    .collect::<Vec<_>>()
            })
            .collect();
        Self {
            order: value.order,
            row_capacity: value.row_capacity,
            entries,
        }
    }
}

impl EllpackMatrix {
    /// Creates a matrix with no stored entries.
    ///
    /// # Arguments
    ///
    /// * `order` - The order N of the matrix.
    /// * `row_capacity` - The per-row capacity M; values above N are capped at N.
    ///
    /// # Returns
    ///
    /// * `Ok(EllpackMatrix)` - The empty matrix.
    /// * `Err(DensimatError::NonPositiveDimension)` - N or M is zero.
    pub fn zero(order: usize, row_capacity: usize) -> Result<Self, DensimatError> {
        if order == 0 {
            return Err(DensimatError::NonPositiveDimension {
                name: "N",
                value: 0,
            });
        }
        if row_capacity == 0 {
            return Err(DensimatError::NonPositiveDimension {
                name: "M",
                value: 0,
            });
        }
        let m = row_capacity.min(order);
        Ok(Self {
            order,
            row_capacity: m,
            nnz: vec![0; order],
            cols: vec![0; order * m],
            vals: vec![0.0; order * m],
        })
    }

    /// Creates the identity matrix.
    ///
    /// # Arguments
    ///
    /// * `order` - The order N of the matrix.
    /// * `row_capacity` - The per-row capacity M; values above N are capped at N.
    ///
    /// # Returns
    ///
    /// * `Ok(EllpackMatrix)` - The identity matrix with `nnz[i] = 1` everywhere.
    /// * `Err(DensimatError::NonPositiveDimension)` - N or M is zero.
    pub fn identity(order: usize, row_capacity: usize) -> Result<Self, DensimatError> {
        let mut matrix = Self::zero(order, row_capacity)?;
        let m = matrix.row_capacity;
        for i in 0..order {
            matrix.nnz[i] = 1;
            matrix.cols[i * m] = i;
            matrix.vals[i * m] = 1.0;
        }
        Ok(matrix)
    }

    /// Returns the order N of the matrix.
    pub fn order(&self) -> usize {
        self.order
    }

    /// Returns the fixed per-row capacity M.
    pub fn row_capacity(&self) -> usize {
        self.row_capacity
    }

    /// Returns the occupancy count of row `row`.
    pub fn row_nnz(&self, row: usize) -> usize {
        self.nnz[row]
    }

    /// Returns the stored column indices and values of row `row`.
    pub fn row(&self, row: usize) -> (&[usize], &[Real]) {
        let base = row * self.row_capacity;
        let end = base + self.nnz[row];
        (&self.cols[base..end], &self.vals[base..end])
    }

    /// Returns the stored entries of row `row` as `(column, value)` pairs.
    pub fn row_entries(&self, row: usize) -> impl Iterator<Item = (usize, Real)> + '_ {
        let (cols, vals) = self.row(row);
        cols.iter().copied().zip(vals.iter().copied())
    }

    /// Gets the value stored at (`row`, `col`), or 0.0 when the slot is not stored.
    pub fn get(&self, row: usize, col: usize) -> Real {
        let (cols, vals) = self.row(row);
        cols.iter()
            .position(|&c| c == col)
            .map(|p| vals[p])
            .unwrap_or(0.0)
    }

    /// Appends an entry to row `row`.
    ///
    /// The diagonal-first convention is maintained: an inserted diagonal entry is
    /// swapped into slot 0 of its row. Entries are stored verbatim, no drop
    /// threshold is applied here.
    ///
    /// # Arguments
    ///
    /// * `row` - Row index of the entry.
    /// * `col` - Column index of the entry.
    /// * `val` - Value of the entry.
    ///
    /// # Returns
    ///
    /// * `Ok(())` - The entry was stored.
    /// * `Err(DensimatError::IndexOutOfRange)` - The indices lie outside the matrix.
    /// * `Err(DensimatError::DuplicateEntry)` - The slot is already occupied.
    /// * `Err(DensimatError::RowCapacityExceeded)` - The row is full.
    pub fn insert(&mut self, row: usize, col: usize, val: Real) -> Result<(), DensimatError> {
        if row >= self.order || col >= self.order {
            return Err(DensimatError::IndexOutOfRange {
                row,
                col,
                order: self.order,
            });
        }
        let base = row * self.row_capacity;
        let k = self.nnz[row];
        if self.cols[base..base + k].contains(&col) {
            return Err(DensimatError::DuplicateEntry { row, col });
        }
        if k == self.row_capacity {
            return Err(DensimatError::RowCapacityExceeded {
                row,
                needed: k + 1,
                capacity: self.row_capacity,
            });
        }
        self.cols[base + k] = col;
        self.vals[base + k] = val;
        self.nnz[row] += 1;
        if col == row && k != 0 {
            self.cols.swap(base, base + k);
            self.vals.swap(base, base + k);
        }
        Ok(())
    }

    /// Overwrites row `row` with the given entries.
    ///
    /// The entries must reference columns inside the matrix and contain no
    /// duplicates; a diagonal entry is moved to slot 0, a missing diagonal is
    /// stored as an explicit zero.
    pub(crate) fn set_row(
        &mut self,
        row: usize,
        entries: &[(usize, Real)],
    ) -> Result<(), DensimatError> {
        let mut needed = entries.len();
        if !entries.iter().any(|&(c, _)| c == row) {
            needed += 1;
        }
        if needed > self.row_capacity {
            return Err(DensimatError::RowCapacityExceeded {
                row,
                needed,
                capacity: self.row_capacity,
            });
        }
        self.nnz[row] = 0;
        for &(col, val) in entries {
            self.insert(row, col, val)?;
        }
        if needed > entries.len() {
            self.insert(row, row, 0.0)?;
        }
        Ok(())
    }

    /// Stores an explicit zero diagonal entry in every row that lacks one.
    ///
    /// Matrices read from coordinate files may omit diagonal entries; every
    /// matrix handed to the solvers must store them.
    pub fn ensure_diagonals(&mut self) -> Result<(), DensimatError> {
        for i in 0..self.order {
            let (cols, _) = self.row(i);
            if !cols.contains(&i) {
                self.insert(i, i, 0.0)?;
            }
        }
        Ok(())
    }

    /// Returns the diagonal value of row `row`, or 0.0 when no diagonal is stored.
    #[inline]
    pub fn diagonal(&self, row: usize) -> Real {
        let (cols, vals) = self.row(row);
        if let Some(&first) = cols.first() {
            if first == row {
                return vals[0];
            }
        }
        // Fall back to a scan for rows not yet in diagonal-first form.
        self.get(row, row)
    }

    /// Returns the sum of the diagonal values.
    pub fn trace(&self) -> Real {
        (0..self.order).map(|i| self.diagonal(i)).sum()
    }

    /// Returns the Frobenius norm, the square root of the sum of squared stored values.
    pub fn fnorm(&self) -> Real {
        crate::algebra::sum_squares(self).sqrt()
    }

    /// Returns the total number of stored entries.
    pub fn total_nnz(&self) -> usize {
        self.nnz.iter().sum()
    }

    /// Returns the maximum occupancy count over all rows.
    ///
    /// This is the "bandwidth" that ELLPACK-R codes traditionally report; see
    /// [`EllpackMatrix::bandwidth`] for the classical notion.
    pub fn max_row_nnz(&self) -> usize {
        self.nnz.iter().copied().max().unwrap_or(0)
    }

    /// Returns the classical bandwidth.
    ///
    /// The maximum over all rows of (largest stored column − smallest stored
    /// column + 1); empty rows contribute 0.
    pub fn bandwidth(&self) -> usize {
        (0..self.order)
            .map(|i| {
                let (cols, _) = self.row(i);
                match (cols.iter().min(), cols.iter().max()) {
                    (Some(lo), Some(hi)) => hi - lo + 1,
                    _ => 0,
                }
            })
            .max()
            .unwrap_or(0)
    }

    /// Overwrites this matrix with the contents of `src` without reallocating.
    ///
    /// # Arguments
    ///
    /// * `src` - The matrix to copy; must have the same order and row capacity.
    ///
    /// # Returns
    ///
    /// * `Ok(())` - The contents were copied.
    /// * `Err(DensimatError::ShapeMismatch)` - The shapes differ.
    pub fn copy_from(&mut self, src: &Self) -> Result<(), DensimatError> {
        if self.order != src.order || self.row_capacity != src.row_capacity {
            return Err(DensimatError::ShapeMismatch {
                expected: self.order,
                found: src.order,
            });
        }
        self.nnz.copy_from_slice(&src.nnz);
        self.cols.copy_from_slice(&src.cols);
        self.vals.copy_from_slice(&src.vals);
        Ok(())
    }

    /// Returns a parallel iterator over `(row_index, row)` with exclusive access to each row.
    ///
    /// Rows are disjoint; no two closures observe the same mutable state. This is
    /// the seam all row-parallel primitives are built on.
    pub fn par_rows_mut(
        &mut self,
    ) -> impl IndexedParallelIterator<Item = (usize, RowMut<'_>)> + '_ {
        let m = self.row_capacity;
        let nnz = &mut self.nnz;
        let cols = &mut self.cols;
        let vals = &mut self.vals;
        nnz.par_iter_mut()
            .zip_eq(cols.par_chunks_mut(m))
            .zip_eq(vals.par_chunks_mut(m))
            .enumerate()
            .map(|(i, ((nnz, cols), vals))| (i, RowMut { nnz, cols, vals }))
    }

    /// Returns a parallel iterator over the row indices of the matrix.
    pub fn par_row_indices(&self) -> impl IndexedParallelIterator<Item = usize> {
        (0..self.order).into_par_iter()
    }
}

/// Value equality: two matrices are equal when they have the same order and
/// store the same non-zero entries, independent of slot order and capacity.
impl PartialEq for EllpackMatrix {
    fn eq(&self, other: &Self) -> bool {
        if self.order != other.order {
            return false;
        }
        let sorted_row = |matrix: &EllpackMatrix, i: usize| {
            let mut entries: Vec<(usize, Real)> = matrix
                .row_entries(i)
                .filter(|&(_, v)| v != 0.0)
                .collect();
            entries.sort_by_key(|&(c, _)| c);
            entries
        };
        (0..self.order).all(|i| sorted_row(self, i) == sorted_row(other, i))
    }
}

/// Implements the negative sign function of EllpackMatrix.
///
impl ops::Neg for EllpackMatrix {
    type Output = EllpackMatrix;
    /// Implement minus sign for EllpackMatrix.
    ///
    /// # Returns
    ///
    /// * `Self` - The EllpackMatrix * -1.
    fn neg(mut self) -> Self {
        crate::algebra::scale_inplace(&mut self, -1.0);
        self
    }
}

/// Implements the multiplication function of EllpackMatrix by a real scalar.
///
impl ops::Mul<Real> for EllpackMatrix {
    type Output = EllpackMatrix;
    /// Implement `*` for EllpackMatrix and a real scalar.
    ///
    /// # Arguments
    ///
    /// * `other` - The scalar by which to multiply.
    ///
    /// # Returns
    ///
    /// * `Self` - The EllpackMatrix multiplied by the scalar.
    fn mul(mut self, other: Real) -> Self {
        crate::algebra::scale_inplace(&mut self, other);
        self
    }
}

/// Implements the format function (Display) of EllpackMatrix.
///
impl fmt::Display for EllpackMatrix {
    /// Formats the EllpackMatrix using the given formatter.
    ///
    /// # Arguments
    ///
    /// * `f` - The formatter to use.
    ///
    /// # Returns
    ///
    /// * `std::fmt::Result` - The formatted EllpackMatrix.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "EllpackMatrix({}x{}, row capacity {}){{",
            self.order, self.order, self.row_capacity
        )?;
        for i in 0..self.order {
            for (j, v) in self.row_entries(i) {
                writeln!(f, "({i}, {j}): {v}")?;
            }
        }
        write!(f, "}}")
    }
}
