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

//! Module for generating synthetic banded Hamiltonian matrices.
//!
//! The generator is fully deterministic: a multiplicative linear-congruential
//! stream is seeded from the matrix shape (N, M), so the same shape always
//! yields the same Hamiltonian. The produced band structure resembles the
//! Hamiltonian of a polyethylene chain.

use crate::ellpack::EllpackMatrix;
use crate::{DensimatError, Real};

const LCG_MULTIPLIER: u64 = 437799614237992725;
const LCG_MODULUS: u64 = 2305843009213693951; // 2^61 - 1
const LCG_CONVERT: f64 = 1.0 / 2305843009213693951.0;
const KNUTH_MIX: u32 = 2654435761;

/// Advances the linear-congruential stream and returns a draw in \[0, 1).
///
/// # Arguments
///
/// * `seed` - Stream state, updated in place.
///
/// # Returns
///
/// * `f64` - A deterministic pseudo-random number.
pub fn lcg61(seed: &mut u64) -> f64 {
    *seed = seed.wrapping_mul(LCG_MULTIPLIER) % LCG_MODULUS;
    *seed as f64 * LCG_CONVERT
}

/// Builds the stream seed for a matrix of shape (N, M).
///
/// The two shape parameters are mixed into a 64-bit state which is then warmed
/// up by ten draws so that nearby shapes decorrelate.
///
/// # Arguments
///
/// * `order` - The order N of the matrix.
/// * `row_capacity` - The per-row capacity M of the matrix.
///
/// # Returns
///
/// * `u64` - The warmed-up stream state.
pub fn mk_seed(order: u32, row_capacity: u32) -> u64 {
    let s1 = order.wrapping_mul(KNUTH_MIX);
    let s2 = order.wrapping_add(row_capacity).wrapping_mul(KNUTH_MIX);
    let mut seed = ((s1 as u64) << 32).wrapping_add(s2 as u64);
    for _ in 0..10 {
        lcg61(&mut seed);
    }
    seed
}

impl EllpackMatrix {
    /// Generates a symmetric banded Hamiltonian.
    ///
    /// For every row i the band i−M+1 ≤ j < i+M is filled with
    /// `amp·u·exp(−alpha·(i−j)²)` where u is a draw from the stream seeded by
    /// (N, M). Entries above the diagonal are drawn from the stream; entries
    /// below mirror the value stored at the transposed position, so the result
    /// is symmetric. Off-diagonal values with magnitude ≤ `eps` are dropped,
    /// the diagonal is always stored.
    ///
    /// # Arguments
    ///
    /// * `order` - The order N of the matrix.
    /// * `row_capacity` - The per-row capacity M, which also sets the band half-width.
    /// * `amp` - Amplitude of the generated values.
    /// * `alpha` - Decay rate of the band.
    /// * `eps` - The numeric drop threshold.
    ///
    /// # Returns
    ///
    /// * `Ok(EllpackMatrix)` - The generated Hamiltonian.
    /// * `Err(DensimatError::RowCapacityExceeded)` - More band entries survive
    ///   the drop rule than a row can hold.
    /// * `Err(DensimatError::NonPositiveDimension)` - N or M is zero.
    pub fn banded(
        order: usize,
        row_capacity: usize,
        amp: Real,
        alpha: Real,
        eps: Real,
    ) -> Result<Self, DensimatError> {
        let mut matrix = Self::zero(order, row_capacity)?;
        let m = matrix.row_capacity();
        let mut seed = mk_seed(order as u32, row_capacity as u32);

        let mut total_nnz = 0;
        let mut row_buffer: Vec<(usize, Real)> = Vec::with_capacity(2 * m);
        for i in 0..order {
            row_buffer.clear();
            let band_start = i.saturating_sub(m - 1);
            let band_end = (i + m).min(order);
            for j in band_start..band_end {
                let value = if j < i {
                    // Mirror the already generated upper-triangle entry; a zero
                    // means the transposed entry was dropped.
                    matrix.get(j, i)
                } else {
                    let u = lcg61(&mut seed) as Real;
                    let distance = (i as Real) - (j as Real);
                    amp * u * (-alpha * distance * distance).exp()
                };
                if j == i || value.abs() > eps {
                    row_buffer.push((j, value));
                }
            }
            matrix.set_row(i, &row_buffer)?;
            total_nnz += row_buffer.len();
        }

        tracing::debug!(
            order,
            row_capacity = m,
            nnz = total_nnz,
            "generated banded Hamiltonian"
        );
        Ok(matrix)
    }
}
