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

use crate::algebra::{add, gershgorin, multiply_x2, scale_inplace};
use crate::config::Config;
use crate::ellpack::EllpackMatrix;
use crate::solver::{normalize_spectrum, Outcome, Solution};
use crate::DensimatError;

/// Runs the zero-temperature second-order spectral projection recursion.
///
/// Starting from X₀ with spectrum in \[0, 1\], each iteration squares the
/// operand and keeps either X² or 2X − X², whichever moves the trace closer to
/// the occupation target; both polynomials preserve the spectrum inside
/// \[0, 1\], so the iteration drives every eigenvalue to 0 or 1. The branch is
/// decided from the two traces alone. Termination happens when the branch
/// choice becomes indifferent within the idempotency tolerance, or when the
/// trace-change history stops decreasing after the minimum iteration count.
///
/// # Arguments
///
/// * `h` - The Hamiltonian matrix.
/// * `config` - The solver configuration.
///
/// # Returns
///
/// * `Ok(Solution)` - The spin-degenerate density matrix 2·X and diagnostics.
/// * `Err(DensimatError)` - Capacity overflow or a degenerate spectrum.
pub fn sp2_basic(h: &EllpackMatrix, config: &Config) -> Result<Solution, DensimatError> {
    let order = h.order();
    let capacity = h.row_capacity();
    let occupation_target = config.occupation();
    let eps = config.eps;
    let idem_tol = config.idem_tol;

    let mut rho = h.clone();
    let (e_min, e_max) = gershgorin(&rho);
    tracing::debug!(e_min, e_max, "Gershgorin bounds");
    normalize_spectrum(&mut rho, e_min, e_max)?;

    let mut x2 = EllpackMatrix::zero(order, capacity)?;

    let mut idemp_err: f64 = 0.0;
    let mut idemp_err1: f64 = 0.0;
    let mut idemp_err2: f64 = 0.0;

    let mut trace_x = 0.0;
    let mut iterations = 0;
    let mut converged = false;

    while !converged && iterations < config.max_iter {
        let (tr_x, tr_x2) = multiply_x2(&rho, &mut x2, eps)?;
        trace_x = tr_x;
        if config.debug {
            tracing::debug!(iterations, tr_x, tr_x2, "sp2 iteration");
        }

        let tr_2x_x2 = 2.0 * tr_x - tr_x2;
        let trace_old = trace_x;
        let lim_diff = (tr_x2 - occupation_target).abs() - (tr_2x_x2 - occupation_target).abs();

        if lim_diff > idem_tol {
            // X = 2X - X²
            trace_x = 2.0 * tr_x - tr_x2;
            add(&mut rho, &x2, 2.0, -1.0, eps)?;
        } else if lim_diff < -idem_tol {
            // X = X²
            trace_x = tr_x2;
            rho.copy_from(&x2)?;
        } else if (tr_x2 - tr_x).abs() <= idem_tol {
            trace_x = trace_old;
            converged = true;
        } else {
            // An indifferent branch rule with tr(X) already at the target;
            // square and let later branch choices restore the trace.
            trace_x = tr_x2;
            rho.copy_from(&x2)?;
        }

        idemp_err2 = idemp_err1;
        idemp_err1 = idemp_err;
        idemp_err = (trace_x - trace_old).abs() as f64;

        iterations += 1;

        // The trace change has stopped decreasing monotonically.
        if iterations >= config.min_iter && idemp_err >= idemp_err2 {
            converged = true;
        }
    }

    let outcome = if converged {
        Outcome::Converged
    } else {
        tracing::warn!(
            iterations,
            occupation_error = (trace_x - occupation_target).abs(),
            "SP2 reached the iteration ceiling without converging"
        );
        Outcome::IterationLimit
    };

    // The spectral projector is doubled for spin degeneracy.
    scale_inplace(&mut rho, 2.0);

    tracing::info!(
        iterations,
        occupation = trace_x,
        nnz = rho.total_nnz(),
        max_row_nnz = rho.max_row_nnz(),
        "SP2 basic finished"
    );

    Ok(Solution {
        rho,
        iterations,
        occupation: trace_x,
        mu: 0.5 * (e_min + e_max),
        beta: 0.0,
        sign_list: Vec::new(),
        outcome,
    })
}
