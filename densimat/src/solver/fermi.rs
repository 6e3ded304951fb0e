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

use crate::algebra::{add, gershgorin, multiply, multiply_x2, scale_inplace};
use crate::config::Config;
use crate::ellpack::EllpackMatrix;
use crate::solver::{normalize_fermi, Outcome, Solution, MAX_OCCUPATION_ITER};
use crate::{DensimatError, Real};

/// Sentinel β reported when the residual trace is too small to estimate a temperature.
const BETA_SENTINEL: Real = -1000.0;

/// State shared between the initialization and main phase of the Fermi driver.
struct FermiState {
    rho: EllpackMatrix,
    mu: Real,
    beta: Real,
    h1: Real,
    hn: Real,
    sign_list: Vec<i8>,
    iterations: usize,
    outcome: Outcome,
}

/// Runs the finite-temperature truncated SP2 Fermi expansion.
///
/// The initialization phase determines the per-step branch signs σ and brings
/// the chemical potential μ close to the target occupation by Newton-Raphson
/// steps on the response operator X₁, then estimates the inverse temperature β
/// from the residual ρ·(I − ρ). The main phase repeats the now fixed σ-indexed
/// recursion from the current μ, correcting μ once per outer iteration with
/// the derivative operator ΔX = −β·ρ·(I − ρ), and finishes with the trailing
/// correction ρ + λ·ΔX and the spin doubling.
///
/// # Arguments
///
/// * `h` - The Hamiltonian matrix.
/// * `config` - The solver configuration.
///
/// # Returns
///
/// * `Ok(Solution)` - The density matrix with final μ, β and the σ list.
/// * `Err(DensimatError)` - Capacity overflow or a degenerate spectrum.
pub fn sp2_fermi(h: &EllpackMatrix, config: &Config) -> Result<Solution, DensimatError> {
    let mut state = fermi_init(h, config)?;
    fermi_loop(h, config, &mut state)?;

    let occupation = state.rho.trace() / 2.0;
    tracing::info!(
        iterations = state.iterations,
        mu = state.mu,
        beta = state.beta,
        occupation,
        "SP2 Fermi finished"
    );

    Ok(Solution {
        rho: state.rho,
        iterations: state.iterations,
        occupation,
        mu: state.mu,
        beta: state.beta,
        sign_list: state.sign_list,
        outcome: state.outcome,
    })
}

/// Initialization phase: determines σ, μ, β and the scaled spectral bounds.
fn fermi_init(h: &EllpackMatrix, config: &Config) -> Result<FermiState, DensimatError> {
    let order = h.order();
    let capacity = h.row_capacity();
    let occupation_target = config.occupation();
    let eps = config.eps;
    let n_steps = config.n_steps;

    let (e_min, e_max) = gershgorin(h);
    let mut mu = 0.5 * (e_max + e_min);
    let h1 = config.t_scale * e_min;
    let hn = config.t_scale * e_max;
    if hn - h1 == 0.0 {
        return Err(DensimatError::SingularSpectrum);
    }
    tracing::debug!(e_min, e_max, mu, h1, hn, "Fermi initialization bounds");

    let identity = EllpackMatrix::identity(order, capacity)?;
    let mut rho = EllpackMatrix::zero(order, capacity)?;
    let mut x1 = EllpackMatrix::zero(order, capacity)?;
    let mut x2 = EllpackMatrix::zero(order, capacity)?;
    let mut tmp = EllpackMatrix::zero(order, capacity)?;

    let mut sign_list = vec![0i8; n_steps];
    let mut first_pass = true;
    let mut occ_err = 1.0;
    let mut iterations = 0;
    let mut outcome = Outcome::Converged;

    while occ_err > config.occ_limit {
        if iterations >= MAX_OCCUPATION_ITER {
            tracing::warn!(
                iterations,
                occ_err,
                "Fermi initialization reached the iteration ceiling"
            );
            outcome = Outcome::IterationLimit;
            break;
        }
        rho.copy_from(h)?;
        normalize_fermi(&mut rho, h1, hn, mu)?;

        // X₁ = -I/(hN - h1) seeds the response recursion.
        x1.copy_from(&identity)?;
        scale_inplace(&mut x1, -1.0 / (hn - h1));

        for i in 0..n_steps {
            let (tr_x0, tr_x2) = multiply_x2(&rho, &mut x2, eps)?;

            if first_pass {
                sign_list[i] = if (tr_x2 - occupation_target).abs()
                    < (2.0 * tr_x0 - tr_x2 - occupation_target).abs()
                {
                    -1
                } else {
                    1
                };
            }

            // tmp = ρ·X₁ + X₁·ρ
            multiply(&rho, &x1, &mut tmp, 1.0, 0.0, eps)?;
            multiply(&x1, &rho, &mut tmp, 1.0, 1.0, eps)?;

            if sign_list[i] == 1 {
                // X₁ = 2·X₁ - (ρ·X₁ + X₁·ρ)
                add(&mut x1, &tmp, 2.0, -1.0, eps)?;
            } else {
                x1.copy_from(&tmp)?;
            }

            if sign_list[i] == 1 {
                // ρ = 2·ρ - ρ²
                add(&mut rho, &x2, 2.0, -1.0, eps)?;
            } else {
                rho.copy_from(&x2)?;
            }
        }

        first_pass = false;
        let trace_x0 = rho.trace();
        let trace_x1 = x1.trace();
        occ_err = (occupation_target - trace_x0).abs();

        // Newton-Raphson step to correct for occupation.
        let lambda = if trace_x1.abs() > config.trace_limit {
            (occupation_target - trace_x0) / trace_x1
        } else {
            0.0
        };
        mu += lambda;
        iterations += 1;
        tracing::debug!(iterations, mu, occ_err, "Fermi initialization step");
    }

    // β from the residual ρ·(I - ρ).
    let mut one_minus_rho = identity;
    add(&mut one_minus_rho, &rho, 1.0, -1.0, eps)?;
    multiply(&rho, &one_minus_rho, &mut tmp, 1.0, 0.0, eps)?;
    let residual_trace = tmp.trace();
    let trace_x1 = x1.trace();
    let beta = if residual_trace.abs() > config.trace_limit {
        -trace_x1 / residual_trace
    } else {
        BETA_SENTINEL
    };
    tracing::debug!(mu, beta, "Fermi initialization complete");

    scale_inplace(&mut rho, 2.0);

    Ok(FermiState {
        rho,
        mu,
        beta,
        h1,
        hn,
        sign_list,
        iterations,
        outcome,
    })
}

/// Main phase: σ-indexed recursion with one Newton-Raphson correction per pass.
fn fermi_loop(
    h: &EllpackMatrix,
    config: &Config,
    state: &mut FermiState,
) -> Result<(), DensimatError> {
    let order = h.order();
    let capacity = h.row_capacity();
    let occupation_target = config.occupation();
    let eps = config.eps;
    let osteps = config.occupation_steps;

    let identity = EllpackMatrix::identity(order, capacity)?;
    let mut x2 = EllpackMatrix::zero(order, capacity)?;
    let mut dx = EllpackMatrix::zero(order, capacity)?;

    let mut occ_err = config.occ_limit + 1.0;
    let mut lambda = 0.0;
    let mut iterations = 0;

    while (osteps == 0 && occ_err > config.occ_limit) || (osteps > 0 && iterations < osteps) {
        if osteps == 0 && iterations >= MAX_OCCUPATION_ITER {
            tracing::warn!(
                iterations,
                occ_err,
                "Fermi loop reached the iteration ceiling"
            );
            state.outcome = Outcome::IterationLimit;
            break;
        }
        iterations += 1;

        state.rho.copy_from(h)?;
        normalize_fermi(&mut state.rho, state.h1, state.hn, state.mu)?;

        for i in 0..config.n_steps {
            multiply_x2(&state.rho, &mut x2, eps)?;
            if state.sign_list[i] == 1 {
                add(&mut state.rho, &x2, 2.0, -1.0, eps)?;
            } else {
                state.rho.copy_from(&x2)?;
            }
        }

        let trace_x0 = state.rho.trace();
        occ_err = (occupation_target - trace_x0).abs();

        // ΔX = -β·ρ·(I - ρ) approximates d tr(ρ)/dμ.
        x2.copy_from(&identity)?;
        add(&mut x2, &state.rho, 1.0, -1.0, eps)?;
        multiply(&state.rho, &x2, &mut dx, -state.beta, 0.0, eps)?;
        let trace_dx = dx.trace();

        lambda = if trace_dx.abs() > config.trace_limit {
            (occupation_target - trace_x0) / trace_dx
        } else {
            0.0
        };
        state.mu += lambda;
        tracing::debug!(iterations, mu = state.mu, occ_err, "Fermi loop step");
    }

    // Trailing correction for the last μ update, then the spin doubling.
    add(&mut state.rho, &dx, 1.0, lambda, eps)?;
    scale_inplace(&mut state.rho, 2.0);
    state.iterations += iterations;
    Ok(())
}
