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

use crate::algebra::{add, multiply, multiply_x2, scale_add_identity, scale_inplace, sum_squares, trace_mult};
use crate::config::Config;
use crate::ellpack::EllpackMatrix;
use crate::solver::{normalize_implicit, ImplicitMethod, Outcome, Solution};
use crate::{DensimatError, Real};

/// Iteration cap of the matrix conjugate-gradient solver.
const CG_MAX_ITER: usize = 100;

/// Newton-Schulz refinement sweeps per recursion level.
const NEWTON_SCHULZ_SWEEPS: usize = 4;

/// Solves A·X = B with a conjugate gradient over matrix iterates.
///
/// The search directions live in the matrix space; inner products are traces,
/// so α = tr(RᵀR)/tr(Dᵀ·A·D) and the residual update is R ← R − α·A·D. The
/// iteration stops when ‖R‖² ≤ `tol` and is capped at 100 sweeps.
///
/// # Arguments
///
/// * `a` - Symmetric positive-definite system matrix.
/// * `b` - Right-hand side.
/// * `x` - Initial guess on entry, solution on exit.
/// * `tol` - Bound on the squared Frobenius norm of the residual.
/// * `eps` - The numeric drop threshold of the sparse products.
///
/// # Returns
///
/// * `Ok(usize)` - Number of iterations performed.
/// * `Err(DensimatError::LinearSolverNotConverged)` - The cap was reached or
///   the iteration stagnated; `x` holds the best iterate found.
pub fn conjugate_gradient(
    a: &EllpackMatrix,
    b: &EllpackMatrix,
    x: &mut EllpackMatrix,
    tol: Real,
    eps: Real,
) -> Result<usize, DensimatError> {
    let order = a.order();
    let capacity = a.row_capacity();

    // R = B - A·X
    let mut r = EllpackMatrix::zero(order, capacity)?;
    multiply(a, x, &mut r, -1.0, 0.0, eps)?;
    add(&mut r, b, 1.0, 1.0, eps)?;

    let mut r_norm2 = sum_squares(&r);
    if r_norm2 <= tol {
        return Ok(0);
    }

    let mut d = r.clone();
    let mut ad = EllpackMatrix::zero(order, capacity)?;

    for iteration in 1..=CG_MAX_ITER {
        multiply(a, &d, &mut ad, 1.0, 0.0, eps)?;
        let dad = trace_mult(&d, &ad)?;
        if dad.abs() < Real::MIN_POSITIVE {
            return Err(DensimatError::LinearSolverNotConverged {
                iterations: iteration,
                residual_norm: (r_norm2 as f64).sqrt(),
            });
        }
        let alpha = r_norm2 / dad;
        add(x, &d, 1.0, alpha, eps)?;
        add(&mut r, &ad, 1.0, -alpha, eps)?;
        let r_norm2_new = sum_squares(&r);
        tracing::trace!(iteration, residual = r_norm2_new, "cg sweep");
        if r_norm2_new <= tol {
            return Ok(iteration);
        }
        let beta = r_norm2_new / r_norm2;
        r_norm2 = r_norm2_new;
        // D = R + β·D
        add(&mut d, &r, beta, 1.0, eps)?;
    }

    Err(DensimatError::LinearSolverNotConverged {
        iterations: CG_MAX_ITER,
        residual_norm: (r_norm2 as f64).sqrt(),
    })
}

/// Runs the implicit recursive Fermi-operator expansion.
///
/// Per recursion level the operand satisfies the implicit relation
/// A·ρ′ = ρ² with A = 2·(ρ² − ρ) + I, whose scalar form
/// x′ = x²/(x² + (1 − x)²) doubles the effective inverse temperature at every
/// level; after n_steps levels the starting operand c·(μ·I − H) + ½·I with
/// c = β/2^(2+n_steps) has been sharpened into the Fermi operator at β. The
/// level systems are solved either by the matrix conjugate gradient directly
/// or by Newton-Schulz refinement of a running approximate inverse.
///
/// # Arguments
///
/// * `h` - The Hamiltonian matrix.
/// * `config` - The solver configuration; `beta` must be positive and `mu` is
///   taken as given, no occupation correction is applied.
///
/// # Returns
///
/// * `Ok(Solution)` - The spin-degenerate finite-temperature density matrix.
/// * `Err(DensimatError)` - Capacity overflow, an unconverged linear solver or
///   a non-positive β.
pub fn implicit_fermi(h: &EllpackMatrix, config: &Config) -> Result<Solution, DensimatError> {
    if config.beta <= 0.0 {
        return Err(DensimatError::GenericError {
            msg: format!(
                "the implicit driver needs a positive inverse temperature, got beta = {}",
                config.beta
            ),
        });
    }
    let order = h.order();
    let capacity = h.row_capacity();
    let eps = config.eps;
    let n_steps = config.n_steps;
    let c = config.beta / (2.0 as Real).powi(2 + n_steps as i32);

    let mut rho = h.clone();
    normalize_implicit(&mut rho, c, config.mu)?;

    let identity = EllpackMatrix::identity(order, capacity)?;
    let mut rho2 = EllpackMatrix::zero(order, capacity)?;
    let mut a = EllpackMatrix::zero(order, capacity)?;
    let mut a_inv = EllpackMatrix::zero(order, capacity)?;
    let mut ns_old = EllpackMatrix::zero(order, capacity)?;
    let mut ns_prod = EllpackMatrix::zero(order, capacity)?;
    let mut cg_iterations = 0;

    for level in 0..n_steps {
        multiply_x2(&rho, &mut rho2, eps)?;

        // A = 2·(ρ² - ρ) + I
        a.copy_from(&rho2)?;
        add(&mut a, &rho, 1.0, -1.0, eps)?;
        scale_add_identity(&mut a, 2.0, 1.0, 0.0)?;

        match config.implicit_method {
            ImplicitMethod::ConjugateGradient => {
                // Solve A·ρ′ = ρ² in place, starting from ρ².
                rho.copy_from(&rho2)?;
                cg_iterations += conjugate_gradient(&a, &rho2, &mut rho, config.cg_tol, eps)?;
            }
            ImplicitMethod::NewtonSchulz => {
                if level == 0 {
                    a_inv.copy_from(&identity)?;
                    cg_iterations +=
                        conjugate_gradient(&a, &identity, &mut a_inv, config.cg_tol, eps)?;
                } else {
                    for _ in 0..NEWTON_SCHULZ_SWEEPS {
                        // A⁻¹ ← 2·A⁻¹ - A⁻¹·A·A⁻¹
                        ns_old.copy_from(&a_inv)?;
                        multiply(&a_inv, &a, &mut ns_prod, -1.0, 0.0, eps)?;
                        multiply(&ns_prod, &ns_old, &mut a_inv, 1.0, 2.0, eps)?;
                    }
                }
                multiply(&a_inv, &rho2, &mut rho, 1.0, 0.0, eps)?;
            }
        }
        tracing::debug!(level, trace = rho.trace(), "implicit recursion level");
    }

    let occupation = rho.trace();
    scale_inplace(&mut rho, 2.0);

    tracing::info!(
        levels = n_steps,
        cg_iterations,
        occupation,
        "implicit Fermi finished"
    );

    Ok(Solution {
        rho,
        iterations: n_steps,
        occupation,
        mu: config.mu,
        beta: config.beta,
        sign_list: Vec::new(),
        outcome: Outcome::Converged,
    })
}
