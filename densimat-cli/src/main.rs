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

//! Command-line frontend for the densimat SP2 density-matrix solvers.
//!
//! The frontend parses the solver parameters, reads or generates the
//! Hamiltonian, dispatches the configured algorithm and optionally writes the
//! density matrix in Matrix Market format. All numeric work lives in the
//! `densimat` library crate.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;

use densimat::config::{Config, MatrixKind};
use densimat::matrix_market::write_matrix_market_file;
use densimat::solver::{build_density_matrix, initialize_hamiltonian, Algorithm, ImplicitMethod, Outcome};
use densimat::{DensimatError, Real};

const DENSITY_OUTPUT: &str = "dmatrix.out.mtx";

/// Build electronic-structure density matrices with sparse SP2 solvers.
#[derive(Debug, Parser)]
#[command(name = "densimat", version, about)]
struct Cli {
    /// H matrix file name in Matrix Market format; generates a Hamiltonian when absent.
    #[arg(short = 'f', long = "hmat-name")]
    hmat_name: Option<PathBuf>,

    /// Number of rows of the Hamiltonian.
    #[arg(short = 'n', long, default_value_t = 1600)]
    n: usize,

    /// Maximum number of non-zeroes per row; 0 means one full row.
    #[arg(short = 'm', long, default_value_t = 1600)]
    m: usize,

    /// Matrix type (1 dense, 2 ellpack).
    #[arg(short = 'y', long, default_value_t = 2)]
    mtype: usize,

    /// Solver variant: basic, fermi or implicit.
    #[arg(short = 'a', long, default_value_t = Algorithm::Basic)]
    algorithm: Algorithm,

    /// Linear solver of the implicit driver: cg or newton-schulz.
    #[arg(long, default_value_t = ImplicitMethod::ConjugateGradient)]
    implicit_method: ImplicitMethod,

    /// Minimum number of SP2 iterations.
    #[arg(short = 'w', long = "min-iter", default_value_t = 25)]
    min_iter: usize,

    /// Maximum number of SP2 iterations.
    #[arg(short = 'x', long = "max-iter", default_value_t = 100)]
    max_iter: usize,

    /// Recursion depth of the Fermi and implicit expansions.
    #[arg(short = 's', long, default_value_t = 18)]
    nsteps: usize,

    /// Fixed number of occupation iterations; 0 iterates to the occupation limit.
    #[arg(short = 'c', long = "occ-steps", default_value_t = 0)]
    occ_steps: usize,

    /// Number of occupied states; 0 derives it from the band filling.
    #[arg(short = 'o', long, default_value_t = 0.0)]
    nocc: Real,

    /// Band filling fraction.
    #[arg(short = 'b', long, default_value_t = 0.5)]
    bndfil: Real,

    /// Inverse temperature 1/kT.
    #[arg(short = 'k', long, default_value_t = 0.0)]
    beta: Real,

    /// Chemical potential.
    #[arg(short = 'u', long, default_value_t = 0.0)]
    mu: Real,

    /// Threshold for the sparse math.
    #[arg(short = 'e', long, default_value_t = 1.0e-5)]
    eps: Real,

    /// Threshold for the SP2 loop.
    #[arg(short = 'i', long, default_value_t = 1.0e-14)]
    idemtol: Real,

    /// Scaling factor applied to the Gershgorin bounds.
    #[arg(short = 't', long, default_value_t = 1.0)]
    tscale: Real,

    /// Occupation error limit.
    #[arg(short = 'r', long = "occ-limit", default_value_t = 1.0e-9)]
    occ_limit: Real,

    /// Trace limit of the Newton-Raphson corrections.
    #[arg(short = 'l', long = "trace-limit", default_value_t = 1.0e-12)]
    trace_limit: Real,

    /// Residual tolerance of the conjugate-gradient solver.
    #[arg(long = "cg-tol", default_value_t = 1.0e-12)]
    cg_tol: Real,

    /// Amplitude of the generated Hamiltonian band.
    #[arg(long, default_value_t = 1.0)]
    amp: Real,

    /// Decay rate of the generated Hamiltonian band.
    #[arg(long, default_value_t = 1.0)]
    alpha: Real,

    /// Generate the H matrix even when a file name is given.
    #[arg(short = 'g', long)]
    gen: bool,

    /// Write out the density matrix.
    #[arg(short = 'd', long)]
    dout: bool,

    /// Write out debug messages.
    #[arg(long)]
    debug: bool,
}

impl Cli {
    fn into_config(self) -> Result<Config, DensimatError> {
        let generate = self.gen || self.hmat_name.is_none();
        Ok(Config {
            n: self.n,
            m: self.m,
            matrix_kind: MatrixKind::from_selector(self.mtype)?,
            algorithm: self.algorithm,
            implicit_method: self.implicit_method,
            min_iter: self.min_iter,
            max_iter: self.max_iter,
            n_steps: self.nsteps,
            occupation_steps: self.occ_steps,
            n_occ: self.nocc,
            band_fill: self.bndfil,
            beta: self.beta,
            mu: self.mu,
            t_scale: self.tscale,
            eps: self.eps,
            idem_tol: self.idemtol,
            occ_limit: self.occ_limit,
            trace_limit: self.trace_limit,
            cg_tol: self.cg_tol,
            amp: self.amp,
            alpha: self.alpha,
            hmat_path: self.hmat_name,
            generate,
            write_density: self.dout,
            debug: self.debug,
        })
    }
}

fn exit_code_for(error: &anyhow::Error) -> ExitCode {
    match error.downcast_ref::<DensimatError>() {
        Some(DensimatError::RowCapacityExceeded { .. }) => ExitCode::from(3),
        Some(DensimatError::LinearSolverNotConverged { .. }) => ExitCode::from(4),
        Some(
            DensimatError::MatrixMarketParse { .. }
            | DensimatError::NonPositiveDimension { .. }
            | DensimatError::InvalidThreshold { .. }
            | DensimatError::UnsupportedMatrixType { .. },
        ) => ExitCode::from(2),
        _ => ExitCode::FAILURE,
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config = cli.into_config()?;
    config.validate()?;

    tracing::info!(
        n = config.n,
        m = config.adjusted_row_capacity(),
        algorithm = %config.algorithm,
        nocc = config.occupation(),
        eps = config.eps,
        "densimat SP2 run"
    );

    let hamiltonian = initialize_hamiltonian(&config).context("initializing the Hamiltonian")?;
    let solution =
        build_density_matrix(&hamiltonian, &config).context("building the density matrix")?;

    match solution.outcome {
        Outcome::Converged => tracing::info!(
            iterations = solution.iterations,
            occupation = solution.occupation,
            mu = solution.mu,
            beta = solution.beta,
            "solver converged"
        ),
        Outcome::IterationLimit => tracing::warn!(
            iterations = solution.iterations,
            occupation = solution.occupation,
            "solver stopped at the iteration limit, density matrix is best effort"
        ),
    }

    if config.write_density {
        write_matrix_market_file(DENSITY_OUTPUT, &solution.rho)
            .context("writing the density matrix")?;
        tracing::info!(path = DENSITY_OUTPUT, "density matrix written");
    }

    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_level = if cli.debug { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .init();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            tracing::error!("{error:#}");
            exit_code_for(&error)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn defaults_match_solver_defaults() {
        let cli = Cli::parse_from(["densimat"]);
        let config = cli.into_config().unwrap();
        let mut expected = Config::default();
        expected.generate = true;
        assert_eq!(config, expected);
    }

    #[test]
    fn missing_file_implies_generation() {
        let cli = Cli::parse_from(["densimat", "--n", "64", "--m", "16"]);
        let config = cli.into_config().unwrap();
        assert!(config.generate);
        assert_eq!(config.n, 64);
        assert_eq!(config.adjusted_row_capacity(), 32);
    }

    #[test]
    fn dense_matrix_type_is_rejected() {
        let cli = Cli::parse_from(["densimat", "--mtype", "1"]);
        assert!(matches!(
            cli.into_config(),
            Err(DensimatError::UnsupportedMatrixType { mtype: 1 })
        ));
    }
}
