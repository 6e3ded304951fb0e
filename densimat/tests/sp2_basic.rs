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

//! Integration test for the zero-temperature SP2 driver

mod common;

use common::{create_na_matrix_from_ellpack, diagonal_hamiltonian};
use densimat::config::Config;
use densimat::ellpack::EllpackMatrix;
use densimat::solver::{build_density_matrix, sp2_basic, Algorithm, Outcome};

// Test that SP2 projects a diagonal Hamiltonian onto its lowest states
#[test]
fn diagonal_hamiltonian_projects_onto_lowest_states() {
    let h = diagonal_hamiltonian(&[1.0, 2.0, 3.0, 4.0]);
    let mut config = Config::default();
    config.n = 4;
    config.n_occ = 2.0;
    config.eps = 1.0e-8;

    let solution = sp2_basic(&h, &config).unwrap();

    assert_eq!(solution.outcome, Outcome::Converged);
    assert!(solution.iterations <= 30, "took {}", solution.iterations);
    assert!((solution.occupation - 2.0).abs() <= 1.0e-9);

    // The density matrix doubles the projector onto the two lowest eigenstates.
    let expected = [2.0, 2.0, 0.0, 0.0];
    for (i, &value) in expected.iter().enumerate() {
        assert!(
            (solution.rho.get(i, i) - value).abs() <= 1.0e-10,
            "diagonal {i} is {}",
            solution.rho.get(i, i)
        );
        for j in 0..4 {
            if j != i {
                assert!(solution.rho.get(i, j).abs() <= 1.0e-10);
            }
        }
    }
}

// Test that the projector is idempotent before the spin doubling
#[test]
fn converged_projector_is_idempotent() {
    let h = EllpackMatrix::banded(8, 8, 1.0, 1.0, 1.0e-12).unwrap();
    let mut config = Config::default();
    config.n = 8;
    config.eps = 1.0e-12;

    let solution = sp2_basic(&h, &config).unwrap();
    assert_eq!(solution.outcome, Outcome::Converged);

    // occ defaults to band_fill * N = 4.
    assert!(
        (solution.occupation - 4.0).abs() <= 1.0e-8,
        "occupation is {}",
        solution.occupation
    );

    let projector = create_na_matrix_from_ellpack(&solution.rho) / 2.0;
    let residual = (&projector * &projector) - &projector;
    assert!(
        residual.norm() <= 1.0e-6,
        "idempotency residual is {}",
        residual.norm()
    );
}

// Test that the density matrix of a generated Hamiltonian is symmetric
#[test]
fn density_matrix_is_symmetric() {
    let h = EllpackMatrix::banded(16, 16, 1.0, 1.0, 1.0e-12).unwrap();
    let mut config = Config::default();
    config.n = 16;
    config.eps = 1.0e-12;

    let solution = sp2_basic(&h, &config).unwrap();
    for i in 0..16 {
        for (j, v) in solution.rho.row_entries(i) {
            assert!((solution.rho.get(j, i) - v).abs() <= 1.0e-8);
        }
    }
}

// Test that an exhausted iteration budget is reported as a warning outcome
#[test]
fn iteration_ceiling_yields_best_effort() {
    let h = EllpackMatrix::banded(8, 8, 1.0, 1.0, 1.0e-10).unwrap();
    let mut config = Config::default();
    config.n = 8;
    config.eps = 1.0e-10;
    // One iteration is far below the minimum, so the history rule cannot fire.
    config.max_iter = 1;
    config.idem_tol = 1.0e-30;

    let solution = sp2_basic(&h, &config).unwrap();
    assert_eq!(solution.outcome, Outcome::IterationLimit);
    assert_eq!(solution.iterations, 1);
}

// Test the dispatching entry point with the basic algorithm
#[test]
fn dispatch_runs_basic() {
    let h = diagonal_hamiltonian(&[1.0, 2.0, 3.0, 4.0]);
    let mut config = Config::default();
    config.n = 4;
    config.n_occ = 2.0;
    config.eps = 1.0e-8;
    config.algorithm = Algorithm::Basic;

    let solution = build_density_matrix(&h, &config).unwrap();
    assert_eq!(solution.outcome, Outcome::Converged);
    assert!((solution.occupation - 2.0).abs() <= 1.0e-9);
}

// Test that dense matrix requests are rejected at validation
#[test]
fn dense_requests_are_rejected() {
    use densimat::config::MatrixKind;
    use densimat::DensimatError;

    let h = diagonal_hamiltonian(&[1.0, 2.0]);
    let mut config = Config::default();
    config.n = 2;
    config.matrix_kind = MatrixKind::Dense;
    assert!(matches!(
        build_density_matrix(&h, &config),
        Err(DensimatError::UnsupportedMatrixType { mtype: 1 })
    ));
}
