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

//! Integration test for the synthetic Hamiltonian generator

mod common;

use densimat::ellpack::EllpackMatrix;
use densimat::generate::{lcg61, mk_seed};
use densimat::DensimatError;

// Test that the pseudo-random stream stays in the unit interval
#[test]
fn lcg_draws_lie_in_unit_interval() {
    let mut seed = mk_seed(1600, 256);
    for _ in 0..1000 {
        let u = lcg61(&mut seed);
        assert!((0.0..1.0).contains(&u));
    }
}

// Test that the stream seed depends on the matrix shape
#[test]
fn seeds_differ_between_shapes() {
    assert_ne!(mk_seed(8, 4), mk_seed(8, 8));
    assert_ne!(mk_seed(8, 4), mk_seed(16, 4));
}

// Test that generation is deterministic in the matrix shape
#[test]
fn banded_is_deterministic() {
    let first = EllpackMatrix::banded(32, 8, 1.0, 1.0, 1.0e-5).unwrap();
    let second = EllpackMatrix::banded(32, 8, 1.0, 1.0, 1.0e-5).unwrap();
    assert_eq!(first, second);
}

// Test that the generated Hamiltonian is symmetric
#[test]
fn banded_is_symmetric() {
    let matrix = EllpackMatrix::banded(32, 8, 1.0, 1.0, 1.0e-5).unwrap();
    for i in 0..matrix.order() {
        for (j, v) in matrix.row_entries(i) {
            assert_eq!(matrix.get(j, i), v, "entry ({i}, {j}) is not mirrored");
        }
    }
}

// Test the structural invariants and the drop rule of the generator
#[test]
fn banded_respects_drop_rule() {
    let eps = 1.0e-5;
    let matrix = EllpackMatrix::banded(64, 16, 1.0, 1.0, eps).unwrap();
    common::assert_structural_invariants(&matrix, eps);
}

// Test that the band is confined to the configured half-width
#[test]
fn banded_respects_band_limits() {
    let matrix = EllpackMatrix::banded(64, 16, 1.0, 0.5, 1.0e-8).unwrap();
    for i in 0..matrix.order() {
        for (j, _) in matrix.row_entries(i) {
            let distance = i.abs_diff(j);
            assert!(distance < 16, "entry ({i}, {j}) lies outside the band");
        }
    }
}

// Test that a band wider than the row capacity aborts with a capacity error
#[test]
fn banded_overflow_aborts_at_first_full_row() {
    // With no decay and no dropping the second row needs three entries.
    let result = EllpackMatrix::banded(4, 2, 1.0, 0.0, 0.0);
    assert!(matches!(
        result,
        Err(DensimatError::RowCapacityExceeded {
            row: 1,
            needed: 3,
            capacity: 2
        })
    ));
}

// Test that the amplitude scales the generated values
#[test]
fn amplitude_scales_values() {
    let base = EllpackMatrix::banded(16, 4, 1.0, 1.0, 0.0).unwrap();
    let scaled = EllpackMatrix::banded(16, 4, 2.0, 1.0, 0.0).unwrap();
    for i in 0..base.order() {
        for (j, v) in base.row_entries(i) {
            assert!((scaled.get(i, j) - 2.0 * v).abs() < 1e-14);
        }
    }
}
