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

//! Integration test for the solver configuration

use densimat::config::{Config, MatrixKind};
use densimat::solver::{Algorithm, ImplicitMethod};
use densimat::DensimatError;
use test_case::test_case;

// Test the default parameter set
#[test]
fn defaults() {
    let config = Config::default();
    assert_eq!(config.n, 1600);
    assert_eq!(config.m, 1600);
    assert_eq!(config.min_iter, 25);
    assert_eq!(config.max_iter, 100);
    assert_eq!(config.n_steps, 18);
    assert_eq!(config.occupation_steps, 0);
    assert_eq!(config.eps, 1.0e-5);
    assert_eq!(config.idem_tol, 1.0e-14);
    assert_eq!(config.band_fill, 0.5);
    assert_eq!(config.occ_limit, 1.0e-9);
    assert_eq!(config.trace_limit, 1.0e-12);
    assert_eq!(config.t_scale, 1.0);
    assert_eq!(config.algorithm, Algorithm::Basic);
    assert_eq!(config.implicit_method, ImplicitMethod::ConjugateGradient);
    assert!(config.validate().is_ok());
}

// Test the occupation target derivation
#[test]
fn occupation_target() {
    let mut config = Config::default();
    config.n = 100;
    assert_eq!(config.occupation(), 50.0);
    config.n_occ = 7.0;
    assert_eq!(config.occupation(), 7.0);
}

// Test the validation of fatal parameter errors
#[test]
fn validate_rejects_bad_parameters() {
    let mut config = Config::default();
    config.n = 0;
    assert!(matches!(
        config.validate(),
        Err(DensimatError::NonPositiveDimension { name: "N", .. })
    ));

    let mut config = Config::default();
    config.eps = -1.0e-5;
    assert!(matches!(
        config.validate(),
        Err(DensimatError::InvalidThreshold { .. })
    ));

    let mut config = Config::default();
    config.matrix_kind = MatrixKind::Dense;
    assert!(matches!(
        config.validate(),
        Err(DensimatError::UnsupportedMatrixType { mtype: 1 })
    ));
}

// Test the matrix type selector mapping
#[test_case(1, Ok(MatrixKind::Dense); "dense")]
#[test_case(2, Ok(MatrixKind::Ellpack); "ellpack")]
#[test_case(3, Err(()); "unknown")]
fn matrix_kind_selector(selector: usize, expected: Result<MatrixKind, ()>) {
    let result = MatrixKind::from_selector(selector);
    match expected {
        Ok(kind) => assert_eq!(result.unwrap(), kind),
        Err(()) => assert!(matches!(
            result,
            Err(DensimatError::UnsupportedMatrixType { .. })
        )),
    }
}

// Test the algorithm selectors parse from their command-line spellings
#[test]
fn algorithm_from_str() {
    assert_eq!("basic".parse::<Algorithm>().unwrap(), Algorithm::Basic);
    assert_eq!("Fermi".parse::<Algorithm>().unwrap(), Algorithm::Fermi);
    assert_eq!(
        "implicit".parse::<Algorithm>().unwrap(),
        Algorithm::Implicit
    );
    assert!("other".parse::<Algorithm>().is_err());

    assert_eq!(
        "cg".parse::<ImplicitMethod>().unwrap(),
        ImplicitMethod::ConjugateGradient
    );
    assert_eq!(
        "newton-schulz".parse::<ImplicitMethod>().unwrap(),
        ImplicitMethod::NewtonSchulz
    );
}

// Test the serde round trip of the configuration
#[test]
fn serde_roundtrip() {
    let mut config = Config::default();
    config.algorithm = Algorithm::Fermi;
    config.n_occ = 12.0;
    let serialized = serde_json::to_string(&config).unwrap();
    let deserialized: Config = serde_json::from_str(&serialized).unwrap();
    assert_eq!(deserialized, config);
}

// Test that missing fields fall back to the defaults
#[test]
fn serde_fills_defaults() {
    let config: Config = serde_json::from_str(r#"{"n": 8, "m": 4}"#).unwrap();
    assert_eq!(config.n, 8);
    assert_eq!(config.m, 4);
    assert_eq!(config.eps, 1.0e-5);
    assert_eq!(config.adjusted_row_capacity(), 8);
}
