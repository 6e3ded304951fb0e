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

//! Integration test for the Matrix Market reader and writer

mod common;

use densimat::ellpack::EllpackMatrix;
use densimat::matrix_market::{
    read_matrix_market, read_matrix_market_file, write_matrix_market, write_matrix_market_file,
};
use densimat::DensimatError;
use std::io::Cursor;

fn read_str(content: &str) -> Result<EllpackMatrix, DensimatError> {
    read_matrix_market(Cursor::new(content.to_string()), None)
}

// Test reading a small file with unordered entries and comments
#[test]
fn read_unordered_entries() {
    let content = "\
%%MatrixMarket matrix coordinate real general
% synthetic two by two example
2 2 4
2 2 4.0
1 1 1.0
2 1 -0.5
1 2 -0.5
";
    let matrix = read_str(content).unwrap();
    assert_eq!(matrix.order(), 2);
    assert_eq!(matrix.get(0, 0), 1.0);
    assert_eq!(matrix.get(1, 1), 4.0);
    assert_eq!(matrix.get(0, 1), -0.5);
    assert_eq!(matrix.get(1, 0), -0.5);
    common::assert_structural_invariants(&matrix, 0.0);
}

// Test that missing diagonal entries are restored on reading
#[test]
fn read_restores_missing_diagonals() {
    let content = "\
%%MatrixMarket matrix coordinate real general
3 3 2
1 2 0.25
2 3 0.125
";
    let matrix = read_str(content).unwrap();
    common::assert_structural_invariants(&matrix, 0.0);
    for i in 0..3 {
        assert_eq!(matrix.get(i, i), 0.0);
    }
}

// Test the writer banner and layout
#[test]
fn writer_layout() {
    let matrix = EllpackMatrix::identity(2, 2).unwrap();
    let mut buffer = Vec::new();
    write_matrix_market(&mut buffer, &matrix).unwrap();
    let text = String::from_utf8(buffer).unwrap();
    let mut lines = text.lines();
    assert_eq!(
        lines.next(),
        Some("%%MatrixMarket matrix coordinate real general")
    );
    assert_eq!(lines.next(), Some("2 2 2"));
    assert_eq!(lines.next(), Some("1 1 1"));
    assert_eq!(lines.next(), Some("2 2 1"));
    assert_eq!(lines.next(), None);
}

// Test that the writer composed with the reader is the identity
#[test]
fn roundtrip_is_identity() {
    let mut matrix = EllpackMatrix::zero(4, 4).unwrap();
    matrix.insert(0, 0, 0.5).unwrap();
    matrix.insert(0, 3, -0.25).unwrap();
    matrix.insert(1, 1, 2.0).unwrap();
    matrix.insert(2, 2, -1.0).unwrap();
    matrix.insert(2, 1, 0.125).unwrap();
    matrix.insert(3, 3, 4.0).unwrap();
    matrix.insert(3, 0, -0.25).unwrap();

    let mut buffer = Vec::new();
    write_matrix_market(&mut buffer, &matrix).unwrap();
    let restored = read_matrix_market(Cursor::new(buffer), Some(4)).unwrap();
    assert_eq!(restored, matrix);
}

// Test the file based round trip
#[test]
fn file_roundtrip() {
    let matrix = EllpackMatrix::banded(16, 8, 1.0, 1.0, 1.0e-5).unwrap();
    let path = std::env::temp_dir().join("densimat_roundtrip_test.mtx");
    write_matrix_market_file(&path, &matrix).unwrap();
    let restored = read_matrix_market_file(&path, Some(8)).unwrap();
    std::fs::remove_file(&path).ok();
    assert_eq!(restored, matrix);
}

// Test the rejection of malformed banners
#[test]
fn bad_banner_is_rejected() {
    let content = "%%NotMatrixMarket matrix coordinate real general\n1 1 0\n";
    assert!(matches!(
        read_str(content),
        Err(DensimatError::MatrixMarketParse { line: 1, .. })
    ));
}

// Test the rejection of unsupported flavors
#[test]
fn complex_field_is_rejected() {
    let content = "%%MatrixMarket matrix coordinate complex general\n1 1 0\n";
    assert!(matches!(
        read_str(content),
        Err(DensimatError::MatrixMarketParse { line: 1, .. })
    ));
}

// Test the rejection of non-numeric values
#[test]
fn non_numeric_value_is_rejected() {
    let content = "\
%%MatrixMarket matrix coordinate real general
2 2 1
1 1 abc
";
    assert!(matches!(
        read_str(content),
        Err(DensimatError::MatrixMarketParse { line: 3, .. })
    ));
}

// Test the rejection of out-of-range indices
#[test]
fn out_of_range_index_is_rejected() {
    let content = "\
%%MatrixMarket matrix coordinate real general
2 2 1
3 1 1.0
";
    assert!(matches!(
        read_str(content),
        Err(DensimatError::MatrixMarketParse { line: 3, .. })
    ));

    let zero_based = "\
%%MatrixMarket matrix coordinate real general
2 2 1
0 1 1.0
";
    assert!(matches!(
        read_str(zero_based),
        Err(DensimatError::MatrixMarketParse { line: 3, .. })
    ));
}

// Test the rejection of non-square matrices
#[test]
fn non_square_matrix_is_rejected() {
    let content = "%%MatrixMarket matrix coordinate real general\n2 3 0\n";
    assert!(matches!(
        read_str(content),
        Err(DensimatError::MatrixMarketParse { line: 2, .. })
    ));
}

// Test the rejection of truncated files
#[test]
fn truncated_file_is_rejected() {
    let content = "\
%%MatrixMarket matrix coordinate real general
2 2 3
1 1 1.0
";
    assert!(matches!(
        read_str(content),
        Err(DensimatError::MatrixMarketParse { .. })
    ));
}
