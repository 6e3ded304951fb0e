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

//! Module for reading and writing matrices in the Matrix Market coordinate format.
//!
//! Only the `matrix coordinate real general` flavor is supported: a five-token
//! banner, an optional block of `%` comment lines, one size line `N N nnz` and
//! nnz entry lines `row col value` with 1-based indices. Entries may appear in
//! any order; rows without a diagonal entry receive an explicit zero one on
//! reading, since every matrix handed to the solvers must store its diagonal.

use crate::ellpack::{adjust_row_capacity, EllpackMatrix};
use crate::{DensimatError, Real};
use itertools::Itertools;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

const BANNER: &str = "%%MatrixMarket matrix coordinate real general";

fn parse_error(line: usize, msg: impl Into<String>) -> DensimatError {
    DensimatError::MatrixMarketParse {
        line,
        msg: msg.into(),
    }
}

/// Reads a matrix in Matrix Market coordinate real general format.
///
/// # Arguments
///
/// * `reader` - Buffered source of the file contents.
/// * `row_capacity` - Per-row capacity of the produced matrix; `None` allocates
///   full rows using [`adjust_row_capacity`].
///
/// # Returns
///
/// * `Ok(EllpackMatrix)` - The parsed matrix with all diagonals stored.
/// * `Err(DensimatError::MatrixMarketParse)` - Malformed banner, size line or entry.
/// * `Err(DensimatError::RowCapacityExceeded)` - A row holds more entries than the capacity.
/// * `Err(DensimatError::Io)` - The underlying reader failed.
pub fn read_matrix_market<R: BufRead>(
    reader: R,
    row_capacity: Option<usize>,
) -> Result<EllpackMatrix, DensimatError> {
    let mut lines = reader.lines();
    let mut line_no = 0;

    let banner = match lines.next() {
        Some(line) => {
            line_no += 1;
            line?
        }
        None => return Err(parse_error(1, "empty input")),
    };
    let tokens: Vec<&str> = banner.split_whitespace().collect();
    if tokens.len() != 5 || !tokens[0].eq_ignore_ascii_case("%%MatrixMarket") {
        return Err(parse_error(
            line_no,
            format!("expected banner '{BANNER}', got '{banner}'"),
        ));
    }
    for (token, expected) in tokens[1..]
        .iter()
        .zip(["matrix", "coordinate", "real", "general"])
    {
        if !token.eq_ignore_ascii_case(expected) {
            return Err(parse_error(
                line_no,
                format!("unsupported Matrix Market flavor '{token}', expected '{expected}'"),
            ));
        }
    }

    let size_line = loop {
        let line = match lines.next() {
            Some(line) => {
                line_no += 1;
                line?
            }
            None => return Err(parse_error(line_no, "missing size line")),
        };
        let trimmed = line.trim().to_string();
        if trimmed.is_empty() || trimmed.starts_with('%') {
            continue;
        }
        break trimmed;
    };
    let size_tokens: Vec<&str> = size_line.split_whitespace().collect();
    if size_tokens.len() != 3 {
        return Err(parse_error(line_no, "size line must be 'rows cols nnz'"));
    }
    let dims: Vec<usize> = size_tokens
        .iter()
        .map(|t| {
            t.parse::<usize>()
                .map_err(|_| parse_error(line_no, format!("invalid size token '{t}'")))
        })
        .collect::<Result<_, _>>()?;
    let (rows, cols, entry_count) = (dims[0], dims[1], dims[2]);
    if rows != cols {
        return Err(parse_error(
            line_no,
            format!("matrix is not square: {rows} x {cols}"),
        ));
    }
    if rows == 0 {
        return Err(parse_error(line_no, "matrix order must be positive"));
    }

    let capacity = row_capacity.unwrap_or_else(|| adjust_row_capacity(rows, 0));
    let mut matrix = EllpackMatrix::zero(rows, capacity)?;

    let mut seen = 0;
    while seen < entry_count {
        let line = match lines.next() {
            Some(line) => {
                line_no += 1;
                line?
            }
            None => {
                return Err(parse_error(
                    line_no,
                    format!("expected {entry_count} entries, got {seen}"),
                ))
            }
        };
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('%') {
            continue;
        }
        let entry_tokens: Vec<&str> = trimmed.split_whitespace().collect();
        if entry_tokens.len() != 3 {
            return Err(parse_error(line_no, "entry line must be 'row col value'"));
        }
        let row: usize = entry_tokens[0]
            .parse()
            .map_err(|_| parse_error(line_no, format!("invalid row index '{}'", entry_tokens[0])))?;
        let col: usize = entry_tokens[1]
            .parse()
            .map_err(|_| parse_error(line_no, format!("invalid column index '{}'", entry_tokens[1])))?;
        let value: Real = entry_tokens[2]
            .parse()
            .map_err(|_| parse_error(line_no, format!("invalid value '{}'", entry_tokens[2])))?;
        if row == 0 || col == 0 {
            return Err(parse_error(line_no, "indices are 1-based"));
        }
        match matrix.insert(row - 1, col - 1, value) {
            Ok(()) => {}
            Err(overflow @ DensimatError::RowCapacityExceeded { .. }) => return Err(overflow),
            Err(e) => return Err(parse_error(line_no, e.to_string())),
        }
        seen += 1;
    }

    matrix.ensure_diagonals()?;
    Ok(matrix)
}

/// Writes a matrix in Matrix Market coordinate real general format.
///
/// Entries are emitted row-major with ascending columns and 1-based indices.
///
/// # Arguments
///
/// * `writer` - Sink for the file contents.
/// * `matrix` - The matrix to write.
///
/// # Returns
///
/// * `Ok(())` - The matrix was written.
/// * `Err(DensimatError::Io)` - The underlying writer failed.
pub fn write_matrix_market<W: Write>(
    mut writer: W,
    matrix: &EllpackMatrix,
) -> Result<(), DensimatError> {
    writeln!(writer, "{BANNER}")?;
    writeln!(
        writer,
        "{} {} {}",
        matrix.order(),
        matrix.order(),
        matrix.total_nnz()
    )?;
    for i in 0..matrix.order() {
        for (j, v) in matrix.row_entries(i).sorted_by_key(|&(j, _)| j) {
            writeln!(writer, "{} {} {v}", i + 1, j + 1)?;
        }
    }
    Ok(())
}

/// Reads a Matrix Market file from disk; see [`read_matrix_market`].
pub fn read_matrix_market_file(
    path: impl AsRef<Path>,
    row_capacity: Option<usize>,
) -> Result<EllpackMatrix, DensimatError> {
    let file = File::open(path)?;
    read_matrix_market(BufReader::new(file), row_capacity)
}

/// Writes a Matrix Market file to disk; see [`write_matrix_market`].
pub fn write_matrix_market_file(
    path: impl AsRef<Path>,
    matrix: &EllpackMatrix,
) -> Result<(), DensimatError> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    write_matrix_market(&mut writer, matrix)?;
    writer.flush()?;
    Ok(())
}
