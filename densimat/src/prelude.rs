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

//! Prelude re-exporting the commonly used densimat types and primitives.

pub use crate::algebra::{
    add, gershgorin, multiply, multiply_x2, scale_add_identity, scale_inplace, sum_squares,
    trace_mult,
};
pub use crate::config::{Config, MatrixKind};
pub use crate::ellpack::{adjust_row_capacity, EllpackMatrix, RowMut, RowWorkspace};
pub use crate::generate::{lcg61, mk_seed};
pub use crate::matrix_market::{
    read_matrix_market, read_matrix_market_file, write_matrix_market, write_matrix_market_file,
};
pub use crate::solver::{
    build_density_matrix, conjugate_gradient, implicit_fermi, initialize_hamiltonian,
    normalize_fermi, normalize_implicit, normalize_spectrum, sp2_basic, sp2_fermi, Algorithm,
    ImplicitMethod, Outcome, Solution,
};
pub use crate::{DensimatError, Real, DENSIMAT_VERSION};
