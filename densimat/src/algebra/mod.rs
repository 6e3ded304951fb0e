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

//! Module for the sparse numeric primitives the SP2 solvers are built from.
//!
//! All primitives operate per row of their output matrix and are parallelized
//! across rows with no cross-row dependency. Off-diagonal results with
//! magnitude ≤ ε are dropped, diagonal entries are retained unconditionally.
//! Structural failures (a row needing more entries than its capacity) surface
//! as [`crate::DensimatError::RowCapacityExceeded`]; arithmetic never fails,
//! NaN and infinity propagate.

mod multiply;
pub use multiply::*;

mod add;
pub use add::*;

mod reductions;
pub use reductions::*;
