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

//! Module for the row-compressed ELLPACK-R sparse matrix substrate.
//!
//! An [`EllpackMatrix`] stores a square matrix of order N with a fixed per-row
//! capacity M. All numeric primitives in [`crate::algebra`] operate row by row
//! on this substrate and can be parallelized across rows without sharing
//! mutable per-row state.

mod matrix;
pub use matrix::*;

mod workspace;
pub use workspace::*;
