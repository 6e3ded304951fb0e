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

use crate::algebra::{scale_add_identity, scale_inplace};
use crate::ellpack::EllpackMatrix;
use crate::{DensimatError, Real};

/// Maps a Hamiltonian to X₀ = (eMax·I − H)/(eMax − eMin) in place.
///
/// With eMin and eMax the Gershgorin bounds of H, the spectrum of X₀ lies in
/// \[0, 1\] with the occupied states mapped towards 1, which is the operand the
/// basic SP2 recursion needs.
///
/// # Arguments
///
/// * `x` - The matrix holding H, overwritten with X₀.
/// * `e_min` - Lower Gershgorin bound of H.
/// * `e_max` - Upper Gershgorin bound of H.
///
/// # Returns
///
/// * `Ok(())` - The matrix was normalized.
/// * `Err(DensimatError::SingularSpectrum)` - The bounds coincide.
pub fn normalize_spectrum(
    x: &mut EllpackMatrix,
    e_min: Real,
    e_max: Real,
) -> Result<(), DensimatError> {
    let width = e_max - e_min;
    if width == 0.0 {
        return Err(DensimatError::SingularSpectrum);
    }
    scale_add_identity(x, -1.0 / width, e_max / width, 0.0)
}

/// Maps a Hamiltonian to X₀ = ((hN − μ)·I − H)/(hN − h1) in place.
///
/// h1 and hN are the scaled Gershgorin bounds of the Fermi driver and μ the
/// current chemical-potential estimate.
///
/// # Arguments
///
/// * `x` - The matrix holding H, overwritten with X₀.
/// * `h1` - Scaled lower bound.
/// * `hn` - Scaled upper bound.
/// * `mu` - Chemical potential.
///
/// # Returns
///
/// * `Ok(())` - The matrix was normalized.
/// * `Err(DensimatError::SingularSpectrum)` - The bounds coincide.
pub fn normalize_fermi(
    x: &mut EllpackMatrix,
    h1: Real,
    hn: Real,
    mu: Real,
) -> Result<(), DensimatError> {
    let width = hn - h1;
    if width == 0.0 {
        return Err(DensimatError::SingularSpectrum);
    }
    scale_add_identity(x, -1.0, hn - mu, 0.0)?;
    scale_inplace(x, 1.0 / width);
    Ok(())
}

/// Maps a Hamiltonian to X₀ = c·(μ·I − H) + ½·I in place.
///
/// This is the starting operand of the implicit recursive expansion with
/// c = β/2^(2+n_steps).
///
/// # Arguments
///
/// * `x` - The matrix holding H, overwritten with X₀.
/// * `c` - The temperature-dependent scale.
/// * `mu` - Chemical potential.
///
/// # Returns
///
/// * `Ok(())` - The matrix was normalized.
pub fn normalize_implicit(x: &mut EllpackMatrix, c: Real, mu: Real) -> Result<(), DensimatError> {
    scale_add_identity(x, -c, c * mu + 0.5, 0.0)
}
