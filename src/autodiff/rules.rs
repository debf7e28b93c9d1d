// Copyright 2025 STARGA Inc.
// Licensed under the Apache License, Version 2.0 (the “License”);
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at:
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an “AS IS” BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

// Part of the Cady project (symbolic differentiation and code generation).

//! Chain-rule building blocks shared by the forward and reverse drivers.

use crate::expr::Expr;
use crate::opt::ConstantFolder;

use super::engine::AutodiffError;

/// Folded local partial `d value / d wrt`, treating every other binding as
/// an independent symbol.
pub(super) fn local_partial(
    folder: &mut ConstantFolder,
    value: &Expr,
    wrt: &str,
) -> Result<Expr, AutodiffError> {
    let raw = value.diff(wrt)?;
    Ok(folder.fold(&raw)?)
}

/// Folded `partial * carried`; zero partials drop out here.
pub(super) fn chain_term(
    folder: &mut ConstantFolder,
    partial: Expr,
    carried: &Expr,
) -> Result<Expr, AutodiffError> {
    Ok(folder.fold(&Expr::product(partial, carried.clone()))?)
}

/// Folded left-to-right sum of `terms`; zero for no terms.
pub(super) fn accumulate(
    folder: &mut ConstantFolder,
    terms: Vec<Expr>,
) -> Result<Expr, AutodiffError> {
    let sum = terms
        .into_iter()
        .reduce(Expr::sum)
        .unwrap_or_else(Expr::zero);
    Ok(folder.fold(&sum)?)
}

/// Carried derivatives that fold to a constant stay inline; everything else
/// is bound to `name` so later terms refer to it by name.
pub(super) fn bind_unless_constant(name: String, value: Expr) -> Expr {
    if value.as_constant().is_some() {
        value
    } else {
        Expr::bind(name, value)
    }
}
