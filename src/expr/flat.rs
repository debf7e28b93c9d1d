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

use std::fmt;

use rustc_hash::FxHashSet;

use super::{Expr, ExprError};

/// An expression that contains no [`Binding`](super::Node::Binding) nodes.
///
/// Differentiating a flat expression yields the total derivative, since no
/// intermediate symbol can hide a dependency on the variable.
#[derive(Clone, PartialEq)]
pub struct FlatExpr(Expr);

impl FlatExpr {
    /// Wrap an expression the caller has already inlined.
    pub(crate) fn new_unchecked(expr: Expr) -> Self {
        FlatExpr(expr)
    }

    pub fn as_expr(&self) -> &Expr {
        &self.0
    }

    pub fn into_inner(self) -> Expr {
        self.0
    }

    pub fn diff(&self, var: &str) -> Result<FlatExpr, ExprError> {
        self.0.diff(var).map(FlatExpr)
    }
}

impl TryFrom<Expr> for FlatExpr {
    type Error = ExprError;

    fn try_from(expr: Expr) -> Result<Self, Self::Error> {
        let mut visited = FxHashSet::default();
        let mut stack = vec![&expr];
        while let Some(current) = stack.pop() {
            if !visited.insert(current.as_ptr()) {
                continue;
            }
            if let Some(name) = current.binding_name() {
                return Err(ExprError::UnexpectedBinding(name.to_string()));
            }
            stack.extend(current.children());
        }
        Ok(FlatExpr(expr))
    }
}

impl From<FlatExpr> for Expr {
    fn from(flat: FlatExpr) -> Self {
        flat.0
    }
}

impl fmt::Display for FlatExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl fmt::Debug for FlatExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FlatExpr({})", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_bindings() {
        let x = Expr::var("x");
        let e = Expr::sum(Expr::bind("t0", Expr::product(x.clone(), x)), Expr::one());
        assert_eq!(
            FlatExpr::try_from(e).unwrap_err(),
            ExprError::UnexpectedBinding("t0".into())
        );
    }

    #[test]
    fn flat_diff_is_total() {
        let x = Expr::var("x");
        let flat = FlatExpr::try_from(Expr::product(x.clone(), x)).unwrap();
        let d = flat.diff("x").unwrap();
        assert_eq!(d.to_string(), "((((1.0)*(x)))+(((x)*(1.0))))");
    }
}
