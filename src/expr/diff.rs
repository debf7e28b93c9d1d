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

use std::f64::consts::PI;

use super::{BinaryOp, Elementary, Expr, ExprError, Node};

impl Expr {
    /// Local partial derivative with respect to `var`.
    ///
    /// Bindings are opaque symbols here: a binding differentiates to `1` when
    /// its own name is `var` and to `0` otherwise, without looking at the
    /// expression it wraps. This is exactly the local partial the AD drivers
    /// need; for a total derivative inline first and use
    /// [`FlatExpr::diff`](super::FlatExpr::diff).
    ///
    /// `Pow` assumes its exponent does not depend on `var`. The result is
    /// raw (unfolded); run it through the constant folder before emitting.
    pub fn diff(&self, var: &str) -> Result<Expr, ExprError> {
        match self.node() {
            Node::Constant(_) => Ok(Expr::zero()),
            Node::Variable(name) | Node::Binding { name, .. } => Ok(indicator(name == var)),
            Node::Neg(arg) => Ok(Expr::negate(arg.diff(var)?)),
            Node::Binary { op, lhs, rhs } => diff_binary(*op, lhs, rhs, var),
            Node::Call { func, arg } => self.diff_call(*func, arg, var),
        }
    }

    fn diff_call(&self, func: Elementary, arg: &Expr, var: &str) -> Result<Expr, ExprError> {
        let darg = arg.diff(var)?;
        let outer = match func {
            // exp(f)' = exp(f) * f'
            Elementary::Exp => self.clone(),
            Elementary::Log => return Ok(Expr::quotient(darg, arg.clone())),
            Elementary::Sqrt => {
                return Ok(Expr::quotient(
                    darg,
                    Expr::product(Expr::constant(2.0), self.clone()),
                ))
            }
            Elementary::NormalCdf => normal_density(arg),
            Elementary::Abs => return Err(ExprError::UndifferentiableConstruct(func.name())),
        };
        Ok(Expr::product(outer, darg))
    }
}

fn diff_binary(op: BinaryOp, lhs: &Expr, rhs: &Expr, var: &str) -> Result<Expr, ExprError> {
    let dl = lhs.diff(var)?;
    match op {
        BinaryOp::Add => Ok(Expr::sum(dl, rhs.diff(var)?)),
        BinaryOp::Sub => Ok(Expr::difference(dl, rhs.diff(var)?)),
        BinaryOp::Mul => {
            let dr = rhs.diff(var)?;
            Ok(Expr::sum(
                Expr::product(dl, rhs.clone()),
                Expr::product(lhs.clone(), dr),
            ))
        }
        BinaryOp::Div => {
            let dr = rhs.diff(var)?;
            let numerator = Expr::difference(
                Expr::product(dl, rhs.clone()),
                Expr::product(lhs.clone(), dr),
            );
            Ok(Expr::quotient(
                numerator,
                Expr::power(rhs.clone(), Expr::constant(2.0)),
            ))
        }
        BinaryOp::Pow => {
            let lowered = match rhs.as_constant() {
                Some(c) => Expr::constant(c - 1.0),
                None => Expr::difference(rhs.clone(), Expr::one()),
            };
            Ok(Expr::product(
                rhs.clone(),
                Expr::product(Expr::power(lhs.clone(), lowered), dl),
            ))
        }
    }
}

fn indicator(hit: bool) -> Expr {
    if hit {
        Expr::one()
    } else {
        Expr::zero()
    }
}

/// `exp(-0.5 * f^2) / sqrt(2 pi)`
fn normal_density(arg: &Expr) -> Expr {
    let half_square = Expr::product(
        Expr::constant(0.5),
        Expr::power(arg.clone(), Expr::constant(2.0)),
    );
    Expr::quotient(
        Expr::call(Elementary::Exp, Expr::negate(half_square)),
        Expr::constant((2.0 * PI).sqrt()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn binding_is_an_opaque_symbol() {
        let x = Expr::var("x");
        let inner = Expr::product(x.clone(), x);
        let b = Expr::bind("b0", inner);
        assert!(b.diff("x").unwrap().is_zero());
        assert!(b.diff("b0").unwrap().is_one());
    }

    #[test]
    fn abs_has_no_rule() {
        let e = Expr::call(Elementary::Abs, Expr::var("x"));
        assert_eq!(
            e.diff("x").unwrap_err(),
            ExprError::UndifferentiableConstruct("abs")
        );
        // The error surfaces from nested positions too.
        let nested = Expr::sum(Expr::one(), Expr::product(Expr::var("y"), e));
        assert!(nested.diff("y").is_err());
    }

    #[test]
    fn pow_with_constant_exponent_lowers_the_constant() {
        let e = Expr::power(Expr::var("x"), Expr::constant(3.0));
        let d = e.diff("x").unwrap();
        assert_eq!(d.to_string(), "((3.0)*(((std::pow(x, 2.0))*(1.0))))");
    }

    #[test]
    fn exp_rule_reuses_the_node() {
        let e = Expr::call(Elementary::Exp, Expr::var("x"));
        let d = e.diff("x").unwrap();
        match d.node() {
            Node::Binary { lhs, .. } => assert!(lhs.ptr_eq(&e)),
            other => panic!("unexpected derivative shape {other:?}"),
        }
    }
}
