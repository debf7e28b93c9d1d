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

//! Operator sugar for building expressions in Rust code.
//!
//! ```
//! use cady::Expr;
//!
//! let x = Expr::var("x");
//! let y = Expr::var("y");
//! let f = (&x * &y + 1.0).exp() / x.powf(2.0);
//! assert_eq!(f.to_string(), "((std::exp(((((x)*(y)))+(1.0))))/(std::pow(x, 2.0)))");
//! ```

use std::ops::{Add, Div, Mul, Neg, Sub};

use super::{BinaryOp, Elementary, Expr};

macro_rules! binary_sugar {
    ($trait:ident, $method:ident, $op:expr) => {
        impl $trait<Expr> for Expr {
            type Output = Expr;
            fn $method(self, rhs: Expr) -> Expr {
                Expr::binary($op, self, rhs)
            }
        }

        impl $trait<&Expr> for Expr {
            type Output = Expr;
            fn $method(self, rhs: &Expr) -> Expr {
                Expr::binary($op, self, rhs.clone())
            }
        }

        impl $trait<Expr> for &Expr {
            type Output = Expr;
            fn $method(self, rhs: Expr) -> Expr {
                Expr::binary($op, self.clone(), rhs)
            }
        }

        impl $trait<&Expr> for &Expr {
            type Output = Expr;
            fn $method(self, rhs: &Expr) -> Expr {
                Expr::binary($op, self.clone(), rhs.clone())
            }
        }

        impl $trait<f64> for Expr {
            type Output = Expr;
            fn $method(self, rhs: f64) -> Expr {
                Expr::binary($op, self, Expr::constant(rhs))
            }
        }

        impl $trait<f64> for &Expr {
            type Output = Expr;
            fn $method(self, rhs: f64) -> Expr {
                Expr::binary($op, self.clone(), Expr::constant(rhs))
            }
        }

        impl $trait<Expr> for f64 {
            type Output = Expr;
            fn $method(self, rhs: Expr) -> Expr {
                Expr::binary($op, Expr::constant(self), rhs)
            }
        }

        impl $trait<&Expr> for f64 {
            type Output = Expr;
            fn $method(self, rhs: &Expr) -> Expr {
                Expr::binary($op, Expr::constant(self), rhs.clone())
            }
        }
    };
}

binary_sugar!(Add, add, BinaryOp::Add);
binary_sugar!(Sub, sub, BinaryOp::Sub);
binary_sugar!(Mul, mul, BinaryOp::Mul);
binary_sugar!(Div, div, BinaryOp::Div);

impl Neg for Expr {
    type Output = Expr;
    fn neg(self) -> Expr {
        Expr::negate(self)
    }
}

impl Neg for &Expr {
    type Output = Expr;
    fn neg(self) -> Expr {
        Expr::negate(self.clone())
    }
}

impl Expr {
    /// `self ^ exponent` with a constant exponent.
    pub fn powf(&self, exponent: f64) -> Expr {
        Expr::power(self.clone(), Expr::constant(exponent))
    }

    /// `self ^ exponent`. The exponent must not depend on the variable being
    /// differentiated.
    pub fn pow(&self, exponent: impl Into<Expr>) -> Expr {
        Expr::power(self.clone(), exponent.into())
    }

    pub fn exp(&self) -> Expr {
        Expr::call(Elementary::Exp, self.clone())
    }

    /// Natural logarithm.
    pub fn ln(&self) -> Expr {
        Expr::call(Elementary::Log, self.clone())
    }

    pub fn sqrt(&self) -> Expr {
        Expr::call(Elementary::Sqrt, self.clone())
    }

    pub fn abs(&self) -> Expr {
        Expr::call(Elementary::Abs, self.clone())
    }

    pub fn normal_cdf(&self) -> Expr {
        Expr::call(Elementary::NormalCdf, self.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::Node;

    #[test]
    fn mixes_constants_on_both_sides() {
        let x = Expr::var("x");
        let e = 2.0 * &x - 1.0;
        assert_eq!(e.to_string(), "((((2.0)*(x)))-(1.0))");
    }

    #[test]
    fn reference_operands_share_nodes() {
        let x = Expr::var("x");
        let e = &x + &x;
        match e.node() {
            Node::Binary { lhs, rhs, .. } => {
                assert!(lhs.ptr_eq(&x));
                assert!(rhs.ptr_eq(&x));
            }
            other => panic!("unexpected node {other:?}"),
        }
    }

    #[test]
    fn negation_builds_unary_minus() {
        let x = Expr::var("x");
        assert_eq!((-&x).to_string(), "(-(x))");
    }
}
