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

//! C++ rendering of a single expression.
//!
//! Every operand is parenthesized; no precedence analysis is attempted.
//! Bindings render as their name, so a bound program prints as a sequence of
//! short statements rather than one inlined tree.

use std::fmt::{self, Write};

use super::{BinaryOp, Elementary, Expr, Node};

enum Frame<'a> {
    Expr(&'a Expr),
    Text(&'static str),
}

/// Render `expr` into `out` using an explicit work stack.
pub fn write_code<W: Write>(expr: &Expr, out: &mut W) -> fmt::Result {
    let mut stack = vec![Frame::Expr(expr)];
    while let Some(frame) = stack.pop() {
        let expr = match frame {
            Frame::Text(text) => {
                out.write_str(text)?;
                continue;
            }
            Frame::Expr(expr) => expr,
        };
        // Frames are pushed in reverse so they pop in reading order.
        match expr.node() {
            Node::Constant(value) => write_constant(*value, out)?,
            Node::Variable(name) | Node::Binding { name, .. } => out.write_str(name)?,
            Node::Neg(arg) => {
                stack.push(Frame::Text("))"));
                stack.push(Frame::Expr(arg));
                out.write_str("(-(")?;
            }
            Node::Binary {
                op: BinaryOp::Pow,
                lhs,
                rhs,
            } => {
                stack.push(Frame::Text(")"));
                stack.push(Frame::Expr(rhs));
                stack.push(Frame::Text(", "));
                stack.push(Frame::Expr(lhs));
                out.write_str("std::pow(")?;
            }
            Node::Binary { op, lhs, rhs } => {
                stack.push(Frame::Text("))"));
                stack.push(Frame::Expr(rhs));
                stack.push(Frame::Text(infix(*op)));
                stack.push(Frame::Expr(lhs));
                out.write_str("((")?;
            }
            Node::Call {
                func: Elementary::NormalCdf,
                arg,
            } => {
                stack.push(Frame::Text(")/std::sqrt(2.0))/2.0)"));
                stack.push(Frame::Expr(arg));
                out.write_str("(std::erfc(-(")?;
            }
            Node::Call { func, arg } => {
                stack.push(Frame::Text(")"));
                stack.push(Frame::Expr(arg));
                out.write_str(call_prefix(*func))?;
            }
        }
    }
    Ok(())
}

fn infix(op: BinaryOp) -> &'static str {
    match op {
        BinaryOp::Add => ")+(",
        BinaryOp::Sub => ")-(",
        BinaryOp::Mul => ")*(",
        BinaryOp::Div => ")/(",
        BinaryOp::Pow => ", ",
    }
}

fn call_prefix(func: Elementary) -> &'static str {
    match func {
        Elementary::Exp => "std::exp(",
        Elementary::Log => "std::log(",
        Elementary::Sqrt => "std::sqrt(",
        Elementary::Abs => "std::fabs(",
        Elementary::NormalCdf => "std::erfc(",
    }
}

/// Constants are emitted as C++ double literals so integer division can
/// never sneak into the generated code.
fn write_constant<W: Write>(value: f64, out: &mut W) -> fmt::Result {
    if value.is_nan() {
        out.write_str("std::numeric_limits<double>::quiet_NaN()")
    } else if value.is_infinite() {
        if value > 0.0 {
            out.write_str("std::numeric_limits<double>::infinity()")
        } else {
            out.write_str("(-std::numeric_limits<double>::infinity())")
        }
    } else if value.is_sign_negative() {
        write!(out, "({value:?})")
    } else {
        write!(out, "{value:?}")
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_code(self, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_fully_parenthesized() {
        let x = Expr::var("x");
        let y = Expr::var("y");
        let e = Expr::sum(
            Expr::product(x.clone(), y),
            Expr::negate(Expr::power(x, Expr::constant(0.5))),
        );
        assert_eq!(e.to_string(), "((((x)*(y)))+((-(std::pow(x, 0.5)))))");
    }

    #[test]
    fn renders_normal_cdf_through_erfc() {
        let e = Expr::call(Elementary::NormalCdf, Expr::var("d1"));
        assert_eq!(e.to_string(), "(std::erfc(-(d1)/std::sqrt(2.0))/2.0)");
    }

    #[test]
    fn renders_bindings_by_name() {
        let b = Expr::bind("w3", Expr::call(Elementary::Log, Expr::var("S")));
        let e = Expr::call(Elementary::Exp, b);
        assert_eq!(e.to_string(), "std::exp(w3)");
    }

    #[test]
    fn constants_are_double_literals() {
        assert_eq!(Expr::constant(2.0).to_string(), "2.0");
        assert_eq!(Expr::constant(-1.0).to_string(), "(-1.0)");
        assert_eq!(Expr::constant(1e-10).to_string(), "1e-10");
        assert_eq!(
            Expr::constant(f64::NAN).to_string(),
            "std::numeric_limits<double>::quiet_NaN()"
        );
    }

    #[test]
    fn deep_chains_do_not_recurse() {
        let mut e = Expr::var("x");
        for _ in 0..50_000 {
            e = Expr::negate(e);
        }
        let text = e.to_string();
        assert!(text.starts_with("(-((-("));
        // Drop iteratively to keep the test itself from overflowing.
        let mut cur = Some(e);
        while let Some(expr) = cur.take() {
            cur = match expr.node() {
                Node::Neg(arg) => Some(arg.clone()),
                _ => None,
            };
        }
    }
}
