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

//! Immutable expression DAG.
//!
//! An [`Expr`] is a cheap, reference-counted handle to a [`Node`]. Nodes are
//! never mutated after construction; every rewrite pass (folding, CSE,
//! inlining) builds new nodes and shares the untouched ones. Identity (the
//! address of the shared node) is what the passes memoize on, structural
//! equality is what [`PartialEq`] compares.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::Rc;

mod diff;
mod emit;
mod flat;
mod ops;
mod walk;

pub use flat::FlatExpr;
pub use walk::{
    collect_binding_dependencies, depth_first_bindings, depth_first_bindings_pruned,
    free_variables,
};

/// Binary operators understood by the differentiator and the emitter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Pow,
}

impl BinaryOp {
    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Pow => "^",
        }
    }
}

/// Elementary functions of one argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Elementary {
    Exp,
    Log,
    Sqrt,
    /// Standard normal cumulative distribution function.
    NormalCdf,
    /// Absolute value. Has no derivative rule.
    Abs,
}

impl Elementary {
    pub fn name(self) -> &'static str {
        match self {
            Elementary::Exp => "exp",
            Elementary::Log => "log",
            Elementary::Sqrt => "sqrt",
            Elementary::NormalCdf => "normal_cdf",
            Elementary::Abs => "abs",
        }
    }
}

/// One node of the expression DAG.
#[derive(Debug)]
pub enum Node {
    Constant(f64),
    /// Free (exogenous) input.
    Variable(String),
    /// Named, once-defined local value (endogenous symbol).
    Binding { name: String, expr: Expr },
    Neg(Expr),
    Binary { op: BinaryOp, lhs: Expr, rhs: Expr },
    Call { func: Elementary, arg: Expr },
}

/// The shape of a node with its children stripped off.
///
/// Two nodes with equal kinds and identical children are structurally
/// identical, which is the key the CSE pass hashes on. Constants compare by
/// bit pattern so that `NaN` and `-0.0` are stable keys.
#[derive(Debug, Clone)]
pub enum OpKind {
    Constant(f64),
    Variable(String),
    Binding(String),
    Neg,
    Binary(BinaryOp),
    Call(Elementary),
}

impl OpKind {
    pub fn arity(&self) -> usize {
        match self {
            OpKind::Constant(_) | OpKind::Variable(_) => 0,
            OpKind::Binding(_) | OpKind::Neg | OpKind::Call(_) => 1,
            OpKind::Binary(_) => 2,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            OpKind::Constant(_) => "constant",
            OpKind::Variable(_) => "variable",
            OpKind::Binding(_) => "binding",
            OpKind::Neg => "unary minus",
            OpKind::Binary(BinaryOp::Add) => "add",
            OpKind::Binary(BinaryOp::Sub) => "sub",
            OpKind::Binary(BinaryOp::Mul) => "mul",
            OpKind::Binary(BinaryOp::Div) => "div",
            OpKind::Binary(BinaryOp::Pow) => "pow",
            OpKind::Call(func) => func.name(),
        }
    }
}

impl PartialEq for OpKind {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (OpKind::Constant(a), OpKind::Constant(b)) => a.to_bits() == b.to_bits(),
            (OpKind::Variable(a), OpKind::Variable(b)) => a == b,
            (OpKind::Binding(a), OpKind::Binding(b)) => a == b,
            (OpKind::Neg, OpKind::Neg) => true,
            (OpKind::Binary(a), OpKind::Binary(b)) => a == b,
            (OpKind::Call(a), OpKind::Call(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for OpKind {}

impl Hash for OpKind {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            OpKind::Constant(value) => value.to_bits().hash(state),
            OpKind::Variable(name) | OpKind::Binding(name) => name.hash(state),
            OpKind::Neg => {}
            OpKind::Binary(op) => op.hash(state),
            OpKind::Call(func) => func.hash(state),
        }
    }
}

/// Errors raised while building or differentiating expressions.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ExprError {
    /// A generic factory received the wrong number of children.
    #[error("{kind} expects {expected} operand(s), got {found}")]
    InvalidArity {
        kind: &'static str,
        expected: usize,
        found: usize,
    },
    /// The node kind has no derivative rule.
    #[error("no derivative rule for '{0}'")]
    UndifferentiableConstruct(&'static str),
    /// A flat expression was requested but a binding is still present.
    #[error("expression still references binding '{0}'; inline it first")]
    UnexpectedBinding(String),
    /// A statement slot received something other than a binding.
    #[error("expected a binding, found {0}")]
    NotABinding(String),
}

/// Shared handle to an immutable expression node.
#[derive(Clone)]
pub struct Expr(Rc<Node>);

impl Expr {
    pub fn new(node: Node) -> Self {
        Expr(Rc::new(node))
    }

    pub fn constant(value: f64) -> Self {
        Expr::new(Node::Constant(value))
    }

    pub fn zero() -> Self {
        Expr::constant(0.0)
    }

    pub fn one() -> Self {
        Expr::constant(1.0)
    }

    pub fn var(name: impl Into<String>) -> Self {
        Expr::new(Node::Variable(name.into()))
    }

    /// Wrap `expr` in a named binding.
    pub fn bind(name: impl Into<String>, expr: Expr) -> Self {
        Expr::new(Node::Binding {
            name: name.into(),
            expr,
        })
    }

    pub fn negate(arg: Expr) -> Self {
        Expr::new(Node::Neg(arg))
    }

    pub fn binary(op: BinaryOp, lhs: Expr, rhs: Expr) -> Self {
        Expr::new(Node::Binary { op, lhs, rhs })
    }

    pub fn sum(lhs: Expr, rhs: Expr) -> Self {
        Expr::binary(BinaryOp::Add, lhs, rhs)
    }

    pub fn difference(lhs: Expr, rhs: Expr) -> Self {
        Expr::binary(BinaryOp::Sub, lhs, rhs)
    }

    pub fn product(lhs: Expr, rhs: Expr) -> Self {
        Expr::binary(BinaryOp::Mul, lhs, rhs)
    }

    pub fn quotient(lhs: Expr, rhs: Expr) -> Self {
        Expr::binary(BinaryOp::Div, lhs, rhs)
    }

    pub fn power(base: Expr, exponent: Expr) -> Self {
        Expr::binary(BinaryOp::Pow, base, exponent)
    }

    pub fn call(func: Elementary, arg: Expr) -> Self {
        Expr::new(Node::Call { func, arg })
    }

    /// Generic factory used by passes that rebuild nodes from their parts.
    pub fn from_parts(kind: OpKind, children: Vec<Expr>) -> Result<Self, ExprError> {
        if children.len() != kind.arity() {
            return Err(ExprError::InvalidArity {
                kind: kind.label(),
                expected: kind.arity(),
                found: children.len(),
            });
        }
        let mut children = children.into_iter();
        let mut next = || children.next().ok_or(ExprError::InvalidArity {
            kind: kind.label(),
            expected: kind.arity(),
            found: 0,
        });
        let node = match &kind {
            OpKind::Constant(value) => Node::Constant(*value),
            OpKind::Variable(name) => Node::Variable(name.clone()),
            OpKind::Binding(name) => Node::Binding {
                name: name.clone(),
                expr: next()?,
            },
            OpKind::Neg => Node::Neg(next()?),
            OpKind::Binary(op) => {
                let lhs = next()?;
                let rhs = next()?;
                Node::Binary { op: *op, lhs, rhs }
            }
            OpKind::Call(func) => Node::Call {
                func: *func,
                arg: next()?,
            },
        };
        Ok(Expr::new(node))
    }

    pub fn node(&self) -> &Node {
        &self.0
    }

    /// Rebuild this node with every child replaced by `f(child)`.
    ///
    /// When `f` hands back each child unchanged (same node), the same
    /// handle is returned and nothing is allocated.
    pub fn try_map_children<E, F>(&self, mut f: F) -> Result<Expr, E>
    where
        F: FnMut(&Expr) -> Result<Expr, E>,
    {
        let node = match self.node() {
            Node::Constant(_) | Node::Variable(_) => return Ok(self.clone()),
            Node::Binding { name, expr } => {
                let new_expr = f(expr)?;
                if new_expr.ptr_eq(expr) {
                    return Ok(self.clone());
                }
                Node::Binding {
                    name: name.clone(),
                    expr: new_expr,
                }
            }
            Node::Neg(arg) => {
                let new_arg = f(arg)?;
                if new_arg.ptr_eq(arg) {
                    return Ok(self.clone());
                }
                Node::Neg(new_arg)
            }
            Node::Binary { op, lhs, rhs } => {
                let new_lhs = f(lhs)?;
                let new_rhs = f(rhs)?;
                if new_lhs.ptr_eq(lhs) && new_rhs.ptr_eq(rhs) {
                    return Ok(self.clone());
                }
                Node::Binary {
                    op: *op,
                    lhs: new_lhs,
                    rhs: new_rhs,
                }
            }
            Node::Call { func, arg } => {
                let new_arg = f(arg)?;
                if new_arg.ptr_eq(arg) {
                    return Ok(self.clone());
                }
                Node::Call {
                    func: *func,
                    arg: new_arg,
                }
            }
        };
        Ok(Expr::new(node))
    }

    pub fn kind(&self) -> OpKind {
        match self.node() {
            Node::Constant(value) => OpKind::Constant(*value),
            Node::Variable(name) => OpKind::Variable(name.clone()),
            Node::Binding { name, .. } => OpKind::Binding(name.clone()),
            Node::Neg(_) => OpKind::Neg,
            Node::Binary { op, .. } => OpKind::Binary(*op),
            Node::Call { func, .. } => OpKind::Call(*func),
        }
    }

    pub fn children(&self) -> Vec<&Expr> {
        match self.node() {
            Node::Constant(_) | Node::Variable(_) => Vec::new(),
            Node::Binding { expr, .. } => vec![expr],
            Node::Neg(arg) | Node::Call { arg, .. } => vec![arg],
            Node::Binary { lhs, rhs, .. } => vec![lhs, rhs],
        }
    }

    /// Address of the shared node; stable for as long as a handle is alive.
    pub fn as_ptr(&self) -> *const Node {
        Rc::as_ptr(&self.0)
    }

    pub fn ptr_eq(&self, other: &Expr) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    pub fn as_constant(&self) -> Option<f64> {
        match self.node() {
            Node::Constant(value) => Some(*value),
            _ => None,
        }
    }

    pub fn is_zero(&self) -> bool {
        self.as_constant() == Some(0.0)
    }

    pub fn is_one(&self) -> bool {
        self.as_constant() == Some(1.0)
    }

    pub fn is_binding(&self) -> bool {
        matches!(self.node(), Node::Binding { .. })
    }

    pub fn variable_name(&self) -> Option<&str> {
        match self.node() {
            Node::Variable(name) => Some(name),
            _ => None,
        }
    }

    pub fn binding_name(&self) -> Option<&str> {
        match self.node() {
            Node::Binding { name, .. } => Some(name),
            _ => None,
        }
    }

    /// The expression a binding wraps.
    pub fn bound_expr(&self) -> Option<&Expr> {
        match self.node() {
            Node::Binding { expr, .. } => Some(expr),
            _ => None,
        }
    }
}

impl From<Node> for Expr {
    fn from(node: Node) -> Self {
        Expr::new(node)
    }
}

impl From<f64> for Expr {
    fn from(value: f64) -> Self {
        Expr::constant(value)
    }
}

impl PartialEq for Expr {
    fn eq(&self, other: &Self) -> bool {
        if self.ptr_eq(other) {
            return true;
        }
        match (self.node(), other.node()) {
            (Node::Constant(a), Node::Constant(b)) => a.to_bits() == b.to_bits(),
            (Node::Variable(a), Node::Variable(b)) => a == b,
            (
                Node::Binding { name: a, expr: ea },
                Node::Binding { name: b, expr: eb },
            ) => a == b && ea == eb,
            (Node::Neg(a), Node::Neg(b)) => a == b,
            (
                Node::Binary {
                    op: oa,
                    lhs: la,
                    rhs: ra,
                },
                Node::Binary {
                    op: ob,
                    lhs: lb,
                    rhs: rb,
                },
            ) => oa == ob && la == lb && ra == rb,
            (Node::Call { func: fa, arg: aa }, Node::Call { func: fb, arg: ab }) => {
                fa == fb && aa == ab
            }
            _ => false,
        }
    }
}

impl fmt::Debug for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Expr({self})")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_parts_rejects_wrong_arity() {
        let err = Expr::from_parts(OpKind::Binary(BinaryOp::Mul), vec![Expr::var("x")])
            .unwrap_err();
        assert_eq!(
            err,
            ExprError::InvalidArity {
                kind: "mul",
                expected: 2,
                found: 1
            }
        );

        let err = Expr::from_parts(OpKind::Constant(1.0), vec![Expr::var("x")]).unwrap_err();
        assert!(matches!(err, ExprError::InvalidArity { expected: 0, .. }));
    }

    #[test]
    fn from_parts_rebuilds_same_shape() {
        let x = Expr::var("x");
        let e = Expr::product(x.clone(), Expr::constant(2.0));
        let children = e.children().into_iter().cloned().collect();
        let rebuilt = Expr::from_parts(e.kind(), children).unwrap();
        assert_eq!(rebuilt, e);
        assert!(!rebuilt.ptr_eq(&e));
    }

    #[test]
    fn constants_compare_bitwise() {
        assert_eq!(Expr::constant(f64::NAN), Expr::constant(f64::NAN));
        assert_ne!(Expr::constant(0.0), Expr::constant(-0.0));
        assert!(Expr::constant(-0.0).is_zero());
    }
}
