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

//! Reference evaluation of expressions and instruction programs.
//!
//! This is a checking aid: generated programs are run here in tests to
//! compare derivative values without compiling the emitted C++.

use std::collections::BTreeMap;
use std::f64::consts::SQRT_2;

use rustc_hash::FxHashMap;

use crate::expr::{BinaryOp, Elementary, Expr, Node};
use crate::ir::Function;

mod interp;

pub use interp::{run_program, Evaluation};

/// Variable values by name.
pub type Env = BTreeMap<String, f64>;

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum EvalError {
    #[error("unknown variable: {0}")]
    UnknownVar(String),
    #[error("expected {expected} input(s), got {found}")]
    ArgumentCount { expected: usize, found: usize },
    #[error("program has no return instruction")]
    MissingReturn,
    #[error("output slot d_{0} was never written")]
    UnwrittenOutput(String),
    #[error("output slot for unknown argument '{0}'")]
    UnknownOutput(String),
}

/// How bindings are resolved while evaluating.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Bindings {
    /// Compute a binding from the expression it wraps.
    Compute,
    /// Read a binding by name from the environment; it must be there.
    Lookup,
}

/// Evaluate `expr`, computing any bindings it contains.
pub fn evaluate(expr: &Expr, env: &Env) -> Result<f64, EvalError> {
    Evaluator::new(env, Bindings::Compute).eval(expr)
}

/// Evaluate the result statement of `function` at `inputs`, given in
/// argument order.
pub fn evaluate_function(function: &Function, inputs: &[f64]) -> Result<f64, EvalError> {
    let env = bind_inputs(function.args(), inputs)?;
    let result = function
        .result()
        .ok_or(EvalError::MissingReturn)?;
    evaluate(result, &env)
}

pub(crate) fn bind_inputs(args: &[String], inputs: &[f64]) -> Result<Env, EvalError> {
    if args.len() != inputs.len() {
        return Err(EvalError::ArgumentCount {
            expected: args.len(),
            found: inputs.len(),
        });
    }
    Ok(args.iter().cloned().zip(inputs.iter().copied()).collect())
}

pub(crate) struct Evaluator<'a> {
    env: &'a Env,
    bindings: Bindings,
    memo: FxHashMap<*const Node, f64>,
}

impl<'a> Evaluator<'a> {
    pub(crate) fn new(env: &'a Env, bindings: Bindings) -> Self {
        Self {
            env,
            bindings,
            memo: FxHashMap::default(),
        }
    }

    pub(crate) fn eval(&mut self, expr: &Expr) -> Result<f64, EvalError> {
        if let Some(&value) = self.memo.get(&expr.as_ptr()) {
            return Ok(value);
        }
        let value = match expr.node() {
            Node::Constant(value) => *value,
            Node::Variable(name) => self.lookup(name)?,
            Node::Binding { name, expr: inner } => match self.bindings {
                Bindings::Compute => self.eval(inner)?,
                Bindings::Lookup => self.lookup(name)?,
            },
            Node::Neg(arg) => -self.eval(arg)?,
            Node::Binary { op, lhs, rhs } => {
                let l = self.eval(lhs)?;
                let r = self.eval(rhs)?;
                apply_binary(*op, l, r)
            }
            Node::Call { func, arg } => apply_elementary(*func, self.eval(arg)?),
        };
        self.memo.insert(expr.as_ptr(), value);
        Ok(value)
    }

    fn lookup(&self, name: &str) -> Result<f64, EvalError> {
        self.env
            .get(name)
            .copied()
            .ok_or_else(|| EvalError::UnknownVar(name.to_string()))
    }
}

pub fn apply_binary(op: BinaryOp, lhs: f64, rhs: f64) -> f64 {
    match op {
        BinaryOp::Add => lhs + rhs,
        BinaryOp::Sub => lhs - rhs,
        BinaryOp::Mul => lhs * rhs,
        BinaryOp::Div => lhs / rhs,
        BinaryOp::Pow => lhs.powf(rhs),
    }
}

pub fn apply_elementary(func: Elementary, x: f64) -> f64 {
    match func {
        Elementary::Exp => x.exp(),
        Elementary::Log => x.ln(),
        Elementary::Sqrt => x.sqrt(),
        Elementary::Abs => x.abs(),
        // Same formulation as the emitted std::erfc call.
        Elementary::NormalCdf => 0.5 * libm::erfc(-x / SQRT_2),
    }
}
