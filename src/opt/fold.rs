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

use rustc_hash::FxHashMap;

use crate::expr::{BinaryOp, Expr, Node};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FoldError {
    #[error("division by zero: ({numerator}) / 0")]
    DivisionByZero { numerator: String },
}

/// Fold constant subtrees and local identities bottom-up.
///
/// The pass never looks at input values and is idempotent: folding an
/// already folded expression returns a structurally equal one.
pub fn fold(expr: &Expr) -> Result<Expr, FoldError> {
    ConstantFolder::new().fold(expr)
}

/// Constant folder with an identity memo, reusable across expressions that
/// share nodes.
#[derive(Default)]
pub struct ConstantFolder {
    // The source handle is kept so its address cannot be reused.
    memo: FxHashMap<*const Node, (Expr, Expr)>,
    rewrites: usize,
}

impl ConstantFolder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of nodes replaced by a simpler form so far.
    pub fn rewrites(&self) -> usize {
        self.rewrites
    }

    pub fn fold(&mut self, expr: &Expr) -> Result<Expr, FoldError> {
        if let Some((_, folded)) = self.memo.get(&expr.as_ptr()) {
            return Ok(folded.clone());
        }
        let rebuilt = expr.try_map_children(|child| self.fold(child))?;
        let simplified = match rebuilt.node() {
            Node::Neg(arg) => arg.as_constant().map(negate_constant),
            Node::Binary { op, lhs, rhs } => simplify_binary(*op, lhs, rhs)?,
            _ => None,
        };
        let folded = match simplified {
            Some(simpler) => {
                self.rewrites += 1;
                log::trace!("fold: {rebuilt} => {simpler}");
                simpler
            }
            None => rebuilt,
        };
        self.memo
            .insert(expr.as_ptr(), (expr.clone(), folded.clone()));
        Ok(folded)
    }
}

fn negate_constant(value: f64) -> Expr {
    if value == 0.0 {
        Expr::zero()
    } else {
        Expr::constant(-value)
    }
}

fn is(value: Option<f64>, target: f64) -> bool {
    value == Some(target)
}

/// Operands are already folded. `None` means the node stays as built.
fn simplify_binary(op: BinaryOp, lhs: &Expr, rhs: &Expr) -> Result<Option<Expr>, FoldError> {
    let l = lhs.as_constant();
    let r = rhs.as_constant();
    let simplified = match op {
        BinaryOp::Add => match (l, r) {
            (Some(a), Some(b)) => Some(Expr::constant(a + b)),
            _ if is(r, 0.0) => Some(lhs.clone()),
            _ if is(l, 0.0) => Some(rhs.clone()),
            _ => None,
        },
        BinaryOp::Sub => match (l, r) {
            (Some(a), Some(b)) => Some(Expr::constant(a - b)),
            _ if is(r, 0.0) => Some(lhs.clone()),
            _ if is(l, 0.0) => Some(Expr::negate(rhs.clone())),
            _ => None,
        },
        BinaryOp::Mul => match (l, r) {
            _ if is(l, 0.0) || is(r, 0.0) => Some(Expr::zero()),
            (Some(a), Some(b)) => Some(Expr::constant(a * b)),
            _ if is(r, 1.0) => Some(lhs.clone()),
            _ if is(l, 1.0) => Some(rhs.clone()),
            _ => None,
        },
        // A zero numerator wins, so 0/0 folds to 0.
        BinaryOp::Div => match (l, r) {
            _ if is(l, 0.0) => Some(Expr::zero()),
            _ if is(r, 0.0) => {
                return Err(FoldError::DivisionByZero {
                    numerator: lhs.to_string(),
                })
            }
            (Some(a), Some(b)) => Some(Expr::constant(a / b)),
            _ if is(r, 1.0) => Some(lhs.clone()),
            _ => None,
        },
        BinaryOp::Pow => match (l, r) {
            (Some(a), Some(b)) => Some(Expr::constant(a.powf(b))),
            _ if is(r, 0.0) => Some(Expr::one()),
            _ if is(r, 1.0) => Some(lhs.clone()),
            _ if is(l, 0.0) => Some(Expr::zero()),
            _ => None,
        },
    };
    Ok(simplified)
}
