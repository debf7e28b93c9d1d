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

use std::convert::Infallible;

use rustc_hash::FxHashMap;

use crate::expr::{Expr, FlatExpr, Node};

/// Substitute every binding reachable from `expr` with the expression it
/// wraps.
pub fn inline(expr: &Expr) -> FlatExpr {
    Inliner::default().inline(expr)
}

#[derive(Default)]
pub struct Inliner {
    memo: FxHashMap<*const Node, (Expr, Expr)>,
}

impl Inliner {
    pub fn inline(&mut self, expr: &Expr) -> FlatExpr {
        FlatExpr::new_unchecked(self.substitute(expr))
    }

    fn substitute(&mut self, expr: &Expr) -> Expr {
        if let Some((_, flat)) = self.memo.get(&expr.as_ptr()) {
            return flat.clone();
        }
        let flat = match expr.node() {
            Node::Binding { expr: inner, .. } => self.substitute(inner),
            _ => {
                let rebuilt: Result<Expr, Infallible> =
                    expr.try_map_children(|child| Ok(self.substitute(child)));
                match rebuilt {
                    Ok(flat) => flat,
                    Err(never) => match never {},
                }
            }
        };
        self.memo.insert(expr.as_ptr(), (expr.clone(), flat.clone()));
        flat
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::opt::Deduplicator;

    #[test]
    fn inlining_undoes_dedup() {
        let x = Expr::var("x");
        let e = Expr::sum(
            Expr::product(x.clone(), x.clone()),
            Expr::call(crate::expr::Elementary::Log, x),
        );
        let deduped = Deduplicator::new("w").dedup(&e);
        assert!(deduped.is_binding());
        assert_eq!(inline(&deduped).into_inner(), e);
    }

    #[test]
    fn sharing_survives_inlining() {
        let x = Expr::var("x");
        let shared = Expr::bind("s", Expr::product(x.clone(), x));
        let e = Expr::sum(shared.clone(), shared);
        let flat = inline(&e).into_inner();
        match flat.node() {
            Node::Binary { lhs, rhs, .. } => assert!(lhs.ptr_eq(rhs)),
            other => panic!("unexpected node {other:?}"),
        }
    }
}
