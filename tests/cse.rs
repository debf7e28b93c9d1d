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

use cady::eval::{evaluate, Env};
use cady::expr::depth_first_bindings;
use cady::opt::{inline, Deduplicator};
use cady::Expr;

fn binding_names(root: &Expr) -> Vec<String> {
    depth_first_bindings(root)
        .iter()
        .filter_map(|b| b.binding_name().map(str::to_string))
        .collect()
}

#[test]
fn repeated_subtrees_collapse_to_one_binding() {
    // (x*y).exp() built three times from scratch.
    let term = || (Expr::var("x") * Expr::var("y")).exp();
    let e = term() + term() * term();
    let mut cse = Deduplicator::new("w");
    let root = cse.dedup(&e);
    // x, y, x*y, exp, product, sum
    assert_eq!(cse.bindings_created(), 6);
    assert_eq!(binding_names(&root), vec!["w0", "w1", "w2", "w3", "w4", "w5"]);
}

#[test]
fn dedup_is_stable_across_calls() {
    let mut cse = Deduplicator::new("t");
    let first = cse.dedup(&(Expr::var("a") + 1.0));
    let second = cse.dedup(&(Expr::var("a") + 1.0));
    assert!(first.ptr_eq(&second));
    assert_eq!(cse.prefix(), "t");
}

#[test]
fn dedup_then_inline_preserves_the_value() {
    let x = Expr::var("x");
    let e = (&x * &x).sqrt() + (&x * &x).ln() - x.powf(3.0) / (&x * &x);
    let env: Env = [("x".to_string(), 1.7)].into_iter().collect();
    let expected = evaluate(&e, &env).unwrap();

    let mut cse = Deduplicator::new("w");
    let deduped = cse.dedup(&e);
    assert_eq!(evaluate(&deduped, &env).unwrap(), expected);
    let flat = inline(&deduped);
    assert_eq!(evaluate(flat.as_expr(), &env).unwrap(), expected);
    assert_eq!(flat.into_inner(), e);
}

#[test]
fn operand_dedup_leaves_the_root_for_the_caller() {
    let x = Expr::var("x");
    let mut cse = Deduplicator::new("w");
    let head = cse.dedup_operands(&(&x * &x + &x * &x));
    assert!(!head.is_binding());
    assert_eq!(head.to_string(), "((w1)+(w1))");
    let root = Expr::bind("f", head);
    assert_eq!(binding_names(&root), vec!["w0", "w1", "f"]);
}

#[test]
fn product_shared_between_both_operands() {
    let e = Expr::var("a") * Expr::var("b") + Expr::var("a") * Expr::var("b");
    let mut cse = Deduplicator::new("w");
    let root = cse.dedup(&e);
    // a, b, a*b, sum
    assert_eq!(cse.bindings_created(), 4);
    assert_eq!(root.bound_expr().map(Expr::to_string).as_deref(), Some("((w2)+(w2))"));

    let env: Env = [("a".to_string(), 2.0), ("b".to_string(), 3.0)]
        .into_iter()
        .collect();
    assert_eq!(evaluate(&e, &env).unwrap(), 12.0);
    assert_eq!(evaluate(&root, &env).unwrap(), 12.0);
}
