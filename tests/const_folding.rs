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

use cady::models::{black_scholes, rosenbrock};
use cady::opt::{fold, inline, ConstantFolder, FoldError};
use cady::{Expr, Function};

#[test]
fn folds_simple_arith() {
    let e = Expr::constant(1.0) + Expr::constant(2.0) * Expr::constant(3.0);
    assert_eq!(fold(&e).unwrap().as_constant(), Some(7.0));
}

#[test]
fn identities_collapse_around_variables() {
    let x = Expr::var("x");
    let e = (&x * 1.0 + 0.0) / 1.0 - 0.0;
    assert_eq!(fold(&e).unwrap(), x);

    let e = 0.0 * (&x + 5.0) + x.powf(1.0);
    assert_eq!(fold(&e).unwrap().to_string(), "x");
}

#[test]
fn power_edge_cases() {
    let x = Expr::var("x");
    assert!(fold(&x.powf(0.0)).unwrap().is_one());
    assert!(fold(&Expr::power(Expr::zero(), x.clone())).unwrap().is_zero());
    assert_eq!(
        fold(&Expr::power(Expr::constant(2.0), Expr::constant(10.0)))
            .unwrap()
            .as_constant(),
        Some(1024.0)
    );
}

#[test]
fn zero_numerator_beats_zero_denominator() {
    let e = Expr::zero() / Expr::zero();
    assert!(fold(&e).unwrap().is_zero());
}

#[test]
fn division_by_constant_zero_is_an_error() {
    let e = Expr::var("x") / (Expr::one() - Expr::one());
    assert_eq!(
        fold(&e).unwrap_err(),
        FoldError::DivisionByZero {
            numerator: "x".into()
        }
    );
}

#[test]
fn folding_a_folded_expression_changes_nothing() {
    let x = Expr::var("x");
    let e = (&x * 2.0 + 3.0 * 4.0).exp() - (&x - 0.0).ln();
    let once = fold(&e).unwrap();
    let mut folder = ConstantFolder::new();
    let twice = folder.fold(&once).unwrap();
    assert_eq!(folder.rewrites(), 0);
    assert!(twice.ptr_eq(&once));
}

fn assert_derivatives_fold_idempotently(function: &Function) {
    let flat = inline(function.result().unwrap());
    for arg in function.args() {
        let raw = flat.diff(arg).unwrap();
        let once = fold(raw.as_expr()).unwrap();
        let mut folder = ConstantFolder::new();
        let twice = folder.fold(&once).unwrap();
        assert_eq!(folder.rewrites(), 0, "d/d{arg} of {}", function.name());
        assert!(twice.ptr_eq(&once), "d/d{arg} of {}", function.name());
    }
}

#[test]
fn model_derivatives_fold_idempotently() {
    assert_derivatives_fold_idempotently(&black_scholes());
    assert_derivatives_fold_idempotently(&rosenbrock(4).unwrap());
}

#[test]
fn multiplicative_and_additive_identities() {
    let x = Expr::var("x");
    assert!(fold(&(&x * 0.0)).unwrap().is_zero());
    assert_eq!(fold(&(&x + 0.0)).unwrap(), x);
    assert_eq!(fold(&(-Expr::zero())).unwrap().as_constant(), Some(0.0));
}
