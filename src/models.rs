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

//! Reference models used by `cadyc`, the benches and the tests.

use crate::expr::Expr;
use crate::ir::Function;

/// Names accepted by [`by_name`].
pub const CATALOG: &[&str] = &["black_scholes", "rosenbrock"];

/// A representative evaluation point for [`black_scholes`], in argument
/// order `t, T, r, S, K, vol`.
pub const BLACK_SCHOLES_POINT: [f64; 6] = [0.0, 10.0, 0.04, 50.0, 60.0, 0.2];

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ModelError {
    #[error("unknown model '{0}' (available: black_scholes, rosenbrock)")]
    UnknownModel(String),
    #[error("{model} needs at least {min} dimension(s), got {found}")]
    TooFewDimensions {
        model: &'static str,
        min: usize,
        found: usize,
    },
}

pub fn by_name(name: &str, dims: usize) -> Result<Function, ModelError> {
    match name {
        "black_scholes" => Ok(black_scholes()),
        "rosenbrock" => rosenbrock(dims),
        other => Err(ModelError::UnknownModel(other.to_string())),
    }
}

/// Black-Scholes price of a European call.
///
/// Arguments are the current time `t`, expiry `T`, rate `r`, spot `S`,
/// strike `K` and volatility `vol`.
pub fn black_scholes() -> Function {
    let mut f = Function::new("black");
    let t = f.add_argument("t");
    let expiry = f.add_argument("T");
    let r = f.add_argument("r");
    let spot = f.add_argument("S");
    let strike = f.add_argument("K");
    let vol = f.add_argument("vol");

    let tau = &expiry - &t;
    let d1 = f.add_statement(
        "d1",
        1.0 / (&vol * tau.sqrt()) * ((&spot / &strike).ln() + (&r + vol.powf(2.0) / 2.0) * &tau),
    );
    let d2 = f.add_statement("d2", &d1 - &vol * tau.sqrt());
    let pv = f.add_statement("pv", &strike * (-&r * &tau).exp());
    f.add_statement("black", d1.normal_cdf() * &spot - d2.normal_cdf() * &pv);
    f
}

/// Extended Rosenbrock function in `dims` variables `x0 .. x{dims-1}`:
/// `sum_i 100 (x{i+1} - x{i}^2)^2 + (1 - x{i})^2`.
pub fn rosenbrock(dims: usize) -> Result<Function, ModelError> {
    if dims < 2 {
        return Err(ModelError::TooFewDimensions {
            model: "rosenbrock",
            min: 2,
            found: dims,
        });
    }
    let mut f = Function::new("rosenbrock");
    let xs: Vec<Expr> = (0..dims).map(|i| f.add_argument(format!("x{i}"))).collect();
    let mut total: Option<Expr> = None;
    for (i, pair) in xs.windows(2).enumerate() {
        let (x, next) = (&pair[0], &pair[1]);
        let term = f.add_statement(
            format!("term{i}"),
            100.0 * (next - x.powf(2.0)).powf(2.0) + (1.0 - x).powf(2.0),
        );
        total = Some(match total {
            Some(acc) => acc + term,
            None => term,
        });
    }
    f.add_statement("rosenbrock", total.unwrap_or_else(Expr::zero));
    Ok(f)
}
