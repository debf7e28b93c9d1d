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

use approx::assert_relative_eq;
use cady::eval::{evaluate_function, run_program};
use cady::models::{black_scholes, BLACK_SCHOLES_POINT};
use cady::{generate, GenerateOptions, Mode};

const PRICE: f64 = 16.717_154_749_191_07;

/// Closed-form partials at the reference point, in argument order
/// `t, T, r, S, K, vol`.
const GREEKS: [f64; 6] = [
    -1.329_515_230_810_178,
    1.329_515_230_810_178,
    205.580_379_227_566_06,
    0.745_503_853_438_953_5,
    -0.342_633_965_379_276_76,
    50.719_371_389_991_4,
];

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[test]
fn every_mode_reproduces_the_closed_form_greeks() {
    init_logging();
    let f = black_scholes();
    for mode in [Mode::Forward, Mode::Reverse, Mode::Symbolic] {
        let options = GenerateOptions::default().with_mode(mode);
        let products = generate(&f, &options).unwrap();
        let out = run_program(&products.program, &BLACK_SCHOLES_POINT).unwrap();
        assert_relative_eq!(out.value, PRICE, epsilon = 1e-9);
        assert_eq!(out.gradient.len(), GREEKS.len());
        for (arg, (got, want)) in f.args().iter().zip(out.gradient.iter().zip(GREEKS)) {
            assert!(
                (got - want).abs() <= 1e-9 * want.abs().max(1.0),
                "{mode} mode: d/d{arg} = {got}, expected {want}"
            );
        }
    }
}

#[test]
fn greeks_match_finite_differences() {
    let f = black_scholes();
    let h = 1e-6;
    let products = generate(&f, &GenerateOptions::default()).unwrap();
    let out = run_program(&products.program, &BLACK_SCHOLES_POINT).unwrap();
    for i in 0..BLACK_SCHOLES_POINT.len() {
        let mut plus = BLACK_SCHOLES_POINT;
        let mut minus = BLACK_SCHOLES_POINT;
        plus[i] += h;
        minus[i] -= h;
        let fd = (evaluate_function(&f, &plus).unwrap() - evaluate_function(&f, &minus).unwrap())
            / (2.0 * h);
        assert_relative_eq!(out.gradient[i], fd, epsilon = 1e-6, max_relative = 1e-6);
    }
}

#[test]
fn generated_sources_use_mode_specific_names() {
    let f = black_scholes();
    let source = |mode| generate(&f, &GenerateOptions::default().with_mode(mode)).unwrap().source;

    let forward = source(Mode::Forward);
    assert!(forward.contains("double __diff_d1_vol = "));
    assert!(forward.contains("*d_vol = __diff_black_vol;"));
    assert!(forward.ends_with("    return black;\n}\n"));

    let reverse = source(Mode::Reverse);
    assert!(reverse.contains("double __rev_ad_"));
    assert!(reverse.contains("double w0 = vol;"));
    assert!(reverse.ends_with("    return black;\n}\n"));

    let symbolic = source(Mode::Symbolic);
    assert!(symbolic.contains("double __symbol_0 = "));
    assert!(!symbolic.contains("__rev_ad_"));

    for text in [&forward, &reverse, &symbolic] {
        assert!(text.starts_with(
            "double black(double t, double* d_t, double T, double* d_T, double r, double* d_r, \
             double S, double* d_S, double K, double* d_K, double vol, double* d_vol)\n{\n"
        ));
        assert!(text.contains("std::erfc("));
    }
}
