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

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use cady::models::black_scholes;
use cady::opt::{fold, inline, Deduplicator};
use cady::{Expr, FlatExpr};

/// Inlined value of the Black-Scholes model.
fn flat_black_scholes() -> FlatExpr {
    let function = black_scholes();
    inline(function.result().expect("model has statements"))
}

fn bench_passes(c: &mut Criterion) {
    let mut group = c.benchmark_group("passes");
    let flat = flat_black_scholes();
    let derivative = flat.diff("vol").expect("differentiable");

    group.bench_with_input(BenchmarkId::new("diff", "vol"), &flat, |b, f| {
        b.iter(|| black_box(f).diff("vol").expect("differentiable"));
    });
    group.bench_with_input(
        BenchmarkId::new("fold", "d_vol"),
        derivative.as_expr(),
        |b, e| {
            b.iter(|| fold(black_box(e)).expect("no division by zero"));
        },
    );
    group.bench_with_input(
        BenchmarkId::new("dedup", "d_vol"),
        derivative.as_expr(),
        |b, e| {
            b.iter(|| Deduplicator::new("w").dedup(black_box(e)));
        },
    );

    group.finish();
}

fn bench_emit(c: &mut Criterion) {
    // A long sum keeps the emitter's explicit stack busy.
    let x = Expr::var("x");
    let mut long = x.clone();
    for i in 0..2_000 {
        long = long + &x * (i as f64);
    }
    c.bench_function("emit_long_sum", |b| b.iter(|| black_box(&long).to_string()));
}

criterion_group!(benches, bench_passes, bench_emit);
criterion_main!(benches);
