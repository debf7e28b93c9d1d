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
use cady::models::{black_scholes, rosenbrock};
use cady::{differentiate, generate, GenerateOptions, Mode, Naming};

const MODES: [Mode; 3] = [Mode::Forward, Mode::Reverse, Mode::Symbolic];

fn bench_black_scholes(c: &mut Criterion) {
    let mut group = c.benchmark_group("autodiff_black_scholes");
    let function = black_scholes();
    let naming = Naming::default();

    for mode in MODES {
        group.bench_with_input(
            BenchmarkId::new("differentiate", mode),
            &function,
            |b, f| {
                b.iter(|| differentiate(black_box(f), mode, &naming).expect("autodiff failed"));
            },
        );
    }

    group.finish();
}

fn bench_rosenbrock_scaling(c: &mut Criterion) {
    let mut group = c.benchmark_group("autodiff_rosenbrock");
    let naming = Naming::default();

    for dims in [4usize, 16, 64] {
        let function = rosenbrock(dims).expect("valid dimension");
        for mode in [Mode::Forward, Mode::Reverse] {
            group.bench_with_input(
                BenchmarkId::new(mode.as_str(), dims),
                &function,
                |b, f| {
                    b.iter(|| differentiate(black_box(f), mode, &naming).expect("autodiff failed"));
                },
            );
        }
    }

    group.finish();
}

fn bench_full_pipeline(c: &mut Criterion) {
    let function = black_scholes();
    let options = GenerateOptions::default();
    c.bench_function("generate_black_scholes", |b| {
        b.iter(|| generate(black_box(&function), &options).expect("generation failed"));
    });
}

criterion_group!(
    benches,
    bench_black_scholes,
    bench_rosenbrock_scaling,
    bench_full_pipeline
);
criterion_main!(benches);
