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

//! Cady core library: expression DAGs, symbolic differentiation, and C++
//! generation for forward, reverse and symbolic derivatives.
pub mod autodiff;
pub mod codegen;
pub mod config;
pub mod eval;
pub mod expr;
pub mod graph;
pub mod ir;
pub mod models;
pub mod opt;
pub mod pipeline;

pub use autodiff::{differentiate, AutodiffError, Mode};
pub use codegen::{emit_program, EmitOptions};
pub use config::{ConfigError, GenerateOptions, Naming};
pub use expr::{BinaryOp, Elementary, Expr, ExprError, FlatExpr};
pub use graph::{DependencyGraph, GraphError, NodeId};
pub use ir::{Function, Instr, Program};
pub use pipeline::{dependency_dot, generate, generate_value, GenerateError, GenerateProducts};
