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

//! High-level generation pipeline.
//!
//! [`generate`] verifies a [`Function`], runs the requested AD driver,
//! verifies the resulting program and renders it as C++.

use crate::autodiff;
use crate::codegen::{self, EmitOptions};
use crate::config::GenerateOptions;
use crate::graph::{self, DependencyGraph};
use crate::ir::{self, Function, Program};

/// Artifacts produced by [`generate`].
#[derive(Debug, Clone)]
pub struct GenerateProducts {
    /// Verified instruction program.
    pub program: Program,
    /// C++ source for `program`.
    pub source: String,
}

/// Errors surfaced by the generation pipeline.
#[derive(Debug, thiserror::Error)]
pub enum GenerateError {
    /// The input function or the produced program did not verify.
    #[error("IR verification failed: {0}")]
    IrVerify(#[from] ir::IrVerifyError),
    #[error("dependency graph construction failed: {0}")]
    Graph(#[from] graph::GraphError),
    #[error("autodiff failed: {0}")]
    Autodiff(#[from] autodiff::AutodiffError),
}

/// Differentiate `function` with the configured mode and emit C++.
pub fn generate(
    function: &Function,
    options: &GenerateOptions,
) -> Result<GenerateProducts, GenerateError> {
    let program = autodiff::differentiate(function, options.mode, &options.naming)?;
    ir::verify_program(&program)?;
    let source = codegen::emit_program(&program, &options.emit);
    log::info!(
        "generated '{}' ({} mode, {} line(s))",
        function.name(),
        options.mode,
        source.lines().count()
    );
    Ok(GenerateProducts { program, source })
}

/// Emit code for the value alone, statements in declaration order.
pub fn generate_value(
    function: &Function,
    emit: &EmitOptions,
) -> Result<GenerateProducts, GenerateError> {
    ir::verify_function(function)?;
    let graph = DependencyGraph::build(function.statements())?;
    let mut program = Program::value_only(function.name(), function.args().to_vec());
    graph.emit_instructions(&mut program)?;
    ir::verify_program(&program)?;
    let source = codegen::emit_program(&program, emit);
    Ok(GenerateProducts { program, source })
}

/// Graphviz text for the statement graph of `function`.
pub fn dependency_dot(function: &Function) -> Result<String, GenerateError> {
    ir::verify_function(function)?;
    let graph = DependencyGraph::build(function.statements())?;
    Ok(graph::to_dot(&graph)?)
}
