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

//! Reverse-mode propagation.
//!
//! The result statement is inlined, folded and deduplicated so that every
//! operation and every input becomes one statement. Adjoints then flow from
//! the result back to the inputs, one declaration per statement, and each
//! input's slot is written as soon as its adjoint is known.

use crate::config::Naming;
use crate::expr::Expr;
use crate::graph::{DependencyGraph, GraphError};
use crate::ir::{Function, Program};
use crate::opt::{inline, Deduplicator};

use super::engine::{AutodiffError, ProgramBuilder};
use super::rules::{accumulate, bind_unless_constant, chain_term, local_partial};

pub(super) fn differentiate(
    function: &Function,
    naming: &Naming,
) -> Result<Program, AutodiffError> {
    let result = function.result().ok_or(GraphError::Empty)?;
    let result_name = result.binding_name().unwrap_or(function.name());

    let mut builder = ProgramBuilder::new(function);
    let flat = inline(result);
    let folded = builder.folder().fold(flat.as_expr())?;
    let mut cse = Deduplicator::new(naming.binding_prefix.as_str());
    for name in builder.reserved() {
        cse.reserve(name);
    }
    cse.reserve(result_name);
    builder.claim(result_name);
    let root = Expr::bind(result_name, cse.dedup_operands(&folded));
    let graph = DependencyGraph::from_root(&root)?;
    log::debug!(
        "reverse: {} primal statement(s), {} binding(s) from CSE",
        graph.len(),
        cse.bindings_created()
    );

    for (_, node) in graph.nodes() {
        builder.declare(node.binding())?;
    }

    let primal_bindings = cse.bindings_created();
    let mut adjoints: Vec<Option<Expr>> = vec![None; graph.len()];
    for id in graph.ids().rev() {
        let node = graph.node(id);
        let adjoint = if node.dependents().is_empty() {
            Expr::one()
        } else {
            let folder = builder.folder();
            let mut terms = Vec::with_capacity(node.dependents().len());
            for &child in node.dependents() {
                let Some(carried) = adjoints[child.0].as_ref() else {
                    continue;
                };
                let partial = local_partial(folder, graph.node(child).value(), node.name())?;
                terms.push(chain_term(folder, partial, carried)?);
            }
            let summed = accumulate(folder, terms)?;
            if summed.as_constant().is_some() {
                summed
            } else {
                // Share subexpressions with the primal and earlier adjoints.
                let head = cse.dedup_operands(&summed);
                builder.declare_reachable(&head)?;
                let name = builder.fresh_name(naming.adjoint(node.name()));
                cse.reserve(name.as_str());
                bind_unless_constant(name, head)
            }
        };
        if adjoint.is_binding() {
            builder.declare(&adjoint)?;
        }
        if node.is_input_leaf() {
            if let Some(arg) = node.value().variable_name() {
                builder.write_output(arg, adjoint.clone());
            }
        }
        adjoints[id.0] = Some(adjoint);
    }
    log::debug!(
        "reverse: {} binding(s) shared into adjoint code",
        cse.bindings_created() - primal_bindings
    );

    Ok(builder.finish(root))
}
