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

//! Forward-mode propagation over the user's statement list.
//!
//! For statement `s` and input `x` the tangent is
//! `ds/dx + sum over dependencies d of (ds/dd) * tangent(d, x)`, where every
//! partial is local (other statements are opaque symbols).

use crate::config::Naming;
use crate::expr::Expr;
use crate::graph::{DependencyGraph, GraphError};
use crate::ir::{Function, Program};

use super::engine::{AutodiffError, ProgramBuilder};
use super::rules::{accumulate, chain_term, local_partial};

pub(super) fn differentiate(
    function: &Function,
    naming: &Naming,
) -> Result<Program, AutodiffError> {
    let graph = DependencyGraph::build(function.statements())?;
    let mut builder = ProgramBuilder::new(function);
    let args = builder.args().to_vec();
    for (_, node) in graph.nodes() {
        builder.claim(node.name());
    }

    // tangents[statement][input]
    let mut tangents: Vec<Vec<Expr>> = Vec::with_capacity(graph.len());
    let mut declared_tangents = 0usize;
    for (_, node) in graph.nodes() {
        builder.declare(node.binding())?;
        let mut row = Vec::with_capacity(args.len());
        for (input, arg) in args.iter().enumerate() {
            let folder = builder.folder();
            let mut terms = vec![local_partial(folder, node.value(), arg)?];
            for &dep in node.dependencies() {
                let partial = local_partial(folder, node.value(), graph.node(dep).name())?;
                terms.push(chain_term(folder, partial, &tangents[dep.0][input])?);
            }
            let tangent = accumulate(folder, terms)?;
            let carried = if tangent.as_constant().is_some() {
                tangent
            } else {
                Expr::bind(builder.fresh_name(naming.tangent(node.name(), arg)), tangent)
            };
            if carried.is_binding() {
                builder.declare(&carried)?;
                declared_tangents += 1;
            }
            row.push(carried);
        }
        tangents.push(row);
    }
    log::debug!(
        "forward: {} statement(s) x {} input(s), {declared_tangents} tangent(s) declared",
        graph.len(),
        args.len()
    );

    let result = graph
        .ids()
        .next_back()
        .map(|id| graph.node(id).binding().clone())
        .ok_or(GraphError::Empty)?;
    if let Some(final_row) = tangents.last() {
        for (arg, tangent) in args.iter().zip(final_row) {
            builder.write_output(arg, tangent.clone());
        }
    }
    Ok(builder.finish(result))
}
